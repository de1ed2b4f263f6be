use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::JournalError;

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid non-word regex"));

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(EntryId);

impl EntryId {
    /// An id of zero marks an entry the store has not assigned yet.
    pub fn is_persisted(self) -> bool {
        self.0 != 0
    }
}

/// A single dated journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub slug: String,
    pub title: String,
    pub date: String,
    pub content: String,
}

impl Entry {
    /// Builds an unsaved entry from a submitted form, deriving the slug from the title.
    pub fn from_form(form: &EntryForm) -> Self {
        Self {
            id: EntryId::default(),
            slug: slugify(&form.title),
            title: form.title.clone(),
            date: form.date.clone(),
            content: form.content.clone(),
        }
    }
}

/// The editable fields of an entry as submitted by a browser form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub content: String,
}

impl EntryForm {
    /// True only when every field is empty. A partially filled form is accepted.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.date.is_empty() && self.content.is_empty()
    }

    pub fn validate(&self) -> Result<(), JournalError> {
        if self.is_blank() {
            return Err(JournalError::Validation);
        }
        Ok(())
    }
}

/// Lower-cases `title` and collapses each run of non-word characters into a single `-`.
///
/// Separators left at either end are dropped, so `"Hello, World!"` becomes `"hello-world"`.
pub fn slugify(title: &str) -> String {
    NON_WORD_RE
        .replace_all(title, "-")
        .trim_matches('-')
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_non_word_runs() {
        assert_eq!(slugify("Hello,   World!"), "hello-world");
        assert_eq!(slugify("A day at the_beach"), "a-day-at-the_beach");
        assert_eq!(slugify("2018 -- Review"), "2018-review");
    }

    #[test]
    fn slugify_of_punctuation_only_title_is_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn blank_form_requires_every_field_empty() {
        assert!(EntryForm::default().is_blank());
        let title_only = EntryForm {
            title: "Title".into(),
            ..EntryForm::default()
        };
        assert!(!title_only.is_blank());
    }

    #[test]
    fn blank_form_fails_validation() {
        let err = EntryForm::default().validate().expect_err("blank form");
        assert_eq!(err.code(), crate::error::ErrorCode::Validation);
        let content_only = EntryForm {
            content: "notes".into(),
            ..EntryForm::default()
        };
        assert!(content_only.validate().is_ok());
    }

    #[test]
    fn entry_from_form_is_unsaved_with_derived_slug() {
        let entry = Entry::from_form(&EntryForm {
            title: "First Day".into(),
            date: "2018-02-01".into(),
            content: "Hello".into(),
        });
        assert!(!entry.id.is_persisted());
        assert_eq!(entry.slug, "first-day");
        assert_eq!(entry.date, "2018-02-01");
    }
}
