//! Server-side page rendering.
//!
//! Controllers only choose a [`Page`] and hand over its data; all markup lives here.

use axum::response::Html;
use shared::domain::Entry;

pub(crate) const ERROR_BANNER: &str = r#"<div class="error">"#;
const SAVED_BANNER: &str = r#"<div class="success">"#;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Page<'a> {
    Index { entries: &'a [Entry], saved: bool },
    New { error: bool },
    View { entry: &'a Entry },
    Edit { entry: &'a Entry, error: bool },
    NotFound,
    ServerError,
}

impl Page<'_> {
    fn title(&self) -> String {
        match self {
            Page::Index { .. } => "Journal".to_string(),
            Page::New { .. } => "New Entry".to_string(),
            Page::View { entry } => entry.title.clone(),
            Page::Edit { entry, .. } => format!("Edit {}", entry.title),
            Page::NotFound => "Page Not Found".to_string(),
            Page::ServerError => "Something Went Wrong".to_string(),
        }
    }
}

pub(crate) fn render(page: Page<'_>) -> Html<String> {
    let content = match page {
        Page::Index { entries, saved } => index(entries, saved),
        Page::New { error } => entry_form("/new", "Create", None, error),
        Page::View { entry } => view(entry),
        Page::Edit { entry, error } => entry_form(
            &format!("/{}/edit", escape(&entry.slug)),
            "Save",
            Some(entry),
            error,
        ),
        Page::NotFound => "<h1>Page Not Found</h1>\n<p><a href=\"/\">Back to the journal</a></p>\n"
            .to_string(),
        Page::ServerError => {
            "<h1>Something Went Wrong</h1>\n<p>Your changes were not saved. Please try again.</p>\n"
                .to_string()
        }
    };
    Html(layout(&page.title(), &content))
}

fn layout(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<header><a href=\"/\">Journal</a> | <a href=\"/new\">New Entry</a></header>\n<main>\n{content}</main>\n</body>\n</html>\n",
        escape(title)
    )
}

fn index(entries: &[Entry], saved: bool) -> String {
    let mut out = String::new();
    if saved {
        out.push_str(SAVED_BANNER);
        out.push_str("Entry saved.</div>\n");
    }
    if entries.is_empty() {
        out.push_str("<p>No entries yet.</p>\n");
        return out;
    }
    out.push_str("<ul class=\"entries\">\n");
    for entry in entries {
        let slug = escape(&entry.slug);
        out.push_str(&format!(
            "<li><a href=\"/{slug}\">{}</a> <time>{}</time> <a href=\"/{slug}/edit\">edit</a></li>\n",
            escape(&entry.title),
            escape(&entry.date),
        ));
    }
    out.push_str("</ul>\n");
    out
}

fn view(entry: &Entry) -> String {
    format!(
        "<article>\n<h1>{}</h1>\n<time>{}</time>\n<div class=\"content\">{}</div>\n<p><a href=\"/{}/edit\">Edit</a></p>\n</article>\n",
        escape(&entry.title),
        escape(&entry.date),
        escape(&entry.content),
        escape(&entry.slug),
    )
}

fn entry_form(action: &str, submit: &str, entry: Option<&Entry>, error: bool) -> String {
    let (title, date, content) = entry
        .map(|e| (escape(&e.title), escape(&e.date), escape(&e.content)))
        .unwrap_or_default();
    let mut out = String::new();
    if error {
        out.push_str(ERROR_BANNER);
        out.push_str("Please fill in the title, date or content.</div>\n");
    }
    out.push_str(&format!(
        "<form method=\"post\" action=\"{action}\">\n<label>Title <input type=\"text\" name=\"title\" value=\"{title}\"></label>\n<label>Date <input type=\"date\" name=\"date\" value=\"{date}\"></label>\n<label>Content <textarea name=\"content\">{content}</textarea></label>\n<button type=\"submit\">{submit}</button>\n</form>\n"
    ));
    out
}

pub(crate) fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::EntryId;

    fn entry() -> Entry {
        Entry {
            id: EntryId(1),
            slug: "slug".into(),
            title: "<Title>".into(),
            date: "2018-02-01".into(),
            content: "Fish & chips".into(),
        }
    }

    #[test]
    fn edit_form_is_prefilled_and_escaped() {
        let entry = entry();
        let Html(body) = render(Page::Edit {
            entry: &entry,
            error: false,
        });
        assert!(body.contains("action=\"/slug/edit\""));
        assert!(body.contains("value=\"&lt;Title&gt;\""));
        assert!(body.contains("Fish &amp; chips</textarea>"));
        assert!(!body.contains(ERROR_BANNER));
    }

    #[test]
    fn error_banner_only_when_flagged() {
        let entry = entry();
        let Html(body) = render(Page::Edit {
            entry: &entry,
            error: true,
        });
        assert!(body.contains(ERROR_BANNER));
        let Html(body) = render(Page::New { error: false });
        assert!(!body.contains(ERROR_BANNER));
    }

    #[test]
    fn index_lists_entries_and_saved_banner() {
        let entries = vec![entry()];
        let Html(body) = render(Page::Index {
            entries: &entries,
            saved: true,
        });
        assert!(body.contains(SAVED_BANNER));
        assert!(body.contains("href=\"/slug/edit\""));
    }

    #[test]
    fn not_found_page_says_so() {
        let Html(body) = render(Page::NotFound);
        assert!(body.contains("Page Not Found"));
    }
}
