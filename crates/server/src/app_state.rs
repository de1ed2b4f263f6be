use std::{sync::Arc, time::Duration};

use storage::DataStore;

use crate::mux::Mux;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<dyn DataStore>,
    pub(crate) mux: Arc<Mux>,
    pub(crate) request_timeout: Duration,
    pub(crate) max_form_bytes: usize,
}
