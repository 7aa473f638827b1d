use std::sync::Arc;

use crate::config::Config;
use crate::gemini::GenerativeClient;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The client is the only process-wide shared resource: read-only after
/// startup and safe to share across concurrent invocations, since each call
/// carries its own prompt and output contract. Carried as a trait object so
/// tests construct flows against a scripted double.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn GenerativeClient>,
    /// Kept on state for handlers that need runtime settings later.
    #[allow(dead_code)]
    pub config: Config,
}
