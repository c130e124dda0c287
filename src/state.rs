use std::sync::Arc;

use crate::{config::Config, error::AppError, session::SessionStore, source::remote::RemoteApi};

/// Shared by all handlers. The session store is the only mutable part.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub remote: RemoteApi,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let remote = RemoteApi::new(&config.backend_api_url, config.backend_api_timeout)?;
        let session_ttl = config.session_ttl;
        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new(session_ttl)),
            remote,
        })
    }
}
