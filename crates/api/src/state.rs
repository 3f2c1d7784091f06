use std::sync::Arc;

use tessera_core::device::DeviceResolver;
use tessera_core::manager::SessionManager;
use tessera_db::store::PgSessionStore;

use crate::config::ServerConfig;
use crate::device::HeaderDeviceResolver;
use crate::notify::VerificationNotifier;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tessera_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Session lifecycle engine backed by the database store.
    pub sessions: Arc<SessionManager>,
    /// Maps request headers to a device/location snapshot.
    pub device_resolver: Arc<dyn DeviceResolver>,
    /// Sends verification tokens for suspicious logins.
    pub notifier: Arc<dyn VerificationNotifier>,
}

impl AppState {
    /// Wire the PostgreSQL store into a [`SessionManager`] and assemble the state.
    pub fn new(
        pool: tessera_db::DbPool,
        config: ServerConfig,
        notifier: Arc<dyn VerificationNotifier>,
    ) -> Self {
        let store = Arc::new(PgSessionStore::new(pool.clone()));
        let sessions = SessionManager::new(config.session.clone(), store.clone(), store);
        Self {
            pool,
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            device_resolver: Arc::new(HeaderDeviceResolver),
            notifier,
        }
    }
}
