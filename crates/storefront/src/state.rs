//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::mail::{MailError, Mailer};
use crate::services::storage::{FileStore, StorageError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to prepare data directory: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to configure mailer: {0}")]
    Mail(#[from] MailError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    files: FileStore,
    mailer: Mailer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Prepares the on-disk data directory and the outbound mailer from
    /// the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the
    /// SMTP configuration is invalid.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let files = FileStore::new(&config.data_dir)?;
        let mailer = Mailer::from_config(config.smtp.as_ref())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                files,
                mailer,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the on-disk file store.
    #[must_use]
    pub fn files(&self) -> &FileStore {
        &self.inner.files
    }

    /// Get a reference to the outbound mailer.
    #[must_use]
    pub fn mailer(&self) -> &Mailer {
        &self.inner.mailer
    }
}
