use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::repositories::attempts::PgAttemptRepository;
use crate::repositories::catalog::PgPaperCatalog;
use crate::repositories::{AttemptRepository, PaperCatalog};
use crate::services::attempts::AttemptService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    catalog: Arc<dyn PaperCatalog>,
    attempts: AttemptService,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        attempts: Arc<dyn AttemptRepository>,
        catalog: Arc<dyn PaperCatalog>,
    ) -> Self {
        let attempts = AttemptService::new(attempts, catalog.clone(), settings.exam());
        Self { inner: Arc::new(InnerState { settings, db, catalog, attempts }) }
    }

    /// State backed by Postgres for both attempts and the paper catalog.
    pub(crate) fn postgres(settings: Settings, db: PgPool) -> Self {
        let attempts = Arc::new(PgAttemptRepository::new(db.clone()));
        let catalog = Arc::new(PgPaperCatalog::new(db.clone()));
        Self::new(settings, db, attempts, catalog)
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn catalog(&self) -> &dyn PaperCatalog {
        self.inner.catalog.as_ref()
    }

    pub(crate) fn attempts(&self) -> &AttemptService {
        &self.inner.attempts
    }
}
