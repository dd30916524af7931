use std::sync::Arc;

use prep_core::model::{ClientSettings, FeatureFlags, LearningMode, NewTestDraft, Test};
use storage::repository::Storage;

use crate::api_client::{ApiClient, ApiConfig};
use crate::attempt::TestRunner;
use crate::countdown_timer::CountdownTimer;
use crate::error::{ApiError, AppServicesError, AttemptError, StoreError};
use crate::stores::{AuthService, ExamContextService, ProgressService, SessionTracker};
use crate::Clock;

/// Assembles the client-facing stores and the backend client.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    settings: ClientSettings,
    features: FeatureFlags,
    session: Arc<SessionTracker>,
    progress: Arc<ProgressService>,
    exam_context: Arc<ExamContextService>,
    auth: Arc<AuthService>,
    api: Arc<ApiClient>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or loading a
    /// persisted record fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: ClientSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(storage, clock, settings).await
    }

    /// Build services over any storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if a persisted record cannot be loaded.
    pub async fn new(
        storage: Storage,
        clock: Clock,
        settings: ClientSettings,
    ) -> Result<Self, AppServicesError> {
        let features = storage
            .feature_flags
            .load()
            .await
            .map_err(StoreError::from)?
            .unwrap_or_default();
        let progress = Arc::new(ProgressService::load(clock, storage.progress).await?);
        let exam_context = Arc::new(ExamContextService::load(storage.exam_selection).await?);
        let auth = Arc::new(AuthService::load(storage.auth).await);
        let api = Arc::new(
            ApiClient::new(ApiConfig::from_settings(&settings)).with_auth(Arc::clone(&auth)),
        );

        Ok(Self {
            clock,
            settings,
            features,
            session: Arc::new(SessionTracker::new(clock)),
            progress,
            exam_context,
            auth,
            api,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    #[must_use]
    pub fn features(&self) -> FeatureFlags {
        self.features
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionTracker> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn exam_context(&self) -> Arc<ExamContextService> {
        Arc::clone(&self.exam_context)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn api(&self) -> Arc<ApiClient> {
        Arc::clone(&self.api)
    }

    /// Generate a test for the selected exam standard, if the draft does not
    /// name one itself.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the draft is invalid or the request fails.
    pub async fn generate_test(&self, mut draft: NewTestDraft) -> Result<Test, ApiError> {
        if draft.exam_standard.is_none() {
            draft.exam_standard = self.exam_context.current().exam_id().map(ToOwned::to_owned);
        }
        self.api.generate_test(draft).await
    }

    /// Begin an attempt on the shared session tracker.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::EmptyTest` if the test has no questions.
    pub fn start_test(&self, test: Test, mode: LearningMode) -> Result<TestRunner, AttemptError> {
        TestRunner::start(test, mode, Arc::clone(&self.session), self.clock)
    }

    /// Countdown for `mode` using the configured limit; `None` when untimed.
    #[must_use]
    pub fn start_timer(&self, mode: LearningMode) -> Option<CountdownTimer> {
        CountdownTimer::start(mode, self.settings.time_limit_secs())
    }
}
