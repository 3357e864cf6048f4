use std::sync::Arc;

use scorm_sync_platform::{AccessEvents, LearningProgress, NoopPlatform, OutcomeReporter};

/// Host platform services the pipeline reports into.
#[derive(Clone)]
pub struct Collaborators {
    pub progress: Arc<dyn LearningProgress>,
    pub events: Arc<dyn AccessEvents>,
    pub outcomes: Arc<dyn OutcomeReporter>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    /// One implementation serving all three services.
    pub fn shared<P>(platform: Arc<P>) -> Self
    where
        P: LearningProgress + AccessEvents + OutcomeReporter + 'static,
    {
        Self {
            progress: Arc::clone(&platform) as Arc<dyn LearningProgress>,
            events: Arc::clone(&platform) as Arc<dyn AccessEvents>,
            outcomes: platform,
        }
    }

    #[must_use]
    pub fn noop() -> Self {
        Self::shared(Arc::new(NoopPlatform))
    }
}
