//! Navigation contract for a challenge screen.

use brain_core::i18n::{Catalog, LanguageCode};
use brain_core::model::SessionSummary;

use crate::runner::ActiveChallenge;
use crate::sessions::SummaryMessage;

/// What the host passes to a challenge screen.
pub struct ScreenProps {
    pub language: LanguageCode,
    pub on_back: Box<dyn FnOnce() + Send>,
}

/// Owns the running challenge for as long as the screen is shown.
pub struct ChallengeScreen {
    language: LanguageCode,
    on_back: Box<dyn FnOnce() + Send>,
    active: Option<ActiveChallenge>,
}

impl ChallengeScreen {
    #[must_use]
    pub fn new(props: ScreenProps) -> Self {
        Self {
            language: props.language,
            on_back: props.on_back,
            active: None,
        }
    }

    #[must_use]
    pub fn language(&self) -> LanguageCode {
        self.language
    }

    /// Show `active`; a previously attached challenge is dropped and its ticks stop.
    pub fn attach(&mut self, active: ActiveChallenge) {
        self.active = Some(active);
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActiveChallenge> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn summary_message(&self, summary: &SessionSummary, catalog: &dyn Catalog) -> SummaryMessage {
        SummaryMessage::render(summary, catalog, self.language)
    }

    /// Cancel timers, then hand control back to the host.
    pub async fn leave(self) {
        let Self {
            on_back, active, ..
        } = self;
        if let Some(active) = active {
            active.leave().await;
        }
        on_back();
    }
}
