use thiserror::Error;

use crate::i18n::ParseLanguageError;
use crate::model::{ParseChallengeError, SessionSummaryError, SettingsError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Challenge(#[from] ParseChallengeError),
    #[error(transparent)]
    Language(#[from] ParseLanguageError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}
