use nova_fcm_shared::FCMError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("profile store error: {0}")]
    ProfileStore(String),

    #[error("event source error: {0}")]
    EventSource(String),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("fcm error: {0}")]
    Fcm(#[from] FCMError),
}

/// Failures that escape a single dispatch invocation.
///
/// Everything else (no recipient, no profile, no token, rejected send) is a
/// normal outcome, not an error.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("sender profile not found for {sender_id:?}")]
    SenderProfileMissing { sender_id: Option<String> },

    #[error(transparent)]
    App(#[from] AppError),
}
