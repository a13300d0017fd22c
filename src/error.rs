use thiserror::Error;

/// Failure taxonomy for the console operations. `Backend` covers transport
/// failures and any hosted-backend response that has no more specific
/// mapping; the message is safe to show to the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("not authorized")]
    NotAuthorized,
    #[error("cannot delete your own account")]
    SelfDeletionForbidden,
    #[error("phone number must be between 8 and 15 digits after normalization")]
    InvalidPhoneNumber,
    #[error("an account with this phone number already exists")]
    DuplicateIdentity,
    #[error("user not found")]
    UserNotFound,
    #[error("failed to insert user profile: {0}")]
    ProfileInsert(String),
    #[error("failed to insert participant record: {0}")]
    DetailInsert(String),
    #[error("backend unavailable: {0}")]
    Backend(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Backend(err.to_string())
    }
}
