//! Remote authentication error types.

use std::fmt;

use fg_storage::StorageError;
use fg_translation::TranslationError;

/// Remote authentication errors.
///
/// Policy denials and unknown principals are outcomes, not errors; see
/// [`crate::RemoteAuthenticationResult`].
#[derive(Debug)]
pub enum AuthError {
    /// The configured translation profile does not exist.
    ProfileNotFound(String),
    /// A translation profile is invalid.
    Configuration(String),
    /// The principal was not mapped to any local identity.
    NotMapped,
    /// The local store failed.
    Store(StorageError),
    /// Internal error.
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileNotFound(name) => {
                write!(f, "the translation profile '{name}' does not exist")
            }
            Self::Configuration(msg) => write!(f, "translation profile configuration error: {msg}"),
            Self::NotMapped => write!(
                f,
                "the remotely authenticated principal was not mapped to a local representation"
            ),
            Self::Store(e) => write!(f, "local identity store error: {e}"),
            Self::Internal(msg) => write!(f, "internal remote authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(e: StorageError) -> Self {
        Self::Store(e)
    }
}

impl From<TranslationError> for AuthError {
    fn from(e: TranslationError) -> Self {
        match e {
            TranslationError::Configuration(msg) | TranslationError::Expression(msg) => {
                Self::Configuration(msg)
            }
            TranslationError::Storage(e) => Self::Store(e),
            TranslationError::ExecutionBreak(reason) => {
                Self::Internal(format!("unhandled policy violation: {reason}"))
            }
        }
    }
}

/// Result type for remote authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AuthError::ProfileNotFound("ldap".to_string());
        assert_eq!(err.to_string(), "the translation profile 'ldap' does not exist");
        assert!(AuthError::NotMapped.to_string().contains("not mapped"));
    }

    #[test]
    fn translation_errors_convert() {
        let err: AuthError = TranslationError::expression("bad token").into();
        assert!(matches!(err, AuthError::Configuration(ref m) if m == "bad token"));

        let err: AuthError = TranslationError::Storage(StorageError::not_found("Entity", "x")).into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
