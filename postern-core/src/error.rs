use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Too many attempts, please retry later")]
    RateLimited,

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Email not verified")]
    EmailNotVerified,

    #[error("Captcha verification rejected")]
    CaptchaRejected,

    #[error("Provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field too long: {0}")]
    FieldTooLong(String),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Relay rejected the message: {0}")]
    Rejected(String),
}

impl Error {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited)
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::Auth(AuthError::InvalidCredentials) | Error::Auth(AuthError::UserAlreadyExists)
        )
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    /// Message suitable for user-facing feedback. External collaborator
    /// failures only need to surface their message strings.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let rate_limited = Error::RateLimited;
        assert_eq!(
            rate_limited.to_string(),
            "Too many attempts, please retry later"
        );

        let validation_error =
            Error::Validation(ValidationError::InvalidEmail("test@".to_string()));
        assert_eq!(
            validation_error.to_string(),
            "Validation error: Invalid email format: test@"
        );

        let storage_error = Error::Storage(StorageError::QuotaExceeded);
        assert_eq!(storage_error.to_string(), "Storage error: Storage quota exceeded");
    }

    #[test]
    fn test_is_rate_limited() {
        assert!(Error::RateLimited.is_rate_limited());
        assert!(!Error::Auth(AuthError::InvalidCredentials).is_rate_limited());
    }

    #[test]
    fn test_is_auth_error() {
        assert!(Error::Auth(AuthError::InvalidCredentials).is_auth_error());
        assert!(Error::Auth(AuthError::UserAlreadyExists).is_auth_error());
        assert!(!Error::Auth(AuthError::EmailNotVerified).is_auth_error());
        assert!(!Error::RateLimited.is_auth_error());
    }

    #[test]
    fn test_is_validation_error() {
        assert!(
            Error::Validation(ValidationError::MissingField("name".to_string()))
                .is_validation_error()
        );
        assert!(!Error::Storage(StorageError::QuotaExceeded).is_validation_error());
    }

    #[test]
    fn test_error_from_conversions() {
        let auth_error = AuthError::InvalidCredentials;
        let error: Error = auth_error.into();
        assert!(matches!(error, Error::Auth(AuthError::InvalidCredentials)));

        let relay_error = RelayError::Delivery("connection reset".to_string());
        let error: Error = relay_error.into();
        assert!(matches!(error, Error::Relay(RelayError::Delivery(_))));
    }
}
