use super::types::PhishGuardError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl PhishGuardError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Retryable errors
            PhishGuardError::RateLimit(_) => ErrorClassification {
                error_type: "RateLimitError",
                retryable: true,
            },
            PhishGuardError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            PhishGuardError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                retryable: true,
            },
            PhishGuardError::SignalApi(_) => ErrorClassification {
                error_type: "SignalApiError",
                retryable: true,
            },
            PhishGuardError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: true,
            },

            // Non-retryable errors
            PhishGuardError::Credential(_) => ErrorClassification {
                error_type: "CredentialError",
                retryable: false,
            },
            PhishGuardError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            PhishGuardError::InvalidSubject(_) => ErrorClassification {
                error_type: "InvalidSubjectError",
                retryable: false,
            },
            PhishGuardError::Database(_) => ErrorClassification {
                error_type: "DatabaseError",
                retryable: false,
            },
            PhishGuardError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            PhishGuardError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            PhishGuardError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: false,
            },
        }
    }
}
