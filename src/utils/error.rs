use thiserror::Error;

/// 致命錯誤：任何一個都會中止整個執行，不會寫出任何輸出檔
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Source enumeration failed: {message}")]
    EnumerationError { message: String },

    #[error("Authentication rejected by {endpoint} (HTTP {status})")]
    AuthenticationError { endpoint: String, status: u16 },

    #[error("Failed to write output to {path}: {message}")]
    SinkWriteError { path: String, message: String },

    #[error("OCR engine error: {message}")]
    OcrError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Source,
    Output,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::AuthenticationError { .. } => ErrorCategory::Authentication,
            EtlError::EnumerationError { .. } | EtlError::CsvError(_) => ErrorCategory::Source,
            EtlError::SinkWriteError { .. } | EtlError::IoError(_) => ErrorCategory::Output,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::SerializationError(_)
            | EtlError::OcrError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路問題通常重試就好
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Source | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Authentication
            | ErrorCategory::Output
            | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(_) => "Could not reach the remote service".to_string(),
            EtlError::AuthenticationError { .. } => {
                "The API rejected the configured credentials".to_string()
            }
            EtlError::EnumerationError { message } => {
                format!("Could not read the input records: {}", message)
            }
            EtlError::SinkWriteError { path, .. } => {
                format!("Could not write the output file '{}'", path)
            }
            EtlError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the network connection and run the job again",
            ErrorCategory::Authentication => {
                "Verify api_key, secret_key, access_token and access_token_secret"
            }
            ErrorCategory::Source => "Check that the input source exists and is well formed",
            ErrorCategory::Output => {
                "Make sure the output directory exists and is writable"
            }
            ErrorCategory::Configuration => "Fix the configuration file and try again",
            ErrorCategory::Processing => "Run with --verbose to inspect the failing step",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_errors_are_critical() {
        let err = EtlError::SinkWriteError {
            path: "missing/out.csv".to_string(),
            message: "No such file or directory".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Output);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("missing/out.csv"));
    }

    #[test]
    fn test_enumeration_errors_are_source_errors() {
        let err = EtlError::EnumerationError {
            message: "HTTP 500".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Source);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_missing_config_message_names_field() {
        let err = EtlError::MissingConfigError {
            field: "twitter.api_key".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Configuration value 'twitter.api_key' is required"
        );
    }
}
