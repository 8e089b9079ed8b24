use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Fragment '{url}' could not be loaded (status {status})")]
    FragmentStatusError { url: String, status: u16 },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Form fixture error: {message}")]
    FormError { message: String },
}

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CheckoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CheckoutError::HttpError(_) | CheckoutError::FragmentStatusError { .. } => {
                ErrorCategory::Network
            }
            CheckoutError::UrlError(_)
            | CheckoutError::ConfigValidationError { .. }
            | CheckoutError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            CheckoutError::SerializationError(_) | CheckoutError::FormError { .. } => {
                ErrorCategory::Data
            }
            CheckoutError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 頁首/頁尾載入失敗只是畫面缺角
            CheckoutError::FragmentStatusError { .. } => ErrorSeverity::Low,
            CheckoutError::HttpError(_) => ErrorSeverity::Medium,
            CheckoutError::SerializationError(_) | CheckoutError::FormError { .. } => {
                ErrorSeverity::High
            }
            CheckoutError::UrlError(_)
            | CheckoutError::ConfigValidationError { .. }
            | CheckoutError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            CheckoutError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CheckoutError::HttpError(_) => {
                "Check that the site base URL is reachable and try again".to_string()
            }
            CheckoutError::FragmentStatusError { url, .. } => {
                format!("Make sure the fragment exists at {}", url)
            }
            CheckoutError::UrlError(_) => {
                "Use an absolute http(s) URL ending with '/' for the site base URL".to_string()
            }
            CheckoutError::ConfigValidationError { field, .. }
            | CheckoutError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' entry in the site configuration", field)
            }
            CheckoutError::SerializationError(_) => {
                "Check that the features parameter is a JSON array".to_string()
            }
            CheckoutError::FormError { .. } => {
                "Check the form fixture file for typos or missing fields".to_string()
            }
            CheckoutError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not load page content: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Invalid input data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
