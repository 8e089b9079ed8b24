use crate::utils::error::{CheckoutError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CheckoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CheckoutError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CheckoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 站內相對路徑：不可為空、不可有 null byte、不可以 `/` 開頭
pub fn validate_relative_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CheckoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CheckoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    if path.starts_with('/') {
        return Err(CheckoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path must be relative to the site root".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CheckoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CheckoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("site.base_url", "https://example.com/").is_ok());
        assert!(validate_url("site.base_url", "http://localhost:8080/").is_ok());
        assert!(validate_url("site.base_url", "").is_err());
        assert!(validate_url("site.base_url", "invalid-url").is_err());
        assert!(validate_url("site.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_relative_path() {
        assert!(validate_relative_path("fragments.header", "assets/component/header.html").is_ok());
        assert!(validate_relative_path("fragments.header", "").is_err());
        assert!(validate_relative_path("fragments.header", "/etc/passwd").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("checkout.processing_delay_ms", 3000u64, 0, 60_000).is_ok());
        assert!(validate_range("checkout.processing_delay_ms", 90_000u64, 0, 60_000).is_err());
    }
}
