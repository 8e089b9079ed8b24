use crate::core::checkout::CheckoutSettings;
use crate::core::fragment::{FragmentSpec, LinkRewriter};
use crate::utils::error::{CheckoutError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_relative_path, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteInfo,
    pub fragments: Option<FragmentsConfig>,
    pub checkout: Option<CheckoutConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    pub name: String,
    /// 網站根目錄，片段以此為基準解析
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FragmentsConfig {
    pub header: Option<String>,
    pub footer: Option<String>,
    pub header_container: Option<String>,
    pub footer_container: Option<String>,
    /// 子目錄頁面所在位置，例如 `assets/pages/`
    pub nested_dir: Option<String>,
    /// 從子目錄頁面回到根目錄的前綴
    pub root_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutConfig {
    pub processing_delay_ms: Option<u64>,
    pub error_clear_ms: Option<u64>,
    pub redirect_delay_ms: Option<u64>,
    pub services_page: Option<String>,
    pub checkout_page: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteInfo {
                name: "Elite Fitness".to_string(),
                base_url: "http://localhost:8080/".to_string(),
            },
            fragments: None,
            checkout: None,
        }
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CheckoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CheckoutError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SITE_BASE_URL})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

        ENV_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    fn fragments(&self) -> FragmentsConfig {
        self.fragments.clone().unwrap_or_default()
    }

    fn checkout(&self) -> CheckoutConfig {
        self.checkout.clone().unwrap_or_default()
    }

    pub fn base_url(&self) -> &str {
        &self.site.base_url
    }

    pub fn header_spec(&self) -> FragmentSpec {
        let fragments = self.fragments();
        FragmentSpec::new(
            fragments.header.as_deref().unwrap_or("assets/component/header.html"),
            fragments.header_container.as_deref().unwrap_or("site-header"),
        )
    }

    pub fn footer_spec(&self) -> FragmentSpec {
        let fragments = self.fragments();
        FragmentSpec::new(
            fragments.footer.as_deref().unwrap_or("assets/component/footer.html"),
            fragments.footer_container.as_deref().unwrap_or("site-footer"),
        )
    }

    pub fn nested_dir(&self) -> String {
        self.fragments()
            .nested_dir
            .unwrap_or_else(|| "assets/pages/".to_string())
    }

    pub fn link_rewriter(&self) -> LinkRewriter {
        let root_prefix = self
            .fragments()
            .root_prefix
            .unwrap_or_else(|| "../../".to_string());
        LinkRewriter::new(&self.nested_dir(), &root_prefix)
    }

    pub fn checkout_page(&self) -> String {
        self.checkout()
            .checkout_page
            .unwrap_or_else(|| "checkout.html".to_string())
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        let checkout = self.checkout();
        let defaults = CheckoutSettings::default();
        let ms = |value: Option<u64>, default: Duration| value.map(Duration::from_millis).unwrap_or(default);

        CheckoutSettings {
            processing_delay: ms(checkout.processing_delay_ms, defaults.processing_delay),
            error_clear_delay: ms(checkout.error_clear_ms, defaults.error_clear_delay),
            redirect_delay: ms(checkout.redirect_delay_ms, defaults.redirect_delay),
            services_page: checkout.services_page.unwrap_or(defaults.services_page),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("site.name", &self.site.name)?;
        validate_url("site.base_url", &self.site.base_url)?;

        let header = self.header_spec();
        let footer = self.footer_spec();
        validate_relative_path("fragments.header", &header.path)?;
        validate_relative_path("fragments.footer", &footer.path)?;
        if header.container == footer.container {
            return Err(CheckoutError::InvalidConfigValueError {
                field: "fragments.footer_container".to_string(),
                value: footer.container,
                reason: "Header and footer must target different containers".to_string(),
            });
        }

        let nested_dir = self.nested_dir();
        validate_relative_path("fragments.nested_dir", &nested_dir)?;
        if !nested_dir.ends_with('/') {
            return Err(CheckoutError::InvalidConfigValueError {
                field: "fragments.nested_dir".to_string(),
                value: nested_dir,
                reason: "Directory must end with '/'".to_string(),
            });
        }

        let checkout = self.checkout();
        for (field, value) in [
            ("checkout.processing_delay_ms", checkout.processing_delay_ms),
            ("checkout.error_clear_ms", checkout.error_clear_ms),
            ("checkout.redirect_delay_ms", checkout.redirect_delay_ms),
        ] {
            if let Some(value) = value {
                validate_range(field, value, 0, MAX_DELAY_MS)?;
            }
        }

        validate_relative_path("checkout.services_page", &self.checkout_settings().services_page)?;
        validate_relative_path("checkout.checkout_page", &self.checkout_page())?;

        Ok(())
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[site]
name = "Elite Fitness"
base_url = "https://elite.example.com/"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.header_spec().container, "site-header");
        assert_eq!(config.footer_spec().path, "assets/component/footer.html");
        assert_eq!(config.checkout_settings(), CheckoutSettings::default());
        assert_eq!(config.checkout_page(), "checkout.html");
    }

    #[test]
    fn test_checkout_delays_override_defaults() {
        let toml_content = r#"
[site]
name = "Elite Fitness"
base_url = "https://elite.example.com/"

[checkout]
processing_delay_ms = 0
redirect_delay_ms = 250
services_page = "pages/services.html"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        let settings = config.checkout_settings();

        assert_eq!(settings.processing_delay, Duration::ZERO);
        assert_eq!(settings.redirect_delay, Duration::from_millis(250));
        assert_eq!(settings.error_clear_delay, Duration::from_millis(3000));
        assert_eq!(settings.services_page, "pages/services.html");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ELITE_TEST_BASE_URL", "https://staging.elite.example.com/");

        let toml_content = r#"
[site]
name = "Elite Fitness"
base_url = "${ELITE_TEST_BASE_URL}"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_url(), "https://staging.elite.example.com/");

        std::env::remove_var("ELITE_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = r#"
[site]
name = "Elite Fitness"
base_url = "not a url"
"#;
        assert!(SiteConfig::from_toml_str(invalid_url).unwrap().validate().is_err());

        let same_container = r#"
[site]
name = "Elite Fitness"
base_url = "https://elite.example.com/"

[fragments]
header_container = "chrome"
footer_container = "chrome"
"#;
        assert!(SiteConfig::from_toml_str(same_container).unwrap().validate().is_err());

        let slow = r#"
[site]
name = "Elite Fitness"
base_url = "https://elite.example.com/"

[checkout]
processing_delay_ms = 120000
"#;
        assert!(SiteConfig::from_toml_str(slow).unwrap().validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[site]
name = "File Site"
base_url = "https://elite.example.com/"

[fragments]
nested_dir = "pages/"
root_prefix = "../"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = SiteConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.site.name, "File Site");
        assert!(config.link_rewriter().is_nested_page("/pages/checkout.html"));
    }
}
