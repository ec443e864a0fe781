use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_secret, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/1.1";
pub const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub twitter: Option<TwitterConfig>,
    pub links: Option<LinksConfig>,
    pub ocr: Option<OcrConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

/// Twitter API 設定。四個憑證都必填，沒有預設值。
#[derive(Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    pub api_key: String,
    pub secret_key: String,
    pub access_token: String,
    pub access_token_secret: String,
    pub screen_name: String,
    pub api_base: Option<String>,
    pub page_size: Option<u32>,
    pub include_retweets: Option<bool>,
    pub request_timeout_seconds: Option<u64>,
    pub rate_limit_fallback_seconds: Option<u64>,
    pub rate_limit_buffer_seconds: Option<u64>,
}

/// The four OAuth 1.0a values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub secret_key: String,
    pub access_token: String,
    pub access_token_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    pub output_path: String,
    pub header: Option<String>,
    pub write_header: Option<bool>,
    pub media_field: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    pub input_path: String,
    pub column: Option<usize>,
    pub output_path: String,
    pub header: Option<String>,
    pub write_header: Option<bool>,
    pub tesseract_path: Option<String>,
    pub language: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub progress: Option<bool>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TWITTER_API_KEY})；找不到的保持原樣，之後由驗證攔下
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn twitter(&self) -> Result<&TwitterConfig> {
        self.twitter.as_ref().ok_or_else(|| EtlError::MissingConfigError {
            field: "twitter".to_string(),
        })
    }

    pub fn links(&self) -> Result<&LinksConfig> {
        self.links.as_ref().ok_or_else(|| EtlError::MissingConfigError {
            field: "links".to_string(),
        })
    }

    pub fn ocr(&self) -> Result<&OcrConfig> {
        self.ocr.as_ref().ok_or_else(|| EtlError::MissingConfigError {
            field: "ocr".to_string(),
        })
    }

    /// Checks only what the link extraction job needs.
    pub fn validate_links_job(&self) -> Result<()> {
        self.twitter()?.validate()?;
        self.links()?.validate()
    }

    /// Checks only what the OCR job needs.
    pub fn validate_ocr_job(&self) -> Result<()> {
        self.ocr()?.validate()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn progress_enabled(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.progress)
            .unwrap_or(true)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        if self.twitter.is_none() && self.links.is_none() && self.ocr.is_none() {
            return Err(EtlError::ConfigError {
                message: "configuration defines neither a [links] nor an [ocr] job".to_string(),
            });
        }
        if let Some(twitter) = &self.twitter {
            twitter.validate()?;
        }
        if let Some(links) = &self.links {
            links.validate()?;
        }
        if let Some(ocr) = &self.ocr {
            ocr.validate()?;
        }
        Ok(())
    }
}

impl TwitterConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key: self.api_key.clone(),
            secret_key: self.secret_key.clone(),
            access_token: self.access_token.clone(),
            access_token_secret: self.access_token_secret.clone(),
        }
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(MAX_PAGE_SIZE)
    }

    pub fn include_retweets(&self) -> bool {
        self.include_retweets.unwrap_or(true)
    }

    pub fn request_timeout_seconds(&self) -> u64 {
        self.request_timeout_seconds.unwrap_or(30)
    }

    pub fn rate_limit_fallback(&self) -> Duration {
        Duration::from_secs(self.rate_limit_fallback_seconds.unwrap_or(15 * 60))
    }

    pub fn rate_limit_buffer(&self) -> Duration {
        Duration::from_secs(self.rate_limit_buffer_seconds.unwrap_or(1))
    }
}

impl Validate for TwitterConfig {
    fn validate(&self) -> Result<()> {
        validate_secret("twitter.api_key", &self.api_key)?;
        validate_secret("twitter.secret_key", &self.secret_key)?;
        validate_secret("twitter.access_token", &self.access_token)?;
        validate_secret("twitter.access_token_secret", &self.access_token_secret)?;
        validate_non_empty_string("twitter.screen_name", &self.screen_name)?;
        validate_url("twitter.api_base", self.api_base())?;
        validate_range("twitter.page_size", self.page_size(), 1, MAX_PAGE_SIZE)?;
        validate_range(
            "twitter.request_timeout_seconds",
            self.request_timeout_seconds(),
            1,
            600,
        )?;
        Ok(())
    }
}

// 避免憑證出現在 debug log
impl std::fmt::Debug for TwitterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterConfig")
            .field("credentials", &self.credentials())
            .field("screen_name", &self.screen_name)
            .field("api_base", &self.api_base())
            .field("page_size", &self.page_size())
            .field("include_retweets", &self.include_retweets())
            .finish()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl LinksConfig {
    pub fn header(&self) -> Option<String> {
        header_or_default(self.write_header, self.header.as_deref(), "media_url")
    }

    pub fn media_field(&self) -> &str {
        self.media_field
            .as_deref()
            .unwrap_or(crate::adapters::twitter::media::DEFAULT_MEDIA_FIELD)
    }
}

impl Validate for LinksConfig {
    fn validate(&self) -> Result<()> {
        validate_path("links.output_path", &self.output_path)?;
        validate_non_empty_string("links.media_field", self.media_field())
    }
}

impl OcrConfig {
    pub fn header(&self) -> Option<String> {
        header_or_default(self.write_header, self.header.as_deref(), "text")
    }

    pub fn column(&self) -> usize {
        self.column.unwrap_or(0)
    }

    pub fn tesseract_path(&self) -> &str {
        self.tesseract_path.as_deref().unwrap_or("tesseract")
    }

    pub fn request_timeout_seconds(&self) -> u64 {
        self.request_timeout_seconds.unwrap_or(30)
    }
}

impl Validate for OcrConfig {
    fn validate(&self) -> Result<()> {
        validate_path("ocr.input_path", &self.input_path)?;
        validate_path("ocr.output_path", &self.output_path)?;
        validate_non_empty_string("ocr.tesseract_path", self.tesseract_path())?;
        validate_range(
            "ocr.request_timeout_seconds",
            self.request_timeout_seconds(),
            1,
            600,
        )?;
        if self.input_path == self.output_path {
            return Err(EtlError::InvalidConfigValueError {
                field: "ocr.output_path".to_string(),
                value: self.output_path.clone(),
                reason: "output would overwrite the input file".to_string(),
            });
        }
        Ok(())
    }
}

fn header_or_default(write: Option<bool>, header: Option<&str>, default: &str) -> Option<String> {
    if write.unwrap_or(true) {
        Some(header.unwrap_or(default).to_string())
    } else {
        None
    }
}
