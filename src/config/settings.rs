use crate::utils::error::{BriefError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_endpoint() -> String {
    "https://api.deepseek.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_output_path() -> String {
    "./output".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl Settings {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BriefError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BriefError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DEEPSEEK_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 取得 API 金鑰：優先用配置檔，否則讀環境變數
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api.api_key {
            // 替換失敗時會留下 ${VAR} 原樣，視同缺少金鑰
            if !key.trim().is_empty() && !key.starts_with("${") {
                return Ok(key.clone());
            }
        }

        std::env::var(API_KEY_ENV).map_err(|_| BriefError::MissingConfigError {
            field: format!("api.api_key (or {} environment variable)", API_KEY_ENV),
        })
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.endpoint", &self.api.endpoint)?;
        validation::validate_non_empty_string("api.model", &self.api.model)?;
        validation::validate_range("api.temperature", self.api.temperature, 0.0, 2.0)?;
        validation::validate_positive_number("api.max_tokens", self.api.max_tokens as usize, 1)?;
        validation::validate_positive_number(
            "api.timeout_seconds",
            self.api.timeout_seconds as usize,
            1,
        )?;
        validation::validate_path("output.path", &self.output.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_sections_missing() {
        let settings = Settings::from_toml_str("").unwrap();

        assert_eq!(
            settings.api.endpoint,
            "https://api.deepseek.com/v1/chat/completions"
        );
        assert_eq!(settings.api.model, "deepseek-chat");
        assert_eq!(settings.api.temperature, 0.7);
        assert_eq!(settings.api.max_tokens, 4000);
        assert_eq!(settings.output.path, "./output");
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
endpoint = "http://localhost:9000/v1/chat/completions"
model = "test-model"
api_key = "sk-test"
temperature = 0.2
max_tokens = 512
timeout_seconds = 10

[output]
path = "./artifacts"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();

        assert_eq!(settings.api.model, "test-model");
        assert_eq!(settings.api.temperature, 0.2);
        assert_eq!(settings.api.max_tokens, 512);
        assert_eq!(settings.output.path, "./artifacts");
        assert_eq!(settings.resolve_api_key().unwrap(), "sk-test");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BRIEFCRAFT_TEST_ENDPOINT", "https://test.api.com/v1");

        let toml_content = r#"
[api]
endpoint = "${BRIEFCRAFT_TEST_ENDPOINT}"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.api.endpoint, "https://test.api.com/v1");

        std::env::remove_var("BRIEFCRAFT_TEST_ENDPOINT");
    }

    #[test]
    fn test_unresolved_env_var_counts_as_missing_key() {
        let toml_content = r#"
[api]
api_key = "${BRIEFCRAFT_TEST_NO_SUCH_VAR}"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        std::env::remove_var(API_KEY_ENV);
        assert!(settings.resolve_api_key().is_err());
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let bad_endpoint = Settings::from_toml_str("[api]\nendpoint = \"not-a-url\"").unwrap();
        assert!(bad_endpoint.validate().is_err());

        let bad_temperature = Settings::from_toml_str("[api]\ntemperature = 3.5").unwrap();
        assert!(bad_temperature.validate().is_err());

        let bad_tokens = Settings::from_toml_str("[api]\nmax_tokens = 0").unwrap();
        assert!(bad_tokens.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[api]
model = "file-model"

[output]
path = "./from-file"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.api.model, "file-model");
        assert_eq!(settings.output.path, "./from-file");
    }
}
