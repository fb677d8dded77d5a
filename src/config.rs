use serde::Deserialize;

use crate::error::AppResult;

/// API 未配置时的占位值
///
/// 各组件在发起任何网络调用前必须显式检查 `Config::is_llm_configured`，
/// 未配置时直接走本地降级路径。
pub const NOT_CONFIGURED: &str = "not-configured";

/// 引擎配置
///
/// 启动时构造一次，之后以不可变引用注入到各组件，调用之间不共享可变状态。
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// LLM 请求总超时（秒），视觉/推理类补全可能很慢
    pub llm_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: NOT_CONFIGURED.to_string(),
            llm_api_base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            llm_model_name: "qwen-plus".to_string(),
            llm_timeout_secs: 180,
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件的可选字段，缺省值回落到 `Config::default`
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm_api_key: Option<String>,
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
    llm_timeout_secs: Option<u64>,
    verbose_logging: Option<bool>,
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_file(path: &str) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| crate::error::AppError::file_read_failed(path, e))?;
        let file: ConfigFile = toml::from_str(&raw)?;

        let default = Self::default();
        Ok(Self {
            llm_api_key: file.llm_api_key.unwrap_or(default.llm_api_key),
            llm_api_base_url: file.llm_api_base_url.unwrap_or(default.llm_api_base_url),
            llm_model_name: file.llm_model_name.unwrap_or(default.llm_model_name),
            llm_timeout_secs: file.llm_timeout_secs.unwrap_or(default.llm_timeout_secs),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    /// LLM 是否已配置
    pub fn is_llm_configured(&self) -> bool {
        !self.llm_api_key.is_empty() && self.llm_api_key != NOT_CONFIGURED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_configured() {
        let config = Config::default();
        assert!(!config.is_llm_configured());
    }

    #[test]
    fn test_configured_key() {
        let config = Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        };
        assert!(config.is_llm_configured());
    }

    #[test]
    fn test_from_toml_overlay() {
        let file: ConfigFile = toml::from_str(
            r#"
            llm_api_key = "sk-abc"
            llm_timeout_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(file.llm_api_key.as_deref(), Some("sk-abc"));
        assert_eq!(file.llm_timeout_secs, Some(60));
        assert!(file.llm_model_name.is_none());
    }
}
