/// 日志工具模块
///
/// 提供日志初始化和文本截断的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// 日志级别通过 `RUST_LOG` 环境变量控制，默认 `info`
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}

/// 记录引擎启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 题目分割与分类引擎启动");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    if config.is_llm_configured() {
        info!("🤖 LLM 模型: {}", config.llm_model_name);
    } else {
        info!("⚠️ LLM 未配置，仅使用本地降级策略");
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text() {
        assert_eq!(truncate_text("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_long_text() {
        let text = "一二三四五六七八";
        let truncated = truncate_text(text, 5);
        assert_eq!(truncated, "一二三四五...");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate_text("abcde", 5), "abcde");
    }
}
