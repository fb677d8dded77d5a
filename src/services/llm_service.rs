//! LLM 服务 - 业务能力层
//!
//! 只负责"调用一次补全"这一能力，不关心提示词语义
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 DashScope, Azure, Doubao 等）

use std::time::Duration;

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;

/// 单次补全的调用参数
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// 要求模型以 JSON 对象格式输出（response_format=json_object）
    pub json_only: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
            json_only: false,
        }
    }
}

/// LLM 服务
///
/// 职责：
/// - 调用兼容 OpenAI 协议的补全接口
/// - 用配置的超时约束每次往返，绝不无限阻塞
/// - 不关心提示词内容，也不解析响应语义
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    timeout_secs: u64,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            timeout_secs: config.llm_timeout_secs,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `opts`: 温度、输出上限等调用参数
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        opts: &ChatOptions,
    ) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 添加用户消息
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.model_name)
            .messages(messages)
            .temperature(opts.temperature)
            .max_tokens(opts.max_tokens);
        if opts.json_only {
            request_builder.response_format(ResponseFormat::JsonObject);
        }
        let request = request_builder.build()?;

        // 调用 API，整个往返受超时约束
        let response = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.client.chat().create(request),
        )
        .await
        .map_err(|_| {
            warn!(
                "LLM API 请求超时 (模型: {}, 超时: {}秒)",
                self.model_name, self.timeout_secs
            );
            anyhow::anyhow!("LLM API 请求超时 ({}秒)", self.timeout_secs)
        })?
        .map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_options_default() {
        let opts = ChatOptions::default();
        assert!((opts.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 1024);
        assert!(!opts.json_only);
    }

    /// 测试通用 LLM 调用
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=sk-xxx cargo test test_send_to_llm_simple -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_send_to_llm_simple() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        assert!(config.is_llm_configured(), "需要配置 LLM_API_KEY");

        let service = LlmService::new(&config);
        let result = service
            .send_to_llm(
                "你好，请用一句话介绍你自己",
                Some("你是一个简洁的助手，回答要简短。"),
                &ChatOptions::default(),
            )
            .await;

        match result {
            Ok(response) => {
                println!("\n========== LLM 响应 ==========");
                println!("{}", response);
                println!("==============================\n");
                assert!(!response.is_empty());
            }
            Err(e) => {
                panic!("LLM 调用失败: {}", e);
            }
        }
    }
}
