//! 学科分类 - 业务能力层
//!
//! 对单道题目的文本做学科/标签/难度分类。主路径调用 LLM 要求严格
//! JSON 输出；任何传输错误、空响应或解析失败都不向外抛出，静默切换
//! 到本地关键词算法兜底。两条路径产出同一种结果结构。

use futures::future::join_all;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::classification::{ClassificationResult, Difficulty};
use crate::models::subject::Subject;
use crate::services::keyword_classifier::KeywordClassifier;
use crate::services::llm_service::{ChatOptions, LlmService};
use crate::utils::extract_json_object;

/// 分类系统提示词：固定输出 schema，杜绝自由发挥
const CLASSIFICATION_PROMPT: &str = r#"你是教育场景的题目分类助手。阅读用户提供的题目文字，严格输出 JSON：
{
  "category": "数学|语文|英语|物理|化学|生物|历史|地理|政治|计算机/编程|综合",
  "tags": ["知识点1","知识点2"],
  "difficulty": "EASY|MEDIUM|HARD",
  "confidence": 0.0-1.0,
  "reasoning": "简短说明分类原因"
}
只返回 JSON，不要额外描述。"#;

/// LLM 分类响应的形态，字段齐全程度不可靠，逐个兜底
#[derive(Debug, Deserialize)]
struct LlmClassification {
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    difficulty: String,
    #[serde(default = "default_llm_confidence")]
    confidence: f64,
}

fn default_llm_confidence() -> f64 {
    0.9
}

/// 学科分类器
pub struct SubjectClassifier {
    llm: Option<LlmService>,
    fallback: KeywordClassifier,
}

impl SubjectClassifier {
    pub fn new(config: &Config) -> Self {
        let llm = if config.is_llm_configured() {
            Some(LlmService::new(config))
        } else {
            None
        };
        Self {
            llm,
            fallback: KeywordClassifier::new(),
        }
    }

    /// 对题目进行智能分类
    ///
    /// 空白输入立即返回失败结果，不发起任何外部调用。
    pub async fn classify(&self, question_text: &str) -> ClassificationResult {
        if question_text.trim().is_empty() {
            return ClassificationResult::failure("题目内容为空");
        }

        if let Some(llm) = &self.llm {
            info!("开始调用大模型分类...");
            if let Some(result) = self.classify_with_llm(llm, question_text).await {
                return result;
            }
            warn!("大模型分类失败，使用本地关键词算法兜底");
        }

        self.fallback.classify(question_text)
    }

    /// 批量分类一页的所有题目
    ///
    /// 各题并发执行，单题失败不影响其余题目。
    pub async fn classify_batch(&self, question_texts: &[String]) -> Vec<ClassificationResult> {
        join_all(question_texts.iter().map(|text| self.classify(text))).await
    }

    /// 主路径：LLM 分类，任何失败返回 None 交给兜底
    async fn classify_with_llm(
        &self,
        llm: &LlmService,
        question_text: &str,
    ) -> Option<ClassificationResult> {
        let opts = ChatOptions {
            temperature: 0.2,
            max_tokens: 600,
            json_only: true,
        };

        let user_message = format!("题目如下：\n{}", question_text);
        let content = match llm
            .send_to_llm(&user_message, Some(CLASSIFICATION_PROMPT), &opts)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                warn!("分类LLM调用失败: {}", e);
                return None;
            }
        };

        if content.trim().is_empty() {
            warn!("分类LLM返回空内容");
            return None;
        }

        let result = Self::parse_llm_classification(&content);
        if let Some(r) = &result {
            info!(
                "LLM分类成功，类别：{}，难度：{}，置信度：{:.2}",
                r.category,
                r.difficulty.as_str(),
                r.confidence
            );
        }
        result
    }

    /// 解析 LLM 的分类响应并归一化各字段
    fn parse_llm_classification(content: &str) -> Option<ClassificationResult> {
        let json_part = extract_json_object(content)?;
        let payload: LlmClassification = match serde_json::from_str(json_part) {
            Ok(p) => p,
            Err(e) => {
                warn!("分类LLM响应解析失败: {}", e);
                return None;
            }
        };

        let category = Subject::normalize(&payload.category);
        let difficulty = Difficulty::parse(&payload.difficulty);
        let confidence = clamp_llm_confidence(payload.confidence);

        Some(ClassificationResult::ok(
            category,
            payload.tags,
            difficulty,
            confidence,
        ))
    }
}

/// LLM 给出的置信度钳制到 [0.5, 0.99]，NaN 回落到默认值
fn clamp_llm_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return 0.9;
    }
    value.clamp(0.5, 0.99)
}
