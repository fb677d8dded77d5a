//! 上游识别协作方的接口类型
//!
//! 引擎不直接接触图像：视觉/OCR 协作方产出识别文本，可选地附带它
//! 自己已经完成的结构化分割。这里定义两者的数据形态，以及从视觉
//! 模型富 JSON 输出解析结构化元素的防御性解析器。

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::question::Bounds;
use crate::utils::extract_json_object;

/// 识别页结果
///
/// `success=false` 时 `error` 携带简短的人类可读原因，引擎不再做任何处理。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedPage {
    pub success: bool,
    /// 识别出的全文（UTF-8，可能包含换行和中英混排）
    pub text: String,
    /// 上游识别置信度
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 上游已完成的结构化分割（可为空）
    #[serde(default)]
    pub elements: Vec<RecognizedElement>,
}

impl RecognizedPage {
    pub fn ok(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            success: true,
            text: text.into(),
            confidence,
            error: None,
            elements: Vec::new(),
        }
    }

    pub fn with_elements(mut self, elements: Vec<RecognizedElement>) -> Self {
        self.elements = elements;
        self
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            text: String::new(),
            confidence: 0.0,
            error: Some(error.into()),
            elements: Vec::new(),
        }
    }
}

/// 上游识别出的单个结构化元素
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedElement {
    pub id: u32,
    pub content: String,
    /// 题目类型（选择题、填空题等），上游未给出时为"未知"
    pub element_type: String,
    /// 上游给出的学科猜测，未给出时为"未分类"
    pub subject: String,
    pub confidence: f64,
    /// 上游给出的位置，缺失时由引擎合成
    pub bounds: Option<Bounds>,
}

/// 从视觉模型的 JSON 输出解析结构化元素
///
/// 期望的形态是 `{"questions":[{id, content, type, subject, confidence,
/// bounds:{top,left,width,height}}]}`，bounds 为 0-1 比例坐标。模型输出
/// 可能缺字段或裹着说明文字，按字段逐个兜底：
/// - id 缺失 → 序号+1；type →"未知"；subject →"未分类"；confidence → 0.8
/// - bounds 整体缺失 → None；单字段缺失 → top=i/n、left=0、width=1、height=1/n
/// - content 为空的元素直接丢弃
///
/// 任何解析失败都返回空列表，不向外抛错。
pub fn parse_recognized_elements(response: &str) -> Vec<RecognizedElement> {
    let mut elements = Vec::new();

    let Some(json_part) = extract_json_object(response) else {
        warn!("无法从响应中提取JSON格式的题目信息");
        return elements;
    };

    let root: serde_json::Value = match serde_json::from_str(json_part) {
        Ok(v) => v,
        Err(e) => {
            warn!("解析题目分割响应失败: {}", e);
            return elements;
        }
    };

    let Some(questions) = root.get("questions").and_then(|q| q.as_array()) else {
        return elements;
    };

    let total = questions.len().max(1);
    for (i, item) in questions.iter().enumerate() {
        let id = item
            .get("id")
            .and_then(|v| v.as_u64())
            .unwrap_or(i as u64 + 1) as u32;
        let content = item
            .get("content")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        let element_type = item
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("未知")
            .to_string();
        let subject = item
            .get("subject")
            .and_then(|v| v.as_str())
            .unwrap_or("未分类")
            .to_string();
        let confidence = item.get("confidence").and_then(|v| v.as_f64()).unwrap_or(0.8);

        let bounds = item.get("bounds").and_then(|b| b.as_object()).map(|b| {
            let field = |name: &str| b.get(name).and_then(|v| v.as_f64());
            Bounds::from_unit(
                field("top").unwrap_or(i as f64 / total as f64),
                field("left").unwrap_or(0.0),
                field("width").unwrap_or(1.0),
                field("height").unwrap_or(1.0 / total as f64),
            )
        });

        if content.is_empty() {
            continue;
        }

        elements.push(RecognizedElement {
            id,
            content,
            element_type,
            subject,
            confidence,
            bounds,
        });
    }

    elements
}
