use serde::{Deserialize, Serialize};

use crate::models::subject::Subject;

/// 难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// 大小写不敏感地解析难度字符串，无法识别时默认 `Medium`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "EASY" => Difficulty::Easy,
            "HARD" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

/// 分类结果
///
/// 主路径（LLM）和兜底路径（关键词算法）产出同一种结构，调用方只能
/// 通过 `error` 字段区分失败。
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub success: bool,
    pub category: Subject,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassificationResult {
    pub fn ok(category: Subject, tags: Vec<String>, difficulty: Difficulty, confidence: f64) -> Self {
        Self {
            success: true,
            category,
            tags,
            difficulty,
            confidence,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            category: Subject::General,
            tags: Vec::new(),
            difficulty: Difficulty::Medium,
            confidence: 0.0,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_difficulty_case_insensitive() {
        assert_eq!(Difficulty::parse("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::parse("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::parse(" Medium "), Difficulty::Medium);
    }

    #[test]
    fn test_parse_difficulty_unknown_defaults_to_medium() {
        assert_eq!(Difficulty::parse("very hard"), Difficulty::Medium);
        assert_eq!(Difficulty::parse(""), Difficulty::Medium);
    }

    #[test]
    fn test_failure_carries_error() {
        let result = ClassificationResult::failure("题目内容为空");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("题目内容为空"));
        assert_eq!(result.confidence, 0.0);
    }
}
