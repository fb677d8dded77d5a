//! 置信度与难度评分 - 业务能力层
//!
//! 从题目文本的复杂度特征推导识别置信度和疑难标记。评分是启发式的：
//! 文本越长、数学符号越密集，OCR 越可能出错，置信度相应下调。

use std::sync::Mutex;

use rand::{rngs::SmallRng, Rng, SeedableRng};

/// 判定疑难题目的关键词
const HARD_KEYWORDS: [&str; 7] = ["函数", "证明", "求证", "区间", "最值", "导数", "积分"];

/// 复杂数学符号，命中任意一个即视为疑难
const COMPLEX_SYMBOLS: [&str; 6] = ["²", "³", "∞", "∑", "∫", "∂"];

/// 置信度评分器
///
/// 抖动使用可注入种子的随机源，保证测试可以得到确定的结果；
/// 题目内容与顺序不受抖动影响。
pub struct ConfidenceScorer {
    rng: Mutex<SmallRng>,
}

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// 使用固定种子构造，测试用
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    /// 同时计算置信度和疑难标记
    pub fn score(&self, content: &str) -> (f64, bool) {
        (self.confidence(content), Self::assess_difficulty(content))
    }

    /// 根据题目复杂度计算置信度
    ///
    /// 基线 0.85，长文本和数学符号逐项扣减，叠加对称抖动后钳制在
    /// `[0.70, 0.95]`。
    pub fn confidence(&self, content: &str) -> f64 {
        let mut base: f64 = 0.85;
        let char_count = content.chars().count();

        // 题目越长，OCR 识别可能越不准确（两档扣减不叠加）
        if char_count > 100 {
            base -= 0.10;
        } else if char_count > 60 {
            base -= 0.05;
        }

        // 包含数学符号降低置信度
        if content.contains('∞')
            || content.contains('²')
            || content.contains('₁')
            || content.contains('₂')
        {
            base -= 0.03;
        }

        // 包含函数表示
        if content.contains("f(x)") || content.contains("g(x)") {
            base -= 0.02;
        }

        let jitter = self
            .rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .gen_range(-0.02..0.02);

        (base + jitter).clamp(0.70, 0.95)
    }

    /// 评估题目难度
    ///
    /// 关键词、复杂符号、长度三类信号任意一个命中即判为疑难（逻辑或）。
    pub fn assess_difficulty(content: &str) -> bool {
        if HARD_KEYWORDS.iter().any(|kw| content.contains(kw)) {
            return true;
        }
        if COMPLEX_SYMBOLS.iter().any(|sym| content.contains(sym)) {
            return true;
        }
        content.chars().count() > 80
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_in_range() {
        let scorer = ConfidenceScorer::with_seed(42);
        for content in ["", "短题目", &"长".repeat(150), "f(x) = x² + 1"] {
            let confidence = scorer.confidence(content);
            assert!(
                (0.70..=0.95).contains(&confidence),
                "置信度 {} 超出范围",
                confidence
            );
        }
    }

    #[test]
    fn test_confidence_deterministic_with_seed() {
        let content = "求解方程 2x+3=7";
        let a = ConfidenceScorer::with_seed(7).confidence(content);
        let b = ConfidenceScorer::with_seed(7).confidence(content);
        assert_eq!(a, b);
    }

    #[test]
    fn test_long_content_penalty() {
        // 同种子首次抽样的抖动相同，差值即为长度扣减
        let short = ConfidenceScorer::with_seed(1).confidence("短");
        let medium = ConfidenceScorer::with_seed(1).confidence(&"a".repeat(70));
        let long = ConfidenceScorer::with_seed(1).confidence(&"a".repeat(150));
        assert!((short - medium - 0.05).abs() < 1e-9);
        assert!((short - long - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_math_symbol_penalty() {
        let plain = ConfidenceScorer::with_seed(3).confidence("普通题目");
        let symbolic = ConfidenceScorer::with_seed(3).confidence("含 ² 的题目");
        assert!((plain - symbolic - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_difficulty_by_keyword() {
        assert!(ConfidenceScorer::assess_difficulty("求证：三角形内角和为180度"));
        assert!(ConfidenceScorer::assess_difficulty("已知函数在区间上单调"));
    }

    #[test]
    fn test_difficulty_by_symbol() {
        assert!(ConfidenceScorer::assess_difficulty("计算 x² 的值"));
        assert!(ConfidenceScorer::assess_difficulty("∫f(t)dt"));
    }

    #[test]
    fn test_difficulty_by_length() {
        assert!(ConfidenceScorer::assess_difficulty(&"字".repeat(81)));
        assert!(!ConfidenceScorer::assess_difficulty("简单算术"));
    }
}
