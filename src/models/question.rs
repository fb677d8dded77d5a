use serde::{Deserialize, Serialize};

/// 分割策略标签
///
/// 记录某个题目跨度是由哪条策略识别出来的，下游的边界估算会据此
/// 选用不同的最小高度和缩进。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentStrategy {
    /// AI 辅助分割
    Ai,
    /// 数字题号（"20."、"21."，含全文搜索和行首匹配）
    Numbered,
    /// 括号小题（"(1)"、"(2)"）
    Parenthetical,
    /// 关键词题号（"第1题"、"题目1"、"第1小题"）
    Keyword,
    /// 基于内容特征的兜底分割
    ContentHeuristic,
}

impl SegmentStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentStrategy::Ai => "ai",
            SegmentStrategy::Numbered => "numbered",
            SegmentStrategy::Parenthetical => "parenthetical",
            SegmentStrategy::Keyword => "keyword",
            SegmentStrategy::ContentHeuristic => "content-heuristic",
        }
    }
}

/// 题目文本跨度
///
/// 分割过程的中间产物：一道题在原始文本中占据的行范围及拼接后的内容。
/// 跨度按起始行单调递增产出，题号允许不连续（保留试卷自身的编号）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSpan {
    /// 题号（从文本解析，或按顺序分配）
    pub ordinal: u32,
    /// 起始行索引
    pub start_line: usize,
    /// 结束行索引（含）
    pub end_line: usize,
    /// 拼接、截断后的题目内容
    pub content: String,
    /// 截断前的内容字符数，用于高度估算
    pub source_chars: usize,
    /// 产出该跨度的分割策略
    pub strategy: SegmentStrategy,
}

impl QuestionSpan {
    /// 跨度覆盖的行数
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// 题目边界信息（百分比坐标）
///
/// 四个分量均为 `[0,100]` 内的百分比，且满足 `top+height ≤ 100`、
/// `left+width ≤ 100`。越界值一律被钳制修正而不是拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// 顶部位置（百分比）
    pub top: f64,
    /// 左侧位置（百分比）
    pub left: f64,
    /// 宽度（百分比）
    pub width: f64,
    /// 高度（百分比）
    pub height: f64,
}

impl Bounds {
    /// 构造并钳制到合法范围
    pub fn clamped(top: f64, left: f64, width: f64, height: f64) -> Self {
        let top = top.clamp(0.0, 100.0);
        let left = left.clamp(0.0, 100.0);
        let mut width = width.clamp(0.0, 100.0);
        let mut height = height.clamp(0.0, 100.0);
        if top + height > 100.0 {
            height = 100.0 - top;
        }
        if left + width > 100.0 {
            width = 100.0 - left;
        }
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// 从 0-1 比例坐标构造（上游视觉模型的约定），钳制后转为百分比
    pub fn from_unit(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self::clamped(
            top.clamp(0.0, 1.0) * 100.0,
            left.clamp(0.0, 1.0) * 100.0,
            width.clamp(0.0, 1.0) * 100.0,
            height.clamp(0.0, 1.0) * 100.0,
        )
    }
}

/// 单个题目分割结果
///
/// 由 `QuestionSpan` 加上边界与评分组合而成，只读，归调用方所有。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSegment {
    /// 题号
    pub ordinal: u32,
    /// 题目内容
    pub content: String,
    /// 归一化边界
    pub bounds: Bounds,
    /// 识别置信度（0-1）
    pub confidence: f64,
    /// 是否为疑难题目
    pub is_difficult: bool,
}

/// 整页题目分割结果
#[derive(Debug, Clone, Serialize)]
pub struct SegmentOutcome {
    pub success: bool,
    pub questions: Vec<QuestionSegment>,
    /// 整页置信度：各题置信度的平均值
    pub overall_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SegmentOutcome {
    /// 构造成功结果，整页置信度取各题平均，无题目时回落到页面置信度
    pub fn ok(questions: Vec<QuestionSegment>, page_confidence: f64) -> Self {
        let overall_confidence = if questions.is_empty() {
            page_confidence
        } else {
            questions.iter().map(|q| q.confidence).sum::<f64>() / questions.len() as f64
        };
        Self {
            success: true,
            questions,
            overall_confidence,
            error: None,
        }
    }

    /// 构造失败结果
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            questions: Vec::new(),
            overall_confidence: 0.0,
            error: Some(error.into()),
        }
    }
}
