//! 边界估算 - 业务能力层
//!
//! 为每个题目跨度合成一个归一化矩形（百分比坐标）。这是设计选择而非
//! 测量：目标是给调用方一个可用的近似覆盖层，不追求像素级定位。
//! 上游若已给出位置（0-1 比例坐标），钳制后直接信任。

use crate::models::question::{Bounds, QuestionSpan, SegmentStrategy};

/// 纵向布局的页边距（百分比）
const TOP_MARGIN: f64 = 8.0;
const BOTTOM_MARGIN: f64 = 8.0;

/// 每行内容约占页面高度的百分比
const PER_LINE_HEIGHT: f64 = 4.0;

/// 高度估算时视为"复杂内容"的标记
const COMPLEXITY_MARKERS: [&str; 5] = ["函数", "证明", "f(", "∑", "∫"];

/// 边界估算器
pub struct BoundsEstimator;

impl BoundsEstimator {
    pub fn new() -> Self {
        Self
    }

    /// 为一个跨度合成边界
    ///
    /// # 参数
    /// - `span`: 题目跨度
    /// - `total_lines`: 全文总行数，用于纵向定位
    pub fn estimate(&self, span: &QuestionSpan, total_lines: usize) -> Bounds {
        let base_top = Self::adaptive_position(span.start_line, total_lines);
        let base_height = Self::adaptive_height(span);

        // 根据分割策略微调：大题占更多空间，小题缩进且更矮
        let mut top = base_top;
        let mut height = base_height;
        let mut left = 5.0;
        let mut width = 90.0;

        match span.strategy {
            SegmentStrategy::Numbered => {
                height = height.max(15.0);
            }
            SegmentStrategy::Parenthetical => {
                height = height.max(8.0);
                left = 8.0;
                width = 87.0;
            }
            SegmentStrategy::Keyword => {
                height = height.max(12.0);
            }
            SegmentStrategy::ContentHeuristic => {
                height = height.max(10.0);
            }
            SegmentStrategy::Ai => {}
        }

        // 确保边界在合理范围内
        top = top.clamp(2.0, 85.0);
        height = height.clamp(6.0, 30.0);

        // 避免越过页面底部
        if top + height > 98.0 {
            height = 98.0 - top;
        }

        Bounds::clamped(top, left, width, height)
    }

    /// 零布局信息时的兜底：两列网格
    ///
    /// 批量保存历史分割结果时没有任何位置信息可用，按固定行列间距
    /// 排布，保证各区域互不重叠。
    pub fn grid_slot(&self, index: usize) -> Bounds {
        let col = index % 2;
        let row = index / 2;
        let left = if col == 0 { 4.0 } else { 52.0 };
        let top = (4.0 + row as f64 * 24.0).min(78.0);
        Bounds::clamped(top, left, 44.0, 20.0)
    }

    /// 自适应纵向位置
    ///
    /// 用平滑曲线而不是线性插值分布起始行，让首尾题目不贴着页面边缘。
    fn adaptive_position(start_line: usize, total_lines: usize) -> f64 {
        let ratio = start_line as f64 / total_lines.max(1) as f64;
        let available = 100.0 - TOP_MARGIN - BOTTOM_MARGIN;
        TOP_MARGIN + available * Self::smooth_step(ratio)
    }

    /// 自适应高度
    ///
    /// 行数乘以单行高度打底，长内容和复杂内容加成，再按策略取最小值，
    /// 最大不超过 25%。
    fn adaptive_height(span: &QuestionSpan) -> f64 {
        let mut height = span.line_count() as f64 * PER_LINE_HEIGHT;

        // 内容越长，需要的空间越大
        if span.source_chars > 200 {
            height += 3.0;
        } else if span.source_chars > 100 {
            height += 1.5;
        }

        // 数学公式类内容通常排版更高
        if COMPLEXITY_MARKERS.iter().any(|m| span.content.contains(m)) {
            height += 2.0;
        }

        let min_height = match span.strategy {
            SegmentStrategy::Numbered => 12.0,
            SegmentStrategy::Parenthetical => 6.0,
            _ => 8.0,
        };

        height.max(min_height).min(25.0)
    }

    /// 平滑步骤函数，用于更自然的位置分布
    fn smooth_step(x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        x * x * (3.0 - 2.0 * x)
    }
}

impl Default for BoundsEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(strategy: SegmentStrategy, start_line: usize, end_line: usize, content: &str) -> QuestionSpan {
        QuestionSpan {
            ordinal: 1,
            start_line,
            end_line,
            content: content.to_string(),
            source_chars: content.chars().count(),
            strategy,
        }
    }

    fn assert_valid(bounds: &Bounds) {
        assert!(bounds.top >= 0.0 && bounds.top <= 100.0);
        assert!(bounds.left >= 0.0 && bounds.left <= 100.0);
        assert!(bounds.width >= 0.0 && bounds.width <= 100.0);
        assert!(bounds.height >= 0.0 && bounds.height <= 100.0);
        assert!(bounds.top + bounds.height <= 100.0);
        assert!(bounds.left + bounds.width <= 100.0);
    }

    #[test]
    fn test_estimate_always_in_range() {
        let estimator = BoundsEstimator::new();
        for strategy in [
            SegmentStrategy::Ai,
            SegmentStrategy::Numbered,
            SegmentStrategy::Parenthetical,
            SegmentStrategy::Keyword,
            SegmentStrategy::ContentHeuristic,
        ] {
            for start in [0, 5, 19] {
                let s = span(strategy, start, start + 3, &"内容".repeat(80));
                assert_valid(&estimator.estimate(&s, 20));
            }
        }
    }

    #[test]
    fn test_numbered_minimum_height() {
        let estimator = BoundsEstimator::new();
        let s = span(SegmentStrategy::Numbered, 0, 0, "20. 求x");
        let bounds = estimator.estimate(&s, 10);
        assert!(bounds.height >= 15.0);
    }

    #[test]
    fn test_parenthetical_indent_and_height() {
        let estimator = BoundsEstimator::new();
        let s = span(SegmentStrategy::Parenthetical, 3, 3, "(1) 求定义域");
        let bounds = estimator.estimate(&s, 10);
        assert!(bounds.height >= 6.0);
        assert!(bounds.left >= 8.0);
        assert!((bounds.width - 87.0).abs() < 1e-9);
    }

    #[test]
    fn test_vertical_position_monotonic() {
        let estimator = BoundsEstimator::new();
        let first = estimator.estimate(&span(SegmentStrategy::Numbered, 0, 1, "a"), 30);
        let middle = estimator.estimate(&span(SegmentStrategy::Numbered, 15, 16, "a"), 30);
        let last = estimator.estimate(&span(SegmentStrategy::Numbered, 29, 29, "a"), 30);
        assert!(first.top < middle.top);
        assert!(middle.top < last.top);
        // 首题不贴页面顶边
        assert!(first.top >= TOP_MARGIN - 1e-9);
    }

    #[test]
    fn test_bottom_overflow_shrinks_height() {
        let estimator = BoundsEstimator::new();
        // 最后一行的长题目：top 接近 85，高度必须收缩
        let s = span(SegmentStrategy::Numbered, 99, 99, &"长内容".repeat(100));
        let bounds = estimator.estimate(&s, 100);
        assert!(bounds.top + bounds.height <= 98.0 + 1e-9);
        assert_valid(&bounds);
    }

    #[test]
    fn test_complexity_marker_bonus() {
        let estimator = BoundsEstimator::new();
        let plain = estimator.estimate(&span(SegmentStrategy::Ai, 5, 9, "普通内容"), 20);
        let complex = estimator.estimate(&span(SegmentStrategy::Ai, 5, 9, "已知函数内容"), 20);
        assert!(complex.height > plain.height);
    }

    #[test]
    fn test_grid_slots_do_not_overlap() {
        let estimator = BoundsEstimator::new();
        let slots: Vec<Bounds> = (0..6).map(|i| estimator.grid_slot(i)).collect();
        for (i, a) in slots.iter().enumerate() {
            assert_valid(a);
            for b in slots.iter().skip(i + 1) {
                let horizontal_apart = a.left + a.width <= b.left || b.left + b.width <= a.left;
                let vertical_apart = a.top + a.height <= b.top || b.top + b.height <= a.top;
                assert!(
                    horizontal_apart || vertical_apart,
                    "网格槽位 {:?} 与 {:?} 重叠",
                    a,
                    b
                );
            }
        }
    }
}
