//! 识别页处理流程 - 流程层
//!
//! 核心职责：定义"一页识别结果"的完整处理流程
//!
//! 流程顺序：
//! 1. 上游失败 → 直接返回失败结果
//! 2. 上游已分割 → 信任其元素（位置钳制后直接采用）
//! 3. 否则 → 本地分割策略链
//! 4. 可选：对每道题并发做学科分类，单题失败互不影响

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::classification::ClassificationResult;
use crate::models::question::{QuestionSegment, SegmentOutcome};
use crate::models::recognition::{RecognizedElement, RecognizedPage};
use crate::services::bounds::BoundsEstimator;
use crate::services::classifier::SubjectClassifier;
use crate::services::scorer::ConfidenceScorer;
use crate::services::segmenter::QuestionSegmenter;
use crate::utils::truncate_text;

/// 题目内容的最大显示长度（字符），与分割器保持一致
const MAX_CONTENT_CHARS: usize = 197;

/// 一道题的分割与分类结果
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedQuestion {
    pub segment: QuestionSegment,
    pub classification: ClassificationResult,
}

/// 整页分析结果
#[derive(Debug, Clone, Serialize)]
pub struct PageAnalysis {
    pub outcome: SegmentOutcome,
    pub questions: Vec<AnalyzedQuestion>,
}

/// 识别页处理流程
///
/// - 编排分割与分类，不持有可变状态
/// - 只依赖业务能力（services）
pub struct PageFlow {
    segmenter: QuestionSegmenter,
    classifier: SubjectClassifier,
    bounds: BoundsEstimator,
}

impl PageFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            segmenter: QuestionSegmenter::new(config),
            classifier: SubjectClassifier::new(config),
            bounds: BoundsEstimator::new(),
        }
    }

    /// 测试用：固定置信度抖动的种子
    pub fn with_rng_seed(config: &Config, seed: u64) -> Self {
        Self {
            segmenter: QuestionSegmenter::with_rng_seed(config, seed),
            classifier: SubjectClassifier::new(config),
            bounds: BoundsEstimator::new(),
        }
    }

    /// 分割一页识别结果
    pub async fn segment_page(&self, page: &RecognizedPage) -> SegmentOutcome {
        if !page.success {
            let reason = page.error.as_deref().unwrap_or("上游识别失败");
            warn!("识别页不可用：{}", reason);
            return SegmentOutcome::failure(format!("识别失败：{}", reason));
        }

        let questions = if !page.elements.is_empty() {
            info!("上游已提供 {} 个结构化元素，直接采用", page.elements.len());
            self.segments_from_elements(&page.elements)
        } else {
            self.segmenter.segment(&page.text).await
        };

        SegmentOutcome::ok(questions, page.confidence)
    }

    /// 分割并逐题分类
    pub async fn analyze_page(&self, page: &RecognizedPage) -> PageAnalysis {
        let outcome = self.segment_page(page).await;
        if !outcome.success {
            return PageAnalysis {
                outcome,
                questions: Vec::new(),
            };
        }

        let texts: Vec<String> = outcome
            .questions
            .iter()
            .map(|q| q.content.clone())
            .collect();
        let classifications = self.classifier.classify_batch(&texts).await;

        let questions = outcome
            .questions
            .iter()
            .cloned()
            .zip(classifications)
            .map(|(segment, classification)| AnalyzedQuestion {
                segment,
                classification,
            })
            .collect();

        PageAnalysis { outcome, questions }
    }

    /// 把上游的结构化元素转成题目分割结果
    ///
    /// 位置信息优先信任上游（解析时已钳制）；没有位置的元素退化到
    /// 两列网格，保证互不重叠。难度从内容重新推导。
    fn segments_from_elements(&self, elements: &[RecognizedElement]) -> Vec<QuestionSegment> {
        elements
            .iter()
            .enumerate()
            .map(|(i, element)| QuestionSegment {
                ordinal: element.id,
                content: truncate_text(&element.content, MAX_CONTENT_CHARS),
                bounds: element.bounds.unwrap_or_else(|| self.bounds.grid_slot(i)),
                confidence: element.confidence.clamp(0.0, 1.0),
                is_difficult: ConfidenceScorer::assess_difficulty(&element.content),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Bounds;

    fn offline_flow() -> PageFlow {
        PageFlow::with_rng_seed(&Config::default(), 42)
    }

    #[tokio::test]
    async fn test_failed_page_short_circuits() {
        let flow = offline_flow();
        let page = RecognizedPage::failure("图片模糊");
        let outcome = flow.segment_page(&page).await;

        assert!(!outcome.success);
        assert!(outcome.questions.is_empty());
        assert!(outcome.error.as_deref().unwrap().contains("图片模糊"));
    }

    #[tokio::test]
    async fn test_elements_are_trusted() {
        let flow = offline_flow();
        let element = RecognizedElement {
            id: 7,
            content: "已知函数 f(x)=x²，求导数".to_string(),
            element_type: "解答题".to_string(),
            subject: "数学".to_string(),
            confidence: 0.93,
            bounds: Some(Bounds::from_unit(0.1, 0.05, 0.9, 0.2)),
        };
        let page = RecognizedPage::ok("任意文本", 0.8).with_elements(vec![element]);
        let outcome = flow.segment_page(&page).await;

        assert!(outcome.success);
        assert_eq!(outcome.questions.len(), 1);
        let q = &outcome.questions[0];
        assert_eq!(q.ordinal, 7);
        assert!((q.bounds.top - 10.0).abs() < 1e-9);
        assert!((q.confidence - 0.93).abs() < 1e-9);
        // 含"函数"与"²"，必为疑难
        assert!(q.is_difficult);
    }

    #[tokio::test]
    async fn test_elements_without_bounds_get_grid_slots() {
        let flow = offline_flow();
        let element = |id: u32| RecognizedElement {
            id,
            content: format!("题目{}", id),
            element_type: "未知".to_string(),
            subject: "未分类".to_string(),
            confidence: 0.8,
            bounds: None,
        };
        let page =
            RecognizedPage::ok("", 0.8).with_elements(vec![element(1), element(2), element(3)]);
        let outcome = flow.segment_page(&page).await;

        assert_eq!(outcome.questions.len(), 3);
        let a = &outcome.questions[0].bounds;
        let b = &outcome.questions[1].bounds;
        // 相邻槽位不重叠
        assert!(a.left + a.width <= b.left || a.top + a.height <= b.top);
    }

    #[tokio::test]
    async fn test_segment_page_runs_strategy_chain() {
        let flow = offline_flow();
        let page = RecognizedPage::ok("20. 求解方程 2x+3=7，求x的值。\n21. 解不等式 3x-5>2x+1", 0.9);
        let outcome = flow.segment_page(&page).await;

        assert!(outcome.success);
        assert_eq!(outcome.questions.len(), 2);
        assert_eq!(outcome.questions[0].ordinal, 20);
        assert_eq!(outcome.questions[1].ordinal, 21);
        assert!(outcome.overall_confidence > 0.0);
    }

    #[tokio::test]
    async fn test_analyze_page_classifies_each_question() {
        let flow = offline_flow();
        let page = RecognizedPage::ok("20. 解方程 2x+3=7\n21. What is this? A) a B) b C) c D) d", 0.9);
        let analysis = flow.analyze_page(&page).await;

        assert!(analysis.outcome.success);
        assert_eq!(analysis.questions.len(), 2);
        assert!(analysis.questions.iter().all(|q| q.classification.success));
    }

    #[tokio::test]
    async fn test_analyze_failed_page_has_no_questions() {
        let flow = offline_flow();
        let analysis = flow.analyze_page(&RecognizedPage::failure("上游超时")).await;
        assert!(!analysis.outcome.success);
        assert!(analysis.questions.is_empty());
    }
}
