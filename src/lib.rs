//! # Exam Question Engine
//!
//! 试卷照片的题目分割与分类引擎
//!
//! 输入是上游视觉/OCR 协作方识别出的文本（可选地附带逐元素的位置
//! 提示），引擎负责：
//!
//! 1. 把文本切成按序排列的题目记录（多级降级的策略链）
//! 2. 为每道题合成归一化的页面边界
//! 3. 评估每道题的识别置信度和疑难标记
//! 4. 对题目内容做学科/标签/难度分类（LLM 主路径 + 关键词兜底）
//!
//! ## 架构设计
//!
//! 本系统采用三层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个输入
//! - `QuestionSegmenter` - 题目分割能力
//! - `BoundsEstimator` - 边界估算能力
//! - `ConfidenceScorer` - 置信度/难度评分能力
//! - `SubjectClassifier` / `KeywordClassifier` - 学科分类能力
//! - `LlmService` - LLM 调用能力
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一页识别结果"的完整处理流程
//! - `PageFlow` - 流程编排（校验 → 分割 → 逐题分类）
//!
//! ### ③ 数据模型（Models）
//! - `models/` - 引擎的输入输出形态，调用之间不持久化任何状态
//!
//! 引擎内部没有线程，也没有跨调用的共享可变状态；唯一的挂起点是
//! LLM 网络往返，受配置的超时约束。

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    parse_recognized_elements, Bounds, ClassificationResult, Difficulty, QuestionSegment,
    QuestionSpan, RecognizedElement, RecognizedPage, SegmentOutcome, SegmentStrategy, Subject,
};
pub use services::{
    BoundsEstimator, ConfidenceScorer, KeywordClassifier, LlmService, QuestionSegmenter,
    SubjectClassifier,
};
pub use workflow::{AnalyzedQuestion, PageAnalysis, PageFlow};
