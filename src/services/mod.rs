pub mod bounds;
pub mod classifier;
pub mod keyword_classifier;
pub mod llm_service;
pub mod scorer;
pub mod segmenter;

pub use bounds::BoundsEstimator;
pub use classifier::SubjectClassifier;
pub use keyword_classifier::KeywordClassifier;
pub use llm_service::{ChatOptions, LlmService};
pub use scorer::ConfidenceScorer;
pub use segmenter::QuestionSegmenter;
