pub mod classification;
pub mod question;
pub mod recognition;
pub mod subject;

pub use classification::{ClassificationResult, Difficulty};
pub use question::{Bounds, QuestionSegment, QuestionSpan, SegmentOutcome, SegmentStrategy};
pub use recognition::{parse_recognized_elements, RecognizedElement, RecognizedPage};
pub use subject::Subject;
