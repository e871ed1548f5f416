pub mod signal;
pub mod subject;
pub mod verdict;

pub use signal::{SignalOrigin, SignalOutcome, SignalResult, Unavailable};
pub use subject::{FormDescriptor, Subject, SubjectKey, SubjectKind};
pub use verdict::Verdict;
