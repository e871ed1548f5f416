pub mod events;
pub mod orchestrator;
pub mod queue;

pub use events::{DetectionEvent, ScanHandle};
pub use orchestrator::DetectionEngine;
pub use queue::{BackgroundScanner, WorkerState};
