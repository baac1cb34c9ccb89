//! Batch generation pipeline: progress reporting, cooperative
//! cancellation, and the sequential roster driver.

pub mod batch;
pub mod cancel;
pub mod progress;

pub use batch::{BatchPipeline, BatchResult, SkippedUnit};
pub use cancel::CancellationToken;
pub use progress::{ConsoleProgress, NullProgress, ProgressEvent, ProgressReporter};
