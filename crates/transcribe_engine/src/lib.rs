//! Transcribe engine: job controller, time sources and transcript export.
mod clock;
mod controller;
mod export;
mod persist;
mod scheduler;
mod tokio_scheduler;
mod virtual_time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{JobController, JobObserver, SubscriptionId};
pub use export::{export_transcript, transcript_filename, ExportError, ExportOptions, ExportSummary};
pub use persist::{ensure_output_dir, OutputBatch, PersistError};
pub use scheduler::{Scheduler, TimerHandle};
pub use tokio_scheduler::{TokioScheduler, MAX_TIMER_SLICE};
pub use virtual_time::VirtualScheduler;
