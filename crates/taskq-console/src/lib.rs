/*
[INPUT]:  Public API exports for taskq-console crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod detail;
pub mod form;
pub mod logging;
pub mod metrics;
pub mod poller;
pub mod registry;
pub mod submission;
pub mod task_query;

// Re-export main types for convenience
pub use config::ConsoleConfig;
pub use form::SubmissionForm;
pub use metrics::{MetricsDisplay, MetricsView, QueuePoint, queue_series};
pub use poller::{PollSnapshot, PollingStore, Subscription};
pub use registry::{
    FieldKind, FieldSpec, RegistryError, TaskTypeRegistry, TaskTypeSchema, fetch_registry,
};
pub use submission::{SubmissionClient, SubmissionError, SubmissionOutcome, TaskDraft};
pub use task_query::{FilterState, StatusFilter, TaskListView, TaskRow, build_query};
