//! Analysis orchestration for one subject handle.
//!
//! [`Analyzer::analyze`] runs a fixed sequence: normalise the handle, serve a
//! fresh cached profile if one exists, otherwise fetch the subject, extract
//! signals, apply the eligibility gate, run the primary model stage (with one
//! repair attempt), run the best-effort tendency stage, and persist the merged
//! profile. Nothing is written unless the primary stage validated.

mod analyzer;
mod error;
mod handle;
mod input;
pub mod prompts;
mod setup;
mod source;

pub use analyzer::{AnalysisOutcome, Analyzer, AnalyzerSettings, OutcomeMeta};
pub use error::{PipelineError, SetupError};
pub use handle::normalize_handle;
pub use input::AnalysisInput;
pub use setup::{build_analyzer, open_store};
pub use source::SubjectSource;
