//! Signal extraction and eligibility rules for discourse profiling.
//!
//! Both halves are pure: [`extract_signals`] reduces a bio and a post sample
//! to weighted hashtags, keywords and bigrams plus sample statistics, and
//! [`assess`] decides from those statistics whether the account is worth an
//! analysis run. Neither performs I/O or returns errors.

pub mod extract;
pub mod gate;
pub mod text;
pub mod types;

mod weights;

pub use extract::extract_signals;
pub use gate::{assess, AccountFlag, EligibilityVerdict, Rejection, RejectionCode};
pub use types::{
    ExampleText, InteractionSummary, SampleStats, SignalBundle, SignalCounts, WeightedTerm,
};
