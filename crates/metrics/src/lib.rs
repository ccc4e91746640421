//! Metric extraction - turns one run store into a [`MetricsSnapshot`].
//!
//! [`MetricsSnapshot`]: runlens_core::MetricsSnapshot

#![warn(missing_docs)]

mod completion;
mod error;
mod extractor;
pub mod groups;

pub use completion::{check_completion, RunStatus};
pub use error::{ExtractError, Result};
pub use extractor::{ExtractorConfig, MetricsExtractor};
