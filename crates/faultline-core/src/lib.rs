//! Canonical error model and failure-handling chain
//!
//! Failures are caught as [`Caught`] values, classified into a single
//! [`CanonicalError`] shape, and handed through an ordered list of
//! [`ErrorStage`]s. The crate has no web framework dependency; the server
//! crate supplies the glue.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod caught;
mod context;
mod error;
mod pipeline;
pub mod policy;
mod reason;
mod response;
mod stage;

pub use caught::Caught;
pub use context::RequestInfo;
pub use error::CanonicalError;
pub use pipeline::ErrorPipeline;
pub use policy::{ClassificationPolicy, SharedPolicy, StatusPolicy, StatusSet};
pub use reason::reason_phrase;
pub use response::{ErrorLogger, ResponseStage, TracingLogger, response_stage};
pub use stage::{
    BufferedResponse, ErrorClassificationStage, ErrorStage, NotFoundStage, ResponseSink, error_classification_stage,
    not_found_stage,
};
