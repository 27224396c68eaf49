use std::ops::ControlFlow;
use std::sync::Arc;

use crate::{CanonicalError, Caught, ErrorClassificationStage, ErrorStage, RequestInfo, ResponseSink};

/// Ordered failure-handling chain
///
/// Every caught value is classified first, then handed through the stages
/// in insertion order until one breaks or the chain ends.
#[derive(Clone, Default)]
pub struct ErrorPipeline {
    classification: ErrorClassificationStage,
    stages: Vec<Arc<dyn ErrorStage>>,
}

impl ErrorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage to the end of the chain
    #[must_use]
    pub fn stage(mut self, stage: impl ErrorStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run a caught failure through the chain
    ///
    /// Returns the error as it left the last stage, or `None` if a stage
    /// ended the chain early.
    pub fn run(&self, caught: Caught, request: &RequestInfo, response: &mut dyn ResponseSink) -> Option<CanonicalError> {
        let error = self.classification.classify(caught);

        let flow = self
            .stages
            .iter()
            .try_fold(error, |error, stage| stage.handle(error, request, &mut *response));

        match flow {
            ControlFlow::Continue(error) => Some(error),
            ControlFlow::Break(()) => None,
        }
    }
}

impl std::fmt::Debug for ErrorPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}
