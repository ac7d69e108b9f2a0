//! Error types for the render pipeline.

/// Result type for fallible render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Fatal pipeline errors.
///
/// Only the pipeline's own pre/postprocess hooks can fail a render call;
/// a failing per-node handler is contained and degrades that node to its
/// literal source text instead (see [`SpanOutput`](crate::SpanOutput)).
/// When one of these is returned, the output buffer has already been reset
/// and no partial output escapes.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
  #[error("preprocess hook failed: {0}")]
  Preprocess(String),
  #[error("postprocess hook failed: {0}")]
  Postprocess(String),
}
