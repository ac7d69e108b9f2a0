//! The reusable output accumulator shared by the render pipeline stages.

/// Growable text accumulator, reused across renders of one
/// [`Processor`](crate::Processor).
///
/// Append-only during a render pass; explicitly emptied between passes so
/// a failed render can never leak partial output into the next one.
#[derive(Debug, Default)]
pub(crate) struct OutputBuffer {
  text: String,
}

impl OutputBuffer {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.text.is_empty()
  }

  pub(crate) fn push_str(&mut self, s: &str) {
    self.text.push_str(s);
  }

  /// Empty the buffer, keeping its capacity.
  pub(crate) fn reset(&mut self) {
    self.text.clear();
  }

  /// Move the accumulated text out, leaving the buffer empty.
  pub(crate) fn take(&mut self) -> String {
    std::mem::take(&mut self.text)
  }
}
