//! The render pipeline: preprocess, parse and render, beautify,
//! postprocess.
//!
//! A [`Processor`] is configured once (extensions, render flags, handler
//! overrides, hooks) and renders any number of documents through the same
//! resolved renderer table and output buffer.

use std::{
  borrow::Cow,
  panic::{AssertUnwindSafe, catch_unwind},
};

use log::{error, trace};

use crate::{
  beautify::beautify,
  buffer::OutputBuffer,
  engine,
  error::{RenderError, RenderResult},
  flags::{Extensions, RenderFlags},
  renderer::{Overrides, RendererTable},
};

/// A whole-document rewrite hook, run before parsing or after rendering.
pub type HookFn = Box<dyn Fn(&str) -> String>;

/// A configured markdown-to-HTML renderer.
///
/// ```
/// use overmark::{Extensions, Processor, RenderFlags};
///
/// let mut processor =
///   Processor::new(Extensions::TABLES, RenderFlags::empty());
/// let html = processor.render("# Hello").unwrap();
/// assert_eq!(html, "<h1>Hello</h1>\n");
/// ```
pub struct Processor {
  extensions:   Extensions,
  render_flags: RenderFlags,
  table:        RendererTable,
  preprocess:   Option<HookFn>,
  postprocess:  Option<HookFn>,
  buffer:       OutputBuffer,
}

impl Processor {
  /// A processor with every renderer slot on the default HTML emitter.
  #[must_use]
  pub fn new(extensions: Extensions, render_flags: RenderFlags) -> Self {
    Self::with_overrides(Overrides::new(), extensions, render_flags)
  }

  /// A processor with the given handler overrides; unset slots keep the
  /// default HTML emitter.
  #[must_use]
  pub fn with_overrides(
    overrides: Overrides,
    extensions: Extensions,
    render_flags: RenderFlags,
  ) -> Self {
    let table = RendererTable::resolve(overrides);
    trace!("renderer table resolved with {} custom slots", table.custom_slots());
    Self {
      extensions,
      render_flags,
      table,
      preprocess: None,
      postprocess: None,
      buffer: OutputBuffer::new(),
    }
  }

  /// Rewrite the raw markdown before it is parsed.
  #[must_use]
  pub fn with_preprocess(mut self, hook: impl Fn(&str) -> String + 'static) -> Self {
    self.preprocess = Some(Box::new(hook));
    self
  }

  /// Rewrite the finished HTML after rendering (and beautification).
  #[must_use]
  pub fn with_postprocess(mut self, hook: impl Fn(&str) -> String + 'static) -> Self {
    self.postprocess = Some(Box::new(hook));
    self
  }

  #[must_use]
  pub const fn extensions(&self) -> Extensions {
    self.extensions
  }

  #[must_use]
  pub const fn render_flags(&self) -> RenderFlags {
    self.render_flags
  }

  /// Render one markdown document to HTML.
  ///
  /// Stages run in order: the preprocess hook, parsing and rendering
  /// through the renderer table, the smartypants pass when
  /// [`RenderFlags::SMARTYPANTS`] is set, and the postprocess hook.
  ///
  /// # Errors
  ///
  /// Fails only when a pre- or postprocess hook panics; the render is
  /// aborted and the buffer is reset, so no partial output survives into
  /// a later call. Failing node handlers never reach here: they degrade
  /// their own node and the render succeeds.
  pub fn render(&mut self, input: &str) -> RenderResult<String> {
    trace!("rendering markdown document ({} bytes)", input.len());
    self.buffer.reset();

    let input: Cow<str> = match &self.preprocess {
      Some(hook) => match run_hook(hook, input) {
        Ok(text) => Cow::Owned(text),
        Err(message) => {
          error!("preprocess hook failed: {message}");
          return Err(RenderError::Preprocess(message));
        }
      },
      None => Cow::Borrowed(input),
    };

    engine::render_document(
      &self.table,
      self.extensions,
      self.render_flags,
      &input,
      &mut self.buffer,
    );

    if self.render_flags.contains(RenderFlags::SMARTYPANTS) {
      let rendered = self.buffer.take();
      self.buffer.push_str(&beautify(&rendered));
    }

    if let Some(hook) = &self.postprocess {
      let rendered = self.buffer.take();
      match run_hook(hook, &rendered) {
        Ok(text) => self.buffer.push_str(&text),
        Err(message) => {
          error!("postprocess hook failed: {message}");
          self.buffer.reset();
          return Err(RenderError::Postprocess(message));
        }
      }
    }

    Ok(self.buffer.take())
  }
}

impl std::fmt::Debug for Processor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Processor")
      .field("extensions", &self.extensions)
      .field("render_flags", &self.render_flags)
      .finish_non_exhaustive()
  }
}

/// One-shot rendering with the default HTML emitter on every slot.
#[must_use]
pub fn render(input: &str, extensions: Extensions, render_flags: RenderFlags) -> String {
  let table = RendererTable::resolve(Overrides::new());
  let mut buffer = OutputBuffer::new();
  engine::render_document(&table, extensions, render_flags, input, &mut buffer);
  if render_flags.contains(RenderFlags::SMARTYPANTS) {
    let rendered = buffer.take();
    buffer.push_str(&beautify(&rendered));
  }
  buffer.take()
}

fn run_hook(hook: &HookFn, input: &str) -> Result<String, String> {
  catch_unwind(AssertUnwindSafe(|| hook(input))).map_err(|payload| {
    if let Some(message) = payload.downcast_ref::<String>() {
      message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
      (*message).to_owned()
    } else {
      "hook panicked".to_owned()
    }
  })
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::{Processor, render};
  use crate::{
    error::RenderError,
    flags::{Extensions, RenderFlags},
  };

  #[test]
  fn renders_basic_document() {
    let mut processor =
      Processor::new(Extensions::empty(), RenderFlags::empty());
    assert_eq!(
      processor.render("Hello, *world*.").unwrap(),
      "<p>Hello, <em>world</em>.</p>\n"
    );
  }

  #[test]
  fn processor_is_reusable() {
    let mut processor =
      Processor::new(Extensions::empty(), RenderFlags::empty());
    assert_eq!(processor.render("one").unwrap(), "<p>one</p>\n");
    assert_eq!(processor.render("two").unwrap(), "<p>two</p>\n");
  }

  #[test]
  fn hooks_run_in_pipeline_order() {
    let mut processor =
      Processor::new(Extensions::empty(), RenderFlags::empty())
        .with_preprocess(|text| text.replace("WORLD", "world"))
        .with_postprocess(|html| format!("<article>\n{html}</article>\n"));
    assert_eq!(
      processor.render("Hello WORLD").unwrap(),
      "<article>\n<p>Hello world</p>\n</article>\n"
    );
  }

  #[test]
  fn failing_preprocess_aborts_render() {
    let mut processor =
      Processor::new(Extensions::empty(), RenderFlags::empty())
        .with_preprocess(|_| panic!("bad input"));
    let err = processor.render("text").unwrap_err();
    assert!(matches!(err, RenderError::Preprocess(ref m) if m == "bad input"));
    // The processor stays usable after the failure.
    let mut ok = Processor::new(Extensions::empty(), RenderFlags::empty());
    assert_eq!(ok.render("text").unwrap(), "<p>text</p>\n");
  }

  #[test]
  fn failing_postprocess_discards_rendered_output() {
    let mut processor =
      Processor::new(Extensions::empty(), RenderFlags::empty())
        .with_postprocess(|_| panic!("no thanks"));
    assert!(processor.render("text").is_err());
  }

  #[test]
  fn one_shot_matches_processor_output() {
    let input = "# Title\n\nBody text.";
    let mut processor =
      Processor::new(Extensions::empty(), RenderFlags::empty());
    assert_eq!(
      render(input, Extensions::empty(), RenderFlags::empty()),
      processor.render(input).unwrap()
    );
  }
}
