//! Markdown to HTML through a table of per-node-kind renderer slots, each
//! individually overridable.
//!
//! Every document node — paragraphs, headers, emphasis spans, table
//! cells, footnote definitions — is dispatched through a named slot. A
//! slot either holds the built-in HTML emitter or a handler supplied by
//! the caller, so a renderer can be customized one node kind at a time
//! without reimplementing the rest.
//!
//! Rendering runs a fixed pipeline: an optional preprocess hook rewrites
//! the raw markdown, the document is parsed and rendered through the
//! slot table, an optional smartypants pass beautifies the punctuation,
//! and an optional postprocess hook rewrites the finished HTML.
//!
//! Failures are contained at node granularity. A custom span handler may
//! decline its node (or panic); the node's original source text then
//! passes through verbatim and the surrounding render continues. Only a
//! failing pipeline hook aborts a render.
//!
//! # Quick start
//!
//! ```
//! use overmark::{Extensions, Overrides, Processor, RenderFlags};
//!
//! let overrides = Overrides::new().header(|content, level| {
//!   format!("<h{level} class=\"post\">{content}</h{level}>\n")
//! });
//!
//! let mut processor = Processor::with_overrides(
//!   overrides,
//!   Extensions::TABLES | Extensions::FOOTNOTES,
//!   RenderFlags::empty(),
//! );
//!
//! let html = processor.render("# Title").unwrap();
//! assert_eq!(html, "<h1 class=\"post\">Title</h1>\n");
//! ```
//!
//! For uncustomized rendering there is a one-shot form:
//!
//! ```
//! use overmark::{Extensions, RenderFlags};
//!
//! let html = overmark::render("*hi*", Extensions::empty(), RenderFlags::empty());
//! assert_eq!(html, "<p><em>hi</em></p>\n");
//! ```

mod beautify;
mod buffer;
mod engine;
mod error;
mod flags;
mod html;
mod processor;
mod renderer;

pub use error::{RenderError, RenderResult};
pub use flags::{Extensions, RenderFlags, TableFlags};
pub use processor::{HookFn, Processor, render};
pub use renderer::{
  AutolinkHandler, FootnoteDefHandler, FootnoteRefHandler, HeaderHandler,
  LinkHandler, ListHandler, NullaryHandler, NullarySpanHandler, Overrides,
  SpanHandler, SpanOutput, TableCellHandler, TextHandler, TextPairHandler,
};
