//! The renderer table: one slot per node kind, each bound to either the
//! default HTML emitter or a caller-supplied handler.
//!
//! Callers register handlers sparsely through [`Overrides`]; at processor
//! construction [`RendererTable::resolve`] binds every slot exactly once,
//! so per-node dispatch never probes for capabilities again.
//!
//! Block-level and document-boundary handlers return a `String` that is
//! appended to the output as-is. Span-level handlers return a
//! [`SpanOutput`]: they may decline a node, in which case the node's
//! original source text passes through verbatim. A handler that panics is
//! contained by the dispatch adapter and treated as declined (span) or as a
//! no-op (block); the render call itself still succeeds.

use crate::flags::TableFlags;

/// Outcome of a span-level handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanOutput {
  /// The handler consumed the node; the text replaces the node's output.
  Accepted(String),
  /// The handler declined the node; its source text is emitted verbatim.
  Declined,
}

impl From<String> for SpanOutput {
  fn from(text: String) -> Self {
    Self::Accepted(text)
  }
}

impl From<&str> for SpanOutput {
  fn from(text: &str) -> Self {
    Self::Accepted(text.to_owned())
  }
}

/// `block_quote`, `block_html`, `paragraph`, `table_row`, `footnotes`,
/// `entity`, `normal_text`: one text fragment in, replacement text out.
pub type TextHandler = Box<dyn Fn(&str) -> String>;
/// `block_code(text, language)` and `table(header, body)`.
pub type TextPairHandler = Box<dyn Fn(&str, &str) -> String>;
/// `header(content, level)`.
pub type HeaderHandler = Box<dyn Fn(&str, u8) -> String>;
/// `list(content, ordered)` and `list_item(content, ordered)`.
pub type ListHandler = Box<dyn Fn(&str, bool) -> String>;
/// `table_cell(content, flags)`; the flags are passed uninterpreted.
pub type TableCellHandler = Box<dyn Fn(&str, TableFlags) -> String>;
/// `footnote_def(content, number)`.
pub type FootnoteDefHandler = Box<dyn Fn(&str, u32) -> String>;
/// `hrule`, `doc_header`, `doc_footer`: no event data.
pub type NullaryHandler = Box<dyn Fn() -> String>;
/// Single-fragment span slots (`emphasis`, `codespan`, …).
pub type SpanHandler = Box<dyn Fn(&str) -> SpanOutput>;
/// `line_break`: no event data, may decline.
pub type NullarySpanHandler = Box<dyn Fn() -> SpanOutput>;
/// `footnote_ref(number)`.
pub type FootnoteRefHandler = Box<dyn Fn(u32) -> SpanOutput>;
/// `autolink(link, is_email)`.
pub type AutolinkHandler = Box<dyn Fn(&str, bool) -> SpanOutput>;
/// `link(url, title, content)` and `image(url, title, alt)`.
pub type LinkHandler = Box<dyn Fn(&str, Option<&str>, &str) -> SpanOutput>;

/// Sparse set of custom handlers, registered slot by slot.
///
/// Every slot left unset falls back to the default HTML emitter when the
/// set is resolved into the renderer table at
/// [`Processor`](crate::Processor) construction.
///
/// ```
/// use overmark::{Overrides, SpanOutput};
///
/// let overrides = Overrides::new()
///   .emphasis(|text| SpanOutput::Accepted(format!("<i>{text}</i>")))
///   .hrule(|| "<hr class=\"fancy\">\n".to_owned());
/// ```
#[derive(Default)]
pub struct Overrides {
  pub(crate) block_code:      Option<TextPairHandler>,
  pub(crate) block_quote:     Option<TextHandler>,
  pub(crate) block_html:      Option<TextHandler>,
  pub(crate) header:          Option<HeaderHandler>,
  pub(crate) hrule:           Option<NullaryHandler>,
  pub(crate) list:            Option<ListHandler>,
  pub(crate) list_item:       Option<ListHandler>,
  pub(crate) paragraph:       Option<TextHandler>,
  pub(crate) table:           Option<TextPairHandler>,
  pub(crate) table_row:       Option<TextHandler>,
  pub(crate) table_cell:      Option<TableCellHandler>,
  pub(crate) footnotes:       Option<TextHandler>,
  pub(crate) footnote_def:    Option<FootnoteDefHandler>,
  pub(crate) autolink:        Option<AutolinkHandler>,
  pub(crate) codespan:        Option<SpanHandler>,
  pub(crate) double_emphasis: Option<SpanHandler>,
  pub(crate) emphasis:        Option<SpanHandler>,
  pub(crate) underline:       Option<SpanHandler>,
  pub(crate) highlight:       Option<SpanHandler>,
  pub(crate) quote:           Option<SpanHandler>,
  pub(crate) image:           Option<LinkHandler>,
  pub(crate) line_break:      Option<NullarySpanHandler>,
  pub(crate) link:            Option<LinkHandler>,
  pub(crate) raw_html_tag:    Option<SpanHandler>,
  pub(crate) triple_emphasis: Option<SpanHandler>,
  pub(crate) strikethrough:   Option<SpanHandler>,
  pub(crate) superscript:     Option<SpanHandler>,
  pub(crate) footnote_ref:    Option<FootnoteRefHandler>,
  pub(crate) entity:          Option<TextHandler>,
  pub(crate) normal_text:     Option<TextHandler>,
  pub(crate) doc_header:      Option<NullaryHandler>,
  pub(crate) doc_footer:      Option<NullaryHandler>,
}

impl Overrides {
  /// An empty set: every slot resolves to the default emitter.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Fenced or indented code block; receives the code text and the info
  /// string language (empty when none was given).
  #[must_use]
  pub fn block_code(mut self, f: impl Fn(&str, &str) -> String + 'static) -> Self {
    self.block_code = Some(Box::new(f));
    self
  }

  /// Block quote; receives the already-rendered inner blocks.
  #[must_use]
  pub fn block_quote(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
    self.block_quote = Some(Box::new(f));
    self
  }

  /// Raw HTML block; receives the verbatim block text.
  #[must_use]
  pub fn block_html(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
    self.block_html = Some(Box::new(f));
    self
  }

  /// Header; receives the rendered inline content and the level (1-6).
  #[must_use]
  pub fn header(mut self, f: impl Fn(&str, u8) -> String + 'static) -> Self {
    self.header = Some(Box::new(f));
    self
  }

  /// Horizontal rule.
  #[must_use]
  pub fn hrule(mut self, f: impl Fn() -> String + 'static) -> Self {
    self.hrule = Some(Box::new(f));
    self
  }

  /// List; receives the concatenated rendered items and orderedness.
  #[must_use]
  pub fn list(mut self, f: impl Fn(&str, bool) -> String + 'static) -> Self {
    self.list = Some(Box::new(f));
    self
  }

  /// List item; receives the rendered item content and orderedness.
  #[must_use]
  pub fn list_item(mut self, f: impl Fn(&str, bool) -> String + 'static) -> Self {
    self.list_item = Some(Box::new(f));
    self
  }

  /// Paragraph; receives the rendered inline content.
  #[must_use]
  pub fn paragraph(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
    self.paragraph = Some(Box::new(f));
    self
  }

  /// Table; receives the already-rendered header and body fragments.
  #[must_use]
  pub fn table(mut self, f: impl Fn(&str, &str) -> String + 'static) -> Self {
    self.table = Some(Box::new(f));
    self
  }

  /// Table row; receives the concatenated rendered cells.
  #[must_use]
  pub fn table_row(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
    self.table_row = Some(Box::new(f));
    self
  }

  /// Table cell; receives the rendered content and raw [`TableFlags`].
  #[must_use]
  pub fn table_cell(mut self, f: impl Fn(&str, TableFlags) -> String + 'static) -> Self {
    self.table_cell = Some(Box::new(f));
    self
  }

  /// Footnote section; receives the concatenated rendered definitions.
  #[must_use]
  pub fn footnotes(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
    self.footnotes = Some(Box::new(f));
    self
  }

  /// One footnote definition; receives rendered content and its number.
  #[must_use]
  pub fn footnote_def(mut self, f: impl Fn(&str, u32) -> String + 'static) -> Self {
    self.footnote_def = Some(Box::new(f));
    self
  }

  /// Autolinked URL or email address.
  #[must_use]
  pub fn autolink(mut self, f: impl Fn(&str, bool) -> SpanOutput + 'static) -> Self {
    self.autolink = Some(Box::new(f));
    self
  }

  /// Inline code span; receives the literal code text.
  #[must_use]
  pub fn codespan(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.codespan = Some(Box::new(f));
    self
  }

  /// Strong emphasis (`**text**`).
  #[must_use]
  pub fn double_emphasis(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.double_emphasis = Some(Box::new(f));
    self
  }

  /// Emphasis (`*text*`).
  #[must_use]
  pub fn emphasis(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.emphasis = Some(Box::new(f));
    self
  }

  /// Underline (`_text_` under
  /// [`Extensions::UNDERLINE`](crate::Extensions::UNDERLINE)).
  #[must_use]
  pub fn underline(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.underline = Some(Box::new(f));
    self
  }

  /// Highlight (`==text==`).
  #[must_use]
  pub fn highlight(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.highlight = Some(Box::new(f));
    self
  }

  /// Quote span (`"text"` under
  /// [`Extensions::QUOTE`](crate::Extensions::QUOTE)).
  #[must_use]
  pub fn quote(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.quote = Some(Box::new(f));
    self
  }

  /// Image; receives the URL, optional title, and alt text.
  #[must_use]
  pub fn image(
    mut self,
    f: impl Fn(&str, Option<&str>, &str) -> SpanOutput + 'static,
  ) -> Self {
    self.image = Some(Box::new(f));
    self
  }

  /// Hard line break.
  #[must_use]
  pub fn line_break(mut self, f: impl Fn() -> SpanOutput + 'static) -> Self {
    self.line_break = Some(Box::new(f));
    self
  }

  /// Link; receives the URL, optional title, and rendered content.
  #[must_use]
  pub fn link(
    mut self,
    f: impl Fn(&str, Option<&str>, &str) -> SpanOutput + 'static,
  ) -> Self {
    self.link = Some(Box::new(f));
    self
  }

  /// Inline raw HTML tag.
  #[must_use]
  pub fn raw_html_tag(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.raw_html_tag = Some(Box::new(f));
    self
  }

  /// Triple emphasis (`***text***`).
  #[must_use]
  pub fn triple_emphasis(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.triple_emphasis = Some(Box::new(f));
    self
  }

  /// Strikethrough (`~~text~~`).
  #[must_use]
  pub fn strikethrough(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.strikethrough = Some(Box::new(f));
    self
  }

  /// Superscript (`^text`).
  #[must_use]
  pub fn superscript(mut self, f: impl Fn(&str) -> SpanOutput + 'static) -> Self {
    self.superscript = Some(Box::new(f));
    self
  }

  /// Footnote reference; receives the footnote number.
  #[must_use]
  pub fn footnote_ref(mut self, f: impl Fn(u32) -> SpanOutput + 'static) -> Self {
    self.footnote_ref = Some(Box::new(f));
    self
  }

  /// HTML entity preserved by the parser, delivered verbatim.
  #[must_use]
  pub fn entity(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
    self.entity = Some(Box::new(f));
    self
  }

  /// Plain text run; the default emitter escapes it for HTML.
  #[must_use]
  pub fn normal_text(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
    self.normal_text = Some(Box::new(f));
    self
  }

  /// Fired once before the first block of the document.
  #[must_use]
  pub fn doc_header(mut self, f: impl Fn() -> String + 'static) -> Self {
    self.doc_header = Some(Box::new(f));
    self
  }

  /// Fired once after the last block (and footnotes) of the document.
  #[must_use]
  pub fn doc_footer(mut self, f: impl Fn() -> String + 'static) -> Self {
    self.doc_footer = Some(Box::new(f));
    self
  }
}

impl std::fmt::Debug for Overrides {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Overrides").finish_non_exhaustive()
  }
}

/// One slot of the renderer table: either the built-in emitter or a custom
/// handler. There is no unbound state.
pub(crate) enum Slot<T> {
  Default,
  Custom(T),
}

impl<T> Slot<T> {
  fn bind(custom: Option<T>) -> Self {
    custom.map_or(Self::Default, Self::Custom)
  }

  pub(crate) fn is_custom(&self) -> bool {
    matches!(self, Self::Custom(_))
  }
}

/// The resolved, total renderer table: exactly one active handler per node
/// kind. Built once per processor, read-only while rendering.
pub(crate) struct RendererTable {
  pub(crate) block_code:      Slot<TextPairHandler>,
  pub(crate) block_quote:     Slot<TextHandler>,
  pub(crate) block_html:      Slot<TextHandler>,
  pub(crate) header:          Slot<HeaderHandler>,
  pub(crate) hrule:           Slot<NullaryHandler>,
  pub(crate) list:            Slot<ListHandler>,
  pub(crate) list_item:       Slot<ListHandler>,
  pub(crate) paragraph:       Slot<TextHandler>,
  pub(crate) table:           Slot<TextPairHandler>,
  pub(crate) table_row:       Slot<TextHandler>,
  pub(crate) table_cell:      Slot<TableCellHandler>,
  pub(crate) footnotes:       Slot<TextHandler>,
  pub(crate) footnote_def:    Slot<FootnoteDefHandler>,
  pub(crate) autolink:        Slot<AutolinkHandler>,
  pub(crate) codespan:        Slot<SpanHandler>,
  pub(crate) double_emphasis: Slot<SpanHandler>,
  pub(crate) emphasis:        Slot<SpanHandler>,
  pub(crate) underline:       Slot<SpanHandler>,
  pub(crate) highlight:       Slot<SpanHandler>,
  pub(crate) quote:           Slot<SpanHandler>,
  pub(crate) image:           Slot<LinkHandler>,
  pub(crate) line_break:      Slot<NullarySpanHandler>,
  pub(crate) link:            Slot<LinkHandler>,
  pub(crate) raw_html_tag:    Slot<SpanHandler>,
  pub(crate) triple_emphasis: Slot<SpanHandler>,
  pub(crate) strikethrough:   Slot<SpanHandler>,
  pub(crate) superscript:     Slot<SpanHandler>,
  pub(crate) footnote_ref:    Slot<FootnoteRefHandler>,
  pub(crate) entity:          Slot<TextHandler>,
  pub(crate) normal_text:     Slot<TextHandler>,
  pub(crate) doc_header:      Slot<NullaryHandler>,
  pub(crate) doc_footer:      Slot<NullaryHandler>,
}

impl RendererTable {
  /// Bind every slot: supplied overrides win, everything else goes to the
  /// default emitter. Decided here once, never re-evaluated per node.
  pub(crate) fn resolve(overrides: Overrides) -> Self {
    Self {
      block_code:      Slot::bind(overrides.block_code),
      block_quote:     Slot::bind(overrides.block_quote),
      block_html:      Slot::bind(overrides.block_html),
      header:          Slot::bind(overrides.header),
      hrule:           Slot::bind(overrides.hrule),
      list:            Slot::bind(overrides.list),
      list_item:       Slot::bind(overrides.list_item),
      paragraph:       Slot::bind(overrides.paragraph),
      table:           Slot::bind(overrides.table),
      table_row:       Slot::bind(overrides.table_row),
      table_cell:      Slot::bind(overrides.table_cell),
      footnotes:       Slot::bind(overrides.footnotes),
      footnote_def:    Slot::bind(overrides.footnote_def),
      autolink:        Slot::bind(overrides.autolink),
      codespan:        Slot::bind(overrides.codespan),
      double_emphasis: Slot::bind(overrides.double_emphasis),
      emphasis:        Slot::bind(overrides.emphasis),
      underline:       Slot::bind(overrides.underline),
      highlight:       Slot::bind(overrides.highlight),
      quote:           Slot::bind(overrides.quote),
      image:           Slot::bind(overrides.image),
      line_break:      Slot::bind(overrides.line_break),
      link:            Slot::bind(overrides.link),
      raw_html_tag:    Slot::bind(overrides.raw_html_tag),
      triple_emphasis: Slot::bind(overrides.triple_emphasis),
      strikethrough:   Slot::bind(overrides.strikethrough),
      superscript:     Slot::bind(overrides.superscript),
      footnote_ref:    Slot::bind(overrides.footnote_ref),
      entity:          Slot::bind(overrides.entity),
      normal_text:     Slot::bind(overrides.normal_text),
      doc_header:      Slot::bind(overrides.doc_header),
      doc_footer:      Slot::bind(overrides.doc_footer),
    }
  }

  /// Number of slots bound to custom handlers, for diagnostics.
  pub(crate) fn custom_slots(&self) -> usize {
    [
      self.block_code.is_custom(),
      self.block_quote.is_custom(),
      self.block_html.is_custom(),
      self.header.is_custom(),
      self.hrule.is_custom(),
      self.list.is_custom(),
      self.list_item.is_custom(),
      self.paragraph.is_custom(),
      self.table.is_custom(),
      self.table_row.is_custom(),
      self.table_cell.is_custom(),
      self.footnotes.is_custom(),
      self.footnote_def.is_custom(),
      self.autolink.is_custom(),
      self.codespan.is_custom(),
      self.double_emphasis.is_custom(),
      self.emphasis.is_custom(),
      self.underline.is_custom(),
      self.highlight.is_custom(),
      self.quote.is_custom(),
      self.image.is_custom(),
      self.line_break.is_custom(),
      self.link.is_custom(),
      self.raw_html_tag.is_custom(),
      self.triple_emphasis.is_custom(),
      self.strikethrough.is_custom(),
      self.superscript.is_custom(),
      self.footnote_ref.is_custom(),
      self.entity.is_custom(),
      self.normal_text.is_custom(),
      self.doc_header.is_custom(),
      self.doc_footer.is_custom(),
    ]
    .into_iter()
    .filter(|&custom| custom)
    .count()
  }
}

#[cfg(test)]
mod tests {
  use super::{Overrides, RendererTable, SpanOutput};

  #[test]
  fn empty_overrides_resolve_to_defaults() {
    let table = RendererTable::resolve(Overrides::new());
    assert!(!table.paragraph.is_custom());
    assert!(!table.emphasis.is_custom());
    assert!(!table.doc_header.is_custom());
  }

  #[test]
  fn supplied_slots_resolve_to_custom() {
    let overrides = Overrides::new()
      .emphasis(|text| SpanOutput::Accepted(text.to_owned()))
      .paragraph(str::to_owned);
    let table = RendererTable::resolve(overrides);
    assert!(table.emphasis.is_custom());
    assert!(table.paragraph.is_custom());
    // Unrelated slots stay on the default emitter.
    assert!(!table.double_emphasis.is_custom());
  }

  #[test]
  fn span_output_from_str() {
    assert_eq!(SpanOutput::from("x"), SpanOutput::Accepted("x".to_owned()));
  }
}
