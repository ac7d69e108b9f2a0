//! Bit flags configuring the parser and the default HTML emitter.
//!
//! `Extensions` selects markdown syntax extensions and is handed to the
//! underlying parser. `RenderFlags` selects behaviors of the default HTML
//! emitter, plus the pipeline-level [`RenderFlags::SMARTYPANTS`] pass.
//! Both are fixed at construction of a [`Processor`](crate::Processor).

use bitflags::bitflags;

bitflags! {
  /// Markdown syntax extensions.
  ///
  /// These affect only what the underlying parser recognizes, never how
  /// recognized nodes are dispatched. Flags naming behavior the CommonMark
  /// engine already has unconditionally (`FENCED_CODE`, `LAX_SPACING`,
  /// `SPACE_HEADERS`, `NO_INTRA_EMPHASIS`) or has no syntax for
  /// (`HIGHLIGHT`, `QUOTE`, `DISABLE_INDENTED_CODE`) are accepted for
  /// interface compatibility and are no-ops; the corresponding renderer
  /// slots still exist and can be overridden.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  pub struct Extensions: u32 {
    /// Recognize bare URLs and email addresses as links.
    const AUTOLINK = 1 << 0;
    /// Do not treat indented blocks as code.
    const DISABLE_INDENTED_CODE = 1 << 1;
    /// Fenced code blocks (backticks or tildes).
    const FENCED_CODE = 1 << 2;
    /// Footnote references and definitions.
    const FOOTNOTES = 1 << 3;
    /// `==highlighted==` spans.
    const HIGHLIGHT = 1 << 4;
    /// Allow block elements without surrounding blank lines.
    const LAX_SPACING = 1 << 5;
    /// Do not emphasize text_like_this inside words.
    const NO_INTRA_EMPHASIS = 1 << 6;
    /// `"quoted"` spans rendered as `<q>` elements.
    const QUOTE = 1 << 7;
    /// Require a space between `#` and header text.
    const SPACE_HEADERS = 1 << 8;
    /// `~~strikethrough~~` spans.
    const STRIKETHROUGH = 1 << 9;
    /// `^superscript` spans.
    const SUPERSCRIPT = 1 << 10;
    /// Pipe tables.
    const TABLES = 1 << 11;
    /// `_underlined_` spans rendered as `<u>` instead of `<em>`.
    const UNDERLINE = 1 << 12;
  }
}

bitflags! {
  /// Behaviors of the default HTML emitter.
  ///
  /// Custom handlers see none of these flags. Two are consulted outside
  /// the emitter: [`RenderFlags::HARD_WRAP`] makes the engine route soft
  /// line breaks through the `line_break` slot, and
  /// [`RenderFlags::SMARTYPANTS`] enables the post-render beautification
  /// pass over the finished buffer.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  pub struct RenderFlags: u32 {
    /// Escape all raw HTML found in the input.
    const ESCAPE = 1 << 0;
    /// Expand hard tabs in code blocks to four-column tab stops.
    const EXPAND_TABS = 1 << 1;
    /// Turn soft line breaks inside paragraphs into `<br>`.
    const HARD_WRAP = 1 << 2;
    /// Only emit links whose target uses an allowlisted scheme.
    const SAFELINK = 1 << 3;
    /// Drop raw HTML blocks and inline tags.
    const SKIP_HTML = 1 << 4;
    /// Decline images, letting their source text through verbatim.
    const SKIP_IMAGES = 1 << 5;
    /// Decline links, letting their source text through verbatim.
    const SKIP_LINKS = 1 << 6;
    /// Drop `<style>` blocks and tags.
    const SKIP_STYLE = 1 << 7;
    /// Give headers sequential `toc_N` anchor ids.
    const TOC = 1 << 8;
    /// Emit self-closing tags (`<br/>`, `<hr/>`, `<img …/>`).
    const USE_XHTML = 1 << 9;
    /// Run the smartypants beautification pass over the finished output.
    const SMARTYPANTS = 1 << 10;
  }
}

bitflags! {
  /// Flags passed to the `table_cell` slot, uninterpreted.
  ///
  /// Alignment occupies the low two bits; `HEADER` marks cells in the
  /// table's header row.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  pub struct TableFlags: u32 {
    const ALIGN_LEFT = 1;
    const ALIGN_RIGHT = 2;
    const ALIGN_CENTER = 3;
    const ALIGNMASK = 3;
    const HEADER = 4;
  }
}

impl TableFlags {
  /// The alignment bits of this cell, with `HEADER` and anything else
  /// masked off.
  #[must_use]
  pub const fn alignment(self) -> Self {
    Self::from_bits_truncate(self.bits() & Self::ALIGNMASK.bits())
  }

  /// Whether this cell sits in the table's header row.
  #[must_use]
  pub const fn is_header(self) -> bool {
    self.bits() & Self::HEADER.bits() != 0
  }
}
