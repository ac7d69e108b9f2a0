//! The parse-and-render stage: walks the CommonMark AST bottom-up,
//! marshals rendered child fragments, and dispatches each node to its
//! renderer slot.
//!
//! Dispatch is containment-aware: a custom handler that panics is caught
//! here. Span slots degrade the one node to its literal source text, block
//! slots degrade to emitting nothing, and the render pass continues either
//! way. Handlers hand back owned strings rather than writing into the
//! output directly, so a failed handler cannot leave partial output
//! behind.

use std::{
  collections::HashMap,
  panic::{AssertUnwindSafe, catch_unwind},
};

use comrak::{
  Arena, Options,
  nodes::{AstNode, ListType, NodeValue, TableAlignment},
  parse_document,
};
use log::{error, warn};

use crate::{
  buffer::OutputBuffer,
  flags::{Extensions, RenderFlags, TableFlags},
  html,
  renderer::{RendererTable, Slot, SpanOutput},
};

/// Render one document through the resolved renderer table into `out`.
pub(crate) fn render_document(
  table: &RendererTable,
  extensions: Extensions,
  flags: RenderFlags,
  input: &str,
  out: &mut OutputBuffer,
) {
  let arena = Arena::new();
  let options = comrak_options(extensions);
  let root = parse_document(&arena, input, &options);

  let mut pass = RenderPass::new(table, flags, input);
  pass.assign_footnote_numbers(root);

  let mut body = String::new();
  if let Slot::Custom(f) = &table.doc_header {
    body.push_str(&contain_block("doc_header", || f()));
  }
  for child in root.children() {
    if matches!(child.data.borrow().value, NodeValue::FootnoteDefinition(_)) {
      continue;
    }
    pass.render_block(child, &mut body);
  }
  pass.render_footnotes(root, &mut body);
  if let Slot::Custom(f) = &table.doc_footer {
    body.push_str(&contain_block("doc_footer", || f()));
  }
  out.push_str(&body);
}

/// Map the extension set onto the parser's options.
///
/// `FENCED_CODE`, `LAX_SPACING`, `SPACE_HEADERS`, and `NO_INTRA_EMPHASIS`
/// describe behavior the CommonMark core already has; `HIGHLIGHT`,
/// `QUOTE`, and `DISABLE_INDENTED_CODE` have no parser-side equivalent.
/// All seven are accepted and ignored here.
fn comrak_options(extensions: Extensions) -> Options<'static> {
  let mut options = Options::default();
  options.extension.autolink = extensions.contains(Extensions::AUTOLINK);
  options.extension.footnotes = extensions.contains(Extensions::FOOTNOTES);
  options.extension.strikethrough =
    extensions.contains(Extensions::STRIKETHROUGH);
  options.extension.superscript = extensions.contains(Extensions::SUPERSCRIPT);
  options.extension.table = extensions.contains(Extensions::TABLES);
  options.extension.underline = extensions.contains(Extensions::UNDERLINE);
  options
}

struct RenderPass<'r, 's> {
  table:            &'r RendererTable,
  flags:            RenderFlags,
  source:           &'s str,
  line_offsets:     Vec<usize>,
  toc_counter:      u32,
  footnote_numbers: HashMap<String, u32>,
}

impl<'r, 's> RenderPass<'r, 's> {
  fn new(table: &'r RendererTable, flags: RenderFlags, source: &'s str) -> Self {
    let mut line_offsets = vec![0];
    for (i, b) in source.bytes().enumerate() {
      if b == b'\n' {
        line_offsets.push(i + 1);
      }
    }
    Self {
      table,
      flags,
      source,
      line_offsets,
      toc_counter: 0,
      footnote_numbers: HashMap::new(),
    }
  }

  /// Number footnotes by first reference, in document order. The parser's
  /// own numbering follows definition order instead.
  fn assign_footnote_numbers<'a>(&mut self, root: &'a AstNode<'a>) {
    for node in root.descendants() {
      if let NodeValue::FootnoteReference(nfr) = &node.data.borrow().value {
        let next = self.footnote_numbers.len() as u32 + 1;
        self
          .footnote_numbers
          .entry(nfr.name.clone())
          .or_insert(next);
      }
    }
  }

  fn render_block<'a>(&mut self, node: &'a AstNode<'a>, out: &mut String) {
    let table = self.table;
    let data = node.data.borrow();
    match &data.value {
      NodeValue::Paragraph => {
        let content = self.render_inline_children(node);
        match &table.paragraph {
          Slot::Default => html::paragraph(out, &content),
          Slot::Custom(f) => {
            out.push_str(&contain_block("paragraph", || f(&content)));
          }
        }
      }
      NodeValue::Heading(nh) => {
        let content = self.render_inline_children(node);
        match &table.header {
          Slot::Default => {
            html::header(out, &content, nh.level, self.flags, &mut self.toc_counter);
          }
          Slot::Custom(f) => {
            out.push_str(&contain_block("header", || f(&content, nh.level)));
          }
        }
      }
      NodeValue::BlockQuote => {
        let content = self.render_block_children(node);
        match &table.block_quote {
          Slot::Default => html::block_quote(out, &content),
          Slot::Custom(f) => {
            out.push_str(&contain_block("block_quote", || f(&content)));
          }
        }
      }
      NodeValue::CodeBlock(ncb) => {
        let lang = ncb.info.split_whitespace().next().unwrap_or("");
        match &table.block_code {
          Slot::Default => html::block_code(out, &ncb.literal, lang, self.flags),
          Slot::Custom(f) => {
            out.push_str(&contain_block("block_code", || f(&ncb.literal, lang)));
          }
        }
      }
      NodeValue::HtmlBlock(nhb) => match &table.block_html {
        Slot::Default => html::block_html(out, &nhb.literal, self.flags),
        Slot::Custom(f) => {
          out.push_str(&contain_block("block_html", || f(&nhb.literal)));
        }
      },
      NodeValue::ThematicBreak => match &table.hrule {
        Slot::Default => html::hrule(out, self.flags),
        Slot::Custom(f) => out.push_str(&contain_block("hrule", || f())),
      },
      NodeValue::List(nl) => {
        let ordered = matches!(nl.list_type, ListType::Ordered);
        let tight = nl.tight;
        let mut items = String::new();
        for item in node.children() {
          self.render_list_item(item, ordered, tight, &mut items);
        }
        match &table.list {
          Slot::Default => html::list(out, &items, ordered),
          Slot::Custom(f) => {
            out.push_str(&contain_block("list", || f(&items, ordered)));
          }
        }
      }
      NodeValue::Table(nt) => {
        let alignments = nt.alignments.clone();
        let mut header = String::new();
        let mut body = String::new();
        for row in node.children() {
          let is_header =
            matches!(row.data.borrow().value, NodeValue::TableRow(true));
          let target = if is_header { &mut header } else { &mut body };
          self.render_table_row(row, &alignments, is_header, target);
        }
        match &table.table {
          Slot::Default => html::table(out, &header, &body),
          Slot::Custom(f) => {
            out.push_str(&contain_block("table", || f(&header, &body)));
          }
        }
      }
      // Definitions are rendered in the footnote section, not in place.
      NodeValue::FootnoteDefinition(_) => {}
      _ => {
        drop(data);
        for child in node.children() {
          self.render_block(child, out);
        }
      }
    }
  }

  fn render_block_children<'a>(&mut self, node: &'a AstNode<'a>) -> String {
    let mut content = String::new();
    for child in node.children() {
      self.render_block(child, &mut content);
    }
    content
  }

  /// Items of tight lists unwrap their paragraphs: the inline content is
  /// rendered bare, without firing the paragraph slot.
  fn render_list_item<'a>(
    &mut self,
    item: &'a AstNode<'a>,
    ordered: bool,
    tight: bool,
    out: &mut String,
  ) {
    let mut content = String::new();
    for child in item.children() {
      if tight && matches!(child.data.borrow().value, NodeValue::Paragraph) {
        content.push_str(&self.render_inline_children(child));
        content.push('\n');
      } else {
        self.render_block(child, &mut content);
      }
    }
    match &self.table.list_item {
      Slot::Default => html::list_item(out, &content, ordered),
      Slot::Custom(f) => {
        out.push_str(&contain_block("list_item", || f(&content, ordered)));
      }
    }
  }

  fn render_table_row<'a>(
    &mut self,
    row: &'a AstNode<'a>,
    alignments: &[TableAlignment],
    is_header: bool,
    out: &mut String,
  ) {
    let mut cells = String::new();
    for (i, cell) in row.children().enumerate() {
      let mut cell_flags = match alignments.get(i) {
        Some(TableAlignment::Left) => TableFlags::ALIGN_LEFT,
        Some(TableAlignment::Right) => TableFlags::ALIGN_RIGHT,
        Some(TableAlignment::Center) => TableFlags::ALIGN_CENTER,
        _ => TableFlags::empty(),
      };
      if is_header {
        cell_flags |= TableFlags::HEADER;
      }
      let content = self.render_inline_children(cell);
      match &self.table.table_cell {
        Slot::Default => html::table_cell(&mut cells, &content, cell_flags),
        Slot::Custom(f) => {
          cells
            .push_str(&contain_block("table_cell", || f(&content, cell_flags)));
        }
      }
    }
    match &self.table.table_row {
      Slot::Default => html::table_row(out, &cells),
      Slot::Custom(f) => {
        out.push_str(&contain_block("table_row", || f(&cells)));
      }
    }
  }

  fn render_footnotes<'a>(&mut self, root: &'a AstNode<'a>, out: &mut String) {
    if self.footnote_numbers.is_empty() {
      return;
    }
    let mut defs: Vec<(u32, &AstNode)> = root
      .children()
      .filter_map(|child| {
        if let NodeValue::FootnoteDefinition(def) = &child.data.borrow().value {
          self.footnote_numbers.get(&def.name).map(|&n| (n, child))
        } else {
          None
        }
      })
      .collect();
    defs.sort_by_key(|&(n, _)| n);

    let mut list = String::new();
    for (number, node) in defs {
      let content = self.render_block_children(node);
      match &self.table.footnote_def {
        Slot::Default => html::footnote_def(&mut list, &content, number),
        Slot::Custom(f) => {
          list.push_str(&contain_block("footnote_def", || f(&content, number)));
        }
      }
    }
    match &self.table.footnotes {
      Slot::Default => html::footnotes(out, &list, self.flags),
      Slot::Custom(f) => {
        out.push_str(&contain_block("footnotes", || f(&list)));
      }
    }
  }

  fn render_inline_children<'a>(&mut self, node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    for child in node.children() {
      self.render_inline(child, &mut out);
    }
    out
  }

  fn render_inline<'a>(&mut self, node: &'a AstNode<'a>, out: &mut String) {
    let table = self.table;
    let data = node.data.borrow();
    match &data.value {
      NodeValue::Text(_) => {
        drop(data);
        self.emit_text(node, out);
      }
      // HARD_WRAP promotes soft breaks to hard ones: they go through the
      // line_break slot instead of reaching the text as a newline.
      NodeValue::SoftBreak => {
        if self.flags.contains(RenderFlags::HARD_WRAP) {
          match &table.line_break {
            Slot::Default => html::line_break(out, self.flags),
            Slot::Custom(f) => {
              let result = contain_span("line_break", || f());
              self.emit_span(result, node, out);
            }
          }
        } else {
          self.dispatch_normal_text("\n", out);
        }
      }
      NodeValue::LineBreak => match &table.line_break {
        Slot::Default => html::line_break(out, self.flags),
        Slot::Custom(f) => {
          let result = contain_span("line_break", || f());
          self.emit_span(result, node, out);
        }
      },
      NodeValue::Code(nc) => match &table.codespan {
        Slot::Default => html::codespan(out, &nc.literal),
        Slot::Custom(f) => {
          let result = contain_span("codespan", || f(&nc.literal));
          self.emit_span(result, node, out);
        }
      },
      NodeValue::HtmlInline(tag) => match &table.raw_html_tag {
        Slot::Default => html::raw_html_tag(out, tag, self.flags),
        Slot::Custom(f) => {
          let result = contain_span("raw_html_tag", || f(tag));
          self.emit_span(result, node, out);
        }
      },
      NodeValue::Emph | NodeValue::Strong => {
        let strong = matches!(data.value, NodeValue::Strong);
        drop(data);
        self.render_emphasis(node, strong, out);
      }
      NodeValue::Underline => {
        drop(data);
        let content = self.render_inline_children(node);
        match &table.underline {
          Slot::Default => html::underline(out, &content),
          Slot::Custom(f) => {
            let result = contain_span("underline", || f(&content));
            self.emit_span(result, node, out);
          }
        }
      }
      NodeValue::Strikethrough => {
        drop(data);
        let content = self.render_inline_children(node);
        match &table.strikethrough {
          Slot::Default => html::strikethrough(out, &content),
          Slot::Custom(f) => {
            let result = contain_span("strikethrough", || f(&content));
            self.emit_span(result, node, out);
          }
        }
      }
      NodeValue::Superscript => {
        drop(data);
        let content = self.render_inline_children(node);
        match &table.superscript {
          Slot::Default => html::superscript(out, &content),
          Slot::Custom(f) => {
            let result = contain_span("superscript", || f(&content));
            self.emit_span(result, node, out);
          }
        }
      }
      NodeValue::Link(nl) => {
        let url = nl.url.clone();
        let title = if nl.title.is_empty() {
          None
        } else {
          Some(nl.title.clone())
        };
        drop(data);
        if self.is_autolink(node, &url) {
          let is_email = url.starts_with("mailto:");
          match &table.autolink {
            Slot::Default => {
              if !html::autolink(out, &url, is_email, self.flags) {
                out.push_str(self.source_slice(node));
              }
            }
            Slot::Custom(f) => {
              let result = contain_span("autolink", || f(&url, is_email));
              self.emit_span(result, node, out);
            }
          }
        } else {
          let content = self.render_inline_children(node);
          match &table.link {
            Slot::Default => {
              if !html::link(out, &url, title.as_deref(), &content, self.flags) {
                out.push_str(self.source_slice(node));
              }
            }
            Slot::Custom(f) => {
              let result = contain_span("link", || {
                f(&url, title.as_deref(), &content)
              });
              self.emit_span(result, node, out);
            }
          }
        }
      }
      NodeValue::Image(nl) => {
        let url = nl.url.clone();
        let title = if nl.title.is_empty() {
          None
        } else {
          Some(nl.title.clone())
        };
        drop(data);
        let mut alt = String::new();
        collect_text(node, &mut alt);
        match &table.image {
          Slot::Default => {
            if !html::image(out, &url, title.as_deref(), &alt, self.flags) {
              out.push_str(self.source_slice(node));
            }
          }
          Slot::Custom(f) => {
            let result =
              contain_span("image", || f(&url, title.as_deref(), &alt));
            self.emit_span(result, node, out);
          }
        }
      }
      NodeValue::FootnoteReference(nfr) => {
        let number = self.footnote_numbers.get(&nfr.name).copied().unwrap_or(0);
        match &table.footnote_ref {
          Slot::Default => html::footnote_ref(out, number),
          Slot::Custom(f) => {
            let result = contain_span("footnote_ref", || f(number));
            self.emit_span(result, node, out);
          }
        }
      }
      _ => {
        drop(data);
        for child in node.children() {
          self.render_inline(child, out);
        }
      }
    }
  }

  /// `***text***` parses as nested emphasis with a single wrapper child;
  /// collapse that shape into the triple-emphasis slot. The source text is
  /// consulted so that genuinely nested forms like `*__text__*` keep
  /// firing both single slots.
  fn render_emphasis<'a>(
    &mut self,
    node: &'a AstNode<'a>,
    strong: bool,
    out: &mut String,
  ) {
    let table = self.table;
    if let Some(inner) = self.triple_inner(node) {
      let content = self.render_inline_children(inner);
      match &table.triple_emphasis {
        Slot::Default => html::triple_emphasis(out, &content),
        Slot::Custom(f) => {
          let result = contain_span("triple_emphasis", || f(&content));
          self.emit_span(result, node, out);
        }
      }
      return;
    }
    let content = self.render_inline_children(node);
    if strong {
      match &table.double_emphasis {
        Slot::Default => html::double_emphasis(out, &content),
        Slot::Custom(f) => {
          let result = contain_span("double_emphasis", || f(&content));
          self.emit_span(result, node, out);
        }
      }
    } else {
      match &table.emphasis {
        Slot::Default => html::emphasis(out, &content),
        Slot::Custom(f) => {
          let result = contain_span("emphasis", || f(&content));
          self.emit_span(result, node, out);
        }
      }
    }
  }

  fn triple_inner<'a>(
    &self,
    node: &'a AstNode<'a>,
  ) -> Option<&'a AstNode<'a>> {
    let mut children = node.children();
    let only = children.next()?;
    if children.next().is_some() {
      return None;
    }
    if !matches!(
      only.data.borrow().value,
      NodeValue::Emph | NodeValue::Strong
    ) {
      return None;
    }
    let source = self.source_slice(node);
    (source.starts_with("***") || source.starts_with("___")).then_some(only)
  }

  /// A link that did not come from bracket syntax is an autolink: either
  /// the autolink extension or an angle-bracket form. Bracketed links
  /// whose label happens to spell out the target stay on the `link` slot.
  fn is_autolink<'a>(&self, node: &'a AstNode<'a>, url: &str) -> bool {
    if url.is_empty() {
      return false;
    }
    let source = self.source_slice(node);
    if source.starts_with('[') {
      return false;
    }
    if !source.is_empty() {
      return true;
    }
    // Autolinks synthesized in postprocessing can lack a usable position;
    // for those, a label equal to its own target is the telltale.
    let mut children = node.children();
    if let (Some(only), None) = (children.next(), children.next()) {
      if let NodeValue::Text(text) = &only.data.borrow().value {
        return *text == url
          || url.strip_prefix("mailto:") == Some(text.as_str())
          || url.strip_prefix("http://") == Some(text.as_str());
      }
    }
    false
  }

  /// Split a text run on preserved HTML entities: entity slots get the
  /// `&...;` sequences verbatim, normal-text slots get everything else.
  fn emit_text<'a>(&mut self, node: &'a AstNode<'a>, out: &mut String) {
    let data = node.data.borrow();
    let NodeValue::Text(text) = &data.value else {
      return;
    };
    let table = self.table;
    let mut start = 0;
    let mut cursor = 0;
    while let Some(rel) = text[cursor..].find('&') {
      let amp = cursor + rel;
      if let Some(len) = entity_len(&text[amp..]) {
        if amp > start {
          self.dispatch_normal_text(&text[start..amp], out);
        }
        let entity = &text[amp..amp + len];
        match &table.entity {
          Slot::Default => html::entity(out, entity),
          Slot::Custom(f) => match catch_unwind(AssertUnwindSafe(|| f(entity))) {
            Ok(rendered) => out.push_str(&rendered),
            Err(payload) => {
              warn!(
                "entity handler panicked, falling back to source text: {}",
                panic_message(payload.as_ref()).unwrap_or("unknown panic")
              );
              out.push_str(entity);
            }
          },
        }
        start = amp + len;
        cursor = start;
      } else {
        cursor = amp + 1;
      }
    }
    if start < text.len() {
      self.dispatch_normal_text(&text[start..], out);
    }
  }

  fn dispatch_normal_text(&self, text: &str, out: &mut String) {
    match &self.table.normal_text {
      Slot::Default => html::normal_text(out, text),
      Slot::Custom(f) => match catch_unwind(AssertUnwindSafe(|| f(text))) {
        Ok(rendered) => out.push_str(&rendered),
        Err(payload) => {
          warn!(
            "normal_text handler panicked, falling back to source text: {}",
            panic_message(payload.as_ref()).unwrap_or("unknown panic")
          );
          out.push_str(text);
        }
      },
    }
  }

  fn emit_span<'a>(
    &self,
    result: SpanOutput,
    node: &'a AstNode<'a>,
    out: &mut String,
  ) {
    match result {
      SpanOutput::Accepted(text) => out.push_str(&text),
      SpanOutput::Declined => out.push_str(self.source_slice(node)),
    }
  }

  /// Byte slice of the source text covered by a node's position. Positions
  /// are 1-based with an inclusive end column; synthesized nodes without a
  /// position yield the empty string.
  fn source_slice<'a>(&self, node: &'a AstNode<'a>) -> &'s str {
    let sp = node.data.borrow().sourcepos;
    if sp.start.line == 0 || sp.end.line == 0 {
      return "";
    }
    let start = self.byte_offset(sp.start.line, sp.start.column);
    let end = self.byte_offset(sp.end.line, sp.end.column + 1);
    let end = end.min(self.source.len());
    let start = start.min(end);
    self.source.get(start..end).unwrap_or("")
  }

  fn byte_offset(&self, line: usize, column: usize) -> usize {
    self
      .line_offsets
      .get(line - 1)
      .map_or(self.source.len(), |off| off + column - 1)
  }
}

/// Length of a well-formed entity (`&name;`, `&#digits;`, `&#xhex;`) at
/// the start of `text`, if any.
fn entity_len(text: &str) -> Option<usize> {
  let bytes = text.as_bytes();
  debug_assert_eq!(bytes.first(), Some(&b'&'));
  let (prefix, valid): (usize, fn(u8) -> bool) = match (bytes.get(1), bytes.get(2)) {
    (Some(b'#'), Some(b'x' | b'X')) => (3, |b: u8| b.is_ascii_hexdigit()),
    (Some(b'#'), _) => (2, |b: u8| b.is_ascii_digit()),
    (Some(b), _) if b.is_ascii_alphabetic() => {
      (1, |b: u8| b.is_ascii_alphanumeric())
    }
    _ => return None,
  };
  let mut i = prefix;
  while i < bytes.len() && valid(bytes[i]) {
    i += 1;
  }
  if i > prefix && i - prefix <= 32 && bytes.get(i) == Some(&b';') {
    Some(i + 1)
  } else {
    None
  }
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
  for descendant in node.descendants() {
    match &descendant.data.borrow().value {
      NodeValue::Text(text) => out.push_str(text),
      NodeValue::Code(code) => out.push_str(&code.literal),
      NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
      _ => {}
    }
  }
}

fn contain_block(slot: &str, f: impl FnOnce() -> String) -> String {
  match catch_unwind(AssertUnwindSafe(f)) {
    Ok(text) => text,
    Err(payload) => {
      match panic_message(payload.as_ref()) {
        Some(msg) => error!("{slot} handler panicked, node dropped: {msg}"),
        None => error!("{slot} handler panicked, node dropped"),
      }
      String::new()
    }
  }
}

fn contain_span(slot: &str, f: impl FnOnce() -> SpanOutput) -> SpanOutput {
  match catch_unwind(AssertUnwindSafe(f)) {
    Ok(output) => output,
    Err(payload) => {
      match panic_message(payload.as_ref()) {
        Some(msg) => {
          warn!("{slot} handler panicked, falling back to source text: {msg}");
        }
        None => warn!("{slot} handler panicked, falling back to source text"),
      }
      SpanOutput::Declined
    }
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> Option<&str> {
  payload
    .downcast_ref::<String>()
    .map(String::as_str)
    .or_else(|| payload.downcast_ref::<&str>().copied())
}
