//! The default HTML emitter backing every renderer slot that has no
//! custom handler.
//!
//! Fragment shapes follow the classic Hoedown HTML renderer: block
//! emitters separate themselves from preceding sibling output with a
//! newline, spans write inline. The emitters consult [`RenderFlags`] for
//! their variants (XHTML self-closing tags, TOC anchors, link policy);
//! custom handlers never see these flags.

use std::borrow::Cow;

use crate::flags::{RenderFlags, TableFlags};

/// Escape text content: `&`, `<`, `>`, `"`, and `'`.
pub(crate) fn escape_html(text: &str) -> Cow<'_, str> {
  html_escape::encode_quoted_attribute(text)
}

/// Escape a double-quoted attribute value.
pub(crate) fn escape_attr(text: &str) -> Cow<'_, str> {
  html_escape::encode_double_quoted_attribute(text)
}

/// Scheme allowlist applied by [`RenderFlags::SAFELINK`]. Relative and
/// fragment targets always pass.
pub(crate) fn is_safe_link(link: &str) -> bool {
  link.starts_with("http://")
    || link.starts_with("https://")
    || link.starts_with("ftp://")
    || link.starts_with("mailto:")
    || link.starts_with('/')
    || link.starts_with('#')
}

/// Block separator: blocks after the first are preceded by a blank line's
/// worth of newline in the enclosing fragment.
fn sep(out: &mut String) {
  if !out.is_empty() {
    out.push('\n');
  }
}

/// Expand hard tabs to four-column tab stops, line by line.
fn expand_tabs(text: &str) -> String {
  let mut expanded = String::with_capacity(text.len());
  let mut column = 0usize;
  for ch in text.chars() {
    match ch {
      '\t' => {
        let pad = 4 - column % 4;
        for _ in 0..pad {
          expanded.push(' ');
        }
        column += pad;
      }
      '\n' => {
        expanded.push('\n');
        column = 0;
      }
      other => {
        expanded.push(other);
        column += 1;
      }
    }
  }
  expanded
}

pub(crate) fn block_code(out: &mut String, text: &str, lang: &str, flags: RenderFlags) {
  sep(out);
  if lang.is_empty() {
    out.push_str("<pre><code>");
  } else {
    out.push_str("<pre><code class=\"language-");
    out.push_str(&escape_attr(lang));
    out.push_str("\">");
  }
  if flags.contains(RenderFlags::EXPAND_TABS) {
    out.push_str(&escape_html(&expand_tabs(text)));
  } else {
    out.push_str(&escape_html(text));
  }
  out.push_str("</code></pre>\n");
}

pub(crate) fn block_quote(out: &mut String, content: &str) {
  sep(out);
  out.push_str("<blockquote>\n");
  out.push_str(content);
  out.push_str("</blockquote>\n");
}

pub(crate) fn block_html(out: &mut String, text: &str, flags: RenderFlags) {
  if flags.contains(RenderFlags::SKIP_HTML) {
    return;
  }
  let trimmed = text.trim_end_matches('\n');
  if flags.contains(RenderFlags::SKIP_STYLE) && is_style_tag(trimmed) {
    return;
  }
  sep(out);
  if flags.contains(RenderFlags::ESCAPE) {
    out.push_str(&escape_html(trimmed));
  } else {
    out.push_str(trimmed);
  }
  out.push('\n');
}

pub(crate) fn header(
  out: &mut String,
  content: &str,
  level: u8,
  flags: RenderFlags,
  toc_counter: &mut u32,
) {
  sep(out);
  if flags.contains(RenderFlags::TOC) {
    out.push_str(&format!("<h{level} id=\"toc_{toc_counter}\">"));
    *toc_counter += 1;
  } else {
    out.push_str(&format!("<h{level}>"));
  }
  out.push_str(content);
  out.push_str(&format!("</h{level}>\n"));
}

pub(crate) fn hrule(out: &mut String, flags: RenderFlags) {
  sep(out);
  out.push_str(if flags.contains(RenderFlags::USE_XHTML) {
    "<hr/>\n"
  } else {
    "<hr>\n"
  });
}

pub(crate) fn list(out: &mut String, content: &str, ordered: bool) {
  sep(out);
  out.push_str(if ordered { "<ol>\n" } else { "<ul>\n" });
  out.push_str(content);
  out.push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
}

pub(crate) fn list_item(out: &mut String, content: &str, _ordered: bool) {
  out.push_str("<li>");
  out.push_str(content.trim_end_matches('\n'));
  out.push_str("</li>\n");
}

pub(crate) fn paragraph(out: &mut String, content: &str) {
  sep(out);
  out.push_str("<p>");
  out.push_str(content);
  out.push_str("</p>\n");
}

pub(crate) fn table(out: &mut String, header: &str, body: &str) {
  sep(out);
  out.push_str("<table><thead>\n");
  out.push_str(header);
  out.push_str("</thead><tbody>\n");
  out.push_str(body);
  out.push_str("</tbody></table>\n");
}

pub(crate) fn table_row(out: &mut String, cells: &str) {
  out.push_str("<tr>\n");
  out.push_str(cells);
  out.push_str("</tr>\n");
}

pub(crate) fn table_cell(out: &mut String, content: &str, cell_flags: TableFlags) {
  let tag = if cell_flags.is_header() { "th" } else { "td" };
  out.push('<');
  out.push_str(tag);
  let alignment = cell_flags.alignment();
  if alignment == TableFlags::ALIGN_LEFT {
    out.push_str(" style=\"text-align: left\"");
  } else if alignment == TableFlags::ALIGN_RIGHT {
    out.push_str(" style=\"text-align: right\"");
  } else if alignment == TableFlags::ALIGN_CENTER {
    out.push_str(" style=\"text-align: center\"");
  }
  out.push('>');
  out.push_str(content);
  out.push_str("</");
  out.push_str(tag);
  out.push_str(">\n");
}

pub(crate) fn footnotes(out: &mut String, text: &str, flags: RenderFlags) {
  sep(out);
  out.push_str("<div class=\"footnotes\">\n");
  out.push_str(if flags.contains(RenderFlags::USE_XHTML) {
    "<hr/>\n"
  } else {
    "<hr>\n"
  });
  out.push_str("<ol>\n");
  out.push_str(text);
  out.push_str("\n</ol>\n</div>\n");
}

pub(crate) fn footnote_def(out: &mut String, content: &str, number: u32) {
  out.push_str(&format!("\n<li id=\"fn{number}\">\n"));
  let backref =
    format!("&nbsp;<a href=\"#fnref{number}\" rev=\"footnote\">&#8617;</a>");
  // The back reference goes inside the definition's final paragraph.
  if let Some(pos) = content.rfind("</p>") {
    out.push_str(&content[..pos]);
    out.push_str(&backref);
    out.push_str(&content[pos..]);
  } else {
    out.push_str(content);
    out.push_str(&backref);
  }
  out.push_str("</li>\n");
}

pub(crate) fn autolink(
  out: &mut String,
  link: &str,
  is_email: bool,
  flags: RenderFlags,
) -> bool {
  if flags.contains(RenderFlags::SKIP_LINKS) {
    return false;
  }
  if flags.contains(RenderFlags::SAFELINK) && !is_safe_link(link) {
    return false;
  }
  out.push_str("<a href=\"");
  out.push_str(&escape_attr(link));
  out.push_str("\">");
  let display = if is_email {
    link.strip_prefix("mailto:").unwrap_or(link)
  } else {
    link
  };
  out.push_str(&escape_html(display));
  out.push_str("</a>");
  true
}

pub(crate) fn codespan(out: &mut String, text: &str) {
  out.push_str("<code>");
  out.push_str(&escape_html(text));
  out.push_str("</code>");
}

pub(crate) fn double_emphasis(out: &mut String, content: &str) {
  out.push_str("<strong>");
  out.push_str(content);
  out.push_str("</strong>");
}

pub(crate) fn emphasis(out: &mut String, content: &str) {
  out.push_str("<em>");
  out.push_str(content);
  out.push_str("</em>");
}

pub(crate) fn triple_emphasis(out: &mut String, content: &str) {
  out.push_str("<strong><em>");
  out.push_str(content);
  out.push_str("</em></strong>");
}

pub(crate) fn underline(out: &mut String, content: &str) {
  out.push_str("<u>");
  out.push_str(content);
  out.push_str("</u>");
}

pub(crate) fn strikethrough(out: &mut String, content: &str) {
  out.push_str("<del>");
  out.push_str(content);
  out.push_str("</del>");
}

pub(crate) fn superscript(out: &mut String, content: &str) {
  out.push_str("<sup>");
  out.push_str(content);
  out.push_str("</sup>");
}

pub(crate) fn image(
  out: &mut String,
  url: &str,
  title: Option<&str>,
  alt: &str,
  flags: RenderFlags,
) -> bool {
  if flags.contains(RenderFlags::SKIP_IMAGES) {
    return false;
  }
  out.push_str("<img src=\"");
  out.push_str(&escape_attr(url));
  out.push_str("\" alt=\"");
  out.push_str(&escape_attr(alt));
  out.push('"');
  if let Some(title) = title {
    out.push_str(" title=\"");
    out.push_str(&escape_attr(title));
    out.push('"');
  }
  out.push_str(if flags.contains(RenderFlags::USE_XHTML) {
    "/>"
  } else {
    ">"
  });
  true
}

pub(crate) fn line_break(out: &mut String, flags: RenderFlags) {
  out.push_str(if flags.contains(RenderFlags::USE_XHTML) {
    "<br/>\n"
  } else {
    "<br>\n"
  });
}

pub(crate) fn link(
  out: &mut String,
  url: &str,
  title: Option<&str>,
  content: &str,
  flags: RenderFlags,
) -> bool {
  if flags.contains(RenderFlags::SKIP_LINKS) {
    return false;
  }
  if flags.contains(RenderFlags::SAFELINK) && !is_safe_link(url) {
    return false;
  }
  out.push_str("<a href=\"");
  out.push_str(&escape_attr(url));
  out.push('"');
  if let Some(title) = title {
    out.push_str(" title=\"");
    out.push_str(&escape_attr(title));
    out.push('"');
  }
  out.push('>');
  out.push_str(content);
  out.push_str("</a>");
  true
}

pub(crate) fn raw_html_tag(out: &mut String, tag: &str, flags: RenderFlags) {
  if flags.contains(RenderFlags::SKIP_HTML) {
    return;
  }
  if flags.contains(RenderFlags::SKIP_STYLE) && is_style_tag(tag) {
    return;
  }
  if flags.contains(RenderFlags::ESCAPE) {
    out.push_str(&escape_html(tag));
  } else {
    out.push_str(tag);
  }
}

pub(crate) fn footnote_ref(out: &mut String, number: u32) {
  out.push_str(&format!(
    "<sup id=\"fnref{number}\"><a href=\"#fn{number}\" rel=\"footnote\">{number}</a></sup>"
  ));
}

pub(crate) fn entity(out: &mut String, text: &str) {
  out.push_str(text);
}

pub(crate) fn normal_text(out: &mut String, text: &str) {
  out.push_str(&escape_html(text));
}

fn is_style_tag(tag: &str) -> bool {
  let rest = tag
    .strip_prefix("</")
    .or_else(|| tag.strip_prefix('<'))
    .unwrap_or(tag);
  let name: String = rest
    .chars()
    .take_while(|c| c.is_ascii_alphabetic())
    .collect();
  name.eq_ignore_ascii_case("style")
}

// doc_header and doc_footer default to emitting nothing; the engine only
// dispatches them when a custom handler is bound.

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_text_and_quotes() {
    assert_eq!(escape_html("a <b> & 'c'"), "a &lt;b&gt; &amp; &#x27;c&#x27;");
  }

  #[test]
  fn block_separator_only_between_blocks() {
    let mut out = String::new();
    paragraph(&mut out, "one");
    paragraph(&mut out, "two");
    assert_eq!(out, "<p>one</p>\n\n<p>two</p>\n");
  }

  #[test]
  fn code_block_with_language_class() {
    let mut out = String::new();
    block_code(&mut out, "fn main() {}\n", "rust", RenderFlags::empty());
    assert_eq!(
      out,
      "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
    );
  }

  #[test]
  fn expand_tabs_uses_four_column_stops() {
    assert_eq!(expand_tabs("a\tb\n\tc"), "a   b\n    c");
  }

  #[test]
  fn toc_headers_count_from_zero() {
    let mut out = String::new();
    let mut counter = 0;
    header(&mut out, "First", 1, RenderFlags::TOC, &mut counter);
    header(&mut out, "Second", 2, RenderFlags::TOC, &mut counter);
    assert_eq!(
      out,
      "<h1 id=\"toc_0\">First</h1>\n\n<h2 id=\"toc_1\">Second</h2>\n"
    );
  }

  #[test]
  fn unsafe_links_declined_under_safelink() {
    let mut out = String::new();
    assert!(!link(
      &mut out,
      "javascript:alert(1)",
      None,
      "x",
      RenderFlags::SAFELINK
    ));
    assert!(out.is_empty());
    assert!(link(&mut out, "#frag", None, "x", RenderFlags::SAFELINK));
    assert_eq!(out, "<a href=\"#frag\">x</a>");
  }

  #[test]
  fn image_respects_xhtml_and_title() {
    let mut out = String::new();
    image(
      &mut out,
      "/a.png",
      Some("t"),
      "alt",
      RenderFlags::USE_XHTML,
    );
    assert_eq!(out, "<img src=\"/a.png\" alt=\"alt\" title=\"t\"/>");
  }

  #[test]
  fn footnote_def_backref_inside_last_paragraph() {
    let mut out = String::new();
    footnote_def(&mut out, "<p>note</p>\n", 1);
    assert_eq!(
      out,
      "\n<li id=\"fn1\">\n<p>note&nbsp;<a href=\"#fnref1\" rev=\"footnote\">&#8617;</a></p>\n</li>\n"
    );
  }

  #[test]
  fn style_blocks_dropped_under_skip_style() {
    let mut out = String::new();
    block_html(
      &mut out,
      "<style>p { color: red }</style>\n",
      RenderFlags::SKIP_STYLE,
    );
    assert!(out.is_empty());
    block_html(&mut out, "<div>kept</div>\n", RenderFlags::SKIP_STYLE);
    assert_eq!(out, "<div>kept</div>\n");
  }

  #[test]
  fn header_cells_use_th_with_alignment() {
    let mut out = String::new();
    table_cell(&mut out, "x", TableFlags::HEADER | TableFlags::ALIGN_CENTER);
    assert_eq!(out, "<th style=\"text-align: center\">x</th>\n");
  }
}
