//! Render flags consulted by the default HTML emitter.

use overmark::{Extensions, RenderFlags, render};
use pretty_assertions::assert_eq;

fn html(input: &str, flags: RenderFlags) -> String {
  render(input, Extensions::empty(), flags)
}

#[test]
fn escape_neutralizes_raw_html() {
  assert_eq!(
    html("a <b>c</b> d", RenderFlags::ESCAPE),
    "<p>a &lt;b&gt;c&lt;/b&gt; d</p>\n"
  );
  assert_eq!(
    html("<div>block</div>", RenderFlags::ESCAPE),
    "&lt;div&gt;block&lt;/div&gt;\n"
  );
}

#[test]
fn skip_html_drops_tags_but_keeps_text() {
  assert_eq!(
    html("a <b>c</b> d", RenderFlags::SKIP_HTML),
    "<p>a c d</p>\n"
  );
  assert_eq!(html("<div>block</div>", RenderFlags::SKIP_HTML), "");
}

#[test]
fn raw_html_passes_through_by_default() {
  assert_eq!(
    html("a <b>c</b> d", RenderFlags::empty()),
    "<p>a <b>c</b> d</p>\n"
  );
  assert_eq!(
    html("<div>block</div>", RenderFlags::empty()),
    "<div>block</div>\n"
  );
}

#[test]
fn hard_wrap_turns_soft_breaks_into_br() {
  assert_eq!(html("a\nb", RenderFlags::HARD_WRAP), "<p>a<br>\nb</p>\n");
  assert_eq!(html("a\nb", RenderFlags::empty()), "<p>a\nb</p>\n");
  // An explicit hard break emits exactly one <br>, wrap flag or not.
  assert_eq!(html("a  \nb", RenderFlags::HARD_WRAP), "<p>a<br>\nb</p>\n");
  assert_eq!(html("a  \nb", RenderFlags::empty()), "<p>a<br>\nb</p>\n");
}

#[test]
fn hard_wrap_uses_xhtml_breaks_when_asked() {
  assert_eq!(
    html("a\nb", RenderFlags::HARD_WRAP | RenderFlags::USE_XHTML),
    "<p>a<br/>\nb</p>\n"
  );
}

#[test]
fn safelink_declines_unsafe_schemes() {
  assert_eq!(
    html("[x](javascript:alert(1))", RenderFlags::SAFELINK),
    "<p>[x](javascript:alert(1))</p>\n"
  );
  assert_eq!(
    html("[x](https://example.com)", RenderFlags::SAFELINK),
    "<p><a href=\"https://example.com\">x</a></p>\n"
  );
}

#[test]
fn skip_links_and_images_fall_back_to_source() {
  assert_eq!(
    html("see [x](/a)", RenderFlags::SKIP_LINKS),
    "<p>see [x](/a)</p>\n"
  );
  assert_eq!(
    html("![alt](/a.png)", RenderFlags::SKIP_IMAGES),
    "<p>![alt](/a.png)</p>\n"
  );
}

#[test]
fn toc_ids_count_headers_from_zero() {
  assert_eq!(
    html("# A\n\n## B", RenderFlags::TOC),
    "<h1 id=\"toc_0\">A</h1>\n\n<h2 id=\"toc_1\">B</h2>\n"
  );
}

#[test]
fn xhtml_closes_void_elements() {
  assert_eq!(html("---", RenderFlags::USE_XHTML), "<hr/>\n");
  assert_eq!(html("---", RenderFlags::empty()), "<hr>\n");
  assert_eq!(
    html("![a](/i.png)", RenderFlags::USE_XHTML),
    "<p><img src=\"/i.png\" alt=\"a\"/></p>\n"
  );
}

#[test]
fn expand_tabs_in_code_blocks() {
  assert_eq!(
    html("```\na\tb\n```", RenderFlags::EXPAND_TABS),
    "<pre><code>a   b\n</code></pre>\n"
  );
  assert_eq!(
    html("```\na\tb\n```", RenderFlags::empty()),
    "<pre><code>a\tb\n</code></pre>\n"
  );
}

#[test]
fn skip_style_drops_style_blocks() {
  assert_eq!(
    html("<style>p { color: red }</style>", RenderFlags::SKIP_STYLE),
    ""
  );
}

#[test]
fn code_block_language_class() {
  assert_eq!(
    html("```rust\nfn main() {}\n```", RenderFlags::empty()),
    "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
  );
}

#[test]
fn text_is_escaped_everywhere() {
  assert_eq!(
    html("AT&T \"quoted\"", RenderFlags::empty()),
    "<p>AT&amp;T &quot;quoted&quot;</p>\n"
  );
}
