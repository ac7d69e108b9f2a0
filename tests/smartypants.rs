//! The SMARTYPANTS pass over rendered output.

use overmark::{Extensions, RenderFlags, render};
use pretty_assertions::assert_eq;

fn html(input: &str) -> String {
  render(input, Extensions::empty(), RenderFlags::SMARTYPANTS)
}

#[test]
fn quotes_curl_in_paragraph_text() {
  assert_eq!(
    html("\"Ouch,\" he said."),
    "<p>&ldquo;Ouch,&rdquo; he said.</p>\n"
  );
}

#[test]
fn apostrophes_become_rsquo() {
  assert_eq!(
    html("it's Ann's book; they're done"),
    "<p>it&rsquo;s Ann&rsquo;s book; they&rsquo;re done</p>\n"
  );
}

#[test]
fn dashes_and_ellipses() {
  assert_eq!(
    html("one -- two --- three ..."),
    "<p>one &ndash; two &mdash; three &hellip;</p>\n"
  );
}

#[test]
fn trademark_copyright_registered() {
  assert_eq!(
    html("Widget(tm) is (c) 2026 (r)"),
    "<p>Widget&trade; is &copy; 2026 &reg;</p>\n"
  );
}

#[test]
fn code_spans_are_left_alone() {
  assert_eq!(
    html("use `--flag` -- carefully"),
    "<p>use <code>--flag</code> &ndash; carefully</p>\n"
  );
}

#[test]
fn code_blocks_are_left_alone() {
  assert_eq!(
    html("```\nit's -- \"raw\"\n```"),
    "<pre><code>it&#x27;s -- &quot;raw&quot;\n</code></pre>\n"
  );
}

#[test]
fn off_by_default() {
  assert_eq!(
    render("\"x\" -- y", Extensions::empty(), RenderFlags::empty()),
    "<p>&quot;x&quot; -- y</p>\n"
  );
}
