//! Handler override behavior: custom slots, declines, and containment.

use overmark::{Extensions, Overrides, Processor, RenderFlags, SpanOutput};
use pretty_assertions::assert_eq;

fn processor(overrides: Overrides) -> Processor {
  Processor::with_overrides(overrides, Extensions::empty(), RenderFlags::empty())
}

#[test]
fn custom_block_handler_replaces_default() {
  let overrides = Overrides::new().header(|content, level| {
    format!("<h{level} class=\"fancy\">{content}</h{level}>\n")
  });
  let mut p = processor(overrides);
  assert_eq!(
    p.render("# Top\n\n## Sub").unwrap(),
    "<h1 class=\"fancy\">Top</h1>\n<h2 class=\"fancy\">Sub</h2>\n"
  );
}

#[test]
fn accepted_span_replaces_node_output() {
  let overrides = Overrides::new()
    .emphasis(|text| SpanOutput::Accepted(format!("<i>{text}</i>")));
  let mut p = processor(overrides);
  assert_eq!(p.render("so *very* nice").unwrap(), "<p>so <i>very</i> nice</p>\n");
}

#[test]
fn declined_span_passes_source_through() {
  let overrides = Overrides::new().emphasis(|_| SpanOutput::Declined);
  let mut p = processor(overrides);
  assert_eq!(p.render("x *a* y").unwrap(), "<p>x *a* y</p>\n");
}

#[test]
fn panicking_span_degrades_only_its_node() {
  let overrides = Overrides::new().emphasis(|text| {
    assert_ne!(text, "a", "refusing this one");
    SpanOutput::Accepted(format!("<em>{text}</em>"))
  });
  let mut p = processor(overrides);
  // The failing span falls back to its source text; its sibling renders.
  assert_eq!(p.render("*a* *b*").unwrap(), "<p>*a* <em>b</em></p>\n");
}

#[test]
fn panicking_block_is_dropped_silently() {
  let overrides =
    Overrides::new().block_code(|_, _| panic!("no code blocks today"));
  let mut p = processor(overrides);
  assert_eq!(
    p.render("before\n\n```\nx\n```\n\nafter").unwrap(),
    "<p>before</p>\n\n<p>after</p>\n"
  );
}

#[test]
fn doc_header_and_footer_frame_the_document() {
  let overrides = Overrides::new()
    .doc_header(|| "<!-- begin -->".to_owned())
    .doc_footer(|| "<!-- end -->\n".to_owned());
  let mut p = processor(overrides);
  assert_eq!(
    p.render("x").unwrap(),
    "<!-- begin -->\n<p>x</p>\n<!-- end -->\n"
  );
}

#[test]
fn link_handler_sees_url_title_and_content() {
  let overrides = Overrides::new().link(|url, title, content| {
    SpanOutput::Accepted(format!(
      "<a data-title=\"{}\" href=\"{url}\">{content}</a>",
      title.unwrap_or("-")
    ))
  });
  let mut p = processor(overrides);
  assert_eq!(
    p.render("[go](/there \"now\")").unwrap(),
    "<p><a data-title=\"now\" href=\"/there\">go</a></p>\n"
  );
  assert_eq!(
    p.render("[go](/there)").unwrap(),
    "<p><a data-title=\"-\" href=\"/there\">go</a></p>\n"
  );
}

#[test]
fn autolink_handler_distinguishes_email() {
  let overrides = Overrides::new().autolink(|link, is_email| {
    SpanOutput::Accepted(format!("[{link} email={is_email}]"))
  });
  let mut p = Processor::with_overrides(
    overrides,
    Extensions::AUTOLINK,
    RenderFlags::empty(),
  );
  assert_eq!(
    p.render("see https://example.com").unwrap(),
    "<p>see [https://example.com email=false]</p>\n"
  );
  assert_eq!(
    p.render("mail hi@example.com").unwrap(),
    "<p>mail [mailto:hi@example.com email=true]</p>\n"
  );
}

#[test]
fn hard_wrap_routes_soft_breaks_through_line_break_slot() {
  let overrides = Overrides::new()
    .line_break(|| SpanOutput::Accepted("<wbr>\n".to_owned()));
  let mut p = Processor::with_overrides(
    overrides,
    Extensions::empty(),
    RenderFlags::HARD_WRAP,
  );
  assert_eq!(p.render("a\nb").unwrap(), "<p>a<wbr>\nb</p>\n");
}

#[test]
fn accepted_span_newlines_survive_hard_wrap() {
  let overrides = Overrides::new()
    .codespan(|text| SpanOutput::Accepted(format!("<code>{text}\n</code>")));
  let mut p = Processor::with_overrides(
    overrides,
    Extensions::empty(),
    RenderFlags::HARD_WRAP,
  );
  // The handler's own newline is taken as-is, not rewritten to a break.
  assert_eq!(p.render("`x`").unwrap(), "<p><code>x\n</code></p>\n");
}

#[test]
fn bracketed_link_spelling_out_its_target_stays_on_link_slot() {
  let overrides = Overrides::new()
    .link(|url, _, content| SpanOutput::Accepted(format!("L({url};{content})")))
    .autolink(|link, _| SpanOutput::Accepted(format!("A({link})")));
  let mut p = processor(overrides);
  assert_eq!(
    p.render("[https://x.com](https://x.com)").unwrap(),
    "<p>L(https://x.com;https://x.com)</p>\n"
  );
}

#[test]
fn table_cell_handler_receives_cell_flags() {
  let overrides = Overrides::new().table_cell(|content, flags| {
    let tag = if flags.is_header() { "th" } else { "td" };
    format!("<{tag} data-cell>{content}</{tag}>\n")
  });
  let mut p = Processor::with_overrides(
    overrides,
    Extensions::TABLES,
    RenderFlags::empty(),
  );
  assert_eq!(
    p.render("| a |\n| - |\n| 1 |").unwrap(),
    "<table><thead>\n<tr>\n<th data-cell>a</th>\n</tr>\n</thead><tbody>\n\
     <tr>\n<td data-cell>1</td>\n</tr>\n</tbody></table>\n"
  );
}

#[test]
fn footnote_ref_handler_receives_reference_number() {
  let overrides = Overrides::new()
    .footnote_ref(|number| SpanOutput::Accepted(format!("[{number}]")))
    .footnotes(|defs| format!("<section class=\"notes\">{defs}</section>\n"))
    .footnote_def(|content, number| format!("({number}: {content})"));
  let mut p = Processor::with_overrides(
    overrides,
    Extensions::FOOTNOTES,
    RenderFlags::empty(),
  );
  assert_eq!(
    p.render("x[^a]\n\n[^a]: note").unwrap(),
    "<p>x[1]</p>\n<section class=\"notes\">(1: <p>note</p>\n)</section>\n"
  );
}

#[test]
fn normal_text_handler_sees_plain_runs() {
  let overrides = Overrides::new().normal_text(|text| text.to_uppercase());
  let mut p = processor(overrides);
  assert_eq!(p.render("ab *cd*").unwrap(), "<p>AB <em>CD</em></p>\n");
}

#[test]
fn entity_handler_sees_preserved_entities() {
  let overrides =
    Overrides::new().entity(|entity| format!("<span>{entity}</span>"));
  let mut p = processor(overrides);
  // `&zzz;` is not a recognized entity, so the parser keeps it literal
  // and it reaches the entity slot verbatim.
  assert_eq!(
    p.render("a &zzz; b").unwrap(),
    "<p>a <span>&zzz;</span> b</p>\n"
  );
}
