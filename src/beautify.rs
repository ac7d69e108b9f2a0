//! The optional beautification stage: typographic replacement over the
//! finished HTML buffer, in the tradition of SmartyPants.
//!
//! Straight quotes become curly entities, dash and ellipsis runs become
//! their punctuation entities, and `(c)`/`(r)`/`(tm)` become their symbol
//! entities. Tags are copied verbatim, as is the entire content of
//! elements that carry literal text (`pre`, `code`, `script`, and
//! friends). Because the buffer has already been HTML-escaped, quotes are
//! recognized both raw and in their entity forms (`&quot;`, `&#x27;`,
//! `&#39;`).

/// Elements whose content is copied untouched.
const VERBATIM_ELEMENTS: &[&str] =
  &["pre", "code", "var", "samp", "kbd", "math", "script", "style"];

/// Characters that start a replacement or skip sequence; everything
/// between them is copied in bulk.
const SPECIALS: &[u8] = b"<&\"'`-.(\\";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quote {
  Single,
  Double,
}

/// Apply the typographic pass to a rendered HTML fragment.
pub(crate) fn beautify(input: &str) -> String {
  let bytes = input.as_bytes();
  let mut out = String::with_capacity(input.len() + input.len() / 8);
  let mut dquote_open = false;
  let mut squote_open = false;
  let mut i = 0;

  while i < bytes.len() {
    let prev = if i == 0 { None } else { Some(bytes[i - 1]) };
    match bytes[i] {
      b'<' => i = copy_tag(input, i, &mut out),
      b'&' => {
        if let Some(len) = quote_entity(&input[i..], Quote::Double) {
          i = emit_quote(
            input,
            i,
            len,
            Quote::Double,
            &mut dquote_open,
            prev,
            &mut out,
          );
        } else if let Some(len) = quote_entity(&input[i..], Quote::Single) {
          i = emit_squote(input, i, len, &mut squote_open, prev, &mut out);
        } else {
          out.push('&');
          i += 1;
        }
      }
      b'"' => {
        i = emit_quote(input, i, 1, Quote::Double, &mut dquote_open, prev, &mut out);
      }
      b'\'' => i = emit_squote(input, i, 1, &mut squote_open, prev, &mut out),
      b'`' if bytes.get(i + 1) == Some(&b'`') => {
        i = emit_quote(input, i, 2, Quote::Double, &mut dquote_open, prev, &mut out);
      }
      b'-' => {
        if input[i..].starts_with("---") {
          out.push_str("&mdash;");
          i += 3;
        } else if input[i..].starts_with("--") {
          out.push_str("&ndash;");
          i += 2;
        } else {
          out.push('-');
          i += 1;
        }
      }
      b'.' => {
        if input[i..].starts_with("...") {
          out.push_str("&hellip;");
          i += 3;
        } else if input[i..].starts_with(". . .") {
          out.push_str("&hellip;");
          i += 5;
        } else {
          out.push('.');
          i += 1;
        }
      }
      b'(' => {
        let rest = &input[i..];
        if starts_with_ignore_case(rest, "(c)") {
          out.push_str("&copy;");
          i += 3;
        } else if starts_with_ignore_case(rest, "(r)") {
          out.push_str("&reg;");
          i += 3;
        } else if starts_with_ignore_case(rest, "(tm)") {
          out.push_str("&trade;");
          i += 4;
        } else {
          out.push('(');
          i += 1;
        }
      }
      b'\\' => {
        // Backslash shields the next token from replacement.
        if let Some(len) = quote_entity(&input[i + 1..], Quote::Double)
          .or_else(|| quote_entity(&input[i + 1..], Quote::Single))
        {
          out.push_str(&input[i + 1..i + 1 + len]);
          i += 1 + len;
        } else if i + 1 < bytes.len() {
          let end = i + 1 + char_len(bytes[i + 1]);
          out.push_str(&input[i + 1..end.min(bytes.len())]);
          i = end;
        } else {
          out.push('\\');
          i += 1;
        }
      }
      _ => {
        let end = input[i + 1..]
          .bytes()
          .position(|b| SPECIALS.contains(&b))
          .map_or(bytes.len(), |p| i + 1 + p);
        out.push_str(&input[i..end]);
        i = end;
      }
    }
  }
  out
}

/// A quote may open only after a word boundary and close only before one.
fn word_boundary(c: Option<u8>) -> bool {
  match c {
    None => true,
    Some(b) => b.is_ascii_whitespace() || b.is_ascii_punctuation(),
  }
}

fn quote_entity(text: &str, kind: Quote) -> Option<usize> {
  let forms: &[&str] = match kind {
    Quote::Double => &["&quot;"],
    Quote::Single => &["&#x27;", "&#39;"],
  };
  forms
    .iter()
    .find(|form| starts_with_ignore_case(text, form))
    .map(|form| form.len())
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
  text.len() >= prefix.len()
    && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Emit the curly entity for a quote token of `len` bytes at `i`, or copy
/// it verbatim when the boundary rules reject the toggle. Returns the
/// position after the token.
fn emit_quote(
  input: &str,
  i: usize,
  len: usize,
  kind: Quote,
  open: &mut bool,
  prev: Option<u8>,
  out: &mut String,
) -> usize {
  let next = input.as_bytes().get(i + len).copied();
  let toggled = if *open {
    word_boundary(next)
  } else {
    word_boundary(prev)
  };
  if toggled {
    out.push_str(match (kind, *open) {
      (Quote::Double, false) => "&ldquo;",
      (Quote::Double, true) => "&rdquo;",
      (Quote::Single, false) => "&lsquo;",
      (Quote::Single, true) => "&rsquo;",
    });
    *open = !*open;
  } else {
    out.push_str(&input[i..i + len]);
  }
  i + len
}

/// Single quotes get the contraction check before the open/close toggle,
/// so `it's` and `don't` come out as apostrophes rather than stray opens.
fn emit_squote(
  input: &str,
  i: usize,
  len: usize,
  open: &mut bool,
  prev: Option<u8>,
  out: &mut String,
) -> usize {
  if is_contraction(&input[i + len..]) {
    out.push_str("&rsquo;");
    return i + len;
  }
  emit_quote(input, i, len, Quote::Single, open, prev, out)
}

fn is_contraction(after: &str) -> bool {
  let t = after.as_bytes();
  let t1 = t.first().map(u8::to_ascii_lowercase);
  let t2 = t.get(1).map(u8::to_ascii_lowercase);
  match t1 {
    Some(b's' | b't' | b'm' | b'd') => word_boundary(t.get(1).copied()),
    Some(b'r') if t2 == Some(b'e') => word_boundary(t.get(2).copied()),
    Some(b'l') if t2 == Some(b'l') => word_boundary(t.get(2).copied()),
    Some(b'v') if t2 == Some(b'e') => word_boundary(t.get(2).copied()),
    _ => false,
  }
}

/// Copy a tag verbatim; for verbatim elements, copy through the matching
/// close tag as well. Returns the position after the copied span.
fn copy_tag(input: &str, i: usize, out: &mut String) -> usize {
  let tag_end = input[i..]
    .find('>')
    .map_or(input.len(), |p| i + p + 1);
  out.push_str(&input[i..tag_end]);

  let inner = &input[i + 1..tag_end];
  if inner.starts_with('/') {
    return tag_end;
  }
  let name: String = inner
    .chars()
    .take_while(char::is_ascii_alphanumeric)
    .collect::<String>()
    .to_ascii_lowercase();
  if !VERBATIM_ELEMENTS.contains(&name.as_str()) {
    return tag_end;
  }

  let close = format!("</{name}");
  let Some(pos) = input[tag_end..].find(&close) else {
    out.push_str(&input[tag_end..]);
    return input.len();
  };
  let close_start = tag_end + pos;
  let close_end = input[close_start..]
    .find('>')
    .map_or(input.len(), |p| close_start + p + 1);
  out.push_str(&input[tag_end..close_end]);
  close_end
}

fn char_len(first_byte: u8) -> usize {
  match first_byte {
    b if b < 0x80 => 1,
    b if b >= 0xF0 => 4,
    b if b >= 0xE0 => 3,
    _ => 2,
  }
}
