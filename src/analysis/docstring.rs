//! Docstring detection and string literal decoding.
//!
//! A function has a docstring when the first statement of its body is an
//! expression statement made of a single plain string literal (implicit
//! concatenation allowed). f-strings and bytes literals do not count.

use tree_sitter::Node;

const TAB_SIZE: usize = 8;

/// Docstring of a function body, decoded and cleaned.
pub fn function_docstring(body: Node, source: &[u8]) -> Option<String> {
    let first = first_statement(body)?;
    if first.kind() != "expression_statement" {
        return None;
    }

    let mut cursor = first.walk();
    let exprs: Vec<_> = first
        .named_children(&mut cursor)
        .filter(|n| !n.is_extra())
        .collect();
    let [expr] = exprs.as_slice() else {
        return None;
    };

    literal_value(unwrap_parens(*expr), source).map(|raw| clean_doc(&raw))
}

fn first_statement(body: Node) -> Option<Node> {
    let mut cursor = body.walk();
    let first = body.named_children(&mut cursor).find(|n| !n.is_extra());
    first
}

fn unwrap_parens(node: Node) -> Node {
    if node.kind() != "parenthesized_expression" {
        return node;
    }
    let mut cursor = node.walk();
    let inner: Vec<_> = node
        .named_children(&mut cursor)
        .filter(|n| !n.is_extra())
        .collect();
    match inner.as_slice() {
        [only] => unwrap_parens(*only),
        _ => node,
    }
}

/// Value of a `string` or `concatenated_string` node.
fn literal_value(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => decode_literal(node.utf8_text(source).ok()?),
        "concatenated_string" => {
            let mut value = String::new();
            let mut cursor = node.walk();
            for part in node.named_children(&mut cursor) {
                if part.is_extra() {
                    continue;
                }
                if part.kind() != "string" {
                    return None;
                }
                value.push_str(&decode_literal(part.utf8_text(source).ok()?)?);
            }
            Some(value)
        }
        _ => None,
    }
}

/// Decode one string literal including prefix and quotes.
///
/// Returns `None` for f-strings and bytes literals.
pub fn decode_literal(literal: &str) -> Option<String> {
    let prefix_len = literal
        .find(|c: char| c == '"' || c == '\'')
        .unwrap_or(literal.len());
    let (prefix, quoted) = literal.split_at(prefix_len);
    let prefix = prefix.to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') || prefix.contains('t') {
        return None;
    }

    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < quote_len * 2 {
        return None;
    }
    let body = &quoted[quote_len..quoted.len() - quote_len];

    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

/// Process backslash escapes of a non-raw string body.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' => push_hex(&mut out, &mut chars, 'x', 2),
            'u' => push_hex(&mut out, &mut chars, 'u', 4),
            'U' => push_hex(&mut out, &mut chars, 'U', 8),
            other => {
                // Unknown escapes (including \N{...}) are kept verbatim.
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn push_hex(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    marker: char,
    width: usize,
) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(d) if d.is_ascii_hexdigit() => {
                digits.push(*d);
                chars.next();
            }
            _ => break,
        }
    }
    let decoded = (digits.len() == width)
        .then(|| u32::from_str_radix(&digits, 16).ok())
        .flatten()
        .and_then(char::from_u32);
    match decoded {
        Some(ch) => out.push(ch),
        None => {
            out.push('\\');
            out.push(marker);
            out.push_str(&digits);
        }
    }
}

/// Clean docstring indentation the way Python's `inspect.cleandoc` does.
pub fn clean_doc(doc: &str) -> String {
    let lines: Vec<String> = doc.split('\n').map(expand_tabs).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim_start().is_empty())
        .map(|line| line.chars().count() - line.trim_start().chars().count())
        .min();

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            cleaned.push(line.trim_start().to_string());
        } else if let Some(margin) = margin {
            cleaned.push(line.chars().skip(margin).collect());
        } else {
            cleaned.push(line.clone());
        }
    }

    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|l| l.is_empty()).count();
    cleaned.drain(..leading);

    cleaned.join("\n")
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_SIZE - column % TAB_SIZE;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_and_raw() {
        assert_eq!(decode_literal("\"doc\"").as_deref(), Some("doc"));
        assert_eq!(decode_literal("'a\\tb'").as_deref(), Some("a\tb"));
        assert_eq!(decode_literal("r'a\\tb'").as_deref(), Some("a\\tb"));
        assert_eq!(
            decode_literal("\"\"\"triple \"quoted\" text\"\"\"").as_deref(),
            Some("triple \"quoted\" text")
        );
        assert_eq!(decode_literal("''").as_deref(), Some(""));
    }

    #[test]
    fn test_decode_rejects_fstrings_and_bytes() {
        assert_eq!(decode_literal("f\"x{y}\""), None);
        assert_eq!(decode_literal("b'bytes'"), None);
        assert_eq!(decode_literal("Rb'bytes'"), None);
    }

    #[test]
    fn test_unescape_numeric_escapes() {
        assert_eq!(unescape("\\x41\\u00e9\\101"), "A\u{e9}A");
        assert_eq!(unescape("\\N{DASH}"), "\\N{DASH}");
        assert_eq!(unescape("line\\\ncontinued"), "linecontinued");
        assert_eq!(unescape("\\xZ"), "\\xZ");
    }

    #[test]
    fn test_clean_doc_removes_margin() {
        let raw = "Summary line.\n\n    Details here.\n      Indented more.\n    ";
        assert_eq!(
            clean_doc(raw),
            "Summary line.\n\nDetails here.\n  Indented more."
        );
    }

    #[test]
    fn test_clean_doc_strips_blank_edges() {
        assert_eq!(clean_doc("\n    Body\n    "), "Body");
        assert_eq!(clean_doc("   single   "), "single   ");
    }

    #[test]
    fn test_expand_tabs() {
        assert_eq!(expand_tabs("\tx"), "        x");
        assert_eq!(expand_tabs("ab\tx"), "ab      x");
    }
}
