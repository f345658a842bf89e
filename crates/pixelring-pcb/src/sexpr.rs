//! Minimal S-expression tree for `.kicad_pcb` files.
//!
//! Quoted strings and bare atoms are kept apart so that a document written back out
//! keeps the quoting style it was read with.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum SExpr {
    Atom(String),
    Str(String),
    List(Vec<SExpr>),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SExprError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected ')' at byte {0}")]
    UnexpectedClose(usize),
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("trailing content at byte {0}")]
    Trailing(usize),
}

impl SExpr {
    #[must_use]
    pub fn list(items: Vec<SExpr>) -> Self {
        SExpr::List(items)
    }

    #[must_use]
    pub fn atom(s: impl Into<String>) -> Self {
        SExpr::Atom(s.into())
    }

    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        SExpr::Str(s.into())
    }

    /// `(tag args...)` where every arg is a bare atom.
    #[must_use]
    pub fn node(tag: &str, args: &[String]) -> Self {
        let mut items = vec![SExpr::atom(tag)];
        items.extend(args.iter().map(|a| SExpr::atom(a.clone())));
        SExpr::List(items)
    }

    #[must_use]
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom(s) | SExpr::Str(s) => Some(s),
            SExpr::List(_) => None,
        }
    }

    /// First element of a list, when it is an atom.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            SExpr::List(items) => items.first().and_then(SExpr::as_atom),
            _ => None,
        }
    }

    /// Elements after the tag.
    #[must_use]
    pub fn children(&self) -> &[SExpr] {
        match self {
            SExpr::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut [SExpr] {
        match self {
            SExpr::List(items) if !items.is_empty() => &mut items[1..],
            _ => &mut [],
        }
    }

    #[must_use]
    pub fn items(&self) -> &[SExpr] {
        match self {
            SExpr::List(items) => items,
            _ => &[],
        }
    }

    pub fn items_mut(&mut self) -> Option<&mut Vec<SExpr>> {
        match self {
            SExpr::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&SExpr> {
        self.children().iter().find(|c| c.tag() == Some(tag))
    }

    pub fn find_mut(&mut self, tag: &str) -> Option<&mut SExpr> {
        self.children_mut().iter_mut().find(|c| c.tag() == Some(tag))
    }

    #[must_use]
    pub fn find_all(&self, tag: &str) -> Vec<&SExpr> {
        self.children().iter().filter(|c| c.tag() == Some(tag)).collect()
    }

    /// The `i`-th element after the tag, as text.
    #[must_use]
    pub fn atom_at(&self, i: usize) -> Option<&str> {
        self.children().get(i).and_then(SExpr::as_atom)
    }

    #[must_use]
    pub fn f64_at(&self, i: usize) -> Option<f64> {
        self.atom_at(i).and_then(|s| s.parse().ok())
    }

    /// First atom of the child list tagged `tag`: `(tag value)`.
    #[must_use]
    pub fn value(&self, tag: &str) -> Option<&str> {
        self.find(tag).and_then(|n| n.atom_at(0))
    }

    #[must_use]
    pub fn value_f64(&self, tag: &str) -> Option<f64> {
        self.value(tag).and_then(|s| s.parse().ok())
    }

    /// Replace the child tagged `tag`, or append `node` when absent.
    pub fn set_child(&mut self, node: SExpr) {
        let Some(tag) = node.tag().map(str::to_string) else {
            return;
        };
        if let Some(existing) = self.find_mut(&tag) {
            *existing = node;
        } else if let Some(items) = self.items_mut() {
            items.push(node);
        }
    }

    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        write_pretty(self, 0, &mut out);
        out.push('\n');
        out
    }
}

pub fn parse(input: &str) -> Result<SExpr, SExprError> {
    let bytes = input.as_bytes();
    let mut pos = skip_ws(bytes, 0);
    let expr = parse_expr(input, &mut pos)?;
    pos = skip_ws(bytes, pos);
    if pos < bytes.len() {
        return Err(SExprError::Trailing(pos));
    }
    Ok(expr)
}

fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn parse_expr(input: &str, pos: &mut usize) -> Result<SExpr, SExprError> {
    let bytes = input.as_bytes();
    *pos = skip_ws(bytes, *pos);
    let Some(&c) = bytes.get(*pos) else {
        return Err(SExprError::UnexpectedEof);
    };
    match c {
        b'(' => {
            *pos += 1;
            let mut items = Vec::new();
            loop {
                *pos = skip_ws(bytes, *pos);
                match bytes.get(*pos) {
                    None => return Err(SExprError::UnexpectedEof),
                    Some(b')') => {
                        *pos += 1;
                        return Ok(SExpr::List(items));
                    }
                    Some(_) => items.push(parse_expr(input, pos)?),
                }
            }
        }
        b')' => Err(SExprError::UnexpectedClose(*pos)),
        b'"' => parse_string(input, pos),
        _ => {
            let start = *pos;
            while *pos < bytes.len()
                && !bytes[*pos].is_ascii_whitespace()
                && bytes[*pos] != b'('
                && bytes[*pos] != b')'
            {
                *pos += 1;
            }
            Ok(SExpr::Atom(input[start..*pos].to_string()))
        }
    }
}

fn parse_string(input: &str, pos: &mut usize) -> Result<SExpr, SExprError> {
    let start = *pos;
    let mut out = String::new();
    let mut chars = input[start + 1..].char_indices();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => {
                *pos = start + 1 + offset + 1;
                return Ok(SExpr::Str(out));
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            other => out.push(other),
        }
    }
    Err(SExprError::UnterminatedString(start))
}

fn write_pretty(expr: &SExpr, depth: usize, out: &mut String) {
    match expr {
        SExpr::Atom(s) => out.push_str(s),
        SExpr::Str(s) => write_quoted(s, out),
        SExpr::List(items) => {
            let flat = items.iter().all(|i| !matches!(i, SExpr::List(_)))
                || is_short_list(items);
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    if flat || !matches!(item, SExpr::List(_)) {
                        out.push(' ');
                    } else {
                        out.push('\n');
                        out.push_str(&"  ".repeat(depth + 1));
                    }
                }
                write_pretty(item, depth + 1, out);
            }
            out.push(')');
        }
    }
}

/// Lists of small leaf lists (`(at 1 2)`, `(start ..) (end ..)`) stay on one line.
fn is_short_list(items: &[SExpr]) -> bool {
    items.len() <= 8
        && items.iter().all(|i| match i {
            SExpr::List(inner) => {
                inner.len() <= 4 && inner.iter().all(|x| !matches!(x, SExpr::List(_)))
            }
            _ => true,
        })
}

fn write_quoted(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
}

/// KiCad-style number: up to six decimals, no trailing zeros, never `-0`.
#[must_use]
pub fn fmt_num(v: f64) -> String {
    let mut s = String::new();
    let _ = write!(s, "{v:.6}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_lists_and_strings() {
        let e = parse(r#"(kicad_pcb (version 20171130) (net 1 "GND") (layer "F.Cu"))"#).unwrap();
        assert_eq!(e.tag(), Some("kicad_pcb"));
        assert_eq!(e.value("version"), Some("20171130"));
        let net = e.find("net").unwrap();
        assert_eq!(net.f64_at(0), Some(1.0));
        assert_eq!(net.atom_at(1), Some("GND"));
        assert!(matches!(net.children()[1], SExpr::Str(_)));
        assert_eq!(e.find_all("net").len(), 1);
    }

    #[test]
    fn escaped_quotes_survive_round_trip() {
        let src = r#"(a "say \"hi\"" b)"#;
        let e = parse(src).unwrap();
        assert_eq!(e.atom_at(0), Some("say \"hi\""));
        let again = parse(&e.to_pretty_string()).unwrap();
        assert_eq!(e, again);
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(parse("(a (b)"), Err(SExprError::UnexpectedEof));
        assert!(matches!(parse(")"), Err(SExprError::UnexpectedClose(0))));
        assert!(matches!(parse("(a) (b)"), Err(SExprError::Trailing(_))));
        assert!(matches!(parse("(a \"open"), Err(SExprError::UnterminatedString(3))));
    }

    #[test]
    fn set_child_replaces_or_appends() {
        let mut e = parse("(module X (at 1 2))").unwrap();
        e.set_child(SExpr::node("at", &["3".into(), "4".into(), "90".into()]));
        assert_eq!(e.find("at").unwrap().f64_at(2), Some(90.0));
        e.set_child(SExpr::node("layer", &["F.Cu".into()]));
        assert_eq!(e.value("layer"), Some("F.Cu"));
    }

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(90.0), "90");
        assert_eq!(fmt_num(-0.0000001), "0");
        assert_eq!(fmt_num(0.123456789), "0.123457");
    }
}
