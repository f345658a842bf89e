use indexmap::IndexMap;
use std::str::FromStr;

use crate::error::ConfigError;

const FUNCTIONS: [&str; 11] = [
    "sqrt", "sin", "cos", "tan", "asin", "acos", "atan", "abs", "floor", "ceil", "round",
];
const CONSTANTS: [&str; 2] = ["pi", "e"];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Ident(String),
    LParen,
    RParen,
    Op(char),
}

/// Evaluate `expr` with the variables in `vars`.
///
/// Accepts implicit multiplication (`5pi/4`, `2(r + 1)`) and the constants `pi` and `e`.
/// `key` only names the expression in error messages.
pub fn eval_in_context(
    key: &str,
    expr: &str,
    vars: &IndexMap<String, f64>,
) -> Result<f64, ConfigError> {
    let tokens = tokenize(expr);
    let mut ctx = meval::Context::new();
    let mut rewritten = String::with_capacity(expr.len() + 8);
    let mut prev: Option<&Token> = None;

    for (i, tok) in tokens.iter().enumerate() {
        if needs_implicit_mul(prev, tok) {
            rewritten.push('*');
        }
        match tok {
            Token::Number(n) => rewritten.push_str(n),
            Token::Ident(name) => {
                let is_call = matches!(tokens.get(i + 1), Some(Token::LParen))
                    && FUNCTIONS.contains(&name.as_str());
                if is_call || (CONSTANTS.contains(&name.as_str()) && !vars.contains_key(name)) {
                    rewritten.push_str(name);
                } else {
                    let value = vars.get(name).copied().ok_or_else(|| {
                        ConfigError::UnknownVariable {
                            key: key.to_string(),
                            name: name.clone(),
                        }
                    })?;
                    let safe = sanitize_ident(name);
                    ctx.var(safe.clone(), value);
                    rewritten.push_str(&safe);
                }
            }
            Token::LParen => rewritten.push('('),
            Token::RParen => rewritten.push(')'),
            Token::Op(c) => rewritten.push(*c),
        }
        prev = Some(tok);
    }

    let parsed = meval::Expr::from_str(&rewritten).map_err(|_| ConfigError::InvalidExpression {
        key: key.to_string(),
        expr: expr.to_string(),
    })?;
    parsed.eval_with_context(ctx).map_err(|e| ConfigError::Eval {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn tokenize(expr: &str) -> Vec<Token> {
    let chars: Vec<char> = expr.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            i += exponent_len(&chars[i..]);
            let mut s: String = chars[start..i].iter().collect();
            // meval rejects a bare leading dot.
            if s.starts_with('.') {
                s.insert(0, '0');
            }
            out.push(Token::Number(s));
        } else if is_ident_start(c) {
            let start = i;
            while i < chars.len() && is_ident_continue(chars[i]) {
                i += 1;
            }
            out.push(Token::Ident(chars[start..i].iter().collect()));
        } else {
            out.push(match c {
                '(' => Token::LParen,
                ')' => Token::RParen,
                other => Token::Op(other),
            });
            i += 1;
        }
    }
    out
}

/// Length of a `e-4` style exponent at the start of `rest`, or 0.
fn exponent_len(rest: &[char]) -> usize {
    if !matches!(rest.first(), Some('e' | 'E')) {
        return 0;
    }
    let sign = usize::from(matches!(rest.get(1), Some('+' | '-')));
    let digits = rest[1 + sign..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        0
    } else {
        1 + sign + digits
    }
}

fn needs_implicit_mul(prev: Option<&Token>, next: &Token) -> bool {
    match (prev, next) {
        (Some(Token::Number(_) | Token::Ident(_) | Token::RParen), Token::Number(_) | Token::Ident(_)) => {
            true
        }
        (Some(Token::Number(_) | Token::RParen), Token::LParen) => true,
        (Some(Token::Ident(name)), Token::LParen) => !FUNCTIONS.contains(&name.as_str()),
        _ => false,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn sanitize_ident(raw: &str) -> String {
    let mut out = String::from("v_");
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push_str(&format!("_{:x}_", c as u32));
        }
    }
    out
}
