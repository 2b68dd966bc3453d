//! The closed expression grammar behind the `eval` operator.
//!
//! `eval` expressions are evaluated by the generator itself, typically to
//! fold a field's mask or shift amount into a constant. The grammar is
//! deliberately small; there is no access to the host language:
//!
//! ```text
//! expr    := or
//! or      := xor  ( "|" xor )*
//! xor     := and  ( "^" and )*
//! and     := shift ( "&" shift )*
//! shift   := sum  ( ("<<" | ">>") sum )*
//! sum     := term ( ("+" | "-") term )*
//! term    := unary ( ("*" | "%") unary )*
//! unary   := "-" unary | atom
//! atom    := integer | string | "(" expr ")" | ("hex" | "int") "(" expr ")"
//! ```
//!
//! `$name` placeholders are substituted textually before lexing; a
//! placeholder missing from the bindings is fatal because the expression
//! cannot be evaluated half-substituted. `int(x)` parses a decimal or
//! `0x`-prefixed string, `hex(x)` renders an integer the way Python's
//! `hex()` does. Integer results print in decimal, strings verbatim.

use crate::action::transpile::Bindings;
use crate::Error;

/// Evaluates an `eval` expression to its rendered result.
pub fn eval_expr(expr: &str, bindings: &Bindings) -> Result<String, Error> {
    let substituted = substitute_placeholders(expr, bindings)?;
    let tokens = lex(&substituted)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        source: expr,
    };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.syntax_error("trailing input"));
    }
    Ok(match value {
        Value::Int(v) => v.to_string(),
        Value::Str(s) => s,
    })
}

fn substitute_placeholders(expr: &str, bindings: &Bindings) -> Result<String, Error> {
    let mut out = String::with_capacity(expr.len());
    let mut chars = expr.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some((_, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || *c == '_' {
                name.push(*c);
                chars.next();
            } else {
                break;
            }
        }
        match bindings.get(&name) {
            Some(value) => out.push_str(value),
            None => {
                return Err(Error::ActionSyntax(format!(
                    "unknown placeholder `${name}` in eval expression `{expr}`"
                )))
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i128),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Percent,
    Shl,
    Shr,
    Amp,
    Pipe,
    Caret,
}

fn lex(input: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '&' => {
                chars.next();
                tokens.push(Token::Amp);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Pipe);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '<' | '>' => {
                chars.next();
                if chars.peek() != Some(&c) {
                    return Err(Error::ActionSyntax(format!(
                        "stray `{c}` in eval expression `{input}`"
                    )));
                }
                chars.next();
                tokens.push(if c == '<' { Token::Shl } else { Token::Shr });
            }
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some(q) if q == c => break,
                        Some(other) => text.push(other),
                        None => {
                            return Err(Error::ActionSyntax(format!(
                                "unterminated string in eval expression `{input}`"
                            )))
                        }
                    }
                }
                tokens.push(Token::Str(text));
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Int(parse_int(&digits, input)?));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            c => {
                return Err(Error::ActionSyntax(format!(
                    "illegal character `{c}` in eval expression `{input}`"
                )))
            }
        }
    }

    Ok(tokens)
}

fn parse_int(digits: &str, source: &str) -> Result<i128, Error> {
    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i128::from_str_radix(hex, 16),
        None => digits.parse(),
    };
    parsed.map_err(|_| {
        Error::ActionSyntax(format!(
            "illegal integer `{digits}` in eval expression `{source}`"
        ))
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i128),
    Str(String),
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn syntax_error(&self, what: &str) -> Error {
        Error::ActionSyntax(format!("{what} in eval expression `{}`", self.source))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += token.is_some() as usize;
        token
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), Error> {
        if self.bump() == Some(token) {
            Ok(())
        } else {
            Err(self.syntax_error(what))
        }
    }

    fn int_operand(&self, value: Value) -> Result<i128, Error> {
        match value {
            Value::Int(v) => Ok(v),
            Value::Str(_) => Err(self.syntax_error("arithmetic on a string")),
        }
    }

    fn expr(&mut self) -> Result<Value, Error> {
        self.binary(0)
    }

    /// Precedence-climbing over the binary operator tiers, loosest first.
    fn binary(&mut self, tier: usize) -> Result<Value, Error> {
        const TIERS: &[&[Token]] = &[
            &[Token::Pipe],
            &[Token::Caret],
            &[Token::Amp],
            &[Token::Shl, Token::Shr],
            &[Token::Plus, Token::Minus],
            &[Token::Star, Token::Percent],
        ];

        let Some(ops) = TIERS.get(tier) else {
            return self.unary();
        };

        let mut lhs = self.binary(tier + 1)?;
        while let Some(op) = self.peek().filter(|t| ops.contains(*t)).cloned() {
            self.pos += 1;
            let rhs = self.binary(tier + 1)?;
            let l = self.int_operand(lhs)?;
            let r = self.int_operand(rhs)?;
            lhs = Value::Int(match op {
                Token::Pipe => l | r,
                Token::Caret => l ^ r,
                Token::Amp => l & r,
                Token::Shl => l.checked_shl(r.try_into().unwrap_or(u32::MAX)).unwrap_or(0),
                Token::Shr => l.checked_shr(r.try_into().unwrap_or(u32::MAX)).unwrap_or(0),
                Token::Plus => l.wrapping_add(r),
                Token::Minus => l.wrapping_sub(r),
                Token::Star => l.wrapping_mul(r),
                Token::Percent => {
                    if r == 0 {
                        return Err(self.syntax_error("modulo by zero"));
                    }
                    l.wrapping_rem(r)
                }
                _ => return Err(self.syntax_error("unsupported operator")),
            });
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Value, Error> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            let value = self.unary()?;
            return Ok(Value::Int(-self.int_operand(value)?));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Value, Error> {
        match self.bump() {
            Some(Token::Int(v)) => Ok(Value::Int(v)),
            Some(Token::Str(s)) => Ok(Value::Str(s)),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(Token::RParen, "missing `)`")?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                self.expect(Token::LParen, "missing `(` after function name")?;
                let value = self.expr()?;
                self.expect(Token::RParen, "missing `)`")?;
                match name.as_str() {
                    "int" => self.coerce_int(value),
                    "hex" => {
                        let v = self.int_operand(value)?;
                        Ok(Value::Str(render_hex(v)))
                    }
                    _ => Err(self.syntax_error("unknown function")),
                }
            }
            _ => Err(self.syntax_error("missing operand")),
        }
    }

    fn coerce_int(&self, value: Value) -> Result<Value, Error> {
        match value {
            Value::Int(v) => Ok(Value::Int(v)),
            Value::Str(s) => {
                let trimmed = s.trim();
                let (negative, digits) = match trimmed.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, trimmed),
                };
                let parsed = parse_int(digits, self.source)?;
                Ok(Value::Int(if negative { -parsed } else { parsed }))
            }
        }
    }
}

fn render_hex(value: i128) -> String {
    if value < 0 {
        format!("-{:#x}", -value)
    } else {
        format!("{value:#x}")
    }
}
