//! Rule expression language.
//!
//! A small, side-effect free language for rule conditions and mapped values,
//! evaluated over a [`TranslationContext`].
//!
//! ```text
//! 'CN=' + attr['cn'] + ',O=ICM'          string concatenation
//! idsByType['email']                     lookup, yields a list
//! ['staff', 'users']                     list literal
//! attr['o'] == 'ICM' && !(idp == 'x')    boolean logic
//! groups contains 'admins'               membership test
//! ```
//!
//! Lookups of missing keys yield `null`. Concatenation with `null` yields
//! `null`, so a value expression over a missing attribute maps nothing.

use std::fmt;

use serde_json::Value;

use crate::context::TranslationContext;
use crate::error::{TranslationError, TranslationResult};

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Num(i64),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Plus,
    EqEq,
    NotEq,
    Not,
    AndAnd,
    OrOr,
}

fn tokenize(src: &str) -> TranslationResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' | '"' => {
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    match ch {
                        '\\' => match chars.next() {
                            Some((_, escaped)) => s.push(escaped),
                            None => break,
                        },
                        ch if ch == c => {
                            closed = true;
                            break;
                        }
                        ch => s.push(ch),
                    }
                }
                if !closed {
                    return Err(TranslationError::expression(format!(
                        "unterminated string starting at {pos}"
                    )));
                }
                tokens.push(Token::Str(s));
            }
            '0'..='9' => {
                let mut n = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    n.push(d);
                    chars.next();
                }
                let value = n
                    .parse()
                    .map_err(|_| TranslationError::expression(format!("number too large: {n}")))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !(d.is_alphanumeric() || d == '_') {
                        break;
                    }
                    ident.push(d);
                    chars.next();
                }
                tokens.push(Token::Ident(ident));
            }
            _ => {
                chars.next();
                let next = chars.peek().map(|&(_, n)| n);
                let token = match (c, next) {
                    ('=', Some('=')) => {
                        chars.next();
                        Token::EqEq
                    }
                    ('!', Some('=')) => {
                        chars.next();
                        Token::NotEq
                    }
                    ('&', Some('&')) => {
                        chars.next();
                        Token::AndAnd
                    }
                    ('|', Some('|')) => {
                        chars.next();
                        Token::OrOr
                    }
                    ('!', _) => Token::Not,
                    ('(', _) => Token::LParen,
                    (')', _) => Token::RParen,
                    ('[', _) => Token::LBracket,
                    (']', _) => Token::RBracket,
                    (',', _) => Token::Comma,
                    ('.', _) => Token::Dot,
                    ('+', _) => Token::Plus,
                    _ => {
                        return Err(TranslationError::expression(format!(
                            "unexpected character '{c}' at {pos}"
                        )))
                    }
                };
                tokens.push(token);
            }
        }
    }
    Ok(tokens)
}

// ============================================================================
// Syntax Tree
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Var(String),
    List(Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Concat(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Contains(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Deepest allowed nesting of parentheses, lists, indexes and negations.
const MAX_NESTING: usize = 32;

/// Longest allowed expression, in tokens.
const MAX_TOKENS: usize = 1024;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn nested<T>(&mut self, parse: fn(&mut Self) -> TranslationResult<T>) -> TranslationResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(TranslationError::expression(format!(
                "expression nested deeper than {MAX_NESTING} levels"
            )));
        }
        self.depth += 1;
        let parsed = parse(self);
        self.depth -= 1;
        parsed
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> TranslationResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(TranslationError::expression(format!(
                "expected {token:?}, found {:?}",
                self.peek()
            )))
        }
    }

    fn or(&mut self) -> TranslationResult<Expr> {
        self.nested(Self::or_chain)
    }

    fn or_chain(&mut self) -> TranslationResult<Expr> {
        let mut left = self.and()?;
        while self.eat(&Token::OrOr) {
            left = Expr::Or(Box::new(left), Box::new(self.and()?));
        }
        Ok(left)
    }

    fn and(&mut self) -> TranslationResult<Expr> {
        let mut left = self.equality()?;
        while self.eat(&Token::AndAnd) {
            left = Expr::And(Box::new(left), Box::new(self.equality()?));
        }
        Ok(left)
    }

    fn equality(&mut self) -> TranslationResult<Expr> {
        let left = self.unary()?;
        let op: fn(Box<Expr>, Box<Expr>) -> Expr = match self.peek() {
            Some(Token::EqEq) => Expr::Eq,
            Some(Token::NotEq) => Expr::Ne,
            Some(Token::Ident(word)) if word == "contains" => Expr::Contains,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.unary()?;
        Ok(op(Box::new(left), Box::new(right)))
    }

    fn unary(&mut self) -> TranslationResult<Expr> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.nested(Self::unary)?)));
        }
        self.concat()
    }

    fn concat(&mut self) -> TranslationResult<Expr> {
        let mut left = self.postfix()?;
        while self.eat(&Token::Plus) {
            left = Expr::Concat(Box::new(left), Box::new(self.postfix()?));
        }
        Ok(left)
    }

    fn postfix(&mut self) -> TranslationResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(&Token::LBracket) {
                let index = self.or()?;
                self.expect(&Token::RBracket)?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.eat(&Token::Dot) {
                match self.next() {
                    Some(Token::Ident(field)) => {
                        expr = Expr::Index(
                            Box::new(expr),
                            Box::new(Expr::Literal(Value::String(field))),
                        );
                    }
                    other => {
                        return Err(TranslationError::expression(format!(
                            "expected field name after '.', found {other:?}"
                        )))
                    }
                }
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> TranslationResult<Expr> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(Token::Num(n)) => Ok(Expr::Literal(Value::from(n))),
            Some(Token::Ident(word)) => Ok(match word.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                _ => Expr::Var(word),
            }),
            Some(Token::LParen) => {
                let inner = self.or()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::LBracket) => {
                let mut items = Vec::new();
                if !self.eat(&Token::RBracket) {
                    loop {
                        items.push(self.or()?);
                        if self.eat(&Token::RBracket) {
                            break;
                        }
                        self.expect(&Token::Comma)?;
                    }
                }
                Ok(Expr::List(items))
            }
            other => Err(TranslationError::expression(format!(
                "unexpected token {other:?}"
            ))),
        }
    }
}

// ============================================================================
// Expression
// ============================================================================

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: Expr,
}

impl Expression {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Expression` if the source is malformed.
    pub fn parse(source: &str) -> TranslationResult<Self> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(TranslationError::expression("empty expression"));
        }
        if tokens.len() > MAX_TOKENS {
            return Err(TranslationError::expression(format!(
                "expression longer than {MAX_TOKENS} tokens"
            )));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let ast = parser.or()?;
        if parser.pos < parser.tokens.len() {
            return Err(TranslationError::expression(format!(
                "unexpected trailing input in '{source}'"
            )));
        }
        Ok(Self {
            source: source.to_string(),
            ast,
        })
    }

    /// Creates a constant boolean expression.
    #[must_use]
    pub fn constant(value: bool) -> Self {
        Self {
            source: value.to_string(),
            ast: Expr::Literal(Value::Bool(value)),
        }
    }

    /// Returns the source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates the expression.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Expression` on a type mismatch.
    pub fn evaluate(&self, ctx: &TranslationContext) -> TranslationResult<Value> {
        eval(&self.ast, ctx)
    }

    /// Evaluates the expression and converts the result to a boolean.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Expression` on a type mismatch.
    pub fn evaluate_bool(&self, ctx: &TranslationContext) -> TranslationResult<bool> {
        Ok(truthy(&self.evaluate(ctx)?))
    }

    /// Evaluates the expression into a list of string values.
    ///
    /// `null` gives no values, a list gives one value per non-null element.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Expression` on a type mismatch.
    pub fn evaluate_strings(&self, ctx: &TranslationContext) -> TranslationResult<Vec<String>> {
        Ok(to_strings(&self.evaluate(ctx)?))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn eval(expr: &Expr, ctx: &TranslationContext) -> TranslationResult<Value> {
    Ok(match expr {
        Expr::Literal(v) => v.clone(),
        Expr::Var(name) => ctx.get(name).cloned().unwrap_or(Value::Null),
        Expr::List(items) => Value::Array(
            items
                .iter()
                .map(|item| eval(item, ctx))
                .collect::<TranslationResult<_>>()?,
        ),
        Expr::Index(target, index) => {
            let target = eval(target, ctx)?;
            let index = eval(index, ctx)?;
            match (&target, &index) {
                (Value::Object(map), Value::String(key)) => {
                    map.get(key).cloned().unwrap_or(Value::Null)
                }
                (Value::Array(items), Value::Number(n)) => n
                    .as_u64()
                    .and_then(|i| usize::try_from(i).ok())
                    .and_then(|i| items.get(i))
                    .cloned()
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            }
        }
        Expr::Concat(a, b) => concat(eval(a, ctx)?, eval(b, ctx)?)?,
        Expr::Eq(a, b) => Value::Bool(eval(a, ctx)? == eval(b, ctx)?),
        Expr::Ne(a, b) => Value::Bool(eval(a, ctx)? != eval(b, ctx)?),
        Expr::Contains(a, b) => {
            let haystack = eval(a, ctx)?;
            let needle = eval(b, ctx)?;
            Value::Bool(match (&haystack, &needle) {
                (Value::Array(items), _) => items.contains(&needle),
                (Value::String(s), Value::String(sub)) => s.contains(sub.as_str()),
                (Value::Object(map), Value::String(key)) => map.contains_key(key),
                _ => false,
            })
        }
        Expr::Not(a) => Value::Bool(!truthy(&eval(a, ctx)?)),
        Expr::And(a, b) => Value::Bool(truthy(&eval(a, ctx)?) && truthy(&eval(b, ctx)?)),
        Expr::Or(a, b) => Value::Bool(truthy(&eval(a, ctx)?) || truthy(&eval(b, ctx)?)),
    })
}

fn concat(a: Value, b: Value) -> TranslationResult<Value> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Array(mut x), Value::Array(y)) => {
            x.extend(y);
            Ok(Value::Array(x))
        }
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Ok(Value::from(x.wrapping_add(y))),
            _ => Ok(Value::String(format!("{x}{y}"))),
        },
        (a @ (Value::Array(_) | Value::Object(_)), b) | (a, b @ (Value::Array(_) | Value::Object(_))) => {
            Err(TranslationError::expression(format!(
                "can not concatenate {a} and {b}"
            )))
        }
        (a, b) => Ok(Value::String(format!("{}{}", scalar(&a), scalar(&b)))),
    }
}

fn scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Converts a value to a boolean.
#[must_use]
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Converts a value to string values.
#[must_use]
pub fn to_strings(v: &Value) -> Vec<String> {
    match v {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(scalar)
            .collect(),
        other => vec![scalar(other)],
    }
}
