//! Document model for the pinned-catalog configuration dialect.
//!
//! Both the dependency declaration file and the generated catalog files are
//! written in a restricted, Starlark-like dialect: an optional comment
//! preamble, an optional `load(...)` statement, and a sequence of top-level
//! statements. A statement is either an assignment (`IDENT = <expr>`) or a
//! keyword-argument call (`macro(name = "...", ...)`). Expressions are string
//! literals, lists of string literals, the boolean literals `True`/`False`,
//! and one constant-expression idiom:
//!
//! ```text
//! NOTICE = "\n".join([
//!     "first line",
//!     "second line",
//! ])
//! ```
//!
//! The join idiom exists so long multi-line text blocks never embed a real
//! newline inside a single string literal. The parser folds it into an
//! ordinary [`Expr::Str`] whose value contains `\n`; the printer re-emits the
//! idiom whenever it prints a string containing a newline. This is the only
//! constant evaluation the model performs. It is a pattern match over the
//! parsed tree (fixed receiver `"\n"`, fixed method `join`, list-literal
//! argument), not a general evaluator.
//!
//! # Round-trip contract
//!
//! For any `text` produced by [`printer::print_document`],
//! `print(parse(text)) == text` byte-for-byte. Files not produced by this
//! tool still parse as long as they stay inside the supported grammar;
//! anything else fails with a [`ParseError`] carrying the offending source
//! location. No partial documents are ever produced; a parse error is fatal
//! for the whole file, which is what keeps round-trips lossless.
//!
//! # Comments
//!
//! Only the leading comment block (the preamble) is part of the model.
//! Interior comments in foreign files are accepted and skipped; the printer
//! never emits them, so they survive parsing but not regeneration.

pub mod printer;

use std::fmt;
use thiserror::Error;

/// A parsed dialect file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// Leading comment lines, stored without the `#` marker or the space
    /// following it. An empty string is a bare `#` line.
    pub preamble: Vec<String>,
    /// The `load(...)` statement naming the macro used by the file, if any.
    pub load: Option<LoadStatement>,
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
}

/// A `load("<label>", "<symbol>", ...)` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStatement {
    /// The label of the file being loaded, e.g. `//tools/build:maven.bzl`.
    pub label: String,
    /// The symbols imported from that label. At least one.
    pub symbols: Vec<String>,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `NAME = <expr>`
    Assign { name: String, value: Expr },
    /// `function(key = <expr>, ...)`
    Call { function: String, kwargs: Vec<(String, Expr)> },
}

/// An expression in the supported grammar subset.
///
/// Lists may only contain string literals; the dialect has no nested lists.
/// A `Str` whose value contains `\n` prints as the join idiom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Str(String),
    List(Vec<String>),
    Bool(bool),
}

impl Expr {
    /// The string value, if this is a string expression.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The list elements, if this is a list expression.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean literal.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Error raised when a file uses a construct outside the supported grammar.
///
/// Carries the 1-based source location of the offending token and the text of
/// the source line it appeared on. Always fatal for the file being read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub source_line: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid file: {} ({}:{})\n {}\n",
            self.message, self.line, self.column, self.source_line
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Str(String),
    Eq,
    Dot,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Str(_) => write!(f, "string literal"),
            Self::Eq => write!(f, "'='"),
            Self::Dot => write!(f, "'.'"),
            Self::Comma => write!(f, "','"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: u32,
    column: u32,
}

/// Parse dialect source text into a [`Document`].
///
/// # Errors
///
/// Returns a [`ParseError`] for any construct outside the supported subset:
/// a non-identifier left-hand side, an unsupported expression shape, a join
/// idiom with the wrong receiver or method, or a malformed token.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let preamble = leading_preamble(&lines);
    let tokens = lex(text, &lines)?;
    Parser { tokens, pos: 0, lines: &lines }.parse_document(preamble)
}

/// Contiguous `#` comment lines at the very top of the file.
fn leading_preamble(lines: &[&str]) -> Vec<String> {
    let mut preamble = Vec::new();
    for line in lines {
        if let Some(rest) = line.strip_prefix('#') {
            preamble.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        } else {
            break;
        }
    }
    preamble
}

fn source_line(lines: &[&str], line: u32) -> String {
    lines
        .get(line.saturating_sub(1) as usize)
        .map_or_else(String::new, |l| (*l).to_string())
}

fn lex_error(lines: &[&str], message: impl Into<String>, line: u32, column: u32) -> ParseError {
    ParseError {
        message: message.into(),
        line,
        column,
        source_line: source_line(lines, line),
    }
}

fn lex(text: &str, lines: &[&str]) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line: u32 = 1;
    let mut column: u32 = 1;

    macro_rules! bump {
        () => {{
            let c = chars.next();
            if c == Some('\n') {
                line += 1;
                column = 1;
            } else if c.is_some() {
                column += 1;
            }
            c
        }};
    }

    while let Some(&c) = chars.peek() {
        let (tok_line, tok_column) = (line, column);
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                bump!();
            }
            '#' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    bump!();
                }
            }
            '"' => {
                bump!();
                let mut value = String::new();
                loop {
                    match bump!() {
                        None | Some('\n') => {
                            return Err(lex_error(
                                lines,
                                "unterminated string literal",
                                tok_line,
                                tok_column,
                            ));
                        }
                        Some('"') => break,
                        Some('\\') => match bump!() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some('r') => value.push('\r'),
                            Some('\\') => value.push('\\'),
                            Some('"') => value.push('"'),
                            other => {
                                return Err(lex_error(
                                    lines,
                                    format!(
                                        "unsupported escape sequence '\\{}'",
                                        other.map_or_else(String::new, |c| c.to_string())
                                    ),
                                    tok_line,
                                    tok_column,
                                ));
                            }
                        },
                        Some(c) => value.push(c),
                    }
                }
                tokens.push(Token { tok: Tok::Str(value), line: tok_line, column: tok_column });
            }
            '=' => {
                bump!();
                tokens.push(Token { tok: Tok::Eq, line: tok_line, column: tok_column });
            }
            '.' => {
                bump!();
                tokens.push(Token { tok: Tok::Dot, line: tok_line, column: tok_column });
            }
            ',' => {
                bump!();
                tokens.push(Token { tok: Tok::Comma, line: tok_line, column: tok_column });
            }
            '[' => {
                bump!();
                tokens.push(Token { tok: Tok::LBracket, line: tok_line, column: tok_column });
            }
            ']' => {
                bump!();
                tokens.push(Token { tok: Tok::RBracket, line: tok_line, column: tok_column });
            }
            '(' => {
                bump!();
                tokens.push(Token { tok: Tok::LParen, line: tok_line, column: tok_column });
            }
            ')' => {
                bump!();
                tokens.push(Token { tok: Tok::RParen, line: tok_line, column: tok_column });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        bump!();
                    } else {
                        break;
                    }
                }
                tokens.push(Token { tok: Tok::Ident(name), line: tok_line, column: tok_column });
            }
            c => {
                return Err(lex_error(
                    lines,
                    format!("unexpected character '{c}'"),
                    tok_line,
                    tok_column,
                ));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    lines: &'a [&'a str],
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, message: impl Into<String>, line: u32, column: u32) -> ParseError {
        lex_error(self.lines, message, line, column)
    }

    /// Error positioned at the current token, or just past the last line for
    /// an unexpected end of input.
    fn error_here(&self, message: impl Into<String>) -> ParseError {
        match self.peek() {
            Some(token) => self.error_at(message, token.line, token.column),
            None => {
                let line = self.lines.len().max(1) as u32;
                let column = self
                    .lines
                    .last()
                    .map_or(1, |l| l.chars().count() as u32 + 1);
                self.error_at(message, line, column)
            }
        }
    }

    fn expect(&mut self, expected: &Tok) -> Result<Token, ParseError> {
        match self.peek() {
            Some(token) if token.tok == *expected => Ok(self.next().unwrap()),
            Some(token) => Err(self.error_at(
                format!("expected {}, found {}", expected, token.tok),
                token.line,
                token.column,
            )),
            None => Err(self.error_here(format!("expected {expected}, found end of file"))),
        }
    }

    fn expect_str(&mut self, what: &str) -> Result<String, ParseError> {
        match self.next() {
            Some(Token { tok: Tok::Str(value), .. }) => Ok(value),
            Some(token) => Err(self.error_at(
                format!("expected {what}, found {}", token.tok),
                token.line,
                token.column,
            )),
            None => Err(self.error_here(format!("expected {what}, found end of file"))),
        }
    }

    fn parse_document(mut self, preamble: Vec<String>) -> Result<Document, ParseError> {
        let mut doc = Document { preamble, load: None, statements: Vec::new() };

        while let Some(token) = self.next() {
            let Token { tok, line, column } = token;
            let name = match tok {
                Tok::Ident(name) => name,
                other => {
                    return Err(self.error_at(
                        format!("expected identifier at start of statement, found {other}"),
                        line,
                        column,
                    ));
                }
            };

            match self.peek().map(|t| t.tok.clone()) {
                Some(Tok::Eq) => {
                    self.next();
                    let value = self.parse_expr()?;
                    doc.statements.push(Statement::Assign { name, value });
                }
                Some(Tok::LParen) if name == "load" => {
                    if doc.load.is_some() {
                        return Err(self.error_at("duplicate load statement", line, column));
                    }
                    if !doc.statements.is_empty() {
                        return Err(self.error_at(
                            "load statement must precede all other statements",
                            line,
                            column,
                        ));
                    }
                    doc.load = Some(self.parse_load()?);
                }
                Some(Tok::LParen) => {
                    let kwargs = self.parse_kwargs()?;
                    doc.statements.push(Statement::Call { function: name, kwargs });
                }
                _ => {
                    return Err(self.error_here("expected '=' or '(' after identifier"));
                }
            }
        }
        Ok(doc)
    }

    fn parse_load(&mut self) -> Result<LoadStatement, ParseError> {
        self.expect(&Tok::LParen)?;
        let label = self.expect_str("load label")?;
        let mut symbols = Vec::new();
        while let Some(token) = self.peek() {
            match token.tok {
                Tok::Comma => {
                    self.next();
                    // Trailing comma before the closing paren is fine.
                    if matches!(self.peek().map(|t| &t.tok), Some(Tok::RParen)) {
                        break;
                    }
                    symbols.push(self.expect_str("load symbol")?);
                }
                Tok::RParen => break,
                _ => return Err(self.error_here("expected ',' or ')' in load statement")),
            }
        }
        self.expect(&Tok::RParen)?;
        if symbols.is_empty() {
            return Err(self.error_here("load statement names no symbols"));
        }
        Ok(LoadStatement { label, symbols })
    }

    fn parse_kwargs(&mut self) -> Result<Vec<(String, Expr)>, ParseError> {
        self.expect(&Tok::LParen)?;
        let mut kwargs = Vec::new();
        loop {
            match self.peek().map(|t| t.tok.clone()) {
                Some(Tok::RParen) => {
                    self.next();
                    break;
                }
                Some(Tok::Ident(key)) => {
                    self.next();
                    self.expect(&Tok::Eq)?;
                    let value = self.parse_expr()?;
                    kwargs.push((key, value));
                    match self.peek().map(|t| t.tok.clone()) {
                        Some(Tok::Comma) => {
                            self.next();
                        }
                        Some(Tok::RParen) => {}
                        _ => return Err(self.error_here("expected ',' or ')' after argument")),
                    }
                }
                Some(_) => {
                    return Err(self.error_here("expected keyword argument or ')'"));
                }
                None => return Err(self.error_here("expected ')', found end of file")),
            }
        }
        Ok(kwargs)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        match self.peek().map(|t| t.tok.clone()) {
            Some(Tok::Str(value)) => {
                let (line, column) = {
                    let t = self.peek().unwrap();
                    (t.line, t.column)
                };
                self.next();
                if matches!(self.peek().map(|t| &t.tok), Some(Tok::Dot)) {
                    self.parse_join(&value, line, column)
                } else {
                    Ok(Expr::Str(value))
                }
            }
            Some(Tok::LBracket) => Ok(Expr::List(self.parse_string_list()?)),
            Some(Tok::Ident(name)) if name == "True" => {
                self.next();
                Ok(Expr::Bool(true))
            }
            Some(Tok::Ident(name)) if name == "False" => {
                self.next();
                Ok(Expr::Bool(false))
            }
            Some(_) => Err(self.error_here("unsupported expression")),
            None => Err(self.error_here("expected expression, found end of file")),
        }
    }

    /// The `"\n".join([...])` idiom. Anything other than this exact shape is
    /// rejected; the model never evaluates arbitrary expressions.
    fn parse_join(&mut self, receiver: &str, line: u32, column: u32) -> Result<Expr, ParseError> {
        if receiver != "\n" {
            return Err(self.error_at(
                "method calls are only supported on the receiver \"\\n\"",
                line,
                column,
            ));
        }
        self.expect(&Tok::Dot)?;
        match self.next() {
            Some(Token { tok: Tok::Ident(method), line, column }) => {
                if method != "join" {
                    return Err(self.error_at(
                        format!("unsupported method '{method}', only 'join' is allowed"),
                        line,
                        column,
                    ));
                }
            }
            _ => return Err(self.error_here("expected method name after '.'")),
        }
        self.expect(&Tok::LParen)?;
        let parts = self.parse_string_list()?;
        self.expect(&Tok::RParen)?;
        Ok(Expr::Str(parts.join("\n")))
    }

    fn parse_string_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&Tok::LBracket)?;
        let mut items = Vec::new();
        loop {
            match self.peek().map(|t| t.tok.clone()) {
                Some(Tok::RBracket) => {
                    self.next();
                    break;
                }
                Some(Tok::Str(value)) => {
                    self.next();
                    items.push(value);
                    match self.peek().map(|t| t.tok.clone()) {
                        Some(Tok::Comma) => {
                            self.next();
                        }
                        Some(Tok::RBracket) => {}
                        _ => return Err(self.error_here("expected ',' or ']' in list")),
                    }
                }
                Some(_) => return Err(self.error_here("expected string literal in list")),
                None => return Err(self.error_here("expected ']', found end of file")),
            }
        }
        Ok(items)
    }
}
