//! Pretty-printer for the configuration dialect.
//!
//! Output format is part of the round-trip contract, not cosmetics: the
//! wrap-vs-inline decision for lists is a fixed structural rule, never a
//! line-length heuristic. The printer is a cursor-based builder with an
//! indentation stack: [`Printer::increase_indent`] and
//! [`Printer::decrease_indent`] affect every subsequent line, and each line
//! separator emits the current indent before the next token.
//!
//! # List formatting law
//!
//! - empty list: `[]`
//! - one element: `["value"]`, never wrapped
//! - two or more elements: one element per line, each followed by a trailing
//!   comma, brackets on their own lines, body one indent level deeper

use super::{Document, Expr, LoadStatement, Statement};

const INDENT: &str = "    ";

/// Cursor-based text builder with an indentation stack.
#[derive(Debug, Default)]
pub struct Printer {
    out: String,
    indent: usize,
    at_line_start: bool,
}

impl Printer {
    #[must_use]
    pub fn new() -> Self {
        Self { out: String::new(), indent: 0, at_line_start: true }
    }

    pub fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub fn decrease_indent(&mut self) {
        debug_assert!(self.indent > 0, "indent stack underflow");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Append a token on the current line, emitting the pending indent first
    /// if this is the first token of the line.
    pub fn token(&mut self, text: &str) {
        if self.at_line_start {
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    /// Terminate the current line. Calling this at the start of a line
    /// produces a blank line; indent is only ever emitted ahead of a token.
    pub fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    /// Emit a quoted string literal with dialect escaping.
    pub fn string(&mut self, value: &str) {
        self.token(&quote(value));
    }

    /// Emit a list of strings according to the formatting law.
    pub fn string_list(&mut self, items: &[String]) {
        match items {
            [] => self.token("[]"),
            [only] => {
                self.token("[");
                self.string(only);
                self.token("]");
            }
            items => {
                self.token("[");
                self.newline();
                self.increase_indent();
                for item in items {
                    self.string(item);
                    self.token(",");
                    self.newline();
                }
                self.decrease_indent();
                self.token("]");
            }
        }
    }

    /// Emit an expression. Strings containing a newline render through the
    /// `"\n".join([...])` idiom so no literal ever spans lines.
    pub fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Str(value) if value.contains('\n') => {
                self.token("\"\\n\".join(");
                let parts: Vec<String> = value.split('\n').map(str::to_string).collect();
                self.string_list(&parts);
                self.token(")");
            }
            Expr::Str(value) => self.string(value),
            Expr::List(items) => self.string_list(items),
            Expr::Bool(true) => self.token("True"),
            Expr::Bool(false) => self.token("False"),
        }
    }
}

/// Quote and escape a string literal.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a standalone list per the formatting law, at indent level zero.
#[must_use]
pub fn print_list(items: &[String]) -> String {
    let mut printer = Printer::new();
    printer.string_list(items);
    printer.finish()
}

/// Serialize a [`Document`] to source text.
///
/// Layout: preamble comment lines, a blank line, the load statement, a blank
/// line, then statements. Consecutive assignments are packed together; every
/// call statement is preceded by a blank line. The result always ends with a
/// single trailing newline. [`super::parse`] of the result reproduces the
/// document exactly.
#[must_use]
pub fn print_document(doc: &Document) -> String {
    let mut printer = Printer::new();

    for line in &doc.preamble {
        if line.is_empty() {
            printer.token("#");
        } else {
            printer.token("# ");
            printer.token(line);
        }
        printer.newline();
    }

    if let Some(load) = &doc.load {
        if !doc.preamble.is_empty() {
            printer.newline();
        }
        print_load(&mut printer, load);
    }

    let header = !doc.preamble.is_empty() || doc.load.is_some();
    let mut prev: Option<&Statement> = None;
    for statement in &doc.statements {
        // Consecutive assignments pack together; every other statement
        // boundary gets one blank line.
        let need_blank = match (prev, statement) {
            (None, _) => header,
            (Some(Statement::Assign { .. }), Statement::Assign { .. }) => false,
            _ => true,
        };
        if need_blank {
            printer.newline();
        }
        match statement {
            Statement::Assign { name, value } => print_assign(&mut printer, name, value),
            Statement::Call { function, kwargs } => print_call(&mut printer, function, kwargs),
        }
        prev = Some(statement);
    }

    printer.finish()
}

fn print_load(printer: &mut Printer, load: &LoadStatement) {
    printer.token("load(");
    printer.string(&load.label);
    for symbol in &load.symbols {
        printer.token(", ");
        printer.string(symbol);
    }
    printer.token(")");
    printer.newline();
}

fn print_assign(printer: &mut Printer, name: &str, value: &Expr) {
    printer.token(name);
    printer.token(" = ");
    printer.expr(value);
    printer.newline();
}

fn print_call(printer: &mut Printer, function: &str, kwargs: &[(String, Expr)]) {
    printer.token(function);
    printer.token("(");
    printer.newline();
    printer.increase_indent();
    for (key, value) in kwargs {
        printer.token(key);
        printer.token(" = ");
        printer.expr(value);
        printer.token(",");
        printer.newline();
    }
    printer.decrease_indent();
    printer.token(")");
    printer.newline();
}
