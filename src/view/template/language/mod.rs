//! The template language: lexer, expressions, statements, programs.
pub mod expression;
pub mod lexer;
pub mod program;
pub mod statement;

pub use expression::{Expression, Op, Term};
pub use lexer::{Lexer, Token, TokenWithContext};
pub use program::Program;
pub use statement::Statement;

/// Escape a string for interpolation into HTML.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}
