//! Tokenizer for template code.
//!
//! Two entry points: [`Lexer::template`] tokenizes a full ERB-style
//! template, alternating between literal text and `<% %>` code tags;
//! [`Lexer::code`] tokenizes a bare code snippet, which the concise
//! markup dialects use for their expression parts.
use super::super::{Error, Value};

use std::iter::Peekable;
use std::str::Chars;

/// A template language token, e.g. `if` or `%>`.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // e.g. `<html><body></body></html>`
    Text(String),
    // `<%`
    BlockStart,
    // `<%=`
    BlockStartPrint,
    // `<%-`
    BlockStartRaw,
    // `%>`
    BlockEnd,
    Identifier(String),
    InstanceVariable(String),
    Value(Value),
    If,
    ElseIf,
    Else,
    End,
    For,
    In,
    Not,
    And,
    Or,
    Plus,
    Minus,
    Mult,
    Div,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterEqualThan,
    LessThan,
    LessEqualThan,
    Dot,
    Comma,
    RoundBracketStart,
    RoundBracketEnd,
}

/// Token together with the line it was found on, for error reporting.
#[derive(Debug, PartialEq, Clone)]
pub struct TokenWithContext {
    token: Token,
    line: usize,
}

impl TokenWithContext {
    pub fn new(token: Token, line: usize) -> Self {
        Self { token, line }
    }

    pub fn token(&self) -> Token {
        self.token.clone()
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

pub(crate) type TokenIter = Peekable<std::vec::IntoIter<TokenWithContext>>;

pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    line: usize,
    tokens: Vec<TokenWithContext>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            iter: source.chars().peekable(),
            line: 1,
            tokens: vec![],
        }
    }

    /// Tokenize an ERB-style template: literal text with embedded
    /// `<% %>`, `<%= %>`, `<%- %>` and `<%# %>` tags.
    pub fn template(source: &'a str) -> Result<Vec<TokenWithContext>, Error> {
        let mut lexer = Self::new(source);
        lexer.text()?;
        Ok(lexer.tokens)
    }

    /// Tokenize a bare code snippet, e.g. `user.email.upcase`.
    pub fn code(source: &'a str) -> Result<Vec<TokenWithContext>, Error> {
        let mut lexer = Self::new(source);
        while lexer.iter.peek().is_some() {
            lexer.code_token()?;
        }
        Ok(lexer.tokens)
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(TokenWithContext::new(token, self.line));
    }

    fn text(&mut self) -> Result<(), Error> {
        let mut buffer = String::new();

        while let Some(c) = self.iter.next() {
            if c == '\n' {
                self.line += 1;
            }

            if c == '<' && self.iter.peek() == Some(&'%') {
                let _ = self.iter.next();

                if !buffer.is_empty() {
                    self.push(Token::Text(std::mem::take(&mut buffer)));
                }

                match self.iter.peek() {
                    Some('=') => {
                        let _ = self.iter.next();
                        self.push(Token::BlockStartPrint);
                    }
                    Some('-') => {
                        let _ = self.iter.next();
                        self.push(Token::BlockStartRaw);
                    }
                    Some('#') => {
                        let _ = self.iter.next();
                        self.comment()?;
                        continue;
                    }
                    _ => self.push(Token::BlockStart),
                }

                self.tag()?;
            } else {
                buffer.push(c);
            }
        }

        if !buffer.is_empty() {
            self.push(Token::Text(buffer));
        }

        Ok(())
    }

    // Consume code tokens until the closing `%>`.
    fn tag(&mut self) -> Result<(), Error> {
        loop {
            match self.iter.peek() {
                None => return Err(Error::Eof("template tag")),
                Some('%') => {
                    let _ = self.iter.next();
                    match self.iter.next() {
                        Some('>') => {
                            self.push(Token::BlockEnd);
                            return Ok(());
                        }
                        _ => {
                            return Err(Error::Syntax {
                                line: self.line,
                                message: "unexpected character '%'".into(),
                            })
                        }
                    }
                }
                Some(_) => self.code_token()?,
            }
        }
    }

    // Skip a `<%# ... %>` comment entirely.
    fn comment(&mut self) -> Result<(), Error> {
        while let Some(c) = self.iter.next() {
            if c == '\n' {
                self.line += 1;
            }
            if c == '%' && self.iter.peek() == Some(&'>') {
                let _ = self.iter.next();
                return Ok(());
            }
        }

        Err(Error::Eof("template comment"))
    }

    fn code_token(&mut self) -> Result<(), Error> {
        let c = match self.iter.next() {
            Some(c) => c,
            None => return Ok(()),
        };

        match c {
            '\n' => self.line += 1,
            c if c.is_whitespace() => (),
            '(' => self.push(Token::RoundBracketStart),
            ')' => self.push(Token::RoundBracketEnd),
            ',' => self.push(Token::Comma),
            '.' => self.push(Token::Dot),
            '+' => self.push(Token::Plus),
            '-' => self.push(Token::Minus),
            '*' => self.push(Token::Mult),
            '/' => self.push(Token::Div),
            '=' => match self.iter.peek() {
                Some('=') => {
                    let _ = self.iter.next();
                    self.push(Token::Equals);
                }
                _ => {
                    return Err(Error::Syntax {
                        line: self.line,
                        message: "assignment is not supported in templates".into(),
                    })
                }
            },
            '!' => match self.iter.peek() {
                Some('=') => {
                    let _ = self.iter.next();
                    self.push(Token::NotEquals);
                }
                _ => self.push(Token::Not),
            },
            '>' => match self.iter.peek() {
                Some('=') => {
                    let _ = self.iter.next();
                    self.push(Token::GreaterEqualThan);
                }
                _ => self.push(Token::GreaterThan),
            },
            '<' => match self.iter.peek() {
                Some('=') => {
                    let _ = self.iter.next();
                    self.push(Token::LessEqualThan);
                }
                _ => self.push(Token::LessThan),
            },
            '&' => match self.iter.next() {
                Some('&') => self.push(Token::And),
                _ => {
                    return Err(Error::Syntax {
                        line: self.line,
                        message: "unexpected character '&'".into(),
                    })
                }
            },
            '|' => match self.iter.next() {
                Some('|') => self.push(Token::Or),
                _ => {
                    return Err(Error::Syntax {
                        line: self.line,
                        message: "unexpected character '|'".into(),
                    })
                }
            },
            '"' => self.string()?,
            '@' => {
                let name = self.identifier_text(None);
                if name.is_empty() {
                    return Err(Error::Syntax {
                        line: self.line,
                        message: "expected instance variable name after '@'".into(),
                    });
                }
                self.push(Token::InstanceVariable(name));
            }
            c if c.is_ascii_digit() => self.number(c)?,
            c if c.is_alphabetic() || c == '_' => {
                let name = self.identifier_text(Some(c));
                self.keyword_or_identifier(name);
            }
            c => {
                return Err(Error::Syntax {
                    line: self.line,
                    message: format!("unexpected character '{}'", c),
                })
            }
        }

        Ok(())
    }

    fn identifier_text(&mut self, first: Option<char>) -> String {
        let mut name = String::new();
        if let Some(first) = first {
            name.push(first);
        }

        while let Some(c) = self.iter.peek() {
            if c.is_alphanumeric() || *c == '_' {
                name.push(*c);
                let _ = self.iter.next();
            } else {
                break;
            }
        }

        name
    }

    fn keyword_or_identifier(&mut self, name: String) {
        let token = match name.as_str() {
            "if" => Token::If,
            "elsif" => Token::ElseIf,
            "else" => Token::Else,
            "end" => Token::End,
            "for" => Token::For,
            "in" => Token::In,
            "true" => Token::Value(Value::Boolean(true)),
            "false" => Token::Value(Value::Boolean(false)),
            "null" => Token::Value(Value::Null),
            _ => Token::Identifier(name),
        };

        self.push(token);
    }

    fn string(&mut self) -> Result<(), Error> {
        let mut value = String::new();

        loop {
            match self.iter.next() {
                None => return Err(Error::Eof("string literal")),
                Some('"') => break,
                Some('\\') => match self.iter.next() {
                    Some('n') => value.push('\n'),
                    Some(c) => value.push(c),
                    None => return Err(Error::Eof("string literal")),
                },
                Some('\n') => {
                    self.line += 1;
                    value.push('\n');
                }
                Some(c) => value.push(c),
            }
        }

        self.push(Token::Value(Value::String(value)));
        Ok(())
    }

    fn number(&mut self, first: char) -> Result<(), Error> {
        let mut number = String::from(first);

        while let Some(c) = self.iter.peek() {
            if c.is_ascii_digit() {
                number.push(*c);
                let _ = self.iter.next();
            } else {
                break;
            }
        }

        // A dot only belongs to the number if a digit follows,
        // so `54.5.to_string` lexes as a float and a method call.
        if self.iter.peek() == Some(&'.') {
            let mut ahead = self.iter.clone();
            let _ = ahead.next();
            if matches!(ahead.next(), Some(c) if c.is_ascii_digit()) {
                number.push(self.iter.next().unwrap());
                while let Some(c) = self.iter.peek() {
                    if c.is_ascii_digit() {
                        number.push(*c);
                        let _ = self.iter.next();
                    } else {
                        break;
                    }
                }
            }
        }

        let token = if number.contains('.') {
            Token::Value(Value::Float(number.parse().map_err(|_| Error::Syntax {
                line: self.line,
                message: format!("invalid number \"{}\"", number),
            })?))
        } else {
            Token::Value(Value::Integer(number.parse().map_err(|_| {
                Error::Syntax {
                    line: self.line,
                    message: format!("invalid number \"{}\"", number),
                }
            })?))
        };

        self.push(token);
        Ok(())
    }
}
