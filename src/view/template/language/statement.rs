//! Template statements: literal text, prints, conditionals and loops.
use super::super::{Context, Error, Value};
use super::expression::Expression;
use super::html_escape;
use super::lexer::{Token, TokenIter};
use crate::presenter::Presenter;

#[derive(Debug, Clone)]
pub enum Statement {
    Text(String),

    // `<%= expression %>` (escaped) or `<%- expression %>` (raw).
    Print {
        expression: Expression,
        raw: bool,
    },

    // `<% expression %>`, evaluated for side effects only.
    Expression(Expression),

    If {
        condition: Expression,
        body: Vec<Statement>,
        elsif: Vec<(Expression, Vec<Statement>)>,
        else_body: Vec<Statement>,
    },

    For {
        variable: String,
        list: Expression,
        body: Vec<Statement>,
    },
}

// A parse step yields either a statement or one of the block
// terminators the enclosing statement is waiting for.
#[derive(Debug)]
pub(crate) enum Parsed {
    Statement(Statement),
    ElseIf(Expression, usize),
    Else(usize),
    End(usize),
}

impl Parsed {
    pub(crate) fn unexpected(&self) -> Error {
        let (line, tag) = match self {
            Parsed::ElseIf(_, line) => (*line, "elsif"),
            Parsed::Else(line) => (*line, "else"),
            Parsed::End(line) => (*line, "end"),
            Parsed::Statement(_) => (0, "statement"),
        };

        Error::Syntax {
            line,
            message: format!("unexpected <% {} %>", tag),
        }
    }
}

impl Statement {
    pub(crate) fn parse(iter: &mut TokenIter) -> Result<Parsed, Error> {
        let next = iter.next().ok_or(Error::Eof("statement"))?;
        let line = next.line();

        match next.token() {
            Token::Text(text) => Ok(Parsed::Statement(Statement::Text(text))),

            token @ (Token::BlockStartPrint | Token::BlockStartRaw) => {
                let expression = Expression::parse(iter)?;
                Self::expect_block_end(iter)?;
                Ok(Parsed::Statement(Statement::Print {
                    expression,
                    raw: token == Token::BlockStartRaw,
                }))
            }

            Token::BlockStart => {
                let peeked = iter.peek().ok_or(Error::Eof("template tag"))?.token();

                match peeked {
                    Token::If => {
                        let _ = iter.next();
                        Self::parse_if(iter)
                    }

                    Token::For => {
                        let _ = iter.next();
                        Self::parse_for(iter, line)
                    }

                    Token::ElseIf => {
                        let _ = iter.next();
                        let condition = Expression::parse(iter)?;
                        Self::expect_block_end(iter)?;
                        Ok(Parsed::ElseIf(condition, line))
                    }

                    Token::Else => {
                        let _ = iter.next();
                        Self::expect_block_end(iter)?;
                        Ok(Parsed::Else(line))
                    }

                    Token::End => {
                        let _ = iter.next();
                        Self::expect_block_end(iter)?;
                        Ok(Parsed::End(line))
                    }

                    _ => {
                        let expression = Expression::parse(iter)?;
                        Self::expect_block_end(iter)?;
                        Ok(Parsed::Statement(Statement::Expression(expression)))
                    }
                }
            }

            token => Err(Error::Syntax {
                line,
                message: format!("unexpected token {:?}", token),
            }),
        }
    }

    fn parse_if(iter: &mut TokenIter) -> Result<Parsed, Error> {
        let condition = Expression::parse(iter)?;
        Self::expect_block_end(iter)?;

        let (body, mut terminator) = Self::parse_body(iter)?;
        let mut elsif = vec![];
        let mut else_body = vec![];

        loop {
            match terminator {
                Parsed::End(_) => break,

                Parsed::ElseIf(condition, _) => {
                    let (branch, next) = Self::parse_body(iter)?;
                    elsif.push((condition, branch));
                    terminator = next;
                }

                Parsed::Else(_) => {
                    let (branch, next) = Self::parse_body(iter)?;
                    else_body = branch;
                    match next {
                        Parsed::End(_) => break,
                        other => return Err(other.unexpected()),
                    }
                }

                Parsed::Statement(_) => unreachable!("parse_body returns terminators only"),
            }
        }

        Ok(Parsed::Statement(Statement::If {
            condition,
            body,
            elsif,
            else_body,
        }))
    }

    fn parse_for(iter: &mut TokenIter, line: usize) -> Result<Parsed, Error> {
        let next = iter.next().ok_or(Error::Eof("for loop"))?;
        let variable = match next.token() {
            Token::Identifier(name) => name,
            token => {
                return Err(Error::Syntax {
                    line: next.line(),
                    message: format!("expected loop variable, found {:?}", token),
                })
            }
        };

        let next = iter.next().ok_or(Error::Eof("for loop"))?;
        if next.token() != Token::In {
            return Err(Error::Syntax {
                line,
                message: "expected \"in\" after loop variable".into(),
            });
        }

        let list = Expression::parse(iter)?;
        Self::expect_block_end(iter)?;

        let (body, terminator) = Self::parse_body(iter)?;
        match terminator {
            Parsed::End(_) => Ok(Parsed::Statement(Statement::For {
                variable,
                list,
                body,
            })),
            other => Err(other.unexpected()),
        }
    }

    // Parse statements until a block terminator.
    fn parse_body(iter: &mut TokenIter) -> Result<(Vec<Statement>, Parsed), Error> {
        let mut body = vec![];

        loop {
            if iter.peek().is_none() {
                return Err(Error::Eof("block body"));
            }

            match Self::parse(iter)? {
                Parsed::Statement(statement) => body.push(statement),
                terminator => return Ok((body, terminator)),
            }
        }
    }

    fn expect_block_end(iter: &mut TokenIter) -> Result<(), Error> {
        let next = iter.next().ok_or(Error::Eof("template tag"))?;
        match next.token() {
            Token::BlockEnd => Ok(()),
            token => Err(Error::Syntax {
                line: next.line(),
                message: format!("expected %>, found {:?}", token),
            }),
        }
    }

    /// Evaluate the statement, writing output into the host's render buffer.
    pub fn evaluate(&self, context: &Context, host: &dyn Presenter) -> Result<(), Error> {
        match self {
            Statement::Text(text) => host.write_output(text),

            Statement::Print { expression, raw } => {
                let rendered = match (raw, expression.evaluate(context, host)?) {
                    // Null prints as nothing, not "null".
                    (_, Value::Null) => String::new(),
                    // Safe values bypass escaping regardless of the tag.
                    (_, Value::Safe(inner)) => inner.to_string(),
                    (true, value) => value.to_string(),
                    (false, value) => html_escape(&value.to_string()),
                };
                host.write_output(&rendered);
            }

            Statement::Expression(expression) => {
                let _ = expression.evaluate(context, host)?;
            }

            Statement::If {
                condition,
                body,
                elsif,
                else_body,
            } => {
                if condition.evaluate(context, host)?.truthy() {
                    return Self::evaluate_all(body, context, host);
                }

                for (condition, branch) in elsif {
                    if condition.evaluate(context, host)?.truthy() {
                        return Self::evaluate_all(branch, context, host);
                    }
                }

                Self::evaluate_all(else_body, context, host)?;
            }

            Statement::For {
                variable,
                list,
                body,
            } => {
                let items = match list.evaluate(context, host)? {
                    Value::List(items) => items,
                    other => {
                        return Err(Error::Runtime(format!("cannot iterate over {}", other)))
                    }
                };

                let mut scope = context.clone();
                for item in items {
                    scope.set(variable, item)?;
                    Self::evaluate_all(body, &scope, host)?;
                }
            }
        }

        Ok(())
    }

    fn evaluate_all(
        statements: &[Statement],
        context: &Context,
        host: &dyn Presenter,
    ) -> Result<(), Error> {
        for statement in statements {
            statement.evaluate(context, host)?;
        }

        Ok(())
    }
}
