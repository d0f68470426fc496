//! Expressions, like `5 == 6` or `user.email.upcase`, which when
//! evaluated produce a single [`Value`].
use super::super::{Context, Error, Value};
use super::lexer::{Token, TokenIter, TokenWithContext};
use crate::presenter::Presenter;

/// Binary and unary operators.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Op {
    Not,
    And,
    Or,
    Add,
    Sub,
    Mult,
    Div,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterEqualThan,
    LessThan,
    LessEqualThan,
}

impl Op {
    /// Convert a language token to an op. If the token
    /// isn't an op, `None` is returned.
    pub fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::Not => Op::Not,
            Token::And => Op::And,
            Token::Or => Op::Or,
            Token::Plus => Op::Add,
            Token::Minus => Op::Sub,
            Token::Mult => Op::Mult,
            Token::Div => Op::Div,
            Token::Equals => Op::Equals,
            Token::NotEquals => Op::NotEquals,
            Token::GreaterThan => Op::GreaterThan,
            Token::GreaterEqualThan => Op::GreaterEqualThan,
            Token::LessThan => Op::LessThan,
            Token::LessEqualThan => Op::LessEqualThan,
            _ => return None,
        })
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Op::Or => 1,
            Op::And => 2,
            Op::Equals | Op::NotEquals => 3,
            Op::GreaterThan | Op::GreaterEqualThan | Op::LessThan | Op::LessEqualThan => 4,
            Op::Add | Op::Sub => 5,
            Op::Mult | Op::Div => 6,
            Op::Not => 7,
        }
    }

    pub fn evaluate_unary(&self, value: &Value) -> Result<Value, Error> {
        match self {
            Op::Not => Ok(Value::Boolean(!value.truthy())),
            Op::Sub => Ok(match value {
                Value::Integer(integer) => Value::Integer(-integer),
                Value::Float(float) => Value::Float(-float),
                _ => Value::Null,
            }),
            Op::Add => Ok(value.clone()),
            _ => Ok(Value::Null),
        }
    }

    pub fn evaluate_binary(&self, left: &Value, right: &Value) -> Result<Value, Error> {
        match self {
            Op::Equals => Ok(Value::Boolean(left == right)),
            Op::NotEquals => Ok(Value::Boolean(left != right)),
            Op::LessThan => Ok(Value::Boolean(left < right)),
            Op::LessEqualThan => Ok(Value::Boolean(left <= right)),
            Op::GreaterThan => Ok(Value::Boolean(left > right)),
            Op::GreaterEqualThan => Ok(Value::Boolean(left >= right)),
            Op::And => Ok(Value::Boolean(left.truthy() && right.truthy())),
            Op::Or => Ok(Value::Boolean(left.truthy() || right.truthy())),
            Op::Add => Ok(left.add(right)),
            Op::Sub => Ok(left.sub(right)),
            Op::Mult => left.mul(right),
            Op::Div => left.div(right),
            Op::Not => Ok(Value::Null),
        }
    }
}

/// Base case of recursive expression parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Constant(Value),
    Variable(String),
    InstanceVariable(String),
}

/// An expression tree.
#[derive(Debug, Clone)]
pub enum Expression {
    Term(Term),

    Unary {
        op: Op,
        operand: Box<Expression>,
    },

    // Recursive, so `(5 + 6) / (1 - 5)` works.
    Binary {
        left: Box<Expression>,
        op: Op,
        right: Box<Expression>,
    },

    // A method or helper call. Without a receiver, the name is first
    // checked against the builtins and then dispatched to the host.
    Call {
        receiver: Option<Box<Expression>>,
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn constant(value: Value) -> Self {
        Expression::Term(Term::Constant(value))
    }

    pub fn variable(name: String) -> Self {
        Expression::Term(Term::Variable(name))
    }

    /// Evaluate the expression given the locals and the host object.
    ///
    /// Bare variables not present in the context fall back to zero-argument
    /// helper calls on the host, which is how templates call other methods
    /// on their presenter.
    pub fn evaluate(&self, context: &Context, host: &dyn Presenter) -> Result<Value, Error> {
        match self {
            Expression::Term(term) => match term {
                Term::Constant(value) => Ok(value.clone()),
                Term::Variable(name) => match context.get(name) {
                    Some(value) => Ok(value),
                    None => match host.call_helper(name, &[]) {
                        Ok(value) => Ok(value),
                        Err(Error::UnknownMethod(_)) => {
                            Err(Error::UndefinedVariable(name.clone()))
                        }
                        Err(err) => Err(err),
                    },
                },
                Term::InstanceVariable(name) => {
                    Ok(host.instance_variable(name).unwrap_or(Value::Null))
                }
            },

            Expression::Unary { op, operand } => {
                op.evaluate_unary(&operand.evaluate(context, host)?)
            }

            Expression::Binary { left, op, right } => {
                let left = left.evaluate(context, host)?;
                let right = right.evaluate(context, host)?;
                op.evaluate_binary(&left, &right)
            }

            Expression::Call {
                receiver,
                name,
                args,
            } => {
                // `default` may receive undefined variables; that's the point of it.
                let lenient = receiver.is_none() && name == "default";

                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    match arg.evaluate(context, host) {
                        Ok(value) => values.push(value),
                        Err(Error::UndefinedVariable(_)) if lenient => values.push(Value::Null),
                        Err(err) => return Err(err),
                    }
                }

                match receiver {
                    Some(receiver) => receiver.evaluate(context, host)?.call(name, &values),
                    None => match name.as_str() {
                        "raise" => Err(Error::Runtime(
                            values
                                .first()
                                .map(|v| v.to_string())
                                .unwrap_or_else(|| "raise".to_string()),
                        )),
                        "default" => Ok(values
                            .iter()
                            .find(|v| !matches!(v, Value::Null))
                            .cloned()
                            .unwrap_or(Value::Null)),
                        _ => host.call_helper(name, &values),
                    },
                }
            }
        }
    }

    /// Recursively parse the expression. Stops at the first token that
    /// cannot continue it, e.g. `%>` or a comma, leaving it unconsumed.
    pub fn parse(iter: &mut TokenIter) -> Result<Self, Error> {
        Self::parse_binary(iter, 0)
    }

    fn parse_binary(iter: &mut TokenIter, min_precedence: u8) -> Result<Self, Error> {
        let mut left = Self::parse_primary(iter)?;

        loop {
            let op = match iter.peek().map(|t| t.token()).as_ref().and_then(Op::from_token) {
                Some(op) if op.precedence() >= min_precedence && op != Op::Not => op,
                _ => break,
            };

            let _ = iter.next();
            let right = Self::parse_binary(iter, op.precedence() + 1)?;

            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_primary(iter: &mut TokenIter) -> Result<Self, Error> {
        let next = iter.next().ok_or(Error::Eof("expression"))?;

        let expr = match next.token() {
            Token::Not => Expression::Unary {
                op: Op::Not,
                operand: Box::new(Self::parse_primary(iter)?),
            },

            Token::Minus => Expression::Unary {
                op: Op::Sub,
                operand: Box::new(Self::parse_primary(iter)?),
            },

            Token::Plus => Self::parse_primary(iter)?,

            Token::RoundBracketStart => {
                let inner = Self::parse_binary(iter, 0)?;
                Self::expect(iter, Token::RoundBracketEnd)?;
                inner
            }

            Token::Identifier(name) => {
                if Self::next_is(iter, &Token::RoundBracketStart) {
                    let _ = iter.next();
                    Expression::Call {
                        receiver: None,
                        name,
                        args: Self::parse_args(iter)?,
                    }
                } else {
                    Self::variable(name)
                }
            }

            Token::InstanceVariable(name) => Expression::Term(Term::InstanceVariable(name)),

            Token::Value(value) => Self::constant(value),

            token => {
                return Err(Error::Syntax {
                    line: next.line(),
                    message: format!("unexpected token {:?} in expression", token),
                })
            }
        };

        Self::parse_accessors(expr, iter)
    }

    // Chained `.method` and `.method(args)` calls.
    fn parse_accessors(mut expr: Self, iter: &mut TokenIter) -> Result<Self, Error> {
        while Self::next_is(iter, &Token::Dot) {
            let _ = iter.next();
            let next = iter.next().ok_or(Error::Eof("method name"))?;

            let name = match next.token() {
                Token::Identifier(name) => name,
                Token::Value(Value::Integer(index)) => index.to_string(),
                token => {
                    return Err(Error::Syntax {
                        line: next.line(),
                        message: format!("expected method name, found {:?}", token),
                    })
                }
            };

            let args = if Self::next_is(iter, &Token::RoundBracketStart) {
                let _ = iter.next();
                Self::parse_args(iter)?
            } else {
                vec![]
            };

            expr = Expression::Call {
                receiver: Some(Box::new(expr)),
                name,
                args,
            };
        }

        Ok(expr)
    }

    fn parse_args(iter: &mut TokenIter) -> Result<Vec<Expression>, Error> {
        let mut args = vec![];

        if Self::next_is(iter, &Token::RoundBracketEnd) {
            let _ = iter.next();
            return Ok(args);
        }

        loop {
            args.push(Self::parse_binary(iter, 0)?);

            let next = iter.next().ok_or(Error::Eof("function arguments"))?;
            match next.token() {
                Token::RoundBracketEnd => break,
                Token::Comma => continue,
                token => {
                    return Err(Error::Syntax {
                        line: next.line(),
                        message: format!("expected ',' or ')', found {:?}", token),
                    })
                }
            }
        }

        Ok(args)
    }

    fn next_is(iter: &mut TokenIter, token: &Token) -> bool {
        iter.peek().map(|t| t.token()).as_ref() == Some(token)
    }

    fn expect(iter: &mut TokenIter, expected: Token) -> Result<TokenWithContext, Error> {
        let next = iter.next().ok_or(Error::Eof("expression"))?;
        if next.token() == expected {
            Ok(next)
        } else {
            Err(Error::Syntax {
                line: next.line(),
                message: format!("expected {:?}, found {:?}", expected, next.token()),
            })
        }
    }
}
