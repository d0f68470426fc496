//! Executable template.
//!
//! A program is a list of statements produced by a syntax handler.
//! Evaluation writes rendered output into the host's render buffer.
use super::super::{Context, Error};
use super::lexer::TokenWithContext;
use super::statement::{Parsed, Statement};
use crate::presenter::Presenter;

#[derive(Debug, Clone)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    /// Build a program from pre-assembled statements. Used by the markup
    /// dialect handlers which translate lines directly.
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }

    /// Parse the program from a list of tokens.
    pub fn parse(tokens: Vec<TokenWithContext>) -> Result<Self, Error> {
        let mut iter = tokens.into_iter().peekable();
        let mut statements = vec![];

        while iter.peek().is_some() {
            match Statement::parse(&mut iter)? {
                Parsed::Statement(statement) => statements.push(statement),
                terminator => return Err(terminator.unexpected()),
            }
        }

        Ok(Program { statements })
    }

    /// Evaluate the program given the context. Output goes to the
    /// host's render buffer.
    pub fn evaluate(&self, context: &Context, host: &dyn Presenter) -> Result<(), Error> {
        for statement in &self.statements {
            statement.evaluate(context, host)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::super::lexer::Lexer;
    use super::*;
    use crate::presenter::{PlainPresenter, StateGuard};
    use crate::view::template::Value;

    fn render(source: &str, context: &Context) -> Result<String, Error> {
        let program = Program::parse(Lexer::template(source)?)?;
        let host = PlainPresenter::default();
        let guard = StateGuard::install(host.render_state(), "test");
        program.evaluate(context, &host)?;
        Ok(guard.take_output())
    }

    #[test]
    fn test_basic_program() -> Result<(), Error> {
        let output = render(
            "<html><body><% if 1 == 4 %>world is great<% else %>not so much<% end %></body></html>",
            &Context::default(),
        )?;
        assert_eq!(output, "<html><body>not so much</body></html>");
        Ok(())
    }

    #[test]
    fn test_elsif_chain() -> Result<(), Error> {
        let mut context = Context::default();
        context.set("n", 2)?;

        let output = render(
            "<% if n == 1 %>one<% elsif n == 2 %>two<% else %>many<% end %>",
            &context,
        )?;
        assert_eq!(output, "two");
        Ok(())
    }

    #[test]
    fn test_for_loop() -> Result<(), Error> {
        let mut context = Context::default();
        context.set("items", vec![1, 2, 3])?;

        let output = render("<% for i in items %><%= i * 2 %> <% end %>", &context)?;
        assert_eq!(output, "2 4 6 ");
        Ok(())
    }

    #[test]
    fn test_loop_variable_does_not_leak() -> Result<(), Error> {
        let mut context = Context::default();
        context.set("items", vec![1])?;
        context.set("i", "outer")?;

        let output = render("<% for i in items %><%= i %><% end %><%= i %>", &context)?;
        assert_eq!(output, "1outer");
        Ok(())
    }

    #[test]
    fn test_unbalanced_end() {
        let err = render("<% end %>", &Context::default()).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_print_escapes_by_default() -> Result<(), Error> {
        let mut context = Context::default();
        context.set("payload", "<script>alert(1)</script>")?;

        let escaped = render("<%= payload %>", &context)?;
        assert_eq!(escaped, "&lt;script&gt;alert(1)&lt;/script&gt;");

        let raw = render("<%- payload %>", &context)?;
        assert_eq!(raw, "<script>alert(1)</script>");

        let safe = render("<%= payload.html_safe %>", &context)?;
        assert_eq!(safe, "<script>alert(1)</script>");

        Ok(())
    }

    #[test]
    fn test_safe_value_in_context() -> Result<(), Error> {
        let mut context = Context::default();
        context.set("snippet", Value::safe("<b>bold</b>"))?;

        let output = render("<%= snippet %>", &context)?;
        assert_eq!(output, "<b>bold</b>");
        Ok(())
    }
}
