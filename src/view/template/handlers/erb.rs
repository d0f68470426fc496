//! The ERB-style syntax handler.
//!
//! Tags: `<%= %>` prints escaped, `<%- %>` prints raw, `<% %>` executes
//! a statement, `<%# %>` is a comment.
use super::super::{
    language::{Lexer, Program},
    Error,
};
use super::TemplateHandler;

pub struct ErbHandler;

impl TemplateHandler for ErbHandler {
    fn compile(&self, source: &str, identity: &str) -> Result<Program, Error> {
        tracing::trace!("compiling erb template at {}", identity);
        Program::parse(Lexer::template(source)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::presenter::{PlainPresenter, Presenter, StateGuard};
    use crate::view::template::Context;

    fn render(source: &str, context: &Context) -> Result<String, Error> {
        let program = ErbHandler.compile(source, "test:1")?;
        let host = PlainPresenter::default();
        let guard = StateGuard::install(host.render_state(), "test:1");
        program.evaluate(context, &host)?;
        Ok(guard.take_output())
    }

    #[test]
    fn test_simple_template() -> Result<(), Error> {
        let output = render("Here's some math: <%= 2 + 2 %>", &Context::default())?;
        assert_eq!(output, "Here's some math: 4");
        Ok(())
    }

    #[test]
    fn test_escaping() -> Result<(), Error> {
        let unescaped = "<script>alert(1)</script>";
        let escaped = "&lt;script&gt;alert(1)&lt;/script&gt;";

        let output = render(
            r#"<%= "<script>alert(1)</script>" %>"#,
            &Context::default(),
        )?;
        assert_eq!(output, escaped);

        let output = render(
            r#"<%= "<script>alert(1)</script>".html_safe %>"#,
            &Context::default(),
        )?;
        assert_eq!(output, unescaped);

        Ok(())
    }

    #[test]
    fn test_comment_is_dropped() -> Result<(), Error> {
        let output = render("a<%# not rendered %>b", &Context::default())?;
        assert_eq!(output, "ab");
        Ok(())
    }

    #[test]
    fn test_syntax_error() {
        let err = ErbHandler.compile("<% if %>", "test:1").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }
}
