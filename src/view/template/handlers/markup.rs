//! Concise markup dialects, haml-like and slim-like.
//!
//! These are deliberately small dialects: nested tags driven by
//! indentation, class/id shorthand, escaped (`=`) and raw (`!=` / `==`)
//! prints, and plain text lines. Control flow belongs in ERB templates;
//! code lines (`-`) are rejected.
use super::super::{
    language::{Expression, Lexer, Program, Statement},
    Error,
};
use super::TemplateHandler;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Dialect {
    Haml,
    Slim,
}

pub struct MarkupHandler {
    dialect: Dialect,
}

impl MarkupHandler {
    pub fn haml() -> Self {
        Self {
            dialect: Dialect::Haml,
        }
    }

    pub fn slim() -> Self {
        Self {
            dialect: Dialect::Slim,
        }
    }

    fn line(
        &self,
        line: &str,
        number: usize,
        indent: usize,
        statements: &mut Vec<Statement>,
        stack: &mut Vec<(usize, String)>,
    ) -> Result<(), Error> {
        match self.dialect {
            Dialect::Haml => {
                if let Some(code) = line.strip_prefix("!=") {
                    statements.push(print(code, true, number)?);
                } else if let Some(code) = line.strip_prefix('=') {
                    statements.push(print(code, false, number)?);
                } else if line.starts_with('-') {
                    return Err(code_lines_unsupported(number));
                } else if line.starts_with('%') || line.starts_with('.') || line.starts_with('#') {
                    self.tag(
                        line.strip_prefix('%').unwrap_or(line),
                        number,
                        indent,
                        statements,
                        stack,
                    )?;
                } else {
                    statements.push(Statement::Text(format!("{}\n", line)));
                }
            }

            Dialect::Slim => {
                if let Some(code) = line.strip_prefix("==") {
                    statements.push(print(code, true, number)?);
                } else if let Some(code) = line.strip_prefix('=') {
                    statements.push(print(code, false, number)?);
                } else if let Some(text) = line.strip_prefix('|') {
                    let text = text.strip_prefix(' ').unwrap_or(text);
                    statements.push(Statement::Text(format!("{}\n", text)));
                } else if let Some(text) = line.strip_prefix('\'') {
                    // Verbatim text with a trailing space.
                    let text = text.strip_prefix(' ').unwrap_or(text);
                    statements.push(Statement::Text(format!("{} ", text)));
                } else if line.starts_with('-') {
                    return Err(code_lines_unsupported(number));
                } else if line.starts_with('.')
                    || line.starts_with('#')
                    || line.starts_with(|c: char| c.is_alphabetic())
                {
                    self.tag(line, number, indent, statements, stack)?;
                } else {
                    return Err(Error::Syntax {
                        line: number,
                        message: format!("unexpected line \"{}\"", line),
                    });
                }
            }
        }

        Ok(())
    }

    // `tag.class#id rest`, with a bare `.class` shorthand for div.
    fn tag(
        &self,
        line: &str,
        number: usize,
        indent: usize,
        statements: &mut Vec<Statement>,
        stack: &mut Vec<(usize, String)>,
    ) -> Result<(), Error> {
        let name_end = line
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(line.len());
        let (name, mut rest) = line.split_at(name_end);
        let name = if name.is_empty() { "div" } else { name };

        let mut classes: Vec<&str> = vec![];
        let mut id = None;

        while rest.starts_with('.') || rest.starts_with('#') {
            let marker = rest.chars().next().unwrap();
            let remainder = &rest[1..];

            let end = remainder
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(remainder.len());

            if end == 0 {
                return Err(Error::Syntax {
                    line: number,
                    message: "expected class or id name".into(),
                });
            }

            if marker == '.' {
                classes.push(&remainder[..end]);
            } else {
                id = Some(&remainder[..end]);
            }

            rest = &remainder[end..];
        }

        let mut open = format!("<{}", name);
        if let Some(id) = id {
            open.push_str(&format!(" id=\"{}\"", id));
        }
        if !classes.is_empty() {
            open.push_str(&format!(" class=\"{}\"", classes.join(" ")));
        }
        open.push('>');

        statements.push(Statement::Text(open));
        stack.push((indent, format!("</{}>", name)));

        let rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(());
        }

        // Same raw marker as standalone lines: `!=` in haml, `==` in slim.
        let raw_marker = match self.dialect {
            Dialect::Haml => "!=",
            Dialect::Slim => "==",
        };

        let child = if let Some(code) = rest.strip_prefix(raw_marker) {
            print(code, true, number)?
        } else if let Some(code) = rest.strip_prefix('=') {
            print(code, false, number)?
        } else {
            Statement::Text(rest.to_string())
        };

        statements.push(child);
        Ok(())
    }
}

impl TemplateHandler for MarkupHandler {
    fn compile(&self, source: &str, identity: &str) -> Result<Program, Error> {
        tracing::trace!("compiling {:?} template at {}", self.dialect, identity);

        let mut statements = vec![];
        let mut stack: Vec<(usize, String)> = vec![];

        for (index, raw) in source.lines().enumerate() {
            if raw.trim().is_empty() {
                continue;
            }

            let indent = raw.len() - raw.trim_start().len();

            while matches!(stack.last(), Some((open, _)) if *open >= indent) {
                let (_, close) = stack.pop().unwrap();
                statements.push(Statement::Text(close));
            }

            self.line(
                raw.trim(),
                index + 1,
                indent,
                &mut statements,
                &mut stack,
            )?;
        }

        while let Some((_, close)) = stack.pop() {
            statements.push(Statement::Text(close));
        }

        Ok(Program::new(statements))
    }
}

fn print(code: &str, raw: bool, number: usize) -> Result<Statement, Error> {
    let tokens = Lexer::code(code)?;
    let mut iter = tokens.into_iter().peekable();
    let expression = Expression::parse(&mut iter)?;

    if iter.peek().is_some() {
        return Err(Error::Syntax {
            line: number,
            message: "unexpected tokens after expression".into(),
        });
    }

    Ok(Statement::Print { expression, raw })
}

fn code_lines_unsupported(number: usize) -> Error {
    Error::Syntax {
        line: number,
        message: "code lines are not supported; use an erb template for control flow".into(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::presenter::{PlainPresenter, Presenter, StateGuard};
    use crate::view::template::Context;

    fn render(handler: &MarkupHandler, source: &str, context: &Context) -> Result<String, Error> {
        let program = handler.compile(source, "test:1")?;
        let host = PlainPresenter::default();
        let guard = StateGuard::install(host.render_state(), "test:1");
        program.evaluate(context, &host)?;
        Ok(guard.take_output())
    }

    #[test]
    fn test_haml_tags() -> Result<(), Error> {
        let mut context = Context::default();
        context.set("name", "Joe")?;

        let output = render(
            &MarkupHandler::haml(),
            "%div.profile\n  %h1= name\n  %p Welcome back",
            &context,
        )?;

        assert_eq!(
            output,
            "<div class=\"profile\"><h1>Joe</h1><p>Welcome back</p></div>"
        );

        Ok(())
    }

    #[test]
    fn test_haml_div_shorthand_and_dedent() -> Result<(), Error> {
        let mut context = Context::default();
        context.set("x", "a")?;

        let output = render(
            &MarkupHandler::haml(),
            ".outer\n  %p= x.upcase\n.second",
            &context,
        )?;

        assert_eq!(
            output,
            "<div class=\"outer\"><p>A</p></div><div class=\"second\"></div>"
        );

        Ok(())
    }

    #[test]
    fn test_slim_tags() -> Result<(), Error> {
        let mut context = Context::default();
        context.set("count", 3)?;

        let output = render(
            &MarkupHandler::slim(),
            "div.card#main\n  | Hello\n  ' again\n  p= count * 2",
            &context,
        )?;

        assert_eq!(
            output,
            "<div id=\"main\" class=\"card\">Hello\nagain <p>6</p></div>"
        );

        Ok(())
    }

    #[test]
    fn test_escaping() -> Result<(), Error> {
        let unescaped = "<script>alert(1)</script>";
        let escaped = "&lt;script&gt;alert(1)&lt;/script&gt;";

        for handler in [MarkupHandler::haml(), MarkupHandler::slim()] {
            let output = render(
                &handler,
                "= \"<script>alert(1)</script>\"",
                &Context::default(),
            )?;
            assert_eq!(output, escaped);

            let output = render(
                &handler,
                "= \"<script>alert(1)</script>\".html_safe",
                &Context::default(),
            )?;
            assert_eq!(output, unescaped);
        }

        // Dialect-specific raw markers.
        let output = render(
            &MarkupHandler::haml(),
            "!= \"<b>x</b>\"",
            &Context::default(),
        )?;
        assert_eq!(output, "<b>x</b>");

        let output = render(
            &MarkupHandler::slim(),
            "== \"<b>x</b>\"",
            &Context::default(),
        )?;
        assert_eq!(output, "<b>x</b>");

        Ok(())
    }

    #[test]
    fn test_tag_content_raw_markers_are_dialect_specific() -> Result<(), Error> {
        let mut context = Context::default();
        context.set("snippet", "<b>x</b>")?;

        let output = render(&MarkupHandler::haml(), "%p!= snippet", &context)?;
        assert_eq!(output, "<p><b>x</b></p>");

        let output = render(&MarkupHandler::slim(), "p== snippet", &context)?;
        assert_eq!(output, "<p><b>x</b></p>");

        // The other dialect's marker doesn't print raw: slim treats
        // `!=` as plain content, haml rejects `==` as an expression.
        let output = render(&MarkupHandler::slim(), "p!= snippet", &context)?;
        assert_eq!(output, "<p>!= snippet</p>");

        assert!(render(&MarkupHandler::haml(), "%p== snippet", &context).is_err());

        Ok(())
    }

    #[test]
    fn test_code_lines_rejected() {
        let err = MarkupHandler::haml()
            .compile("- items.each", "test:1")
            .unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }
}
