//! End-to-end rendering through the public macros. The templates here
//! live in comments below their render calls, extracted from this very
//! file at runtime.
use lectern::prelude::*;
use lectern::view::template::handlers::{self, ErbHandler, TemplateHandler};
use lectern::view::template::language::{html_escape, Program};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct UserPresenter {
    state: RenderState,
    name: String,
    email: String,
}

impl Presenter for UserPresenter {
    fn render_state(&self) -> &RenderState {
        &self.state
    }

    fn call_helper(&self, name: &str, args: &[Value]) -> Result<Value, Error> {
        match name {
            "name" => Ok(self.name.as_str().into()),
            "email" => Ok(self.email.as_str().into()),
            "link" => self.link(),
            "bold" => {
                let text = args.first().cloned().unwrap_or(Value::Null);
                Ok(Value::safe(format!(
                    "<b>{}</b>",
                    html_escape(&text.to_string())
                )))
            }
            _ => Err(Error::UnknownMethod(name.to_string())),
        }
    }

    fn instance_variable(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }
}

impl UserPresenter {
    fn joe() -> Self {
        Self {
            name: "Joe".into(),
            email: "joe@example.com".into(),
            ..Default::default()
        }
    }

    // A helper that renders its own inline template mid-render.
    fn link(&self) -> Result<Value, Error> {
        let output = erb!(self)?;
        // <a href="mailto:<%= email %>"><%= name %></a>
        Ok(Value::safe(output))
    }
}

#[test]
fn test_simple_template() {
    let host = PlainPresenter::default();
    let output = erb!(&host).unwrap();
    // Here's some math: <%= 2 + 2 %>
    assert_eq!(output, "Here's some math: 4");
}

#[test]
fn test_captured_locals_and_explicit_map_are_equivalent() {
    let host = PlainPresenter::default();
    let local = "Local";

    let captured = erb!(&host, locals!(local)).unwrap();
    // Here's a <%= local %> variable

    let mapped = erb!(&host, [("local", "Local")]).unwrap();
    // Here's a <%= local %> variable

    assert_eq!(captured, "Here's a Local variable");
    assert_eq!(captured, mapped);
}

#[test]
fn test_locals_with_explicit_values() {
    let host = PlainPresenter::default();
    let output = erb!(&host, locals!(count: 3, label: "items")).unwrap();
    // <%= count %> <%= label %>
    assert_eq!(output, "3 items");
}

#[test]
fn test_instance_variables() {
    let host = UserPresenter::joe();
    let output = erb!(&host).unwrap();
    // Hello <%= @name %>! Missing: <%= @nope %>.
    assert_eq!(output, "Hello Joe! Missing: .");
}

#[test]
fn test_helper_calls_and_nested_render() {
    let host = UserPresenter::joe();
    let output = erb!(&host).unwrap();
    // Contact: <%= link %>
    assert_eq!(
        output,
        "Contact: <a href=\"mailto:joe@example.com\">Joe</a>".to_string()
    );
}

#[test]
fn test_helper_with_arguments() {
    let host = UserPresenter::joe();
    let output = erb!(&host).unwrap();
    // <%= bold(name) %>
    assert_eq!(output, "<b>Joe</b>");
}

#[test]
fn test_control_flow() {
    let host = PlainPresenter::default();
    let items = vec!["a", "b"];

    let output = erb!(&host, locals!(items)).unwrap();
    // <% for item in items %><%= item %>,<% end %>
    assert_eq!(output, "a,b,");

    let output = erb!(&host, locals!(count: 5)).unwrap();
    // <% if count > 1 %>many<% else %>one<% end %>
    assert_eq!(output, "many");
}

#[test]
fn test_fix_indentation() {
    let host = PlainPresenter::default();
    let output = erb!(&host).unwrap();
    //   <div>
    //     <p>x</p>
    //   </div>
    assert_eq!(output, "<div>\n  <p>x</p>\n</div>");
}

#[test]
fn test_error_cause_preserved() {
    let host = PlainPresenter::default();
    let err = erb!(&host).unwrap_err();
    // <% raise("UH OH") %>

    match &err {
        Error::Render { .. } => {}
        other => panic!("expected render error, got {:?}", other),
    }

    let cause = std::error::Error::source(&err).unwrap();
    assert_eq!(cause.to_string(), "UH OH");
}

#[test]
fn test_arithmetic_failures_surface_as_render_errors() {
    let host = PlainPresenter::default();

    let err = erb!(&host, source: "<%= 1 / 0 %>").unwrap_err();
    match &err {
        Error::Render { .. } => {}
        other => panic!("expected render error, got {:?}", other),
    }
    let cause = std::error::Error::source(&err).unwrap();
    assert_eq!(cause.to_string(), "division by zero");

    let err = erb!(&host, source: r#"<%= "ab" * (0 - 1) %>"#).unwrap_err();
    assert!(matches!(err, Error::Render { .. }));
}

#[test]
fn test_undefined_variable_surfaces() {
    let host = PlainPresenter::default();
    let err = erb!(&host).unwrap_err();
    // <%= missing %>
    let cause = std::error::Error::source(&err).unwrap();
    assert!(cause.to_string().contains("missing"));
}

#[test]
fn test_erb_escaping() {
    let host = PlainPresenter::default();
    let xss = "<script>alert(1)</script>";

    let escaped = erb!(&host, locals!(xss)).unwrap();
    // <%= xss %>
    assert_eq!(escaped, "&lt;script&gt;alert(1)&lt;/script&gt;");

    let raw = erb!(&host, locals!(xss)).unwrap();
    // <%- xss %>
    assert_eq!(raw, xss);

    let marked_safe = erb!(&host, locals!(safe: Value::safe(xss))).unwrap();
    // <%= safe %>
    assert_eq!(marked_safe, xss);
}

#[test]
fn test_haml_escaping() {
    let host = PlainPresenter::default();
    let xss = "<script>alert(1)</script>";

    let escaped = haml!(&host, locals!(xss)).unwrap();
    // %p= xss
    assert_eq!(escaped, "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>");

    let raw = haml!(&host, locals!(xss)).unwrap();
    // %p!= xss
    assert_eq!(raw, format!("<p>{}</p>", xss));
}

#[test]
fn test_slim_escaping() {
    let host = PlainPresenter::default();
    let xss = "<script>alert(1)</script>";

    let escaped = slim!(&host, locals!(xss)).unwrap();
    // p= xss
    assert_eq!(escaped, "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>");

    let raw = slim!(&host, locals!(xss)).unwrap();
    // p== xss
    assert_eq!(raw, format!("<p>{}</p>", xss));
}

#[test]
fn test_literal_source_convention() {
    let host = PlainPresenter::default();
    let name = "Alice";

    let output = erb!(&host, locals!(name), source: "Hi, <%= name %>!").unwrap();
    assert_eq!(output, "Hi, Alice!");
}

static COMPILES: AtomicUsize = AtomicUsize::new(0);

struct CountingErb;

impl TemplateHandler for CountingErb {
    fn compile(&self, source: &str, identity: &str) -> Result<Program, Error> {
        COMPILES.fetch_add(1, Ordering::SeqCst);
        ErbHandler.compile(source, identity)
    }
}

#[test]
fn test_template_compiled_once() {
    handlers::register("counting", Arc::new(CountingErb));

    let host = PlainPresenter::default();

    for _ in 0..3 {
        let output =
            render_format!("counting", &host, Context::new(), source: "<%= 1 + 2 %>").unwrap();
        assert_eq!(output, "3");
    }

    assert_eq!(COMPILES.load(Ordering::SeqCst), 1);
}
