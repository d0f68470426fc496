//! Inline template rendering.
//!
//! The template lives in the presenter source, in the comment lines
//! directly below the render call:
//!
//! ```text
//! fn greeting(host: &Greeter, name: &str) -> Result<String, Error> {
//!     erb!(host, locals!(name))
//!     // Hello, <%= name %>!
//! }
//! ```
//!
//! Templates can also be passed as literal text with the `source:`
//! calling convention, useful when the rendered text is built at
//! runtime or the binary ships without sources:
//!
//! ```
//! use lectern::prelude::*;
//!
//! #[derive(Default)]
//! struct Greeter {
//!     state: RenderState,
//! }
//!
//! impl Presenter for Greeter {
//!     fn render_state(&self) -> &RenderState {
//!         &self.state
//!     }
//! }
//!
//! let host = Greeter::default();
//!
//! let name = "Alice";
//! let output = erb!(&host, locals!(name), source: "Hello, <%= name %>!").unwrap();
//! assert_eq!(output, "Hello, Alice!");
//! ```
use crate::presenter::Presenter;

use super::cache::{self, CallSite, TemplateText};
use super::template::{Error, IntoContext};

/// Render the inline template at `site` against `host`, with `context`
/// supplying the template's locals.
///
/// The sole entry point; the [`erb!`](crate::erb), [`haml!`](crate::haml)
/// and [`slim!`](crate::slim) macros are sugar over it with the format
/// fixed and the call site captured for you.
///
/// Errors from template evaluation propagate wrapped in
/// [`Error::Render`] with the failure preserved as the wrapper's
/// [`source()`](std::error::Error::source).
pub fn render_inline<P: Presenter>(
    host: &P,
    context: impl IntoContext,
    site: &CallSite,
    format: &str,
    text: TemplateText<'_>,
) -> Result<String, Error> {
    let context = context.into_context()?;
    let template = cache::fetch(site, format, &context, text)?;
    template.render(&context, host)
}

/// Capture the current source location as a [`CallSite`].
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::view::cache::CallSite::new(file!(), line!())
    };
}

/// Snapshot local variables into a template [`Context`](crate::view::template::Context).
///
/// `locals!(name, count)` captures the variables by name;
/// `locals!(name: user.name(), count: 5)` sets explicit values.
/// Evaluates to `Result<Context, Error>`, which the render macros
/// accept directly.
#[macro_export]
macro_rules! locals {
    ($($name:ident : $value:expr),+ $(,)?) => {{
        (|| -> Result<$crate::view::template::Context, $crate::view::template::Error> {
            let mut context = $crate::view::template::Context::new();
            $(context.set(stringify!($name), $value)?;)+
            Ok(context)
        })()
    }};

    ($($name:ident),* $(,)?) => {{
        (|| -> Result<$crate::view::template::Context, $crate::view::template::Error> {
            #[allow(unused_mut)]
            let mut context = $crate::view::template::Context::new();
            $(context.set(stringify!($name), &$name)?;)*
            Ok(context)
        })()
    }};
}

/// Render an inline template in any registered format. The per-format
/// macros delegate here; use it directly for formats registered with
/// [`handlers::register`](crate::view::template::handlers::register).
#[macro_export]
macro_rules! render_format {
    ($format:expr, $host:expr, $context:expr, source: $text:expr) => {
        $crate::view::inline::render_inline(
            $host,
            $context,
            &$crate::call_site!(),
            $format,
            $crate::view::cache::TemplateText::Literal($text),
        )
    };

    ($format:expr, $host:expr, $context:expr) => {
        $crate::view::inline::render_inline(
            $host,
            $context,
            &$crate::call_site!(),
            $format,
            $crate::view::cache::TemplateText::FromComments,
        )
    };
}

/// Render the ERB template in the comments below the call, or passed
/// with `source:`.
#[macro_export]
macro_rules! erb {
    ($host:expr, source: $text:expr) => {
        $crate::render_format!("erb", $host, $crate::view::template::Context::new(), source: $text)
    };

    ($host:expr, $context:expr, source: $text:expr) => {
        $crate::render_format!("erb", $host, $context, source: $text)
    };

    ($host:expr) => {
        $crate::render_format!("erb", $host, $crate::view::template::Context::new())
    };

    ($host:expr, $context:expr) => {
        $crate::render_format!("erb", $host, $context)
    };
}

/// Render the haml template in the comments below the call, or passed
/// with `source:`.
#[macro_export]
macro_rules! haml {
    ($host:expr, source: $text:expr) => {
        $crate::render_format!("haml", $host, $crate::view::template::Context::new(), source: $text)
    };

    ($host:expr, $context:expr, source: $text:expr) => {
        $crate::render_format!("haml", $host, $context, source: $text)
    };

    ($host:expr) => {
        $crate::render_format!("haml", $host, $crate::view::template::Context::new())
    };

    ($host:expr, $context:expr) => {
        $crate::render_format!("haml", $host, $context)
    };
}

/// Render the slim template in the comments below the call, or passed
/// with `source:`.
#[macro_export]
macro_rules! slim {
    ($host:expr, source: $text:expr) => {
        $crate::render_format!("slim", $host, $crate::view::template::Context::new(), source: $text)
    };

    ($host:expr, $context:expr, source: $text:expr) => {
        $crate::render_format!("slim", $host, $context, source: $text)
    };

    ($host:expr) => {
        $crate::render_format!("slim", $host, $crate::view::template::Context::new())
    };

    ($host:expr, $context:expr) => {
        $crate::render_format!("slim", $host, $context)
    };
}
