//! Inline templates: extraction, caching, compilation and rendering.
//!
//! The pieces, in the order a render call touches them:
//!
//! - [`inline`] is the front-end: `render_inline` and the `erb!`,
//!   `haml!` and `slim!` macros.
//! - [`cache`] keeps extracted templates per call site and invalidates
//!   them when the source file's mtime changes.
//! - [`source`] pulls template text out of the comment lines below a
//!   render call.
//! - [`template`] is the engine: lexer, parser and evaluator, plus the
//!   pluggable syntax handlers.
pub mod cache;
pub mod inline;
pub mod source;
pub mod template;

pub use cache::{CallSite, TemplateText};
pub use inline::render_inline;
pub use template::{Context, Error, InlineTemplate, ToValue, Value};
