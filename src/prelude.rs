//! Glob-import the types and macros used in everyday presenter code.
//!
//! ```rust
//! use lectern::prelude::*;
//! ```
pub use crate::config::Config;
pub use crate::logging::Logger;
pub use crate::presenter::{PlainPresenter, Presenter, RenderState, StateGuard};
pub use crate::view::cache::{CallSite, TemplateText};
pub use crate::view::inline::render_inline;
pub use crate::view::template::{Context, Error, ToValue, Value};

pub use crate::{call_site, erb, haml, locals, render_format, slim};
