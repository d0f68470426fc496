//! Lectern keeps view templates next to the code that renders them.
//!
//! A presenter method calls a render macro and writes the template in
//! the comment lines directly below; the template is extracted from
//! the source file, compiled once, cached, and invalidated
//! automatically when the file changes:
//!
//! ```text
//! fn profile(&self) -> Result<String, Error> {
//!     erb!(self, locals!(name: self.user.name()))
//!     // <h1><%= name %></h1>
//!     // <p>Member since <%= member_since %></p>
//! }
//! ```
//!
//! Three template syntaxes ship with the crate, `erb`, `haml` and
//! `slim`; more can be registered at runtime. Printed values are
//! HTML-escaped unless marked safe. Helper methods and instance
//! variables resolve against the presenter hosting the render.
//!
//! The full walkthrough lives in [`view::inline`]; the engine itself
//! in [`view::template`].

pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod presenter;
pub mod view;

pub use error::Error;
pub use logging::Logger;
