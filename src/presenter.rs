//! Presenters are the hosts that templates render against.
//!
//! A presenter owns some domain objects and exposes formatting logic
//! through helper methods. Templates reach back into the presenter for
//! helper calls (`<%= formatted_name %>`) and instance variables
//! (`<%= @user %>`), and write their output into the presenter's
//! render state.
//!
//! ```
//! use lectern::presenter::{Presenter, RenderState};
//! use lectern::view::template::{Error, Value};
//!
//! struct UserPresenter {
//!     state: RenderState,
//!     name: String,
//! }
//!
//! impl Presenter for UserPresenter {
//!     fn render_state(&self) -> &RenderState {
//!         &self.state
//!     }
//!
//!     fn call_helper(&self, name: &str, args: &[Value]) -> Result<Value, Error> {
//!         match name {
//!             "shout" => Ok(self.name.to_uppercase().into()),
//!             _ => Err(Error::UnknownMethod(name.to_string())),
//!         }
//!     }
//! }
//! ```
use std::cell::RefCell;

use crate::view::template::{Error, Value};

/// Per-presenter render bookkeeping. Holds the output buffer the
/// currently running template writes into, and the identity of that
/// template for error reporting.
///
/// Interior mutability lets templates write output through a shared
/// reference; a presenter is only ever rendered from one thread at a
/// time.
#[derive(Default)]
pub struct RenderState {
    inner: RefCell<StateInner>,
}

#[derive(Default)]
struct StateInner {
    output_buffer: String,
    current_template: Option<String>,
}

impl RenderState {
    pub fn write(&self, text: &str) {
        self.inner.borrow_mut().output_buffer.push_str(text);
    }

    /// Identity of the template currently rendering, if any.
    pub fn current_template(&self) -> Option<String> {
        self.inner.borrow().current_template.clone()
    }
}

/// Swaps in a fresh output buffer for the duration of one template
/// render and restores the previous one afterwards. Nested renders,
/// e.g. a helper that renders another template, each get their own
/// buffer without clobbering the caller's partial output.
pub struct StateGuard<'a> {
    state: &'a RenderState,
    saved_buffer: String,
    saved_template: Option<String>,
    taken: bool,
}

impl<'a> StateGuard<'a> {
    pub fn install(state: &'a RenderState, identity: &str) -> Self {
        let mut inner = state.inner.borrow_mut();
        let saved_buffer = std::mem::take(&mut inner.output_buffer);
        let saved_template = inner.current_template.replace(identity.to_string());

        Self {
            state,
            saved_buffer,
            saved_template,
            taken: false,
        }
    }

    /// Finish the render: take the produced output and restore the
    /// caller's buffer.
    pub fn take_output(mut self) -> String {
        let mut inner = self.state.inner.borrow_mut();
        let output =
            std::mem::replace(&mut inner.output_buffer, std::mem::take(&mut self.saved_buffer));
        inner.current_template = self.saved_template.take();
        drop(inner);

        self.taken = true;
        output
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        // Render failed before take_output; restore the caller's state
        // and discard the partial output.
        if !self.taken {
            let mut inner = self.state.inner.borrow_mut();
            inner.output_buffer = std::mem::take(&mut self.saved_buffer);
            inner.current_template = self.saved_template.take();
        }
    }
}

/// The host object templates render against.
///
/// `'static` because compiled template programs are cached per concrete
/// presenter type.
pub trait Presenter: 'static {
    fn render_state(&self) -> &RenderState;

    /// Called for identifiers the template's locals don't define, and
    /// for explicit method calls without a receiver.
    fn call_helper(&self, name: &str, args: &[Value]) -> Result<Value, Error> {
        let _ = args;
        Err(Error::UnknownMethod(name.to_string()))
    }

    /// Resolves `@name` references.
    fn instance_variable(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    fn write_output(&self, text: &str) {
        self.render_state().write(text);
    }
}

/// A presenter with no helpers and no instance variables. Useful when a
/// template only needs its locals.
#[derive(Default)]
pub struct PlainPresenter {
    state: RenderState,
}

impl Presenter for PlainPresenter {
    fn render_state(&self) -> &RenderState {
        &self.state
    }
}
