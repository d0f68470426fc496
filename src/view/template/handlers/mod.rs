//! Syntax handler lookup.
//!
//! A handler compiles template source in one syntax into an executable
//! [`Program`]. Three handlers ship with the crate: `erb`, `haml` and
//! `slim`. Additional syntaxes can be plugged in at runtime with
//! [`register`].
pub mod erb;
pub mod markup;

pub use erb::ErbHandler;
pub use markup::MarkupHandler;

use super::{language::Program, Error};

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// A pluggable compiler for one template syntax.
pub trait TemplateHandler: Send + Sync {
    /// Compile template source into an executable program. The identity
    /// label is the originating `file:line`, for diagnostics.
    fn compile(&self, source: &str, identity: &str) -> Result<Program, Error>;
}

static HANDLERS: Lazy<RwLock<HashMap<String, Arc<dyn TemplateHandler>>>> = Lazy::new(|| {
    let mut handlers: HashMap<String, Arc<dyn TemplateHandler>> = HashMap::new();
    handlers.insert("erb".into(), Arc::new(ErbHandler));
    handlers.insert("haml".into(), Arc::new(MarkupHandler::haml()));
    handlers.insert("slim".into(), Arc::new(MarkupHandler::slim()));
    RwLock::new(handlers)
});

/// Resolve a syntax handler from a format name.
pub fn handler_for(format: &str) -> Result<Arc<dyn TemplateHandler>, Error> {
    HANDLERS
        .read()
        .get(format)
        .cloned()
        .ok_or_else(|| Error::UnknownFormat(format.to_string()))
}

/// Register a handler for a format, replacing any existing one.
pub fn register(format: &str, handler: Arc<dyn TemplateHandler>) {
    HANDLERS.write().insert(format.to_string(), handler);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builtin_handlers() {
        assert!(handler_for("erb").is_ok());
        assert!(handler_for("haml").is_ok());
        assert!(handler_for("slim").is_ok());

        assert!(matches!(
            handler_for("jinja"),
            Err(Error::UnknownFormat(ref format)) if format == "jinja"
        ));
    }

    #[test]
    fn test_register() {
        struct Passthrough;

        impl TemplateHandler for Passthrough {
            fn compile(&self, source: &str, _identity: &str) -> Result<Program, Error> {
                use crate::view::template::language::Statement;
                Ok(Program::new(vec![Statement::Text(source.to_string())]))
            }
        }

        register("passthrough", Arc::new(Passthrough));
        assert!(handler_for("passthrough").is_ok());
    }
}
