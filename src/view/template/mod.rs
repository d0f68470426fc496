//! Template engine.
//!
//! Templates are compiled into executable [`Program`]s by a
//! format-specific handler, then evaluated against a [`Context`] of
//! locals and a host [`Presenter`](crate::presenter::Presenter).
//!
//! Compiled programs are kept in a process-wide registry keyed by
//! host presenter type and template identity, so a template embedded
//! in a helper method is compiled once per presenter type, no matter
//! how many times the helper runs.
pub mod context;
pub mod error;
pub mod handlers;
pub mod language;
pub mod value;

pub use context::{Context, IntoContext, LocalScope};
pub use error::Error;
pub use handlers::TemplateHandler;
pub use language::Program;
pub use value::{ToValue, Value};

use crate::presenter::{Presenter, StateGuard};

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

static NEXT_TEMPLATE_ID: AtomicU64 = AtomicU64::new(0);

/// Compiled programs, keyed by host presenter type and template id.
/// Entries are never evicted; templates come from source code, so the
/// set is bounded by the program text.
static COMPILED: Lazy<Mutex<HashMap<(TypeId, u64), Arc<Program>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// A template extracted from source code, not yet compiled for any
/// particular presenter type.
pub struct InlineTemplate {
    id: u64,
    format: String,
    source: String,
    identity: String,
}

impl InlineTemplate {
    /// `identity` is the `file:line` of the render call that produced
    /// this template, used in diagnostics and error paths.
    pub fn new(format: &str, source: &str, identity: &str) -> Self {
        Self {
            id: NEXT_TEMPLATE_ID.fetch_add(1, Ordering::Relaxed),
            format: format.to_string(),
            source: source.to_string(),
            identity: identity.to_string(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Compile this template for the given presenter type, or fetch
    /// the program compiled earlier. The registry lock is held across
    /// compilation, so concurrent renders compile at most once.
    pub fn program<P: Presenter>(&self) -> Result<Arc<Program>, Error> {
        self.program_for(TypeId::of::<P>())
    }

    fn program_for(&self, host: TypeId) -> Result<Arc<Program>, Error> {
        let key = (host, self.id);
        let mut compiled = COMPILED.lock();

        if let Some(program) = compiled.get(&key) {
            return Ok(program.clone());
        }

        let handler = handlers::handler_for(&self.format)?;
        let program = handler
            .compile(&self.source, &self.identity)
            .map_err(|err| Error::Compile {
                path: self.identity.clone(),
                source: Box::new(err),
            })?;

        tracing::debug!("compiled {} template at {}", self.format, self.identity);

        let program = Arc::new(program);
        compiled.insert(key, program.clone());

        Ok(program)
    }

    /// Render against the host, with `context` supplying the locals.
    /// The host's output buffer is saved and restored around the
    /// render, so templates can render other templates from helpers.
    pub fn render<P: Presenter>(&self, context: &Context, host: &P) -> Result<String, Error> {
        let program = self.program::<P>()?;
        let guard = StateGuard::install(host.render_state(), &self.identity);

        match program.evaluate(context, host) {
            Ok(()) => Ok(guard.take_output()),
            Err(err) => Err(Error::Render {
                path: self.identity.clone(),
                source: Box::new(err),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::presenter::PlainPresenter;

    use std::sync::atomic::AtomicUsize;

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    impl TemplateHandler for CountingHandler {
        fn compile(&self, source: &str, identity: &str) -> Result<Program, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            handlers::ErbHandler.compile(source, identity)
        }
    }

    #[test]
    fn test_render() -> Result<(), Error> {
        let template = InlineTemplate::new("erb", "<%= 2 + 2 %>", "test.rs:1");
        let mut context = Context::default();
        context.set("unused", 1)?;

        let host = PlainPresenter::default();
        assert_eq!(template.render(&context, &host)?, "4");

        Ok(())
    }

    #[test]
    fn test_compile_once_per_presenter_type() -> Result<(), Error> {
        let calls = Arc::new(AtomicUsize::new(0));
        handlers::register(
            "counting-erb",
            Arc::new(CountingHandler {
                calls: calls.clone(),
            }),
        );

        let template = InlineTemplate::new("counting-erb", "<%= 1 + 1 %>", "test.rs:2");
        let host = PlainPresenter::default();

        for _ in 0..5 {
            assert_eq!(template.render(&Context::default(), &host)?, "2");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn test_compile_once_across_threads() -> Result<(), Error> {
        let calls = Arc::new(AtomicUsize::new(0));
        handlers::register(
            "counting-erb-threads",
            Arc::new(CountingHandler {
                calls: calls.clone(),
            }),
        );

        let template = Arc::new(InlineTemplate::new(
            "counting-erb-threads",
            "<%= 3 * 3 %>",
            "test.rs:3",
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let template = template.clone();
                std::thread::spawn(move || {
                    let host = PlainPresenter::default();
                    template.render(&Context::default(), &host).unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "9");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn test_compile_error_wrapped() {
        let template = InlineTemplate::new("erb", "<%= if %>", "bad.rs:10");
        let host = PlainPresenter::default();
        let err = template.render(&Context::default(), &host).unwrap_err();

        match err {
            Error::Compile { ref path, .. } => assert_eq!(path, "bad.rs:10"),
            other => panic!("expected compile error, got {:?}", other),
        }

        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unknown_format() {
        let template = InlineTemplate::new("jinja", "{{ x }}", "test.rs:4");
        let host = PlainPresenter::default();
        let err = template.render(&Context::default(), &host).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(_)));
    }
}
