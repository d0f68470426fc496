//! Template error taxonomy.
//!
//! Nothing here is recovered internally: locate, compile and render
//! failures all propagate to the caller of `render_inline`. Compile and
//! render failures wrap the underlying diagnostic, preserving it as the
//! error's `source()` so callers can recover the root cause.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("reached end of template while parsing {0}, did you forget a closing tag?")]
    Eof(&'static str),

    #[error("variable \"{0}\" is not defined or in scope")]
    UndefinedVariable(String),

    #[error("method \"{0}\" is not defined")]
    UnknownMethod(String),

    #[error("no template handler registered for format \"{0}\"")]
    UnknownFormat(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Runtime(String),

    #[error("failed to compile inline template at {path}")]
    Compile {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("error rendering inline template at {path}")]
    Render {
        path: String,
        #[source]
        source: Box<Error>,
    },
}
