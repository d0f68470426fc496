//! Crate-wide error type. Most callers only ever see
//! [`view::template::Error`](crate::view::template::Error) from the
//! render macros; this wrapper exists for applications that mix
//! rendering with config loading and their own I/O.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Template(#[from] crate::view::template::Error),

    #[error("{0}")]
    Config(#[from] crate::config::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
