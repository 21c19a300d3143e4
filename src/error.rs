//! Crate error type
//!
//! Initialization errors are fatal and bubble up to `main`. Shader errors are
//! reported by the frame loop and never stop the run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("no compatible GPU adapter: {0}")]
    Adapter(String),
    #[error("failed to create GPU device: {0}")]
    Device(String),
    #[error("failed to create surface: {0}")]
    Surface(String),
    /// Surface texture could not be acquired for one frame
    #[error("failed to acquire frame: {0}")]
    Frame(wgpu::SurfaceError),
    #[error("shader {path:?} failed to compile:\n{message}")]
    Shader { path: PathBuf, message: String },
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors that stop the run instead of being logged per frame
    ///
    /// Only initialization failures and running out of memory qualify.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Window(_)
                | Error::Adapter(_)
                | Error::Device(_)
                | Error::Surface(_)
                | Error::Frame(wgpu::SurfaceError::OutOfMemory)
        )
    }
}
