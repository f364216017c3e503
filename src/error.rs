// src/error.rs
//! Error handling for the sandbox.
//!
//! Only start-up and resource paths can fail. Capacity exhaustion in the entity
//! registry is *not* an error: it is reported as `None` by the creation calls.

use thiserror::Error;

/// Main error type. Send + Sync + 'static.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O errors (config file reads, crash log).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON or does not match `SandboxConfig`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config values that deserialize fine but cannot be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Window creation failed.
    #[error("window error: {0}")]
    Window(#[from] winit::error::OsError),

    /// Event loop could not be created or exited with an error.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Surface creation failed.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// No GPU adapter compatible with the window surface.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// Device request failed.
    #[error("device error: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// Simple custom message.
    #[error("{0}")]
    Custom(String),

    /// Context chaining, like `.context()` in anyhow.
    #[error("{message}: {source}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    #[inline]
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Self::Custom(msg.into())
    }

    /// Wrap `self` with a message describing what was being attempted.
    #[inline]
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    #[inline]
    pub fn is_config(&self) -> bool {
        match self {
            Error::Config(_) | Error::Json(_) => true,
            Error::WithContext { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

/// Convenient `Result` alias, used as `crate::Result<T>` everywhere.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_wraps_and_keeps_kind() {
        let err = Error::Config("ppm must be positive".into()).context("loading sandbox.json");
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "loading sandbox.json: invalid configuration: ppm must be positive"
        );
    }

    #[test]
    fn custom_is_not_config() {
        assert!(!Error::custom("boom").is_config());
        assert!(!Error::NoAdapter.is_config());
    }
}
