use thiserror::Error;

/// Errors surfaced by the fallible `try_*` renderer operations
#[derive(Debug, Error)]
pub enum RenderError {
    /// No surface has been allocated yet
    #[error("surface is not initialized")]
    NotInitialized,

    /// A stroke operation arrived outside of a begin/end pair
    #[error("no active stroke session")]
    NoActiveSession,

    #[error("failed to encode surface: {0}")]
    Encode(#[from] image::ImageError),
}

/// Errors that can occur while delivering an exported image
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Write(#[from] std::io::Error),

    /// The browser refused one of the download steps
    #[error("download failed: {0}")]
    Download(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("invalid hex color {0:?}, expected #rrggbb")]
    InvalidColor(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
