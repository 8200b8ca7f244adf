//! XLS error types

use thiserror::Error;

pub use crate::cfb::CfbError;

/// Result type for XLS operations
pub type XlsResult<T> = std::result::Result<T, XlsError>;

/// Errors that can occur while reading an XLS workbook
#[derive(Debug, Error)]
pub enum XlsError {
    /// IO error from the underlying byte source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Compound document container error
    #[error(transparent)]
    Cfb(#[from] CfbError),

    /// Structurally invalid BIFF data
    #[error("invalid XLS format: {0}")]
    InvalidFormat(String),

    /// The workbook stream is not BIFF8
    #[error("unsupported BIFF version 0x{0:04X}, only BIFF8 (0x0600) is supported")]
    UnsupportedVersion(u16),

    /// The file carries a FILEPASS record; decryption is not implemented
    #[error("the file is encrypted; decryption is not supported")]
    Encrypted,

    /// The container has neither a `Workbook` nor a `Book` stream
    #[error("no Workbook or Book stream found in the compound document")]
    MissingWorkbookStream,

    /// Model/sink error
    #[error("storage error: {0}")]
    Storage(#[from] ironsheet_core::Error),
}
