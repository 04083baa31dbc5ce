use thiserror::Error as ThisError;

/// Engine-level failures. The `Display` text of client-class variants is sent
/// verbatim as the RESP error line, so the `WRONGTYPE` prefix must stay intact.
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

impl StoreError {
    /// Client-class errors become per-command error replies; anything else
    /// aborts the surrounding transaction.
    pub fn is_client_error(&self) -> bool {
        matches!(self, StoreError::WrongType)
    }
}
