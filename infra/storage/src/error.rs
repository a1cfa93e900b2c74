use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[secman_derive::secman_error]
pub enum StorageError {
    /// The backend holds no data yet.
    ///
    /// Callers treat this as "start empty" rather than as a failure.
    #[error("Data source could not be found{}: {message}", format_context(.context))]
    SourceNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal storage error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StorageError {
    /// Returns `true` if the backend reported that it holds no data.
    #[must_use]
    pub const fn is_source_not_found(&self) -> bool {
        matches!(self, Self::SourceNotFound { .. })
    }
}
