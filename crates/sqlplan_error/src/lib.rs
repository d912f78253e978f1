//! Error types shared across the planning crates.

use std::error::Error;
use std::fmt;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Classification of an error.
///
/// Binding and planning errors are deterministic functions of their input;
/// none of them are retryable. `Internal` indicates a planner defect, not a
/// user error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbErrorKind {
    /// A named argument doesn't match any declared argument.
    UnknownArgument,
    /// A required argument (no default) was not provided.
    MissingRequiredArgument,
    /// Copartitioned arguments supply differing partition column counts.
    IncompatibleCopartitionArity,
    /// No common supertype exists for a copartitioned key column.
    IncoercibleCopartitionType,
    /// Catalog lookup failed to find the function.
    FunctionNotFound,
    /// A pushdown hook returned a handle kind the planner doesn't recognize.
    ///
    /// Signals a collaborator contract violation and is always fatal.
    UnsupportedArgumentHandle,
    /// Any other deterministic rejection of user input.
    InvalidInput,
    /// Planner invariant violation.
    Internal,
}

impl fmt::Display for DbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownArgument => write!(f, "Unknown argument"),
            Self::MissingRequiredArgument => write!(f, "Missing required argument"),
            Self::IncompatibleCopartitionArity => write!(f, "Incompatible copartition arity"),
            Self::IncoercibleCopartitionType => write!(f, "Incoercible copartition type"),
            Self::FunctionNotFound => write!(f, "Function not found"),
            Self::UnsupportedArgumentHandle => write!(f, "Unsupported argument handle"),
            Self::InvalidInput => write!(f, "Invalid input"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

#[derive(Debug)]
pub struct DbError {
    kind: DbErrorKind,
    msg: String,
    /// Extra key/value context to attach to the message.
    fields: Vec<(&'static str, String)>,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl DbError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::InvalidInput, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Internal, msg)
    }

    pub fn with_kind(kind: DbErrorKind, msg: impl Into<String>) -> Self {
        DbError {
            kind,
            msg: msg.into(),
            fields: Vec::new(),
            source: None,
        }
    }

    pub fn with_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    pub fn with_fields<V, I>(mut self, fields: I) -> Self
    where
        V: fmt::Display,
        I: IntoIterator<Item = (&'static str, V)>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k, v.to_string())));
        self
    }

    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> DbErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)?;
        for (key, value) in &self.fields {
            write!(f, "\n  {key}: {value}")?;
        }
        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

/// Extension for attaching context to error results.
pub trait ResultExt<T> {
    /// Wrap the error with a static context message.
    fn context(self, msg: &'static str) -> Result<T>;

    /// Wrap the error with a lazily computed context message.
    fn context_fn<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T, DbError> {
    fn context(self, msg: &'static str) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => {
                let kind = e.kind();
                Err(DbError::with_kind(kind, msg).with_source(e))
            }
        }
    }

    fn context_fn<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => {
                let kind = e.kind();
                Err(DbError::with_kind(kind, f()).with_source(e))
            }
        }
    }
}
