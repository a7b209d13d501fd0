use std::borrow::Cow;

use tracing::debug;

/// All possible error kinds.
///
/// Each kind is a sentinel: callers compare kinds to tell failures apart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The payload does not have the expected type.
    InvalidType,
    /// The payload is not one of the allowed enumeration values.
    InvalidEnumValue,
    /// The payload map contains a key without a registered validator.
    InvalidKeyOfMap,
    /// The value does not support the requested access.
    AccessDenied,
    /// No resource interface matches the request or supports the operation.
    InvalidInterface,
    /// The operation has not been wired up for the resource.
    OperationNotSupported,
    /// A construction contract has been violated.
    InvalidParams,
    /// An iterator has been dereferenced out of its bounds.
    InvalidIterator,
    /// The entry already exists.
    Exist,
    /// The entry does not exist.
    NotExist,
    /// A transaction could not be opened, committed, or dropped.
    Transaction,
    /// Errors encountered while serializing or deserializing data.
    Serialization,
}

impl ErrorKind {
    pub(crate) const fn description(self) -> &'static str {
        match self {
            Self::InvalidType => "Invalid Type",
            Self::InvalidEnumValue => "Invalid Enum Value",
            Self::InvalidKeyOfMap => "Invalid Key Of Map",
            Self::AccessDenied => "Access Denied",
            Self::InvalidInterface => "Invalid Interface",
            Self::OperationNotSupported => "Operation Not Supported",
            Self::InvalidParams => "Invalid Params",
            Self::InvalidIterator => "Invalid Iterator",
            Self::Exist => "Exist",
            Self::NotExist => "Not Exist",
            Self::Transaction => "Transaction",
            Self::Serialization => "Serialization",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.description().fmt(f)
    }
}

/// A resource model error.
#[derive(Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    description: Cow<'static, str>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.format(f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.format(f)
    }
}

impl Error {
    /// Creates an [`Error`] from an [`ErrorKind`] and a description.
    #[inline]
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Self {
        let description = description.into();
        debug!("{kind}: {}", description.as_ref());
        Self { kind, description }
    }

    /// Returns the [`ErrorKind`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    fn format(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorKind::Serialization, e.to_string())
    }
}

impl std::error::Error for Error {}

/// A specialized [`Result`] type for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
