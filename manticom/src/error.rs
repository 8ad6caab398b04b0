use crate::pointer::Pointer;
use std::error;
use std::fmt;

/// Error type for manticom generation runs.
#[derive(Debug)]
pub enum ManticomError {
    /// Generic error with a message.
    GenericError(String),

    /// I/O error (e.g., reading the schema file, writing generated sources).
    IoError(std::io::Error),

    /// JSON parsing error.
    JsonError(serde_json::Error),

    /// Strict mode only: the schema produced error-severity issues.
    SchemaError(SchemaError),
}

impl error::Error for ManticomError {}

impl fmt::Display for ManticomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenericError(message) => write!(f, "{message}"),
            Self::IoError(io_error) => fmt::Display::fmt(io_error, f),
            Self::JsonError(json_error) => fmt::Display::fmt(json_error, f),
            Self::SchemaError(schema_error) => fmt::Display::fmt(schema_error, f),
        }
    }
}

impl From<String> for ManticomError {
    fn from(message: String) -> Self {
        Self::GenericError(message)
    }
}

impl From<std::io::Error> for ManticomError {
    fn from(io_error: std::io::Error) -> Self {
        Self::IoError(io_error)
    }
}

impl From<serde_json::Error> for ManticomError {
    fn from(json_error: serde_json::Error) -> Self {
        Self::JsonError(json_error)
    }
}

impl From<SchemaError> for ManticomError {
    fn from(schema_error: SchemaError) -> Self {
        Self::SchemaError(schema_error)
    }
}

/// All error-severity issues of a strict run, in the order they were found.
#[derive(Debug, Clone)]
pub struct SchemaError {
    pub issues: Vec<Issue>,
}

impl error::Error for SchemaError {}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema has {} error(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}

/// How much an issue affects the generated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// A documented fallback was applied; output is complete.
    Warning,
    /// The offending entry was skipped or degraded.
    Error,
}

/// A single problem found in the schema, located by JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: Pointer,
    pub kind: IssueKind,
}

impl Issue {
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// Every problem the pipeline knows how to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    MissingRootMember(String),
    UrlsNotArray,
    ObjectsNotArray,
    UrlEntryNotObject,
    UrlEntryMissingUrl,
    UrlNamedNil,
    UnknownUrlKey(String),
    ObjectEntryNotObject,
    ObjectEntryNotSingleKey(usize),
    ObjectNameMissingPrefix(String),
    ObjectFieldsNotObject(String),
    AttributeNotString(String),
    MalformedMethod(String),

    /// More than one token was left after flag extraction; the first one wins.
    AmbiguousAttribute {
        attribute: String,
        extra: Vec<String>,
    },
    UnknownType {
        attribute: String,
        type_name: String,
    },
    /// An object-typed field carried `optional` or `primary`.
    InvalidObjectAttribute {
        attribute: String,
        flag: &'static str,
    },
    UntestedPrimitiveArray(String),
    UnknownMetaTag(String),
    ForwardReference {
        attribute: String,
        target: String,
    },
    DuplicateObject(String),
    DanglingReference(Vec<String>),

    MalformedReference(String),
    UnknownObject(String),
    InvalidStatusBucket(String),
    AmbiguousResponse(Vec<String>),
    MalformedResponse,
    NonPrimitiveParameter(String),
    MissingPrimaryKeyForDelete,
    ConflictingRequestResponse,
    MissingResponse(&'static str),
    MissingRequest(&'static str),
    UnboundPathVariable(String),
    PrimaryKeyNotInPath(String),
    AmbiguousAuth(Vec<String>),
}

impl IssueKind {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::UrlEntryMissingUrl
            | Self::UrlNamedNil
            | Self::UnknownUrlKey(_)
            | Self::AmbiguousAttribute { .. }
            | Self::UntestedPrimitiveArray(_)
            | Self::UnknownMetaTag(_)
            | Self::AmbiguousResponse(_)
            | Self::UnboundPathVariable(_)
            | Self::PrimaryKeyNotInPath(_)
            | Self::AmbiguousAuth(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRootMember(member) => write!(f, "schema requires a root `{member}`"),
            Self::UrlsNotArray => write!(f, "`urls` must be a list"),
            Self::ObjectsNotArray => write!(f, "`objects` must be a list"),
            Self::UrlEntryNotObject => write!(f, "url entry must be an object"),
            Self::UrlEntryMissingUrl => {
                write!(f, "url entry has neither `url` nor `keyPath`")
            }
            Self::UrlNamedNil => write!(f, "no url can be named `nil`"),
            Self::UnknownUrlKey(key) => write!(f, "don't understand url key `{key}`"),
            Self::ObjectEntryNotObject => write!(f, "object entry must be a map"),
            Self::ObjectEntryNotSingleKey(count) => {
                write!(f, "object entry must contain a single key, found {count}")
            }
            Self::ObjectNameMissingPrefix(name) => {
                write!(f, "object name `{name}` must begin with `$`")
            }
            Self::ObjectFieldsNotObject(name) => {
                write!(f, "fields of `{name}` must be a map of attribute strings")
            }
            Self::AttributeNotString(name) => {
                write!(f, "attribute `{name}` must be a type string")
            }
            Self::MalformedMethod(reason) => write!(f, "malformed method definition: {reason}"),
            Self::AmbiguousAttribute { attribute, extra } => write!(
                f,
                "don't understand attribute tokens {extra:?} on `{attribute}`; using the first"
            ),
            Self::UnknownType {
                attribute,
                type_name,
            } => write!(f, "unknown type `{type_name}` on `{attribute}`"),
            Self::InvalidObjectAttribute { attribute, flag } => write!(
                f,
                "object-typed attribute `{attribute}` cannot be `{flag}`"
            ),
            Self::UntestedPrimitiveArray(attribute) => write!(
                f,
                "primitive attribute `{attribute}` with `array` is untested"
            ),
            Self::UnknownMetaTag(tag) => write!(f, "don't understand meta tag `{tag}`"),
            Self::ForwardReference { attribute, target } => write!(
                f,
                "`{attribute}` references `{target}` before it is defined"
            ),
            Self::DuplicateObject(name) => write!(f, "object `{name}` is defined twice"),
            Self::DanglingReference(names) => {
                write!(f, "objects referenced but not defined: {names:?}")
            }
            Self::MalformedReference(raw) => {
                write!(f, "`{raw}` is not an object reference (expected `$name`)")
            }
            Self::UnknownObject(name) => write!(f, "object `{name}` is not defined"),
            Self::InvalidStatusBucket(key) => write!(
                f,
                "status key `{key}` is neither 200+, 300+, 400+, 500+ nor a status code"
            ),
            Self::AmbiguousResponse(keys) => {
                write!(f, "response binds several status keys {keys:?}; using the first")
            }
            Self::MalformedResponse => write!(f, "response binds no object"),
            Self::NonPrimitiveParameter(name) => write!(
                f,
                "parameter object `{name}` has object fields; only primitives are passed"
            ),
            Self::MissingPrimaryKeyForDelete => {
                write!(f, "delete needs a primary key from its prototype or response")
            }
            Self::ConflictingRequestResponse => {
                write!(f, "get cannot carry a request alongside its response")
            }
            Self::MissingResponse(method) => {
                write!(f, "{method} needs a response definition")
            }
            Self::MissingRequest(method) => write!(f, "{method} needs a request definition"),
            Self::UnboundPathVariable(variable) => write!(
                f,
                "path variable `:{variable}` matches no primary key; mapping will fail"
            ),
            Self::PrimaryKeyNotInPath(key) => {
                write!(f, "path should contain the primary key `:{key}`")
            }
            Self::AmbiguousAuth(schemes) => {
                write!(f, "several auth schemes {schemes:?}; using the first")
            }
        }
    }
}
