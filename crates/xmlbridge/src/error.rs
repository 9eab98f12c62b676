//! Error types for xmlbridge

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad call arguments, e.g. an empty root element name
    InvalidInput,
    /// The text could not be parsed as well-formed XML
    MalformedXml,
    /// Element nesting went deeper than the configured limit
    RecursionError { max: usize },
    /// A node name does not match the XML 1.0 `Name` production
    InvalidElementName { name: String },
    /// The JSON bridge rejected its input
    Json,
    /// The output sink failed
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid input"),
            Self::MalformedXml => write!(f, "malformed xml"),
            Self::RecursionError { max } => {
                write!(f, "maximum recursion depth of {max} exceeded")
            }
            Self::InvalidElementName { name } => {
                write!(f, "\"{name}\" is not a valid XML element name")
            }
            Self::Json => write!(f, "json error"),
            Self::Io => write!(f, "i/o error"),
        }
    }
}

/// Main error type for xmlbridge
#[derive(Error, Clone, Debug, PartialEq)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    pos: Option<Pos>,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            pos: None,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            pos: None,
            message: message.into(),
        }
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, pos: Pos, detail: &str) -> Self {
        Self {
            message: format!("{kind} at {pos}: {detail}"),
            kind,
            pos: Some(pos),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::InvalidInput, message)
    }

    pub fn invalid_name(name: &str) -> Self {
        Self::new(ErrorKind::InvalidElementName {
            name: name.to_string(),
        })
    }

    pub fn recursion(max: usize) -> Self {
        Self::new(ErrorKind::RecursionError { max })
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn pos(&self) -> Option<Pos> {
        self.pos
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::with_message(ErrorKind::Io, err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::with_message(ErrorKind::Io, format!("writer produced invalid utf-8: {err}"))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::with_message(ErrorKind::Io, format!("xml writer error: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::with_message(ErrorKind::Json, err.to_string())
    }
}

/// Result type alias for xmlbridge
pub type Result<T> = std::result::Result<T, Error>;
