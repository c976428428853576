use std::{fmt, io};

#[derive(Debug)]
pub enum Error {
    MissingWriterParam,
    MissingReaderParam,
    MissingParam(&'static str),
    InvalidSourceLabel(String),
    InvalidTarget(String),
    NotFound(String),
    MalformedFeature(String),
    ExceededCount,
    DuplicateRegistration(String),
    UnknownScheme(String),
    InvalidConfiguration(String),
    Io(io::Error),
    Json(serde_json::Error),
    Address(url::ParseError),
    Pattern(regex::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingWriterParam => write!(f, "Missing writer parameter"),
            Error::MissingReaderParam => write!(f, "Missing reader parameter"),
            Error::MissingParam(name) => write!(f, "Missing {} parameter", name),
            Error::InvalidSourceLabel(label) => write!(f, "Invalid source label '{}'", label),
            Error::InvalidTarget(reason) => write!(f, "Invalid write target: {}", reason),
            Error::NotFound(path) => write!(f, "No record at '{}'", path),
            Error::MalformedFeature(reason) => write!(f, "Malformed feature: {}", reason),
            Error::ExceededCount => write!(f, "Exceeded expected number of features"),
            Error::DuplicateRegistration(name) => write!(f, "'{}' is already registered", name),
            Error::UnknownScheme(name) => write!(f, "No implementation registered for '{}'", name),
            Error::InvalidConfiguration(reason) => write!(f, "Invalid configuration: {}", reason),
            Error::Io(err) => write!(f, "{}", err),
            Error::Json(err) => write!(f, "{}", err),
            Error::Address(err) => write!(f, "{}", err),
            Error::Pattern(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Json(value)
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Self {
        Error::Address(value)
    }
}

impl From<regex::Error> for Error {
    fn from(value: regex::Error) -> Self {
        Error::Pattern(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
