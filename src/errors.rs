//! Error taxonomy and the bounded error stack.
//!
//! Every fallible operation returns `Result<T>`. The `GpuSystem` entry points
//! additionally push failures onto an `ErrorStack` so callers that prefer to
//! poll can pop them afterwards, most recent first.

use std::collections::VecDeque;
use std::fmt;
use std::io;

use inlinable_string::{InlinableString, StringExt};

use crate::logging::{self, DebugLevel};

/// Maximum number of records kept by an `ErrorStack`.
pub const MAX_ERRORS: usize = 20;
/// Maximum length in bytes of a recorded function name.
pub const MAX_FUNCTION_NAME: usize = 128;
/// Maximum length in bytes of recorded error details.
pub const MAX_ERROR_DETAILS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    None,
    Backend,
    Data,
    User,
    UnsupportedFunction,
    NullArgument,
    FileNotFound,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::None => "NO ERROR",
            ErrorCode::Backend => "BACKEND ERROR",
            ErrorCode::Data => "DATA ERROR",
            ErrorCode::User => "USER ERROR",
            ErrorCode::UnsupportedFunction => "UNSUPPORTED FUNCTION",
            ErrorCode::NullArgument => "NULL ARGUMENT",
            ErrorCode::FileNotFound => "FILE NOT FOUND",
        }
    }
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::None
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Fail)]
#[fail(display = "{} - {}", code, details)]
pub struct Error {
    pub code: ErrorCode,
    pub details: String,
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    pub fn new<T: Into<String>>(code: ErrorCode, details: T) -> Self {
        Error {
            code,
            details: details.into(),
        }
    }

    #[inline]
    pub fn backend<T: Into<String>>(details: T) -> Self {
        Error::new(ErrorCode::Backend, details)
    }

    #[inline]
    pub fn data<T: Into<String>>(details: T) -> Self {
        Error::new(ErrorCode::Data, details)
    }

    #[inline]
    pub fn user<T: Into<String>>(details: T) -> Self {
        Error::new(ErrorCode::User, details)
    }

    #[inline]
    pub fn unsupported<T: Into<String>>(details: T) -> Self {
        Error::new(ErrorCode::UnsupportedFunction, details)
    }

    #[inline]
    pub fn null_argument<T: Into<String>>(argument: T) -> Self {
        Error::new(ErrorCode::NullArgument, argument)
    }

    #[inline]
    pub fn file_not_found<T: Into<String>>(details: T) -> Self {
        Error::new(ErrorCode::FileNotFound, details)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        match err.kind() {
            io::ErrorKind::NotFound => Error::file_not_found(format!("{}", err)),
            _ => Error::data(format!("{}", err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::data(format!("{}", err))
    }
}

/// A single entry of the `ErrorStack`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub function: InlinableString,
    pub code: ErrorCode,
    pub details: String,
}

impl ErrorRecord {
    /// The record popped from an empty stack.
    pub fn none() -> Self {
        ErrorRecord {
            function: InlinableString::new(),
            code: ErrorCode::None,
            details: String::new(),
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.code == ErrorCode::None
    }
}

impl Default for ErrorRecord {
    fn default() -> Self {
        ErrorRecord::none()
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} - {}", self.function, self.code, self.details)
    }
}

/// A bounded stack of `ErrorRecord`s. Pushing onto a full stack silently
/// discards the oldest record.
#[derive(Debug)]
pub struct ErrorStack {
    records: VecDeque<ErrorRecord>,
    capacity: usize,
}

impl Default for ErrorStack {
    fn default() -> Self {
        ErrorStack::new()
    }
}

impl ErrorStack {
    pub fn new() -> Self {
        ErrorStack::with_capacity(MAX_ERRORS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ErrorStack {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records an error, logging it when `level` is at least `Level1`.
    pub fn push<T: AsRef<str>>(&mut self, level: DebugLevel, function: &str, code: ErrorCode, details: T) {
        let details = details.as_ref();

        if level >= DebugLevel::Level1 {
            logging::log_error(level, format_args!("{}: {} - {}", function, code, details));
        }

        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }

        let mut name = InlinableString::new();
        name.push_str(truncate(function, MAX_FUNCTION_NAME));

        self.records.push_back(ErrorRecord {
            function: name,
            code,
            details: truncate(details, MAX_ERROR_DETAILS).to_owned(),
        });
    }

    /// Records a failed `Result`.
    #[inline]
    pub fn push_error(&mut self, level: DebugLevel, function: &str, err: &Error) {
        self.push(level, function, err.code, &err.details);
    }

    /// Pops the most recent record, or `ErrorRecord::none()` if there is none.
    pub fn pop(&mut self) -> ErrorRecord {
        self.records.pop_back().unwrap_or_else(ErrorRecord::none)
    }

    #[inline]
    pub fn peek(&self) -> Option<&ErrorRecord> {
        self.records.back()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

fn truncate(v: &str, max: usize) -> &str {
    if v.len() <= max {
        return v;
    }

    let mut end = max;
    while !v.is_char_boundary(end) {
        end -= 1;
    }

    &v[..end]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic() {
        let mut stack = ErrorStack::new();
        stack.push(DebugLevel::Level0, "a", ErrorCode::User, "first");
        stack.push(DebugLevel::Level0, "b", ErrorCode::Data, "second");

        assert_eq!(stack.len(), 2);

        let e = stack.pop();
        assert_eq!(&e.function[..], "b");
        assert_eq!(e.code, ErrorCode::Data);

        let e = stack.pop();
        assert_eq!(&e.function[..], "a");
        assert_eq!(e.details, "first");

        assert!(stack.pop().is_none());
        assert!(stack.pop().is_none());
    }

    #[test]
    fn drop_oldest() {
        let mut stack = ErrorStack::with_capacity(3);
        for i in 0..5 {
            stack.push(DebugLevel::Level0, "f", ErrorCode::Backend, format!("{}", i));
        }

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.pop().details, "4");
        assert_eq!(stack.pop().details, "3");
        assert_eq!(stack.pop().details, "2");
        assert!(stack.is_empty());
    }

    #[test]
    fn truncation() {
        let mut stack = ErrorStack::new();
        let name = "n".repeat(300);
        let details = "é".repeat(400);
        stack.push(DebugLevel::Level0, &name, ErrorCode::Data, &details);

        let e = stack.pop();
        assert_eq!(e.function.len(), MAX_FUNCTION_NAME);
        assert!(e.details.len() <= MAX_ERROR_DETAILS);
        assert!(e.details.chars().all(|c| c == 'é'));
    }

    #[test]
    fn display() {
        let err = Error::user("NULL renderer");
        assert_eq!(format!("{}", err), "USER ERROR - NULL renderer");

        let err: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }
}
