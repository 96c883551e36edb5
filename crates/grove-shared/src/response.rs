//! Uniform error envelope returned by every failing endpoint.
//!
//! ```json
//! { "errors": [ { "code": "400", "type": "ParamError", "messages": ["name is required"] } ] }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error category shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    AuthError,
    UnknownError,
    ParamError,
    NotFoundError,
    LimitExceededError,
}

/// One normalized message. Every input kind collapses to its text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text(String),
    Error(String),
    Value(String),
}

impl Message {
    /// Message taken from an error's `Display` output.
    pub fn error(err: &(dyn std::error::Error + '_)) -> Self {
        Message::Error(err.to_string())
    }

    /// Message taken from any displayable value.
    pub fn display(value: impl fmt::Display) -> Self {
        Message::Value(value.to_string())
    }

    pub fn into_string(self) -> String {
        match self {
            Message::Text(s) | Message::Error(s) | Message::Value(s) => s,
        }
    }
}

impl<'a> From<&'a (dyn std::error::Error + 'a)> for Message {
    fn from(err: &'a (dyn std::error::Error + 'a)) -> Self {
        Message::error(err)
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Text(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::Text(s)
    }
}

impl From<&String> for Message {
    fn from(s: &String) -> Self {
        Message::Text(s.clone())
    }
}

macro_rules! message_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Message {
                fn from(v: $t) -> Self {
                    Message::Value(v.to_string())
                }
            }
        )*
    };
}

message_from_display!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, bool, char);

/// A single error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub code: String,
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub messages: Vec<String>,
}

/// Error envelope holding one or more entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorEntry>,
}

impl ErrorResponse {
    /// Envelope with a single entry built from `messages`, in order.
    pub fn new<I, M>(code: impl Into<String>, error_type: ErrorType, messages: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Message>,
    {
        let mut response = Self::default();
        response.append(code, error_type, messages);
        response
    }

    /// Add another entry. Entries are never merged or deduplicated.
    pub fn append<I, M>(&mut self, code: impl Into<String>, error_type: ErrorType, messages: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<Message>,
    {
        self.errors.push(ErrorEntry {
            code: code.into(),
            error_type,
            messages: messages
                .into_iter()
                .map(|m| m.into().into_string())
                .collect(),
        });
    }

    pub fn with<I, M>(mut self, code: impl Into<String>, error_type: ErrorType, messages: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Message>,
    {
        self.append(code, error_type, messages);
        self
    }

    pub fn param(messages: impl IntoIterator<Item = String>) -> Self {
        Self::new("400", ErrorType::ParamError, messages)
    }

    pub fn auth(message: impl Into<Message>) -> Self {
        Self::new("401", ErrorType::AuthError, [message])
    }

    pub fn not_found(message: impl Into<Message>) -> Self {
        Self::new("404", ErrorType::NotFoundError, [message])
    }

    pub fn unknown() -> Self {
        Self::new("500", ErrorType::UnknownError, ["internal server error"])
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&pretty)
    }
}

/// Build an [`ErrorResponse`] from heterogeneous messages.
///
/// ```ignore
/// let err = error_response!("400", ErrorType::ParamError, "bad id", 42);
/// ```
#[macro_export]
macro_rules! error_response {
    ($code:expr, $type:expr $(, $msg:expr)* $(,)?) => {
        $crate::response::ErrorResponse::new(
            $code,
            $type,
            ::std::vec![$($crate::response::Message::from($msg)),*],
        )
    };
}
