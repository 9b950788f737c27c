use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    PatternSyntax,

    ConvertTypeMismatch,

    ConfigParseFailed,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    InternalIoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PatternSyntax => "pattern.syntax",

            ErrorCode::ConvertTypeMismatch => "convert.type_mismatch",

            ErrorCode::ConfigParseFailed => "config.parse_failed",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::InternalIoError => "internal.io_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSyntaxDetails {
    pub pattern: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMismatchDetails {
    pub expected: String,
    pub actual: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigParseDetails {
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn details_of<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn pattern_syntax(
        pattern: impl Into<String>,
        problem: impl Into<String>,
        position: Option<usize>,
    ) -> Self {
        let pattern = pattern.into();
        let problem = problem.into();
        let message = format!("Invalid key pattern '{}': {}", pattern, problem);
        let details = details_of(PatternSyntaxDetails {
            pattern,
            problem,
            position,
        });

        Self::new(ErrorCode::PatternSyntax, message, details)
            .with_hint("Write keys as 'a/b'; '*' is any one key, '{a,b}' lists choices")
    }

    pub fn type_mismatch(
        expected: impl Into<String>,
        actual: impl Into<String>,
        index: Option<usize>,
    ) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        let message = match index {
            Some(i) => format!("Element {} is {}, expected {}", i, actual, expected),
            None => format!("Value is {}, expected {}", actual, expected),
        };
        let details = details_of(TypeMismatchDetails {
            expected,
            actual,
            index,
        });

        Self::new(ErrorCode::ConvertTypeMismatch, message, details)
    }

    pub fn config_parse(
        format: impl Into<String>,
        path: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        let format = format.into();
        let message = format!("Invalid {} in rename configuration", format);
        let details = details_of(ConfigParseDetails {
            format,
            path,
            error: error.into(),
        });

        Self::new(ErrorCode::ConfigParseFailed, message, details)
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = details_of(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
    ) -> Self {
        let details = details_of(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = details_of(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
