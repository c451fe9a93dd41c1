use std::fmt::{Display, Formatter};

use crate::clip::ClipId;

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by editor commands and clip store operations.
///
/// None of these are fatal: the store leaves its state untouched and the
/// caller surfaces the error as an advisory message.
#[derive(Debug)]
pub enum EngineError {
    InvalidSelection {
        action: &'static str,
    },
    ClipNotFound {
        clip_id: ClipId,
    },
    InvalidSplitPoint {
        clip_id: ClipId,
        at: f64,
        start: f64,
        end: f64,
    },
    DegenerateTrim {
        clip_id: ClipId,
        duration: f64,
        min_duration: f64,
    },
    TrimOutsideSource {
        clip_id: ClipId,
        trim_in: f64,
        trim_out: f64,
        source_duration: f64,
    },
    InvalidDuration {
        duration: f64,
    },
    InvalidTime {
        time: f64,
    },
    InvalidConfig {
        reason: String,
    },
    ConfigParse {
        source: serde_json::Error,
    },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSelection { action } => write!(f, "select a clip to {action}"),
            Self::ClipNotFound { clip_id } => write!(f, "clip not found: {clip_id}"),
            Self::InvalidSplitPoint {
                clip_id,
                at,
                start,
                end,
            } => write!(
                f,
                "cannot split {clip_id} at {at:.2}s: split point must be inside {start:.2}s..{end:.2}s"
            ),
            Self::DegenerateTrim {
                clip_id,
                duration,
                min_duration,
            } => write!(
                f,
                "trim of {clip_id} rejected: {duration:.2}s is shorter than the {min_duration:.2}s minimum"
            ),
            Self::TrimOutsideSource {
                clip_id,
                trim_in,
                trim_out,
                source_duration,
            } => write!(
                f,
                "trim of {clip_id} rejected: {trim_in:.2}s..{trim_out:.2}s exceeds source length {source_duration:.2}s"
            ),
            Self::InvalidDuration { duration } => {
                write!(f, "clip duration must be positive, got {duration}")
            }
            Self::InvalidTime { time } => write!(f, "clip start must be a finite time, got {time}"),
            Self::InvalidConfig { reason } => write!(f, "invalid editor config: {reason}"),
            Self::ConfigParse { source } => write!(f, "editor config could not be parsed ({source})"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigParse { source } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(value: serde_json::Error) -> Self {
        Self::ConfigParse { source: value }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineError;
    use crate::clip::ClipId;

    #[test]
    fn split_point_message_names_clip_and_interval() {
        let error = EngineError::InvalidSplitPoint {
            clip_id: ClipId(3),
            at: 12.0,
            start: 0.0,
            end: 10.0,
        };

        assert_eq!(
            error.to_string(),
            "cannot split clip-3 at 12.00s: split point must be inside 0.00s..10.00s"
        );
    }

    #[test]
    fn config_parse_error_exposes_source() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = EngineError::from(parse);

        assert!(std::error::Error::source(&error).is_some());
    }
}
