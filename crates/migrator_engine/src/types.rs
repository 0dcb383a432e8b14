use migrator_core::{ActionKind, EntityKind, Msg};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("staged {kind} row {index} has no `{field}` field")]
    MissingField {
        kind: EntityKind,
        field: &'static str,
        index: usize,
    },
}

impl ApiError {
    /// Text to show inline next to a form: the backend's own message when it sent one.
    pub fn inline_message(&self) -> String {
        match self {
            ApiError::HttpStatus { body, .. } if !body.trim().is_empty() => body.trim().to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Hydrated {
        kind: EntityKind,
        ids: Vec<String>,
    },
    HydrationFailed {
        kind: EntityKind,
        error: ApiError,
    },
    LogUpdated(String),
    ActionFinished {
        action: ActionKind,
        result: Result<String, ApiError>,
    },
    ConfigUpdated(Result<String, ApiError>),
}

impl EngineEvent {
    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::Hydrated { kind, ids } => Msg::Hydrated { kind, ids },
            EngineEvent::HydrationFailed { kind, error } => Msg::HydrationFailed {
                kind,
                error: error.to_string(),
            },
            EngineEvent::LogUpdated(text) => Msg::LogUpdated(text),
            EngineEvent::ActionFinished { action, result } => Msg::ActionFinished {
                action,
                outcome: result.map_err(|err| err.to_string()),
            },
            EngineEvent::ConfigUpdated(result) => {
                Msg::ConfigUpdated(result.map_err(|err| err.inline_message()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_message_prefers_backend_body() {
        let err = ApiError::HttpStatus {
            status: 400,
            body: " bad key: foo \n".to_string(),
        };
        assert_eq!(err.inline_message(), "bad key: foo");

        let empty = ApiError::HttpStatus {
            status: 502,
            body: String::new(),
        };
        assert_eq!(empty.inline_message(), "http status 502: ");
    }

    #[test]
    fn failed_action_surfaces_error_text_verbatim() {
        let msg = EngineEvent::ActionFinished {
            action: ActionKind::Migrate,
            result: Err(ApiError::Network("connection refused".to_string())),
        }
        .into_msg();
        assert_eq!(
            msg,
            Msg::ActionFinished {
                action: ActionKind::Migrate,
                outcome: Err("network error: connection refused".to_string()),
            }
        );
    }
}
