use impactgraph_core::{GraphPayload, RequestBody};

/// The two request families each keep their own loading/error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionFamily {
    Search,
    RunQuery,
}

impl ActionFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::RunQuery => "run_query",
        }
    }

    fn server_fallback(self) -> &'static str {
        match self {
            Self::Search => "Failed to fetch dependency graph",
            Self::RunQuery => "Failed to execute custom query",
        }
    }

    fn transport_fallback(self) -> &'static str {
        match self {
            Self::Search => "Could not load graph",
            Self::RunQuery => "Execution failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Impact,
    Ask,
    Raw,
}

impl Endpoint {
    pub fn family(self) -> ActionFamily {
        match self {
            Self::Impact | Self::Ask => ActionFamily::Search,
            Self::Raw => ActionFamily::RunQuery,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}")]
    Status { status: u16, message: Option<String> },
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Server-supplied message when there is one, else the family's fallback.
    pub fn user_message(&self, family: ActionFamily) -> String {
        match self {
            Self::Status {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            Self::Status { .. } => family.server_fallback().to_string(),
            Self::Transport(_) | Self::Decode(_) => family.transport_fallback().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    pub ticket: u64,
    pub endpoint: Endpoint,
    pub url: String,
    pub bearer: String,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub ticket: u64,
    pub endpoint: Endpoint,
    pub outcome: Result<GraphPayload, FetchError>,
}

impl Completion {
    pub fn for_request(req: &GraphRequest, outcome: Result<GraphPayload, FetchError>) -> Self {
        Self {
            ticket: req.ticket,
            endpoint: req.endpoint,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins_over_fallback() {
        let err = FetchError::Status {
            status: 422,
            message: Some("Unknown field Account.Foo".into()),
        };
        assert_eq!(err.user_message(ActionFamily::Search), "Unknown field Account.Foo");
    }

    #[test]
    fn fallbacks_are_family_specific() {
        let bare = FetchError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(bare.user_message(ActionFamily::Search), "Failed to fetch dependency graph");
        assert_eq!(bare.user_message(ActionFamily::RunQuery), "Failed to execute custom query");

        let blank = FetchError::Status {
            status: 500,
            message: Some("  ".into()),
        };
        assert_eq!(blank.user_message(ActionFamily::Search), "Failed to fetch dependency graph");

        let net = FetchError::Transport("connection refused".into());
        assert_eq!(net.user_message(ActionFamily::Search), "Could not load graph");
        assert_eq!(net.user_message(ActionFamily::RunQuery), "Execution failed");

        let bad_body = FetchError::Decode("expected value".into());
        assert_eq!(bad_body.user_message(ActionFamily::RunQuery), "Execution failed");
    }

    #[test]
    fn endpoints_map_to_families() {
        assert_eq!(Endpoint::Impact.family(), ActionFamily::Search);
        assert_eq!(Endpoint::Ask.family(), ActionFamily::Search);
        assert_eq!(Endpoint::Raw.family(), ActionFamily::RunQuery);
    }
}
