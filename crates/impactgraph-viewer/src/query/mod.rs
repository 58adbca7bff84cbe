pub mod controller;
pub mod credentials;

use serde::{Deserialize, Serialize};

use crate::net::protocol::{FetchError, GraphRequest};

pub use controller::{ActionState, Phase, QueryController, GENERATING_QUERY};
pub use credentials::{CredentialSource, EnvToken};

/// Where the network side of the controller goes. Returning an error makes
/// the controller fail the request immediately instead of waiting.
pub trait Dispatch {
    fn dispatch(&self, req: GraphRequest) -> Result<(), FetchError>;
}

impl Dispatch for crossbeam_channel::Sender<GraphRequest> {
    fn dispatch(&self, req: GraphRequest) -> Result<(), FetchError> {
        self.send(req)
            .map_err(|_| FetchError::Transport("request channel closed".into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Deterministic field-name impact trace.
    #[default]
    Standard,
    /// Natural language in, generated query plus graph out.
    Ask,
}

impl SearchMode {
    pub fn submit_label(self) -> &'static str {
        match self {
            Self::Standard => "Trace",
            Self::Ask => "Ask",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Standard => "Enter a field name",
            Self::Ask => "e.g., Show me all critical Apex classes...",
        }
    }

    /// Headline and hint shown while the canvas is empty.
    pub fn empty_prompt(self) -> (&'static str, &'static str) {
        match self {
            Self::Standard => (
                "Enter a field name to trace dependencies",
                "Field → Apex Classes → Flows & Triggers",
            ),
            Self::Ask => (
                "Ask a question about your Salesforce metadata",
                "e.g., \"Show me all flows that update Account\"",
            ),
        }
    }
}
