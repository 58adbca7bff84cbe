//! Search / ask / run-query state machine.
//!
//! Every action clears the snapshot synchronously, hands a request to the
//! dispatcher and returns. Completions are applied later on the same thread
//! through [`QueryController::apply`]. Each request carries a ticket; only the
//! newest ticket may write the snapshot, and a family's loading flag is only
//! cleared by that family's newest ticket.

use crossbeam_channel::Receiver;
use impactgraph_core::{GraphPayload, ImpactRequest, QueryRequest, RequestBody};

use crate::graph::layout::LayoutEngine;
use crate::graph::state::GraphState;
use crate::graph::transform::transform;
use crate::net::protocol::{ActionFamily, Completion, Endpoint, FetchError, GraphRequest};
use crate::query::{CredentialSource, Dispatch, SearchMode};
use crate::util::config::ApiConfig;

pub const GENERATING_QUERY: &str = "Generating Query...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Populated,
    Errored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionState {
    pub loading: bool,
    pub error: Option<String>,
    ticket: u64,
}

pub struct QueryController {
    api: ApiConfig,
    dispatcher: Box<dyn Dispatch>,
    credentials: Box<dyn CredentialSource>,
    layout: Box<dyn LayoutEngine>,

    pub graph: GraphState,
    pub search_term: String,
    mode: SearchMode,
    query_text: String,
    editor_open: bool,
    ai_status: Option<&'static str>,

    search: ActionState,
    run: ActionState,
    next_ticket: u64,
    // newest ticket across both families; the only one allowed to write the snapshot
    latest_ticket: u64,
}

impl QueryController {
    pub fn new(
        api: ApiConfig,
        dispatcher: Box<dyn Dispatch>,
        credentials: Box<dyn CredentialSource>,
        layout: Box<dyn LayoutEngine>,
    ) -> Self {
        Self {
            api,
            dispatcher,
            credentials,
            layout,
            graph: GraphState::default(),
            search_term: String::new(),
            mode: SearchMode::default(),
            query_text: String::new(),
            editor_open: false,
            ai_status: None,
            search: ActionState::default(),
            run: ActionState::default(),
            next_ticket: 0,
            latest_ticket: 0,
        }
    }

    // ---- UI state ----

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.query_text = text.into();
    }

    pub fn editor_open(&self) -> bool {
        self.editor_open
    }

    pub fn open_editor(&mut self) {
        self.editor_open = true;
    }

    pub fn close_editor(&mut self) {
        self.editor_open = false;
    }

    /// The "edit query" affordance shows when there is a query to edit and
    /// the editor is closed.
    pub fn show_editor_toggle(&self) -> bool {
        !self.query_text.is_empty() && !self.editor_open
    }

    pub fn ai_status(&self) -> Option<&'static str> {
        self.ai_status
    }

    pub fn search_state(&self) -> &ActionState {
        &self.search
    }

    pub fn run_state(&self) -> &ActionState {
        &self.run
    }

    pub fn is_loading(&self) -> bool {
        self.search.loading || self.run.loading
    }

    /// First error to show, search before run.
    pub fn error(&self) -> Option<&str> {
        self.search
            .error
            .as_deref()
            .or(self.run.error.as_deref())
    }

    pub fn phase(&self, family: ActionFamily) -> Phase {
        let st = self.state(family);
        if st.loading {
            Phase::Loading
        } else if st.error.is_some() {
            Phase::Errored
        } else if !self.graph.model.is_empty() {
            Phase::Populated
        } else {
            Phase::Idle
        }
    }

    // ---- actions ----

    /// Standard mode traces `search_term` as a field name; ask mode sends it
    /// as natural language. Returns whether a request went out.
    pub fn submit(&mut self) -> bool {
        let term = self.search_term.trim().to_string();
        if term.is_empty() {
            tracing::debug!("blank search term; not submitting");
            return false;
        }
        let (endpoint, path) = match self.mode {
            SearchMode::Standard => (Endpoint::Impact, self.api.impact_path.clone()),
            SearchMode::Ask => (Endpoint::Ask, self.api.ask_path.clone()),
        };
        let Some((url, bearer)) = self.prepare(&path) else {
            return false;
        };

        let curriculum_id = self.api.context().map(str::to_string);
        let body = match endpoint {
            Endpoint::Impact => RequestBody::Impact(ImpactRequest {
                field_name: term,
                curriculum_id,
            }),
            _ => RequestBody::Query(QueryRequest {
                query: term,
                curriculum_id,
            }),
        };

        self.ai_status = (endpoint == Endpoint::Ask).then_some(GENERATING_QUERY);
        self.start(endpoint, url, bearer, body);
        true
    }

    /// Re-executes the (possibly hand-edited) query text. Blank text is a no-op.
    pub fn run_query(&mut self) -> bool {
        if self.query_text.trim().is_empty() {
            tracing::debug!("blank query text; not running");
            return false;
        }
        let path = self.api.raw_path.clone();
        let Some((url, bearer)) = self.prepare(&path) else {
            return false;
        };
        let body = RequestBody::Query(QueryRequest {
            query: self.query_text.clone(),
            curriculum_id: self.api.context().map(str::to_string),
        });
        self.start(Endpoint::Raw, url, bearer, body);
        true
    }

    /// Drains whatever the network side has finished. Returns how many
    /// completions were applied (stale ones included).
    pub fn pump(&mut self, rx: &Receiver<Completion>) -> usize {
        let mut n = 0;
        for c in rx.try_iter() {
            self.apply(c);
            n += 1;
        }
        n
    }

    pub fn apply(&mut self, c: Completion) {
        let family = c.endpoint.family();
        let st = self.state_mut(family);
        if c.ticket != st.ticket {
            tracing::warn!(
                family = family.as_str(),
                ticket = c.ticket,
                current = st.ticket,
                "dropping stale completion"
            );
            return;
        }
        st.loading = false;
        if family == ActionFamily::Search {
            self.ai_status = None;
        }
        if c.ticket != self.latest_ticket {
            tracing::debug!(
                family = family.as_str(),
                ticket = c.ticket,
                latest = self.latest_ticket,
                "completion superseded by a newer request"
            );
            return;
        }

        match c.outcome {
            Ok(payload) => self.on_success(c.endpoint, payload),
            Err(err) => self.on_failure(family, &err),
        }
    }

    // ---- internals ----

    /// Base URL, optional context requirement and a fresh token; any of them
    /// missing means the action silently does nothing.
    fn prepare(&self, path: &str) -> Option<(String, String)> {
        let Some(url) = self.api.url_for(path) else {
            tracing::debug!("no API base configured; action skipped");
            return None;
        };
        if self.api.require_context && self.api.context().is_none() {
            tracing::debug!("no active context; action skipped");
            return None;
        }
        let Some(token) = self
            .credentials
            .bearer_token()
            .filter(|t| !t.trim().is_empty())
        else {
            tracing::debug!("no credential available; action skipped");
            return None;
        };
        Some((url, token))
    }

    fn start(&mut self, endpoint: Endpoint, url: String, bearer: String, body: RequestBody) {
        self.graph.clear();
        self.search.error = None;
        self.run.error = None;

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.latest_ticket = ticket;
        let family = endpoint.family();
        let st = self.state_mut(family);
        st.loading = true;
        st.ticket = ticket;

        tracing::info!(family = family.as_str(), ticket, url = %url, "graph request started");
        let req = GraphRequest {
            ticket,
            endpoint,
            url,
            bearer,
            body,
        };
        if let Err(err) = self.dispatcher.dispatch(req) {
            tracing::warn!(ticket, error = %err, "dispatch failed");
            self.apply(Completion {
                ticket,
                endpoint,
                outcome: Err(err),
            });
        }
    }

    fn on_success(&mut self, endpoint: Endpoint, payload: GraphPayload) {
        let GraphPayload {
            nodes,
            edges,
            cypher,
        } = payload;
        if let Some(q) = cypher.filter(|q| !q.is_empty()) {
            self.query_text = q;
            if endpoint == Endpoint::Ask {
                self.editor_open = true;
            }
        }
        let (nodes, edges) = transform(nodes, edges);
        self.graph.load(nodes, edges, self.layout.as_ref());
        tracing::info!(
            family = endpoint.family().as_str(),
            nodes = self.graph.model.nodes.len(),
            edges = self.graph.model.edges.len(),
            "graph loaded"
        );
    }

    fn on_failure(&mut self, family: ActionFamily, err: &FetchError) {
        self.graph.clear();
        self.state_mut(family).error = Some(err.user_message(family));
    }

    fn state(&self, family: ActionFamily) -> &ActionState {
        match family {
            ActionFamily::Search => &self.search,
            ActionFamily::RunQuery => &self.run,
        }
    }

    fn state_mut(&mut self, family: ActionFamily) -> &mut ActionState {
        match family {
            ActionFamily::Search => &mut self.search,
            ActionFamily::RunQuery => &mut self.run,
        }
    }
}
