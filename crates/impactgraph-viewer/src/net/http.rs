use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use impactgraph_core::{ErrorBody, GraphPayload};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::net::protocol::{Completion, FetchError, GraphRequest};
use crate::query::Dispatch;
use crate::util::config::ApiConfig;

/// Hands requests to the network thread. Dropping it stops the thread once
/// in-flight requests have been abandoned.
pub struct HttpDispatcher {
    tx: mpsc::UnboundedSender<GraphRequest>,
}

impl Dispatch for HttpDispatcher {
    fn dispatch(&self, req: GraphRequest) -> Result<(), FetchError> {
        self.tx
            .send(req)
            .map_err(|_| FetchError::Transport("network thread stopped".into()))
    }
}

pub fn build_client(api: &ApiConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = api.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("build HTTP client")
}

/// Runs a tokio runtime on its own thread; completions come back on `done`
/// for the UI thread to apply.
pub fn spawn_dispatcher(api: &ApiConfig, done: Sender<Completion>) -> Result<HttpDispatcher> {
    let client = build_client(api)?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("start network runtime")?;
    let (tx, mut rx) = mpsc::unbounded_channel::<GraphRequest>();

    std::thread::Builder::new()
        .name("impactgraph-net".into())
        .spawn(move || {
            rt.block_on(async move {
                while let Some(req) = rx.recv().await {
                    let client = client.clone();
                    let done = done.clone();
                    tokio::spawn(async move {
                        let outcome = fetch_graph(&client, &req).await;
                        if let Err(e) = &outcome {
                            tracing::warn!(ticket = req.ticket, url = %req.url, error = %e, "graph request failed");
                        }
                        // receiver gone means the UI shut down
                        let _ = done.send(Completion::for_request(&req, outcome));
                    });
                }
            });
        })
        .context("spawn network thread")?;

    Ok(HttpDispatcher { tx })
}

pub async fn fetch_graph(
    client: &reqwest::Client,
    req: &GraphRequest,
) -> Result<GraphPayload, FetchError> {
    let resp = client
        .post(&req.url)
        .bearer_auth(&req.bearer)
        .json(&req.body)
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|b| b.message);
        return Err(FetchError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice::<GraphPayload>(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
}
