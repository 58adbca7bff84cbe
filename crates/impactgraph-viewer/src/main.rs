mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{parse_args, Action};
use impactgraph_viewer::graph::{Decorated, LayeredLayout};
use impactgraph_viewer::net::spawn_dispatcher;
use impactgraph_viewer::query::{EnvToken, QueryController, SearchMode};
use impactgraph_viewer::util::config;
use serde::Serialize;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // stdout carries the JSON report
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Serialize)]
struct Report<'a> {
    mode: SearchMode,
    submit_label: &'static str,
    placeholder: &'static str,
    query_text: &'a str,
    editor_open: bool,
    show_editor_toggle: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    empty_prompt: Option<(&'static str, &'static str)>,
    graph: Decorated,
}

fn main() -> Result<()> {
    init_tracing();
    let args = parse_args()?;

    let mut cfg = config::load_or_default();
    cfg.apply_env();
    if let Some(url) = args.api_url.clone() {
        cfg.api.base_url = Some(url);
    }
    if let Some(ctx) = args.context.clone() {
        cfg.api.context_id = Some(ctx);
    }

    if args.action == Action::InitConfig {
        config::save(&cfg)?;
        tracing::info!("viewer config written");
        return Ok(());
    }

    let (done_tx, done_rx) = crossbeam_channel::unbounded();
    let dispatcher = spawn_dispatcher(&cfg.api, done_tx)?;
    let mut ctl = QueryController::new(
        cfg.api.clone(),
        Box::new(dispatcher),
        Box::new(EnvToken::new(cfg.token_env.clone())),
        Box::new(LayeredLayout::new(cfg.layout)),
    );
    ctl.graph.direction = cfg.direction;
    ctl.graph.timeline.min_range_days = cfg.timeline_min_range_days;
    ctl.graph.set_slider(args.slider.unwrap_or(cfg.timeline_slider));
    ctl.set_mode(args.mode.unwrap_or(cfg.default_mode));

    let sent = match &args.action {
        Action::Search(term) => {
            ctl.search_term = term.clone();
            ctl.submit()
        }
        Action::Run(query) => {
            ctl.set_query_text(query.clone());
            ctl.run_query()
        }
        Action::InitConfig => false,
    };
    if !sent {
        anyhow::bail!(
            "nothing sent: set {} (or --api-url) and {}",
            config::ENV_API_URL,
            cfg.token_env
        );
    }

    while ctl.is_loading() {
        let completion = done_rx
            .recv()
            .context("network thread exited before answering")?;
        ctl.apply(completion);
    }

    if let Some(err) = ctl.error() {
        anyhow::bail!("{err}");
    }

    if let Some(id) = &args.hover {
        ctl.graph.hover_enter(id);
    }

    let graph = ctl.graph.decorate(Utc::now());
    let mode = ctl.mode();
    let report = Report {
        mode,
        submit_label: mode.submit_label(),
        placeholder: mode.placeholder(),
        query_text: ctl.query_text(),
        editor_open: ctl.editor_open(),
        show_editor_toggle: ctl.show_editor_toggle(),
        empty_prompt: graph.nodes.is_empty().then(|| mode.empty_prompt()),
        graph,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize report")?
    );
    Ok(())
}
