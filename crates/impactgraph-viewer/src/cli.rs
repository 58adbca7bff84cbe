use anyhow::Result;
use impactgraph_viewer::graph::timeline::SLIDER_MAX;
use impactgraph_viewer::query::SearchMode;
use std::ffi::OsString;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Trace or ask with the term, depending on mode.
    Search(String),
    /// Execute the text as a raw graph query.
    Run(String),
    /// Write the effective config file and exit.
    InitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub mode: Option<SearchMode>,
    pub slider: Option<u8>,
    pub hover: Option<String>,
    pub api_url: Option<String>,
    pub context: Option<String>,
    pub action: Action,
}

pub const USAGE: &str = "usage: impactgraph [--ask] [--slider 0-100] [--hover NODE_ID] \
[--api-url URL] [--context ID] [--run] <term | query>\n       impactgraph --init-config";

pub fn parse_args() -> Result<CliArgs> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let mut mode = None;
    let mut slider = None;
    let mut hover = None;
    let mut api_url = None;
    let mut context = None;
    let mut run = false;
    let mut init_config = false;
    let mut words: Vec<String> = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--ask" {
            mode = Some(SearchMode::Ask);
        } else if arg == "--run" {
            run = true;
        } else if arg == "--init-config" {
            init_config = true;
        } else if arg == "--slider" {
            let Some(value) = args.next() else {
                anyhow::bail!("--slider expects a value between 0 and {SLIDER_MAX}");
            };
            let value = value.to_string_lossy();
            let parsed: u8 = value
                .parse()
                .ok()
                .filter(|v| *v <= SLIDER_MAX)
                .ok_or_else(|| anyhow::anyhow!("invalid slider value: {value} (expected 0-{SLIDER_MAX})"))?;
            slider = Some(parsed);
        } else if arg == "--hover" {
            let Some(id) = args.next() else {
                anyhow::bail!("--hover expects a node id");
            };
            hover = Some(id.to_string_lossy().into_owned());
        } else if arg == "--api-url" {
            let Some(url) = args.next() else {
                anyhow::bail!("--api-url expects a URL");
            };
            api_url = Some(url.to_string_lossy().into_owned());
        } else if arg == "--context" {
            let Some(id) = args.next() else {
                anyhow::bail!("--context expects an id");
            };
            context = Some(id.to_string_lossy().into_owned());
        } else if arg.to_string_lossy().starts_with("--") {
            anyhow::bail!("unknown argument: {:?}", arg);
        } else {
            words.push(arg.to_string_lossy().into_owned());
        }
    }

    let text = words.join(" ");
    let action = if init_config {
        Action::InitConfig
    } else if text.trim().is_empty() {
        anyhow::bail!("missing search term\n{USAGE}");
    } else if run {
        if mode.is_some() {
            anyhow::bail!("--run and --ask are mutually exclusive");
        }
        Action::Run(text)
    } else {
        Action::Search(text)
    };

    Ok(CliArgs {
        mode,
        slider,
        hover,
        api_url,
        context,
        action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn plain_term_is_a_standard_search() {
        let cli = parse_args_from(args(&["Account.Status"])).expect("parsed");
        assert_eq!(cli.mode, None);
        assert_eq!(cli.action, Action::Search("Account.Status".into()));
    }

    #[test]
    fn ask_joins_remaining_words() {
        let cli = parse_args_from(args(&[
            "--ask", "--slider", "40", "show", "critical", "apex",
        ]))
        .expect("parsed");
        assert_eq!(cli.mode, Some(SearchMode::Ask));
        assert_eq!(cli.slider, Some(40));
        assert_eq!(cli.action, Action::Search("show critical apex".into()));
    }

    #[test]
    fn run_takes_query_text() {
        let cli = parse_args_from(args(&[
            "--run",
            "--hover",
            "Account.Status",
            "MATCH (n) RETURN n",
        ]))
        .expect("parsed");
        assert_eq!(cli.hover.as_deref(), Some("Account.Status"));
        assert_eq!(cli.action, Action::Run("MATCH (n) RETURN n".into()));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args_from(args(&["--slider", "101", "x"])).is_err());
        assert!(parse_args_from(args(&["--slider"])).is_err());
        assert!(parse_args_from(args(&["--bogus", "x"])).is_err());
        assert!(parse_args_from(args(&["   "])).is_err());
        assert!(parse_args_from(args(&["--run", "--ask", "x"])).is_err());
    }

    #[test]
    fn init_config_needs_no_term() {
        let cli = parse_args_from(args(&["--init-config", "--api-url", "http://x"])).expect("parsed");
        assert_eq!(cli.action, Action::InitConfig);
        assert_eq!(cli.api_url.as_deref(), Some("http://x"));
    }
}
