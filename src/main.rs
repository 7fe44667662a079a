use anyhow::{bail, Context};
use clap::Parser;
use quotecard::{ClientConfig, FlowState, StderrNotifier, SubmitEvent, GENERATE_FORM_ID};
use tracing_subscriber::EnvFilter;

/// Request a generated quote card from a running backend
#[derive(Parser, Debug)]
#[command(name = "quotecard", version, about)]
struct Args {
    /// Origin serving /api/quote and /components/*
    #[arg(long, default_value = "http://127.0.0.1:5001")]
    base_url: String,

    /// Topic to write about (empty lets the backend choose)
    #[arg(short, long, default_value = "")]
    topic: String,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 30000)]
    timeout_ms: u64,

    /// Override the User-Agent header
    #[arg(long)]
    user_agent: Option<String>,

    /// Print the rendered container markup after the flow completes
    #[arg(long)]
    html: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let mut config = ClientConfig {
        base_url: args.base_url,
        timeout_ms: args.timeout_ms,
        ..Default::default()
    };
    if let Some(ua) = args.user_agent {
        config.user_agent = ua;
    }

    let mut controller =
        quotecard::new_controller(&config, StderrNotifier).context("failed to set up client")?;
    controller.topic_input().set_value(args.topic);

    let state = controller.handle_submit(&mut SubmitEvent::new(GENERATE_FORM_ID));

    if args.html {
        println!("{}", controller.container().to_html());
    }

    match state {
        FlowState::Success { img_url } => {
            println!("{}", img_url);
            Ok(())
        }
        // The notifier already printed the message
        FlowState::Error { .. } => std::process::exit(1),
        other => bail!("generate flow ended in unexpected state {:?}", other),
    }
}
