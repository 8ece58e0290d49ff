//! merit-dispatch entry point: CLI wiring, one-shot planning, and the API server.

use std::path::Path;
use std::process;

use anyhow::{Context, Result, bail};
use tracing::info;

use merit_dispatch::cli::{self, CliOptions};
use merit_dispatch::config::ServiceConfig;
use merit_dispatch::dispatch::{Optimizer, PlanSummary};
use merit_dispatch::io::export::export_csv;
use merit_dispatch::logging;
use merit_dispatch::payload::{Payload, plan_outputs};

/// Loads the service configuration: `--config` if given, defaults otherwise.
fn load_config(cli: &CliOptions) -> Result<ServiceConfig> {
    let mut config = match cli.config {
        Some(ref path) => ServiceConfig::from_toml_file(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        bail!("{joined}");
    }
    Ok(config)
}

/// Plans a single payload file and prints the result.
fn run_payload(cli: &CliOptions, optimizer: &Optimizer, path: &Path) -> Result<()> {
    let request = Payload::from_json_file(path)
        .and_then(Payload::into_request)
        .with_context(|| format!("failed to load payload from {}", path.display()))?;

    let plan = optimizer
        .optimize(&request)
        .with_context(|| format!("no feasible plan for {}", path.display()))?;

    if cli.json {
        let body = serde_json::to_string_pretty(&plan_outputs(&plan))
            .context("failed to serialize plan")?;
        println!("{body}");
    } else {
        println!("{plan}");
        println!("\n{}", PlanSummary::from_plan(&request, &plan));
    }

    if let Some(ref out) = cli.plan_out {
        export_csv(&plan, out)
            .with_context(|| format!("failed to write CSV to {}", out.display()))?;
        info!(path = %out.display(), "plan written");
    }

    Ok(())
}

#[cfg(feature = "api")]
fn run_server(config: &ServiceConfig, optimizer: Optimizer) -> Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server.host))?;
    let state = Arc::new(merit_dispatch::api::AppState { optimizer });

    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    rt.block_on(merit_dispatch::api::serve(state, addr))
        .with_context(|| format!("API server on {addr} failed"))
}

fn run(cli: &CliOptions) -> Result<()> {
    let config = load_config(cli)?;
    logging::init(&config.logging.filter);

    let optimizer = Optimizer::new(config.search_settings());

    if let Some(ref path) = cli.payload {
        run_payload(cli, &optimizer, path)?;
    }

    #[cfg(feature = "api")]
    if cli.serve {
        run_server(&config, optimizer)?;
    }

    Ok(())
}

fn main() {
    let cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
