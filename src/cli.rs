use std::env;
use std::path::PathBuf;

pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub payload: Option<PathBuf>,
    pub plan_out: Option<PathBuf>,
    pub json: bool,
    pub serve: bool,
    pub port: Option<u16>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut payload = None;
    let mut plan_out = None;
    let mut json = false;
    let mut serve = false;
    let mut port = None;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--payload" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --payload (expected a JSON file path)",
                )?;
                if payload.replace(PathBuf::from(path)).is_some() {
                    return Err("--payload provided more than once".to_string());
                }
            }
            "--plan-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --plan-out (expected a file path)")?;
                if plan_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--plan-out provided more than once".to_string());
                }
            }
            "--json" => json = true,
            "--serve" => serve = true,
            "--port" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let parsed = value
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{value}\" is not a valid u16"))?;
                if port.replace(parsed).is_some() {
                    return Err("--port provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if payload.is_none() && !serve {
        return Err("nothing to do: pass `--payload <path>`, `--serve`, or both".to_string());
    }
    if plan_out.is_some() && payload.is_none() {
        return Err("`--plan-out` requires `--payload`".to_string());
    }
    if !cfg!(feature = "api") && serve {
        return Err("`--serve` requires the `api` feature".to_string());
    }

    Ok(CliOptions {
        config,
        payload,
        plan_out,
        json,
        serve,
        port,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("merit-dispatch: merit-order production planning for wind and thermal fleets");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  merit-dispatch [--config <path>] [--payload <path> [--plan-out <path>] [--json]] [--serve [--port <u16>]]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>     Load service settings from a TOML file");
    eprintln!("  --payload <path>    Compute the plan for a JSON payload and print it");
    eprintln!("  --plan-out <path>   Also write the plan as CSV");
    eprintln!("  --json              Print the plan as response JSON instead of a table");
    eprintln!("  --serve             Start the REST API (POST /productionplan)");
    eprintln!("  --port <u16>        API port, overrides the config file");
    eprintln!("  --help              Show this help message");
}
