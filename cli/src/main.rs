//! waypath CLI: driving adapter for the waypath pattern engine.
//!
//! Subcommands:
//! - `match <pattern> <path>...`: print the captures of each path
//! - `explain <pattern>`: print the compiled automaton and its metadata
//! - `routes <config> <path> [--method M]`: dispatch a path through a route table
//! - `check <config>`: validate a route table builds without errors

use std::collections::BTreeMap;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use waypath::{compile, optimizer, parse, Eval, Method, Params, RouteTableConfig, Router};

#[derive(Parser)]
#[command(name = "waypath")]
#[command(about = "Compile route patterns and match paths against them", long_about = None)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match paths against a single pattern
    Match {
        pattern: String,
        #[arg(required = true)]
        paths: Vec<String>,
        /// Print every match in priority order, not only the first
        #[arg(short, long)]
        all: bool,
    },
    /// Show how a pattern compiles
    Explain { pattern: String },
    /// Dispatch a path through a route table file
    Routes {
        config: String,
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: Method,
    },
    /// Validate a route table file
    Check { config: String },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Match {
            pattern,
            paths,
            all,
        } => cmd_match(&pattern, &paths, all),
        Commands::Explain { pattern } => cmd_explain(&pattern),
        Commands::Routes {
            config,
            path,
            method,
        } => cmd_routes(&config, &path, method),
        Commands::Check { config } => cmd_check(&config),
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_match(pattern: &str, paths: &[String], all: bool) -> Result<String, String> {
    let eval = Eval::single(pattern).map_err(|e| e.to_string())?;

    let mut out = String::new();
    for path in paths {
        let mut found = false;
        for result in eval.match_all(path).take(if all { usize::MAX } else { 1 }) {
            found = true;
            out.push_str(&format!("{path}\t{}\n", params_json(&result.params)?));
        }
        if !found {
            out.push_str(&format!("{path}\t(no match)\n"));
        }
    }
    Ok(out)
}

fn cmd_explain(pattern: &str) -> Result<String, String> {
    let nodes = parse(pattern).map_err(|e| e.to_string())?;
    let states = compile(&nodes).map_err(|e| e.to_string())?;
    let paths = optimizer::get_all_paths(&states).map_err(|e| e.to_string())?;
    let eval = Eval::single(pattern).map_err(|e| e.to_string())?;

    let mut out = String::from("Nodes:\n");
    for node in &nodes {
        out.push_str(&format!("  {node}\n"));
    }

    out.push_str("\nStates:\n");
    for state in &states {
        out.push_str(&format!("  {state}\n"));
    }

    out.push_str("\nPaths:\n");
    for path in &paths {
        let kinds: Vec<String> = path.iter().map(ToString::to_string).collect();
        out.push_str(&format!("  {}\n", kinds.join(" ")));
    }

    let data = eval.data();
    let max = data
        .max_length()
        .map_or_else(|| "unbounded".to_owned(), |max| max.to_string());
    let mut ends_with: Vec<String> = data.ends_with().map(|s| format!("{s:?}")).collect();
    ends_with.sort();

    out.push_str("\nOptimized:\n");
    out.push_str(&format!("  paths:          {}\n", data.path_count()));
    out.push_str(&format!("  min length:     {}\n", data.min_length()));
    out.push_str(&format!("  max length:     {max}\n"));
    out.push_str(&format!("  only fixed:     {}\n", data.only_fixed()));
    out.push_str(&format!("  ends with:      {}\n", ends_with.join(", ")));
    out.push_str(&format!("  has underscore: {}\n", eval.has_underscore()));
    Ok(out)
}

fn cmd_routes(config_path: &str, path: &str, method: Method) -> Result<String, String> {
    let router = load_router(config_path)?;

    let mut out = String::new();
    for found in router.dispatch(method, path) {
        out.push_str(&format!(
            "{}\t{}\n",
            found.handler,
            params_json(&found.params)?
        ));
    }
    if out.is_empty() {
        out.push_str("(no match)\n");
    }
    Ok(out)
}

fn cmd_check(config_path: &str) -> Result<String, String> {
    let router = load_router(config_path)?;
    let mut out = format!("Route table valid ({} routes)\n", router.len());
    for pattern in router.patterns() {
        out.push_str(&format!("  {pattern}\n"));
    }
    Ok(out)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_router(path: &str) -> Result<Router<String>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;
    let config = parse_config(path, &content)?;
    let router = config
        .build()
        .map_err(|e| format!("route table invalid: {e}"))?;
    tracing::debug!(path, routes = router.len(), "loaded route table");
    Ok(router)
}

fn parse_config(path: &str, content: &str) -> Result<RouteTableConfig<String>, String> {
    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

/// Captures as a JSON object with sorted keys.
fn params_json(params: &Params) -> Result<String, String> {
    let sorted: BTreeMap<&String, &String> = params.iter().collect();
    serde_json::to_string(&sorted).map_err(|e| e.to_string())
}
