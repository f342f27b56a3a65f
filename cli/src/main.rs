//! routeweave CLI — load a route config and resolve URLs against it.
//!
//! Subcommands:
//! - `resolve <config> <url>... [--trace]` — resolve URLs against a config
//! - `check <config>` — validate that a config loads and composes
//! - `info` — print registered matcher type URLs

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use routeweave::{ResolvedMatch, RouteConfig, RouteTree};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "routeweave", version, about = "Resolve URLs against a routeweave route config")]
struct Cli {
    /// Log more (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one or more URLs
    Resolve {
        /// Route config (.json, otherwise YAML)
        config: String,
        /// URLs to resolve
        #[arg(required = true)]
        urls: Vec<String>,
        /// Print every candidate the resolver examined
        #[arg(long)]
        trace: bool,
    },
    /// Validate that a config loads and composes
    Check {
        /// Route config (.json, otherwise YAML)
        config: String,
    },
    /// Print registered matcher type URLs
    Info,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Resolve {
            config,
            urls,
            trace,
        } => cmd_resolve(&config, &urls, trace),
        Command::Check { config } => cmd_check(&config),
        Command::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_resolve(config_path: &str, urls: &[String], trace: bool) -> Result<(), String> {
    let tree = load_tree(config_path)?;

    let mut failed = 0;
    for url in urls {
        if trace {
            let traced = tree.resolve_with_trace(url);
            for candidate in &traced.candidates {
                println!("  {candidate}");
            }
            match &traced.result {
                Ok(m) => println!("{}", describe_match(url, m)),
                Err(e) => {
                    failed += 1;
                    println!("{url} -> error: {e}");
                }
            }
            continue;
        }

        match tree.resolve(url) {
            Ok(m) => println!("{}", describe_match(url, &m)),
            Err(e) => {
                failed += 1;
                println!("{url} -> error: {e}");
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} URL(s) did not resolve", urls.len()));
    }
    Ok(())
}

fn cmd_check(config_path: &str) -> Result<(), String> {
    let tree = load_tree(config_path)?;
    println!(
        "Config valid: {} root route(s), depth {}",
        tree.len(),
        tree.depth()
    );
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_info() -> Result<(), String> {
    let registry = build_registry();

    println!("Registered matchers:");
    for url in registry.matcher_type_urls() {
        println!("  {url}");
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry() -> routeweave::Registry {
    let builder = routeweave::RegistryBuilder::new();
    routeweave_test::register(builder).build()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_tree(path: &str) -> Result<RouteTree<Value>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;
    let config = parse_config(&content, is_json(path))?;
    build_registry()
        .load_routes(config)
        .map_err(|e| format!("config invalid: {e}"))
}

fn is_json(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse_config(content: &str, json: bool) -> Result<RouteConfig<Value>, String> {
    if json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Output
// ═══════════════════════════════════════════════════════════════════════════════

fn describe_match(input: &str, m: &ResolvedMatch<'_, Value>) -> String {
    let payload = m.payload().map_or_else(|| "(no payload)".to_owned(), Value::to_string);
    let mut out = format!("{input} -> {payload}\n  route: {}", m.route().full_path());
    if !m.params().is_empty() {
        let params: Vec<String> = m.params().iter().map(|(k, v)| format!("{k}={v}")).collect();
        out.push_str(&format!("\n  params: {}", params.join(", ")));
    }
    if !m.redirects().is_empty() {
        out.push_str(&format!("\n  redirects: {}", m.redirects().join(" -> ")));
        out.push_str(&format!("\n  url: {}", m.url()));
    }
    out
}
