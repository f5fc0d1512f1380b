//! spillbuf CLI: drive the demo callees through the buffer protocol.

#![forbid(unsafe_code)]

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use spillbuf_core::config::SpillConfig;
use spillbuf_host::{DemoLib, Symbols};

#[derive(Parser)]
#[command(name = "spillbuf")]
#[command(about = "Length-delimited FFI buffers with temp-file spill", long_about = None)]
struct Cli {
    /// Spill directory (overrides SPILLBUF_SPILL_DIR)
    #[arg(long, global = true)]
    spill_dir: Option<PathBuf>,

    /// Cap on caller-side buffer bytes (overrides SPILLBUF_MEM_CAP_BYTES)
    #[arg(long, global = true)]
    memory_cap: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference consumer sequence against the linked callees
    Demo {
        /// Seconds for the asynchronous sleep step
        #[arg(long, default_value_t = 2)]
        sleep_secs: i32,
    },

    /// Upper-case a string
    Upper {
        text: String,
    },

    /// Drop top-level keys whose value equals DISALLOWED
    Filter {
        /// JSON object, or `-` to read it from stdin
        json: String,

        disallowed: String,
    },

    /// Base64-encode a string
    Base64 {
        text: String,
    },

    /// Print the resolved configuration as JSON
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = SpillConfig::from_env();
    apply_overrides(&mut config, cli.spill_dir, cli.memory_cap);
    // The callees configure themselves from the environment on first use.
    export_config(&config);

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Demo { sleep_secs } => run_demo(&config, sleep_secs),
        Commands::Upper { text } => {
            lib(&config).to_upper(&text).map(|s| println!("{s}")).map_err(Into::into)
        }
        Commands::Filter { json, disallowed } => run_filter(&config, &json, &disallowed),
        Commands::Base64 { text } => lib(&config)
            .base64_encode(&text)
            .map(|s| println!("{s}"))
            .map_err(Into::into),
        Commands::Config => serde_json::to_string_pretty(&config)
            .map(|s| println!("{s}"))
            .map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn lib(config: &SpillConfig) -> DemoLib {
    DemoLib::new(Symbols::linked(), config)
}

fn apply_overrides(cfg: &mut SpillConfig, spill_dir: Option<PathBuf>, memory_cap: Option<usize>) {
    if let Some(dir) = spill_dir {
        cfg.spill_dir = Some(dir);
    }
    if let Some(cap) = memory_cap {
        cfg.mem_cap_bytes = cap;
    }
}

fn export_config(cfg: &SpillConfig) {
    if let Some(dir) = &cfg.spill_dir {
        std::env::set_var("SPILLBUF_SPILL_DIR", dir);
    }
    std::env::set_var("SPILLBUF_SPILL_PREFIX", &cfg.spill_prefix);
}

fn run_filter(
    config: &SpillConfig,
    json: &str,
    disallowed: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let value = parse_json_arg(json)?;
    let filtered = lib(config).filter_json(&value, disallowed)?;
    println!("{}", serde_json::to_string(&filtered)?);
    Ok(())
}

fn parse_json_arg(arg: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        arg.to_string()
    };
    Ok(serde_json::from_str(&text)?)
}

fn run_demo(config: &SpillConfig, sleep_secs: i32) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let lib = lib(config);

    println!("counter: {}", lib.read_counter());
    let started = lib.spawn_thread()?;
    println!("ticker: {}", if started { "started" } else { "already running" });

    println!("to_upper: {}", lib.to_upper("Initial value")?);
    println!("add_int32(1, 1): {}", lib.add_int32(&json!(1), &json!(1))?);
    println!("add_double(2.9, 2.0): {}", lib.add_double(&json!(2.9), &json!(2.0))?);
    println!("base64_encode: {}", lib.base64_encode("Test")?);
    let filtered = lib.filter_json(&json!({"a": "foo", "b": "bar"}), "foo")?;
    println!("filter_json: {}", serde_json::to_string(&filtered)?);

    runtime.block_on(async {
        let mut call = lib.sleep_async(&json!(sleep_secs))?;
        let mut poll = tokio::time::interval(Duration::from_millis(500));
        loop {
            tokio::select! {
                done = &mut call => {
                    done?;
                    break;
                }
                _ = poll.tick() => {
                    tracing::info!(counter = lib.read_counter(), "sleep in progress");
                }
            }
        }
        Ok::<(), spillbuf_core::Error>(())
    })?;

    println!("counter: {}", lib.read_counter());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_take_precedence_over_env() {
        let mut config = SpillConfig::from_lookup(|key| match key {
            "SPILLBUF_SPILL_DIR" => Some("/tmp/from-env".into()),
            "SPILLBUF_MEM_CAP_BYTES" => Some("1024".into()),
            _ => None,
        });
        assert_eq!(config.mem_cap_bytes, 1024);

        apply_overrides(&mut config, Some("/tmp/from-cli".into()), None);
        assert_eq!(config.spill_dir, Some(PathBuf::from("/tmp/from-cli")));
        assert_eq!(config.mem_cap_bytes, 1024);

        apply_overrides(&mut config, None, Some(4096));
        assert_eq!(config.mem_cap_bytes, 4096);
    }

    #[test]
    fn parses_subcommands_and_global_flags() {
        let cli = Cli::try_parse_from([
            "spillbuf",
            "filter",
            r#"{"a":"foo"}"#,
            "foo",
            "--memory-cap",
            "2048",
        ])
        .unwrap();
        assert_eq!(cli.memory_cap, Some(2048));
        assert!(matches!(cli.command, Commands::Filter { .. }));

        let cli = Cli::try_parse_from(["spillbuf", "demo"]).unwrap();
        assert!(matches!(cli.command, Commands::Demo { sleep_secs: 2 }));
    }

    #[test]
    fn json_argument_must_parse() {
        assert_eq!(parse_json_arg(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert!(parse_json_arg("{not json").is_err());
    }
}
