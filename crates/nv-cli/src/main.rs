//! `nv` CLI — read, write and inspect NV settings files from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Store a value (file defaults to ./nv.json, or $NV_FILE)
//! nv set --type u8 age 30
//! nv set --type ip ip 192.168.0.1
//! nv set --type string-array servers a.example b.example
//! nv set --type s8 offset -5
//!
//! # Read it back
//! nv get --type u8 age
//! nv get --type str --capacity 32 name
//!
//! # Remove a key, list keys, print the whole document
//! nv delete age
//! nv keys
//! nv --file /data/nv.json dump
//!
//! # Debug logging
//! NV_LOG=debug nv get --type u8 age
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nv_core::{Capacity, NvType, NvValue, Store, StoreConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nv", version, about = "Non-volatile settings store CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// NV document path
    #[arg(short, long, env = "NV_FILE", default_value = nv_core::config::DEFAULT_PATH, global = true)]
    file: PathBuf,

    /// Skip fsync after writing
    #[arg(long, global = true)]
    no_sync: bool,

    /// Write via a temporary file and rename
    #[arg(long, global = true)]
    atomic: bool,

    /// Log at debug level (overridden by NV_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value stored under a key
    Get {
        key: String,
        /// Stored type (u8, s16, float, str, int-array, ip, mac, ...)
        #[arg(short = 't', long = "type")]
        kind: NvType,
        /// Maximum string length in bytes, or maximum number of array elements
        #[arg(short, long)]
        capacity: Option<usize>,
    },
    /// Store a value under a key
    Set {
        key: String,
        /// Stored type (u8, s16, float, str, int-array, ip, mac, ...)
        #[arg(short = 't', long = "type")]
        kind: NvType,
        /// Value; array types take one argument per element. Options must
        /// come before the values.
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        values: Vec<String>,
    },
    /// Remove a key
    Delete { key: String },
    /// List stored keys in document order
    Keys,
    /// Print the whole document
    Dump,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = Store::new(
        StoreConfig::new(&cli.file)
            .with_sync(!cli.no_sync)
            .with_atomic_rename(cli.atomic),
    );

    match cli.command {
        Commands::Get {
            key,
            kind,
            capacity,
        } => {
            let capacity = capacity.map_or(Capacity::Unbounded, Capacity::Bounded);
            let value = store
                .get(&key, kind, capacity)
                .with_context(|| format!("Failed to get '{}' from {}", key, cli.file.display()))?;
            println!("{}", value);
        }
        Commands::Set { key, kind, values } => {
            let value = parse_value(kind, &values)
                .with_context(|| format!("Invalid {} value for '{}'", kind, key))?;
            store
                .set(&key, &value)
                .with_context(|| format!("Failed to write {}", cli.file.display()))?;
        }
        Commands::Delete { key } => {
            store
                .delete(&key)
                .with_context(|| format!("Failed to write {}", cli.file.display()))?;
        }
        Commands::Keys => {
            for key in store.init().keys() {
                println!("{}", key);
            }
        }
        Commands::Dump => {
            println!("{}", store.init().to_pretty_string()?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_env("NV_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build a typed value from command-line text. Unlike decoding from a
/// document, parsing here is strict.
fn parse_value(kind: NvType, values: &[String]) -> Result<NvValue> {
    if kind.is_array() {
        return Ok(match kind {
            NvType::StringArray => NvValue::StringArray(values.to_vec()),
            NvType::IntArray => NvValue::IntArray(parse_each(values)?),
            NvType::FloatArray => NvValue::FloatArray(parse_each(values)?),
            _ => NvValue::DoubleArray(parse_each(values)?),
        });
    }

    let text = match values {
        [one] => one.as_str(),
        [] => anyhow::bail!("missing value"),
        _ => anyhow::bail!("{} takes exactly one value, got {}", kind, values.len()),
    };

    Ok(match kind {
        NvType::U8 => NvValue::U8(parse_one(text)?),
        NvType::S8 => NvValue::S8(parse_one(text)?),
        NvType::U16 => NvValue::U16(parse_one(text)?),
        NvType::S16 => NvValue::S16(parse_one(text)?),
        NvType::U32 => NvValue::U32(parse_one(text)?),
        NvType::S32 => NvValue::S32(parse_one(text)?),
        NvType::U64 => NvValue::U64(parse_one(text)?),
        NvType::S64 => NvValue::S64(parse_one(text)?),
        NvType::Float => NvValue::Float(parse_one(text)?),
        NvType::Double => NvValue::Double(parse_one(text)?),
        NvType::Ip => NvValue::Ip(parse_address(text, '.')?),
        NvType::Mac => NvValue::Mac(parse_address(text, '-')?),
        _ => NvValue::Str(text.to_string()),
    })
}

fn parse_one<T>(text: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.trim()
        .parse()
        .with_context(|| format!("'{}' is not a valid number", text))
}

fn parse_each<T>(values: &[String]) -> Result<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    values.iter().map(|v| parse_one(v)).collect()
}

/// Exactly `N` decimal fields joined by `separator`.
fn parse_address<const N: usize>(text: &str, separator: char) -> Result<[u32; N]> {
    let parts: Vec<&str> = text.trim().split(separator).collect();
    if parts.len() != N {
        anyhow::bail!(
            "'{}' must have {} fields separated by '{}'",
            text,
            N,
            separator
        );
    }
    let mut fields = [0u32; N];
    for (field, part) in fields.iter_mut().zip(parts) {
        *field = parse_one(part)?;
    }
    Ok(fields)
}
