//! Feed Reader - dump, group or clear the records under a prefix
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin feed_reader                       # print every record under INPUT_PREFIX
//! cargo run --bin feed_reader -- --prefix algos     # another prefix
//! cargo run --bin feed_reader -- --group instrument # grouped series as JSON
//! cargo run --bin feed_reader -- --clear            # purge the prefix
//! ```
//!
//! ## Environment Variables
//!
//! - REDIS_URL - Redis connection URL (default: redis://127.0.0.1:6379/0)
//! - INPUT_PREFIX - Prefix read when --prefix is absent (default: prices)
//! - CONFIG_DIR - Directory of JSON documents printed alongside groups (default: config)
//! - RUST_LOG - Logging level (optional, default: info)

use std::env;
use std::sync::Arc;
use tickstore::config_docs::load_config_dir;
use tickstore::query::group_records;
use tickstore::{RecordClient, RedisStore, StoreConfig};

#[derive(Debug, PartialEq)]
enum Mode {
    Print,
    Group(String),
    Clear,
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|x| x == flag)
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}

fn parse_mode_from_args(args: &[String]) -> Mode {
    if args.contains(&"--clear".to_string()) {
        return Mode::Clear;
    }
    if args.contains(&"--group".to_string()) {
        return Mode::Group(arg_value(args, "--group").unwrap_or_else(|| "instrument".to_string()));
    }
    Mode::Print
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = StoreConfig::from_env()?;
    let args: Vec<String> = env::args().collect();
    let prefix = arg_value(&args, "--prefix").unwrap_or_else(|| config.input_prefix.clone());
    let mode = parse_mode_from_args(&args);

    log::info!("🚀 Starting Feed Reader");
    log::info!("   Redis: {}", config.redis_url);
    log::info!("   Prefix: {}", prefix);
    log::info!("   Mode: {:?}", mode);

    let store = Arc::new(RedisStore::connect(&config.redis_url).await?);
    let mut client = RecordClient::with_ttl(store, config.ttl_secs);

    match mode {
        Mode::Print => {
            let records = client.read_all(&prefix).await?;
            for record in &records {
                println!("{}", record.to_json()?);
            }
            log::info!("✅ Read {} records", records.len());
        }
        Mode::Group(field) => {
            let records = client.read_all(&prefix).await?;
            let grouped = group_records(records, &field);
            let configs = load_config_dir(&config.config_dir);
            let body = serde_json::json!({
                "instruments": grouped,
                "configs": configs,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Mode::Clear => {
            let report = client.clear(&prefix).await;
            log::info!(
                "✅ Cleared prefix={}: scanned={} deleted={} fallback_chunks={} failed={}",
                prefix,
                report.scanned,
                report.deleted,
                report.fallback_chunks,
                report.failed_keys.len()
            );
            if !report.is_complete() {
                log::warn!("⚠️  Purge of {} was incomplete", prefix);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode_from_args(&args(&["feed_reader"])), Mode::Print);
        assert_eq!(parse_mode_from_args(&args(&["feed_reader", "--clear"])), Mode::Clear);
        assert_eq!(
            parse_mode_from_args(&args(&["feed_reader", "--group", "algo"])),
            Mode::Group("algo".to_string())
        );
        assert_eq!(
            arg_value(&args(&["feed_reader", "--prefix", "algos"]), "--prefix"),
            Some("algos".to_string())
        );
    }
}
