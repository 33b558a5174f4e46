//! Movement Watch - stream new price records and track rolling movement
//!
//! Seeds one `TimeBasedMovement` per instrument from the records already in
//! the store, then follows new records as they arrive. Every update is
//! logged and written back under OUTPUT_PREFIX.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin movement_watch
//! ```
//!
//! ## Environment Variables
//!
//! - REDIS_URL - Redis connection URL (default: redis://127.0.0.1:6379/0)
//! - INPUT_PREFIX - Prefix holding price records (default: prices)
//! - OUTPUT_PREFIX - Prefix for movement records (default: algos)
//! - RECORD_TTL_SECS - TTL of written movement records (default: 120)
//! - MOVEMENT_RANGE_MINUTES - Trailing window in minutes (default: 5)
//! - RUST_LOG - Logging level (optional, default: info)

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tickstore::record::{format_timestamp, to_new_york};
use tickstore::{updown, Record, RecordClient, RedisStore, StoreConfig, TimeBasedMovement};
use tokio_util::sync::CancellationToken;

const PRICE_FIELD: &str = "price";
const INSTRUMENT_FIELD: &str = "instrument";

struct MovementBook {
    range_minutes: i64,
    by_instrument: HashMap<String, TimeBasedMovement>,
}

impl MovementBook {
    fn new(range_minutes: i64) -> Self {
        Self {
            range_minutes,
            by_instrument: HashMap::new(),
        }
    }

    /// Feed one record; returns (instrument, movement %) when it carried a price
    fn observe(&mut self, record: &Record) -> Option<(String, f64)> {
        let timestamp = record.parsed_timestamp()?;
        let price = record.get_f64(PRICE_FIELD)?;
        let instrument = record
            .get(INSTRUMENT_FIELD)
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let range_minutes = self.range_minutes;
        let movement = self
            .by_instrument
            .entry(instrument.clone())
            .or_insert_with(|| TimeBasedMovement::new(range_minutes));
        movement.add(timestamp, price);

        Some((instrument, movement.calc()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = StoreConfig::from_env()?;

    log::info!("🚀 Starting Movement Watch");
    log::info!("   Redis: {}", config.redis_url);
    log::info!("   Input prefix: {}", config.input_prefix);
    log::info!("   Output prefix: {}", config.output_prefix);
    log::info!("   Range: {} minutes", config.movement_range_minutes);

    let store = Arc::new(RedisStore::connect(&config.redis_url).await?);
    let output = RecordClient::with_ttl(store.clone(), config.ttl_secs);
    let mut input = RecordClient::with_ttl(store, config.ttl_secs);

    let mut book = MovementBook::new(config.movement_range_minutes);

    let history = input.read_all(&config.input_prefix).await?;
    for record in &history {
        book.observe(record);
    }
    log::info!("📥 Seeded movement from {} historical records", history.len());

    let cancel = CancellationToken::new();
    let mut stream = input.stream_new(config.input_prefix.clone(), cancel.clone());

    log::info!("✅ Watching for new records - press CTRL+C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("⚠️  Received CTRL+C, shutting down...");
                break;
            }
            next = stream.recv() => {
                let Some(record) = next else {
                    log::warn!("Streamer stopped unexpectedly");
                    break;
                };

                let Some((instrument, pct)) = book.observe(&record) else {
                    log::debug!("Skipping record without timestamp/price");
                    continue;
                };

                let direction = updown(pct).map(|d| d.as_str()).unwrap_or("flat");
                let local = record.timestamp().and_then(to_new_york).unwrap_or_default();
                log::info!("📈 {} moved {:.4}% over {}m ({}) at {} NY", instrument, pct, config.movement_range_minutes, direction, local);

                let movement = json!({
                    "timestamp": format_timestamp(chrono::Utc::now()),
                    "instrument": instrument,
                    "movement_pct": pct,
                    "direction": direction,
                    "range_minutes": config.movement_range_minutes,
                });
                if let Err(e) = output.write_value(&config.output_prefix, movement).await {
                    log::error!("❌ Failed to write movement record: {}", e);
                }
            }
        }
    }

    if let Some(client) = stream.stop().await {
        log::info!("🛑 Streamer stopped after seeing {} keys", client.seen_count());
    }

    Ok(())
}
