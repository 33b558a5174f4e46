//! End-to-end record flow against the in-memory backend
//!
//! Covers writer → store → bulk reader / change streamer → grouping and
//! movement, the way a consumer process wires them together.

#[cfg(test)]
mod record_flow_tests {
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tickstore::query::group_records;
    use tickstore::{MemoryStore, Record, RecordClient, TimeBasedMovement};
    use tokio_util::sync::CancellationToken;

    fn tick(ts: &str, price: f64) -> Record {
        Record::new()
            .with("instrument", "EURUSD")
            .with("timestamp", ts)
            .with("price", price)
    }

    #[tokio::test]
    async fn test_read_all_then_group() {
        let store = Arc::new(MemoryStore::new());
        let mut client = RecordClient::new(store);

        client
            .write_value(
                "prices",
                json!({"instrument": "EURUSD", "timestamp": "2024-01-01T00:01:00Z", "price": 1.12}),
            )
            .await
            .unwrap();
        client
            .write_value(
                "prices",
                json!({"instrument": "EURUSD", "timestamp": "2024-01-01T00:00:00Z", "price": 1.10}),
            )
            .await
            .unwrap();

        let records = client.read_all("prices").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(records[1].timestamp(), Some("2024-01-01T00:01:00Z"));

        let grouped = group_records(records, "instrument");
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["EURUSD"]);
        let price = grouped["EURUSD"]
            .series
            .iter()
            .find(|s| s.field == "price")
            .unwrap();
        assert_eq!(price.values, vec![Some(1.10), Some(1.12)]);
    }

    #[tokio::test]
    async fn test_clear_then_read_all_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let mut client = RecordClient::new(store);

        for minute in 0..10 {
            let ts = format!("2024-01-01T00:{:02}:00Z", minute);
            client.write("prices", &tick(&ts, 1.0 + minute as f64)).await.unwrap();
        }

        let report = client.clear("prices").await;
        assert!(report.is_complete());
        assert_eq!(report.deleted, 10);
        assert!(client.read_all("prices").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_records_are_not_read() {
        let store = Arc::new(MemoryStore::new());
        let short_lived = RecordClient::with_ttl(store.clone(), 1);
        let mut reader = RecordClient::new(store);

        short_lived.write("prices", &tick("2024-01-01T00:00:00Z", 1.0)).await.unwrap();
        assert_eq!(reader.read_all("prices").await.unwrap().len(), 1);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(reader.read_all("prices").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_independent_streamers_each_see_new_records() {
        let store = Arc::new(MemoryStore::new());
        let writer = RecordClient::new(store.clone());

        let mut first = RecordClient::new(store.clone()).stream_new("prices", CancellationToken::new());
        let mut second = RecordClient::new(store).stream_new("prices", CancellationToken::new());

        writer.write("prices", &tick("2024-01-01T00:00:00Z", 1.10)).await.unwrap();

        for stream in [&mut first, &mut second] {
            let record = tokio::time::timeout(Duration::from_secs(2), stream.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(record.get_f64("price"), Some(1.10));
        }

        // No duplicate delivery while polling keeps going
        let again = tokio::time::timeout(Duration::from_millis(350), first.recv()).await;
        assert!(again.is_err());

        first.stop().await.unwrap();
        second.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_streamed_prices_feed_movement() {
        let store = Arc::new(MemoryStore::new());
        let writer = RecordClient::new(store.clone());
        let mut stream = RecordClient::new(store).stream_new("prices", CancellationToken::new());

        writer.write("prices", &tick("2024-01-01T00:00:00Z", 100.0)).await.unwrap();
        writer.write("prices", &tick("2024-01-01T00:02:00Z", 105.0)).await.unwrap();

        let mut received = Vec::new();
        while received.len() < 2 {
            let record = tokio::time::timeout(Duration::from_secs(2), stream.recv())
                .await
                .unwrap()
                .unwrap();
            received.push(record);
        }
        stream.stop().await.unwrap();

        // Delivery order is not guaranteed, so order by timestamp first
        tickstore::feed_core::sort_by_timestamp(&mut received);

        let mut movement = TimeBasedMovement::new(5);
        for record in &received {
            movement.add(record.parsed_timestamp().unwrap(), record.get_f64("price").unwrap());
        }
        assert!((movement.calc() - 5.0).abs() < 1e-9);
    }
}
