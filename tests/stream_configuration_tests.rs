use chan_stream::{from_iter, from_iter_with_config, from_map_with_config, BufferConfig};
use std::collections::HashMap;

#[test]
fn test_default_config() {
    let config = BufferConfig::default();
    assert_eq!(config.min_capacity, 1);
    assert_eq!(config.max_capacity, 64 * 1024);
    assert_eq!(config.stage_capacity, None);
}

#[test]
fn test_capacity_for_clamps() {
    let config = BufferConfig {
        min_capacity: 4,
        max_capacity: 16,
        stage_capacity: None,
    };
    assert_eq!(config.capacity_for(0), 4);
    assert_eq!(config.capacity_for(10), 10);
    assert_eq!(config.capacity_for(1_000), 16);
    assert_eq!(config.stage_capacity_for(12), 12);
}

#[test]
fn test_capacity_never_zero() {
    let config = BufferConfig {
        min_capacity: 0,
        max_capacity: 0,
        stage_capacity: Some(0),
    };
    assert_eq!(config.capacity_for(0), 1);
    assert_eq!(config.capacity_for(50), 1);
    assert_eq!(config.stage_capacity_for(50), 1);
}

#[test]
fn test_fixed_stage_capacity() {
    let config = BufferConfig {
        stage_capacity: Some(3),
        ..BufferConfig::default()
    };
    assert_eq!(config.stage_capacity_for(1), 3);
    assert_eq!(config.stage_capacity_for(500), 3);
}

#[test]
fn test_config_from_json() {
    let config: BufferConfig = serde_json::from_str(r#"{ "max_capacity": 8 }"#).unwrap();
    assert_eq!(
        config,
        BufferConfig {
            min_capacity: 1,
            max_capacity: 8,
            stage_capacity: None,
        }
    );

    let json = serde_json::to_string(&config).unwrap();
    let back: BufferConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[tokio::test]
async fn test_large_source_with_small_buffer() {
    let config = BufferConfig {
        max_capacity: 8,
        ..BufferConfig::default()
    };
    let stream = from_iter_with_config(0..1_000, config);
    assert_eq!(stream.capacity(), 8);
    assert_eq!(stream.config(), &config);

    let stream = stream.map(|x| x * 2);
    assert_eq!(stream.capacity(), 8);

    let result = stream.collect().await;
    assert_eq!(result, (0..1_000).map(|x| x * 2).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_stage_capacity_applies_to_combinators() {
    let config = BufferConfig {
        stage_capacity: Some(2),
        ..BufferConfig::default()
    };
    let source = from_iter_with_config(0..100, config);
    assert_eq!(source.capacity(), 100);

    let filtered = source.filter(|x| x % 10 == 0);
    assert_eq!(filtered.capacity(), 2);
    assert_eq!(filtered.collect().await, vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
}

#[tokio::test]
async fn test_map_config() {
    let config = BufferConfig {
        max_capacity: 1,
        ..BufferConfig::default()
    };
    let map: HashMap<u8, u8> = (0..50).map(|i| (i, i * 2)).collect();

    let stream = from_map_with_config(map, config);
    assert_eq!(stream.capacity(), 1);

    let mut pairs: Vec<(u8, u8)> = stream.map(|pair| pair.into_tuple()).collect().await;
    pairs.sort();
    assert_eq!(pairs.len(), 50);
    assert!(pairs.iter().all(|(k, v)| *v == k * 2));
}

#[tokio::test]
async fn test_default_stream_uses_default_config() {
    let stream = from_iter(vec![1, 2, 3]);
    assert_eq!(stream.config(), &BufferConfig::default());
    stream.collect().await;
}
