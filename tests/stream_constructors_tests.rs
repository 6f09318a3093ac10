use chan_stream::{
    from_blocking_fn, from_fn, from_iter, from_map, of, Pair, Stream, StreamError, StreamState,
};
use std::collections::{BTreeMap, HashMap};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_from_iter_preserves_order() {
    let stream = from_iter(vec![3, 1, 4, 1, 5, 9, 2, 6]);
    assert_eq!(stream.label(), "from_iter");
    assert_eq!(stream.capacity(), 8);
    assert_eq!(stream.collect().await, vec![3, 1, 4, 1, 5, 9, 2, 6]);
}

#[tokio::test]
async fn test_from_iter_range() {
    let result = from_iter(0..5).collect().await;
    assert_eq!(result, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_from_iter_empty_closes_immediately() {
    let mut stream = from_iter(Vec::<u8>::new());
    assert_eq!(stream.capacity(), 1);

    let handle = stream.take_handle().unwrap();
    assert_ok!(handle.join().await);

    assert_eq!(stream.state(), StreamState::Drained);
    assert_eq!(stream.recv().await, None);
}

#[tokio::test]
async fn test_from_fn_emits_until_return() {
    let stream = from_fn(2, |out| async move {
        for word in ["alpha", "beta", "gamma"] {
            out.emit(word.to_string()).await?;
        }
        Ok(())
    });

    assert_eq!(stream.label(), "from_fn");
    assert_eq!(stream.capacity(), 2);
    assert_eq!(stream.collect().await, vec!["alpha", "beta", "gamma"]);
}

#[tokio::test]
async fn test_from_fn_zero_capacity_is_clamped() {
    let stream = from_fn(0, |out| async move {
        out.emit(7).await?;
        Ok(())
    });
    assert_eq!(stream.capacity(), 1);
    assert_eq!(stream.collect().await, vec![7]);
}

#[tokio::test]
async fn test_from_fn_error_still_closes() {
    let stream: Stream<i32> = from_fn(4, |out| async move {
        out.emit(1).await?;
        Err(StreamError::BufferFull)
    });
    assert_eq!(stream.collect().await, vec![1]);
}

#[tokio::test]
async fn test_from_fn_no_values() {
    let stream: Stream<i32> = from_fn(4, |_out| async move { Ok(()) });
    assert!(stream.collect().await.is_empty());
}

#[tokio::test]
async fn test_from_fn_panic_closes_stream_and_fails_handle() {
    let mut stream: Stream<i32> = from_fn(4, |out| async move {
        let _ = out.emit(1).await;
        panic!("generator failed");
    });
    let handle = stream.take_handle().unwrap();

    assert_eq!(stream.collect().await, vec![1]);
    assert!(matches!(
        handle.join().await,
        Err(StreamError::StageFailed(_))
    ));
}

#[tokio::test]
async fn test_from_blocking_fn() {
    let stream = from_blocking_fn(1, |out| {
        for i in 0..10 {
            out.blocking_emit(i * i)?;
        }
        Ok(())
    });

    assert_eq!(stream.label(), "from_blocking_fn");
    let result = stream.collect().await;
    assert_eq!(result, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
}

#[tokio::test]
async fn test_from_map_emits_every_entry_once() {
    let mut map = HashMap::new();
    map.insert("x", 1);
    map.insert("y", 2);

    let stream = from_map(map);
    assert_eq!(stream.label(), "from_map");
    assert_eq!(stream.capacity(), 2);

    let mut pairs = stream.collect().await;
    pairs.sort();
    assert_eq!(pairs, vec![Pair::new("x", 1), Pair::new("y", 2)]);
}

#[tokio::test]
async fn test_from_map_follows_container_order() {
    let map: BTreeMap<u32, &str> = [(3, "c"), (1, "a"), (2, "b")].into_iter().collect();
    let keys: Vec<u32> = from_map(map).map(|pair| pair.key).collect().await;
    assert_eq!(keys, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_from_map_empty() {
    let map: HashMap<String, i32> = HashMap::new();
    assert!(from_map(map).collect().await.is_empty());
}

#[test]
fn test_pair_conversions() {
    let pair: Pair<&str, i32> = ("k", 9).into();
    assert_eq!(pair.key, "k");
    assert_eq!(pair.value, 9);

    let (key, value): (&str, i32) = pair.into();
    assert_eq!((key, value), ("k", 9));
}

#[test]
fn test_pair_serde() {
    let pair = Pair::new("answer".to_string(), 42);
    let json = serde_json::to_string(&pair).unwrap();
    assert_eq!(json, r#"{"key":"answer","value":42}"#);

    let back: Pair<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, pair);
}

#[tokio::test]
async fn test_of_macro() {
    assert_eq!(of![1, 2, 3].collect().await, vec![1, 2, 3]);
    assert_eq!(of!["a", "b",].collect().await, vec!["a", "b"]);

    let empty: Stream<i32> = of![];
    assert!(empty.collect().await.is_empty());
}

#[tokio::test]
async fn test_emit_after_consumer_dropped() {
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    let stream = from_fn(1, move |out| async move {
        let _ = out.emit(1).await;
        // Wait for the test to drop the stream
        while !out.is_closed() {
            tokio::task::yield_now().await;
        }
        let result = out.emit(2).await;
        let _ = done_tx.send(result);
        Ok(())
    });
    drop(stream);

    let result = done_rx.await.unwrap();
    assert_err!(&result);
    assert!(matches!(result, Err(StreamError::ConsumerGone)));
}
