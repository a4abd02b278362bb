use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bounded_pool::{Builder, ConfigError, DEFAULT_CAPACITY, Error, Settings};

fn make_buffer() -> io::Result<Vec<u8>> {
    Ok(Vec::with_capacity(64))
}

#[test]
fn build_pool() {
    let mut builder = Builder::<Vec<u8>>::new();
    let pool = builder.capacity(10).floor(5).factory(make_buffer).build().unwrap();
    assert_eq!(pool.capacity(), 10);
    assert_eq!(pool.available(), 5);
}

#[test]
fn build_with_defaults() {
    let pool = Builder::<u32>::new().build().unwrap();
    assert_eq!(pool.capacity(), DEFAULT_CAPACITY);
    assert_eq!(pool.available(), 0);
}

#[test]
fn floor_without_capacity_sets_capacity() {
    let pool = Builder::new().floor(7).factory(make_buffer).build().unwrap();
    assert_eq!(pool.capacity(), 7);
    assert_eq!(pool.available(), 7);
}

#[test]
fn rejects_non_positive_capacity() {
    for capacity in [0, -1, -100] {
        let err = Builder::<u32>::new().capacity(capacity).config().unwrap_err();
        assert_eq!(err, ConfigError::InvalidCapacity(capacity));
    }
}

#[test]
fn rejects_negative_floor() {
    let err = Builder::<u32>::new().capacity(4).floor(-1).config().unwrap_err();
    assert_eq!(err, ConfigError::InvalidFloor(-1));
}

#[test]
fn rejects_floor_above_capacity() {
    let err = Builder::new()
        .capacity(9)
        .floor(10)
        .factory(make_buffer)
        .config()
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::FloorExceedsCapacity {
            floor: 10,
            capacity: 9
        }
    );
    assert!(err.to_string().contains("greater than"));
}

#[test]
fn rejects_floor_without_factory() {
    let err = Builder::<u32>::new().capacity(10).floor(1).build().unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::MissingFactory)));
    assert!(err.to_string().contains("factory"));
}

#[test]
fn zero_floor_needs_no_factory() {
    let config = Builder::<u32>::new().capacity(3).config().unwrap();
    assert_eq!(config.capacity(), 3);
    assert_eq!(config.floor(), 0);
}

#[test]
fn build_from_settings() {
    let mut builder = Builder::new();
    builder
        .settings(Settings {
            capacity: Some(12),
            floor: 3,
        })
        .factory(make_buffer);
    let pool = builder.build().unwrap();
    assert_eq!(pool.capacity(), 12);
    assert_eq!(pool.available(), 3);
}

#[test]
fn factory_called_once_per_floor_resource() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let pool = Builder::new()
        .capacity(8)
        .floor(6)
        .factory(move || Ok::<_, io::Error>(counter.fetch_add(1, Ordering::SeqCst)))
        .build()
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert_eq!(pool.available(), 6);
}

#[test]
fn factory_failure_tears_down_created_resources() {
    let created = AtomicUsize::new(0);
    let torn_down = Arc::new(Mutex::new(Vec::new()));
    let log = torn_down.clone();
    let err = Builder::new()
        .capacity(5)
        .floor(5)
        .factory(move || {
            let n = created.fetch_add(1, Ordering::SeqCst);
            if n == 3 {
                Err(io::Error::other("out of sockets"))
            } else {
                Ok(n)
            }
        })
        .teardown(move |n| {
            log.lock().unwrap().push(n);
            Ok::<_, io::Error>(())
        })
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::Factory(_)));
    assert_eq!(err.to_string(), "resource factory failed: out of sockets");
    assert_eq!(*torn_down.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn factory_error_wins_over_cleanup_errors() {
    let created = AtomicUsize::new(0);
    let err = Builder::new()
        .capacity(3)
        .floor(3)
        .factory(move || {
            if created.fetch_add(1, Ordering::SeqCst) == 2 {
                Err("factory exhausted")
            } else {
                Ok(())
            }
        })
        .teardown(|()| Err("cleanup failed"))
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "resource factory failed: factory exhausted");
}

#[test]
fn build_with_reset_func() {
    let pool = Builder::new()
        .capacity(2)
        .floor(2)
        .factory(|| Ok::<_, io::Error>(String::new()))
        .reset(String::clear)
        .build()
        .unwrap();
    let mut item1 = pool.get().unwrap();
    item1.push_str("hello");
    let mut item2 = pool.get().unwrap();
    item2.push_str("world");
    assert_eq!(pool.available(), 0);

    pool.put(item1).unwrap();
    assert_eq!(pool.available(), 1);
    assert_eq!(pool.get().unwrap(), "");
    drop(item2);
}

#[test]
fn builder_is_reset_after_build() {
    let mut builder = Builder::new();
    builder.capacity(3).floor(3).factory(make_buffer);
    let first = builder.build().unwrap();
    assert_eq!(first.capacity(), 3);

    let second = builder.build().unwrap();
    assert_eq!(second.capacity(), DEFAULT_CAPACITY);
    assert_eq!(second.available(), 0);
}

#[test]
fn build_sharded_spreads_capacity() {
    let pool = Builder::new()
        .capacity(100)
        .floor(40)
        .factory(make_buffer)
        .build_sharded()
        .unwrap();
    assert_eq!(pool.width(), 16);
    assert_eq!(pool.depth(), 7);
    assert!(pool.capacity() >= 100);
    assert_eq!(pool.available(), 40);
}

#[test]
fn build_sharded_rejects_unsupported_width() {
    let err = Builder::<u32>::new()
        .capacity(64)
        .build_sharded_with_width(64)
        .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::InvalidWidth(64))));
}

#[cfg(feature = "serde")]
#[test]
fn settings_from_json() {
    let settings: Settings = serde_json::from_str(r#"{ "capacity": 32, "floor": 4 }"#).unwrap();
    assert_eq!(
        settings,
        Settings {
            capacity: Some(32),
            floor: 4
        }
    );

    let partial: Settings = serde_json::from_str(r#"{ "floor": 2 }"#).unwrap();
    assert_eq!(partial.capacity, None);

    let json = serde_json::to_string(&settings).unwrap();
    assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), settings);
}

#[cfg(feature = "serde")]
#[test]
fn negative_settings_are_reported() {
    let settings: Settings = serde_json::from_str(r#"{ "capacity": 8, "floor": -3 }"#).unwrap();
    let err = Builder::<u32>::new().settings(settings).config().unwrap_err();
    assert_eq!(err, ConfigError::InvalidFloor(-3));
}
