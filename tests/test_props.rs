use std::io;

use bounded_pool::{Builder, ConfigError, Pool};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Get,
    Put,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Get), Just(Op::Put)]
}

proptest! {
    #[test]
    fn validation_follows_rules(capacity in -4i64..24, floor in -4i64..28, with_factory: bool) {
        let mut builder = Builder::<u8>::new();
        builder.capacity(capacity).floor(floor);
        if with_factory {
            builder.factory(|| Ok::<_, io::Error>(0));
        }
        let result = builder.config();

        let expected = if capacity <= 0 {
            Err(ConfigError::InvalidCapacity(capacity))
        } else if floor < 0 {
            Err(ConfigError::InvalidFloor(floor))
        } else if floor > capacity {
            Err(ConfigError::FloorExceedsCapacity { floor, capacity })
        } else if floor > 0 && !with_factory {
            Err(ConfigError::MissingFactory)
        } else {
            Ok((capacity as usize, floor as usize))
        };
        prop_assert_eq!(result.map(|c| (c.capacity(), c.floor())), expected);
    }

    #[test]
    fn available_stays_within_capacity(
        capacity in 1i64..8,
        fill in 0i64..8,
        ops in proptest::collection::vec(op(), 0..64),
    ) {
        let floor = fill.min(capacity);
        let pool: Pool<u8> = Builder::new()
            .capacity(capacity)
            .floor(floor)
            .factory(|| Ok::<_, io::Error>(0))
            .build()
            .unwrap();
        let capacity = capacity as usize;
        let mut model = floor as usize;
        let mut held = Vec::new();

        for op in ops {
            match op {
                Op::Get => match pool.try_get().unwrap() {
                    Some(item) => {
                        prop_assert!(model > 0);
                        model -= 1;
                        held.push(item);
                    }
                    None => {
                        prop_assert_eq!(model, 0);
                    }
                },
                Op::Put => {
                    let item = held.pop().unwrap_or_default();
                    match pool.try_put(item) {
                        Ok(()) => model += 1,
                        Err(err) => {
                            prop_assert!(err.is_full());
                            prop_assert_eq!(model, capacity);
                        }
                    }
                }
            }
            prop_assert_eq!(pool.available(), model);
            prop_assert!(pool.available() <= capacity);
        }
    }
}
