use lht::HashMap;

use std::{sync::Arc, thread};

fn main() {
    const NUM_THREADS: usize = 16;
    const OPS_PER_THREAD: usize = 1 << 20;
    const KEY_RANGE: i64 = 1 << 10;
    const CAPACITY: usize = 64;

    let map = Arc::new(HashMap::with_capacity(CAPACITY).unwrap());

    let threads: Vec<_> = (0..NUM_THREADS)
        .map(|i| {
            let map = map.clone();

            thread::spawn(move || {
                let mut state = (i as u64 + 1) * 0x9e37_79b9_7f4a_7c15;

                for _ in 0..OPS_PER_THREAD {
                    state = state
                        .wrapping_mul(6364136223846793005)
                        .wrapping_add(1442695040888963407);
                    let key = ((state >> 33) % KEY_RANGE as u64) as i64;

                    match state % 4 {
                        0 => {
                            map.insert(key, key * 2);
                        }
                        1 => {
                            map.remove(key);
                        }
                        _ => {
                            if let Some(value) = map.get(key) {
                                assert_eq!(value, key * 2);
                            }
                        }
                    }
                }
            })
        })
        .collect();

    for result in threads.into_iter().map(|t| t.join()) {
        assert!(result.is_ok());
    }

    assert_eq!(map.op_count(), NUM_THREADS * OPS_PER_THREAD);

    let live = (0..KEY_RANGE).filter(|&key| map.get(key).is_some()).count();
    assert_eq!(map.len(), live);

    println!(
        "{} threads x {} ops: {} live keys across {} buckets, {} operations total",
        NUM_THREADS,
        OPS_PER_THREAD,
        map.len(),
        map.capacity(),
        map.op_count()
    );
}
