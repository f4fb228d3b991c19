#![no_main]

use libfuzzer_sys::fuzz_target;
use lfukit::LfuCache;

// Arbitrary get / put / pop_lfu / clear sequences on a small cache.
// The first byte picks the capacity, including 0.
fuzz_target!(|data: &[u8]| {
    let Some((&capacity, ops)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(capacity % 16);
    let mut cache: LfuCache<u8, u32> = LfuCache::new(capacity);

    for (step, chunk) in ops.chunks_exact(2).enumerate() {
        let key = chunk[1];
        match chunk[0] % 8 {
            0..=2 => {
                let before = cache.frequency(&key);
                let hit = cache.get(&key).is_some();
                assert_eq!(hit, before.is_some());
                if let Some(freq) = before {
                    assert_eq!(cache.frequency(&key), Some(freq.saturating_add(1)));
                }
            },
            3..=5 => {
                cache.put(key, step as u32);
                if capacity == 0 {
                    assert!(cache.is_empty());
                } else {
                    assert_eq!(cache.peek(&key), Some(&(step as u32)));
                }
            },
            6 => {
                let expected = cache.peek_lfu().map(|(k, v)| (*k, *v));
                assert_eq!(cache.pop_lfu(), expected);
            },
            7 => cache.clear(),
            _ => unreachable!(),
        }

        assert!(cache.len() <= capacity);
        cache.check_invariants().expect("cache invariants violated");
    }
});
