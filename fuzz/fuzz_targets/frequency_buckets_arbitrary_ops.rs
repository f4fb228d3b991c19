#![no_main]

use std::collections::HashMap;

use libfuzzer_sys::fuzz_target;
use lfukit::ds::{FrequencyBuckets, SlotId};

// Arbitrary append / promote / pop / remove sequences on the frequency index,
// tracking each key's slot and frequency on the side.
fuzz_target!(|data: &[u8]| {
    let mut buckets: FrequencyBuckets<u8> = FrequencyBuckets::new();
    let mut live: HashMap<u8, (SlotId, u64)> = HashMap::new();

    for chunk in data.chunks_exact(2) {
        let key = chunk[1];
        match chunk[0] % 6 {
            0 => {
                if !live.contains_key(&key) {
                    buckets.ensure_bucket(1);
                    let slot = buckets.append_newest(1, key);
                    live.insert(key, (slot, 1));
                }
            },
            1 => {
                if let Some((slot, freq)) = live.get_mut(&key) {
                    buckets.ensure_bucket(*freq + 1);
                    buckets.detach(*freq, *slot);
                    buckets.attach_newest(*freq + 1, *slot);
                    *freq += 1;
                }
            },
            2 => {
                if let Some(freq) = buckets.min_frequency() {
                    let popped = buckets.pop_oldest(freq);
                    let (_, recorded) = live.remove(&popped).expect("popped unknown key");
                    assert_eq!(recorded, freq);
                }
            },
            3 => {
                if let Some((slot, freq)) = live.remove(&key) {
                    assert_eq!(buckets.remove(freq, slot), key);
                }
            },
            4 => {
                if let Some((slot, freq)) = live.get(&key) {
                    buckets.requeue_newest(*freq, *slot);
                }
            },
            5 => {
                buckets.clear();
                live.clear();
            },
            _ => unreachable!(),
        }

        buckets.debug_validate_invariants();
        assert_eq!(buckets.len(), live.len());
        let expected_min = live.values().map(|(_, freq)| *freq).min();
        assert_eq!(buckets.min_frequency(), expected_min);
    }
});
