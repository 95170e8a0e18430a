//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check memoization, key derivation and merge behavior over
//! generated inputs.

use proptest::prelude::*;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde_json::json;

use crate::cache::{CacheEntry, CacheKey, CallArgs, EntryStore, MemoCache};
use crate::config::CacheOptions;
use crate::persist::{merge_snapshot, Snapshot};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates argument text without delimiter characters
fn arg_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{0,16}"
}

fn args_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arg_strategy(), 0..5)
}

fn kwargs_strategy() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::hash_map("[a-z]{1,8}", any::<i64>(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

/// Operations applied to a memory-only cache
#[derive(Debug, Clone)]
enum CacheOp {
    Get { arg: u8 },
    Invalidate { arg: u8 },
    Flush,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (0u8..8).prop_map(|arg| CacheOp::Get { arg }),
        2 => (0u8..8).prop_map(|arg| CacheOp::Invalidate { arg }),
        1 => Just(CacheOp::Flush),
    ]
}

fn positional(args: &[String]) -> CallArgs {
    args.iter().fold(CallArgs::new(), |call, a| call.arg(a))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Repeated gets within the TTL compute once and return the first result.
    #[test]
    fn prop_idempotent_hit(args in args_strategy(), value in any::<i64>(), repeats in 1usize..10) {
        let mut cache = MemoCache::new(CacheOptions::new("prop").with_ttl(TEST_TTL)).unwrap();
        let calls = Cell::new(0);
        let call_args = positional(&args);

        for _ in 0..repeats {
            let got: i64 = cache
                .get("target", &call_args, || {
                    calls.set(calls.get() + 1);
                    value
                })
                .unwrap();
            prop_assert_eq!(got, value);
        }
        prop_assert_eq!(calls.get(), 1);
    }

    // Target computations match a model of which keys are cached.
    #[test]
    fn prop_computations_follow_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = MemoCache::new(CacheOptions::new("prop").with_ttl(TEST_TTL)).unwrap();
        let mut model: HashSet<u8> = HashSet::new();
        let mut expected_computations = 0u64;
        let mut expected_hits = 0u64;

        for op in ops {
            match op {
                CacheOp::Get { arg } => {
                    let got: u16 = cache
                        .get("square", &CallArgs::new().arg(&arg), || u16::from(arg) * u16::from(arg))
                        .unwrap();
                    prop_assert_eq!(got, u16::from(arg) * u16::from(arg));
                    if model.insert(arg) {
                        expected_computations += 1;
                    } else {
                        expected_hits += 1;
                    }
                }
                CacheOp::Invalidate { arg } => {
                    let removed = cache.invalidate("square", &CallArgs::new().arg(&arg)).unwrap();
                    prop_assert_eq!(removed, model.remove(&arg));
                }
                CacheOp::Flush => {
                    cache.flush().unwrap();
                    model.clear();
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.computations, expected_computations);
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.total_entries, model.len());
    }

    // Keyword argument order never changes the key.
    #[test]
    fn prop_keyword_order_irrelevant(kwargs in kwargs_strategy()) {
        let forward = kwargs.iter().fold(CallArgs::new(), |c, (k, v)| c.kwarg(k.clone(), v));
        let backward = kwargs.iter().rev().fold(CallArgs::new(), |c, (k, v)| c.kwarg(k.clone(), v));

        prop_assert_eq!(
            CacheKey::derive("f", &forward).unwrap(),
            CacheKey::derive("f", &backward).unwrap()
        );
    }

    // Distinct positional argument lists yield distinct keys.
    #[test]
    fn prop_positional_args_distinguish(a in args_strategy(), b in args_strategy()) {
        prop_assume!(a != b);
        prop_assert_ne!(
            CacheKey::derive("f", &positional(&a)).unwrap(),
            CacheKey::derive("f", &positional(&b)).unwrap()
        );
    }

    // After a merge each key carries the later of the local and the live incoming expiration.
    #[test]
    fn prop_merge_keeps_latest_expiration(
        local in prop::collection::hash_map(0u8..16, -50i64..50, 0..12),
        incoming in prop::collection::hash_map(0u8..16, -50i64..50, 0..12),
    ) {
        let now = Utc::now();
        let at = |offset: i64| now + TimeDelta::seconds(offset);

        let mut store = EntryStore::new();
        for (key, offset) in &local {
            store.insert(
                CacheKey::from(key.to_string().as_str()),
                CacheEntry { value: json!("local"), expires_at: at(*offset) },
            );
        }

        let mut snapshot = Snapshot::default();
        for (key, offset) in &incoming {
            let key = CacheKey::from(key.to_string().as_str());
            snapshot.items.insert(key.clone(), json!("incoming"));
            snapshot.expirations.insert(key, at(*offset));
        }

        merge_snapshot(&mut store, snapshot, now);

        let mut expected: HashMap<u8, i64> = local.clone();
        for (key, offset) in &incoming {
            if *offset <= 0 {
                continue;
            }
            let entry = expected.entry(*key).or_insert(*offset);
            *entry = (*entry).max(*offset);
        }

        prop_assert_eq!(store.len(), expected.len());
        for (key, offset) in expected {
            let entry = store.peek(&CacheKey::from(key.to_string().as_str())).unwrap();
            prop_assert_eq!(entry.expires_at, at(offset));
        }
    }
}
