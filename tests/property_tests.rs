//! Property-based tests for multisink_logger using proptest

use multisink_logger::prelude::*;
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
    ]
}

/// JSON values without floats, which do not survive a text round trip exactly
fn any_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        ".*".prop_map(Value::String),
    ]
}

fn any_fields() -> impl Strategy<Value = Fields> {
    btree_map("[a-z_]{1,12}", any_value(), 0..8).prop_map(|map| map.into_iter().collect())
}

// ============================================================================
// Record Tests
// ============================================================================

proptest! {
    /// Test that an encoded line decodes to the same record
    #[test]
    fn test_record_json_roundtrip(
        level in any_level(),
        message in ".*",
        fields in any_fields(),
    ) {
        let record = Record::with_fields(level, message, fields);
        let line = record.to_json_line().unwrap();
        let decoded = Record::from_json_line(&line).unwrap();
        prop_assert_eq!(decoded, record);
    }

    /// Test that every record is exactly one line, whatever the message holds
    #[test]
    fn test_record_is_single_line(message in ".*", fields in any_fields()) {
        let record = Record::with_fields(LogLevel::Info, message, fields);
        let line = record.to_json_line().unwrap();
        prop_assert!(line.ends_with('\n'));
        prop_assert_eq!(line.matches('\n').count(), 1);
    }

    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }
}

// ============================================================================
// Context Tests
// ============================================================================

proptest! {
    /// Test that siblings derived from one parent never see each other's keys
    #[test]
    fn test_context_isolation(
        base in any_fields(),
        key in "[a-z]{1,8}",
        left in any_value(),
        right in any_value(),
    ) {
        let parent = LogContext::from(base.clone());
        let a = parent.attach(key.clone(), left.clone());
        let b = parent.attach(key.clone(), right.clone());

        prop_assert_eq!(parent.fields(), &base);
        prop_assert_eq!(a.read(&key), Some(&left));
        prop_assert_eq!(b.read(&key), Some(&right));
        prop_assert_eq!(a.len(), b.len());
    }

    /// Test that later duplicates win in attach_all
    #[test]
    fn test_attach_all_last_write_wins(key in "[a-z]{1,8}", first in any::<i64>(), last in any::<i64>()) {
        let ctx = LogContext::new().attach_all([(key.clone(), first), (key.clone(), last)]);
        prop_assert_eq!(ctx.read(&key), Some(&Value::from(last)));
        prop_assert_eq!(ctx.len(), 1);
    }
}

// ============================================================================
// Decorator Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Test that the inner sink sees exactly the allowed records, in order
    #[test]
    fn test_filter_forwards_exactly_allowed(
        allowed in vec(any_level(), 0..3),
        levels in vec(any_level(), 0..30),
    ) {
        let memory = Arc::new(MemorySink::new());
        let filter = FilterSink::new(memory.clone(), allowed.iter().copied());
        let allowed: HashSet<LogLevel> = allowed.into_iter().collect();
        let ctx = LogContext::new();

        for (i, level) in levels.iter().enumerate() {
            filter.write(&Record::new(*level, format!("{}", i), &ctx)).unwrap();
        }

        let expected: Vec<String> = levels
            .iter()
            .enumerate()
            .filter(|(_, level)| allowed.contains(level))
            .map(|(i, _)| i.to_string())
            .collect();
        let got: Vec<String> = memory.records().iter().map(|r| r.message().to_string()).collect();
        prop_assert_eq!(got, expected);
    }

    /// Test that only whole batches reach the inner sink before a flush
    #[test]
    fn test_buffer_flushes_whole_batches(capacity in 1usize..10, writes in 0usize..40) {
        let memory = Arc::new(MemorySink::new());
        let buffered = BufferedSink::new(memory.clone(), capacity, Duration::from_secs(60)).unwrap();
        let ctx = LogContext::new();

        for i in 0..writes {
            buffered.write(&Record::new(LogLevel::Info, i.to_string(), &ctx)).unwrap();
            prop_assert!(buffered.pending() < capacity);
        }

        prop_assert_eq!(memory.len(), writes / capacity * capacity);
        prop_assert_eq!(buffered.pending(), writes % capacity);

        buffered.flush().unwrap();
        let got: Vec<String> = memory.records().iter().map(|r| r.message().to_string()).collect();
        let expected: Vec<String> = (0..writes).map(|i| i.to_string()).collect();
        prop_assert_eq!(got, expected);
    }
}
