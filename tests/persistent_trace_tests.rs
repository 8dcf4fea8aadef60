#![cfg(all(feature = "persistent", feature = "log"))]
//! Tests for the structural trace events emitted under the `log` feature.
//!
//! A capturing logger is installed once per test binary; each test asserts
//! that the transition it drives shows up among the captured messages.

use lambars_persistent::persistent::{PersistentHashMap, PersistentTreeSet};
use log::{Level, LevelFilter, Log, Metadata, Record};
use rstest::rstest;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, Once};

// =============================================================================
// Capturing logger
// =============================================================================

struct CapturingLogger {
    messages: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target() == "lambars_persistent" && metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.messages
                .lock()
                .expect("logger mutex poisoned")
                .push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    messages: Mutex::new(Vec::new()),
};

static INSTALL: Once = Once::new();

fn install_logger() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).expect("logger already installed");
        log::set_max_level(LevelFilter::Trace);
    });
}

fn captured(prefix: &str) -> bool {
    LOGGER
        .messages
        .lock()
        .expect("logger mutex poisoned")
        .iter()
        .any(|message| message.starts_with(prefix))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SameHash(u32);

impl Hash for SameHash {
    fn hash<H: Hasher>(&self, state: &mut H) {
        0xdead_u32.hash(state);
    }
}

// =============================================================================
// Hash map transitions
// =============================================================================

#[rstest]
fn test_promotion_and_demotion_are_traced() {
    install_logger();

    let map: PersistentHashMap<i32, i32> = (0..1000).map(|key| (key, key)).collect();
    assert!(captured("promoting bitmap node"));

    let shrunk = (0..995).fold(map, |map, key| map.remove(&key));
    assert_eq!(shrunk.len(), 5);
    assert!(captured("demoting array node"));
}

#[rstest]
fn test_collision_lifecycle_is_traced() {
    install_logger();

    let map = PersistentHashMap::new()
        .insert(SameHash(1), "one")
        .insert(SameHash(2), "two");
    assert!(captured("hash collision at"));

    let single = map.remove(&SameHash(1));
    assert_eq!(single.get(&SameHash(2)), Some(&"two"));
    assert!(captured("collision node at"));
}

// =============================================================================
// Tree set transitions
// =============================================================================

#[rstest]
fn test_rotations_are_traced() {
    install_logger();

    let ascending: PersistentTreeSet<i32> = (0..64).collect();
    let descending: PersistentTreeSet<i32> = (0..64).rev().collect();
    assert_eq!(ascending, descending);
    assert!(captured("single left rotation"));
    assert!(captured("single right rotation"));
}
