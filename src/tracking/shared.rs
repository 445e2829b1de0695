//! Cross-thread handoff between the sampling thread and the simulation tick.
//!
//! A [`Mailbox`] is a single slot holding the freshest value: the writer
//! overwrites it, readers copy it out.  There is no queue and no backpressure,
//! so intermediate values are legitimately dropped and a reader that polls
//! twice between writes sees the same value twice.
//!
//! The lock is held only for the `Copy` of the value, never during
//! computation, so neither side can stall the other beyond a constant-time
//! critical section.  Readers share the lock and never block each other.
//!
//! No other module touches raw synchronisation primitives; the sampling
//! thread's running flag is the only other shared state.

use super::smoother::SmoothedTarget;
use crate::Point;
use bevy::prelude::*;
use std::sync::{Arc, PoisonError, RwLock};

/// Latest-wins single-slot mailbox for a `Copy` value.
///
/// Cloning the mailbox clones the handle, not the value: every clone reads
/// and writes the same slot.
#[derive(Debug, Default)]
pub struct Mailbox<T: Copy> {
    slot: Arc<RwLock<T>>,
}

impl<T: Copy> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Copy> Mailbox<T> {
    pub fn new(initial: T) -> Self {
        Self {
            slot: Arc::new(RwLock::new(initial)),
        }
    }

    /// Overwrite the slot.
    ///
    /// A poisoned lock is recovered: the value is plain `Copy` data, so a
    /// panic elsewhere can never leave it half-written.
    pub fn put(&self, value: T) {
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *guard = value;
    }

    /// Update the slot in place under the write lock.
    ///
    /// `f` must be constant-time; it runs inside the critical section.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    /// Copy the current value out.
    pub fn get(&self) -> T {
        *self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The value exchanged between the sampling thread and the simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SharedSlot {
    /// Smoothed target; `valid == false` until the first sample ever arrives.
    pub latest: SmoothedTarget,
    /// Whether the most recent sensor sample found the tracked point.
    pub detected: bool,
    /// Incremented on every publish so readers can tell a fresh sample from a
    /// coalesced repeat.
    pub sequence: u64,
}

/// Thread-safe mailbox holding the most recent smoothed tracking sample.
///
/// One writer (the sampling thread), any number of readers (simulation tick,
/// HUD).  `read()` always returns a point and detected flag that were
/// published together.
#[derive(Resource, Debug, Clone, Default)]
pub struct SharedTrackingState {
    mailbox: Mailbox<SharedSlot>,
}

impl SharedTrackingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer side: replace the slot with a new sample.
    pub fn publish(&self, latest: SmoothedTarget, detected: bool) {
        self.mailbox.update(|slot| {
            slot.latest = latest;
            slot.detected = detected;
            slot.sequence = slot.sequence.wrapping_add(1);
        });
    }

    /// Reader side: the latest target and detected flag as one consistent pair.
    pub fn read(&self) -> (SmoothedTarget, bool) {
        let slot = self.mailbox.get();
        (slot.latest, slot.detected)
    }

    /// Reader side including the publish sequence number.
    pub fn snapshot(&self) -> SharedSlot {
        self.mailbox.get()
    }
}

/// Latest window pointer position in camera pixels; `None` when the pointer
/// is outside the window.  Written by the app, read by [`super::CursorSensor`].
#[derive(Resource, Debug, Clone, Default)]
pub struct CursorFeed(pub Mailbox<Option<Point>>);

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fresh_state_is_invalid_and_undetected() {
        let shared = SharedTrackingState::new();
        let (target, detected) = shared.read();
        assert!(!target.valid);
        assert!(!detected);
        assert_eq!(shared.snapshot().sequence, 0);
    }

    #[test]
    fn latest_publish_wins() {
        let shared = SharedTrackingState::new();
        shared.publish(SmoothedTarget::at(Vec2::new(10.0, 20.0)), true);
        shared.publish(SmoothedTarget::at(Vec2::new(30.0, 40.0)), false);

        let slot = shared.snapshot();
        assert_eq!(slot.latest.point, Vec2::new(30.0, 40.0));
        assert!(!slot.detected);
        assert_eq!(slot.sequence, 2);
    }

    #[test]
    fn clones_share_one_slot() {
        let writer = SharedTrackingState::new();
        let reader = writer.clone();
        writer.publish(SmoothedTarget::at(Vec2::new(1.0, 2.0)), true);
        assert_eq!(reader.read().0.point, Vec2::new(1.0, 2.0));
    }

    /// The writer always publishes `point.x == point.y` together with
    /// `detected == (x is even)`; a torn read would break either relation.
    #[test]
    fn concurrent_readers_never_see_a_torn_pair() {
        let shared = SharedTrackingState::new();
        let writer = shared.clone();
        let handle = thread::spawn(move || {
            for i in 0..5_000u32 {
                let v = i as f32;
                writer.publish(SmoothedTarget::at(Vec2::new(v, v)), i % 2 == 0);
            }
        });

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let reader = shared.clone();
                thread::spawn(move || {
                    for _ in 0..5_000 {
                        let (target, detected) = reader.read();
                        if !target.valid {
                            continue;
                        }
                        assert_eq!(target.point.x, target.point.y);
                        assert_eq!(detected, (target.point.x as u32) % 2 == 0);
                    }
                })
            })
            .collect();

        handle.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(shared.snapshot().sequence, 5_000);
    }
}
