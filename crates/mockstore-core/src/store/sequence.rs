// ── Sequence counters ──
//
// One atomic counter per `SequenceKind`. `next` is a single checked
// read-modify-write, so concurrent callers never observe the same value
// and a counter at `u64::MAX` stops instead of wrapping.

use std::sync::atomic::{AtomicU64, Ordering};

use strum::EnumCount;

use crate::config::SequenceDefaults;
use crate::model::SequenceKind;

pub(crate) struct SequenceCounters {
    counters: [AtomicU64; SequenceKind::COUNT],
}

impl SequenceCounters {
    pub(crate) fn new(defaults: SequenceDefaults) -> Self {
        let counters = Self {
            counters: [AtomicU64::new(0), AtomicU64::new(0)],
        };
        counters.restore(defaults);
        counters
    }

    /// Return the current value and advance by one, or `None` (leaving
    /// the counter alone) when advancing would overflow.
    pub(crate) fn next(&self, kind: SequenceKind) -> Option<u64> {
        self.slot(kind)
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| v.checked_add(1))
            .ok()
    }

    /// The value the next call to `next` will return.
    pub(crate) fn peek(&self, kind: SequenceKind) -> u64 {
        self.slot(kind).load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, kind: SequenceKind, value: u64) {
        self.slot(kind).store(value, Ordering::Release);
    }

    pub(crate) fn restore(&self, defaults: SequenceDefaults) {
        self.set(SequenceKind::Incident, defaults.incident);
        self.set(SequenceKind::Step, defaults.step);
    }

    fn slot(&self, kind: SequenceKind) -> &AtomicU64 {
        &self.counters[kind.index()]
    }
}
