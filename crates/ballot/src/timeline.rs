// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One hour in milliseconds.
pub const DEFAULT_WINDOW_MILLIS: u64 = 3_600_000;

/// Vote counts keyed by the start of the window each vote falls into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    window_millis: u64,
    buckets: BTreeMap<u64, u64>,
}

impl Timeline {
    /// Returns `None` for a zero-width window.
    pub fn new(window_millis: u64) -> Option<Self> {
        (window_millis > 0).then(|| Self {
            window_millis,
            buckets: BTreeMap::new(),
        })
    }

    pub fn window_millis(&self) -> u64 {
        self.window_millis
    }

    pub fn bucket_start(&self, timestamp: u64) -> u64 {
        timestamp / self.window_millis * self.window_millis
    }

    /// Returns false if the bucket count would overflow.
    pub fn record(&mut self, timestamp: u64) -> bool {
        let key = self.bucket_start(timestamp);
        let count = self.buckets.entry(key).or_insert(0);
        match count.checked_add(1) {
            Some(next) => {
                *count = next;
                true
            }
            None => false,
        }
    }

    /// Returns `None` on a window mismatch or overflow.
    pub fn merge(mut self, other: &Timeline) -> Option<Timeline> {
        if self.window_millis != other.window_millis {
            return None;
        }
        for (key, count) in other.buckets.iter() {
            let slot = self.buckets.entry(*key).or_insert(0);
            *slot = slot.checked_add(*count)?;
        }
        Some(self)
    }

    pub fn count_at(&self, bucket_start: u64) -> u64 {
        self.buckets.get(&bucket_start).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.buckets.iter().map(|(k, v)| (*k, *v))
    }

    /// Bucket with the most votes; the earliest wins a tie.
    pub fn peak(&self) -> Option<(u64, u64)> {
        self.iter()
            .fold(None, |best: Option<(u64, u64)>, (k, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((k, v)),
            })
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            window_millis: DEFAULT_WINDOW_MILLIS,
            buckets: BTreeMap::new(),
        }
    }
}
