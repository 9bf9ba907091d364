#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use quicknote_core::{KvError, KvResult, KvStore, MemoryKvStore};
use std::cell::Cell;

/// Clock that starts at 2024-03-01 08:00 UTC and advances one minute per call.
pub fn stepping_clock() -> impl FnMut() -> DateTime<Utc> + Send + 'static {
    let mut next = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    move || {
        let now = next;
        next = next + Duration::minutes(1);
        now
    }
}

/// Memory medium that counts round trips and can refuse writes.
#[derive(Default)]
pub struct ProbeKv {
    pub inner: MemoryKvStore,
    pub reads: Cell<usize>,
    pub writes: usize,
    pub reject_writes: bool,
}

impl KvStore for ProbeKv {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.reads.set(self.reads.get() + 1);
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        if self.reject_writes {
            return Err(KvError::Rejected("quota exceeded".to_string()));
        }
        self.writes += 1;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> KvResult<()> {
        self.inner.remove(key)
    }
}
