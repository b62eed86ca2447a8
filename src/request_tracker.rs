use crate::icmp::v4::SequenceNumber;
use crate::EchoRequest;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// In-flight echo requests by sequence number, shared between sender and receiver.
///
/// The sender records a request before its bytes are written, so a reply can never
/// be looked up before its request is known.
#[derive(Clone, Default)]
pub struct RequestTracker {
    requests: Arc<Mutex<HashMap<SequenceNumber, EchoRequest>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // Entries are plain data, so a panic while the lock was held cannot leave them half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<SequenceNumber, EchoRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or overwrites the entry for `sequence_number`.
    pub fn record(&self, sequence_number: SequenceNumber, request: EchoRequest) {
        self.lock().insert(sequence_number, request);
    }

    pub fn lookup(&self, sequence_number: SequenceNumber) -> Option<EchoRequest> {
        self.lock().get(&sequence_number).cloned()
    }

    /// Drops requests sent strictly before `now - max_age`. Returns how many were dropped.
    pub fn evict_older_than(&self, max_age: Duration, now: Instant) -> usize {
        let mut requests = self.lock();
        let len_before = requests.len();
        requests.retain(|_, request| now.saturating_duration_since(request.send_time) <= max_age);
        len_before - requests.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
