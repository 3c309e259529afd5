//! Append-only, ordered transcript store for one session.

use crate::pipeline::types::TranscriptSegment;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Ordered, append-only accumulation of transcript segments.
///
/// Recognition responses can arrive out of chunk order (a rollover may put
/// chunk N+1 in flight before chunk N resolves). The store buffers incoming
/// segments keyed by chunk index and only releases them to the visible
/// sequence once every lower-indexed chunk has resolved, so `snapshot()`
/// always observes segments in (chunk index, intra-chunk offset) order.
///
/// Abandoned chunks must be recorded via [`TranscriptStore::skip`] —
/// otherwise everything behind them stays buffered forever.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Lowest chunk index not yet released.
    next_index: u64,
    /// Resolved-but-unreleased chunks, keyed by chunk index.
    pending: BTreeMap<u64, Vec<TranscriptSegment>>,
    /// The visible, ordered segment sequence.
    visible: Vec<TranscriptSegment>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one chunk's segments, releasing any now-contiguous run.
    ///
    /// Appends are serialized internally; segments keep the reconstructor's
    /// emitted order. A duplicate or already-released index is ignored.
    pub fn insert(&self, chunk_index: u64, segments: Vec<TranscriptSegment>) {
        let mut inner = self.lock();
        if chunk_index < inner.next_index || inner.pending.contains_key(&chunk_index) {
            return;
        }
        inner.pending.insert(chunk_index, segments);
        Self::release(&mut inner);
    }

    /// Records a chunk that resolved without segments (abandoned after retry
    /// exhaustion, or a non-retryable failure). The gap is accepted so that
    /// later chunks can become visible.
    pub fn skip(&self, chunk_index: u64) {
        self.insert(chunk_index, Vec::new());
    }

    /// Returns the currently visible, ordered segment sequence.
    ///
    /// Safe to call at any time, including mid-session.
    pub fn snapshot(&self) -> Vec<TranscriptSegment> {
        self.lock().visible.clone()
    }

    /// Number of visible segments.
    pub fn len(&self) -> usize {
        self.lock().visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resets the store for a new session.
    ///
    /// Must not be called while a chunk is still in flight.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.next_index = 0;
        inner.pending.clear();
        inner.visible.clear();
    }

    fn release(inner: &mut StoreInner) {
        while let Some(segments) = inner.pending.remove(&inner.next_index) {
            inner.visible.extend(segments);
            inner.next_index += 1;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        // A poisoned store mutex means a panic mid-append; the segment data
        // itself is still consistent, so keep serving it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
