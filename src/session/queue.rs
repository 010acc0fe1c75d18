use std::collections::VecDeque;

use crate::session::protocol::Request;

/// Serializes requests over a channel that has no correlation ids.
///
/// At most one request is in flight. Each response completes it, after which
/// the next queued request may be written.
#[derive(Debug, Default)]
pub struct RequestQueue {
    queued: VecDeque<Request>,
    in_flight: Option<Request>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: Request) {
        self.queued.push_back(request);
    }

    /// Next request to write, if the channel is idle. The returned request
    /// becomes the in-flight one.
    pub fn next_ready(&mut self) -> Option<Request> {
        if self.in_flight.is_some() {
            return None;
        }
        let request = self.queued.pop_front()?;
        self.in_flight = Some(request.clone());
        Some(request)
    }

    /// Mark the in-flight request answered and return it.
    pub fn complete(&mut self) -> Option<Request> {
        self.in_flight.take()
    }

    pub fn in_flight(&self) -> Option<&Request> {
        self.in_flight.as_ref()
    }

    /// Record a request written outside the queue, dropping anything pending.
    pub fn preempt(&mut self, request: Request) {
        self.queued.clear();
        self.in_flight = Some(request);
    }

    pub fn clear(&mut self) {
        self.queued.clear();
        self.in_flight = None;
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}
