// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A generic, thread-safe notification channel.

/// A notification queue with cloneable endpoints.
///
/// Generic over the transported event type so this crate stays decoupled
/// from the concrete notification enums defined by higher-level crates.
/// Receivers share one queue: each event is consumed by exactly one of them,
/// so the intended shape is a single draining consumer per bus.
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + Sync + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> EventBus<T> {
    /// Creates a bus backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Publishes an event onto the queue.
    ///
    /// A send failure means every receiver (including the bus's own) has
    /// been dropped, which is a wiring bug worth a log line rather than a
    /// propagated error.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Event dropped, all receivers disconnected: {e}");
        }
    }

    /// A clone of the sender end, for parts of the system that need to
    /// publish without owning the bus.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// A clone of the receiver end, for subscribers.
    pub fn subscribe(&self) -> flume::Receiver<T> {
        self.receiver.clone()
    }

    /// Drains and returns every event currently queued on the bus's own
    /// receiver.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
