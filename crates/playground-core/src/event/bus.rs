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

/// A thread-safe, unbounded event channel.
///
/// The registry, the reaper and the reload worker publish through cloned
/// senders; the runner drains the receiver once per frame.
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + Sync + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> EventBus<T> {
    /// Creates a new bus.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("EventBus initialized.");
        Self { sender, receiver }
    }

    /// Sends an event, logging an error if the receiver is gone.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to send event: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sender end of the channel.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns the receiver end of the channel.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Takes every event currently queued, without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PlaygroundEvent;
    use crate::resource::ResourceId;
    use std::{thread, time::Duration};

    fn destroyed(name: &str) -> PlaygroundEvent {
        PlaygroundEvent::ResourceDestroyed {
            name: name.to_string(),
        }
    }

    #[test]
    fn publish_then_drain_keeps_order() {
        let bus = EventBus::<PlaygroundEvent>::new();
        bus.publish(destroyed("a"));
        bus.publish(PlaygroundEvent::RebuildDiscarded { id: ResourceId(4) });

        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                destroyed("a"),
                PlaygroundEvent::RebuildDiscarded { id: ResourceId(4) }
            ]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn send_from_thread() {
        let bus = EventBus::<PlaygroundEvent>::new();
        let sender = bus.sender();

        let handle = thread::spawn(move || {
            sender
                .send(destroyed("from-thread"))
                .expect("Send from thread failed");
        });

        let received = bus
            .receiver()
            .recv_timeout(Duration::from_secs(1))
            .expect("Failed to receive event from thread");
        assert_eq!(received, destroyed("from-thread"));
        handle.join().expect("Thread join failed");
    }

    #[test]
    fn send_fails_once_the_bus_is_dropped() {
        let bus = EventBus::<PlaygroundEvent>::new();
        let sender = bus.sender();
        drop(bus);
        assert!(sender.send(destroyed("late")).is_err());
    }
}
