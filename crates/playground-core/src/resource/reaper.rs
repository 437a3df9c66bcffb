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

use super::NativeHandle;
use crate::event::PlaygroundEvent;
use crate::renderer::{GraphicsDevice, ResourceError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct DestroyJob {
    deadline: Instant,
    handle: NativeHandle,
    label: String,
}

/// Destroys native handles on a background thread once a grace delay has
/// elapsed, so frames still in flight never see their objects disappear.
///
/// Every job waits the same delay, which keeps the queue ordered by deadline.
/// Jobs still pending when the process exits are leaked.
#[derive(Debug, Clone)]
pub struct ResourceReaper {
    sender: flume::Sender<DestroyJob>,
    grace: Duration,
}

impl std::fmt::Debug for DestroyJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestroyJob")
            .field("handle", &self.handle)
            .field("label", &self.label)
            .finish()
    }
}

impl ResourceReaper {
    /// Grace delay used by the application.
    pub const DEFAULT_GRACE: Duration = Duration::from_secs(1);

    /// Starts the reaper thread.
    ///
    /// ## Arguments
    /// * `device` - The device that owns every handle passed to [`schedule`](Self::schedule).
    /// * `grace` - Delay between a request and the actual teardown.
    /// * `events` - Optional channel receiving a `ResourceDestroyed` event per job.
    pub fn spawn(
        device: Arc<dyn GraphicsDevice>,
        grace: Duration,
        events: Option<flume::Sender<PlaygroundEvent>>,
    ) -> Result<Self, ResourceError> {
        let (sender, receiver) = flume::unbounded::<DestroyJob>();

        thread::Builder::new()
            .name("resource-reaper".to_string())
            .spawn(move || {
                log::debug!("Resource reaper started.");
                while let Ok(job) = receiver.recv() {
                    let now = Instant::now();
                    if job.deadline > now {
                        thread::sleep(job.deadline - now);
                    }
                    match job.handle.destroy(device.as_ref()) {
                        Ok(()) => log::debug!("Destroyed '{}' ({:?}).", job.label, job.handle),
                        Err(e) => log::warn!("Failed to destroy '{}': {e}", job.label),
                    }
                    if let Some(events) = &events {
                        let _ = events.send(PlaygroundEvent::ResourceDestroyed { name: job.label });
                    }
                }
                log::debug!("Resource reaper stopped.");
            })
            .map_err(|e| {
                ResourceError::BackendError(format!("Failed to spawn resource reaper: {e}"))
            })?;

        Ok(Self { sender, grace })
    }

    /// The configured grace delay.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Queues `handle` for destruction after the grace delay. Never blocks.
    pub fn schedule(&self, handle: NativeHandle, label: impl Into<String>) {
        if handle == NativeHandle::Null {
            return;
        }
        let job = DestroyJob {
            deadline: Instant::now() + self.grace,
            handle,
            label: label.into(),
        };
        if let Err(e) = self.sender.send(job) {
            log::error!(
                "Resource reaper is gone; leaking {:?}.",
                e.into_inner().handle
            );
        }
    }
}
