// mdtrace - core/timeline.rs
//
// Per-device ordered event logs and the store that owns them.
//
// A DeviceTimeline is mutated only by tail-append and by the destructive
// trim-to-last-run; it is never reordered. The TimelineStore is created
// once over the discovered device set and never grows afterwards.

use crate::core::matcher::{Emission, Routing};
use crate::core::model::{DeviceId, Event, EventKind};
use crate::util::constants::STARTUP_MARKER;
use crate::util::error::RouteError;
use std::collections::BTreeMap;

// =============================================================================
// DeviceTimeline
// =============================================================================

/// Ordered sequence of events for one MAC domain.
#[derive(Debug)]
pub struct DeviceTimeline {
    device_id: DeviceId,
    events: Vec<Event>,
    next_sequence: u64,
}

impl DeviceTimeline {
    fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            events: Vec::new(),
            next_sequence: 0,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Append an event at the tail, assigning the next sequence number.
    pub fn append(&mut self, kind: EventKind, message: &str, timestamp: &str) {
        self.next_sequence += 1;
        self.events
            .push(Event::new(kind, message, timestamp, self.next_sequence));
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop everything before the most recent startup marker, modelling
    /// "show only activity since the last observed power-up".
    ///
    /// With no startup marker (or an empty timeline) this is a no-op,
    /// and applying it twice is the same as applying it once.
    pub fn trim_to_last_run(&mut self) {
        if let Some(last_startup) = self
            .events
            .iter()
            .rposition(|event| event.text.contains(STARTUP_MARKER))
        {
            self.events.drain(..last_startup);
        }
    }
}

// =============================================================================
// TimelineStore
// =============================================================================

/// Owns every device's timeline; routes events to one device or all.
#[derive(Debug)]
pub struct TimelineStore {
    timelines: BTreeMap<DeviceId, DeviceTimeline>,
}

impl TimelineStore {
    /// Build the store over the full known-device set. Devices are never
    /// added after construction.
    pub fn new<I>(device_ids: I) -> Self
    where
        I: IntoIterator<Item = DeviceId>,
    {
        let timelines = device_ids
            .into_iter()
            .map(|id| (id.clone(), DeviceTimeline::new(id)))
            .collect();
        Self { timelines }
    }

    /// Append an event to one device's timeline.
    ///
    /// An id the discovery pass never produced is rejected; the caller
    /// drops the event with a diagnostic.
    pub fn route(
        &mut self,
        device_id: &str,
        kind: EventKind,
        message: &str,
        timestamp: &str,
    ) -> Result<(), RouteError> {
        match self.timelines.get_mut(device_id) {
            Some(timeline) => {
                timeline.append(kind, message, timestamp);
                Ok(())
            }
            None => Err(RouteError::UnknownDevice {
                device_id: device_id.to_string(),
            }),
        }
    }

    /// Append the same message independently to every device's timeline.
    /// Each device assigns its own sequence number, so only per-device
    /// order is meaningful for broadcast events.
    pub fn broadcast(&mut self, kind: EventKind, message: &str, timestamp: &str) {
        for timeline in self.timelines.values_mut() {
            timeline.append(kind, message, timestamp);
        }
    }

    /// Apply an emission's routing. Returns how many events were appended.
    pub fn dispatch(&mut self, emission: Emission, timestamp: &str) -> Result<usize, RouteError> {
        match emission.routing {
            Routing::Device(ref device_id) => {
                self.route(device_id, emission.kind, &emission.message, timestamp)?;
                Ok(1)
            }
            Routing::Broadcast => {
                self.broadcast(emission.kind, &emission.message, timestamp);
                Ok(self.timelines.len())
            }
        }
    }

    /// Trim every device's timeline to its most recent run.
    pub fn trim_all_to_last_run(&mut self) {
        for timeline in self.timelines.values_mut() {
            timeline.trim_to_last_run();
        }
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceTimeline> {
        self.timelines.get(device_id)
    }

    /// Iterate timelines in stable (sorted-id) order.
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &DeviceTimeline)> {
        self.timelines.iter()
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
