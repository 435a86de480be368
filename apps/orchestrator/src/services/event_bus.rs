// [apps/orchestrator/src/services/event_bus.rs]
//! Per-mission event fan-out (§4.1, §6.2).
//!
//! Each mission gets its own bounded ring buffer plus a broadcast
//! channel: the ring buffer answers `Last-Event-ID` replay requests
//! from reconnecting subscribers, the broadcast channel carries the
//! live tail. A lagging subscriber that falls behind the broadcast
//! channel's own capacity just misses events rather than blocking the
//! publisher -- `tokio::sync::broadcast` drops oldest-first for slow
//! receivers, same as the live stream's own best-effort contract.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use warden_graph_model::sink::GraphEventSink;
use warden_graph_model::{EventEnvelope, EventType};

const LIVE_CHANNEL_CAPACITY: usize = 4096;

pub type SequencedEvent = (u64, EventEnvelope);

struct MissionChannel {
    sender: broadcast::Sender<SequencedEvent>,
    backlog: VecDeque<SequencedEvent>,
    next_seq: u64,
}

impl MissionChannel {
    fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self { sender, backlog: VecDeque::new(), next_seq: 1 }
    }
}

pub struct EventBus {
    ring_buffer_capacity: usize,
    missions: RwLock<HashMap<String, MissionChannel>>,
}

impl EventBus {
    pub fn new(ring_buffer_capacity: usize) -> Self {
        Self { ring_buffer_capacity, missions: RwLock::new(HashMap::new()) }
    }

    /// Appends `envelope` to its mission's ring buffer and fans it out
    /// to every live subscriber. Silently drops the broadcast if no
    /// subscriber is currently attached (`send` erroring with no
    /// receivers is not a failure -- the ring buffer still holds it
    /// for the next reconnect).
    pub async fn publish(&self, envelope: EventEnvelope) -> u64 {
        let mut missions = self.missions.write().await;
        let channel = missions.entry(envelope.mission_id.clone()).or_insert_with(MissionChannel::new);
        let seq = channel.next_seq;
        channel.next_seq += 1;
        channel.backlog.push_back((seq, envelope.clone()));
        while channel.backlog.len() > self.ring_buffer_capacity {
            channel.backlog.pop_front();
        }
        let _ = channel.sender.send((seq, envelope));
        seq
    }

    /// Events strictly after `since_seq`, as currently held in the
    /// ring buffer. Events older than the buffer's retention window
    /// are gone; a subscriber reconnecting with a stale id gets
    /// whatever is left rather than an error (§6.2, "best
    /// effort replay").
    pub async fn replay_since(&self, mission_id: &str, since_seq: u64) -> Vec<SequencedEvent> {
        let missions = self.missions.read().await;
        match missions.get(mission_id) {
            Some(channel) => channel.backlog.iter().filter(|(seq, _)| *seq > since_seq).cloned().collect(),
            None => Vec::new(),
        }
    }

    pub async fn subscribe(&self, mission_id: &str) -> broadcast::Receiver<SequencedEvent> {
        let mut missions = self.missions.write().await;
        let channel = missions.entry(mission_id.to_string()).or_insert_with(MissionChannel::new);
        channel.sender.subscribe()
    }

    /// Drops a mission's channel once it is safe to forget (mission
    /// reached a terminal state and its ring buffer has been fully
    /// drained by the reaper).
    pub async fn forget(&self, mission_id: &str) {
        self.missions.write().await.remove(mission_id);
    }

    pub async fn mission_count(&self) -> usize {
        self.missions.read().await.len()
    }
}

/// Bridges `GraphRepository`'s synchronous `GraphEventSink` callback
/// onto this async bus, the same shape as `mission_service`'s
/// `BusEventSink` for pipeline events: `emit` just pushes onto an
/// unbounded channel, a background task drains it into
/// `EventBus::publish`. Unlike that sink, this one isn't scoped to a
/// single mission -- the graph store is written to from every
/// mission's pipeline and from the direct `/nodes`,`/edges` HTTP
/// handlers alike, so the envelope's `mission_id` comes from the
/// write itself, not from the sink.
pub struct BusGraphEventSink {
    sender: mpsc::UnboundedSender<EventEnvelope>,
}

impl BusGraphEventSink {
    pub fn new(bus: Arc<EventBus>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<EventEnvelope>();
        tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                bus.publish(envelope).await;
            }
        });
        Self { sender }
    }
}

impl GraphEventSink for BusGraphEventSink {
    fn emit(&self, event_type: EventType, mission_id: &str, payload: serde_json::Value) {
        let envelope = EventEnvelope::new(event_type, mission_id, "GRAPH", "warden-graph-store", payload);
        let _ = self.sender.send(envelope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warden_graph_model::EventType;

    fn envelope(mission_id: &str) -> EventEnvelope {
        EventEnvelope::new(EventType::PhaseStarted, mission_id, "PASSIVE_RECON", "test", json!({}))
    }

    #[tokio::test]
    async fn published_events_are_replayable_by_sequence() {
        let bus = EventBus::new(100);
        bus.publish(envelope("m1")).await;
        let second_seq = bus.publish(envelope("m1")).await;

        let replayed = bus.replay_since("m1", 0).await;
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed.last().unwrap().0, second_seq);

        let replayed_partial = bus.replay_since("m1", 1).await;
        assert_eq!(replayed_partial.len(), 1);
    }

    #[tokio::test]
    async fn ring_buffer_evicts_oldest_past_capacity() {
        let bus = EventBus::new(2);
        bus.publish(envelope("m1")).await;
        bus.publish(envelope("m1")).await;
        bus.publish(envelope("m1")).await;

        let replayed = bus.replay_since("m1", 0).await;
        assert_eq!(replayed.len(), 2);
    }

    #[tokio::test]
    async fn live_subscriber_receives_events_published_after_subscribing() {
        let bus = EventBus::new(100);
        let mut receiver = bus.subscribe("m1").await;
        bus.publish(envelope("m1")).await;

        let (seq, received) = receiver.recv().await.unwrap();
        assert_eq!(seq, 1);
        assert_eq!(received.mission_id, "m1");
    }

    #[tokio::test]
    async fn missions_are_isolated_from_each_other() {
        let bus = EventBus::new(100);
        bus.publish(envelope("m1")).await;
        let replayed = bus.replay_since("m2", 0).await;
        assert!(replayed.is_empty());
    }
}
