use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use synapse_core::config::BusConfig;
use synapse_core::event::InsightEvent;

/// Replay-buffered publish/subscribe bus for insight events.
///
/// `publish` never blocks: each subscriber has its own buffer of
/// replay + extra slots, and when a slow subscriber's buffer is full the
/// event is silently dropped for that subscriber only. A new subscriber
/// first receives the last `replay` events, then live events in publish
/// order. The state lock is held across replay-append and fan-out so all
/// subscribers observe the same relative order.
pub struct InsightBus {
    state: Mutex<BusState>,
    replay: usize,
    buffer: usize,
}

struct BusState {
    replay: VecDeque<InsightEvent>,
    subscribers: Vec<mpsc::Sender<InsightEvent>>,
}

/// A live, independently buffered event stream.
pub struct Subscription {
    rx: mpsc::Receiver<InsightEvent>,
}

impl Subscription {
    /// Next event, in publish order. `None` once the bus is dropped and
    /// the buffer is drained.
    pub async fn recv(&mut self) -> Option<InsightEvent> {
        self.rx.recv().await
    }

    /// Non-blocking variant for draining whatever is already buffered.
    pub fn try_recv(&mut self) -> Option<InsightEvent> {
        self.rx.try_recv().ok()
    }
}

impl InsightBus {
    pub fn new(config: &BusConfig) -> Self {
        Self {
            state: Mutex::new(BusState {
                replay: VecDeque::with_capacity(config.replay),
                subscribers: Vec::new(),
            }),
            replay: config.replay,
            buffer: config.replay + config.extra_buffer,
        }
    }

    /// Best-effort, non-blocking fan-out. Overflow drops the event for
    /// the affected subscriber; that is backpressure policy, not an
    /// error.
    pub fn publish(&self, event: InsightEvent) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        state.replay.push_back(event.clone());
        while state.replay.len() > self.replay {
            state.replay.pop_front();
        }

        state.subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                trace!("insight event dropped for slow subscriber");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    /// Attach a subscriber. The replay window is delivered immediately.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for event in &state.replay {
            // The buffer is at least replay-sized, so this cannot fail.
            let _ = tx.try_send(event.clone());
        }
        state.subscribers.push(tx);
        Subscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> InsightBus {
        InsightBus::new(&BusConfig::default())
    }

    fn label(event: &InsightEvent) -> String {
        match event {
            InsightEvent::Error { message } => message.clone(),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_late_subscriber_gets_replay_window() {
        let bus = bus();
        for i in 0..15 {
            bus.publish(InsightEvent::error(&format!("e{}", i)));
        }

        let mut sub = bus.subscribe();
        let mut seen = Vec::new();
        while let Some(event) = sub.try_recv() {
            seen.push(label(&event));
        }

        let expected: Vec<String> = (5..15).map(|i| format!("e{}", i)).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_live_events_follow_replay_in_order() {
        let bus = bus();
        bus.publish(InsightEvent::error("old"));

        let mut sub = bus.subscribe();
        bus.publish(InsightEvent::error("new"));

        assert_eq!(label(&sub.recv().await.unwrap()), "old");
        assert_eq!(label(&sub.recv().await.unwrap()), "new");
    }

    #[test]
    fn test_slow_subscriber_overflow_drops_newest() {
        let config = BusConfig {
            replay: 2,
            extra_buffer: 1,
        };
        let bus = InsightBus::new(&config);
        let mut sub = bus.subscribe();

        // Buffer holds 3; the rest are dropped for this subscriber.
        for i in 0..5 {
            bus.publish(InsightEvent::error(&format!("e{}", i)));
        }

        let mut seen = Vec::new();
        while let Some(event) = sub.try_recv() {
            seen.push(label(&event));
        }
        assert_eq!(seen, vec!["e0", "e1", "e2"]);
    }

    #[test]
    fn test_all_subscribers_see_same_order() {
        let bus = bus();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        for i in 0..4 {
            bus.publish(InsightEvent::error(&format!("e{}", i)));
        }

        let drain = |sub: &mut Subscription| {
            let mut seen = Vec::new();
            while let Some(event) = sub.try_recv() {
                seen.push(label(&event));
            }
            seen
        };
        assert_eq!(drain(&mut first), drain(&mut second));
    }

    #[test]
    fn test_dropped_subscriber_pruned_on_publish() {
        let bus = bus();
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        bus.publish(InsightEvent::error("tick"));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
