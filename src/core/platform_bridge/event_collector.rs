//=========================================================================
// Event Collector
//=========================================================================
//
// Host event collector with bounded polling and shutdown detection.
//
// Architecture:
//   Receiver<HostEvent> → collect_frame(wait) → events → TickControl
//
// Bounded polling prevents starvation. When nothing is queued the
// collector blocks for at most `wait`, which the caller sets to the run
// loop's next timer deadline.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::HostEvent;

//=== TickControl =========================================================

/// Framework loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

pub(crate) struct EventCollector {
    receiver: Receiver<HostEvent>,
    events: Vec<HostEvent>,
}

impl EventCollector {
    const MAX_EVENTS_PER_FRAME: usize = 100;

    pub(crate) fn new(receiver: Receiver<HostEvent>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(16),
        }
    }

    /// Collects pending host events (bounded to prevent starvation).
    ///
    /// Returns `Exit` once the host disconnects or sends `Shutdown`; the
    /// `Shutdown` event itself is still collected.
    pub(crate) fn collect_frame(&mut self, wait: Duration) -> TickControl {
        self.events.clear();
        let mut drained = 0;

        while drained < Self::MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => {
                    drained += 1;
                    if self.push(event) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= Self::MAX_EVENTS_PER_FRAME {
            warn!(target: "platform", "Host event backlog: drained {} events this frame", drained);
        }

        if drained == 0 {
            match self.receiver.recv_timeout(wait) {
                Ok(event) => return self.push(event),
                Err(RecvTimeoutError::Disconnected) => return TickControl::Exit,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        TickControl::Continue
    }

    pub(crate) fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Takes the collected events, leaving an empty buffer.
    pub(crate) fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    fn push(&mut self, event: HostEvent) -> TickControl {
        let control = match event {
            HostEvent::Shutdown => TickControl::Exit,
            _ => TickControl::Continue,
        };
        self.events.push(event);
        control
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{KeyCode, KeyEvent};
    use crossbeam_channel::unbounded;

    const NO_WAIT: Duration = Duration::from_millis(1);

    #[test]
    fn collect_handles_empty_queue() {
        let (_tx, rx) = unbounded::<HostEvent>();
        let mut collector = EventCollector::new(rx);

        assert_eq!(collector.collect_frame(NO_WAIT), TickControl::Continue);
        assert!(collector.events().is_empty());
    }

    #[test]
    fn collect_drains_in_order() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(HostEvent::Key {
            stage: "main".into(),
            event: KeyEvent::down(KeyCode::KeyA),
        })
        .unwrap();
        tx.send(HostEvent::Tap { stage: "main".into() }).unwrap();

        assert_eq!(collector.collect_frame(NO_WAIT), TickControl::Continue);
        let events = collector.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], HostEvent::Tap { stage: "main".into() });
    }

    #[test]
    fn shutdown_is_collected_and_exits() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(HostEvent::Shutdown).unwrap();

        assert_eq!(collector.collect_frame(NO_WAIT), TickControl::Exit);
        assert_eq!(collector.events(), &[HostEvent::Shutdown]);
    }

    #[test]
    fn collect_clears_previous_events() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(HostEvent::Tap { stage: "main".into() }).unwrap();
        collector.collect_frame(NO_WAIT);
        assert_eq!(collector.events().len(), 1);

        collector.collect_frame(NO_WAIT);
        assert!(collector.events().is_empty());
    }

    #[test]
    fn collect_returns_exit_on_disconnect() {
        let (tx, rx) = unbounded::<HostEvent>();
        let mut collector = EventCollector::new(rx);

        drop(tx);

        assert_eq!(collector.collect_frame(NO_WAIT), TickControl::Exit);
    }
}
