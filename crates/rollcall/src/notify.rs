//! Change notification fan-out.
//!
//! Mutations publish a [`ChangeEvent`] to every observer subscribed at that
//! moment. Delivery is best effort: there is no replay for late subscribers,
//! no acknowledgement, and an observer that falls more than the channel
//! capacity behind skips the events it missed. Publishing never blocks.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// What kind of mutation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A student was added.
    StudentCreated,
    /// A student's details changed.
    StudentUpdated,
    /// A student delete request completed.
    StudentDeleted,
    /// An attendance record was added.
    AttendanceMarked,
    /// An attendance delete request completed.
    AttendanceDeleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StudentCreated => write!(f, "student_created"),
            Self::StudentUpdated => write!(f, "student_updated"),
            Self::StudentDeleted => write!(f, "student_deleted"),
            Self::AttendanceMarked => write!(f, "attendance_marked"),
            Self::AttendanceDeleted => write!(f, "attendance_deleted"),
        }
    }
}

/// A published change. Carries no record data; observers re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// What changed.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Server local time of the change.
    pub timestamp: NaiveDateTime,
}

/// Broadcasts change events to connected observers.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Notifier {
    /// Create a notifier buffering up to `capacity` events per observer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration validation rejects that.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new observer. It sees only events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Number of currently connected observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish a change to the observers connected right now.
    ///
    /// Returns how many observers the event was queued for.
    pub fn publish(&self, kind: ChangeKind, timestamp: NaiveDateTime) -> usize {
        let event = ChangeEvent { kind, timestamp };
        match self.tx.send(event) {
            Ok(observers) => {
                debug!("Published {} to {} observers", kind, observers);
                observers
            }
            Err(_) => {
                debug!("Published {} with no observers connected", kind);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_publish_without_observers() {
        let notifier = Notifier::new(4);
        assert_eq!(notifier.publish(ChangeKind::StudentCreated, at(9, 0)), 0);
    }

    #[tokio::test]
    async fn test_all_observers_receive() {
        let notifier = Notifier::new(4);
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();
        assert_eq!(notifier.observer_count(), 2);

        assert_eq!(notifier.publish(ChangeKind::AttendanceMarked, at(9, 5)), 2);

        for rx in [&mut a, &mut b] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.kind, ChangeKind::AttendanceMarked);
            assert_eq!(event.timestamp, at(9, 5));
        }
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let notifier = Notifier::new(4);
        let _early = notifier.subscribe();
        notifier.publish(ChangeKind::StudentDeleted, at(9, 0));

        let mut late = notifier.subscribe();
        assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_dropped_observer_is_forgotten() {
        let notifier = Notifier::new(4);
        let rx = notifier.subscribe();
        drop(rx);
        assert_eq!(notifier.observer_count(), 0);
        assert_eq!(notifier.publish(ChangeKind::StudentUpdated, at(9, 0)), 0);
    }

    #[tokio::test]
    async fn test_slow_observer_lags_without_blocking() {
        let notifier = Notifier::new(2);
        let mut slow = notifier.subscribe();

        for minute in 0..5 {
            notifier.publish(ChangeKind::AttendanceMarked, at(10, minute));
        }

        assert!(matches!(slow.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(slow.recv().await.unwrap().timestamp, at(10, 3));
        assert_eq!(slow.recv().await.unwrap().timestamp, at(10, 4));
    }

    #[test]
    fn test_event_json_shape() {
        let event = ChangeEvent {
            kind: ChangeKind::AttendanceDeleted,
            timestamp: at(14, 30),
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "attendance_deleted");
        assert_eq!(json["timestamp"], "2026-10-18T14:30:00");
    }

    #[test]
    fn test_kind_display_matches_serde() {
        for kind in [
            ChangeKind::StudentCreated,
            ChangeKind::StudentUpdated,
            ChangeKind::StudentDeleted,
            ChangeKind::AttendanceMarked,
            ChangeKind::AttendanceDeleted,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
    }
}
