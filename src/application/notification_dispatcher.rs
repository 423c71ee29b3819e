use std::sync::Arc;

use chrono::Duration;

use crate::domain::errors::DomainError;
use crate::domain::notification::{
    Channel, DispatchReport, EmailMessage, PendingNotification, PushMessage,
};
use crate::domain::ports::{Clock, EmailSender, OutboxRepository, PushSender};

/// How long a claimed row stays reserved for the worker that claimed it.
const CLAIM_LEASE_SECS: i64 = 300;

/// Delivers queued notifications once the write that queued them committed.
///
/// Every message is attempted once per pass. Failures are recorded on the
/// outbox row and never surface to the caller; rows that reach
/// `max_attempts` are left alone. A row is claimed before it is sent, so
/// the post-commit flush and the sweeper never deliver the same row twice.
pub struct NotificationDispatcher {
    outbox: Arc<dyn OutboxRepository>,
    email: Arc<dyn EmailSender>,
    push: Arc<dyn PushSender>,
    clock: Arc<dyn Clock>,
    max_attempts: i32,
}

impl NotificationDispatcher {
    pub fn new(
        outbox: Arc<dyn OutboxRepository>,
        email: Arc<dyn EmailSender>,
        push: Arc<dyn PushSender>,
        clock: Arc<dyn Clock>,
        max_attempts: i32,
    ) -> Self {
        Self {
            outbox,
            email,
            push,
            clock,
            max_attempts,
        }
    }

    /// Flushes the pending messages of one aggregate (an order id).
    pub fn dispatch_for(&self, aggregate_id: &str) -> DispatchReport {
        match self.outbox.pending_for_aggregate(aggregate_id, self.max_attempts) {
            Ok(pending) => self.deliver(pending),
            Err(e) => {
                log::warn!("Could not load notifications for {}: {}", aggregate_id, e);
                DispatchReport::default()
            }
        }
    }

    /// Retries up to `limit` undelivered messages across all aggregates.
    pub fn sweep(&self, limit: i64) -> DispatchReport {
        match self.outbox.pending(limit, self.max_attempts) {
            Ok(pending) => self.deliver(pending),
            Err(e) => {
                log::warn!("Outbox sweep failed: {}", e);
                DispatchReport::default()
            }
        }
    }

    fn deliver(&self, pending: Vec<PendingNotification>) -> DispatchReport {
        let mut report = DispatchReport::default();
        let lease = Duration::seconds(CLAIM_LEASE_SECS);
        for notification in pending {
            match self.outbox.claim(notification.id, self.clock.now(), lease) {
                Ok(true) => {}
                Ok(false) => {
                    log::debug!("Notification {} is already taken", notification.id);
                    continue;
                }
                Err(e) => {
                    log::warn!("Could not claim notification {}: {}", notification.id, e);
                    continue;
                }
            }
            match self.send(&notification) {
                Ok(()) => {
                    report.sent += 1;
                    if let Err(e) = self.outbox.mark_dispatched(notification.id, self.clock.now()) {
                        log::warn!("Could not mark notification {} as sent: {}", notification.id, e);
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    log::warn!(
                        "Failed to send {} {} notification for {} (attempt {}): {}",
                        notification.kind,
                        notification.channel.as_str(),
                        notification.aggregate_id,
                        notification.attempts + 1,
                        e
                    );
                    if let Err(e) = self.outbox.mark_failed(notification.id, &e.to_string()) {
                        log::warn!("Could not record failure of {}: {}", notification.id, e);
                    }
                }
            }
        }
        report
    }

    fn send(&self, notification: &PendingNotification) -> Result<(), DomainError> {
        match notification.channel {
            Channel::Email => {
                let message: EmailMessage = decode(notification)?;
                self.email.send(&message)
            }
            Channel::Push => {
                let message: PushMessage = decode(notification)?;
                self.push.send(&notification.recipient, &message)
            }
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(notification: &PendingNotification) -> Result<T, DomainError> {
    serde_json::from_value(notification.payload.clone())
        .map_err(|e| DomainError::Internal(format!("malformed payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;
    use crate::domain::notification::{NotificationKind, OutboxMessage};
    use crate::test_support::{InMemoryStore, ManualClock, RecordingEmailSender, RecordingPushSender};

    struct Fixture {
        store: Arc<InMemoryStore>,
        email: Arc<RecordingEmailSender>,
        push: Arc<RecordingPushSender>,
        dispatcher: NotificationDispatcher,
    }

    fn fixture(max_attempts: i32) -> Fixture {
        let store = Arc::new(InMemoryStore::default());
        let email = Arc::new(RecordingEmailSender::default());
        let push = Arc::new(RecordingPushSender::default());
        let dispatcher = NotificationDispatcher::new(
            store.clone(),
            email.clone(),
            push.clone(),
            Arc::new(ManualClock::default()),
            max_attempts,
        );
        Fixture {
            store,
            email,
            push,
            dispatcher,
        }
    }

    fn queue_email(store: &InMemoryStore, aggregate: &str) {
        let message = EmailMessage {
            to: "asha@example.com".into(),
            subject: "Your order".into(),
            text: "text".into(),
            html: "<p>text</p>".into(),
        };
        store.enqueue(OutboxMessage::email(aggregate, NotificationKind::OrderShipped, &message).unwrap());
    }

    fn queue_push(store: &InMemoryStore, aggregate: &str) {
        let message = PushMessage {
            title: "Order Shipped".into(),
            body: "Your order #ORD-1 has been shipped!".into(),
            tag: "order-shipped-ORD-1".into(),
            click_target: "/track-order?orderNumber=ORD-1".into(),
        };
        store.enqueue(
            OutboxMessage::push(aggregate, NotificationKind::OrderShipped, uuid::Uuid::new_v4(), &message)
                .unwrap(),
        );
    }

    #[test]
    fn delivers_only_the_requested_aggregate() {
        let f = fixture(5);
        queue_email(&f.store, "order-a");
        queue_push(&f.store, "order-a");
        queue_email(&f.store, "order-b");

        let report = f.dispatcher.dispatch_for("order-a");

        assert_eq!(report, DispatchReport { sent: 2, failed: 0 });
        assert_eq!(f.email.sent().len(), 1);
        assert_eq!(f.push.sent().len(), 1);
        assert!(f.store.outbox_for("order-a").is_empty());
        assert_eq!(f.store.outbox_for("order-b").len(), 1);
    }

    #[test]
    fn failures_are_recorded_and_retried_by_the_sweep() {
        let f = fixture(5);
        queue_email(&f.store, "order-a");
        f.email.fail(true);

        let first = f.dispatcher.dispatch_for("order-a");
        assert_eq!(first, DispatchReport { sent: 0, failed: 1 });
        let pending = f.store.outbox_for("order-a");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 1);

        f.email.fail(false);
        let swept = f.dispatcher.sweep(100);
        assert_eq!(swept, DispatchReport { sent: 1, failed: 0 });
        assert!(f.store.outbox_for("order-a").is_empty());
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let f = fixture(2);
        queue_push(&f.store, "order-a");
        f.push.fail(true);

        f.dispatcher.sweep(100);
        f.dispatcher.sweep(100);
        let third = f.dispatcher.sweep(100);

        assert_eq!(third, DispatchReport::default());
        assert_eq!(f.push.attempts(), 2);
    }

    /// Lets a second dispatcher sweep the same outbox while the first one is
    /// in the middle of sending.
    struct InterleavingSender {
        inner: Arc<RecordingEmailSender>,
        rival: OnceLock<NotificationDispatcher>,
        rival_report: Mutex<Option<DispatchReport>>,
    }

    impl EmailSender for InterleavingSender {
        fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
            if let Some(rival) = self.rival.get() {
                let mut report = self.rival_report.lock().unwrap();
                if report.is_none() {
                    *report = Some(rival.sweep(100));
                }
            }
            self.inner.send(message)
        }
    }

    #[test]
    fn a_sweep_during_delivery_does_not_send_twice() {
        let store = Arc::new(InMemoryStore::default());
        let clock = Arc::new(ManualClock::default());
        let recorded = Arc::new(RecordingEmailSender::default());
        let sender = Arc::new(InterleavingSender {
            inner: recorded.clone(),
            rival: OnceLock::new(),
            rival_report: Mutex::new(None),
        });
        let rival = NotificationDispatcher::new(
            store.clone(),
            recorded.clone(),
            Arc::new(RecordingPushSender::default()),
            clock.clone(),
            5,
        );
        assert!(sender.rival.set(rival).is_ok());
        let dispatcher = NotificationDispatcher::new(
            store.clone(),
            sender.clone(),
            Arc::new(RecordingPushSender::default()),
            clock,
            5,
        );
        queue_email(&store, "order-a");

        let report = dispatcher.dispatch_for("order-a");

        assert_eq!(report, DispatchReport { sent: 1, failed: 0 });
        assert_eq!(*sender.rival_report.lock().unwrap(), Some(DispatchReport::default()));
        assert_eq!(recorded.sent().len(), 1);
        assert!(store.outbox_for("order-a").is_empty());
    }

    #[test]
    fn abandoned_claims_are_retried_after_the_lease() {
        let store = Arc::new(InMemoryStore::default());
        let clock = Arc::new(ManualClock::default());
        let email = Arc::new(RecordingEmailSender::default());
        let dispatcher = NotificationDispatcher::new(
            store.clone(),
            email.clone(),
            Arc::new(RecordingPushSender::default()),
            clock.clone(),
            5,
        );
        queue_email(&store, "order-a");
        let id = store.outbox_for("order-a")[0].id;
        // A worker that claimed the row and then died.
        assert!(store.claim(id, clock.now(), Duration::seconds(CLAIM_LEASE_SECS)).unwrap());

        assert_eq!(dispatcher.sweep(100), DispatchReport::default());
        clock.advance(Duration::seconds(CLAIM_LEASE_SECS + 1));
        assert_eq!(dispatcher.sweep(100), DispatchReport { sent: 1, failed: 0 });
        assert_eq!(email.sent().len(), 1);
    }
}
