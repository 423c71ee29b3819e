use chrono::{DateTime, Duration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::notification::{OutboxMessage, PendingNotification, ORDER_AGGREGATE};
use crate::domain::ports::OutboxRepository;
use crate::schema::notification_outbox;

use super::models::{NewOutboxRow, OutboxRow};

/// Queues messages on the caller's connection, so they commit or roll back
/// with whatever else that transaction writes.
pub(crate) fn enqueue(conn: &mut PgConnection, messages: Vec<OutboxMessage>) -> QueryResult<usize> {
    if messages.is_empty() {
        return Ok(0);
    }
    let rows: Vec<NewOutboxRow> = messages
        .into_iter()
        .map(|m| NewOutboxRow {
            id: m.id,
            aggregate_type: ORDER_AGGREGATE.to_string(),
            aggregate_id: m.aggregate_id,
            channel: m.channel.as_str().to_string(),
            kind: m.kind.as_str().to_string(),
            recipient: m.recipient,
            payload: m.payload,
        })
        .collect();
    diesel::insert_into(notification_outbox::table)
        .values(&rows)
        .execute(conn)
}

pub struct DieselOutboxRepository {
    pool: DbPool,
}

impl DieselOutboxRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_pending(rows: Vec<OutboxRow>) -> Result<Vec<PendingNotification>, DomainError> {
    rows.into_iter().map(OutboxRow::into_pending).collect()
}

impl OutboxRepository for DieselOutboxRepository {
    fn pending_for_aggregate(
        &self,
        aggregate_id: &str,
        max_attempts: i32,
    ) -> Result<Vec<PendingNotification>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = notification_outbox::table
            .filter(notification_outbox::aggregate_id.eq(aggregate_id))
            .filter(notification_outbox::dispatched_at.is_null())
            .filter(notification_outbox::attempts.lt(max_attempts))
            .order(notification_outbox::created_at.asc())
            .select(OutboxRow::as_select())
            .load(&mut conn)?;
        into_pending(rows)
    }

    fn pending(&self, limit: i64, max_attempts: i32) -> Result<Vec<PendingNotification>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = notification_outbox::table
            .filter(notification_outbox::dispatched_at.is_null())
            .filter(notification_outbox::attempts.lt(max_attempts))
            .order(notification_outbox::created_at.asc())
            .limit(limit)
            .select(OutboxRow::as_select())
            .load(&mut conn)?;
        into_pending(rows)
    }

    fn claim(&self, id: Uuid, now: DateTime<Utc>, lease: Duration) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let claimed = diesel::update(
            notification_outbox::table
                .filter(notification_outbox::id.eq(id))
                .filter(notification_outbox::dispatched_at.is_null())
                .filter(
                    notification_outbox::claimed_at
                        .is_null()
                        .or(notification_outbox::claimed_at.lt(now - lease)),
                ),
        )
        .set(notification_outbox::claimed_at.eq(Some(now)))
        .execute(&mut conn)?;
        Ok(claimed == 1)
    }

    fn mark_dispatched(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(notification_outbox::table.find(id))
            .set((
                notification_outbox::dispatched_at.eq(Some(at)),
                notification_outbox::last_error.eq(None::<String>),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(notification_outbox::table.find(id))
            .set((
                notification_outbox::attempts.eq(notification_outbox::attempts + 1),
                notification_outbox::last_error.eq(Some(error)),
                notification_outbox::claimed_at.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)?;
        Ok(())
    }
}
