use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::inbox::{InboxNotification, InboxPage, InboxQuery, NewInboxNotification};
use crate::domain::ports::InboxRepository;
use crate::schema::notifications;

use super::models::{InboxRow, NewInboxRow};

pub struct DieselInboxRepository {
    pool: DbPool,
}

impl DieselInboxRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl InboxRepository for DieselInboxRepository {
    fn list_notifications(&self, user_id: Uuid, query: &InboxQuery) -> Result<InboxPage, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut count = notifications::table
                .filter(notifications::user_id.eq(user_id))
                .into_boxed();
            let mut page = notifications::table
                .filter(notifications::user_id.eq(user_id))
                .into_boxed();
            if query.unread_only {
                count = count.filter(notifications::read.eq(false));
                page = page.filter(notifications::read.eq(false));
            }

            let total: i64 = count.count().get_result(conn)?;
            let rows: Vec<InboxRow> = page
                .select(InboxRow::as_select())
                .order(notifications::created_at.desc())
                .limit(query.limit)
                .offset(query.offset)
                .load(conn)?;
            Ok(InboxPage {
                items: rows.into_iter().map(InboxNotification::from).collect(),
                total,
            })
        })
    }

    fn create_notification(
        &self,
        user_id: Uuid,
        notification: NewInboxNotification,
    ) -> Result<InboxNotification, DomainError> {
        let mut conn = self.pool.get()?;
        let row: InboxRow = diesel::insert_into(notifications::table)
            .values(&NewInboxRow {
                id: Uuid::new_v4(),
                user_id,
                kind: notification.kind_or_default(),
                title: notification.title,
                message: notification.message,
                reference_id: notification.reference_id,
                reference_type: notification.reference_type,
            })
            .returning(InboxRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn set_read(&self, user_id: Uuid, ids: &[Uuid], read: bool) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        let read_at = read.then(Utc::now);
        Ok(diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::id.eq_any(ids.to_vec())),
        )
        .set((notifications::read.eq(read), notifications::read_at.eq(read_at)))
        .execute(&mut conn)?)
    }

    fn mark_all_read(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::read.eq(false)),
        )
        .set((
            notifications::read.eq(true),
            notifications::read_at.eq(Some(Utc::now())),
        ))
        .execute(&mut conn)?)
    }

    fn delete_notifications(&self, user_id: Uuid, ids: &[Uuid]) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(diesel::delete(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::id.eq_any(ids.to_vec())),
        )
        .execute(&mut conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::DieselInboxRepository;
    use crate::domain::inbox::{InboxQuery, NewInboxNotification};
    use crate::domain::ports::InboxRepository;
    use crate::infrastructure::test_db::{insert_user, setup_db};

    fn note(title: &str) -> NewInboxNotification {
        NewInboxNotification {
            title: title.into(),
            message: "Your order has shipped".into(),
            kind: None,
            reference_id: None,
            reference_type: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn rows_are_scoped_to_their_owner() {
        let (_container, pool) = setup_db().await;
        let repo = DieselInboxRepository::new(pool.clone());
        let asha = insert_user(&pool, "asha@example.com", "customer");
        let ravi = insert_user(&pool, "ravi@example.com", "customer");

        let first = repo.create_notification(asha, note("Shipped")).unwrap();
        repo.create_notification(asha, note("Delivered")).unwrap();
        assert_eq!(first.kind, "info");

        // Another user's ids are ignored.
        assert_eq!(repo.set_read(ravi, &[first.id], true).unwrap(), 0);
        assert_eq!(repo.set_read(asha, &[first.id], true).unwrap(), 1);

        let unread = InboxQuery { limit: 20, offset: 0, unread_only: true };
        let page = repo.list_notifications(asha, &unread).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Delivered");

        assert_eq!(repo.mark_all_read(asha).unwrap(), 1);
        assert_eq!(repo.delete_notifications(asha, &[first.id]).unwrap(), 1);
        let all = InboxQuery { unread_only: false, ..unread };
        assert_eq!(repo.list_notifications(asha, &all).unwrap().total, 1);
    }
}
