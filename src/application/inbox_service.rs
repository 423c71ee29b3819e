use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::inbox::{InboxNotification, InboxPage, InboxQuery, NewInboxNotification};
use crate::domain::ports::InboxRepository;

const MAX_PAGE_SIZE: i64 = 100;

pub struct InboxService {
    repo: Arc<dyn InboxRepository>,
}

impl InboxService {
    pub fn new(repo: Arc<dyn InboxRepository>) -> Self {
        Self { repo }
    }

    /// One page of the caller's notifications, newest first. The window is
    /// clamped to 1..=100 rows from a non-negative offset.
    pub fn list(&self, user_id: Uuid, query: InboxQuery) -> Result<(InboxPage, InboxQuery), DomainError> {
        let query = InboxQuery {
            limit: query.limit.clamp(1, MAX_PAGE_SIZE),
            offset: query.offset.max(0),
            unread_only: query.unread_only,
        };
        let page = self.repo.list_notifications(user_id, &query)?;
        Ok((page, query))
    }

    pub fn create(&self, user_id: Uuid, input: NewInboxNotification) -> Result<InboxNotification, DomainError> {
        input.validate()?;
        self.repo.create_notification(user_id, input)
    }

    pub fn set_read(&self, user_id: Uuid, ids: &[Uuid], read: bool) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Err(DomainError::invalid("Invalid notification IDs"));
        }
        self.repo.set_read(user_id, ids, read)
    }

    pub fn mark_all_read(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.repo.mark_all_read(user_id)
    }

    pub fn delete(&self, user_id: Uuid, ids: &[Uuid]) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Err(DomainError::invalid("Invalid notification IDs"));
        }
        self.repo.delete_notifications(user_id, ids)
    }
}
