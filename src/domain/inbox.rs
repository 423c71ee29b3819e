//! In-app notifications a customer reads inside the storefront.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InboxNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub read: bool,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInboxNotification {
    pub title: String,
    pub message: String,
    pub kind: Option<String>,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
}

impl NewInboxNotification {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() || self.message.trim().is_empty() {
            return Err(DomainError::invalid("Title and message are required"));
        }
        Ok(())
    }

    pub fn kind_or_default(&self) -> String {
        self.kind
            .clone()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| "info".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxQuery {
    pub limit: i64,
    pub offset: i64,
    pub unread_only: bool,
}

#[derive(Debug, Clone)]
pub struct InboxPage {
    pub items: Vec<InboxNotification>,
    pub total: i64,
}

impl InboxPage {
    pub fn has_more(&self, query: &InboxQuery) -> bool {
        query.offset.saturating_add(query.limit) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_defaults_to_info() {
        let n = NewInboxNotification {
            title: "Hi".into(),
            message: "There".into(),
            kind: Some("  ".into()),
            reference_id: None,
            reference_type: None,
        };
        assert_eq!(n.kind_or_default(), "info");
        assert!(n.validate().is_ok());
        assert!(NewInboxNotification { title: " ".into(), ..n }.validate().is_err());
    }

    #[test]
    fn has_more_compares_the_window_with_the_total() {
        let page = InboxPage { items: vec![], total: 25 };
        let q = InboxQuery { limit: 10, offset: 10, unread_only: false };
        assert!(page.has_more(&q));
        assert!(!page.has_more(&InboxQuery { offset: 15, ..q }));
    }
}
