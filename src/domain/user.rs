use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Support,
    Artisan,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Support => "support",
            Role::Artisan => "artisan",
            Role::Customer => "customer",
        }
    }

    /// Roles that receive back-office notifications.
    pub fn is_staff_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "support" => Ok(Role::Support),
            "artisan" => Ok(Role::Artisan),
            "customer" => Ok(Role::Customer),
            other => Err(DomainError::Internal(format!("unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Language {
        match code {
            "hi" => Language::Hi,
            _ => Language::En,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub preferred_language: Language,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub mfa_enabled: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub preferred_language: Language,
}

/// The authenticated principal attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub name: String,
}

/// Outcome of one failed password check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedLogin {
    pub attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl FailedLogin {
    pub fn attempts_remaining(&self, policy: &LockoutPolicy) -> i32 {
        (policy.max_failed_attempts - self.attempts).max(0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    pub max_failed_attempts: i32,
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(30),
        }
    }
}

impl LockoutPolicy {
    pub fn register_failure(&self, account: &UserAccount, now: DateTime<Utc>) -> FailedLogin {
        let attempts = account.failed_login_attempts + 1;
        let locked_until = (attempts >= self.max_failed_attempts).then(|| now + self.lockout_duration);
        FailedLogin {
            attempts,
            locked_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(attempts: i32) -> UserAccount {
        UserAccount {
            id: Uuid::new_v4(),
            email: "asha@example.com".into(),
            name: "Asha".into(),
            phone: None,
            password_hash: String::new(),
            role: Role::Customer,
            preferred_language: Language::En,
            failed_login_attempts: attempts,
            locked_until: None,
            mfa_enabled: false,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fifth_failure_locks_for_thirty_minutes() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();

        let fourth = policy.register_failure(&account(3), now);
        assert_eq!(fourth.attempts, 4);
        assert_eq!(fourth.locked_until, None);
        assert_eq!(fourth.attempts_remaining(&policy), 1);

        let fifth = policy.register_failure(&account(4), now);
        assert_eq!(fifth.locked_until, Some(now + Duration::minutes(30)));
        assert_eq!(fifth.attempts_remaining(&policy), 0);
    }

    #[test]
    fn lock_expires() {
        let now = Utc::now();
        let mut a = account(5);
        a.locked_until = Some(now + Duration::minutes(1));
        assert!(a.is_locked_at(now));
        assert!(!a.is_locked_at(now + Duration::minutes(2)));
    }

    #[test]
    fn role_round_trips_through_storage_names() {
        for role in [
            Role::SuperAdmin,
            Role::Admin,
            Role::Manager,
            Role::Support,
            Role::Artisan,
            Role::Customer,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }
}
