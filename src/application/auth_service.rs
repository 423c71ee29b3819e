use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::password::PasswordPolicy;
use crate::domain::ports::{Clock, PasswordHasher, TokenIssuer, UserRepository};
use crate::domain::user::{Caller, Language, LockoutPolicy, NewUser, Role, UserAccount};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub preferred_language: Language,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: Caller,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
    password_policy: PasswordPolicy,
    lockout: LockoutPolicy,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn caller_of(account: &UserAccount) -> Caller {
    Caller {
        id: account.id,
        role: account.role,
        email: account.email.clone(),
        name: account.name.clone(),
    }
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
            password_policy: PasswordPolicy::default(),
            lockout: LockoutPolicy::default(),
        }
    }

    /// Creates a customer account.
    pub fn register(&self, registration: Registration) -> Result<Caller, DomainError> {
        let email = normalize_email(&registration.email);
        let name = registration.name.trim().to_string();
        if name.is_empty() || email.is_empty() || registration.password.is_empty() {
            return Err(DomainError::invalid("Missing required fields"));
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(DomainError::invalid("Invalid email address"));
        }

        let violations = self.password_policy.violations(&registration.password);
        if !violations.is_empty() {
            return Err(DomainError::InvalidInput(violations.join(", ")));
        }

        if self.users.find_by_email(&email)?.is_some() {
            return Err(DomainError::invalid("An account with this email already exists"));
        }

        let account = self.users.create(NewUser {
            id: Uuid::new_v4(),
            email,
            name,
            phone: registration.phone,
            password_hash: self.hasher.hash(&registration.password)?,
            role: Role::Customer,
            preferred_language: registration.preferred_language,
        })?;

        log::info!("Registered user {}", account.id);
        Ok(caller_of(&account))
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let now = self.clock.now();
        let Some(mut account) = self.users.find_by_email(&normalize_email(email))? else {
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        if let Some(until) = account.locked_until {
            if account.is_locked_at(now) {
                log::warn!("Login attempt on locked account {}", account.id);
                return Err(DomainError::AccountLocked { until });
            }
            self.users.clear_lock(account.id)?;
            account.locked_until = None;
            account.failed_login_attempts = 0;
        }

        if !self.hasher.verify(password, &account.password_hash)? {
            let failure = self.lockout.register_failure(&account, now);
            self.users.record_login_failure(account.id, failure)?;

            if let Some(until) = failure.locked_until {
                log::warn!(
                    "Account {} locked after {} failed logins",
                    account.id,
                    failure.attempts
                );
                self.users.record_security_event(
                    Some(account.id),
                    "account_locked",
                    json!({
                        "failed_attempts": failure.attempts,
                        "locked_until": until,
                    }),
                )?;
                return Err(DomainError::AccountLocked { until });
            }
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        self.users.record_login_success(account.id, now)?;
        let user = caller_of(&account);
        let token = self.tokens.issue(&user, now)?;
        Ok(Session { token, user })
    }

    pub fn authenticate(&self, token: &str) -> Result<Caller, DomainError> {
        self.tokens.verify(token)
    }
}
