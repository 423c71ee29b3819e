use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{Caller, FailedLogin, NewUser, Role, UserAccount};
use crate::schema::{security_events, users};

use super::models::{NewSecurityEventRow, NewUserRow, UserRow};

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(UserRow::into_account)
            .transpose()
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(UserRow::into_account)
            .transpose()
    }

    fn create(&self, user: NewUser) -> Result<UserAccount, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: user.id,
                email: user.email,
                name: user.name,
                phone: user.phone,
                password_hash: user.password_hash,
                role: user.role.as_str().to_string(),
                preferred_language: user.preferred_language.as_str().to_string(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;
        row.into_account()
    }

    fn list_admins(&self) -> Result<Vec<Caller>, DomainError> {
        let mut conn = self.pool.get()?;
        let staff = [Role::SuperAdmin.as_str(), Role::Admin.as_str()];
        let rows = users::table
            .filter(users::role.eq_any(staff))
            .select(UserRow::as_select())
            .load(&mut conn)?;
        rows.into_iter()
            .map(|row| {
                let account = row.into_account()?;
                Ok(Caller {
                    id: account.id,
                    role: account.role,
                    email: account.email,
                    name: account.name,
                })
            })
            .collect()
    }

    fn record_login_failure(&self, id: Uuid, failure: FailedLogin) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(users::table.find(id))
            .set((
                users::failed_login_attempts.eq(failure.attempts),
                users::locked_until.eq(failure.locked_until),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    fn record_login_success(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(users::table.find(id))
            .set((
                users::failed_login_attempts.eq(0),
                users::locked_until.eq(None::<DateTime<Utc>>),
                users::last_login_at.eq(Some(at)),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    fn clear_lock(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(users::table.find(id))
            .set((
                users::failed_login_attempts.eq(0),
                users::locked_until.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    fn record_security_event(
        &self,
        user_id: Option<Uuid>,
        event_type: &str,
        details: serde_json::Value,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(security_events::table)
            .values(&NewSecurityEventRow {
                id: Uuid::new_v4(),
                user_id,
                event_type: event_type.to_string(),
                details,
            })
            .execute(&mut conn)?;
        Ok(())
    }
}
