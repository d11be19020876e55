//! Query Dispatch Layer: one resolver per operation.
//!
//! Resolvers return typed results. The executor projects them onto the
//! `null`/`false` wire sentinels.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::ports::{UpdateOutcome, UserPersistenceError, UserRepository};
use crate::domain::{PrivateUser, PublicUser, UserFields, UserId, UserUpdateMask};

/// Why a resolver did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverFailure {
    /// The `usrInfo` argument object was absent.
    #[error("resolver arguments are missing")]
    MissingArguments,
    /// The update mask carried no field.
    #[error("no fields to update")]
    NoFieldsToUpdate,
    /// No record exists under the identifier.
    #[error("user not found")]
    NotFound,
    /// The store call failed.
    #[error(transparent)]
    Store(#[from] UserPersistenceError),
}

/// Resolvers for the user schema.
#[derive(Clone)]
pub struct UserResolvers {
    repository: Arc<dyn UserRepository>,
}

impl UserResolvers {
    /// Dispatch onto `repository`.
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// `getUser(id)`: the public projection, or `None` when absent.
    ///
    /// Identifiers the store could never have issued read as absent.
    pub async fn get_user(&self, raw: &str) -> Result<Option<PublicUser>, ResolverFailure> {
        let Some(id) = parse_id(raw) else {
            return Ok(None);
        };
        Ok(self.repository.find_public(&id).await?)
    }

    /// `listNUsers(n)`: every record when `n` is absent or `<= 0`, else at most `n`.
    pub async fn list_n_users(&self, n: Option<i64>) -> Result<Vec<PublicUser>, ResolverFailure> {
        let limit = n
            .filter(|value| *value > 0)
            .map(|value| usize::try_from(value).unwrap_or(usize::MAX));
        Ok(self.repository.list_public(limit).await?)
    }

    /// `createUser(usrInfo)`: persist under a fresh identifier.
    ///
    /// The generated identifier is returned for logging only; the wire shape
    /// is a boolean.
    pub async fn create_user(&self, fields: Option<UserFields>) -> Result<UserId, ResolverFailure> {
        let fields = fields.ok_or(ResolverFailure::MissingArguments)?;
        let user = PrivateUser::register(fields);
        self.repository.create(&user).await?;
        info!(user_id = %user.id(), "user created");
        Ok(user.id().clone())
    }

    /// `updateUser(id, usrInfo)`: overwrite exactly the masked fields.
    pub async fn update_user(
        &self,
        raw: &str,
        mask: &UserUpdateMask,
    ) -> Result<(), ResolverFailure> {
        if mask.is_empty() {
            return Err(ResolverFailure::NoFieldsToUpdate);
        }
        let Some(id) = parse_id(raw) else {
            return Err(ResolverFailure::NotFound);
        };
        match self.repository.update(&id, mask).await? {
            UpdateOutcome::Applied => {
                info!(user_id = %id, fields = mask.len(), "user updated");
                Ok(())
            }
            UpdateOutcome::NoFieldsToUpdate => Err(ResolverFailure::NoFieldsToUpdate),
            UpdateOutcome::NotFound => Err(ResolverFailure::NotFound),
        }
    }

    /// `deleteUser(id)`: remove the record; absent records still succeed.
    pub async fn delete_user(&self, raw: &str) -> Result<(), ResolverFailure> {
        let Some(id) = parse_id(raw) else {
            return Ok(());
        };
        self.repository.delete(&id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

fn parse_id(raw: &str) -> Option<UserId> {
    UserId::new(raw)
        .inspect_err(|err| debug!(error = %err, "identifier cannot match a stored user"))
        .ok()
}
