//! Port abstraction for user persistence adapters and their errors.
//!
//! Adapters own the translation between domain types and the store: the
//! create path writes the full private record, read paths request only the
//! public attributes, and updates are issued as one partial `SET`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{PrivateUser, PublicUser, UserId, UserUpdateMask};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Store call exceeded its deadline.
        Timeout { message: String } => "user repository timed out: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A stored record could not be mapped to a user.
        Decode { message: String } => "stored user record is malformed: {message}",
        /// A create collided with an existing identifier.
        Conflict { id: String } => "user {id} already exists",
    }
}

/// Typed outcome of a partial update.
///
/// The schema boundary projects every variant except
/// [`UpdateOutcome::Applied`] to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// All masked fields were written in one instruction.
    Applied,
    /// The mask carried no field; nothing was sent to the store.
    NoFieldsToUpdate,
    /// No record exists under the identifier; nothing was written.
    NotFound,
}

/// Persistence port for user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new record under a freshly generated identifier.
    ///
    /// Never overwrites an existing record.
    async fn create(&self, user: &PrivateUser) -> Result<(), UserPersistenceError>;

    /// Fetch the public projection of a user, or `None` when absent.
    async fn find_public(&self, id: &UserId) -> Result<Option<PublicUser>, UserPersistenceError>;

    /// List public projections in store order, at most `limit` when given.
    async fn list_public(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<PublicUser>, UserPersistenceError>;

    /// Overwrite exactly the fields present in `mask`.
    async fn update(
        &self,
        id: &UserId,
        mask: &UserUpdateMask,
    ) -> Result<UpdateOutcome, UserPersistenceError>;

    /// Remove a record. Removing an absent record succeeds.
    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError>;

    /// Round trip to the backing store; used by readiness probes.
    async fn ping(&self) -> Result<(), UserPersistenceError>;
}

/// In-process repository used by tests and fixture wiring.
///
/// Keeps the same observable semantics as the store-backed adapter.
#[derive(Debug, Clone, Default)]
pub struct FixtureUserRepository {
    users: Arc<RwLock<BTreeMap<String, PrivateUser>>>,
}

impl FixtureUserRepository {
    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Full private record, for assertions on fields hidden from reads.
    pub async fn private_record(&self, id: &UserId) -> Option<PrivateUser> {
        self.users.read().await.get(id.as_ref()).cloned()
    }
}

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, user: &PrivateUser) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        let key = user.id().as_ref().to_owned();
        if users.contains_key(&key) {
            return Err(UserPersistenceError::conflict(key));
        }
        users.insert(key, user.clone());
        Ok(())
    }

    async fn find_public(&self, id: &UserId) -> Result<Option<PublicUser>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .get(id.as_ref())
            .map(PrivateUser::to_public))
    }

    async fn list_public(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<PublicUser>, UserPersistenceError> {
        let users = self.users.read().await;
        let take = limit.unwrap_or(usize::MAX);
        Ok(users.values().take(take).map(PrivateUser::to_public).collect())
    }

    async fn update(
        &self,
        id: &UserId,
        mask: &UserUpdateMask,
    ) -> Result<UpdateOutcome, UserPersistenceError> {
        if mask.is_empty() {
            return Ok(UpdateOutcome::NoFieldsToUpdate);
        }
        let mut users = self.users.write().await;
        let Some(existing) = users.get(id.as_ref()) else {
            return Ok(UpdateOutcome::NotFound);
        };
        let mut fields = existing.fields().clone();
        if let Some(value) = &mask.first_name {
            fields.first_name.clone_from(value);
        }
        if let Some(value) = &mask.last_name {
            fields.last_name.clone_from(value);
        }
        if let Some(value) = &mask.email {
            fields.email.clone_from(value);
        }
        if let Some(value) = &mask.password {
            fields.password.clone_from(value);
        }
        users.insert(
            id.as_ref().to_owned(),
            PrivateUser::from_parts(id.clone(), fields),
        );
        Ok(UpdateOutcome::Applied)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        self.users.write().await.remove(id.as_ref());
        Ok(())
    }

    async fn ping(&self) -> Result<(), UserPersistenceError> {
        Ok(())
    }
}

