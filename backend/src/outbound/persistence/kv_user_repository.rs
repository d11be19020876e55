//! Storage Adapter: user persistence over a [`KeyValueStore`].
//!
//! Creates write the full private record with a create-only put. Reads
//! request the public attributes only, so passwords never leave the store on
//! a read path. Updates send exactly one `SET` instruction built from the
//! provided mask slots.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use update_expression::{UpdateExpression, UpdateExpressionBuilder, UpdateExpressionError};

use crate::domain::ports::{UpdateOutcome, UserPersistenceError, UserRepository};
use crate::domain::user::{
    EMAIL_ATTRIBUTE, FIRST_NAME_ATTRIBUTE, ID_ATTRIBUTE, LAST_NAME_ATTRIBUTE, PASSWORD_ATTRIBUTE,
    PUBLIC_ATTRIBUTES,
};
use crate::domain::{PrivateUser, PublicUser, UserId, UserUpdateMask};
use crate::outbound::kv::{Item, KeyValueStore, KeyValueStoreError, PutMode, UpdateRequest};

/// Default table name for user records.
pub const DEFAULT_USERS_TABLE: &str = "users";

/// User repository backed by a key-value store table.
#[derive(Clone)]
pub struct KeyValueUserRepository {
    store: Arc<dyn KeyValueStore>,
    table: String,
    public_projection: Vec<String>,
}

impl KeyValueUserRepository {
    /// Store users in `table`.
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            public_projection: PUBLIC_ATTRIBUTES.iter().map(|name| (*name).to_owned()).collect(),
        }
    }
}

/// Map the provided mask slots onto one `SET` instruction.
///
/// # Errors
///
/// Returns [`UpdateExpressionError::Empty`] when no slot carries a value; the
/// caller must not issue a write in that case.
pub fn build_user_update(
    mask: &UserUpdateMask,
) -> Result<UpdateExpression<String>, UpdateExpressionError> {
    UpdateExpressionBuilder::new()
        .set_if_present(FIRST_NAME_ATTRIBUTE, mask.first_name.clone())?
        .set_if_present(LAST_NAME_ATTRIBUTE, mask.last_name.clone())?
        .set_if_present(EMAIL_ATTRIBUTE, mask.email.clone())?
        .set_if_present(PASSWORD_ATTRIBUTE, mask.password.clone())?
        .build()
}

fn private_item(user: &PrivateUser) -> Item {
    let fields = user.fields();
    Item::from([
        (ID_ATTRIBUTE.to_owned(), user.id().as_ref().to_owned()),
        (FIRST_NAME_ATTRIBUTE.to_owned(), fields.first_name.clone()),
        (LAST_NAME_ATTRIBUTE.to_owned(), fields.last_name.clone()),
        (EMAIL_ATTRIBUTE.to_owned(), fields.email.clone()),
        (PASSWORD_ATTRIBUTE.to_owned(), fields.password.clone()),
    ])
}

fn public_user(mut item: Item) -> Result<PublicUser, UserPersistenceError> {
    let mut take = |attribute: &str| {
        item.remove(attribute).ok_or_else(|| {
            UserPersistenceError::decode(format!("item lacks attribute '{attribute}'"))
        })
    };
    let raw_id = take(ID_ATTRIBUTE)?;
    let first_name = take(FIRST_NAME_ATTRIBUTE)?;
    let last_name = take(LAST_NAME_ATTRIBUTE)?;
    let id = UserId::new(&raw_id)
        .map_err(|err| UserPersistenceError::decode(format!("item id '{raw_id}': {err}")))?;
    Ok(PublicUser {
        id,
        first_name,
        last_name,
    })
}

fn map_store_error(error: KeyValueStoreError) -> UserPersistenceError {
    match error {
        KeyValueStoreError::Connection { message } => UserPersistenceError::connection(message),
        KeyValueStoreError::Timeout { message } => UserPersistenceError::timeout(message),
        KeyValueStoreError::Decode { message } => UserPersistenceError::decode(message),
        KeyValueStoreError::ConditionFailed { message }
        | KeyValueStoreError::InvalidRequest { message } => UserPersistenceError::query(message),
    }
}

#[async_trait]
impl UserRepository for KeyValueUserRepository {
    async fn create(&self, user: &PrivateUser) -> Result<(), UserPersistenceError> {
        match self
            .store
            .put_item(&self.table, private_item(user), PutMode::CreateOnly)
            .await
        {
            Ok(()) => Ok(()),
            Err(KeyValueStoreError::ConditionFailed { .. }) => {
                Err(UserPersistenceError::conflict(user.id().as_ref()))
            }
            Err(err) => Err(map_store_error(err)),
        }
    }

    async fn find_public(&self, id: &UserId) -> Result<Option<PublicUser>, UserPersistenceError> {
        self.store
            .get_item(&self.table, id.as_ref(), &self.public_projection)
            .await
            .map_err(map_store_error)?
            .map(public_user)
            .transpose()
    }

    async fn list_public(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<PublicUser>, UserPersistenceError> {
        let items = self
            .store
            .scan(&self.table, limit, &self.public_projection)
            .await
            .map_err(map_store_error)?;
        items
            .into_iter()
            .filter_map(|item| match public_user(item) {
                Ok(user) => Some(Ok(user)),
                Err(UserPersistenceError::Decode { message }) => {
                    warn!(table = %self.table, %message, "skipping malformed user item");
                    None
                }
                Err(other) => Some(Err(other)),
            })
            .collect()
    }

    async fn update(
        &self,
        id: &UserId,
        mask: &UserUpdateMask,
    ) -> Result<UpdateOutcome, UserPersistenceError> {
        let expression = match build_user_update(mask) {
            Ok(expression) => expression,
            Err(UpdateExpressionError::Empty) => {
                debug!(user_id = %id, "empty update mask; no write issued");
                return Ok(UpdateOutcome::NoFieldsToUpdate);
            }
            Err(err) => return Err(UserPersistenceError::query(err.to_string())),
        };

        let request = UpdateRequest {
            table: self.table.clone(),
            key: id.as_ref().to_owned(),
            expression: expression.expression(),
            attribute_names: expression.attribute_names(),
            attribute_values: expression.into_attribute_values(),
        };
        match self.store.update_item(request).await {
            Ok(()) => Ok(UpdateOutcome::Applied),
            Err(KeyValueStoreError::ConditionFailed { .. }) => Ok(UpdateOutcome::NotFound),
            Err(err) => Err(map_store_error(err)),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        self.store
            .delete_item(&self.table, id.as_ref())
            .await
            .map_err(map_store_error)
    }

    async fn ping(&self) -> Result<(), UserPersistenceError> {
        self.store.ping().await.map_err(map_store_error)
    }
}
