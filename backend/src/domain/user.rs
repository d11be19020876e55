//! User entity, its read/write projections, and the partial-update mask.
//!
//! The stored record is the *private* projection (every field). Read paths
//! only ever materialise the *public* projection; email and password never
//! leave the store on a read.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Partition key attribute of the users collection.
pub const ID_ATTRIBUTE: &str = "id";
/// Stored attribute holding the first name.
pub const FIRST_NAME_ATTRIBUTE: &str = "fName";
/// Stored attribute holding the last name.
pub const LAST_NAME_ATTRIBUTE: &str = "lName";
/// Stored attribute holding the email address.
pub const EMAIL_ATTRIBUTE: &str = "email";
/// Stored attribute holding the password.
pub const PASSWORD_ATTRIBUTE: &str = "password";

/// Attributes requested by every read path.
pub const PUBLIC_ATTRIBUTES: [&str; 3] = [ID_ATTRIBUTE, FIRST_NAME_ATTRIBUTE, LAST_NAME_ATTRIBUTE];

const REDACTED: &str = "<redacted>";

/// Validation errors raised when parsing a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// The identifier was blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier is not a canonical UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
}

/// Server-generated, immutable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from caller input.
    ///
    /// # Examples
    /// ```
    /// use user_intents::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    /// assert_eq!(id.as_ref(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// assert!(UserId::new("not-a-uuid").is_err());
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(raw.to_owned()))
    }

    /// Generate a fresh identifier. Only the create path calls this.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Caller-supplied fields for a new user (`usrInfo` on `createUser`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    /// First name, stored as `fName`.
    #[serde(rename = "fName")]
    pub first_name: String,
    /// Last name, stored as `lName`.
    #[serde(rename = "lName")]
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Password, stored as given.
    pub password: String,
}

impl fmt::Debug for UserFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFields")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Full stored record: the private projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateUser {
    id: UserId,
    fields: UserFields,
}

impl PrivateUser {
    /// Assign a fresh identifier to `fields`.
    ///
    /// The identifier is never taken from the caller.
    pub fn register(fields: UserFields) -> Self {
        Self {
            id: UserId::random(),
            fields,
        }
    }

    /// Rebuild a record that already has an identifier (store reads, fixtures).
    pub fn from_parts(id: UserId, fields: UserFields) -> Self {
        Self { id, fields }
    }

    /// Record identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Private fields.
    pub fn fields(&self) -> &UserFields {
        &self.fields
    }

    /// Public projection of this record.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            first_name: self.fields.first_name.clone(),
            last_name: self.fields.last_name.clone(),
        }
    }
}

/// Public projection returned by every read path.
///
/// Serialises as `{"id": ..., "fName": ..., "lName": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    /// Record identifier.
    pub id: UserId,
    /// First name.
    #[serde(rename = "fName")]
    pub first_name: String,
    /// Last name.
    #[serde(rename = "lName")]
    pub last_name: String,
}

/// Fields a caller explicitly asked to overwrite (`usrInfo` on `updateUser`).
///
/// One optional slot per known field. `None` means "leave untouched", never
/// "clear". The identifier has no slot: it cannot be updated.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdateMask {
    /// New first name.
    #[serde(rename = "fName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New last name.
    #[serde(rename = "lName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdateMask {
    /// Whether no slot carries a value, i.e. the update is a no-op.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
    }

    /// Number of slots carrying a value.
    pub fn len(&self) -> usize {
        [
            self.first_name.is_some(),
            self.last_name.is_some(),
            self.email.is_some(),
            self.password.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

impl fmt::Debug for UserUpdateMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserUpdateMask")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for identifiers, projections, and masks.

    use rstest::rstest;

    use super::*;

    fn fields() -> UserFields {
        UserFields {
            first_name: "Alice".to_owned(),
            last_name: "Smith".to_owned(),
            email: "a@x.com".to_owned(),
            password: "p1".to_owned(),
        }
    }

    #[rstest]
    #[case::blank("", UserValidationError::EmptyId)]
    #[case::padded(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    #[case::garbage("user-1", UserValidationError::InvalidId)]
    fn rejects_malformed_ids(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    fn registered_users_get_distinct_ids() {
        let first = PrivateUser::register(fields());
        let second = PrivateUser::register(fields());
        assert_ne!(first.id(), second.id());
    }

    #[rstest]
    fn public_projection_omits_private_fields() {
        let user = PrivateUser::register(fields());
        let value = serde_json::to_value(user.to_public()).expect("serialise public user");

        let object = value.as_object().expect("object");
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["fName", "id", "lName"]);
    }

    #[rstest]
    fn mask_counts_only_defined_slots() {
        let mask = UserUpdateMask {
            email: Some("b@x.com".to_owned()),
            password: Some("p2".to_owned()),
            ..UserUpdateMask::default()
        };
        assert!(!mask.is_empty());
        assert_eq!(mask.len(), 2);
        assert!(UserUpdateMask::default().is_empty());
    }

    #[rstest]
    fn debug_output_redacts_passwords() {
        let mask = UserUpdateMask {
            password: Some("hunter2".to_owned()),
            ..UserUpdateMask::default()
        };
        assert!(!format!("{mask:?}").contains("hunter2"));
        assert!(!format!("{:?}", fields()).contains("p1\""));
    }
}
