//! Argument coercion against the declared input types.
//!
//! Each helper returns the message of the field error on failure.

use std::collections::BTreeMap;

use crate::domain::query::InputValue;
use crate::domain::user::{
    EMAIL_ATTRIBUTE, FIRST_NAME_ATTRIBUTE, LAST_NAME_ATTRIBUTE, PASSWORD_ATTRIBUTE,
};
use crate::domain::{UserFields, UserUpdateMask};

type Arguments = BTreeMap<String, InputValue>;

const USER_INPUT: &str = "UserInput";
const USER_UPDATE_INPUT: &str = "UserUpdateInput";
const INPUT_FIELDS: [&str; 4] = [
    FIRST_NAME_ATTRIBUTE,
    LAST_NAME_ATTRIBUTE,
    EMAIL_ATTRIBUTE,
    PASSWORD_ATTRIBUTE,
];

fn present<'a>(arguments: &'a Arguments, name: &str) -> Option<&'a InputValue> {
    arguments
        .get(name)
        .filter(|value| !matches!(value, InputValue::Null))
}

/// Reject arguments the field does not declare.
pub(super) fn reject_unknown(
    arguments: &Arguments,
    declared: &[&str],
    field: &str,
) -> Result<(), String> {
    match arguments.keys().find(|name| !declared.contains(&name.as_str())) {
        Some(name) => Err(format!("Unknown argument \"{name}\" on field \"{field}\"")),
        None => Ok(()),
    }
}

/// Coerce an `ID!` argument. Integers are accepted and stringified.
pub(super) fn required_id(arguments: &Arguments, name: &str) -> Result<String, String> {
    match present(arguments, name) {
        None => Err(format!(
            "Argument \"{name}\" of required type \"ID!\" was not provided"
        )),
        Some(InputValue::String(value)) => Ok(value.clone()),
        Some(InputValue::Int(value)) => Ok(value.to_string()),
        Some(other) => Err(format!(
            "Argument \"{name}\" has invalid value {other}: expected type \"ID\""
        )),
    }
}

/// Coerce a `String!` argument.
pub(super) fn required_string(arguments: &Arguments, name: &str) -> Result<String, String> {
    match present(arguments, name) {
        None => Err(format!(
            "Argument \"{name}\" of required type \"String!\" was not provided"
        )),
        Some(InputValue::String(value)) => Ok(value.clone()),
        Some(other) => Err(format!(
            "Argument \"{name}\" has invalid value {other}: expected type \"String\""
        )),
    }
}

/// Coerce an optional `Int` argument.
pub(super) fn optional_int(arguments: &Arguments, name: &str) -> Result<Option<i64>, String> {
    match present(arguments, name) {
        None => Ok(None),
        Some(InputValue::Int(value)) => Ok(Some(*value)),
        Some(other) => Err(format!(
            "Argument \"{name}\" has invalid value {other}: expected type \"Int\""
        )),
    }
}

/// Coerce an optional `UserInput` object; every field is `String!`.
pub(super) fn user_input(arguments: &Arguments, name: &str) -> Result<Option<UserFields>, String> {
    let Some(value) = present(arguments, name) else {
        return Ok(None);
    };
    let object = input_object(value, name, USER_INPUT)?;
    let field = |attribute: &str| match object.get(attribute) {
        Some(InputValue::String(text)) => Ok(text.clone()),
        None | Some(InputValue::Null) => Err(format!(
            "Field \"{USER_INPUT}.{attribute}\" of required type \"String!\" was not provided"
        )),
        Some(other) => Err(format!(
            "Field \"{USER_INPUT}.{attribute}\" has invalid value {other}: expected type \"String\""
        )),
    };
    Ok(Some(UserFields {
        first_name: field(FIRST_NAME_ATTRIBUTE)?,
        last_name: field(LAST_NAME_ATTRIBUTE)?,
        email: field(EMAIL_ATTRIBUTE)?,
        password: field(PASSWORD_ATTRIBUTE)?,
    }))
}

/// Coerce an optional `UserUpdateInput` object into a mask.
///
/// Absent and `null` fields leave their slot empty.
pub(super) fn user_update_input(arguments: &Arguments, name: &str) -> Result<UserUpdateMask, String> {
    let Some(value) = present(arguments, name) else {
        return Ok(UserUpdateMask::default());
    };
    let object = input_object(value, name, USER_UPDATE_INPUT)?;
    let slot = |attribute: &str| match object.get(attribute) {
        None | Some(InputValue::Null) => Ok(None),
        Some(InputValue::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(format!(
            "Field \"{USER_UPDATE_INPUT}.{attribute}\" has invalid value {other}: expected type \"String\""
        )),
    };
    Ok(UserUpdateMask {
        first_name: slot(FIRST_NAME_ATTRIBUTE)?,
        last_name: slot(LAST_NAME_ATTRIBUTE)?,
        email: slot(EMAIL_ATTRIBUTE)?,
        password: slot(PASSWORD_ATTRIBUTE)?,
    })
}

fn input_object<'a>(
    value: &'a InputValue,
    argument: &str,
    type_name: &str,
) -> Result<&'a BTreeMap<String, InputValue>, String> {
    let InputValue::Object(object) = value else {
        return Err(format!(
            "Argument \"{argument}\" has invalid value {value}: expected type \"{type_name}\""
        ));
    };
    if let Some(unknown) = object
        .keys()
        .find(|key| !INPUT_FIELDS.contains(&key.as_str()))
    {
        return Err(format!(
            "Field \"{unknown}\" is not defined by type \"{type_name}\""
        ));
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn args(pairs: Vec<(&str, InputValue)>) -> Arguments {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value))
            .collect()
    }

    #[rstest]
    fn ids_accept_integers() {
        let arguments = args(vec![("id", InputValue::Int(42))]);
        assert_eq!(required_id(&arguments, "id"), Ok("42".to_owned()));
    }

    #[rstest]
    #[case::absent(vec![])]
    #[case::null(vec![("id", InputValue::Null)])]
    fn ids_are_required(#[case] pairs: Vec<(&str, InputValue)>) {
        assert_eq!(
            required_id(&args(pairs), "id"),
            Err("Argument \"id\" of required type \"ID!\" was not provided".to_owned())
        );
    }

    #[rstest]
    fn user_input_reports_the_missing_field() {
        let info = BTreeMap::from([
            ("fName".to_owned(), InputValue::from("Alice")),
            ("lName".to_owned(), InputValue::from("Smith")),
            ("password".to_owned(), InputValue::from("p1")),
        ]);
        let arguments = args(vec![("usrInfo", InputValue::Object(info))]);

        assert_eq!(
            user_input(&arguments, "usrInfo"),
            Err("Field \"UserInput.email\" of required type \"String!\" was not provided".to_owned())
        );
    }

    #[rstest]
    fn update_input_keeps_only_provided_slots() {
        let info = BTreeMap::from([
            ("lName".to_owned(), InputValue::from("Hopper")),
            ("email".to_owned(), InputValue::Null),
        ]);
        let arguments = args(vec![("usrInfo", InputValue::Object(info))]);

        let mask = user_update_input(&arguments, "usrInfo").expect("coerce");

        assert_eq!(mask.last_name.as_deref(), Some("Hopper"));
        assert_eq!(mask.len(), 1);
    }

    #[rstest]
    fn update_input_rejects_the_key_attribute() {
        let info = BTreeMap::from([("id".to_owned(), InputValue::from("other"))]);
        let arguments = args(vec![("usrInfo", InputValue::Object(info))]);

        assert_eq!(
            user_update_input(&arguments, "usrInfo"),
            Err("Field \"id\" is not defined by type \"UserUpdateInput\"".to_owned())
        );
    }

    #[rstest]
    fn unknown_arguments_are_named() {
        let arguments = args(vec![("id", InputValue::from("x")), ("force", InputValue::Boolean(true))]);
        assert_eq!(
            reject_unknown(&arguments, &["id"], "Mutation.deleteUser"),
            Err("Unknown argument \"force\" on field \"Mutation.deleteUser\"".to_owned())
        );
    }
}
