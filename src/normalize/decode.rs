//! Shape checks over raw `serde_json::Value`s.
//!
//! Every helper takes the dotted path of the value being read so that a
//! mismatch is reported against the exact field, e.g. `issuelinks[0].type`.

use crate::errors::{JiraError, Result};
use crate::models::issue::{IssueRef, User};
use serde_json::{Map, Value};

pub(super) fn join(field: &str, name: &str) -> String {
    if field.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", field, name)
    }
}

pub(super) fn index(field: &str, i: usize) -> String {
    format!("{}[{}]", field, i)
}

/// `null`, `[]` and `{}` carry no information and are dropped.
pub(super) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => obj.is_empty(),
        _ => false,
    }
}

pub(super) fn object<'a>(field: &str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| JiraError::shape(field, "object"))
}

pub(super) fn array<'a>(field: &str, value: &'a Value) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| JiraError::shape(field, "array"))
}

pub(super) fn string(field: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| JiraError::shape(field, "string"))
}

pub(super) fn str_member(field: &str, obj: &Map<String, Value>, name: &str) -> Result<String> {
    match obj.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(JiraError::shape(join(field, name), "string")),
    }
}

pub(super) fn opt_str_member(
    field: &str,
    obj: &Map<String, Value>,
    name: &str,
) -> Result<Option<String>> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(JiraError::shape(join(field, name), "string")),
    }
}

pub(super) fn obj_member<'a>(
    field: &str,
    obj: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a Map<String, Value>> {
    match obj.get(name) {
        Some(Value::Object(inner)) => Ok(inner),
        _ => Err(JiraError::shape(join(field, name), "object")),
    }
}

/// Member that is present and not null.
pub(super) fn present<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|value| !value.is_null())
}

/// Strings pass through untouched; anything else becomes its compact JSON text.
pub(super) fn text_or_render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `{name: ...}` objects such as status, priority and issuetype.
pub(super) fn named(field: &str, value: &Value, name: &str) -> Result<String> {
    str_member(field, object(field, value)?, name)
}

pub(super) fn user(field: &str, value: &Value) -> Result<User> {
    let obj = object(field, value)?;
    Ok(User {
        display_name: str_member(field, obj, "displayName")?,
        email_address: opt_str_member(field, obj, "emailAddress")?,
    })
}

/// `{key, fields: {summary, status: {name}}}` as used by parent, subtasks and links.
pub(super) fn issue_ref(field: &str, value: &Value) -> Result<IssueRef> {
    let obj = object(field, value)?;
    let key = str_member(field, obj, "key")?;

    let fields_path = join(field, "fields");
    let fields = obj_member(field, obj, "fields")?;
    let summary = str_member(&fields_path, fields, "summary")?;
    let status = obj_member(&fields_path, fields, "status")?;
    let status = str_member(&join(&fields_path, "status"), status, "name")?;

    Ok(IssueRef {
        key,
        summary,
        status,
    })
}

/// Label of a selected option: `{value: "..."}`.
pub(super) fn option_value(field: &str, value: &Value) -> Result<String> {
    str_member(field, object(field, value)?, "value")
}
