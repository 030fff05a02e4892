use super::decode::{
    array, index, join, object, obj_member, option_value, str_member, string, text_or_render,
    user,
};
use crate::errors::{JiraError, Result};
use crate::models::field_meta::{FieldMeta, FieldType, ItemType};
use crate::models::issue::CustomValue;
use serde_json::Value;

/// Decodes a custom field according to its catalog entry.
///
/// `Ok(None)` means the field is left out of the issue: its type is not one we
/// know how to read, or it is an array that decoded to nothing.
pub(super) fn decode(key: &str, meta: &FieldMeta, value: &Value) -> Result<Option<CustomValue>> {
    let Some(field_type) = &meta.field_type else {
        tracing::debug!(field = key, name = %meta.name, "dropping custom field without schema");
        return Ok(None);
    };

    let decoded = match field_type {
        FieldType::User => CustomValue::User(user(key, value)?),
        FieldType::Date | FieldType::DateTime => CustomValue::Text(string(key, value)?),
        FieldType::Number => match value {
            Value::Number(n) => CustomValue::Number(n.clone()),
            _ => return Err(JiraError::shape(key, "number")),
        },
        FieldType::Option => CustomValue::Text(option_value(key, value)?),
        FieldType::OptionWithChild => {
            let obj = object(key, value)?;
            let parent = str_member(key, obj, "value")?;
            let child = obj_member(key, obj, "child")?;
            let child = str_member(&join(key, "child"), child, "value")?;
            CustomValue::Cascade(parent, child)
        }
        // The declared type is not always what the service sends.
        FieldType::String => CustomValue::Text(text_or_render(value)),
        FieldType::Array => return decode_array(key, meta, value),
        FieldType::Other(kind) => {
            tracing::debug!(field = key, name = %meta.name, kind = %kind, "dropping custom field of unsupported type");
            return Ok(None);
        }
    };

    Ok(Some(decoded))
}

fn decode_array(key: &str, meta: &FieldMeta, value: &Value) -> Result<Option<CustomValue>> {
    let raw_items = array(key, value)?;

    let item_type = match &meta.item_type {
        Some(item_type @ (ItemType::String | ItemType::User | ItemType::Option)) => item_type,
        other => {
            tracing::debug!(
                field = key,
                name = %meta.name,
                items = other.as_ref().map(ItemType::as_str).unwrap_or(""),
                "dropping array custom field with unsupported item type"
            );
            return Ok(None);
        }
    };

    let mut items = Vec::with_capacity(raw_items.len());
    for (i, raw) in raw_items.iter().enumerate() {
        let path = index(key, i);
        let item = match item_type {
            ItemType::String => CustomValue::Text(string(&path, raw)?),
            ItemType::User => CustomValue::User(user(&path, raw)?),
            ItemType::Option => CustomValue::Text(option_value(&path, raw)?),
            ItemType::Other(_) => continue,
        };
        items.push(item);
    }

    if items.is_empty() {
        return Ok(None);
    }
    Ok(Some(CustomValue::List(items)))
}
