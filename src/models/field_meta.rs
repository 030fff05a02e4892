use crate::errors::{JiraError, Result};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Declared type of a field, taken from `schema.type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Date,
    DateTime,
    Option,
    OptionWithChild,
    User,
    Array,
    Other(String),
}

/// Element type of an `array` field, taken from `schema.items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemType {
    String,
    User,
    Option,
    Other(String),
}

impl From<&str> for FieldType {
    fn from(value: &str) -> Self {
        match value {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "date" => FieldType::Date,
            "datetime" => FieldType::DateTime,
            "option" => FieldType::Option,
            "option-with-child" => FieldType::OptionWithChild,
            "user" => FieldType::User,
            "array" => FieldType::Array,
            other => FieldType::Other(other.to_string()),
        }
    }
}

impl From<&str> for ItemType {
    fn from(value: &str) -> Self {
        match value {
            "string" => ItemType::String,
            "user" => ItemType::User,
            "option" => ItemType::Option,
            other => ItemType::Other(other.to_string()),
        }
    }
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Option => "option",
            FieldType::OptionWithChild => "option-with-child",
            FieldType::User => "user",
            FieldType::Array => "array",
            FieldType::Other(other) => other,
        }
    }
}

impl ItemType {
    pub fn as_str(&self) -> &str {
        match self {
            ItemType::String => "string",
            ItemType::User => "user",
            ItemType::Option => "option",
            ItemType::Other(other) => other,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for ItemType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub untranslated_name: Option<String>,
    /// `None` when the service sent no schema for the field.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    pub custom: bool,
}

impl FieldMeta {
    /// Parses one record of `GET /rest/api/3/field`.
    pub fn from_raw(record: &Value) -> Result<Self> {
        let obj = record
            .as_object()
            .ok_or_else(|| JiraError::Schema("field definition is not an object".to_string()))?;

        let key = required_str(obj, "key", "<unknown>")?;
        let name = required_str(obj, "name", &key)?;
        let custom = obj
            .get("custom")
            .and_then(Value::as_bool)
            .ok_or_else(|| missing(&key, "custom", "boolean"))?;
        let untranslated_name = obj
            .get("untranslatedName")
            .and_then(Value::as_str)
            .map(str::to_string);

        let (field_type, item_type) = match obj.get("schema") {
            None | Some(Value::Null) => (None, None),
            Some(Value::Object(schema)) => parse_schema(&key, schema)?,
            Some(_) => return Err(missing(&key, "schema", "object")),
        };

        Ok(Self {
            key,
            name,
            untranslated_name,
            field_type,
            item_type,
            custom,
        })
    }
}

fn parse_schema(
    key: &str,
    schema: &Map<String, Value>,
) -> Result<(Option<FieldType>, Option<ItemType>)> {
    let field_type = FieldType::from(required_str(schema, "type", key)?.as_str());

    let item_type = if field_type == FieldType::Array {
        let items = schema
            .get("items")
            .and_then(Value::as_str)
            .ok_or_else(|| missing(key, "schema.items", "string"))?;
        Some(ItemType::from(items))
    } else {
        None
    };

    Ok((Some(field_type), item_type))
}

fn required_str(obj: &Map<String, Value>, attr: &str, key: &str) -> Result<String> {
    obj.get(attr)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(key, attr, "string"))
}

fn missing(key: &str, attr: &str, expected: &str) -> JiraError {
    JiraError::Schema(format!(
        "field '{}': attribute '{}' is missing or not a {}",
        key, attr, expected
    ))
}

/// Immutable index of every field definition known to the service.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: HashMap<String, FieldMeta>,
}

impl FieldCatalog {
    /// Builds the whole catalog or nothing: the first bad record fails the load.
    pub fn from_raw(records: &[Value]) -> Result<Self> {
        records.iter().map(FieldMeta::from_raw).collect()
    }

    pub fn lookup(&self, key: &str) -> Option<&FieldMeta> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.values()
    }
}

impl FromIterator<FieldMeta> for FieldCatalog {
    fn from_iter<I: IntoIterator<Item = FieldMeta>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|meta| (meta.key.clone(), meta))
                .collect(),
        }
    }
}
