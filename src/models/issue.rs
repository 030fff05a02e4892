use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub display_name: String,
    /// Hidden by the service when the user's privacy settings say so.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// Another issue seen from this one: the parent or a subtask.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRef {
    pub key: String,
    pub summary: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueLink {
    /// Directional label of the link type, e.g. "blocks" or "is blocked by".
    pub kind: String,
    pub key: String,
    pub summary: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Watches {
    pub is_watching: bool,
    pub watch_count: u64,
}

/// Value of a custom field, shaped by the field's declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CustomValue {
    /// string, date, datetime and option fields
    Text(String),
    Number(serde_json::Number),
    User(User),
    /// option-with-child: parent option, child option
    Cascade(String, String),
    List(Vec<CustomValue>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_viewed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_category_change_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<IssueRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issue_links: Vec<IssueLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<User>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watches: Option<Watches>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, CustomValue>,
}
