//! Turns the service's loosely-typed issue JSON into an [`Issue`].
//!
//! Standard fields are dispatched by key, custom fields by the type recorded in
//! the [`FieldCatalog`]. Any shape mismatch fails the whole issue.

mod custom;
mod decode;
mod standard;

use crate::errors::Result;
use crate::models::field_meta::FieldCatalog;
use crate::models::issue::Issue;
use serde_json::Value;

pub const CUSTOM_FIELD_PREFIX: &str = "customfield_";

pub fn normalize(raw: &Value, catalog: &FieldCatalog) -> Result<Issue> {
    let root = decode::object("", raw)?;
    let key = decode::str_member("", root, "key")?;
    let fields = decode::obj_member("", root, "fields")?;

    let mut issue = Issue {
        key,
        ..Default::default()
    };

    for (name, value) in fields {
        if decode::is_blank(value) {
            continue;
        }

        if name.starts_with(CUSTOM_FIELD_PREFIX) {
            let Some(meta) = catalog.lookup(name) else {
                tracing::trace!(field = %name, "skipping custom field missing from catalog");
                continue;
            };
            if let Some(decoded) = custom::decode(name, meta, value)? {
                issue.custom_fields.insert(name.clone(), decoded);
            }
        } else {
            standard::apply(&mut issue, name, value)?;
        }
    }

    Ok(issue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JiraError;
    use crate::models::field_meta::{FieldMeta, FieldType, ItemType};
    use crate::models::issue::{CustomValue, IssueLink, Watches};
    use serde_json::json;

    fn custom_meta(key: &str, field_type: &str, item_type: Option<&str>) -> FieldMeta {
        FieldMeta {
            key: key.to_string(),
            name: key.to_string(),
            untranslated_name: None,
            field_type: Some(FieldType::from(field_type)),
            item_type: item_type.map(ItemType::from),
            custom: true,
        }
    }

    fn catalog() -> FieldCatalog {
        [
            custom_meta("customfield_10010", "array", Some("option")),
            custom_meta("customfield_10011", "option-with-child", None),
            custom_meta("customfield_10012", "number", None),
            custom_meta("customfield_10013", "user", None),
            custom_meta("customfield_10014", "array", Some("string")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_full_issue() {
        let raw = json!({
            "id": "10042",
            "key": "PROJ-42",
            "fields": {
                "summary": "Checkout fails",
                "issuetype": {"name": "Bug"},
                "status": {"name": "In Progress"},
                "project": {"key": "PROJ"},
                "created": "2024-03-01T10:00:00.000+0000",
                "assignee": {"displayName": "Ada", "emailAddress": "ada@example.com"},
                "reporter": {"displayName": "Grace"},
                "labels": ["payments"],
                "parent": {"key": "PROJ-1", "fields": {"summary": "Epic", "status": {"name": "Open"}}},
                "customfield_10010": [{"value": "A"}, {"value": "B"}],
                "customfield_10011": {"value": "P", "child": {"value": "C"}},
                "customfield_10012": 5
            }
        });

        let issue = normalize(&raw, &catalog()).unwrap();

        assert_eq!(issue.key, "PROJ-42");
        assert_eq!(issue.summary.as_deref(), Some("Checkout fails"));
        assert_eq!(issue.issue_type.as_deref(), Some("Bug"));
        assert_eq!(issue.status.as_deref(), Some("In Progress"));
        assert_eq!(issue.project_key.as_deref(), Some("PROJ"));
        assert_eq!(issue.reporter.as_ref().unwrap().email_address, None);
        assert_eq!(issue.parent.as_ref().unwrap().key, "PROJ-1");
        assert_eq!(
            issue.custom_fields["customfield_10010"],
            CustomValue::List(vec![
                CustomValue::Text("A".to_string()),
                CustomValue::Text("B".to_string()),
            ])
        );
        assert_eq!(
            issue.custom_fields["customfield_10011"],
            CustomValue::Cascade("P".to_string(), "C".to_string())
        );

        let output = serde_json::to_value(&issue).unwrap();
        assert_eq!(output["customFields"]["customfield_10010"], json!(["A", "B"]));
        assert_eq!(output["customFields"]["customfield_10011"], json!(["P", "C"]));
        assert_eq!(output["customFields"]["customfield_10012"], json!(5));
    }

    #[test]
    fn test_blank_values_are_omitted() {
        let raw = json!({
            "key": "PROJ-7",
            "fields": {
                "summary": null,
                "labels": [],
                "assignee": {},
                "watches": null,
                "issuelinks": [],
                "customfield_10012": null,
                "customfield_10013": {},
                "customfield_10014": []
            }
        });

        let issue = normalize(&raw, &catalog()).unwrap();
        assert!(issue.custom_fields.is_empty());
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({"key": "PROJ-7"})
        );
    }

    #[test]
    fn test_unknown_custom_field_is_dropped() {
        let raw = json!({
            "key": "PROJ-8",
            "fields": {"customfield_99999": "mystery", "customfield_10012": 3}
        });

        let issue = normalize(&raw, &catalog()).unwrap();
        assert!(!issue.custom_fields.contains_key("customfield_99999"));
        assert!(issue.custom_fields.contains_key("customfield_10012"));
    }

    #[test]
    fn test_watches() {
        let raw = json!({
            "key": "PROJ-9",
            "fields": {"watches": {"self": "https://x", "isWatching": true, "watchCount": 3}}
        });

        let issue = normalize(&raw, &FieldCatalog::default()).unwrap();
        assert_eq!(
            issue.watches,
            Some(Watches {
                is_watching: true,
                watch_count: 3
            })
        );
    }

    #[test]
    fn test_outward_issue_link() {
        let raw = json!({
            "key": "PROJ-10",
            "fields": {
                "issuelinks": [{
                    "type": {"inward": "is blocked by", "outward": "blocks"},
                    "outwardIssue": {"key": "X-1", "fields": {"summary": "S", "status": {"name": "Open"}}}
                }]
            }
        });

        let issue = normalize(&raw, &FieldCatalog::default()).unwrap();
        assert_eq!(
            issue.issue_links,
            vec![IssueLink {
                kind: "blocks".to_string(),
                key: "X-1".to_string(),
                summary: "S".to_string(),
                status: "Open".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_fields_is_shape_error() {
        let err = normalize(&json!({"key": "PROJ-11"}), &catalog()).unwrap_err();
        assert!(matches!(err, JiraError::FieldShape { ref field, .. } if field == "fields"));

        let err = normalize(&json!({"fields": {}}), &catalog()).unwrap_err();
        assert!(matches!(err, JiraError::FieldShape { ref field, .. } if field == "key"));

        let err = normalize(&json!([]), &catalog()).unwrap_err();
        assert!(matches!(err, JiraError::FieldShape { expected: "object", .. }));
    }

    #[test]
    fn test_malformed_field_fails_whole_issue() {
        let raw = json!({
            "key": "PROJ-12",
            "fields": {"summary": "fine", "status": "Open"}
        });

        let err = normalize(&raw, &catalog()).unwrap_err();
        assert!(matches!(err, JiraError::FieldShape { ref field, expected: "object" } if field == "status"));
    }

    #[test]
    fn test_every_standard_key_lands_in_output() {
        let user = json!({"displayName": "C", "emailAddress": "c@example.com"});
        let linked = json!({"key": "X-1", "fields": {"summary": "S", "status": {"name": "Open"}}});
        let comment = json!({"comments": [], "total": 0});

        let cases = [
            ("summary", json!("sum"), "summary", json!("sum")),
            ("created", json!("c"), "created", json!("c")),
            ("updated", json!("u"), "updated", json!("u")),
            ("lastViewed", json!("l"), "lastViewed", json!("l")),
            ("statuscategorychangedate", json!("s"), "statusCategoryChangeDate", json!("s")),
            ("duedate", json!("2024-06-30"), "dueDate", json!("2024-06-30")),
            ("issuetype", json!({"name": "Task"}), "type", json!("Task")),
            ("status", json!({"name": "Open"}), "status", json!("Open")),
            ("priority", json!({"name": "Low"}), "priority", json!("Low")),
            ("project", json!({"key": "PROJ"}), "projectKey", json!("PROJ")),
            ("assignee", user.clone(), "assignee", user.clone()),
            ("reporter", user.clone(), "reporter", user.clone()),
            ("creator", user.clone(), "creator", user.clone()),
            ("labels", json!(["a", "b"]), "labels", json!(["a", "b"])),
            ("parent", linked.clone(), "parent", json!({"key": "X-1", "summary": "S", "status": "Open"})),
            ("subtasks", json!([linked.clone()]), "subtasks", json!([{"key": "X-1", "summary": "S", "status": "Open"}])),
            (
                "issuelinks",
                json!([{"type": {"inward": "is cloned by", "outward": "clones"}, "outwardIssue": linked}]),
                "issueLinks",
                json!([{"kind": "clones", "key": "X-1", "summary": "S", "status": "Open"}]),
            ),
            (
                "watches",
                json!({"isWatching": false, "watchCount": 1}),
                "watches",
                json!({"isWatching": false, "watchCount": 1}),
            ),
            ("description", json!("plain text"), "description", json!("plain text")),
            ("comment", comment.clone(), "comment", json!(comment.to_string())),
        ];

        for (key, raw_value, output_key, expected) in cases {
            let mut fields = serde_json::Map::new();
            fields.insert(key.to_string(), raw_value);
            let raw = json!({"key": "PROJ-20", "fields": fields});

            let issue = normalize(&raw, &FieldCatalog::default()).unwrap();
            let output = serde_json::to_value(&issue).unwrap();

            assert_eq!(output[output_key], expected, "standard field {}", key);
            assert_eq!(output.as_object().unwrap().len(), 2, "standard field {}", key);
        }
    }

    #[test]
    fn test_every_custom_type_lands_in_output() {
        let cases = [
            ("string", None, json!("free text"), json!("free text")),
            ("number", None, json!(13), json!(13)),
            ("date", None, json!("2024-06-30"), json!("2024-06-30")),
            ("datetime", None, json!("2024-06-30T12:00:00.000+0000"), json!("2024-06-30T12:00:00.000+0000")),
            ("option", None, json!({"value": "Red", "id": "1"}), json!("Red")),
            ("option-with-child", None, json!({"value": "P", "child": {"value": "C"}}), json!(["P", "C"])),
            ("user", None, json!({"displayName": "U"}), json!({"displayName": "U"})),
            ("array", Some("string"), json!(["x", "y"]), json!(["x", "y"])),
            ("array", Some("option"), json!([{"value": "A"}]), json!(["A"])),
            ("array", Some("user"), json!([{"displayName": "U"}]), json!([{"displayName": "U"}])),
        ];

        for (field_type, item_type, raw_value, expected) in cases {
            let catalog: FieldCatalog = [custom_meta("customfield_1", field_type, item_type)]
                .into_iter()
                .collect();
            let raw = json!({"key": "PROJ-21", "fields": {"customfield_1": raw_value}});

            let issue = normalize(&raw, &catalog).unwrap();
            let output = serde_json::to_value(&issue).unwrap();

            assert_eq!(
                output["customFields"]["customfield_1"], expected,
                "custom type {} {:?}",
                field_type, item_type
            );
        }
    }

    #[test]
    fn test_catalog_is_injected() {
        let raw = json!({"key": "PROJ-13", "fields": {"customfield_10012": 2}});

        let with = normalize(&raw, &catalog()).unwrap();
        let without = normalize(&raw, &FieldCatalog::default()).unwrap();

        assert_eq!(with.custom_fields.len(), 1);
        assert!(without.custom_fields.is_empty());
    }
}
