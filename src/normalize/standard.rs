use super::decode::{
    array, index, issue_ref, join, named, object, obj_member, present, str_member, string,
    text_or_render, user,
};
use crate::errors::{JiraError, Result};
use crate::models::issue::{Issue, IssueLink, Watches};
use serde_json::Value;

/// Applies one built-in field to `issue`. Keys outside the table are ignored.
pub(super) fn apply(issue: &mut Issue, key: &str, value: &Value) -> Result<()> {
    match key {
        "summary" => issue.summary = Some(string(key, value)?),
        "created" => issue.created = Some(string(key, value)?),
        "updated" => issue.updated = Some(string(key, value)?),
        "statuscategorychangedate" => {
            issue.status_category_change_date = Some(string(key, value)?)
        }
        "lastViewed" => issue.last_viewed = Some(string(key, value)?),
        "duedate" => issue.due_date = Some(string(key, value)?),

        "issuetype" => issue.issue_type = Some(named(key, value, "name")?),
        "status" => issue.status = Some(named(key, value, "name")?),
        "priority" => issue.priority = Some(named(key, value, "name")?),
        "project" => issue.project_key = Some(named(key, value, "key")?),

        "assignee" => issue.assignee = Some(user(key, value)?),
        "reporter" => issue.reporter = Some(user(key, value)?),
        "creator" => issue.creator = Some(user(key, value)?),

        "parent" => issue.parent = Some(issue_ref(key, value)?),
        "subtasks" => {
            issue.subtasks = array(key, value)?
                .iter()
                .enumerate()
                .map(|(i, subtask)| issue_ref(&index(key, i), subtask))
                .collect::<Result<_>>()?
        }
        "issuelinks" => {
            issue.issue_links = array(key, value)?
                .iter()
                .enumerate()
                .map(|(i, link)| issue_link(&index(key, i), link))
                .collect::<Result<_>>()?
        }

        "labels" => {
            issue.labels = array(key, value)?
                .iter()
                .enumerate()
                .map(|(i, label)| string(&index(key, i), label))
                .collect::<Result<_>>()?
        }

        "watches" => issue.watches = Some(watches(key, value)?),

        // Rich documents, kept as text.
        "description" => issue.description = Some(text_or_render(value)),
        "comment" => issue.comment = Some(text_or_render(value)),

        _ => tracing::trace!(field = key, "ignoring unmapped standard field"),
    }

    Ok(())
}

fn issue_link(field: &str, value: &Value) -> Result<IssueLink> {
    let link = object(field, value)?;
    let link_type = obj_member(field, link, "type")?;

    let (direction, linked) = match (present(link, "inwardIssue"), present(link, "outwardIssue")) {
        (Some(linked), None) => ("inward", linked),
        (None, Some(linked)) => ("outward", linked),
        _ => {
            return Err(JiraError::shape(
                field,
                "exactly one of inwardIssue or outwardIssue",
            ))
        }
    };

    let kind = str_member(&join(field, "type"), link_type, direction)?;
    let target = issue_ref(&join(field, &format!("{}Issue", direction)), linked)?;

    Ok(IssueLink {
        kind,
        key: target.key,
        summary: target.summary,
        status: target.status,
    })
}

fn watches(field: &str, value: &Value) -> Result<Watches> {
    let obj = object(field, value)?;

    let is_watching = obj
        .get("isWatching")
        .and_then(Value::as_bool)
        .ok_or_else(|| JiraError::shape(join(field, "isWatching"), "boolean"))?;
    let watch_count = obj
        .get("watchCount")
        .and_then(Value::as_u64)
        .ok_or_else(|| JiraError::shape(join(field, "watchCount"), "non-negative integer"))?;

    Ok(Watches {
        is_watching,
        watch_count,
    })
}
