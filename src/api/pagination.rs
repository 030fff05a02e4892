use super::jira::JiraClient;
use crate::errors::{JiraError, Result};
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct Page {
    total: u64,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl JiraClient {
    /// Walks a `startAt`/`maxResults` paged endpoint and returns every item of
    /// the `result_key` array, in server order.
    ///
    /// One failed page fails the whole listing.
    pub async fn list_raw(&self, path: &str, result_key: &str) -> Result<Vec<Value>> {
        let mut items: Vec<Value> = Vec::new();

        loop {
            let page_path = format!(
                "{}?startAt={}&maxResults={}",
                path,
                items.len(),
                PAGE_SIZE
            );
            let mut page: Page = self.get(&page_path).await?;

            let batch = match page.rest.remove(result_key) {
                Some(Value::Array(batch)) => batch,
                _ => {
                    return Err(JiraError::decode(
                        &page_path,
                        serde_json::Error::custom(format!("missing array `{}`", result_key)),
                    ))
                }
            };

            let added = batch.len();
            items.extend(batch);

            if page.total <= items.len() as u64 {
                break;
            }
            if added == 0 {
                tracing::warn!(
                    path,
                    total = page.total,
                    fetched = items.len(),
                    "empty page before reaching total; stopping"
                );
                break;
            }
        }

        Ok(items)
    }

    /// Issue types that can be created in `project`.
    pub async fn get_issue_types(&self, project: &str) -> Result<Vec<Value>> {
        let path = format!(
            "/rest/api/3/issue/createmeta/{}/issuetypes",
            urlencoding::encode(project)
        );
        self.list_raw(&path, "issueTypes").await
    }

    /// Fields offered when creating an issue of `type_id` in `project`.
    pub async fn get_create_fields(&self, project: &str, type_id: &str) -> Result<Vec<Value>> {
        let path = format!(
            "/rest/api/3/issue/createmeta/{}/issuetypes/{}",
            urlencoding::encode(project),
            urlencoding::encode(type_id)
        );
        self.list_raw(&path, "fields").await
    }
}
