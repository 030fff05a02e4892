use crate::errors::{JiraError, Result, TransportError};
use crate::models::field_meta::FieldCatalog;
use crate::models::issue::Issue;
use crate::normalize::normalize;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const FIELDS_PATH: &str = "/rest/api/3/field";

pub struct JiraClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl JiraClient {
    pub fn new(base_url: String, username: String, password: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }

    /// Sends one request and decodes the JSON body into `T`.
    ///
    /// Anything above 299 is a failure; the body of the error response is kept
    /// for the message.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "sending request");

        let mut request = self.client.request(method, &url);
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        if status.as_u16() > 299 {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| JiraError::decode(path, e))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    /// Fetches every field definition and indexes it by key.
    pub async fn load_fields(&self) -> Result<FieldCatalog> {
        let records: Vec<Value> = self.get(FIELDS_PATH).await?;
        let catalog = FieldCatalog::from_raw(&records)?;

        if catalog.is_empty() {
            tracing::warn!("server returned no field definitions; custom fields will be dropped");
        }
        tracing::debug!(count = catalog.len(), "loaded field catalog");
        Ok(catalog)
    }

    pub async fn get_issue_raw(&self, key: &str) -> Result<Value> {
        let path = format!("/rest/api/3/issue/{}", urlencoding::encode(key));
        self.get(&path).await
    }

    pub async fn get_issue(&self, key: &str, catalog: &FieldCatalog) -> Result<Issue> {
        let raw = self.get_issue_raw(key).await?;
        tracing::debug!(issue = %raw, "raw issue");

        normalize(&raw, catalog)
    }
}
