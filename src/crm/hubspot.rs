// 🌐 HubSpot Page Source - CRM v3 object listing over HTTP
//
// GET {base}/crm/v3/objects/{type}?limit=..&after=..&properties=..&archived=false
// Blocking client: extraction is a one-shot batch run.

use super::error::SourceError;
use super::source::{ObjectType, Page, PageSource};
use crate::config::CrmConfig;
use std::time::Duration;

pub struct HubSpotClient {
    http: reqwest::blocking::Client,
    base_url: String,
    access_token: String,
    page_limit: u32,
}

impl HubSpotClient {
    pub fn new(config: &CrmConfig) -> Result<Self, SourceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(HubSpotClient {
            http,
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
            page_limit: config.page_limit,
        })
    }

    fn objects_url(&self, object: ObjectType) -> String {
        format!("{}/crm/v3/objects/{}", self.base_url, object.as_str())
    }
}

impl PageSource for HubSpotClient {
    fn fetch_page(
        &self,
        object: ObjectType,
        properties: &[String],
        associations: &[ObjectType],
        after: Option<&str>,
    ) -> Result<Page, SourceError> {
        let mut query: Vec<(&str, String)> = vec![
            ("limit", self.page_limit.to_string()),
            ("archived", "false".to_string()),
        ];
        if !properties.is_empty() {
            query.push(("properties", properties.join(",")));
        }
        if !associations.is_empty() {
            let names: Vec<&str> = associations.iter().map(|a| a.as_str()).collect();
            query.push(("associations", names.join(",")));
        }
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        let response = self
            .http
            .get(self.objects_url(object))
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SourceError::Transport(format!("HTTP {} from {}: {}", status, object, body)));
        }

        Page::from_json(&body)
    }
}
