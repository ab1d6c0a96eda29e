//! Deployment API client
//!
//! Reads the portal's `/api/deployment` collection. The resource wraps its
//! items as `{"results": [...]}`; a body without `results` is an empty list.

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use super::error::StatusResult;
use super::loader::{fetch_json, FeedSource};

/// A registered glider deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Deployment {
    pub completed: Option<bool>,
    pub created: Option<f64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub dap: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub deployment_dir: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub erddap: String,
    pub estimated_deploy_date: Option<f64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub estimated_deploy_location: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub iso: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub operator: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub sos: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub thredds: String,
    pub updated: Option<f64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub wmo_id: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct DeploymentList {
    #[serde(default)]
    results: Option<Vec<Deployment>>,
}

/// Client for the deployment collection
pub struct DeploymentClient {
    source: Arc<dyn FeedSource>,
}

impl DeploymentClient {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    /// Fetch every deployment
    pub async fn list(&self) -> StatusResult<Vec<Deployment>> {
        let list: DeploymentList = fetch_json(self.source.as_ref()).await?;
        let deployments = list.results.unwrap_or_default();

        tracing::debug!(
            source = %self.source.describe(),
            count = deployments.len(),
            "Fetched deployments"
        );
        Ok(deployments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::loader::MemorySource;

    #[tokio::test]
    async fn test_list_parses_results() {
        let body = r#"{
            "num_results": 1,
            "results": [{
                "name": "test-20200101T0000Z",
                "username": "test_user",
                "operator": "test",
                "completed": true,
                "deployment_dir": "test/test-20200101T0000Z",
                "estimated_deploy_date": null,
                "wmo_id": null
            }]
        }"#;
        let client = DeploymentClient::new(Arc::new(MemorySource::new(body)));

        let deployments = client.list().await.unwrap();
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].name, "test-20200101T0000Z");
        assert_eq!(deployments[0].completed, Some(true));
        assert_eq!(deployments[0].erddap, "");
    }

    #[tokio::test]
    async fn test_list_without_results_is_empty() {
        let client = DeploymentClient::new(Arc::new(MemorySource::new(r#"{"error": "nope"}"#)));
        assert!(client.list().await.unwrap().is_empty());
    }
}
