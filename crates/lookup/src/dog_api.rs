use async_trait::async_trait;
use petcare_domain::config::LookupConfig;
use petcare_domain::lookup::{BreedLookup, LookupError};
use petcare_domain::model::{Breed, BreedId};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::http::{build_http_client, endpoint, get_json, record_outcome};

const SERVICE: &str = "dog_api";

/// JSON:API envelope returned by `GET /breeds/{id}`.
#[derive(Debug, Deserialize)]
struct Document {
    data: Resource,
}

#[derive(Debug, Deserialize)]
struct Resource {
    id: String,
    attributes: Attributes,
}

#[derive(Debug, Deserialize)]
struct Attributes {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    hypoallergenic: bool,
}

/// Breed lookup against the dogapi.dog v2 API.
#[derive(Clone)]
pub struct DogApiClient {
    http: Client,
    base_url: String,
}

impl DogApiClient {
    pub fn new(http: Client, base: &str) -> Self {
        Self {
            http,
            base_url: base.trim().to_string(),
        }
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self, LookupError> {
        let http = build_http_client(config.timeout())?;
        Ok(Self::new(http, config.dog_api_base_url()))
    }

    async fn fetch(&self, id: &BreedId) -> Result<Breed, LookupError> {
        if matches!(id.as_str(), "." | "..") {
            return Err(LookupError::NotFound(id.to_string()));
        }
        let url = endpoint(&self.base_url, &["breeds", id.as_str()])?;
        debug!(breed = %id, %url, "querying dog api");
        let document: Document = get_json(
            &self.http,
            SERVICE,
            url,
            id.as_str(),
            &[StatusCode::NOT_FOUND],
        )
        .await?;

        Ok(Breed {
            id: BreedId::new(document.data.id),
            name: document.data.attributes.name,
            description: document.data.attributes.description.unwrap_or_default(),
            hypoallergenic: document.data.attributes.hypoallergenic,
        })
    }
}

#[async_trait]
impl BreedLookup for DogApiClient {
    async fn breed(&self, id: &BreedId) -> Result<Breed, LookupError> {
        let outcome = self.fetch(id).await;
        record_outcome(SERVICE, &outcome);
        outcome
    }
}
