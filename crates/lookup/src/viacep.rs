use async_trait::async_trait;
use petcare_domain::config::LookupConfig;
use petcare_domain::lookup::{AddressLookup, LookupError};
use petcare_domain::model::{Address, PostalCode};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::http::{build_http_client, endpoint, get_json, record_outcome};

const SERVICE: &str = "viacep";

/// ViaCEP answers unknown postal codes with `200 {"erro": true}`; malformed
/// ones get a 400.
#[derive(Debug, Deserialize)]
struct ViaCepPayload {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    complemento: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl ViaCepPayload {
    fn is_miss(&self) -> bool {
        match &self.erro {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag != "false",
            Some(_) => true,
        }
    }

    fn into_address(self, postal_code: &PostalCode) -> Result<Address, LookupError> {
        if self.localidade.trim().is_empty() || self.uf.trim().is_empty() {
            return Err(LookupError::InvalidResponse(format!(
                "{SERVICE}: address for {postal_code} lacks city or state"
            )));
        }
        Ok(Address {
            postal_code: postal_code.clone(),
            street: self.logradouro,
            complement: self.complemento,
            neighborhood: self.bairro,
            city: self.localidade,
            state: self.uf,
        })
    }
}

/// Address lookup backed by `GET {base}/ws/{cep}/json/`.
#[derive(Clone)]
pub struct ViaCepClient {
    http: Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(http: Client, base: &str) -> Self {
        Self {
            http,
            base_url: base.trim().to_string(),
        }
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self, LookupError> {
        let http = build_http_client(config.timeout())?;
        Ok(Self::new(http, config.viacep_base_url()))
    }

    async fn fetch(&self, postal_code: &PostalCode) -> Result<Address, LookupError> {
        let digits = postal_code.digits();
        let url = endpoint(&self.base_url, &["ws", &digits, "json", ""])?;
        debug!(%postal_code, %url, "querying viacep");
        let payload: ViaCepPayload = get_json(
            &self.http,
            SERVICE,
            url,
            postal_code.as_str(),
            &[StatusCode::BAD_REQUEST, StatusCode::NOT_FOUND],
        )
        .await?;

        if payload.is_miss() {
            return Err(LookupError::NotFound(postal_code.to_string()));
        }
        payload.into_address(postal_code)
    }
}

#[async_trait]
impl AddressLookup for ViaCepClient {
    async fn resolve(&self, postal_code: &PostalCode) -> Result<Address, LookupError> {
        let outcome = self.fetch(postal_code).await;
        record_outcome(SERVICE, &outcome);
        outcome
    }
}
