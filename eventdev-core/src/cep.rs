//! Address lookup by Brazilian postal code (CEP).

use serde::Deserialize;

use crate::address::{AddressLookup, normalize_cep};
use crate::config::EventDevConfig;
use crate::error::{EventDevError, EventDevResult};
use crate::validation::ValidationErrors;

/// Something that can turn a postal code into a street address.
pub trait CepLookup {
    fn lookup(
        &self,
        cep: &str,
    ) -> impl std::future::Future<Output = EventDevResult<AddressLookup>> + Send;
}

/// ViaCEP public API: `GET {base}/{digits}/json/`.
#[derive(Clone)]
pub struct ViaCep {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    /// Sent as `true` (sometimes `"true"`) for unknown codes.
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    fn is_error(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag == "true",
            _ => false,
        }
    }
}

impl ViaCep {
    pub fn new(base_url: impl Into<String>) -> Self {
        ViaCep {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &EventDevConfig) -> Self {
        Self::new(config.cep_url.clone())
    }
}

/// Digits of `cep`, or a validation error when there are not exactly eight.
pub fn check_cep(cep: &str) -> EventDevResult<String> {
    let digits = normalize_cep(cep);
    if digits.len() != 8 {
        let mut errors = ValidationErrors::new();
        errors.add("cep", "CEP must have 8 digits");
        return Err(errors.into());
    }
    Ok(digits)
}

impl CepLookup for ViaCep {
    async fn lookup(&self, cep: &str) -> EventDevResult<AddressLookup> {
        let digits = check_cep(cep)?;
        let url = format!("{}/{}/json/", self.base_url, digits);
        tracing::debug!(%url, "Looking up CEP");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| EventDevError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EventDevError::Http {
                status: status.as_u16(),
                message: "CEP lookup failed".into(),
            });
        }

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| EventDevError::Serialization(e.to_string()))?;

        if body.is_error() {
            return Err(EventDevError::NotFound(format!("CEP {digits}")));
        }

        Ok(AddressLookup {
            cep: if body.cep.is_empty() { digits } else { normalize_cep(&body.cep) },
            street: body.logradouro,
            neighborhood: body.bairro,
            city: body.localidade,
            state: body.uf,
        })
    }
}
