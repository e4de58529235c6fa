//! Event venues and postal-code (CEP) lookup results.

use serde::{Deserialize, Serialize};

pub type AddressId = i64;

/// A venue, owned by at most one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default, rename = "streetAddress", alias = "street_address")]
    pub street_address: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

impl Address {
    /// "Street, 123 - Neighborhood, City - ST (00000000)", skipping blanks.
    pub fn one_line(&self) -> String {
        fn part(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        let mut line = part(&self.street_address).unwrap_or_default().to_string();
        if let Some(number) = part(&self.number) {
            line.push_str(&format!(", {number}"));
        }
        if let Some(neighborhood) = part(&self.neighborhood) {
            line.push_str(&format!(" - {neighborhood}"));
        }
        if let Some(city) = part(&self.city) {
            line.push_str(&format!(", {city}"));
        }
        if let Some(state) = part(&self.state) {
            line.push_str(&format!(" - {state}"));
        }
        if let Some(cep) = part(&self.cep) {
            line.push_str(&format!(" ({cep})"));
        }
        line
    }
}

/// What a postal-code lookup knows about a CEP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressLookup {
    pub cep: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Keep only the digits of a postal code ("88015-200" -> "88015200").
pub fn normalize_cep(cep: &str) -> String {
    cep.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_line_full() {
        let address: Address = serde_json::from_value(json!({
            "id": 1,
            "cep": "88015200",
            "state": "SC",
            "city": "Florianópolis",
            "neighborhood": "Centro",
            "streetAddress": "Rua Felipe Schmidt",
            "number": "100"
        }))
        .unwrap();

        assert_eq!(
            address.one_line(),
            "Rua Felipe Schmidt, 100 - Centro, Florianópolis - SC (88015200)"
        );
    }

    #[test]
    fn test_one_line_skips_missing_parts() {
        let address = Address {
            id: 2,
            cep: None,
            state: Some("SP".into()),
            city: Some("Campinas".into()),
            neighborhood: Some(" ".into()),
            street_address: Some("Av. Brasil".into()),
            number: None,
        };
        assert_eq!(address.one_line(), "Av. Brasil, Campinas - SP");
    }

    #[test]
    fn test_normalize_cep() {
        assert_eq!(normalize_cep("88015-200"), "88015200");
        assert_eq!(normalize_cep(" 01001 000 "), "01001000");
    }
}
