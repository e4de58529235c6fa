//! Events: records returned by `GET /event`, the create/edit form and the
//! payload sent to the backend.

use std::fmt;

use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::{Address, AddressId, AddressLookup, normalize_cep};
use crate::community::CommunityId;
use crate::validation::{ValidationErrors, check_required, check_url};

pub type EventId = i64;

fn default_true() -> bool {
    true
}

/// How an event takes place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Modality {
    Online,
    Presential,
    Hybrid,
    /// Anything else the backend sends, lowercased.
    Other(String),
}

impl Modality {
    /// Case-insensitive; also accepts the Portuguese labels the forms used.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "online" => Modality::Online,
            "presential" | "presencial" => Modality::Presential,
            "hybrid" | "híbrido" | "hibrido" => Modality::Hybrid,
            other => Modality::Other(other.to_string()),
        }
    }

    /// Normalized lowercase key used for filtering.
    pub fn key(&self) -> &str {
        match self {
            Modality::Online => "online",
            Modality::Presential => "presential",
            Modality::Hybrid => "hybrid",
            Modality::Other(s) => s,
        }
    }

    /// Whether the event can be attended remotely.
    pub fn is_remote(&self) -> bool {
        matches!(self, Modality::Online | Modality::Hybrid)
    }

    /// Presential and hybrid events need a venue.
    pub fn needs_address(&self) -> bool {
        !matches!(self, Modality::Online)
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key().to_uppercase())
    }
}

impl Serialize for Modality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Modality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Modality::parse(&raw))
    }
}

/// An event as returned by `GET /event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "data_hora_inicial")]
    pub start_date_time: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<String>,
    #[serde(default)]
    pub modality: Option<Modality>,
    #[serde(default)]
    pub link: Option<String>,
    /// Cover image
    #[serde(default)]
    pub capa_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub id_community: Option<CommunityId>,
    #[serde(default)]
    pub id_address: Option<AddressId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Venue nested in create/update responses.
    #[serde(default, skip_serializing)]
    pub address: Option<Address>,
}

impl Event {
    /// Parsed start, `None` when missing or unparsable.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start_date_time.as_deref().and_then(parse_timestamp)
    }

    /// Parsed end, `None` when missing or unparsable.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end_date_time.as_deref().and_then(parse_timestamp)
    }
}

/// Parse a timestamp the way the backend and forms produce them.
///
/// RFC 3339 first; then `YYYY-MM-DDTHH:MM[:SS[.fff]]` in local time; then a
/// bare `YYYY-MM-DD` as UTC midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Create / edit form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub start_time: String,
    /// HH:MM
    pub end_time: String,
    #[serde(default)]
    pub modality: Option<Modality>,
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl EventForm {
    /// Prefill an edit form from a stored event and its venue.
    pub fn from_event(event: &Event, address: Option<&Address>) -> Self {
        let split = |raw: &Option<String>| -> (String, String) {
            match raw.as_deref().and_then(parse_timestamp) {
                Some(dt) => {
                    let local = dt.with_timezone(&Local);
                    (
                        local.format("%Y-%m-%d").to_string(),
                        local.format("%H:%M").to_string(),
                    )
                }
                None => (String::new(), String::new()),
            }
        };
        let (date, start_time) = split(&event.start_date_time);
        let (_, end_time) = split(&event.end_date_time);

        EventForm {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            date,
            start_time,
            end_time,
            modality: event.modality.clone(),
            cep: address.and_then(|a| a.cep.clone()),
            street: address.and_then(|a| a.street_address.clone()),
            number: address.and_then(|a| a.number.clone()),
            neighborhood: address.and_then(|a| a.neighborhood.clone()),
            state: address.and_then(|a| a.state.clone()),
            city: address.and_then(|a| a.city.clone()),
            link: event.link.clone(),
        }
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_required(&mut errors, "title", Some(self.title.as_str()), "Event title is required");
        check_required(
            &mut errors,
            "description",
            Some(self.description.as_str()),
            "Description is required",
        );

        match NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d") {
            Ok(date) if date < today => errors.add("date", "Date cannot be before today"),
            Ok(_) => {}
            Err(_) => errors.add("date", "Date must be YYYY-MM-DD"),
        }

        let start = parse_time(&self.start_time);
        let end = parse_time(&self.end_time);
        if start.is_none() {
            errors.add("start_time", "Start time is required (HH:MM)");
        }
        if end.is_none() {
            errors.add("end_time", "End time is required (HH:MM)");
        }
        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                errors.add("end_time", "End time must be after start time");
            }
        }

        match &self.modality {
            None | Some(Modality::Other(_)) => {
                errors.add("modality", "Select the event modality")
            }
            Some(modality) if modality.needs_address() => {
                check_required(&mut errors, "cep", self.cep.as_deref(), "CEP is required");
                check_required(&mut errors, "street", self.street.as_deref(), "Street is required");
                check_required(&mut errors, "number", self.number.as_deref(), "Number is required");
                check_required(
                    &mut errors,
                    "neighborhood",
                    self.neighborhood.as_deref(),
                    "Neighborhood is required",
                );
                check_required(&mut errors, "state", self.state.as_deref(), "State is required");
                check_required(&mut errors, "city", self.city.as_deref(), "City is required");
            }
            Some(_) => {}
        }

        check_url(&mut errors, "link", self.link.as_deref());

        errors.into_result()
    }

    /// Fill the venue fields from a postal-code lookup.
    pub fn apply_lookup(&mut self, lookup: &AddressLookup) {
        self.street = Some(lookup.street.clone());
        self.neighborhood = Some(lookup.neighborhood.clone());
        self.city = Some(lookup.city.clone());
        self.state = Some(lookup.state.clone());
    }

    /// Clear what a failed lookup would otherwise leave stale.
    pub fn clear_lookup(&mut self) {
        self.street = None;
        self.neighborhood = None;
        self.city = None;
        self.state = None;
    }

    fn payload(&self) -> EventPayload {
        let modality = self
            .modality
            .clone()
            .unwrap_or_else(|| Modality::Other(String::new()));
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        let address = modality.needs_address().then(|| AddressPayload {
            cep: normalize_cep(self.cep.as_deref().unwrap_or_default()),
            state: text(&self.state),
            city: text(&self.city),
            neighborhood: text(&self.neighborhood),
            street_address: text(&self.street),
            number: text(&self.number),
        });

        EventPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            start_date_time: format!("{}T{}:00", self.date.trim(), self.start_time.trim()),
            end_date_time: format!("{}T{}:00", self.date.trim(), self.end_time.trim()),
            modality,
            link: self.link.clone().filter(|l| !l.trim().is_empty()),
            capa_url: None,
            is_active: true,
            address,
            created_at: None,
            updated_at: None,
        }
    }

    /// Payload for `POST /event/{communityId}`.
    pub fn create_payload(&self) -> EventPayload {
        let now = now_iso();
        EventPayload {
            created_at: Some(now.clone()),
            updated_at: Some(now),
            ..self.payload()
        }
    }

    /// Payload for `PUT /event/{id}`. Replaces the whole record.
    pub fn update_payload(&self) -> EventPayload {
        EventPayload {
            updated_at: Some(now_iso()),
            ..self.payload()
        }
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Outgoing event body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    pub title: String,
    pub description: String,
    pub start_date_time: String,
    pub end_date_time: String,
    pub modality: Modality,
    pub link: Option<String>,
    pub capa_url: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Venue nested in an event payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressPayload {
    pub cep: String,
    pub state: String,
    pub city: String,
    pub neighborhood: String,
    #[serde(rename = "streetAddress")]
    pub street_address: String,
    pub number: String,
}
