//! Core library for the EventDev client.
//!
//! This crate provides:
//! - Data model for communities, events and addresses, with form validation
//! - `api` resource fetchers for the REST backend
//! - Aggregation of events with their community and venue
//! - Local reconciliation after writes, and derived views per screen
//! - Session handling and request generations

pub mod address;
pub mod aggregate;
pub mod api;
pub mod cep;
pub mod community;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod generation;
pub mod reconcile;
pub mod screen;
pub mod session;
pub mod validation;
pub mod view;

pub use address::{Address, AddressLookup};
pub use aggregate::{EnrichedEvent, EventIndex, aggregate};
pub use api::ApiClient;
pub use community::{Community, CommunityForm, Logo};
pub use config::EventDevConfig;
pub use error::{EventDevError, EventDevResult};
pub use event::{Event, EventForm, Modality};
pub use reconcile::EventCollection;
pub use session::{Session, SessionState, User};
