//! Gateway traits for the remote CRUD endpoints backing the wizard, plus the
//! step indicator that mirrors session state into the navigable route.

pub mod memory_backend;

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::WizardMode;

pub use memory_backend::MemoryBackoffice;

/// Plain key/value record exchanged with the draft endpoint. Foreign entity
/// references use the `{"id": <number>}` shape.
pub type Payload = Map<String, Value>;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Error type for remote gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("entity not found: {0}")]
    NotFound(i64),
    #[error("remote call failed: {0}")]
    Remote(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Entity record returned by a successful create.
#[derive(Debug, Clone)]
pub struct CreatedEntity {
    pub id: i64,
    pub payload: Payload,
}

/// Remote CRUD endpoint for the entity being edited.
pub trait DraftGateway: Send + Sync {
    fn create(&mut self, payload: &Payload) -> Result<CreatedEntity>;
    fn update(&mut self, id: i64, payload: &Payload) -> Result<Payload>;
    fn get_by_id(&self, id: i64) -> Result<Payload>;
    fn delete(&mut self, id: i64) -> Result<()>;
}

/// One server-confirmed sub-resource row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRow {
    pub id: i64,
    pub fields: BTreeMap<String, String>,
}

/// Remote CRUD endpoint for sub-resource rows keyed by their parent entity.
pub trait RowGateway: Send + Sync {
    fn list(&self, parent_id: i64) -> Result<Vec<ServerRow>>;
    fn create(&mut self, parent_id: i64, fields: &BTreeMap<String, String>) -> Result<ServerRow>;
    fn update(&mut self, row_id: i64, fields: &BTreeMap<String, String>) -> Result<ServerRow>;
    fn delete(&mut self, row_id: i64) -> Result<()>;
}

/// Mirrors the active step, entity id, and mode into an external navigable
/// location so back/forward and deep links resume at the right place.
pub trait StepIndicator: Send + Sync {
    fn sync(&mut self, entity_id: Option<i64>, step: usize, mode: WizardMode);
}

/// Renders the indicator state as a `path/{id}?step=N[&view=true]` string.
#[derive(Debug, Default)]
pub struct RouteMirror {
    base_path: String,
    current: Option<String>,
}

impl RouteMirror {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            current: None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl StepIndicator for RouteMirror {
    fn sync(&mut self, entity_id: Option<i64>, step: usize, mode: WizardMode) {
        let mut route = match entity_id {
            Some(id) => format!("{}/{}?step={}", self.base_path, id, step),
            None => format!("{}?step={}", self.base_path, step),
        };
        if mode == WizardMode::View {
            route.push_str("&view=true");
        }
        self.current = Some(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_mirror_includes_entity_and_view_flag() {
        let mut mirror = RouteMirror::new("/guarantees");
        mirror.sync(None, 0, WizardMode::Create);
        assert_eq!(mirror.current(), Some("/guarantees?step=0"));

        mirror.sync(Some(42), 2, WizardMode::View);
        assert_eq!(mirror.current(), Some("/guarantees/42?step=2&view=true"));
    }
}
