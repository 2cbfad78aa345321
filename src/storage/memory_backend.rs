//! In-memory stand-in for the remote console API.
//!
//! The real endpoints live behind the REST layer; tests and local tooling run
//! against this backend, which hands out sequential identifiers the way the
//! server does.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use super::{CreatedEntity, DraftGateway, GatewayError, Payload, Result, RowGateway, ServerRow};

/// Sequential-id tables for drafts and their sub-resource rows.
#[derive(Debug, Default)]
pub struct MemoryBackoffice {
    next_id: i64,
    entities: BTreeMap<i64, Payload>,
    rows: BTreeMap<i64, (i64, BTreeMap<String, String>)>,
}

impl MemoryBackoffice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a backend in a shareable handle that implements both gateway
    /// traits, so one backend can serve a wizard and its row collections.
    pub fn shared(self) -> Arc<Mutex<MemoryBackoffice>> {
        Arc::new(Mutex::new(self))
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Seeds an entity directly, bypassing the create flow.
    pub fn seed_entity(&mut self, payload: Payload) -> i64 {
        let id = self.allocate_id();
        self.entities.insert(id, payload);
        id
    }

    /// Seeds a sub-resource row under an existing entity.
    pub fn seed_row(&mut self, parent_id: i64, fields: BTreeMap<String, String>) -> i64 {
        let id = self.allocate_id();
        self.rows.insert(id, (parent_id, fields));
        id
    }

    pub fn entity(&self, id: i64) -> Option<&Payload> {
        self.entities.get(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn row_count(&self, parent_id: i64) -> usize {
        self.rows
            .values()
            .filter(|(parent, _)| *parent == parent_id)
            .count()
    }
}

impl DraftGateway for MemoryBackoffice {
    fn create(&mut self, payload: &Payload) -> Result<CreatedEntity> {
        let id = self.allocate_id();
        let mut stored = payload.clone();
        stored.insert("id".into(), Value::from(id));
        self.entities.insert(id, stored.clone());
        Ok(CreatedEntity {
            id,
            payload: stored,
        })
    }

    fn update(&mut self, id: i64, payload: &Payload) -> Result<Payload> {
        let stored = self
            .entities
            .get_mut(&id)
            .ok_or(GatewayError::NotFound(id))?;
        for (key, value) in payload {
            stored.insert(key.clone(), value.clone());
        }
        Ok(stored.clone())
    }

    fn get_by_id(&self, id: i64) -> Result<Payload> {
        self.entities
            .get(&id)
            .cloned()
            .ok_or(GatewayError::NotFound(id))
    }

    fn delete(&mut self, id: i64) -> Result<()> {
        self.entities
            .remove(&id)
            .map(|_| ())
            .ok_or(GatewayError::NotFound(id))
    }
}

impl RowGateway for MemoryBackoffice {
    fn list(&self, parent_id: i64) -> Result<Vec<ServerRow>> {
        Ok(self
            .rows
            .iter()
            .filter(|(_, (parent, _))| *parent == parent_id)
            .map(|(id, (_, fields))| ServerRow {
                id: *id,
                fields: fields.clone(),
            })
            .collect())
    }

    fn create(&mut self, parent_id: i64, fields: &BTreeMap<String, String>) -> Result<ServerRow> {
        let id = self.allocate_id();
        self.rows.insert(id, (parent_id, fields.clone()));
        Ok(ServerRow {
            id,
            fields: fields.clone(),
        })
    }

    fn update(&mut self, row_id: i64, fields: &BTreeMap<String, String>) -> Result<ServerRow> {
        let (_, stored) = self
            .rows
            .get_mut(&row_id)
            .ok_or(GatewayError::NotFound(row_id))?;
        *stored = fields.clone();
        Ok(ServerRow {
            id: row_id,
            fields: fields.clone(),
        })
    }

    fn delete(&mut self, row_id: i64) -> Result<()> {
        self.rows
            .remove(&row_id)
            .map(|_| ())
            .ok_or(GatewayError::NotFound(row_id))
    }
}

fn lock_backend(backend: &Mutex<MemoryBackoffice>) -> Result<MutexGuard<'_, MemoryBackoffice>> {
    backend
        .lock()
        .map_err(|_| GatewayError::Remote("backend mutex poisoned".into()))
}

impl DraftGateway for Arc<Mutex<MemoryBackoffice>> {
    fn create(&mut self, payload: &Payload) -> Result<CreatedEntity> {
        DraftGateway::create(&mut *lock_backend(self)?, payload)
    }

    fn update(&mut self, id: i64, payload: &Payload) -> Result<Payload> {
        DraftGateway::update(&mut *lock_backend(self)?, id, payload)
    }

    fn get_by_id(&self, id: i64) -> Result<Payload> {
        lock_backend(self)?.get_by_id(id)
    }

    fn delete(&mut self, id: i64) -> Result<()> {
        DraftGateway::delete(&mut *lock_backend(self)?, id)
    }
}

impl RowGateway for Arc<Mutex<MemoryBackoffice>> {
    fn list(&self, parent_id: i64) -> Result<Vec<ServerRow>> {
        lock_backend(self)?.list(parent_id)
    }

    fn create(&mut self, parent_id: i64, fields: &BTreeMap<String, String>) -> Result<ServerRow> {
        RowGateway::create(&mut *lock_backend(self)?, parent_id, fields)
    }

    fn update(&mut self, row_id: i64, fields: &BTreeMap<String, String>) -> Result<ServerRow> {
        RowGateway::update(&mut *lock_backend(self)?, row_id, fields)
    }

    fn delete(&mut self, row_id: i64) -> Result<()> {
        RowGateway::delete(&mut *lock_backend(self)?, row_id)
    }
}
