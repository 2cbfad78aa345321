//! Top-level wizard state machine: step progression, draft identity, and
//! persistence orchestration.

use serde_json::{Map, Value};

use crate::core::gate::ValidationGate;
use crate::core::reference::ReferenceSource;
use crate::domain::{Draft, WizardMode, WizardSession};
use crate::errors::WizardError;
use crate::storage::{DraftGateway, Payload, StepIndicator};

/// Declarative description of one wizard step.
#[derive(Debug, Clone)]
pub struct StepDef {
    pub key: &'static str,
    /// Fields that must pass the gate before leaving this step.
    pub required_fields: Vec<String>,
    /// Draft fields persisted when this step is committed.
    pub payload_fields: Vec<String>,
    /// Subset of `payload_fields` sent as `{"id": n}` foreign references.
    pub reference_fields: Vec<String>,
}

impl StepDef {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            required_fields: Vec::new(),
            payload_fields: Vec::new(),
            reference_fields: Vec::new(),
        }
    }

    pub fn with_required(mut self, fields: &[&str]) -> Self {
        self.required_fields = fields.iter().map(|field| field.to_string()).collect();
        self
    }

    pub fn with_payload(mut self, fields: &[&str]) -> Self {
        self.payload_fields = fields.iter().map(|field| field.to_string()).collect();
        self
    }

    pub fn with_references(mut self, fields: &[&str]) -> Self {
        self.reference_fields = fields.iter().map(|field| field.to_string()).collect();
        self
    }
}

/// Result of `load_existing`; always produced so loading UIs can exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Draft populated from the authoritative entity.
    Loaded,
    /// Population was already attempted for this entity; nothing was fetched
    /// or applied again.
    AlreadyPopulated,
    /// Fetch failed; the draft is empty but usable.
    Failed { message: String },
}

/// Orchestrates step transitions, gating, and draft persistence for one
/// wizard mount.
///
/// The draft and session are owned exclusively by the controller for the
/// lifetime of the mount; all mutation goes through its operations.
pub struct WizardController {
    session: WizardSession,
    draft: Draft,
    gate: ValidationGate,
    steps: Vec<StepDef>,
    create_step: usize,
    gateway: Box<dyn DraftGateway>,
    indicator: Box<dyn StepIndicator>,
    /// Entity id for which population has been attempted; reset only when the
    /// id changes or the caller requests a refresh.
    population_attempted: Option<i64>,
}

impl WizardController {
    pub fn new(
        steps: Vec<StepDef>,
        gate: ValidationGate,
        draft: Draft,
        gateway: Box<dyn DraftGateway>,
        indicator: Box<dyn StepIndicator>,
    ) -> Self {
        let mut controller = Self {
            session: WizardSession::create(),
            draft,
            gate,
            steps,
            create_step: 0,
            gateway,
            indicator,
            population_attempted: None,
        };
        controller.sync_indicator();
        controller
    }

    /// Marks a step other than the first as the one that creates the entity.
    pub fn with_create_step(mut self, index: usize) -> Self {
        self.create_step = index;
        self
    }

    /// Mounts the wizard over an existing entity, optionally read-only.
    pub fn for_existing(mut self, entity_id: i64, view_only: bool) -> Self {
        self.session = WizardSession::existing(entity_id, view_only);
        self.sync_indicator();
        self
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn mode(&self) -> WizardMode {
        self.session.mode
    }

    pub fn entity_id(&self) -> Option<i64> {
        self.session.entity_id
    }

    pub fn active_step(&self) -> usize {
        self.session.active_step
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Writes a field through the mode gate; view sessions are read-only.
    pub fn edit_field(&mut self, field: &str, value: &str) -> Result<(), WizardError> {
        self.ensure_mutable()?;
        self.draft.set(field, value);
        Ok(())
    }

    /// Pre-fills `field` with a generated reference number when still empty.
    pub fn assign_reference(
        &mut self,
        source: &mut dyn ReferenceSource,
        field: &str,
        prefix: &str,
    ) -> Result<(), WizardError> {
        self.ensure_mutable()?;
        if self.draft.is_empty(field) {
            let reference = source.generate(prefix);
            self.draft.set(field, &reference);
        }
        Ok(())
    }

    /// Advances to the next step.
    ///
    /// The current step's required fields are gated first; a failure reports
    /// the failing fields and leaves every piece of state untouched. Passing
    /// the create step persists the draft, adopts the returned id, and flips
    /// the session from create to edit. View sessions navigate without
    /// gating or persistence.
    pub fn go_next(&mut self) -> Result<usize, WizardError> {
        if self.session.active_step + 1 >= self.steps.len() {
            return Err(WizardError::Invalid("already on the final step".into()));
        }
        if self.session.is_view_only() {
            self.advance();
            return Ok(self.session.active_step);
        }

        let step = self.steps[self.session.active_step].clone();
        let issues = self.gate.validate(&self.draft, &step.required_fields);
        if !issues.is_empty() {
            return Err(WizardError::Validation(issues));
        }

        if self.session.active_step == self.create_step && self.session.entity_id.is_none() {
            let payload = self.build_payload(&step);
            let created = self.gateway.create(&payload)?;
            tracing::info!(entity_id = created.id, step = step.key, "draft created");
            self.session.entity_id = Some(created.id);
            self.session.mode = WizardMode::Edit;
        }

        self.advance();
        Ok(self.session.active_step)
    }

    /// Steps back; always allowed, floored at the first step.
    pub fn go_back(&mut self) -> usize {
        self.session.active_step = self.session.active_step.saturating_sub(1);
        self.sync_indicator();
        self.session.active_step
    }

    /// Jumps directly to an already-completed step; otherwise a no-op.
    pub fn reenter_step(&mut self, index: usize) -> bool {
        if index > self.session.completed_through || index >= self.steps.len() {
            return false;
        }
        self.session.active_step = index;
        self.sync_indicator();
        true
    }

    /// Persists the current step's slice of the draft without navigating,
    /// creating the entity first when it is not addressable yet.
    pub fn save_current_step(&mut self) -> Result<(), WizardError> {
        self.ensure_mutable()?;
        let step = self.steps[self.session.active_step].clone();
        let issues = self.gate.validate(&self.draft, &step.required_fields);
        if !issues.is_empty() {
            return Err(WizardError::Validation(issues));
        }

        let payload = self.build_payload(&step);
        match self.session.entity_id {
            Some(id) => {
                self.gateway.update(id, &payload)?;
                tracing::debug!(entity_id = id, step = step.key, "step persisted");
            }
            None => {
                let created = self.gateway.create(&payload)?;
                tracing::info!(entity_id = created.id, step = step.key, "draft created");
                self.session.entity_id = Some(created.id);
                self.session.mode = WizardMode::Edit;
                self.sync_indicator();
            }
        }
        Ok(())
    }

    /// Populates the draft from the authoritative entity.
    ///
    /// Idempotent: repeated calls for the same id while population has
    /// already been attempted do nothing unless `refresh` is set. Always
    /// completes, so callers can dismiss loading affordances; a failed fetch
    /// leaves the draft empty but usable.
    pub fn load_existing(&mut self, entity_id: i64, refresh: bool) -> LoadOutcome {
        if !refresh && self.population_attempted == Some(entity_id) {
            return LoadOutcome::AlreadyPopulated;
        }
        self.population_attempted = Some(entity_id);

        match self.gateway.get_by_id(entity_id) {
            Ok(payload) => {
                self.session.entity_id = Some(entity_id);
                if !self.session.is_view_only() {
                    self.session.mode = WizardMode::Edit;
                }
                self.session.completed_through = self.steps.len().saturating_sub(1);
                self.apply_payload(&payload);
                self.sync_indicator();
                tracing::info!(entity_id, "draft populated from gateway");
                LoadOutcome::Loaded
            }
            Err(err) => {
                tracing::warn!(entity_id, error = %err, "load failed; draft left empty");
                self.draft.clear_all();
                LoadOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    fn ensure_mutable(&self) -> Result<(), WizardError> {
        if self.session.is_view_only() {
            return Err(WizardError::Invalid("view mode is read-only".into()));
        }
        Ok(())
    }

    fn advance(&mut self) {
        self.session.active_step += 1;
        if self.session.active_step > self.session.completed_through {
            self.session.completed_through = self.session.active_step;
        }
        self.sync_indicator();
    }

    fn sync_indicator(&mut self) {
        self.indicator.sync(
            self.session.entity_id,
            self.session.active_step,
            self.session.mode,
        );
    }

    fn build_payload(&self, step: &StepDef) -> Payload {
        let mut payload = Map::new();
        for field in &step.payload_fields {
            let value = self.draft.get(field);
            if value.is_empty() {
                continue;
            }
            if step.reference_fields.iter().any(|name| name == field) {
                match value.parse::<i64>() {
                    Ok(id) => {
                        let mut reference = Map::new();
                        reference.insert("id".into(), Value::from(id));
                        payload.insert(field.clone(), Value::Object(reference));
                    }
                    Err(_) => {
                        tracing::debug!(field = %field, value, "skipping non-numeric reference field");
                    }
                }
                continue;
            }
            payload.insert(field.clone(), Value::String(value.to_string()));
        }
        payload
    }

    fn apply_payload(&mut self, payload: &Payload) {
        for (field, value) in payload {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                // Foreign references arrive as {"id": n}; unwrap the scalar.
                Value::Object(object) => match object.get("id") {
                    Some(Value::Number(number)) => number.to_string(),
                    _ => continue,
                },
                Value::Null | Value::Array(_) => continue,
            };
            self.draft.set(field, &text);
        }
    }
}
