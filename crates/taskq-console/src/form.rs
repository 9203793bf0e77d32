/*
[INPUT]:  TaskTypeRegistry loads, operator edits, submission outcomes
[OUTPUT]: SubmissionForm state and TaskDraft for the submission client
[POS]:    Core - type-dependent submission form state
[UPDATE]: When form selection or reset rules change
*/

use std::collections::BTreeMap;

use tracing::debug;

use taskq_adapter::Priority;

use crate::registry::{RegistryError, TaskTypeRegistry, TaskTypeSchema};
use crate::submission::{SubmissionOutcome, TaskDraft};

/// Form state for the submit view.
///
/// Only values the operator typed are stored; anything untouched falls back
/// to the field default when the payload is built.
#[derive(Debug, Clone)]
pub struct SubmissionForm {
    registry: TaskTypeRegistry,
    selected_type: Option<String>,
    priority: Priority,
    max_retries: u32,
    values: BTreeMap<String, String>,
    loaded_once: bool,
    submitting: bool,
    result: Option<SubmissionOutcome>,
}

impl SubmissionForm {
    pub fn new(priority: Priority, max_retries: u32) -> Self {
        Self {
            registry: TaskTypeRegistry::default(),
            selected_type: None,
            priority,
            max_retries,
            values: BTreeMap::new(),
            loaded_once: false,
            submitting: false,
            result: None,
        }
    }

    /// Install a freshly fetched registry.
    ///
    /// A later load keeps the current type if it is still listed; the first
    /// load (or a vanished type) falls back to the first listed type.
    pub fn apply_registry(&mut self, registry: TaskTypeRegistry) {
        let keep = self.loaded_once
            && self
                .selected_type
                .as_deref()
                .is_some_and(|current| registry.contains(current));

        if !keep {
            let default = registry.list_types().first().map(|id| id.to_string());
            if default != self.selected_type {
                self.values.clear();
            }
            self.selected_type = default;
        }

        debug!(
            selected = ?self.selected_type,
            types = registry.len(),
            kept = keep,
            "form registry applied"
        );
        self.registry = registry;
        self.loaded_once = true;
    }

    pub fn registry(&self) -> &TaskTypeRegistry {
        &self.registry
    }

    pub fn selected_type(&self) -> Option<&str> {
        self.selected_type.as_deref()
    }

    pub fn schema(&self) -> Option<&TaskTypeSchema> {
        self.selected_type
            .as_deref()
            .and_then(|type_id| self.registry.schema_for(type_id).ok())
    }

    /// Switching to a different type clears every entered value.
    pub fn select_type(&mut self, type_id: &str) -> Result<(), RegistryError> {
        self.registry.schema_for(type_id)?;
        if self.selected_type.as_deref() != Some(type_id) {
            self.values.clear();
            self.selected_type = Some(type_id.to_string());
        }
        Ok(())
    }

    /// Step through the registry's types, wrapping at either end.
    pub fn cycle_type(&mut self, forward: bool) {
        let types = self.registry.list_types();
        if types.is_empty() {
            return;
        }
        let current = self
            .selected_type
            .as_deref()
            .and_then(|selected| types.iter().position(|id| *id == selected));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(index), true) => (index + 1) % types.len(),
            (Some(index), false) => (index + types.len() - 1) % types.len(),
        };
        let type_id = types[next].to_string();
        // Listed by the registry, so this cannot miss.
        let _ = self.select_type(&type_id);
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn cycle_priority(&mut self, forward: bool) {
        let all = Priority::ALL;
        let index = all.iter().position(|p| *p == self.priority).unwrap_or(0);
        let next = if forward {
            (index + 1) % all.len()
        } else {
            (index + all.len() - 1) % all.len()
        };
        self.priority = all[next];
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Store a value for a field of the selected schema. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.schema().and_then(|schema| schema.field(name)).is_none() {
            return false;
        }
        self.values.insert(name.to_string(), value.into());
        true
    }

    pub fn entered_values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Entered value or the field default.
    pub fn value(&self, name: &str) -> &str {
        if let Some(value) = self.values.get(name) {
            return value;
        }
        self.schema()
            .and_then(|schema| schema.field(name))
            .map(|field| field.default_value.as_str())
            .unwrap_or_default()
    }

    /// Exactly the schema's keys, each with its entered or default value.
    pub fn effective_payload(&self) -> BTreeMap<String, String> {
        self.schema()
            .map(|schema| {
                schema
                    .fields
                    .iter()
                    .map(|field| (field.name.clone(), self.value(&field.name).to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn draft(&self) -> Option<TaskDraft> {
        let task_type = self.selected_type.clone()?;
        Some(TaskDraft {
            task_type,
            priority: self.priority,
            payload: self.effective_payload(),
            max_retries: self.max_retries,
        })
    }

    /// Clear the previous outcome and hand out the draft for one attempt.
    pub fn begin_submit(&mut self) -> Option<TaskDraft> {
        if self.submitting {
            return None;
        }
        self.result = None;
        let draft = self.draft()?;
        self.submitting = true;
        Some(draft)
    }

    pub fn record_result(&mut self, outcome: SubmissionOutcome) {
        self.submitting = false;
        self.result = Some(outcome);
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn result(&self) -> Option<&SubmissionOutcome> {
        self.result.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::builtin_schemas;

    fn registry(ids: &[&str]) -> TaskTypeRegistry {
        let catalog: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        TaskTypeRegistry::from_catalog(&catalog, &builtin_schemas())
    }

    #[test]
    fn first_load_selects_first_type() {
        let mut form = SubmissionForm::new(Priority::Medium, 3);
        form.apply_registry(registry(&["IMAGE_PROCESS", "EMAIL_SEND"]));
        assert_eq!(form.selected_type(), Some("IMAGE_PROCESS"));
    }

    #[test]
    fn reload_keeps_known_selection() {
        let mut form = SubmissionForm::new(Priority::Medium, 3);
        form.apply_registry(registry(&["EMAIL_SEND", "REPORT_GENERATE"]));
        form.select_type("REPORT_GENERATE").unwrap();
        form.set_field("dateRange", "2024-Q1");

        form.apply_registry(registry(&["EMAIL_SEND", "REPORT_GENERATE"]));
        assert_eq!(form.selected_type(), Some("REPORT_GENERATE"));
        assert_eq!(form.value("dateRange"), "2024-Q1");
    }

    #[test]
    fn reload_without_current_type_falls_back_and_clears() {
        let mut form = SubmissionForm::new(Priority::Medium, 3);
        form.apply_registry(registry(&["EMAIL_SEND", "REPORT_GENERATE"]));
        form.select_type("REPORT_GENERATE").unwrap();
        form.set_field("dateRange", "2024-Q1");

        form.apply_registry(registry(&["EMAIL_SEND"]));
        assert_eq!(form.selected_type(), Some("EMAIL_SEND"));
        assert!(form.entered_values().is_empty());
    }

    #[test]
    fn switching_types_leaves_no_values_behind() {
        let mut form = SubmissionForm::new(Priority::Medium, 3);
        form.apply_registry(registry(&["EMAIL_SEND", "IMAGE_PROCESS", "REPORT_GENERATE"]));
        form.set_field("to", "a@b.com");
        form.select_type("IMAGE_PROCESS").unwrap();
        form.set_field("imageUrl", "http://x/y.png");
        form.select_type("REPORT_GENERATE").unwrap();

        assert!(form.entered_values().is_empty());
        assert_eq!(form.value("imageUrl"), "");
    }

    #[test]
    fn selecting_unknown_type_keeps_state() {
        let mut form = SubmissionForm::new(Priority::Medium, 3);
        form.apply_registry(registry(&["EMAIL_SEND"]));
        form.set_field("to", "a@b.com");
        assert!(form.select_type("NOPE").is_err());
        assert_eq!(form.value("to"), "a@b.com");
    }

    #[test]
    fn payload_has_exactly_schema_keys_with_defaults() {
        let mut form = SubmissionForm::new(Priority::Medium, 3);
        form.apply_registry(registry(&["IMAGE_PROCESS"]));
        assert!(!form.set_field("to", "stray"));
        form.set_field("imageUrl", "http://x/y.png");

        let payload = form.effective_payload();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload["imageUrl"], "http://x/y.png");
        assert_eq!(payload["operation"], "resize");
    }

    #[test]
    fn new_attempt_clears_previous_result() {
        let mut form = SubmissionForm::new(Priority::Medium, 3);
        form.apply_registry(registry(&["EMAIL_SEND"]));
        form.record_result(SubmissionOutcome::Failed("boom".to_string()));

        let draft = form.begin_submit().unwrap();
        assert!(form.result().is_none());
        assert!(form.is_submitting());
        assert!(form.begin_submit().is_none());
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.max_retries, 3);
    }

    #[test]
    fn cycling_wraps_around() {
        let mut form = SubmissionForm::new(Priority::High, 3);
        form.apply_registry(registry(&["EMAIL_SEND", "IMAGE_PROCESS"]));
        form.cycle_type(false);
        assert_eq!(form.selected_type(), Some("IMAGE_PROCESS"));
        form.cycle_type(true);
        assert_eq!(form.selected_type(), Some("EMAIL_SEND"));

        form.cycle_priority(false);
        assert_eq!(form.priority(), Priority::Low);
    }
}
