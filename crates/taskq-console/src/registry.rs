/*
[INPUT]:  Backend task-type catalog, built-in and configured field descriptor tables
[OUTPUT]: TaskTypeRegistry mapping type ids to ordered payload field schemas
[POS]:    Core leaf - drives form rendering and payload validation
[UPDATE]: When adding field kinds or changing catalog merge rules
*/

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use taskq_adapter::TaskQueueApi;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown task type: {0}")]
    UnknownType(String),
}

/// Input kind of one payload field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    MultilineText,
    SingleSelect { options: Vec<String> },
}

impl FieldKind {
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::SingleSelect { options } => options,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Payload key sent to the backend
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub default_value: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl FieldSpec {
    pub fn text(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: Some(label.to_string()),
            kind: FieldKind::Text,
            default_value: String::new(),
            required: true,
        }
    }

    pub fn multiline(name: &str, label: &str) -> Self {
        Self {
            kind: FieldKind::MultilineText,
            ..Self::text(name, label)
        }
    }

    /// Select field; the first option is the default.
    pub fn select(name: &str, label: &str, options: &[&str]) -> Self {
        let options: Vec<String> = options.iter().map(|opt| opt.to_string()).collect();
        Self {
            default_value: options.first().cloned().unwrap_or_default(),
            kind: FieldKind::SingleSelect { options },
            ..Self::text(name, label)
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Payload shape for one task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTypeSchema {
    pub type_id: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl TaskTypeSchema {
    pub fn new(type_id: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            type_id: type_id.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Field descriptors for the task types the backend ships with.
pub fn builtin_schemas() -> Vec<TaskTypeSchema> {
    vec![
        TaskTypeSchema::new(
            "EMAIL_SEND",
            vec![
                FieldSpec::text("to", "To Email"),
                FieldSpec::text("subject", "Subject"),
                FieldSpec::multiline("body", "Body").optional(),
            ],
        ),
        TaskTypeSchema::new(
            "IMAGE_PROCESS",
            vec![
                FieldSpec::text("imageUrl", "Image URL"),
                FieldSpec::select("operation", "Operation", &["resize", "compress", "thumbnail"]),
            ],
        ),
        TaskTypeSchema::new(
            "REPORT_GENERATE",
            vec![
                FieldSpec::select(
                    "reportType",
                    "Report Type",
                    &["sales", "analytics", "user-activity"],
                ),
                FieldSpec::text("dateRange", "Date Range"),
            ],
        ),
    ]
}

/// Built-in table with configured entries applied on top; a configured
/// `type_id` replaces the built-in one.
pub fn schema_table(extra: &[TaskTypeSchema]) -> Vec<TaskTypeSchema> {
    let mut table = builtin_schemas();
    for schema in extra {
        match table.iter_mut().find(|entry| entry.type_id == schema.type_id) {
            Some(entry) => *entry = schema.clone(),
            None => table.push(schema.clone()),
        }
    }
    table
}

/// Known task types in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTypeRegistry {
    schemas: Vec<TaskTypeSchema>,
}

impl TaskTypeRegistry {
    /// Types come from the catalog only; the table contributes fields.
    pub fn from_catalog(catalog: &[String], table: &[TaskTypeSchema]) -> Self {
        let mut schemas: Vec<TaskTypeSchema> = Vec::with_capacity(catalog.len());
        for type_id in catalog {
            if schemas.iter().any(|schema| &schema.type_id == type_id) {
                continue;
            }
            let schema = table
                .iter()
                .find(|entry| &entry.type_id == type_id)
                .cloned()
                .unwrap_or_else(|| {
                    debug!(task_type = %type_id, "no field descriptors for task type");
                    TaskTypeSchema::new(type_id, Vec::new())
                });
            schemas.push(schema);
        }
        Self { schemas }
    }

    pub fn list_types(&self) -> Vec<&str> {
        self.schemas
            .iter()
            .map(|schema| schema.type_id.as_str())
            .collect()
    }

    pub fn schema_for(&self, type_id: &str) -> Result<&TaskTypeSchema, RegistryError> {
        self.schemas
            .iter()
            .find(|schema| schema.type_id == type_id)
            .ok_or_else(|| RegistryError::UnknownType(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.schemas.iter().any(|schema| schema.type_id == type_id)
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }
}

/// Fetch the catalog and resolve each type against the descriptor table.
pub async fn fetch_registry(
    api: &dyn TaskQueueApi,
    table: &[TaskTypeSchema],
) -> taskq_adapter::Result<TaskTypeRegistry> {
    let catalog = api.list_task_types().await?;
    let registry = TaskTypeRegistry::from_catalog(&catalog, table);
    debug!(types = registry.len(), "task type registry loaded");
    Ok(registry)
}
