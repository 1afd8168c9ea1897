use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A typed, nullable column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum FieldValues {
    Time(Vec<Option<DateTime<Utc>>>),
    Number(Vec<Option<f64>>),
    String(Vec<Option<String>>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Time(v) => v.len(),
            FieldValues::Number(v) => v.len(),
            FieldValues::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValues::Time(_) => "time",
            FieldValues::Number(_) => "number",
            FieldValues::String(_) => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub config: FieldConfig,
    #[serde(flatten)]
    pub values: FieldValues,
}

impl Field {
    pub fn new(name: impl Into<String>, values: FieldValues) -> Self {
        Self {
            name: name.into(),
            config: FieldConfig::default(),
            values,
        }
    }

    pub fn with_unit(mut self, unit: Option<String>) -> Self {
        self.config.unit = unit;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameMeta {
    #[serde(default)]
    pub custom: Map<String, Value>,
}

/// Columnar result of one query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFrame {
    pub name: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<FrameMeta>,
}

impl DataFrame {
    /// An empty frame named after the query it answers.
    pub fn new(ref_id: impl Into<String>) -> Self {
        let ref_id = ref_id.into();
        Self {
            name: ref_id.clone(),
            ref_id,
            fields: Vec::new(),
            meta: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_custom_meta(mut self, custom: Map<String, Value>) -> Self {
        self.meta = Some(FrameMeta { custom });
        self
    }

    /// Row count, taken from the first field.
    pub fn row_count(&self) -> usize {
        self.fields.first().map_or(0, |f| f.values.len())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn custom_meta(&self, key: &str) -> Option<&Value> {
        self.meta.as_ref().and_then(|m| m.custom.get(key))
    }
}
