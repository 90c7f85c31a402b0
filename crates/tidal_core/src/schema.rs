//! Structural validation of untyped JSON values.
//!
//! A [`Schema`] describes the expected shape of a value. Validation walks the
//! whole value and reports every mismatch, each annotated with the path from
//! the root, instead of stopping at the first one.

use std::fmt;

use serde_json::Value;

use crate::decode::render;

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Any,
    Null,
    Boolean,
    Number,
    Integer,
    String,
    /// Matches exactly this value.
    Literal(Value),
    Array(Box<Schema>),
    /// Object with (at least) the listed fields; extra fields are allowed.
    Object(Vec<(String, Schema)>),
    /// Accepts a missing value or `null` in addition to the inner shape.
    Optional(Box<Schema>),
}

impl Schema {
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Schema::Object(
            fields
                .into_iter()
                .map(|(key, schema)| (key.into(), schema))
                .collect(),
        )
    }

    pub fn array(item: Schema) -> Self {
        Schema::Array(Box::new(item))
    }

    pub fn optional(inner: Schema) -> Self {
        Schema::Optional(Box::new(inner))
    }

    /// Human-readable type name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            Schema::Any => "any".to_string(),
            Schema::Null => "null".to_string(),
            Schema::Boolean => "boolean".to_string(),
            Schema::Number => "number".to_string(),
            Schema::Integer => "Integer".to_string(),
            Schema::String => "string".to_string(),
            Schema::Literal(value) => render(value),
            Schema::Array(item) => format!("Array<{}>", item.name()),
            Schema::Object(fields) => {
                let inner = fields
                    .iter()
                    .map(|(key, schema)| format!("{key}: {}", schema.name()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{ {inner} }}")
            }
            Schema::Optional(inner) => format!("({} | undefined)", inner.name()),
        }
    }

    pub fn validate(&self, value: &Value) -> Result<(), Vec<ValidationError>> {
        let mut context = vec![ContextEntry::new("", self)];
        let mut errors = Vec::new();
        self.check(Some(value), &mut context, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check(
        &self,
        value: Option<&Value>,
        context: &mut Vec<ContextEntry>,
        errors: &mut Vec<ValidationError>,
    ) {
        let matches = match (self, value) {
            (Schema::Optional(_), None | Some(Value::Null)) => true,
            (Schema::Optional(inner), Some(present)) => {
                inner.check(Some(present), context, errors);
                true
            }
            (Schema::Any, Some(_)) => true,
            (Schema::Null, Some(Value::Null)) => true,
            (Schema::Boolean, Some(Value::Bool(_))) => true,
            (Schema::Number, Some(Value::Number(_))) => true,
            (Schema::Integer, Some(Value::Number(n))) => n.is_i64() || n.is_u64(),
            (Schema::String, Some(Value::String(_))) => true,
            (Schema::Literal(expected), Some(actual)) => expected == actual,
            (Schema::Array(item), Some(Value::Array(items))) => {
                for (index, element) in items.iter().enumerate() {
                    context.push(ContextEntry::new(index.to_string(), item));
                    item.check(Some(element), context, errors);
                    context.pop();
                }
                true
            }
            (Schema::Object(fields), Some(Value::Object(map))) => {
                for (key, schema) in fields {
                    context.push(ContextEntry::new(key.clone(), schema));
                    schema.check(map.get(key), context, errors);
                    context.pop();
                }
                true
            }
            _ => false,
        };

        if !matches {
            errors.push(ValidationError {
                context: context.clone(),
                value: value.cloned(),
            });
        }
    }
}

/// One step on the path from the validated root to a failing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub key: String,
    pub type_name: String,
}

impl ContextEntry {
    fn new(key: impl Into<String>, schema: &Schema) -> Self {
        Self {
            key: key.into(),
            type_name: schema.name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub context: Vec<ContextEntry>,
    /// `None` when the value was missing altogether.
    pub value: Option<Value>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self
            .value
            .as_ref()
            .map(render)
            .unwrap_or_else(|| "undefined".to_string());
        let path = self
            .context
            .iter()
            .map(|entry| format!("{}: {}", entry.key, entry.type_name))
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "Invalid value {value} supplied to {path}")
    }
}

impl std::error::Error for ValidationError {}
