use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::schema::Schema;

type DecodeFn<A> = dyn Fn(&Value) -> Result<A, String> + Send + Sync;

/// Pure validator turning an untyped JSON value into `A`, or a displayable error.
pub struct Decoder<A> {
    run: Arc<DecodeFn<A>>,
}

impl<A> Clone for Decoder<A> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<A> fmt::Debug for Decoder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("output", &std::any::type_name::<A>())
            .finish()
    }
}

impl<A: 'static> Decoder<A> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<A, String> + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    pub fn decode(&self, value: &Value) -> Result<A, String> {
        (self.run)(value)
    }

    /// Parses `text` as JSON before decoding; parser diagnostics become the error.
    pub fn decode_str(&self, text: &str) -> Result<A, String> {
        let value: Value = serde_json::from_str(text).map_err(|err| err.to_string())?;
        self.decode(&value)
    }

    /// Transforms the success value; errors pass through unchanged.
    pub fn map<B, F>(self, f: F) -> Decoder<B>
    where
        B: 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        Decoder::new(move |value| self.decode(value).map(&f))
    }

    pub fn and_then<B, F>(self, f: F) -> Decoder<B>
    where
        B: 'static,
        F: Fn(A) -> Result<B, String> + Send + Sync + 'static,
    {
        Decoder::new(move |value| self.decode(value).and_then(&f))
    }

    /// Tries `self`, then `other`; when both fail the messages are joined by a newline.
    pub fn or(self, other: Decoder<A>) -> Decoder<A> {
        Decoder::new(move |value| match self.decode(value) {
            Ok(decoded) => Ok(decoded),
            Err(first) => other
                .decode(value)
                .map_err(|second| format!("{first}\n{second}")),
        })
    }
}

impl<T: DeserializeOwned + 'static> Decoder<T> {
    /// Builds a decoder from the serde implementation of `T`.
    pub fn from_type() -> Self {
        Decoder::new(|value| T::deserialize(value).map_err(|err| err.to_string()))
    }

    /// Validates against `schema` first, reporting every mismatch one per line,
    /// then converts the validated value into `T`.
    pub fn from_schema(schema: Schema) -> Self {
        Decoder::new(move |value| {
            schema.validate(value).map_err(|errors| {
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            T::deserialize(value).map_err(|err| err.to_string())
        })
    }
}

/// Runs `decoder` over `value`.
pub fn decode_json<A: 'static>(decoder: &Decoder<A>, value: &Value) -> Result<A, String> {
    decoder.decode(value)
}

pub fn value() -> Decoder<Value> {
    Decoder::new(|value| Ok(value.clone()))
}

pub fn string() -> Decoder<String> {
    Decoder::new(|value| match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(invalid(other, "string")),
    })
}

pub fn number() -> Decoder<f64> {
    Decoder::new(|value| value.as_f64().ok_or_else(|| invalid(value, "number")))
}

pub fn int() -> Decoder<i64> {
    Decoder::new(|value| value.as_i64().ok_or_else(|| invalid(value, "Integer")))
}

pub fn boolean() -> Decoder<bool> {
    Decoder::new(|value| value.as_bool().ok_or_else(|| invalid(value, "boolean")))
}

pub fn null() -> Decoder<()> {
    Decoder::new(|value| match value {
        Value::Null => Ok(()),
        other => Err(invalid(other, "null")),
    })
}

/// Decodes the named field of an object.
pub fn field<A: 'static>(name: impl Into<String>, decoder: Decoder<A>) -> Decoder<A> {
    let name = name.into();
    Decoder::new(move |value| match value {
        Value::Object(map) => match map.get(&name) {
            Some(inner) => decoder
                .decode(inner)
                .map_err(|err| format!("field {name:?}: {err}")),
            None => Err(format!("missing field {name:?} in {}", render(value))),
        },
        other => Err(invalid(other, "object")),
    })
}

pub fn list<A: 'static>(decoder: Decoder<A>) -> Decoder<Vec<A>> {
    Decoder::new(move |value| match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                decoder
                    .decode(item)
                    .map_err(|err| format!("index {index}: {err}"))
            })
            .collect(),
        other => Err(invalid(other, "Array")),
    })
}

/// `null` decodes to `None`; anything else must satisfy `decoder`.
pub fn optional<A: 'static>(decoder: Decoder<A>) -> Decoder<Option<A>> {
    Decoder::new(move |value| match value {
        Value::Null => Ok(None),
        other => decoder.decode(other).map(Some),
    })
}

pub fn succeed<A: Clone + Send + Sync + 'static>(constant: A) -> Decoder<A> {
    Decoder::new(move |_| Ok(constant.clone()))
}

pub fn fail<A: 'static>(message: impl Into<String>) -> Decoder<A> {
    let message = message.into();
    Decoder::new(move |_| Err(message.clone()))
}

fn invalid(value: &Value, expected: &str) -> String {
    format!("Invalid value {} supplied to : {expected}", render(value))
}

pub(crate) fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_leaves_errors_untouched() {
        let decoder = string().map(|text| text.len());
        assert_eq!(decoder.decode(&json!("four")), Ok(4));
        assert_eq!(
            decoder.decode(&json!(4)),
            Err("Invalid value 4 supplied to : string".to_string())
        );
    }

    #[test]
    fn or_reports_both_failures() {
        let decoder = int().map(|n| n.to_string()).or(string());
        assert_eq!(decoder.decode(&json!(7)), Ok("7".to_string()));
        let err = decoder.decode(&json!(true)).unwrap_err();
        assert_eq!(err.lines().count(), 2);
    }

    #[test]
    fn decode_str_surfaces_parser_error() {
        let err = value().decode_str("{not json").unwrap_err();
        assert!(err.contains("key must be a string"), "{err}");
    }
}
