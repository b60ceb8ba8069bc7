//! Data context: the value a page is rendered against.

use serde::Serialize;
use serde_json::Value;

use crate::error::PageError;

/// Variable bound to the whole data context inside every page.
///
/// `{{ this | embed(page="bits/header.tpl") }}` forwards the caller's full
/// context into the embedded page.
pub const THIS: &str = "this";

/// Rendering payload for a single render call.
///
/// Object keys become top-level template variables; the complete value is
/// also reachable as [`THIS`] unless the data defines that key itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataContext(Value);

impl DataContext {
    /// Empty context: no variables, `this` is null.
    pub fn empty() -> Self {
        Self(Value::Null)
    }

    /// Convert any serializable value into a context.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self, PageError> {
        Ok(Self(serde_json::to_value(data)?))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> tera::Context {
        let mut ctx = tera::Context::new();
        if let Value::Object(map) = &self.0 {
            for (key, value) in map {
                ctx.insert(key.as_str(), value);
            }
        }
        if !ctx.contains_key(THIS) {
            ctx.insert(THIS, &self.0);
        }
        ctx
    }
}

impl From<Value> for DataContext {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
