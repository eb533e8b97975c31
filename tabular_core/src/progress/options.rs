//! Backend options payload
//!
//! Options are an open-ended JSON object handed verbatim to the chosen
//! backend. Each backend decodes them into its own typed struct, so a
//! malformed payload surfaces as that backend's error.

use crate::error::ProgressError;
use crate::progress::BackendKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Options forwarded to a progress backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendOptions(Value);

impl BackendOptions {
    /// Empty options (backend defaults)
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Whether the payload carries no settings
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Raw payload
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Decode the payload for `backend`
    ///
    /// An empty payload yields `T::default()`.
    pub fn parse<T>(&self, backend: BackendKind) -> Result<T, ProgressError>
    where
        T: DeserializeOwned + Default,
    {
        if self.is_empty() {
            return Ok(T::default());
        }

        serde_json::from_value(self.0.clone())
            .map_err(|e| ProgressError::invalid_options(backend, e))
    }
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for BackendOptions {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<BTreeMap<String, Value>> for BackendOptions {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(Value::Object(map.into_iter().collect()))
    }
}
