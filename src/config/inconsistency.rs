use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One field on which two configs that should agree hold different values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiConfigInconsistency {
    pub property_name: String,
    pub value1: Value,
    pub value2: Value,
}

impl fmt::Display for ApiConfigInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} != {})", self.property_name, self.value1, self.value2)
    }
}

/// Accumulates field-by-field differences between two configs.
#[derive(Debug, Default)]
pub(crate) struct InconsistencyCollector {
    found: Vec<ApiConfigInconsistency>,
}

impl InconsistencyCollector {
    pub(crate) fn check<T: PartialEq + Serialize>(&mut self, property_name: &str, a: &T, b: &T) {
        if a != b {
            self.found.push(ApiConfigInconsistency {
                property_name: property_name.to_string(),
                value1: serde_json::to_value(a).unwrap_or(Value::Null),
                value2: serde_json::to_value(b).unwrap_or(Value::Null),
            });
        }
    }

    pub(crate) fn finish(self) -> Vec<ApiConfigInconsistency> {
        self.found
    }
}
