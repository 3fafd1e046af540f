// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 3: Internal module imports
use super::error::ConfigError;
use super::value::ConfigValue;

/// A flat, string-keyed bag of [`ConfigValue`]s.
///
/// Built up with the builder-style `with_*` methods and then read
/// through the typed `get_*`/`require_*` accessors, which translate
/// "missing" and "wrong type" into [`ConfigError`] rather than panics.
#[derive(Debug, Clone, Default)]
pub struct ConfigMap {
    values: HashMap<String, ConfigValue>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn require(&self, key: &str) -> Result<&ConfigValue, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ConfigError> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| ConfigError::WrongType {
            key: key.to_string(),
            expected: "string",
            found: value.type_name(),
        })
    }

    pub fn require_integer(&self, key: &str) -> Result<i64, ConfigError> {
        let value = self.require(key)?;
        value.as_integer().ok_or_else(|| ConfigError::WrongType {
            key: key.to_string(),
            expected: "integer",
            found: value.type_name(),
        })
    }

    pub fn get_integer_or(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_integer().ok_or_else(|| ConfigError::WrongType {
                key: key.to_string(),
                expected: "integer",
                found: value.type_name(),
            }),
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| ConfigError::WrongType {
                key: key.to_string(),
                expected: "bool",
                found: value.type_name(),
            }),
        }
    }

    pub fn get_float_or(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_float().ok_or_else(|| ConfigError::WrongType {
                key: key.to_string(),
                expected: "float",
                found: value.type_name(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_key_is_an_error() {
        let config = ConfigMap::new();
        assert_eq!(
            config.require_str("name"),
            Err(ConfigError::Missing {
                key: "name".to_string()
            })
        );
    }

    #[test]
    fn wrong_type_is_an_error() {
        let config = ConfigMap::new().with("workers", "four");
        assert_eq!(
            config.require_integer("workers"),
            Err(ConfigError::WrongType {
                key: "workers".to_string(),
                expected: "integer",
                found: "string",
            })
        );
    }

    #[test]
    fn defaults_are_used_when_key_absent() {
        let config = ConfigMap::new();
        assert_eq!(config.get_integer_or("workers", 4).unwrap(), 4);
    }

    #[test]
    fn present_value_overrides_default() {
        let config = ConfigMap::new().with("workers", 8i64);
        assert_eq!(config.get_integer_or("workers", 4).unwrap(), 8);
    }
}
