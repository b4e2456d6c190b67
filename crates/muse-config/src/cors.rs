use std::time::Duration;

use serde::Deserialize;

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrArray,
    /// Allow credentials
    #[serde(default)]
    pub credentials: bool,
    /// Max age for preflight cache in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl CorsConfig {
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Either a wildcard "*" or explicit list of values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnyOrArray {
    /// Match any value
    #[default]
    Any,
    /// Explicit list
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnyOrArray {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for AnyOrArray {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = match RawAnyOrArray::deserialize(deserializer)? {
            RawAnyOrArray::One(value) => vec![value],
            RawAnyOrArray::Many(values) => values,
        };

        if values.iter().any(|v| v == "*") {
            Ok(Self::Any)
        } else {
            Ok(Self::List(values))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_string() {
        let config: CorsConfig = toml::from_str(r#"origins = "*""#).unwrap();
        assert_eq!(config.origins, AnyOrArray::Any);
    }

    #[test]
    fn wildcard_inside_list_wins() {
        let config: CorsConfig = toml::from_str(r#"origins = ["https://a.dev", "*"]"#).unwrap();
        assert_eq!(config.origins, AnyOrArray::Any);
    }

    #[test]
    fn explicit_origins() {
        let config: CorsConfig = toml::from_str(
            r#"
            origins = ["https://app.muse.dev"]
            credentials = true
            max_age = 600
            "#,
        )
        .unwrap();
        assert_eq!(config.origins, AnyOrArray::List(vec!["https://app.muse.dev".to_owned()]));
        assert!(config.credentials);
        assert_eq!(config.max_age_duration(), Some(Duration::from_secs(600)));
    }
}
