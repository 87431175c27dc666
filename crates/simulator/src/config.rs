use std::time::Duration;

use lemos_core::types::AreaId;

const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
const DEFAULT_AREAS: &str = "1,2,3";
const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Error raised when a simulator environment variable is unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("SIMULATOR_FOCUS_AREA '{0}' is not one of SIMULATOR_AREAS")]
    UnknownFocus(AreaId),
}

/// Simulator configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub backend_url: String,
    /// Areas included in every generated payload, in payload order.
    pub areas: Vec<AreaId>,
    pub interval: Duration,
    /// Area whose latest reading is fetched back after each push.
    pub focus: AreaId,
}

impl SimulatorConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `BACKEND_URL`             | `http://localhost:3000` |
    /// | `SIMULATOR_AREAS`         | `1,2,3`                 |
    /// | `SIMULATOR_INTERVAL_SECS` | `5`                     |
    /// | `SIMULATOR_FOCUS_AREA`    | first area              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = lookup("BACKEND_URL")
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let raw_areas = lookup("SIMULATOR_AREAS").unwrap_or_else(|| DEFAULT_AREAS.to_string());
        let areas = raw_areas
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| AreaId::new(s).map_err(|e| invalid("SIMULATOR_AREAS", &raw_areas, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let Some(first) = areas.first().cloned() else {
            return Err(invalid("SIMULATOR_AREAS", &raw_areas, "no areas listed"));
        };

        let interval_secs = match lookup("SIMULATOR_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => return Err(invalid("SIMULATOR_INTERVAL_SECS", &raw, "must be positive")),
                Ok(secs) => secs,
                Err(e) => return Err(invalid("SIMULATOR_INTERVAL_SECS", &raw, e)),
            },
            None => DEFAULT_INTERVAL_SECS,
        };

        let focus = match lookup("SIMULATOR_FOCUS_AREA") {
            Some(raw) => {
                let focus =
                    AreaId::new(raw.trim()).map_err(|e| invalid("SIMULATOR_FOCUS_AREA", &raw, e))?;
                if !areas.contains(&focus) {
                    return Err(ConfigError::UnknownFocus(focus));
                }
                focus
            }
            None => first,
        };

        Ok(Self {
            backend_url,
            areas,
            interval: Duration::from_secs(interval_secs),
            focus,
        })
    }
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = SimulatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend_url, "http://localhost:3000");
        assert_eq!(config.areas.len(), 3);
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.focus.as_str(), "1");
    }

    #[test]
    fn explicit_values_are_used() {
        let config = SimulatorConfig::from_lookup(lookup(&[
            ("BACKEND_URL", "http://lemos:8080/"),
            ("SIMULATOR_AREAS", "north, south"),
            ("SIMULATOR_INTERVAL_SECS", "2"),
            ("SIMULATOR_FOCUS_AREA", "south"),
        ]))
        .unwrap();
        assert_eq!(config.backend_url, "http://lemos:8080");
        assert_eq!(config.areas[0].as_str(), "north");
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.focus.as_str(), "south");
    }

    #[test]
    fn focus_outside_areas_is_rejected() {
        let err = SimulatorConfig::from_lookup(lookup(&[
            ("SIMULATOR_AREAS", "1,2"),
            ("SIMULATOR_FOCUS_AREA", "7"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFocus(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = SimulatorConfig::from_lookup(lookup(&[("SIMULATOR_INTERVAL_SECS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("SIMULATOR_INTERVAL_SECS"));
    }

    #[test]
    fn empty_area_list_is_rejected() {
        assert!(SimulatorConfig::from_lookup(lookup(&[("SIMULATOR_AREAS", " , ")])).is_err());
    }
}
