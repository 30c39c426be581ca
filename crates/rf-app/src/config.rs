//! Session configuration: loading, saving, validation.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use rf_fleet::{Train, TrainStatus, default_fleet};
use rf_optim::{DEFAULT_HISTORY_CAPACITY, EngineOptions, MAX_HISTORY_CAPACITY};
use rf_sim::{MAX_DELAY_JITTER_MIN, MAX_SPEED_JITTER_KMH, TelemetryOptions};

use crate::error::{AppError, AppResult};

fn default_tick_period_s() -> f64 {
    5.0
}

fn default_latency_s() -> f64 {
    3.0
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_speed_jitter() -> f64 {
    5.0
}

fn default_delay_jitter() -> f64 {
    1.0
}

/// Session configuration, as stored in YAML.
///
/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default = "default_tick_period_s")]
    pub tick_period_s: f64,
    #[serde(default = "default_latency_s")]
    pub optimization_latency_s: f64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_speed_jitter")]
    pub speed_jitter_kmh: f64,
    #[serde(default = "default_delay_jitter")]
    pub delay_jitter_min: f64,
    #[serde(default)]
    pub recompute_status_on_tick: bool,
    /// Seed for telemetry and the random strategy. Absent means OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
    /// Seed fleet. Absent means the built-in five-train fleet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleet: Option<Vec<TrainDef>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_period_s: default_tick_period_s(),
            optimization_latency_s: default_latency_s(),
            history_capacity: default_history_capacity(),
            speed_jitter_kmh: default_speed_jitter(),
            delay_jitter_min: default_delay_jitter(),
            recompute_status_on_tick: false,
            rng_seed: None,
            fleet: None,
        }
    }
}

impl SessionConfig {
    pub fn telemetry_options(&self) -> TelemetryOptions {
        TelemetryOptions {
            period_s: self.tick_period_s,
            speed_jitter_kmh: self.speed_jitter_kmh,
            delay_jitter_min: self.delay_jitter_min,
            recompute_status: self.recompute_status_on_tick,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            latency_s: self.optimization_latency_s,
            history_capacity: self.history_capacity,
        }
    }

    /// Trains to seed the registry with.
    pub fn seed_fleet(&self) -> Vec<Train> {
        match &self.fleet {
            Some(defs) => defs.iter().cloned().map(TrainDef::into_train).collect(),
            None => default_fleet(),
        }
    }

    /// Config with the built-in fleet written out explicitly, for `config init`.
    pub fn with_explicit_fleet(mut self) -> Self {
        self.fleet = Some(default_fleet().iter().map(TrainDef::from).collect());
        self
    }
}

/// One train as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainDef {
    pub id: String,
    pub name: String,
    pub route: String,
    pub max_speed: f64,
    #[serde(default)]
    pub current_speed: f64,
    #[serde(default)]
    pub delay: f64,
    /// Omitted means derived from `delay`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TrainStatus>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next_station: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub estimated_arrival: String,
}

impl TrainDef {
    pub fn into_train(self) -> Train {
        let status = self
            .status
            .unwrap_or_else(|| TrainStatus::from_delay(self.delay));
        Train::new(self.id, self.name, self.route, self.max_speed)
            .with_speed(self.current_speed)
            .with_delay(self.delay, status)
            .with_next_stop(self.next_station, self.estimated_arrival)
    }
}

impl From<&Train> for TrainDef {
    fn from(train: &Train) -> Self {
        Self {
            id: train.id.to_string(),
            name: train.name.clone(),
            route: train.route.clone(),
            max_speed: train.max_speed,
            current_speed: train.current_speed,
            delay: train.delay,
            status: Some(train.status),
            next_station: train.next_station.clone(),
            estimated_arrival: train.estimated_arrival.clone(),
        }
    }
}

/// Load config from a YAML file.
pub fn load_config(path: &Path) -> AppResult<SessionConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: SessionConfig = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;

    Ok(config)
}

/// Save config to a YAML file.
pub fn save_config(path: &Path, config: &SessionConfig) -> AppResult<()> {
    let content = serde_yaml::to_string(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, content).map_err(|e| AppError::ConfigFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

fn positive(value: f64, field: &str) -> AppResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} must be positive and finite (got {})",
            field, value
        )))
    }
}

fn within(value: f64, max: f64, field: &str) -> AppResult<()> {
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} must be within [0, {}] (got {})",
            field, max, value
        )))
    }
}

fn non_negative(value: f64, field: &str) -> AppResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} must be non-negative and finite (got {})",
            field, value
        )))
    }
}

/// Validate config values and the seed fleet.
pub fn validate_config(config: &SessionConfig) -> AppResult<()> {
    positive(config.tick_period_s, "tick_period_s")?;
    positive(config.optimization_latency_s, "optimization_latency_s")?;
    within(config.speed_jitter_kmh, MAX_SPEED_JITTER_KMH, "speed_jitter_kmh")?;
    within(config.delay_jitter_min, MAX_DELAY_JITTER_MIN, "delay_jitter_min")?;
    if !(1..=MAX_HISTORY_CAPACITY).contains(&config.history_capacity) {
        return Err(AppError::Validation(format!(
            "history_capacity must be within [1, {}] (got {})",
            MAX_HISTORY_CAPACITY, config.history_capacity
        )));
    }

    let Some(fleet) = &config.fleet else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    for def in fleet {
        if def.id.trim().is_empty() {
            return Err(AppError::Validation("Train ids must not be empty".to_string()));
        }
        if !seen.insert(def.id.as_str()) {
            return Err(AppError::Validation(format!(
                "Duplicate train id '{}' in fleet",
                def.id
            )));
        }
        positive(def.max_speed, &format!("fleet[{}].max_speed", def.id))?;
        non_negative(def.current_speed, &format!("fleet[{}].current_speed", def.id))?;
        non_negative(def.delay, &format!("fleet[{}].delay", def.id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: SessionConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.tick_period_s, 5.0);
        assert_eq!(config.optimization_latency_s, 3.0);
        assert_eq!(config.history_capacity, 5);
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.seed_fleet().len(), 5);
    }

    #[test]
    fn partial_document() {
        let yaml = "tick_period_s: 1.5\nrng_seed: 7\nrecompute_status_on_tick: true\n";
        let config: SessionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tick_period_s, 1.5);
        assert_eq!(config.rng_seed, Some(7));
        assert!(config.telemetry_options().recompute_status);
        assert_eq!(config.delay_jitter_min, 1.0);
    }

    #[test]
    fn unknown_field_rejected() {
        let result: Result<SessionConfig, _> = serde_yaml::from_str("tick_period: 5.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn fleet_status_derived_from_delay() {
        let yaml = r#"
fleet:
  - id: X1
    name: Test
    route: A - B
    max_speed: 100
    delay: 7
  - id: X2
    name: Test 2
    route: A - B
    max_speed: 90
    current_speed: 60
    status: maintenance
"#;
        let config: SessionConfig = serde_yaml::from_str(yaml).unwrap();
        validate_config(&config).unwrap();
        let fleet = config.seed_fleet();
        assert_eq!(fleet[0].status, TrainStatus::Delayed);
        assert_eq!(fleet[1].status, TrainStatus::Maintenance);
        assert_eq!(fleet[1].current_speed, 60.0);
    }

    #[test]
    fn validation_failures() {
        let bad = SessionConfig {
            tick_period_s: 0.0,
            ..Default::default()
        };
        assert!(matches!(validate_config(&bad), Err(AppError::Validation(_))));

        let bad = SessionConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert!(validate_config(&bad).is_err());

        let bad = SessionConfig {
            speed_jitter_kmh: -1.0,
            ..Default::default()
        };
        assert!(validate_config(&bad).is_err());

        let mut dup = SessionConfig::default().with_explicit_fleet();
        if let Some(fleet) = dup.fleet.as_mut() {
            let first = fleet[0].clone();
            fleet.push(first);
        }
        let err = validate_config(&dup).unwrap_err();
        assert!(err.to_string().contains("Duplicate train id 'T001'"));
    }

    #[test]
    fn oversized_values_rejected() {
        let config: SessionConfig = serde_yaml::from_str("speed_jitter_kmh: 1.0e308\n").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("speed_jitter_kmh"));

        let config: SessionConfig = serde_yaml::from_str("delay_jitter_min: 1.0e300\n").unwrap();
        assert!(validate_config(&config).is_err());

        let yaml = "history_capacity: 18446744073709551615\n";
        let config: SessionConfig = serde_yaml::from_str(yaml).unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("history_capacity"));
    }

    #[test]
    fn explicit_fleet_matches_builtin() {
        let config = SessionConfig::default().with_explicit_fleet();
        assert_eq!(config.seed_fleet(), default_fleet());
    }
}
