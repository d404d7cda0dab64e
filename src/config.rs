//! Scenario configuration loaded from JSON.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distance::DistanceProvider;
use crate::error::ConfigError;
use crate::model::{BigMPolicy, FleetUsage, ModelConfig};
use crate::models::{Fleet, Node, ProblemInstance};
use crate::solver::SolveOptions;

pub const DEFAULT_VEHICLE_COUNT: usize = 3;
pub const DEFAULT_VEHICLE_CAPACITY: i32 = 200;
pub const DEFAULT_TRAVEL_TIME_FACTOR: f64 = 1.0;

/// Parameters of one solve, with defaults for every key.
///
/// # Examples
///
/// ```
/// use u_cvrptw::config::ScenarioConfig;
///
/// let config = ScenarioConfig::from_json_str(r#"{"vehicle_count": 2, "time_windows": false}"#).unwrap();
/// assert_eq!(config.vehicle_count, 2);
/// assert_eq!(config.vehicle_capacity, 200);
/// assert!(config.capacity);
/// assert!(!config.model_config().time_windows);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Upper bound (or exact count, see `fleet_usage`) on vehicles used.
    pub vehicle_count: usize,
    /// Capacity of every vehicle.
    pub vehicle_capacity: i32,
    /// Enable load-based sub-tour elimination.
    pub capacity: bool,
    /// Enable start-time-based sub-tour elimination.
    pub time_windows: bool,
    /// Depot exit bound.
    pub fleet_usage: FleetUsage,
    /// Big-M sizing.
    pub big_m: BigMPolicy,
    /// Service start at the depot.
    pub day_start: f64,
    /// Travel time per unit of distance.
    pub travel_time_factor: f64,
    /// Service duration applied to every customer; `None` keeps per-node
    /// values.
    pub service_duration: Option<f64>,
    /// Solver wall-clock limit in seconds.
    pub time_limit_secs: Option<f64>,
    /// Report the incumbent of a timed-out solve instead of failing.
    pub accept_incumbent: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            vehicle_count: DEFAULT_VEHICLE_COUNT,
            vehicle_capacity: DEFAULT_VEHICLE_CAPACITY,
            capacity: true,
            time_windows: true,
            fleet_usage: FleetUsage::AtMost,
            big_m: BigMPolicy::Derived,
            day_start: 0.0,
            travel_time_factor: DEFAULT_TRAVEL_TIME_FACTOR,
            service_duration: None,
            time_limit_secs: None,
            accept_incumbent: false,
        }
    }
}

impl ScenarioConfig {
    /// Parses a JSON object; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        debug!(path = %path.display(), ?config, "scenario configuration loaded");
        Ok(config)
    }

    /// Fleet described by this scenario.
    pub fn fleet(&self) -> Fleet {
        Fleet::new(self.vehicle_count, self.vehicle_capacity)
    }

    /// Model construction options.
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            capacity: self.capacity,
            time_windows: self.time_windows,
            fleet_usage: self.fleet_usage,
            big_m: self.big_m,
        }
    }

    /// Solver options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeLimit`] for a negative or
    /// non-finite limit.
    pub fn solve_options(&self) -> Result<SolveOptions, ConfigError> {
        let mut options = SolveOptions {
            accept_incumbent: self.accept_incumbent,
            ..SolveOptions::default()
        };
        if let Some(secs) = self.time_limit_secs {
            let limit = Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeLimit(secs))?;
            options = options.with_time_limit(limit);
        }
        Ok(options)
    }

    /// Builds an instance over `nodes` with this scenario's fleet, day
    /// start, travel-time factor and service duration.
    pub fn instance(&self, nodes: Vec<Node>, provider: &impl DistanceProvider) -> Result<ProblemInstance, ConfigError> {
        let nodes = match self.service_duration {
            Some(duration) => nodes
                .into_iter()
                .map(|n| if n.is_depot() { n } else { n.with_service_duration(duration) })
                .collect(),
            None => nodes,
        };
        ProblemInstance::from_provider(nodes, provider, self.travel_time_factor, self.fleet(), self.day_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;
    use crate::model::BigM;

    #[test]
    fn test_empty_object_is_default() {
        let c = ScenarioConfig::from_json_str("{}").expect("valid");
        assert_eq!(c, ScenarioConfig::default());
        assert_eq!(c.model_config(), ModelConfig::default());
    }

    #[test]
    fn test_full_object() {
        let c = ScenarioConfig::from_json_str(
            r#"{
                "vehicle_count": 4,
                "vehicle_capacity": 50,
                "capacity": false,
                "fleet_usage": "exactly",
                "big_m": {"fixed": {"capacity": 10.0, "time": 500.0}},
                "day_start": 480.0,
                "time_limit_secs": 2.5,
                "accept_incumbent": true
            }"#,
        )
        .expect("valid");
        assert_eq!(c.fleet(), Fleet::new(4, 50));
        let model = c.model_config();
        assert!(!model.capacity && model.time_windows);
        assert_eq!(model.fleet_usage, FleetUsage::Exactly);
        assert_eq!(
            model.big_m,
            BigMPolicy::Fixed(BigM {
                capacity: 10.0,
                time: 500.0
            })
        );
        let options = c.solve_options().expect("valid limit");
        assert_eq!(options.time_limit, Some(Duration::from_millis(2500)));
        assert!(options.accept_incumbent);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ScenarioConfig::from_json_str(r#"{"vehicle_count": "three"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ScenarioConfig::from_path("/nonexistent/scenario.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!("u_cvrptw_scenario_{}.json", std::process::id()));
        fs::write(&path, r#"{"vehicle_capacity": 25}"#).expect("writable temp dir");
        let c = ScenarioConfig::from_path(&path).expect("valid");
        fs::remove_file(&path).ok();
        assert_eq!(c.vehicle_capacity, 25);
    }

    #[test]
    fn test_invalid_time_limit() {
        let c = ScenarioConfig {
            time_limit_secs: Some(-1.0),
            ..ScenarioConfig::default()
        };
        assert!(matches!(c.solve_options(), Err(ConfigError::InvalidTimeLimit(_))));
    }

    #[test]
    fn test_instance_applies_uniform_service() {
        let c = ScenarioConfig {
            service_duration: Some(10.0),
            travel_time_factor: 2.0,
            ..ScenarioConfig::default()
        };
        let nodes = vec![Node::depot(0.0, 0.0), Node::customer(1, 3.0, 4.0, 5)];
        let inst = c.instance(nodes, &Euclidean).expect("well-formed");
        assert_eq!(inst.nodes()[0].service_duration(), 0.0);
        assert_eq!(inst.nodes()[1].service_duration(), 10.0);
        assert!((inst.travel_time(0, 1) - 10.0).abs() < 1e-9);
        assert_eq!(inst.fleet().capacity(), 200);
    }
}
