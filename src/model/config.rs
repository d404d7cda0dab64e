//! Model construction options.

use serde::{Deserialize, Serialize};

use super::BigM;

/// How many vehicles must leave the depot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetUsage {
    /// At most `vehicle_count` vehicles are used.
    #[default]
    AtMost,
    /// Exactly `vehicle_count` vehicles leave and return.
    Exactly,
}

/// Where the big-M constants of the conditional constraints come from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BigMPolicy {
    /// Compute the smallest safe value per constraint family from the
    /// instance (see [`BigM::required`]).
    #[default]
    Derived,
    /// Use the given values as-is. Values below the derived requirement are
    /// reported as [`ModelWarning`](super::ModelWarning)s.
    Fixed(BigM),
}

/// Which constraint blocks to emit and how to size them.
///
/// At least one of `capacity` and `time_windows` must be enabled: each of
/// them eliminates sub-tours on its own, neither degree constraint does.
///
/// # Examples
///
/// ```
/// use u_cvrptw::model::{ModelConfig, FleetUsage};
///
/// let config = ModelConfig::capacity_only();
/// assert!(config.capacity);
/// assert!(!config.time_windows);
/// assert_eq!(config.fleet_usage, FleetUsage::AtMost);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Emit load propagation (capacity + sub-tour elimination).
    pub capacity: bool,
    /// Emit service-start propagation (time windows + sub-tour elimination).
    pub time_windows: bool,
    /// Depot exit bound: `<=` or `==` the vehicle count.
    pub fleet_usage: FleetUsage,
    /// Big-M sizing.
    pub big_m: BigMPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            capacity: true,
            time_windows: true,
            fleet_usage: FleetUsage::AtMost,
            big_m: BigMPolicy::Derived,
        }
    }
}

impl ModelConfig {
    /// Load propagation only.
    pub fn capacity_only() -> Self {
        Self {
            time_windows: false,
            ..Self::default()
        }
    }

    /// Service-start propagation only.
    pub fn time_windows_only() -> Self {
        Self {
            capacity: false,
            ..Self::default()
        }
    }

    /// Sets the fleet usage rule.
    pub fn with_fleet_usage(mut self, usage: FleetUsage) -> Self {
        self.fleet_usage = usage;
        self
    }

    /// Uses fixed big-M values instead of derived ones.
    pub fn with_big_m(mut self, big_m: BigM) -> Self {
        self.big_m = BigMPolicy::Fixed(big_m);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_both() {
        let c = ModelConfig::default();
        assert!(c.capacity && c.time_windows);
        assert_eq!(c.big_m, BigMPolicy::Derived);
    }

    #[test]
    fn test_deserialize_partial() {
        let c: ModelConfig =
            serde_json::from_str(r#"{"time_windows": false, "fleet_usage": "exactly"}"#)
                .expect("valid json");
        assert!(c.capacity);
        assert!(!c.time_windows);
        assert_eq!(c.fleet_usage, FleetUsage::Exactly);
    }

    #[test]
    fn test_deserialize_fixed_big_m() {
        let c: ModelConfig =
            serde_json::from_str(r#"{"big_m": {"fixed": {"capacity": 5.0, "time": 100.0}}}"#)
                .expect("valid json");
        assert_eq!(
            c.big_m,
            BigMPolicy::Fixed(BigM {
                capacity: 5.0,
                time: 100.0
            })
        );
    }
}
