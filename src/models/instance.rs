//! Validated problem instance.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Fleet, Node};
use crate::distance::{DistanceMatrix, DistanceProvider};
use crate::error::ConfigError;

/// One CVRPTW instance: nodes, distance and travel-time matrices, fleet and
/// the global day start.
///
/// Construction checks the shape of the data (ids match positions, matrices
/// are n×n with finite non-negative entries). [`ProblemInstance::validate`]
/// checks the semantic invariants that make an instance infeasible by
/// construction; the model builder calls it before emitting anything.
/// Deserialization goes through the same shape checks as
/// [`ProblemInstance::new`].
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Fleet, Node, ProblemInstance};
/// use u_cvrptw::distance::Euclidean;
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 1.0, 0.0, 10),
///     Node::customer(2, 0.0, 1.0, 10),
/// ];
/// let instance = ProblemInstance::from_provider(nodes, &Euclidean, 1.0, Fleet::new(2, 20), 0.0)
///     .expect("well-formed data");
/// assert_eq!(instance.num_customers(), 2);
/// assert!(instance.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemInstance {
    nodes: Vec<Node>,
    distances: DistanceMatrix,
    travel_times: DistanceMatrix,
    fleet: Fleet,
    day_start: f64,
}

/// Unchecked wire form of [`ProblemInstance`].
#[derive(Deserialize)]
struct RawInstance {
    nodes: Vec<Node>,
    distances: DistanceMatrix,
    travel_times: DistanceMatrix,
    fleet: Fleet,
    day_start: f64,
}

impl RawInstance {
    fn check(self) -> Result<ProblemInstance, ConfigError> {
        ProblemInstance::new(
            self.nodes,
            self.distances,
            self.travel_times,
            self.fleet,
            self.day_start,
        )
    }
}

impl<'de> Deserialize<'de> for ProblemInstance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawInstance::deserialize(deserializer)?
            .check()
            .map_err(serde::de::Error::custom)
    }
}

impl ProblemInstance {
    /// Assembles an instance from explicit matrices.
    pub fn new(
        nodes: Vec<Node>,
        distances: DistanceMatrix,
        travel_times: DistanceMatrix,
        fleet: Fleet,
        day_start: f64,
    ) -> Result<Self, ConfigError> {
        if nodes.is_empty() {
            return Err(ConfigError::EmptyInstance);
        }
        for (index, node) in nodes.iter().enumerate() {
            if node.id() != index {
                return Err(ConfigError::NodeIdMismatch {
                    index,
                    id: node.id(),
                });
            }
        }
        for (name, matrix) in [("distance", &distances), ("travel-time", &travel_times)] {
            if matrix.size() != nodes.len() {
                return Err(ConfigError::MatrixShape {
                    matrix: name,
                    expected: nodes.len(),
                    actual: matrix.size(),
                });
            }
            matrix.validate(name)?;
        }
        Ok(Self {
            nodes,
            distances,
            travel_times,
            fleet,
            day_start,
        })
    }

    /// Builds both matrices from a distance metric; travel time is
    /// `travel_time_factor × distance`.
    pub fn from_provider(
        nodes: Vec<Node>,
        provider: &impl DistanceProvider,
        travel_time_factor: f64,
        fleet: Fleet,
        day_start: f64,
    ) -> Result<Self, ConfigError> {
        let distances = provider.distances(&nodes);
        let travel_times = distances.scaled(travel_time_factor);
        Self::new(nodes, distances, travel_times, fleet, day_start)
    }

    /// Parses an instance from JSON, reporting shape errors as the
    /// matching [`ConfigError`] rather than as a parse failure.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawInstance = serde_json::from_str(json)?;
        raw.check()
    }

    /// Checks the invariants whose violation makes the instance unsolvable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fleet.vehicle_count() == 0 {
            return Err(ConfigError::NoVehicles);
        }
        let capacity = self.fleet.capacity();
        if capacity < 0 {
            return Err(ConfigError::NegativeCapacity(capacity));
        }
        if !(self.day_start.is_finite() && self.day_start >= 0.0) {
            return Err(ConfigError::InvalidDayStart(self.day_start));
        }
        let depot = &self.nodes[0];
        if depot.demand() != 0 {
            return Err(ConfigError::DepotDemand(depot.demand()));
        }
        let depot_tw = depot.time_window();
        if !depot_tw.contains(self.day_start) {
            return Err(ConfigError::DepotWindow {
                day_start: self.day_start,
                earliest: depot_tw.earliest(),
                latest: depot_tw.latest(),
            });
        }
        for node in self.customers() {
            let demand = node.demand();
            if demand < 0 {
                return Err(ConfigError::NegativeDemand {
                    node: node.id(),
                    demand,
                });
            }
            let service = node.service_duration();
            if !(service.is_finite() && service >= 0.0) {
                return Err(ConfigError::InvalidServiceDuration {
                    node: node.id(),
                    duration: service,
                });
            }
            let tw = node.time_window();
            if !tw.is_well_formed() {
                return Err(ConfigError::InvertedTimeWindow {
                    node: node.id(),
                    earliest: tw.earliest(),
                    latest: tw.latest(),
                });
            }
            if demand > capacity {
                return Err(ConfigError::DemandExceedsCapacity {
                    node: node.id(),
                    demand,
                    capacity,
                });
            }
        }
        Ok(())
    }

    /// All nodes, index 0 = depot.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Customer nodes `1..n`.
    pub fn customers(&self) -> &[Node] {
        &self.nodes[1..]
    }

    /// Node count including the depot.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of customers (excluding the depot).
    pub fn num_customers(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Distance from `from` to `to`.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    /// Travel time from `from` to `to`.
    pub fn travel_time(&self, from: usize, to: usize) -> f64 {
        self.travel_times.get(from, to)
    }

    /// The distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// The travel-time matrix.
    pub fn travel_times(&self) -> &DistanceMatrix {
        &self.travel_times
    }

    /// Fleet size and capacity.
    pub fn fleet(&self) -> Fleet {
        self.fleet
    }

    /// Clock time at which vehicles leave the depot.
    pub fn day_start(&self) -> f64 {
        self.day_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;

    fn nodes() -> Vec<Node> {
        vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 3.0, 4.0, 10).with_time_window(0.0, 50.0),
            Node::customer(2, 6.0, 8.0, 20).with_time_window(10.0, 60.0),
        ]
    }

    fn build(nodes: Vec<Node>, fleet: Fleet) -> ProblemInstance {
        ProblemInstance::from_provider(nodes, &Euclidean, 2.0, fleet, 0.0).expect("well-formed")
    }

    #[test]
    fn test_from_provider_scales_travel_time() {
        let inst = build(nodes(), Fleet::new(1, 30));
        assert_eq!(inst.num_nodes(), 3);
        assert_eq!(inst.num_customers(), 2);
        assert!((inst.distance(0, 1) - 5.0).abs() < 1e-10);
        assert!((inst.travel_time(0, 1) - 10.0).abs() < 1e-10);
        assert!(inst.validate().is_ok());
    }

    #[test]
    fn test_empty_instance_rejected() {
        let err = ProblemInstance::new(
            vec![],
            DistanceMatrix::new(0),
            DistanceMatrix::new(0),
            Fleet::new(1, 1),
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyInstance));
    }

    #[test]
    fn test_id_mismatch_rejected() {
        let nodes = vec![Node::depot(0.0, 0.0), Node::customer(5, 1.0, 1.0, 1)];
        let err = ProblemInstance::from_provider(nodes, &Euclidean, 1.0, Fleet::new(1, 5), 0.0)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NodeIdMismatch { index: 1, id: 5 }));
    }

    #[test]
    fn test_matrix_shape_rejected() {
        let err = ProblemInstance::new(
            nodes(),
            DistanceMatrix::new(3),
            DistanceMatrix::new(2),
            Fleet::new(1, 30),
            0.0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MatrixShape {
                matrix: "travel-time",
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_zero_vehicles_rejected() {
        let inst = build(nodes(), Fleet::new(0, 30));
        assert!(matches!(inst.validate(), Err(ConfigError::NoVehicles)));
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let inst = build(nodes(), Fleet::new(1, -5));
        assert!(matches!(inst.validate(), Err(ConfigError::NegativeCapacity(-5))));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut n = nodes();
        n[2] = Node::customer(2, 6.0, 8.0, 20).with_time_window(70.0, 60.0);
        let inst = build(n, Fleet::new(1, 30));
        assert!(matches!(
            inst.validate(),
            Err(ConfigError::InvertedTimeWindow { node: 2, .. })
        ));
    }

    #[test]
    fn test_demand_over_capacity_rejected() {
        let inst = build(nodes(), Fleet::new(3, 15));
        assert!(matches!(
            inst.validate(),
            Err(ConfigError::DemandExceedsCapacity {
                node: 2,
                demand: 20,
                capacity: 15
            })
        ));
    }

    #[test]
    fn test_negative_demand_rejected() {
        let mut n = nodes();
        n[1] = Node::customer(1, 3.0, 4.0, -1);
        let inst = build(n, Fleet::new(1, 30));
        assert!(matches!(
            inst.validate(),
            Err(ConfigError::NegativeDemand { node: 1, demand: -1 })
        ));
    }

    #[test]
    fn test_negative_day_start_rejected() {
        let inst =
            ProblemInstance::from_provider(nodes(), &Euclidean, 1.0, Fleet::new(1, 30), -1.0)
                .expect("well-formed");
        assert!(matches!(inst.validate(), Err(ConfigError::InvalidDayStart(_))));
    }

    #[test]
    fn test_negative_service_duration_rejected() {
        let mut n = nodes();
        n[2] = n[2].clone().with_service_duration(-3.0);
        let inst = build(n, Fleet::new(1, 30));
        assert!(matches!(
            inst.validate(),
            Err(ConfigError::InvalidServiceDuration { node: 2, .. })
        ));
    }

    #[test]
    fn test_depot_window_must_contain_day_start() {
        let mut n = nodes();
        n[0] = Node::depot(0.0, 0.0).with_time_window(0.0, 400.0);
        let inst = ProblemInstance::from_provider(n, &Euclidean, 1.0, Fleet::new(1, 30), 480.0)
            .expect("well-formed");
        assert!(matches!(
            inst.validate(),
            Err(ConfigError::DepotWindow { day_start, .. }) if day_start == 480.0
        ));
        let open = ProblemInstance::from_provider(nodes(), &Euclidean, 1.0, Fleet::new(1, 30), 480.0)
            .expect("well-formed");
        assert!(open.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let inst = build(nodes(), Fleet::new(2, 30));
        let json = serde_json::to_string(&inst).expect("serializable");
        assert!(json.contains(r#""latest":null"#));
        let back: ProblemInstance = serde_json::from_str(&json).expect("reloadable");
        assert_eq!(back, inst);
        assert!(back.nodes()[0].time_window().latest().is_infinite());
        assert_eq!(ProblemInstance::from_json_str(&json).expect("reloadable"), inst);
    }

    #[test]
    fn test_json_shape_checks() {
        let empty = r#"{"nodes":[],"distances":{"data":[],"size":0},"travel_times":{"data":[],"size":0},"fleet":{"vehicle_count":1,"capacity":10},"day_start":0.0}"#;
        assert!(matches!(
            ProblemInstance::from_json_str(empty),
            Err(ConfigError::EmptyInstance)
        ));
        let err = serde_json::from_str::<ProblemInstance>(empty).unwrap_err();
        assert!(err.to_string().contains("no nodes"));

        let inst = build(nodes(), Fleet::new(1, 30));
        let mut value = serde_json::to_value(&inst).expect("serializable");
        value["travel_times"] = serde_json::json!({"data": [0.0, 1.0, 1.0, 0.0], "size": 2});
        assert!(matches!(
            ProblemInstance::from_json_str(&value.to_string()),
            Err(ConfigError::MatrixShape {
                matrix: "travel-time",
                expected: 3,
                actual: 2
            })
        ));
        value["travel_times"] = serde_json::json!({"data": [0.0, 1.0], "size": 3});
        assert!(matches!(
            ProblemInstance::from_json_str(&value.to_string()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_depot_only_instance_is_valid() {
        let inst = build(vec![Node::depot(0.0, 0.0)], Fleet::new(1, 10));
        assert_eq!(inst.num_customers(), 0);
        assert!(inst.customers().is_empty());
        assert!(inst.validate().is_ok());
    }
}
