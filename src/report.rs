//! Solution report handed to plotting and console collaborators.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evaluation::RouteMetrics;
use crate::extraction::ActivationMatrix;
use crate::lp::VarId;
use crate::model::CvrptwModel;
use crate::models::Route;
use crate::solver::Assignment;

/// How the reported solution was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    /// Proven optimal.
    Optimal,
    /// Best incumbent of a timed-out solve, accepted by the caller.
    Incumbent,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "optimal"),
            SolutionStatus::Incumbent => write!(f, "incumbent"),
        }
    }
}

/// Objective, routes, arc activations and rounded per-node values.
///
/// `loads` and `starts` are indexed by node id and present only when the
/// corresponding constraint family was modeled; the `customer_*` accessors
/// drop the depot entry. `route_metrics` holds the audited load, distance
/// and earliest schedule of each route, in route order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionReport {
    objective: f64,
    status: SolutionStatus,
    routes: Vec<Route>,
    arcs: Vec<Vec<u8>>,
    loads: Option<Vec<i64>>,
    starts: Option<Vec<i64>>,
    #[serde(default)]
    route_metrics: Vec<RouteMetrics>,
}

impl SolutionReport {
    /// Assembles a report; `load` and `start` values are rounded to the
    /// nearest integer.
    pub fn new(
        model: &CvrptwModel,
        assignment: &Assignment,
        objective: f64,
        status: SolutionStatus,
        routes: Vec<Route>,
        active: &ActivationMatrix,
    ) -> Self {
        let read = |var: Option<VarId>| var.map(|v| assignment.value(v).round() as i64);
        let loads = (0..model.num_nodes())
            .map(|i| read(model.load(i)))
            .collect::<Option<Vec<_>>>();
        let starts = (0..model.num_nodes())
            .map(|i| read(model.start(i)))
            .collect::<Option<Vec<_>>>();
        Self {
            objective,
            status,
            routes,
            arcs: active.to_rows(),
            loads,
            starts,
            route_metrics: Vec::new(),
        }
    }

    /// Attaches per-route audit metrics.
    pub fn with_route_metrics(mut self, metrics: Vec<RouteMetrics>) -> Self {
        self.route_metrics = metrics;
        self
    }

    /// Total distance of the routes.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Whether the solution is proven optimal.
    pub fn status(&self) -> SolutionStatus {
        self.status
    }

    /// Extracted routes, one per vehicle used.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of vehicles that left the depot.
    pub fn vehicles_used(&self) -> usize {
        self.routes.len()
    }

    /// Arc activations as n×n rows of 0/1.
    pub fn arcs(&self) -> &[Vec<u8>] {
        &self.arcs
    }

    /// Rounded cumulative load per node, depot included.
    pub fn loads(&self) -> Option<&[i64]> {
        self.loads.as_deref()
    }

    /// Rounded service start per node, depot included.
    pub fn starts(&self) -> Option<&[i64]> {
        self.starts.as_deref()
    }

    /// Audited load, distance and schedule of each route.
    pub fn route_metrics(&self) -> &[RouteMetrics] {
        &self.route_metrics
    }

    /// Total route distance as recomputed from the instance.
    pub fn audited_distance(&self) -> f64 {
        self.route_metrics.iter().map(|m| m.distance).sum()
    }

    /// Cumulative loads of customers `1..n`.
    pub fn customer_loads(&self) -> Option<&[i64]> {
        self.loads().map(skip_depot)
    }

    /// Service starts of customers `1..n`.
    pub fn customer_starts(&self) -> Option<&[i64]> {
        self.starts().map(skip_depot)
    }

    /// The solution artifact as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn skip_depot(values: &[i64]) -> &[i64] {
    values.get(1..).unwrap_or(&[])
}

impl fmt::Display for SolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Objective: {:.4} ({})", self.objective, self.status)?;
        for (k, route) in self.routes.iter().enumerate() {
            let path: Vec<String> = route.nodes().iter().map(|n| n.to_string()).collect();
            write!(f, "Vehicle {}: {}", route.vehicle(), path.join(" -> "))?;
            match self.route_metrics.get(k) {
                Some(m) => writeln!(f, " (load {}, distance {:.4})", m.load, m.distance)?,
                None => writeln!(f)?,
            }
        }
        if let Some(starts) = self.customer_starts() {
            writeln!(f, "Service starts: {:?}", starts)?;
        }
        if let Some(loads) = self.customer_loads() {
            writeln!(f, "Cumulative loads: {:?}", loads)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;
    use crate::model::ModelConfig;
    use crate::models::{Fleet, Node, ProblemInstance};

    fn model(config: &ModelConfig) -> CvrptwModel {
        let nodes = vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 1.0, 0.0, 4),
            Node::customer(2, 2.0, 0.0, 6),
        ];
        let inst = ProblemInstance::from_provider(nodes, &Euclidean, 1.0, Fleet::new(1, 10), 0.0)
            .expect("well-formed");
        CvrptwModel::build(&inst, config).expect("valid")
    }

    fn report(config: &ModelConfig) -> SolutionReport {
        let model = model(config);
        let mut values = vec![0.0; model.program().num_vars()];
        for (i, j) in [(0, 1), (1, 2), (2, 0)] {
            values[model.arc(i, j).expect("arc").index()] = 1.0;
        }
        for (i, load) in [(0, 0.0), (1, 4.0000001), (2, 9.9999)] {
            if let Some(v) = model.load(i) {
                values[v.index()] = load;
            }
        }
        for (i, start) in [(0, 0.0), (1, 0.4), (2, 1.6)] {
            if let Some(v) = model.start(i) {
                values[v.index()] = start;
            }
        }
        let routes = vec![Route::new(0, vec![0, 1, 2, 0])];
        let active = ActivationMatrix::from_routes(3, &routes);
        SolutionReport::new(&model, &Assignment::new(values), 4.0, SolutionStatus::Optimal, routes, &active)
    }

    #[test]
    fn test_rounded_values_exclude_depot() {
        let r = report(&ModelConfig::default());
        assert_eq!(r.loads(), Some(&[0, 4, 10][..]));
        assert_eq!(r.customer_loads(), Some(&[4, 10][..]));
        assert_eq!(r.customer_starts(), Some(&[0, 2][..]));
        assert_eq!(r.vehicles_used(), 1);
        assert_eq!(r.arcs()[1], vec![0, 0, 1]);
    }

    #[test]
    fn test_disabled_family_is_absent() {
        let r = report(&ModelConfig::capacity_only());
        assert!(r.starts().is_none());
        assert!(r.customer_starts().is_none());
        assert!(r.loads().is_some());
    }

    #[test]
    fn test_display() {
        let text = report(&ModelConfig::default()).to_string();
        assert!(text.starts_with("Objective: 4.0000 (optimal)"));
        assert!(text.contains("Vehicle 0: 0 -> 1 -> 2 -> 0"));
        assert!(text.contains("Service starts: [0, 2]"));
        assert!(text.contains("Cumulative loads: [4, 10]"));
    }

    #[test]
    fn test_route_metrics() {
        let metrics = vec![RouteMetrics {
            vehicle: 0,
            load: 10,
            distance: 4.0,
            earliest_starts: vec![1.0, 2.0],
        }];
        let r = report(&ModelConfig::default()).with_route_metrics(metrics.clone());
        assert_eq!(r.route_metrics(), &metrics[..]);
        assert!((r.audited_distance() - 4.0).abs() < 1e-12);
        assert!(r.to_string().contains("Vehicle 0: 0 -> 1 -> 2 -> 0 (load 10, distance 4.0000)"));

        let json = r.to_json().expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["route_metrics"][0]["load"], 10);
        let back: SolutionReport = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, r);
    }

    #[test]
    fn test_json_artifact() {
        let r = report(&ModelConfig::time_windows_only());
        let json = r.to_json().expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["status"], "optimal");
        assert!(value["loads"].is_null());
        assert_eq!(value["routes"][0]["nodes"], serde_json::json!([0, 1, 2, 0]));
        let back: SolutionReport = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, r);
    }
}
