//! Route auditor that re-derives load, distance and timing from the instance.

use serde::{Deserialize, Serialize};

use crate::model::ModelConfig;
use crate::models::{ProblemInstance, Route};

/// Slack allowed when comparing solver start times against windows.
pub const AUDIT_TOLERANCE: f64 = 1e-6;

/// Types of constraint violations found on extracted routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Route demand exceeds vehicle capacity.
    CapacityExceeded {
        /// Route index in the solution.
        route_index: usize,
        /// Demand served by the route.
        load: i32,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// Service starts outside the customer's window.
    TimeWindowViolated {
        /// Customer where the violation occurred.
        customer_id: usize,
        /// Service start time.
        start: f64,
        /// Window opening.
        earliest: f64,
        /// Window closing.
        latest: f64,
    },
    /// Service at `to` starts before the vehicle can arrive from `from`.
    PrecedenceViolated {
        /// Route index in the solution.
        route_index: usize,
        /// Preceding customer.
        from: usize,
        /// Following customer.
        to: usize,
        /// Earliest possible arrival at `to`.
        ready: f64,
        /// Reported service start at `to`.
        start: f64,
    },
}

/// A constraint violation on an extracted route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// Metrics of one route as derived from the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    /// Vehicle driving the route.
    pub vehicle: usize,
    /// Sum of customer demands.
    pub load: i32,
    /// Travelled distance, depot legs included.
    pub distance: f64,
    /// Earliest feasible service start per customer, in visit order.
    /// Depot legs are not timed, so the first customer starts at its
    /// window opening.
    pub earliest_starts: Vec<f64>,
}

/// Re-checks extracted routes against the instance.
///
/// Only the constraint families enabled in the [`ModelConfig`] are
/// checked; a disabled family is not part of the model, so its
/// "violations" are expected.
///
/// # Examples
///
/// ```
/// use u_cvrptw::distance::Euclidean;
/// use u_cvrptw::evaluation::RouteAuditor;
/// use u_cvrptw::model::ModelConfig;
/// use u_cvrptw::models::{Fleet, Node, ProblemInstance, Route};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 3.0, 4.0, 10),
///     Node::customer(2, 6.0, 8.0, 20),
/// ];
/// let inst = ProblemInstance::from_provider(nodes, &Euclidean, 1.0, Fleet::new(1, 100), 0.0).unwrap();
/// let config = ModelConfig::default();
/// let auditor = RouteAuditor::new(&inst, &config);
///
/// let routes = vec![Route::new(0, vec![0, 1, 2, 0])];
/// let (metrics, violations) = auditor.audit(&routes, None);
/// assert_eq!(metrics[0].load, 30);
/// assert!((metrics[0].distance - 20.0).abs() < 1e-9);
/// assert!(violations.is_empty());
/// ```
pub struct RouteAuditor<'a> {
    instance: &'a ProblemInstance,
    config: &'a ModelConfig,
}

impl<'a> RouteAuditor<'a> {
    /// Creates an auditor for the given instance and model options.
    pub fn new(instance: &'a ProblemInstance, config: &'a ModelConfig) -> Self {
        Self { instance, config }
    }

    /// Computes metrics for one route and its violations.
    ///
    /// `starts` are solver start times indexed by node id; without them
    /// the earliest feasible schedule is checked instead.
    pub fn audit_route(
        &self,
        route_index: usize,
        route: &Route,
        starts: Option<&[f64]>,
    ) -> (RouteMetrics, Vec<Violation>) {
        let nodes = self.instance.nodes();
        let mut violations = Vec::new();

        let load: i32 = route.customers().iter().map(|&c| nodes[c].demand()).sum();
        let distance: f64 = route.arcs().map(|(i, j)| self.instance.distance(i, j)).sum();

        let mut earliest_starts = Vec::with_capacity(route.len());
        let mut prev: Option<(usize, f64)> = None;
        for &c in route.customers() {
            let tw = nodes[c].time_window();
            let ready = match prev {
                Some((p, p_start)) => {
                    p_start + nodes[p].service_duration() + self.instance.travel_time(p, c)
                }
                None => tw.earliest(),
            };
            let earliest = ready.max(tw.earliest());
            earliest_starts.push(earliest);

            let start = starts.and_then(|s| s.get(c).copied()).unwrap_or(earliest);
            if self.config.time_windows {
                if start < tw.earliest() - AUDIT_TOLERANCE || start > tw.latest() + AUDIT_TOLERANCE {
                    violations.push(Violation::new(ViolationType::TimeWindowViolated {
                        customer_id: c,
                        start,
                        earliest: tw.earliest(),
                        latest: tw.latest(),
                    }));
                }
                if let Some((p, _)) = prev {
                    if start < ready - AUDIT_TOLERANCE {
                        violations.push(Violation::new(ViolationType::PrecedenceViolated {
                            route_index,
                            from: p,
                            to: c,
                            ready,
                            start,
                        }));
                    }
                }
            }
            prev = Some((c, start));
        }

        let capacity = self.instance.fleet().capacity();
        if self.config.capacity && load > capacity {
            violations.push(Violation::new(ViolationType::CapacityExceeded {
                route_index,
                load,
                capacity,
            }));
        }

        let metrics = RouteMetrics {
            vehicle: route.vehicle(),
            load,
            distance,
            earliest_starts,
        };
        (metrics, violations)
    }

    /// Audits every route.
    pub fn audit(&self, routes: &[Route], starts: Option<&[f64]>) -> (Vec<RouteMetrics>, Vec<Violation>) {
        let mut all_metrics = Vec::with_capacity(routes.len());
        let mut all_violations = Vec::new();
        for (idx, route) in routes.iter().enumerate() {
            let (metrics, mut violations) = self.audit_route(idx, route, starts);
            all_metrics.push(metrics);
            all_violations.append(&mut violations);
        }
        (all_metrics, all_violations)
    }
}
