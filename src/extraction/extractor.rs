//! Route reconstruction from an activation matrix.
//!
//! # Algorithm
//!
//! A successor table (node → unique next node) is built once. Every active
//! depot out-arc starts one route, in increasing order of its first
//! customer; the route follows successors until it returns to the depot.
//! Each walk is bounded by the node count, so a sub-tour or a rounding
//! defect is reported instead of looping. After all walks, the routes must
//! cover every customer exactly once.
//!
//! # Complexity
//!
//! O(n²) to read the matrix, O(n) for the walks.

use tracing::{debug, info};

use super::ActivationMatrix;
use crate::error::StructuralError;
use crate::models::Route;

/// Progress of one route walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteState {
    /// Only the depot so far.
    Started,
    /// At least one customer appended, not yet back at the depot.
    InProgress,
    /// Returned to the depot.
    Closed,
}

impl RouteState {
    fn advance(self, next: usize) -> Self {
        match (self, next) {
            (RouteState::Closed, _) => RouteState::Closed,
            (_, 0) => RouteState::Closed,
            _ => RouteState::InProgress,
        }
    }
}

/// Turns an arc-activation matrix into per-vehicle routes.
///
/// # Examples
///
/// ```
/// use u_cvrptw::extraction::{ActivationMatrix, RouteExtractor};
///
/// let mut m = ActivationMatrix::new(4);
/// for (i, j) in [(0, 3), (3, 1), (1, 0), (0, 2), (2, 0)] {
///     m.set(i, j, true);
/// }
/// let routes = RouteExtractor::new(4).extract(&m).unwrap();
/// assert_eq!(routes.len(), 2);
/// assert_eq!(routes[0].nodes(), &[0, 2, 0]);
/// assert_eq!(routes[1].nodes(), &[0, 3, 1, 0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteExtractor {
    num_nodes: usize,
}

impl RouteExtractor {
    /// Creates an extractor for matrices over `num_nodes` nodes (depot
    /// included).
    pub fn new(num_nodes: usize) -> Self {
        Self { num_nodes }
    }

    /// Reconstructs one route per active depot out-arc.
    ///
    /// Vehicles are numbered in route order. An empty matrix (no active
    /// depot arcs, no customers) yields no routes.
    ///
    /// # Errors
    ///
    /// Returns a [`StructuralError`] naming the offending nodes if the
    /// matrix has the wrong size, a node has several successors, depot
    /// in- and out-degree differ, a walk dead-ends or does not return
    /// within `n` steps, or the routes do not cover each customer exactly
    /// once.
    pub fn extract(&self, active: &ActivationMatrix) -> Result<Vec<Route>, StructuralError> {
        let n = self.num_nodes;
        if active.size() != n {
            return Err(StructuralError::ShapeMismatch {
                expected: n,
                actual: active.size(),
            });
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        let next = successor_table(active)?;
        let starts: Vec<usize> = active.successors(0).collect();
        let incoming = active.in_degree(0);
        if starts.len() != incoming {
            return Err(StructuralError::DepotFlowMismatch {
                outgoing: starts.len(),
                incoming,
            });
        }

        let mut routes = Vec::with_capacity(starts.len());
        for (vehicle, &first) in starts.iter().enumerate() {
            let path = walk(&next, first, n)?;
            let route = Route::new(vehicle, path);
            debug!(vehicle, nodes = ?route.nodes(), "extracted route");
            routes.push(route);
        }

        check_coverage(&routes, n)?;
        info!(routes = routes.len(), "routes extracted");
        Ok(routes)
    }
}

/// Unique successor of every customer; `None` for dead ends.
fn successor_table(active: &ActivationMatrix) -> Result<Vec<Option<usize>>, StructuralError> {
    let mut next = vec![None; active.size()];
    for (node, slot) in next.iter_mut().enumerate().skip(1) {
        let successors: Vec<usize> = active.successors(node).collect();
        match successors.as_slice() {
            [] => {}
            &[k] => *slot = Some(k),
            _ => return Err(StructuralError::MultipleSuccessors { node, successors }),
        }
    }
    Ok(next)
}

fn walk(next: &[Option<usize>], first: usize, limit: usize) -> Result<Vec<usize>, StructuralError> {
    let mut path = vec![0];
    let mut state = RouteState::Started;
    let mut hop = Some(first);

    for _ in 0..limit {
        let Some(k) = hop else {
            let node = path.last().copied().unwrap_or(0);
            return Err(StructuralError::DeadEnd {
                route_start: first,
                node,
            });
        };
        path.push(k);
        state = state.advance(k);
        if state == RouteState::Closed {
            return Ok(path);
        }
        hop = next[k];
    }

    Err(StructuralError::Unterminated {
        route_start: first,
        limit,
        path,
    })
}

fn check_coverage(routes: &[Route], n: usize) -> Result<(), StructuralError> {
    let mut visits = vec![0usize; n];
    for (idx, route) in routes.iter().enumerate() {
        if !route.is_anchored() {
            return Err(StructuralError::NotAnchored {
                route: idx,
                path: route.nodes().to_vec(),
            });
        }
        for &c in route.customers() {
            visits[c] += 1;
        }
    }
    if let Some((node, &occurrences)) = visits.iter().enumerate().skip(1).find(|(_, &v)| v > 1) {
        return Err(StructuralError::DuplicateCustomer { node, occurrences });
    }
    let missing: Vec<usize> = (1..n).filter(|&c| visits[c] == 0).collect();
    if !missing.is_empty() {
        return Err(StructuralError::MissingCustomers { nodes: missing });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn matrix(n: usize, arcs: &[(usize, usize)]) -> ActivationMatrix {
        let mut m = ActivationMatrix::new(n);
        for &(i, j) in arcs {
            m.set(i, j, true);
        }
        m
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(RouteState::Started.advance(3), RouteState::InProgress);
        assert_eq!(RouteState::InProgress.advance(2), RouteState::InProgress);
        assert_eq!(RouteState::InProgress.advance(0), RouteState::Closed);
        assert_eq!(RouteState::Closed.advance(4), RouteState::Closed);
    }

    #[test]
    fn test_single_route() {
        let m = matrix(4, &[(0, 2), (2, 3), (3, 1), (1, 0)]);
        let routes = RouteExtractor::new(4).extract(&m).expect("sound");
        assert_eq!(routes, vec![Route::new(0, vec![0, 2, 3, 1, 0])]);
    }

    #[test]
    fn test_depot_only() {
        let routes = RouteExtractor::new(1).extract(&ActivationMatrix::new(1)).expect("sound");
        assert!(routes.is_empty());
    }

    #[test]
    fn test_shape_mismatch() {
        let err = RouteExtractor::new(4).extract(&ActivationMatrix::new(3)).unwrap_err();
        assert_eq!(err, StructuralError::ShapeMismatch { expected: 4, actual: 3 });
    }

    #[test]
    fn test_multiple_successors() {
        let m = matrix(4, &[(0, 1), (1, 2), (1, 3), (2, 0), (3, 0)]);
        let err = RouteExtractor::new(4).extract(&m).unwrap_err();
        assert_eq!(
            err,
            StructuralError::MultipleSuccessors {
                node: 1,
                successors: vec![2, 3]
            }
        );
    }

    #[test]
    fn test_depot_flow_mismatch() {
        let m = matrix(3, &[(0, 1), (0, 2), (1, 0), (2, 1)]);
        let err = RouteExtractor::new(3).extract(&m).unwrap_err();
        assert_eq!(err, StructuralError::DepotFlowMismatch { outgoing: 2, incoming: 1 });
    }

    #[test]
    fn test_dead_end() {
        let m = matrix(4, &[(0, 1), (1, 2), (3, 0)]);
        let err = RouteExtractor::new(4).extract(&m).unwrap_err();
        assert_eq!(err, StructuralError::DeadEnd { route_start: 1, node: 2 });
    }

    #[test]
    fn test_cycle_is_unterminated_not_looping() {
        // 0 -> 1 -> 2 -> 3 -> 2 -> ... ; 4 returns to the depot
        let m = matrix(5, &[(0, 1), (1, 2), (2, 3), (3, 2), (4, 0)]);
        let err = RouteExtractor::new(5).extract(&m).unwrap_err();
        match err {
            StructuralError::Unterminated { route_start, limit, path } => {
                assert_eq!(route_start, 1);
                assert_eq!(limit, 5);
                assert_eq!(path, vec![0, 1, 2, 3, 2, 3]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_disjoint_subtour_is_missing() {
        let m = matrix(5, &[(0, 1), (1, 0), (2, 3), (3, 4), (4, 2)]);
        let err = RouteExtractor::new(5).extract(&m).unwrap_err();
        assert_eq!(err, StructuralError::MissingCustomers { nodes: vec![2, 3, 4] });
    }

    #[test]
    fn test_merging_routes_duplicate_customer() {
        // two walks meet at 2; orphan 4 balances the depot degree
        let m = matrix(5, &[(0, 1), (1, 2), (2, 0), (0, 3), (3, 2), (4, 0)]);
        let err = RouteExtractor::new(5).extract(&m).unwrap_err();
        assert_eq!(err, StructuralError::DuplicateCustomer { node: 2, occurrences: 2 });
    }

    #[test]
    fn test_idempotent() {
        let m = matrix(6, &[(0, 5), (5, 1), (1, 0), (0, 2), (2, 4), (4, 3), (3, 0)]);
        let ex = RouteExtractor::new(6);
        let first = ex.extract(&m).expect("sound");
        let second = ex.extract(&m).expect("sound");
        assert_eq!(first, second);
        assert_eq!(first[0].nodes(), &[0, 2, 4, 3, 0]);
        assert_eq!(first[1].nodes(), &[0, 5, 1, 0]);
    }

    /// Random partition of customers `1..n` into at most `vehicles` routes.
    fn random_routes(rng: &mut StdRng, n: usize, vehicles: usize) -> Vec<Vec<usize>> {
        let mut customers: Vec<usize> = (1..n).collect();
        customers.shuffle(rng);
        let mut routes: Vec<Vec<usize>> = vec![Vec::new(); vehicles];
        for c in customers {
            let r = rng.random_range(0..vehicles);
            routes[r].push(c);
        }
        routes
            .into_iter()
            .filter(|r| !r.is_empty())
            .map(|r| {
                let mut nodes = vec![0];
                nodes.extend(r);
                nodes.push(0);
                nodes
            })
            .collect()
    }

    #[test]
    fn test_seeded_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let n = rng.random_range(1..12);
            let vehicles = rng.random_range(1..5);
            let paths = random_routes(&mut rng, n, vehicles);
            let routes: Vec<Route> = paths.into_iter().map(|p| Route::new(0, p)).collect();
            let m = ActivationMatrix::from_routes(n, &routes);
            let extracted = RouteExtractor::new(n).extract(&m).expect("sound");
            assert_eq!(ActivationMatrix::from_routes(n, &extracted), m);
            assert_eq!(extracted.len(), m.out_degree(0));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn prop_partition_is_recovered(seed in any::<u64>(), n in 1..15usize, vehicles in 1..6usize) {
            let mut rng = StdRng::seed_from_u64(seed);
            let paths = random_routes(&mut rng, n, vehicles);
            let routes: Vec<Route> = paths.iter().cloned().map(|p| Route::new(0, p)).collect();
            let m = ActivationMatrix::from_routes(n, &routes);
            let extracted = RouteExtractor::new(n).extract(&m).expect("sound");

            // Started routes match active depot arcs in both directions.
            prop_assert_eq!(extracted.len(), m.out_degree(0));
            prop_assert_eq!(extracted.len(), m.in_degree(0));

            // Every customer exactly once.
            let mut seen: Vec<usize> = extracted.iter().flat_map(|r| r.customers().to_vec()).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (1..n).collect::<Vec<_>>());

            // Same paths, ordered by first customer.
            let mut expected = paths;
            expected.sort_by_key(|p| p[1]);
            let got: Vec<Vec<usize>> = extracted.iter().map(|r| r.nodes().to_vec()).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
