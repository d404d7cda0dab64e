//! Extracted vehicle routes.

use serde::{Deserialize, Serialize};

/// An ordered sequence of node ids travelled by one vehicle.
///
/// A well-formed route begins and ends at the depot (id 0). Routes are only
/// produced by route extraction and are never mutated afterwards.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::Route;
///
/// let route = Route::new(0, vec![0, 3, 1, 0]);
/// assert_eq!(route.customers(), &[3, 1]);
/// assert_eq!(route.len(), 2);
/// assert!(route.is_anchored());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    vehicle: usize,
    nodes: Vec<usize>,
}

impl Route {
    /// Creates a route for the given vehicle from its full node sequence.
    pub fn new(vehicle: usize, nodes: Vec<usize>) -> Self {
        Self { vehicle, nodes }
    }

    /// Index of the vehicle driving this route.
    pub fn vehicle(&self) -> usize {
        self.vehicle
    }

    /// Full node sequence, depot endpoints included.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Customers in visit order, depot endpoints excluded.
    pub fn customers(&self) -> &[usize] {
        if self.nodes.len() < 2 {
            return &[];
        }
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// Number of customer visits.
    pub fn len(&self) -> usize {
        self.customers().len()
    }

    /// Returns `true` if the route visits no customer.
    pub fn is_empty(&self) -> bool {
        self.customers().is_empty()
    }

    /// Returns `true` if the route starts and ends at the depot.
    pub fn is_anchored(&self) -> bool {
        self.nodes.len() >= 2 && self.nodes.first() == Some(&0) && self.nodes.last() == Some(&0)
    }

    /// Consecutive `(from, to)` arcs travelled by this route.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes.windows(2).map(|w| (w[0], w[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_customers() {
        let r = Route::new(1, vec![0, 5, 3, 0]);
        assert_eq!(r.vehicle(), 1);
        assert_eq!(r.customers(), &[5, 3]);
        assert_eq!(r.len(), 2);
        assert!(!r.is_empty());
    }

    #[test]
    fn test_route_arcs() {
        let r = Route::new(0, vec![0, 2, 1, 0]);
        let arcs: Vec<_> = r.arcs().collect();
        assert_eq!(arcs, vec![(0, 2), (2, 1), (1, 0)]);
    }

    #[test]
    fn test_route_anchoring() {
        assert!(Route::new(0, vec![0, 1, 0]).is_anchored());
        assert!(!Route::new(0, vec![0, 1, 2]).is_anchored());
        assert!(!Route::new(0, vec![0]).is_anchored());
    }

    #[test]
    fn test_degenerate_route_has_no_customers() {
        assert!(Route::new(0, vec![0]).is_empty());
        assert!(Route::new(0, vec![]).customers().is_empty());
    }
}
