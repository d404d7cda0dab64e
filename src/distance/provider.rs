//! Pluggable distance metrics.

use super::DistanceMatrix;
use crate::models::Node;

/// Computes the distance matrix for a list of nodes.
///
/// The metric (Euclidean, geodesic, road network, ...) is a choice of the
/// caller; the model only consumes the resulting matrix.
pub trait DistanceProvider {
    /// Returns an n×n matrix where entry `(i, j)` is the distance from
    /// `nodes[i]` to `nodes[j]`.
    fn distances(&self, nodes: &[Node]) -> DistanceMatrix;
}

/// Straight-line distance between node coordinates.
///
/// # Examples
///
/// ```
/// use u_cvrptw::distance::{DistanceProvider, Euclidean};
/// use u_cvrptw::models::Node;
///
/// let nodes = vec![Node::depot(0.0, 0.0), Node::customer(1, 3.0, 4.0, 1)];
/// let dm = Euclidean.distances(&nodes);
/// assert!((dm.get(1, 0) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl DistanceProvider for Euclidean {
    fn distances(&self, nodes: &[Node]) -> DistanceMatrix {
        DistanceMatrix::from_nodes(nodes)
    }
}

impl<F> DistanceProvider for F
where
    F: Fn(&Node, &Node) -> f64,
{
    fn distances(&self, nodes: &[Node]) -> DistanceMatrix {
        let n = nodes.len();
        let mut dm = DistanceMatrix::new(n);
        for (i, a) in nodes.iter().enumerate() {
            for (j, b) in nodes.iter().enumerate() {
                if i != j {
                    dm.set(i, j, self(a, b));
                }
            }
        }
        dm
    }
}
