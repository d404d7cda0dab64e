//! Dense distance matrix.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::models::Node;

/// A dense n×n distance (or travel-time) matrix stored in row-major order.
///
/// Diagonal entries are carried but never read by the model: self-arcs are
/// excluded by index. Deserialization rejects data whose length is not
/// `size * size`.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::Node;
/// use u_cvrptw::distance::DistanceMatrix;
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 3.0, 4.0, 10),
///     Node::customer(2, 6.0, 8.0, 20),
/// ];
/// let dm = DistanceMatrix::from_nodes(&nodes);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl<'de> Deserialize<'de> for DistanceMatrix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            data: Vec<f64>,
            size: usize,
        }

        let Raw { data, size } = Raw::deserialize(deserializer)?;
        let actual = data.len();
        Self::from_data(size, data).ok_or_else(|| {
            serde::de::Error::custom(ConfigError::MatrixDataLength { size, actual })
        })
    }
}

impl DistanceMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a Euclidean distance matrix from node coordinates.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let n = nodes.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = nodes[i].x() - nodes[j].x();
                let dy = nodes[i].y() - nodes[j].y();
                let d = (dx * dx + dy * dy).sqrt();
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Creates a matrix from an explicit row-major n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if size.checked_mul(size) != Some(data.len()) {
            return None;
        }
        Some(Self { data, size })
    }

    /// Creates a matrix from nested rows.
    ///
    /// Returns `None` if the rows do not form a square grid.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            data: rows.iter().flatten().copied().collect(),
            size,
        })
    }

    /// Returns a copy with every entry multiplied by `factor`.
    ///
    /// Used to derive travel times from distances.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            data: self.data.iter().map(|d| d * factor).collect(),
            size: self.size,
        }
    }

    /// Returns the entry for travelling from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the entry for travelling from `from` to `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Largest off-diagonal entry, or `0.0` for matrices smaller than 2×2.
    pub fn max_off_diagonal(&self) -> f64 {
        let mut max = 0.0_f64;
        for i in 0..self.size {
            for j in 0..self.size {
                if i != j {
                    max = max.max(self.get(i, j));
                }
            }
        }
        max
    }

    /// Checks that every off-diagonal entry is finite and non-negative.
    pub(crate) fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        for i in 0..self.size {
            for j in 0..self.size {
                let value = self.get(i, j);
                if i != j && !(value.is_finite() && value >= 0.0) {
                    return Err(ConfigError::InvalidMatrixEntry {
                        matrix: name,
                        from: i,
                        to: j,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 3.0, 4.0, 10),
            Node::customer(2, 0.0, 8.0, 20),
        ]
    }

    #[test]
    fn test_from_nodes() {
        let dm = DistanceMatrix::from_nodes(&sample_nodes());
        assert_eq!(dm.size(), 3);
        assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
        assert!((dm.get(0, 2) - 8.0).abs() < 1e-10);
        assert!((dm.get(0, 0)).abs() < 1e-10);
        assert!(dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(DistanceMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_none());
        let dm = DistanceMatrix::from_data(2, vec![0.0, 5.0, 5.0, 0.0]).expect("valid");
        assert_eq!(dm.get(1, 0), 5.0);
    }

    #[test]
    fn test_from_rows() {
        let dm = DistanceMatrix::from_rows(&[vec![0.0, 2.0], vec![3.0, 0.0]]).expect("square");
        assert_eq!(dm.get(0, 1), 2.0);
        assert_eq!(dm.get(1, 0), 3.0);
        assert!(!dm.is_symmetric(1e-10));
        assert!(DistanceMatrix::from_rows(&[vec![0.0, 2.0], vec![3.0]]).is_none());
    }

    #[test]
    fn test_scaled() {
        let dm = DistanceMatrix::from_nodes(&sample_nodes()).scaled(2.0);
        assert!((dm.get(0, 1) - 10.0).abs() < 1e-10);
        assert!((dm.max_off_diagonal() - 16.0).abs() < 1e-10);
    }

    #[test]
    fn test_deserialize_checks_length() {
        let dm: DistanceMatrix = serde_json::from_str(r#"{"data":[0.0,5.0,5.0,0.0],"size":2}"#).expect("square");
        assert_eq!(dm.get(0, 1), 5.0);
        let err = serde_json::from_str::<DistanceMatrix>(r#"{"data":[0.0,5.0],"size":2}"#).unwrap_err();
        assert!(err.to_string().contains("carries 2 entries"));
    }

    #[test]
    fn test_validate_ignores_diagonal() {
        let mut dm = DistanceMatrix::new(2);
        dm.set(0, 0, f64::NAN);
        assert!(dm.validate("distance").is_ok());
        dm.set(0, 1, -1.0);
        assert!(matches!(
            dm.validate("distance"),
            Err(ConfigError::InvalidMatrixEntry { from: 0, to: 1, .. })
        ));
    }
}
