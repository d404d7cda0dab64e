//! Homogeneous fleet description.

use serde::{Deserialize, Serialize};

/// A fleet of identical vehicles based at the depot.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::Fleet;
///
/// let fleet = Fleet::new(3, 200);
/// assert_eq!(fleet.vehicle_count(), 3);
/// assert_eq!(fleet.capacity(), 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    vehicle_count: usize,
    capacity: i32,
}

impl Fleet {
    /// Creates a fleet; validation happens when the instance is built.
    pub fn new(vehicle_count: usize, capacity: i32) -> Self {
        Self {
            vehicle_count,
            capacity,
        }
    }

    /// Upper bound on the number of vehicles leaving the depot.
    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    /// Load capacity of every vehicle.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_new() {
        let f = Fleet::new(2, 20);
        assert_eq!(f.vehicle_count(), 2);
        assert_eq!(f.capacity(), 20);
    }
}
