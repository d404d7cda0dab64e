//! Big-M sizing for the conditional propagation constraints.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;
use crate::models::ProblemInstance;

/// The two constraint families that use a big-M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BigMFamily {
    /// `load[j] >= load[i] + demand[j]·x[i,j] - M·(1 - x[i,j])`
    Capacity,
    /// `start[j] >= start[i] + travel[i,j] + service[i] - M·(1 - x[i,j])`
    Time,
}

impl fmt::Display for BigMFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BigMFamily::Capacity => write!(f, "capacity"),
            BigMFamily::Time => write!(f, "time"),
        }
    }
}

/// Big-M constants, one per constraint family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BigM {
    /// Slack of the load propagation family.
    pub capacity: f64,
    /// Slack of the service-start propagation family.
    pub time: f64,
}

impl BigM {
    /// Smallest values that keep every propagation constraint vacuous when
    /// its arc is inactive.
    ///
    /// - capacity: `capacity - min customer demand`, the largest
    ///   `load[i] - load[j]` can be.
    /// - time: the largest `latest[i] + service[i] + travel[i,j] - earliest[j]`
    ///   over customer pairs. Open windows are capped at the latest start an
    ///   earliest-start schedule can reach.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_cvrptw::distance::Euclidean;
    /// use u_cvrptw::model::BigM;
    /// use u_cvrptw::models::{Fleet, Node, ProblemInstance};
    ///
    /// let nodes = vec![
    ///     Node::depot(0.0, 0.0),
    ///     Node::customer(1, 3.0, 0.0, 4).with_time_window(0.0, 10.0),
    ///     Node::customer(2, 3.0, 4.0, 6).with_time_window(5.0, 12.0),
    /// ];
    /// let inst = ProblemInstance::from_provider(nodes, &Euclidean, 1.0, Fleet::new(1, 10), 0.0).unwrap();
    /// let m = BigM::required(&inst);
    /// assert_eq!(m.capacity, 6.0);
    /// // latest[2] + travel(2, 1) - earliest[1] = 12 + 4 - 0
    /// assert_eq!(m.time, 16.0);
    /// ```
    pub fn required(instance: &ProblemInstance) -> Self {
        let customers = instance.customers();
        let capacity = f64::from(instance.fleet().capacity());
        let min_demand = customers
            .iter()
            .map(|c| f64::from(c.demand()))
            .fold(capacity, f64::min);

        let horizon = schedule_horizon(instance);
        let mut time = 0.0_f64;
        for a in customers {
            let latest = a.time_window().latest().min(horizon);
            for b in customers {
                if a.id() == b.id() {
                    continue;
                }
                let slack = latest + a.service_duration() + instance.travel_time(a.id(), b.id())
                    - b.time_window().earliest();
                time = time.max(slack);
            }
        }

        Self {
            capacity: (capacity - min_demand).max(0.0),
            time,
        }
    }

    /// Value for one family.
    pub fn get(&self, family: BigMFamily) -> f64 {
        match family {
            BigMFamily::Capacity => self.capacity,
            BigMFamily::Time => self.time,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (family, value) in [("capacity", self.capacity), ("time", self.time)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidBigM { family, value });
            }
        }
        Ok(())
    }
}

/// Latest service start an earliest-start schedule can reach: every route
/// can be served by starting each customer as soon as it is allowed.
fn schedule_horizon(instance: &ProblemInstance) -> f64 {
    let customers = instance.customers();
    let max_earliest = customers
        .iter()
        .map(|c| c.time_window().earliest())
        .fold(instance.day_start(), f64::max);
    let max_service = customers
        .iter()
        .map(|c| c.service_duration())
        .fold(0.0, f64::max);
    let max_travel = instance.travel_times().max_off_diagonal();
    max_earliest + customers.len() as f64 * (max_service + max_travel)
}
