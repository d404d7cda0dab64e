//! Node and time window types.

use serde::{Deserialize, Serialize};

/// Bounds on the time at which service may begin at a node.
///
/// Unlike a validated window, a `TimeWindow` can be constructed inverted;
/// instance validation rejects that before a model is built. An open
/// window serializes its `latest` bound as `null`.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0);
/// assert!(tw.is_well_formed());
/// assert!(tw.contains(150.0));
/// assert!(!tw.contains(250.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest: f64,
    #[serde(with = "crate::lp::bound::upper", default = "crate::lp::bound::upper::unbounded")]
    latest: f64,
}

impl TimeWindow {
    /// Creates a window `[earliest, latest]`.
    pub fn new(earliest: f64, latest: f64) -> Self {
        Self { earliest, latest }
    }

    /// A window opening at `earliest` with no upper bound.
    pub fn open_from(earliest: f64) -> Self {
        Self::new(earliest, f64::INFINITY)
    }

    /// Earliest allowable service start.
    pub fn earliest(&self) -> f64 {
        self.earliest
    }

    /// Latest allowable service start.
    pub fn latest(&self) -> f64 {
        self.latest
    }

    /// Returns `true` if `earliest <= latest` and neither bound is NaN.
    pub fn is_well_formed(&self) -> bool {
        !self.earliest.is_nan() && !self.latest.is_nan() && self.earliest <= self.latest
    }

    /// Returns `true` if service may start at `time`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.earliest && time <= self.latest
    }
}

/// A depot or customer location.
///
/// Node 0 is the depot; customers are numbered `1..n`. The coordinate is only
/// used for distance lookup.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::Node;
///
/// let depot = Node::depot(0.0, 0.0);
/// assert_eq!(depot.id(), 0);
/// assert_eq!(depot.demand(), 0);
///
/// let c = Node::customer(1, 3.0, 4.0, 10)
///     .with_time_window(60.0, 120.0)
///     .with_service_duration(15.0);
/// assert_eq!(c.demand(), 10);
/// assert_eq!(c.time_window().latest(), 120.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: usize,
    x: f64,
    y: f64,
    demand: i32,
    service_duration: f64,
    time_window: TimeWindow,
}

impl Node {
    /// Creates the depot (id 0, zero demand, no service) with an open window.
    ///
    /// Vehicles leave at [`ProblemInstance::day_start`](super::ProblemInstance::day_start);
    /// a depot window, if narrowed, must contain it.
    pub fn depot(x: f64, y: f64) -> Self {
        Self {
            id: 0,
            x,
            y,
            demand: 0,
            service_duration: 0.0,
            time_window: TimeWindow::open_from(0.0),
        }
    }

    /// Creates a customer with an unrestricted time window and no service time.
    pub fn customer(id: usize, x: f64, y: f64, demand: i32) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            service_duration: 0.0,
            time_window: TimeWindow::open_from(0.0),
        }
    }

    /// Sets the service start window.
    pub fn with_time_window(mut self, earliest: f64, latest: f64) -> Self {
        self.time_window = TimeWindow::new(earliest, latest);
        self
    }

    /// Sets the service duration.
    pub fn with_service_duration(mut self, duration: f64) -> Self {
        self.service_duration = duration;
        self
    }

    /// Node id (0 = depot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns `true` for the depot.
    pub fn is_depot(&self) -> bool {
        self.id == 0
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Demand served at this node.
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Time spent servicing this node.
    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    /// Service start window.
    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }
}
