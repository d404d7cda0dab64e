//! Independent re-checking of extracted routes.

mod audit;

pub use audit::{RouteAuditor, RouteMetrics, Violation, ViolationType, AUDIT_TOLERANCE};
