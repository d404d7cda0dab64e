//! CVRPTW model construction.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{BigM, BigMFamily, BigMPolicy, FleetUsage, ModelConfig};
use crate::error::ConfigError;
use crate::lp::{Cmp, LinExpr, LinearProgram, Sense, VarId, VarKind};
use crate::models::ProblemInstance;

/// A modeling risk detected while building; the model is still emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelWarning {
    /// A fixed big-M is smaller than the slack its family needs, so some
    /// constraints with an inactive arc are binding and valid tours may be
    /// cut off.
    UndersizedBigM {
        /// Affected constraint family.
        family: BigMFamily,
        /// Value in use.
        configured: f64,
        /// Smallest safe value for this instance.
        required: f64,
    },
}

/// The CVRPTW as a mixed-integer linear program, plus the mapping from
/// arcs and nodes to its variables.
///
/// Built once and immutable afterwards; solving produces a separate
/// [`SolverResult`](crate::solver::SolverResult).
///
/// # Examples
///
/// ```
/// use u_cvrptw::distance::Euclidean;
/// use u_cvrptw::model::{CvrptwModel, ModelConfig};
/// use u_cvrptw::models::{Fleet, Node, ProblemInstance};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 1.0, 0.0, 10).with_time_window(0.0, 100.0),
///     Node::customer(2, 0.0, 1.0, 10).with_time_window(0.0, 100.0),
/// ];
/// let inst = ProblemInstance::from_provider(nodes, &Euclidean, 1.0, Fleet::new(2, 20), 0.0).unwrap();
/// let model = CvrptwModel::build(&inst, &ModelConfig::default()).unwrap();
///
/// // 6 arcs, 3 loads, 3 starts
/// assert_eq!(model.program().num_vars(), 12);
/// assert!(model.arc(1, 1).is_none());
/// assert_eq!(model.artifact_name(), "model_num_vehicle2_num_customers2.lp");
/// ```
#[derive(Debug, Clone)]
pub struct CvrptwModel {
    program: LinearProgram,
    num_nodes: usize,
    vehicle_count: usize,
    arcs: Vec<Option<VarId>>,
    loads: Option<Vec<VarId>>,
    starts: Option<Vec<VarId>>,
    config: ModelConfig,
    big_m: BigM,
    warnings: Vec<ModelWarning>,
}

impl CvrptwModel {
    /// Validates the instance and emits variables, constraints and objective.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if neither sub-tour elimination mechanism is
    /// enabled, if the instance is infeasible by construction (no vehicles,
    /// inverted customer window, demand above capacity, ...), if a fixed
    /// big-M is negative or not finite, or if some customer cycle leaves
    /// every enabled propagation family unchanged (zero demands, zero
    /// travel and service), so the model would accept it as a sub-tour.
    pub fn build(instance: &ProblemInstance, config: &ModelConfig) -> Result<Self, ConfigError> {
        if !config.capacity && !config.time_windows {
            return Err(ConfigError::NoSubtourElimination);
        }
        instance.validate()?;
        if let Some(nodes) = flat_cycle(instance, config) {
            warn!(?nodes, "propagation rows cannot exclude this customer cycle");
            return Err(ConfigError::UnbrokenSubtour { nodes });
        }

        let required = BigM::required(instance);
        let big_m = match config.big_m {
            BigMPolicy::Derived => required,
            BigMPolicy::Fixed(m) => {
                m.validate()?;
                m
            }
        };
        debug!(capacity = big_m.capacity, time = big_m.time, "big-M values");
        let warnings = undersized_families(config, &big_m, &required);
        for w in &warnings {
            let ModelWarning::UndersizedBigM {
                family,
                configured,
                required,
            } = w;
            warn!(%family, configured, required, "big-M smaller than the family's slack; valid tours may be cut off");
        }

        let n = instance.num_nodes();
        let mut program = LinearProgram::new("cvrptw");

        let mut arcs = vec![None; n * n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let var = program.add_var(format!("x_{}_{}", i, j), VarKind::Binary, 0.0, 1.0);
                    arcs[i * n + j] = Some(var);
                }
            }
        }

        let capacity = f64::from(instance.fleet().capacity());
        let loads = config.capacity.then(|| {
            instance
                .nodes()
                .iter()
                .map(|node| {
                    program.add_var(
                        format!("load_{}", node.id()),
                        VarKind::Continuous,
                        f64::from(node.demand()),
                        capacity,
                    )
                })
                .collect::<Vec<_>>()
        });

        let starts = config.time_windows.then(|| {
            instance
                .nodes()
                .iter()
                .map(|node| {
                    let (lower, upper) = if node.is_depot() {
                        (0.0, f64::INFINITY)
                    } else {
                        let tw = node.time_window();
                        (tw.earliest(), tw.latest())
                    };
                    program.add_var(format!("start_{}", node.id()), VarKind::Continuous, lower, upper)
                })
                .collect::<Vec<_>>()
        });

        let mut model = Self {
            program,
            num_nodes: n,
            vehicle_count: instance.fleet().vehicle_count(),
            arcs,
            loads,
            starts,
            config: *config,
            big_m,
            warnings,
        };
        model.add_routing_constraints();
        if model.loads.is_some() {
            model.add_load_propagation(instance);
        }
        if model.starts.is_some() {
            model.add_start_propagation(instance);
        }
        model.add_objective(instance);

        info!(
            nodes = n,
            variables = model.program.num_vars(),
            constraints = model.program.num_constraints(),
            "built CVRPTW model"
        );
        Ok(model)
    }

    /// Depot exit bound, depot flow balance, customer in/out degrees.
    fn add_routing_constraints(&mut self) {
        let n = self.num_nodes;
        let leaving = LinExpr::sum((1..n).filter_map(|j| self.arc(0, j)));
        let returning = LinExpr::sum((1..n).filter_map(|j| self.arc(j, 0)));
        let exit_cmp = match self.config.fleet_usage {
            FleetUsage::AtMost => Cmp::Le,
            FleetUsage::Exactly => Cmp::Eq,
        };
        self.program.add_constraint(
            "depot_exit",
            leaving.clone(),
            exit_cmp,
            LinExpr::constant_expr(self.vehicle_count as f64),
        );
        self.program
            .add_constraint("depot_return", returning, Cmp::Eq, leaving);

        for i in 1..n {
            let out = LinExpr::sum((0..n).filter_map(|j| self.arc(i, j)));
            let inc = LinExpr::sum((0..n).filter_map(|j| self.arc(j, i)));
            self.program
                .add_constraint(format!("out_degree_{}", i), out, Cmp::Eq, LinExpr::constant_expr(1.0));
            self.program
                .add_constraint(format!("in_degree_{}", i), inc, Cmp::Eq, LinExpr::constant_expr(1.0));
        }
        debug!(count = 2 * n, "routing constraints");
    }

    /// `load[j] >= load[i] + demand[j]·x[i,j] - M·(1 - x[i,j])` for customer pairs.
    fn add_load_propagation(&mut self, instance: &ProblemInstance) {
        let Some(loads) = self.loads.clone() else {
            return;
        };
        let m = self.big_m.capacity;
        let mut count = 0;
        for i in 1..self.num_nodes {
            for j in 1..self.num_nodes {
                let Some(x) = self.arc(i, j) else {
                    continue;
                };
                let demand = f64::from(instance.nodes()[j].demand());
                let mut rhs = LinExpr::from(loads[i]);
                rhs.add_term(x, demand + m).add_constant(-m);
                self.program
                    .add_constraint(format!("load_{}_{}", i, j), LinExpr::from(loads[j]), Cmp::Ge, rhs);
                count += 1;
            }
        }
        debug!(count, "load propagation constraints");
    }

    /// `start[j] >= start[i] + travel[i,j] + service[i] - M·(1 - x[i,j])` for
    /// customer pairs, and the depot pinned to the day start.
    fn add_start_propagation(&mut self, instance: &ProblemInstance) {
        let Some(starts) = self.starts.clone() else {
            return;
        };
        let m = self.big_m.time;
        let mut count = 0;
        for i in 1..self.num_nodes {
            let service = instance.nodes()[i].service_duration();
            for j in 1..self.num_nodes {
                let Some(x) = self.arc(i, j) else {
                    continue;
                };
                let mut rhs = LinExpr::from(starts[i]);
                rhs.add_term(x, m)
                    .add_constant(instance.travel_time(i, j) + service - m);
                self.program
                    .add_constraint(format!("time_{}_{}", i, j), LinExpr::from(starts[j]), Cmp::Ge, rhs);
                count += 1;
            }
        }
        self.program.add_constraint(
            "day_start",
            LinExpr::from(starts[0]),
            Cmp::Eq,
            LinExpr::constant_expr(instance.day_start()),
        );
        debug!(count, "start propagation constraints");
    }

    fn add_objective(&mut self, instance: &ProblemInstance) {
        let mut objective = LinExpr::new();
        for i in 0..self.num_nodes {
            for j in 0..self.num_nodes {
                if let Some(x) = self.arc(i, j) {
                    objective.add_term(x, instance.distance(i, j));
                }
            }
        }
        self.program.set_objective(objective, Sense::Minimize);
    }

    /// The underlying linear program.
    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    /// Node count including the depot.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of customers.
    pub fn num_customers(&self) -> usize {
        self.num_nodes - 1
    }

    /// Fleet size the depot exit bound was built with.
    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    /// Arc variable `x[i,j]`; `None` for self-arcs and out-of-range ids.
    pub fn arc(&self, i: usize, j: usize) -> Option<VarId> {
        if i >= self.num_nodes || j >= self.num_nodes {
            return None;
        }
        self.arcs[i * self.num_nodes + j]
    }

    /// `load[i]`, if load propagation is enabled.
    pub fn load(&self, i: usize) -> Option<VarId> {
        self.loads.as_ref().and_then(|l| l.get(i).copied())
    }

    /// `start[i]`, if start propagation is enabled.
    pub fn start(&self, i: usize) -> Option<VarId> {
        self.starts.as_ref().and_then(|s| s.get(i).copied())
    }

    /// Options the model was built with.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Big-M values in use.
    pub fn big_m(&self) -> BigM {
        self.big_m
    }

    /// Modeling risks found while building.
    pub fn warnings(&self) -> &[ModelWarning] {
        &self.warnings
    }

    /// File name for the persisted model artifact.
    pub fn artifact_name(&self) -> String {
        format!(
            "model_num_vehicle{}_num_customers{}.lp",
            self.vehicle_count,
            self.num_customers()
        )
    }

    /// Writes the model artifact into `dir` and returns its path.
    pub fn write_artifact(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = dir.as_ref().join(self.artifact_name());
        self.program.write_lp_file(&path)?;
        info!(path = %path.display(), "model artifact written");
        Ok(path)
    }
}

/// Finds a customer cycle on which every enabled propagation row is
/// satisfied by constant values: each arc adds zero demand (capacity) and
/// zero travel plus service (time).
fn flat_cycle(instance: &ProblemInstance, config: &ModelConfig) -> Option<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unseen,
        OnPath,
        Done,
    }

    let n = instance.num_nodes();
    let nodes = instance.nodes();
    let flat = |i: usize, j: usize| {
        let load_flat = !config.capacity || nodes[j].demand() == 0;
        let time_flat = !config.time_windows
            || instance.travel_time(i, j) + nodes[i].service_duration() <= 0.0;
        i != j && load_flat && time_flat
    };

    let mut mark = vec![Mark::Unseen; n];
    for root in 1..n {
        if mark[root] != Mark::Unseen {
            continue;
        }
        mark[root] = Mark::OnPath;
        // (node, next candidate successor)
        let mut path = vec![(root, 1)];
        while let Some(&(node, next)) = path.last() {
            if next >= n {
                mark[node] = Mark::Done;
                path.pop();
                continue;
            }
            if let Some(top) = path.last_mut() {
                top.1 += 1;
            }
            if !flat(node, next) {
                continue;
            }
            match mark[next] {
                Mark::Unseen => {
                    mark[next] = Mark::OnPath;
                    path.push((next, 1));
                }
                Mark::OnPath => {
                    let from = path.iter().position(|&(v, _)| v == next).unwrap_or(0);
                    return Some(path[from..].iter().map(|&(v, _)| v).collect());
                }
                Mark::Done => {}
            }
        }
    }
    None
}

fn undersized_families(config: &ModelConfig, used: &BigM, required: &BigM) -> Vec<ModelWarning> {
    let enabled = [
        (BigMFamily::Capacity, config.capacity),
        (BigMFamily::Time, config.time_windows),
    ];
    enabled
        .into_iter()
        .filter(|&(family, on)| on && used.get(family) < required.get(family))
        .map(|(family, _)| ModelWarning::UndersizedBigM {
            family,
            configured: used.get(family),
            required: required.get(family),
        })
        .collect()
}
