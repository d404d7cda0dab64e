//! The solve pipeline: build, solve, extract, audit, report.

use tracing::{info, instrument, warn};

use crate::config::ScenarioConfig;
use crate::distance::DistanceProvider;
use crate::error::{CvrptwError, SolveError};
use crate::evaluation::RouteAuditor;
use crate::extraction::{ActivationMatrix, RouteExtractor};
use crate::model::{CvrptwModel, ModelConfig};
use crate::models::{Node, ProblemInstance};
use crate::report::{SolutionReport, SolutionStatus};
use crate::solver::{SolveOptions, SolverAdapter, SolverResult};

/// Solves one CVRPTW instance with the given backend.
///
/// The instance is validated before the solver is called. `Infeasible`,
/// `Unbounded` and `TimedOut` statuses are returned as [`SolveError`]s; a
/// timed-out incumbent is reported only if `options.accept_incumbent` is
/// set.
///
/// # Examples
///
/// ```
/// use u_cvrptw::distance::Euclidean;
/// use u_cvrptw::model::ModelConfig;
/// use u_cvrptw::models::{Fleet, Node, ProblemInstance};
/// use u_cvrptw::solver::{EnumerationSolver, SolveOptions};
/// use u_cvrptw::solve_cvrptw;
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 1.0, 0.0, 10),
///     Node::customer(2, 2.0, 0.0, 10),
/// ];
/// let inst = ProblemInstance::from_provider(nodes, &Euclidean, 1.0, Fleet::new(2, 20), 0.0).unwrap();
/// let report = solve_cvrptw(&inst, &ModelConfig::default(), &EnumerationSolver::default(), &SolveOptions::default()).unwrap();
/// assert_eq!(report.routes().len(), 1);
/// assert!((report.objective() - 4.0).abs() < 1e-9);
/// ```
///
/// # Errors
///
/// - [`CvrptwError::Config`] for an invalid instance or configuration
/// - [`CvrptwError::Solve`] for terminal statuses and backend failures
/// - [`CvrptwError::Structural`] if the solution does not decompose into
///   depot routes
#[instrument(skip_all, fields(nodes = instance.num_nodes(), vehicles = instance.fleet().vehicle_count()))]
pub fn solve_cvrptw<S: SolverAdapter>(
    instance: &ProblemInstance,
    config: &ModelConfig,
    solver: &S,
    options: &SolveOptions,
) -> Result<SolutionReport, CvrptwError> {
    let model = CvrptwModel::build(instance, config)?;

    let result = solver.solve(model.program(), options).map_err(SolveError::from)?;
    info!(status = result.status(), "solver finished");

    let (objective, assignment, status) = match result {
        SolverResult::Optimal {
            objective,
            assignment,
        } => (objective, assignment, SolutionStatus::Optimal),
        SolverResult::Infeasible => return Err(SolveError::Infeasible.into()),
        SolverResult::Unbounded => return Err(SolveError::Unbounded.into()),
        SolverResult::TimedOut {
            incumbent: Some(incumbent),
        } if options.accept_incumbent => {
            warn!(objective = incumbent.objective, "accepting non-optimal incumbent");
            (incumbent.objective, incumbent.assignment, SolutionStatus::Incumbent)
        }
        SolverResult::TimedOut { incumbent } => {
            return Err(SolveError::TimedOut {
                incumbent_objective: incumbent.map(|i| i.objective),
            }
            .into())
        }
    };

    let active = ActivationMatrix::from_assignment(&model, &assignment).map_err(SolveError::from)?;
    let routes = RouteExtractor::new(model.num_nodes()).extract(&active)?;

    let starts: Option<Vec<f64>> = (0..model.num_nodes())
        .map(|i| model.start(i).map(|v| assignment.value(v)))
        .collect();
    let (metrics, violations) = RouteAuditor::new(instance, model.config()).audit(&routes, starts.as_deref());
    for v in &violations {
        warn!(violation = ?v.kind, "route audit violation");
    }

    Ok(SolutionReport::new(&model, &assignment, objective, status, routes, &active).with_route_metrics(metrics))
}

/// Builds the instance described by `scenario` over `nodes` and solves it.
pub fn solve_scenario<S: SolverAdapter>(
    scenario: &ScenarioConfig,
    nodes: Vec<Node>,
    provider: &impl DistanceProvider,
    solver: &S,
) -> Result<SolutionReport, CvrptwError> {
    let instance = scenario.instance(nodes, provider)?;
    let options = scenario.solve_options()?;
    solve_cvrptw(&instance, &scenario.model_config(), solver, &options)
}
