//! Per-run constraint derivation.
//!
//! Some precedence constraints depend on task attributes that are only
//! known once the catalog is loaded (attachments of late parts, rework and
//! inspections), so the effective constraint set is rebuilt for every run.

use tracing::debug;

use crate::error::PlanResult;
use crate::models::{ConstraintOrigin, Precedence, TaskCatalog, TaskType};

use super::ConstraintGraph;

/// Derives the effective constraint set for `catalog` and indexes it.
///
/// # Rules
/// 1. Every catalog precedence row.
/// 2. A late part finishes before the task it is attached to.
/// 3. Rework finishes before the task it is attached to.
/// 4. An inspection follows the task it inspects, and that task's catalog
///    successors wait for the inspection with the same relationship.
///
/// The result depends only on the catalog.
///
/// # Errors
/// `CyclicDependency` if the derived graph contains a cycle.
pub fn build_constraints(catalog: &TaskCatalog) -> PlanResult<ConstraintGraph> {
    let mut constraints: Vec<Precedence> = catalog.precedences().to_vec();

    for task in catalog.tasks() {
        let Some(primary) = task.attached_to.as_deref() else {
            continue;
        };
        match task.task_type {
            TaskType::LatePart => constraints.push(
                Precedence::finish_to_start(&task.task_id, primary)
                    .with_origin(ConstraintOrigin::LatePart),
            ),
            TaskType::Rework => constraints.push(
                Precedence::finish_to_start(&task.task_id, primary)
                    .with_origin(ConstraintOrigin::Rework),
            ),
            TaskType::QualityInspection => {
                constraints.push(
                    Precedence::finish_to_start(primary, &task.task_id)
                        .with_origin(ConstraintOrigin::QualityGate),
                );
                for row in catalog
                    .precedences()
                    .iter()
                    .filter(|row| row.predecessor == primary && row.successor != task.task_id)
                {
                    constraints.push(
                        Precedence::new(&task.task_id, &row.successor, row.relationship)
                            .with_origin(ConstraintOrigin::QualityGate),
                    );
                }
            }
            TaskType::Production => {}
        }
    }

    let derived = constraints.len() - catalog.precedences().len();
    let graph = ConstraintGraph::from_constraints(catalog, constraints)?;
    debug!(
        tasks = catalog.len(),
        catalog_rows = catalog.precedences().len(),
        derived,
        effective = graph.edge_count(),
        "constraint graph built"
    );
    Ok(graph)
}
