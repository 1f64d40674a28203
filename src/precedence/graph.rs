//! Adjacency index over the effective constraint set.
//!
//! Built once per run and shared by the critical-path passes, the
//! allocator and report formatting.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{PlanError, PlanResult};
use crate::models::{ConstraintOrigin, Precedence, Relationship, TaskCatalog};
use crate::validation::{ValidationError, ValidationErrorKind};

/// One side of a constraint, seen from the other task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Catalog index of the task at the other end.
    pub task: usize,
    pub relationship: Relationship,
    pub origin: ConstraintOrigin,
}

/// Acyclic precedence graph over catalog indices.
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    constraints: Vec<Precedence>,
    predecessors: Vec<Vec<Edge>>,
    successors: Vec<Vec<Edge>>,
    topo_order: Vec<usize>,
}

impl ConstraintGraph {
    /// Indexes `constraints` against `catalog`.
    ///
    /// Constraints are sorted and de-duplicated on
    /// `(predecessor, successor, relationship)`; the lowest origin wins.
    ///
    /// # Errors
    /// - `DataValidation` if a constraint names an unknown task.
    /// - `CyclicDependency` if the graph has a cycle.
    pub fn from_constraints(
        catalog: &TaskCatalog,
        mut constraints: Vec<Precedence>,
    ) -> PlanResult<Self> {
        constraints.sort_by(|a, b| {
            (&a.predecessor, &a.successor, a.relationship, a.origin).cmp(&(
                &b.predecessor,
                &b.successor,
                b.relationship,
                b.origin,
            ))
        });
        constraints.dedup_by(|b, a| {
            a.predecessor == b.predecessor
                && a.successor == b.successor
                && a.relationship == b.relationship
        });

        let n = catalog.len();
        let mut predecessors = vec![Vec::new(); n];
        let mut successors = vec![Vec::new(); n];
        let mut unknown = Vec::new();

        for c in &constraints {
            match (catalog.index_of(&c.predecessor), catalog.index_of(&c.successor)) {
                (Some(p), Some(s)) => {
                    successors[p].push(Edge {
                        task: s,
                        relationship: c.relationship,
                        origin: c.origin,
                    });
                    predecessors[s].push(Edge {
                        task: p,
                        relationship: c.relationship,
                        origin: c.origin,
                    });
                }
                _ => unknown.push(ValidationError::new(
                    ValidationErrorKind::UnknownTaskReference,
                    format!(
                        "Constraint {} -> {} references an unknown task",
                        c.predecessor, c.successor
                    ),
                )),
            }
        }
        if !unknown.is_empty() {
            return Err(PlanError::DataValidation(unknown));
        }

        let topo_order = match topological_order(&predecessors, &successors) {
            Ok(order) => order,
            Err(remaining) => {
                let mut cycle: Vec<String> = find_cycle(&successors, &remaining)
                    .into_iter()
                    .map(|i| catalog.tasks()[i].task_id.clone())
                    .collect();
                cycle.sort();
                cycle.dedup();
                return Err(PlanError::CyclicDependency { tasks: cycle });
            }
        };

        Ok(Self {
            constraints,
            predecessors,
            successors,
            topo_order,
        })
    }

    /// Effective constraints, sorted.
    pub fn constraints(&self) -> &[Precedence] {
        &self.constraints
    }

    /// Incoming edges of a task.
    pub fn predecessors(&self, task: usize) -> &[Edge] {
        &self.predecessors[task]
    }

    /// Outgoing edges of a task.
    pub fn successors(&self, task: usize) -> &[Edge] {
        &self.successors[task]
    }

    /// Tasks in topological order; ties broken by catalog index.
    pub fn topological_order(&self) -> &[usize] {
        &self.topo_order
    }

    /// Number of task nodes.
    pub fn node_count(&self) -> usize {
        self.predecessors.len()
    }

    /// Number of effective constraints.
    pub fn edge_count(&self) -> usize {
        self.constraints.len()
    }
}

/// Kahn's algorithm. On failure returns the nodes left with incoming edges.
fn topological_order(
    predecessors: &[Vec<Edge>],
    successors: &[Vec<Edge>],
) -> Result<Vec<usize>, Vec<usize>> {
    let n = predecessors.len();
    let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| in_degree[i] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(n);

    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        for edge in &successors[node] {
            in_degree[edge.task] -= 1;
            if in_degree[edge.task] == 0 {
                ready.push(Reverse(edge.task));
            }
        }
    }

    if order.len() == n {
        Ok(order)
    } else {
        Err((0..n).filter(|&i| in_degree[i] > 0).collect())
    }
}

/// Extracts one concrete cycle among `candidates` using DFS.
///
/// Falls back to all candidates if no back edge is found.
fn find_cycle(successors: &[Vec<Edge>], candidates: &[usize]) -> Vec<usize> {
    let n = successors.len();
    let mut visited = vec![false; n];
    let mut in_stack = vec![false; n];
    let mut path = Vec::new();

    for &start in candidates {
        if !visited[start] {
            if let Some(cycle) =
                cycle_dfs(start, successors, &mut visited, &mut in_stack, &mut path)
            {
                return cycle;
            }
        }
    }
    candidates.to_vec()
}

fn cycle_dfs(
    node: usize,
    successors: &[Vec<Edge>],
    visited: &mut [bool],
    in_stack: &mut [bool],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    visited[node] = true;
    in_stack[node] = true;
    path.push(node);

    for edge in &successors[node] {
        let next = edge.task;
        if in_stack[next] {
            // Back edge: the cycle is the path suffix starting at `next`.
            let pos = path.iter().position(|&p| p == next).unwrap_or(0);
            return Some(path[pos..].to_vec());
        }
        if !visited[next] {
            if let Some(cycle) = cycle_dfs(next, successors, visited, in_stack, path) {
                return Some(cycle);
            }
        }
    }

    in_stack[node] = false;
    path.pop();
    None
}
