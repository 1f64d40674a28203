//! Priority list generation.
//!
//! The priority list is a total order over the catalog: least slack first,
//! then earliest start, then task ID. It is both the reported ordering of a
//! run and the injection order of the time allocator.

use crate::critical_path::CriticalPathMetrics;
use crate::models::TaskCatalog;

use super::{rules, RuleEngine, SchedulingContext, TieBreaker};

/// Builds a [`PriorityOrder`] from one run's critical-path metrics.
#[derive(Debug, Clone)]
pub struct PriorityListGenerator {
    engine: RuleEngine,
}

impl PriorityListGenerator {
    /// Least slack, then earliest start, then task ID.
    pub fn critical_path() -> Self {
        Self {
            engine: RuleEngine::new()
                .with_rule(rules::LeastSlack)
                .with_rule(rules::EarliestStart)
                .with_final_tie_breaker(TieBreaker::ById),
        }
    }

    /// Uses a custom rule engine.
    ///
    /// Engines should end in [`TieBreaker::ById`] to keep the order total.
    pub fn with_engine(engine: RuleEngine) -> Self {
        Self { engine }
    }

    /// Orders every task of `catalog`.
    pub fn generate(&self, catalog: &TaskCatalog, metrics: &CriticalPathMetrics) -> PriorityOrder {
        let context = SchedulingContext::from_analysis(catalog, metrics);
        PriorityOrder::new(self.engine.sort_indices(catalog.tasks(), &context))
    }
}

impl Default for PriorityListGenerator {
    fn default() -> Self {
        Self::critical_path()
    }
}

/// A computed priority list over catalog indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOrder {
    order: Vec<usize>,
    rank: Vec<usize>,
}

impl PriorityOrder {
    fn new(order: Vec<usize>) -> Self {
        let mut rank = vec![0; order.len()];
        for (position, &task) in order.iter().enumerate() {
            rank[task] = position;
        }
        Self { order, rank }
    }

    /// Walks the list from the top. Every call starts over.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    /// Zero-based position of a catalog index in the list.
    pub fn rank(&self, task: usize) -> usize {
        self.rank[task]
    }

    /// The list as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical_path::CriticalPathAnalyzer;
    use crate::models::{PlantSettings, Precedence, Task};
    use crate::precedence::build_constraints;
    use chrono::NaiveDate;

    fn catalog() -> TaskCatalog {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        // Critical chain A → B; C and D float, D starts later than C.
        TaskCatalog::new(PlantSettings::new(start))
            .with_task(Task::new("D").with_duration(10))
            .with_task(Task::new("B").with_duration(50))
            .with_task(Task::new("C").with_duration(10))
            .with_task(Task::new("A").with_duration(50))
            .with_task(Task::new("E").with_duration(10))
            .with_precedence(Precedence::finish_to_start("A", "B"))
            .with_precedence(Precedence::finish_to_start("E", "D"))
    }

    fn ids(catalog: &TaskCatalog, order: &PriorityOrder) -> Vec<String> {
        order
            .iter()
            .map(|i| catalog.tasks()[i].task_id.clone())
            .collect()
    }

    #[test]
    fn test_slack_then_start_then_id() {
        let catalog = catalog();
        let graph = build_constraints(&catalog).unwrap();
        let analyzer = CriticalPathAnalyzer::new(&catalog, &graph, 0);
        let order = PriorityListGenerator::default().generate(&catalog, analyzer.metrics());

        // A, B slack 0; E, D slack 80 (ES 0 and 10); C slack 90.
        assert_eq!(ids(&catalog, &order), vec!["A", "B", "E", "D", "C"]);
        assert_eq!(order.rank(3), 0);
        assert_eq!(order.len(), 5);
    }

    #[test]
    fn test_iter_restartable() {
        let catalog = catalog();
        let graph = build_constraints(&catalog).unwrap();
        let analyzer = CriticalPathAnalyzer::new(&catalog, &graph, 0);
        let order = PriorityListGenerator::default().generate(&catalog, analyzer.metrics());

        let first: Vec<usize> = order.iter().collect();
        let second: Vec<usize> = order.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first, order.as_slice());
    }

    #[test]
    fn test_regenerated_identically() {
        let catalog = catalog();
        let generate = || {
            let graph = build_constraints(&catalog).unwrap();
            let analyzer = CriticalPathAnalyzer::new(&catalog, &graph, 0);
            PriorityListGenerator::default().generate(&catalog, analyzer.metrics())
        };
        assert_eq!(generate(), generate());
    }

    #[test]
    fn test_custom_engine() {
        let catalog = catalog();
        let graph = build_constraints(&catalog).unwrap();
        let analyzer = CriticalPathAnalyzer::new(&catalog, &graph, 0);
        let generator = PriorityListGenerator::with_engine(
            RuleEngine::new()
                .with_rule(rules::Spt)
                .with_final_tie_breaker(TieBreaker::ById),
        );
        let order = generator.generate(&catalog, analyzer.metrics());
        assert_eq!(ids(&catalog, &order), vec!["C", "D", "E", "A", "B"]);
    }
}
