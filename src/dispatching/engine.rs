//! Multi-rule priority ordering.
//!
//! Each task is reduced to a sort key: the vector of its weighted rule
//! scores (sequential mode) or their sum (weighted mode). Keys compare
//! lexicographically with a small tolerance, then the tie-breaker decides.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Task;

/// Scores closer than this are treated as equal.
const SCORE_EPSILON: f64 = 1e-9;

/// How rule scores combine into a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Later rules only separate tasks that tie on every earlier rule.
    #[default]
    Sequential,
    /// One key: the weighted sum of all rule scores.
    Weighted,
}

/// Order among tasks whose keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreaker {
    /// Input order.
    #[default]
    Stable,
    /// Task id, ascending.
    ById,
}

/// Ordered set of weighted dispatching rules.
///
/// ```
/// use crew_schedule::dispatching::{rules, RuleEngine, TieBreaker};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::LeastSlack)
///     .with_rule(rules::EarliestStart)
///     .with_final_tie_breaker(TieBreaker::ById);
/// assert_eq!(engine.rule_names(), vec!["SLACK", "EST"]);
/// ```
#[derive(Clone, Default)]
pub struct RuleEngine {
    rules: Vec<(Arc<dyn DispatchingRule>, f64)>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule with weight 1.
    pub fn with_rule<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    pub fn with_weighted_rule<R>(mut self, rule: R, weight: f64) -> Self
    where
        R: DispatchingRule + 'static,
    {
        self.rules.push((Arc::new(rule), weight));
        self
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|(rule, _)| rule.name()).collect()
    }

    /// Weighted score of every rule for one task.
    pub fn evaluate(&self, task: &Task, context: &SchedulingContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|(rule, weight)| rule.evaluate(task, context) * weight)
            .collect()
    }

    /// Indices into `tasks`, highest priority first.
    pub fn sort_indices(&self, tasks: &[Task], context: &SchedulingContext) -> Vec<usize> {
        let keys: Vec<Vec<RuleScore>> = tasks.iter().map(|t| self.key(t, context)).collect();
        let mut indices: Vec<usize> = (0..tasks.len()).collect();
        indices.sort_by(|&a, &b| {
            compare_keys(&keys[a], &keys[b]).then_with(|| match self.tie_breaker {
                TieBreaker::Stable => Ordering::Equal,
                TieBreaker::ById => tasks[a].task_id.cmp(&tasks[b].task_id),
            })
        });
        indices
    }

    /// Index of the highest-priority task, if any.
    pub fn select_best(&self, tasks: &[Task], context: &SchedulingContext) -> Option<usize> {
        self.sort_indices(tasks, context).into_iter().next()
    }

    fn key(&self, task: &Task, context: &SchedulingContext) -> Vec<RuleScore> {
        let scores = self.evaluate(task, context);
        match self.mode {
            EvaluationMode::Sequential => scores,
            EvaluationMode::Weighted => vec![scores.iter().sum()],
        }
    }
}

fn compare_keys(a: &[RuleScore], b: &[RuleScore]) -> Ordering {
    a.iter()
        .zip(b)
        .find(|(x, y)| (*x - *y).abs() > SCORE_EPSILON)
        .map_or(Ordering::Equal, |(x, y)| x.total_cmp(y))
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<String> = self
            .rules
            .iter()
            .map(|(rule, weight)| format!("{}×{weight}", rule.name()))
            .collect();
        f.debug_struct("RuleEngine")
            .field("rules", &rules)
            .field("mode", &self.mode)
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;

    fn hour_tasks(ids: &[&str]) -> Vec<Task> {
        ids.iter().map(|id| Task::new(*id).with_duration(60)).collect()
    }

    #[test]
    fn test_least_slack_first() {
        let tasks = hour_tasks(&["loose", "critical", "some"]);
        let ctx = SchedulingContext::new()
            .with_slack("loose", 300)
            .with_slack("critical", 0)
            .with_slack("some", 40);
        let engine = RuleEngine::new().with_rule(rules::LeastSlack);
        assert_eq!(engine.sort_indices(&tasks, &ctx), vec![1, 2, 0]);
    }

    #[test]
    fn test_second_rule_splits_ties() {
        let tasks = hour_tasks(&["A", "B"]);
        let ctx = SchedulingContext::new()
            .with_slack("A", 0)
            .with_slack("B", 0)
            .with_earliest_start("A", 90)
            .with_earliest_start("B", 30);
        let engine = RuleEngine::new()
            .with_rule(rules::LeastSlack)
            .with_rule(rules::EarliestStart);
        assert_eq!(engine.select_best(&tasks, &ctx), Some(1));
    }

    #[test]
    fn test_tie_breakers() {
        let tasks = hour_tasks(&["B", "A", "C"]);
        let ctx = SchedulingContext::new();
        let stable = RuleEngine::new().with_rule(rules::Spt);
        assert_eq!(stable.sort_indices(&tasks, &ctx), vec![0, 1, 2]);

        let by_id = stable.with_final_tie_breaker(TieBreaker::ById);
        assert_eq!(by_id.sort_indices(&tasks, &ctx), vec![1, 0, 2]);
    }

    #[test]
    fn test_weighted_sum() {
        let tasks = vec![
            Task::new("A").with_duration(1000),
            Task::new("B").with_duration(5000),
        ];
        let ctx = SchedulingContext::new().with_due("A", 50_000).with_due("B", 10_000);
        let engine = RuleEngine::new()
            .with_mode(EvaluationMode::Weighted)
            .with_weighted_rule(rules::Edd, 0.5)
            .with_weighted_rule(rules::Spt, 0.5);

        // A scores 25500, B scores 7500.
        assert_eq!(engine.select_best(&tasks, &ctx), Some(1));
    }

    #[test]
    fn test_no_tasks() {
        let engine = RuleEngine::new().with_rule(rules::Spt);
        let ctx = SchedulingContext::new();
        assert!(engine.sort_indices(&[], &ctx).is_empty());
        assert_eq!(engine.select_best(&[], &ctx), None);
    }

    #[test]
    fn test_scores_carry_weights() {
        let task = Task::new("T1").with_duration(30);
        let ctx = SchedulingContext::new().with_slack("T1", 15);
        let engine = RuleEngine::new()
            .with_rule(rules::LeastSlack)
            .with_weighted_rule(rules::Spt, 2.0);

        let scores = engine.evaluate(&task, &ctx);
        assert!((scores[0] - 15.0).abs() < 1e-10);
        assert!((scores[1] - 60.0).abs() < 1e-10);
        assert_eq!(engine.rule_names(), vec!["SLACK", "SPT"]);
        assert!(format!("{engine:?}").contains("SPT×2"));
    }
}
