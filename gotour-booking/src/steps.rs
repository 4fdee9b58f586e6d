use serde::{Deserialize, Serialize};

use crate::models::Step;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepView {
    pub index: usize,
    pub step: Option<Step>,
    pub label: String,
    pub status: StepStatus,
}

/// Progress bar state. Everything is derived from `current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepIndicatorModel {
    current: usize,
    total: usize,
}

impl StepIndicatorModel {
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    /// Indicator over the booking steps, positioned at `step`.
    pub fn for_step(step: Step) -> Self {
        Self::new(step.index(), Step::ALL.len())
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn status(&self, index: usize) -> StepStatus {
        match index.cmp(&self.current) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Pending,
        }
    }

    pub fn steps(&self) -> Vec<StepView> {
        (0..self.total)
            .map(|index| {
                let step = Step::from_index(index);
                StepView {
                    index,
                    step,
                    label: step.map(|s| s.label().to_string()).unwrap_or_else(|| format!("Step {}", index + 1)),
                    status: self.status(index),
                }
            })
            .collect()
    }
}
