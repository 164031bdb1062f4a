use serde::{Deserialize, Serialize};

use super::mean::channel_mean;
use super::median::channel_median;
use super::mode::channel_mode;

/// Per-channel statistic applied across a stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Mean,
    Median,
    Mode,
}

impl Operation {
    /// Every operation, in the order a run executes them.
    pub const ALL: [Operation; 3] = [Operation::Mean, Operation::Median, Operation::Mode];

    /// Name carried by progress and operation-start events.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
        }
    }

    /// Prefix of the persisted file name.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::Mean => "averaged",
            Self::Median => "median",
            Self::Mode => "modal",
        }
    }

    /// Compute this statistic over one channel's samples. `values` may be reordered.
    pub fn apply(self, values: &mut [u8]) -> u8 {
        match self {
            Self::Mean => channel_mean(values),
            Self::Median => channel_median(values),
            Self::Mode => channel_mode(values),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mean => write!(f, "Average"),
            Self::Median => write!(f, "Median"),
            Self::Mode => write!(f, "Mode"),
        }
    }
}

/// Selection of operations for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationSet {
    pub mean: bool,
    pub median: bool,
    pub mode: bool,
}

impl OperationSet {
    pub fn all() -> Self {
        Self {
            mean: true,
            median: true,
            mode: true,
        }
    }

    pub fn only(operation: Operation) -> Self {
        let mut set = Self::default();
        set.insert(operation);
        set
    }

    pub fn insert(&mut self, operation: Operation) {
        match operation {
            Operation::Mean => self.mean = true,
            Operation::Median => self.median = true,
            Operation::Mode => self.mode = true,
        }
    }

    pub fn contains(&self, operation: Operation) -> bool {
        match operation {
            Operation::Mean => self.mean,
            Operation::Median => self.median,
            Operation::Mode => self.mode,
        }
    }

    /// Selected operations in execution order: mean, median, mode.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(|op| self.contains(*op))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut set = Self::default();
        for op in iter {
            set.insert(op);
        }
        set
    }
}
