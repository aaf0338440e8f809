//! Chain definitions: ordered steps of concurrent tasks.

use serde::{Deserialize, Serialize};

use super::errors::WeftError;
use super::ids::ChainId;
use super::task::TaskSpec;

/// A set of tasks that run concurrently.
///
/// A step is never empty; both construction and deserialization reject an
/// empty task list. Task order inside a step has no execution meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaskSpec>", into = "Vec<TaskSpec>")]
pub struct Step {
    tasks: Vec<TaskSpec>,
}

impl Step {
    pub fn single(task: TaskSpec) -> Self {
        Self { tasks: vec![task] }
    }

    pub fn parallel(tasks: impl IntoIterator<Item = TaskSpec>) -> Result<Self, WeftError> {
        let tasks: Vec<TaskSpec> = tasks.into_iter().collect();
        Self::try_from(tasks)
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TryFrom<Vec<TaskSpec>> for Step {
    type Error = WeftError;

    fn try_from(tasks: Vec<TaskSpec>) -> Result<Self, Self::Error> {
        if tasks.is_empty() {
            return Err(WeftError::InvalidChain(
                "a step must contain at least one task".to_string(),
            ));
        }
        Ok(Self { tasks })
    }
}

impl From<Step> for Vec<TaskSpec> {
    fn from(step: Step) -> Self {
        step.tasks
    }
}

/// A chain as stored under its definition key.
///
/// Immutable once enqueued; the executor only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDefinition {
    id: ChainId,
    steps: Vec<Step>,
}

impl ChainDefinition {
    pub fn new(id: ChainId, steps: Vec<Step>) -> Result<Self, WeftError> {
        if steps.is_empty() {
            return Err(WeftError::InvalidChain(format!(
                "chain {id} has no steps"
            )));
        }
        Ok(Self { id, steps })
    }

    pub fn id(&self) -> &ChainId {
        &self.id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn task_count(&self) -> usize {
        self.steps.iter().map(Step::len).sum()
    }
}
