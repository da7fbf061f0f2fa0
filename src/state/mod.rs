// State module - live (unfinished) tests, steps, fixtures and scopes
// Everything is keyed by uuid; entries are removed once written

pub mod step_stack;

pub use step_stack::StepStack;

use crate::model::{Executable, FixtureResult, Label, Link, Parameter, StepResult, TestResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a fixture runs before or after the tests of its scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureType {
    Before,
    After,
}

#[derive(Debug, Clone)]
pub struct WrappedFixtureResult {
    pub uuid: String,
    pub fixture_type: FixtureType,
    pub scope_uuid: String,
    pub value: FixtureResult,
}

#[derive(Debug, Clone)]
pub struct WrappedTestResult {
    pub value: TestResult,
    /// Scopes linked at start, consumed at stop to merge staged metadata
    pub scope_uuids: Vec<String>,
}

/// Exact location of a step in its owner's tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    Root(String),
    Step(String),
}

#[derive(Debug, Clone)]
pub struct WrappedStepResult {
    pub uuid: String,
    /// Test or fixture whose result tree contains the step
    pub owner: String,
    pub parent: ParentRef,
    /// Slot reserved in the parent's `steps` at start time
    pub index: usize,
    /// Distance from the owner, 1 for top-level steps
    pub depth: usize,
    pub value: StepResult,
}

/// A fixture-sharing unit. Never persisted itself; its fixtures become containers.
#[derive(Debug, Clone, Default)]
pub struct TestScope {
    pub uuid: String,
    pub tests: Vec<String>,
    pub fixtures: Vec<String>,
    pub labels: Vec<Label>,
    pub links: Vec<Link>,
    pub parameters: Vec<Parameter>,
    pub description: Option<String>,
    pub description_html: Option<String>,
}

impl TestScope {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct LifecycleState {
    scopes: HashMap<String, TestScope>,
    tests: HashMap<String, WrappedTestResult>,
    fixtures: HashMap<String, WrappedFixtureResult>,
    steps: HashMap<String, WrappedStepResult>,
}

impl LifecycleState {
    pub fn new() -> Self {
        Self::default()
    }

    // Scopes

    pub fn get_scope(&self, uuid: &str) -> Option<&TestScope> {
        self.scopes.get(uuid)
    }

    pub fn get_scope_mut(&mut self, uuid: &str) -> Option<&mut TestScope> {
        self.scopes.get_mut(uuid)
    }

    pub fn set_scope(&mut self, scope: TestScope) {
        self.scopes.insert(scope.uuid.clone(), scope);
    }

    pub fn delete_scope(&mut self, uuid: &str) -> Option<TestScope> {
        self.scopes.remove(uuid)
    }

    // Tests

    pub fn get_test(&self, uuid: &str) -> Option<&TestResult> {
        self.tests.get(uuid).map(|wrapped| &wrapped.value)
    }

    pub fn get_test_mut(&mut self, uuid: &str) -> Option<&mut TestResult> {
        self.tests.get_mut(uuid).map(|wrapped| &mut wrapped.value)
    }

    pub fn get_wrapped_test(&self, uuid: &str) -> Option<&WrappedTestResult> {
        self.tests.get(uuid)
    }

    pub fn set_test(&mut self, value: TestResult, scope_uuids: Vec<String>) {
        self.tests.insert(
            value.uuid.clone(),
            WrappedTestResult { value, scope_uuids },
        );
    }

    pub fn delete_test(&mut self, uuid: &str) -> Option<WrappedTestResult> {
        self.tests.remove(uuid)
    }

    // Fixtures

    pub fn get_fixture(&self, uuid: &str) -> Option<&FixtureResult> {
        self.fixtures.get(uuid).map(|wrapped| &wrapped.value)
    }

    pub fn get_fixture_mut(&mut self, uuid: &str) -> Option<&mut FixtureResult> {
        self.fixtures.get_mut(uuid).map(|wrapped| &mut wrapped.value)
    }

    pub fn get_wrapped_fixture(&self, uuid: &str) -> Option<&WrappedFixtureResult> {
        self.fixtures.get(uuid)
    }

    pub fn set_fixture(&mut self, fixture: WrappedFixtureResult) {
        self.fixtures.insert(fixture.uuid.clone(), fixture);
    }

    pub fn delete_fixture(&mut self, uuid: &str) -> Option<WrappedFixtureResult> {
        self.fixtures.remove(uuid)
    }

    // Steps

    pub fn get_step(&self, uuid: &str) -> Option<&StepResult> {
        self.steps.get(uuid).map(|wrapped| &wrapped.value)
    }

    pub fn get_step_mut(&mut self, uuid: &str) -> Option<&mut StepResult> {
        self.steps.get_mut(uuid).map(|wrapped| &mut wrapped.value)
    }

    pub fn get_wrapped_step(&self, uuid: &str) -> Option<&WrappedStepResult> {
        self.steps.get(uuid)
    }

    pub fn set_step(&mut self, step: WrappedStepResult) {
        self.steps.insert(step.uuid.clone(), step);
    }

    pub fn delete_step(&mut self, uuid: &str) -> Option<WrappedStepResult> {
        self.steps.remove(uuid)
    }

    /// Look a uuid up without knowing its kind: fixture, then test, then step
    pub fn get_execution_item(&self, uuid: &str) -> Option<&Executable> {
        if let Some(fixture) = self.fixtures.get(uuid) {
            return Some(&fixture.value);
        }
        if let Some(test) = self.tests.get(uuid) {
            return Some(&test.value.executable);
        }
        self.steps.get(uuid).map(|step| &step.value)
    }

    pub fn get_execution_item_mut(&mut self, uuid: &str) -> Option<&mut Executable> {
        if let Some(fixture) = self.fixtures.get_mut(uuid) {
            return Some(&mut fixture.value);
        }
        if let Some(test) = self.tests.get_mut(uuid) {
            return Some(&mut test.value.executable);
        }
        self.steps.get_mut(uuid).map(|step| &mut step.value)
    }

    /// A root is a live test or fixture
    pub fn get_root_mut(&mut self, uuid: &str) -> Option<&mut Executable> {
        if let Some(fixture) = self.fixtures.get_mut(uuid) {
            return Some(&mut fixture.value);
        }
        self.tests.get_mut(uuid).map(|test| &mut test.value.executable)
    }

    pub fn has_root(&self, uuid: &str) -> bool {
        self.fixtures.contains_key(uuid) || self.tests.contains_key(uuid)
    }

    pub fn get_parent_mut(&mut self, parent: &ParentRef) -> Option<&mut Executable> {
        match parent {
            ParentRef::Root(uuid) => self.get_root_mut(uuid),
            ParentRef::Step(uuid) => self.get_step_mut(uuid),
        }
    }

    /// Remove every step owned by a root and return them
    pub fn take_steps_of(&mut self, owner: &str) -> Vec<WrappedStepResult> {
        let uuids: Vec<String> = self
            .steps
            .values()
            .filter(|step| step.owner == owner)
            .map(|step| step.uuid.clone())
            .collect();

        uuids
            .iter()
            .filter_map(|uuid| self.steps.remove(uuid))
            .collect()
    }

    /// Copy the current value of every live step of a root into its tree.
    /// The steps stay live; the tree only mirrors them.
    pub fn refresh_steps_of(&mut self, owner: &str) {
        let steps: Vec<WrappedStepResult> = self
            .steps
            .values()
            .filter(|step| step.owner == owner)
            .cloned()
            .collect();
        if steps.is_empty() {
            return;
        }
        if let Some(root) = self.get_root_mut(owner) {
            assemble_steps(root, steps);
        }
    }

    pub fn live_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
            && self.tests.is_empty()
            && self.fixtures.is_empty()
            && self.steps.is_empty()
    }
}

/// Put detached steps back into the tree of their owner.
///
/// Deepest steps are placed first so every step is complete before it lands in
/// its own parent. Each step fills the slot reserved when it started, which keeps
/// siblings in start order no matter how stops were interleaved.
pub fn assemble_steps(owner: &mut Executable, steps: Vec<WrappedStepResult>) {
    let mut order: Vec<(usize, String)> = steps
        .iter()
        .map(|step| (step.depth, step.uuid.clone()))
        .collect();
    order.sort_by(|a, b| b.0.cmp(&a.0));

    let mut pending: HashMap<String, WrappedStepResult> = steps
        .into_iter()
        .map(|step| (step.uuid.clone(), step))
        .collect();

    for (_, uuid) in order {
        let Some(step) = pending.remove(&uuid) else {
            continue;
        };

        let target = match &step.parent {
            ParentRef::Root(_) => Some(&mut *owner),
            ParentRef::Step(parent_uuid) => {
                pending.get_mut(parent_uuid).map(|parent| &mut parent.value)
            }
        };

        match target {
            Some(parent) => place(parent, step.index, step.value),
            None => tracing::warn!(
                "Dropping step {} ({}): its parent is no longer tracked",
                step.uuid,
                step.value.name
            ),
        }
    }
}

fn place(parent: &mut Executable, index: usize, step: StepResult) {
    match parent.steps.get_mut(index) {
        Some(slot) => *slot = step,
        None => parent.steps.push(step),
    }
}
