// Per-root stacks of currently open steps

use std::collections::HashMap;

/// Open step uuids, partitioned by the test or fixture they run under.
///
/// Concurrent roots never share a stack, so "the current step" is resolved
/// independently for each of them.
#[derive(Debug, Default)]
pub struct StepStack {
    stacks: HashMap<String, Vec<String>>,
}

impl StepStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, root_uuid: &str, step_uuid: &str) {
        self.stacks
            .entry(root_uuid.to_string())
            .or_default()
            .push(step_uuid.to_string());
    }

    /// Remove a step from whichever stack holds it. Returns false if no stack did.
    pub fn remove_step(&mut self, step_uuid: &str) -> bool {
        let Some(root) = self
            .stacks
            .iter()
            .find(|(_, stack)| stack.iter().any(|uuid| uuid == step_uuid))
            .map(|(root, _)| root.clone())
        else {
            return false;
        };

        if let Some(stack) = self.stacks.get_mut(&root) {
            if let Some(position) = stack.iter().rposition(|uuid| uuid == step_uuid) {
                stack.remove(position);
            }
            if stack.is_empty() {
                self.stacks.remove(&root);
            }
        }
        true
    }

    pub fn current_step(&self, root_uuid: &str) -> Option<&str> {
        self.stacks
            .get(root_uuid)
            .and_then(|stack| stack.last())
            .map(String::as_str)
    }

    /// Forget every open step of a root
    pub fn clear(&mut self, root_uuid: &str) {
        self.stacks.remove(root_uuid);
    }

    pub fn depth(&self, root_uuid: &str) -> usize {
        self.stacks.get(root_uuid).map_or(0, Vec::len)
    }
}
