// Reporter runtime - lifecycle façade over state, step stacks, listeners and the writer
//
// Every operation addressing a uuid that is not live logs and does nothing.
// Nothing here panics or returns an error to the caller once the runtime exists.

pub mod messages;
pub mod testplan;

pub use messages::{
    AttachmentContentMessage, AttachmentPathMessage, ContentEncoding, MetadataMessage,
    RuntimeMessage, StepMetadataMessage, StepStartMessage, StepStopMessage,
};
pub use testplan::{TestPlan, TestPlanEntry};

use crate::config::ReporterConfig;
use crate::error::Result;
use crate::model::{
    ALLURE_TESTPLAN_SKIP_LABEL, Attachment, Category, EnvironmentInfo, FixtureResult, Label,
    Stage, Status, StepResult, TestResult, TestResultContainer,
};
use crate::notifier::{LifecycleListener, Notifier};
use crate::state::{
    FixtureType, LifecycleState, ParentRef, StepStack, TestScope, WrappedFixtureResult,
    WrappedStepResult, WrappedTestResult, assemble_steps,
};
use crate::time::{Clock, SystemClock};
use crate::utils::attachments::{attachment_file_name, resolve_extension};
use crate::utils::{
    LinkConfig, LinkTypeConfig, StopOptions, format_links, identity, reconcile_timing,
};
use crate::writer::{Writer, WriterDescriptor, WriterRegistry};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, error};
use uuid::Uuid;

/// Where a new step or attachment is placed under its root
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StepParent {
    /// The innermost open step of the root, or the root itself if none is open
    #[default]
    Current,
    /// Directly on the root, bypassing open steps
    Root,
    Step(String),
}

/// Attachment body: inline bytes or a file to copy
#[derive(Debug, Clone, Copy)]
pub enum AttachmentSource<'a> {
    Content(&'a [u8]),
    Path(&'a Path),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentOptions {
    pub content_type: String,
    pub file_extension: Option<String>,
    /// Record the attachment inside a synthetic step named after it
    pub wrap_in_step: bool,
    /// Start/stop of the synthetic step; defaults to now
    pub timestamp: Option<i64>,
}

impl AttachmentOptions {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Default::default()
        }
    }

    pub fn file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = Some(extension.into());
        self
    }

    pub fn wrap_in_step(mut self) -> Self {
        self.wrap_in_step = true;
        self
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

pub struct ReporterRuntime {
    state: LifecycleState,
    step_stack: StepStack,
    notifier: Notifier,
    writer: Box<dyn Writer>,
    links: LinkConfig,
    environment_info: Option<EnvironmentInfo>,
    categories: Option<Vec<Category>>,
    test_plan: Option<TestPlan>,
    clock: Box<dyn Clock>,
}

impl ReporterRuntime {
    pub fn new(writer: impl Writer + 'static) -> Self {
        Self {
            state: LifecycleState::new(),
            step_stack: StepStack::new(),
            notifier: Notifier::default(),
            writer: Box::new(writer),
            links: LinkConfig::new(),
            environment_info: None,
            categories: None,
            test_plan: None,
            clock: Box::new(SystemClock),
        }
    }

    /// Build a runtime from configuration. Writer resolution and an explicitly
    /// configured test plan are the only failures reported here.
    pub fn from_config(config: &ReporterConfig, registry: &WriterRegistry) -> Result<Self> {
        let descriptor = config.writer.clone().unwrap_or_else(|| {
            WriterDescriptor::file_system(config.results_dir.to_string_lossy().into_owned())
        });
        let writer = registry.resolve_descriptor(&descriptor)?;

        let links = config
            .links
            .iter()
            .map(|(link_type, template)| (link_type.clone(), LinkTypeConfig::from(template)))
            .collect();

        let test_plan = match &config.testplan_path {
            Some(path) => Some(TestPlan::load(path)?),
            None => None,
        };

        let mut runtime = Self::new(writer).with_links(links);
        runtime.environment_info = config.environment_info.clone();
        runtime.categories = config.categories.clone();
        runtime.test_plan = test_plan;
        Ok(runtime)
    }

    pub fn with_listener(mut self, listener: impl LifecycleListener + 'static) -> Self {
        self.notifier.add(Box::new(listener));
        self
    }

    pub fn with_links(mut self, links: LinkConfig) -> Self {
        self.links = links;
        self
    }

    pub fn with_environment_info(mut self, info: EnvironmentInfo) -> Self {
        self.environment_info = Some(info);
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn with_test_plan(mut self, plan: TestPlan) -> Self {
        self.test_plan = Some(plan);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    // Scopes

    pub fn start_scope(&mut self) -> String {
        let uuid = new_uuid();
        self.state.set_scope(TestScope::new(&uuid));
        debug!("Started scope {}", uuid);
        uuid
    }

    pub fn update_scope(&mut self, uuid: &str, update: impl FnOnce(&mut TestScope)) {
        let Some(scope) = self.state.get_scope_mut(uuid) else {
            error!("Could not update scope {}: no scope with this uuid is running", uuid);
            return;
        };
        update(scope);
    }

    /// Flush every fixture of the scope as a container linking the scope's tests,
    /// then forget the scope. Scopes that never got a test write nothing.
    pub fn write_scope(&mut self, uuid: &str) {
        let Some(scope) = self.state.delete_scope(uuid) else {
            error!("Could not write scope {}: no scope with this uuid is running", uuid);
            return;
        };

        let children = dedup(scope.tests);
        let mut flushed = HashSet::new();

        for fixture_uuid in scope.fixtures {
            if !flushed.insert(fixture_uuid.clone()) {
                continue;
            }
            let Some(fixture) = self.state.delete_fixture(&fixture_uuid) else {
                continue;
            };
            let steps = self.state.take_steps_of(&fixture_uuid);
            self.step_stack.clear(&fixture_uuid);

            if children.is_empty() {
                debug!("Discarding fixture {}: scope {} has no tests", fixture_uuid, uuid);
                continue;
            }

            let WrappedFixtureResult {
                fixture_type,
                mut value,
                ..
            } = fixture;
            assemble_steps(&mut value, steps);

            let name = Some(value.name.clone()).filter(|name| !name.is_empty());
            let (befores, afters) = match fixture_type {
                FixtureType::Before => (vec![value], Vec::new()),
                FixtureType::After => (Vec::new(), vec![value]),
            };
            let container = TestResultContainer {
                uuid: fixture_uuid,
                name,
                children: children.clone(),
                befores,
                afters,
            };

            if let Err(e) = self.writer.write_group(&container) {
                error!("Failed to write container {}: {}", container.uuid, e);
            }
        }
    }

    // Fixtures

    pub fn start_fixture(
        &mut self,
        scope_uuid: &str,
        fixture_type: FixtureType,
        fixture: FixtureResult,
    ) -> Option<String> {
        let now = self.now();
        let Some(scope) = self.state.get_scope_mut(scope_uuid) else {
            error!("Could not start fixture {}: no scope {} is running", fixture.name, scope_uuid);
            return None;
        };

        let uuid = new_uuid();
        scope.fixtures.push(uuid.clone());

        let mut value = fixture;
        value.start.get_or_insert(now);
        self.state.set_fixture(WrappedFixtureResult {
            uuid: uuid.clone(),
            fixture_type,
            scope_uuid: scope_uuid.to_string(),
            value,
        });
        Some(uuid)
    }

    pub fn update_fixture(&mut self, uuid: &str, update: impl FnOnce(&mut FixtureResult)) {
        self.state.refresh_steps_of(uuid);
        let Some(fixture) = self.state.get_fixture_mut(uuid) else {
            error!("Could not update fixture {}: no fixture with this uuid is running", uuid);
            return;
        };
        update(fixture);
    }

    pub fn stop_fixture(&mut self, uuid: &str, options: StopOptions) {
        let now = self.now();
        let Some(fixture) = self.state.get_fixture_mut(uuid) else {
            error!("Could not stop fixture {}: no fixture with this uuid is running", uuid);
            return;
        };

        let timings = reconcile_timing(fixture.start, options.stop, options.duration, now);
        fixture.start = Some(timings.start);
        fixture.stop = Some(timings.stop);
        fixture.stage = Stage::Finished;
        self.state.refresh_steps_of(uuid);
    }

    // Tests

    pub fn start_test(&mut self, result: TestResult, scope_uuids: &[String]) -> String {
        let uuid = new_uuid();
        let mut result = result;
        result.uuid = uuid.clone();
        result.start.get_or_insert(self.now());

        self.notifier.before_test_result_start(&mut result);

        for scope_uuid in scope_uuids {
            match self.state.get_scope_mut(scope_uuid) {
                Some(scope) => scope.tests.push(uuid.clone()),
                None => error!(
                    "Could not link test {} to scope {}: no scope with this uuid is running",
                    uuid, scope_uuid
                ),
            }
        }

        self.state.set_test(result, scope_uuids.to_vec());
        if let Some(result) = self.state.get_test_mut(&uuid) {
            self.notifier.after_test_result_start(result);
        }
        uuid
    }

    pub fn update_test(&mut self, uuid: &str, update: impl FnOnce(&mut TestResult)) {
        self.state.refresh_steps_of(uuid);
        let Some(result) = self.state.get_test_mut(uuid) else {
            error!("Could not update test {}: no test with this uuid is running", uuid);
            return;
        };

        self.notifier.before_test_result_update(result);
        update(result);
        self.notifier.after_test_result_update(result);
    }

    /// Finalize identity and timing, then merge metadata staged on linked scopes
    pub fn stop_test(&mut self, uuid: &str, options: StopOptions) {
        let now = self.now();
        let Some(scope_uuids) = self
            .state
            .get_wrapped_test(uuid)
            .map(|wrapped| wrapped.scope_uuids.clone())
        else {
            error!("Could not stop test {}: no test with this uuid is running", uuid);
            return;
        };

        let staged: Vec<TestScope> = scope_uuids
            .iter()
            .filter_map(|scope_uuid| self.state.get_scope(scope_uuid).cloned())
            .collect();

        self.state.refresh_steps_of(uuid);
        let Some(result) = self.state.get_test_mut(uuid) else {
            return;
        };

        self.notifier.before_test_result_stop(result);

        if result.test_case_id.is_none() {
            result.test_case_id = identity::test_case_id(result);
        }
        if result.history_id.is_none() {
            result.history_id = identity::history_id(result);
        }

        let timings = reconcile_timing(result.start, options.stop, options.duration, now);
        result.start = Some(timings.start);
        result.stop = Some(timings.stop);
        result.stage = Stage::Finished;

        for scope in staged {
            result.labels.extend(scope.labels);
            result.links.extend(scope.links);
            result.parameters.extend(scope.parameters);
            if result.description.is_none() {
                result.description = scope.description;
            }
            if result.description_html.is_none() {
                result.description_html = scope.description_html;
            }
        }

        self.notifier.after_test_result_stop(result);
    }

    /// Persist the test and forget it, unless it is marked as skipped by the test plan
    pub fn write_test(&mut self, uuid: &str) {
        let Some(wrapped) = self.state.delete_test(uuid) else {
            error!("Could not write test {}: no test with this uuid is running", uuid);
            return;
        };
        let WrappedTestResult {
            value: mut result,
            scope_uuids,
        } = wrapped;

        let steps = self.state.take_steps_of(uuid);
        self.step_stack.clear(uuid);
        assemble_steps(&mut result.executable, steps);

        if let Some(plan) = &self.test_plan
            && !plan.includes(result.full_name.as_deref(), &result.labels)
        {
            result.labels.push(Label::new(ALLURE_TESTPLAN_SKIP_LABEL, "true"));
        }

        if result.has_label(ALLURE_TESTPLAN_SKIP_LABEL) {
            debug!("Discarding test {} excluded by the test plan", uuid);
            for scope_uuid in &scope_uuids {
                if let Some(scope) = self.state.get_scope_mut(scope_uuid) {
                    scope.tests.retain(|test| test != uuid);
                }
            }
            return;
        }

        result.links = format_links(&self.links, &result.links);

        self.notifier.before_test_result_write(&mut result);
        if let Err(e) = self.writer.write_result(&result) {
            error!("Failed to write test result {}: {}", uuid, e);
        }
        self.notifier.after_test_result_write(&mut result);
    }

    /// Whether the configured test plan (if any) selects a test
    pub fn is_selected(&self, full_name: Option<&str>, labels: &[Label]) -> bool {
        self.test_plan
            .as_ref()
            .is_none_or(|plan| plan.includes(full_name, labels))
    }

    // Steps

    pub fn current_step(&self, root_uuid: &str) -> Option<String> {
        self.step_stack.current_step(root_uuid).map(str::to_string)
    }

    fn find_parent(&self, root_uuid: &str, parent: StepParent) -> Option<ParentRef> {
        let parent_ref = match parent {
            StepParent::Current => match self.step_stack.current_step(root_uuid) {
                Some(step_uuid) => ParentRef::Step(step_uuid.to_string()),
                None => ParentRef::Root(root_uuid.to_string()),
            },
            StepParent::Root => ParentRef::Root(root_uuid.to_string()),
            StepParent::Step(step_uuid) => ParentRef::Step(step_uuid),
        };

        let exists = match &parent_ref {
            ParentRef::Root(uuid) => self.state.has_root(uuid),
            ParentRef::Step(uuid) => self.state.get_step(uuid).is_some(),
        };
        if !exists {
            error!("Could not find parent {:?} of root {}", parent_ref, root_uuid);
            return None;
        }
        Some(parent_ref)
    }

    /// Open a step. It takes its place in the parent's steps right away, so
    /// siblings keep start order however their stops interleave.
    pub fn start_step(
        &mut self,
        root_uuid: &str,
        parent: StepParent,
        step: StepResult,
    ) -> Option<String> {
        let parent_ref = self.find_parent(root_uuid, parent)?;
        let (owner, depth) = match &parent_ref {
            ParentRef::Root(uuid) => (uuid.clone(), 1),
            ParentRef::Step(uuid) => {
                let parent_step = self.state.get_wrapped_step(uuid)?;
                (parent_step.owner.clone(), parent_step.depth + 1)
            }
        };

        let mut value = step;
        value.start.get_or_insert(self.now());

        let parent_item = self.state.get_parent_mut(&parent_ref)?;
        let index = parent_item.steps.len();
        parent_item.steps.push(value.clone());

        let uuid = new_uuid();
        self.state.set_step(WrappedStepResult {
            uuid: uuid.clone(),
            owner,
            parent: parent_ref,
            index,
            depth,
            value,
        });
        self.step_stack.add_step(root_uuid, &uuid);
        Some(uuid)
    }

    pub fn update_step(&mut self, uuid: &str, update: impl FnOnce(&mut StepResult)) {
        let Some(step) = self.state.get_step_mut(uuid) else {
            error!("Could not update step {}: no step with this uuid is running", uuid);
            return;
        };
        update(step);
    }

    pub fn stop_step(&mut self, uuid: &str, options: StopOptions) {
        let now = self.now();
        let Some(step) = self.state.get_step_mut(uuid) else {
            error!("Could not stop step {}: no step with this uuid is running", uuid);
            return;
        };

        self.notifier.before_step_stop(step);

        let timings = reconcile_timing(step.start, options.stop, options.duration, now);
        step.start = Some(timings.start);
        step.stop = Some(timings.stop);
        step.stage = Stage::Finished;
        self.step_stack.remove_step(uuid);

        self.notifier.after_step_stop(step);

        // Mirror the finished step into its owner's tree so it is visible before the write
        if let Some(owner) = self
            .state
            .get_wrapped_step(uuid)
            .map(|wrapped| wrapped.owner.clone())
        {
            self.state.refresh_steps_of(&owner);
        }
    }

    // Attachments

    /// Write an attachment and record it under the resolved parent. Returns the
    /// generated file name.
    pub fn write_attachment(
        &mut self,
        root_uuid: &str,
        parent: StepParent,
        name: &str,
        source: AttachmentSource<'_>,
        options: AttachmentOptions,
    ) -> Option<String> {
        let parent_ref = self.find_parent(root_uuid, parent)?;

        let source_path = match source {
            AttachmentSource::Path(path) => Some(path),
            AttachmentSource::Content(_) => None,
        };
        let extension = resolve_extension(
            options.file_extension.as_deref(),
            source_path,
            &options.content_type,
        );
        let file_name = attachment_file_name(extension.as_deref());

        let written = match source {
            AttachmentSource::Content(content) => self.writer.write_attachment(&file_name, content),
            AttachmentSource::Path(path) => {
                self.writer.write_attachment_from_path(&file_name, path)
            }
        };
        if let Err(e) = written {
            error!("Failed to write attachment {}: {}", name, e);
            return None;
        }

        let attachment = Attachment {
            name: name.to_string(),
            source: file_name.clone(),
            content_type: options.content_type,
        };
        let timestamp = options.timestamp.unwrap_or_else(|| self.now());

        let parent_item = self.state.get_parent_mut(&parent_ref)?;
        if options.wrap_in_step {
            parent_item.steps.push(StepResult {
                name: name.to_string(),
                attachments: vec![attachment],
                start: Some(timestamp),
                stop: Some(timestamp),
                stage: Stage::Finished,
                ..Default::default()
            });
        } else {
            parent_item.attachments.push(attachment);
        }
        Some(file_name)
    }

    // Run-wide files

    pub fn write_environment_info(&self) {
        let Some(info) = &self.environment_info else {
            return;
        };
        if let Err(e) = self.writer.write_environment_info(info) {
            error!("Failed to write environment info: {}", e);
        }
    }

    pub fn write_categories_definitions(&self) {
        let Some(categories) = &self.categories else {
            return;
        };
        if let Err(e) = self.writer.write_categories_definitions(categories) {
            error!("Failed to write categories: {}", e);
        }
    }

    // Runtime messages

    /// Replay out-of-band messages against a root, in order
    pub fn apply_runtime_messages(&mut self, root_uuid: &str, messages: &[RuntimeMessage]) {
        if !self.state.has_root(root_uuid) {
            error!(
                "Could not apply runtime messages to {}: no test or fixture with this uuid is running",
                root_uuid
            );
            return;
        }

        for message in messages {
            match message {
                RuntimeMessage::Metadata(data) => self.handle_metadata_message(root_uuid, data),
                RuntimeMessage::StepStart(data) => {
                    let step = StepResult {
                        name: data.name.clone(),
                        start: Some(data.start),
                        ..Default::default()
                    };
                    self.start_step(root_uuid, StepParent::Current, step);
                }
                RuntimeMessage::StepMetadata(data) => {
                    self.handle_step_metadata_message(root_uuid, data)
                }
                RuntimeMessage::StepStop(data) => self.handle_step_stop_message(root_uuid, data),
                RuntimeMessage::AttachmentContent(data) => {
                    self.handle_attachment_content_message(root_uuid, data)
                }
                RuntimeMessage::AttachmentPath(data) => {
                    let options = AttachmentOptions {
                        content_type: data.content_type.clone(),
                        file_extension: data.file_extension.clone(),
                        wrap_in_step: data.wrap_in_step,
                        timestamp: data.timestamp,
                    };
                    self.write_attachment(
                        root_uuid,
                        StepParent::Current,
                        &data.name,
                        AttachmentSource::Path(Path::new(&data.path)),
                        options,
                    );
                }
            }
        }
    }

    fn handle_metadata_message(&mut self, root_uuid: &str, data: &MetadataMessage) {
        let fixture = self
            .state
            .get_wrapped_fixture(root_uuid)
            .map(|wrapped| (wrapped.fixture_type, wrapped.scope_uuid.clone()));

        let Some((fixture_type, scope_uuid)) = fixture else {
            let data = data.clone();
            self.update_test(root_uuid, move |result| {
                if let Some(links) = data.links {
                    result.links.extend(links);
                }
                if let Some(labels) = data.labels {
                    result.labels.extend(labels);
                }
                if let Some(parameters) = data.parameters {
                    result.parameters.extend(parameters);
                }
                if let Some(name) = data.display_name {
                    result.name = name;
                }
                if data.test_case_id.is_some() {
                    result.test_case_id = data.test_case_id;
                }
                if data.history_id.is_some() {
                    result.history_id = data.history_id;
                }
                if data.description.is_some() {
                    result.description = data.description;
                }
                if data.description_html.is_some() {
                    result.description_html = data.description_html;
                }
            });
            return;
        };

        if let Some(name) = &data.display_name {
            let name = name.clone();
            self.update_fixture(root_uuid, move |fixture| fixture.name = name);
        }
        if data.history_id.is_some() {
            error!("historyId can't be changed within a fixture ({})", root_uuid);
        }
        if data.test_case_id.is_some() {
            error!("testCaseId can't be changed within a fixture ({})", root_uuid);
        }
        if !data.has_scope_metadata() {
            return;
        }
        // After fixtures may run once their scope's tests are already finalized.
        if fixture_type == FixtureType::After {
            error!(
                "Metadata messages are not supported in after fixtures ({})",
                root_uuid
            );
            return;
        }

        let links = data
            .links
            .as_deref()
            .map(|links| format_links(&self.links, links));
        let data = data.clone();
        self.update_scope(&scope_uuid, move |scope| {
            if let Some(links) = links {
                scope.links.extend(links);
            }
            if let Some(labels) = data.labels {
                scope.labels.extend(labels);
            }
            if let Some(parameters) = data.parameters {
                scope.parameters.extend(parameters);
            }
            if data.description.is_some() {
                scope.description = data.description;
            }
            if data.description_html.is_some() {
                scope.description_html = data.description_html;
            }
        });
    }

    fn handle_step_metadata_message(&mut self, root_uuid: &str, data: &StepMetadataMessage) {
        let Some(step_uuid) = self.current_step(root_uuid) else {
            error!("Could not apply step metadata to {}: no step is running", root_uuid);
            return;
        };
        let data = data.clone();
        self.update_step(&step_uuid, move |step| {
            if let Some(name) = data.name {
                step.name = name;
            }
            if let Some(parameters) = data.parameters {
                step.parameters.extend(parameters);
            }
        });
    }

    fn handle_step_stop_message(&mut self, root_uuid: &str, data: &StepStopMessage) {
        let Some(step_uuid) = self.current_step(root_uuid) else {
            error!("Could not stop step of {}: no step is running", root_uuid);
            return;
        };
        let status = data.status;
        let details = data.status_details.clone();
        self.update_step(&step_uuid, move |step| {
            if step.status.is_none() {
                step.status = Some(status.unwrap_or(Status::Passed));
            }
            if let Some(details) = details {
                merge_status_details(&mut step.status_details, details);
            }
        });
        self.stop_step(&step_uuid, StopOptions::at(data.stop));
    }

    fn handle_attachment_content_message(
        &mut self,
        root_uuid: &str,
        data: &AttachmentContentMessage,
    ) {
        let content = match data.encoding {
            ContentEncoding::Utf8 => data.content.clone().into_bytes(),
            ContentEncoding::Base64 => match STANDARD.decode(&data.content) {
                Ok(content) => content,
                Err(e) => {
                    error!("Could not decode attachment {}: {}", data.name, e);
                    return;
                }
            },
        };
        let options = AttachmentOptions {
            content_type: data.content_type.clone(),
            file_extension: data.file_extension.clone(),
            wrap_in_step: data.wrap_in_step,
            timestamp: data.timestamp,
        };
        self.write_attachment(
            root_uuid,
            StepParent::Current,
            &data.name,
            AttachmentSource::Content(&content),
            options,
        );
    }
}

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

fn dedup(uuids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    uuids
        .into_iter()
        .filter(|uuid| seen.insert(uuid.clone()))
        .collect()
}

fn merge_status_details(
    target: &mut crate::model::StatusDetails,
    update: crate::model::StatusDetails,
) {
    if update.message.is_some() {
        target.message = update.message;
    }
    if update.trace.is_some() {
        target.trace = update.trace;
    }
    if update.flaky.is_some() {
        target.flaky = update.flaky;
    }
    if update.known.is_some() {
        target.known = update.known;
    }
    if update.muted.is_some() {
        target.muted = update.muted;
    }
}
