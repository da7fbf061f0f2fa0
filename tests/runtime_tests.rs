use allure_runtime::model::{ALLURE_ID_LABEL, ALLURE_TESTPLAN_SKIP_LABEL};
use allure_runtime::runtime::{TestPlan, TestPlanEntry};
use allure_runtime::time::FixedClock;
use allure_runtime::utils::{LinkConfig, LinkTemplate, LinkTypeConfig, md5};
use allure_runtime::{
    AttachmentOptions, AttachmentSource, FixtureResult, FixtureType, InMemoryWriter, Label,
    LifecycleListener, Link, Parameter, ReporterRuntime, Stage, Status, StepParent, StepResult,
    StopOptions, TestResult,
};
use std::sync::Arc;

fn setup() -> (ReporterRuntime, InMemoryWriter, Arc<FixedClock>) {
    let writer = InMemoryWriter::new();
    let clock = Arc::new(FixedClock::new(1_000));
    let runtime = ReporterRuntime::new(writer.clone()).with_clock(clock.clone());
    (runtime, writer, clock)
}

fn run_test(runtime: &mut ReporterRuntime, result: TestResult) -> String {
    let uuid = runtime.start_test(result, &[]);
    runtime.stop_test(&uuid, StopOptions::default());
    runtime.write_test(&uuid);
    uuid
}

#[test]
fn test_full_lifecycle_writes_one_result() {
    // Arrange
    let (mut runtime, writer, clock) = setup();

    // Act
    let uuid = runtime.start_test(TestResult::named("t").with_full_name("a.spec#t"), &[]);
    clock.advance(50);
    runtime.update_test(&uuid, |result| result.status = Some(Status::Passed));
    runtime.stop_test(&uuid, StopOptions::default());
    runtime.write_test(&uuid);

    // Assert
    let tests = writer.tests();
    assert_eq!(tests.len(), 1);
    let result = &tests[0];
    assert_eq!(result.uuid, uuid);
    assert_eq!(result.status, Some(Status::Passed));
    assert_eq!(result.stage, Stage::Finished);
    assert_eq!(result.start, Some(1_000));
    assert_eq!(result.stop, Some(1_050));
    assert!(runtime.state().is_empty());
}

#[test]
fn test_case_id_is_md5_of_full_name() {
    let (mut runtime, writer, _) = setup();

    run_test(&mut runtime, TestResult::named("t").with_full_name("a.spec#t"));

    let result = &writer.tests()[0];
    assert_eq!(result.test_case_id.as_deref(), Some(md5("a.spec#t").as_str()));
    assert!(result.history_id.as_deref().unwrap().starts_with(&md5("a.spec#t")));
}

#[test]
fn test_history_id_ignores_parameter_order_and_excluded_parameters() {
    let (mut runtime, writer, _) = setup();

    let mut first = TestResult::named("t").with_full_name("a.spec#t");
    first.parameters = vec![Parameter::new("a", "1"), Parameter::new("b", "2")];
    let mut second = TestResult::named("t").with_full_name("a.spec#t");
    second.parameters = vec![
        Parameter::new("b", "2"),
        Parameter::new("seed", "42").excluded(),
        Parameter::new("a", "1"),
    ];
    let mut third = TestResult::named("t").with_full_name("a.spec#t");
    third.parameters = vec![Parameter::new("a", "2"), Parameter::new("b", "2")];

    run_test(&mut runtime, first);
    run_test(&mut runtime, second);
    run_test(&mut runtime, third);

    let tests = writer.tests();
    assert_eq!(tests[0].history_id, tests[1].history_id);
    assert_ne!(tests[0].history_id, tests[2].history_id);
}

#[test]
fn test_explicit_history_id_wins() {
    let (mut runtime, writer, _) = setup();
    let mut result = TestResult::named("t").with_full_name("a.spec#t");
    result.history_id = Some("custom".to_string());

    run_test(&mut runtime, result);

    assert_eq!(writer.tests()[0].history_id.as_deref(), Some("custom"));
}

#[test]
fn test_no_identity_without_full_name() {
    let (mut runtime, writer, _) = setup();

    run_test(&mut runtime, TestResult::named("anonymous"));

    let result = &writer.tests()[0];
    assert!(result.test_case_id.is_none());
    assert!(result.history_id.is_none());
}

#[test]
fn test_stop_with_duration_anchors_on_stop() {
    let (mut runtime, writer, _) = setup();
    let uuid = runtime.start_test(TestResult::named("t"), &[]);

    runtime.stop_test(&uuid, StopOptions::with_duration(100.0).stop(500));
    runtime.write_test(&uuid);

    let result = &writer.tests()[0];
    assert_eq!(result.start, Some(400));
    assert_eq!(result.stop, Some(500));
}

#[test]
fn test_skip_label_discards_test() {
    let (mut runtime, writer, _) = setup();
    let scope = runtime.start_scope();
    let fixture = runtime
        .start_fixture(&scope, FixtureType::Before, FixtureResult::named("setup"))
        .unwrap();
    runtime.stop_fixture(&fixture, StopOptions::default());

    let mut result = TestResult::named("skipped");
    result.labels.push(Label::new(ALLURE_TESTPLAN_SKIP_LABEL, "true"));
    let uuid = runtime.start_test(result, &[scope.clone()]);
    runtime.stop_test(&uuid, StopOptions::default());
    runtime.write_test(&uuid);
    runtime.write_scope(&scope);

    assert!(writer.tests().is_empty());
    assert!(writer.groups().is_empty());
    assert!(runtime.state().is_empty());
}

#[test]
fn test_plan_filters_unselected_tests() {
    let plan = TestPlan {
        version: "1.0".to_string(),
        tests: vec![
            TestPlanEntry {
                id: None,
                selector: Some("a.spec#keep".to_string()),
            },
            TestPlanEntry {
                id: Some("7".to_string()),
                selector: None,
            },
        ],
    };
    let (runtime, writer, _) = setup();
    let mut runtime = runtime.with_test_plan(plan);

    run_test(&mut runtime, TestResult::named("keep").with_full_name("a.spec#keep"));
    run_test(&mut runtime, TestResult::named("drop").with_full_name("a.spec#drop"));
    let mut by_id = TestResult::named("by id").with_full_name("a.spec#other");
    by_id.labels.push(Label::new(ALLURE_ID_LABEL, "7"));
    run_test(&mut runtime, by_id);

    let names: Vec<String> = writer.tests().into_iter().map(|t| t.name.clone()).collect();
    assert_eq!(names, vec!["keep".to_string(), "by id".to_string()]);
    assert!(!runtime.is_selected(Some("a.spec#drop"), &[]));
}

#[test]
fn test_nested_steps_keep_start_order() {
    let (mut runtime, writer, _) = setup();
    let uuid = runtime.start_test(TestResult::named("t"), &[]);

    let outer = runtime
        .start_step(&uuid, StepParent::Current, StepResult::named("outer"))
        .unwrap();
    let first = runtime
        .start_step(&uuid, StepParent::Current, StepResult::named("first"))
        .unwrap();
    runtime.stop_step(&first, StopOptions::default());
    let second = runtime
        .start_step(&uuid, StepParent::Current, StepResult::named("second"))
        .unwrap();
    runtime.update_step(&second, |step| step.status = Some(Status::Failed));
    runtime.stop_step(&second, StopOptions::default());
    runtime.stop_step(&outer, StopOptions::default());
    runtime.write_test(&uuid);

    let result = &writer.tests()[0];
    assert_eq!(result.steps.len(), 1);
    let outer = &result.steps[0];
    assert_eq!(outer.name, "outer");
    assert_eq!(outer.stage, Stage::Finished);
    let children: Vec<&str> = outer.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(children, vec!["first", "second"]);
    assert_eq!(outer.steps[1].status, Some(Status::Failed));
}

#[test]
fn test_out_of_order_stop_keeps_tree() {
    let (mut runtime, writer, _) = setup();
    let uuid = runtime.start_test(TestResult::named("t"), &[]);
    let outer = runtime
        .start_step(&uuid, StepParent::Current, StepResult::named("outer"))
        .unwrap();
    let inner = runtime
        .start_step(&uuid, StepParent::Current, StepResult::named("inner"))
        .unwrap();

    runtime.stop_step(&outer, StopOptions::default());
    runtime.stop_step(&inner, StopOptions::default());
    runtime.write_test(&uuid);

    let result = &writer.tests()[0];
    assert_eq!(result.steps[0].name, "outer");
    assert_eq!(result.steps[0].steps[0].name, "inner");
    assert_eq!(result.steps[0].steps[0].stage, Stage::Finished);
    assert!(runtime.current_step(&uuid).is_none());
}

#[test]
fn test_interleaved_tests_keep_separate_step_trees() {
    let (mut runtime, writer, _) = setup();
    let a = runtime.start_test(TestResult::named("a"), &[]);
    let b = runtime.start_test(TestResult::named("b"), &[]);

    let mut a_steps = Vec::new();
    let mut b_steps = Vec::new();
    for level in 1..=3 {
        b_steps.push(
            runtime
                .start_step(&b, StepParent::Current, StepResult::named(format!("b{}", level)))
                .unwrap(),
        );
        a_steps.push(
            runtime
                .start_step(&a, StepParent::Current, StepResult::named(format!("a{}", level)))
                .unwrap(),
        );
    }
    for step in a_steps.iter().rev().chain(b_steps.iter().rev()) {
        runtime.stop_step(step, StopOptions::default());
    }
    runtime.write_test(&b);
    runtime.write_test(&a);

    let results = writer.results();
    for (uuid, prefix) in [(&a, "a"), (&b, "b")] {
        let result = results.find_test(uuid).unwrap();
        let level1 = &result.steps[0];
        let level2 = &level1.steps[0];
        let level3 = &level2.steps[0];
        assert_eq!(result.steps.len(), 1);
        assert_eq!(level1.name, format!("{}1", prefix));
        assert_eq!(level2.name, format!("{}2", prefix));
        assert_eq!(level3.name, format!("{}3", prefix));
        assert!(level3.steps.is_empty());
    }
}

#[test]
fn test_scope_writes_container_per_fixture() {
    let (mut runtime, writer, _) = setup();
    let scope = runtime.start_scope();
    let before = runtime
        .start_fixture(&scope, FixtureType::Before, FixtureResult::named("before all"))
        .unwrap();
    let step = runtime
        .start_step(&before, StepParent::Current, StepResult::named("connect"))
        .unwrap();
    runtime.stop_step(&step, StopOptions::default());
    runtime.update_fixture(&before, |fixture| fixture.status = Some(Status::Passed));
    runtime.stop_fixture(&before, StopOptions::default());

    let first = runtime.start_test(TestResult::named("one"), &[scope.clone()]);
    let second = runtime.start_test(TestResult::named("two"), &[scope.clone()]);
    for uuid in [&first, &second] {
        runtime.stop_test(uuid, StopOptions::default());
        runtime.write_test(uuid);
    }
    let after = runtime
        .start_fixture(&scope, FixtureType::After, FixtureResult::named("after all"))
        .unwrap();
    runtime.stop_fixture(&after, StopOptions::default());
    runtime.write_scope(&scope);

    let groups = writer.groups();
    assert_eq!(groups.len(), 2);
    let container = groups.iter().find(|g| g.uuid == before).unwrap();
    assert_eq!(container.children, vec![first.clone(), second.clone()]);
    assert_eq!(container.name.as_deref(), Some("before all"));
    assert_eq!(container.befores.len(), 1);
    assert!(container.afters.is_empty());
    assert_eq!(container.befores[0].steps[0].name, "connect");
    assert_eq!(container.befores[0].stage, Stage::Finished);
    let after_container = groups.iter().find(|g| g.uuid == after).unwrap();
    assert_eq!(after_container.afters[0].name, "after all");
    assert!(runtime.state().is_empty());
}

#[test]
fn test_scope_without_tests_writes_nothing() {
    let (mut runtime, writer, _) = setup();
    let scope = runtime.start_scope();
    let fixture = runtime
        .start_fixture(&scope, FixtureType::Before, FixtureResult::named("unused"))
        .unwrap();
    runtime.stop_fixture(&fixture, StopOptions::default());

    runtime.write_scope(&scope);

    assert!(writer.groups().is_empty());
    assert!(runtime.state().is_empty());
}

#[test]
fn test_scope_metadata_merged_at_stop() {
    let (mut runtime, writer, _) = setup();
    let scope = runtime.start_scope();
    runtime.update_scope(&scope, |scope| {
        scope.labels.push(Label::new("suite", "auth"));
        scope.description = Some("from scope".to_string());
    });
    let mut result = TestResult::named("t");
    result.description = Some("own".to_string());
    let uuid = runtime.start_test(result, &[scope.clone()]);

    runtime.stop_test(&uuid, StopOptions::default());
    runtime.write_test(&uuid);

    let result = &writer.tests()[0];
    assert_eq!(result.label_value("suite"), Some("auth"));
    assert_eq!(result.description.as_deref(), Some("own"));
}

#[test]
fn test_text_attachment_gets_txt_extension() {
    let (mut runtime, writer, _) = setup();
    let uuid = runtime.start_test(TestResult::named("t"), &[]);

    let file_name = runtime
        .write_attachment(
            &uuid,
            StepParent::Current,
            "log",
            AttachmentSource::Content(b"hello"),
            AttachmentOptions::new("text/plain"),
        )
        .unwrap();
    runtime.write_test(&uuid);

    assert!(file_name.ends_with("-attachment.txt"));
    assert_eq!(writer.attachment(&file_name), Some(b"hello".to_vec()));
    let result = &writer.tests()[0];
    assert_eq!(result.attachments[0].source, file_name);
    assert_eq!(result.attachments[0].content_type, "text/plain");
}

#[test]
fn test_wrapped_attachment_becomes_step() {
    let (mut runtime, writer, _) = setup();
    let uuid = runtime.start_test(TestResult::named("t"), &[]);
    let step = runtime
        .start_step(&uuid, StepParent::Current, StepResult::named("outer"))
        .unwrap();

    runtime.write_attachment(
        &uuid,
        StepParent::Current,
        "screenshot",
        AttachmentSource::Content(&[0x89, 0x50]),
        AttachmentOptions::new("image/png").wrap_in_step().timestamp(777),
    );
    runtime.stop_step(&step, StopOptions::default());
    runtime.write_test(&uuid);

    let outer = &writer.tests()[0].steps[0];
    let wrapper = &outer.steps[0];
    assert_eq!(wrapper.name, "screenshot");
    assert_eq!(wrapper.start, Some(777));
    assert_eq!(wrapper.stop, Some(777));
    assert!(wrapper.attachments[0].source.ends_with(".png"));
    assert!(outer.attachments.is_empty());
}

#[test]
fn test_attachment_from_missing_file_is_not_recorded() {
    let (mut runtime, writer, _) = setup();
    let uuid = runtime.start_test(TestResult::named("t"), &[]);

    let file_name = runtime.write_attachment(
        &uuid,
        StepParent::Root,
        "missing",
        AttachmentSource::Path(std::path::Path::new("/definitely/not/here.log")),
        AttachmentOptions::new("text/plain"),
    );
    runtime.write_test(&uuid);

    assert!(file_name.is_none());
    assert!(writer.tests()[0].attachments.is_empty());
}

#[test]
fn test_link_templates_applied_on_write() {
    let mut links = LinkConfig::new();
    links.insert(
        "issue".to_string(),
        LinkTypeConfig {
            url_template: LinkTemplate::Pattern("https://issues.example.com/%s".to_string()),
            name_template: Some(LinkTemplate::function(|id| format!("#{}", id))),
        },
    );
    let (runtime, writer, _) = setup();
    let mut runtime = runtime.with_links(links);
    let mut result = TestResult::named("t");
    result.links.push(Link::typed("issue", "123"));
    result.links.push(Link::typed("issue", "https://elsewhere.example.com/9"));

    run_test(&mut runtime, result);

    let links = &writer.tests()[0].links;
    assert_eq!(links[0].url, "https://issues.example.com/123");
    assert_eq!(links[0].name.as_deref(), Some("#123"));
    assert_eq!(links[1].url, "https://elsewhere.example.com/9");
}

struct Tagger;

impl LifecycleListener for Tagger {
    fn before_test_result_write(&self, result: &mut TestResult) -> anyhow::Result<()> {
        result.labels.push(Label::new("tagged", "yes"));
        Ok(())
    }
}

struct Broken;

impl LifecycleListener for Broken {
    fn before_test_result_write(&self, _result: &mut TestResult) -> anyhow::Result<()> {
        anyhow::bail!("listener failure")
    }

    fn after_test_result_start(&self, _result: &mut TestResult) -> anyhow::Result<()> {
        panic!("listener panic")
    }
}

#[test]
fn test_listeners_mutate_and_failures_are_isolated() {
    let (runtime, writer, _) = setup();
    let mut runtime = runtime.with_listener(Broken).with_listener(Tagger);

    run_test(&mut runtime, TestResult::named("t"));

    let result = &writer.tests()[0];
    assert_eq!(result.label_value("tagged"), Some("yes"));
}

/// Fails a test at stop when any of its top-level steps failed
struct FailFromSteps;

impl LifecycleListener for FailFromSteps {
    fn after_test_result_stop(&self, result: &mut TestResult) -> anyhow::Result<()> {
        if result.steps.iter().any(|step| step.status == Some(Status::Failed)) {
            result.status = Some(Status::Failed);
        }
        Ok(())
    }
}

#[test]
fn test_step_tree_is_current_before_write() {
    // Arrange
    let (runtime, writer, _) = setup();
    let mut runtime = runtime.with_listener(FailFromSteps);
    let uuid = runtime.start_test(TestResult::named("t"), &[]);
    let outer = runtime
        .start_step(&uuid, StepParent::Current, StepResult::named("outer"))
        .unwrap();
    let inner = runtime
        .start_step(&uuid, StepParent::Current, StepResult::named("inner"))
        .unwrap();

    // Act
    runtime.update_step(&inner, |step| step.status = Some(Status::Failed));
    runtime.stop_step(&inner, StopOptions::default());
    let visible_in_state = runtime.state().get_test(&uuid).unwrap().steps[0].steps[0].clone();
    runtime.update_step(&outer, |step| step.status = Some(Status::Failed));
    let mut seen_by_update = None;
    runtime.update_test(&uuid, |result| seen_by_update = result.steps[0].status);
    runtime.stop_test(&uuid, StopOptions::default());
    runtime.write_test(&uuid);

    // Assert
    assert_eq!(visible_in_state.status, Some(Status::Failed));
    assert_eq!(visible_in_state.stage, Stage::Finished);
    assert!(visible_in_state.stop.is_some());
    assert_eq!(seen_by_update, Some(Status::Failed));
    let result = &writer.tests()[0];
    assert_eq!(result.status, Some(Status::Failed));
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].steps.len(), 1);
    assert_eq!(result.steps[0].steps[0].status, Some(Status::Failed));
}

#[test]
fn test_environment_and_categories_written_when_configured() {
    let (runtime, writer, _) = setup();
    let mut info = allure_runtime::EnvironmentInfo::new();
    info.insert("os".to_string(), "linux".to_string());
    let runtime = runtime
        .with_environment_info(info.clone())
        .with_categories(vec![allure_runtime::Category {
            name: Some("Infra".to_string()),
            matched_statuses: vec![Status::Broken],
            ..Default::default()
        }]);

    runtime.write_environment_info();
    runtime.write_categories_definitions();

    let results = writer.results();
    assert_eq!(results.env_info, Some(info));
    assert_eq!(results.categories.unwrap()[0].name.as_deref(), Some("Infra"));
}

#[test]
fn test_unknown_uuids_are_ignored() {
    let (mut runtime, writer, _) = setup();

    runtime.update_step("missing", |step| step.name = "x".to_string());
    runtime.update_fixture("missing", |fixture| fixture.name = "x".to_string());
    runtime.update_scope("missing", |scope| scope.labels.clear());
    let uuid = runtime.start_test(TestResult::named("t"), &["no-such-scope".to_string()]);
    let step = runtime.start_step(
        &uuid,
        StepParent::Step("missing".to_string()),
        StepResult::named("s"),
    );
    runtime.write_test(&uuid);

    assert!(step.is_none());
    assert_eq!(writer.tests().len(), 1);
}
