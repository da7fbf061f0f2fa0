use allure_runtime::config::ReporterConfig;
use allure_runtime::time::FixedClock;
use allure_runtime::writer::{
    MessageReader, MessageType, WriterDescriptor, WriterMessage, WriterSource, replay,
};
use allure_runtime::{
    AttachmentOptions, AttachmentSource, EnvironmentInfo, FileSystemWriter, FixtureResult,
    FixtureType, InMemoryWriter, MessageWriter, ReporterError, ReporterRuntime, StepParent,
    StopOptions, TestResult, TestResultContainer, Writer, WriterRegistry,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn read_json(path: &Path) -> serde_json::Value {
    let content = fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_runtime_writes_results_directory_layout() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let results_dir = dir.path().join("allure-results");
    let mut runtime = ReporterRuntime::new(FileSystemWriter::new(&results_dir))
        .with_clock(FixedClock::new(5_000));
    let scope = runtime.start_scope();
    let fixture = runtime
        .start_fixture(&scope, FixtureType::Before, FixtureResult::named("seed db"))
        .unwrap();
    runtime.stop_fixture(&fixture, StopOptions::default());

    // Act
    let test = runtime.start_test(
        TestResult::named("t").with_full_name("a.spec#t"),
        &[scope.clone()],
    );
    let attachment = runtime
        .write_attachment(
            &test,
            StepParent::Current,
            "body",
            AttachmentSource::Content(b"{\"ok\":true}"),
            AttachmentOptions::new("application/json"),
        )
        .unwrap();
    runtime.stop_test(&test, StopOptions::default());
    runtime.write_test(&test);
    runtime.write_scope(&scope);

    // Assert
    let result = read_json(&results_dir.join(format!("{}-result.json", test)));
    assert_eq!(result["uuid"], test.as_str());
    assert_eq!(result["fullName"], "a.spec#t");
    assert_eq!(result["stage"], "finished");
    assert_eq!(result["attachments"][0]["type"], "application/json");
    assert_eq!(result["attachments"][0]["source"], attachment.as_str());

    let container = read_json(&results_dir.join(format!("{}-container.json", fixture)));
    assert_eq!(container["children"][0], test.as_str());
    assert_eq!(container["befores"][0]["name"], "seed db");

    assert!(attachment.ends_with("-attachment.json"));
    assert_eq!(
        fs::read(results_dir.join(&attachment)).unwrap(),
        b"{\"ok\":true}".to_vec()
    );
}

#[test]
fn test_results_dir_recreated_before_each_write() {
    let dir = TempDir::new().unwrap();
    let results_dir = dir.path().join("out");
    let writer = FileSystemWriter::new(&results_dir);
    writer.write_attachment("a.txt", b"1").unwrap();

    fs::remove_dir_all(&results_dir).unwrap();
    writer.write_attachment("b.txt", b"2").unwrap();

    assert!(results_dir.join("b.txt").exists());
    assert!(!results_dir.join("a.txt").exists());
}

#[test]
fn test_attachment_copied_from_path() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("trace.zip");
    fs::write(&source, b"PK").unwrap();
    let results_dir = dir.path().join("results");
    let mut runtime = ReporterRuntime::new(FileSystemWriter::new(&results_dir));
    let test = runtime.start_test(TestResult::named("t"), &[]);

    let file_name = runtime
        .write_attachment(
            &test,
            StepParent::Current,
            "trace",
            AttachmentSource::Path(&source),
            AttachmentOptions::new("application/octet-stream"),
        )
        .unwrap();

    assert!(file_name.ends_with("-attachment.zip"));
    assert_eq!(fs::read(results_dir.join(&file_name)).unwrap(), b"PK".to_vec());
}

#[test]
fn test_environment_properties_file() {
    let dir = TempDir::new().unwrap();
    let writer = FileSystemWriter::new(dir.path());
    let mut info = EnvironmentInfo::new();
    info.insert("os".to_string(), "linux".to_string());
    info.insert("path".to_string(), "C:\\tools".to_string());

    writer.write_environment_info(&info).unwrap();

    let content = fs::read_to_string(dir.path().join("environment.properties")).unwrap();
    assert_eq!(content, "os=linux\npath=C\\:\\\\tools\n");
}

#[test]
fn test_message_relay_into_filesystem() {
    // Arrange
    let (message_writer, receiver) = MessageWriter::channel();
    let mut runtime = ReporterRuntime::new(message_writer);
    let test = runtime.start_test(TestResult::named("relayed"), &[]);
    runtime.write_attachment(
        &test,
        StepParent::Current,
        "note",
        AttachmentSource::Content(b"hello"),
        AttachmentOptions::new("text/plain"),
    );
    runtime.stop_test(&test, StopOptions::default());
    runtime.write_test(&test);
    drop(runtime);
    let dir = TempDir::new().unwrap();
    let target = FileSystemWriter::new(dir.path());

    // Act
    let messages: Vec<WriterMessage> = receiver.iter().collect();
    for message in &messages {
        replay(message, &target).unwrap();
    }

    // Assert
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].message_type, MessageType::Attachment);
    assert_eq!(messages[1].message_type, MessageType::Result);
    let result = read_json(&dir.path().join(format!("{}-result.json", test)));
    assert_eq!(result["name"], "relayed");
}

#[test]
fn test_message_reader_collects_json_lines() {
    let (writer, receiver) = MessageWriter::channel();
    let container = TestResultContainer {
        uuid: "c1".to_string(),
        ..Default::default()
    };
    writer.write_group(&container).unwrap();
    drop(writer);
    let lines: Vec<String> = receiver
        .iter()
        .map(|message| serde_json::to_string(&message).unwrap())
        .collect();

    let mut reader = MessageReader::new();
    for line in &lines {
        reader.handle_line(line).unwrap();
    }
    let memory = InMemoryWriter::new();
    reader.write_all(&memory).unwrap();

    assert_eq!(reader.results().groups[0].uuid, "c1");
    assert_eq!(memory.groups()[0].uuid, "c1");
}

#[test]
fn test_registry_resolves_configured_writer() {
    let dir = TempDir::new().unwrap();
    let registry = WriterRegistry::new();
    let config = ReporterConfig {
        results_dir: dir.path().join("from-config"),
        ..Default::default()
    };

    let mut runtime = ReporterRuntime::from_config(&config, &registry).unwrap();
    let test = runtime.start_test(TestResult::named("t"), &[]);
    runtime.write_test(&test);

    assert!(
        dir.path()
            .join("from-config")
            .join(format!("{}-result.json", test))
            .exists()
    );
}

#[test]
fn test_registry_rejects_unknown_writer() {
    let registry = WriterRegistry::new();
    let config = ReporterConfig {
        writer: Some(WriterDescriptor::Name("S3Writer".to_string())),
        ..Default::default()
    };

    let err = ReporterRuntime::from_config(&config, &registry)
        .err()
        .expect("unknown writer must fail");

    assert!(matches!(err, ReporterError::UnknownWriter(name) if name == "S3Writer"));
}

#[test]
fn test_registry_accepts_instances() {
    let registry = WriterRegistry::new();
    let memory = InMemoryWriter::new();
    let boxed: Box<dyn Writer> = Box::new(memory.clone());

    let writer = registry.resolve(WriterSource::from(boxed)).unwrap();
    writer.write_result(&TestResult::named("direct")).unwrap();

    assert_eq!(memory.tests()[0].name, "direct");
}
