mod common;

use common::{FakeSmartFs, Request, Workspace};
use smartfs_lib::commands::{resolve_target, OutputFormat, RecoverMode, WriteRequest};
use smartfs_lib::xattr::{MemoryAttributes, WriteOutcome};
use smartfs_lib::{CommandError, VersionCommands, VersionedPath};
use std::io::Cursor;
use std::path::Path;

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_list_two_records_with_pin() {
    let ws = Workspace::new("file.txt", b"live");
    let attrs = MemoryAttributes::new();
    attrs.insert(
        &ws.file,
        "user.smartfs.versions",
        "v1 | 2023-01-01 | init | 10 bytes\nv2[PIN] | 2023-01-02 | fix | 12 bytes",
    );
    let commands = VersionCommands::new(attrs);

    let mut out = Vec::new();
    let history = commands
        .list(&ws.file, OutputFormat::Table, &mut out)
        .unwrap();

    let ids: Vec<&str> = history.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2"]);

    let text = output(out);
    let rows: Vec<&str> = text.lines().skip(3).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("v1     -"));
    assert!(rows[1].starts_with("v2     YES"));
}

#[test]
fn test_list_missing_file() {
    let ws = Workspace::new("file.txt", b"live");
    let commands = VersionCommands::new(MemoryAttributes::new());

    let mut out = Vec::new();
    let err = commands
        .list(&ws.dir.path().join("nope.txt"), OutputFormat::Table, &mut out)
        .unwrap_err();

    assert!(matches!(err, CommandError::FileNotFound(_)));
    assert!(out.is_empty());
}

#[test]
fn test_list_unmanaged_file() {
    let ws = Workspace::new("file.txt", b"live");
    let commands = VersionCommands::new(FakeSmartFs::new());

    let mut out = Vec::new();
    let err = commands
        .list(&ws.file, OutputFormat::Table, &mut out)
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::NotManaged {
            attribute_present: false,
            ..
        }
    ));
}

#[test]
fn test_list_managed_file_without_versions() {
    let ws = Workspace::new("file.txt", b"live");
    let fs = FakeSmartFs::new();
    fs.manage(&ws.file);
    let commands = VersionCommands::new(fs);

    let mut out = Vec::new();
    let err = commands
        .list(&ws.file, OutputFormat::Table, &mut out)
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::NotManaged {
            attribute_present: true,
            ..
        }
    ));
}

#[test]
fn test_snapshot_sends_one_literal_request() {
    let ws = Workspace::new("file.txt", b"hello");
    let attrs = MemoryAttributes::new();
    let commands = VersionCommands::new(attrs);

    let mut out = Vec::new();
    commands.snapshot(&ws.file, "checkpoint", &mut out).unwrap();

    let writes = commands.attributes().writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].name, "user.smartfs.snapshot");
    assert_eq!(writes[0].value, b"checkpoint");
    assert!(output(out).contains("Success! Snapshot created."));
}

#[test]
fn test_snapshot_failure_is_reported() {
    let ws = Workspace::new("file.txt", b"hello");
    let attrs = MemoryAttributes::new();
    attrs.reject_writes(WriteOutcome::Unknown(String::new()));
    let commands = VersionCommands::new(attrs);

    let mut out = Vec::new();
    let err = commands
        .snapshot(&ws.file, "checkpoint", &mut out)
        .unwrap_err();

    assert_eq!(commands.attributes().writes().len(), 1);
    assert!(!output(out).contains("Success"));
    match err {
        CommandError::WriteRejected {
            request, outcome, ..
        } => {
            assert_eq!(
                request,
                WriteRequest::Snapshot {
                    message: "checkpoint".to_string()
                }
            );
            assert_eq!(outcome, WriteOutcome::Unknown(String::new()));
        }
        other => panic!("expected WriteRejected, got {:?}", other),
    }
}

#[test]
fn test_snapshot_message_is_not_escaped() {
    let ws = Workspace::new("file.txt", b"hello");
    let commands = VersionCommands::new(MemoryAttributes::new());

    let mut out = Vec::new();
    commands
        .snapshot(&ws.file, "a | b\nc", &mut out)
        .unwrap();
    assert_eq!(commands.attributes().writes()[0].value, b"a | b\nc");
}

#[test]
fn test_snapshot_then_list_against_fake_fs() {
    let ws = Workspace::new("file.txt", b"first");
    let fs = FakeSmartFs::new();
    fs.manage(&ws.file);
    let commands = VersionCommands::new(fs);

    let mut out = Vec::new();
    commands.snapshot(&ws.file, "init", &mut out).unwrap();
    ws.write(b"second version");
    commands.snapshot(&ws.file, "edit", &mut out).unwrap();

    let mut listing = Vec::new();
    let history = commands
        .list(&ws.file, OutputFormat::Table, &mut listing)
        .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history.records()[0].message, "init");
    assert_eq!(history.records()[0].size_display, "5 bytes");
    assert_eq!(history.records()[1].id, "v2");
    assert_eq!(history.records()[1].size_display, "14 bytes");
}

#[test]
fn test_pin_twice_toggles_back() {
    let ws = Workspace::new("file.txt", b"hello");
    let fs = FakeSmartFs::new();
    fs.manage(&ws.file);
    let commands = VersionCommands::new(fs);

    let mut out = Vec::new();
    commands.snapshot(&ws.file, "one", &mut out).unwrap();
    commands.snapshot(&ws.file, "two", &mut out).unwrap();

    commands.pin(&ws.file, "v2", &mut out).unwrap();
    assert!(commands.attributes().records(&ws.file)[1].pinned);

    commands.pin(&ws.file, "v2", &mut out).unwrap();
    assert!(!commands.attributes().records(&ws.file)[1].pinned);

    let pins: Vec<Request> = commands
        .attributes()
        .requests()
        .into_iter()
        .filter(|r| r.name == "user.smartfs.pin")
        .collect();
    assert_eq!(pins.len(), 2);
    assert!(pins.iter().all(|r| r.value == "v2"));
}

#[test]
fn test_pin_unknown_version() {
    let ws = Workspace::new("file.txt", b"hello");
    let fs = FakeSmartFs::new();
    fs.manage(&ws.file);
    let commands = VersionCommands::new(fs);

    let mut out = Vec::new();
    let err = commands.pin(&ws.file, "v9", &mut out).unwrap_err();

    assert!(err.to_string().contains("does version v9 exist?"));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_snapshot_when_all_versions_pinned() {
    let ws = Workspace::new("file.txt", b"hello");
    let fs = FakeSmartFs::with_capacity(1);
    fs.manage(&ws.file);
    let commands = VersionCommands::new(fs);

    let mut out = Vec::new();
    commands.snapshot(&ws.file, "one", &mut out).unwrap();
    commands.pin(&ws.file, "v1", &mut out).unwrap();

    let err = commands.snapshot(&ws.file, "two", &mut out).unwrap_err();
    assert!(matches!(
        err,
        CommandError::WriteRejected {
            outcome: WriteOutcome::QuotaExceeded,
            ..
        }
    ));
}

#[test]
fn test_cat_prints_bytes_verbatim() {
    let ws = Workspace::new("file.txt", b"live");
    ws.add_version("v1", b"no trailing newline\x00\xff");
    let commands = VersionCommands::new(MemoryAttributes::new());

    let mut out = Vec::new();
    let written = commands
        .cat(&VersionedPath::new(&ws.file, "v1"), &mut out)
        .unwrap();

    assert_eq!(out, b"no trailing newline\x00\xff");
    assert_eq!(written, out.len() as u64);
}

#[test]
fn test_cat_relative_time_token_is_passed_through() {
    let ws = Workspace::new("file.txt", b"live");
    ws.add_version("yesterday", b"old");
    let commands = VersionCommands::new(MemoryAttributes::new());

    let mut out = Vec::new();
    commands
        .cat(&VersionedPath::new(&ws.file, "yesterday"), &mut out)
        .unwrap();
    assert_eq!(out, b"old");
}

#[test]
fn test_cat_missing_version_writes_nothing() {
    let ws = Workspace::new("file.txt", b"live");
    let commands = VersionCommands::new(MemoryAttributes::new());

    let mut out = Vec::new();
    let err = commands
        .cat(&VersionedPath::new(&ws.file, "v7"), &mut out)
        .unwrap_err();

    assert!(matches!(err, CommandError::VersionNotFound(_)));
    assert!(out.is_empty());
}

#[test]
fn test_cat_after_fake_snapshot() {
    let ws = Workspace::new("file.txt", b"original");
    let fs = FakeSmartFs::new();
    fs.manage(&ws.file);
    let commands = VersionCommands::new(fs);

    let mut out = Vec::new();
    commands.snapshot(&ws.file, "before edit", &mut out).unwrap();
    ws.write(b"edited");

    let target = resolve_target(Path::new(&format!("{}@v1", ws.file.display())), None).unwrap();
    let mut content = Vec::new();
    commands.cat(&target, &mut content).unwrap();
    assert_eq!(content, b"original");
}

fn recover_with(answer: &str, mode: RecoverMode) -> (Workspace, Result<(), CommandError>, String) {
    let ws = Workspace::new("file.txt", b"current");
    ws.add_version("v1", b"previous");
    let commands = VersionCommands::new(MemoryAttributes::new()).with_recover_mode(mode);

    let mut out = Vec::new();
    let result = commands.recover(
        &VersionedPath::new(&ws.file, "v1"),
        &mut Cursor::new(answer.as_bytes().to_vec()),
        &mut out,
    );
    (ws, result, output(out))
}

#[test]
fn test_recover_requires_exact_y() {
    for answer in ["", "\n", "yes\n", "n\n", "N\n", "yy\n", " y\n"] {
        let (ws, result, _) = recover_with(answer, RecoverMode::Atomic);
        assert!(
            matches!(result, Err(CommandError::Cancelled)),
            "answer {:?} should cancel",
            answer
        );
        assert_eq!(ws.read(), b"current", "answer {:?} changed the file", answer);
    }
}

#[test]
fn test_recover_confirmed() {
    for answer in ["y\n", "Y\n", "y"] {
        let (ws, result, text) = recover_with(answer, RecoverMode::Atomic);
        result.unwrap();
        assert_eq!(ws.read(), b"previous");
        assert!(text.starts_with("Are you sure you want to overwrite"));
        assert!(text.contains("Recovered"));
    }
}

#[test]
fn test_recover_in_place() {
    let (ws, result, _) = recover_with("y\n", RecoverMode::InPlace);
    result.unwrap();
    assert_eq!(ws.read(), b"previous");
}

#[test]
fn test_recover_missing_version_leaves_file() {
    let ws = Workspace::new("file.txt", b"current");
    let commands = VersionCommands::new(MemoryAttributes::new());

    let mut out = Vec::new();
    let err = commands
        .recover(
            &VersionedPath::new(&ws.file, "v3"),
            &mut Cursor::new(b"y\n".to_vec()),
            &mut out,
        )
        .unwrap_err();

    assert!(matches!(err, CommandError::VersionNotFound(_)));
    assert_eq!(ws.read(), b"current");
}

#[test]
fn test_recover_after_fake_snapshot() {
    let ws = Workspace::new("file.txt", b"good");
    let fs = FakeSmartFs::new();
    fs.manage(&ws.file);
    let commands = VersionCommands::new(fs);

    let mut out = Vec::new();
    commands.snapshot(&ws.file, "known good", &mut out).unwrap();
    ws.write(b"broken");

    commands
        .recover(
            &VersionedPath::new(&ws.file, "v1"),
            &mut Cursor::new(b"Y\n".to_vec()),
            &mut out,
        )
        .unwrap();
    assert_eq!(ws.read(), b"good");
}
