//! Integration tests for the `surrogate` binary.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn surrogate(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_surrogate"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run surrogate")
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).display().to_string()
}

#[test]
fn test_generate_null_object_source() {
    let output = surrogate(&["generate", &fixture("base_class.json")]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("namespace Surrogate {"));
    assert!(stdout.contains("extends ProxyTest.BaseClass {"));
    assert!(stdout.contains("public override fooMethod(bar, baz) {"));
    assert!(stdout.contains("protected override protectedMethod() {"));
    assert!(!stdout.contains("privateMethod"));
    assert!(!stdout.contains("super."));
}

#[test]
fn test_generate_interceptor_json() {
    let output = surrogate(&[
        "generate",
        &fixture("base_class.json"),
        "--strategy",
        "access-interceptor",
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let class: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(class["strategy"], "access-interceptor");
    assert_eq!(class["parent"], "ProxyTest\\BaseClass");
    assert!(class["hook_storage"]["prefix_storage"]
        .as_str()
        .unwrap()
        .starts_with("prefixInterceptors_"));
    assert_eq!(class["methods"].as_array().unwrap().len(), 3);
}

#[test]
fn test_generate_with_config_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let out_path = temp_dir.path().join("proxy.ts");

    let output = surrogate(&[
        "generate",
        &fixture("base_class.json"),
        "--config",
        &fixture("surrogate.toml"),
        "--output",
        &out_path.display().to_string(),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let source = std::fs::read_to_string(&out_path).unwrap();
    assert!(source.starts_with("namespace Fixtures.Proxies {\n  export class BaseClass_"));
    assert!(source.contains("static build(): BaseClass_"));
}

#[test]
fn test_interceptor_for_interface_fails() {
    let output = surrogate(&[
        "generate",
        &fixture("base_interface.json"),
        "--strategy",
        "access-interceptor",
    ]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported target ProxyTest\\BaseInterface"), "{stderr}");
}

#[test]
fn test_unknown_strategy_fails() {
    let output = surrogate(&["generate", &fixture("base_class.json"), "-s", "lazy-ghost"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown proxy strategy: lazy-ghost"));
}

#[test]
fn test_check_reports_each_strategy() {
    let output = surrogate(&["check", &fixture("base_interface.json")]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("ProxyTest\\BaseInterface (1 methods, 0 properties)"));
    assert!(stdout.contains("null-object: ok"));
    assert!(stdout.contains("access-interceptor: Unsupported target"));
}

#[test]
fn test_strategies_lists_both() {
    let output = surrogate(&["strategies"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let names: Vec<_> = stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(names, vec!["null-object", "access-interceptor"]);
}
