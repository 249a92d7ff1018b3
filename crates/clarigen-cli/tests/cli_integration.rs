use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

const FUZZER_ABI: &str = r#"{
    "functions": [
        { "name": "get-name", "access": "public", "args": [],
          "outputs": { "type": { "response": { "ok": { "string-ascii": { "length": 8 } }, "error": "none" } } } },
        { "name": "get-number", "access": "read_only", "args": [], "outputs": { "type": "uint128" } }
    ],
    "variables": [{ "name": "my-var", "type": "uint128", "access": "variable" }],
    "maps": [{ "name": "basic-map", "key": "uint128", "value": "bool" }]
}"#;

fn clarigen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_clarigen"))
}

fn abi_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(FUZZER_ABI.as_bytes()).unwrap();
    file
}

#[test]
fn test_help_lists_commands() {
    let output = clarigen().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("interface"));
    assert!(stdout.contains("call"));
    assert!(stdout.contains("execute"));
}

#[test]
fn test_interface_declaration() {
    let abi = abi_file();
    let output = clarigen()
        .args(["interface", abi.path().to_str().unwrap(), "--name", "fuzzer"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("export interface FuzzerContract {"));
    assert!(stdout.contains("getName: () => Transaction<string, null>;"));
    assert!(stdout.contains("getNumber: () => Promise<number>;"));
    assert!(stdout.contains("basicMap: (key: number) => Promise<boolean | null>;"));
}

#[test]
fn test_interface_json() {
    let abi = abi_file();
    let output = clarigen()
        .args(["interface", abi.path().to_str().unwrap(), "--name", "fuzzer", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["contract_name"], "fuzzer");
    assert_eq!(parsed["methods"]["getNumber"]["clarity_name"], "get-number");
}

#[test]
fn test_interface_rejects_unknown_format() {
    let abi = abi_file();
    let output = clarigen()
        .args(["interface", abi.path().to_str().unwrap(), "--format", "yaml"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid value 'yaml'"));
}

#[test]
fn test_call_rejects_unknown_format() {
    let output = clarigen()
        .args(["call", "fuzzer.clar", "get-number", "--format", "yaml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid value 'yaml'"));
}

#[test]
fn test_call_reports_missing_binary() {
    let dir = TempDir::new().unwrap();
    let contract = dir.path().join("fuzzer.clar");
    fs::write(&contract, "(define-read-only (get-number) u42)").unwrap();
    fs::write(dir.path().join("fuzzer.json"), FUZZER_ABI).unwrap();

    let config = dir.path().join("Clarigen.toml");
    fs::write(&config, "[clarity]\nbin = \"/nonexistent/clarity-cli\"\n").unwrap();

    let output = clarigen()
        .args([
            "call",
            contract.to_str().unwrap(),
            "get-number",
            "--config",
            config.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to start"));
}

#[cfg(unix)]
#[test]
fn test_failed_execute_exits_non_zero_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let bin = dir.path().join("clarity-cli");
    fs::write(
        &bin,
        r#"#!/bin/sh
case "$1" in
  execute)
    echo '{"success":false,"output_serialized":"0100000000000000000000000000000001","events":[]}'
    ;;
  *)
    echo '{"message":"ok"}'
    ;;
esac
"#,
    )
    .unwrap();
    fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();

    let contract = dir.path().join("fuzzer.clar");
    fs::write(&contract, "(define-public (get-name) (err none))").unwrap();
    fs::write(dir.path().join("fuzzer.json"), FUZZER_ABI).unwrap();
    let config = dir.path().join("Clarigen.toml");
    fs::write(&config, format!("[clarity]\nbin = \"{}\"\n", bin.display())).unwrap();

    let scratch_root = TempDir::new().unwrap();
    let output = clarigen()
        .env("TMPDIR", scratch_root.path())
        .args([
            "execute",
            contract.to_str().unwrap(),
            "get-name",
            "--sender",
            "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG",
            "--config",
            config.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("(err u1)"));
    assert_eq!(fs::read_dir(scratch_root.path()).unwrap().count(), 0);
}
