use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const MODULE: &str = r#"{
  "operations": [
    {
      "operationId": "Widgets_Get",
      "command": "Get-Widget",
      "parameters": {
        "WidgetName": {"jsonName": "name", "typeData": {"type": "string"}}
      },
      "responseType": {
        "moduleData": {
          "type": "Widget",
          "properties": {"WidgetName": {"jsonName": "name"}}
        }
      }
    }
  ]
}"#;

fn livetest(dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_livetest"));
    command.current_dir(dir.path()).env_remove("RUST_LOG");
    command
}

#[test]
fn test_init_command() {
    let temp_dir = TempDir::new().unwrap();

    let output = livetest(&temp_dir)
        .arg("init")
        .output()
        .expect("Failed to run init command");
    assert!(output.status.success());

    let config_path = temp_dir.path().join(".livetest/settings.toml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("version = 1"));
    assert!(content.contains("[server]"));
    assert!(content.contains("max_batch_size = 256"));

    // A second init without --force must fail
    let again = livetest(&temp_dir).arg("init").output().unwrap();
    assert!(!again.status.success());
    let forced = livetest(&temp_dir).args(["init", "--force"]).output().unwrap();
    assert!(forced.status.success());
}

#[test]
fn test_config_command() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join(".livetest");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("settings.toml"),
        "version = 2\n[server]\nmax_header_line = 99\n",
    )
    .unwrap();

    let output = livetest(&temp_dir)
        .arg("config")
        .output()
        .expect("Failed to run config command");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("version = 2"));
    assert!(stdout.contains("max_header_line = 99"));
}

#[test]
fn test_check_command_lists_operations() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("module.json"), MODULE).unwrap();

    let output = livetest(&temp_dir)
        .args(["check", "--module", "module.json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Widgets_Get -> Get-Widget"));
    assert!(stdout.contains("WidgetName as 'name': string"));
}

#[test]
fn test_check_without_module_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = livetest(&temp_dir).arg("check").output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("--module"));
}

#[test]
fn test_serve_answers_on_stdout() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("module.json"), MODULE).unwrap();

    let mut child = livetest(&temp_dir)
        .args(["serve", "--module", "module.json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let body = r#"{"jsonrpc":"2.0","id":"1","method":"Widgets_Get","params":{"name":"w1"}}"#;
    {
        let mut stdin = child.stdin.take().unwrap();
        write!(stdin, "Content-Length: {}\r\n\r\n{body}", body.len()).unwrap();
    }

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let (headers, payload) = stdout.split_once("\r\n\r\n").unwrap();
    assert!(headers.starts_with("Content-Length: "));
    assert_eq!(
        payload.trim_end(),
        r#"{"jsonrpc":"2.0","id":"1","result":{"response":{"name":"w1"}}}"#
    );
}
