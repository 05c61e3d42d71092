use std::fs;
use std::process::Command;

use confsection::{ConfigStore, Kind, SectionDecl, Value};
use tempfile::TempDir;

fn confsection_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_confsection"));
    cmd.arg("--dir").arg(dir.path());
    cmd.env("NO_COLOR", "1");
    cmd
}

fn server_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("server.ini"),
        "[server]\nport = 8080\ntimeout = nope\nhost = example.com\n\n[client]\nretries = 3\n",
    )
    .unwrap();
    dir
}

// ===========================================
// Library: sections bound to layered files
// ===========================================

#[test]
fn test_local_file_overrides_system_file() {
    let system = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    fs::write(
        system.path().join("app.ini"),
        "[app]\nworkers = 4\nname = system\n",
    )
    .unwrap();
    fs::write(local.path().join("app.ini"), "[app]\nworkers = 8\n").unwrap();

    let store = ConfigStore::new(vec![
        Some(system.path().to_path_buf()),
        None,
        Some(local.path().to_path_buf()),
    ]);
    let app = SectionDecl::new("App")
        .config_file("app.ini")
        .section("app")
        .value("workers", 1)
        .value("name", "default")
        .value("verbose", false)
        .build(&store)
        .unwrap();

    assert_eq!(app.get_as::<i64>("workers").unwrap(), Some(8));
    assert_eq!(app.get_as::<String>("name").unwrap().as_deref(), Some("system"));
    assert_eq!(app.get_as::<bool>("verbose").unwrap(), Some(false));
}

#[test]
fn test_sections_share_one_cached_file() {
    let dir = server_dir();
    let store = ConfigStore::new(vec![dir.path().to_path_buf()]);

    let server = SectionDecl::new("Server")
        .config_file("server.ini")
        .section("server")
        .value("port", 80)
        .build(&store)
        .unwrap();

    // Changes on disk are not seen once the file is cached
    fs::write(dir.path().join("server.ini"), "[client]\nretries = 9\n").unwrap();

    let client = SectionDecl::new("Client")
        .config_file("server.ini")
        .section("client")
        .typed("retries", Kind::Integer, 1)
        .build(&store)
        .unwrap();

    assert_eq!(server.get("port").unwrap(), Some(&Value::Integer(8080)));
    assert_eq!(client.get("retries").unwrap(), Some(&Value::Integer(3)));
    assert_eq!(store.cached(), vec!["server.ini".to_string()]);
}

// ===========================================
// CLI
// ===========================================

#[test]
fn test_show_prints_sections() {
    let dir = server_dir();
    let output = confsection_cmd(&dir)
        .args(["show", "server.ini"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[server]"));
    assert!(stdout.contains("port = 8080"));
    assert!(stdout.contains("[client]"));
}

#[test]
fn test_show_single_section_as_toml() {
    let dir = server_dir();
    let output = confsection_cmd(&dir)
        .args(["show", "server.ini", "client", "--format", "toml"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: toml::Table = toml::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(parsed["client"]["retries"].as_str(), Some("3"));
    assert!(!parsed.contains_key("server"));
}

#[test]
fn test_show_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = confsection_cmd(&dir)
        .args(["show", "absent.ini"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.ini"));
}

#[test]
fn test_show_missing_section_fails() {
    let dir = server_dir();
    let output = confsection_cmd(&dir)
        .args(["show", "server.ini", "database"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_get_typed_value() {
    let dir = server_dir();
    let output = confsection_cmd(&dir)
        .args(["get", "server.ini", "server", "port", "--kind", "int"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "8080");
}

#[test]
fn test_get_invalid_value_prints_default_and_warns() {
    let dir = server_dir();
    let output = confsection_cmd(&dir)
        .args([
            "get",
            "server.ini",
            "server",
            "timeout",
            "--kind",
            "int",
            "--default",
            "30",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "30");
    assert!(String::from_utf8_lossy(&output.stderr).contains("server.timeout=nope"));
}

#[test]
fn test_get_missing_key_prints_default_silently() {
    let dir = server_dir();
    let output = confsection_cmd(&dir)
        .args(["get", "server.ini", "server", "missing", "--default", "none"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "none");
    assert!(!String::from_utf8_lossy(&output.stderr).contains("WARN"));
}

#[test]
fn test_bind_dumps_section() {
    let dir = server_dir();
    let output = confsection_cmd(&dir)
        .args([
            "bind",
            "server.ini",
            "server",
            "--setting",
            "port=int:80",
            "--setting",
            "timeout=int:30",
            "--setting",
            "host=str:localhost",
            "--setting",
            "debug=bool",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "server:\n  debug: None\n  host: example.com\n  port: 8080\n  timeout: 30\n\n"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("ignoring invalid config value").count(), 1);
    assert!(stderr.contains("timeout"));
}

#[test]
fn test_bind_rejects_malformed_setting() {
    let dir = server_dir();
    let output = confsection_cmd(&dir)
        .args(["bind", "server.ini", "server", "--setting", "port"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_bind_bad_declared_default_fails() {
    let dir = server_dir();
    let output = confsection_cmd(&dir)
        .args(["bind", "server.ini", "server", "--setting", "port=int:eighty"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("eighty"));
}
