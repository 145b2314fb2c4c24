use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a small, fast config
fn minimal_config(port: u16) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[simulator]
catalog_size = 20
list_delay_ms = 0
"#,
        port
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Spawn the simulator and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_vidwarn-server"))
        .env("VIDWARN_CONFIG", config_path)
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_health_endpoint() {
    let port = get_available_port();
    let config = write_config(&minimal_config(port));

    let mut server = spawn_server(config.path()).await;
    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_serves_seeded_catalog() {
    let port = get_available_port();
    let config = write_config(&minimal_config(port));

    let mut server = spawn_server(config.path()).await;
    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let ids: Vec<String> = client
        .get(format!("http://127.0.0.1:{}/videos?n=50", port))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(ids.len(), 20);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_vidwarn-server"))
            .env("VIDWARN_CONFIG", "/nonexistent/config.toml")
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_zero_capacity_profile_exits_with_error() {
    let config = write_config(
        r#"
[server]
port = 8080

[simulator.metadata]
capacity = 0
base_delay_ms = 200
degradation_factor_ms = 100
degradation_cap = 10
"#,
    );

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_vidwarn-server"))
            .env("VIDWARN_CONFIG", config.path())
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_sync_fails_without_a_service() {
    let port = get_available_port();
    let config = write_config(&format!(
        r#"
[client]
base_url = "http://127.0.0.1:{}"
timeout_secs = 2
"#,
        port
    ));

    let result = timeout(
        Duration::from_secs(10),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_vidwarn-sync"))
            .env("VIDWARN_CONFIG", config.path())
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_sync_labels_a_running_simulator() {
    let port = get_available_port();
    let server_config = write_config(&format!(
        r#"
[server]
host = "127.0.0.1"
port = {port}

[simulator]
catalog_size = 15
list_delay_ms = 0

[simulator.metadata]
capacity = 10
base_delay_ms = 5
degradation_factor_ms = 1
degradation_cap = 10

[simulator.transcript]
capacity = 20
base_delay_ms = 5
degradation_factor_ms = 1
degradation_cap = 10

[simulator.update]
capacity = 50
base_delay_ms = 1
degradation_factor_ms = 0
degradation_cap = 10
"#
    ));
    let mut server = spawn_server(server_config.path()).await;
    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let sync_config = write_config(&format!(
        r#"
[client]
base_url = "http://127.0.0.1:{port}"

[batch]
size = 15
policy = "fail_soft"

[classifier]
work_rounds = 1
work_bytes = 1024
"#
    ));
    let result = timeout(
        Duration::from_secs(30),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_vidwarn-sync"))
            .env("VIDWARN_CONFIG", sync_config.path())
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(
        result.status.success(),
        "sync failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    server.kill().await.ok();
}
