// Shared test helpers

#![allow(dead_code)]

use pc_monitor::computer_repo::ComputerRepo;
use pc_monitor::config::AppConfig;
use pc_monitor::models::{Device, Stats, StatusResponse};
use tempfile::TempDir;

pub const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[database]
path = "data/test.db"
max_pool_size = 2
"#;

pub fn test_app_config() -> AppConfig {
    AppConfig::load_from_str(TEST_CONFIG).unwrap()
}

/// Repo on a fresh database file; keep the TempDir alive for the test's duration.
pub async fn temp_repo() -> (TempDir, ComputerRepo) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("computers.db");
    let repo = ComputerRepo::connect(path.to_str().unwrap(), 2).await.unwrap();
    repo.init().await.unwrap();
    (dir, repo)
}

pub fn device(name: &str, is_online: bool, last_seen: &str) -> Device {
    Device {
        name: name.into(),
        is_online,
        last_seen: last_seen.into(),
        status: None,
    }
}

/// Two machines, one online: the canonical PC1/PC2 example.
pub fn two_pc_response() -> StatusResponse {
    StatusResponse {
        stats: Stats {
            total: 2,
            online: 1,
            offline: 1,
        },
        computers: vec![
            device("PC1", true, "2024-01-15T10:30:00Z"),
            device("PC2", false, "2024-01-14T09:00:00Z"),
        ],
    }
}
