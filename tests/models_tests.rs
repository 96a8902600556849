// Wire shape of GET /api/status and presence record helpers

mod common;

use chrono::NaiveDate;
use common::{device, two_pc_response};
use pc_monitor::models::*;

#[test]
fn test_status_response_parses_documented_wire_shape() {
    let json = r#"{
        "stats": {"total": 2, "online": 1, "offline": 1},
        "computers": [
            {"name": "PC1", "is_online": true, "last_seen": "2024-01-15T10:30:00Z"},
            {"name": "PC2", "is_online": false, "last_seen": "2024-01-14T09:00:00Z"}
        ]
    }"#;
    let parsed: StatusResponse = serde_json::from_str(json).unwrap();
    assert_eq!(parsed, two_pc_response());
}

#[test]
fn test_status_response_ignores_unknown_fields() {
    let json = r#"{
        "stats": {"total": 1, "online": 0, "offline": 1},
        "computers": [
            {"name": "PC1", "is_online": false, "last_seen": "2024-01-15T10:30:00", "status": "offline", "extra": 1}
        ],
        "server_time": "now"
    }"#;
    let parsed: StatusResponse = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.computers[0].status.as_deref(), Some("offline"));
}

#[test]
fn test_status_response_serializes_snake_case() {
    let json = serde_json::to_string(&two_pc_response()).unwrap();
    assert!(json.contains("\"is_online\":true"));
    assert!(json.contains("\"last_seen\""));
    assert!(!json.contains("\"status\""));
}

#[test]
fn test_status_response_rejects_missing_stats() {
    let json = r#"{"computers": []}"#;
    assert!(serde_json::from_str::<StatusResponse>(json).is_err());
}

#[test]
fn test_stats_from_devices_keeps_invariant() {
    let devices = vec![
        device("a", true, ""),
        device("b", false, ""),
        device("c", true, ""),
    ];
    let stats = Stats::from_devices(&devices);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.online, 2);
    assert_eq!(stats.offline, 1);
    assert_eq!(Stats::from_devices(&[]), Stats::default());
}

#[test]
fn test_device_from_record_uses_given_online_flag() {
    let record = ComputerRecord {
        name: "PC1".into(),
        last_seen: NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_micro_opt(10, 30, 0, 123456)
            .unwrap(),
        status: PresenceStatus::Online,
    };
    let d = Device::from_record(&record, false);
    assert!(!d.is_online);
    assert_eq!(d.last_seen, "2024-01-15T10:30:00.123456");
    assert_eq!(d.status.as_deref(), Some("online"));
}

#[test]
fn test_timestamp_roundtrip_and_short_form() {
    let ts = NaiveDate::from_ymd_opt(2024, 1, 14)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    assert_eq!(format_timestamp(&ts), "2024-01-14T09:00:00.000000");
    assert_eq!(parse_timestamp(&format_timestamp(&ts)), Some(ts));
    assert_eq!(parse_timestamp("2024-01-14T09:00:00"), Some(ts));
    assert_eq!(parse_timestamp("yesterday"), None);
}

#[test]
fn test_presence_status_from_db() {
    assert_eq!(PresenceStatus::from_db("online"), PresenceStatus::Online);
    assert_eq!(PresenceStatus::from_db("ONLINE"), PresenceStatus::Online);
    assert_eq!(PresenceStatus::from_db("offline"), PresenceStatus::Offline);
    assert_eq!(PresenceStatus::from_db(""), PresenceStatus::Offline);
}
