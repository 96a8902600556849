// Builds the /api/status payload: persisted computers joined with live connections.

use crate::computer_repo::ComputerRepo;
use crate::models::{Device, StatusResponse};
use crate::registry::ConnectionRegistry;

/// `is_online` comes from the live registry, not the stored status, so a
/// server restart shows every machine offline until it reconnects.
pub async fn collect_status(
    repo: &ComputerRepo,
    registry: &ConnectionRegistry,
) -> anyhow::Result<StatusResponse> {
    let records = repo.get_all().await?;
    let mut devices = Vec::with_capacity(records.len());
    for record in &records {
        let online = registry.is_online(&record.name).await;
        devices.push(Device::from_record(record, online));
    }
    Ok(StatusResponse::from_devices(devices))
}
