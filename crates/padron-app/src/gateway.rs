//! The backend submission seam.
//!
//! There is no finalized backend: the wire types carry the assumed JSON
//! shape, and [`SimulatedGateway`] stands in for the round trip until a
//! real endpoint exists.

use crate::person::PersonRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// One person as the assumed endpoint would receive it.
#[derive(Debug, Clone, Serialize)]
pub struct WirePerson {
    pub apellido: String,
    pub nombre: String,
    pub documento: String,
    pub telefono: String,
    pub unidad: String,
    pub referencia: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    /// Open integration point: photo upload is not part of the assumed
    /// contract yet, so the field travels empty.
    pub foto_url: String,
}

impl From<&PersonRecord> for WirePerson {
    fn from(record: &PersonRecord) -> Self {
        Self {
            apellido: record.last_name.clone(),
            nombre: record.first_name.clone(),
            documento: record.document_id.clone(),
            telefono: record.phone.clone(),
            unidad: record.unit.clone(),
            referencia: record.reference.map(|r| r.as_str().to_string()),
            fecha_inicio: record.lease.map(|l| l.start),
            fecha_fin: record.lease.map(|l| l.end),
            foto_url: String::new(),
        }
    }
}

/// The full submission: staged people plus the active entry when valid.
#[derive(Debug, Clone, Serialize, Default)]
pub struct WireBatch {
    pub personas: Vec<WirePerson>,
}

/// Delivery seam. The session is generic over this so tests can fail on
/// demand and a future HTTP client can slot in unchanged.
pub trait Gateway {
    fn deliver(&self, batch: WireBatch)
        -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// Stand-in gateway: waits out a fixed latency, then succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    latency: Duration,
}

impl SimulatedGateway {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Gateway for SimulatedGateway {
    async fn deliver(&self, batch: WireBatch) -> Result<(), GatewayError> {
        tracing::info!(people = batch.personas.len(), "simulated submission");
        tokio::time::sleep(self.latency).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn simulated_gateway_waits_and_succeeds() {
        let gateway = SimulatedGateway::new(Duration::from_millis(1000));
        let before = tokio::time::Instant::now();
        gateway.deliver(WireBatch::default()).await.unwrap();
        assert!(before.elapsed() >= Duration::from_millis(1000));
    }

    #[test]
    fn wire_person_serializes_with_form_field_names() {
        let person = WirePerson {
            apellido: "Doe".into(),
            nombre: "John".into(),
            documento: "30123456".into(),
            telefono: "1155550101".into(),
            unidad: "4B".into(),
            referencia: Some("inquilino".into()),
            fecha_inicio: NaiveDate::from_ymd_opt(2026, 1, 1),
            fecha_fin: NaiveDate::from_ymd_opt(2026, 12, 31),
            foto_url: String::new(),
        };
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(json["apellido"], "Doe");
        assert_eq!(json["referencia"], "inquilino");
        assert_eq!(json["fecha_inicio"], "2026-01-01");
        assert_eq!(json["foto_url"], "");
    }
}
