//! Domain DTOs for the restaurant-directory API.
//!
//! # Design
//! The backend speaks Spanish on the wire (`nombre`, `precio`, ...). These
//! structs keep English field names and pin the wire schema with serde
//! renames, so the row layouts live in exactly one place. They mirror the
//! backend's schema but are defined independently of the mock-server crate;
//! integration tests catch schema drift.

use serde::{Deserialize, Serialize};

/// Affordability category of a restaurant, encoded on the wire as the
/// integers 1 (cheap), 2 (medium) and 3 (expensive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PriceTier {
    Cheap,
    Medium,
    Expensive,
}

impl PriceTier {
    /// The integer the backend stores for this tier.
    pub fn wire(self) -> u8 {
        match self {
            PriceTier::Cheap => 1,
            PriceTier::Medium => 2,
            PriceTier::Expensive => 3,
        }
    }
}

impl From<PriceTier> for u8 {
    fn from(tier: PriceTier) -> Self {
        tier.wire()
    }
}

impl TryFrom<u8> for PriceTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PriceTier::Cheap),
            2 => Ok(PriceTier::Medium),
            3 => Ok(PriceTier::Expensive),
            other => Err(format!("price tier out of range: {other}")),
        }
    }
}

/// A restaurant row returned by the nearby query.
///
/// Read-only projection: the client never constructs or mutates these, it
/// only decodes what the backend sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
    #[serde(rename = "contacto")]
    pub contact: String,
    #[serde(rename = "horario")]
    pub hours: String,
    #[serde(rename = "precio")]
    pub price: PriceTier,
    #[serde(rename = "calificacion")]
    pub rating: i64,
}

/// One comment row: who wrote it and what they wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "nombre")]
    pub author: String,
    #[serde(rename = "comentario")]
    pub text: String,
}
