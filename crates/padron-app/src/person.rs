use chrono::NaiveDate;
use padron_core::ValidatedPhoto;
use serde::{Deserialize, Serialize};

/// How the person relates to the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceType {
    #[serde(rename = "propietario")]
    Owner,
    #[serde(rename = "familiar")]
    Family,
    #[serde(rename = "inquilino")]
    Tenant,
    #[serde(rename = "inquilino-temporal")]
    TemporaryTenant,
    #[serde(rename = "visita")]
    Visitor,
}

impl ReferenceType {
    /// Tenancy references need a lease period; the rest do not.
    pub fn requires_lease_dates(&self) -> bool {
        matches!(self, ReferenceType::Tenant | ReferenceType::TemporaryTenant)
    }

    /// The wire/display value ("propietario", "inquilino-temporal", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Owner => "propietario",
            ReferenceType::Family => "familiar",
            ReferenceType::Tenant => "inquilino",
            ReferenceType::TemporaryTenant => "inquilino-temporal",
            ReferenceType::Visitor => "visita",
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lease period for tenancy references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeasePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One person's registration, immutable once staged.
///
/// Holding a [`ValidatedPhoto`] is the invariant: a record cannot exist
/// without a photo that passed the acceptance checks.
#[derive(Debug, Clone)]
pub struct PersonRecord {
    pub last_name: String,
    pub first_name: String,
    pub document_id: String,
    pub phone: String,
    pub unit: String,
    pub reference: Option<ReferenceType>,
    pub lease: Option<LeasePeriod>,
    pub photo: ValidatedPhoto,
}

impl PersonRecord {
    /// "Apellido, Nombre" as shown on cards and staged summaries.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    pub fn id_card(&self) -> IdCard {
        IdCard {
            name: self.display_name(),
            unit: self.unit.clone(),
            reference: self.reference,
            photo: self.photo.clone(),
        }
    }
}

/// A rendered identification card. Presentation-only: it shares the photo
/// buffer with its record, and dropping the card releases that share.
#[derive(Debug, Clone)]
pub struct IdCard {
    pub name: String,
    pub unit: String,
    pub reference: Option<ReferenceType>,
    pub photo: ValidatedPhoto,
}

impl IdCard {
    /// The card's subtitle line, e.g. "Unidad: 4B - inquilino".
    pub fn unit_line(&self) -> String {
        match self.reference {
            Some(reference) => format!("Unidad: {} - {}", self.unit, reference),
            None => format!("Unidad: {}", self.unit),
        }
    }
}
