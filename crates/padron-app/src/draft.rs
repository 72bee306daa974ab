//! The active registration form.

use crate::fields::{self, FieldError, FieldId};
use crate::person::{LeasePeriod, PersonRecord, ReferenceType};
use chrono::NaiveDate;
use padron_core::ValidatedPhoto;

/// Property-level values cached when a person is staged, restored after a
/// full reset so the next entry keeps the same unit/reference/dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyValues {
    pub unit: String,
    pub reference: Option<ReferenceType>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
}

/// The form being edited: raw values plus the validated photo, if any.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub last_name: String,
    pub first_name: String,
    pub document_id: String,
    pub phone: String,
    pub unit: String,
    pub reference: Option<ReferenceType>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    photo: Option<ValidatedPhoto>,
}

impl Draft {
    /// Current error for one field, if any.
    pub fn field_error(&self, id: FieldId) -> Option<FieldError> {
        match id {
            FieldId::LastName => fields::validate_text(id, &self.last_name).err(),
            FieldId::FirstName => fields::validate_text(id, &self.first_name).err(),
            FieldId::DocumentId => fields::validate_text(id, &self.document_id).err(),
            FieldId::Phone => fields::validate_text(id, &self.phone).err(),
            FieldId::Unit => fields::validate_text(id, &self.unit).err(),
            FieldId::Reference => self.reference.is_none().then_some(FieldError::Missing),
            FieldId::LeaseStart => {
                (self.lease_dates_required() && self.lease_start.is_none())
                    .then_some(FieldError::Missing)
            }
            FieldId::LeaseEnd => {
                (self.lease_dates_required() && self.lease_end.is_none())
                    .then_some(FieldError::Missing)
            }
        }
    }

    /// Lease dates become required when the reference is a tenancy,
    /// mirroring the date inputs the form shows and hides.
    pub fn lease_dates_required(&self) -> bool {
        self.reference
            .map(|r| r.requires_lease_dates())
            .unwrap_or(false)
    }

    /// The four personal fields are valid. Gates "add another".
    pub fn personal_valid(&self) -> bool {
        FieldId::PERSONAL
            .iter()
            .all(|&id| self.field_error(id).is_none())
    }

    /// Every field is valid, including conditionally required lease dates.
    /// Photo presence is tracked separately.
    pub fn is_valid(&self) -> bool {
        FieldId::ALL.iter().all(|&id| self.field_error(id).is_none())
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    /// Attach an accepted photo, replacing any previous one.
    pub fn attach_photo(&mut self, photo: ValidatedPhoto) {
        self.photo = Some(photo);
    }

    pub fn take_photo(&mut self) -> Option<ValidatedPhoto> {
        self.photo.take()
    }

    /// Snapshot of the property-level values for later restoration.
    pub fn property_values(&self) -> PropertyValues {
        PropertyValues {
            unit: self.unit.clone(),
            reference: self.reference,
            lease_start: self.lease_start,
            lease_end: self.lease_end,
        }
    }

    /// Freeze the draft into an immutable record. Returns `None` without a
    /// photo: a record may not exist unvalidated.
    pub fn freeze(&self) -> Option<PersonRecord> {
        let photo = self.photo.clone()?;
        let lease = match (self.lease_start, self.lease_end) {
            (Some(start), Some(end)) => Some(LeasePeriod { start, end }),
            _ => None,
        };
        Some(PersonRecord {
            last_name: self.last_name.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            document_id: self.document_id.trim().to_string(),
            phone: self.phone.trim().to_string(),
            unit: self.unit.trim().to_string(),
            reference: self.reference,
            lease,
            photo,
        })
    }

    /// Clear the personal fields and photo, keeping property values.
    /// This is what "add another" leaves behind.
    pub fn clear_personal(&mut self) {
        self.last_name.clear();
        self.first_name.clear();
        self.document_id.clear();
        self.phone.clear();
        self.photo = None;
    }

    /// Full reset, then restore cached property values if given.
    pub fn reset(&mut self, cached: Option<&PropertyValues>) {
        *self = Draft::default();
        if let Some(values) = cached {
            self.unit = values.unit.clone();
            self.reference = values.reference;
            self.lease_start = values.lease_start;
            self.lease_end = values.lease_end;
        }
    }
}
