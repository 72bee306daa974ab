//! The staging/submission workflow.
//!
//! A [`Session`] owns the active [`Draft`], the append-only roster of
//! staged people, and the cache of property values. Its operations mirror
//! the form's buttons: add another, submit (confirm-or-flush), clear.

use crate::draft::{Draft, PropertyValues};
use crate::gateway::{Gateway, WireBatch, WirePerson};
use crate::notify::{ConfirmChoice, ConfirmPrompt, Notice, UiLink};
use crate::person::{IdCard, PersonRecord};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Por favor complete todos los campos personales requeridos y agregue una foto")]
    IncompleteDraft,
}

/// Result of a submit attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The user chose to keep editing, or there was nothing to send.
    Aborted,
    /// Delivery failed; the roster is kept so the user can retry.
    Failed,
    /// Cards generated, newest first; roster and form cleared.
    Delivered(Vec<IdCard>),
}

pub struct Session<G> {
    draft: Draft,
    staged: Vec<PersonRecord>,
    cached_property: Option<PropertyValues>,
    ui: UiLink,
    gateway: G,
}

impl<G: Gateway> Session<G> {
    pub fn new(ui: UiLink, gateway: G) -> Self {
        Self {
            draft: Draft::default(),
            staged: Vec::new(),
            cached_property: None,
            ui,
            gateway,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn staged(&self) -> &[PersonRecord] {
        &self.staged
    }

    /// Submission is possible with staged people, or with a fully valid
    /// active form carrying a validated photo.
    pub fn can_submit(&self) -> bool {
        !self.staged.is_empty() || self.draft_ready()
    }

    fn draft_ready(&self) -> bool {
        self.draft.is_valid() && self.draft.has_photo()
    }

    /// Stage the active entry and clear the personal fields for the next
    /// person. Property values are cached for restoration after a reset.
    pub async fn add_another(&mut self) -> Result<(), WorkflowError> {
        if !self.draft.personal_valid() || !self.draft.has_photo() {
            let err = WorkflowError::IncompleteDraft;
            self.ui.notify(Notice::error(err.to_string())).await;
            return Err(err);
        }

        // personal_valid + has_photo hold, so freeze cannot fail
        let Some(record) = self.draft.freeze() else {
            return Err(WorkflowError::IncompleteDraft);
        };

        self.ui
            .notify(Notice::success(format!(
                "{} {} ha sido agregado correctamente",
                record.first_name, record.last_name
            )))
            .await;
        tracing::info!(person = %record.display_name(), staged = self.staged.len() + 1, "person staged");

        self.cached_property = Some(self.draft.property_values());
        self.staged.push(record);
        self.draft.clear_personal();
        Ok(())
    }

    /// The submit button: flush directly when the active form is valid;
    /// otherwise, with staged people, ask before sending without it.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.can_submit() {
            self.ui
                .notify(Notice::error(WorkflowError::IncompleteDraft.to_string()))
                .await;
            return SubmitOutcome::Aborted;
        }

        if !self.draft_ready() {
            let names = self
                .staged
                .iter()
                .map(PersonRecord::display_name)
                .collect();
            match self.ui.confirm(ConfirmPrompt::for_staged(names)).await {
                ConfirmChoice::KeepEditing => return SubmitOutcome::Aborted,
                ConfirmChoice::Send => {}
            }
        }

        self.flush().await
    }

    /// Deliver everything, then turn it into cards: the active entry first
    /// (newest), then staged people in reverse staging order.
    pub async fn flush(&mut self) -> SubmitOutcome {
        let active = self.draft_ready().then(|| self.draft.freeze()).flatten();

        let mut batch = WireBatch::default();
        if let Some(record) = &active {
            batch.personas.push(WirePerson::from(record));
        }
        batch
            .personas
            .extend(self.staged.iter().rev().map(WirePerson::from));

        if let Err(err) = self.gateway.deliver(batch).await {
            tracing::warn!(error = %err, "submission failed");
            self.ui
                .notify(Notice::error(
                    "Error al generar los IDs. Intente nuevamente.",
                ))
                .await;
            return SubmitOutcome::Failed;
        }

        let mut cards: Vec<IdCard> = Vec::with_capacity(self.staged.len() + 1);
        if let Some(record) = &active {
            cards.push(record.id_card());
        }
        cards.extend(self.staged.iter().rev().map(PersonRecord::id_card));

        self.ui
            .notify(Notice::success("IDs generados correctamente"))
            .await;
        tracing::info!(cards = cards.len(), "cards generated");

        self.staged.clear();
        self.draft.reset(self.cached_property.as_ref());

        SubmitOutcome::Delivered(cards)
    }

    /// The clear button: drop everything, restore cached property values.
    pub fn reset(&mut self) {
        self.staged.clear();
        self.draft.reset(self.cached_property.as_ref());
    }
}
