//! padron-app — registration application state and workflow.
//!
//! Replaces the form's implicit DOM state with an explicit model: a
//! [`Draft`](draft::Draft) for the active entry, an append-only staged
//! roster, and a [`Session`](session::Session) that drives the
//! add-another / submit / flush workflow. The presentation layer talks to
//! the session over channels ([`notify`]); delivery goes through the
//! [`gateway`] seam.

pub mod config;
pub mod draft;
pub mod fields;
pub mod gateway;
pub mod notify;
pub mod person;
pub mod session;

pub use config::Config;
pub use draft::Draft;
pub use fields::{FieldError, FieldId};
pub use gateway::{Gateway, GatewayError, SimulatedGateway};
pub use notify::{ConfirmChoice, ConfirmPrompt, Notice, NoticeKind, UiLink, UiRequest};
pub use person::{IdCard, PersonRecord, ReferenceType};
pub use session::{Session, SubmitOutcome, WorkflowError};
