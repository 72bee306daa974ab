//! The channel between the workflow and whatever renders it.
//!
//! The session never touches a screen: it sends [`UiRequest`] values over
//! an mpsc channel, and confirmations carry a oneshot reply slot with the
//! user's choice. A presenter that goes away never wedges the workflow —
//! notifications are fire-and-forget and an unanswered confirmation
//! resolves to "keep editing".

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// How long a presenter should keep a notice on screen before
/// auto-dismissing it.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
    Success,
}

/// A transient user-facing message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    /// Auto-dismiss hint for presenters that render overlays.
    pub auto_dismiss: Duration,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self::of(NoticeKind::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::of(NoticeKind::Error, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::of(NoticeKind::Success, text)
    }

    fn of(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            auto_dismiss: NOTICE_TTL,
        }
    }
}

/// The user's answer to a submission confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    KeepEditing,
    Send,
}

/// A two-choice confirmation before flushing staged people.
#[derive(Debug, Clone)]
pub struct ConfirmPrompt {
    pub intro: String,
    pub staged_names: Vec<String>,
    pub question: String,
    pub keep_label: &'static str,
    pub send_label: &'static str,
}

impl ConfirmPrompt {
    /// The prompt shown when submitting with an incomplete active form.
    pub fn for_staged(staged_names: Vec<String>) -> Self {
        Self {
            intro: "Solo se enviarán los datos de las siguientes personas guardadas:".into(),
            staged_names,
            question: "¿Desea continuar con el envío o seguir cargando datos?".into(),
            keep_label: "Continuar cargando",
            send_label: "Enviar datos",
        }
    }
}

/// A request from the workflow to the presentation layer.
#[derive(Debug)]
pub enum UiRequest {
    Notify(Notice),
    Confirm {
        prompt: ConfirmPrompt,
        reply: oneshot::Sender<ConfirmChoice>,
    },
}

/// Workflow-side handle to the presentation channel.
#[derive(Clone)]
pub struct UiLink {
    tx: mpsc::Sender<UiRequest>,
}

impl UiLink {
    /// Create the channel pair: the link for the session, the receiver for
    /// the presenter.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<UiRequest>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Fire-and-forget notification. A missing presenter only logs.
    pub async fn notify(&self, notice: Notice) {
        if self.tx.send(UiRequest::Notify(notice)).await.is_err() {
            tracing::debug!("presenter gone; notice dropped");
        }
    }

    /// Ask the user to confirm. Resolves to `KeepEditing` when the
    /// presenter is gone or drops the prompt unanswered.
    pub async fn confirm(&self, prompt: ConfirmPrompt) -> ConfirmChoice {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = UiRequest::Confirm {
            prompt,
            reply: reply_tx,
        };
        if self.tx.send(request).await.is_err() {
            tracing::debug!("presenter gone; confirmation defaults to keep editing");
            return ConfirmChoice::KeepEditing;
        }
        reply_rx.await.unwrap_or(ConfirmChoice::KeepEditing)
    }
}
