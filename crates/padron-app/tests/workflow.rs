//! End-to-end workflow scenarios: staging, confirmation, flush, retry.

use image::{Rgb, RgbImage};
use padron_app::gateway::{Gateway, GatewayError, WireBatch};
use padron_app::{
    ConfirmChoice, Notice, NoticeKind, ReferenceType, Session, SimulatedGateway, SubmitOutcome,
    UiLink, UiRequest, WorkflowError,
};
use padron_core::{DetectError, FaceBox, FaceFinder, PhotoValidator, ValidatedPhoto};
use std::time::Duration;
use tokio::sync::mpsc;

/// Mint an accepted photo through the real validator with a stub finder.
fn accepted_photo() -> ValidatedPhoto {
    struct OneFrontalFace;
    impl FaceFinder for OneFrontalFace {
        fn find_faces(&mut self, _photo: &RgbImage) -> Result<Vec<FaceBox>, DetectError> {
            Ok(vec![FaceBox {
                x: 150.0,
                y: 100.0,
                width: 100.0,
                height: 120.0,
                confidence: 0.95,
                landmarks: Some([
                    (175.0, 140.0),
                    (225.0, 140.0),
                    (200.0, 170.0),
                    (180.0, 195.0),
                    (220.0, 195.0),
                ]),
            }])
        }
    }
    PhotoValidator::new(OneFrontalFace)
        .validate(RgbImage::from_pixel(400, 300, Rgb([200, 200, 200])))
        .expect("stub photo should be accepted")
}

/// A gateway that always refuses delivery.
struct FailingGateway;

impl Gateway for FailingGateway {
    async fn deliver(&self, _batch: WireBatch) -> Result<(), GatewayError> {
        Err(GatewayError::Delivery("placeholder endpoint said no".into()))
    }
}

/// Drain the UI channel, answering every confirmation with `choice`.
/// Resolves once the session (and with it the sender) is dropped.
async fn run_presenter(
    mut rx: mpsc::Receiver<UiRequest>,
    choice: ConfirmChoice,
) -> (Vec<Notice>, usize) {
    let mut notices = Vec::new();
    let mut confirms = 0;
    while let Some(request) = rx.recv().await {
        match request {
            UiRequest::Notify(notice) => notices.push(notice),
            UiRequest::Confirm { reply, .. } => {
                confirms += 1;
                let _ = reply.send(choice);
            }
        }
    }
    (notices, confirms)
}

fn fill_person(session: &mut Session<impl Gateway>, last: &str, first: &str) {
    let draft = session.draft_mut();
    draft.last_name = last.into();
    draft.first_name = first.into();
    draft.document_id = "30123456".into();
    draft.phone = "1155550101".into();
    draft.unit = "4B".into();
    draft.reference = Some(ReferenceType::Owner);
    draft.attach_photo(accepted_photo());
}

fn instant_session(link: UiLink) -> Session<SimulatedGateway> {
    Session::new(link, SimulatedGateway::new(Duration::ZERO))
}

#[tokio::test]
async fn add_another_rejects_an_incomplete_draft() {
    let (link, rx) = UiLink::channel(32);
    let presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::KeepEditing));
    let mut session = instant_session(link);

    // Entirely empty draft.
    assert_eq!(
        session.add_another().await,
        Err(WorkflowError::IncompleteDraft)
    );

    // Personal fields valid but no photo.
    fill_person(&mut session, "Doe", "John");
    session.draft_mut().take_photo();
    assert_eq!(
        session.add_another().await,
        Err(WorkflowError::IncompleteDraft)
    );
    assert!(session.staged().is_empty());

    drop(session);
    let (notices, confirms) = presenter.await.unwrap();
    assert_eq!(confirms, 0);
    assert_eq!(notices.len(), 2);
    assert!(notices
        .iter()
        .all(|n| n.kind == NoticeKind::Error && n.text.contains("campos personales")));
}

#[tokio::test]
async fn add_another_keeps_property_values_and_clears_the_person() {
    let (link, rx) = UiLink::channel(32);
    let _presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::KeepEditing));
    let mut session = instant_session(link);

    fill_person(&mut session, "Doe", "John");
    session.add_another().await.unwrap();

    assert_eq!(session.staged().len(), 1);
    assert_eq!(session.staged()[0].display_name(), "Doe, John");

    let draft = session.draft();
    assert!(draft.last_name.is_empty());
    assert!(draft.first_name.is_empty());
    assert!(!draft.has_photo());
    assert_eq!(draft.unit, "4B");
    assert_eq!(draft.reference, Some(ReferenceType::Owner));
}

#[tokio::test]
async fn submit_with_incomplete_draft_confirms_then_sends_staged_people() {
    let (link, rx) = UiLink::channel(32);
    let presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::Send));
    let mut session = instant_session(link);

    fill_person(&mut session, "Doe", "John");
    session.add_another().await.unwrap();
    assert!(session.can_submit());

    let SubmitOutcome::Delivered(cards) = session.submit().await else {
        panic!("expected delivery after confirming");
    };
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "Doe, John");
    assert!(session.staged().is_empty());

    drop(session);
    let (notices, confirms) = presenter.await.unwrap();
    assert_eq!(confirms, 1);
    assert!(notices
        .iter()
        .any(|n| n.kind == NoticeKind::Success && n.text == "IDs generados correctamente"));
}

#[tokio::test]
async fn choosing_keep_editing_aborts_and_keeps_the_roster() {
    let (link, rx) = UiLink::channel(32);
    let presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::KeepEditing));
    let mut session = instant_session(link);

    fill_person(&mut session, "Doe", "John");
    session.add_another().await.unwrap();

    assert!(matches!(session.submit().await, SubmitOutcome::Aborted));
    assert_eq!(session.staged().len(), 1);

    drop(session);
    let (_, confirms) = presenter.await.unwrap();
    assert_eq!(confirms, 1);
}

#[tokio::test]
async fn valid_draft_submits_directly_without_confirmation() {
    let (link, rx) = UiLink::channel(32);
    let presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::KeepEditing));
    let mut session = instant_session(link);

    fill_person(&mut session, "Doe", "John");
    assert!(session.can_submit());

    let SubmitOutcome::Delivered(cards) = session.submit().await else {
        panic!("expected a direct flush");
    };
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "Doe, John");
    assert_eq!(cards[0].unit_line(), "Unidad: 4B - propietario");

    // Form cleared, property values restored from the cacheless default:
    // nothing was staged, so the reset falls back to an empty form.
    assert!(session.draft().last_name.is_empty());
    assert!(!session.draft().has_photo());

    drop(session);
    let (_, confirms) = presenter.await.unwrap();
    assert_eq!(confirms, 0, "a valid draft must not prompt");
}

#[tokio::test]
async fn flush_emits_cards_newest_first() {
    let (link, rx) = UiLink::channel(32);
    let _presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::Send));
    let mut session = instant_session(link);

    fill_person(&mut session, "Ayala", "Ana");
    session.add_another().await.unwrap();
    fill_person(&mut session, "Benitez", "Bruno");
    session.add_another().await.unwrap();
    fill_person(&mut session, "Castro", "Clara");

    let SubmitOutcome::Delivered(cards) = session.submit().await else {
        panic!("expected delivery");
    };
    let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Castro, Clara", "Benitez, Bruno", "Ayala, Ana"]);
}

#[tokio::test]
async fn gateway_failure_keeps_the_roster_for_retry() {
    let (link, rx) = UiLink::channel(32);
    let presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::Send));
    let mut session = Session::new(link, FailingGateway);

    fill_person(&mut session, "Doe", "John");
    session.add_another().await.unwrap();

    assert!(matches!(session.submit().await, SubmitOutcome::Failed));
    assert_eq!(session.staged().len(), 1, "failed delivery must not clear");

    drop(session);
    let (notices, _) = presenter.await.unwrap();
    assert!(notices
        .iter()
        .any(|n| n.kind == NoticeKind::Error
            && n.text == "Error al generar los IDs. Intente nuevamente."));
}

#[tokio::test]
async fn flush_restores_cached_property_values() {
    let (link, rx) = UiLink::channel(32);
    let _presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::Send));
    let mut session = instant_session(link);

    fill_person(&mut session, "Doe", "John");
    session.add_another().await.unwrap();

    let SubmitOutcome::Delivered(_) = session.submit().await else {
        panic!("expected delivery");
    };
    // The next entry starts with the same property values.
    assert_eq!(session.draft().unit, "4B");
    assert_eq!(session.draft().reference, Some(ReferenceType::Owner));
}

#[tokio::test]
async fn submit_with_nothing_to_send_aborts_with_an_error() {
    let (link, rx) = UiLink::channel(32);
    let presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::Send));
    let mut session = instant_session(link);

    assert!(!session.can_submit());
    assert!(matches!(session.submit().await, SubmitOutcome::Aborted));

    drop(session);
    let (notices, confirms) = presenter.await.unwrap();
    assert_eq!(confirms, 0);
    assert!(notices.iter().any(|n| n.kind == NoticeKind::Error));
}

#[tokio::test]
async fn reset_clears_roster_and_restores_property_values() {
    let (link, rx) = UiLink::channel(32);
    let _presenter = tokio::spawn(run_presenter(rx, ConfirmChoice::KeepEditing));
    let mut session = instant_session(link);

    fill_person(&mut session, "Doe", "John");
    session.add_another().await.unwrap();
    fill_person(&mut session, "Roe", "Jane");

    session.reset();
    assert!(session.staged().is_empty());
    assert!(session.draft().last_name.is_empty());
    assert_eq!(session.draft().unit, "4B");
    assert!(!session.can_submit());
}
