//! Session lifecycle against a page that changes underneath it: delayed
//! editors, navigation to a new surface, detection giving up, teardown.

use std::time::{Duration, Instant};

use quill_core::{
    DETECTED_CLASS, ElementById, FirstEditable, PromptSession, ReconcileOutcome, SkipReason,
    SurfaceKind, WatchOutcome,
};
use quill_dom::Document;
use quill_types::{Language, Settings};
use tokio::time;

use crate::common::{host_editor, ready_session, ready_session_with, textarea, value};

#[tokio::test(start_paused = true)]
async fn editor_mounted_after_startup_is_picked_up() {
    let mut doc = Document::new();
    let mut session = PromptSession::new(Settings::default());
    assert!(session.bootstrap(&mut doc, &FirstEditable).await.is_none());

    let editor = host_editor(&mut doc);
    let now = time::Instant::now().into_std();
    assert_eq!(
        session.on_page_mutation(&mut doc, &FirstEditable, now),
        WatchOutcome::Found(editor)
    );
    let surface = session.surface().unwrap();
    assert_eq!(surface.kind(), SurfaceKind::Rich { host_managed: true });
    assert!(doc.element(editor).unwrap().has_class(DETECTED_CLASS));

    session.set_checkbox(&mut doc, "concise", "Be concise.", true);
    assert!(session.guard().is_armed());
}

#[tokio::test(start_paused = true)]
async fn selections_before_startup_finishes_are_applied_afterwards() {
    let mut doc = Document::new();
    let area = textarea(&mut doc);
    let mut session = PromptSession::new(Settings::default());

    assert_eq!(
        session.set_checkbox(&mut doc, "concise", "Be concise.", true),
        ReconcileOutcome::Skipped(SkipReason::Initializing)
    );
    session.bootstrap(&mut doc, &FirstEditable).await;
    assert_eq!(value(&doc, area), "");

    assert!(session.reconcile(&mut doc).is_written());
    assert_eq!(value(&doc, area), "Be concise.");
}

#[test]
fn navigation_to_a_new_surface_starts_fresh() {
    let mut doc = Document::new();
    let first = textarea(&mut doc);
    let mut session = ready_session(&mut doc, first);
    session.watch(&mut doc);
    session.set_dropdown(&mut doc, "tone", Some("Be formal."));

    doc.detach(first).unwrap();
    let second = textarea(&mut doc);
    doc.set_value(second, "fresh").unwrap();
    assert_eq!(
        session.on_page_mutation(&mut doc, &FirstEditable, Instant::now()),
        WatchOutcome::Found(second)
    );

    session.set_checkbox(&mut doc, "concise", "Be concise.", true);
    assert_eq!(value(&doc, second), "Be concise.\n\nfresh");
}

#[test]
fn detection_gives_up_after_bounded_attempts() {
    let mut doc = Document::new();
    let mut session = PromptSession::new(Settings::default());
    session.finish_initializing();
    session.watch(&mut doc);

    let max = session.settings().timings.detection_max_attempts;
    for attempt in 1..max {
        let noise = doc.create_element("div");
        doc.append_child(doc.body(), noise).unwrap();
        assert_eq!(
            session.on_page_mutation(&mut doc, &FirstEditable, Instant::now()),
            WatchOutcome::Searching { attempt, max }
        );
    }
    let noise = doc.create_element("div");
    doc.append_child(doc.body(), noise).unwrap();
    assert_eq!(
        session.on_page_mutation(&mut doc, &FirstEditable, Instant::now()),
        WatchOutcome::Exhausted
    );
    assert!(!session.is_watching());

    // A surface appearing afterwards is no longer noticed.
    textarea(&mut doc);
    assert_eq!(
        session.on_page_mutation(&mut doc, &FirstEditable, Instant::now()),
        WatchOutcome::Stopped
    );
}

#[test]
fn locator_by_id_ignores_other_editables() {
    let mut doc = Document::new();
    let mut session = PromptSession::new(Settings::default());
    session.watch(&mut doc);

    textarea(&mut doc);
    let locator = ElementById("prompt".to_string());
    assert!(matches!(
        session.on_page_mutation(&mut doc, &locator, Instant::now()),
        WatchOutcome::Searching { .. }
    ));

    let target = textarea(&mut doc);
    doc.set_id(target, "prompt").unwrap();
    assert_eq!(
        session.on_page_mutation(&mut doc, &locator, Instant::now()),
        WatchOutcome::Found(target)
    );
}

#[test]
fn badge_expires_through_tick() {
    let mut doc = Document::new();
    let area = textarea(&mut doc);
    let mut session = PromptSession::new(Settings::default());
    let t0 = Instant::now();
    session.attach(&mut doc, area, t0).unwrap();

    session.tick(&mut doc, t0 + Duration::from_millis(500));
    assert!(doc.element(area).unwrap().has_class(DETECTED_CLASS));
    session.tick(&mut doc, t0 + Duration::from_secs(3));
    assert!(!doc.element(area).unwrap().has_class(DETECTED_CLASS));
}

#[test]
fn submission_respects_panel_visibility_and_language() {
    let mut doc = Document::new();
    let area = textarea(&mut doc);
    let settings = Settings {
        auto_open: true,
        ..Settings::default()
    };
    let mut session = ready_session_with(&mut doc, area, settings);
    assert!(session.panel_visible());

    doc.set_value(area, "  What is a monad?  ").unwrap();
    session.set_language(Language::new("es"));
    assert_eq!(
        session.submission(&mut doc).as_deref(),
        Some("What is a monad?\n\nAnswer in Spain all the time.")
    );

    session.set_panel_visible(false);
    assert_eq!(
        session.submission(&mut doc).as_deref(),
        Some("What is a monad?")
    );
}

#[test]
fn teardown_releases_the_page() {
    let mut doc = Document::new();
    let editor = host_editor(&mut doc);
    let mut session = ready_session(&mut doc, editor);
    session.watch(&mut doc);
    session.set_checkbox(&mut doc, "concise", "Be concise.", true);

    session.teardown(&mut doc);
    assert!(session.surface().is_none());
    assert!(!session.guard().is_armed());
    assert!(!session.is_watching());
    assert_eq!(
        session.reconcile(&mut doc),
        ReconcileOutcome::Skipped(SkipReason::NoSurface)
    );
}
