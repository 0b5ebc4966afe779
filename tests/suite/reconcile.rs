//! End-to-end composition through a session: user text survives every
//! selection change, fragments keep their canonical order, and rich surfaces
//! get one highlight span per active fragment.

use quill_core::{PanelEvent, ReconcileOutcome, SkipReason};
use quill_dom::Document;
use quill_types::SourceKind;

use crate::common::{editable, ready_session, span_texts, textarea, value};

#[test]
fn user_text_survives_selection_changes() {
    let mut doc = Document::new();
    let area = textarea(&mut doc);
    doc.set_value(area, "hello").unwrap();
    let mut session = ready_session(&mut doc, area);

    session.set_checkbox(&mut doc, "concise", "Be concise.", true);
    assert_eq!(value(&doc, area), "Be concise.\n\nhello");

    // The user keeps typing below the fragments.
    doc.set_value(area, "Be concise.\n\nhello world").unwrap();
    session.set_dropdown(&mut doc, "tone", Some("Be formal."));
    assert_eq!(
        value(&doc, area),
        "Be formal.\n\nBe concise.\n\nhello world"
    );

    session.set_checkbox(&mut doc, "concise", "Be concise.", false);
    assert_eq!(value(&doc, area), "Be formal.\n\nhello world");

    session.set_dropdown(&mut doc, "tone", None);
    assert_eq!(value(&doc, area), "hello world");
    assert!(session.history().active().next().is_none());
}

#[test]
fn kinds_compose_in_fixed_order_regardless_of_event_order() {
    let mut doc = Document::new();
    let area = textarea(&mut doc);
    let mut session = ready_session(&mut doc, area);

    session.set_category_prompt(&mut doc, "Writing", Some("Draft an outline."));
    session.set_input(&mut doc, "audience", Some("Write for beginners."));
    session.set_checkbox(&mut doc, "steps", "Think step by step.", true);
    session.set_dropdown(&mut doc, "tone", Some("Be friendly."));

    assert_eq!(
        value(&doc, area),
        "Be friendly.\n\nThink step by step.\n\nWrite for beginners.\n\nDraft an outline."
    );
    assert_eq!(session.active_count(SourceKind::Dropdown), 1);
    assert_eq!(session.active_count(SourceKind::Category), 1);
}

#[test]
fn reconciling_twice_changes_nothing() {
    let mut doc = Document::new();
    let area = textarea(&mut doc);
    doc.set_value(area, "draft").unwrap();
    let mut session = ready_session(&mut doc, area);

    session.set_checkbox(&mut doc, "a", "Cite sources.", true);
    let first = value(&doc, area);
    session.reconcile(&mut doc);
    session.reconcile(&mut doc);
    assert_eq!(value(&doc, area), first);
}

#[test]
fn replacing_a_dropdown_value_removes_the_old_text() {
    let mut doc = Document::new();
    let area = textarea(&mut doc);
    let mut session = ready_session(&mut doc, area);

    session.set_dropdown(&mut doc, "tone", Some("Be formal."));
    session.set_dropdown(&mut doc, "tone", Some("Be casual."));
    assert_eq!(value(&doc, area), "Be casual.");
    assert!(session.history().contains("Be formal."));
    assert!(!session.history().is_active("Be formal."));
}

#[test]
fn panel_event_json_drives_a_session() {
    let mut doc = Document::new();
    let area = textarea(&mut doc);
    let mut session = ready_session(&mut doc, area);

    let event: PanelEvent = serde_json::from_str(
        r#"{"event":"input_changed","id":"lang","value":"Rust","template":{"before":"Answer with ","after":" code."}}"#,
    )
    .unwrap();
    session.handle_panel_event(&mut doc, &event);
    assert_eq!(value(&doc, area), "Answer with Rust code.");

    let cleared: PanelEvent = serde_json::from_str(
        r#"{"event":"input_changed","id":"lang","value":"  ","template":{"before":"Answer with ","after":" code."}}"#,
    )
    .unwrap();
    session.handle_panel_event(&mut doc, &cleared);
    assert_eq!(value(&doc, area), "");
}

#[test]
fn rich_surface_gets_alternating_spans() {
    let mut doc = Document::new();
    let region = editable(&mut doc);
    let typed = doc.create_text("hello");
    doc.append_child(region, typed).unwrap();
    let mut session = ready_session(&mut doc, region);

    session.set_checkbox(&mut doc, "a", "Be concise.", true);
    session.set_dropdown(&mut doc, "tone", Some("Be formal."));

    assert_eq!(span_texts(&doc, region), ["Be formal.", "Be concise."]);
    assert_eq!(
        doc.rendered_text(region),
        "Be formal.\n\nBe concise.\n\nhello"
    );
    // Plain editable regions are not guarded.
    assert!(!session.guard().is_armed());

    session.set_highlighting(&mut doc, false);
    assert!(span_texts(&doc, region).is_empty());
    assert_eq!(
        doc.rendered_text(region),
        "Be formal.\n\nBe concise.\n\nhello"
    );
}

#[test]
fn detached_surface_is_skipped_not_fatal() {
    let mut doc = Document::new();
    let area = textarea(&mut doc);
    let mut session = ready_session(&mut doc, area);
    doc.detach(area).unwrap();

    let outcome = session.set_checkbox(&mut doc, "a", "Be concise.", true);
    assert!(matches!(
        outcome,
        ReconcileOutcome::Skipped(SkipReason::ReadFailed(_))
    ));
    // Selection state is still recorded for the next surface.
    assert_eq!(session.selections().len(), 1);
}
