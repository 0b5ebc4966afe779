//! Host editors that normalize away highlight spans get them back, without
//! the guard reacting to its own writes or running more often than allowed.

use std::time::{Duration, Instant};

use quill_core::{GuardPhase, GuardVerdict};
use quill_dom::Document;
use quill_types::{HighlightStyle, Tone};

use crate::common::{host_editor, ready_session, span_texts, strip_spans};

#[test]
fn stripped_spans_are_restored_with_their_tones() {
    let mut doc = Document::new();
    let editor = host_editor(&mut doc);
    let typed = doc.create_text("hello");
    doc.append_child(editor, typed).unwrap();
    let mut session = ready_session(&mut doc, editor);

    session.set_checkbox(&mut doc, "concise", "Be concise.", true);
    session.set_dropdown(&mut doc, "tone", Some("Be formal."));
    assert_eq!(session.guard().fragments(), ["Be formal.", "Be concise."]);

    let t0 = Instant::now();
    assert_eq!(strip_spans(&mut doc, editor), 2);
    assert_eq!(
        session.deliver_mutations(&mut doc, t0),
        GuardVerdict::Restyled { wrapped: 2 }
    );

    assert_eq!(span_texts(&doc, editor), ["Be formal.", "Be concise."]);
    let spans = doc.elements_with_class(editor, HighlightStyle::CLASS);
    let first = doc.element(spans[0]).unwrap();
    let second = doc.element(spans[1]).unwrap();
    assert!(first.has_class(Tone::Even.class_name()));
    assert!(second.has_class(Tone::Odd.class_name()));
    assert_eq!(doc.rendered_text(editor), "Be formal.\n\nBe concise.\n\nhello");
}

#[test]
fn restoration_is_throttled_and_non_reentrant() {
    let mut doc = Document::new();
    let editor = host_editor(&mut doc);
    let mut session = ready_session(&mut doc, editor);
    session.set_checkbox(&mut doc, "concise", "Be concise.", true);

    let t0 = Instant::now();
    strip_spans(&mut doc, editor);
    assert_eq!(
        session.deliver_mutations(&mut doc, t0),
        GuardVerdict::Restyled { wrapped: 1 }
    );
    assert!(matches!(
        session.guard().phase(t0),
        GuardPhase::Applying { .. }
    ));

    // Records produced by the pass itself arrive inside the release window.
    assert_eq!(
        session.deliver_mutations(&mut doc, t0 + Duration::from_millis(5)),
        GuardVerdict::IgnoredApplying
    );
    assert_eq!(
        session.guard().phase(t0 + Duration::from_millis(100)),
        GuardPhase::Idle
    );

    // A second strip too soon after the last pass is left alone.
    strip_spans(&mut doc, editor);
    assert_eq!(
        session.deliver_mutations(&mut doc, t0 + Duration::from_millis(200)),
        GuardVerdict::Throttled
    );
    assert!(span_texts(&doc, editor).is_empty());

    // The next edit after the throttle window restores it.
    let more = doc.create_text(" more");
    doc.append_child(editor, more).unwrap();
    assert_eq!(
        session.deliver_mutations(&mut doc, t0 + Duration::from_millis(600)),
        GuardVerdict::Restyled { wrapped: 1 }
    );
    assert_eq!(span_texts(&doc, editor), ["Be concise."]);
}

#[test]
fn edits_that_keep_spans_are_ignored() {
    let mut doc = Document::new();
    let editor = host_editor(&mut doc);
    let mut session = ready_session(&mut doc, editor);
    session.set_checkbox(&mut doc, "concise", "Be concise.", true);

    let typed = doc.create_text("question");
    doc.append_child(editor, typed).unwrap();
    assert_eq!(
        session.deliver_mutations(&mut doc, Instant::now()),
        GuardVerdict::NothingToRestore
    );
}

#[test]
fn deselecting_everything_disarms_the_guard() {
    let mut doc = Document::new();
    let editor = host_editor(&mut doc);
    let mut session = ready_session(&mut doc, editor);
    session.set_checkbox(&mut doc, "concise", "Be concise.", true);
    assert!(session.guard().is_armed());

    session.set_checkbox(&mut doc, "concise", "Be concise.", false);
    assert!(!session.guard().is_armed());
    assert_eq!(
        session.deliver_mutations(&mut doc, Instant::now()),
        GuardVerdict::Disarmed
    );
}
