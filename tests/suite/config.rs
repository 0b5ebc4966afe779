//! Settings loaded from a config file flow into session behavior.

use std::fs;
use std::time::{Duration, Instant};

use quill_config::QuillConfig;
use quill_core::GuardVerdict;
use quill_dom::Document;
use quill_types::{HighlightStyle, Settings, Tone};
use tempfile::tempdir;

use crate::common::{editable, host_editor, ready_session_with, span_texts, strip_spans};

fn settings_from(toml: &str) -> Settings {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, toml).unwrap();
    QuillConfig::load_from(&path).unwrap().unwrap().resolve()
}

#[test]
fn custom_host_editor_class_enables_the_guard() {
    let settings = settings_from(
        r#"
[surface]
host_editor_classes = ["cm-content"]
"#,
    );

    let mut doc = Document::new();
    let region = editable(&mut doc);
    doc.add_class(region, "cm-content").unwrap();
    let mut session = ready_session_with(&mut doc, region, settings.clone());
    session.set_checkbox(&mut doc, "a", "Be concise.", true);
    assert!(session.guard().is_armed());

    // The default class is no longer treated as host managed.
    let mut doc = Document::new();
    let prose = host_editor(&mut doc);
    let mut session = ready_session_with(&mut doc, prose, settings);
    session.set_checkbox(&mut doc, "a", "Be concise.", true);
    assert!(!session.guard().is_armed());
}

#[test]
fn highlight_colors_and_disable_switch_apply() {
    let settings = settings_from(
        r##"
[highlight]
even_color = "#111111"
odd_color = "#222222"
bold = false
"##,
    );
    let mut doc = Document::new();
    let region = editable(&mut doc);
    let mut session = ready_session_with(&mut doc, region, settings);
    session.set_checkbox(&mut doc, "a", "Be concise.", true);

    let span = doc.elements_with_class(region, HighlightStyle::CLASS)[0];
    let el = doc.element(span).unwrap();
    assert!(el.has_class(Tone::Even.class_name()));
    assert_eq!(el.style("color"), Some("#111111"));
    assert_eq!(el.style("font-weight"), None);

    let settings = settings_from("[highlight]\nenabled = false\n");
    let mut doc = Document::new();
    let region = editable(&mut doc);
    let mut session = ready_session_with(&mut doc, region, settings);
    session.set_checkbox(&mut doc, "a", "Be concise.", true);
    assert!(span_texts(&doc, region).is_empty());
    assert_eq!(doc.rendered_text(region), "Be concise.");
}

#[test]
fn guard_throttle_comes_from_config() {
    let settings = settings_from("[timing]\nguard_throttle_ms = 50\nguard_release_ms = 10\n");
    assert_eq!(settings.timings.guard_throttle, Duration::from_millis(50));

    let mut doc = Document::new();
    let editor = host_editor(&mut doc);
    let mut session = ready_session_with(&mut doc, editor, settings);
    session.set_checkbox(&mut doc, "a", "Be concise.", true);

    let t0 = Instant::now();
    strip_spans(&mut doc, editor);
    assert_eq!(
        session.deliver_mutations(&mut doc, t0),
        GuardVerdict::Restyled { wrapped: 1 }
    );
    session.deliver_mutations(&mut doc, t0 + Duration::from_millis(5));

    strip_spans(&mut doc, editor);
    assert_eq!(
        session.deliver_mutations(&mut doc, t0 + Duration::from_millis(60)),
        GuardVerdict::Restyled { wrapped: 1 }
    );
}
