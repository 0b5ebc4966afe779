//! Final text handed to the host when the user submits.

use quill_types::Language;

/// Trim `surface_text` and, when the panel is visible and the chosen language
/// is not English, ask for answers in that language.
#[must_use]
pub fn compose_submission(surface_text: &str, panel_visible: bool, language: &Language) -> String {
    let text = surface_text.trim();
    if panel_visible && !language.is_english() {
        format!(
            "{text}\n\nAnswer in {} all the time.",
            language.display_name()
        )
    } else {
        text.to_string()
    }
}
