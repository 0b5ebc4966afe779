//! JSON-lines scripts replayed against an in-memory page.
//!
//! One step per line; blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! {"step":"surface","kind":"host_editor"}
//! {"step":"panel","event":"checkbox_toggled","value":"Be concise.","checked":true}
//! {"step":"type","text":"what is a monad?","append":true}
//! {"step":"host_strip"}
//! {"step":"wait","ms":600}
//! {"step":"show","markup":true}
//! ```
//!
//! Time is virtual: `wait` advances the clock the guard and badge timers see
//! without sleeping. Only the startup delay before the first panel step is
//! real.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use quill_core::{FirstEditable, PanelEvent, PromptSession, SurfaceError};
use quill_dom::{DomError, Document, NodeId};
use quill_types::{HighlightStyle, Language, Settings};

/// Which editable element a `surface` step puts on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceSpec {
    Textarea,
    Input,
    /// A bare `contenteditable` region.
    Editable,
    /// A `contenteditable` region owned by a host editing framework.
    HostEditor,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Put a new surface on the page, removing the previous one.
    Surface { kind: SurfaceSpec },
    Panel {
        #[serde(flatten)]
        event: PanelEvent,
    },
    /// The user edits the surface directly.
    Type {
        text: String,
        #[serde(default)]
        append: bool,
    },
    /// The host editor unwraps every highlight span.
    HostStrip,
    Wait { ms: u64 },
    Highlight { enabled: bool },
    Language { code: String },
    ShowPanel { visible: bool },
    Show {
        #[serde(default)]
        markup: bool,
    },
    Submit,
    Teardown,
}

impl ScriptStep {
    fn name(&self) -> &'static str {
        match self {
            ScriptStep::Surface { .. } => "surface",
            ScriptStep::Panel { .. } => "panel",
            ScriptStep::Type { .. } => "type",
            ScriptStep::HostStrip => "host_strip",
            ScriptStep::Wait { .. } => "wait",
            ScriptStep::Highlight { .. } => "highlight",
            ScriptStep::Language { .. } => "language",
            ScriptStep::ShowPanel { .. } => "show_panel",
            ScriptStep::Show { .. } => "show",
            ScriptStep::Submit => "submit",
            ScriptStep::Teardown => "teardown",
        }
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("`{step}` needs a surface; add a `surface` step first")]
    NoSurface { step: &'static str },
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

pub fn parse_script(input: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ScriptError::Parse {
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// A page, a session, and a virtual clock.
pub struct Runner {
    doc: Document,
    session: PromptSession,
    clock: Instant,
}

impl Runner {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            doc: Document::new(),
            session: PromptSession::new(settings),
            clock: Instant::now(),
        }
    }

    /// Run leading `surface` steps, bootstrap the session, then run the rest.
    pub async fn run(
        &mut self,
        steps: &[ScriptStep],
        out: &mut dyn Write,
    ) -> Result<(), ScriptError> {
        let setup = steps
            .iter()
            .position(|step| !matches!(step, ScriptStep::Surface { .. }))
            .unwrap_or(steps.len());
        let (setup, rest) = steps.split_at(setup);

        for step in setup {
            self.step(step, out)?;
        }
        self.session.bootstrap(&mut self.doc, &FirstEditable).await;
        for step in rest {
            self.step(step, out)?;
        }
        Ok(())
    }

    pub fn step(&mut self, step: &ScriptStep, out: &mut dyn Write) -> Result<(), ScriptError> {
        debug!(step = step.name(), "script step");
        match step {
            ScriptStep::Surface { kind } => self.replace_surface(*kind)?,
            ScriptStep::Panel { event } => {
                let outcome = self.session.handle_panel_event(&mut self.doc, event);
                debug!(written = outcome.is_written(), "panel event applied");
            }
            ScriptStep::Type { text, append } => self.type_text(step.name(), text, *append)?,
            ScriptStep::HostStrip => {
                let surface = self.surface_node(step.name())?;
                for span in self.doc.elements_with_class(surface, HighlightStyle::CLASS) {
                    self.doc.replace_with_children(span)?;
                }
            }
            ScriptStep::Wait { ms } => self.clock += Duration::from_millis(*ms),
            ScriptStep::Highlight { enabled } => {
                self.session.set_highlighting(&mut self.doc, *enabled);
            }
            ScriptStep::Language { code } => self.session.set_language(Language::new(code)),
            ScriptStep::ShowPanel { visible } => self.session.set_panel_visible(*visible),
            ScriptStep::Show { markup } => {
                let text = self.render(step.name(), *markup)?;
                writeln!(out, "{text}")?;
            }
            ScriptStep::Submit => {
                let text = self
                    .session
                    .submission(&mut self.doc)
                    .ok_or(ScriptError::NoSurface { step: step.name() })?;
                writeln!(out, "{text}")?;
            }
            ScriptStep::Teardown => self.session.teardown(&mut self.doc),
        }
        self.settle();
        Ok(())
    }

    /// Deliver pending observer records and advance timers.
    fn settle(&mut self) {
        let now = self.clock;
        let verdict = self.session.deliver_mutations(&mut self.doc, now);
        let watch = self
            .session
            .on_page_mutation(&mut self.doc, &FirstEditable, now);
        self.session.tick(&mut self.doc, now);
        debug!(?verdict, ?watch, "settled");
    }

    fn surface_node(&self, step: &'static str) -> Result<NodeId, ScriptError> {
        self.session
            .surface()
            .map(|s| s.node())
            .ok_or(ScriptError::NoSurface { step })
    }

    fn replace_surface(&mut self, kind: SurfaceSpec) -> Result<(), ScriptError> {
        if let Some(old) = self.session.surface() {
            self.doc.detach(old.node())?;
        }
        let body = self.doc.body();
        let node = match kind {
            SurfaceSpec::Textarea => self.doc.create_element("textarea"),
            SurfaceSpec::Input => self.doc.create_element("input"),
            SurfaceSpec::Editable | SurfaceSpec::HostEditor => {
                let div = self.doc.create_element("div");
                self.doc.set_content_editable(div, true)?;
                if kind == SurfaceSpec::HostEditor
                    && let Some(class) = self.session.settings().host_editor_classes.first()
                {
                    let class = class.clone();
                    self.doc.add_class(div, &class)?;
                }
                div
            }
        };
        self.doc.append_child(body, node)?;
        Ok(())
    }

    fn type_text(&mut self, step: &'static str, text: &str, append: bool) -> Result<(), ScriptError> {
        let descriptor = self
            .session
            .surface()
            .ok_or(ScriptError::NoSurface { step })?;
        let node = descriptor.node();

        if append && descriptor.kind().is_rich() {
            let text_node = self.doc.create_text(text);
            self.doc.append_child(node, text_node)?;
            return Ok(());
        }

        let mut surface = descriptor.bind(&mut self.doc);
        let content = if append {
            format!("{}{text}", surface.content()?)
        } else {
            text.to_string()
        };
        surface.set_content(&content)?;
        Ok(())
    }

    fn render(&mut self, step: &'static str, markup: bool) -> Result<String, ScriptError> {
        let descriptor = self
            .session
            .surface()
            .ok_or(ScriptError::NoSurface { step })?;
        if markup {
            return Ok(self.doc.markup(descriptor.node()));
        }
        Ok(descriptor.bind(&mut self.doc).content()?)
    }
}
