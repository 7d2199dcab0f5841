//! Markup for the current [`AppState`].
//!
//! [`Renderer::render`] is a pure function of the state. [`spawn_render_loop`]
//! re-renders after every published state event and exposes the latest
//! frame on a watch channel.

pub mod view;

use std::sync::Arc;

use handlebars::{handlebars_helper, Handlebars};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use trainlog_core::util::exercise_colour;

use crate::error::{ClientError, ClientResult};
use crate::state::{AppState, AppStore};

use self::view::AppView;

const APP_TEMPLATE: &str = "app";

const PARTIALS: &[(&str, &str)] = &[
    ("login", include_str!("../../templates/login.hbs")),
    ("calendar", include_str!("../../templates/calendar.hbs")),
    ("records", include_str!("../../templates/records.hbs")),
    ("memos", include_str!("../../templates/memos.hbs")),
    ("students", include_str!("../../templates/students.hbs")),
];

handlebars_helper!(colour: |name: str| exercise_colour(name));

/// Compiled templates. Output is HTML-escaped.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> ClientResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_helper("colour", Box::new(colour));
        registry
            .register_template_string(APP_TEMPLATE, include_str!("../../templates/app.hbs"))
            .map_err(|e| ClientError::Render(e.to_string()))?;
        for (name, source) in PARTIALS {
            registry
                .register_partial(name, *source)
                .map_err(|e| ClientError::Render(format!("{name}: {e}")))?;
        }
        Ok(Self { registry })
    }

    pub fn render(&self, state: &AppState) -> ClientResult<String> {
        self.registry
            .render(APP_TEMPLATE, &AppView::from_state(state))
            .map_err(|e| ClientError::Render(e.to_string()))
    }
}

/// Render the whole application for `state`.
pub fn render_app(state: &AppState) -> ClientResult<String> {
    Renderer::new()?.render(state)
}

/// The latest rendered markup and the state revision it reflects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub revision: u64,
    pub html: String,
}

/// Render now, then again after every state event, until the store is
/// dropped.
pub fn spawn_render_loop(
    state: Arc<AppStore>,
    renderer: Arc<Renderer>,
) -> (watch::Receiver<Frame>, JoinHandle<()>) {
    let mut events = state.subscribe();
    let (tx, rx) = watch::channel(Frame::default());

    let handle = tokio::spawn(async move {
        loop {
            let revision = state.revision();
            let snapshot = state.snapshot().await;
            match renderer.render(&snapshot) {
                Ok(html) => {
                    if tx.send(Frame { revision, html }).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(revision, error = %e, "Render failed"),
            }

            match events.recv().await {
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Render loop lagged, rendering latest state");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
            // Fold any events already queued into this render.
            while let Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) = events.try_recv() {}
        }
    });
    (rx, handle)
}
