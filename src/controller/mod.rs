//! View-sync controller.
//!
//! Every player action runs as one blocking chain on the UI thread:
//! dispatch, fetch, render. The server owns the game state; the controller
//! only keeps the view in step with the latest snapshot. Two timed flows
//! exist on top of that chain: the door reveal, which holds the fetched
//! snapshot back until the flip has been shown, and session termination,
//! which shows the closed notice after a short pause. Both are driven by
//! [`Controller::tick`].

#[cfg(test)]
mod test_support;

use std::time::{Duration, Instant};

use crate::client::{ClientError, GameBackend};
use crate::config::Config;
use crate::snapshot::{ActionIndex, ActionReply, Snapshot};
use crate::view::{CardFace, Connection, Controls, Renderer, View};

const REQUEST_FAILED: &str = "请求失败，请检查与服务器的连接";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub reveal_delay: Duration,
    pub close_delay: Duration,
}

impl From<&Config> for Timings {
    fn from(config: &Config) -> Self {
        Timings {
            reveal_delay: config.reveal_delay(),
            close_delay: config.close_delay(),
        }
    }
}

struct PendingReveal {
    snapshot: Snapshot,
    due: Instant,
}

pub struct Controller<B: GameBackend> {
    backend: B,
    view: View,
    renderer: Renderer,
    timings: Timings,
    reveal: Option<PendingReveal>,
    closing_at: Option<Instant>,
}

impl<B: GameBackend> Controller<B> {
    pub fn new(backend: B, timings: Timings) -> Self {
        Controller {
            backend,
            view: View::default(),
            renderer: Renderer::default(),
            timings,
            reveal: None,
            closing_at: None,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// True while a door reveal or the exit countdown is running.
    pub fn is_busy(&self) -> bool {
        self.reveal.is_some() || self.closing_at.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.view.closed
    }

    /// Fetches the current snapshot and renders it. On failure the view
    /// keeps what it showed before.
    pub fn refresh(&mut self) {
        if let Some(snapshot) = self.fetch() {
            self.renderer.render(&mut self.view, &snapshot);
        }
    }

    /// Activates whatever control the current render bound to `index`.
    /// Indices the render did not expose are ignored.
    pub fn activate(&mut self, index: ActionIndex, now: Instant) {
        if self.is_busy() || self.view.closed || !self.view.controls_enabled {
            tracing::debug!(index = index.get(), "input ignored while busy");
            return;
        }
        if !self.view.controls.offers(index) {
            tracing::debug!(index = index.get(), "no control at this index");
            return;
        }
        if matches!(self.view.controls, Controls::Cards(_)) {
            self.select_card(index, now);
        } else {
            self.submit_action(index);
        }
    }

    pub fn activate_focused(&mut self, now: Instant) {
        if let Some(index) = self.view.focused_index() {
            self.activate(index, now);
        }
    }

    pub fn focus_next(&mut self) {
        self.view.focus_next();
    }

    pub fn focus_prev(&mut self) {
        self.view.focus_prev();
    }

    pub fn scroll_log_up(&mut self, lines: usize) {
        self.view.log.scroll_up(lines);
    }

    pub fn scroll_log_down(&mut self, lines: usize) {
        self.view.log.scroll_down(lines);
    }

    /// Sends the chosen index, logs the reply, then re-fetches and renders.
    pub fn submit_action(&mut self, index: ActionIndex) {
        tracing::info!(index = index.get(), "submitting action");
        let reply = self.backend.button_action(index);
        if self.absorb_reply(reply) {
            self.refresh();
        }
    }

    /// Phase one of the door reveal: submit and fetch without rendering,
    /// then flip the chosen card to the glyph of the scene behind it.
    pub fn select_card(&mut self, index: ActionIndex, now: Instant) {
        if self.reveal.is_some() {
            return;
        }
        tracing::info!(door = index.get(), "opening door");
        let reply = self.backend.button_action(index);
        if !self.absorb_reply(reply) {
            return;
        }
        let Some(snapshot) = self.fetch() else {
            return;
        };
        if let Controls::Cards(cards) = &mut self.view.controls {
            if let Some(card) = cards.iter_mut().find(|card| card.index == index) {
                card.face = CardFace::Revealed(snapshot.glyph());
            }
        }
        self.view.controls_enabled = false;
        self.reveal = Some(PendingReveal {
            snapshot,
            due: now + self.timings.reveal_delay,
        });
    }

    pub fn restart_session(&mut self) {
        if self.closing_at.is_some() || self.view.closed {
            return;
        }
        tracing::info!("restarting session");
        let reply = self.backend.start_over();
        // A failed restart leaves a pending reveal to finish on its own.
        if !self.absorb_reply(reply) {
            return;
        }
        self.abandon_reveal();
        self.refresh();
    }

    /// Asks the server to shut down. Once the request succeeds there is no
    /// way back: controls stay disabled and the closed notice follows.
    pub fn terminate_session(&mut self, now: Instant) {
        if self.closing_at.is_some() || self.view.closed {
            return;
        }
        tracing::info!("terminating session");
        let reply = self.backend.exit_game();
        if !self.absorb_reply(reply) {
            return;
        }
        self.reveal = None;
        self.view.controls_enabled = false;
        self.closing_at = Some(now + self.timings.close_delay);
    }

    /// Advances the timed flows. Call between input polls.
    pub fn tick(&mut self, now: Instant) {
        if self.reveal.as_ref().is_some_and(|reveal| now >= reveal.due) {
            if let Some(reveal) = self.reveal.take() {
                self.renderer.render(&mut self.view, &reveal.snapshot);
            }
        }
        if self.closing_at.is_some_and(|at| now >= at) {
            self.closing_at = None;
            self.view.closed = true;
            self.view.controls = Controls::default();
            self.view.controls_enabled = false;
            tracing::info!("session closed");
        }
    }

    // Drops a pending reveal and hands the cards back to the player.
    fn abandon_reveal(&mut self) {
        if self.reveal.take().is_none() {
            return;
        }
        tracing::debug!("door reveal abandoned");
        if let Controls::Cards(cards) = &mut self.view.controls {
            for card in cards.iter_mut() {
                card.face = CardFace::Closed;
            }
        }
        self.view.controls_enabled = true;
    }

    fn fetch(&mut self) -> Option<Snapshot> {
        match self.backend.fetch_state() {
            Ok(snapshot) => {
                self.view.connection = Connection::Connected;
                Some(snapshot)
            }
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    // Logs the reply message; false when the request failed.
    fn absorb_reply(&mut self, reply: Result<ActionReply, ClientError>) -> bool {
        match reply {
            Ok(reply) => {
                self.view.connection = Connection::Connected;
                if let Some(message) = reply.message() {
                    self.view.log.append(message);
                }
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    fn report(&mut self, error: &ClientError) {
        tracing::warn!(error = %error, "request failed");
        self.view.connection = Connection::Disconnected(error.to_string());
        self.view.log.append(REQUEST_FAILED);
    }
}
