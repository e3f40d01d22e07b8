use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use reqwest::StatusCode;

use crate::client::{ClientError, GameBackend};
use crate::snapshot::{ActionIndex, ActionReply, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    FetchState,
    Button(usize),
    StartOver,
    ExitGame,
}

// Scripted backend for controller tests. Snapshots are served in order and
// the last one repeats; every call is recorded.
pub(crate) struct FakeBackend {
    states: RefCell<VecDeque<Snapshot>>,
    reply: Option<String>,
    calls: RefCell<Vec<Call>>,
    fail_fetch: Cell<bool>,
    fail_action: Cell<bool>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        FakeBackend {
            states: RefCell::new(VecDeque::new()),
            reply: None,
            calls: RefCell::new(Vec::new()),
            fail_fetch: Cell::new(false),
            fail_action: Cell::new(false),
        }
    }

    pub(crate) fn with_states(self, states: impl IntoIterator<Item = Snapshot>) -> Self {
        self.states.borrow_mut().extend(states);
        self
    }

    pub(crate) fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub(crate) fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.set(fail);
    }

    pub(crate) fn fail_actions(&self, fail: bool) {
        self.fail_action.set(fail);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn unavailable() -> ClientError {
        ClientError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn action(&self, call: Call) -> Result<ActionReply, ClientError> {
        self.calls.borrow_mut().push(call);
        if self.fail_action.get() {
            return Err(Self::unavailable());
        }
        Ok(ActionReply {
            log: self.reply.clone(),
            msg: None,
        })
    }
}

impl GameBackend for FakeBackend {
    fn fetch_state(&self) -> Result<Snapshot, ClientError> {
        self.calls.borrow_mut().push(Call::FetchState);
        if self.fail_fetch.get() {
            return Err(Self::unavailable());
        }
        let mut states = self.states.borrow_mut();
        let snapshot = if states.len() > 1 {
            states.pop_front()
        } else {
            states.front().cloned()
        };
        snapshot.ok_or_else(Self::unavailable)
    }

    fn button_action(&self, index: ActionIndex) -> Result<ActionReply, ClientError> {
        self.action(Call::Button(index.get()))
    }

    fn start_over(&self) -> Result<ActionReply, ClientError> {
        self.action(Call::StartOver)
    }

    fn exit_game(&self) -> Result<ActionReply, ClientError> {
        self.action(Call::ExitGame)
    }
}
