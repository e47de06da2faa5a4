use std::fmt;

use log::{info, warn};

/// Lifecycle of a transport channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Failed(String),
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Closed and Failed are final
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed(_))
    }

    fn can_become(&self, next: &ConnectionState) -> bool {
        match (self, next) {
            (ConnectionState::Connecting, ConnectionState::Open) => true,
            (ConnectionState::Connecting, ConnectionState::Closed) => true,
            (ConnectionState::Open, ConnectionState::Closed) => true,
            (current, ConnectionState::Failed(_)) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closed => write!(f, "closed"),
            ConnectionState::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// Called with the new state after every transition. Listeners run while
/// the transport is locked and must not call back into it.
pub type StateListener = Box<dyn FnMut(&ConnectionState) + Send>;

/// Current [`ConnectionState`] plus the listeners observing it. Only valid
/// transitions are applied: `Connecting -> Open`, `Connecting | Open ->
/// Closed` and any non-final state to `Failed`.
pub struct ConnectionStatus {
    state: ConnectionState,
    listeners: Vec<StateListener>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: StateListener) {
        self.listeners.push(listener);
    }

    /// Moves to `next` and notifies listeners. Returns false, leaving the
    /// state untouched, if the transition isn't allowed.
    pub fn transition(&mut self, next: ConnectionState) -> bool {
        if !self.state.can_become(&next) {
            warn!(
                "Ignoring connection transition from {} to {}",
                self.state, next
            );
            return false;
        }

        info!("Connection {} -> {}", self.state, next);
        self.state = next;
        for listener in self.listeners.iter_mut() {
            listener(&self.state);
        }
        true
    }
}

impl fmt::Debug for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStatus")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
