use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace};
use smol::channel::{self, Receiver, Sender};

use super::{
    connection_status::{ConnectionState, ConnectionStatus, StateListener},
    error::TransportError,
    link_conditioner::LinkConditioner,
    RecvFuture, Transport,
};

/// In-memory [`Transport`] connecting two endpoints in one process. Both
/// endpoints share one lifecycle: closing or failing either side ends the
/// link for both.
pub struct LocalTransport {
    sender: Sender<Box<[u8]>>,
    receiver: Receiver<Box<[u8]>>,
    status: Arc<Mutex<ConnectionStatus>>,
    conditioner: Mutex<Option<LinkConditioner>>,
}

impl LocalTransport {
    /// Creates two connected, already open endpoints. The conditioner, if
    /// any, applies to each direction independently.
    pub fn pair(conditioner: Option<LinkConditioner>) -> (Self, Self) {
        let (first, second) = Self::connecting_pair(conditioner);
        first.open();
        (first, second)
    }

    /// Like [`LocalTransport::pair`], but the link stays `Connecting` until
    /// [`LocalTransport::open`] is called
    pub fn connecting_pair(conditioner: Option<LinkConditioner>) -> (Self, Self) {
        let (first_sender, second_receiver) = channel::unbounded();
        let (second_sender, first_receiver) = channel::unbounded();
        let status = Arc::new(Mutex::new(ConnectionStatus::new()));
        let reverse_conditioner = conditioner.clone();

        let first = Self {
            sender: first_sender,
            receiver: first_receiver,
            status: status.clone(),
            conditioner: Mutex::new(conditioner),
        };
        let second = Self {
            sender: second_sender,
            receiver: second_receiver,
            status,
            conditioner: Mutex::new(reverse_conditioner),
        };
        (first, second)
    }

    /// Completes the handshake. Returns false if the link isn't connecting.
    pub fn open(&self) -> bool {
        self.status().transition(ConnectionState::Open)
    }

    /// Marks the link failed and wakes any pending receive
    pub fn fail(&self, reason: impl Into<String>) {
        self.status()
            .transition(ConnectionState::Failed(reason.into()));
        self.shutdown_channels();
    }

    fn status(&self) -> MutexGuard<'_, ConnectionStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn closed_error(&self) -> Option<TransportError> {
        match self.status().state() {
            ConnectionState::Closed => Some(TransportError::Closed),
            ConnectionState::Failed(reason) => Some(TransportError::Failed {
                reason: reason.clone(),
            }),
            ConnectionState::Connecting | ConnectionState::Open => None,
        }
    }

    fn shutdown_channels(&self) {
        self.sender.close();
        self.receiver.close();
    }
}

impl Transport for LocalTransport {
    fn state(&self) -> ConnectionState {
        self.status().state().clone()
    }

    fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        if !self.status().state().is_open() {
            return Err(TransportError::NotOpen);
        }

        let dropped = self
            .conditioner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
            .is_some_and(LinkConditioner::should_drop);
        if dropped {
            trace!("Link conditioner dropped {} bytes", payload.len());
            return Ok(());
        }

        self.sender
            .try_send(payload.into())
            .map_err(|_| TransportError::SendFailed { len: payload.len() })
    }

    fn try_recv(&self) -> Option<Box<[u8]>> {
        if self.status().state().is_terminal() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    fn recv(&self) -> RecvFuture<'_> {
        Box::pin(async move {
            if let Some(error) = self.closed_error() {
                return Err(error);
            }
            match self.receiver.recv().await {
                Ok(payload) => Ok(payload),
                Err(_) => Err(self.closed_error().unwrap_or(TransportError::Closed)),
            }
        })
    }

    fn close(&self) {
        if self.status().transition(ConnectionState::Closed) {
            debug!("Local transport closed");
        }
        self.shutdown_channels();
    }

    fn on_state_change(&self, listener: StateListener) {
        self.status().subscribe(listener);
    }
}
