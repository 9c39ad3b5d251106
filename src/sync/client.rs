//! Client state machine
//!
//! ```text
//!                 apply_client             apply_client
//!  Synchronized ───────────────▶ Awaiting ──────────────▶ AwaitingWithBuffer
//!       ▲                        Confirm ◀────────────────────────┘
//!       └──────── server_ack ───────┘          server_ack
//! ```
//!
//! Every entry point runs to completion and returns the [`ClientEvent`] it
//! produced, if any; the owner forwards it to the transport or the editor.

use crate::error::{Result, SyncError};
use crate::ot::TextOperation;
use std::fmt;

/// Synchronization state with respect to the server
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ClientState {
    /// No pending operation
    #[default]
    Synchronized,

    /// `outstanding` was sent and is waiting for an acknowledgement
    AwaitingConfirm { outstanding: TextOperation },

    /// As AwaitingConfirm, with local edits buffered in `buffer`
    AwaitingWithBuffer {
        outstanding: TextOperation,
        buffer: TextOperation,
    },
}

impl ClientState {
    pub fn outstanding(&self) -> Option<&TextOperation> {
        match self {
            ClientState::Synchronized => None,
            ClientState::AwaitingConfirm { outstanding }
            | ClientState::AwaitingWithBuffer { outstanding, .. } => Some(outstanding),
        }
    }

    pub fn buffer(&self) -> Option<&TextOperation> {
        match self {
            ClientState::AwaitingWithBuffer { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientState::Synchronized => "Synchronized",
            ClientState::AwaitingConfirm { .. } => "AwaitingConfirm",
            ClientState::AwaitingWithBuffer { .. } => "AwaitingWithBuffer",
        }
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Work the owner of a [`Client`] has to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Transmit the operation to the server
    SendOperation(TextOperation),

    /// Apply the (transformed) server operation to the local document
    ApplyOperation(TextOperation),
}

/// OT client: one outstanding operation plus an optional local buffer
#[derive(Debug, Clone, Default)]
pub struct Client {
    state: ClientState,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn is_synchronized(&self) -> bool {
        matches!(self.state, ClientState::Synchronized)
    }

    pub fn is_awaiting_confirm(&self) -> bool {
        matches!(self.state, ClientState::AwaitingConfirm { .. })
    }

    pub fn is_awaiting_with_buffer(&self) -> bool {
        matches!(self.state, ClientState::AwaitingWithBuffer { .. })
    }

    /// A local edit was made (already applied to the local document)
    pub fn apply_client(&mut self, operation: TextOperation) -> Result<Option<ClientEvent>> {
        let (next, event) = match &self.state {
            ClientState::Synchronized => (
                ClientState::AwaitingConfirm {
                    outstanding: operation.clone(),
                },
                Some(ClientEvent::SendOperation(operation)),
            ),
            ClientState::AwaitingConfirm { outstanding } => (
                ClientState::AwaitingWithBuffer {
                    outstanding: outstanding.clone(),
                    buffer: operation,
                },
                None,
            ),
            ClientState::AwaitingWithBuffer {
                outstanding,
                buffer,
            } => (
                ClientState::AwaitingWithBuffer {
                    outstanding: outstanding.clone(),
                    buffer: buffer.compose(&operation)?,
                },
                None,
            ),
        };

        self.transition("apply_client", next);
        Ok(event)
    }

    /// An operation from another client arrived through the server
    pub fn apply_server(&mut self, operation: TextOperation) -> Result<Option<ClientEvent>> {
        let (next, apply) = match &self.state {
            ClientState::Synchronized => (ClientState::Synchronized, operation),
            ClientState::AwaitingConfirm { outstanding } => {
                //                 /\
                //   outstanding  /  \ operation
                //               /    \
                //               \    /
                //   operation'   \  / outstanding'
                //                 \/
                let (outstanding, operation) = TextOperation::transform(outstanding, &operation)?;
                (ClientState::AwaitingConfirm { outstanding }, operation)
            }
            ClientState::AwaitingWithBuffer {
                outstanding,
                buffer,
            } => {
                // Through outstanding first, then through the buffer
                let (outstanding, operation) = TextOperation::transform(outstanding, &operation)?;
                let (buffer, operation) = TextOperation::transform(buffer, &operation)?;
                (
                    ClientState::AwaitingWithBuffer {
                        outstanding,
                        buffer,
                    },
                    operation,
                )
            }
        };

        tracing::trace!("apply_server: applying {}", apply);
        self.transition("apply_server", next);
        Ok(Some(ClientEvent::ApplyOperation(apply)))
    }

    /// The server acknowledged the outstanding operation
    pub fn server_ack(&mut self) -> Result<Option<ClientEvent>> {
        let (next, event) = match &self.state {
            ClientState::Synchronized => return Err(no_pending_operation()),
            ClientState::AwaitingConfirm { .. } => (ClientState::Synchronized, None),
            ClientState::AwaitingWithBuffer { buffer, .. } => (
                ClientState::AwaitingConfirm {
                    outstanding: buffer.clone(),
                },
                Some(ClientEvent::SendOperation(buffer.clone())),
            ),
        };

        self.transition("server_ack", next);
        Ok(event)
    }

    /// The server rejected the outstanding operation; send it again as is.
    ///
    /// A buffer, if any, stays buffered until the next acknowledgement.
    pub fn server_retry(&mut self) -> Result<Option<ClientEvent>> {
        let outstanding = self.state.outstanding().ok_or_else(no_pending_operation)?;

        tracing::debug!("server_retry: resending outstanding operation in {}", self.state);
        Ok(Some(ClientEvent::SendOperation(outstanding.clone())))
    }

    fn transition(&mut self, trigger: &str, next: ClientState) {
        if self.state.name() != next.name() {
            tracing::debug!("{}: {} -> {}", trigger, self.state, next);
        }
        self.state = next;
    }
}

fn no_pending_operation() -> SyncError {
    SyncError::InvalidState("There is no pending operation.".to_string())
}
