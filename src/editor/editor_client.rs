//! EditorClient: wires an editor and a database to the OT client
//!
//! - local changes go to the undo history and to [`Client::apply_client`]
//! - remote operations go through [`Client::apply_server`] into the editor,
//!   and rebase the undo history
//! - acknowledgements advance the client and republish the cursor
//!
//! Nothing here runs on its own: the embedder feeds adapter events in and
//! calls [`poll_timers`](EditorClient::poll_timers) when
//! [`next_deadline`](EditorClient::next_deadline) passes.

use super::adapter::{DatabaseAdapter, DatabaseEvent, EditorAdapter, EditorEvent, ErrorState};
use super::emitter::{Event, EventEmitter, ListenerId};
use super::remote_client::RemoteClients;
use super::timer::Timer;
use crate::config::EditorClientConfig;
use crate::error::{Result, SyncError};
use crate::ot::{Cursor, OperationMeta, TextOperation, WrappedOperation};
use crate::sync::{Client, ClientEvent};
use crate::undo::UndoManager;
use std::time::Instant;

/// Events emitted to the embedding application
#[derive(Debug, Clone, PartialEq)]
pub enum EditorClientEvent {
    /// Debounced; carries whether nothing is outstanding
    Synced(bool),

    /// An undo was applied; carries the operation's JSON
    Undo(String),

    /// A redo was applied; carries the operation's JSON
    Redo(String),

    /// An adapter reported a failure
    Error {
        error: String,
        operation: String,
        state: ErrorState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorClientEventKind {
    Synced,
    Undo,
    Redo,
    Error,
}

impl Event for EditorClientEvent {
    type Kind = EditorClientEventKind;

    fn kind(&self) -> EditorClientEventKind {
        match self {
            EditorClientEvent::Synced(_) => EditorClientEventKind::Synced,
            EditorClientEvent::Undo(_) => EditorClientEventKind::Undo,
            EditorClientEvent::Redo(_) => EditorClientEventKind::Redo,
            EditorClientEvent::Error { .. } => EditorClientEventKind::Error,
        }
    }
}

pub struct EditorClient<D, E> {
    database: D,
    editor: E,
    client: Client,
    undo_manager: UndoManager,
    remote_clients: RemoteClients,
    emitter: EventEmitter<EditorClientEvent>,
    cursor: Option<Cursor>,
    focused: bool,
    synced_timer: Timer<()>,
    cursor_timer: Timer<Option<Cursor>>,
    config: EditorClientConfig,
    disposed: bool,
}

impl<D: DatabaseAdapter, E: EditorAdapter> EditorClient<D, E> {
    pub fn new(database: D, editor: E) -> Self {
        Self::build(database, editor, EditorClientConfig::default(), UndoManager::default())
    }

    pub fn with_config(database: D, editor: E, config: EditorClientConfig) -> Result<Self> {
        let undo_manager = UndoManager::new(config.max_undo_depth)?;
        Ok(Self::build(database, editor, config, undo_manager))
    }

    fn build(database: D, editor: E, config: EditorClientConfig, undo_manager: UndoManager) -> Self {
        Self {
            database,
            editor,
            client: Client::new(),
            undo_manager,
            remote_clients: RemoteClients::new(),
            emitter: EventEmitter::new(),
            cursor: None,
            focused: false,
            synced_timer: Timer::new(),
            cursor_timer: Timer::new(),
            config,
            disposed: false,
        }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    pub fn database_mut(&mut self) -> &mut D {
        &mut self.database
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn undo_manager(&self) -> &UndoManager {
        &self.undo_manager
    }

    pub fn remote_clients(&self) -> &RemoteClients {
        &self.remote_clients
    }

    pub fn config(&self) -> &EditorClientConfig {
        &self.config
    }

    /// Last cursor read from the editor
    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn on<F>(&mut self, kind: EditorClientEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&EditorClientEvent) + 'static,
    {
        self.emitter.on(kind, listener)
    }

    pub fn off(&mut self, kind: EditorClientEventKind, id: ListenerId) -> bool {
        self.emitter.off(kind, id)
    }

    /// React to a notification from the editor widget
    pub fn handle_editor_event(&mut self, event: EditorEvent) -> Result<()> {
        self.ensure_live()?;

        match event {
            EditorEvent::Change { operation, inverse } => self.on_change(operation, inverse),
            EditorEvent::CursorActivity => self.on_cursor_activity(),
            EditorEvent::Blur => self.on_blur(),
            EditorEvent::Focus => self.on_focus(),
            EditorEvent::Undo => self.undo(),
            EditorEvent::Redo => self.redo(),
            EditorEvent::Error {
                error,
                operation,
                state,
            } => {
                self.emit_error(error, operation, state);
                Ok(())
            }
        }
    }

    /// React to a notification from the database transport
    pub fn handle_database_event(&mut self, event: DatabaseEvent) -> Result<()> {
        self.ensure_live()?;

        match event {
            DatabaseEvent::Acknowledge => {
                let event = self.client.server_ack()?;
                self.dispatch(event)?;
                self.update_cursor();
                self.send_cursor(self.cursor)?;
                self.schedule_synced();
                Ok(())
            }
            DatabaseEvent::Operation(operation) => {
                tracing::trace!("remote operation: {}", operation);
                let event = self.client.apply_server(operation)?;
                self.dispatch(event)
            }
            DatabaseEvent::Retry => {
                let event = self.client.server_retry()?;
                self.dispatch(event)
            }
            DatabaseEvent::InitialRevision => {
                tracing::debug!("initial revision loaded");
                self.editor.set_initiated(true);
                Ok(())
            }
            DatabaseEvent::CursorChange {
                client_id,
                cursor,
                color,
                name,
            } => self.on_remote_cursor(&client_id, cursor, color, name),
            DatabaseEvent::Error {
                error,
                operation,
                state,
            } => {
                self.emit_error(error, operation, state);
                Ok(())
            }
            DatabaseEvent::Ready => {
                tracing::trace!("database ready");
                Ok(())
            }
        }
    }

    /// Revert the latest local change, if any
    pub fn undo(&mut self) -> Result<()> {
        self.ensure_live()?;

        let Self {
            undo_manager,
            editor,
            client,
            database,
            cursor,
            ..
        } = self;

        let performed = undo_manager.perform_undo(|manager, operation| {
            apply_unredo(manager, editor, client, database, cursor, operation)
        })?;

        if let Some(json) = performed {
            self.emitter.trigger(&EditorClientEvent::Undo(json));
        }
        Ok(())
    }

    /// Reapply the latest undone change, if any
    pub fn redo(&mut self) -> Result<()> {
        self.ensure_live()?;

        let Self {
            undo_manager,
            editor,
            client,
            database,
            cursor,
            ..
        } = self;

        let performed = undo_manager.perform_redo(|manager, operation| {
            apply_unredo(manager, editor, client, database, cursor, operation)
        })?;

        if let Some(json) = performed {
            self.emitter.trigger(&EditorClientEvent::Redo(json));
        }
        Ok(())
    }

    pub fn clear_undo_redo_stack(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.undo_manager.dispose();
        Ok(())
    }

    /// Earliest instant at which [`poll_timers`](Self::poll_timers) has work
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.synced_timer.deadline(), self.cursor_timer.deadline()) {
            (Some(synced), Some(cursor)) => Some(synced.min(cursor)),
            (synced, cursor) => synced.or(cursor),
        }
    }

    /// Fire whatever timers are due at `now`
    pub fn poll_timers(&mut self, now: Instant) -> Result<()> {
        self.ensure_live()?;

        if self.synced_timer.take_due(now).is_some() {
            let synced = self.client.is_synchronized();
            tracing::trace!("synced: {}", synced);
            self.emitter.trigger(&EditorClientEvent::Synced(synced));
        }

        if let Some(cursor) = self.cursor_timer.take_due(now) {
            self.send_cursor_at(cursor, now)?;
        }

        Ok(())
    }

    /// Tear down. Every later call fails with `InvalidState`.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.synced_timer.cancel();
        self.cursor_timer.cancel();
        self.emitter.dispose();
        self.undo_manager.dispose();
        self.remote_clients.clear();
        self.disposed = true;
        tracing::debug!("editor client disposed");
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            return Err(SyncError::InvalidState(
                "EditorClient has been disposed".to_string(),
            ));
        }
        Ok(())
    }

    fn on_change(&mut self, operation: TextOperation, inverse: TextOperation) -> Result<()> {
        let cursor_before = self.cursor;
        self.update_cursor();

        let inverse = WrappedOperation::new(
            inverse,
            Some(OperationMeta::new(self.cursor, cursor_before)),
        );
        let compose = self
            .undo_manager
            .last()
            .is_some_and(|last| inverse.should_be_composed_with_inverted(last));
        self.undo_manager.add(inverse, compose)?;

        tracing::trace!("local change: {}", operation);
        let event = self.client.apply_client(operation)?;
        self.dispatch(event)
    }

    fn dispatch(&mut self, event: Option<ClientEvent>) -> Result<()> {
        match event {
            Some(ClientEvent::SendOperation(operation)) => self.database.send_operation(&operation),
            Some(ClientEvent::ApplyOperation(operation)) => self.apply_operation(operation),
            None => Ok(()),
        }
    }

    fn apply_operation(&mut self, operation: TextOperation) -> Result<()> {
        self.editor.apply_operation(&operation)?;
        self.update_cursor();
        self.undo_manager
            .transform(&WrappedOperation::bare(operation))?;
        self.schedule_synced();
        Ok(())
    }

    fn on_remote_cursor(
        &mut self,
        client_id: &str,
        cursor: Option<Cursor>,
        color: Option<String>,
        name: Option<String>,
    ) -> Result<()> {
        if self.database.is_current_user(client_id) || !self.client.is_synchronized() {
            return Ok(());
        }

        let remote = self.remote_clients.get_or_insert(client_id);
        let Some(cursor) = cursor else {
            remote.remove_cursor(&mut self.editor);
            return Ok(());
        };

        if let Some(color) = color {
            remote.set_color(color);
        }
        if let Some(name) = name {
            remote.set_name(name);
        }
        remote.update_cursor(cursor, &mut self.editor)
    }

    fn on_cursor_activity(&mut self) -> Result<()> {
        let previous = self.cursor;
        self.update_cursor();

        if previous.is_none() && self.cursor.is_none() {
            return Ok(());
        }
        self.send_cursor(self.cursor)
    }

    fn on_blur(&mut self) -> Result<()> {
        self.cursor = None;
        self.focused = false;
        self.send_cursor(None)
    }

    fn on_focus(&mut self) -> Result<()> {
        self.focused = true;
        self.on_cursor_activity()
    }

    fn update_cursor(&mut self) {
        self.cursor = self.editor.get_cursor();
    }

    fn send_cursor(&mut self, cursor: Option<Cursor>) -> Result<()> {
        self.send_cursor_at(cursor, Instant::now())
    }

    /// Publish `cursor`, or hold it back while local edits are buffered:
    /// its position refers to a document the server has not seen yet.
    fn send_cursor_at(&mut self, cursor: Option<Cursor>, now: Instant) -> Result<()> {
        self.cursor_timer.cancel();

        if self.client.is_awaiting_with_buffer() {
            self.cursor_timer
                .schedule(now, self.config.cursor_resend_delay(), cursor);
            return Ok(());
        }

        self.database.send_cursor(cursor.as_ref())
    }

    fn schedule_synced(&mut self) {
        self.synced_timer
            .schedule(Instant::now(), self.config.synced_debounce(), ());
    }

    fn emit_error(&mut self, error: String, operation: String, state: ErrorState) {
        tracing::warn!("adapter error: {} (operation: {})", error, operation);
        self.emitter.trigger(&EditorClientEvent::Error {
            error,
            operation,
            state,
        });
    }
}

/// Apply an undo/redo entry as if it were a local edit. Returns the
/// entry's JSON for the Undo/Redo event.
fn apply_unredo<D: DatabaseAdapter, E: EditorAdapter>(
    undo_manager: &mut UndoManager,
    editor: &mut E,
    client: &mut Client,
    database: &mut D,
    cursor: &mut Option<Cursor>,
    operation: WrappedOperation,
) -> Result<String> {
    let inverse = editor.invert_operation(&operation)?;
    editor.apply_operation(operation.operation())?;
    undo_manager.add(inverse, false)?;

    *cursor = operation.cursor();
    if let Some(cursor) = *cursor {
        editor.set_cursor(cursor);
    }

    // apply_client only ever asks for a send
    if let Some(ClientEvent::SendOperation(sent)) = client.apply_client(operation.operation().clone())? {
        database.send_operation(&sent)?;
    }

    Ok(operation.to_json().to_string())
}
