//! Presence of other users: color, name and the cursor drawn for them

use super::adapter::EditorAdapter;
use crate::error::Result;
use crate::ot::Cursor;
use crate::ClientID;
use std::collections::HashMap;

/// Another user editing the same document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteClient {
    client_id: ClientID,
    color: Option<String>,
    name: Option<String>,
    cursor: Option<Cursor>,
    /// A cursor is currently drawn in the editor
    marked: bool,
}

impl RemoteClient {
    pub fn new(client_id: ClientID) -> Self {
        Self {
            client_id,
            color: None,
            name: None,
            cursor: None,
            marked: false,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn set_color(&mut self, color: String) {
        self.color = Some(color);
    }

    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Redraw the user's cursor at `cursor`
    pub fn update_cursor<E: EditorAdapter>(&mut self, cursor: Cursor, editor: &mut E) -> Result<()> {
        self.remove_cursor(editor);
        self.cursor = Some(cursor);

        editor.set_other_cursor(
            &self.client_id,
            &cursor,
            self.color.as_deref(),
            self.name.as_deref(),
        )?;
        self.marked = true;
        Ok(())
    }

    pub fn remove_cursor<E: EditorAdapter>(&mut self, editor: &mut E) {
        if self.marked {
            editor.dispose_cursor(&self.client_id);
            self.marked = false;
        }
        self.cursor = None;
    }
}

/// Remote users keyed by client id
#[derive(Debug, Clone, Default)]
pub struct RemoteClients {
    clients: HashMap<ClientID, RemoteClient>,
}

impl RemoteClients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, client_id: &str) -> Option<&RemoteClient> {
        self.clients.get(client_id)
    }

    /// Fetch a client, creating it on first sight
    pub fn get_or_insert(&mut self, client_id: &str) -> &mut RemoteClient {
        self.clients
            .entry(client_id.to_string())
            .or_insert_with(|| RemoteClient::new(client_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteClient> {
        self.clients.values()
    }

    pub fn clear(&mut self) {
        self.clients.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ot::TextOperation;

    #[derive(Default)]
    struct Canvas {
        text: String,
        drawn: HashMap<String, (Cursor, Option<String>, Option<String>)>,
        disposed: Vec<String>,
    }

    impl EditorAdapter for Canvas {
        fn apply_operation(&mut self, operation: &TextOperation) -> Result<()> {
            self.text = operation.apply(&self.text)?;
            Ok(())
        }

        fn get_cursor(&self) -> Option<Cursor> {
            None
        }

        fn set_cursor(&mut self, _cursor: Cursor) {}

        fn set_other_cursor(
            &mut self,
            client_id: &str,
            cursor: &Cursor,
            color: Option<&str>,
            name: Option<&str>,
        ) -> Result<()> {
            self.drawn.insert(
                client_id.to_string(),
                (*cursor, color.map(str::to_string), name.map(str::to_string)),
            );
            Ok(())
        }

        fn dispose_cursor(&mut self, client_id: &str) {
            self.drawn.remove(client_id);
            self.disposed.push(client_id.to_string());
        }

        fn get_text(&self) -> String {
            self.text.clone()
        }

        fn set_text(&mut self, text: &str) {
            self.text = text.to_string();
        }

        fn set_initiated(&mut self, _initiated: bool) {}
    }

    #[test]
    fn test_update_cursor_draws_with_presence() {
        let mut canvas = Canvas::default();
        let mut client = RemoteClient::new("alice".to_string());
        client.set_color("#ff0000".to_string());
        client.set_name("Alice".to_string());

        client.update_cursor(Cursor::new(1, 4), &mut canvas).unwrap();

        assert_eq!(client.cursor(), Some(Cursor::new(1, 4)));
        assert_eq!(
            canvas.drawn.get("alice"),
            Some(&(
                Cursor::new(1, 4),
                Some("#ff0000".to_string()),
                Some("Alice".to_string())
            ))
        );
        assert!(canvas.disposed.is_empty());
    }

    #[test]
    fn test_update_replaces_previous_mark() {
        let mut canvas = Canvas::default();
        let mut client = RemoteClient::new("bob".to_string());

        client.update_cursor(Cursor::caret(1), &mut canvas).unwrap();
        client.update_cursor(Cursor::caret(2), &mut canvas).unwrap();

        assert_eq!(canvas.disposed, vec!["bob".to_string()]);
        assert_eq!(canvas.drawn.get("bob").map(|drawn| drawn.0), Some(Cursor::caret(2)));
    }

    #[test]
    fn test_remove_cursor() {
        let mut canvas = Canvas::default();
        let mut client = RemoteClient::new("carol".to_string());

        client.remove_cursor(&mut canvas);
        assert!(canvas.disposed.is_empty());

        client.update_cursor(Cursor::caret(0), &mut canvas).unwrap();
        client.remove_cursor(&mut canvas);
        assert!(canvas.drawn.is_empty());
        assert_eq!(client.cursor(), None);
    }

    #[test]
    fn test_registry() {
        let mut clients = RemoteClients::new();
        assert!(clients.is_empty());

        clients.get_or_insert("alice").set_name("Alice".to_string());
        clients.get_or_insert("alice").set_color("blue".to_string());
        clients.get_or_insert("bob");

        assert_eq!(clients.len(), 2);
        let alice = clients.get("alice").unwrap();
        assert_eq!(alice.name(), Some("Alice"));
        assert_eq!(alice.color(), Some("blue"));

        clients.clear();
        assert!(clients.get("bob").is_none());
    }
}
