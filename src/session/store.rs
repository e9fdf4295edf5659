use std::collections::HashMap;

use log::info;

use crate::policy::Dice;
use crate::session::GameSession;

pub type SessionId = String;

/// Where sessions live between requests.
///
/// Sessions are never evicted on their own; a caller that wants bounded memory
/// has to `expire` them.
pub trait SessionStore {
    /// Store `session` under a freshly generated id.
    fn create(&mut self, session: GameSession) -> SessionId;

    fn get_mut(&mut self, id: &str) -> Option<&mut GameSession>;

    fn expire(&mut self, id: &str) -> Option<GameSession>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool { self.len() == 0 }
}

pub struct MemoryStore {
    sessions: HashMap<SessionId, GameSession>,
    ids: Dice,
}

impl MemoryStore {
    pub fn new(ids: Dice) -> Self { Self { sessions: HashMap::new(), ids } }
}

impl Default for MemoryStore {
    fn default() -> Self { Self::new(Dice::from_entropy()) }
}

impl SessionStore for MemoryStore {
    fn create(&mut self, session: GameSession) -> SessionId {
        let id = loop {
            let id = self.ids.token();
            if !self.sessions.contains_key(&id) { break id; }
        };
        self.sessions.insert(id.clone(), session);
        info!("session {id} created ({} live)", self.sessions.len());
        id
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut GameSession> { self.sessions.get_mut(id) }

    fn expire(&mut self, id: &str) -> Option<GameSession> {
        let gone = self.sessions.remove(id);
        if gone.is_some() { info!("session {id} expired ({} live)", self.sessions.len()); }
        gone
    }

    fn len(&self) -> usize { self.sessions.len() }
}
