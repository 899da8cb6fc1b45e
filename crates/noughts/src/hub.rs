//! Connection hub: who is connected, which room they're in, and how to
//! reach them.
//!
//! Each connection task owns the receiving half of an unbounded channel;
//! the hub holds the sending half. Pushing into the channel never waits,
//! so broadcasting while the registry lock is held can't stall on a slow
//! socket.

use std::collections::{HashMap, HashSet};

use noughts_protocol::{PlayerId, RoomCode, ServerMessage};
use tokio::sync::mpsc;

/// Channel sender for delivering outbound messages to one connection.
pub(crate) type Outbox = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Default)]
pub(crate) struct Hub {
    outboxes: HashMap<PlayerId, Outbox>,
    /// A connection is in at most one room.
    memberships: HashMap<PlayerId, RoomCode>,
    /// Reverse of `memberships`; empty sets are removed.
    members: HashMap<RoomCode, HashSet<PlayerId>>,
}

impl Hub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, player: PlayerId, outbox: Outbox) {
        self.outboxes.insert(player, outbox);
    }

    /// Forgets the connection and returns the room it was in, if any.
    pub(crate) fn unregister(&mut self, player: PlayerId) -> Option<RoomCode> {
        self.outboxes.remove(&player);
        self.exit(player)
    }

    pub(crate) fn room_of(&self, player: PlayerId) -> Option<&RoomCode> {
        self.memberships.get(&player)
    }

    pub(crate) fn enter(&mut self, player: PlayerId, code: RoomCode) {
        self.exit(player);
        self.members.entry(code.clone()).or_default().insert(player);
        self.memberships.insert(player, code);
    }

    pub(crate) fn exit(&mut self, player: PlayerId) -> Option<RoomCode> {
        let code = self.memberships.remove(&player)?;
        if let Some(set) = self.members.get_mut(&code) {
            set.remove(&player);
            if set.is_empty() {
                self.members.remove(&code);
            }
        }
        Some(code)
    }

    /// Connections currently associated with `code`.
    pub(crate) fn members<'a>(
        &'a self,
        code: &RoomCode,
    ) -> impl Iterator<Item = PlayerId> + use<'a> {
        self.members.get(code).into_iter().flatten().copied()
    }

    #[cfg(test)]
    pub(crate) fn connection_count(&self) -> usize {
        self.outboxes.len()
    }

    pub(crate) fn send_to(&self, player: PlayerId, message: ServerMessage) {
        match self.outboxes.get(&player) {
            Some(outbox) => {
                if outbox.send(message).is_err() {
                    tracing::debug!(%player, "outbox closed, dropping message");
                }
            }
            None => tracing::debug!(%player, "no outbox for player"),
        }
    }

    pub(crate) fn broadcast(&self, code: &RoomCode, message: &ServerMessage) {
        for player in self.members(code) {
            self.send_to(player, message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> RoomCode {
        RoomCode::new(s).unwrap()
    }

    fn connect(hub: &mut Hub, id: u64) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        hub.register(PlayerId(id), tx);
        rx
    }

    #[test]
    fn test_broadcast_reaches_only_room_members() {
        let mut hub = Hub::new();
        let mut a = connect(&mut hub, 1);
        let mut b = connect(&mut hub, 2);
        let mut c = connect(&mut hub, 3);
        hub.enter(PlayerId(1), code("AAAA"));
        hub.enter(PlayerId(2), code("AAAA"));
        hub.enter(PlayerId(3), code("BBBB"));

        let msg = ServerMessage::Left { code: code("AAAA") };
        hub.broadcast(&code("AAAA"), &msg);

        assert_eq!(a.try_recv().unwrap(), msg);
        assert_eq!(b.try_recv().unwrap(), msg);
        assert!(c.try_recv().is_err());
    }

    #[test]
    fn test_unregister_returns_room() {
        let mut hub = Hub::new();
        let _rx = connect(&mut hub, 1);
        hub.enter(PlayerId(1), code("AAAA"));
        assert_eq!(hub.unregister(PlayerId(1)), Some(code("AAAA")));
        assert_eq!(hub.connection_count(), 0);
        assert_eq!(hub.unregister(PlayerId(1)), None);
    }

    #[test]
    fn test_send_to_closed_outbox_is_ignored() {
        let mut hub = Hub::new();
        let rx = connect(&mut hub, 1);
        drop(rx);
        hub.send_to(PlayerId(1), ServerMessage::Left { code: code("AAAA") });
        hub.send_to(PlayerId(9), ServerMessage::Left { code: code("AAAA") });
    }

    #[test]
    fn test_exit_clears_membership() {
        let mut hub = Hub::new();
        let _rx = connect(&mut hub, 1);
        hub.enter(PlayerId(1), code("AAAA"));
        assert_eq!(hub.exit(PlayerId(1)), Some(code("AAAA")));
        assert!(hub.room_of(PlayerId(1)).is_none());
        assert_eq!(hub.members(&code("AAAA")).count(), 0);
    }

    #[test]
    fn test_member_index_follows_moves() {
        let mut hub = Hub::new();
        let _rx = connect(&mut hub, 1);
        hub.enter(PlayerId(1), code("AAAA"));
        hub.enter(PlayerId(1), code("BBBB"));
        assert_eq!(hub.members(&code("AAAA")).count(), 0);
        assert_eq!(hub.members(&code("BBBB")).collect::<Vec<_>>(), vec![PlayerId(1)]);

        hub.unregister(PlayerId(1));
        assert_eq!(hub.members(&code("BBBB")).count(), 0);
        assert!(hub.members.is_empty());
    }
}
