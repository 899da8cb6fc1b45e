//! Turns client intents into registry operations and outbound messages.
//!
//! Everything here runs with the registry and hub locks held, so an
//! operation, its reply and its broadcast happen as one step. Replies and
//! broadcasts both go through the hub's outboxes, which keeps every
//! connection's view of a room in the order the changes were made.

use noughts_protocol::{ClientMessage, PlayerId, RejectReason, RoomCode, ServerMessage};
use noughts_room::{Departure, Joined, RoomError, RoomRegistry};

use crate::hub::Hub;

pub(crate) struct Dispatcher<'a> {
    pub(crate) rooms: &'a mut RoomRegistry,
    pub(crate) hub: &'a mut Hub,
    pub(crate) player: PlayerId,
}

impl Dispatcher<'_> {
    /// Applies one intent from `self.player`.
    pub(crate) fn handle(&mut self, intent: ClientMessage, server_time: u64) {
        match intent {
            ClientMessage::CreateRoom {
                nickname,
                board_size,
                win_condition,
            } => self.create_room(&nickname, board_size, win_condition),
            ClientMessage::JoinRoom { code, nickname } => self.join(code, &nickname, false),
            ClientMessage::JoinAsSpectator { code, nickname } => self.join(code, &nickname, true),
            ClientMessage::MakeMove { cell } => self.make_move(cell),
            ClientMessage::SendMessage { text } => self.send_message(&text),
            ClientMessage::ResetGame => self.reset_game(),
            ClientMessage::LeaveRoom => self.leave_room(),
            ClientMessage::Heartbeat { client_time } => self.reply(ServerMessage::HeartbeatAck {
                client_time,
                server_time,
            }),
        }
    }

    /// Removes a vanished connection from the hub and from its room.
    pub(crate) fn disconnect(&mut self) {
        let Some(code) = self.hub.unregister(self.player) else {
            return;
        };
        if self.rooms.leave_room(&code, self.player) == Departure::Left {
            self.broadcast_room(&code);
        }
    }

    // ---------------------------------------------------------------
    // Intents
    // ---------------------------------------------------------------

    fn create_room(&mut self, nickname: &str, board_size: usize, win_condition: usize) {
        if let Some(code) = self.hub.room_of(self.player) {
            let err = RoomError::AlreadyInRoom(self.player, code.clone());
            return self.reject(&err);
        }
        let created = self
            .rooms
            .create_room(self.player, nickname, board_size, win_condition)
            .and_then(|code| {
                let joined = self.rooms.join_room(&code, self.player, nickname)?;
                Ok((code, joined))
            });
        match created {
            Ok((code, joined)) => {
                self.reply(ServerMessage::RoomCreated { code: code.clone() });
                self.admit(code, joined);
            }
            Err(err) => self.reject(&err),
        }
    }

    fn join(&mut self, code: RoomCode, nickname: &str, as_spectator: bool) {
        if let Some(current) = self.hub.room_of(self.player) {
            let err = RoomError::AlreadyInRoom(self.player, current.clone());
            return self.reject(&err);
        }
        let result = if as_spectator {
            self.rooms.join_as_spectator(&code, self.player, nickname)
        } else {
            match self.rooms.join_room(&code, self.player, nickname) {
                Err(err) if err.suggests_spectating() => {
                    tracing::debug!(%code, player_id = %self.player, "room full, admitting as spectator");
                    self.rooms.join_as_spectator(&code, self.player, nickname)
                }
                other => other,
            }
        };
        match result {
            Ok(joined) => self.admit(code, joined),
            Err(err) => self.reject(&err),
        }
    }

    fn make_move(&mut self, cell: usize) {
        let Some(code) = self.current_room() else {
            return;
        };
        match self.rooms.make_move(&code, self.player, cell) {
            Ok(outcome) => {
                self.reply(ServerMessage::MoveAccepted {
                    board: outcome.board,
                    game_state: outcome.state,
                });
                self.broadcast_room(&code);
            }
            Err(err) => self.reject(&err),
        }
    }

    fn send_message(&mut self, text: &str) {
        let Some(code) = self.hub.room_of(self.player).cloned() else {
            return;
        };
        if self.rooms.send_message(&code, self.player, text) {
            self.broadcast_room(&code);
        }
    }

    fn reset_game(&mut self) {
        let Some(code) = self.current_room() else {
            return;
        };
        match self.rooms.reset_game(&code) {
            Ok(board) => {
                self.reply(ServerMessage::GameReset { board });
                self.broadcast_room(&code);
            }
            Err(err) => self.reject(&err),
        }
    }

    fn leave_room(&mut self) {
        let Some(code) = self.hub.exit(self.player) else {
            return self.reject_not_in_room();
        };
        let departure = self.rooms.leave_room(&code, self.player);
        self.reply(ServerMessage::Left { code: code.clone() });
        if departure == Departure::Left {
            self.broadcast_room(&code);
        }
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn admit(&mut self, code: RoomCode, joined: Joined) {
        self.hub.enter(self.player, code.clone());
        let room = joined.room.clone();
        self.reply(ServerMessage::Joined {
            code: code.clone(),
            seat: joined.seat,
            room: joined.room,
        });
        self.hub.broadcast(&code, &ServerMessage::RoomUpdated { room });
    }

    /// The sender's room, or a `not_in_room` rejection.
    fn current_room(&self) -> Option<RoomCode> {
        let code = self.hub.room_of(self.player).cloned();
        if code.is_none() {
            self.reject_not_in_room();
        }
        code
    }

    fn broadcast_room(&self, code: &RoomCode) {
        if let Some(room) = self.rooms.room_view(code) {
            self.hub.broadcast(code, &ServerMessage::RoomUpdated { room });
        }
    }

    fn reply(&self, message: ServerMessage) {
        self.hub.send_to(self.player, message);
    }

    fn reject(&self, err: &RoomError) {
        tracing::debug!(player_id = %self.player, error = %err, "intent rejected");
        self.reply(ServerMessage::Rejected {
            reason: err.reject_reason(),
            message: err.to_string(),
        });
    }

    fn reject_not_in_room(&self) {
        self.reply(ServerMessage::Rejected {
            reason: RejectReason::NotInRoom,
            message: "not in a room".to_string(),
        });
    }
}
