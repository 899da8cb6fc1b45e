//! Room registry: creates, tracks, and removes rooms by code.

use std::collections::HashMap;

use noughts_protocol::{PlayerId, RoomCode, RoomView, Seat};
use noughts_rules::{Board, Rules};

use crate::room::{Departure, Joined, MoveOutcome, Room};
use crate::{Clock, CodeGenerator, RandomCodes, RoomConfig, RoomError, SystemClock};

/// Every live room, keyed by code.
///
/// The registry is a plain value. The server owns one behind a mutex;
/// tests own one directly. Rooms exist only in memory and disappear
/// the moment their last occupant leaves.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    config: RoomConfig,
    code_generator: Box<dyn CodeGenerator>,
    clock: Box<dyn Clock>,
}

impl RoomRegistry {
    /// Creates an empty registry with default limits, random codes and
    /// the system clock.
    pub fn new() -> Self {
        Self::with_config(RoomConfig::default())
    }

    pub fn with_config(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            code_generator: Box::new(RandomCodes),
            clock: Box::new(SystemClock),
        }
    }

    /// Replaces the code generator.
    pub fn with_code_generator(mut self, generator: impl CodeGenerator + 'static) -> Self {
        self.code_generator = Box::new(generator);
        self
    }

    /// Replaces the clock used for chat and creation timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------

    /// Creates a room with an empty board and X to move.
    ///
    /// The host is recorded on the room but not seated; call
    /// [`join_room`](Self::join_room) to seat them.
    pub fn create_room(
        &mut self,
        host: PlayerId,
        host_nickname: &str,
        board_size: usize,
        win_condition: usize,
    ) -> Result<RoomCode, RoomError> {
        let rules = self.validate_rules(board_size, win_condition)?;
        let code = self.unique_code()?;
        let room = Room::new(
            code.clone(),
            host,
            host_nickname,
            rules,
            self.config.max_messages,
            self.clock.now_millis(),
        );
        self.rooms.insert(code.clone(), room);
        tracing::info!(%code, %host, board_size, win_condition, "room created");
        Ok(code)
    }

    /// Seats a player. Fails with [`RoomError::RoomFull`] once both
    /// symbols are taken; the caller decides whether to spectate instead.
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
        nickname: &str,
    ) -> Result<Joined, RoomError> {
        let room = self.room_mut(code)?;
        let seat = room.join(id, nickname)?;
        tracing::info!(%code, player_id = %id, ?seat, "player joined");
        Ok(Joined {
            seat,
            room: room.view(),
        })
    }

    /// Adds a spectator. Only fails if the room is missing or the
    /// connection is already in it.
    pub fn join_as_spectator(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
        nickname: &str,
    ) -> Result<Joined, RoomError> {
        let room = self.room_mut(code)?;
        let seat: Seat = room.spectate(id, nickname)?;
        tracing::info!(%code, player_id = %id, "spectator joined");
        Ok(Joined {
            seat,
            room: room.view(),
        })
    }

    pub fn make_move(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
        cell: usize,
    ) -> Result<MoveOutcome, RoomError> {
        let outcome = self.room_mut(code)?.make_move(id, cell)?;
        tracing::debug!(%code, player_id = %id, cell, state = %outcome.state, "move accepted");
        Ok(outcome)
    }

    /// Appends a chat line. Returns `false` without error when the room
    /// or the sender is gone.
    pub fn send_message(&mut self, code: &RoomCode, id: PlayerId, text: &str) -> bool {
        let now = self.clock.now_millis();
        match self.rooms.get_mut(code) {
            Some(room) => room.push_message(id, text, now),
            None => false,
        }
    }

    /// Clears the board for a new round and returns it.
    pub fn reset_game(&mut self, code: &RoomCode) -> Result<Board, RoomError> {
        let room = self.room_mut(code)?;
        let board = room.reset().clone();
        tracing::info!(%code, round = room.round_count(), "game reset");
        Ok(board)
    }

    /// Removes a connection from a room, deleting the room if it empties.
    /// Safe to call more than once.
    pub fn leave_room(&mut self, code: &RoomCode, id: PlayerId) -> Departure {
        let Some(room) = self.rooms.get_mut(code) else {
            return Departure::NotPresent;
        };
        if !room.remove(id) {
            return Departure::NotPresent;
        }
        tracing::info!(%code, player_id = %id, "player left");

        if room.is_empty() {
            self.rooms.remove(code);
            tracing::info!(%code, "room closed");
            return Departure::RoomClosed;
        }
        Departure::Left
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// A freshly computed snapshot, or `None` if no such room.
    pub fn room_view(&self, code: &RoomCode) -> Option<RoomView> {
        self.rooms.get(code).map(Room::view)
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// Codes of every live room, in no particular order.
    pub fn codes(&self) -> impl Iterator<Item = &RoomCode> {
        self.rooms.keys()
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn room_mut(&mut self, code: &RoomCode) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    fn validate_rules(&self, board_size: usize, win_condition: usize) -> Result<Rules, RoomError> {
        let RoomConfig {
            min_board_size: min,
            max_board_size: max,
            ..
        } = self.config;
        if !(min..=max).contains(&board_size) {
            return Err(RoomError::BoardSizeOutOfRange {
                size: board_size,
                min,
                max,
            });
        }
        Ok(Rules::new(board_size, win_condition)?)
    }

    /// Draws candidates until one parses and is free. Malformed
    /// candidates count as spent attempts.
    fn unique_code(&mut self) -> Result<RoomCode, RoomError> {
        let attempts = self.config.code_attempts;
        for _ in 0..attempts {
            let candidate = self.code_generator.generate(self.config.code_length);
            match RoomCode::new(&candidate) {
                Ok(code) if !self.rooms.contains_key(&code) => return Ok(code),
                Ok(code) => tracing::debug!(%code, "room code collision"),
                Err(error) => tracing::warn!(%error, "generator produced an invalid room code"),
            }
        }
        tracing::warn!(attempts, "room code space exhausted");
        Err(RoomError::CodeExhausted(attempts))
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedClock, ScriptedCodes};

    fn registry() -> RoomRegistry {
        RoomRegistry::new()
            .with_code_generator(ScriptedCodes::new(["ROOM", "ROOM", "NEXT"]))
            .with_clock(FixedClock(5_000))
    }

    #[test]
    fn test_create_room_does_not_seat_host() {
        let mut registry = registry();
        let code = registry.create_room(PlayerId(1), "host", 3, 3).unwrap();
        assert_eq!(code.as_str(), "ROOM");
        let view = registry.room_view(&code).unwrap();
        assert!(view.players.is_empty());
        assert_eq!(view.created_at, 5_000);
        assert_eq!(registry.room(&code).unwrap().host(), PlayerId(1));
    }

    #[test]
    fn test_create_room_skips_taken_code() {
        let mut registry = registry();
        registry.create_room(PlayerId(1), "a", 3, 3).unwrap();
        let second = registry.create_room(PlayerId(2), "b", 3, 3).unwrap();
        assert_eq!(second.as_str(), "NEXT");
        assert_eq!(registry.room_count(), 2);
    }

    #[test]
    fn test_board_size_bounds() {
        let mut registry = registry();
        assert!(matches!(
            registry.create_room(PlayerId(1), "a", 2, 2),
            Err(RoomError::BoardSizeOutOfRange { size: 2, min: 3, max: 7 })
        ));
        assert!(matches!(
            registry.create_room(PlayerId(1), "a", 8, 3),
            Err(RoomError::BoardSizeOutOfRange { size: 8, .. })
        ));
        assert!(matches!(
            registry.create_room(PlayerId(1), "a", 3, 4),
            Err(RoomError::InvalidBoard(_))
        ));
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_invalid_generated_code_counts_as_attempt() {
        let config = RoomConfig {
            code_attempts: 3,
            ..RoomConfig::default()
        };
        let mut registry = RoomRegistry::with_config(config)
            .with_code_generator(ScriptedCodes::new(["", "??", "ok12"]));
        let code = registry.create_room(PlayerId(1), "a", 3, 3).unwrap();
        assert_eq!(code.as_str(), "OK12");
    }

    #[test]
    fn test_leave_unknown_room_is_not_present() {
        let mut registry = registry();
        let code = RoomCode::new("NONE").unwrap();
        assert_eq!(registry.leave_room(&code, PlayerId(1)), Departure::NotPresent);
    }

    #[test]
    fn test_send_message_to_missing_room() {
        let mut registry = registry();
        let code = RoomCode::new("NONE").unwrap();
        assert!(!registry.send_message(&code, PlayerId(1), "hello"));
    }

    #[test]
    fn test_codes_lists_live_rooms() {
        let mut registry = registry();
        let code = registry.create_room(PlayerId(1), "a", 3, 3).unwrap();
        assert!(registry.contains(&code));
        assert_eq!(registry.codes().collect::<Vec<_>>(), vec![&code]);
    }
}
