//! A single game session: board, roster and chat log.
//!
//! `Room` is plain data with synchronous methods. Callers serialise access
//! (the server keeps the whole registry behind one lock), so a move's
//! check-turn, write-cell and flip-turn steps can't interleave with another
//! operation on the same room.

use std::collections::VecDeque;

use noughts_protocol::{ChatMessage, Player, PlayerId, RoomCode, RoomView, Seat};
use noughts_rules::{Board, GameState, Rules, Symbol};

use crate::RoomError;

/// Result of a successful join, as player or spectator.
#[derive(Debug, Clone, PartialEq)]
pub struct Joined {
    pub seat: Seat,
    pub room: RoomView,
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub board: Board,
    pub state: GameState,
}

/// What happened when a connection left a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// Removed; others remain.
    Left,
    /// Removed, and the room was empty so it was deleted.
    RoomClosed,
    /// Room missing or the connection wasn't in it. Nothing changed.
    NotPresent,
}

#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    host: PlayerId,
    host_nickname: String,
    rules: Rules,
    board: Board,
    current_player: Symbol,
    /// Insertion-ordered; ids are unique.
    players: Vec<Player>,
    messages: VecDeque<ChatMessage>,
    max_messages: usize,
    round_count: u32,
    created_at: i64,
}

impl Room {
    /// Creates an empty room with X to move. The host is recorded but
    /// not seated.
    pub fn new(
        code: RoomCode,
        host: PlayerId,
        host_nickname: impl Into<String>,
        rules: Rules,
        max_messages: usize,
        created_at: i64,
    ) -> Self {
        Self {
            code,
            host,
            host_nickname: host_nickname.into(),
            rules,
            board: rules.empty_board(),
            current_player: Symbol::X,
            players: Vec::new(),
            messages: VecDeque::new(),
            max_messages,
            round_count: 0,
            created_at,
        }
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    pub fn host_nickname(&self) -> &str {
        &self.host_nickname
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Symbol {
        self.current_player
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn round_count(&self) -> u32 {
        self.round_count
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Number of non-spectators.
    pub fn seated_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_spectator).count()
    }

    /// Derived from the board every time; never stored.
    pub fn game_state(&self) -> GameState {
        self.rules.classify(&self.board, self.current_player)
    }

    /// A fresh snapshot for clients.
    pub fn view(&self) -> RoomView {
        let game_state = self.game_state();
        RoomView {
            code: self.code.clone(),
            players: self.players.clone(),
            board: self.board.clone(),
            board_size: self.rules.board_size(),
            win_condition: self.rules.win_condition(),
            current_player: self.current_player,
            status: game_state.to_string(),
            game_state,
            winning_line: self.rules.winning_line(&self.board).map(|line| line.cells),
            messages: self.messages.iter().cloned().collect(),
            round_count: self.round_count,
            created_at: self.created_at,
        }
    }

    // ---------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------

    /// Seats `id` with the first symbol no seated player holds.
    pub fn join(&mut self, id: PlayerId, nickname: impl Into<String>) -> Result<Seat, RoomError> {
        self.ensure_absent(id)?;
        let symbol = Symbol::ALL
            .into_iter()
            .find(|symbol| !self.players.iter().any(|p| p.symbol == Some(*symbol)))
            .ok_or_else(|| RoomError::RoomFull(self.code.clone()))?;
        let player = Player::seated(id, nickname, symbol);
        let seat = player.seat();
        self.players.push(player);
        Ok(seat)
    }

    /// Adds `id` as a spectator. Never full.
    pub fn spectate(
        &mut self,
        id: PlayerId,
        nickname: impl Into<String>,
    ) -> Result<Seat, RoomError> {
        self.ensure_absent(id)?;
        self.players.push(Player::spectator(id, nickname));
        Ok(Seat::Spectator)
    }

    /// Places the mover's symbol and hands the turn over.
    ///
    /// A finished game has no separate gate: once the board is won or full
    /// the remaining moves fail on turn or occupancy like any other.
    pub fn make_move(&mut self, id: PlayerId, cell: usize) -> Result<MoveOutcome, RoomError> {
        let symbol = self
            .player(id)
            .and_then(|p| p.symbol)
            .ok_or(RoomError::NotAPlayer(id))?;
        if symbol != self.current_player {
            return Err(RoomError::NotYourTurn {
                player: id,
                turn: self.current_player,
            });
        }
        let cells = self.board.len();
        if cell >= cells {
            return Err(RoomError::InvalidCell { cell, cells });
        }
        if self.board.get(cell).is_some() {
            return Err(RoomError::CellOccupied(cell));
        }

        self.board.place(cell, symbol)?;
        self.current_player = symbol.other();

        Ok(MoveOutcome {
            board: self.board.clone(),
            state: self.game_state(),
        })
    }

    /// Appends a chat line from `id`. Returns `false` (and does nothing)
    /// when the sender isn't in the room.
    pub fn push_message(&mut self, id: PlayerId, text: impl Into<String>, timestamp: i64) -> bool {
        let Some(nickname) = self.player(id).map(|p| p.nickname.clone()) else {
            return false;
        };
        self.messages.push_back(ChatMessage {
            nickname,
            text: text.into(),
            timestamp,
        });
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
        true
    }

    /// Starts a new round. The roster and chat survive; the player who
    /// would have moved next in the old round moves second in the new one.
    pub fn reset(&mut self) -> &Board {
        self.board.clear();
        self.current_player = self.current_player.other();
        self.round_count += 1;
        &self.board
    }

    /// Drops `id` from the roster. Symbols are not reassigned.
    pub fn remove(&mut self, id: PlayerId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        self.players.len() != before
    }

    fn ensure_absent(&self, id: PlayerId) -> Result<(), RoomError> {
        if self.contains(id) {
            return Err(RoomError::AlreadyInRoom(id, self.code.clone()));
        }
        Ok(())
    }
}
