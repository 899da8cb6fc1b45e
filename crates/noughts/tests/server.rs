//! Integration tests for the Noughts server over real WebSocket connections.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use noughts::prelude::*;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Starts a server on a random port whose rooms are coded ROOM, ROM2, ...
async fn start_server() -> String {
    start_server_with(NoughtsServer::builder()).await
}

async fn start_server_with(builder: NoughtsServerBuilder) -> String {
    let registry = RoomRegistry::new().with_code_generator(ScriptedCodes::new(["ROOM", "ROM2"]));
    let server = builder
        .bind("127.0.0.1:0")
        .registry(registry)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

/// A connected client that has already consumed its `Welcome`.
struct Client {
    ws: ClientWs,
    id: PlayerId,
    seq: u64,
}

impl Client {
    async fn connect(addr: &str) -> Self {
        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("should connect");
        let welcome = recv_message(&mut ws).await;
        let id = match welcome {
            ServerMessage::Welcome { player_id, version } => {
                assert_eq!(version, PROTOCOL_VERSION);
                player_id
            }
            other => panic!("expected Welcome, got {other:?}"),
        };
        Self { ws, id, seq: 0 }
    }

    async fn send(&mut self, message: ClientMessage) {
        self.seq += 1;
        let envelope: ClientEnvelope = Envelope {
            seq: self.seq,
            timestamp: 0,
            message,
        };
        let text = serde_json::to_string(&envelope).expect("encode");
        self.ws.send(Message::Text(text.into())).await.expect("send");
    }

    async fn recv(&mut self) -> ServerMessage {
        recv_message(&mut self.ws).await
    }

    /// Reads until a message matching `pred` arrives, returning it.
    async fn recv_until(&mut self, pred: impl Fn(&ServerMessage) -> bool) -> ServerMessage {
        loop {
            let message = self.recv().await;
            if pred(&message) {
                return message;
            }
        }
    }

    async fn next_room_update(&mut self) -> RoomView {
        match self
            .recv_until(|m| matches!(m, ServerMessage::RoomUpdated { .. }))
            .await
        {
            ServerMessage::RoomUpdated { room } => room,
            _ => unreachable!(),
        }
    }

    async fn create(&mut self, nickname: &str) -> RoomCode {
        self.send(ClientMessage::CreateRoom {
            nickname: nickname.into(),
            board_size: 3,
            win_condition: 3,
        })
        .await;
        let code = match self.recv().await {
            ServerMessage::RoomCreated { code } => code,
            other => panic!("expected RoomCreated, got {other:?}"),
        };
        assert!(matches!(self.recv().await, ServerMessage::Joined { .. }));
        self.next_room_update().await;
        code
    }

    async fn join(&mut self, code: &RoomCode, nickname: &str) -> Seat {
        self.send(ClientMessage::JoinRoom {
            code: code.clone(),
            nickname: nickname.into(),
        })
        .await;
        let seat = match self.recv().await {
            ServerMessage::Joined { seat, .. } => seat,
            other => panic!("expected Joined, got {other:?}"),
        };
        self.next_room_update().await;
        seat
    }
}

/// Next application message, skipping pongs and other control frames.
async fn recv_message(ws: &mut ClientWs) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for server")
            .expect("stream ended")
            .expect("recv");
        if !(frame.is_text() || frame.is_binary()) {
            continue;
        }
        let envelope: ServerEnvelope = serde_json::from_slice(&frame.into_data()).expect("decode");
        return envelope.message;
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_welcome_assigns_distinct_ids() {
    let addr = start_server().await;
    let a = Client::connect(&addr).await;
    let b = Client::connect(&addr).await;
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn test_create_and_join() {
    let addr = start_server().await;
    let mut alice = Client::connect(&addr).await;
    let mut bob = Client::connect(&addr).await;

    let code = alice.create("alice").await;
    assert_eq!(code.as_str(), "ROOM");

    let seat = bob.join(&code, "bob").await;
    assert_eq!(seat, Seat::Player { symbol: Symbol::O });

    let room = alice.next_room_update().await;
    assert_eq!(room.players.len(), 2);
    assert_eq!(room.player(alice.id).unwrap().symbol, Some(Symbol::X));
    assert_eq!(room.player(bob.id).unwrap().nickname, "bob");
}

#[tokio::test]
async fn test_full_game_broadcasts_win() {
    let addr = start_server().await;
    let mut alice = Client::connect(&addr).await;
    let mut bob = Client::connect(&addr).await;
    let code = alice.create("alice").await;
    bob.join(&code, "bob").await;
    alice.next_room_update().await;

    for (cell, x_turn) in [(0, true), (1, false), (4, true), (2, false)] {
        let mover = if x_turn { &mut alice } else { &mut bob };
        mover.send(ClientMessage::MakeMove { cell }).await;
        assert!(matches!(
            mover.recv().await,
            ServerMessage::MoveAccepted { .. }
        ));
        alice.next_room_update().await;
        bob.next_room_update().await;
    }

    alice.send(ClientMessage::MakeMove { cell: 8 }).await;
    match alice.recv().await {
        ServerMessage::MoveAccepted { game_state, .. } => assert_eq!(
            game_state,
            GameState::Finished {
                result: Outcome::Win(Symbol::X)
            }
        ),
        other => panic!("expected MoveAccepted, got {other:?}"),
    }
    let room = bob.next_room_update().await;
    assert_eq!(room.winning_line, Some(vec![0, 4, 8]));
    assert_eq!(room.status, "X wins!");
}

#[tokio::test]
async fn test_out_of_turn_rejected_to_sender_only() {
    let addr = start_server().await;
    let mut alice = Client::connect(&addr).await;
    let mut bob = Client::connect(&addr).await;
    let code = alice.create("alice").await;
    bob.join(&code, "bob").await;
    alice.next_room_update().await;

    bob.send(ClientMessage::MakeMove { cell: 0 }).await;
    match bob.recv().await {
        ServerMessage::Rejected { reason, .. } => assert_eq!(reason, RejectReason::NotYourTurn),
        other => panic!("expected Rejected, got {other:?}"),
    }

    // Alice sees the next real change, not the rejection.
    alice.send(ClientMessage::Heartbeat { client_time: 5 }).await;
    assert!(matches!(
        alice.recv().await,
        ServerMessage::HeartbeatAck { client_time: 5, .. }
    ));
}

#[tokio::test]
async fn test_third_joiner_becomes_spectator() {
    let addr = start_server().await;
    let mut alice = Client::connect(&addr).await;
    let mut bob = Client::connect(&addr).await;
    let mut carol = Client::connect(&addr).await;
    let code = alice.create("alice").await;
    bob.join(&code, "bob").await;

    let seat = carol.join(&code, "carol").await;
    assert_eq!(seat, Seat::Spectator);

    carol.send(ClientMessage::MakeMove { cell: 0 }).await;
    match carol.recv().await {
        ServerMessage::Rejected { reason, .. } => assert_eq!(reason, RejectReason::NotAPlayer),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_reaches_everyone_in_room() {
    let addr = start_server().await;
    let mut alice = Client::connect(&addr).await;
    let mut bob = Client::connect(&addr).await;
    let code = alice.create("alice").await;
    bob.join(&code, "bob").await;
    alice.next_room_update().await;

    bob.send(ClientMessage::SendMessage {
        text: "gl hf".into(),
    })
    .await;
    let room = alice.next_room_update().await;
    assert_eq!(room.messages.len(), 1);
    assert_eq!(room.messages[0].nickname, "bob");
    assert_eq!(room.messages[0].text, "gl hf");
}

#[tokio::test]
async fn test_disconnect_leaves_room() {
    let addr = start_server().await;
    let mut alice = Client::connect(&addr).await;
    let mut bob = Client::connect(&addr).await;
    let code = alice.create("alice").await;
    bob.join(&code, "bob").await;
    alice.next_room_update().await;

    let bob_id = bob.id;
    drop(bob);

    let room = alice.next_room_update().await;
    assert!(room.player(bob_id).is_none());
    assert_eq!(room.players.len(), 1);
}

#[tokio::test]
async fn test_unknown_room_and_bad_frame() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr).await;

    client
        .send(ClientMessage::JoinRoom {
            code: RoomCode::new("NOPE").unwrap(),
            nickname: "x".into(),
        })
        .await;
    match client.recv().await {
        ServerMessage::Rejected { reason, .. } => assert_eq!(reason, RejectReason::RoomNotFound),
        other => panic!("expected Rejected, got {other:?}"),
    }

    client
        .ws
        .send(Message::Text("not json".to_string().into()))
        .await
        .expect("send");
    match client.recv().await {
        ServerMessage::Rejected { reason, .. } => assert_eq!(reason, RejectReason::BadRequest),
        other => panic!("expected Rejected, got {other:?}"),
    }

    // Still connected.
    client.send(ClientMessage::Heartbeat { client_time: 1 }).await;
    assert!(matches!(
        client.recv().await,
        ServerMessage::HeartbeatAck { client_time: 1, .. }
    ));
}

#[tokio::test]
async fn test_reset_and_leave() {
    let addr = start_server().await;
    let mut alice = Client::connect(&addr).await;
    let mut bob = Client::connect(&addr).await;
    let code = alice.create("alice").await;
    bob.join(&code, "bob").await;
    alice.next_room_update().await;

    alice.send(ClientMessage::MakeMove { cell: 4 }).await;
    alice.next_room_update().await;
    bob.next_room_update().await;

    bob.send(ClientMessage::ResetGame).await;
    assert!(matches!(bob.recv().await, ServerMessage::GameReset { .. }));
    let room = alice.next_room_update().await;
    assert_eq!(room.round_count, 1);
    assert_eq!(room.current_player, Symbol::X);

    bob.send(ClientMessage::LeaveRoom).await;
    assert_eq!(
        bob.recv_until(|m| matches!(m, ServerMessage::Left { .. })).await,
        ServerMessage::Left { code: code.clone() }
    );
    let room = alice.next_room_update().await;
    assert_eq!(room.players.len(), 1);
}

#[tokio::test]
async fn test_idle_connection_dropped() {
    let addr =
        start_server_with(NoughtsServer::builder().idle_timeout(Duration::from_millis(100))).await;
    let mut client = Client::connect(&addr).await;

    let next = tokio::time::timeout(RECV_TIMEOUT, client.ws.next())
        .await
        .expect("server should close the idle connection");
    assert!(matches!(next, None | Some(Ok(Message::Close(_))) | Some(Err(_))));
}

#[tokio::test]
async fn test_pings_keep_idle_connection_alive() {
    let addr =
        start_server_with(NoughtsServer::builder().idle_timeout(Duration::from_millis(300))).await;
    let mut client = Client::connect(&addr).await;

    // Well past the idle timeout, with only transport-level pings.
    for _ in 0..6 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        client
            .ws
            .send(Message::Ping(b"keepalive".to_vec().into()))
            .await
            .expect("ping");
    }

    client.send(ClientMessage::Heartbeat { client_time: 9 }).await;
    assert!(matches!(
        client.recv().await,
        ServerMessage::HeartbeatAck { client_time: 9, .. }
    ));
}

#[tokio::test]
async fn test_silent_socket_does_not_block_other_clients() {
    let addr = start_server().await;

    // Opens TCP, never sends the WebSocket upgrade request.
    let _silent = tokio::net::TcpStream::connect(addr.as_str()).await.expect("tcp connect");
    tokio::time::sleep(Duration::from_millis(20)).await;

    let client = tokio::time::timeout(Duration::from_secs(3), Client::connect(&addr))
        .await
        .expect("a well-behaved client connects while another socket is silent");
    assert!(client.id.0 > 0);
}

#[tokio::test]
async fn test_silent_socket_dropped_after_handshake_timeout() {
    use tokio::io::AsyncReadExt;

    let addr = start_server_with(
        NoughtsServer::builder().handshake_timeout(Duration::from_millis(100)),
    )
    .await;
    let mut silent = tokio::net::TcpStream::connect(addr.as_str()).await.expect("tcp connect");

    let mut buf = [0u8; 16];
    let read = tokio::time::timeout(RECV_TIMEOUT, silent.read(&mut buf))
        .await
        .expect("server should drop the silent socket");
    assert!(matches!(read, Ok(0) | Err(_)));
}
