//! Integration tests for the sidebar server and viewer
//!
//! These tests validate cross-component interactions and real network behavior.

use bincode::{deserialize, serialize};
use client::network::{BoardView, ConnectionStatus};
use server::config::ServerConfig;
use server::network::{OutboundMessage, Server};
use server::{
    ContentHandler, Holder, ManualScheduler, PacketBoard, RemotePlayer, Scheduler, Scoreboard,
    SnapshotHandler,
};
use shared::{Entry, Packet, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

/// IN-PROCESS SESSION TO VIEWER TESTS
mod session_viewer_tests {
    use super::*;

    struct Pipeline {
        player: Arc<RemotePlayer>,
        scheduler: Arc<ManualScheduler>,
        handler: Arc<SnapshotHandler>,
        scoreboard: Scoreboard<RemotePlayer, PacketBoard>,
        outbound: mpsc::UnboundedReceiver<OutboundMessage>,
        view: BoardView,
    }

    impl Pipeline {
        fn new() -> Self {
            let (tx, outbound) = mpsc::unbounded_channel();
            let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
            let player = Arc::new(RemotePlayer::new(1, addr, tx));
            let scheduler = Arc::new(ManualScheduler::new());
            let handler = Arc::new(SnapshotHandler::new());

            let scoreboard = Scoreboard::new(
                Arc::clone(&player),
                PacketBoard::new(Arc::clone(&player)),
                Arc::clone(&scheduler) as Arc<dyn Scheduler>,
            )
            .unwrap();
            scoreboard.set_handler(Arc::clone(&handler) as Arc<dyn ContentHandler<RemotePlayer>>);

            Self {
                player,
                scheduler,
                handler,
                scoreboard,
                outbound,
                view: BoardView::new(),
            }
        }

        /// Ships every queued frame through bincode into the viewer
        fn deliver(&mut self) -> usize {
            let mut delivered = 0;
            while let Ok(message) = self.outbound.try_recv() {
                let bytes = serialize(&message.packet).unwrap();
                self.view.handle_packet(deserialize(&bytes).unwrap());
                delivered += 1;
            }
            delivered
        }

        fn rows(&self) -> Vec<(String, i32)> {
            self.view
                .board
                .sidebar_lines()
                .into_iter()
                .map(|row| (row.text.plain_text(), row.score))
                .collect()
        }
    }

    #[test]
    fn viewer_sees_rendered_sidebar() {
        let mut p = Pipeline::new();
        p.handler.set_title("&6&lArena");
        p.handler.set_entries(vec![
            Entry::new("§fTop", 2),
            Entry::new("§aMiddle", 1),
            Entry::new("§7Bottom", 0),
        ]);

        p.scoreboard.activate().unwrap();
        p.scheduler.tick();
        p.deliver();

        assert_eq!(p.view.rejected, 0);
        assert_eq!(
            p.view.board.sidebar_title().map(|t| t.plain_text()),
            Some("Arena".to_string())
        );
        assert_eq!(
            p.rows(),
            vec![
                ("Top".to_string(), 2),
                ("Middle".to_string(), 1),
                ("Bottom".to_string(), 0),
            ]
        );
    }

    #[test]
    fn line_changes_only_rewrite_prefixes() {
        let mut p = Pipeline::new();
        p.handler.set_entries(vec![Entry::new("Points: 1", 3)]);
        p.scoreboard.activate().unwrap();
        p.scheduler.tick();
        p.deliver();

        p.handler.set_entries(vec![Entry::new("Points: 2", 3)]);
        p.scheduler.advance(server::session::DEFAULT_UPDATE_INTERVAL);

        let mut frames = Vec::new();
        while let Ok(message) = p.outbound.try_recv() {
            frames.push(message.packet.clone());
            p.view.handle_packet(message.packet);
        }

        // No team churn, so the line never leaves the viewer's sidebar
        assert!(frames.iter().all(|f| !matches!(
            f,
            Packet::Board(shared::BoardOp::RegisterTeam { .. })
                | Packet::Board(shared::BoardOp::UnregisterTeam { .. })
        )));
        assert_eq!(p.rows(), vec![("Points: 2".to_string(), 3)]);
    }

    #[test]
    fn deactivate_returns_viewer_to_default() {
        let mut p = Pipeline::new();
        p.handler.set_entries(vec![Entry::new("A", 1), Entry::new("B", 0)]);
        p.scoreboard.activate().unwrap();
        p.scheduler.tick();
        p.deliver();
        assert_eq!(p.view.board.sidebar_objective(), Some("board"));

        p.scoreboard.deactivate();
        p.deliver();

        assert_eq!(p.view.board.sidebar_objective(), None);
        assert_eq!(p.view.board.team_count(), 0);
        assert_eq!(p.view.rejected, 0);
    }

    #[test]
    fn departed_viewer_receives_nothing_more() {
        let mut p = Pipeline::new();
        p.handler.set_entries(vec![Entry::new("A", 1)]);
        p.scoreboard.activate().unwrap();
        p.scheduler.tick();
        p.deliver();

        p.player.mark_disconnected();
        p.handler.set_entries(vec![Entry::new("B", 1)]);
        p.scheduler.advance(server::session::DEFAULT_UPDATE_INTERVAL);

        assert_eq!(p.deliver(), 0);
        assert!(!p.scoreboard.is_activated());
        assert!(!p.player.is_connected());
        assert_eq!(p.scheduler.active_count(), 0);
    }
}

/// UDP END-TO-END TESTS
mod network_tests {
    use super::*;

    async fn start_server(max_clients: usize) -> SocketAddr {
        let config = ServerConfig {
            port: 0,
            tick_rate: 50,
            update_interval: 1,
            max_clients,
            ..ServerConfig::default()
        };
        let mut server = Server::new(config).await.unwrap();
        let addr = server.local_addr().unwrap();

        tokio::spawn(async move {
            let _ = server.run().await;
        });

        addr
    }

    async fn connect(server_addr: SocketAddr) -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let packet = Packet::Connect {
            client_version: PROTOCOL_VERSION,
        };
        socket
            .send_to(&serialize(&packet).unwrap(), server_addr)
            .await
            .unwrap();
        socket
    }

    /// Feeds packets into `view` until `done` holds or the deadline passes
    async fn receive_until(
        socket: &UdpSocket,
        view: &mut BoardView,
        done: impl Fn(&BoardView) -> bool,
    ) -> bool {
        let deadline = Instant::now() + Duration::from_secs(3);
        let mut buffer = vec![0u8; MAX_PACKET_SIZE];

        while Instant::now() < deadline {
            if done(view) {
                return true;
            }
            if let Ok(Ok((len, _))) =
                timeout(Duration::from_millis(200), socket.recv_from(&mut buffer)).await
            {
                if let Ok(packet) = deserialize::<Packet>(&buffer[..len]) {
                    view.handle_packet(packet);
                }
            }
        }
        done(view)
    }

    #[tokio::test]
    async fn viewer_receives_arena_board() {
        let server_addr = start_server(4).await;
        let socket = connect(server_addr).await;
        let mut view = BoardView::new();

        let ready = receive_until(&socket, &mut view, |v| {
            v.is_connected() && v.board.sidebar_lines().len() == 8
        })
        .await;

        assert!(ready, "sidebar never filled in: {:?}", view.status);
        assert_eq!(view.status, ConnectionStatus::Connected { client_id: 1 });
        assert_eq!(
            view.board.sidebar_title().map(|t| t.plain_text()),
            Some("ARENA".to_string())
        );
        assert!(view
            .board
            .sidebar_lines()
            .iter()
            .any(|row| row.text.plain_text() == "Player: Player1"));
        assert_eq!(view.rejected, 0);

        let bye = serialize(&Packet::Disconnect).unwrap();
        socket.send_to(&bye, server_addr).await.unwrap();
    }

    #[tokio::test]
    async fn second_viewer_rejected_when_full() {
        let server_addr = start_server(1).await;

        let first = connect(server_addr).await;
        let mut first_view = BoardView::new();
        assert!(receive_until(&first, &mut first_view, BoardView::is_connected).await);

        let second = connect(server_addr).await;
        let mut second_view = BoardView::new();
        let rejected = receive_until(&second, &mut second_view, |v| {
            matches!(v.status, ConnectionStatus::Disconnected { .. })
        })
        .await;

        assert!(rejected);
        assert_eq!(
            second_view.status,
            ConnectionStatus::Disconnected {
                reason: "Server full".to_string()
            }
        );
    }

    #[tokio::test]
    async fn outdated_viewer_rejected() {
        let server_addr = start_server(4).await;
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let packet = Packet::Connect {
            client_version: PROTOCOL_VERSION + 1,
        };
        socket
            .send_to(&serialize(&packet).unwrap(), server_addr)
            .await
            .unwrap();

        let mut view = BoardView::new();
        let rejected = receive_until(&socket, &mut view, |v| {
            matches!(v.status, ConnectionStatus::Disconnected { .. })
        })
        .await;

        assert!(rejected);
        assert!(view.board.sidebar_objective().is_none());
    }
}
