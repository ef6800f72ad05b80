use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::SocketAddr;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use vellum::{Authority, PlayerId, Session, SessionEvent, read_frame, write_frame};

use crate::config::ServerConfig;
use crate::demo;
use crate::events::{DisconnectReason, ServerEvent};

type Outbound = mpsc::Sender<Vec<u8>>;

/// What the per-connection tasks report to the authoritative loop.
#[derive(Debug)]
enum Inbound {
    Frame { player: PlayerId, frame: Vec<u8> },
    Closed { player: PlayerId, reason: DisconnectReason },
}

/// Owns every session and the authoritative UI state. Connection tasks only
/// move bytes; all state changes happen on the task running [`UiServer::run`].
pub struct UiServer {
    listener: TcpListener,
    config: ServerConfig,
    authority: Authority,
    sessions: HashMap<PlayerId, Session<Outbound>>,
    next_player: PlayerId,
    pending_events: VecDeque<ServerEvent>,
}

impl UiServer {
    pub async fn bind(bind_addr: &str, config: ServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(bind_addr).await?;

        let mut authority = Authority::new();
        authority.screens_mut().insert(demo::menu()?);
        authority.screens_mut().insert(demo::hud()?);
        demo::register_handlers(authority.actions_mut());

        Ok(Self {
            listener,
            config,
            authority,
            sessions: HashMap::new(),
            next_player: 1,
            pending_events: VecDeque::new(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = ServerEvent> + '_ {
        self.pending_events.drain(..)
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => self.accept(stream, addr, inbound_tx.clone()),
                    Err(e) => self.pending_events.push_back(ServerEvent::Error {
                        message: format!("Accept failed: {}", e),
                    }),
                },
                Some(inbound) = inbound_rx.recv() => self.handle_inbound(inbound),
                _ = tokio::signal::ctrl_c() => break,
            }

            for event in self.drain_events() {
                event.log();
            }
        }

        self.shutdown_connections();
        Ok(())
    }

    /// Drops every session, which closes their writer tasks.
    pub fn shutdown_connections(&mut self) {
        let players: Vec<PlayerId> = self.sessions.keys().copied().collect();
        for player in players {
            self.sessions.remove(&player);
            ServerEvent::ClientDisconnected {
                player,
                reason: DisconnectReason::Graceful,
            }
            .log();
        }
    }

    fn accept(
        &mut self,
        stream: TcpStream,
        addr: SocketAddr,
        inbound: mpsc::UnboundedSender<Inbound>,
    ) {
        if self.sessions.len() >= self.config.max_connections {
            self.pending_events.push_back(ServerEvent::ConnectionDenied {
                addr,
                reason: "server full".to_string(),
            });
            return;
        }
        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("Could not disable Nagle for {}: {}", addr, e);
        }

        let player = self.next_player;
        self.next_player = self.next_player.wrapping_add(1);

        let (outbound_tx, outbound_rx) = mpsc::channel(self.config.outbound_queue);
        let (reader, writer) = stream.into_split();
        tokio::spawn(read_loop(player, reader, inbound));
        tokio::spawn(write_loop(player, writer, outbound_rx));

        self.sessions.insert(player, Session::new(player, outbound_tx));
        self.pending_events
            .push_back(ServerEvent::ClientConnected { player, addr });
    }

    fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Frame { player, frame } => {
                let Some(session) = self.sessions.get_mut(&player) else {
                    return;
                };
                self.authority.receive(session, &frame);
                self.process_session_events();
            }
            Inbound::Closed { player, reason } => {
                if self.sessions.remove(&player).is_some() {
                    self.pending_events
                        .push_back(ServerEvent::ClientDisconnected { player, reason });
                }
            }
        }
    }

    fn process_session_events(&mut self) {
        let events: Vec<SessionEvent> = self.authority.drain_events().collect();
        for event in events {
            match event {
                SessionEvent::Joined { player, protocol } => {
                    self.pending_events
                        .push_back(ServerEvent::ClientJoined { player, protocol });
                    if self.config.demo_screen_on_join {
                        self.open_demo(player);
                    }
                }
                SessionEvent::Incompatible { player, protocol } => {
                    self.pending_events
                        .push_back(ServerEvent::ClientIncompatible { player, protocol });
                }
                SessionEvent::ScreenClosed { player, screen } => {
                    self.pending_events
                        .push_back(ServerEvent::ScreenClosed { player, screen });
                }
            }
        }
    }

    fn open_demo(&mut self, player: PlayerId) {
        let Some(session) = self.sessions.get_mut(&player) else {
            return;
        };
        for screen in [demo::HUD, demo::MENU] {
            if let Err(e) = self.authority.open_screen(session, screen) {
                self.pending_events.push_back(ServerEvent::Error {
                    message: format!("Failed to open {} for player {}: {}", screen, player, e),
                });
            }
        }
    }
}

async fn read_loop(
    player: PlayerId,
    mut reader: OwnedReadHalf,
    inbound: mpsc::UnboundedSender<Inbound>,
) {
    let reason = loop {
        match read_frame(&mut reader).await {
            Ok(Some(frame)) => {
                if inbound.send(Inbound::Frame { player, frame }).is_err() {
                    return;
                }
            }
            Ok(None) => break DisconnectReason::Graceful,
            Err(e) => {
                log::debug!("Read from player {} failed: {}", player, e);
                break DisconnectReason::Reset;
            }
        }
    };
    let _ = inbound.send(Inbound::Closed { player, reason });
}

async fn write_loop(
    player: PlayerId,
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::Receiver<Vec<u8>>,
) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = write_frame(&mut writer, &frame).await {
            log::debug!("Write to player {} failed: {}", player, e);
            break;
        }
    }
}
