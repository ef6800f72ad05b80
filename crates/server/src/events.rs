use std::net::SocketAddr;

use vellum::{Key, PlayerId};

#[derive(Debug, Clone)]
pub enum ServerEvent {
    ClientConnected {
        player: PlayerId,
        addr: SocketAddr,
    },
    ClientJoined {
        player: PlayerId,
        protocol: i32,
    },
    ClientIncompatible {
        player: PlayerId,
        protocol: i32,
    },
    ScreenClosed {
        player: PlayerId,
        screen: Key,
    },
    ClientDisconnected {
        player: PlayerId,
        reason: DisconnectReason,
    },
    ConnectionDenied {
        addr: SocketAddr,
        reason: String,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn log(&self) {
        match self {
            ServerEvent::ClientConnected { player, addr } => {
                log::info!("Player {} connected from {}", player, addr);
            }
            ServerEvent::ClientJoined { player, protocol } => {
                log::info!("Player {} joined with protocol {}", player, protocol);
            }
            ServerEvent::ClientIncompatible { player, protocol } => {
                log::warn!("Player {} has incompatible protocol {}", player, protocol);
            }
            ServerEvent::ScreenClosed { player, screen } => {
                log::info!("Player {} closed {}", player, screen);
            }
            ServerEvent::ClientDisconnected { player, reason } => {
                log::info!("Player {} {}", player, reason.as_str());
            }
            ServerEvent::ConnectionDenied { addr, reason } => {
                log::warn!("Connection denied to {}: {}", addr, reason);
            }
            ServerEvent::Error { message } => {
                log::error!("{}", message);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    Graceful,
    Reset,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::Graceful => "disconnected",
            DisconnectReason::Reset => "lost connection",
        }
    }
}
