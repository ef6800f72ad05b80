use crate::error::DecodeError;

use super::PROTOCOL_VERSION;
use super::codec::PacketReader;
use super::packet::{Packet, PacketListener};
use super::registry::PacketRegistry;

/// Why a frame was dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("protocol mismatch: expected {expected}, got {found}")]
    ProtocolMismatch { expected: i32, found: i32 },
    #[error("unknown packet type '{0}'")]
    UnknownPacketType(String),
    #[error(transparent)]
    Decode(DecodeError),
}

impl From<DecodeError> for FrameError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownPacketType(key) => Self::UnknownPacketType(key),
            other => Self::Decode(other),
        }
    }
}

/// Turns received frames into packets and hands them to a listener.
#[derive(Debug, Clone, Default)]
pub struct NetworkHandler {
    registry: PacketRegistry,
}

impl NetworkHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: PacketRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PacketRegistry {
        &self.registry
    }

    pub fn decode_frame_checked(&self, frame: &[u8]) -> Result<Packet, FrameError> {
        let mut input = PacketReader::new(frame);
        let version = input.read_i32()?;
        if version != PROTOCOL_VERSION {
            return Err(FrameError::ProtocolMismatch {
                expected: PROTOCOL_VERSION,
                found: version,
            });
        }
        let key = input.read_str()?;
        Ok(self.registry.decode(key, &mut input)?)
    }

    /// `None` for any frame that cannot be used. The reason is logged; the
    /// connection is never torn down over a bad frame.
    pub fn decode_frame(&self, frame: &[u8]) -> Option<Packet> {
        match self.decode_frame_checked(frame) {
            Ok(packet) => Some(packet),
            Err(err) => {
                log::warn!("Dropping frame of {} bytes: {}", frame.len(), err);
                None
            }
        }
    }

    /// Decode and dispatch one frame. Returns whether a packet was dispatched.
    pub fn receive<L: PacketListener + ?Sized>(&self, listener: &mut L, frame: &[u8]) -> bool {
        match self.decode_frame(frame) {
            Some(packet) => {
                packet.handle(listener);
                true
            }
            None => false,
        }
    }
}
