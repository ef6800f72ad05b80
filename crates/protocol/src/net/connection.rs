use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::EncodeError;

use super::PROTOCOL_VERSION;
use super::packet::Packet;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,
    #[error("outbound queue full")]
    Full,
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Raw byte pipe to the peer. Each call carries exactly one frame and must
/// not block.
pub trait Channel {
    fn send_frame(&mut self, frame: Vec<u8>) -> Result<(), ChannelError>;
}

impl Channel for mpsc::Sender<Vec<u8>> {
    fn send_frame(&mut self, frame: Vec<u8>) -> Result<(), ChannelError> {
        self.try_send(frame).map_err(|err| match err {
            TrySendError::Full(_) => ChannelError::Full,
            TrySendError::Closed(_) => ChannelError::Closed,
        })
    }
}

impl Channel for mpsc::UnboundedSender<Vec<u8>> {
    fn send_frame(&mut self, frame: Vec<u8>) -> Result<(), ChannelError> {
        self.send(frame).map_err(|_| ChannelError::Closed)
    }
}

/// Collects frames in memory.
impl Channel for Vec<Vec<u8>> {
    fn send_frame(&mut self, frame: Vec<u8>) -> Result<(), ChannelError> {
        self.push(frame);
        Ok(())
    }
}

/// A channel plus what is known about the peer on the other end of it.
///
/// Until the peer has announced a matching protocol only forced packets
/// (the handshake) go out; everything else is silently held back.
#[derive(Debug)]
pub struct Connection<C> {
    channel: C,
    remote_protocol: Option<i32>,
}

impl<C: Channel> Connection<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            remote_protocol: None,
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    pub fn remote_protocol(&self) -> Option<i32> {
        self.remote_protocol
    }

    /// Records the peer's announced protocol and returns whether it matches.
    pub fn set_remote_protocol(&mut self, protocol: i32) -> bool {
        self.remote_protocol = Some(protocol);
        self.is_compatible()
    }

    pub fn is_compatible(&self) -> bool {
        self.remote_protocol == Some(PROTOCOL_VERSION)
    }

    /// Returns `Ok(false)` when the packet was held back by the
    /// compatibility gate.
    pub fn send(&mut self, packet: impl Into<Packet>, force: bool) -> Result<bool, ChannelError> {
        let packet = packet.into();
        if !force && !self.is_compatible() {
            log::debug!(
                "Not sending {} to incompatible peer (protocol {:?})",
                packet.kind().as_str(),
                self.remote_protocol
            );
            return Ok(false);
        }
        self.channel.send_frame(packet.encode_frame()?)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::net::packet::{CloseScreen, Hello};

    fn close() -> CloseScreen {
        CloseScreen {
            screen: Key::parse("t:menu").unwrap(),
        }
    }

    #[test]
    fn gate_holds_back_until_compatible() {
        let mut connection = Connection::new(Vec::new());
        assert!(!connection.send(close(), false).unwrap());
        assert!(connection.send(Hello::default(), true).unwrap());
        assert_eq!(connection.channel().len(), 1);

        assert!(!connection.set_remote_protocol(PROTOCOL_VERSION + 1));
        assert!(!connection.send(close(), false).unwrap());

        assert!(connection.set_remote_protocol(PROTOCOL_VERSION));
        assert!(connection.send(close(), false).unwrap());
        assert_eq!(connection.channel().len(), 2);
    }

    #[test]
    fn bounded_sender_reports_full_and_closed() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut connection = Connection::new(tx);
        connection.send(Hello::default(), true).unwrap();
        assert!(matches!(
            connection.send(Hello::default(), true),
            Err(ChannelError::Full)
        ));
        assert!(rx.try_recv().is_ok());
        drop(rx);
        assert!(matches!(
            connection.send(Hello::default(), true),
            Err(ChannelError::Closed)
        ));
    }
}
