mod codec;
mod connection;
mod handler;
mod packet;
mod registry;
mod transport;

pub use codec::{MAX_STRING_LEN, PacketReader, PacketWriter};
pub use connection::{Channel, ChannelError, Connection};
pub use handler::{FrameError, NetworkHandler};
pub use packet::{
    ButtonClick, CheckboxToggle, CloseScreen, ElementUpsert, Hello, OpenScreen, Packet, PacketBody,
    PacketKind, PacketListener, RadioToggle, SliderChange, TextboxChange, Textures,
};
pub use registry::{PacketDecoder, PacketRegistry};
pub use transport::{MAX_FRAME_SIZE, read_frame, write_frame};

/// Bumped whenever the frame layout or a packet's fields change.
pub const PROTOCOL_VERSION: i32 = 1;
pub const DEFAULT_PORT: u16 = 27015;
