pub mod action;
pub mod client;
mod error;
pub mod gui;
pub mod key;
pub mod net;
pub mod session;

pub use action::{
    Action, ActionRegistry, ButtonClicked, Cancellable, CheckboxToggled, PlayerJoined,
    RadioToggled, ScreenClosed, SliderChanged, TextboxChanged,
};
pub use client::{ClientError, ClientEvent, ClientState};
pub use error::{DecodeError, EncodeError};
pub use gui::{Element, ElementType, Screen, ScreenError, ScreenKind, Texture, TextureManager};
pub use key::{InvalidKey, Key, Keyed};
pub use net::{
    Channel, ChannelError, Connection, DEFAULT_PORT, NetworkHandler, PROTOCOL_VERSION, Packet,
    PacketKind, PacketListener, PacketRegistry, read_frame, write_frame,
};
pub use session::{Authority, PlayerId, ScreenStore, Session, SessionError, SessionEvent};
