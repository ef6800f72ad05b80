use std::collections::HashMap;

use crate::error::DecodeError;
use crate::key::Key;

use super::codec::PacketReader;
use super::packet::{
    ButtonClick, CheckboxToggle, CloseScreen, ElementUpsert, Hello, OpenScreen, Packet, PacketBody,
    RadioToggle, SliderChange, TextboxChange, Textures,
};

pub type PacketDecoder = fn(&mut PacketReader<'_>) -> Result<Packet, DecodeError>;

fn decode_body<T: PacketBody>(input: &mut PacketReader<'_>) -> Result<Packet, DecodeError> {
    T::read(input).map(Into::into)
}

/// Packet key to decoder. Filled once at startup, read-only afterwards.
#[derive(Debug, Clone)]
pub struct PacketRegistry {
    decoders: HashMap<Key, PacketDecoder>,
}

impl PacketRegistry {
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registry holding every built-in packet kind.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<Hello>();
        registry.register::<ElementUpsert>();
        registry.register::<OpenScreen>();
        registry.register::<CloseScreen>();
        registry.register::<ButtonClick>();
        registry.register::<CheckboxToggle>();
        registry.register::<RadioToggle>();
        registry.register::<SliderChange>();
        registry.register::<TextboxChange>();
        registry.register::<Textures>();
        registry
    }

    pub fn register<T: PacketBody>(&mut self) {
        self.decoders.insert(T::KIND.key().clone(), decode_body::<T>);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.decoders.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decodes the fields following the packet key. Trailing bytes are ignored.
    pub fn decode(&self, key: &str, input: &mut PacketReader<'_>) -> Result<Packet, DecodeError> {
        match self.decoders.get(key) {
            Some(decode) => decode(input),
            None => Err(DecodeError::UnknownPacketType(key.to_string())),
        }
    }
}

impl Default for PacketRegistry {
    fn default() -> Self {
        Self::new()
    }
}
