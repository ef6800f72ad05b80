use std::sync::LazyLock;

use serde_json::Value;

use crate::error::{DecodeError, EncodeError};
use crate::gui::{Element, Screen, Texture};
use crate::key::{Key, Keyed};

use super::PROTOCOL_VERSION;
use super::codec::{PacketReader, PacketWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Hello,
    ElementUpsert,
    OpenScreen,
    CloseScreen,
    ButtonClick,
    CheckboxToggle,
    RadioToggle,
    SliderChange,
    TextboxChange,
    Textures,
}

impl PacketKind {
    pub const ALL: [PacketKind; 10] = [
        Self::Hello,
        Self::ElementUpsert,
        Self::OpenScreen,
        Self::CloseScreen,
        Self::ButtonClick,
        Self::CheckboxToggle,
        Self::RadioToggle,
        Self::SliderChange,
        Self::TextboxChange,
        Self::Textures,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hello => "packet:hello",
            Self::ElementUpsert => "packet:element",
            Self::OpenScreen => "packet:open_screen",
            Self::CloseScreen => "packet:close_screen",
            Self::ButtonClick => "packet:button_click",
            Self::CheckboxToggle => "packet:checkbox_toggle",
            Self::RadioToggle => "packet:radio_toggle",
            Self::SliderChange => "packet:slider_change",
            Self::TextboxChange => "packet:textbox_change",
            Self::Textures => "packet:textures",
        }
    }

    pub fn key(&self) -> &'static Key {
        static KEYS: LazyLock<Vec<Key>> = LazyLock::new(|| {
            PacketKind::ALL
                .iter()
                .map(|kind| Key::from_static(kind.as_str()))
                .collect()
        });
        &KEYS[*self as usize]
    }
}

/// Field layout of one packet kind.
pub trait PacketBody: Sized + Into<Packet> {
    const KIND: PacketKind;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError>;

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError>;
}

/// Protocol announcement. Each side sends one; the authoritative side always
/// answers with its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Hello {
    pub protocol: i32,
}

impl Default for Hello {
    fn default() -> Self {
        Self {
            protocol: PROTOCOL_VERSION,
        }
    }
}

impl PacketBody for Hello {
    const KIND: PacketKind = PacketKind::Hello;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_i32(self.protocol);
        Ok(())
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            protocol: input.read_i32()?,
        })
    }
}

/// Wholesale replacement (or insertion) of one element on a screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementUpsert {
    pub screen: Key,
    pub element: Element,
}

impl PacketBody for ElementUpsert {
    const KIND: PacketKind = PacketKind::ElementUpsert;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_key(&self.screen)?;
        out.write_str(&self.element.to_json()?)
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        let screen = input.read_key()?;
        let element = Element::from_json(input.read_str()?)?;
        Ok(Self { screen, element })
    }
}

/// Shows a screen. Without a payload the receiver reopens a screen it already
/// holds under that key.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenScreen {
    pub screen_key: Key,
    pub screen: Option<Screen>,
}

impl OpenScreen {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen_key: screen.key().clone(),
            screen: Some(screen),
        }
    }
}

impl PacketBody for OpenScreen {
    const KIND: PacketKind = PacketKind::OpenScreen;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_key(&self.screen_key)?;
        out.write_bool(self.screen.is_some());
        if let Some(screen) = &self.screen {
            out.write_str(&screen.to_json()?)?;
        }
        Ok(())
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        let screen_key = input.read_key()?;
        let screen = if input.read_bool()? {
            let screen = Screen::from_json(input.read_str()?)?;
            if screen.key() != &screen_key {
                return Err(DecodeError::Malformed(format!(
                    "screen {} sent under key {}",
                    screen.key(),
                    screen_key
                )));
            }
            Some(screen)
        } else {
            None
        };
        Ok(Self { screen_key, screen })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloseScreen {
    pub screen: Key,
}

impl PacketBody for CloseScreen {
    const KIND: PacketKind = PacketKind::CloseScreen;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_key(&self.screen)
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            screen: input.read_key()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonClick {
    pub screen: Key,
    pub element: Key,
}

impl PacketBody for ButtonClick {
    const KIND: PacketKind = PacketKind::ButtonClick;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_key(&self.screen)?;
        out.write_key(&self.element)
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            screen: input.read_key()?,
            element: input.read_key()?,
        })
    }
}

/// Intent from the client, or a correction from the authoritative side.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckboxToggle {
    pub screen: Key,
    pub element: Key,
    pub selected: bool,
}

impl PacketBody for CheckboxToggle {
    const KIND: PacketKind = PacketKind::CheckboxToggle;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_key(&self.screen)?;
        out.write_key(&self.element)?;
        out.write_bool(self.selected);
        Ok(())
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            screen: input.read_key()?,
            element: input.read_key()?,
            selected: input.read_bool()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadioToggle {
    pub screen: Key,
    pub element: Key,
    pub selected: bool,
}

impl PacketBody for RadioToggle {
    const KIND: PacketKind = PacketKind::RadioToggle;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_key(&self.screen)?;
        out.write_key(&self.element)?;
        out.write_bool(self.selected);
        Ok(())
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            screen: input.read_key()?,
            element: input.read_key()?,
            selected: input.read_bool()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderChange {
    pub screen: Key,
    pub element: Key,
    pub value: f64,
}

impl PacketBody for SliderChange {
    const KIND: PacketKind = PacketKind::SliderChange;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_key(&self.screen)?;
        out.write_key(&self.element)?;
        out.write_f64(self.value);
        Ok(())
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        let screen = input.read_key()?;
        let element = input.read_key()?;
        let value = input.read_f64()?;
        if !value.is_finite() {
            return Err(DecodeError::Malformed(format!(
                "slider value {value} for {element} is not finite"
            )));
        }
        Ok(Self {
            screen,
            element,
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextboxChange {
    pub screen: Key,
    pub element: Key,
    pub value: String,
}

impl PacketBody for TextboxChange {
    const KIND: PacketKind = PacketKind::TextboxChange;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_key(&self.screen)?;
        out.write_key(&self.element)?;
        out.write_str(&self.value)
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            screen: input.read_key()?,
            element: input.read_key()?,
            value: input.read_string()?,
        })
    }
}

/// Every texture the authoritative side wants preloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Textures {
    pub textures: Vec<Texture>,
}

impl PacketBody for Textures {
    const KIND: PacketKind = PacketKind::Textures;

    fn write(&self, out: &mut PacketWriter) -> Result<(), EncodeError> {
        out.write_str(&serde_json::to_string(&self.textures)?)
    }

    fn read(input: &mut PacketReader<'_>) -> Result<Self, DecodeError> {
        let doc: Value = serde_json::from_str(input.read_str()?).map_err(DecodeError::malformed)?;
        let list = doc
            .as_array()
            .ok_or_else(|| DecodeError::Malformed("texture list is not a list".to_string()))?;
        let textures = list
            .iter()
            .map(Texture::from_structured)
            .collect::<Result<_, _>>()?;
        Ok(Self { textures })
    }
}

/// One decoded wire message.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Hello(Hello),
    ElementUpsert(ElementUpsert),
    OpenScreen(OpenScreen),
    CloseScreen(CloseScreen),
    ButtonClick(ButtonClick),
    CheckboxToggle(CheckboxToggle),
    RadioToggle(RadioToggle),
    SliderChange(SliderChange),
    TextboxChange(TextboxChange),
    Textures(Textures),
}

macro_rules! packet_variants {
    ($($variant:ident),* $(,)?) => {$(
        impl From<$variant> for Packet {
            fn from(value: $variant) -> Self {
                Packet::$variant(value)
            }
        }
    )*};
}

packet_variants!(
    Hello,
    ElementUpsert,
    OpenScreen,
    CloseScreen,
    ButtonClick,
    CheckboxToggle,
    RadioToggle,
    SliderChange,
    TextboxChange,
    Textures,
);

impl Packet {
    pub fn kind(&self) -> PacketKind {
        match self {
            Self::Hello(_) => PacketKind::Hello,
            Self::ElementUpsert(_) => PacketKind::ElementUpsert,
            Self::OpenScreen(_) => PacketKind::OpenScreen,
            Self::CloseScreen(_) => PacketKind::CloseScreen,
            Self::ButtonClick(_) => PacketKind::ButtonClick,
            Self::CheckboxToggle(_) => PacketKind::CheckboxToggle,
            Self::RadioToggle(_) => PacketKind::RadioToggle,
            Self::SliderChange(_) => PacketKind::SliderChange,
            Self::TextboxChange(_) => PacketKind::TextboxChange,
            Self::Textures(_) => PacketKind::Textures,
        }
    }

    /// Version, packet key, then the kind's fields.
    pub fn encode_frame(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = PacketWriter::new();
        out.write_i32(PROTOCOL_VERSION);
        out.write_str(self.kind().as_str())?;
        match self {
            Self::Hello(p) => p.write(&mut out)?,
            Self::ElementUpsert(p) => p.write(&mut out)?,
            Self::OpenScreen(p) => p.write(&mut out)?,
            Self::CloseScreen(p) => p.write(&mut out)?,
            Self::ButtonClick(p) => p.write(&mut out)?,
            Self::CheckboxToggle(p) => p.write(&mut out)?,
            Self::RadioToggle(p) => p.write(&mut out)?,
            Self::SliderChange(p) => p.write(&mut out)?,
            Self::TextboxChange(p) => p.write(&mut out)?,
            Self::Textures(p) => p.write(&mut out)?,
        }
        Ok(out.into_bytes())
    }

    pub fn handle<L: PacketListener + ?Sized>(&self, listener: &mut L) {
        match self {
            Self::Hello(p) => listener.on_hello(p),
            Self::ElementUpsert(p) => listener.on_element_upsert(p),
            Self::OpenScreen(p) => listener.on_open_screen(p),
            Self::CloseScreen(p) => listener.on_close_screen(p),
            Self::ButtonClick(p) => listener.on_button_click(p),
            Self::CheckboxToggle(p) => listener.on_checkbox_toggle(p),
            Self::RadioToggle(p) => listener.on_radio_toggle(p),
            Self::SliderChange(p) => listener.on_slider_change(p),
            Self::TextboxChange(p) => listener.on_textbox_change(p),
            Self::Textures(p) => listener.on_textures(p),
        }
    }
}

impl Keyed for Packet {
    fn key(&self) -> &Key {
        self.kind().key()
    }
}

/// Receiver side of [`Packet::handle`].
///
/// Each side only implements the kinds its peer is expected to send; the
/// rest are logged and ignored.
pub trait PacketListener {
    fn on_hello(&mut self, packet: &Hello) {
        ignored(PacketKind::Hello, packet);
    }

    fn on_element_upsert(&mut self, packet: &ElementUpsert) {
        ignored(PacketKind::ElementUpsert, packet);
    }

    fn on_open_screen(&mut self, packet: &OpenScreen) {
        ignored(PacketKind::OpenScreen, packet);
    }

    fn on_close_screen(&mut self, packet: &CloseScreen) {
        ignored(PacketKind::CloseScreen, packet);
    }

    fn on_button_click(&mut self, packet: &ButtonClick) {
        ignored(PacketKind::ButtonClick, packet);
    }

    fn on_checkbox_toggle(&mut self, packet: &CheckboxToggle) {
        ignored(PacketKind::CheckboxToggle, packet);
    }

    fn on_radio_toggle(&mut self, packet: &RadioToggle) {
        ignored(PacketKind::RadioToggle, packet);
    }

    fn on_slider_change(&mut self, packet: &SliderChange) {
        ignored(PacketKind::SliderChange, packet);
    }

    fn on_textbox_change(&mut self, packet: &TextboxChange) {
        ignored(PacketKind::TextboxChange, packet);
    }

    fn on_textures(&mut self, packet: &Textures) {
        ignored(PacketKind::Textures, packet);
    }
}

fn ignored(kind: PacketKind, packet: &impl std::fmt::Debug) {
    log::debug!("Ignoring unexpected {} packet: {:?}", kind.as_str(), packet);
}
