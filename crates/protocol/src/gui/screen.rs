use serde::Serialize;
use serde_json::Value;

use crate::error::{DecodeError, EncodeError};
use crate::gui::{Element, Gradient, Image, Texture};
use crate::key::{Key, Keyed};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScreenError {
    #[error("radio {incoming} cannot be selected while {existing} is selected in the same group")]
    DuplicateSelectedRadio { existing: Key, incoming: Key },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenKind {
    /// Persistent overlay. Never exclusive, never captures input.
    Hud,
    /// Modal. Opening one replaces whatever modal was open before.
    Screen,
}

impl ScreenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hud => "HUD",
            Self::Screen => "SCREEN",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Hud, Self::Screen]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

/// An ordered set of elements sharing one coordinate space.
///
/// Elements are unique by key and keep their insertion order. Within any
/// radio group at most one radio is selected; every mutation path upholds
/// that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    key: Key,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<ScreenKind>,
    elements: Vec<Element>,
}

impl Screen {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            kind: None,
            elements: Vec::new(),
        }
    }

    pub fn builder(key: Key) -> ScreenBuilder {
        ScreenBuilder(Self::new(key))
    }

    /// `None` is treated as a modal screen by clients.
    pub fn kind(&self) -> Option<ScreenKind> {
        self.kind
    }

    pub fn is_hud(&self) -> bool {
        self.kind == Some(ScreenKind::Hud)
    }

    /// Inserts `element`, or replaces the element with the same key in place.
    ///
    /// Fails without touching the screen if `element` is a selected radio and
    /// another radio of its group is already selected.
    pub fn add_element(&mut self, element: impl Into<Element>) -> Result<(), ScreenError> {
        let element = element.into();
        if let Some(radio) = element.as_radio()
            && let Some(group) = radio.group()
            && radio.is_selected()
        {
            let existing = self.elements.iter().filter_map(Element::as_radio).find(|other| {
                other.key() != radio.key() && other.is_selected_in(group)
            });
            if let Some(existing) = existing {
                return Err(ScreenError::DuplicateSelectedRadio {
                    existing: existing.key().clone(),
                    incoming: radio.key().clone(),
                });
            }
        }

        match self.position(element.key().as_str()) {
            Some(index) => self.elements[index] = element,
            None => self.elements.push(element),
        }
        Ok(())
    }

    /// Stops at the first rejected element; the ones before it stay added.
    pub fn add_elements<I>(&mut self, elements: I) -> Result<(), ScreenError>
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        for element in elements {
            self.add_element(element)?;
        }
        Ok(())
    }

    pub fn remove_element(&mut self, key: &str) -> Option<Element> {
        let index = self.position(key)?;
        Some(self.elements.remove(index))
    }

    pub fn get_element(&self, key: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.key().as_str() == key)
    }

    /// Mutable access is kept inside the crate so the radio invariant can only
    /// be broken by code that restores it.
    pub(crate) fn get_element_mut(&mut self, key: &str) -> Option<&mut Element> {
        self.elements
            .iter_mut()
            .find(|element| element.key().as_str() == key)
    }

    pub fn has_element(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Deselects every radio of `group` other than `keep`, returning the
    /// radios that actually changed.
    pub(crate) fn clear_radio_group(&mut self, group: &Key, keep: &Key) -> Vec<Element> {
        let mut changed = Vec::new();
        for element in &mut self.elements {
            if let Element::Radio(radio) = element
                && radio.key() != keep
                && radio.is_selected_in(group)
            {
                radio.set_selected(false);
                changed.push(element.clone());
            }
        }
        changed
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|element| element.key().as_str() == key)
    }

    pub fn to_structured(&self) -> Result<Value, EncodeError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Elements of an unknown type are skipped with a warning so a newer peer
    /// can still show the parts this build understands.
    pub fn from_structured(doc: &Value) -> Result<Self, DecodeError> {
        let object = doc
            .as_object()
            .ok_or_else(|| DecodeError::Malformed("screen is not an object".to_string()))?;

        let key = object
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::MissingField("key".to_string()))?;
        let mut screen = Screen::new(Key::parse(key)?);

        if let Some(kind) = object.get("type").and_then(Value::as_str) {
            screen.kind = Some(
                ScreenKind::from_name(kind)
                    .ok_or_else(|| DecodeError::Malformed(format!("unknown screen type '{kind}'")))?,
            );
        }

        let elements = match object.get("elements") {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(elements)) => elements.as_slice(),
            Some(_) => return Err(DecodeError::Malformed("elements is not a list".to_string())),
        };
        for doc in elements {
            match Element::from_structured(doc) {
                Ok(element) => screen.add_element(element)?,
                Err(DecodeError::UnknownElementType(name)) => {
                    log::warn!("Skipping element of unknown type '{}' in screen {}", name, screen.key);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(screen)
    }

    pub fn to_json(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let doc: Value = serde_json::from_str(json).map_err(DecodeError::malformed)?;
        Self::from_structured(&doc)
    }

    /// Translucent dark fill used behind most menus.
    pub fn gradient_background() -> Element {
        Gradient::builder(Key::from_static("vellum:gradient"))
            .color_top(0xC0101010)
            .color_bottom(0xD0101010)
            .build()
            .into()
    }

    /// Darkened tiled texture used behind option menus.
    pub fn tiled_dirt_background() -> Element {
        Element::Image(Image::tiled(
            Key::from_static("vellum:tiled_dirt"),
            Texture::dirt(),
            0xFF404040,
            32.0,
        ))
    }
}

impl Keyed for Screen {
    fn key(&self) -> &Key {
        &self.key
    }
}

#[derive(Debug, Clone)]
pub struct ScreenBuilder(Screen);

impl ScreenBuilder {
    pub fn kind(mut self, kind: ScreenKind) -> Self {
        self.0.kind = Some(kind);
        self
    }

    pub fn element(mut self, element: impl Into<Element>) -> Result<Self, ScreenError> {
        self.0.add_element(element)?;
        Ok(self)
    }

    pub fn build(self) -> Screen {
        self.0
    }
}
