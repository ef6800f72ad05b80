/// Shared impls for every variant struct: `Keyed`, transform access and the
/// conversion into [`Element`].
macro_rules! element_common {
    ($($variant:ident),* $(,)?) => {$(
        impl $crate::key::Keyed for $variant {
            fn key(&self) -> &$crate::key::Key {
                &self.key
            }
        }

        impl $variant {
            pub fn transform(&self) -> &$crate::gui::Transform {
                &self.transform
            }

            pub fn transform_mut(&mut self) -> &mut $crate::gui::Transform {
                &mut self.transform
            }
        }

        impl From<$variant> for $crate::gui::Element {
            fn from(value: $variant) -> Self {
                $crate::gui::Element::$variant(value)
            }
        }
    )*};
}

/// Builders that wrap the element they produce.
macro_rules! wrapping_builder {
    ($($builder:ident => $variant:ident),* $(,)?) => {$(
        #[derive(Debug, Clone)]
        pub struct $builder($variant);

        impl $crate::gui::TransformBuilder for $builder {
            fn transform_mut(&mut self) -> &mut $crate::gui::Transform {
                &mut self.0.transform
            }
        }
    )*};
}

mod shapes;
mod widgets;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, EncodeError};
use crate::key::{Key, Keyed};

use super::vec::opt_vec2;

pub use shapes::{
    Circle, CircleBuilder, Gradient, GradientBuilder, Image, ImageBuilder, Line, LineBuilder, Text,
    TextBuilder,
};
pub use widgets::{
    Button, ButtonBuilder, Checkbox, CheckboxBuilder, Radio, RadioBuilder, Slider, SliderBuilder,
    Textbox, TextboxBuilder,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid element {key}: {reason}")]
pub struct ElementError {
    pub key: Key,
    pub reason: &'static str,
}

/// Placement shared by every element variant.
///
/// Every field is optional; an absent field means "use the renderer default"
/// and is kept distinct from an explicit zero through encode and decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Offset from the anchor point in layout units. Default `0,0`.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    pub pos: Option<Vec2>,
    /// Fraction (0.0-1.0) of the parent's size. Default `0,0`.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    pub anchor: Option<Vec2>,
    /// Fraction (0.0-1.0) of the element's own size, used to self-align. Default `0,0`.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    pub offset: Option<Vec2>,
    /// Degrees. Default `0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    /// Default `1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

impl Transform {
    pub const DEFAULT_ROTATION: f32 = 0.0;
    pub const DEFAULT_SCALE: f32 = 1.0;

    /// Top-left layout position inside a parent of `parent` size for an
    /// element measuring `own_size`.
    pub fn resolve(&self, parent: Vec2, own_size: Vec2) -> Vec2 {
        let anchor = self.anchor.map_or(Vec2::ZERO, |anchor| (parent * anchor).ceil());
        let offset = self.offset.map_or(Vec2::ZERO, |offset| own_size * offset);
        anchor + self.pos.unwrap_or(Vec2::ZERO) - offset
    }

    pub fn rotation_or_default(&self) -> f32 {
        self.rotation.unwrap_or(Self::DEFAULT_ROTATION)
    }

    pub fn scale_or_default(&self) -> f32 {
        self.scale.unwrap_or(Self::DEFAULT_SCALE)
    }
}

/// Chained setters for the transform part of every element builder.
pub trait TransformBuilder: Sized {
    fn transform_mut(&mut self) -> &mut Transform;

    fn pos(mut self, x: f32, y: f32) -> Self {
        self.transform_mut().pos = Some(Vec2::new(x, y));
        self
    }

    fn anchor(mut self, x: f32, y: f32) -> Self {
        self.transform_mut().anchor = Some(Vec2::new(x, y));
        self
    }

    fn offset(mut self, x: f32, y: f32) -> Self {
        self.transform_mut().offset = Some(Vec2::new(x, y));
        self
    }

    fn rotation(mut self, degrees: f32) -> Self {
        self.transform_mut().rotation = Some(degrees);
        self
    }

    fn scale(mut self, scale: f32) -> Self {
        self.transform_mut().scale = Some(scale);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Button,
    Checkbox,
    Circle,
    Gradient,
    Image,
    Line,
    Radio,
    Slider,
    Text,
    Textbox,
}

impl ElementType {
    pub const ALL: [ElementType; 10] = [
        Self::Button,
        Self::Checkbox,
        Self::Circle,
        Self::Gradient,
        Self::Image,
        Self::Line,
        Self::Radio,
        Self::Slider,
        Self::Text,
        Self::Textbox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "BUTTON",
            Self::Checkbox => "CHECKBOX",
            Self::Circle => "CIRCLE",
            Self::Gradient => "GRADIENT",
            Self::Image => "IMAGE",
            Self::Line => "LINE",
            Self::Radio => "RADIO",
            Self::Slider => "SLIDER",
            Self::Text => "TEXT",
            Self::Textbox => "TEXTBOX",
        }
    }

    /// Case-insensitive lookup of the `"type"` discriminator.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(name))
    }

    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            Self::Button | Self::Checkbox | Self::Radio | Self::Slider | Self::Textbox
        )
    }
}

/// A widget on a [`Screen`](super::Screen).
///
/// Equality compares the key, the variant and every field. Identity inside a
/// screen is decided by the key alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Element {
    Button(Button),
    Checkbox(Checkbox),
    Circle(Circle),
    Gradient(Gradient),
    Image(Image),
    Line(Line),
    Radio(Radio),
    Slider(Slider),
    Text(Text),
    Textbox(Textbox),
}

impl Element {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Button(_) => ElementType::Button,
            Self::Checkbox(_) => ElementType::Checkbox,
            Self::Circle(_) => ElementType::Circle,
            Self::Gradient(_) => ElementType::Gradient,
            Self::Image(_) => ElementType::Image,
            Self::Line(_) => ElementType::Line,
            Self::Radio(_) => ElementType::Radio,
            Self::Slider(_) => ElementType::Slider,
            Self::Text(_) => ElementType::Text,
            Self::Textbox(_) => ElementType::Textbox,
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            Self::Button(e) => e.transform(),
            Self::Checkbox(e) => e.transform(),
            Self::Circle(e) => e.transform(),
            Self::Gradient(e) => e.transform(),
            Self::Image(e) => e.transform(),
            Self::Line(e) => e.transform(),
            Self::Radio(e) => e.transform(),
            Self::Slider(e) => e.transform(),
            Self::Text(e) => e.transform(),
            Self::Textbox(e) => e.transform(),
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Self::Button(e) => e.transform_mut(),
            Self::Checkbox(e) => e.transform_mut(),
            Self::Circle(e) => e.transform_mut(),
            Self::Gradient(e) => e.transform_mut(),
            Self::Image(e) => e.transform_mut(),
            Self::Line(e) => e.transform_mut(),
            Self::Radio(e) => e.transform_mut(),
            Self::Slider(e) => e.transform_mut(),
            Self::Text(e) => e.transform_mut(),
            Self::Textbox(e) => e.transform_mut(),
        }
    }

    /// `None` both for variants without a size and for an unset size.
    pub fn size(&self) -> Option<Vec2> {
        match self {
            Self::Button(e) => e.size(),
            Self::Checkbox(e) => e.size(),
            Self::Gradient(e) => e.size(),
            Self::Image(e) => e.size(),
            Self::Radio(e) => e.size(),
            Self::Slider(e) => e.size(),
            Self::Textbox(e) => e.size(),
            Self::Circle(_) | Self::Line(_) | Self::Text(_) => None,
        }
    }

    pub fn as_radio(&self) -> Option<&Radio> {
        match self {
            Self::Radio(radio) => Some(radio),
            _ => None,
        }
    }

    pub fn to_structured(&self) -> Result<Value, EncodeError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_structured(doc: &Value) -> Result<Self, DecodeError> {
        let object = doc
            .as_object()
            .ok_or_else(|| DecodeError::Malformed("element is not an object".to_string()))?;

        let name = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::MissingField("type".to_string()))?;
        let element_type = ElementType::from_name(name)
            .ok_or_else(|| DecodeError::UnknownElementType(name.to_string()))?;

        if !object.contains_key("key") {
            return Err(DecodeError::MissingField("key".to_string()));
        }
        if element_type == ElementType::Image && !object.contains_key("texture") {
            return Err(DecodeError::MissingField("texture".to_string()));
        }

        let mut normalized = object.clone();
        normalized.insert(
            "type".to_string(),
            Value::String(element_type.as_str().to_string()),
        );
        serde_json::from_value(Value::Object(normalized)).map_err(DecodeError::malformed)
    }

    pub fn to_json(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let doc: Value = serde_json::from_str(json).map_err(DecodeError::malformed)?;
        Self::from_structured(&doc)
    }
}

impl Keyed for Element {
    fn key(&self) -> &Key {
        match self {
            Self::Button(e) => e.key(),
            Self::Checkbox(e) => e.key(),
            Self::Circle(e) => e.key(),
            Self::Gradient(e) => e.key(),
            Self::Image(e) => e.key(),
            Self::Line(e) => e.key(),
            Self::Radio(e) => e.key(),
            Self::Slider(e) => e.key(),
            Self::Text(e) => e.key(),
            Self::Textbox(e) => e.key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::Texture;

    fn key(value: &str) -> Key {
        Key::parse(value).unwrap()
    }

    fn round_trip(element: Element) {
        let doc = element.to_structured().unwrap();
        assert_eq!(Element::from_structured(&doc).unwrap(), element);
        let json = element.to_json().unwrap();
        assert_eq!(Element::from_json(&json).unwrap(), element);
    }

    #[test]
    fn transform_fields_round_trip_independently() {
        let setters: [fn(ButtonBuilder) -> ButtonBuilder; 5] = [
            |b| b.pos(10.0, -4.0),
            |b| b.anchor(0.5, 0.5),
            |b| b.offset(0.5, 1.0),
            |b| b.rotation(45.0),
            |b| b.scale(2.0),
        ];

        for mask in 0u32..(1 << setters.len()) {
            let mut builder = Button::builder(key("test:button"));
            for (bit, setter) in setters.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    builder = setter(builder);
                }
            }
            round_trip(builder.build().into());
        }
    }

    /// Builds one element per subset of `fields` and checks that exactly the
    /// chosen wire names appear and that the element survives decoding.
    fn check_field_masks<B>(
        fields: &[(&str, fn(B) -> B)],
        new: impl Fn() -> B,
        build: impl Fn(B) -> Element,
    ) {
        for mask in 0u32..(1 << fields.len()) {
            let mut builder = new();
            for (bit, (_, setter)) in fields.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    builder = setter(builder);
                }
            }
            let element = build(builder);
            let doc = element.to_structured().unwrap();
            for (bit, (name, _)) in fields.iter().enumerate() {
                let expected = mask & (1 << bit) != 0;
                assert_eq!(doc.get(*name).is_some(), expected, "{name} in mask {mask:#b}");
            }
            round_trip(element);
        }
    }

    #[test]
    fn radio_fields_round_trip_independently() {
        let fields: [(&str, fn(RadioBuilder) -> RadioBuilder); 6] = [
            ("size", |b| b.size(20.0, 20.0)),
            ("group", |b| b.group(Key::parse("test:group").unwrap())),
            ("label", |b| b.label("Hard")),
            ("tooltip", |b| b.tooltip("More enemies")),
            ("selected", |b| b.selected(false)),
            ("showLabel", |b| b.show_label(true)),
        ];
        check_field_masks(&fields, || Radio::builder(key("test:radio")), |b| b.build().into());
    }

    #[test]
    fn slider_fields_round_trip_independently() {
        let fields: [(&str, fn(SliderBuilder) -> SliderBuilder); 5] = [
            ("size", |b| b.size(150.0, 20.0)),
            ("label", |b| b.label("Volume")),
            ("tooltip", |b| b.tooltip("Master volume")),
            ("min", |b| b.range(-1.0, 1.0)),
            ("decimalFormat", |b| b.decimal_format("0.00")),
        ];
        check_field_masks(
            &fields,
            || Slider::builder(key("test:slider")).value(0.25),
            |b| b.build().unwrap().into(),
        );
    }

    #[test]
    fn absent_fields_are_omitted_not_null() {
        let element: Element = Text::builder(key("test:text")).build().into();
        let doc = element.to_structured().unwrap();
        let object = doc.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["type"], "TEXT");
        assert_eq!(object["key"], "test:text");
    }

    #[test]
    fn explicit_zero_is_distinct_from_absent() {
        let zero: Element = Text::builder(key("test:text")).pos(0.0, 0.0).rotation(0.0).build().into();
        let absent: Element = Text::builder(key("test:text")).build().into();
        assert_ne!(zero, absent);

        let decoded = Element::from_structured(&zero.to_structured().unwrap()).unwrap();
        assert_eq!(decoded.transform().pos, Some(Vec2::ZERO));
        assert_eq!(decoded.transform().rotation, Some(0.0));
        assert_eq!(decoded.transform().scale, None);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let doc = serde_json::json!({ "type": "SPINNER", "key": "test:spin" });
        assert_eq!(
            Element::from_structured(&doc),
            Err(DecodeError::UnknownElementType("SPINNER".to_string()))
        );
    }

    #[test]
    fn missing_key_or_type_is_reported() {
        let doc = serde_json::json!({ "type": "TEXT" });
        assert_eq!(
            Element::from_structured(&doc),
            Err(DecodeError::MissingField("key".to_string()))
        );

        let doc = serde_json::json!({ "key": "test:text" });
        assert_eq!(
            Element::from_structured(&doc),
            Err(DecodeError::MissingField("type".to_string()))
        );

        let doc = serde_json::json!({ "type": "IMAGE", "key": "test:image" });
        assert_eq!(
            Element::from_structured(&doc),
            Err(DecodeError::MissingField("texture".to_string()))
        );
    }

    #[test]
    fn decode_is_case_insensitive_and_ignores_unknown_fields() {
        let doc = serde_json::json!({
            "type": "checkbox",
            "key": "test:check",
            "selected": true,
            "glowColor": 123,
        });
        let element = Element::from_structured(&doc).unwrap();
        match element {
            Element::Checkbox(checkbox) => {
                assert_eq!(checkbox.selected(), Some(true));
                assert_eq!(checkbox.label(), None);
            }
            other => panic!("expected checkbox, got {other:?}"),
        }
    }

    #[test]
    fn invalid_key_is_malformed() {
        let doc = serde_json::json!({ "type": "TEXT", "key": "no spaces" });
        assert!(matches!(
            Element::from_structured(&doc),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn every_variant_round_trips_fully_populated() {
        let elements: Vec<Element> = vec![
            Button::builder(key("t:button"))
                .size(100.0, 20.0)
                .label("Click")
                .tooltip("Does a thing")
                .build()
                .into(),
            Checkbox::builder(key("t:check"))
                .size(20.0, 20.0)
                .label("Enable")
                .tooltip("tip")
                .selected(false)
                .show_label(true)
                .build()
                .into(),
            Circle::builder(key("t:circle"))
                .radius(12.5)
                .resolution(32)
                .inner_color(0xFFFF0000)
                .outer_color(0x00FF0000)
                .build()
                .into(),
            Gradient::builder(key("t:gradient"))
                .size(200.0, 100.0)
                .color_top(0xC0101010)
                .color_bottom(0xD0101010)
                .build()
                .into(),
            Image::builder(key("t:image"))
                .texture(Texture::dirt())
                .size(64.0, 64.0)
                .uv(0.0, 0.0, 0.5, 0.5)
                .vertex_color(0xFF404040)
                .tile_modifier(32.0)
                .build()
                .unwrap()
                .into(),
            Line::builder(key("t:line"))
                .pos(0.0, 0.0)
                .end_pos(10.0, 10.0)
                .end_anchor(1.0, 1.0)
                .width(2.0)
                .start_color(0xFFFFFFFF)
                .end_color(0xFF000000)
                .build()
                .into(),
            Radio::builder(key("t:radio"))
                .group(key("t:group"))
                .size(20.0, 20.0)
                .label("Option A")
                .selected(true)
                .show_label(false)
                .build()
                .into(),
            Slider::builder(key("t:slider"))
                .size(150.0, 20.0)
                .label("Volume: {value}")
                .value(0.25)
                .range(0.0, 2.0)
                .decimal_format("0.00")
                .build()
                .unwrap()
                .into(),
            Text::builder(key("t:text"))
                .text("Hello")
                .shadow(true)
                .anchor(0.5, 0.0)
                .build()
                .into(),
            Textbox::builder(key("t:textbox"))
                .size(120.0, 20.0)
                .value("typed")
                .suggestion("type here")
                .bordered(true)
                .can_lose_focus(false)
                .max_length(32)
                .editable(true)
                .text_color(0xFFE0E0E0)
                .text_color_uneditable(0xFF707070)
                .build()
                .into(),
        ];

        for element in elements {
            round_trip(element);
        }
    }

    #[test]
    fn every_variant_round_trips_minimal() {
        let elements: Vec<Element> = vec![
            Button::builder(key("t:a")).build().into(),
            Checkbox::builder(key("t:b")).build().into(),
            Circle::builder(key("t:c")).build().into(),
            Gradient::builder(key("t:d")).build().into(),
            Image::builder(key("t:e")).texture(Texture::dirt()).build().unwrap().into(),
            Line::builder(key("t:f")).build().into(),
            Radio::builder(key("t:g")).build().into(),
            Slider::builder(key("t:h")).build().unwrap().into(),
            Text::builder(key("t:i")).build().into(),
            Textbox::builder(key("t:j")).build().into(),
        ];

        let types: Vec<ElementType> = elements.iter().map(Element::element_type).collect();
        assert_eq!(types, ElementType::ALL.to_vec());

        for element in elements {
            round_trip(element);
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let transform = Transform::default();
        assert_eq!(
            transform.resolve(Vec2::new(800.0, 600.0), Vec2::new(100.0, 20.0)),
            Vec2::ZERO
        );

        let centered = Transform {
            anchor: Some(Vec2::new(0.5, 0.5)),
            offset: Some(Vec2::new(0.5, 0.5)),
            pos: Some(Vec2::new(0.0, 10.0)),
            ..Default::default()
        };
        assert_eq!(
            centered.resolve(Vec2::new(800.0, 600.0), Vec2::new(100.0, 20.0)),
            Vec2::new(350.0, 300.0)
        );
        assert_eq!(centered.scale_or_default(), 1.0);
    }
}
