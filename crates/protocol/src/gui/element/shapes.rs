//! Display-only variants. Clients never report changes to these.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::gui::vec::{opt_uv, opt_vec2};
use crate::gui::{Texture, Transform};
use crate::key::Key;

use super::ElementError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f32>,
    /// Number of outer vertices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resolution: Option<u32>,
    #[serde(default)]
    inner_color: u32,
    #[serde(default)]
    outer_color: u32,
}

element_common!(Circle, Gradient, Image, Line, Text);

wrapping_builder!(
    CircleBuilder => Circle,
    GradientBuilder => Gradient,
    LineBuilder => Line,
    TextBuilder => Text,
);

impl Circle {
    pub fn builder(key: Key) -> CircleBuilder {
        CircleBuilder(Self {
            key,
            transform: Transform::default(),
            radius: None,
            resolution: None,
            inner_color: 0,
            outer_color: 0,
        })
    }

    pub fn radius(&self) -> Option<f32> {
        self.radius
    }

    pub fn resolution(&self) -> Option<u32> {
        self.resolution
    }

    pub fn inner_color(&self) -> u32 {
        self.inner_color
    }

    pub fn outer_color(&self) -> u32 {
        self.outer_color
    }
}

impl CircleBuilder {
    pub fn radius(mut self, radius: f32) -> Self {
        self.0.radius = Some(radius);
        self
    }

    pub fn resolution(mut self, resolution: u32) -> Self {
        self.0.resolution = Some(resolution);
        self
    }

    pub fn inner_color(mut self, color: u32) -> Self {
        self.0.inner_color = color;
        self
    }

    pub fn outer_color(mut self, color: u32) -> Self {
        self.0.outer_color = color;
        self
    }

    pub fn color(self, color: u32) -> Self {
        self.inner_color(color).outer_color(color)
    }

    pub fn build(self) -> Circle {
        self.0
    }
}

/// Four-corner color fill. Colors are packed ARGB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    size: Option<Vec2>,
    #[serde(default)]
    color_top_left: u32,
    #[serde(default)]
    color_top_right: u32,
    #[serde(default)]
    color_bottom_left: u32,
    #[serde(default)]
    color_bottom_right: u32,
}

impl Gradient {
    pub fn builder(key: Key) -> GradientBuilder {
        GradientBuilder(Self {
            key,
            transform: Transform::default(),
            size: None,
            color_top_left: 0,
            color_top_right: 0,
            color_bottom_left: 0,
            color_bottom_right: 0,
        })
    }

    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    /// `[top_left, top_right, bottom_left, bottom_right]`
    pub fn colors(&self) -> [u32; 4] {
        [
            self.color_top_left,
            self.color_top_right,
            self.color_bottom_left,
            self.color_bottom_right,
        ]
    }
}

impl GradientBuilder {
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.0.size = Some(Vec2::new(width, height));
        self
    }

    pub fn color_top_left(mut self, color: u32) -> Self {
        self.0.color_top_left = color;
        self
    }

    pub fn color_top_right(mut self, color: u32) -> Self {
        self.0.color_top_right = color;
        self
    }

    pub fn color_bottom_left(mut self, color: u32) -> Self {
        self.0.color_bottom_left = color;
        self
    }

    pub fn color_bottom_right(mut self, color: u32) -> Self {
        self.0.color_bottom_right = color;
        self
    }

    pub fn color_top(self, color: u32) -> Self {
        self.color_top_left(color).color_top_right(color)
    }

    pub fn color_bottom(self, color: u32) -> Self {
        self.color_bottom_left(color).color_bottom_right(color)
    }

    pub fn color_left(self, color: u32) -> Self {
        self.color_top_left(color).color_bottom_left(color)
    }

    pub fn color_right(self, color: u32) -> Self {
        self.color_top_right(color).color_bottom_right(color)
    }

    pub fn color(self, color: u32) -> Self {
        self.color_top(color).color_bottom(color)
    }

    pub fn build(self) -> Gradient {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    size: Option<Vec2>,
    texture: Texture,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_uv")]
    uv: Option<Vec4>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vertex_color: Option<u32>,
    #[serde(rename = "tileMod", default, skip_serializing_if = "Option::is_none")]
    tile_modifier: Option<f32>,
}

impl Image {
    pub fn builder(key: Key) -> ImageBuilder {
        ImageBuilder {
            key,
            transform: Transform::default(),
            size: None,
            texture: None,
            uv: None,
            vertex_color: None,
            tile_modifier: None,
        }
    }

    /// Full-size texture fill, for images whose texture is known up front.
    pub(crate) fn tiled(key: Key, texture: Texture, vertex_color: u32, tile_modifier: f32) -> Self {
        Self {
            key,
            transform: Transform::default(),
            size: None,
            texture,
            uv: None,
            vertex_color: Some(vertex_color),
            tile_modifier: Some(tile_modifier),
        }
    }

    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn uv(&self) -> Option<Vec4> {
        self.uv
    }

    pub fn vertex_color(&self) -> Option<u32> {
        self.vertex_color
    }

    pub fn tile_modifier(&self) -> Option<f32> {
        self.tile_modifier
    }
}

/// An image cannot exist without a texture, so unlike the other builders
/// this one holds its fields loose until [`ImageBuilder::build`].
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    key: Key,
    transform: Transform,
    size: Option<Vec2>,
    texture: Option<Texture>,
    uv: Option<Vec4>,
    vertex_color: Option<u32>,
    tile_modifier: Option<f32>,
}

impl crate::gui::TransformBuilder for ImageBuilder {
    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

impl ImageBuilder {
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = Some(Vec2::new(width, height));
        self
    }

    pub fn texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn uv(mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.uv = Some(Vec4::new(x0, y0, x1, y1));
        self
    }

    pub fn vertex_color(mut self, color: u32) -> Self {
        self.vertex_color = Some(color);
        self
    }

    pub fn tile_modifier(mut self, modifier: f32) -> Self {
        self.tile_modifier = Some(modifier);
        self
    }

    pub fn build(self) -> Result<Image, ElementError> {
        let Some(texture) = self.texture else {
            return Err(ElementError {
                key: self.key,
                reason: "image requires a texture",
            });
        };
        Ok(Image {
            key: self.key,
            transform: self.transform,
            size: self.size,
            texture,
            uv: self.uv,
            vertex_color: self.vertex_color,
            tile_modifier: self.tile_modifier,
        })
    }
}

/// A line from `pos`/`anchor` to `end_pos`/`end_anchor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    end_pos: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    end_anchor: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f32>,
    #[serde(default)]
    start_color: u32,
    #[serde(default)]
    end_color: u32,
}

impl Line {
    pub fn builder(key: Key) -> LineBuilder {
        LineBuilder(Self {
            key,
            transform: Transform::default(),
            end_pos: None,
            end_anchor: None,
            width: None,
            start_color: 0,
            end_color: 0,
        })
    }

    pub fn end_pos(&self) -> Option<Vec2> {
        self.end_pos
    }

    pub fn end_anchor(&self) -> Option<Vec2> {
        self.end_anchor
    }

    pub fn width(&self) -> Option<f32> {
        self.width
    }

    pub fn start_color(&self) -> u32 {
        self.start_color
    }

    pub fn end_color(&self) -> u32 {
        self.end_color
    }
}

impl LineBuilder {
    pub fn end_pos(mut self, x: f32, y: f32) -> Self {
        self.0.end_pos = Some(Vec2::new(x, y));
        self
    }

    pub fn end_anchor(mut self, x: f32, y: f32) -> Self {
        self.0.end_anchor = Some(Vec2::new(x, y));
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.0.width = Some(width);
        self
    }

    pub fn start_color(mut self, color: u32) -> Self {
        self.0.start_color = color;
        self
    }

    pub fn end_color(mut self, color: u32) -> Self {
        self.0.end_color = color;
        self
    }

    pub fn color(self, color: u32) -> Self {
        self.start_color(color).end_color(color)
    }

    pub fn build(self) -> Line {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shadow: Option<bool>,
}

impl Text {
    pub fn builder(key: Key) -> TextBuilder {
        TextBuilder(Self {
            key,
            transform: Transform::default(),
            text: None,
            shadow: None,
        })
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn shadow(&self) -> Option<bool> {
        self.shadow
    }
}

impl TextBuilder {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.0.text = Some(text.into());
        self
    }

    pub fn shadow(mut self, shadow: bool) -> Self {
        self.0.shadow = Some(shadow);
        self
    }

    pub fn build(self) -> Text {
        self.0
    }
}
