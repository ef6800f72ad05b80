//! Interactive variants: the ones a client can change and report back.

use std::cmp::Ordering;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::gui::Transform;
use crate::gui::vec::opt_vec2;
use crate::key::Key;

use super::ElementError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    size: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
}

element_common!(Button, Checkbox, Radio, Slider, Textbox);

wrapping_builder!(
    ButtonBuilder => Button,
    CheckboxBuilder => Checkbox,
    RadioBuilder => Radio,
    SliderBuilder => Slider,
    TextboxBuilder => Textbox,
);

impl Button {
    pub fn builder(key: Key) -> ButtonBuilder {
        ButtonBuilder(Self {
            key,
            transform: Transform::default(),
            size: None,
            label: None,
            tooltip: None,
        })
    }

    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    pub fn set_size(&mut self, size: Option<Vec2>) {
        self.size = size;
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }
}

impl ButtonBuilder {
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.0.size = Some(Vec2::new(width, height));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.0.label = Some(label.into());
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.0.tooltip = Some(tooltip.into());
        self
    }

    pub fn build(self) -> Button {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkbox {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    size: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    show_label: Option<bool>,
}

impl Checkbox {
    pub fn builder(key: Key) -> CheckboxBuilder {
        CheckboxBuilder(Self {
            key,
            transform: Transform::default(),
            size: None,
            label: None,
            tooltip: None,
            selected: None,
            show_label: None,
        })
    }

    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn selected(&self) -> Option<bool> {
        self.selected
    }

    /// Unset counts as not selected.
    pub fn is_selected(&self) -> bool {
        self.selected.unwrap_or(false)
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = Some(selected);
    }

    pub fn show_label(&self) -> Option<bool> {
        self.show_label
    }
}

impl CheckboxBuilder {
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.0.size = Some(Vec2::new(width, height));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.0.label = Some(label.into());
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.0.tooltip = Some(tooltip.into());
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.0.selected = Some(selected);
        self
    }

    pub fn show_label(mut self, show_label: bool) -> Self {
        self.0.show_label = Some(show_label);
        self
    }

    pub fn build(self) -> Checkbox {
        self.0
    }
}

/// A checkbox that belongs to an exclusive group.
///
/// Within one screen at most one radio of a given group may be selected.
/// Radios without a group behave independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Radio {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    size: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    show_label: Option<bool>,
}

impl Radio {
    pub fn builder(key: Key) -> RadioBuilder {
        RadioBuilder(Self {
            key,
            transform: Transform::default(),
            size: None,
            group: None,
            label: None,
            tooltip: None,
            selected: None,
            show_label: None,
        })
    }

    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    pub fn group(&self) -> Option<&Key> {
        self.group.as_ref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn selected(&self) -> Option<bool> {
        self.selected
    }

    pub fn is_selected(&self) -> bool {
        self.selected.unwrap_or(false)
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = Some(selected);
    }

    pub fn show_label(&self) -> Option<bool> {
        self.show_label
    }

    /// Selected and grouped with `group`.
    pub fn is_selected_in(&self, group: &Key) -> bool {
        self.is_selected() && self.group.as_ref() == Some(group)
    }
}

impl RadioBuilder {
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.0.size = Some(Vec2::new(width, height));
        self
    }

    pub fn group(mut self, group: Key) -> Self {
        self.0.group = Some(group);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.0.label = Some(label.into());
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.0.tooltip = Some(tooltip.into());
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.0.selected = Some(selected);
        self
    }

    pub fn show_label(mut self, show_label: bool) -> Self {
        self.0.show_label = Some(show_label);
        self
    }

    pub fn build(self) -> Radio {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slider {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    size: Option<Vec2>,
    /// Supports `{value}`, `{min}` and `{max}` placeholders.
    #[serde(rename = "text", default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
    #[serde(default)]
    value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(rename = "decimal", default, skip_serializing_if = "Option::is_none")]
    decimal_format: Option<String>,
}

impl Slider {
    pub const DEFAULT_MIN: f64 = 0.0;
    pub const DEFAULT_MAX: f64 = 1.0;

    pub fn builder(key: Key) -> SliderBuilder {
        SliderBuilder(Self {
            key,
            transform: Transform::default(),
            size: None,
            label: None,
            tooltip: None,
            value: 0.0,
            min: None,
            max: None,
            decimal_format: None,
        })
    }

    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Non-finite values are ignored. Returns whether `value` was stored.
    pub fn set_value(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.value = value;
        true
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn range(&self) -> (f64, f64) {
        (
            self.min.unwrap_or(Self::DEFAULT_MIN),
            self.max.unwrap_or(Self::DEFAULT_MAX),
        )
    }

    pub fn decimal_format(&self) -> Option<&str> {
        self.decimal_format.as_deref()
    }
}

impl SliderBuilder {
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.0.size = Some(Vec2::new(width, height));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.0.label = Some(label.into());
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.0.tooltip = Some(tooltip.into());
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.0.value = value;
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.0.min = Some(min);
        self.0.max = Some(max);
        self
    }

    pub fn decimal_format(mut self, format: impl Into<String>) -> Self {
        self.0.decimal_format = Some(format.into());
        self
    }

    pub fn build(self) -> Result<Slider, ElementError> {
        let (min, max) = self.0.range();
        if matches!(min.partial_cmp(&max), None | Some(Ordering::Greater)) {
            return Err(ElementError {
                key: self.0.key,
                reason: "slider min must not exceed max",
            });
        }
        if !self.0.value.is_finite() {
            return Err(ElementError {
                key: self.0.key,
                reason: "slider value must be finite",
            });
        }
        Ok(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Textbox {
    key: Key,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_vec2")]
    size: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bordered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    can_lose_focus: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_color_uneditable: Option<u32>,
}

impl Textbox {
    pub fn builder(key: Key) -> TextboxBuilder {
        TextboxBuilder(Self {
            key,
            transform: Transform::default(),
            size: None,
            value: None,
            suggestion: None,
            bordered: None,
            can_lose_focus: None,
            max_length: None,
            editable: None,
            text_color: None,
            text_color_uneditable: None,
        })
    }

    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn bordered(&self) -> Option<bool> {
        self.bordered
    }

    pub fn can_lose_focus(&self) -> Option<bool> {
        self.can_lose_focus
    }

    pub fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    pub fn editable(&self) -> Option<bool> {
        self.editable
    }

    pub fn text_color(&self) -> Option<u32> {
        self.text_color
    }

    pub fn text_color_uneditable(&self) -> Option<u32> {
        self.text_color_uneditable
    }
}

impl TextboxBuilder {
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.0.size = Some(Vec2::new(width, height));
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.0.value = Some(value.into());
        self
    }

    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.0.suggestion = Some(suggestion.into());
        self
    }

    pub fn bordered(mut self, bordered: bool) -> Self {
        self.0.bordered = Some(bordered);
        self
    }

    pub fn can_lose_focus(mut self, can_lose_focus: bool) -> Self {
        self.0.can_lose_focus = Some(can_lose_focus);
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        self.0.max_length = Some(max_length);
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.0.editable = Some(editable);
        self
    }

    pub fn text_color(mut self, color: u32) -> Self {
        self.0.text_color = Some(color);
        self
    }

    pub fn text_color_uneditable(mut self, color: u32) -> Self {
        self.0.text_color_uneditable = Some(color);
        self
    }

    pub fn build(self) -> Textbox {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::Element;

    fn key(value: &str) -> Key {
        Key::parse(value).unwrap()
    }

    #[test]
    fn slider_rejects_inverted_range() {
        let err = Slider::builder(key("t:slider")).range(5.0, 1.0).build().unwrap_err();
        assert_eq!(err.key, key("t:slider"));

        let slider = Slider::builder(key("t:slider")).build().unwrap();
        assert_eq!(slider.range(), (0.0, 1.0));
        assert_eq!(slider.min(), None);
    }

    #[test]
    fn slider_uses_legacy_field_names() {
        let slider: Element = Slider::builder(key("t:slider"))
            .label("Vol")
            .decimal_format("0.0")
            .build()
            .unwrap()
            .into();
        let doc = slider.to_structured().unwrap();
        assert_eq!(doc["text"], "Vol");
        assert_eq!(doc["decimal"], "0.0");
        assert_eq!(doc["value"], 0.0);
    }

    #[test]
    fn unset_selection_reads_as_false() {
        let mut radio = Radio::builder(key("t:radio")).group(key("t:group")).build();
        assert_eq!(radio.selected(), None);
        assert!(!radio.is_selected());

        radio.set_selected(true);
        assert!(radio.is_selected_in(&key("t:group")));
        assert!(!radio.is_selected_in(&key("t:other")));
    }

    #[test]
    fn camel_case_field_names() {
        let textbox: Element = Textbox::builder(key("t:box"))
            .can_lose_focus(true)
            .max_length(4)
            .build()
            .into();
        let doc = textbox.to_structured().unwrap();
        assert_eq!(doc["canLoseFocus"], true);
        assert_eq!(doc["maxLength"], 4);
    }
}
