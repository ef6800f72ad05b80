mod element;
mod screen;
mod texture;
pub(crate) mod vec;

pub use element::{
    Button, ButtonBuilder, Checkbox, CheckboxBuilder, Circle, CircleBuilder, Element,
    ElementError, ElementType, Gradient, GradientBuilder, Image, ImageBuilder, Line, LineBuilder,
    Radio, RadioBuilder, Slider, SliderBuilder, Text, TextBuilder, Textbox, TextboxBuilder,
    Transform, TransformBuilder,
};
pub use screen::{Screen, ScreenBuilder, ScreenError, ScreenKind};
pub use texture::{Texture, TextureManager};
