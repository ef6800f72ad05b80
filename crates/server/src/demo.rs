use anyhow::Result;

use vellum::gui::{Button, Checkbox, Radio, Slider, Text, Textbox, TransformBuilder};
use vellum::{
    ActionRegistry, ButtonClicked, CheckboxToggled, Key, Keyed, RadioToggled, Screen, ScreenKind,
    SliderChanged, TextboxChanged,
};

pub const MENU: &str = "vellum:demo/menu";
pub const HUD: &str = "vellum:demo/hud";

const NAME_LIMIT: usize = 16;

fn key(value: &str) -> Result<Key> {
    Ok(Key::parse(value)?)
}

pub fn menu() -> Result<Screen> {
    let difficulty = key("vellum:demo/difficulty")?;
    let screen = Screen::builder(key(MENU)?)
        .kind(ScreenKind::Screen)
        .element(Screen::gradient_background())?
        .element(
            Text::builder(key("vellum:demo/title")?)
                .text("Settings")
                .shadow(true)
                .anchor(0.5, 0.0)
                .pos(0.0, 12.0)
                .offset(0.5, 0.0)
                .build(),
        )?
        .element(
            Slider::builder(key("vellum:demo/volume")?)
                .label("Volume")
                .range(0.0, 100.0)
                .value(50.0)
                .decimal_format("0")
                .size(150.0, 20.0)
                .anchor(0.5, 0.0)
                .pos(0.0, 40.0)
                .offset(0.5, 0.0)
                .build()?,
        )?
        .element(
            Checkbox::builder(key("vellum:demo/subtitles")?)
                .label("Subtitles")
                .selected(false)
                .anchor(0.5, 0.0)
                .pos(0.0, 70.0)
                .offset(0.5, 0.0)
                .build(),
        )?
        .element(
            Radio::builder(key("vellum:demo/easy")?)
                .group(difficulty.clone())
                .label("Easy")
                .selected(true)
                .anchor(0.5, 0.0)
                .pos(-60.0, 100.0)
                .build(),
        )?
        .element(
            Radio::builder(key("vellum:demo/hard")?)
                .group(difficulty)
                .label("Hard")
                .anchor(0.5, 0.0)
                .pos(20.0, 100.0)
                .build(),
        )?
        .element(
            Textbox::builder(key("vellum:demo/name")?)
                .suggestion("Name")
                .max_length(NAME_LIMIT as u32)
                .size(150.0, 20.0)
                .anchor(0.5, 0.0)
                .pos(0.0, 130.0)
                .offset(0.5, 0.0)
                .build(),
        )?
        .element(
            Button::builder(key("vellum:demo/done")?)
                .label("Done")
                .size(100.0, 20.0)
                .anchor(0.5, 1.0)
                .pos(0.0, -12.0)
                .offset(0.5, 1.0)
                .build(),
        )?
        .build();
    Ok(screen)
}

pub fn hud() -> Result<Screen> {
    let screen = Screen::builder(key(HUD)?)
        .kind(ScreenKind::Hud)
        .element(
            Text::builder(key("vellum:demo/banner")?)
                .text("vellum demo")
                .pos(4.0, 4.0)
                .build(),
        )?
        .build();
    Ok(screen)
}

/// Server-side rules for the demo menu. Values the rules rewrite travel back
/// to the client as corrections.
pub fn register_handlers(actions: &mut ActionRegistry) {
    actions.register(|action: &mut SliderChanged| {
        let (min, max) = action.slider().range();
        let snapped = action.value().clamp(min, max).round();
        action.set_value(snapped);
    });

    actions.register(|action: &mut TextboxChanged| {
        if action.value().chars().count() > NAME_LIMIT {
            let truncated: String = action.value().chars().take(NAME_LIMIT).collect();
            action.set_value(truncated);
        }
    });

    actions.register(|action: &mut CheckboxToggled| {
        log::info!(
            "Player {} set {} to {}",
            action.player(),
            action.checkbox().key(),
            action.selected()
        );
    });

    actions.register(|action: &mut RadioToggled| {
        log::info!("Player {} picked {}", action.player(), action.radio().key());
    });

    actions.register(|action: &mut ButtonClicked| {
        log::info!("Player {} clicked {}", action.player(), action.button().key());
    });
}
