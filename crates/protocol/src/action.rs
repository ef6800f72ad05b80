//! Observe and veto client interactions before they reach authoritative state.
//!
//! Handlers for one action kind run synchronously in registration order.
//! Every handler sees the action even after an earlier one cancelled it; the
//! caller decides what cancellation means once all of them have run.

use std::fmt;

use crate::gui::{Button, Checkbox, Radio, Slider, Textbox};
use crate::key::Key;
use crate::session::PlayerId;

pub type Handler<A> = Box<dyn Fn(&mut A) + Send + Sync>;

/// An interaction kind with its own handler list in [`ActionRegistry`].
pub trait Action: Sized + 'static {
    const KIND: &'static str;

    fn handlers(registry: &ActionRegistry) -> &[Handler<Self>];

    fn handlers_mut(registry: &mut ActionRegistry) -> &mut Vec<Handler<Self>>;
}

pub trait Cancellable {
    fn is_cancelled(&self) -> bool;

    fn set_cancelled(&mut self, cancelled: bool);
}

macro_rules! actions {
    ($($action:ident => $field:ident),* $(,)?) => {
        /// One handler list per action kind.
        #[derive(Default)]
        pub struct ActionRegistry {
            $($field: Vec<Handler<$action>>,)*
        }

        $(
            impl Action for $action {
                const KIND: &'static str = stringify!($action);

                fn handlers(registry: &ActionRegistry) -> &[Handler<Self>] {
                    &registry.$field
                }

                fn handlers_mut(registry: &mut ActionRegistry) -> &mut Vec<Handler<Self>> {
                    &mut registry.$field
                }
            }
        )*

        impl fmt::Debug for ActionRegistry {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct("ActionRegistry")
                    $(.field(stringify!($field), &self.$field.len()))*
                    .finish()
            }
        }
    };
}

actions!(
    ButtonClicked => button_clicked,
    CheckboxToggled => checkbox_toggled,
    RadioToggled => radio_toggled,
    SliderChanged => slider_changed,
    TextboxChanged => textbox_changed,
    ScreenClosed => screen_closed,
    PlayerJoined => player_joined,
);

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<A: Action>(&mut self, handler: impl Fn(&mut A) + Send + Sync + 'static) {
        A::handlers_mut(self).push(Box::new(handler));
    }

    pub fn dispatch<A: Action>(&self, action: &mut A) {
        let handlers = A::handlers(self);
        if !handlers.is_empty() {
            log::debug!("Dispatching {} to {} handler(s)", A::KIND, handlers.len());
        }
        for handler in handlers {
            handler(action);
        }
    }

    pub fn handler_count<A: Action>(&self) -> usize {
        A::handlers(self).len()
    }

    pub fn clear<A: Action>(&mut self) {
        A::handlers_mut(self).clear();
    }
}

macro_rules! cancellable {
    ($($action:ident),* $(,)?) => {$(
        impl Cancellable for $action {
            fn is_cancelled(&self) -> bool {
                self.cancelled
            }

            fn set_cancelled(&mut self, cancelled: bool) {
                self.cancelled = cancelled;
            }
        }
    )*};
}

cancellable!(
    ButtonClicked,
    CheckboxToggled,
    RadioToggled,
    SliderChanged,
    TextboxChanged,
);

#[derive(Debug, Clone)]
pub struct ButtonClicked {
    player: PlayerId,
    screen: Key,
    button: Button,
    cancelled: bool,
}

impl ButtonClicked {
    pub fn new(player: PlayerId, screen: Key, button: Button) -> Self {
        Self {
            player,
            screen,
            button,
            cancelled: false,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn screen(&self) -> &Key {
        &self.screen
    }

    pub fn button(&self) -> &Button {
        &self.button
    }
}

/// `selected` starts as the client's proposal and may be rewritten.
#[derive(Debug, Clone)]
pub struct CheckboxToggled {
    player: PlayerId,
    screen: Key,
    checkbox: Checkbox,
    selected: bool,
    cancelled: bool,
}

impl CheckboxToggled {
    pub fn new(player: PlayerId, screen: Key, checkbox: Checkbox, selected: bool) -> Self {
        Self {
            player,
            screen,
            checkbox,
            selected,
            cancelled: false,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn screen(&self) -> &Key {
        &self.screen
    }

    /// The checkbox as it was before this interaction.
    pub fn checkbox(&self) -> &Checkbox {
        &self.checkbox
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

#[derive(Debug, Clone)]
pub struct RadioToggled {
    player: PlayerId,
    screen: Key,
    radio: Radio,
    selected: bool,
    cancelled: bool,
}

impl RadioToggled {
    pub fn new(player: PlayerId, screen: Key, radio: Radio, selected: bool) -> Self {
        Self {
            player,
            screen,
            radio,
            selected,
            cancelled: false,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn screen(&self) -> &Key {
        &self.screen
    }

    pub fn radio(&self) -> &Radio {
        &self.radio
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

#[derive(Debug, Clone)]
pub struct SliderChanged {
    player: PlayerId,
    screen: Key,
    slider: Slider,
    value: f64,
    cancelled: bool,
}

impl SliderChanged {
    pub fn new(player: PlayerId, screen: Key, slider: Slider, value: f64) -> Self {
        Self {
            player,
            screen,
            slider,
            value,
            cancelled: false,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn screen(&self) -> &Key {
        &self.screen
    }

    pub fn slider(&self) -> &Slider {
        &self.slider
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }
}

#[derive(Debug, Clone)]
pub struct TextboxChanged {
    player: PlayerId,
    screen: Key,
    textbox: Textbox,
    value: String,
    cancelled: bool,
}

impl TextboxChanged {
    pub fn new(player: PlayerId, screen: Key, textbox: Textbox, value: String) -> Self {
        Self {
            player,
            screen,
            textbox,
            value,
            cancelled: false,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn screen(&self) -> &Key {
        &self.screen
    }

    pub fn textbox(&self) -> &Textbox {
        &self.textbox
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

/// The player closed the screen themselves. Not cancellable: the client has
/// already torn it down.
#[derive(Debug, Clone)]
pub struct ScreenClosed {
    player: PlayerId,
    screen: Key,
}

impl ScreenClosed {
    pub fn new(player: PlayerId, screen: Key) -> Self {
        Self { player, screen }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn screen(&self) -> &Key {
        &self.screen
    }
}

/// A compatible client finished the handshake.
#[derive(Debug, Clone)]
pub struct PlayerJoined {
    player: PlayerId,
    protocol: i32,
}

impl PlayerJoined {
    pub fn new(player: PlayerId, protocol: i32) -> Self {
        Self { player, protocol }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn protocol(&self) -> i32 {
        self.protocol
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn checkbox_action(selected: bool) -> CheckboxToggled {
        CheckboxToggled::new(
            7,
            Key::parse("t:screen").unwrap(),
            Checkbox::builder(Key::parse("t:check").unwrap()).build(),
            selected,
        )
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let mut registry = ActionRegistry::new();
        registry.register(|action: &mut SliderChanged| action.set_value(action.value() + 1.0));
        registry.register(|action: &mut SliderChanged| action.set_value(action.value() * 10.0));

        let mut action = SliderChanged::new(
            1,
            Key::parse("t:screen").unwrap(),
            Slider::builder(Key::parse("t:slider").unwrap()).build().unwrap(),
            0.5,
        );
        registry.dispatch(&mut action);
        assert_eq!(action.value(), 15.0);
    }

    #[test]
    fn cancellation_does_not_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ActionRegistry::new();
        registry.register(|action: &mut CheckboxToggled| action.set_cancelled(true));
        let seen = calls.clone();
        registry.register(move |action: &mut CheckboxToggled| {
            assert!(action.is_cancelled());
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let mut action = checkbox_action(true);
        registry.dispatch(&mut action);
        assert!(action.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn kinds_have_separate_handler_lists() {
        let mut registry = ActionRegistry::new();
        registry.register(|action: &mut CheckboxToggled| action.set_selected(false));
        assert_eq!(registry.handler_count::<CheckboxToggled>(), 1);
        assert_eq!(registry.handler_count::<RadioToggled>(), 0);

        let mut radio = RadioToggled::new(
            1,
            Key::parse("t:screen").unwrap(),
            Radio::builder(Key::parse("t:radio").unwrap()).build(),
            true,
        );
        registry.dispatch(&mut radio);
        assert!(radio.selected());

        registry.clear::<CheckboxToggled>();
        let mut action = checkbox_action(true);
        registry.dispatch(&mut action);
        assert!(action.selected());
    }

    #[test]
    fn dispatch_without_handlers_is_a_no_op() {
        let registry = ActionRegistry::new();
        let mut action = PlayerJoined::new(3, 1);
        registry.dispatch(&mut action);
        assert_eq!(action.player(), 3);
    }
}
