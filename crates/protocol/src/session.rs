//! The authoritative side: per-player sessions, the screens they look at and
//! reconciliation of client intents against that state.

use std::collections::{HashMap, VecDeque};

use crate::action::{
    ActionRegistry, ButtonClicked, Cancellable, CheckboxToggled, PlayerJoined, RadioToggled,
    ScreenClosed, SliderChanged, TextboxChanged,
};
use crate::gui::{Element, Screen, ScreenError, TextureManager};
use crate::key::{Key, Keyed};
use crate::net::{
    ButtonClick, Channel, ChannelError, CheckboxToggle, CloseScreen, Connection, ElementUpsert,
    Hello, NetworkHandler, OpenScreen, Packet, PacketListener, RadioToggle, SliderChange,
    TextboxChange, Textures,
};

pub type PlayerId = u32;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no screen registered under '{0}'")]
    UnknownScreen(String),
    #[error(transparent)]
    Invariant(#[from] ScreenError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// What the authoritative side knows about one connected player.
#[derive(Debug)]
pub struct Session<C> {
    player: PlayerId,
    connection: Connection<C>,
    current_screen: Option<Key>,
    huds: Vec<Key>,
}

impl<C: Channel> Session<C> {
    pub fn new(player: PlayerId, channel: C) -> Self {
        Self {
            player,
            connection: Connection::new(channel),
            current_screen: None,
            huds: Vec::new(),
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn connection(&self) -> &Connection<C> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut Connection<C> {
        &mut self.connection
    }

    pub fn is_compatible(&self) -> bool {
        self.connection.is_compatible()
    }

    /// The modal screen this player has open, if any.
    pub fn current_screen(&self) -> Option<&Key> {
        self.current_screen.as_ref()
    }

    pub fn huds(&self) -> &[Key] {
        &self.huds
    }

    fn send(&mut self, packet: impl Into<Packet>) {
        let packet = packet.into();
        let kind = packet.kind();
        if let Err(err) = self.connection.send(packet, false) {
            log::warn!(
                "Failed to send {} to player {}: {}",
                kind.as_str(),
                self.player,
                err
            );
        }
    }
}

/// Every screen the authoritative side can show, by key.
#[derive(Debug, Default, Clone)]
pub struct ScreenStore {
    screens: HashMap<Key, Screen>,
}

impl ScreenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, screen: Screen) -> Option<Screen> {
        self.screens.insert(screen.key().clone(), screen)
    }

    pub fn get(&self, key: &str) -> Option<&Screen> {
        self.screens.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Screen> {
        self.screens.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Screen> {
        self.screens.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.screens.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }
}

/// Things the application may want to react to after a frame was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Joined { player: PlayerId, protocol: i32 },
    Incompatible { player: PlayerId, protocol: i32 },
    ScreenClosed { player: PlayerId, screen: Key },
}

/// Owner of the authoritative UI state.
///
/// All mutation happens on the caller's thread of control, one frame at a
/// time.
#[derive(Debug, Default)]
pub struct Authority {
    screens: ScreenStore,
    textures: TextureManager,
    actions: ActionRegistry,
    handler: NetworkHandler,
    pending_events: VecDeque<SessionEvent>,
}

impl Authority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screens(&self) -> &ScreenStore {
        &self.screens
    }

    pub fn screens_mut(&mut self) -> &mut ScreenStore {
        &mut self.screens
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = SessionEvent> + '_ {
        self.pending_events.drain(..)
    }

    /// Handles one frame received from `session`'s peer.
    pub fn receive<C: Channel>(&mut self, session: &mut Session<C>, frame: &[u8]) -> bool {
        let mut reconciler = Reconciler {
            session,
            screens: &mut self.screens,
            textures: &self.textures,
            actions: &self.actions,
            events: &mut self.pending_events,
        };
        self.handler.receive(&mut reconciler, frame)
    }

    /// Shows the stored screen `key` to the player.
    ///
    /// A modal replaces the player's current modal; a HUD is added next to
    /// whatever is already shown. Returns `Ok(false)` for a peer that has not
    /// completed a compatible handshake.
    pub fn open_screen<C: Channel>(
        &self,
        session: &mut Session<C>,
        key: &str,
    ) -> Result<bool, SessionError> {
        let screen = self
            .screens
            .get(key)
            .ok_or_else(|| SessionError::UnknownScreen(key.to_string()))?;
        if !session.connection.send(OpenScreen::new(screen.clone()), false)? {
            return Ok(false);
        }

        let key = screen.key().clone();
        if screen.is_hud() {
            if !session.huds.contains(&key) {
                session.huds.push(key);
            }
        } else {
            log::debug!("Player {} now viewing {}", session.player, key);
            session.current_screen = Some(key);
        }
        Ok(true)
    }

    /// Closes the player's current modal, if one is open.
    pub fn close_screen<C: Channel>(&self, session: &mut Session<C>) -> Result<bool, SessionError> {
        let Some(screen) = session.current_screen.take() else {
            return Ok(false);
        };
        Ok(session.connection.send(CloseScreen { screen }, false)?)
    }

    pub fn close_hud<C: Channel>(
        &self,
        session: &mut Session<C>,
        key: &str,
    ) -> Result<bool, SessionError> {
        let Some(index) = session.huds.iter().position(|hud| hud.as_str() == key) else {
            return Ok(false);
        };
        let screen = session.huds.remove(index);
        Ok(session.connection.send(CloseScreen { screen }, false)?)
    }

    /// Replaces (or adds) `element` on the stored screen and pushes it to the
    /// player.
    pub fn send_element<C: Channel>(
        &mut self,
        session: &mut Session<C>,
        screen_key: &str,
        element: impl Into<Element>,
    ) -> Result<bool, SessionError> {
        let element = element.into();
        let screen = self
            .screens
            .get_mut(screen_key)
            .ok_or_else(|| SessionError::UnknownScreen(screen_key.to_string()))?;
        screen.add_element(element.clone())?;
        let upsert = ElementUpsert {
            screen: screen.key().clone(),
            element,
        };
        Ok(session.connection.send(upsert, false)?)
    }
}

/// Listener for frames from one player, borrowing the authoritative state for
/// the duration of a single frame.
struct Reconciler<'a, C> {
    session: &'a mut Session<C>,
    screens: &'a mut ScreenStore,
    textures: &'a TextureManager,
    actions: &'a ActionRegistry,
    events: &'a mut VecDeque<SessionEvent>,
}

impl<C: Channel> Reconciler<'_, C> {
    /// Intents only count against the modal the player has open.
    fn live_screen(&self, screen: &Key) -> Option<&Screen> {
        if self.session.current_screen.as_ref() != Some(screen) {
            log::debug!(
                "Ignoring intent from player {} for screen {} they are not viewing",
                self.session.player,
                screen
            );
            return None;
        }
        self.screens.get(screen.as_str())
    }

    fn live_element(&self, screen: &Key, element: &Key) -> Option<Element> {
        let found = self.live_screen(screen)?.get_element(element.as_str()).cloned();
        if found.is_none() {
            log::debug!("Ignoring intent for unknown element {} on {}", element, screen);
        }
        found
    }

    fn live_screen_mut(&mut self, screen: &Key) -> Option<&mut Screen> {
        self.screens.get_mut(screen.as_str())
    }
}

impl<C: Channel> PacketListener for Reconciler<'_, C> {
    fn on_hello(&mut self, packet: &Hello) {
        let player = self.session.player;
        let compatible = self.session.connection.set_remote_protocol(packet.protocol);
        log::info!("Player {} announced protocol {}", player, packet.protocol);

        if let Err(err) = self.session.connection.send(Hello::default(), true) {
            log::warn!("Failed to answer hello from player {}: {}", player, err);
        }

        if !compatible {
            log::warn!(
                "Player {} speaks protocol {}, UI disabled for them",
                player,
                packet.protocol
            );
            self.events.push_back(SessionEvent::Incompatible {
                player,
                protocol: packet.protocol,
            });
            return;
        }

        if !self.textures.is_empty() {
            self.session.send(Textures {
                textures: self.textures.to_vec(),
            });
        }

        let mut action = PlayerJoined::new(player, packet.protocol);
        self.actions.dispatch(&mut action);
        self.events.push_back(SessionEvent::Joined {
            player,
            protocol: packet.protocol,
        });
    }

    fn on_close_screen(&mut self, packet: &CloseScreen) {
        if self.session.current_screen.as_ref() != Some(&packet.screen) {
            log::debug!(
                "Player {} closed {} which is not their current screen",
                self.session.player,
                packet.screen
            );
            return;
        }
        let player = self.session.player;
        let mut action = ScreenClosed::new(player, packet.screen.clone());
        self.actions.dispatch(&mut action);
        self.session.current_screen = None;
        self.events.push_back(SessionEvent::ScreenClosed {
            player,
            screen: packet.screen.clone(),
        });
    }

    fn on_button_click(&mut self, packet: &ButtonClick) {
        let Some(Element::Button(button)) = self.live_element(&packet.screen, &packet.element)
        else {
            return;
        };
        let mut action = ButtonClicked::new(self.session.player, packet.screen.clone(), button);
        self.actions.dispatch(&mut action);
        if action.is_cancelled() {
            log::debug!("Click on {} cancelled", packet.element);
        }
    }

    fn on_checkbox_toggle(&mut self, packet: &CheckboxToggle) {
        let Some(Element::Checkbox(checkbox)) = self.live_element(&packet.screen, &packet.element)
        else {
            return;
        };
        let mut action = CheckboxToggled::new(
            self.session.player,
            packet.screen.clone(),
            checkbox,
            packet.selected,
        );
        self.actions.dispatch(&mut action);
        if action.is_cancelled() {
            return;
        }

        let selected = action.selected();
        if let Some(Element::Checkbox(live)) = self
            .live_screen_mut(&packet.screen)
            .and_then(|screen| screen.get_element_mut(packet.element.as_str()))
        {
            live.set_selected(selected);
        }
        if selected != packet.selected {
            self.session.send(CheckboxToggle {
                screen: packet.screen.clone(),
                element: packet.element.clone(),
                selected,
            });
        }
    }

    fn on_radio_toggle(&mut self, packet: &RadioToggle) {
        let Some(Element::Radio(radio)) = self.live_element(&packet.screen, &packet.element) else {
            return;
        };
        let group = radio.group().cloned();
        let mut action = RadioToggled::new(
            self.session.player,
            packet.screen.clone(),
            radio,
            packet.selected,
        );
        self.actions.dispatch(&mut action);
        if action.is_cancelled() {
            return;
        }

        let selected = action.selected();
        let mut corrections = Vec::new();
        if let Some(screen) = self.live_screen_mut(&packet.screen) {
            if selected && let Some(group) = &group {
                for sibling in screen.clear_radio_group(group, &packet.element) {
                    corrections.push(RadioToggle {
                        screen: packet.screen.clone(),
                        element: sibling.key().clone(),
                        selected: false,
                    });
                }
            }
            if let Some(Element::Radio(live)) = screen.get_element_mut(packet.element.as_str()) {
                live.set_selected(selected);
            }
        }
        if selected != packet.selected {
            corrections.push(RadioToggle {
                screen: packet.screen.clone(),
                element: packet.element.clone(),
                selected,
            });
        }
        for correction in corrections {
            self.session.send(correction);
        }
    }

    fn on_slider_change(&mut self, packet: &SliderChange) {
        let Some(Element::Slider(slider)) = self.live_element(&packet.screen, &packet.element)
        else {
            return;
        };
        let mut action =
            SliderChanged::new(self.session.player, packet.screen.clone(), slider, packet.value);
        self.actions.dispatch(&mut action);
        if action.is_cancelled() {
            return;
        }

        let mut value = action.value();
        if !value.is_finite() {
            log::warn!(
                "Handler produced non-finite value for slider {} on {}, keeping {}",
                packet.element,
                packet.screen,
                action.slider().value()
            );
            value = action.slider().value();
        }
        if let Some(Element::Slider(live)) = self
            .live_screen_mut(&packet.screen)
            .and_then(|screen| screen.get_element_mut(packet.element.as_str()))
        {
            live.set_value(value);
        }
        if value != packet.value {
            self.session.send(SliderChange {
                screen: packet.screen.clone(),
                element: packet.element.clone(),
                value,
            });
        }
    }

    fn on_textbox_change(&mut self, packet: &TextboxChange) {
        let Some(Element::Textbox(textbox)) = self.live_element(&packet.screen, &packet.element)
        else {
            return;
        };
        let mut action = TextboxChanged::new(
            self.session.player,
            packet.screen.clone(),
            textbox,
            packet.value.clone(),
        );
        self.actions.dispatch(&mut action);
        if action.is_cancelled() {
            return;
        }

        if let Some(Element::Textbox(live)) = self
            .live_screen_mut(&packet.screen)
            .and_then(|screen| screen.get_element_mut(packet.element.as_str()))
        {
            live.set_value(action.value());
        }
        if action.value() != packet.value {
            self.session.send(TextboxChange {
                screen: packet.screen.clone(),
                element: packet.element.clone(),
                value: action.value().to_string(),
            });
        }
    }
}
