//! The rendering side: a local copy of every screen the server has sent,
//! optimistic updates for the player's own interactions and application of
//! the server's corrections.

use std::collections::{HashMap, VecDeque};

use crate::gui::{Element, ElementType, Screen, TextureManager};
use crate::key::{Key, Keyed};
use crate::net::{
    ButtonClick, Channel, ChannelError, CheckboxToggle, CloseScreen, Connection, ElementUpsert,
    Hello, NetworkHandler, OpenScreen, PROTOCOL_VERSION, Packet, PacketListener, RadioToggle,
    SliderChange, TextboxChange, Textures,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("no screen is open")]
    NoScreen,
    #[error("no element '{0}' on the open screen")]
    UnknownElement(String),
    #[error("slider value {value} for {key} is not finite")]
    NonFiniteValue { key: Key, value: f64 },
    #[error("element {key} is a {}, not a {}", .found.as_str(), .expected.as_str())]
    WrongType {
        key: Key,
        expected: ElementType,
        found: ElementType,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Handshake { protocol: i32, compatible: bool },
    ScreenOpened { screen: Key },
    ScreenClosed { screen: Key },
    ElementChanged { screen: Key, element: Key },
    TexturesLoaded { count: usize },
}

/// Client-side view of the UI plus the connection it came from.
///
/// Screens stay cached after they close so a payload-less `OpenScreen` can
/// reopen them.
#[derive(Debug)]
pub struct ClientState<C> {
    connection: Connection<C>,
    handler: NetworkHandler,
    screens: HashMap<Key, Screen>,
    modal: Option<Key>,
    huds: Vec<Key>,
    textures: TextureManager,
    pending_events: VecDeque<ClientEvent>,
}

impl<C: Channel> ClientState<C> {
    pub fn new(channel: C) -> Self {
        Self {
            connection: Connection::new(channel),
            handler: NetworkHandler::new(),
            screens: HashMap::new(),
            modal: None,
            huds: Vec::new(),
            textures: TextureManager::new(),
            pending_events: VecDeque::new(),
        }
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

    /// Starts the handshake. Call once the transport can deliver the reply.
    pub fn hello(&mut self) -> Result<bool, ChannelError> {
        self.connection.send(Hello::default(), true)
    }

    pub fn receive(&mut self, frame: &[u8]) -> bool {
        match self.handler.decode_frame(frame) {
            Some(packet) => {
                packet.handle(self);
                true
            }
            None => false,
        }
    }

    /// Sends an intent produced by one of the `predict_*` helpers.
    pub fn send(&mut self, packet: impl Into<Packet>) -> Result<bool, ChannelError> {
        self.connection.send(packet, false)
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = ClientEvent> + '_ {
        self.pending_events.drain(..)
    }

    pub fn screen(&self, key: &str) -> Option<&Screen> {
        self.screens.get(key)
    }

    pub fn modal(&self) -> Option<&Screen> {
        self.modal.as_ref().and_then(|key| self.screens.get(key))
    }

    pub fn huds(&self) -> impl Iterator<Item = &Screen> {
        self.huds.iter().filter_map(|key| self.screens.get(key))
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    fn modal_element_mut(
        &mut self,
        element: &str,
        expected: ElementType,
    ) -> Result<(Key, &mut Element), ClientError> {
        let key = self.modal.clone().ok_or(ClientError::NoScreen)?;
        let screen = self.screens.get_mut(&key).ok_or(ClientError::NoScreen)?;
        let found = screen
            .get_element_mut(element)
            .ok_or_else(|| ClientError::UnknownElement(element.to_string()))?;
        if found.element_type() != expected {
            return Err(ClientError::WrongType {
                key: found.key().clone(),
                expected,
                found: found.element_type(),
            });
        }
        Ok((key, found))
    }

    pub fn predict_click(&mut self, element: &str) -> Result<ButtonClick, ClientError> {
        let (screen, found) = self.modal_element_mut(element, ElementType::Button)?;
        Ok(ButtonClick {
            screen,
            element: found.key().clone(),
        })
    }

    pub fn predict_checkbox(
        &mut self,
        element: &str,
        selected: bool,
    ) -> Result<CheckboxToggle, ClientError> {
        let (screen, found) = self.modal_element_mut(element, ElementType::Checkbox)?;
        let Element::Checkbox(checkbox) = found else {
            return Err(ClientError::UnknownElement(element.to_string()));
        };
        checkbox.set_selected(selected);
        Ok(CheckboxToggle {
            screen,
            element: checkbox.key().clone(),
            selected,
        })
    }

    /// Selecting a radio deselects the rest of its group locally as well.
    pub fn predict_radio(
        &mut self,
        element: &str,
        selected: bool,
    ) -> Result<RadioToggle, ClientError> {
        let (screen, found) = self.modal_element_mut(element, ElementType::Radio)?;
        let Element::Radio(radio) = found else {
            return Err(ClientError::UnknownElement(element.to_string()));
        };
        radio.set_selected(selected);
        let key = radio.key().clone();
        let group = radio.group().cloned();

        if selected
            && let Some(group) = group
            && let Some(live) = self.screens.get_mut(&screen)
        {
            live.clear_radio_group(&group, &key);
        }
        Ok(RadioToggle {
            screen,
            element: key,
            selected,
        })
    }

    pub fn predict_slider(&mut self, element: &str, value: f64) -> Result<SliderChange, ClientError> {
        let (screen, found) = self.modal_element_mut(element, ElementType::Slider)?;
        let Element::Slider(slider) = found else {
            return Err(ClientError::UnknownElement(element.to_string()));
        };
        if !slider.set_value(value) {
            return Err(ClientError::NonFiniteValue {
                key: slider.key().clone(),
                value,
            });
        }
        Ok(SliderChange {
            screen,
            element: slider.key().clone(),
            value,
        })
    }

    pub fn predict_textbox(
        &mut self,
        element: &str,
        value: impl Into<String>,
    ) -> Result<TextboxChange, ClientError> {
        let value = value.into();
        let (screen, found) = self.modal_element_mut(element, ElementType::Textbox)?;
        let Element::Textbox(textbox) = found else {
            return Err(ClientError::UnknownElement(element.to_string()));
        };
        textbox.set_value(value.as_str());
        Ok(TextboxChange {
            screen,
            element: textbox.key().clone(),
            value,
        })
    }

    /// The player dismissed the modal.
    pub fn close_modal(&mut self) -> Option<CloseScreen> {
        let screen = self.modal.take()?;
        Some(CloseScreen { screen })
    }

    fn changed(&mut self, screen: &Key, element: &Key) {
        self.pending_events.push_back(ClientEvent::ElementChanged {
            screen: screen.clone(),
            element: element.clone(),
        });
    }

    /// Applies `apply` to the cached element, logging when it is missing.
    fn correct<F>(&mut self, screen: &Key, element: &Key, apply: F)
    where
        F: FnOnce(&mut Element),
    {
        let Some(found) = self
            .screens
            .get_mut(screen.as_str())
            .and_then(|live| live.get_element_mut(element.as_str()))
        else {
            log::debug!("Correction for unknown element {} on {}", element, screen);
            return;
        };
        apply(found);
        self.changed(screen, element);
    }
}

impl<C: Channel> PacketListener for ClientState<C> {
    fn on_hello(&mut self, packet: &Hello) {
        let compatible = self.connection.set_remote_protocol(packet.protocol);
        if compatible {
            log::info!("Server speaks protocol {}", packet.protocol);
        } else {
            log::warn!(
                "Server speaks protocol {}, expected {}",
                packet.protocol,
                PROTOCOL_VERSION
            );
        }
        self.pending_events.push_back(ClientEvent::Handshake {
            protocol: packet.protocol,
            compatible,
        });
    }

    fn on_open_screen(&mut self, packet: &OpenScreen) {
        let key = packet.screen_key.clone();
        match &packet.screen {
            Some(screen) => {
                self.screens.insert(key.clone(), screen.clone());
            }
            None if self.screens.contains_key(&key) => {}
            None => {
                log::debug!("Asked to reopen unknown screen {}", key);
                return;
            }
        }

        let is_hud = self.screens.get(&key).is_some_and(Screen::is_hud);
        if is_hud {
            if !self.huds.contains(&key) {
                self.huds.push(key.clone());
            }
        } else {
            self.modal = Some(key.clone());
        }
        self.pending_events
            .push_back(ClientEvent::ScreenOpened { screen: key });
    }

    fn on_close_screen(&mut self, packet: &CloseScreen) {
        if self.modal.as_ref() == Some(&packet.screen) {
            self.modal = None;
        } else if let Some(index) = self.huds.iter().position(|hud| hud == &packet.screen) {
            self.huds.remove(index);
        } else {
            return;
        }
        self.pending_events.push_back(ClientEvent::ScreenClosed {
            screen: packet.screen.clone(),
        });
    }

    fn on_element_upsert(&mut self, packet: &ElementUpsert) {
        let Some(screen) = self.screens.get_mut(packet.screen.as_str()) else {
            log::debug!("Element upsert for unknown screen {}", packet.screen);
            return;
        };
        // The server's selection wins over whatever was predicted locally.
        if let Some(radio) = packet.element.as_radio()
            && radio.is_selected()
            && let Some(group) = radio.group()
        {
            screen.clear_radio_group(group, radio.key());
        }
        if let Err(err) = screen.add_element(packet.element.clone()) {
            log::warn!("Rejected element upsert on {}: {}", packet.screen, err);
            return;
        }
        self.changed(&packet.screen, packet.element.key());
    }

    fn on_checkbox_toggle(&mut self, packet: &CheckboxToggle) {
        self.correct(&packet.screen, &packet.element, |element| {
            if let Element::Checkbox(checkbox) = element {
                checkbox.set_selected(packet.selected);
            }
        });
    }

    fn on_radio_toggle(&mut self, packet: &RadioToggle) {
        if packet.selected {
            let group = self
                .screens
                .get(packet.screen.as_str())
                .and_then(|screen| screen.get_element(packet.element.as_str()))
                .and_then(Element::as_radio)
                .and_then(|radio| radio.group().cloned());
            if let (Some(group), Some(screen)) =
                (group, self.screens.get_mut(packet.screen.as_str()))
            {
                screen.clear_radio_group(&group, &packet.element);
            }
        }
        self.correct(&packet.screen, &packet.element, |element| {
            if let Element::Radio(radio) = element {
                radio.set_selected(packet.selected);
            }
        });
    }

    fn on_slider_change(&mut self, packet: &SliderChange) {
        if !packet.value.is_finite() {
            log::warn!("Ignoring non-finite correction for slider {}", packet.element);
            return;
        }
        self.correct(&packet.screen, &packet.element, |element| {
            if let Element::Slider(slider) = element {
                slider.set_value(packet.value);
            }
        });
    }

    fn on_textbox_change(&mut self, packet: &TextboxChange) {
        self.correct(&packet.screen, &packet.element, |element| {
            if let Element::Textbox(textbox) = element {
                textbox.set_value(packet.value.as_str());
            }
        });
    }

    fn on_textures(&mut self, packet: &Textures) {
        for texture in &packet.textures {
            self.textures.add(texture.clone());
        }
        self.pending_events.push_back(ClientEvent::TexturesLoaded {
            count: packet.textures.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::{Button, Checkbox, Radio, ScreenKind, Slider, Texture, Textbox};

    fn key(value: &str) -> Key {
        Key::parse(value).unwrap()
    }

    fn frame(packet: impl Into<Packet>) -> Vec<u8> {
        packet.into().encode_frame().unwrap()
    }

    fn menu() -> Screen {
        Screen::builder(key("t:menu"))
            .element(Button::builder(key("t:ok")).build())
            .unwrap()
            .element(Checkbox::builder(key("t:check")).build())
            .unwrap()
            .element(Slider::builder(key("t:volume")).build().unwrap())
            .unwrap()
            .element(Textbox::builder(key("t:name")).build())
            .unwrap()
            .element(
                Radio::builder(key("t:r1"))
                    .group(key("t:g"))
                    .selected(true)
                    .build(),
            )
            .unwrap()
            .element(Radio::builder(key("t:r2")).group(key("t:g")).build())
            .unwrap()
            .build()
    }

    fn connected() -> ClientState<Vec<Vec<u8>>> {
        let mut client = ClientState::new(Vec::new());
        client.receive(&frame(Hello::default()));
        client.receive(&frame(OpenScreen::new(menu())));
        client.drain_events().for_each(drop);
        client
    }

    fn radio(client: &ClientState<Vec<Vec<u8>>>, element: &str) -> bool {
        client
            .screen("t:menu")
            .and_then(|screen| screen.get_element(element))
            .and_then(Element::as_radio)
            .is_some_and(|radio| radio.is_selected())
    }

    #[test]
    fn intents_wait_for_a_compatible_server() {
        let mut client = ClientState::new(Vec::new());
        assert!(client.hello().unwrap());
        assert!(
            !client
                .send(CloseScreen {
                    screen: key("t:menu")
                })
                .unwrap()
        );

        client.receive(&frame(Hello {
            protocol: PROTOCOL_VERSION + 1,
        }));
        assert!(!client.is_compatible());

        client.receive(&frame(Hello::default()));
        assert!(client.is_compatible());
        assert_eq!(
            client.drain_events().collect::<Vec<_>>(),
            [
                ClientEvent::Handshake {
                    protocol: PROTOCOL_VERSION + 1,
                    compatible: false,
                },
                ClientEvent::Handshake {
                    protocol: PROTOCOL_VERSION,
                    compatible: true,
                },
            ]
        );
        assert_eq!(client.connection().channel().len(), 1);
    }

    #[test]
    fn modal_and_hud_are_tracked_separately() {
        let mut client = connected();
        let hud = Screen::builder(key("t:hud")).kind(ScreenKind::Hud).build();
        client.receive(&frame(OpenScreen::new(hud)));

        assert_eq!(client.modal().map(|screen| screen.key().as_str()), Some("t:menu"));
        assert_eq!(client.huds().count(), 1);

        client.receive(&frame(CloseScreen {
            screen: key("t:menu"),
        }));
        assert!(client.modal().is_none());
        assert_eq!(client.huds().count(), 1);

        client.receive(&frame(OpenScreen {
            screen_key: key("t:menu"),
            screen: None,
        }));
        assert!(client.modal().is_some());
    }

    #[test]
    fn prediction_mutates_local_copy() {
        let mut client = connected();
        let intent = client.predict_checkbox("t:check", true).unwrap();
        assert_eq!(intent.element, key("t:check"));
        assert!(client.send(intent).unwrap());

        let screen = client.modal().unwrap();
        assert!(matches!(
            screen.get_element("t:check"),
            Some(Element::Checkbox(c)) if c.is_selected()
        ));

        client.predict_slider("t:volume", 0.25).unwrap();
        client.predict_textbox("t:name", "alex").unwrap();
        let screen = client.modal().unwrap();
        assert!(matches!(screen.get_element("t:volume"), Some(Element::Slider(s)) if s.value() == 0.25));
        assert!(
            matches!(screen.get_element("t:name"), Some(Element::Textbox(t)) if t.value() == Some("alex"))
        );
    }

    #[test]
    fn predicted_radio_clears_its_group() {
        let mut client = connected();
        let intent = client.predict_radio("t:r2", true).unwrap();
        assert!(intent.selected);
        assert!(radio(&client, "t:r2"));
        assert!(!radio(&client, "t:r1"));
    }

    #[test]
    fn corrections_overwrite_predictions() {
        let mut client = connected();
        client.predict_radio("t:r2", true).unwrap();
        client.predict_slider("t:volume", 4.0).unwrap();

        client.receive(&frame(RadioToggle {
            screen: key("t:menu"),
            element: key("t:r1"),
            selected: true,
        }));
        client.receive(&frame(SliderChange {
            screen: key("t:menu"),
            element: key("t:volume"),
            value: 1.0,
        }));

        assert!(radio(&client, "t:r1"));
        assert!(!radio(&client, "t:r2"));
        let screen = client.modal().unwrap();
        assert!(matches!(screen.get_element("t:volume"), Some(Element::Slider(s)) if s.value() == 1.0));
        assert_eq!(client.drain_events().count(), 2);
    }

    #[test]
    fn upserts_replace_and_may_move_radio_selection() {
        let mut client = connected();
        let moved = Radio::builder(key("t:r2"))
            .group(key("t:g"))
            .selected(true)
            .build();
        client.receive(&frame(ElementUpsert {
            screen: key("t:menu"),
            element: moved.into(),
        }));
        assert!(radio(&client, "t:r2"));
        assert!(!radio(&client, "t:r1"));

        client.receive(&frame(ElementUpsert {
            screen: key("t:unknown"),
            element: Button::builder(key("t:x")).build().into(),
        }));
        assert_eq!(client.drain_events().count(), 1);
    }

    #[test]
    fn predictions_check_the_element() {
        let mut client = ClientState::new(Vec::new());
        assert_eq!(client.predict_click("t:ok"), Err(ClientError::NoScreen));

        let mut client = connected();
        assert!(client.predict_click("t:ok").is_ok());
        assert_eq!(
            client.predict_click("t:missing"),
            Err(ClientError::UnknownElement("t:missing".to_string()))
        );
        assert_eq!(
            client.predict_slider("t:check", 0.5),
            Err(ClientError::WrongType {
                key: key("t:check"),
                expected: ElementType::Slider,
                found: ElementType::Checkbox,
            })
        );

        assert_eq!(
            client.close_modal(),
            Some(CloseScreen {
                screen: key("t:menu")
            })
        );
        assert_eq!(client.close_modal(), None);
    }

    #[test]
    fn non_finite_slider_values_never_reach_the_screen() {
        let mut client = connected();
        let volume = |client: &ClientState<Vec<Vec<u8>>>| match client
            .screen("t:menu")
            .and_then(|screen| screen.get_element("t:volume"))
        {
            Some(Element::Slider(slider)) => slider.value(),
            _ => panic!("volume slider missing"),
        };
        let before = volume(&client);

        assert!(matches!(
            client.predict_slider("t:volume", f64::NAN),
            Err(ClientError::NonFiniteValue { .. })
        ));
        client.on_slider_change(&SliderChange {
            screen: key("t:menu"),
            element: key("t:volume"),
            value: f64::INFINITY,
        });

        assert_eq!(volume(&client), before);
        assert_eq!(client.drain_events().count(), 0);
    }

    #[test]
    fn textures_are_stored() {
        let mut client = connected();
        client.receive(&frame(Textures {
            textures: vec![Texture::dirt()],
        }));
        assert!(client.textures().get(Texture::DIRT_KEY).is_some());
        assert_eq!(
            client.drain_events().collect::<Vec<_>>(),
            [ClientEvent::TexturesLoaded { count: 1 }]
        );
    }
}
