use std::collections::HashSet;

use anyhow::Result;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use vellum::{ClientEvent, ClientState, Element, Key, Keyed, Packet, read_frame, write_frame};

use crate::config::ClientConfig;

type Outbound = mpsc::Sender<Vec<u8>>;

/// Headless client: mirrors the server's screens in a [`ClientState`] and
/// logs what it would render.
pub struct UiClient {
    config: ClientConfig,
    state: ClientState<Outbound>,
    reader: OwnedReadHalf,
    writer_task: JoinHandle<()>,
    interacted: HashSet<Key>,
}

impl UiClient {
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        log::info!("Connecting to {} as {}", config.server_addr, config.name);
        let stream = TcpStream::connect(&config.server_addr).await?;
        stream.set_nodelay(true)?;

        let (reader, writer) = stream.into_split();
        let (tx, rx) = mpsc::channel(config.outbound_queue);
        let writer_task = tokio::spawn(write_loop(writer, rx));

        Ok(Self {
            config,
            state: ClientState::new(tx),
            reader,
            writer_task,
            interacted: HashSet::new(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // The socket is up, so the server's reply has somewhere to go.
        self.state.hello()?;

        loop {
            tokio::select! {
                frame = read_frame(&mut self.reader) => match frame? {
                    Some(frame) => {
                        self.state.receive(&frame);
                        self.process_events()?;
                    }
                    None => {
                        log::info!("Server closed the connection");
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        self.writer_task.abort();
        Ok(())
    }

    fn process_events(&mut self) -> Result<()> {
        let events: Vec<ClientEvent> = self.state.drain_events().collect();
        for event in events {
            match event {
                ClientEvent::Handshake {
                    protocol,
                    compatible,
                } => {
                    if compatible {
                        log::info!("Handshake complete (protocol {})", protocol);
                    } else {
                        log::warn!("Server protocol {} not supported, UI disabled", protocol);
                    }
                }
                ClientEvent::ScreenOpened { screen } => self.on_screen_opened(&screen)?,
                ClientEvent::ScreenClosed { screen } => {
                    log::info!("Server closed {}", screen);
                }
                ClientEvent::ElementChanged { screen, element } => {
                    if let Some(found) = self
                        .state
                        .screen(screen.as_str())
                        .and_then(|s| s.get_element(element.as_str()))
                    {
                        log::info!("{} now {}", screen, describe(found));
                    }
                }
                ClientEvent::TexturesLoaded { count } => {
                    log::info!("Received {} texture(s)", count);
                }
            }
        }
        Ok(())
    }

    fn on_screen_opened(&mut self, key: &Key) -> Result<()> {
        let Some(screen) = self.state.screen(key.as_str()) else {
            return Ok(());
        };
        let kind = if screen.is_hud() { "HUD" } else { "screen" };
        log::info!("Opened {} {} with {} element(s)", kind, key, screen.len());
        for element in screen.elements() {
            log::info!("  {}", describe(element));
        }

        let is_modal = self.state.modal().is_some_and(|modal| modal.key() == key);
        if self.config.interact && is_modal && self.interacted.insert(key.clone()) {
            self.interact()?;
        }
        Ok(())
    }

    /// Pokes every interactive element of the open modal once, predicting the
    /// result locally, then dismisses it.
    fn interact(&mut self) -> Result<()> {
        let Some(modal) = self.state.modal() else {
            return Ok(());
        };
        let elements: Vec<Element> = modal
            .elements()
            .iter()
            .filter(|element| element.element_type().is_interactive())
            .cloned()
            .collect();

        for element in elements {
            let key = element.key().as_str();
            let intent: Packet = match &element {
                Element::Button(_) => self.state.predict_click(key)?.into(),
                Element::Checkbox(checkbox) => self
                    .state
                    .predict_checkbox(key, !checkbox.is_selected())?
                    .into(),
                Element::Radio(radio) if !radio.is_selected() => {
                    self.state.predict_radio(key, true)?.into()
                }
                Element::Slider(slider) => {
                    // Deliberately out of range so the server has to correct it.
                    let (min, max) = slider.range();
                    self.state.predict_slider(key, max + (max - min))?.into()
                }
                Element::Textbox(_) => {
                    let name = self.config.name.repeat(4);
                    self.state.predict_textbox(key, name)?.into()
                }
                _ => continue,
            };
            log::info!("Sending {}", intent.kind().as_str());
            self.state.send(intent)?;
        }

        if let Some(close) = self.state.close_modal() {
            self.state.send(close)?;
        }
        Ok(())
    }
}

fn describe(element: &Element) -> String {
    let kind = element.element_type().as_str();
    let key = element.key();
    match element {
        Element::Checkbox(checkbox) => format!("{} {} = {}", kind, key, checkbox.is_selected()),
        Element::Radio(radio) => format!("{} {} = {}", kind, key, radio.is_selected()),
        Element::Slider(slider) => format!("{} {} = {}", kind, key, slider.value()),
        Element::Textbox(textbox) => {
            format!("{} {} = {:?}", kind, key, textbox.value().unwrap_or_default())
        }
        Element::Text(text) => format!("{} {} {:?}", kind, key, text.text().unwrap_or_default()),
        _ => format!("{} {}", kind, key),
    }
}

async fn write_loop(mut writer: OwnedWriteHalf, mut outbound: mpsc::Receiver<Vec<u8>>) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = write_frame(&mut writer, &frame).await {
            log::warn!("Write to server failed: {}", e);
            break;
        }
    }
}
