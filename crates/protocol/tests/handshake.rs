use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, duplex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use vellum::gui::{Button, Slider};
use vellum::{
    Authority, ClientEvent, ClientState, Element, Key, Screen, Session, SessionEvent,
    SliderChanged, Texture, read_frame, write_frame,
};

fn key(value: &str) -> Key {
    Key::parse(value).unwrap()
}

/// Writes every frame queued so far to the stream.
async fn flush<W: AsyncWrite + Unpin>(outbox: &mut UnboundedReceiver<Vec<u8>>, stream: &mut W) {
    while let Ok(frame) = outbox.try_recv() {
        write_frame(stream, &frame).await.unwrap();
    }
}

async fn next<R: AsyncRead + Unpin>(stream: &mut R) -> Vec<u8> {
    read_frame(stream).await.unwrap().expect("stream closed")
}

struct Peer<T> {
    state: T,
    outbox: UnboundedReceiver<Vec<u8>>,
    stream: DuplexStream,
}

fn server() -> (Authority, Peer<Session<UnboundedSender<Vec<u8>>>>, DuplexStream) {
    let mut authority = Authority::new();
    authority.textures_mut().add(Texture::dirt());
    authority.screens_mut().insert(
        Screen::builder(key("demo:menu"))
            .element(Button::builder(key("demo:ok")).label("Ok").build())
            .unwrap()
            .element(
                Slider::builder(key("demo:volume"))
                    .range(0.0, 1.0)
                    .value(0.5)
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .build(),
    );
    authority.actions_mut().register(|action: &mut SliderChanged| {
        let (min, max) = action.slider().range();
        action.set_value(action.value().clamp(min, max));
    });

    let (tx, outbox) = mpsc::unbounded_channel();
    let (server_stream, client_stream) = duplex(64 * 1024);
    let peer = Peer {
        state: Session::new(1, tx),
        outbox,
        stream: server_stream,
    };
    (authority, peer, client_stream)
}

#[tokio::test]
async fn handshake_open_and_reconcile_over_stream() {
    let (mut authority, mut server, client_stream) = server();
    let (tx, outbox) = mpsc::unbounded_channel();
    let mut client = Peer {
        state: ClientState::new(tx),
        outbox,
        stream: client_stream,
    };

    client.state.hello().unwrap();
    flush(&mut client.outbox, &mut client.stream).await;

    let hello = next(&mut server.stream).await;
    assert!(authority.receive(&mut server.state, &hello));
    let events: Vec<_> = authority.drain_events().collect();
    assert!(matches!(events.as_slice(), [SessionEvent::Joined { player: 1, .. }]));
    assert!(authority.open_screen(&mut server.state, "demo:menu").unwrap());
    flush(&mut server.outbox, &mut server.stream).await;

    // Hello, Textures, OpenScreen
    for _ in 0..3 {
        let frame = next(&mut client.stream).await;
        assert!(client.state.receive(&frame));
    }
    assert!(client.state.is_compatible());
    assert!(client.state.textures().get(Texture::DIRT_KEY).is_some());
    assert_eq!(
        client.state.modal().map(|screen| screen.len()),
        Some(2),
    );

    let intent = client.state.predict_slider("demo:volume", 3.0).unwrap();
    client.state.send(intent).unwrap();
    flush(&mut client.outbox, &mut client.stream).await;

    let frame = next(&mut server.stream).await;
    assert!(authority.receive(&mut server.state, &frame));
    flush(&mut server.outbox, &mut server.stream).await;

    let correction = next(&mut client.stream).await;
    client.state.drain_events().for_each(drop);
    assert!(client.state.receive(&correction));
    assert_eq!(
        client.state.drain_events().collect::<Vec<_>>(),
        [ClientEvent::ElementChanged {
            screen: key("demo:menu"),
            element: key("demo:volume"),
        }]
    );

    let modal = client.state.modal().unwrap();
    assert!(matches!(
        modal.get_element("demo:volume"),
        Some(Element::Slider(slider)) if slider.value() == 1.0
    ));
    let authoritative = authority.screens().get("demo:menu").unwrap();
    assert_eq!(authoritative.get_element("demo:volume"), modal.get_element("demo:volume"));

    let close = client.state.close_modal().unwrap();
    client.state.send(close).unwrap();
    flush(&mut client.outbox, &mut client.stream).await;
    let frame = next(&mut server.stream).await;
    authority.receive(&mut server.state, &frame);
    assert_eq!(server.state.current_screen(), None);
    assert_eq!(
        authority.drain_events().collect::<Vec<_>>(),
        [SessionEvent::ScreenClosed {
            player: 1,
            screen: key("demo:menu"),
        }]
    );
}

#[tokio::test]
async fn stream_end_is_clean() {
    let (_authority, mut server, client_stream) = server();
    drop(client_stream);
    assert_eq!(read_frame(&mut server.stream).await.unwrap(), None);
    flush(&mut server.outbox, &mut server.stream).await;
}
