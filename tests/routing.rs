//! Event router dispatch semantics: listener fan-out, command prefix
//! matching, and ordering.

use amino_fast::{AminoRestClient, EventRouter, FrameEvent, InboundFrame};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn chat_frame(content: &str, message_type: i64) -> InboundFrame {
    serde_json::from_value(serde_json::json!({
        "t": 1000,
        "o": {
            "ndcId": 9,
            "chatMessage": {
                "messageId": "m-1",
                "threadId": "t-1",
                "content": content,
                "type": message_type,
                "uid": "u-1"
            }
        }
    }))
    .unwrap()
}

fn counter_pair() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
}

#[tokio::test]
async fn matching_command_fires_once_alongside_text_event() {
    let rest = AminoRestClient::new();
    let (texts, pings) = counter_pair();

    let mut router = EventRouter::new();
    let t = Arc::clone(&texts);
    router.on_text_message(move |_ev| {
        let t = Arc::clone(&t);
        async move {
            t.fetch_add(1, Ordering::SeqCst);
        }
    });
    let p = Arc::clone(&pings);
    router.command("!ping", move |ev| {
        let p = Arc::clone(&p);
        async move {
            assert_eq!(ev.content(), "!ping extra");
            p.fetch_add(1, Ordering::SeqCst);
        }
    });

    router.dispatch_frame(&rest, chat_frame("!ping extra", 0)).await;

    assert_eq!(texts.load(Ordering::SeqCst), 1);
    assert_eq!(pings.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn trigger_must_be_prefix_of_content() {
    let rest = AminoRestClient::new();
    let (texts, pings) = counter_pair();

    let mut router = EventRouter::new();
    let t = Arc::clone(&texts);
    router.on_text_message(move |_ev| {
        let t = Arc::clone(&t);
        async move {
            t.fetch_add(1, Ordering::SeqCst);
        }
    });
    let p = Arc::clone(&pings);
    router.command("!ping", move |_ev| {
        let p = Arc::clone(&p);
        async move {
            p.fetch_add(1, Ordering::SeqCst);
        }
    });

    // Content is a prefix of the trigger, not the other way around.
    router.dispatch_frame(&rest, chat_frame("!pin", 0)).await;

    assert_eq!(texts.load(Ordering::SeqCst), 1);
    assert_eq!(pings.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn command_matching_is_case_sensitive() {
    let rest = AminoRestClient::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let mut router = EventRouter::new();
    let h = Arc::clone(&hits);
    router.command("!Ping", move |_ev| {
        let h = Arc::clone(&h);
        async move {
            h.fetch_add(1, Ordering::SeqCst);
        }
    });

    router.dispatch_frame(&rest, chat_frame("!ping now", 0)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    router.dispatch_frame(&rest, chat_frame("!Ping now", 0)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn all_matching_commands_fire_in_registration_order() {
    let rest = AminoRestClient::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut router = EventRouter::new();
    for trigger in ["!p", "!ping", "!x", "!pi"] {
        let order = Arc::clone(&order);
        router.command(trigger, move |_ev| {
            let order = Arc::clone(&order);
            async move {
                order.lock().unwrap().push(trigger);
            }
        });
    }

    router.dispatch_frame(&rest, chat_frame("!ping all", 0)).await;

    // No single-winner semantics: every matching trigger fires, in the
    // order the commands were registered.
    assert_eq!(*order.lock().unwrap(), vec!["!p", "!ping", "!pi"]);
}

#[tokio::test]
async fn non_default_message_types_skip_chat_listeners() {
    let rest = AminoRestClient::new();
    let (texts, frames) = counter_pair();

    let mut router = EventRouter::new();
    let t = Arc::clone(&texts);
    router.on_text_message(move |_ev| {
        let t = Arc::clone(&t);
        async move {
            t.fetch_add(1, Ordering::SeqCst);
        }
    });
    let f = Arc::clone(&frames);
    router.on_frame(move |_frame| {
        let f = Arc::clone(&f);
        async move {
            f.fetch_add(1, Ordering::SeqCst);
        }
    });

    // A sticker message: no text/command dispatch, catch-all still fires.
    router.dispatch_frame(&rest, chat_frame("sticker", 3)).await;

    assert_eq!(texts.load(Ordering::SeqCst), 0);
    assert_eq!(frames.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn catch_all_sees_every_category() {
    let rest = AminoRestClient::new();
    let frames = Arc::new(AtomicUsize::new(0));

    let mut router = EventRouter::new();
    let f = Arc::clone(&frames);
    router.on_frame(move |_frame| {
        let f = Arc::clone(&f);
        async move {
            f.fetch_add(1, Ordering::SeqCst);
        }
    });

    router.dispatch_frame(&rest, chat_frame("hi", 0)).await;
    let other: InboundFrame =
        serde_json::from_str(r#"{"t": 304, "o": {"notification": {}}}"#).unwrap();
    router.dispatch_frame(&rest, other).await;

    assert_eq!(frames.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn catch_all_gets_typed_chat_events() {
    let rest = AminoRestClient::new();
    let (chats, others) = counter_pair();

    let mut router = EventRouter::new();
    let c = Arc::clone(&chats);
    let o = Arc::clone(&others);
    router.on_frame(move |ev| {
        let c = Arc::clone(&c);
        let o = Arc::clone(&o);
        async move {
            match ev {
                FrameEvent::Chat(chat) => {
                    // The reply capability is bound to the frame's own
                    // community and message before the emission.
                    assert_eq!(chat.ndc_id, 9);
                    assert_eq!(chat.message.thread_id, "t-1");
                    c.fetch_add(1, Ordering::SeqCst);
                }
                FrameEvent::Other(_) => {
                    o.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    });

    router.dispatch_frame(&rest, chat_frame("hello", 0)).await;
    // Non-default message types are still typed chat events here.
    router.dispatch_frame(&rest, chat_frame("sticker", 3)).await;
    assert_eq!(chats.load(Ordering::SeqCst), 2);
    assert_eq!(others.load(Ordering::SeqCst), 0);

    let other: InboundFrame =
        serde_json::from_str(r#"{"t": 304, "o": {"notification": {}}}"#).unwrap();
    router.dispatch_frame(&rest, other).await;
    // A chat frame whose payload does not parse falls back to raw.
    router
        .dispatch_text(&rest, r#"{"t": 1000, "o": {"ndcId": 1}}"#)
        .await;
    assert_eq!(chats.load(Ordering::SeqCst), 2);
    assert_eq!(others.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn chat_message_listener_fires_for_default_type() {
    let rest = AminoRestClient::new();
    let (chats, _unused) = counter_pair();

    let mut router = EventRouter::new();
    let c = Arc::clone(&chats);
    router.on_chat_message(move |ev| {
        let c = Arc::clone(&c);
        async move {
            assert_eq!(ev.ndc_id, 9);
            c.fetch_add(1, Ordering::SeqCst);
        }
    });

    router.dispatch_frame(&rest, chat_frame("hello", 0)).await;
    assert_eq!(chats.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_text_is_skipped_quietly() {
    let rest = AminoRestClient::new();
    let frames = Arc::new(AtomicUsize::new(0));

    let mut router = EventRouter::new();
    let f = Arc::clone(&frames);
    router.on_frame(move |_frame| {
        let f = Arc::clone(&f);
        async move {
            f.fetch_add(1, Ordering::SeqCst);
        }
    });

    router.dispatch_text(&rest, "not json at all").await;
    assert_eq!(frames.load(Ordering::SeqCst), 0);

    // A chat frame with a broken payload still reaches the catch-all.
    router
        .dispatch_text(&rest, r#"{"t": 1000, "o": {"ndcId": 1}}"#)
        .await;
    assert_eq!(frames.load(Ordering::SeqCst), 1);
}
