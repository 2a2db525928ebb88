//! End-to-end runs of the client runtime against an in-memory backend.

mod support;

use std::time::Duration;

use conference_seats::config::{JoinParams, StartupParams};
use conference_seats::lifecycle::{AppEvent, LifecyclePhase, View};
use conference_seats::model::{MediaTrack, Participant};
use conference_seats::runtime::Runtime;
use conference_seats::session::SessionEvent;
use support::{next_view, wait_for_view, ChannelRenderer, MemoryLoader};

fn startup(auto_join: bool) -> StartupParams {
    StartupParams {
        join: JoinParams {
            domain: "meet.example.org".into(),
            room: "standup".into(),
            name: "Alice".into(),
        },
        auto_join,
    }
}

fn seat_names(view: &View) -> Vec<String> {
    match view {
        View::Seats(layout) => layout.seats.iter().map(|seat| seat.user.name.clone()).collect(),
        _ => vec![],
    }
}

#[tokio::test]
async fn auto_join_reaches_seats_and_tracks_remote_events() {
    let loader = MemoryLoader::new("p1", vec![Participant::new("p2", "Bob")]);
    let room = loader.room.clone();
    let (renderer, mut views) = ChannelRenderer::new();

    let runtime = Runtime::new(loader, renderer, startup(true), Some(Duration::from_secs(5)));
    let handle = runtime.handle();
    let client = tokio::spawn(runtime.run());

    assert!(matches!(next_view(&mut views).await, View::Loading { .. }));
    let view = next_view(&mut views).await;
    assert_eq!(seat_names(&view), vec!["Alice"]);
    assert_eq!(room.published(), vec!["local-cam", "local-mic"]);

    room.emit(SessionEvent::TrackAdded(MediaTrack::video("bob-cam", "p2")));
    room.emit(SessionEvent::TrackAdded(MediaTrack::audio("bob-mic", "p2")));
    room.emit(SessionEvent::TrackAdded(MediaTrack::video("carol-cam", "p3")));
    room.emit(SessionEvent::UserJoined(Participant::new("p3", "Carol")));

    let view = wait_for_view(&mut views, |view| seat_names(view).contains(&"Carol".to_string())).await;
    assert_eq!(seat_names(&view), vec!["Carol", "Bob", "Alice"]);
    let View::Seats(layout) = &view else {
        panic!("expected seats");
    };
    assert_eq!(layout.audio.len(), 1);
    assert!(layout.seats.iter().enumerate().all(|(i, seat)| seat.index == i && seat.total_count == 3));

    room.emit(SessionEvent::TrackRemoved(MediaTrack::video("bob-cam", "p2")));
    let view = wait_for_view(&mut views, |view| seat_names(view).len() == 2).await;
    assert_eq!(seat_names(&view), vec!["Carol", "Alice"]);

    assert!(handle.send(AppEvent::Quit));
    let app = client.await.unwrap();

    assert_eq!(app.phase(), LifecyclePhase::Started);
    assert_eq!(app.tracks().video_tracks().len(), 2);
    assert!(room.left());
    room.capture_stopped().await;
}

#[tokio::test]
async fn without_auto_join_the_form_waits_for_the_user() {
    let loader = MemoryLoader::new("p1", vec![]);
    let (renderer, mut views) = ChannelRenderer::new();

    let runtime = Runtime::new(loader, renderer, startup(false), None);
    let handle = runtime.handle();
    let client = tokio::spawn(runtime.run());

    assert!(matches!(next_view(&mut views).await, View::ConnectForm { .. }));

    // Renders arrive in event order, so a second form render means nothing
    // connected in between.
    assert!(handle.send(AppEvent::SetName("Dana".into())));
    match next_view(&mut views).await {
        View::ConnectForm { params, last_error } => {
            assert_eq!(params.name, "Dana");
            assert_eq!(last_error, None);
        }
        other => panic!("expected the connect form, got {other:?}"),
    }

    assert!(handle.send(AppEvent::Status));
    assert!(matches!(next_view(&mut views).await, View::ConnectForm { .. }));

    assert!(handle.send(AppEvent::Connect));
    assert!(matches!(next_view(&mut views).await, View::Loading { .. }));
    let view = next_view(&mut views).await;
    assert_eq!(seat_names(&view), vec!["Dana"]);

    assert!(handle.send(AppEvent::Quit));
    client.await.unwrap();
}

#[tokio::test]
async fn failed_connection_returns_to_the_form() {
    let loader = MemoryLoader {
        fail_connect: true,
        ..MemoryLoader::new("p1", vec![])
    };
    let room = loader.room.clone();
    let (renderer, mut views) = ChannelRenderer::new();

    let runtime = Runtime::new(loader, renderer, startup(true), None);
    let handle = runtime.handle();
    let client = tokio::spawn(runtime.run());

    assert!(matches!(next_view(&mut views).await, View::Loading { .. }));
    match next_view(&mut views).await {
        View::ConnectForm { last_error: Some(message), .. } => {
            assert!(message.contains("connection to meet.example.org failed"), "{message}");
            assert!(message.contains("server unreachable"), "{message}");
        }
        other => panic!("expected the connect form with an error, got {other:?}"),
    }
    assert!(room.published().is_empty());

    assert!(handle.send(AppEvent::Quit));
    let app = client.await.unwrap();
    assert_eq!(app.phase(), LifecyclePhase::Init);
    assert!(app.session().is_none());
}

#[tokio::test]
async fn failed_join_stops_local_capture() {
    let loader = MemoryLoader {
        fail_join: true,
        ..MemoryLoader::new("p1", vec![])
    };
    let room = loader.room.clone();
    let (renderer, mut views) = ChannelRenderer::new();

    let runtime = Runtime::new(loader, renderer, startup(true), None);
    let handle = runtime.handle();
    let client = tokio::spawn(runtime.run());

    assert!(matches!(next_view(&mut views).await, View::Loading { .. }));
    match next_view(&mut views).await {
        View::ConnectForm { last_error: Some(message), .. } => {
            assert!(message.contains("room is full"), "{message}");
        }
        other => panic!("expected the connect form with an error, got {other:?}"),
    }
    room.capture_stopped().await;

    assert!(handle.send(AppEvent::Quit));
    client.await.unwrap();
}
