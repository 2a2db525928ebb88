//! In-memory conferencing backend and a recording renderer.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use conference_seats::backend::{BackendLoader, ConferenceBackend, JoinedConference};
use conference_seats::capture::CaptureHandles;
use conference_seats::lifecycle::View;
use conference_seats::model::{LocalTrack, Participant, TrackKind};
use conference_seats::render::Renderer;
use conference_seats::session::SessionEvent;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MemoryError(pub String);

/// Shared view of the fake room so tests can play the remote side.
#[derive(Clone, Default)]
pub struct MemoryRoom {
    events: Arc<Mutex<Option<UnboundedSender<SessionEvent>>>>,
    published: Arc<Mutex<Vec<String>>>,
    left: Arc<AtomicBool>,
    capturing: Arc<AtomicBool>,
}

impl MemoryRoom {
    pub fn emit(&self, event: SessionEvent) {
        let events = self.events.lock().unwrap();
        events
            .as_ref()
            .expect("room not joined yet")
            .send(event)
            .expect("client stopped listening");
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }

    pub fn left(&self) -> bool {
        self.left.load(Ordering::SeqCst)
    }

    /// Waits for the fake camera task to be torn down.
    pub async fn capture_stopped(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.capturing.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("capture still running");
    }
}

struct CaptureGuard(Arc<AtomicBool>);

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub struct MemoryLoader {
    pub room: MemoryRoom,
    pub roster: Vec<Participant>,
    pub local_user_id: String,
    pub fail_connect: bool,
    pub fail_join: bool,
}

impl MemoryLoader {
    pub fn new(local_user_id: &str, roster: Vec<Participant>) -> Self {
        MemoryLoader {
            local_user_id: local_user_id.to_string(),
            roster,
            ..Default::default()
        }
    }
}

pub struct MemoryBackend {
    loader: MemoryLoader,
    capture: CaptureHandles,
}

pub struct MemorySession {
    left: Arc<AtomicBool>,
    _capture: CaptureHandles,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.left.store(true, Ordering::SeqCst);
    }
}

impl BackendLoader for MemoryLoader {
    type Backend = MemoryBackend;

    async fn load(&self, _domain: &str) -> Result<MemoryBackend, MemoryError> {
        Ok(MemoryBackend {
            loader: self.clone(),
            capture: CaptureHandles::new(),
        })
    }
}

impl ConferenceBackend for MemoryBackend {
    type Error = MemoryError;
    type Session = MemorySession;

    async fn connect(&mut self, _room: &str, _display_name: &str) -> Result<(), MemoryError> {
        if self.loader.fail_connect {
            return Err(MemoryError("server unreachable".to_string()));
        }
        Ok(())
    }

    async fn create_local_tracks(&mut self) -> Result<Vec<LocalTrack>, MemoryError> {
        let capturing = Arc::clone(&self.loader.room.capturing);
        capturing.store(true, Ordering::SeqCst);
        let guard = CaptureGuard(capturing);
        self.capture.push_task(tokio::spawn(async move {
            let _guard = guard;
            std::future::pending::<()>().await;
        }));

        Ok(vec![
            LocalTrack { id: "local-cam".into(), kind: TrackKind::Video },
            LocalTrack { id: "local-mic".into(), kind: TrackKind::Audio },
        ])
    }

    async fn join(
        &mut self,
        _room: &str,
        _display_name: &str,
    ) -> Result<JoinedConference<MemorySession>, MemoryError> {
        if self.loader.fail_join {
            return Err(MemoryError("room is full".to_string()));
        }

        let (tx, events) = mpsc::unbounded_channel();
        *self.loader.room.events.lock().unwrap() = Some(tx);

        Ok(JoinedConference {
            session: MemorySession {
                left: Arc::clone(&self.loader.room.left),
                _capture: std::mem::take(&mut self.capture),
            },
            local_user_id: self.loader.local_user_id.clone(),
            roster: self.loader.roster.clone(),
            events,
        })
    }

    async fn publish(&mut self, _session: &mut MemorySession, track: &LocalTrack) -> Result<(), MemoryError> {
        self.loader.room.published.lock().unwrap().push(track.id.clone());
        Ok(())
    }
}

/// Forwards every rendered view to the test.
pub struct ChannelRenderer {
    tx: UnboundedSender<View>,
}

impl ChannelRenderer {
    pub fn new() -> (Self, UnboundedReceiver<View>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelRenderer { tx }, rx)
    }
}

impl Renderer for ChannelRenderer {
    fn render(&mut self, view: &View) {
        let _ = self.tx.send(view.clone());
    }
}

pub async fn next_view(views: &mut UnboundedReceiver<View>) -> View {
    tokio::time::timeout(Duration::from_secs(5), views.recv())
        .await
        .expect("timed out waiting for a render")
        .expect("renderer dropped")
}

/// Skips renders until one satisfies `predicate`.
pub async fn wait_for_view<F>(views: &mut UnboundedReceiver<View>, predicate: F) -> View
where
    F: Fn(&View) -> bool,
{
    loop {
        let view = next_view(views).await;
        if predicate(&view) {
            return view;
        }
    }
}
