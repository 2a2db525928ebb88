//! Join sequence: load the backend, connect, capture, join, publish.

use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::backend::{BackendLoader, ConferenceBackend};
use crate::config::JoinParams;
use crate::error::{BootstrapError, NoLocalVideo};
use crate::model::{MediaTrack, Participant, TrackKind};
use crate::session::SessionEvent;

type SessionOf<L> = <<L as BackendLoader>::Backend as ConferenceBackend>::Session;

/// A joined conference with the local tracks published.
pub struct Bootstrapped<S> {
    pub session: S,
    pub local_user_id: String,
    pub roster: Vec<Participant>,
    pub local_video: MediaTrack,
    pub events: UnboundedReceiver<SessionEvent>,
}

/// Runs the whole join sequence, giving up after `timeout` if one is set.
///
/// Any failing step fails the whole attempt. Nothing is retried.
pub async fn connect_and_join<L: BackendLoader>(
    loader: &L,
    params: &JoinParams,
    timeout: Option<Duration>,
) -> Result<Bootstrapped<SessionOf<L>>, BootstrapError> {
    let result = match timeout {
        None => join_sequence(loader, params).await,
        Some(limit) => match tokio::time::timeout(limit, join_sequence(loader, params)).await {
            Ok(result) => result,
            Err(_) => Err(BootstrapError::Timeout {
                room: params.room.clone(),
                timeout: limit,
            }),
        },
    };

    if let Err(err) = &result {
        error!("Failed to join room {} on {}: {}", params.room, params.domain, err);
    }

    result
}

async fn join_sequence<L: BackendLoader>(
    loader: &L,
    params: &JoinParams,
) -> Result<Bootstrapped<SessionOf<L>>, BootstrapError> {
    info!("Loading conferencing backend for {}", params.domain);
    let mut backend = loader
        .load(&params.domain)
        .await
        .map_err(|err| BootstrapError::Load {
            domain: params.domain.clone(),
            source: Box::new(err),
        })?;

    info!("Connecting to {} for room {}", params.domain, params.room);
    backend
        .connect(&params.room, &params.name)
        .await
        .map_err(|err| BootstrapError::Connection {
            domain: params.domain.clone(),
            source: Box::new(err),
        })?;

    let local_tracks = backend
        .create_local_tracks()
        .await
        .map_err(|err| BootstrapError::Capture(Box::new(err)))?;
    info!("Captured {} local tracks", local_tracks.len());

    let local_video = local_tracks
        .iter()
        .find(|track| track.kind == TrackKind::Video)
        .cloned()
        .ok_or_else(|| BootstrapError::Capture(Box::new(NoLocalVideo)))?;

    if !local_tracks.iter().any(|track| track.kind == TrackKind::Audio) {
        warn!("No local audio track captured, joining without a microphone");
    }

    info!("Joining room {} as {}", params.room, params.name);
    let mut joined = backend
        .join(&params.room, &params.name)
        .await
        .map_err(|err| BootstrapError::Join {
            room: params.room.clone(),
            source: Box::new(err),
        })?;
    info!(
        "Joined room {} as user {} with {} participants present",
        params.room,
        joined.local_user_id,
        joined.roster.len()
    );

    // Camera first, then everything else.
    let publish_order = std::iter::once(&local_video)
        .chain(local_tracks.iter().filter(|track| track.id != local_video.id));
    for track in publish_order {
        backend
            .publish(&mut joined.session, track)
            .await
            .map_err(|err| BootstrapError::Publish {
                kind: track.kind.to_string(),
                track_id: track.id.clone(),
                source: Box::new(err),
            })?;
        info!("Published local {} track {}", track.kind, track.id);
    }

    Ok(Bootstrapped {
        local_video: local_video.owned_by(&joined.local_user_id),
        session: joined.session,
        local_user_id: joined.local_user_id,
        roster: joined.roster,
        events: joined.events,
    })
}
