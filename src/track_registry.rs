use log::debug;

use crate::model::{MediaTrack, TrackKind};

/// Live tracks of the joined conference, one insertion-ordered set per kind.
///
/// Adds and removes are idempotent on the track id so duplicated or
/// reordered session events leave the registry consistent.
#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    video_tracks: Vec<MediaTrack>,
    audio_tracks: Vec<MediaTrack>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when a track with the same id was already present.
    pub fn add_track(&mut self, track: MediaTrack) -> bool {
        let tracks = self.tracks_mut(track.kind);

        if tracks.iter().any(|existing| existing.id == track.id) {
            debug!("Ignoring duplicate {} track {}", track.kind, track.id);
            return false;
        }

        debug!(
            "Adding {} track {} of participant {}",
            track.kind, track.id, track.participant_id
        );
        tracks.push(track);
        true
    }

    /// Returns `false` when no track with the same id was present.
    pub fn remove_track(&mut self, track: &MediaTrack) -> bool {
        let tracks = self.tracks_mut(track.kind);
        let before = tracks.len();
        tracks.retain(|existing| existing.id != track.id);

        let removed = tracks.len() != before;
        if !removed {
            debug!("Ignoring removal of unknown {} track {}", track.kind, track.id);
        }
        removed
    }

    pub fn contains(&self, kind: TrackKind, track_id: &str) -> bool {
        self.tracks(kind).iter().any(|track| track.id == track_id)
    }

    pub fn tracks(&self, kind: TrackKind) -> &[MediaTrack] {
        match kind {
            TrackKind::Video => &self.video_tracks,
            TrackKind::Audio => &self.audio_tracks,
        }
    }

    pub fn video_tracks(&self) -> &[MediaTrack] {
        &self.video_tracks
    }

    pub fn audio_tracks(&self) -> &[MediaTrack] {
        &self.audio_tracks
    }

    fn tracks_mut(&mut self, kind: TrackKind) -> &mut Vec<MediaTrack> {
        match kind {
            TrackKind::Video => &mut self.video_tracks,
            TrackKind::Audio => &mut self.audio_tracks,
        }
    }
}
