use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Video => write!(f, "video"),
        }
    }
}

/// A remote participant as reported by the session roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Participant {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A live audio or video track. The id stays the same for the whole life of
/// the track and is what the registry deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
    pub participant_id: String,
}

impl MediaTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind, participant_id: impl Into<String>) -> Self {
        MediaTrack {
            id: id.into(),
            kind,
            participant_id: participant_id.into(),
        }
    }

    pub fn video(id: impl Into<String>, participant_id: impl Into<String>) -> Self {
        MediaTrack::new(id, TrackKind::Video, participant_id)
    }

    pub fn audio(id: impl Into<String>, participant_id: impl Into<String>) -> Self {
        MediaTrack::new(id, TrackKind::Audio, participant_id)
    }
}

// Captured before the local user id is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    pub id: String,
    pub kind: TrackKind,
}

impl LocalTrack {
    pub fn owned_by(&self, participant_id: &str) -> MediaTrack {
        MediaTrack::new(self.id.clone(), self.kind, participant_id)
    }
}

/// The participant a track is shown for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackUser {
    pub id: String,
    pub name: String,
}

/// Inputs handed to the seat renderer for one video track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatProps {
    pub track: MediaTrack,
    pub index: usize,
    pub total_count: usize,
    pub user: TrackUser,
}

/// Inputs handed to the audio renderer for one audio track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioProps {
    pub track: MediaTrack,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatLayout {
    pub seats: Vec<SeatProps>,
    pub audio: Vec<AudioProps>,
}
