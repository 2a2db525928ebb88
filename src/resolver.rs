use crate::model::{MediaTrack, TrackUser};
use crate::session::Session;

/// Finds the user a track belongs to.
///
/// When the owner is neither the local user nor in the roster (a track can
/// arrive before its participant's join event) a placeholder name derived
/// from the participant id is returned instead. An empty name counts as a
/// miss.
pub fn resolve_track_user(track: &MediaTrack, session: Option<&Session>, local_name: &str) -> TrackUser {
    let participant_id = &track.participant_id;

    let known_name = session
        .and_then(|session| {
            if participant_id == session.local_user_id() {
                Some(local_name)
            } else {
                session
                    .find_participant(participant_id)
                    .map(|participant| participant.display_name.as_str())
            }
        })
        .filter(|name| !name.is_empty());

    TrackUser {
        id: participant_id.clone(),
        name: match known_name {
            Some(name) => name.to_string(),
            None => format!("user{participant_id}"),
        },
    }
}
