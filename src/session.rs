//! Joined conference state and the events the backend delivers for it.

use log::{debug, info};

use crate::model::{MediaTrack, Participant};

/// Inbound notifications from a joined conference, delivered in order on
/// one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TrackAdded(MediaTrack),
    TrackRemoved(MediaTrack),
    UserJoined(Participant),
    UserLeft { id: String },
}

/// Snapshot of a joined conference: who we are and who else is in the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    local_user_id: String,
    local_name: String,
    roster: Vec<Participant>,
}

impl Session {
    pub fn new(
        local_user_id: impl Into<String>,
        local_name: impl Into<String>,
        roster: Vec<Participant>,
    ) -> Self {
        let mut session = Session {
            local_user_id: local_user_id.into(),
            local_name: local_name.into(),
            roster: Vec::with_capacity(roster.len()),
        };
        for participant in roster {
            session.user_joined(participant);
        }
        session
    }

    pub fn local_user_id(&self) -> &str {
        &self.local_user_id
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Remote participants in join order.
    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn find_participant(&self, participant_id: &str) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id == participant_id)
    }

    /// Adds a participant, or refreshes the display name of one already known.
    pub fn user_joined(&mut self, participant: Participant) {
        match self.roster.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => {
                debug!(
                    "Participant {} joined again as {}",
                    participant.id, participant.display_name
                );
                existing.display_name = participant.display_name;
            }
            None => {
                info!(
                    "Participant joined: {} ({})",
                    participant.id, participant.display_name
                );
                self.roster.push(participant);
            }
        }
    }

    /// Drops a participant from the roster. Unknown ids are ignored.
    pub fn user_left(&mut self, participant_id: &str) -> bool {
        let before = self.roster.len();
        self.roster.retain(|p| p.id != participant_id);

        let removed = self.roster.len() != before;
        if removed {
            info!("Participant left: {}", participant_id);
        }
        removed
    }
}
