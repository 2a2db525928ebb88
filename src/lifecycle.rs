//! Top-level client state machine.
//!
//! [`App`] is pure: it consumes [`AppEvent`]s and returns [`AppAction`]s for
//! the runtime to carry out. It owns the only mutable client state, the
//! joined session and the track registry, and projects them into a [`View`]
//! on demand.
//!
//! Phases only move forward, `Init -> Loading -> Started`, except that a
//! failed join drops back from `Loading` to `Init` so the user can try again.

use log::{debug, info, warn};

use crate::config::JoinParams;
use crate::directory::participants_map;
use crate::model::{AudioProps, MediaTrack, Participant, SeatLayout, SeatProps};
use crate::resolver::resolve_track_user;
use crate::seating::order_seats;
use crate::session::{Session, SessionEvent};
use crate::track_registry::TrackRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Showing the connect form.
    Init,
    /// Join sequence in flight.
    Loading,
    /// In the room, showing seats.
    Started,
}

/// Inputs to the [`App`] state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Connect form edits. Only accepted before connecting.
    SetDomain(String),
    SetRoom(String),
    SetName(String),

    /// User asked to connect.
    Connect,

    /// The join sequence finished.
    Joined {
        local_user_id: String,
        roster: Vec<Participant>,
        local_video: MediaTrack,
    },

    /// The join sequence failed or timed out.
    JoinFailed { message: String },

    /// Notification from the joined conference.
    Session(SessionEvent),

    /// Show the current view again, even if nothing changed.
    Status,

    Quit,
}

/// Work the runtime performs on behalf of the [`App`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Run the join sequence with these parameters.
    Bootstrap(JoinParams),
    Render,
    /// Render even if the renderer already showed this view.
    Redraw,
    Quit,
}

/// What the renderer should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    ConnectForm {
        params: JoinParams,
        last_error: Option<String>,
    },
    Loading {
        params: JoinParams,
    },
    Seats(SeatLayout),
}

#[derive(Debug, Clone)]
pub struct App {
    phase: LifecyclePhase,
    params: JoinParams,
    session: Option<Session>,
    tracks: TrackRegistry,
    last_error: Option<String>,
    auto_join_fired: bool,
}

impl App {
    pub fn new(params: JoinParams) -> Self {
        App {
            phase: LifecyclePhase::Init,
            params,
            session: None,
            tracks: TrackRegistry::new(),
            last_error: None,
            auto_join_fired: false,
        }
    }

    /// First actions after startup. With `auto_join` set this connects
    /// straight away, at most once per `App`.
    pub fn start(&mut self, auto_join: bool) -> Vec<AppAction> {
        if auto_join && !self.auto_join_fired {
            self.auto_join_fired = true;
            info!("Auto-joining room {}", self.params.room);
            return self.connect();
        }
        vec![AppAction::Render]
    }

    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::SetDomain(domain) => self.edit_form(|params| params.domain = domain),
            AppEvent::SetRoom(room) => self.edit_form(|params| params.room = room),
            AppEvent::SetName(name) => self.edit_form(|params| params.name = name),
            AppEvent::Connect => self.connect(),
            AppEvent::Joined {
                local_user_id,
                roster,
                local_video,
            } => self.joined(local_user_id, roster, local_video),
            AppEvent::JoinFailed { message } => {
                if self.phase != LifecyclePhase::Loading {
                    warn!("Ignoring join failure outside of loading: {}", message);
                    return vec![];
                }
                self.phase = LifecyclePhase::Init;
                self.last_error = Some(message);
                vec![AppAction::Render]
            }
            AppEvent::Session(event) => self.session_event(event),
            AppEvent::Status => {
                info!(
                    "Phase {:?}, room {} on {} as {}",
                    self.phase, self.params.room, self.params.domain, self.params.name
                );
                vec![AppAction::Redraw]
            }
            AppEvent::Quit => vec![AppAction::Quit],
        }
    }

    /// Move from the connect form to loading. Ignored in any other phase.
    pub fn connect(&mut self) -> Vec<AppAction> {
        if self.phase != LifecyclePhase::Init {
            debug!("Ignoring connect request in phase {:?}", self.phase);
            return vec![];
        }

        self.phase = LifecyclePhase::Loading;
        self.last_error = None;
        vec![AppAction::Bootstrap(self.params.clone()), AppAction::Render]
    }

    pub fn view(&self) -> View {
        match self.phase {
            LifecyclePhase::Init => View::ConnectForm {
                params: self.params.clone(),
                last_error: self.last_error.clone(),
            },
            LifecyclePhase::Loading => View::Loading {
                params: self.params.clone(),
            },
            LifecyclePhase::Started => View::Seats(self.seat_layout()),
        }
    }

    /// Seats and audio entries for the current registry and roster.
    pub fn seat_layout(&self) -> SeatLayout {
        let session = self.session.as_ref();
        let local_name = session.map_or(self.params.name.as_str(), Session::local_name);

        let directory = participants_map(session);
        let ordered = order_seats(self.tracks.video_tracks(), &directory);
        let total_count = ordered.len();

        let seats = ordered
            .into_iter()
            .enumerate()
            .map(|(index, track)| {
                let user = resolve_track_user(&track, session, local_name);
                SeatProps {
                    track,
                    index,
                    total_count,
                    user,
                }
            })
            .collect();

        let audio = self
            .tracks
            .audio_tracks()
            .iter()
            .enumerate()
            .map(|(index, track)| AudioProps {
                track: track.clone(),
                index,
            })
            .collect();

        SeatLayout { seats, audio }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn params(&self) -> &JoinParams {
        &self.params
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn tracks(&self) -> &TrackRegistry {
        &self.tracks
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn edit_form(&mut self, edit: impl FnOnce(&mut JoinParams)) -> Vec<AppAction> {
        if self.phase != LifecyclePhase::Init {
            debug!("Ignoring connect form edit in phase {:?}", self.phase);
            return vec![];
        }
        edit(&mut self.params);
        vec![AppAction::Render]
    }

    fn joined(
        &mut self,
        local_user_id: String,
        roster: Vec<Participant>,
        local_video: MediaTrack,
    ) -> Vec<AppAction> {
        if self.phase != LifecyclePhase::Loading {
            warn!("Ignoring join result in phase {:?}", self.phase);
            return vec![];
        }

        info!(
            "Started in room {} as {} ({})",
            self.params.room, self.params.name, local_user_id
        );
        self.session = Some(Session::new(local_user_id, self.params.name.clone(), roster));
        self.tracks.add_track(local_video);
        self.phase = LifecyclePhase::Started;
        vec![AppAction::Render]
    }

    fn session_event(&mut self, event: SessionEvent) -> Vec<AppAction> {
        let Some(session) = self.session.as_mut() else {
            warn!("Dropping session event without a session: {:?}", event);
            return vec![];
        };

        let changed = match event {
            SessionEvent::TrackAdded(track) => self.tracks.add_track(track),
            SessionEvent::TrackRemoved(track) => self.tracks.remove_track(&track),
            SessionEvent::UserJoined(participant) => {
                session.user_joined(participant);
                true
            }
            SessionEvent::UserLeft { id } => session.user_left(&id),
        };

        if changed {
            vec![AppAction::Render]
        } else {
            vec![]
        }
    }
}
