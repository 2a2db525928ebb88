//! The conferencing library this client drives.
//!
//! Connection setup, media capture and transport all live behind these
//! traits. The client only needs the calls below plus an ordered stream of
//! [`SessionEvent`]s once the room is joined. Production uses the LiveKit
//! adapter, tests plug in an in-memory backend.

use std::future::Future;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::model::{LocalTrack, Participant};
use crate::session::SessionEvent;

/// Creates a backend bound to one conferencing domain.
///
/// This is called once per join attempt, before anything else touches the
/// network.
pub trait BackendLoader: Send + Sync + 'static {
    type Backend: ConferenceBackend;

    fn load(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Self::Backend, <Self::Backend as ConferenceBackend>::Error>> + Send;
}

pub trait ConferenceBackend: Send + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Live conference handle. Dropping it leaves the room.
    type Session: Send + 'static;

    /// Establish the signaling connection for `room`.
    fn connect(
        &mut self,
        room: &str,
        display_name: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Acquire local audio and video capture tracks.
    fn create_local_tracks(&mut self) -> impl Future<Output = Result<Vec<LocalTrack>, Self::Error>> + Send;

    /// Join the conference on the established connection.
    fn join(
        &mut self,
        room: &str,
        display_name: &str,
    ) -> impl Future<Output = Result<JoinedConference<Self::Session>, Self::Error>> + Send;

    /// Publish a captured track into the joined conference.
    fn publish(
        &mut self,
        session: &mut Self::Session,
        track: &LocalTrack,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Result of a successful join.
pub struct JoinedConference<S> {
    pub session: S,
    pub local_user_id: String,
    /// Remote participants already in the room.
    pub roster: Vec<Participant>,
    pub events: UnboundedReceiver<SessionEvent>,
}
