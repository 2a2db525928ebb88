//! LiveKit implementation of the conferencing backend.
//!
//! Loading resolves the server and join-token endpoints for the domain.
//! Connecting fetches a join token over HTTP and opens the LiveKit room.
//! Local capture publishes the default microphone through cpal and a
//! generated test pattern as the camera track.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleRate;
use livekit::options::TrackPublishOptions;
use livekit::track::{LocalAudioTrack, LocalTrack as LiveKitLocalTrack, LocalVideoTrack, RemoteTrack, TrackSource};
use livekit::webrtc::audio_source::native::NativeAudioSource;
use livekit::webrtc::prelude::{AudioFrame, AudioSourceOptions, RtcAudioSource};
use livekit::webrtc::video_frame::{I420Buffer, VideoFrame, VideoRotation};
use livekit::webrtc::video_source::native::NativeVideoSource;
use livekit::webrtc::video_source::{RtcVideoSource, VideoResolution};
use livekit::{Room, RoomError, RoomEvent, RoomOptions};
use log::{debug, error, info, warn};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::backend::{BackendLoader, ConferenceBackend, JoinedConference};
use crate::capture::{CaptureHandles, StopSignal};
use crate::config::Config;
use crate::model::{LocalTrack, MediaTrack, Participant, TrackKind};
use crate::session::SessionEvent;

const SAMPLE_RATE: u32 = 48000;
const NUM_CHANNELS: u32 = 2;

const VIDEO_WIDTH: u32 = 640;
const VIDEO_HEIGHT: u32 = 480;
const VIDEO_FRAME_INTERVAL: Duration = Duration::from_millis(66);

const CAMERA_TRACK_NAME: &str = "camera";
const MICROPHONE_TRACK_NAME: &str = "microphone";

#[derive(Debug, Error)]
pub enum LiveKitError {
    #[error("invalid token endpoint {0}")]
    InvalidTokenEndpoint(String),

    #[error("join token request failed")]
    TokenRequest(#[from] reqwest::Error),

    #[error("join token endpoint answered {0}")]
    TokenStatus(StatusCode),

    #[error("room error")]
    Room(#[from] RoomError),

    #[error("not connected to a room")]
    NotConnected,

    #[error("microphone capture failed: {0}")]
    Microphone(String),

    #[error("no captured local track with id {0}")]
    UnknownLocalTrack(String),
}

pub struct LiveKitLoader {
    config: Config,
    http_client: Client,
}

impl LiveKitLoader {
    pub fn new(config: Config) -> Self {
        LiveKitLoader {
            config,
            http_client: Client::new(),
        }
    }
}

impl BackendLoader for LiveKitLoader {
    type Backend = LiveKitBackend;

    async fn load(&self, domain: &str) -> Result<LiveKitBackend, LiveKitError> {
        let token_endpoint = self.config.livekit_token_url(domain);
        reqwest::Url::parse(&token_endpoint)
            .map_err(|err| LiveKitError::InvalidTokenEndpoint(format!("{token_endpoint}: {err}")))?;

        let server_url = self.config.livekit_url(domain);
        info!("Using LiveKit server {} with token endpoint {}", server_url, token_endpoint);

        Ok(LiveKitBackend {
            http_client: self.http_client.clone(),
            server_url,
            token_endpoint,
            disable_local_audio_capture: self.config.disable_local_audio_capture,
            room: None,
            room_events: None,
            local_tracks: HashMap::new(),
            capture: CaptureHandles::new(),
        })
    }
}

pub struct LiveKitBackend {
    http_client: Client,
    server_url: String,
    token_endpoint: String,
    disable_local_audio_capture: bool,
    room: Option<Room>,
    room_events: Option<UnboundedReceiver<RoomEvent>>,
    // Captured but not yet published, keyed by our track id.
    local_tracks: HashMap<String, LiveKitLocalTrack>,
    // Moves into the session on join; dropped with the backend otherwise.
    capture: CaptureHandles,
}

/// Joined LiveKit room. Dropping it stops capture and closes the room.
pub struct LiveKitSession {
    room: Arc<Room>,
    // Capture plus the room event loop.
    tasks: CaptureHandles,
}

impl Drop for LiveKitSession {
    fn drop(&mut self) {
        let room = Arc::clone(&self.room);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(err) = room.close().await {
                    warn!("Failed to close LiveKit room: {}", err);
                }
            });
        }
    }
}

impl LiveKitBackend {
    async fn fetch_token(&self, room_name: &str, user_name: &str) -> Result<String, LiveKitError> {
        let url = reqwest::Url::parse_with_params(
            &self.token_endpoint,
            &[("room", room_name), ("identity", user_name), ("name", user_name)],
        )
        .map_err(|err| LiveKitError::InvalidTokenEndpoint(format!("{}: {err}", self.token_endpoint)))?;

        info!("Fetching join token from {}", url);

        let resp = self.http_client.get(url).send().await?;
        if !matches!(resp.status(), StatusCode::OK) {
            error!(
                "Failed to get livekit token for room {}. HTTP Error: {}",
                room_name,
                resp.status()
            );
            return Err(LiveKitError::TokenStatus(resp.status()));
        }

        Ok(resp.text().await?)
    }
}

impl ConferenceBackend for LiveKitBackend {
    type Error = LiveKitError;
    type Session = LiveKitSession;

    async fn connect(&mut self, room_name: &str, display_name: &str) -> Result<(), LiveKitError> {
        let token = self.fetch_token(room_name, display_name).await?;

        let (room, room_events) = Room::connect(&self.server_url, &token, RoomOptions::default()).await?;
        info!("Connected to LiveKit room {}", room_name);

        self.room = Some(room);
        self.room_events = Some(room_events);
        Ok(())
    }

    async fn create_local_tracks(&mut self) -> Result<Vec<LocalTrack>, LiveKitError> {
        let mut captured = Vec::new();

        let video_source = NativeVideoSource::new(VideoResolution {
            width: VIDEO_WIDTH,
            height: VIDEO_HEIGHT,
        });
        let video_track =
            LocalVideoTrack::create_video_track(CAMERA_TRACK_NAME, RtcVideoSource::Native(video_source.clone()));
        self.capture.push_task(spawn_test_pattern(video_source));
        captured.push(self.keep_local_track(TrackKind::Video, LiveKitLocalTrack::Video(video_track)));

        if self.disable_local_audio_capture {
            info!("Local audio capture DISABLED, not starting audio capture");
        } else {
            let audio_source = NativeAudioSource::new(
                AudioSourceOptions {
                    echo_cancellation: true,
                    noise_suppression: true,
                    auto_gain_control: true,
                },
                SAMPLE_RATE,
                NUM_CHANNELS,
                None,
            );
            let audio_track = LocalAudioTrack::create_audio_track(
                MICROPHONE_TRACK_NAME,
                RtcAudioSource::Native(audio_source.clone()),
            );
            let stop = self.capture.stop_signal();
            self.capture.push_task(start_capturing_audio_input(audio_source, stop)?);
            captured.push(self.keep_local_track(TrackKind::Audio, LiveKitLocalTrack::Audio(audio_track)));
        }

        Ok(captured)
    }

    async fn join(
        &mut self,
        _room_name: &str,
        _display_name: &str,
    ) -> Result<JoinedConference<LiveKitSession>, LiveKitError> {
        // LiveKit joins as part of connecting, only the handles move here.
        let room = self.room.take().ok_or(LiveKitError::NotConnected)?;
        let room_events = self.room_events.take().ok_or(LiveKitError::NotConnected)?;
        let room = Arc::new(room);

        let local_user_id = room.local_participant().identity().as_str().to_string();
        let roster = room
            .remote_participants()
            .values()
            .map(|participant| Participant::new(participant.identity().as_str(), participant.name()))
            .collect();

        let (events_tx, events) = mpsc::unbounded_channel();
        let mut tasks = std::mem::take(&mut self.capture);
        tasks.push_task(tokio::spawn(handle_room_events(room_events, events_tx)));

        Ok(JoinedConference {
            session: LiveKitSession { room, tasks },
            local_user_id,
            roster,
            events,
        })
    }

    async fn publish(&mut self, session: &mut LiveKitSession, track: &LocalTrack) -> Result<(), LiveKitError> {
        let local_track = self
            .local_tracks
            .remove(&track.id)
            .ok_or_else(|| LiveKitError::UnknownLocalTrack(track.id.clone()))?;

        let mut track_publish_options = TrackPublishOptions::default();
        track_publish_options.source = match track.kind {
            TrackKind::Video => TrackSource::Camera,
            TrackKind::Audio => TrackSource::Microphone,
        };

        session
            .room
            .local_participant()
            .publish_track(local_track, track_publish_options)
            .await?;
        Ok(())
    }
}

impl LiveKitBackend {
    fn keep_local_track(&mut self, kind: TrackKind, track: LiveKitLocalTrack) -> LocalTrack {
        let name = match kind {
            TrackKind::Video => CAMERA_TRACK_NAME,
            TrackKind::Audio => MICROPHONE_TRACK_NAME,
        };
        let id = format!("local-{name}");
        self.local_tracks.insert(id.clone(), track);
        LocalTrack { id, kind }
    }
}

async fn handle_room_events(
    mut room_events: UnboundedReceiver<RoomEvent>,
    events_tx: UnboundedSender<SessionEvent>,
) {
    while let Some(event) = room_events.recv().await {
        let session_event = match event {
            RoomEvent::ParticipantConnected(participant) => SessionEvent::UserJoined(Participant::new(
                participant.identity().as_str(),
                participant.name(),
            )),

            RoomEvent::ParticipantDisconnected(participant) => SessionEvent::UserLeft {
                id: participant.identity().as_str().to_string(),
            },

            RoomEvent::TrackSubscribed {
                track,
                publication: _,
                participant,
            } => SessionEvent::TrackAdded(remote_media_track(&track, participant.identity().as_str())),

            RoomEvent::TrackUnsubscribed {
                track,
                publication: _,
                participant,
            } => SessionEvent::TrackRemoved(remote_media_track(&track, participant.identity().as_str())),

            other => {
                debug!("Unhandled room event: {:?}", other);
                continue;
            }
        };

        if events_tx.send(session_event).is_err() {
            break;
        }
    }

    info!("LiveKit room event stream ended");
}

fn remote_media_track(track: &RemoteTrack, participant_id: &str) -> MediaTrack {
    let kind = match track {
        RemoteTrack::Audio(_) => TrackKind::Audio,
        RemoteTrack::Video(_) => TrackKind::Video,
    };
    MediaTrack::new(track.sid().as_str(), kind, participant_id)
}

// Stand-in camera: a flat frame whose brightness slowly cycles.
fn spawn_test_pattern(source: NativeVideoSource) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(VIDEO_FRAME_INTERVAL);
        let mut frame = VideoFrame {
            rotation: VideoRotation::VideoRotation0,
            timestamp_us: 0,
            buffer: I420Buffer::new(VIDEO_WIDTH, VIDEO_HEIGHT),
        };
        let mut luma: u8 = 16;

        loop {
            interval.tick().await;

            luma = luma.wrapping_add(1).max(16);
            let (y, u, v) = frame.buffer.data_mut();
            y.fill(luma);
            u.fill(128);
            v.fill(128);

            source.capture_frame(&frame);
        }
    })
}

fn start_capturing_audio_input(source: NativeAudioSource, stop: StopSignal) -> Result<JoinHandle<()>, LiveKitError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| LiveKitError::Microphone("no default input device".to_string()))?;
    let mut config: cpal::StreamConfig = device
        .default_input_config()
        .map_err(|err| LiveKitError::Microphone(err.to_string()))?
        .into();

    config.channels = NUM_CHANNELS as u16;
    config.sample_rate = SampleRate(SAMPLE_RATE);

    let (tx, mut rx) = mpsc::channel::<AudioFrame>(10);

    // cpal streams are not Send, so the stream lives on its own thread.
    std::thread::spawn(move || {
        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _| {
                // Normalized [-1.0, 1.0] floats to i16 PCM.
                let pcm_samples: Vec<i16> = data
                    .iter()
                    .map(|&sample| (sample * i16::MAX as f32) as i16)
                    .collect();

                let frame_size = pcm_samples.len();
                let audio_frame = AudioFrame {
                    data: pcm_samples.into(),
                    num_channels: NUM_CHANNELS,
                    sample_rate: SAMPLE_RATE,
                    samples_per_channel: (frame_size / NUM_CHANNELS as usize) as u32,
                };

                if let Err(err) = tx.try_send(audio_frame) {
                    debug!("Dropping microphone frame: {}", err);
                }
            },
            move |err| {
                error!("Microphone stream error: {}", err);
            },
            None,
        );

        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                error!("Failed to build microphone stream: {}", err);
                return;
            }
        };

        if let Err(err) = stream.play() {
            error!("Failed to start microphone stream: {}", err);
            return;
        }

        stop.wait();
        drop(stream);
        info!("Microphone capture stopped");
    });

    Ok(tokio::spawn(async move {
        while let Some(audio_frame) = rx.recv().await {
            if let Err(err) = source.capture_frame(&audio_frame).await {
                warn!("Failed to capture microphone frame: {}", err);
            }
        }
    }))
}
