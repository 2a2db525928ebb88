//! Conference seating client.
//!
//! Joins a room through a conferencing backend and keeps a render-ready view
//! of who is in the room: live tracks, their owners and a stable seat order.
//!
//! - [`lifecycle::App`]: pure state machine, `init -> loading -> started`
//! - [`runtime::Runtime`]: single task feeding the app from one event channel
//! - [`backend`]: what the conferencing library has to provide
//! - [`bootstrap`]: load, connect, capture, join, publish

pub mod backend;
pub mod bootstrap;
pub mod capture;
pub mod config;
pub mod directory;
pub mod error;
pub mod lifecycle;
#[cfg(feature = "livekit-backend")]
pub mod livekit_backend;
pub mod logging;
pub mod model;
pub mod render;
pub mod repl;
pub mod resolver;
pub mod runtime;
pub mod seating;
pub mod session;
pub mod track_registry;
