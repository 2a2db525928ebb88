//! Event loop that owns the [`App`].
//!
//! Every input reaches the app through one unbounded channel: commands from
//! the user, the result of the join sequence, and session events forwarded
//! from the backend. A single task drains it, so app state never needs a
//! lock and events are applied in arrival order.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use log::{error, info};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::backend::{BackendLoader, ConferenceBackend};
use crate::bootstrap::{self, Bootstrapped};
use crate::config::{JoinParams, StartupParams};
use crate::error::BootstrapError;
use crate::lifecycle::{App, AppAction, AppEvent};
use crate::render::Renderer;
use crate::session::SessionEvent;

type SessionOf<L> = <<L as BackendLoader>::Backend as ConferenceBackend>::Session;

pub enum RuntimeEvent<S> {
    App(AppEvent),
    Bootstrapped(Result<Bootstrapped<S>, BootstrapError>),
}

/// Cloneable sender for feeding user input into a running [`Runtime`].
pub struct RuntimeHandle<S> {
    tx: UnboundedSender<RuntimeEvent<S>>,
}

impl<S> Clone for RuntimeHandle<S> {
    fn clone(&self) -> Self {
        RuntimeHandle {
            tx: self.tx.clone(),
        }
    }
}

impl<S> RuntimeHandle<S> {
    /// Returns `false` once the runtime has stopped.
    pub fn send(&self, event: AppEvent) -> bool {
        self.tx.send(RuntimeEvent::App(event)).is_ok()
    }
}

pub struct Runtime<L: BackendLoader, R: Renderer> {
    app: App,
    loader: Arc<L>,
    renderer: R,
    auto_join: bool,
    join_timeout: Option<Duration>,
    events_tx: UnboundedSender<RuntimeEvent<SessionOf<L>>>,
    events_rx: UnboundedReceiver<RuntimeEvent<SessionOf<L>>>,
    // Keeps the joined conference alive.
    session: Option<SessionOf<L>>,
}

impl<L: BackendLoader, R: Renderer> Runtime<L, R> {
    pub fn new(loader: L, renderer: R, startup: StartupParams, join_timeout: Option<Duration>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Runtime {
            app: App::new(startup.join),
            loader: Arc::new(loader),
            renderer,
            auto_join: startup.auto_join,
            join_timeout,
            events_tx,
            events_rx,
            session: None,
        }
    }

    pub fn handle(&self) -> RuntimeHandle<SessionOf<L>> {
        RuntimeHandle {
            tx: self.events_tx.clone(),
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Runs until the app asks to quit, then hands back its final state.
    pub async fn run(mut self) -> App {
        let actions = self.app.start(self.auto_join);
        let mut quit = self.process_actions(actions);

        while !quit {
            let Some(event) = self.events_rx.recv().await else {
                break;
            };

            let actions = match event {
                RuntimeEvent::App(event) => self.app.handle(event),
                RuntimeEvent::Bootstrapped(result) => self.on_bootstrapped(result),
            };
            quit = self.process_actions(actions);
        }

        if self.session.take().is_some() {
            info!("Leaving room {}", self.app.params().room);
        }
        self.app
    }

    /// Returns `true` when the app asked to quit.
    fn process_actions(&mut self, actions: Vec<AppAction>) -> bool {
        for action in actions {
            match action {
                AppAction::Render => self.renderer.render(&self.app.view()),
                AppAction::Redraw => self.renderer.redraw(&self.app.view()),
                AppAction::Bootstrap(params) => self.spawn_bootstrap(params),
                AppAction::Quit => return true,
            }
        }
        false
    }

    fn spawn_bootstrap(&self, params: JoinParams) {
        let loader = Arc::clone(&self.loader);
        let tx = self.events_tx.clone();
        let timeout = self.join_timeout;

        tokio::spawn(async move {
            let result = bootstrap::connect_and_join(loader.as_ref(), &params, timeout).await;
            if tx.send(RuntimeEvent::Bootstrapped(result)).is_err() {
                error!("Runtime stopped before the join sequence finished");
            }
        });
    }

    fn on_bootstrapped(
        &mut self,
        result: Result<Bootstrapped<SessionOf<L>>, BootstrapError>,
    ) -> Vec<AppAction> {
        match result {
            Ok(Bootstrapped {
                session,
                local_user_id,
                roster,
                local_video,
                events,
            }) => {
                self.session = Some(session);
                self.forward_session_events(events);
                self.app.handle(AppEvent::Joined {
                    local_user_id,
                    roster,
                    local_video,
                })
            }
            Err(err) => self.app.handle(AppEvent::JoinFailed {
                message: error_chain(&err),
            }),
        }
    }

    fn forward_session_events(&self, events: UnboundedReceiver<SessionEvent>) {
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            let mut events = UnboundedReceiverStream::new(events);
            while let Some(event) = events.next().await {
                if tx.send(RuntimeEvent::App(AppEvent::Session(event))).is_err() {
                    return;
                }
            }
            info!("Conference event stream closed");
        });
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
