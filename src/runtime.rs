//! Async owner of a [`Session`].
//!
//! One task holds the session and is the only writer. Callers talk to it through a
//! [`VoyagerHandle`]; fetches run as their own tasks and layouts go through the
//! [`LayoutEngine`], both reporting back by channel. Every visible change is
//! published as a fresh [`SessionSnapshot`] on a watch channel.

use crate::introspection::INTROSPECTION_QUERY;
use crate::layout::LayoutEngine;
use crate::model::{DisplayOptions, DisplayOptionsPatch, Generation};
use crate::provider::{IntrospectionProvider, ProviderError};
use crate::session::{Effect, Session, SessionEvent, SessionSnapshot};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::debug;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("voyager runtime has stopped")]
pub struct RuntimeStopped;

type FetchOutcome = (Generation, Result<Value, ProviderError>);

pub struct Voyager {
    session: Session,
    engine: LayoutEngine,
    provider: Arc<dyn IntrospectionProvider>,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
    snapshots: watch::Sender<Arc<SessionSnapshot>>,
}

impl Voyager {
    /// Start the runtime and kick off the first fetch. Must be called inside a
    /// Tokio runtime; the task stops once every handle is dropped.
    pub fn spawn(
        provider: Arc<dyn IntrospectionProvider>,
        engine: LayoutEngine,
        options: DisplayOptions,
    ) -> VoyagerHandle {
        let session = Session::new(options);
        let (snapshots, snapshot_rx) = watch::channel(Arc::new(session.snapshot()));
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        let mut voyager = Voyager {
            session,
            engine,
            provider,
            fetch_tx,
            snapshots,
        };
        voyager.apply(SessionEvent::FetchRequested);
        tokio::spawn(voyager.run(command_rx, fetch_rx));

        VoyagerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionEvent>,
        mut fetches: mpsc::UnboundedReceiver<FetchOutcome>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(event) => self.apply(event),
                    None => break,
                },
                Some((generation, result)) = fetches.recv() => {
                    self.apply(SessionEvent::FetchResolved(generation, result));
                }
                Some(response) = self.engine.next_response() => {
                    self.apply(SessionEvent::LayoutResolved(response.generation, response.result));
                }
            }
        }
        debug!("voyager runtime stopped");
    }

    fn apply(&mut self, event: SessionEvent) {
        let before = self.session.version();
        let mut pending = vec![event];

        while let Some(event) = pending.pop() {
            for effect in self.session.handle(event) {
                match effect {
                    Effect::Fetch(generation) => self.spawn_fetch(generation),
                    Effect::Layout(generation, graph) => {
                        if let Err(err) = self.engine.submit(generation, graph) {
                            pending.push(SessionEvent::LayoutResolved(generation, Err(err)));
                        }
                    }
                }
            }
        }

        if self.session.version() != before {
            self.snapshots.send_replace(Arc::new(self.session.snapshot()));
        }
    }

    fn spawn_fetch(&self, generation: Generation) {
        let provider = Arc::clone(&self.provider);
        let fetch_tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = provider.fetch(INTROSPECTION_QUERY).await;
            let _ = fetch_tx.send((generation, result));
        });
    }
}

/// Cloneable handle to a running [`Voyager`].
#[derive(Clone)]
pub struct VoyagerHandle {
    commands: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<Arc<SessionSnapshot>>,
}

impl VoyagerHandle {
    pub fn send(&self, event: SessionEvent) -> Result<(), RuntimeStopped> {
        self.commands.send(event).map_err(|_| RuntimeStopped)
    }

    /// Fetch the introspection again. A fetch still in flight is superseded.
    pub fn refresh(&self) -> Result<(), RuntimeStopped> {
        self.send(SessionEvent::FetchRequested)
    }

    pub fn set_options(&self, patch: DisplayOptionsPatch) -> Result<(), RuntimeStopped> {
        self.send(SessionEvent::OptionsChanged(patch))
    }

    pub fn select_node(&self, id: Option<String>) -> Result<(), RuntimeStopped> {
        self.send(SessionEvent::SelectNode(id))
    }

    pub fn select_edge(&self, id: Option<String>) -> Result<(), RuntimeStopped> {
        self.send(SessionEvent::SelectEdge(id))
    }

    pub fn click(&self, id: impl Into<String>) -> Result<(), RuntimeStopped> {
        self.send(SessionEvent::Click(id.into()))
    }

    pub fn focus_node(&self, id: impl Into<String>) -> Result<(), RuntimeStopped> {
        self.send(SessionEvent::FocusNode(id.into()))
    }

    pub fn resize(&self, width: f64, height: f64) -> Result<(), RuntimeStopped> {
        self.send(SessionEvent::Resize { width, height })
    }

    pub fn pan(&self, dx: f64, dy: f64) -> Result<(), RuntimeStopped> {
        self.send(SessionEvent::Pan { dx, dy })
    }

    pub fn zoom(&self, factor: f64, x: f64, y: f64) -> Result<(), RuntimeStopped> {
        self.send(SessionEvent::Zoom { factor, x, y })
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.snapshots.clone()
    }

    /// Wait for the first snapshot matching `predicate`, the current one included.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&Arc<SessionSnapshot>) -> bool,
    ) -> Result<Arc<SessionSnapshot>, RuntimeStopped> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(predicate).await.map_err(|_| RuntimeStopped)?;
        Ok(Arc::clone(&snapshot))
    }
}
