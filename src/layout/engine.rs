use super::backend::LayoutBackend;
use super::dot::to_dot;
use super::svg::parse_svg;
use super::{LayoutError, LayoutSettings, RenderResult};
use crate::graph::TypeGraph;
use crate::model::Generation;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub generation: Generation,
    pub graph: Arc<TypeGraph>,
}

#[derive(Debug)]
pub struct LayoutResponse {
    pub generation: Generation,
    pub result: Result<RenderResult, LayoutError>,
}

/// Handle to the layout worker.
///
/// Requests are tagged with a [`Generation`]; submitting a newer one cancels the
/// request in flight, and any response that still slips through is dropped on
/// arrival. Cancelling drops the backend future, which kills a Graphviz child.
pub struct LayoutEngine {
    requests: mpsc::UnboundedSender<LayoutRequest>,
    responses: mpsc::UnboundedReceiver<LayoutResponse>,
    latest: Generation,
}

impl LayoutEngine {
    /// Start the worker task. Must be called inside a Tokio runtime.
    pub fn spawn(backend: Arc<dyn LayoutBackend>, settings: LayoutSettings) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<LayoutRequest>();
        let (response_tx, response_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut in_flight: Option<(Generation, AbortHandle)> = None;
            while let Some(request) = request_rx.recv().await {
                if let Some((previous, task)) = in_flight.take()
                    && !task.is_finished()
                {
                    debug!(
                        generation = %previous,
                        latest = %request.generation,
                        "cancelling superseded layout"
                    );
                    task.abort();
                }

                let backend = Arc::clone(&backend);
                let response_tx = response_tx.clone();
                let timeout = settings.timeout;
                let generation = request.generation;
                let task = tokio::spawn(async move {
                    let result = run_layout(backend.as_ref(), request, timeout).await;
                    // A closed channel means the engine is gone and nobody is waiting.
                    let _ = response_tx.send(LayoutResponse { generation, result });
                });
                in_flight = Some((generation, task.abort_handle()));
            }
            if let Some((_, task)) = in_flight {
                task.abort();
            }
        });

        Self {
            requests: request_tx,
            responses: response_rx,
            latest: Generation::default(),
        }
    }

    /// Most recently submitted generation.
    pub fn latest(&self) -> Generation {
        self.latest
    }

    pub fn is_latest(&self, generation: Generation) -> bool {
        generation == self.latest
    }

    /// Queue a layout. Generations at or below the latest one are ignored, since
    /// their result could never be applied.
    pub fn submit(
        &mut self,
        generation: Generation,
        graph: Arc<TypeGraph>,
    ) -> Result<(), LayoutError> {
        if generation <= self.latest {
            debug!(%generation, latest = %self.latest, "ignoring superseded layout request");
            return Ok(());
        }
        self.latest = generation;
        self.requests
            .send(LayoutRequest { generation, graph })
            .map_err(|_| LayoutError::WorkerStopped)
    }

    /// Next response for the latest generation. Superseded responses are dropped.
    ///
    /// Cancel safe: dropping the future loses no current response.
    pub async fn next_response(&mut self) -> Option<LayoutResponse> {
        loop {
            let response = self.responses.recv().await?;
            if response.generation == self.latest {
                return Some(response);
            }
            debug!(
                generation = %response.generation,
                latest = %self.latest,
                "discarding superseded layout"
            );
        }
    }

    /// Lay out a graph and wait for it, for callers that render one graph at a time.
    pub async fn render(&mut self, graph: Arc<TypeGraph>) -> Result<RenderResult, LayoutError> {
        let generation = self.latest.next();
        self.submit(generation, graph)?;
        match self.next_response().await {
            Some(response) => response.result,
            None => Err(LayoutError::WorkerStopped),
        }
    }
}

async fn run_layout(
    backend: &dyn LayoutBackend,
    request: LayoutRequest,
    timeout: Duration,
) -> Result<RenderResult, LayoutError> {
    let dot = to_dot(&request.graph);
    let markup = tokio::time::timeout(timeout, backend.layout(dot))
        .await
        .map_err(|_| LayoutError::Timeout(timeout))??;
    let geometry = parse_svg(&markup)?;
    Ok(RenderResult::new(
        request.generation,
        markup,
        geometry,
        request.graph,
    ))
}
