use crate::controller::{FlowState, GenerateController, Notifier, SubmitEvent, TopicInput};
use crate::fetch::HttpFetcher;
use crate::view::{ViewContainer, ViewKind};
use crate::{ClientConfig, Error, Result, CARD_CONTAINER_ID, GENERATE_FORM_ID, TOPIC_INPUT_ID};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Submit(String, oneshot::Sender<FlowState>),
    Preload(oneshot::Sender<Result<()>>),
    Close(oneshot::Sender<()>),
}

/// An async-friendly quote session backed by a dedicated worker thread.
///
/// The worker thread owns a blocking `GenerateController` and runs one
/// submission at a time in arrival order, so flows never interleave their
/// writes to the container and the last submission is what stays rendered.
#[derive(Clone)]
pub struct QuoteSession {
    cmd_tx: Sender<Command>,
    container: ViewContainer,
}

impl QuoteSession {
    /// Create a new session (spawns a background thread that owns the controller).
    pub async fn new<N>(config: Option<ClientConfig>, notifier: N) -> Result<Self>
    where
        N: Notifier + 'static,
    {
        let config = config.unwrap_or_default();
        let container = ViewContainer::new(CARD_CONTAINER_ID);
        let worker_container = container.clone();

        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // The blocking client is built on the worker thread
            let fetcher = match HttpFetcher::new(&config) {
                Ok(f) => Arc::new(f),
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };
            let input = TopicInput::new(TOPIC_INPUT_ID);
            let mut controller = GenerateController::with_fetcher(
                &config,
                fetcher,
                worker_container,
                input.clone(),
                Box::new(notifier),
            );

            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Submit(topic, resp) => {
                        input.set_value(topic);
                        let mut event = SubmitEvent::new(GENERATE_FORM_ID);
                        let state = controller.handle_submit(&mut event);
                        let _ = resp.send(state);
                    }
                    Command::Preload(resp) => {
                        let _ = resp.send(controller.preload_components());
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
            log::debug!("quote session worker stopped");
        });

        init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx, container })
    }

    /// Run the generate flow for `topic` and return its final state
    pub async fn submit(&self, topic: &str) -> Result<FlowState> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Submit(topic.to_string(), tx))
            .map_err(|_| Error::Other("Session closed".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Submit canceled: {}", e)))
    }

    /// Fetch both components ahead of the first submission
    pub async fn preload(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Preload(tx))
            .map_err(|_| Error::Other("Session closed".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Preload canceled: {}", e)))?
    }

    /// Markup currently rendered in the container
    pub fn snapshot(&self) -> String {
        self.container.to_html()
    }

    /// Which view the container shows
    pub fn view(&self) -> ViewKind {
        self.container.kind()
    }

    /// Shutdown the background worker.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
    }
}
