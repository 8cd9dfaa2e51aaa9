use super::state::{Command, Event, UploadState};
use crate::error::UploadError;
use crate::upload::{Selection, UploadEndpoint, UploadStatus};
use serde_json::Value;
use std::sync::mpsc::{self as std_mpsc, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

struct Resolution {
    generation: u64,
    outcome: Result<Value, UploadError>,
}

/// Drives [`UploadState`] from the UI thread and runs uploads on a tokio
/// runtime. Results come back over a channel drained by [`poll`](Self::poll).
pub struct UploadController {
    state: UploadState,
    endpoint: Arc<dyn UploadEndpoint>,
    runtime: Handle,
    sender: Sender<Resolution>,
    receiver: Receiver<Resolution>,
    in_flight: Option<AbortHandle>,
}

impl UploadController {
    pub fn new(endpoint: Arc<dyn UploadEndpoint>, runtime: Handle) -> Self {
        let (sender, receiver) = std_mpsc::channel();
        Self {
            state: UploadState::default(),
            endpoint,
            runtime,
            sender,
            receiver,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn status(&self) -> UploadStatus {
        self.state.status()
    }

    pub fn selection(&self) -> &Selection {
        self.state.selection()
    }

    /// Replaces the selection. Any upload still running for the old one is
    /// aborted; should it resolve anyway its result is discarded.
    ///
    /// A pick that yields no usable files is not a selection: the previous
    /// one stays in place and false is returned.
    pub fn choose_files(&mut self, selection: Selection) -> bool {
        if selection.is_empty() {
            tracing::debug!("ignoring pick with no readable files");
            return false;
        }
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        self.state.apply(Event::FilesChosen(selection));
        true
    }

    pub fn submit(&mut self) {
        if let Some(Command::Dispatch {
            generation,
            selection,
        }) = self.state.apply(Event::SubmitRequested)
        {
            self.dispatch(generation, selection);
        }
    }

    fn dispatch(&mut self, generation: u64, selection: Selection) {
        tracing::info!(generation, files = selection.len(), "dispatching upload");

        let endpoint = Arc::clone(&self.endpoint);
        let task = self
            .runtime
            .spawn(async move { endpoint.upload(&selection).await });
        self.in_flight = Some(task.abort_handle());

        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => return,
                Err(e) => Err(UploadError::Aborted(e.to_string())),
            };
            sender
                .send(Resolution {
                    generation,
                    outcome,
                })
                .unwrap_or_default();
        });
    }

    /// Applies every resolution received since the last call. Returns true
    /// when anything arrived.
    pub fn poll(&mut self) -> bool {
        let mut had_updates = false;
        while let Ok(resolution) = self.receiver.try_recv() {
            had_updates = true;
            if resolution.generation == self.state.generation() {
                self.in_flight = None;
            }
            self.state.apply(Event::UploadResolved {
                generation: resolution.generation,
                outcome: resolution.outcome,
            });
        }
        had_updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::FileDescriptor;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Endpoint whose answers are released by the test, one per call.
    struct GatedEndpoint {
        calls: AtomicUsize,
        gates: Mutex<Vec<oneshot::Receiver<Result<Value, UploadError>>>>,
        seen: Mutex<Vec<Vec<String>>>,
    }

    impl GatedEndpoint {
        fn new(count: usize) -> (Arc<Self>, Vec<oneshot::Sender<Result<Value, UploadError>>>) {
            let mut senders = Vec::new();
            let mut receivers = Vec::new();
            for _ in 0..count {
                let (tx, rx) = oneshot::channel();
                senders.push(tx);
                receivers.push(rx);
            }
            receivers.reverse();
            let endpoint = Arc::new(Self {
                calls: AtomicUsize::new(0),
                gates: Mutex::new(receivers),
                seen: Mutex::new(Vec::new()),
            });
            (endpoint, senders)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UploadEndpoint for GatedEndpoint {
        async fn upload(&self, selection: &Selection) -> Result<Value, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push(selection.files().iter().map(|f| f.name.clone()).collect());
            let gate = self.gates.lock().unwrap().pop().expect("unexpected upload call");
            gate.await
                .unwrap_or_else(|_| Err(UploadError::Aborted("gate dropped".into())))
        }
    }

    fn selection(names: &[&str]) -> Selection {
        Selection::new(
            names
                .iter()
                .map(|n| FileDescriptor::from_bytes(*n, "text/plain", n.as_bytes().to_vec()))
                .collect(),
        )
    }

    async fn settle(controller: &mut UploadController) {
        for _ in 0..200 {
            if controller.poll() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no resolution arrived");
    }

    async fn wait_for_calls(endpoint: &GatedEndpoint, calls: usize) {
        for _ in 0..200 {
            if endpoint.calls() >= calls {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("endpoint was not called");
    }

    #[tokio::test]
    async fn success_path_passes_through_uploading() {
        let (endpoint, mut gates) = GatedEndpoint::new(1);
        let mut controller = UploadController::new(endpoint.clone(), Handle::current());

        controller.choose_files(selection(&["a.txt"]));
        assert_eq!(controller.status(), UploadStatus::Idle);

        controller.submit();
        assert_eq!(controller.status(), UploadStatus::Uploading);
        assert!(!controller.poll());

        gates.remove(0).send(Ok(json!({"ok": true}))).unwrap();
        settle(&mut controller).await;
        assert_eq!(controller.status(), UploadStatus::Success);
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn rejected_upload_ends_in_fail() {
        let (endpoint, mut gates) = GatedEndpoint::new(1);
        let mut controller = UploadController::new(endpoint, Handle::current());

        controller.choose_files(selection(&["a.txt", "b.png"]));
        controller.submit();
        gates
            .remove(0)
            .send(Err(UploadError::Aborted("network unreachable".into())))
            .unwrap();
        settle(&mut controller).await;
        assert_eq!(controller.status(), UploadStatus::Fail);
    }

    #[tokio::test]
    async fn submit_with_nothing_selected_sends_nothing() {
        let (endpoint, _gates) = GatedEndpoint::new(0);
        let mut controller = UploadController::new(endpoint.clone(), Handle::current());

        controller.submit();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!controller.poll());
        assert_eq!(controller.status(), UploadStatus::Idle);
        assert_eq!(endpoint.calls(), 0);
    }

    #[tokio::test]
    async fn double_submit_sends_one_request() {
        let (endpoint, mut gates) = GatedEndpoint::new(1);
        let mut controller = UploadController::new(endpoint.clone(), Handle::current());

        controller.choose_files(selection(&["a.txt"]));
        controller.submit();
        controller.submit();
        wait_for_calls(&endpoint, 1).await;

        gates.remove(0).send(Ok(json!({}))).unwrap();
        settle(&mut controller).await;
        assert_eq!(endpoint.calls(), 1);
        assert_eq!(controller.status(), UploadStatus::Success);
    }

    #[tokio::test]
    async fn reselecting_before_submit_keeps_only_latest() {
        let (endpoint, mut gates) = GatedEndpoint::new(1);
        let mut controller = UploadController::new(endpoint.clone(), Handle::current());

        controller.choose_files(selection(&["a.txt"]));
        controller.choose_files(selection(&["c.md", "d.csv"]));
        assert_eq!(controller.selection(), &selection(&["c.md", "d.csv"]));
        assert_eq!(controller.status(), UploadStatus::Idle);

        controller.submit();
        gates.remove(0).send(Ok(json!({}))).unwrap();
        settle(&mut controller).await;
        assert_eq!(
            *endpoint.seen.lock().unwrap(),
            vec![vec!["c.md".to_string(), "d.csv".to_string()]]
        );
    }

    #[tokio::test]
    async fn pick_of_only_unreadable_files_keeps_previous_selection() {
        let (endpoint, mut gates) = GatedEndpoint::new(1);
        let mut controller = UploadController::new(endpoint.clone(), Handle::current());

        controller.choose_files(selection(&["a.txt"]));
        controller.submit();
        gates.remove(0).send(Err(UploadError::Aborted("down".into()))).unwrap();
        settle(&mut controller).await;
        let generation = controller.state().generation();

        let dir = tempfile::tempdir().unwrap();
        let unreadable = Selection::from_paths([dir.path().join("gone.txt"), dir.path().join("lost.png")]);
        assert!(!controller.choose_files(unreadable));

        assert_eq!(controller.selection(), &selection(&["a.txt"]));
        assert_eq!(controller.status(), UploadStatus::Fail);
        assert_eq!(controller.state().generation(), generation);
        assert!(controller.state().can_submit());
    }

    #[tokio::test]
    async fn reselecting_mid_upload_cancels_and_ignores_old_result() {
        let (endpoint, mut gates) = GatedEndpoint::new(2);
        let mut controller = UploadController::new(endpoint.clone(), Handle::current());

        controller.choose_files(selection(&["a.txt"]));
        controller.submit();
        wait_for_calls(&endpoint, 1).await;

        controller.choose_files(selection(&["b.png"]));
        assert_eq!(controller.status(), UploadStatus::Idle);

        // The aborted task never reports back, even if its gate opens later.
        let _ = gates.remove(0).send(Ok(json!({"late": true})));
        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.poll();
        assert_eq!(controller.status(), UploadStatus::Idle);

        controller.submit();
        gates.remove(0).send(Err(UploadError::Aborted("down".into()))).unwrap();
        settle(&mut controller).await;
        assert_eq!(controller.status(), UploadStatus::Fail);
    }
}
