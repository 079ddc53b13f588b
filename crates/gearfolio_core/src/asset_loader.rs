//! Background asset loading
//!
//! [`AssetLoader`] owns a worker thread that loads assets from disk and
//! sends the results back over a channel. The frame loop submits requests
//! with [`load_async`](AssetLoader::load_async) and collects results with
//! [`poll`](AssetLoader::poll) without ever blocking.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;

use crate::asset_cache::Asset;
use crate::asset_error::AssetError;

/// Identifies one load request
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct LoadTicket(u64);

struct LoadRequest {
    ticket: LoadTicket,
    path: PathBuf,
}

/// Result of a background load
pub struct LoadResult<T> {
    /// Ticket returned by [`AssetLoader::load_async`]
    pub ticket: LoadTicket,
    /// Path that was requested
    pub path: PathBuf,
    /// The loaded asset or the error
    pub result: Result<T, AssetError>,
}

/// Loads assets of type `T` on a dedicated worker thread
///
/// The worker exits when the loader is dropped. A load that panics is
/// reported as an error; if the worker is gone, every outstanding ticket
/// is answered with an error so no request stays pending forever.
pub struct AssetLoader<T: Asset> {
    sender: Sender<LoadRequest>,
    receiver: Receiver<LoadResult<T>>,
    next_ticket: u64,
    /// Tickets sent to the worker and not yet answered
    in_flight: RefCell<HashMap<LoadTicket, PathBuf>>,
    /// Answers produced on this side of the channel
    failed: RefCell<Vec<LoadResult<T>>>,
    _asset: PhantomData<fn() -> T>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn worker_gone<T>(ticket: LoadTicket, path: PathBuf) -> LoadResult<T> {
    LoadResult {
        ticket,
        path,
        result: Err(AssetError::Parse("asset loader worker has exited".to_string())),
    }
}

impl<T: Asset> AssetLoader<T> {
    /// Spawn the worker thread
    pub fn new() -> Self {
        let (request_tx, request_rx) = channel::<LoadRequest>();
        let (result_tx, result_rx) = channel::<LoadResult<T>>();

        thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                log::debug!("Loading {} in the background", request.path.display());
                let result = panic::catch_unwind(AssertUnwindSafe(|| T::load_from_file(&request.path)))
                    .unwrap_or_else(|payload| {
                        log::error!(
                            "Loader panicked on {}: {}",
                            request.path.display(),
                            panic_message(payload.as_ref())
                        );
                        Err(AssetError::Parse(format!(
                            "loader panicked: {}",
                            panic_message(payload.as_ref())
                        )))
                    });
                let done = LoadResult {
                    ticket: request.ticket,
                    path: request.path,
                    result,
                };
                if result_tx.send(done).is_err() {
                    break;
                }
            }
        });

        Self {
            sender: request_tx,
            receiver: result_rx,
            next_ticket: 1,
            in_flight: RefCell::new(HashMap::new()),
            failed: RefCell::new(Vec::new()),
            _asset: PhantomData,
        }
    }

    /// Queue `path` for loading
    pub fn load_async(&mut self, path: impl Into<PathBuf>) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        let path = path.into();
        let request = LoadRequest { ticket, path: path.clone() };
        match self.sender.send(request) {
            Ok(()) => {
                self.in_flight.borrow_mut().insert(ticket, path);
            }
            Err(_) => {
                log::warn!("Asset loader worker has exited; request {:?} failed", ticket);
                self.failed.borrow_mut().push(worker_gone(ticket, path));
            }
        }
        ticket
    }

    /// Next finished load, if any (non-blocking)
    pub fn poll(&self) -> Option<LoadResult<T>> {
        if let Some(done) = self.failed.borrow_mut().pop() {
            return Some(done);
        }
        match self.receiver.try_recv() {
            Ok(done) => {
                self.in_flight.borrow_mut().remove(&done.ticket);
                Some(done)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.fail_in_flight();
                self.failed.borrow_mut().pop()
            }
        }
    }

    /// Every load finished so far (non-blocking)
    pub fn poll_all(&self) -> Vec<LoadResult<T>> {
        std::iter::from_fn(|| self.poll()).collect()
    }

    /// Number of requests still waiting for an answer
    pub fn pending(&self) -> usize {
        self.in_flight.borrow().len()
    }

    fn fail_in_flight(&self) {
        let mut in_flight = self.in_flight.borrow_mut();
        if in_flight.is_empty() {
            return;
        }
        log::warn!("Asset loader worker has exited with {} requests outstanding", in_flight.len());
        self.failed
            .borrow_mut()
            .extend(in_flight.drain().map(|(ticket, path)| worker_gone(ticket, path)));
    }
}

impl<T: Asset> Default for AssetLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::{Duration, Instant};

    struct TextAsset(String);

    impl Asset for TextAsset {
        fn load_from_file(path: &Path) -> Result<Self, AssetError> {
            Ok(TextAsset(std::fs::read_to_string(path)?))
        }
    }

    fn wait_for<T: Asset>(loader: &AssetLoader<T>, count: usize) -> Vec<LoadResult<T>> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut results = Vec::new();
        while results.len() < count && Instant::now() < deadline {
            results.extend(loader.poll_all());
            std::thread::sleep(Duration::from_millis(5));
        }
        results
    }

    struct PanickingAsset;

    impl Asset for PanickingAsset {
        fn load_from_file(path: &Path) -> Result<Self, AssetError> {
            if path.ends_with("boom") {
                panic!("decoder bug");
            }
            Ok(PanickingAsset)
        }
    }

    #[test]
    fn test_panicking_load_reports_error() {
        let mut loader = AssetLoader::<PanickingAsset>::new();
        let ticket = loader.load_async("/tmp/boom");
        let results = wait_for(&loader, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ticket, ticket);
        match &results[0].result {
            Err(AssetError::Parse(msg)) => assert!(msg.contains("decoder bug"), "{}", msg),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("panicking load succeeded"),
        }
        assert_eq!(loader.pending(), 0);

        // The worker survives and serves later requests
        loader.load_async("/tmp/fine");
        let results = wait_for(&loader, 1);
        assert!(matches!(results[0].result, Ok(PanickingAsset)));
    }

    #[test]
    fn test_poll_empty() {
        let loader = AssetLoader::<TextAsset>::new();
        assert!(loader.poll().is_none());
        assert!(loader.poll_all().is_empty());
    }

    #[test]
    fn test_tickets_are_unique() {
        let mut loader = AssetLoader::<TextAsset>::default();
        let a = loader.load_async("/nonexistent/a.txt");
        let b = loader.load_async("/nonexistent/b.txt");
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_file_reports_error() {
        let mut loader = AssetLoader::<TextAsset>::new();
        let ticket = loader.load_async("/nonexistent/model.glb");
        let results = wait_for(&loader, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ticket, ticket);
        assert_eq!(results[0].path, PathBuf::from("/nonexistent/model.glb"));
        assert!(results[0].result.is_err());
    }

    #[test]
    fn test_loads_file() {
        let path = std::env::temp_dir().join("gearfolio_loader_test.txt");
        std::fs::write(&path, "payload").unwrap();
        let mut loader = AssetLoader::<TextAsset>::new();
        loader.load_async(&path);
        let results = wait_for(&loader, 1);
        match &results[0].result {
            Ok(TextAsset(text)) => assert_eq!(text, "payload"),
            Err(e) => panic!("load failed: {}", e),
        }
        let _ = std::fs::remove_file(&path);
    }
}
