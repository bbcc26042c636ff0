use crate::EnvironmentError;
use crate::preset::{EnvironmentMap, EnvironmentPreset};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// Where the environment map is in its one-shot load.
#[derive(Debug)]
pub enum LoadState {
    /// Still being produced; the viewer shows only the background.
    Loading,
    Ready(Arc<EnvironmentMap>),
    /// Gave up; the viewer renders without reflections.
    Failed(EnvironmentError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn map(&self) -> Option<&Arc<EnvironmentMap>> {
        match self {
            LoadState::Ready(map) => Some(map),
            _ => None,
        }
    }
}

type LoadResult = Result<EnvironmentMap, EnvironmentError>;

/// Produces an environment map off the render thread.
///
/// The render loop calls [`EnvironmentLoader::poll`] once per frame. There is
/// no cancellation: the worker finishes on its own and a dropped receiver
/// simply discards its result.
#[derive(Debug)]
pub struct EnvironmentLoader {
    preset: EnvironmentPreset,
    state: LoadState,
    receiver: Option<Receiver<LoadResult>>,
    started: Instant,
}

impl EnvironmentLoader {
    /// Start generating `preset` on a background thread.
    pub fn spawn(preset: EnvironmentPreset) -> Self {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("environment-loader".into())
            .spawn(move || {
                // The receiver may already be gone if the viewer closed.
                let _ = tx.send(EnvironmentMap::generate(preset));
            });

        match spawned {
            Ok(_) => {
                tracing::info!(%preset, "environment load started");
                Self {
                    preset,
                    state: LoadState::Loading,
                    receiver: Some(rx),
                    started: Instant::now(),
                }
            }
            Err(e) => {
                tracing::warn!(%preset, "environment loader could not start: {e}");
                Self {
                    preset,
                    state: LoadState::Failed(EnvironmentError::Spawn(e)),
                    receiver: None,
                    started: Instant::now(),
                }
            }
        }
    }

    /// A loader that is already settled with `map`.
    pub fn ready(map: EnvironmentMap) -> Self {
        Self {
            preset: map.preset,
            state: LoadState::Ready(Arc::new(map)),
            receiver: None,
            started: Instant::now(),
        }
    }

    pub fn preset(&self) -> EnvironmentPreset {
        self.preset
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Non-blocking check for the worker's result.
    pub fn poll(&mut self) -> &LoadState {
        let received = match &self.receiver {
            Some(rx) => rx.try_recv(),
            None => return &self.state,
        };
        match received {
            Ok(result) => self.settle(result),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.settle(Err(EnvironmentError::Disconnected)),
        }
        &self.state
    }

    /// Block until the load settles or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> &LoadState {
        let received = match &self.receiver {
            Some(rx) => rx.recv_timeout(timeout),
            None => return &self.state,
        };
        match received {
            Ok(result) => self.settle(result),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                self.settle(Err(EnvironmentError::Disconnected))
            }
        }
        &self.state
    }

    fn settle(&mut self, result: LoadResult) {
        self.receiver = None;
        let elapsed = self.started.elapsed();
        self.state = match result {
            Ok(map) => {
                tracing::info!(
                    preset = %self.preset,
                    ?elapsed,
                    width = map.width(),
                    height = map.height(),
                    "environment ready"
                );
                LoadState::Ready(Arc::new(map))
            }
            Err(e) => {
                tracing::warn!(
                    preset = %self.preset,
                    "environment unavailable, rendering without reflections: {e}"
                );
                LoadState::Failed(e)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_loader_becomes_ready() {
        let mut loader = EnvironmentLoader::spawn(EnvironmentPreset::City);
        let state = loader.wait(Duration::from_secs(30));
        let map = state.map().expect("environment should load");
        assert_eq!(map.preset, EnvironmentPreset::City);
        // Settled state is sticky.
        assert!(loader.poll().map().is_some());
    }

    #[test]
    fn poll_eventually_settles() {
        let mut loader = EnvironmentLoader::spawn(EnvironmentPreset::City);
        let deadline = Instant::now() + Duration::from_secs(30);
        while loader.poll().is_loading() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(loader.state(), LoadState::Ready(_)));
    }

    #[test]
    fn ready_loader_needs_no_worker() {
        let map = EnvironmentMap::generate(EnvironmentPreset::City).unwrap();
        let mut loader = EnvironmentLoader::ready(map);
        assert!(loader.poll().map().is_some());
        assert_eq!(loader.preset(), EnvironmentPreset::City);
    }

    #[test]
    fn dropped_worker_reports_failure() {
        let (tx, rx) = mpsc::channel::<LoadResult>();
        drop(tx);
        let mut loader = EnvironmentLoader {
            preset: EnvironmentPreset::City,
            state: LoadState::Loading,
            receiver: Some(rx),
            started: Instant::now(),
        };
        assert!(matches!(
            loader.poll(),
            LoadState::Failed(EnvironmentError::Disconnected)
        ));
    }
}
