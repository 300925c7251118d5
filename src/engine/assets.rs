//! Asset preloading
//!
//! Requests are queued while the loader is collecting, then `load_all`
//! starts every fetch at once and fires the completion callback exactly
//! once, when the last request settles. Failed assets are counted, never
//! retried, and later lookups for them fail with `NotFound`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::AssetError;

/// What a request resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Sound,
}

/// A single declared resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub key: String,
    pub kind: AssetKind,
    pub source: String,
}

impl AssetRequest {
    pub fn image(path: &str) -> Self {
        Self {
            key: path.to_string(),
            kind: AssetKind::Image,
            source: path.to_string(),
        }
    }

    pub fn sound(key: &str, path: &str) -> Self {
        Self {
            key: key.to_string(),
            kind: AssetKind::Sound,
            source: path.to_string(),
        }
    }
}

/// Handle to a loaded bitmap.
///
/// The pixels stay with the platform; surfaces resolve the handle by key.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    key: Rc<str>,
    width: f64,
    height: f64,
}

impl ImageHandle {
    pub fn new(key: &str, width: f64, height: f64) -> Self {
        Self {
            key: Rc::from(key),
            width,
            height,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Handle to a loaded, playable sound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundHandle {
    key: Rc<str>,
}

impl SoundHandle {
    pub fn new(key: &str) -> Self {
        Self { key: Rc::from(key) }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// What an asset source reports for a successful fetch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Loaded {
    Image { width: f64, height: f64 },
    Sound,
}

/// Per-request completion, called once with the fetch outcome
pub type LoadCallback = Box<dyn FnOnce(Result<Loaded, String>)>;

/// Fetches assets asynchronously.
///
/// Implementations must call `done` exactly once per request, either later
/// from the event loop or synchronously from inside `load`.
pub trait AssetSource {
    fn load(&self, request: &AssetRequest, done: LoadCallback);
}

/// Loader lifecycle: collecting -> loading -> done, never re-entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderPhase {
    Collecting,
    Loading,
    Done,
}

#[derive(Debug, Clone)]
enum Resolved {
    Image(ImageHandle),
    Sound(SoundHandle),
    Failed(String),
}

struct LoaderState {
    phase: LoaderPhase,
    images: Vec<AssetRequest>,
    sounds: Vec<AssetRequest>,
    resolved: HashMap<String, Resolved>,
    success_count: usize,
    error_count: usize,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl LoaderState {
    fn pending_count(&self) -> usize {
        self.images.len() + self.sounds.len()
    }

    fn is_queued(&self, key: &str) -> bool {
        self.images.iter().chain(&self.sounds).any(|r| r.key == key)
    }
}

/// Session-wide asset cache.
///
/// Clones share the same state; the loader lives for the whole session and
/// never evicts.
#[derive(Clone)]
pub struct AssetLoader {
    inner: Rc<RefCell<LoaderState>>,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoaderState {
                phase: LoaderPhase::Collecting,
                images: Vec::new(),
                sounds: Vec::new(),
                resolved: HashMap::new(),
                success_count: 0,
                error_count: 0,
                on_complete: None,
            })),
        }
    }

    /// Queue a request. Only valid while collecting.
    pub fn enqueue(&self, request: AssetRequest) -> Result<(), AssetError> {
        let mut state = self.inner.borrow_mut();
        if state.phase != LoaderPhase::Collecting {
            log::warn!("Rejected {} - loading already started", request.key);
            return Err(AssetError::LoadAlreadyStarted(request.key));
        }
        if state.is_queued(&request.key) {
            return Err(AssetError::DuplicateKey(request.key));
        }
        match request.kind {
            AssetKind::Image => state.images.push(request),
            AssetKind::Sound => state.sounds.push(request),
        }
        Ok(())
    }

    /// Queue an image keyed by its path
    pub fn queue_image(&self, path: &str) -> Result<(), AssetError> {
        self.enqueue(AssetRequest::image(path))
    }

    /// Queue a sound under an explicit key
    pub fn queue_sound(&self, key: &str, path: &str) -> Result<(), AssetError> {
        self.enqueue(AssetRequest::sound(key, path))
    }

    /// Start fetching everything queued.
    ///
    /// `on_complete` runs exactly once after every request has settled,
    /// or immediately when both the image and the sound queue are empty.
    pub fn load_all<F>(&self, source: &dyn AssetSource, on_complete: F) -> Result<(), AssetError>
    where
        F: FnOnce() + 'static,
    {
        let requests: Vec<AssetRequest> = {
            let mut state = self.inner.borrow_mut();
            if state.phase != LoaderPhase::Collecting {
                return Err(AssetError::AlreadyLoading);
            }

            if state.images.is_empty() && state.sounds.is_empty() {
                state.phase = LoaderPhase::Done;
                drop(state);
                log::info!("No assets queued");
                on_complete();
                return Ok(());
            }

            state.phase = LoaderPhase::Loading;
            state.on_complete = Some(Box::new(on_complete));
            state.images.iter().chain(&state.sounds).cloned().collect()
        };

        log::info!("Loading {} assets", requests.len());

        for request in requests {
            let loader = self.clone();
            let key = request.key.clone();
            let kind = request.kind;
            source.load(
                &request,
                Box::new(move |result| loader.settle(&key, kind, result)),
            );
        }

        Ok(())
    }

    /// Record one request's outcome and fire completion if it was the last
    fn settle(&self, key: &str, kind: AssetKind, result: Result<Loaded, String>) {
        let on_complete = {
            let mut state = self.inner.borrow_mut();
            if state.phase != LoaderPhase::Loading {
                log::warn!("Ignoring late result for {}", key);
                return;
            }

            let resolved = match (kind, result) {
                (AssetKind::Image, Ok(Loaded::Image { width, height })) => {
                    Resolved::Image(ImageHandle::new(key, width, height))
                }
                (AssetKind::Sound, Ok(Loaded::Sound)) => Resolved::Sound(SoundHandle::new(key)),
                (_, Ok(other)) => Resolved::Failed(format!("unexpected asset {:?}", other)),
                (_, Err(reason)) => Resolved::Failed(reason),
            };

            match &resolved {
                Resolved::Failed(reason) => {
                    log::warn!("Failed to load {}: {}", key, reason);
                    state.error_count += 1;
                }
                _ => {
                    log::debug!("{} is loaded", key);
                    state.success_count += 1;
                }
            }
            state.resolved.insert(key.to_string(), resolved);

            if state.success_count + state.error_count == state.pending_count() {
                state.phase = LoaderPhase::Done;
                log::info!(
                    "Assets done ({} loaded, {} failed)",
                    state.success_count,
                    state.error_count
                );
                state.on_complete.take()
            } else {
                None
            }
        };

        // Borrow released: the callback may look assets up
        if let Some(on_complete) = on_complete {
            on_complete();
        }
    }

    /// Look up a successfully loaded image
    pub fn image(&self, key: &str) -> Result<ImageHandle, AssetError> {
        match self.lookup(key)? {
            Resolved::Image(handle) => Ok(handle),
            _ => Err(AssetError::WrongKind {
                key: key.to_string(),
                expected: AssetKind::Image,
            }),
        }
    }

    /// Look up a successfully loaded sound
    pub fn sound(&self, key: &str) -> Result<SoundHandle, AssetError> {
        match self.lookup(key)? {
            Resolved::Sound(handle) => Ok(handle),
            _ => Err(AssetError::WrongKind {
                key: key.to_string(),
                expected: AssetKind::Sound,
            }),
        }
    }

    fn lookup(&self, key: &str) -> Result<Resolved, AssetError> {
        let state = self.inner.borrow();
        match state.resolved.get(key) {
            Some(Resolved::Failed(_)) => Err(AssetError::NotFound(key.to_string())),
            Some(found) => Ok(found.clone()),
            None if state.phase == LoaderPhase::Loading && state.is_queued(key) => {
                Err(AssetError::NotReady(key.to_string()))
            }
            None => Err(AssetError::NotFound(key.to_string())),
        }
    }

    pub fn phase(&self) -> LoaderPhase {
        self.inner.borrow().phase
    }

    pub fn is_done(&self) -> bool {
        self.phase() == LoaderPhase::Done
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending_count()
    }

    pub fn success_count(&self) -> usize {
        self.inner.borrow().success_count
    }

    pub fn error_count(&self) -> usize {
        self.inner.borrow().error_count
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("AssetLoader")
            .field("phase", &state.phase)
            .field("pending", &state.pending_count())
            .field("success_count", &state.success_count)
            .field("error_count", &state.error_count)
            .finish()
    }
}
