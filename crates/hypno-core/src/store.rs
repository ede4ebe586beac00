use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

use crate::settings::Settings;

const UPDATE_QUEUE_CAPACITY: usize = 256;
const NOTIFY_QUEUE_CAPACITY: usize = 64;

/// Cloneable write handle given to the control surface.
///
/// Writes are queued and only reach the store when the owning scene drains
/// them at the start of a frame, so they never interleave with drawing.
pub struct SettingsHandle<U> {
    tx: Sender<U>,
}

impl<U> Clone for SettingsHandle<U> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<U> SettingsHandle<U> {
    /// Non-blocking send. Returns `true` if the update was queued.
    pub fn send(&self, update: U) -> bool {
        self.tx.try_send(update).is_ok()
    }
}

/// Current configuration of one scene plus its change notification.
pub struct SettingsStore<S: Settings> {
    current: S,
    revision: u64,
    update_tx: Sender<S::Update>,
    update_rx: Receiver<S::Update>,
    listeners: Vec<Sender<u64>>,
}

impl<S: Settings> SettingsStore<S> {
    pub fn new(mut initial: S) -> Self {
        initial.clamp();
        let (update_tx, update_rx) = bounded(UPDATE_QUEUE_CAPACITY);
        Self {
            current: initial,
            revision: 0,
            update_tx,
            update_rx,
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> &S {
        &self.current
    }

    /// Owned copy for passing into a frame.
    pub fn snapshot(&self) -> S {
        self.current.clone()
    }

    /// Incremented once for every accepted write that changed the value.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn handle(&self) -> SettingsHandle<S::Update> {
        SettingsHandle { tx: self.update_tx.clone() }
    }

    /// Receive the new revision number after every change.
    pub fn subscribe(&mut self) -> Receiver<u64> {
        let (tx, rx) = bounded(NOTIFY_QUEUE_CAPACITY);
        self.listeners.push(tx);
        rx
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Apply one write directly. Returns `true` if the settings changed.
    pub fn apply(&mut self, update: S::Update) -> bool {
        let changed = self.current.apply(update);
        if changed {
            self.bump();
        }
        changed
    }

    /// Replace the whole configuration (clamped). Returns `true` if it differs.
    pub fn replace(&mut self, mut settings: S) -> bool {
        settings.clamp();
        if settings == self.current {
            return false;
        }
        self.current = settings;
        self.bump();
        true
    }

    /// Apply every queued write from the control surface, in order.
    /// Each write that changes the settings gets its own revision.
    /// Returns the number of such writes.
    pub fn drain_pending(&mut self) -> usize {
        let mut changed = 0;
        while let Ok(update) = self.update_rx.try_recv() {
            if self.apply(update) {
                changed += 1;
            }
        }
        changed
    }

    /// Whether control-surface writes are queued and not yet applied.
    pub fn has_pending(&self) -> bool {
        !self.update_rx.is_empty()
    }

    fn bump(&mut self) {
        self.revision += 1;
        let revision = self.revision;
        // Drop listeners whose receiver is gone; a full queue just misses this revision.
        self.listeners
            .retain(|tx| !matches!(tx.try_send(revision), Err(TrySendError::Disconnected(_))));
    }
}

impl<S: Settings + Default> Default for SettingsStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
