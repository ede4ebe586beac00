use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::{Arc, Mutex, Weak};

/// Pixel dimensions of a host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Bus side of one subscription: a one-slot channel holding the newest size.
struct Listener {
    id: u64,
    tx: Sender<Viewport>,
    /// Kept so a stale size can be evicted in favour of a newer one.
    stale: Receiver<Viewport>,
}

impl Listener {
    fn deliver(&self, viewport: Viewport) {
        if let Err(TrySendError::Full(viewport)) = self.tx.try_send(viewport) {
            let _ = self.stale.try_recv();
            let _ = self.tx.try_send(viewport);
        }
    }
}

type Listeners = Mutex<Vec<Listener>>;

/// Distributes host resize events to scenes that fill their container.
#[derive(Clone, Default)]
pub struct ResizeBus {
    listeners: Arc<Listeners>,
    next_id: Arc<Mutex<u64>>,
}

impl ResizeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> ResizeSubscription {
        let (tx, rx) = bounded(1);
        let id = match self.next_id.lock() {
            Ok(mut next) => {
                *next += 1;
                *next
            }
            Err(_) => 0,
        };
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Listener {
                id,
                tx,
                stale: rx.clone(),
            });
        }
        ResizeSubscription {
            id,
            rx,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver a resize to every subscriber, replacing any size it has not
    /// read yet. Returns how many received it.
    pub fn publish(&self, viewport: Viewport) -> usize {
        match self.listeners.lock() {
            Ok(listeners) => {
                for listener in listeners.iter() {
                    listener.deliver(viewport);
                }
                listeners.len()
            }
            Err(_) => 0,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// A registered resize listener. Unregisters itself when dropped.
pub struct ResizeSubscription {
    id: u64,
    rx: Receiver<Viewport>,
    listeners: Weak<Listeners>,
}

impl ResizeSubscription {
    /// Take the most recent unread size, if any.
    pub fn latest(&self) -> Option<Viewport> {
        self.rx.try_recv().ok()
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        // The bus may already be gone; nothing to release then.
        if let Some(listeners) = self.listeners.upgrade() {
            if let Ok(mut listeners) = listeners.lock() {
                listeners.retain(|l| l.id != self.id);
            }
        }
    }
}
