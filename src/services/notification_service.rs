use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::info;

use crate::models::notification::{Toast, ToastVariant};

const TOAST_LIMIT: usize = 5;

/// Pending toasts for the presentation layer; the oldest are dropped once
/// the queue is full.
#[derive(Clone, Debug)]
pub struct NotificationService {
    queue: Arc<Mutex<VecDeque<Toast>>>,
    pushed: Arc<watch::Sender<u64>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::with_capacity(TOAST_LIMIT))),
            pushed: Arc::new(watch::channel(0).0),
        }
    }

    /// Ticks on every pushed toast.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.pushed.subscribe()
    }

    pub fn push(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Success => info!(title = %toast.title, "{}", toast.description),
            ToastVariant::Destructive => {
                tracing::warn!(title = %toast.title, "{}", toast.description)
            }
        }

        {
            let mut queue = self.queue.lock().expect("notification queue poisoned");
            if queue.len() == TOAST_LIMIT {
                queue.pop_front();
            }
            queue.push_back(toast);
        }
        self.pushed.send_modify(|n| *n = n.wrapping_add(1));
    }

    pub fn drain(&self) -> Vec<Toast> {
        self.queue
            .lock()
            .expect("notification queue poisoned")
            .drain(..)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().expect("notification queue poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}
