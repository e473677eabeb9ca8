use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::services::ui_store::UiStore;

/// Cancel-and-restart timer: only the most recently scheduled action runs,
/// and only once `delay` has passed without another `schedule` call.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + self.delay;
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            action();
        });

        let previous = self
            .pending
            .lock()
            .expect("debouncer mutex poisoned")
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().expect("debouncer mutex poisoned").take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .expect("debouncer mutex poisoned")
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(pending) = pending.take() {
                pending.abort();
            }
        }
    }
}

/// Watches `search_input` and forwards it to `debounced_search` once typing
/// pauses. Dropping the handle stops the watcher and any pending timer.
#[derive(Debug)]
pub struct SearchDebouncer {
    handle: JoinHandle<()>,
}

impl SearchDebouncer {
    pub fn spawn(ui: UiStore, delay: Duration) -> Self {
        let mut rx = ui.subscribe();
        let handle = tokio::spawn(async move {
            let debouncer = Debouncer::new(delay);
            let mut last_seen = rx.borrow_and_update().search_input.clone();

            while rx.changed().await.is_ok() {
                let current = rx.borrow_and_update().search_input.clone();
                if current == last_seen {
                    continue;
                }
                last_seen = current.clone();

                let ui = ui.clone();
                debouncer.schedule(move || {
                    debug!(search = %current, "search debounce fired");
                    ui.set_debounced_search(current);
                });
            }
        });

        Self { handle }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn rapid_calls_collapse_into_last_value() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        let fired = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(String::new()));

        for value in ["a", "ar", "ari", "aria"] {
            let fired = fired.clone();
            let last = last.clone();
            debouncer.schedule(move || {
                fired.fetch_add(1, Ordering::SeqCst);
                *last.lock().unwrap() = value.to_string();
            });
            sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        sleep(Duration::from_millis(400)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(*last.lock().unwrap(), "aria");
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_action() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        debouncer.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending());
        debouncer.cancel();
        sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn search_input_reaches_debounced_state_after_quiet_period() {
        let ui = UiStore::default();
        let _debouncer = SearchDebouncer::spawn(ui.clone(), Duration::from_millis(400));
        ui.set_page(3);

        for text in ["e", "en", "eng"] {
            ui.set_search_input(text);
            sleep(Duration::from_millis(150)).await;
        }
        assert_eq!(ui.debounced_search(), "");
        assert_eq!(ui.page(), 3);

        sleep(Duration::from_millis(300)).await;
        assert_eq!(ui.debounced_search(), "eng");
        assert_eq!(ui.page(), 1);
    }
}
