//! 1 Hz re-evaluation of the live choghadiya card.
//!
//! The ticker is owned by whatever mounts the day-detail view: started when
//! a day with window data is applied, stopped the moment the view unmounts
//! or the window list becomes empty. Nothing else in the engine polls.

use chrono::Local;
use panchang_api::domain::TimeWindow;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::choghadiya::{evaluate, ChoghadiyaStatus};

pub struct WindowTicker {
    handle: JoinHandle<()>,
    rx: watch::Receiver<ChoghadiyaStatus>,
}

impl WindowTicker {
    /// Start ticking over the given window list. Returns `None` for an
    /// empty list: with no windows there is nothing to count down.
    pub fn start(windows: Vec<TimeWindow>) -> Option<Self> {
        if windows.is_empty() {
            return None;
        }

        let initial = evaluate(&windows, Local::now().naive_local());
        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
            interval.tick().await; // immediate first tick already sent
            loop {
                interval.tick().await;
                let status = evaluate(&windows, Local::now().naive_local());
                if tx.send(status).is_err() {
                    break;
                }
            }
        });

        Some(Self { handle, rx })
    }

    /// Latest evaluated status.
    pub fn status(&self) -> ChoghadiyaStatus {
        self.rx.borrow().clone()
    }

    /// Receiver for consumers that want to await each tick.
    pub fn subscribe(&self) -> watch::Receiver<ChoghadiyaStatus> {
        self.rx.clone()
    }

    /// Cancel the tick task. No further ticks are scheduled after this.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for WindowTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
