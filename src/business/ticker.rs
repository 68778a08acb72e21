//! Tick Source
//!
//! The single periodic one-second tick owned by the timer. Each started
//! source is tagged with a generation number so ticks already queued when it
//! was cancelled can be recognized and dropped.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::app::AppEvent;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Ticker {
    events: UnboundedSender<AppEvent>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new(events: UnboundedSender<AppEvent>) -> Self {
        Self {
            events,
            generation: 0,
            task: None,
        }
    }

    /// Start ticking. Returns `false` if a source is already active.
    pub fn start(&mut self) -> bool {
        if self.task.is_some() {
            return false;
        }

        self.generation += 1;
        let generation = self.generation;
        let events = self.events.clone();
        // The first tick lands one full period after start.
        let first = Instant::now() + TICK_PERIOD;

        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(first, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if events.send(AppEvent::Tick(generation)).is_err() {
                    break;
                }
            }
        }));

        tracing::debug!("Tick source {} started", generation);
        true
    }

    /// Cancel the active source, if any. Takes effect immediately.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Tick source {} cancelled", self.generation);
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Whether a tick from `generation` belongs to the active source.
    pub fn accepts(&self, generation: u64) -> bool {
        self.task.is_some() && generation == self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_after_start() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(tx);
        let started = Instant::now();

        assert!(ticker.start());
        for _ in 0..3 {
            match rx.recv().await {
                Some(AppEvent::Tick(generation)) => assert!(ticker.accepts(generation)),
                other => panic!("unexpected event: {:?}", other),
            }
        }

        assert_eq!(started.elapsed(), TICK_PERIOD * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_keeps_a_single_source() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(tx);

        assert!(ticker.start());
        assert!(!ticker.start());
        assert!(ticker.is_active());
        assert!(ticker.accepts(1));
        assert!(!ticker.accepts(2));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_queued_before_cancel_are_rejected() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(tx);

        ticker.start();
        let Some(AppEvent::Tick(stale)) = rx.recv().await else {
            panic!("expected a tick");
        };
        ticker.cancel();
        assert!(!ticker.accepts(stale));

        ticker.start();
        assert!(!ticker.accepts(stale));

        time::advance(TICK_PERIOD * 5).await;
        ticker.cancel();
        while let Ok(AppEvent::Tick(generation)) = rx.try_recv() {
            assert!(!ticker.accepts(generation));
        }
    }
}
