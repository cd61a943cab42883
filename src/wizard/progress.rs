// Progress - cosmetic status messages and a creeping percentage while generation runs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

pub const LOADING_MESSAGES: &[&str] = &[
    "Warming up the AI studio...",
    "Analyzing your photo...",
    "Setting up the lighting...",
    "Finding your best angles...",
    "Choosing the perfect poses...",
    "Applying the finishing touches...",
    "Almost there...",
];

/// The simulation never goes past this on its own
pub const PROGRESS_CEILING: f32 = 95.0;

#[derive(Debug, Clone)]
pub struct ProgressSettings {
    pub messages: Vec<String>,
    pub message_interval: Duration,
    pub tick_interval: Duration,
    pub ceiling: f32,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            messages: LOADING_MESSAGES.iter().map(|m| m.to_string()).collect(),
            message_interval: Duration::from_millis(2500),
            tick_interval: Duration::from_millis(500),
            ceiling: PROGRESS_CEILING,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub message: String,
    pub percent: f32,
}

/// Timer-free state of the progress display
#[derive(Debug, Clone)]
pub struct ProgressSimulation {
    messages: Vec<String>,
    message_index: usize,
    percent: f32,
    ceiling: f32,
}

impl ProgressSimulation {
    pub fn new(messages: Vec<String>, ceiling: f32) -> Self {
        Self {
            messages,
            message_index: 0,
            percent: 0.0,
            ceiling: ceiling.clamp(0.0, 100.0),
        }
    }

    pub fn message(&self) -> &str {
        self.messages
            .get(self.message_index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Move to the next message, wrapping around
    pub fn advance_message(&mut self) {
        if !self.messages.is_empty() {
            self.message_index = (self.message_index + 1) % self.messages.len();
        }
    }

    /// Add a random increment: up to 3 points while more than 20 remain, then up to 1
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> f32 {
        if self.percent >= self.ceiling {
            self.percent = self.ceiling;
            return self.percent;
        }

        let span = if 100.0 - self.percent > 20.0 { 3.0 } else { 1.0 };
        let increment: f32 = rng.gen_range(0.0..span);
        self.percent = (self.percent + increment).min(self.ceiling);
        self.percent
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            message: self.message().to_string(),
            percent: self.percent,
        }
    }
}

/// Drives a `ProgressSimulation` on two intervals; dropping it stops both
pub struct ProgressTicker {
    receiver: watch::Receiver<ProgressSnapshot>,
    task: JoinHandle<()>,
}

impl ProgressTicker {
    pub fn start(settings: ProgressSettings) -> Self {
        let mut simulation = ProgressSimulation::new(settings.messages, settings.ceiling);
        let (sender, receiver) = watch::channel(simulation.snapshot());

        let task = tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut messages = interval(settings.message_interval);
            let mut ticks = interval(settings.tick_interval);
            messages.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // Both intervals fire immediately once
            messages.tick().await;
            ticks.tick().await;

            loop {
                tokio::select! {
                    _ = messages.tick() => simulation.advance_message(),
                    _ = ticks.tick() => {
                        simulation.tick(&mut rng);
                    }
                }

                if sender.send(simulation.snapshot()).is_err() {
                    break;
                }
            }
        });

        Self { receiver, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.receiver.clone()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.receiver.borrow().clone()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn messages() -> Vec<String> {
        vec!["one".to_string(), "two".to_string(), "three".to_string()]
    }

    #[test]
    fn test_messages_cycle() {
        let mut sim = ProgressSimulation::new(messages(), PROGRESS_CEILING);
        assert_eq!(sim.message(), "one");
        sim.advance_message();
        sim.advance_message();
        assert_eq!(sim.message(), "three");
        sim.advance_message();
        assert_eq!(sim.message(), "one");
    }

    #[test]
    fn test_empty_message_list() {
        let mut sim = ProgressSimulation::new(Vec::new(), PROGRESS_CEILING);
        sim.advance_message();
        assert_eq!(sim.message(), "");
    }

    #[test]
    fn test_progress_never_passes_ceiling() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sim = ProgressSimulation::new(messages(), PROGRESS_CEILING);
        let mut last = 0.0;

        for _ in 0..10_000 {
            let percent = sim.tick(&mut rng);
            assert!(percent >= last);
            assert!(percent <= PROGRESS_CEILING);
            last = percent;
        }
        assert_eq!(sim.percent(), PROGRESS_CEILING);
    }

    #[test]
    fn test_increment_slows_near_the_end() {
        // StepRng yielding u64::MAX produces values at the top of every range
        let mut rng = StepRng::new(u64::MAX, 0);
        let mut sim = ProgressSimulation::new(messages(), PROGRESS_CEILING);

        let first = sim.tick(&mut rng);
        assert!(first > 2.0 && first < 3.0);

        while sim.percent() < 80.0 {
            sim.tick(&mut rng);
        }
        let before = sim.percent();
        let after = sim.tick(&mut rng);
        // f32 rounding can land the top of the 1-point span exactly on 1.0
        assert!(after - before <= 1.0);
        assert!(after - before < 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_publishes_updates() {
        let ticker = ProgressTicker::start(ProgressSettings {
            messages: messages(),
            ..ProgressSettings::default()
        });
        assert_eq!(ticker.snapshot().message, "one");

        tokio::time::sleep(Duration::from_millis(2600)).await;

        let snapshot = ticker.snapshot();
        assert_eq!(snapshot.message, "two");
        assert!(snapshot.percent <= PROGRESS_CEILING);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_ticker_stops_timers() {
        let ticker = ProgressTicker::start(ProgressSettings::default());
        let mut updates = ticker.subscribe();
        drop(ticker);

        // Once the task is gone the sender is dropped and changed() errors out
        let closed = tokio::time::timeout(Duration::from_secs(60), async {
            while updates.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
