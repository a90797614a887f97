use std::{
    collections::{HashMap, HashSet},
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

/// Opaque handle for one clock subscription. Never reused by the clock that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Periodic tick source the player subscribes to while playing.
pub trait Clock {
    /// Starts delivering ticks every `period` until unsubscribed.
    fn subscribe(&mut self, period: Duration) -> SubscriptionId;

    /// Stops a subscription. Unknown or already cancelled ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// Clock whose ticks are driven by hand, through `Player::tick`. It only
/// keeps the subscription bookkeeping so tests and simulated hosts can see
/// what the player asked for.
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: u64,
    active: HashSet<SubscriptionId>,
    period: Option<Duration>,
    subscribe_count: usize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, id: SubscriptionId) -> bool {
        self.active.contains(&id)
    }

    /// Total number of subscriptions ever opened.
    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count
    }

    /// Period requested by the most recent subscription.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }
}

impl Clock for ManualClock {
    fn subscribe(&mut self, period: Duration) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.active.insert(id);
        self.period = Some(period);
        self.subscribe_count += 1;
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.active.remove(&id);
    }
}

/// Thread-backed clock. Each subscription runs a worker that sends its id on
/// a channel once per period; the host drains [`IntervalClock::ticks`] and
/// forwards each id to `Player::tick_from`.
///
/// Workers wait on absolute deadlines `start + n * period`, so ticks stay on
/// a fixed schedule instead of accumulating the latency of each delivery. A
/// worker that falls behind catches up with back-to-back ticks.
#[derive(Debug)]
pub struct IntervalClock {
    next_id: u64,
    sender: Sender<SubscriptionId>,
    receiver: Option<Receiver<SubscriptionId>>,
    running: HashMap<SubscriptionId, Sender<()>>,
}

impl IntervalClock {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            next_id: 0,
            sender,
            receiver: Some(receiver),
            running: HashMap::new(),
        }
    }

    /// Hands out the tick receiver. Only the first call returns `Some`.
    pub fn ticks(&mut self) -> Option<Receiver<SubscriptionId>> {
        self.receiver.take()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.running.len()
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for IntervalClock {
    fn subscribe(&mut self, period: Duration) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        // Dropping `cancel_tx` disconnects the worker's cancel channel.
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let sender = self.sender.clone();

        thread::spawn(move || {
            // Deadlines advance by whole periods from the start, never from
            // the moment a tick was delivered.
            let mut deadline = Instant::now() + period;
            loop {
                match cancel_rx.recv_deadline(deadline) {
                    Err(RecvTimeoutError::Timeout) => {
                        if sender.send(id).is_err() {
                            break;
                        }
                        deadline += period;
                    }
                    _ => break,
                }
            }
        });

        self.running.insert(id, cancel_tx);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.running.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_tracks_subscriptions() {
        let mut clock = ManualClock::new();
        let first = clock.subscribe(Duration::from_millis(100));
        let second = clock.subscribe(Duration::from_millis(50));

        assert_ne!(first, second);
        assert_eq!(clock.active_subscriptions(), 2);
        assert_eq!(clock.period(), Some(Duration::from_millis(50)));

        clock.unsubscribe(first);
        clock.unsubscribe(first);
        assert!(!clock.is_active(first));
        assert!(clock.is_active(second));
        assert_eq!(clock.subscribe_count(), 2);
    }

    #[test]
    fn interval_clock_delivers_ticks_until_unsubscribed() {
        let mut clock = IntervalClock::new();
        let ticks = clock.ticks().expect("receiver is available once");
        assert!(clock.ticks().is_none());

        let id = clock.subscribe(Duration::from_millis(2));
        let first = ticks
            .recv_timeout(Duration::from_secs(2))
            .expect("a tick should arrive");
        assert_eq!(first, id);

        clock.unsubscribe(id);
        assert_eq!(clock.active_subscriptions(), 0);

        // Drain anything already in flight, then the worker must go quiet.
        thread::sleep(Duration::from_millis(20));
        while ticks.try_recv().is_ok() {}
        assert!(ticks.recv_timeout(Duration::from_millis(30)).is_err());
    }

    #[test]
    fn interval_clock_keeps_a_fixed_schedule() {
        let mut clock = IntervalClock::new();
        let ticks = clock.ticks().unwrap();

        let started = Instant::now();
        let id = clock.subscribe(Duration::from_millis(5));
        for _ in 0..100 {
            let tick = ticks.recv_timeout(Duration::from_secs(2)).unwrap();
            assert_eq!(tick, id);
        }
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(500), "ticks came early: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "ticks drifted: {elapsed:?}");
    }

    #[test]
    fn dropping_interval_clock_stops_workers() {
        let mut clock = IntervalClock::new();
        let ticks = clock.ticks().unwrap();
        clock.subscribe(Duration::from_millis(2));
        ticks.recv_timeout(Duration::from_secs(2)).unwrap();

        drop(clock);
        thread::sleep(Duration::from_millis(20));
        while ticks.try_recv().is_ok() {}
        assert!(ticks.recv_timeout(Duration::from_millis(30)).is_err());
    }
}
