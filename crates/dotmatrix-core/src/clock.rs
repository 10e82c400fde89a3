use std::thread;
use std::time::{Duration, Instant};

/// Peripherals driven from the cycle bus. The bus fans increments out to
/// these in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subscriber {
    Timer,
    Graphics,
}

/// Wall-clock duration of one cycle-bus unit (~4.19 MHz).
pub const CYCLE_PERIOD: Duration = Duration::from_nanos(240);

// Below this much remaining time, spin instead of sleeping.
const SPIN_THRESHOLD: Duration = Duration::from_millis(1);

/// Cycle accounting for the instruction in flight, plus wall-clock pacing.
///
/// The CPU brackets every instruction with [`Clock::cycle_start`] and
/// [`Clock::cycle_end`]; the bus calls [`Clock::add`] with the cycle count
/// the handler reports and then steps each subscriber itself (single-owner
/// dispatch). With the limiter enabled, `cycle_end` holds the thread until
/// the instruction's wall-clock share has elapsed.
pub struct Clock {
    subscribers: Vec<Subscriber>,
    start: Instant,
    cycles: u32,
    total: u64,
    limiter: bool,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            start: Instant::now(),
            cycles: 0,
            total: 0,
            limiter: false,
        }
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn subscriber_at(&self, index: usize) -> Subscriber {
        self.subscribers[index]
    }

    /// Mark the start of an instruction.
    pub fn cycle_start(&mut self) {
        self.start = Instant::now();
        self.cycles = 0;
    }

    /// Account cycles for the instruction in flight.
    pub fn add(&mut self, cycles: u8) {
        self.cycles += cycles as u32;
        self.total += cycles as u64;
    }

    /// Pace the instruction to wall-clock time. Sleeps while more than a
    /// millisecond remains, spins for the tail; per-frame jitter stays well
    /// under one scanline.
    pub fn cycle_end(&self) {
        if !self.limiter {
            return;
        }
        let deadline = self.start + CYCLE_PERIOD * self.cycles;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let remaining = deadline - now;
            if remaining > SPIN_THRESHOLD {
                thread::sleep(remaining - SPIN_THRESHOLD);
            } else {
                std::hint::spin_loop();
            }
        }
    }

    /// Enable or disable real-time pacing. Off by default so tests and
    /// headless runs go as fast as the host allows.
    pub fn set_limiter(&mut self, on: bool) {
        self.limiter = on;
    }

    /// Cycles accounted since construction.
    pub fn total_cycles(&self) -> u64 {
        self.total
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_is_preserved() {
        let mut clock = Clock::new();
        clock.subscribe(Subscriber::Timer);
        clock.subscribe(Subscriber::Graphics);
        assert_eq!(clock.subscriber_at(0), Subscriber::Timer);
        assert_eq!(clock.subscriber_at(1), Subscriber::Graphics);
    }

    #[test]
    fn totals_accumulate_across_instructions() {
        let mut clock = Clock::new();
        clock.cycle_start();
        clock.add(4);
        clock.add(8);
        clock.cycle_end();
        clock.cycle_start();
        clock.add(12);
        assert_eq!(clock.total_cycles(), 24);
    }
}
