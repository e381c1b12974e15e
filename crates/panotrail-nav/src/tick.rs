use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

pub trait Clock {
    fn now_ms(&self) -> f64;
}

#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms.max(0.0));
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub index: u64,
    pub elapsed_ms: f64,
    pub delta_ms: f64,
    stop: bool,
}

impl Tick {
    pub fn stop(&mut self) {
        self.stop = true;
    }
}

/// Cooperative repeating-callback driver. The host calls [`frame`] once per
/// display refresh; the callback runs only between `start` and `stop`.
/// Stopping pauses the elapsed clock and starting again resumes it;
/// [`reset_elapsed`] begins a fresh session clock.
///
/// [`frame`]: TickScheduler::frame
/// [`reset_elapsed`]: TickScheduler::reset_elapsed
pub struct TickScheduler<'a, C: Clock = SystemClock> {
    clock: C,
    callback: Box<dyn FnMut(&mut Tick) + 'a>,
    running: bool,
    origin_ms: f64,
    paused_elapsed_ms: f64,
    last_elapsed_ms: f64,
    ticks: u64,
}

impl<'a, C: Clock> TickScheduler<'a, C> {
    pub fn new<F>(clock: C, callback: F) -> Self
    where
        F: FnMut(&mut Tick) + 'a,
    {
        Self {
            clock,
            callback: Box::new(callback),
            running: false,
            origin_ms: 0.0,
            paused_elapsed_ms: 0.0,
            last_elapsed_ms: 0.0,
            ticks: 0,
        }
    }

    pub fn start(&mut self) -> bool {
        if self.running {
            debug!("tick scheduler already running");
            return false;
        }
        self.origin_ms = self.clock.now_ms() - self.paused_elapsed_ms;
        self.last_elapsed_ms = self.paused_elapsed_ms;
        self.running = true;
        true
    }

    pub fn stop(&mut self) {
        if self.running {
            self.paused_elapsed_ms = self.elapsed_time();
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed_time(&self) -> f64 {
        if self.running {
            (self.clock.now_ms() - self.origin_ms).max(0.0)
        } else {
            self.paused_elapsed_ms
        }
    }

    pub fn reset_elapsed(&mut self) {
        self.origin_ms = self.clock.now_ms();
        self.paused_elapsed_ms = 0.0;
        self.last_elapsed_ms = 0.0;
    }

    pub fn frame(&mut self) -> bool {
        if !self.running {
            return false;
        }
        let elapsed_ms = self.elapsed_time();
        let mut tick = Tick {
            index: self.ticks,
            elapsed_ms,
            delta_ms: (elapsed_ms - self.last_elapsed_ms).max(0.0),
            stop: false,
        };
        self.last_elapsed_ms = elapsed_ms;
        self.ticks += 1;
        (self.callback)(&mut tick);
        if tick.stop {
            self.stop();
        }
        true
    }

    pub fn run(&mut self, interval: Duration) -> u64 {
        self.start();
        let mut frames = 0;
        while self.frame() {
            frames += 1;
            if !self.running {
                break;
            }
            std::thread::sleep(interval);
        }
        frames
    }
}
