use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// What the loop hands to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// Time passed since the previous tick; drives menu timers and transitions.
    Tick(Duration),
    Input(Event),
}

/// The single loop driving the host: polls the input driver, forwards
/// events and emits a tick on every pass so deferred menu work keeps moving
/// when no input arrives.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
    last_tick: Option<Instant>,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
            last_tick: None,
        }
    }

    fn elapsed_since_tick(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_tick = Some(now);
        elapsed
    }

    /// Run until the handler asks to quit. Every pass starts with a
    /// `Tick`, then drains whatever input is queued.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, LoopEvent) -> io::Result<ControlFlow>,
    {
        loop {
            let elapsed = self.elapsed_since_tick();
            if let ControlFlow::Quit = handler(&mut self.driver, LoopEvent::Tick(elapsed))? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain bursts (mouse motion) before the next tick.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, LoopEvent::Input(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
