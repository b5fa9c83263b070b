pub mod console;
pub mod keyboard;

use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::ui::UiFrame;

/// Source of terminal events for the event loop.
pub trait InputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<Event>;
}

/// Terminal surface the view draws into.
pub trait OutputDriver {
    fn enter(&mut self) -> io::Result<()>;
    fn exit(&mut self) -> io::Result<()>;

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>);
}
