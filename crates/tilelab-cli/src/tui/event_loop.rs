use crossterm::event;

use crate::tui::event::TuiEvent;

/// Yields a render request whenever the previous event may have changed the
/// screen, otherwise blocks on the terminal.
#[derive(Debug)]
pub(super) struct EventLoop {
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub(super) fn new() -> Self {
        Self {
            dirty: true, // Initial render is required on startup
        }
    }

    pub(super) fn next(&mut self) -> anyhow::Result<TuiEvent> {
        if self.dirty {
            self.dirty = false;
            return Ok(TuiEvent::Render);
        }
        let event = event::read()?;
        self.dirty = true;
        Ok(event.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_event_is_render() {
        let mut events = EventLoop::new();

        assert!(events.next().unwrap().is_render());
    }
}
