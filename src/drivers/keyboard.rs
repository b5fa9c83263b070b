use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

/// Cleans raw terminal key events before they reach the menus: Shift+Tab is
/// reported as `BackTab` without the modifier, and only presses survive.
#[derive(Default)]
pub struct KeyNormalizer {
    esc_down: bool,
}

impl KeyNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, evt: Event) -> Option<Event> {
        let Event::Key(mut key) = evt else {
            return Some(evt);
        };
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
        }
        if key.code == KeyCode::BackTab {
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        match key.kind {
            KeyEventKind::Release => {
                if key.code == KeyCode::Esc {
                    self.esc_down = false;
                }
                return None;
            }
            // Windows consoles repeat Esc while held; one press is enough to
            // dismiss a menu.
            KeyEventKind::Repeat if key.code == KeyCode::Esc => return None,
            KeyEventKind::Repeat | KeyEventKind::Press => {}
        }
        if cfg!(windows) && key.code == KeyCode::Esc {
            if self.esc_down {
                return None;
            }
            self.esc_down = true;
        } else {
            self.esc_down = false;
        }
        Some(Event::Key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn shift_tab_becomes_backtab() {
        let mut norm = KeyNormalizer::new();
        let out = norm.normalize(Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT)));
        let Some(Event::Key(k)) = out else {
            panic!("expected key event");
        };
        assert_eq!(k.code, KeyCode::BackTab);
        assert!(k.modifiers.is_empty());

        let out = norm.normalize(Event::Key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)));
        assert_eq!(
            out,
            Some(Event::Key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE)))
        );
    }

    #[test]
    fn releases_are_dropped() {
        let mut norm = KeyNormalizer::new();
        let mut key = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(norm.normalize(Event::Key(key)).is_none());
    }

    #[test]
    fn repeated_arrows_pass_but_repeated_escape_does_not() {
        let mut norm = KeyNormalizer::new();
        let mut down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        down.kind = KeyEventKind::Repeat;
        assert!(norm.normalize(Event::Key(down)).is_some());
        let mut esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        esc.kind = KeyEventKind::Repeat;
        assert!(norm.normalize(Event::Key(esc)).is_none());
    }

    #[test]
    fn non_key_events_pass_through() {
        let mut norm = KeyNormalizer::new();
        assert_eq!(norm.normalize(Event::Resize(10, 20)), Some(Event::Resize(10, 20)));
    }
}
