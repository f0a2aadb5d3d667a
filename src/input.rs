use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Handle keyboard events. Returns true if the app should quit.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    // Only handle key press events, ignore release and repeat
    if key.kind != KeyEventKind::Press {
        return false;
    }

    let quit = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    };

    if quit {
        app.quit();
    }
    quit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RunState;
    use crate::config::Config;
    use crate::system::{MockFs, PublicIpCache, SystemSampler};
    use crossterm::event::KeyEventState;

    fn app() -> App {
        App::with_source(
            Config::default(),
            Box::new(SystemSampler::with_fs(MockFs::new())),
            PublicIpCache::disabled(),
        )
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_quit_keys() {
        for key in [
            press(KeyCode::Char('q'), KeyModifiers::NONE),
            press(KeyCode::Char('Q'), KeyModifiers::SHIFT),
            press(KeyCode::Esc, KeyModifiers::NONE),
            press(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = app();
            assert!(handle_key_event(&mut app, key), "{key:?}");
            assert_eq!(app.state, RunState::Terminated);
        }
    }

    #[test]
    fn test_other_keys_keep_running() {
        let mut app = app();
        for key in [
            press(KeyCode::Char('c'), KeyModifiers::NONE),
            press(KeyCode::Char('x'), KeyModifiers::NONE),
            press(KeyCode::Enter, KeyModifiers::NONE),
        ] {
            assert!(!handle_key_event(&mut app, key));
        }
        assert!(app.is_running());
    }

    #[test]
    fn test_release_is_ignored() {
        let mut app = app();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(!handle_key_event(&mut app, release));
        assert!(app.is_running());
    }
}
