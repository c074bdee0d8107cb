use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;
use crate::app::constants::STATUS_AT_ROOT;
use crate::app::navigation::NavEvent;

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.kind == KeyEventKind::Release {
            return Ok(false);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
            return Ok(true);
        }
        let page = self.navigator.page_size() as isize;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up | KeyCode::Char('k') => self.navigator.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.navigator.move_selection(1),
            KeyCode::PageUp => self.navigator.move_selection(-page),
            KeyCode::PageDown => self.navigator.move_selection(page),
            KeyCode::Home | KeyCode::Char('g') => self.navigator.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.navigator.select_last(),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                let index = self.navigator.selected();
                self.navigate(NavEvent::SelectEntry(index));
            }
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
                if self.navigator.state().is_root() {
                    self.set_status(STATUS_AT_ROOT);
                } else {
                    self.navigate(NavEvent::EnterParent);
                }
            }
            KeyCode::Char('.') => self.toggle_hidden(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('v') => self.cycle_header_mode(),
            _ => {}
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::remote_fs::MockRemoteFs;
    use crate::app::{AppEvent, HeaderMode};

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_event(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap()
    }

    #[test]
    fn quit_keys() {
        let mut app = App::for_tests(MockRemoteFs::with_home());
        assert!(press(&mut app, KeyCode::Char('q')));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.handle_event(AppEvent::Key(ctrl_c)).unwrap());
        assert!(!press(&mut app, KeyCode::Char('x')));
        let _ = std::fs::remove_dir_all(&app.download_dir);
    }

    #[test]
    fn arrows_and_enter_walk_the_tree() {
        let mut app = App::for_tests(MockRemoteFs::with_home());
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.navigator.state().current_path, "/home/user/docs");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.navigator.state().current_path, "/home/user");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.navigator.state().current_path, "/");
        press(&mut app, KeyCode::Left);
        assert_eq!(app.navigator.state().current_path, "/");
        assert_eq!(app.status_text(), Some(STATUS_AT_ROOT));
        let _ = std::fs::remove_dir_all(&app.download_dir);
    }

    #[test]
    fn dot_toggles_hidden_files() {
        let mut app = App::for_tests(MockRemoteFs::with_home());
        assert!(!app.navigator.state().items.iter().any(|e| e.name == ".profile"));
        press(&mut app, KeyCode::Char('.'));
        assert!(app.navigator.state().items.iter().any(|e| e.name == ".profile"));
        assert_eq!(app.status_text(), Some("Hidden files shown"));
        let _ = std::fs::remove_dir_all(&app.download_dir);
    }

    #[test]
    fn v_cycles_header() {
        let mut app = App::for_tests(MockRemoteFs::with_home());
        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.header_mode, HeaderMode::Logs);
        press(&mut app, KeyCode::Char('v'));
        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.header_mode, HeaderMode::Help);
        let _ = std::fs::remove_dir_all(&app.download_dir);
    }

    #[test]
    fn end_and_home_jump() {
        let mut app = App::for_tests(MockRemoteFs::with_home());
        press(&mut app, KeyCode::End);
        assert_eq!(app.navigator.selected_entry().map(|e| e.name.as_str()), Some("notes.txt"));
        press(&mut app, KeyCode::Home);
        assert_eq!(app.navigator.selected(), 0);
        let _ = std::fs::remove_dir_all(&app.download_dir);
    }
}
