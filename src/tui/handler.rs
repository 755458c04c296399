use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    Search,
    OpenInBrowser,
    ShowHelp,
    HideHelp,
    // Country code input actions
    EditCountryStart,
    CountryInputChar(char),
    CountryInputBackspace,
    CountryInputConfirm,
    CountryInputCancel,
}

pub fn handle_key_event(key: KeyEvent, country_input_active: bool, show_help: bool) -> Option<AppAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    if country_input_active {
        return match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppAction::Quit),
            (KeyCode::Enter, _) => Some(AppAction::CountryInputConfirm),
            (KeyCode::Esc, _) => Some(AppAction::CountryInputCancel),
            (KeyCode::Backspace, _) => Some(AppAction::CountryInputBackspace),
            (KeyCode::Char(c), _) => Some(AppAction::CountryInputChar(c)),
            _ => None,
        };
    }

    // Normal mode
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => Some(AppAction::Quit),
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppAction::Quit),

        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(AppAction::MoveDown),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(AppAction::MoveUp),
        (KeyCode::Char('<'), _) | (KeyCode::Home, _) => Some(AppAction::MoveToTop),
        (KeyCode::Char('>'), _) | (KeyCode::End, _) => Some(AppAction::MoveToBottom),

        (KeyCode::Enter, _) | (KeyCode::Char('s'), _) => Some(AppAction::Search),
        (KeyCode::Char('/'), _) | (KeyCode::Char('c'), _) => Some(AppAction::EditCountryStart),
        (KeyCode::Char('o'), _) => Some(AppAction::OpenInBrowser),

        (KeyCode::Char('?'), _) => Some(AppAction::ShowHelp),

        _ => None,
    }
}
