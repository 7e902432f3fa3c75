use super::commands::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Space,
    Enter,
    Other(char),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
        alt: false,
    };

    fn any(&self) -> bool {
        self.shift || self.ctrl || self.meta || self.alt
    }
}

/// Where keyboard focus is when a key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    TextField,
    Elsewhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub focus: Focus,
}

impl KeyEvent {
    pub fn new(key: Key, focus: Focus) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            focus,
        }
    }

    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        Self { modifiers, ..self }
    }
}

/// Maps a key press to an action. Keys typed into the text field are text, except for the Enter
/// combinations.
pub fn action_for(event: KeyEvent) -> Option<Action> {
    match (event.focus, event.key) {
        (Focus::TextField, Key::Enter) if event.modifiers.ctrl || event.modifiers.meta => {
            Some(Action::ToggleExpanded)
        }
        (Focus::TextField, Key::Enter) if !event.modifiers.any() => Some(Action::SubmitDraft),
        (Focus::TextField, _) => None,
        (Focus::Elsewhere, Key::Digit(digit)) => Some(Action::Hotkey(digit)),
        (Focus::Elsewhere, Key::Space) => Some(Action::ToggleTimer),
        (Focus::Elsewhere, Key::Enter | Key::Other(_)) => None,
    }
}
