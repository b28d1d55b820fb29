//! Undo/redo keyboard shortcuts.

/// Where keyboard focus was when a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Canvas,
    /// A text input or textarea; shortcuts are left to the field.
    TextInput,
}

/// A key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub focus: FocusTarget,
}

impl KeyPress {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    #[must_use]
    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub fn in_text_input(mut self) -> Self {
        self.focus = FocusTarget::TextInput;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommand {
    Undo,
    Redo,
}

/// Maps a key press to a history command.
///
/// Ctrl or Meta with Z undoes, with Shift+Z or Y redoes. Nothing fires while
/// a text input has focus.
#[must_use]
pub fn resolve(press: &KeyPress) -> Option<HistoryCommand> {
    if press.focus == FocusTarget::TextInput || !(press.ctrl || press.meta) {
        return None;
    }
    match press.key.to_lowercase().as_str() {
        "z" if press.shift => Some(HistoryCommand::Redo),
        "z" => Some(HistoryCommand::Undo),
        "y" => Some(HistoryCommand::Redo),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_modifier_z_undoes() {
        assert_eq!(resolve(&KeyPress::new("z").ctrl()), Some(HistoryCommand::Undo));
        assert_eq!(resolve(&KeyPress::new("z").meta()), Some(HistoryCommand::Undo));
    }

    #[test]
    fn shift_z_and_y_redo() {
        assert_eq!(
            resolve(&KeyPress::new("Z").ctrl().shift()),
            Some(HistoryCommand::Redo)
        );
        assert_eq!(resolve(&KeyPress::new("y").meta()), Some(HistoryCommand::Redo));
    }

    #[test]
    fn requires_modifier() {
        assert_eq!(resolve(&KeyPress::new("z")), None);
        assert_eq!(resolve(&KeyPress::new("z").shift()), None);
        assert_eq!(resolve(&KeyPress::new("x").ctrl()), None);
    }

    #[test]
    fn suppressed_in_text_input() {
        assert_eq!(resolve(&KeyPress::new("z").ctrl().in_text_input()), None);
    }
}
