//! Customizable keybindings for BVAT.
//!
//! Keybindings are stored in the config file and can bind several keys to
//! the same action.

use serde::{Deserialize, Serialize};

use crate::event::Key;

/// Editor action triggered by a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    NextImage,
    PreviousImage,
    DeleteSelected,
}

impl KeyAction {
    pub const ALL: [KeyAction; 3] = [
        KeyAction::NextImage,
        KeyAction::PreviousImage,
        KeyAction::DeleteSelected,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            KeyAction::NextImage => "Next image",
            KeyAction::PreviousImage => "Previous image",
            KeyAction::DeleteSelected => "Delete selected box",
        }
    }
}

/// Keybinding configuration for the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Keys that advance to the next image
    pub next_image: Vec<Key>,
    /// Keys that go back to the previous image
    pub previous_image: Vec<Key>,
    /// Keys that delete the selected box
    pub delete_selected: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            next_image: vec![Key::ArrowDown, Key::ArrowRight],
            previous_image: vec![Key::ArrowUp, Key::ArrowLeft],
            delete_selected: vec![Key::Delete, Key::Backspace],
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys bound to an action.
    pub fn keys_for(&self, action: KeyAction) -> &[Key] {
        match action {
            KeyAction::NextImage => &self.next_image,
            KeyAction::PreviousImage => &self.previous_image,
            KeyAction::DeleteSelected => &self.delete_selected,
        }
    }

    /// Get the action that corresponds to a key press, if any.
    ///
    /// When a key is bound twice, the first action in [`KeyAction::ALL`] wins.
    pub fn action_for_key(&self, key: Key) -> Option<KeyAction> {
        KeyAction::ALL
            .into_iter()
            .find(|action| self.keys_for(*action).contains(&key))
    }

    /// Check if a key is already used by an action other than `exclude`.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: Key, exclude: Option<KeyAction>) -> Option<&'static str> {
        KeyAction::ALL
            .into_iter()
            .filter(|action| Some(*action) != exclude)
            .find(|action| self.keys_for(*action).contains(&key))
            .map(|action| action.description())
    }

    /// Human-readable list of the keys bound to an action.
    pub fn describe(&self, action: KeyAction) -> String {
        self.keys_for(action)
            .iter()
            .map(Key::label)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let kb = KeyBindings::default();
        assert_eq!(kb.action_for_key(Key::ArrowRight), Some(KeyAction::NextImage));
        assert_eq!(kb.action_for_key(Key::ArrowDown), Some(KeyAction::NextImage));
        assert_eq!(kb.action_for_key(Key::ArrowLeft), Some(KeyAction::PreviousImage));
        assert_eq!(kb.action_for_key(Key::Backspace), Some(KeyAction::DeleteSelected));
        assert_eq!(kb.action_for_key(Key::Char('a')), None);
    }

    #[test]
    fn test_key_conflict() {
        let kb = KeyBindings::default();
        assert_eq!(kb.key_conflict(Key::Delete, None), Some("Delete selected box"));
        assert_eq!(kb.key_conflict(Key::Delete, Some(KeyAction::DeleteSelected)), None);
        assert_eq!(kb.key_conflict(Key::Enter, None), None);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let kb: KeyBindings =
            serde_json::from_str(r#"{"next_image": [{"Char": "n"}]}"#).expect("parse");
        assert_eq!(kb.action_for_key(Key::Char('n')), Some(KeyAction::NextImage));
        assert_eq!(kb.action_for_key(Key::ArrowRight), None);
        assert_eq!(kb.previous_image, KeyBindings::default().previous_image);
        assert_eq!(kb.describe(KeyAction::DeleteSelected), "Delete / Backspace");
    }
}
