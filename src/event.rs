//! Typed input stream consumed by the editor.
//!
//! Pointer coordinates are in client (display) pixels; the editor maps them
//! into image space before any geometry runs. Events serialize as tagged JSON
//! objects so recorded sessions can be replayed:
//!
//! ```json
//! [
//!   {"type": "pointer_down", "x": 10, "y": 10},
//!   {"type": "pointer_move", "x": 100, "y": 80},
//!   {"type": "pointer_up", "x": 100, "y": 80},
//!   {"type": "key_down", "key": "Delete"}
//! ]
//! ```

use serde::{Deserialize, Serialize};

/// Pointer button of a press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Keys the editor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Backspace,
    Escape,
    Enter,
    Tab,
    /// Any printable character
    Char(char),
}

impl Key {
    /// Display name of the key.
    pub fn label(&self) -> String {
        match self {
            Key::ArrowUp => "Up".to_string(),
            Key::ArrowDown => "Down".to_string(),
            Key::ArrowLeft => "Left".to_string(),
            Key::ArrowRight => "Right".to_string(),
            Key::Delete => "Delete".to_string(),
            Key::Backspace => "Backspace".to_string(),
            Key::Escape => "Esc".to_string(),
            Key::Enter => "Enter".to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Char(c) => c.to_uppercase().collect(),
        }
    }
}

/// One input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default)]
        button: PointerButton,
    },
    /// Pointer motion, with or without a button held
    PointerMove { x: f32, y: f32 },
    PointerUp {
        x: f32,
        y: f32,
        #[serde(default)]
        button: PointerButton,
    },
    KeyDown { key: Key },
    /// A text field gained or lost keyboard focus
    TextInputFocus { focused: bool },
    SelectImage { index: usize },
    SelectClass { index: usize },
    AddClass { name: String },
    DeleteClass { index: usize },
    /// Change the class of the selected box
    ReassignSelected { class_index: usize },
}

impl InputEvent {
    /// Whether this is a pointer event.
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerDown { .. }
                | InputEvent::PointerMove { .. }
                | InputEvent::PointerUp { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_stream() {
        let json = r#"[
            {"type": "pointer_down", "x": 10, "y": 12.5},
            {"type": "pointer_move", "x": 100, "y": 80},
            {"type": "pointer_up", "x": 100, "y": 80, "button": "secondary"},
            {"type": "key_down", "key": "Delete"},
            {"type": "key_down", "key": {"Char": "q"}},
            {"type": "add_class", "name": "car"}
        ]"#;
        let events: Vec<InputEvent> = serde_json::from_str(json).expect("parse");
        assert_eq!(
            events[0],
            InputEvent::PointerDown {
                x: 10.0,
                y: 12.5,
                button: PointerButton::Primary
            }
        );
        assert_eq!(
            events[2],
            InputEvent::PointerUp {
                x: 100.0,
                y: 80.0,
                button: PointerButton::Secondary
            }
        );
        assert_eq!(events[3], InputEvent::KeyDown { key: Key::Delete });
        assert_eq!(events[4], InputEvent::KeyDown { key: Key::Char('q') });
        assert!(events[1].is_pointer());
        assert!(!events[5].is_pointer());
    }

    #[test]
    fn test_key_labels() {
        assert_eq!(Key::ArrowLeft.label(), "Left");
        assert_eq!(Key::Char('x').label(), "X");
    }
}
