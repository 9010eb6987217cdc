//! Button input.
//!
//! The device exposes four buttons. Each press and release arrives as a
//! separate [`ButtonEvent`]; components usually act on release, the way a
//! menu on a physical device feels natural.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Select,
    Cancel,
}

impl Button {
    pub const ALL: [Button; 4] = [Button::Up, Button::Down, Button::Select, Button::Cancel];

    pub fn name(self) -> &'static str {
        match self {
            Button::Up => "up",
            Button::Down => "down",
            Button::Select => "select",
            Button::Cancel => "cancel",
        }
    }

    pub fn from_name(name: &str) -> Option<Button> {
        Button::ALL.into_iter().find(|button| button.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: Button,
    pub state: ButtonState,
}

impl ButtonEvent {
    pub fn press(button: Button) -> Self {
        Self {
            button,
            state: ButtonState::Pressed,
        }
    }

    pub fn release(button: Button) -> Self {
        Self {
            button,
            state: ButtonState::Released,
        }
    }

    pub fn is_release(&self) -> bool {
        self.state == ButtonState::Released
    }

    /// The button, if this event is a release.
    pub fn released(&self) -> Option<Button> {
        self.is_release().then_some(self.button)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}

impl EventResponse {
    pub fn is_handled(self) -> bool {
        self == EventResponse::Handled
    }
}
