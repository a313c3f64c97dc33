//! [`ButtonMap`] – button events to rover actions.
//!
//! The controller driver reports which [`Button`] was pressed; the map says
//! what that press means.  Unbound buttons do nothing.
//!
//! Default bindings:
//!
//! | Button | Action |
//! |---|---|
//! | `Home` | shut down |
//! | `Plus` | LED on |
//! | `Minus` | LED off |
//! | `A` | blink at 3 Hz |
//! | `One` | blink at 1 Hz |
//! | `Two` | blink at 2 Hz |
//! | `Board` | blink at 10 Hz |

use std::collections::HashMap;

use wiirover_types::Button;

/// What a button press asks the rover to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonAction {
    /// Stop the wheels, darken the LED and end the session.
    Shutdown,
    /// Hold the LED steady.
    Led(bool),
    /// Blink the LED at the given frequency in Hz.
    Blink(f64),
}

/// Dispatch table from [`Button`] to [`ButtonAction`].
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonMap {
    bindings: HashMap<Button, ButtonAction>,
}

impl Default for ButtonMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(Button::Home, ButtonAction::Shutdown);
        map.bind(Button::Plus, ButtonAction::Led(true));
        map.bind(Button::Minus, ButtonAction::Led(false));
        map.bind(Button::A, ButtonAction::Blink(3.0));
        map.bind(Button::One, ButtonAction::Blink(1.0));
        map.bind(Button::Two, ButtonAction::Blink(2.0));
        map.bind(Button::Board, ButtonAction::Blink(10.0));
        map
    }
}

impl ButtonMap {
    /// A map with no bindings at all.
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `button` to `action`, returning the action it replaced.
    pub fn bind(&mut self, button: Button, action: ButtonAction) -> Option<ButtonAction> {
        self.bindings.insert(button, action)
    }

    pub fn unbind(&mut self, button: Button) -> Option<ButtonAction> {
        self.bindings.remove(&button)
    }

    pub fn action_for(&self, button: Button) -> Option<ButtonAction> {
        self.bindings.get(&button).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
