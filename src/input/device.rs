//! Input devices
//!
//! Every device reports the same raw shape, a [`DeviceState`] of analog axes
//! and a button bitmask, and maps it onto a ship's [`ShipInput`]. The host
//! feeds raw readings in; nothing here talks to hardware.

use serde::{Deserialize, Serialize};

use crate::game::agent::ShipInput;
use crate::game::tunables::Tunables;

/// Right stick deflection that engages brake or burst
const STICK_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
    /// Relative pointer movement since the last poll
    PointerX,
    PointerY,
}

pub const AXIS_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Button {
    South,
    East,
    West,
    North,
    LeftShoulder,
    RightShoulder,
    LeftStick,
    RightStick,
    Start,
    MouseLeft,
    MouseRight,
    KeyW,
    KeyS,
    KeyQ,
}

impl Button {
    #[inline]
    fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Raw reading of one device
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceState {
    pub axes: [f32; AXIS_COUNT],
    pub buttons: u32,
}

impl DeviceState {
    #[inline]
    pub fn axis(&self, axis: Axis) -> f32 {
        self.axes[axis as usize]
    }

    #[inline]
    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        self.axes[axis as usize] = value;
    }

    #[inline]
    pub fn pressed(&self, button: Button) -> bool {
        self.buttons & button.bit() != 0
    }

    #[inline]
    pub fn set_button(&mut self, button: Button, down: bool) {
        if down {
            self.buttons |= button.bit();
        } else {
            self.buttons &= !button.bit();
        }
    }

    /// Exactly `button` is held among the mouse buttons
    fn only_mouse(&self, button: Button) -> bool {
        let mouse = Button::MouseLeft.bit() | Button::MouseRight.bit();
        self.buttons & mouse == button.bit()
    }
}

/// Player preferences shared by all devices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub sensitivity: f32,
    pub invert_y: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            invert_y: false,
        }
    }
}

pub trait InputDevice {
    /// Current raw reading; relative axes are consumed.
    fn poll(&mut self) -> DeviceState;

    /// Map the current reading onto `input`. `dt` is the frame delta in ms.
    fn apply(&mut self, input: &mut ShipInput, tunables: &Tunables, dt: f32);

    /// The pilot asked for the in-game menu
    fn menu_requested(&self) -> bool {
        false
    }
}

/// Button layout of a gamepad family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamepadLayout {
    /// Right trigger fires, left trigger launches
    Xbox,
    /// Right shoulder fires, right trigger launches
    DualShock,
}

#[derive(Debug, Clone)]
pub struct GamepadInput {
    pub layout: GamepadLayout,
    pub settings: DeviceSettings,
    state: DeviceState,
}

impl GamepadInput {
    pub fn new(layout: GamepadLayout, settings: DeviceSettings) -> Self {
        Self {
            layout,
            settings,
            state: DeviceState::default(),
        }
    }

    /// Store the latest reading reported by the host.
    pub fn feed(&mut self, state: DeviceState) {
        self.state = state;
    }
}

impl InputDevice for GamepadInput {
    fn poll(&mut self) -> DeviceState {
        self.state
    }

    fn apply(&mut self, input: &mut ShipInput, tunables: &Tunables, _dt: f32) {
        let state = self.poll();
        let scale = tunables.player_turn_rate * self.settings.sensitivity;
        input.dx = state.axis(Axis::LeftX) * scale;
        input.dy = state.axis(Axis::LeftY) * scale;
        if self.settings.invert_y {
            input.dy = -input.dy;
        }
        input.constrain(tunables.player_turn_rate);

        let throttle = state.axis(Axis::RightY);
        input.brake = throttle > STICK_THRESHOLD;
        input.burst = throttle < -STICK_THRESHOLD;

        match self.layout {
            GamepadLayout::Xbox => {
                input.shooting = state.axis(Axis::RightTrigger) != 0.0;
                input.launch_missile = state.axis(Axis::LeftTrigger) != 0.0;
            }
            GamepadLayout::DualShock => {
                input.shooting = state.pressed(Button::RightShoulder);
                input.launch_missile = state.axis(Axis::RightTrigger) != 0.0;
            }
        }
        input.immelmann = state.pressed(Button::LeftStick);
    }

    fn menu_requested(&self) -> bool {
        self.state.pressed(Button::Start)
    }
}

/// Pointer steering with keyboard throttle
///
/// Left button fires, right button launches (only when pressed alone). W
/// bursts, S brakes, Q starts an Immelmann.
#[derive(Debug, Clone, Default)]
pub struct MouseKeyboard {
    pub settings: DeviceSettings,
    state: DeviceState,
}

impl MouseKeyboard {
    pub fn new(settings: DeviceSettings) -> Self {
        Self {
            settings,
            state: DeviceState::default(),
        }
    }

    /// Accumulate relative pointer movement until the next poll.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        self.state.axes[Axis::PointerX as usize] += dx;
        self.state.axes[Axis::PointerY as usize] += dy;
    }

    pub fn set_button(&mut self, button: Button, down: bool) {
        self.state.set_button(button, down);
    }
}

impl InputDevice for MouseKeyboard {
    fn poll(&mut self) -> DeviceState {
        let state = self.state;
        self.state.set_axis(Axis::PointerX, 0.0);
        self.state.set_axis(Axis::PointerY, 0.0);
        state
    }

    fn apply(&mut self, input: &mut ShipInput, tunables: &Tunables, dt: f32) {
        let state = self.poll();
        let scale = tunables.mouse_sensitivity * dt;
        input.dx = state.axis(Axis::PointerX) * scale;
        input.dy = state.axis(Axis::PointerY) * scale;
        if self.settings.invert_y {
            input.dy = -input.dy;
        }
        input.constrain(tunables.player_turn_rate);

        input.shooting = state.only_mouse(Button::MouseLeft);
        input.launch_missile = state.only_mouse(Button::MouseRight);
        input.burst = state.pressed(Button::KeyW);
        input.brake = state.pressed(Button::KeyS);
        input.immelmann = state.pressed(Button::KeyQ);
    }
}
