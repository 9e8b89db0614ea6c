//! Pilot input: device mapping and cross-thread submission

pub mod buffer;
pub mod device;

pub use buffer::{InputBuffer, InputBufferError, InputMessage, InputSender};
pub use device::{DeviceSettings, DeviceState, GamepadInput, GamepadLayout, InputDevice, MouseKeyboard};
