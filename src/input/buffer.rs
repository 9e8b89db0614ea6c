//! Lock-free hand-off of pilot input
//!
//! Device threads push [`ShipInput`]s through a bounded crossbeam channel;
//! the session drains them at the start of each frame.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use thiserror::Error;

use crate::game::agent::ShipInput;
use crate::game::ship::ShipId;

/// Input destined to one ship
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputMessage {
    pub ship: ShipId,
    pub input: ShipInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputBufferError {
    /// Too many inputs queued since the last frame
    #[error("input buffer full")]
    Full,
    /// The session that owned the buffer is gone
    #[error("input buffer disconnected")]
    Disconnected,
}

impl<T> From<TrySendError<T>> for InputBufferError {
    fn from(e: TrySendError<T>) -> Self {
        match e {
            TrySendError::Full(_) => InputBufferError::Full,
            TrySendError::Disconnected(_) => InputBufferError::Disconnected,
        }
    }
}

pub struct InputBuffer {
    sender: Sender<InputMessage>,
    receiver: Receiver<InputMessage>,
    capacity: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Handle for a device thread
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    #[inline]
    pub fn try_submit(&self, ship: ShipId, input: ShipInput) -> Result<(), InputBufferError> {
        Ok(self.sender.try_send(InputMessage { ship, input })?)
    }

    /// Hand every pending message to `apply`, oldest first.
    ///
    /// Later messages for the same ship override earlier ones once applied.
    pub fn drain_into(&self, mut apply: impl FnMut(InputMessage)) -> usize {
        let mut count = 0;
        for message in self.receiver.try_iter() {
            apply(message);
            count += 1;
        }
        count
    }

    pub fn drain(&self) -> Vec<InputMessage> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        // a few seconds of 60 Hz input for a couple of local pilots
        Self::new(256)
    }
}

impl std::fmt::Debug for InputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBuffer")
            .field("pending", &self.pending_count())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Clonable, `Send` submission handle
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<InputMessage>,
}

impl InputSender {
    #[inline]
    pub fn try_send(&self, ship: ShipId, input: ShipInput) -> Result<(), InputBufferError> {
        Ok(self.sender.try_send(InputMessage { ship, input })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_input(dx: f32) -> ShipInput {
        ShipInput {
            dx,
            shooting: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_submit_and_drain() {
        let buffer = InputBuffer::new(10);
        buffer.try_submit(0, create_test_input(0.1)).unwrap();
        buffer.try_submit(0, create_test_input(0.2)).unwrap();
        buffer.try_submit(1, create_test_input(0.3)).unwrap();
        assert_eq!(buffer.pending_count(), 3);

        let inputs = buffer.drain();
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].input.dx, 0.1);
        assert_eq!(inputs[2].ship, 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_backpressure() {
        let buffer = InputBuffer::new(2);
        buffer.try_submit(0, create_test_input(0.1)).unwrap();
        buffer.try_submit(0, create_test_input(0.2)).unwrap();
        assert_eq!(
            buffer.try_submit(0, create_test_input(0.3)),
            Err(InputBufferError::Full)
        );
        buffer.drain();
        assert!(buffer.try_submit(0, create_test_input(0.3)).is_ok());
    }

    #[test]
    fn test_sender_from_another_thread() {
        let buffer = InputBuffer::new(10);
        let sender = buffer.sender();
        std::thread::spawn(move || {
            sender.try_send(2, create_test_input(0.5)).unwrap();
        })
        .join()
        .unwrap();

        let mut seen = Vec::new();
        assert_eq!(buffer.drain_into(|m| seen.push(m)), 1);
        assert_eq!(seen[0].ship, 2);
    }

    #[test]
    fn test_disconnected() {
        let buffer = InputBuffer::new(4);
        let sender = buffer.sender();
        drop(buffer);
        assert_eq!(
            sender.try_send(0, create_test_input(0.0)),
            Err(InputBufferError::Disconnected)
        );
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(InputBuffer::default().capacity(), 256);
    }
}
