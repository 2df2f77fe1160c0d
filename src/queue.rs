//! Outbound command queue.
//!
//! The GATT client allows a single outstanding request per connection. Commands wait here
//! until the previous one has been answered, and are handed to the transport one at a time.
use bt_hci::param::ConnHandle;
use heapless::Vec;

use crate::att::AttReq;
use crate::config::COMMAND_QUEUE_SIZE;
use crate::protocol::WRITE_MESSAGE_LENGTH;
use crate::Error;

/// Primitive GATT operations used by the client.
///
/// Implementations send the request and return immediately. The answer is reported back to
/// the client through [`crate::AncsClient::on_write_response`],
/// [`crate::AncsClient::on_read_response`] or [`crate::AncsClient::process_att`].
pub trait GattTransport {
    /// Reason a request was not accepted.
    type Error;

    /// Issue a read request.
    fn read(&mut self, conn: ConnHandle, handle: u16) -> Result<(), Self::Error>;

    /// Issue a write request.
    fn write(&mut self, conn: ConnHandle, handle: u16, data: &[u8]) -> Result<(), Self::Error>;
}

/// A request waiting to be sent.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    Read {
        handle: u16,
    },
    Write {
        handle: u16,
        data: Vec<u8, WRITE_MESSAGE_LENGTH>,
    },
}

impl Command {
    /// Create a write command. Fails if `data` is longer than [`WRITE_MESSAGE_LENGTH`].
    pub fn write(handle: u16, data: &[u8]) -> Result<Self, Error> {
        let data = Vec::from_slice(data).map_err(|_| Error::InvalidLength)?;
        Ok(Self::Write { handle, data })
    }

    pub fn handle(&self) -> u16 {
        match self {
            Self::Read { handle } => *handle,
            Self::Write { handle, .. } => *handle,
        }
    }

    /// The ATT request carrying this command.
    pub fn request(&self) -> AttReq<'_> {
        match self {
            Self::Read { handle } => AttReq::Read { handle: *handle },
            Self::Write { handle, data } => AttReq::Write {
                handle: *handle,
                data: &data[..],
            },
        }
    }

    fn send<T: GattTransport + ?Sized>(&self, conn: ConnHandle, transport: &mut T) -> Result<(), T::Error> {
        match self {
            Self::Read { handle } => transport.read(conn, *handle),
            Self::Write { handle, data } => transport.write(conn, *handle, data),
        }
    }
}

/// A command tagged with the connection it targets.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PendingCommand {
    pub conn: ConnHandle,
    pub command: Command,
}

/// Ring buffer of pending commands with a single outstanding slot.
///
/// `N` must be a power of two.
pub struct CommandQueue<const N: usize = COMMAND_QUEUE_SIZE> {
    slots: [Option<PendingCommand>; N],
    fill: usize,
    send: usize,
    outstanding: Option<PendingCommand>,
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CommandQueue<N> {
    const MASK: usize = {
        core::assert!(N.is_power_of_two(), "command queue size must be a power of two");
        N - 1
    };

    pub fn new() -> Self {
        let _ = Self::MASK;
        Self {
            slots: core::array::from_fn(|_| None),
            fill: 0,
            send: 0,
            outstanding: None,
        }
    }

    /// Number of commands waiting to be sent, not counting the outstanding one.
    pub fn len(&self) -> usize {
        self.fill.wrapping_sub(self.send)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a sent command has not been answered yet.
    pub fn is_outstanding(&self) -> bool {
        self.outstanding.is_some()
    }

    /// The command sent last, while it waits for an answer.
    pub fn outstanding(&self) -> Option<&PendingCommand> {
        self.outstanding.as_ref()
    }

    /// Append a command. Nothing already queued is overwritten.
    pub fn enqueue(&mut self, command: PendingCommand) -> Result<(), Error> {
        if self.len() == N {
            warn!("[ancs queue] full, dropping command for handle {}", command.command.handle());
            return Err(Error::QueueFull);
        }
        self.slots[self.fill & Self::MASK] = Some(command);
        self.fill = self.fill.wrapping_add(1);
        Ok(())
    }

    /// Send the next command if nothing is outstanding.
    ///
    /// A command the transport does not accept stays at the head of the queue and is
    /// retried on the next call.
    pub fn drain<T: GattTransport + ?Sized>(&mut self, transport: &mut T) {
        if self.outstanding.is_some() || self.is_empty() {
            return;
        }
        let index = self.send & Self::MASK;
        let Some(pending) = self.slots[index].as_ref() else {
            return;
        };
        match pending.command.send(pending.conn, transport) {
            Ok(()) => {
                trace!(
                    "[ancs queue] sent request to handle {} on conn {}",
                    pending.command.handle(),
                    pending.conn.raw()
                );
                self.outstanding = self.slots[index].take();
                self.send = self.send.wrapping_add(1);
            }
            Err(_) => {
                debug!(
                    "[ancs queue] transport rejected request to handle {}, will retry",
                    pending.command.handle()
                );
            }
        }
    }

    /// Mark the outstanding command as answered and return it.
    pub fn complete(&mut self) -> Option<PendingCommand> {
        let done = self.outstanding.take();
        if done.is_none() {
            trace!("[ancs queue] completion without outstanding request");
        }
        done
    }

    /// Drop every pending command and forget the outstanding one.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.fill = 0;
        self.send = 0;
        self.outstanding = None;
    }
}
