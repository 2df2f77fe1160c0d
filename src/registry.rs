//! Attribute registry.
//!
//! The application decides which notification attributes are fetched, and provides the
//! buffers they are decoded into.

use heapless::Vec;

use crate::config::ATTRIBUTE_MAX_LEN;
use crate::cursor::WriteCursor;
use crate::protocol::{AttributeKind, CommandId, WRITE_MESSAGE_LENGTH};
use crate::Error;

pub(crate) struct Entry<'d> {
    pub(crate) max_len: u16,
    pub(crate) buf: &'d mut [u8],
}

/// Table of attributes to fetch, one slot per [`AttributeKind`].
pub struct AttributeRegistry<'d> {
    entries: [Option<Entry<'d>>; AttributeKind::COUNT],
}

impl Default for AttributeRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d> AttributeRegistry<'d> {
    pub fn new() -> Self {
        Self {
            entries: core::array::from_fn(|_| None),
        }
    }

    /// Request `kind` on every fetch, decoding at most `max_len` bytes into `buf`.
    ///
    /// `max_len` must be in `1..=ATTRIBUTE_MAX_LEN` and `buf` must have room for the
    /// content plus a terminator. Registering a kind again replaces the previous buffer.
    pub fn register(&mut self, kind: AttributeKind, buf: &'d mut [u8], max_len: u16) -> Result<(), Error> {
        if max_len == 0 || max_len as usize > ATTRIBUTE_MAX_LEN {
            return Err(Error::InvalidLength);
        }
        if buf.len() < max_len as usize + 1 {
            return Err(Error::BufferTooSmall);
        }
        trace!("[ancs registry] register {:?} max_len {}", kind, max_len);
        self.entries[kind.index()] = Some(Entry { max_len, buf });
        Ok(())
    }

    pub fn is_registered(&self, kind: AttributeKind) -> bool {
        self.entries[kind.index()].is_some()
    }

    /// Registered length of `kind`.
    pub fn max_len(&self, kind: AttributeKind) -> Option<u16> {
        self.entries[kind.index()].as_ref().map(|e| e.max_len)
    }

    /// Registered kinds with their lengths, in wire order.
    pub fn registered(&self) -> impl Iterator<Item = (AttributeKind, u16)> + '_ {
        AttributeKind::ALL
            .into_iter()
            .zip(self.entries.iter())
            .filter_map(|(kind, entry)| entry.as_ref().map(|e| (kind, e.max_len)))
    }

    pub(crate) fn entry_mut(&mut self, kind: AttributeKind) -> Option<&mut Entry<'d>> {
        self.entries[kind.index()].as_mut()
    }

    /// Build a Get Notification Attributes command for `uid`.
    ///
    /// Returns the command and the number of attributes requested.
    pub fn get_notification_attributes(&self, uid: u32) -> Result<(Vec<u8, WRITE_MESSAGE_LENGTH>, u8), Error> {
        let mut buf = [0; WRITE_MESSAGE_LENGTH];
        let mut w = WriteCursor::new(&mut buf);
        w.write(CommandId::GetNotificationAttributes as u8)?;
        w.write(uid)?;

        let mut count = 0;
        for (kind, max_len) in self.registered() {
            w.write(kind as u8)?;
            if kind.has_max_len() {
                w.write(max_len)?;
            }
            count += 1;
        }

        let data = Vec::from_slice(w.finish()).map_err(|_| Error::Codec(crate::codec::Error::InsufficientSpace))?;
        Ok((data, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_invalid_lengths() {
        let mut a = [0u8; 512];
        let mut b = [0u8; 512];
        let mut registry = AttributeRegistry::new();
        assert_eq!(
            registry.register(AttributeKind::Title, &mut a, 0),
            Err(Error::InvalidLength)
        );
        assert_eq!(
            registry.register(AttributeKind::Title, &mut b, ATTRIBUTE_MAX_LEN as u16 + 1),
            Err(Error::InvalidLength)
        );
        assert!(!registry.is_registered(AttributeKind::Title));
    }

    #[test]
    fn reject_short_buffer() {
        let mut buf = [0u8; 16];
        let mut registry = AttributeRegistry::new();
        assert_eq!(
            registry.register(AttributeKind::Message, &mut buf, 16),
            Err(Error::BufferTooSmall)
        );
    }

    #[test]
    fn command_encoding() {
        let mut app = [0u8; 17];
        let mut title = [0u8; 17];
        let mut date = [0u8; 16];
        let mut registry = AttributeRegistry::new();
        registry.register(AttributeKind::Title, &mut title, 16).unwrap();
        registry.register(AttributeKind::AppIdentifier, &mut app, 16).unwrap();
        registry.register(AttributeKind::Date, &mut date, 15).unwrap();

        let (data, count) = registry.get_notification_attributes(0x0403_0201).unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            &data[..],
            &[0x00, 0x01, 0x02, 0x03, 0x04, 0x00, 0x01, 0x10, 0x00, 0x05]
        );
    }

    #[test]
    fn command_with_every_attribute_fits() {
        let mut storage = [[0u8; ATTRIBUTE_MAX_LEN + 1]; AttributeKind::COUNT];
        let mut registry = AttributeRegistry::new();
        for (kind, buf) in AttributeKind::ALL.into_iter().zip(storage.iter_mut()) {
            registry.register(kind, buf, ATTRIBUTE_MAX_LEN as u16).unwrap();
        }

        let (data, count) = registry.get_notification_attributes(7).unwrap();
        assert_eq!(count, AttributeKind::COUNT as u8);
        assert_eq!(data.len(), 5 + AttributeKind::COUNT + 3 * 2);
    }
}
