//! Notification Source decoding.

use crate::cursor::ReadCursor;
use crate::protocol::{CategoryId, EventFlags, EventId, NOTIFICATION_DATA_LENGTH};

/// A notification announced by the notification provider.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Notification {
    pub event_id: EventId,
    pub flags: EventFlags,
    pub category_id: CategoryId,
    pub category_count: u8,
    pub uid: u32,
}

/// Why a notification source packet was rejected.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InvalidNotification {
    /// The packet was not [`NOTIFICATION_DATA_LENGTH`] bytes long. Nothing was decoded.
    Length(usize),
    /// The event id or category id is outside the known values. The decoded record is
    /// kept so the application can inspect it.
    OutOfRange(Notification),
}

impl Notification {
    /// Decode a notification source packet.
    pub fn decode(data: &[u8]) -> Result<Self, InvalidNotification> {
        if data.len() != NOTIFICATION_DATA_LENGTH {
            return Err(InvalidNotification::Length(data.len()));
        }

        let notification =
            Self::decode_fields(&mut ReadCursor::new(data)).map_err(|_| InvalidNotification::Length(data.len()))?;
        if notification.is_valid_format() {
            Ok(notification)
        } else {
            Err(InvalidNotification::OutOfRange(notification))
        }
    }

    fn decode_fields(r: &mut ReadCursor<'_>) -> Result<Self, crate::codec::Error> {
        let event_id: u8 = r.read()?;
        let flags: u8 = r.read()?;
        let category_id: u8 = r.read()?;
        let category_count: u8 = r.read()?;
        let uid: u32 = r.read()?;
        Ok(Self {
            event_id: EventId::new(event_id),
            flags: EventFlags::from_bits(flags),
            category_id: CategoryId::new(category_id),
            category_count,
            uid,
        })
    }

    /// Whether event id and category id are both known values.
    pub fn is_valid_format(&self) -> bool {
        self.event_id.is_known() && self.category_id.is_known()
    }
}
