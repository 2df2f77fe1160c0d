//! Apple Notification Center Service client.
//!
//! Decodes notifications announced by an iOS device, fetches their attributes over the
//! control point and data source, and schedules the GATT requests this requires. The crate
//! holds no connection logic: the application forwards link, discovery and ATT events to an
//! [`AncsClient`] and provides a [`GattTransport`] to send requests.
#![cfg_attr(not(test), no_std)]

mod fmt;

mod att;
mod codec;
mod cursor;
pub(crate) mod types;

pub mod config;
pub mod event;
pub mod handles;
pub mod notification;
pub mod parser;
pub mod protocol;
pub mod queue;
pub mod registry;

mod client;
mod clients;

pub use att::{AttErrorCode, AttReq};
pub use bt_hci::param::{BdAddr, ConnHandle};
pub use client::AncsClient;
pub use clients::AncsClients;
pub use event::{AttributeEvent, Event, EventHandler};
pub use handles::{DiscoveredCharacteristic, DiscoveredService, DiscoveryEvent, HandleTable};
pub use notification::{InvalidNotification, Notification};
pub use protocol::{ActionId, AttributeKind, CategoryId, EventFlags, EventId};
pub use queue::GattTransport;
pub use types::uuid::Uuid;

/// Errors returned by the ANCS client.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Attribute length is zero or above [`config::ATTRIBUTE_MAX_LEN`], or a write payload is
    /// too long.
    InvalidLength,
    /// Attribute buffer cannot hold the content and its terminator.
    BufferTooSmall,
    /// Notification has an unknown event id or category.
    InvalidFormat,
    /// An attribute fetch is already in progress.
    Busy,
    /// The outbound command queue is full.
    QueueFull,
    /// The ANCS service has not been discovered on the connection.
    NotDiscovered,
    /// The client has no connection.
    NotConnected,
    /// No attribute is registered, there is nothing to fetch.
    NoAttributes,
    /// Every client slot is in use.
    ConnectionLimitReached,
    /// A UUID must be 2, 4 or 16 bytes long.
    InvalidUuidLength(usize),
    Codec(codec::Error),
}

impl From<codec::Error> for Error {
    fn from(error: codec::Error) -> Self {
        Self::Codec(error)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidLength => f.write_str("invalid length"),
            Self::BufferTooSmall => f.write_str("buffer too small"),
            Self::InvalidFormat => f.write_str("invalid notification format"),
            Self::Busy => f.write_str("attribute fetch in progress"),
            Self::QueueFull => f.write_str("command queue full"),
            Self::NotDiscovered => f.write_str("service not discovered"),
            Self::NotConnected => f.write_str("not connected"),
            Self::NoAttributes => f.write_str("no attributes registered"),
            Self::ConnectionLimitReached => f.write_str("connection limit reached"),
            Self::InvalidUuidLength(len) => write!(f, "invalid uuid length {}", len),
            Self::Codec(codec::Error::InsufficientSpace) => f.write_str("codec: insufficient space"),
            Self::Codec(codec::Error::InvalidValue) => f.write_str("codec: invalid value"),
        }
    }
}
