//! Events delivered to the application.

use crate::att::AttErrorCode;
use crate::notification::{InvalidNotification, Notification};
use crate::protocol::AttributeKind;

/// An attribute of a notification, completely received.
#[derive(Debug, PartialEq, Eq)]
pub struct AttributeEvent<'a> {
    /// UID of the notification the attribute belongs to.
    pub uid: u32,
    pub kind: AttributeKind,
    /// Attribute content inside the registered buffer. The buffer holds a zero
    /// terminator right after it.
    pub data: &'a [u8],
    /// The provider sent more than the registered length and the tail was dropped.
    pub truncated: bool,
}

impl<'a> AttributeEvent<'a> {
    /// The content as UTF-8, if it is valid.
    ///
    /// A truncated attribute may have been cut inside a multi-byte character, in which case
    /// only the valid prefix is returned.
    pub fn as_str(&self) -> &'a str {
        match core::str::from_utf8(self.data) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&self.data[..e.valid_up_to()]).unwrap_or_default(),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AttributeEvent<'_> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "AttributeEvent {{ uid: {}, kind: {}, len: {}, truncated: {} }}",
            self.uid,
            self.kind,
            self.data.len(),
            self.truncated
        )
    }
}

/// Events produced by an ANCS client.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// The service was found and all characteristics were resolved.
    DiscoveryComplete,
    /// The service was not found on the peer, or is incomplete.
    DiscoveryFailed,
    /// A valid notification arrived on the notification source.
    Notification(Notification),
    /// A notification source packet was rejected.
    InvalidNotification(InvalidNotification),
    /// An attribute of the notification being fetched was received.
    Attribute(AttributeEvent<'a>),
    /// A read queued with [`crate::AncsClient::read`] completed.
    ReadResponse { handle: u16, data: &'a [u8] },
    /// The peer answered a request with an ATT error. If the request was an attribute
    /// fetch, the fetch is aborted.
    RequestFailed { handle: u16, code: AttErrorCode },
}

/// Receiver of client events.
///
/// Events are delivered synchronously from the call that caused them, and borrowed data
/// is only valid for the duration of the call.
pub trait EventHandler {
    fn on_event(&mut self, event: Event<'_>);
}

impl<F> EventHandler for F
where
    F: FnMut(Event<'_>),
{
    fn on_event(&mut self, event: Event<'_>) {
        self(event)
    }
}
