//! Reassembly of Get Notification Attributes responses.
//!
//! The notification provider streams the response on the data source as a sequence of
//! notifications whose boundaries have no relation to the records inside. The parser keeps
//! its position between packets, so the same byte stream produces the same events however
//! it is split.
//!
//! Response layout:
//!
//! ```text
//! command id (1) | uid (4, LE) | { attribute id (1) | length (2, LE) | data (length) }*
//! ```
use core::cmp::min;

use crate::event::{AttributeEvent, Event, EventHandler};
use crate::protocol::{AttributeKind, CommandId};
use crate::registry::AttributeRegistry;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Phase {
    ExpectHeader,
    ExpectUid { received: u8, uid: [u8; 4] },
    ExpectAttributeId,
    ExpectLengthLow { kind: u8 },
    ExpectLengthHigh { kind: u8, low: u8 },
    AccumulateData { kind: AttributeKind, len: u16, offset: u16 },
    Skip { remaining: u16 },
    Done,
}

/// Parse state of one attribute fetch.
pub struct AttributeParser {
    phase: Phase,
    uid: u32,
    expected: u8,
}

impl Default for AttributeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeParser {
    /// Create an idle parser. Data fed before [`AttributeParser::start`] is ignored.
    pub const fn new() -> Self {
        Self {
            phase: Phase::Done,
            uid: 0,
            expected: 0,
        }
    }

    /// Prepare for the response to a fetch of `expected` attributes of notification `uid`.
    pub fn start(&mut self, uid: u32, expected: u8) {
        trace!("[ancs parser] start uid {} expecting {} attributes", uid, expected);
        self.phase = Phase::ExpectHeader;
        self.uid = uid;
        self.expected = expected;
    }

    /// Drop the fetch in progress, if any.
    pub fn abort(&mut self) {
        if self.is_in_progress() {
            debug!("[ancs parser] abort fetch of uid {}", self.uid);
        }
        self.phase = Phase::Done;
    }

    /// Whether a fetch still has attributes to deliver.
    pub fn is_in_progress(&self) -> bool {
        match self.phase {
            Phase::Done => false,
            Phase::ExpectAttributeId => self.expected > 0,
            _ => true,
        }
    }

    /// UID of the notification being fetched.
    pub fn uid(&self) -> u32 {
        self.uid
    }

    /// Consume one data source packet, emitting an event per completed attribute.
    pub fn feed<H: EventHandler + ?Sized>(&mut self, registry: &mut AttributeRegistry<'_>, data: &[u8], handler: &mut H) {
        let mut pos = 0;
        while pos < data.len() {
            let phase = self.phase;
            self.phase = match phase {
                Phase::Done => {
                    trace!("[ancs parser] ignoring {} bytes", data.len() - pos);
                    return;
                }
                Phase::ExpectHeader => {
                    let command = data[pos];
                    pos += 1;
                    if command == CommandId::GetNotificationAttributes as u8 {
                        Phase::ExpectUid {
                            received: 0,
                            uid: [0; 4],
                        }
                    } else {
                        warn!("[ancs parser] unexpected command id {}", command);
                        Phase::Done
                    }
                }
                Phase::ExpectUid { received, mut uid } => {
                    uid[received as usize] = data[pos];
                    pos += 1;
                    let received = received + 1;
                    if (received as usize) < uid.len() {
                        Phase::ExpectUid { received, uid }
                    } else {
                        let uid = u32::from_le_bytes(uid);
                        if uid == self.uid {
                            Phase::ExpectAttributeId
                        } else {
                            warn!("[ancs parser] response for uid {}, expected {}", uid, self.uid);
                            Phase::Done
                        }
                    }
                }
                Phase::ExpectAttributeId => {
                    let kind = data[pos];
                    pos += 1;
                    if self.expected == 0 {
                        trace!("[ancs parser] fetch of uid {} complete", self.uid);
                        Phase::Done
                    } else {
                        self.expected -= 1;
                        Phase::ExpectLengthLow { kind }
                    }
                }
                Phase::ExpectLengthLow { kind } => {
                    let low = data[pos];
                    pos += 1;
                    Phase::ExpectLengthHigh { kind, low }
                }
                Phase::ExpectLengthHigh { kind, low } => {
                    let len = u16::from_le_bytes([low, data[pos]]);
                    pos += 1;
                    self.begin_attribute(registry, kind, len, handler)
                }
                Phase::AccumulateData { kind, len, offset } => {
                    let (next, used) = self.accumulate(registry, kind, len, offset, &data[pos..], handler);
                    pos += used;
                    next
                }
                Phase::Skip { remaining } => {
                    let n = min(remaining as usize, data.len() - pos);
                    pos += n;
                    let remaining = remaining - n as u16;
                    if remaining > 0 {
                        Phase::Skip { remaining }
                    } else {
                        Phase::ExpectAttributeId
                    }
                }
            };
        }
    }

    fn accumulate<H: EventHandler + ?Sized>(
        &self,
        registry: &mut AttributeRegistry<'_>,
        kind: AttributeKind,
        len: u16,
        offset: u16,
        data: &[u8],
        handler: &mut H,
    ) -> (Phase, usize) {
        // Registration is refused while a fetch is in progress, so the entry is still there.
        let Some(entry) = registry.entry_mut(kind) else {
            return (Phase::Skip { remaining: len - offset }, 0);
        };
        let capacity = min(len, entry.max_len);
        let n = min((capacity - offset) as usize, data.len());
        let start = offset as usize;
        entry.buf[start..start + n].copy_from_slice(&data[..n]);
        let offset = offset + n as u16;
        if offset < capacity {
            return (Phase::AccumulateData { kind, len, offset }, n);
        }

        let end = capacity as usize;
        entry.buf[end] = 0;
        let truncated = len > capacity;
        if truncated {
            debug!("[ancs parser] {:?} truncated from {} to {} bytes", kind, len, capacity);
        }
        handler.on_event(Event::Attribute(AttributeEvent {
            uid: self.uid,
            kind,
            data: &entry.buf[..end],
            truncated,
        }));
        let next = if truncated {
            Phase::Skip {
                remaining: len - capacity,
            }
        } else {
            Phase::ExpectAttributeId
        };
        (next, n)
    }

    fn begin_attribute<H: EventHandler + ?Sized>(
        &self,
        registry: &mut AttributeRegistry<'_>,
        kind: u8,
        len: u16,
        handler: &mut H,
    ) -> Phase {
        let registered = AttributeKind::try_from(kind)
            .ok()
            .filter(|kind| registry.is_registered(*kind));
        match registered {
            Some(kind) if len == 0 => {
                if let Some(entry) = registry.entry_mut(kind) {
                    entry.buf[0] = 0;
                    handler.on_event(Event::Attribute(AttributeEvent {
                        uid: self.uid,
                        kind,
                        data: &entry.buf[..0],
                        truncated: false,
                    }));
                }
                Phase::ExpectAttributeId
            }
            Some(kind) => Phase::AccumulateData { kind, len, offset: 0 },
            None if len == 0 => Phase::ExpectAttributeId,
            None => {
                trace!("[ancs parser] skipping attribute {} of {} bytes", kind, len);
                Phase::Skip { remaining: len }
            }
        }
    }
}
