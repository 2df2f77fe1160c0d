//! ANCS wire constants and identifiers.
//!
//! Identifiers that arrive from the notification provider ([`EventId`], [`CategoryId`]) are
//! open: a newer provider may send values this crate does not know, and a decoded
//! notification must still be able to carry them. Identifiers the client sends are closed
//! enums.

use crate::types::uuid::Uuid;

/// Apple Notification Center Service.
pub const ANCS_SERVICE_UUID: Uuid = Uuid::from_u128(0x7905F431_B5CE_4E99_A40F_4B1E122D00D0);

/// Control Point characteristic, where commands are written.
pub const CONTROL_POINT_UUID: Uuid = Uuid::from_u128(0x69D1D8F3_45E1_49A8_9821_9BBDFDAAD9D9);

/// Notification Source characteristic, which announces added, modified and removed notifications.
pub const NOTIFICATION_SOURCE_UUID: Uuid = Uuid::from_u128(0x9FBF120D_6301_42D9_8C58_25E699A21DBD);

/// Data Source characteristic, which streams responses to control point commands.
pub const DATA_SOURCE_UUID: Uuid = Uuid::from_u128(0x22EAC6E9_24D6_4BB5_BE44_B36ACE7C7BFB);

/// Length of a Notification Source packet.
pub const NOTIFICATION_DATA_LENGTH: usize = 8;

/// Largest write the client issues (CCCD or control point).
pub const WRITE_MESSAGE_LENGTH: usize = 20;

pub(crate) const CCCD_NOTIFY: u16 = 0x0001;
pub(crate) const CCCD_DISABLED: u16 = 0x0000;

/// Kind of change announced by the notification source.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct EventId(u8);

impl EventId {
    /// A notification was added.
    pub const ADDED: Self = Self(0);
    /// A notification was modified.
    pub const MODIFIED: Self = Self(1);
    /// A notification was removed.
    pub const REMOVED: Self = Self(2);

    const COUNT: u8 = 3;

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u8 {
        self.0
    }

    /// Whether the value is one of the defined event ids.
    pub const fn is_known(&self) -> bool {
        self.0 < Self::COUNT
    }
}

/// Category of a notification.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CategoryId(u8);

impl CategoryId {
    pub const OTHER: Self = Self(0);
    pub const INCOMING_CALL: Self = Self(1);
    pub const MISSED_CALL: Self = Self(2);
    pub const VOICEMAIL: Self = Self(3);
    pub const SOCIAL: Self = Self(4);
    pub const SCHEDULE: Self = Self(5);
    pub const EMAIL: Self = Self(6);
    pub const NEWS: Self = Self(7);
    pub const HEALTH_AND_FITNESS: Self = Self(8);
    pub const BUSINESS_AND_FINANCE: Self = Self(9);
    pub const LOCATION: Self = Self(10);
    pub const ENTERTAINMENT: Self = Self(11);

    const COUNT: u8 = 12;

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u8 {
        self.0
    }

    /// Whether the value is one of the defined categories.
    pub const fn is_known(&self) -> bool {
        self.0 < Self::COUNT
    }
}

/// Flags attached to a notification.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct EventFlags {
    pub silent: bool,
    pub important: bool,
    pub pre_existing: bool,
    pub positive_action: bool,
    pub negative_action: bool,
}

impl EventFlags {
    const SILENT: u8 = 0;
    const IMPORTANT: u8 = 1;
    const PRE_EXISTING: u8 = 2;
    const POSITIVE_ACTION: u8 = 3;
    const NEGATIVE_ACTION: u8 = 4;

    /// Unpack the flags byte. Bits above the defined flags are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            silent: (bits >> Self::SILENT) & 0x01 != 0,
            important: (bits >> Self::IMPORTANT) & 0x01 != 0,
            pre_existing: (bits >> Self::PRE_EXISTING) & 0x01 != 0,
            positive_action: (bits >> Self::POSITIVE_ACTION) & 0x01 != 0,
            negative_action: (bits >> Self::NEGATIVE_ACTION) & 0x01 != 0,
        }
    }

    pub const fn bits(&self) -> u8 {
        (self.silent as u8) << Self::SILENT
            | (self.important as u8) << Self::IMPORTANT
            | (self.pre_existing as u8) << Self::PRE_EXISTING
            | (self.positive_action as u8) << Self::POSITIVE_ACTION
            | (self.negative_action as u8) << Self::NEGATIVE_ACTION
    }
}

/// Commands written to the control point.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum CommandId {
    GetNotificationAttributes = 0,
    GetAppAttributes = 1,
    PerformNotificationAction = 2,
}

/// Notification attributes that can be fetched from the provider.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum AttributeKind {
    AppIdentifier = 0,
    Title = 1,
    Subtitle = 2,
    Message = 3,
    MessageSize = 4,
    Date = 5,
    PositiveActionLabel = 6,
    NegativeActionLabel = 7,
}

impl AttributeKind {
    /// Number of attribute kinds.
    pub const COUNT: usize = 8;

    /// All kinds, in wire order.
    pub const ALL: [AttributeKind; Self::COUNT] = [
        Self::AppIdentifier,
        Self::Title,
        Self::Subtitle,
        Self::Message,
        Self::MessageSize,
        Self::Date,
        Self::PositiveActionLabel,
        Self::NegativeActionLabel,
    ];

    /// Whether the fetch command carries a maximum length for this kind.
    pub const fn has_max_len(&self) -> bool {
        matches!(self, Self::Title | Self::Subtitle | Self::Message)
    }

    pub(crate) const fn index(&self) -> usize {
        *self as usize
    }
}

impl TryFrom<u8> for AttributeKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(value as usize).copied().ok_or(value)
    }
}

/// Action performed on a notification with [`CommandId::PerformNotificationAction`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum ActionId {
    Positive = 0,
    Negative = 1,
}
