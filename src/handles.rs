//! ANCS handle table and the discovery results it is built from.
use crate::protocol::{ANCS_SERVICE_UUID, CONTROL_POINT_UUID, DATA_SOURCE_UUID, NOTIFICATION_SOURCE_UUID};
use crate::types::uuid::Uuid;

/// Characteristic properties
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CharacteristicProp {
    /// Broadcast
    Broadcast = 0x01,
    /// Read
    Read = 0x02,
    /// Write without response
    WriteWithoutResponse = 0x04,
    /// Write
    Write = 0x08,
    /// Notify
    Notify = 0x10,
    /// Indicate
    Indicate = 0x20,
    /// Authenticated writes
    AuthenticatedWrite = 0x40,
    /// Extended properties
    Extended = 0x80,
}

/// Properties of a characteristic, as found in its declaration.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharacteristicProps(u8);

impl<'a> From<&'a [CharacteristicProp]> for CharacteristicProps {
    fn from(props: &'a [CharacteristicProp]) -> Self {
        let mut val: u8 = 0;
        for prop in props {
            val |= *prop as u8;
        }
        CharacteristicProps(val)
    }
}

impl<const T: usize> From<[CharacteristicProp; T]> for CharacteristicProps {
    fn from(props: [CharacteristicProp; T]) -> Self {
        Self::from(&props[..])
    }
}

impl From<u8> for CharacteristicProps {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl CharacteristicProps {
    /// Check if any of the properties are set.
    pub fn any(&self, props: &[CharacteristicProp]) -> bool {
        props.iter().any(|p| (*p as u8) & self.0 != 0)
    }

    pub fn raw(&self) -> u8 {
        self.0
    }
}

/// A characteristic as reported by the discovery procedure.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveredCharacteristic {
    pub uuid: Uuid,
    pub props: CharacteristicProps,
    pub decl_handle: u16,
    pub value_handle: u16,
    /// Client characteristic configuration descriptor, if the characteristic has one.
    pub cccd_handle: Option<u16>,
}

/// A primary service as reported by the discovery procedure.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveredService<'a> {
    pub uuid: Uuid,
    pub start: u16,
    pub end: u16,
    pub characteristics: &'a [DiscoveredCharacteristic],
}

/// Outcome of service discovery on a connection.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryEvent<'a> {
    Complete(DiscoveredService<'a>),
    Failed,
}

/// Handles of one ANCS characteristic. Handle 0 means absent.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicHandles {
    pub uuid: Uuid,
    pub props: CharacteristicProps,
    pub decl_handle: u16,
    pub value_handle: u16,
    pub cccd_handle: u16,
}

impl CharacteristicHandles {
    fn find(service: &DiscoveredService<'_>, uuid: &Uuid) -> Option<Self> {
        service.characteristics.iter().find(|c| &c.uuid == uuid).map(|c| Self {
            uuid: c.uuid,
            props: c.props,
            decl_handle: c.decl_handle,
            value_handle: c.value_handle,
            cccd_handle: c.cccd_handle.unwrap_or(0),
        })
    }
}

/// Handles of the ANCS service on a peer.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleTable {
    pub start: u16,
    pub end: u16,
    pub control_point: CharacteristicHandles,
    pub notification_source: CharacteristicHandles,
    pub data_source: CharacteristicHandles,
}

impl HandleTable {
    /// Build the table from a discovered service.
    ///
    /// Returns `None` if the service is not ANCS, if a characteristic is missing, or if the
    /// notification source or data source cannot be subscribed to.
    pub fn from_discovery(service: &DiscoveredService<'_>) -> Option<Self> {
        if service.uuid != ANCS_SERVICE_UUID {
            return None;
        }
        let control_point = CharacteristicHandles::find(service, &CONTROL_POINT_UUID)?;
        let notification_source = CharacteristicHandles::find(service, &NOTIFICATION_SOURCE_UUID)?;
        let data_source = CharacteristicHandles::find(service, &DATA_SOURCE_UUID)?;
        if notification_source.cccd_handle == 0 || data_source.cccd_handle == 0 {
            return None;
        }
        Some(Self {
            start: service.start,
            end: service.end,
            control_point,
            notification_source,
            data_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn characteristic(uuid: Uuid, base: u16, cccd: bool) -> DiscoveredCharacteristic {
        DiscoveredCharacteristic {
            uuid,
            props: [CharacteristicProp::Notify].into(),
            decl_handle: base,
            value_handle: base + 1,
            cccd_handle: cccd.then_some(base + 2),
        }
    }

    #[test]
    fn resolve_all_characteristics() {
        let chars = [
            characteristic(NOTIFICATION_SOURCE_UUID, 0x10, true),
            characteristic(CONTROL_POINT_UUID, 0x13, false),
            characteristic(DATA_SOURCE_UUID, 0x15, true),
        ];
        let service = DiscoveredService {
            uuid: ANCS_SERVICE_UUID,
            start: 0x0f,
            end: 0x17,
            characteristics: &chars,
        };
        let table = HandleTable::from_discovery(&service).unwrap();
        assert_eq!(table.start, 0x0f);
        assert_eq!(table.notification_source.value_handle, 0x11);
        assert_eq!(table.notification_source.cccd_handle, 0x12);
        assert_eq!(table.control_point.value_handle, 0x14);
        assert_eq!(table.control_point.cccd_handle, 0);
        assert_eq!(table.data_source.cccd_handle, 0x17);
        assert!(table.data_source.props.any(&[CharacteristicProp::Notify]));
    }

    #[test]
    fn incomplete_service() {
        let chars = [
            characteristic(NOTIFICATION_SOURCE_UUID, 0x10, true),
            characteristic(DATA_SOURCE_UUID, 0x15, true),
        ];
        let service = DiscoveredService {
            uuid: ANCS_SERVICE_UUID,
            start: 0x0f,
            end: 0x17,
            characteristics: &chars,
        };
        assert_eq!(HandleTable::from_discovery(&service), None);

        let chars = [
            characteristic(NOTIFICATION_SOURCE_UUID, 0x10, true),
            characteristic(CONTROL_POINT_UUID, 0x13, false),
            characteristic(DATA_SOURCE_UUID, 0x15, false),
        ];
        let service = DiscoveredService {
            characteristics: &chars,
            ..service
        };
        assert_eq!(HandleTable::from_discovery(&service), None);
    }

    #[test]
    fn other_service() {
        let service = DiscoveredService {
            uuid: Uuid::new_short(0x180f),
            start: 1,
            end: 5,
            characteristics: &[],
        };
        assert_eq!(HandleTable::from_discovery(&service), None);
    }
}
