//! UUID types.

/// A 16-bit, 32-bit or 128-bit UUID, stored in little endian byte order.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Uuid {
    /// 16-bit UUID
    Uuid16([u8; 2]),
    /// 32-bit UUID
    Uuid32([u8; 4]),
    /// 128-bit UUID
    Uuid128([u8; 16]),
}

impl From<u128> for Uuid {
    fn from(data: u128) -> Self {
        Uuid::Uuid128(data.to_le_bytes())
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(data: [u8; 16]) -> Self {
        Uuid::Uuid128(data)
    }
}

impl From<[u8; 4]> for Uuid {
    fn from(data: [u8; 4]) -> Self {
        Uuid::Uuid32(data)
    }
}

impl From<u32> for Uuid {
    fn from(data: u32) -> Self {
        Uuid::Uuid32(data.to_le_bytes())
    }
}

impl From<[u8; 2]> for Uuid {
    fn from(data: [u8; 2]) -> Self {
        Uuid::Uuid16(data)
    }
}

impl From<u16> for Uuid {
    fn from(data: u16) -> Self {
        Uuid::Uuid16(data.to_le_bytes())
    }
}

impl Uuid {
    /// Create a new 16-bit UUID.
    pub const fn new_short(val: u16) -> Self {
        Self::Uuid16(val.to_le_bytes())
    }

    /// Create a new 128-bit UUID from little endian bytes.
    pub const fn new_long(val: [u8; 16]) -> Self {
        Self::Uuid128(val)
    }

    /// Create a new 128-bit UUID from its canonical big endian numeric form,
    /// e.g. `0x7905F431_B5CE_4E99_A40F_4B1E122D00D0`.
    pub const fn from_u128(val: u128) -> Self {
        Self::Uuid128(val.to_le_bytes())
    }

    /// Get the UUID type.
    pub fn get_type(&self) -> u8 {
        match self {
            Uuid::Uuid16(_) => 0x01,
            Uuid::Uuid32(_) => 0x02,
            Uuid::Uuid128(_) => 0x03,
        }
    }

    /// Get the raw little endian UUID bytes.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Uuid::Uuid16(uuid) => uuid,
            Uuid::Uuid32(uuid) => uuid,
            Uuid::Uuid128(uuid) => uuid,
        }
    }
}

impl TryFrom<&[u8]> for Uuid {
    type Error = crate::Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value.len() {
            2 => Ok(Uuid::Uuid16([value[0], value[1]])),
            4 => Ok(Uuid::Uuid32([value[0], value[1], value[2], value[3]])),
            16 => {
                let mut bytes = [0; 16];
                bytes.copy_from_slice(value);
                Ok(Uuid::Uuid128(bytes))
            }
            _ => Err(crate::Error::InvalidUuidLength(value.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_uuid_byte_order() {
        let uuid = Uuid::from_u128(0x7905F431_B5CE_4E99_A40F_4B1E122D00D0);
        assert_eq!(
            uuid.as_raw(),
            &[0xd0, 0x00, 0x2d, 0x12, 0x1e, 0x4b, 0x0f, 0xa4, 0x99, 0x4e, 0xce, 0xb5, 0x31, 0xf4, 0x05, 0x79]
        );
        assert_eq!(uuid, Uuid::from(0x7905F431_B5CE_4E99_A40F_4B1E122D00D0_u128));
    }

    #[test]
    fn from_slice() {
        assert_eq!(Uuid::try_from(&[0x0f, 0x18][..]).unwrap(), Uuid::new_short(0x180f));
        assert_eq!(Uuid::try_from(&[0u8; 3][..]), Err(crate::Error::InvalidUuidLength(3)));
    }
}
