use crate::codec::{Decode, Encode, Error, FixedSize};

//
// Implementations for primitives
//
impl FixedSize for u8 {
    const SIZE: usize = 1;
}

impl FixedSize for u16 {
    const SIZE: usize = 2;
}

impl FixedSize for u32 {
    const SIZE: usize = 4;
}

impl Decode<'_> for u8 {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        match src {
            [b, ..] => Ok(*b),
            _ => Err(Error::InsufficientSpace),
        }
    }
}

impl Decode<'_> for u16 {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        match src {
            [b0, b1, ..] => Ok(u16::from_le_bytes([*b0, *b1])),
            _ => Err(Error::InsufficientSpace),
        }
    }
}

impl Decode<'_> for u32 {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        match src {
            [b0, b1, b2, b3, ..] => Ok(u32::from_le_bytes([*b0, *b1, *b2, *b3])),
            _ => Err(Error::InsufficientSpace),
        }
    }
}

impl Encode for u8 {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest[0] = *self;
        Ok(())
    }
}

impl Encode for u16 {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest.copy_from_slice(&self.to_le_bytes()[..]);
        Ok(())
    }
}

impl Encode for u32 {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest.copy_from_slice(&self.to_le_bytes()[..]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_short_input() {
        assert_eq!(u8::decode(&[]), Err(Error::InsufficientSpace));
        assert_eq!(u16::decode(&[0x01]), Err(Error::InsufficientSpace));
        assert_eq!(u32::decode(&[0x01, 0x02, 0x03]), Err(Error::InsufficientSpace));
    }

    #[test]
    fn decode_little_endian() {
        assert_eq!(u16::decode(&[0x34, 0x12]), Ok(0x1234));
        assert_eq!(u32::decode(&[0x78, 0x56, 0x34, 0x12, 0xff]), Ok(0x1234_5678));
    }
}
