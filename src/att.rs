use core::fmt::Display;
use core::mem;

use crate::codec;
use crate::cursor::{ReadCursor, WriteCursor};

pub(crate) const ATT_ERROR_RSP: u8 = 0x01;
pub(crate) const ATT_READ_REQ: u8 = 0x0a;
pub(crate) const ATT_READ_RSP: u8 = 0x0b;
pub(crate) const ATT_WRITE_REQ: u8 = 0x12;
pub(crate) const ATT_WRITE_RSP: u8 = 0x13;
pub(crate) const ATT_HANDLE_VALUE_NTF: u8 = 0x1b;

/// Attribute Error Code
///
/// This type describes the error code of an `ATT_ERROR_RSP` PDU, including the
/// application error codes the notification provider uses on the control point.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AttErrorCode {
    value: u8,
}

impl AttErrorCode {
    /// Attempted to use a handle that isn't valid on this server
    pub const INVALID_HANDLE: Self = Self { value: 0x01 };
    /// The attribute cannot be read
    pub const READ_NOT_PERMITTED: Self = Self { value: 0x02 };
    /// The attribute cannot be written
    pub const WRITE_NOT_PERMITTED: Self = Self { value: 0x03 };
    /// The attribute PDU was invalid
    pub const INVALID_PDU: Self = Self { value: 0x04 };
    /// The attribute requires authentication before it can be read or written
    pub const INSUFFICIENT_AUTHENTICATION: Self = Self { value: 0x05 };
    /// ATT Server does not support the request received from the client
    pub const REQUEST_NOT_SUPPORTED: Self = Self { value: 0x06 };
    /// The attribute value length is invalid for the operation
    pub const INVALID_ATTRIBUTE_VALUE_LENGTH: Self = Self { value: 0x0d };
    /// The request had encountered an error that was unlikely, and therefore could not be completed
    pub const UNLIKELY_ERROR: Self = Self { value: 0x0e };
    /// The attribute requires encryption before it can be read or written
    pub const INSUFFICIENT_ENCRYPTION: Self = Self { value: 0x0f };
    /// The commandID written to the control point was not recognized
    pub const UNKNOWN_COMMAND: Self = Self { value: 0xa0 };
    /// The command written to the control point was improperly formatted
    pub const INVALID_COMMAND: Self = Self { value: 0xa1 };
    /// One of the parameters (for example the NotificationUID) does not refer to an existing object
    pub const INVALID_PARAMETER: Self = Self { value: 0xa2 };
    /// The action was not performed
    pub const ACTION_FAILED: Self = Self { value: 0xa3 };

    /// Create an error code from its raw value.
    pub const fn new(value: u8) -> Self {
        Self { value }
    }

    /// The raw error code.
    pub const fn value(&self) -> u8 {
        self.value
    }
}

impl Display for AttErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            &Self::INVALID_HANDLE => {
                f.write_str("invalid handle: Attempted to use a handle that isn't valid on this server")
            }
            &Self::READ_NOT_PERMITTED => f.write_str("read not permitted: the attribute cannot be read"),
            &Self::WRITE_NOT_PERMITTED => f.write_str("write not permitted: the attribute cannot be written"),
            &Self::INVALID_PDU => f.write_str("invalid pdu: the attribute PDU was invalid"),
            &Self::INSUFFICIENT_AUTHENTICATION => f.write_str(
                "insufficient authentication: the attribute requires authentication before it can be written",
            ),
            &Self::REQUEST_NOT_SUPPORTED => {
                f.write_str("request not supported: ATT server does not support the request received from the client")
            }
            &Self::INVALID_ATTRIBUTE_VALUE_LENGTH => f.write_str("invalid attribute value length: the attribute value length is invalid for the operation"),
            &Self::UNLIKELY_ERROR => f.write_str("unlikely error: the attribute request encountered an error that was unlikely, and therefore could not be completed"),
            &Self::INSUFFICIENT_ENCRYPTION => f.write_str("insufficient encryption: the attribute requires encryption before it can be read or written"),
            &Self::UNKNOWN_COMMAND => f.write_str("unknown command: the command id was not recognized by the notification provider"),
            &Self::INVALID_COMMAND => f.write_str("invalid command: the command was improperly formatted"),
            &Self::INVALID_PARAMETER => f.write_str("invalid parameter: a parameter does not refer to an existing object on the notification provider"),
            &Self::ACTION_FAILED => f.write_str("action failed: the notification provider did not perform the action"),
            other => write!(f, "unknown error code {}: check the most recent bluetooth spec and the documentation of the device which produced the error code", other.value),
        }
    }
}

impl codec::Encode for AttErrorCode {
    fn encode(&self, dest: &mut [u8]) -> Result<(), codec::Error> {
        dest[0] = self.value;
        Ok(())
    }
}

impl codec::Decode<'_> for AttErrorCode {
    fn decode(src: &[u8]) -> Result<Self, codec::Error> {
        let value: u8 = codec::Decode::decode(src)?;
        Ok(Self { value })
    }
}

impl codec::Type for AttErrorCode {
    fn size(&self) -> usize {
        mem::size_of::<u8>()
    }
}

/// Requests a client sends to the notification provider.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum AttReq<'d> {
    Read { handle: u16 },
    Write { handle: u16, data: &'d [u8] },
}

/// Responses the notification provider sends back.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum AttRsp<'d> {
    Error { request: u8, handle: u16, code: AttErrorCode },
    Read { data: &'d [u8] },
    Write,
}

/// A decoded ATT PDU as seen by the client.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum Att<'d> {
    Req(AttReq<'d>),
    Rsp(AttRsp<'d>),
    Notify { handle: u16, data: &'d [u8] },
}

impl<'d> Att<'d> {
    pub fn decode(data: &'d [u8]) -> Result<Att<'d>, codec::Error> {
        let mut r = ReadCursor::new(data);
        let opcode: u8 = r.read()?;
        if opcode == ATT_HANDLE_VALUE_NTF {
            let handle: u16 = r.read()?;
            Ok(Att::Notify {
                handle,
                data: r.remaining(),
            })
        } else if opcode % 2 == 0 {
            let req = AttReq::decode_with_opcode(opcode, r)?;
            Ok(Att::Req(req))
        } else {
            let rsp = AttRsp::decode_with_opcode(opcode, r)?;
            Ok(Att::Rsp(rsp))
        }
    }
}

impl<'d> AttRsp<'d> {
    pub fn decode_with_opcode(opcode: u8, mut r: ReadCursor<'d>) -> Result<AttRsp<'d>, codec::Error> {
        match opcode {
            ATT_ERROR_RSP => {
                let request = r.read()?;
                let handle = r.read()?;
                let code = r.read()?;
                Ok(Self::Error { request, handle, code })
            }
            ATT_READ_RSP => Ok(Self::Read { data: r.remaining() }),
            ATT_WRITE_RSP => Ok(Self::Write),
            code => {
                trace!("[att] unhandled response opcode {:x}", code);
                Err(codec::Error::InvalidValue)
            }
        }
    }
}

impl codec::Type for AttReq<'_> {
    fn size(&self) -> usize {
        AttReq::size(self)
    }
}

impl codec::Encode for AttReq<'_> {
    fn encode(&self, dest: &mut [u8]) -> Result<(), codec::Error> {
        AttReq::encode(self, dest)
    }
}

impl<'d> AttReq<'d> {
    pub fn size(&self) -> usize {
        1 + match self {
            Self::Read { .. } => 2,
            Self::Write { data, .. } => 2 + data.len(),
        }
    }

    pub fn encode(&self, dest: &mut [u8]) -> Result<(), codec::Error> {
        let mut w = WriteCursor::new(dest);
        match self {
            Self::Read { handle } => {
                w.write(ATT_READ_REQ)?;
                w.write(*handle)?;
            }
            Self::Write { handle, data } => {
                w.write(ATT_WRITE_REQ)?;
                w.write(*handle)?;
                w.append(data)?;
            }
        }
        Ok(())
    }

    pub fn decode_with_opcode(opcode: u8, mut r: ReadCursor<'d>) -> Result<AttReq<'d>, codec::Error> {
        match opcode {
            ATT_READ_REQ => {
                let handle = r.read()?;
                Ok(Self::Read { handle })
            }
            ATT_WRITE_REQ => {
                let handle = r.read()?;
                Ok(Self::Write {
                    handle,
                    data: r.remaining(),
                })
            }
            code => {
                warn!("[att] unknown opcode {:x}", code);
                Err(codec::Error::InvalidValue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_write_request() {
        let mut buf = [0u8; 8];
        let req = AttReq::Write {
            handle: 0x002a,
            data: &[0x01, 0x00],
        };
        assert_eq!(req.size(), 5);
        req.encode(&mut buf).unwrap();
        assert_eq!(&buf[..5], &[ATT_WRITE_REQ, 0x2a, 0x00, 0x01, 0x00]);
        assert_eq!(Att::decode(&buf[..5]).unwrap(), Att::Req(req));
    }

    #[test]
    fn encode_into_short_buffer() {
        let mut buf = [0u8; 2];
        let req = AttReq::Read { handle: 0x0010 };
        assert_eq!(req.encode(&mut buf), Err(codec::Error::InsufficientSpace));
    }

    #[test]
    fn decode_notification() {
        let pdu = [ATT_HANDLE_VALUE_NTF, 0x0e, 0x00, 0xaa, 0xbb];
        assert_eq!(
            Att::decode(&pdu).unwrap(),
            Att::Notify {
                handle: 0x000e,
                data: &[0xaa, 0xbb]
            }
        );
    }

    #[test]
    fn decode_error_response() {
        let pdu = [ATT_ERROR_RSP, ATT_WRITE_REQ, 0x20, 0x00, 0xa2];
        assert_eq!(
            Att::decode(&pdu).unwrap(),
            Att::Rsp(AttRsp::Error {
                request: ATT_WRITE_REQ,
                handle: 0x0020,
                code: AttErrorCode::INVALID_PARAMETER,
            })
        );
    }

    #[test]
    fn decode_truncated_error_response() {
        let pdu = [ATT_ERROR_RSP, ATT_WRITE_REQ, 0x20];
        assert_eq!(Att::decode(&pdu), Err(codec::Error::InsufficientSpace));
    }
}
