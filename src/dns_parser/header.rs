use byteorder::{BigEndian, ByteOrder};

use super::{Error, Opcode, ResponseCode};

mod flag {
    pub const RESPONSE: u16 = 0b1000_0000_0000_0000;
    pub const OPCODE_MASK: u16 = 0b0111_1000_0000_0000;
    pub const AUTHORITATIVE: u16 = 0b0000_0100_0000_0000;
    pub const TRUNCATED: u16 = 0b0000_0010_0000_0000;
    pub const RECURSION_DESIRED: u16 = 0b0000_0001_0000_0000;
    pub const RECURSION_AVAILABLE: u16 = 0b0000_0000_1000_0000;
    pub const RESERVED_MASK: u16 = 0b0000_0000_0111_0000;
    pub const RESPONSE_CODE_MASK: u16 = 0b0000_0000_0000_1111;
}

/// Represents parsed header of the packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    /// The QR bit, set on responses
    pub response: bool,
    pub opcode: Opcode,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    /// The three `Z` bits, zero when sending, kept as received otherwise
    pub reserved: u8,
    pub response_code: ResponseCode,
    pub questions: u16,
    pub answers: u16,
    pub nameservers: u16,
    pub additional: u16,
}

impl Header {
    pub const SIZE: usize = 12;

    /// Header of a standard recursive query carrying a single question
    pub fn query(id: u16) -> Header {
        Header {
            id: id,
            response: false,
            opcode: Opcode::StandardQuery,
            authoritative: false,
            truncated: false,
            recursion_desired: true,
            recursion_available: false,
            reserved: 0,
            response_code: ResponseCode::NoError,
            questions: 1,
            answers: 0,
            nameservers: 0,
            additional: 0,
        }
    }

    pub fn parse(data: &[u8]) -> Result<Header, Error> {
        if data.len() < Header::SIZE {
            return Err(Error::MalformedMessage("packet is smaller than header size"));
        }
        let flags = BigEndian::read_u16(&data[2..4]);
        Ok(Header {
            id: BigEndian::read_u16(&data[..2]),
            response: flags & flag::RESPONSE != 0,
            opcode: Opcode::from(((flags & flag::OPCODE_MASK) >> 11) as u8),
            authoritative: flags & flag::AUTHORITATIVE != 0,
            truncated: flags & flag::TRUNCATED != 0,
            recursion_desired: flags & flag::RECURSION_DESIRED != 0,
            recursion_available: flags & flag::RECURSION_AVAILABLE != 0,
            reserved: ((flags & flag::RESERVED_MASK) >> 4) as u8,
            response_code: ResponseCode::from((flags & flag::RESPONSE_CODE_MASK) as u8),
            questions: BigEndian::read_u16(&data[4..6]),
            answers: BigEndian::read_u16(&data[6..8]),
            nameservers: BigEndian::read_u16(&data[8..10]),
            additional: BigEndian::read_u16(&data[10..12]),
        })
    }

    /// Write a header to a buffer slice
    ///
    /// # Panics
    ///
    /// When buffer size is not exactly 12 bytes
    pub fn write(&self, data: &mut [u8]) {
        if data.len() != Header::SIZE {
            panic!("Header size is exactly 12 bytes");
        }
        let mut flags = 0u16;
        flags |= (u16::from(u8::from(self.opcode)) << 11) & flag::OPCODE_MASK;
        flags |= (u16::from(self.reserved) << 4) & flag::RESERVED_MASK;
        flags |= u16::from(u8::from(self.response_code)) & flag::RESPONSE_CODE_MASK;
        if self.response {
            flags |= flag::RESPONSE;
        }
        if self.authoritative {
            flags |= flag::AUTHORITATIVE;
        }
        if self.truncated {
            flags |= flag::TRUNCATED;
        }
        if self.recursion_desired {
            flags |= flag::RECURSION_DESIRED;
        }
        if self.recursion_available {
            flags |= flag::RECURSION_AVAILABLE;
        }
        BigEndian::write_u16(&mut data[..2], self.id);
        BigEndian::write_u16(&mut data[2..4], flags);
        BigEndian::write_u16(&mut data[4..6], self.questions);
        BigEndian::write_u16(&mut data[6..8], self.answers);
        BigEndian::write_u16(&mut data[8..10], self.nameservers);
        BigEndian::write_u16(&mut data[10..12], self.additional);
    }

    pub fn to_bytes(&self) -> [u8; Header::SIZE] {
        let mut data = [0u8; Header::SIZE];
        self.write(&mut data);
        data
    }

    /// Checks the server's verdict before any record is looked at
    pub fn validate(&self) -> Result<(), Error> {
        if !self.recursion_available {
            return Err(Error::ServerCannotRecurse);
        }
        match self.response_code {
            ResponseCode::NoError => Ok(()),
            ResponseCode::FormatError => Err(Error::FormatError),
            ResponseCode::ServerFailure => Err(Error::ServerFailure),
            ResponseCode::NameError => Err(Error::NameNotFound),
            ResponseCode::NotImplemented => Err(Error::NotImplemented),
            ResponseCode::Refused => Err(Error::Refused),
            ResponseCode::Reserved(code) => Err(Error::UnexpectedResponseCode(code)),
        }
    }

    pub fn id(data: &[u8]) -> Option<u16> {
        if data.len() < 2 {
            return None;
        }
        Some(BigEndian::read_u16(&data[..2]))
    }

    pub fn question_count(data: &[u8]) -> u16 {
        BigEndian::read_u16(&data[4..6])
    }

    pub fn answer_count(data: &[u8]) -> u16 {
        BigEndian::read_u16(&data[6..8])
    }

    pub fn nameserver_count(data: &[u8]) -> u16 {
        BigEndian::read_u16(&data[8..10])
    }

    pub fn additional_count(data: &[u8]) -> u16 {
        BigEndian::read_u16(&data[10..12])
    }

    pub fn set_truncated(data: &mut [u8]) {
        data[2] |= 0b0000_0010;
    }

    fn inc_count(data: &mut [u8], offset: usize) -> Option<u16> {
        let count = BigEndian::read_u16(&data[offset..offset + 2]).checked_add(1)?;
        BigEndian::write_u16(&mut data[offset..offset + 2], count);
        Some(count)
    }

    pub fn inc_questions(data: &mut [u8]) -> Option<u16> {
        Header::inc_count(data, 4)
    }

    pub fn inc_answers(data: &mut [u8]) -> Option<u16> {
        Header::inc_count(data, 6)
    }

    pub fn inc_nameservers(data: &mut [u8]) -> Option<u16> {
        Header::inc_count(data, 8)
    }

    pub fn inc_additional(data: &mut [u8]) -> Option<u16> {
        Header::inc_count(data, 10)
    }
}
