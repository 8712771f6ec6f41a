use std::io;
use std::net::Ipv4Addr;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use super::{Error, Name, Type};

/// The enumeration that represents known types of DNS resource records data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RRData {
    A(Ipv4Addr),
    NS(Name<'static>),
    CNAME(Name<'static>),
    MX {
        preference: u16,
        exchange: Name<'static>,
    },
    // Anything that isn't decoded, kept so the record can still be skipped
    Unknown {
        typ: u16,
        data: Vec<u8>,
    },
}

impl RRData {
    pub fn typ(&self) -> u16 {
        match *self {
            RRData::A(..) => Type::A as u16,
            RRData::NS(..) => Type::NS as u16,
            RRData::CNAME(..) => Type::CNAME as u16,
            RRData::MX { .. } => Type::MX as u16,
            RRData::Unknown { typ, .. } => typ,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(*self, RRData::Unknown { .. })
    }

    pub fn write_to<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        match *self {
            RRData::A(ip) => writer.write_u32::<BigEndian>(ip.into()),
            RRData::NS(ref name) | RRData::CNAME(ref name) => name.write_to(writer),
            RRData::MX {
                preference,
                ref exchange,
            } => {
                writer.write_u16::<BigEndian>(preference)?;
                exchange.write_to(writer)
            }
            RRData::Unknown { ref data, .. } => writer.write_all(data),
        }
    }

    /// Decodes the `rdlength` bytes at `pos` in `original`
    ///
    /// Names inside the payload may point anywhere in the packet, but must
    /// themselves end within the payload.
    pub fn parse(typ: u16, original: &[u8], pos: usize, rdlength: usize) -> Result<RRData, Error> {
        let end = pos + rdlength;
        let rdata = original
            .get(pos..end)
            .ok_or(Error::MalformedMessage("record data runs past end of packet"))?;

        let scan_within = |at: usize| -> Result<Name<'static>, Error> {
            let (name, name_end) = Name::scan(original, at)?;
            if name_end > end {
                return Err(Error::MalformedMessage("domain name overruns record data"));
            }
            Ok(name)
        };

        match Type::parse(typ) {
            Some(Type::A) => {
                if rdata.len() != 4 {
                    return Err(Error::MalformedMessage("wrong size of A record data"));
                }
                Ok(RRData::A(Ipv4Addr::from(BigEndian::read_u32(rdata))))
            }
            Some(Type::NS) => Ok(RRData::NS(scan_within(pos)?)),
            Some(Type::CNAME) => Ok(RRData::CNAME(scan_within(pos)?)),
            Some(Type::MX) => {
                if rdata.len() < 3 {
                    return Err(Error::MalformedMessage("wrong size of MX record data"));
                }
                Ok(RRData::MX {
                    preference: BigEndian::read_u16(&rdata[..2]),
                    exchange: scan_within(pos + 2)?,
                })
            }
            None => Ok(RRData::Unknown {
                typ: typ,
                data: rdata.to_vec(),
            }),
        }
    }
}
