use std::fmt;

/// The OPCODE value of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    StandardQuery,
    InverseQuery,
    ServerStatusRequest,
    Reserved(u8),
}

impl From<u8> for Opcode {
    fn from(code: u8) -> Opcode {
        match code {
            0 => Opcode::StandardQuery,
            1 => Opcode::InverseQuery,
            2 => Opcode::ServerStatusRequest,
            x => Opcode::Reserved(x & 0b1111),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(code: Opcode) -> u8 {
        match code {
            Opcode::StandardQuery => 0,
            Opcode::InverseQuery => 1,
            Opcode::ServerStatusRequest => 2,
            Opcode::Reserved(x) => x,
        }
    }
}

/// The RCODE value of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoError,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
    Reserved(u8),
}

impl From<u8> for ResponseCode {
    fn from(code: u8) -> ResponseCode {
        match code {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormatError,
            2 => ResponseCode::ServerFailure,
            3 => ResponseCode::NameError,
            4 => ResponseCode::NotImplemented,
            5 => ResponseCode::Refused,
            x => ResponseCode::Reserved(x & 0b1111),
        }
    }
}

impl From<ResponseCode> for u8 {
    fn from(code: ResponseCode) -> u8 {
        match code {
            ResponseCode::NoError => 0,
            ResponseCode::FormatError => 1,
            ResponseCode::ServerFailure => 2,
            ResponseCode::NameError => 3,
            ResponseCode::NotImplemented => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Reserved(x) => x,
        }
    }
}

/// The QTYPE value this client can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    A = 1,
    NS = 2,
    MX = 15,
}

impl Default for QueryType {
    fn default() -> QueryType {
        QueryType::A
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            QueryType::A => "A",
            QueryType::NS => "NS",
            QueryType::MX => "MX",
        })
    }
}

/// The TYPE value of the resource records that get decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    A = 1,
    NS = 2,
    CNAME = 5,
    MX = 15,
}

impl Type {
    pub fn parse(code: u16) -> Option<Type> {
        match code {
            1 => Some(Type::A),
            2 => Some(Type::NS),
            5 => Some(Type::CNAME),
            15 => Some(Type::MX),
            _ => None,
        }
    }
}

/// The QCLASS value; only the Internet class is ever sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryClass {
    IN = 1,
}

/// The CLASS value of a resource record
///
/// Records of any other class are rejected while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    IN = 1,
}

impl Class {
    pub fn parse(code: u16) -> Option<Class> {
        match code {
            1 => Some(Class::IN),
            _ => None,
        }
    }
}
