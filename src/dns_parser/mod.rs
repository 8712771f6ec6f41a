//! DNS message codec
//!
//! Encodes the single-question queries this client sends and decodes the
//! responses to them, following compression pointers in the answer,
//! authority and additional sections.

mod builder;
mod enums;
mod error;
mod header;
mod name;
mod parser;
mod rrdata;
mod structs;

pub use self::builder::{Additional, Answers, Builder, Nameservers, Questions, MAX_UDP_PAYLOAD};
pub use self::enums::{Class, Opcode, QueryClass, QueryType, ResponseCode, Type};
pub use self::error::Error;
pub use self::header::Header;
pub use self::name::{Name, MAX_LABEL_LENGTH, MAX_NAME_HOPS, MAX_NAME_LENGTH};
pub use self::rrdata::RRData;
pub use self::structs::{Packet, Question, ResourceRecord};
