use super::{Class, Header, Name, QueryClass, QueryType, RRData};

/// Parsed DNS packet
///
/// Only responses are ever parsed, and only against the question that was
/// sent, so there is exactly one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet<'a> {
    pub header: Header,
    pub question: Question<'a>,
    pub answers: Vec<ResourceRecord>,
    pub nameservers: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

/// The single entry of the Query section of the packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question<'a> {
    pub qname: Name<'a>,
    pub qtype: QueryType,
    pub qclass: QueryClass,
}

/// A single DNS record
///
/// Records of the four supported types are decoded, the rest are kept
/// as an unparsed byte vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: Name<'static>,
    pub cls: Class,
    pub ttl: u32,
    pub rdlength: u16,
    pub data: RRData,
}
