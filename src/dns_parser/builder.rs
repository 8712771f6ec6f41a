use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use super::{Class, Header, Name, Opcode, Question, RRData, ResponseCode};

/// Largest UDP payload sent or expected without EDNS0
pub const MAX_UDP_PAYLOAD: usize = 512;

pub enum Questions {}
pub enum Answers {}
pub enum Nameservers {}
pub enum Additional {}

pub trait MoveTo<T> {}
impl<T> MoveTo<T> for T {}

impl MoveTo<Answers> for Questions {}

impl MoveTo<Nameservers> for Questions {}
impl MoveTo<Nameservers> for Answers {}

impl MoveTo<Additional> for Questions {}
impl MoveTo<Additional> for Answers {}
impl MoveTo<Additional> for Nameservers {}

/// Allows to build a DNS packet
///
/// Queries are what the client sends. Responses are only built to play the
/// name server's part when exercising the client, and their names are
/// never compressed.
pub struct Builder<S> {
    buf: Vec<u8>,
    max_size: Option<usize>,
    _state: PhantomData<S>,
}

impl Builder<Questions> {
    /// Creates a new query
    ///
    /// Initially all sections are empty. You're expected to fill
    /// the questions section with `add_question`
    pub fn new_query(id: u16, recursion: bool) -> Builder<Questions> {
        let head = Header {
            questions: 0,
            recursion_desired: recursion,
            ..Header::query(id)
        };
        Builder::with_header(head)
    }

    /// Creates a response, as a name server would answer a query
    ///
    /// The client never sends one. It exists so tests and loopback servers
    /// can produce replies for the client to decode.
    pub fn new_response(
        id: u16,
        recursion_available: bool,
        authoritative: bool,
        response_code: ResponseCode,
    ) -> Builder<Questions> {
        let head = Header {
            id: id,
            response: true,
            opcode: Opcode::StandardQuery,
            authoritative: authoritative,
            truncated: false,
            recursion_desired: true,
            recursion_available: recursion_available,
            reserved: 0,
            response_code: response_code,
            questions: 0,
            answers: 0,
            nameservers: 0,
            additional: 0,
        };
        Builder::with_header(head)
    }

    fn with_header(head: Header) -> Builder<Questions> {
        let mut buf = Vec::with_capacity(MAX_UDP_PAYLOAD);
        buf.extend(head.to_bytes().iter());
        Builder {
            buf: buf,
            max_size: Some(MAX_UDP_PAYLOAD),
            _state: PhantomData,
        }
    }
}

impl<T> Builder<T> {
    fn write_rr(&mut self, name: &Name, ttl: u32, data: &RRData) {
        name.write_to(&mut self.buf).unwrap();
        self.buf.write_u16::<BigEndian>(data.typ()).unwrap();
        self.buf.write_u16::<BigEndian>(Class::IN as u16).unwrap();
        self.buf.write_u32::<BigEndian>(ttl).unwrap();

        let size_offset = self.buf.len();
        self.buf.write_u16::<BigEndian>(0).unwrap();

        let data_offset = self.buf.len();
        data.write_to(&mut self.buf).unwrap();
        let data_size = self.buf.len() - data_offset;

        BigEndian::write_u16(
            &mut self.buf[size_offset..size_offset + 2],
            data_size as u16,
        );
    }

    /// Returns the final packet
    ///
    /// When packet is not truncated method returns `Ok(packet)`. If
    /// packet is truncated the method returns `Err(packet)`. In both
    /// cases the packet is fully valid.
    ///
    /// A query that doesn't fit in a single datagram is of no use to the
    /// client, so it treats `Err` as a failure.
    pub fn build(mut self) -> Result<Vec<u8>, Vec<u8>> {
        match self.max_size {
            Some(max_size) if self.buf.len() > max_size => {
                Header::set_truncated(&mut self.buf[..Header::SIZE]);
                Err(self.buf)
            }
            _ => Ok(self.buf),
        }
    }

    pub fn move_to<U>(self) -> Builder<U>
    where
        T: MoveTo<U>,
    {
        Builder {
            buf: self.buf,
            max_size: self.max_size,
            _state: PhantomData,
        }
    }

    #[cfg(test)]
    pub fn set_max_size(&mut self, max_size: Option<usize>) {
        self.max_size = max_size;
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        Header::question_count(&self.buf) == 0
            && Header::answer_count(&self.buf) == 0
            && Header::nameserver_count(&self.buf) == 0
            && Header::additional_count(&self.buf) == 0
    }
}

impl<T: MoveTo<Questions>> Builder<T> {
    /// Adds a question to the packet
    ///
    /// # Panics
    ///
    /// * There are already 65535 questions in the buffer.
    pub fn add_question(self, question: &Question) -> Builder<Questions> {
        let mut builder = self.move_to::<Questions>();

        question.write_to(&mut builder.buf).unwrap();
        Header::inc_questions(&mut builder.buf).expect("Too many questions");
        builder
    }
}

impl<T: MoveTo<Answers>> Builder<T> {
    /// Appends an uncompressed record to the answer section of a response
    pub fn add_answer(self, name: &Name, ttl: u32, data: &RRData) -> Builder<Answers> {
        let mut builder = self.move_to::<Answers>();

        builder.write_rr(name, ttl, data);
        Header::inc_answers(&mut builder.buf).expect("Too many answers");

        builder
    }
}

impl<T: MoveTo<Nameservers>> Builder<T> {
    /// Appends an uncompressed record to the authority section of a response
    pub fn add_nameserver(self, name: &Name, ttl: u32, data: &RRData) -> Builder<Nameservers> {
        let mut builder = self.move_to::<Nameservers>();

        builder.write_rr(name, ttl, data);
        Header::inc_nameservers(&mut builder.buf).expect("Too many nameservers");

        builder
    }
}

impl<T: MoveTo<Additional>> Builder<T> {
    /// Appends an uncompressed record to the additional section of a response
    pub fn add_additional(self, name: &Name, ttl: u32, data: &RRData) -> Builder<Additional> {
        let mut builder = self.move_to::<Additional>();

        builder.write_rr(name, ttl, data);
        Header::inc_additional(&mut builder.buf).expect("Too many additional answers");

        builder
    }
}

#[cfg(test)]
mod test {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::dns_parser::{Packet, QueryType};

    #[test]
    fn build_query() {
        let question = Question::new("example.com", QueryType::A).unwrap();
        let bld = Builder::new_query(1573, true).add_question(&question);
        let result = b"\x06%\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\
                      \x07example\x03com\x00\x00\x01\x00\x01";
        assert_eq!(&bld.build().unwrap()[..], &result[..]);
    }

    #[test]
    fn build_ns_query() {
        let question = Question::new("mcgill.ca", QueryType::NS).unwrap();
        let bld = Builder::new_query(23513, true).add_question(&question);
        let result = b"[\xd9\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\
            \x06mcgill\x02ca\x00\x00\x02\x00\x01";
        assert_eq!(&bld.build().unwrap()[..], &result[..]);
    }

    #[test]
    fn built_response_parses_back() {
        let question = Question::new("mcgill.ca", QueryType::MX).unwrap();
        let exchange = Name::from_str("mail.mcgill.ca").unwrap();
        let packet = Builder::new_response(99, true, false, ResponseCode::NoError)
            .add_question(&question)
            .add_answer(
                &question.qname,
                300,
                &RRData::MX {
                    preference: 5,
                    exchange: exchange.clone().into_owned(),
                },
            )
            .add_nameserver(
                &question.qname,
                600,
                &RRData::NS(Name::from_str("ns1.mcgill.ca").unwrap()),
            )
            .add_additional(&exchange, 30, &RRData::A(Ipv4Addr::new(10, 0, 0, 1)))
            .build()
            .unwrap();

        let parsed = Packet::parse(&packet, &question).unwrap();
        assert_eq!(parsed.header.id, 99);
        assert_eq!(parsed.answers.len(), 1);
        assert_eq!(parsed.answers[0].ttl, 300);
        assert_eq!(parsed.nameservers.len(), 1);
        assert_eq!(parsed.additional.len(), 1);
        assert_eq!(parsed.additional[0].name, exchange);
    }

    #[test]
    fn oversized_query_is_truncated() {
        let question = Question::new("example.com", QueryType::A).unwrap();
        let mut bld = Builder::new_query(1, true).add_question(&question);
        bld.set_max_size(Some(20));
        let packet = bld.build().unwrap_err();
        assert!(Header::parse(&packet).unwrap().truncated);
    }

    #[test]
    fn empty_builder() {
        assert!(Builder::new_query(1, true).is_empty());
        let question = Question::new("example.com", QueryType::A).unwrap();
        assert!(!Builder::new_query(1, true).add_question(&question).is_empty());
    }
}
