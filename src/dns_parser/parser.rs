use std::io;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use super::{Class, Error, Header, Name, Packet, QueryClass, QueryType, Question, RRData, ResourceRecord};

/// Type, class, TTL and RDLENGTH following the owner name of a record
const RECORD_META_SIZE: usize = 10;

impl<'a> Question<'a> {
    /// Builds the question for `name`, rejecting names that can't be encoded
    pub fn new(name: &'a str, qtype: QueryType) -> Result<Question<'a>, Error> {
        Ok(Question {
            qname: Name::from_str(name)?,
            qtype: qtype,
            qclass: QueryClass::IN,
        })
    }

    pub fn write_to<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        self.qname.write_to(writer)?;
        writer.write_u16::<BigEndian>(self.qtype as u16)?;
        writer.write_u16::<BigEndian>(self.qclass as u16)
    }

    pub fn encoded_len(&self) -> usize {
        self.qname.encoded_len() + 4
    }

    /// Checks the question a response echoes back at `pos`
    ///
    /// The echo is compared with this question's own encoding, which carries
    /// no compression pointers. Name servers may change the case of the
    /// name, so letters are compared case-insensitively.
    pub fn parse_echo(&self, original: &[u8], pos: usize) -> Result<usize, Error> {
        let end = pos + self.encoded_len();
        let echoed = original
            .get(pos..end)
            .ok_or(Error::MalformedMessage("question section is cut short"))?;

        let mut expected = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut expected)
            .map_err(|_| Error::MalformedMessage("question could not be encoded"))?;

        let name_len = self.qname.encoded_len();
        if !echoed[..name_len].eq_ignore_ascii_case(&expected[..name_len]) {
            return Err(Error::MalformedMessage("response is for another name"));
        }
        let qtype = BigEndian::read_u16(&echoed[name_len..name_len + 2]);
        let qclass = BigEndian::read_u16(&echoed[name_len + 2..name_len + 4]);
        if qtype != self.qtype as u16 || qclass != self.qclass as u16 {
            return Err(Error::MalformedMessage("response is for another query type"));
        }
        Ok(end)
    }
}

impl ResourceRecord {
    /// Parses the record at `pos` and returns the offset of the next one
    pub fn parse(original: &[u8], pos: usize) -> Result<(ResourceRecord, usize), Error> {
        let (name, pos) = Name::scan(original, pos)?;
        let meta = original
            .get(pos..pos + RECORD_META_SIZE)
            .ok_or(Error::MalformedMessage("record header runs past end of packet"))?;
        let typ = BigEndian::read_u16(&meta[..2]);
        let cls = BigEndian::read_u16(&meta[2..4]);
        let ttl = BigEndian::read_u32(&meta[4..8]);
        let rdlength = BigEndian::read_u16(&meta[8..10]);

        let cls = Class::parse(cls).ok_or(Error::UnexpectedClass(cls))?;
        let pos = pos + RECORD_META_SIZE;
        let data = RRData::parse(typ, original, pos, usize::from(rdlength))?;

        let record = ResourceRecord {
            name: name,
            cls: cls,
            ttl: ttl,
            rdlength: rdlength,
            data: data,
        };
        Ok((record, pos + usize::from(rdlength)))
    }

    /// Parses `count` consecutive records starting at `pos`
    pub fn parse_many(
        original: &[u8],
        mut pos: usize,
        count: u16,
    ) -> Result<(Vec<ResourceRecord>, usize), Error> {
        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let (record, next) = ResourceRecord::parse(original, pos)?;
            records.push(record);
            pos = next;
        }
        Ok((records, pos))
    }
}

impl<'a> Packet<'a> {
    /// Decodes the response to `request`
    ///
    /// The header is checked for the server's verdict before any section is
    /// read, then each section is consumed in wire order. The header's counts
    /// have to describe the whole datagram.
    pub fn parse(data: &[u8], request: &Question<'a>) -> Result<Packet<'a>, Error> {
        let header = Header::parse(data)?;
        if !header.response {
            return Err(Error::MalformedMessage("packet is not a response"));
        }
        header.validate()?;
        if header.questions != 1 {
            return Err(Error::MalformedMessage("response must echo exactly one question"));
        }

        let pos = request.parse_echo(data, Header::SIZE)?;
        let (answers, pos) = ResourceRecord::parse_many(data, pos, header.answers)?;
        let (nameservers, pos) = ResourceRecord::parse_many(data, pos, header.nameservers)?;
        let (additional, pos) = ResourceRecord::parse_many(data, pos, header.additional)?;
        if pos != data.len() {
            return Err(Error::MalformedMessage("extra bytes after last record"));
        }

        Ok(Packet {
            header: header,
            question: request.clone(),
            answers: answers,
            nameservers: nameservers,
            additional: additional,
        })
    }
}

#[cfg(test)]
mod test {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::dns_parser::{Opcode, ResponseCode};

    fn example_com() -> Question<'static> {
        Question::new("example.com", QueryType::A).unwrap()
    }

    fn assert_malformed<T: std::fmt::Debug>(result: Result<T, Error>) {
        match result {
            Err(Error::MalformedMessage(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn encode_question() {
        let mut buf = Vec::new();
        example_com().write_to(&mut buf).unwrap();
        assert_eq!(&buf[..], &b"\x07example\x03com\x00\x00\x01\x00\x01"[..]);

        let mut buf = Vec::new();
        Question::new("mcgill.ca", QueryType::MX)
            .unwrap()
            .write_to(&mut buf)
            .unwrap();
        assert_eq!(&buf[..], &b"\x06mcgill\x02ca\x00\x00\x0f\x00\x01"[..]);
    }

    #[test]
    fn question_rejects_long_label() {
        let name = format!("{}.com", "x".repeat(64));
        match Question::new(&name, QueryType::A) {
            Err(Error::InvalidName(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parse_a_response() {
        let response = b"\x12\x34\x81\x80\x00\x01\x00\x01\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\xa8\x00\x01";
        let packet = Packet::parse(response, &example_com()).unwrap();

        assert_eq!(packet.header.id, 0x1234);
        assert!(packet.header.response);
        assert_eq!(packet.header.opcode, Opcode::StandardQuery);
        assert_eq!(packet.header.response_code, ResponseCode::NoError);
        assert_eq!(packet.question, example_com());
        assert_eq!(packet.answers.len(), 1);
        assert!(packet.nameservers.is_empty());
        assert!(packet.additional.is_empty());

        let answer = &packet.answers[0];
        assert_eq!(answer.name.as_str(), "example.com");
        assert_eq!(answer.cls, Class::IN);
        assert_eq!(answer.ttl, 60);
        assert_eq!(answer.rdlength, 4);
        assert_eq!(answer.data, RRData::A(Ipv4Addr::new(192, 168, 0, 1)));
        assert_eq!(answer.data.typ(), 1);
        match answer.data {
            RRData::A(ip) => assert_eq!(ip.to_string(), "192.168.0.1"),
            ref other => panic!("unexpected record data: {:?}", other),
        }
    }

    #[test]
    fn parse_record_with_pointer_owner() {
        let raw = b"\x82\x7a\x81\x00\x00\x01\x00\x01\x00\x00\x00\x00\
            \x03\x77\x77\x77\x06\x6d\x63\x67\x69\x6c\x6c\x02\x63\x61\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x04\x13\x00\x04\x84\xd8\xb1\xa0";
        let (answers, end) = ResourceRecord::parse_many(raw, 31, 1).unwrap();
        assert_eq!(end, raw.len());
        assert_eq!(answers[0].name.as_str(), "www.mcgill.ca");
        assert_eq!(answers[0].data.typ(), 1);
        assert_eq!(answers[0].ttl, 1043);
        assert_eq!(answers[0].rdlength, 4);
        assert_eq!(
            answers[0].data,
            RRData::A(Ipv4Addr::new(132, 216, 177, 160))
        );
    }

    #[test]
    fn parse_all_sections() {
        let request = Question::new("mcgill.ca", QueryType::MX).unwrap();
        let response = b"\xab\xcd\x85\x80\x00\x01\x00\x02\x00\x01\x00\x01\
            \x06mcgill\x02ca\x00\x00\x0f\x00\x01\
            \xc0\x0c\x00\x0f\x00\x01\x00\x00\x0e\x10\x00\x09\x00\x0a\x04mail\xc0\x0c\
            \xc0\x0c\x00\x10\x00\x01\x00\x00\x00\x05\x00\x03\x02hi\
            \xc0\x0c\x00\x02\x00\x01\x00\x01\x51\x80\x00\x06\x03ns1\xc0\x0c\
            \xc0\x29\x00\x01\x00\x01\x00\x00\x00\x1e\x00\x04\x84\xd8\x00\x01";
        let packet = Packet::parse(response, &request).unwrap();

        assert!(packet.header.authoritative);
        assert_eq!(packet.answers.len(), 2);
        assert_eq!(
            packet.answers[0].data,
            RRData::MX {
                preference: 10,
                exchange: Name::from_str("mail.mcgill.ca").unwrap().into_owned(),
            }
        );
        assert_eq!(packet.answers[0].ttl, 3600);
        assert_eq!(
            packet.answers[1].data,
            RRData::Unknown {
                typ: 16,
                data: b"\x02hi".to_vec(),
            }
        );
        assert_eq!(packet.nameservers.len(), 1);
        assert_eq!(
            packet.nameservers[0].data,
            RRData::NS(Name::from_str("ns1.mcgill.ca").unwrap().into_owned())
        );
        assert_eq!(packet.additional.len(), 1);
        assert_eq!(packet.additional[0].name.as_str(), "mail.mcgill.ca");
        assert_eq!(
            packet.additional[0].data,
            RRData::A(Ipv4Addr::new(132, 216, 0, 1))
        );
    }

    #[test]
    fn parse_cname_chain() {
        let request = Question::new("www.mcgill.ca", QueryType::A).unwrap();
        let response = b"\x00\x07\x81\x80\x00\x01\x00\x02\x00\x00\x00\x00\
            \x03www\x06mcgill\x02ca\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x05\x00\x01\x00\x00\x01\x2c\x00\x07\x04web1\xc0\x10\
            \xc0\x2b\x00\x01\x00\x01\x00\x00\x01\x2c\x00\x04\x84\xd8\xb1\xa0";
        let packet = Packet::parse(response, &request).unwrap();
        assert_eq!(
            packet.answers[0].data,
            RRData::CNAME(Name::from_str("web1.mcgill.ca").unwrap().into_owned())
        );
        assert_eq!(packet.answers[1].name.as_str(), "web1.mcgill.ca");
        assert_eq!(
            packet.answers[1].data,
            RRData::A(Ipv4Addr::new(132, 216, 177, 160))
        );
    }

    #[test]
    fn name_error_is_not_malformed() {
        let response = b"\x12\x34\x81\x83\x00\x01\x00\x00\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01";
        match Packet::parse(response, &example_com()) {
            Err(Error::NameNotFound) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn verdict_is_checked_before_records() {
        // answer count claims a record that isn't there
        let response = b"\x12\x34\x81\x83\x00\x01\x00\x01\x00\x00\x00\x00";
        match Packet::parse(response, &example_com()) {
            Err(Error::NameNotFound) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn no_recursion_even_with_good_records() {
        let response = b"\x12\x34\x81\x00\x00\x01\x00\x01\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\xa8\x00\x01";
        match Packet::parse(response, &example_com()) {
            Err(Error::ServerCannotRecurse) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn fewer_records_than_counted() {
        let response = b"\x12\x34\x81\x80\x00\x01\x00\x05\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\xa8\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\xa8\x00\x02\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\xa8";
        assert_malformed(Packet::parse(response, &example_com()));
    }

    #[test]
    fn question_count_must_be_one() {
        let no_question = b"\x12\x34\x81\x80\x00\x00\x00\x01\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\xa8\x00\x01";
        assert_malformed(Packet::parse(no_question, &example_com()));

        let two_questions = b"\x12\x34\x81\x80\x00\x02\x00\x01\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\xa8\x00\x01";
        assert_malformed(Packet::parse(two_questions, &example_com()));
    }

    #[test]
    fn query_is_not_a_response() {
        // QR bit clear, everything else as in a valid answer
        let query = b"\x12\x34\x01\x80\x00\x01\x00\x01\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\xa8\x00\x01";
        assert_malformed(Packet::parse(query, &example_com()));
    }

    #[test]
    fn extra_bytes_after_records() {
        let response = b"\x12\x34\x81\x80\x00\x01\x00\x00\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\xa8\x00\x01";
        assert_malformed(Packet::parse(response, &example_com()));
    }

    #[test]
    fn question_echo_mismatch() {
        let response = b"\x12\x34\x81\x80\x00\x01\x00\x00\x00\x00\x00\x00\
            \x07example\x03org\x00\x00\x01\x00\x01";
        assert_malformed(Packet::parse(response, &example_com()));

        let response = b"\x12\x34\x81\x80\x00\x01\x00\x00\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x0f\x00\x01";
        assert_malformed(Packet::parse(response, &example_com()));

        let response = b"\x12\x34\x81\x80\x00\x01\x00\x00\x00\x00\x00\x00\
            \x07example\x03co";
        assert_malformed(Packet::parse(response, &example_com()));
    }

    #[test]
    fn question_echo_ignores_case() {
        let response = b"\x12\x34\x81\x80\x00\x01\x00\x00\x00\x00\x00\x00\
            \x07ExAmPlE\x03COM\x00\x00\x01\x00\x01";
        let packet = Packet::parse(response, &example_com()).unwrap();
        assert!(packet.answers.is_empty());
    }

    #[test]
    fn unexpected_class_aborts() {
        let response = b"\x12\x34\x81\x80\x00\x01\x00\x01\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x03\x00\x00\x00\x3c\x00\x04\xc0\xa8\x00\x01";
        match Packet::parse(response, &example_com()) {
            Err(Error::UnexpectedClass(3)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn record_cut_short() {
        let response = b"\x12\x34\x81\x80\x00\x01\x00\x01\x00\x00\x00\x00\
            \x07example\x03com\x00\x00\x01\x00\x01\
            \xc0\x0c\x00\x01\x00\x01\x00\x00";
        assert_malformed(Packet::parse(response, &example_com()));
    }
}
