//! A single-shot DNS client
//!
//! Sends one recursive query for an A, NS or MX record to a chosen name
//! server over UDP, retransmitting on timeout, and decodes the answer.
//!
//! ```no_run
//! use std::time::Duration;
//! use dnsquery::{Question, QueryType, Session, UdpChannel};
//!
//! let channel = UdpChannel::connect("8.8.8.8:53".parse().unwrap()).unwrap();
//! let mut session = Session::new(channel, Duration::from_secs(5), 3);
//! let question = Question::new("www.mcgill.ca", QueryType::A).unwrap();
//! let response = session.query(&question).unwrap();
//! for answer in response.packet.answers {
//!     println!("{:?}", answer.data);
//! }
//! ```

pub mod config;
pub mod dns_parser;
pub mod render;
pub mod session;
pub mod transport;

pub use crate::config::Config;
pub use crate::dns_parser::{Packet, QueryType, Question, RRData, ResourceRecord};
pub use crate::session::{QueryError, Response, Session};
pub use crate::transport::{Channel, UdpChannel};

/// Runs the query described by `config` against its name server
///
/// The socket lives for the duration of the call only.
pub fn resolve<'a>(config: &'a Config) -> Result<Response<'a>, QueryError> {
    let question = Question::new(&config.name, config.qtype)?;
    let channel = UdpChannel::connect(config.server_addr())?;
    let mut session = Session::new(channel, config.timeout, config.max_retries);
    session.query(&question)
}
