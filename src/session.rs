use log::{debug, trace, warn};
use rand::{thread_rng, Rng};
use std::io;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::dns_parser::{self, Builder, Header, Packet, Question};
use crate::transport::Channel;

/// Why a query ended without a decoded answer
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Codec(#[from] dns_parser::Error),
    #[error("maximum number of retries exceeded ({attempts} attempts)")]
    RetriesExhausted { attempts: u32 },
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

/// A decoded answer together with how long it took to get it
#[derive(Debug)]
pub struct Response<'a> {
    pub packet: Packet<'a>,
    /// Retransmissions performed before the answer arrived
    pub retries: u32,
    pub elapsed: Duration,
}

/// Runs queries over a channel, retransmitting on timeout
///
/// Each attempt waits at most `timeout` for the reply, so a query takes no
/// longer than `timeout * (max_retries + 1)`.
pub struct Session<C: Channel> {
    channel: C,
    timeout: Duration,
    max_retries: u32,
}

impl<C: Channel> Session<C> {
    pub fn new(channel: C, timeout: Duration, max_retries: u32) -> Session<C> {
        Session {
            channel: channel,
            timeout: timeout,
            max_retries: max_retries,
        }
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Sends `question` under a fresh transaction id and decodes the reply
    pub fn query<'a>(&mut self, question: &Question<'a>) -> Result<Response<'a>, QueryError> {
        let id = thread_rng().gen::<u16>();
        self.query_with_id(id, question)
    }

    /// Like `query`, with the transaction id chosen by the caller
    ///
    /// The request is encoded once; every retransmission sends the same
    /// bytes, so a late reply to an earlier attempt is still accepted.
    pub fn query_with_id<'a>(
        &mut self,
        id: u16,
        question: &Question<'a>,
    ) -> Result<Response<'a>, QueryError> {
        let request = Builder::new_query(id, true)
            .add_question(question)
            .build()
            .map_err(|_| dns_parser::Error::InvalidName(question.qname.to_string()))?;

        let started = Instant::now();
        let mut attempt = 0;
        loop {
            debug!(
                "sending query {:#06x} for {} (attempt {})",
                id,
                question.qname,
                attempt + 1
            );
            self.channel.send(&request)?;

            if let Some(reply) = self.await_reply(id)? {
                let packet = Packet::parse(&reply, question)?;
                return Ok(Response {
                    packet: packet,
                    retries: attempt,
                    elapsed: started.elapsed(),
                });
            }

            if attempt >= self.max_retries {
                warn!("no response to query {:#06x} after {} attempts", id, attempt + 1);
                return Err(QueryError::RetriesExhausted {
                    attempts: attempt + 1,
                });
            }
            attempt += 1;
            debug!("query {:#06x} timed out, retransmitting", id);
        }
    }

    /// Waits out one attempt's deadline for a response carrying `id`
    ///
    /// Stray datagrams (other ids, or queries) are dropped without
    /// extending the deadline.
    fn await_reply(&mut self, id: u16) -> io::Result<Option<Vec<u8>>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let reply = match self.channel.recv(remaining)? {
                Some(reply) => reply,
                None => return Ok(None),
            };
            trace!("received {} bytes", reply.len());

            match Header::parse(&reply) {
                Ok(ref header) if header.id == id && header.response => return Ok(Some(reply)),
                Ok(header) => warn!(
                    "dropping datagram with id {:#06x}, expected {:#06x}",
                    header.id, id
                ),
                // shorter than a header, let the codec reject it
                Err(_) if Header::id(&reply) == Some(id) => return Ok(Some(reply)),
                Err(err) => warn!("dropping unreadable datagram: {}", err),
            }

            if remaining == Duration::from_secs(0) {
                return Ok(None);
            }
        }
    }
}
