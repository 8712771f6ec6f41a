use thiserror::Error;

/// Error encoding a query or decoding a DNS response
///
/// The last seven variants come from the response header and are the name
/// server's own verdict on the query, not a fault in the packet.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid domain name {0:?}")]
    InvalidName(String),
    #[error("malformed message: {0}")]
    MalformedMessage(&'static str),
    #[error("unexpected class {0} in resource record")]
    UnexpectedClass(u16),
    #[error("the name server does not support recursive queries")]
    ServerCannotRecurse,
    #[error("the name server was unable to interpret the query")]
    FormatError,
    #[error("the name server was unable to process this query due to a problem with the name server")]
    ServerFailure,
    #[error("the domain name referenced in the query does not exist")]
    NameNotFound,
    #[error("the name server does not support the requested kind of query")]
    NotImplemented,
    #[error("the name server refuses to perform the requested operation for policy reasons")]
    Refused,
    #[error("unexpected response code {0}")]
    UnexpectedResponseCode(u8),
}
