use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::dns_parser::QueryType;

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_PORT: u16 = 53;

/// Command line of the `dnsquery` binary
#[derive(Parser, Debug)]
#[command(version, about = "Simple DNS client", long_about = None)]
pub struct Args {
    /// Timeout, in seconds, before retransmitting an unanswered query
    #[arg(
        short = 't',
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Maximum number of times to retransmit an unanswered query before giving up
    #[arg(short = 'r', default_value_t = DEFAULT_MAX_RETRIES)]
    pub retries: u32,

    /// UDP port number of the DNS server
    #[arg(short = 'p', default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Send a MX (mail server) query
    #[arg(long = "mx", conflicts_with = "ns")]
    pub mx: bool,

    /// Send a NS (name server) query
    #[arg(long = "ns")]
    pub ns: bool,

    /// IPv4 address of the DNS server, in @a.b.c.d format
    #[arg(value_parser = parse_server)]
    pub server: Ipv4Addr,

    /// Domain name to query for
    pub name: String,
}

fn parse_server(arg: &str) -> Result<Ipv4Addr, String> {
    let addr = arg.strip_prefix('@').unwrap_or(arg);
    addr.parse()
        .map_err(|_| format!("{:?} is not an IPv4 address in a.b.c.d format", arg))
}

/// Everything one query needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: Ipv4Addr,
    pub port: u16,
    pub timeout: Duration,
    pub max_retries: u32,
    pub name: String,
    pub qtype: QueryType,
}

impl Config {
    pub fn new(server: Ipv4Addr, name: String) -> Config {
        Config {
            server: server,
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            name: name,
            qtype: QueryType::default(),
        }
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.into(), self.port)
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Config {
        let qtype = if args.mx {
            QueryType::MX
        } else if args.ns {
            QueryType::NS
        } else {
            QueryType::A
        };
        Config {
            server: args.server,
            port: args.port,
            timeout: Duration::from_secs(args.timeout),
            max_retries: args.retries,
            name: args.name,
            qtype: qtype,
        }
    }
}
