use std::io::{self, Write};

use crate::config::Config;
use crate::dns_parser::{self, RRData, ResourceRecord};
use crate::session::{QueryError, Response};

pub fn write_request<W: Write>(out: &mut W, config: &Config) -> io::Result<()> {
    writeln!(out, "DnsClient sending request for {}", config.name)?;
    writeln!(out, "Server: {}", config.server)?;
    writeln!(out, "Request type: {}", config.qtype)
}

/// Prints the answer and additional sections
///
/// Records of unsupported types are left out of both the listing and the
/// section counts.
pub fn write_response<W: Write>(out: &mut W, response: &Response) -> io::Result<()> {
    writeln!(
        out,
        "Response received after {:.3} seconds ({} retries)",
        response.elapsed.as_secs_f64(),
        response.retries
    )?;

    let auth = response.packet.header.authoritative;
    let answers = supported(&response.packet.answers);
    if answers.is_empty() {
        writeln!(out, "NOTFOUND")?;
    } else {
        writeln!(out, "***Answer Section ({} records)***", answers.len())?;
        for record in answers {
            write_record(out, record, auth)?;
        }
    }

    let additional = supported(&response.packet.additional);
    if !additional.is_empty() {
        writeln!(out, "***Additional Section ({} records)***", additional.len())?;
        for record in additional {
            write_record(out, record, auth)?;
        }
    }
    Ok(())
}

pub fn write_error<W: Write>(out: &mut W, error: &QueryError) -> io::Result<()> {
    match *error {
        QueryError::Codec(dns_parser::Error::NameNotFound) => {
            writeln!(out, "NOTFOUND\t{}", error)
        }
        _ => writeln!(out, "ERROR\t{}", error),
    }
}

fn supported(records: &[ResourceRecord]) -> Vec<&ResourceRecord> {
    records.iter().filter(|rr| rr.data.is_supported()).collect()
}

fn write_record<W: Write>(out: &mut W, record: &ResourceRecord, auth: bool) -> io::Result<()> {
    let auth = if auth { "auth" } else { "nonauth" };
    match record.data {
        RRData::A(ip) => writeln!(out, "IP\t{}\t{}\t{}", ip, record.ttl, auth),
        RRData::CNAME(ref alias) => writeln!(out, "CNAME\t{}\t{}\t{}", alias, record.ttl, auth),
        RRData::NS(ref alias) => writeln!(out, "NS\t{}\t{}\t{}", alias, record.ttl, auth),
        RRData::MX {
            preference,
            ref exchange,
        } => writeln!(
            out,
            "MX\t{}\t{}\t{}\t{}",
            exchange, preference, record.ttl, auth
        ),
        RRData::Unknown { .. } => Ok(()),
    }
}
