use log::trace;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use crate::dns_parser::MAX_UDP_PAYLOAD;

/// A connected datagram channel to one name server
pub trait Channel {
    fn send(&mut self, packet: &[u8]) -> io::Result<()>;

    /// Waits up to `timeout` for the next datagram
    ///
    /// Returns `Ok(None)` when nothing arrived in time.
    fn recv(&mut self, timeout: Duration) -> io::Result<Option<Vec<u8>>>;
}

/// UDP socket connected to the name server, closed on drop
#[derive(Debug)]
pub struct UdpChannel {
    socket: UdpSocket,
    server: SocketAddr,
}

impl UdpChannel {
    pub fn connect(server: SocketAddr) -> io::Result<UdpChannel> {
        let local: IpAddr = match server {
            SocketAddr::V4(_) => Ipv4Addr::UNSPECIFIED.into(),
            SocketAddr::V6(_) => Ipv6Addr::UNSPECIFIED.into(),
        };
        let socket = Socket::new(Domain::for_address(server), Type::DGRAM, Some(Protocol::UDP))?;
        socket.bind(&SockAddr::from(SocketAddr::new(local, 0)))?;
        socket.connect(&SockAddr::from(server))?;
        trace!("udp channel connected to {:?}", server);

        Ok(UdpChannel {
            socket: socket.into(),
            server: server,
        })
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Channel for UdpChannel {
    fn send(&mut self, packet: &[u8]) -> io::Result<()> {
        let sent = self.socket.send(packet)?;
        if sent != packet.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "failed to send entire packet",
            ));
        }
        trace!("sent {} bytes to {:?}", sent, self.server);
        Ok(())
    }

    fn recv(&mut self, timeout: Duration) -> io::Result<Option<Vec<u8>>> {
        // a zero read timeout means "block forever" to the OS
        if timeout == Duration::from_secs(0) {
            return Ok(None);
        }
        self.socket.set_read_timeout(Some(timeout))?;

        let mut buf = [0u8; MAX_UDP_PAYLOAD];
        match self.socket.recv(&mut buf) {
            Ok(len) => {
                trace!("received {} bytes from {:?}", len, self.server);
                Ok(Some(buf[..len].to_vec()))
            }
            Err(ref err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
