use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, UdpSocket};
use std::time::Duration;

use anyhow::Error;

use crate::error::DnsError;

pub const DNS_PORT: u16 = 53;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The rfc1035 UDP floor; receive buffers never shrink below it.
pub const MIN_UDP_PAYLOAD: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Udp,
    Tcp,
}

/// One nameserver socket.  UDP and TCP share the contract: `send` a
/// whole message, `receive` a whole message, a deadline bounds each
/// read.  The caller owns retries and server rotation.
pub trait Transport {
    fn protocol(&self) -> Protocol;

    fn send(&mut self, packet: &[u8]) -> Result<(), Error>;

    fn receive(&mut self) -> Result<Vec<u8>, Error>;

    fn set_deadline(&mut self, timeout: Duration) -> Result<(), Error>;
}

fn net_err(what: &str, e: std::io::Error) -> Error {
    let detail = match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => format!("{}: timed out", what),
        ErrorKind::ConnectionRefused => format!("{}: connection refused", what),
        ErrorKind::UnexpectedEof => format!("{}: connection closed", what),
        _ => format!("{}: {}", what, e),
    };
    Error::new(DnsError::Network(detail))
}

fn unspecified_local(peer: &SocketAddr, local: Option<IpAddr>) -> SocketAddr {
    let ip = local.unwrap_or(match peer {
        SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    });
    SocketAddr::new(ip, 0)
}

#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    recv_size: usize,
}

impl UdpTransport {
    pub fn open(
        peer: SocketAddr,
        local: Option<IpAddr>,
        timeout: Duration,
        recv_size: usize,
    ) -> Result<Self, Error> {
        let socket = UdpSocket::bind(unspecified_local(&peer, local))
            .map_err(|e| net_err("udp bind", e))?;
        socket.connect(peer).map_err(|e| net_err("udp connect", e))?;
        socket
            .set_read_timeout(Some(timeout))
            .map_err(|e| net_err("udp timeout", e))?;
        Ok(Self {
            socket,
            recv_size: recv_size.max(MIN_UDP_PAYLOAD),
        })
    }
}

impl Transport for UdpTransport {
    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    fn send(&mut self, packet: &[u8]) -> Result<(), Error> {
        let n = self
            .socket
            .send(packet)
            .map_err(|e| net_err("udp send", e))?;
        if n != packet.len() {
            return Err(Error::new(DnsError::Network(format!(
                "udp send: short write, {} of {} octets",
                n,
                packet.len()
            ))));
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0_u8; self.recv_size];
        let n = self
            .socket
            .recv(&mut buf)
            .map_err(|e| net_err("udp receive", e))?;
        buf.truncate(n);
        Ok(buf)
    }

    fn set_deadline(&mut self, timeout: Duration) -> Result<(), Error> {
        self.socket
            .set_read_timeout(Some(timeout))
            .map_err(|e| net_err("udp timeout", e))
    }
}

/// TCP framing prepends a 2-octet big-endian length to every message;
/// reads loop until the whole frame arrived.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    pub fn open(peer: SocketAddr, timeout: Duration) -> Result<Self, Error> {
        let stream =
            TcpStream::connect_timeout(&peer, timeout).map_err(|e| net_err("tcp connect", e))?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(|e| net_err("tcp timeout", e))?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(|e| net_err("tcp timeout", e))?;
        stream.set_nodelay(true).ok();
        Ok(Self { stream })
    }
}

impl Transport for TcpTransport {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    fn send(&mut self, packet: &[u8]) -> Result<(), Error> {
        if packet.len() > u16::MAX as usize {
            return Err(Error::new(DnsError::Network(format!(
                "tcp send: message of {} octets exceeds the 2-octet frame",
                packet.len()
            ))));
        }
        self.stream
            .write_all(&(packet.len() as u16).to_be_bytes())
            .map_err(|e| net_err("tcp send", e))?;
        self.stream
            .write_all(packet)
            .map_err(|e| net_err("tcp send", e))?;
        self.stream.flush().map_err(|e| net_err("tcp send", e))
    }

    fn receive(&mut self) -> Result<Vec<u8>, Error> {
        let mut length = [0_u8; 2];
        self.stream
            .read_exact(&mut length)
            .map_err(|e| net_err("tcp receive", e))?;
        let mut buf = vec![0_u8; u16::from_be_bytes(length) as usize];
        self.stream
            .read_exact(&mut buf)
            .map_err(|e| net_err("tcp receive", e))?;
        Ok(buf)
    }

    fn set_deadline(&mut self, timeout: Duration) -> Result<(), Error> {
        self.stream
            .set_read_timeout(Some(timeout))
            .map_err(|e| net_err("tcp timeout", e))
    }
}

/// The pooled form: sockets persist across requests keyed by
/// (address, protocol) and are dropped on any I/O error.
#[derive(Debug)]
pub enum TransportKind {
    Udp(UdpTransport),
    Tcp(TcpTransport),
}

impl Transport for TransportKind {
    fn protocol(&self) -> Protocol {
        match self {
            TransportKind::Udp(t) => t.protocol(),
            TransportKind::Tcp(t) => t.protocol(),
        }
    }

    fn send(&mut self, packet: &[u8]) -> Result<(), Error> {
        match self {
            TransportKind::Udp(t) => t.send(packet),
            TransportKind::Tcp(t) => t.send(packet),
        }
    }

    fn receive(&mut self) -> Result<Vec<u8>, Error> {
        match self {
            TransportKind::Udp(t) => t.receive(),
            TransportKind::Tcp(t) => t.receive(),
        }
    }

    fn set_deadline(&mut self, timeout: Duration) -> Result<(), Error> {
        match self {
            TransportKind::Udp(t) => t.set_deadline(timeout),
            TransportKind::Tcp(t) => t.set_deadline(timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_udp_transport_roundtrip() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let mut buf = [0_u8; 512];
            let (n, peer) = server.recv_from(&mut buf).unwrap();
            server.send_to(&buf[..n], peer).unwrap();
        });

        let mut transport =
            UdpTransport::open(server_addr, None, Duration::from_secs(2), 512).unwrap();
        transport.send(b"ping").unwrap();
        assert_eq!(b"ping".to_vec(), transport.receive().unwrap());
        handle.join().unwrap();
    }

    #[test]
    fn test_udp_transport_timeout() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();
        let mut transport =
            UdpTransport::open(server_addr, None, Duration::from_millis(50), 512).unwrap();
        let err = transport.receive().unwrap_err();
        match err.downcast_ref::<DnsError>() {
            Some(DnsError::Network(msg)) => assert_eq!(true, msg.contains("timed out")),
            other => panic!("wrong error kind: {:?}", other),
        }
    }

    #[test]
    fn test_tcp_transport_framing() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            // the frame arrives length-prefixed
            let mut length = [0_u8; 2];
            stream.read_exact(&mut length).unwrap();
            assert_eq!(4, u16::from_be_bytes(length));
            let mut buf = [0_u8; 4];
            stream.read_exact(&mut buf).unwrap();
            assert_eq!(b"ping", &buf);
            // reply in two write calls to force a looped read
            stream.write_all(&[0, 4]).unwrap();
            stream.flush().unwrap();
            stream.write_all(b"pong").unwrap();
        });

        let mut transport = TcpTransport::open(addr, Duration::from_secs(2)).unwrap();
        transport.send(b"ping").unwrap();
        assert_eq!(b"pong".to_vec(), transport.receive().unwrap());
        handle.join().unwrap();
    }

    #[test]
    fn test_tcp_transport_connect_refused() {
        // grab a port and close it again
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = TcpTransport::open(addr, Duration::from_millis(500));
        assert_eq!(true, result.is_err());
    }
}
