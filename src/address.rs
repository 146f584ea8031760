use crate::error::{Result, Socks5Error};
use crate::protocol::AddressType;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Address represents a network address or domain carried in a
/// SOCKS5 DST.ADDR or BND.ADDR field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    IPv4(Ipv4Addr),
    DomainName(String),
    IPv6(Ipv6Addr),
}

/// Address implementation block
impl Address {
    /// addr_type returns the ATYP byte matching this address
    pub fn addr_type(&self) -> AddressType {
        match self {
            Address::IPv4(_) => AddressType::IPv4,
            Address::DomainName(_) => AddressType::DomainName,
            Address::IPv6(_) => AddressType::IPv6,
        }
    }

    /// read_from reads the address body for an already decoded ATYP.
    /// Domain names are kept as raw text and never resolved here
    pub async fn read_from<R>(stream: &mut R, addr_type: AddressType) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let address = match addr_type {
            AddressType::IPv4 => {
                let mut addr = [0u8; 4];
                stream.read_exact(&mut addr).await?;
                Address::IPv4(Ipv4Addr::from(addr))
            }
            AddressType::DomainName => {
                // First octet in DomainName contains the number of
                // octets to follow
                let mut len = [0u8; 1];
                stream.read_exact(&mut len).await?;

                let mut domain = vec![0u8; len[0] as usize];
                stream.read_exact(&mut domain).await?;
                Address::DomainName(String::from_utf8_lossy(&domain).into_owned())
            }
            AddressType::IPv6 => {
                let mut addr = [0u8; 16];
                stream.read_exact(&mut addr).await?;
                Address::IPv6(Ipv6Addr::from(addr))
            }
        };

        Ok(address)
    }

    /// write_to appends ATYP followed by the address body to buf.
    /// Domain names over 255 bytes are rejected and buf is left untouched
    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<()> {
        if let Address::DomainName(domain) = self {
            if domain.len() > u8::MAX as usize {
                return Err(Socks5Error::DomainTooLong(domain.len()));
            }
        }

        buf.push(self.addr_type() as u8);
        match self {
            Address::IPv4(ip) => buf.extend_from_slice(&ip.octets()),
            Address::DomainName(domain) => {
                buf.push(domain.len() as u8);
                buf.extend_from_slice(domain.as_bytes());
            }
            Address::IPv6(ip) => buf.extend_from_slice(&ip.octets()),
        }
        Ok(())
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(v4) => Address::IPv4(*v4.ip()),
            SocketAddr::V6(v6) => Address::IPv6(*v6.ip()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::IPv4(ip) => write!(f, "{ip}"),
            Address::DomainName(domain) => write!(f, "{domain}"),
            Address::IPv6(ip) => write!(f, "{ip}"),
        }
    }
}

/// host_port renders an address and port in the form accepted by
/// TcpStream::connect, bracketing IPv6 literals
pub fn host_port(address: &Address, port: u16) -> String {
    match address {
        Address::IPv6(ip) => format!("[{ip}]:{port}"),
        other => format!("{other}:{port}"),
    }
}
