//! SOCKS5 wire codec
//!
//! Translates between the RFC 1928 binary frames and the message types
//! below. Every read is an exact read: a stream that closes early yields
//! `Socks5Error::Io` and leaves the connection unusable.

use crate::address::Address;
use crate::error::{Result, Socks5Error};
use crate::protocol::{AddressType, AuthMethod, Command, RSV, ReplyCode, Version};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Fixed tail of a failure reply: ATYP IPv4, 0.0.0.0, port 0
const ZEROED_BOUND_ADDR: [u8; 7] = [AddressType::IPv4 as u8, 0, 0, 0, 0, 0, 0];

/// MethodNegotiationRequest is the client hello listing offered auth methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodNegotiationRequest {
    pub version: Version,
    pub methods: Vec<u8>,
}

impl MethodNegotiationRequest {
    /// n_methods is the NMETHODS byte as it appeared on the wire
    pub fn n_methods(&self) -> u8 {
        self.methods.len() as u8
    }

    /// offers reports whether the client listed the given method
    pub fn offers(&self, method: AuthMethod) -> bool {
        self.methods.contains(&(method as u8))
    }
}

/// MethodNegotiationResponse is the server's method selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodNegotiationResponse {
    pub version: Version,
    pub method: AuthMethod,
}

/// ConnectionRequest is a decoded client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub version: Version,
    pub command: Command,
    pub address: Address,
    pub port: u16,
}

impl ConnectionRequest {
    pub fn addr_type(&self) -> AddressType {
        self.address.addr_type()
    }
}

/// Reply is a server reply frame as seen by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub version: Version,
    pub code: ReplyCode,
    pub address: Address,
    pub port: u16,
}

/// decode_negotiation_request reads the client hello
pub async fn decode_negotiation_request<R>(stream: &mut R) -> Result<MethodNegotiationRequest>
where
    R: AsyncRead + Unpin,
{
    // ClientHello format
    // +----+----------+----------+
    // |VER | NMETHODS | METHODS  |
    // +----+----------+----------+
    // | 1  |    1     | 1 to 255 |
    // +----+----------+----------+

    let mut buf = [0u8; 2];
    stream.read_exact(&mut buf).await?;

    let version = Version::check(buf[0])?;
    let n_methods = buf[1];

    let mut methods = vec![0u8; n_methods as usize];
    stream.read_exact(&mut methods).await?;

    Ok(MethodNegotiationRequest { version, methods })
}

/// encode_negotiation_response writes the server's method selection
pub async fn encode_negotiation_response<W>(stream: &mut W, method: AuthMethod) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    // ServerChoice method selection reply format
    // +----+--------+
    // |VER | METHOD |
    // +----+--------+
    // | 1  |   1    |
    // +----+--------+

    let response = MethodNegotiationResponse {
        version: Version::SOCKS5,
        method,
    };
    stream
        .write_all(&[response.version as u8, response.method as u8])
        .await?;
    stream.flush().await?;
    Ok(())
}

/// decode_connection_request reads and validates a client request.
/// The 4-byte header is checked before any address bytes are consumed
pub async fn decode_connection_request<R>(stream: &mut R) -> Result<ConnectionRequest>
where
    R: AsyncRead + Unpin,
{
    // SOCKS5 request format
    // +----+-----+-------+------+----------+----------+
    // |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
    // +----+-----+-------+------+----------+----------+
    // | 1  |  1  | X'00' |  1   | Variable |    2     |
    // +----+-----+-------+------+----------+----------+

    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;

    let version = Version::check(header[0])?;
    let command = Command::try_from(header[1])?;
    if header[2] != RSV {
        return Err(Socks5Error::InvalidReservedField(header[2]));
    }
    let addr_type = AddressType::try_from(header[3])?;

    let address = Address::read_from(stream, addr_type).await?;
    let port = read_port(stream).await?;

    Ok(ConnectionRequest {
        version,
        command,
        address,
        port,
    })
}

/// encode_reply writes a server reply. Success carries the bound address;
/// every failure uses the fixed 10-byte zeroed IPv4 frame
pub async fn encode_reply<W>(stream: &mut W, code: ReplyCode, bound_addr: SocketAddr) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    // SOCKS5 reply format
    // +----+-----+-------+------+----------+----------+
    // |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
    // +----+-----+-------+------+----------+----------+
    // | 1  |  1  | X'00' |  1   | Variable |    2     |
    // +----+-----+-------+------+----------+----------+

    let mut reply = vec![Version::SOCKS5 as u8, code as u8, RSV];

    match code {
        ReplyCode::Succeeded => {
            Address::from(bound_addr).write_to(&mut reply)?;
            reply.extend_from_slice(&bound_addr.port().to_be_bytes());
        }
        _ => reply.extend_from_slice(&ZEROED_BOUND_ADDR),
    }

    stream.write_all(&reply).await?;
    stream.flush().await?;
    Ok(())
}

/// decode_reply reads a reply frame, the client-side counterpart of encode_reply
pub async fn decode_reply<R>(stream: &mut R) -> Result<Reply>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;

    let version = Version::check(header[0])?;
    let code = ReplyCode::from_byte(header[1])
        .ok_or(Socks5Error::UnassignedReplyCode(header[1]))?;
    if header[2] != RSV {
        return Err(Socks5Error::InvalidReservedField(header[2]));
    }
    let addr_type = AddressType::try_from(header[3])?;

    let address = Address::read_from(stream, addr_type).await?;
    let port = read_port(stream).await?;

    Ok(Reply {
        version,
        code,
        address,
        port,
    })
}

async fn read_port<R>(stream: &mut R) -> Result<u16>
where
    R: AsyncRead + Unpin,
{
    let mut port_buf = [0u8; 2];
    stream.read_exact(&mut port_buf).await?;
    Ok(u16::from_be_bytes(port_buf))
}
