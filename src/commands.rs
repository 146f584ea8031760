use crate::address::host_port;
use crate::codec::{decode_connection_request, encode_reply};
use crate::error::{Result, Socks5Error};
use crate::protocol::{AddressType, Command, ReplyCode};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, error, info};

/// handle_socks_request reads the client's request, applies the CONNECT/IPv4
/// policy, dials the destination and reports the outcome to the client.
/// On success the returned stream is the upstream half of the relay
pub async fn handle_socks_request<S>(stream: &mut S) -> Result<TcpStream>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // A malformed frame leaves no safe stream position to reply from
    let request = decode_connection_request(stream).await?;

    // DEBUG
    debug!(
        "request: command={:?} atyp={:?} target={}",
        request.command,
        request.addr_type(),
        host_port(&request.address, request.port)
    );

    if request.command != Command::Connect {
        send_failure(stream, ReplyCode::CommandNotSupported).await;
        return Err(Socks5Error::CommandNotSupported(request.command as u8));
    }

    // DOMAIN and IPv6 decode fine but are not dialed
    if request.addr_type() != AddressType::IPv4 {
        send_failure(stream, ReplyCode::AddrTypeUnsupported).await;
        return Err(Socks5Error::TypeNotSupported(request.addr_type() as u8));
    }

    let target = host_port(&request.address, request.port);
    handle_connect_cmd(stream, target).await
}

// ================
// CONNECT COMMAND
// ================

/// handle_connect_cmd dials the target and sends the success reply carrying
/// the proxy's own local address for the new connection
async fn handle_connect_cmd<S>(stream: &mut S, target: String) -> Result<TcpStream>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match TcpStream::connect(&target).await {
        Ok(outbound) => {
            let bound_addr = outbound.local_addr()?;
            encode_reply(stream, ReplyCode::Succeeded, bound_addr).await?;

            // DEBUG
            info!("connected to {target} via {bound_addr}");

            Ok(outbound)
        }
        Err(e) => {
            error!("failed to connect to {target}: {e}");
            send_failure(stream, ReplyCode::ConnectionRefused).await;
            Err(Socks5Error::Connect { target, source: e })
        }
    }
}

// =========
// HELPERS
// =========

/// send_failure writes a failure reply. The connection is being torn down
/// regardless, so a write error is only logged
async fn send_failure<S>(stream: &mut S, code: ReplyCode)
where
    S: AsyncWrite + Unpin,
{
    let unspecified = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
    if let Err(e) = encode_reply(stream, code, unspecified).await {
        debug!("failed to send {code:?} reply: {e}");
    }
}
