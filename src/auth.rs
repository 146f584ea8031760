use crate::codec::{
    MethodNegotiationRequest, decode_negotiation_request, encode_negotiation_response,
};
use crate::error::{Result, Socks5Error};
use crate::protocol::AuthMethod;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// negotiate handles authentication negotiation between the SOCKS server and client.
/// Only "no authentication required" is ever selected; anything else ends the connection
pub async fn negotiate<S>(stream: &mut S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = decode_negotiation_request(stream).await?;

    // DEBUG
    debug!(
        "client hello: version={:?} nmethods={} methods={:?}",
        request.version,
        request.n_methods(),
        request.methods
    );

    let method = select_auth_method(&request);
    encode_negotiation_response(stream, method).await?;

    match method {
        AuthMethod::NoAuth => Ok(()),
        _ => Err(Socks5Error::NoAcceptableMethod),
    }
}

/// select_auth_method takes the client hello and returns the method
/// the server will use
fn select_auth_method(request: &MethodNegotiationRequest) -> AuthMethod {
    // Preferred auth method order
    const PREFERRED_METHODS: &[AuthMethod] = &[AuthMethod::NoAuth];

    for &preferred in PREFERRED_METHODS {
        if request.offers(preferred) {
            return preferred;
        }
    }

    AuthMethod::NoAcceptable
}
