use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// relay copies bytes between the client and upstream streams.
///
/// upstream -> client runs on a spawned task while client -> upstream runs
/// here. Each direction shuts down its write half when its source ends, so a
/// close on either side reaches the other peer. Once the client side ends
/// the spawned direction is aborted rather than joined and both streams are
/// dropped. Returns the number of bytes sent by the client.
pub async fn relay<C, U>(client: C, upstream: U) -> u64
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    U: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut client_read, mut client_write) = io::split(client);
    let (mut upstream_read, mut upstream_write) = io::split(upstream);

    let downstream = tokio::spawn(async move {
        match io::copy(&mut upstream_read, &mut client_write).await {
            Ok(bytes) => debug!("upstream -> client finished: {bytes} bytes"),
            Err(e) => debug!("upstream -> client error: {e}"),
        }
        if let Err(e) = client_write.shutdown().await {
            debug!("client shutdown error: {e}");
        }
    });

    let from_client = match io::copy(&mut client_read, &mut upstream_write).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("client -> upstream error: {e}");
            0
        }
    };

    // Propagate the client's close before tearing the pair down
    if let Err(e) = upstream_write.shutdown().await {
        debug!("upstream shutdown error: {e}");
    }
    downstream.abort();

    from_client
}
