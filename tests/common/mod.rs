//! Test utilities shared by the integration tests

use minisocks::Socks5Server;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Start a proxy on an OS-assigned port and return its address
pub async fn spawn_proxy() -> SocketAddr {
    let mut server = Socks5Server::new("127.0.0.1:0");
    let addr = server.bind().await.unwrap();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Connect to the proxy and complete the no-auth handshake
pub async fn handshake(proxy: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream.write_all(&[0x05, 0x01, 0x00]).await.unwrap();
    let mut resp = [0u8; 2];
    stream.read_exact(&mut resp).await.unwrap();
    assert_eq!(resp, [0x05, 0x00], "expected NO_AUTH accepted");
    stream
}

/// Build a request frame for an IPv4 destination
pub fn ipv4_request(command: u8, target: SocketAddr) -> Vec<u8> {
    let SocketAddr::V4(v4) = target else {
        panic!("expected an IPv4 target");
    };
    let mut frame = vec![0x05, command, 0x00, 0x01];
    frame.extend_from_slice(&v4.ip().octets());
    frame.extend_from_slice(&v4.port().to_be_bytes());
    frame
}
