//! End-to-end tests driving a real proxy over loopback TCP

mod common;

use common::{create_test_listener, handshake, ipv4_request, spawn_proxy};
use minisocks::codec::decode_reply;
use minisocks::{Address, ReplyCode};
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn connect_relays_bytes_both_ways() {
    let proxy = spawn_proxy().await;
    let (target_listener, target) = create_test_listener().await;

    let mut client = handshake(proxy).await;
    client.write_all(&ipv4_request(0x01, target)).await.unwrap();

    let (mut upstream, proxy_side) = timeout(WAIT, target_listener.accept())
        .await
        .unwrap()
        .unwrap();

    let reply = decode_reply(&mut client).await.unwrap();
    assert_eq!(reply.code, ReplyCode::Succeeded);
    assert_eq!(reply.address, Address::IPv4(Ipv4Addr::LOCALHOST));
    assert_eq!(reply.port, proxy_side.port());

    let outbound: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    client.write_all(&outbound).await.unwrap();
    let mut received = vec![0u8; outbound.len()];
    timeout(WAIT, upstream.read_exact(&mut received))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, outbound);

    let inbound = b"\x00\xffreply bytes\r\n".to_vec();
    upstream.write_all(&inbound).await.unwrap();
    let mut received = vec![0u8; inbound.len()];
    timeout(WAIT, client.read_exact(&mut received))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, inbound);
}

#[tokio::test]
async fn client_disconnect_closes_upstream() {
    let proxy = spawn_proxy().await;
    let (target_listener, target) = create_test_listener().await;

    for _ in 0..5 {
        let mut client = handshake(proxy).await;
        client.write_all(&ipv4_request(0x01, target)).await.unwrap();

        let (mut upstream, _) = timeout(WAIT, target_listener.accept())
            .await
            .unwrap()
            .unwrap();
        let reply = decode_reply(&mut client).await.unwrap();
        assert_eq!(reply.code, ReplyCode::Succeeded);

        drop(client);

        let mut rest = Vec::new();
        let read = timeout(WAIT, upstream.read_to_end(&mut rest))
            .await
            .expect("upstream was not closed")
            .unwrap_or(0);
        assert_eq!(read, 0);
    }
}

#[tokio::test]
async fn destination_close_reaches_client() {
    let proxy = spawn_proxy().await;
    let (target_listener, target) = create_test_listener().await;

    let mut client = handshake(proxy).await;
    client.write_all(&ipv4_request(0x01, target)).await.unwrap();

    let (mut upstream, _) = timeout(WAIT, target_listener.accept())
        .await
        .unwrap()
        .unwrap();
    let reply = decode_reply(&mut client).await.unwrap();
    assert_eq!(reply.code, ReplyCode::Succeeded);

    upstream.write_all(b"response").await.unwrap();
    drop(upstream);

    let mut received = Vec::new();
    timeout(WAIT, client.read_to_end(&mut received))
        .await
        .expect("client never saw the destination close")
        .unwrap();
    assert_eq!(received, b"response");
}

#[tokio::test]
async fn bind_command_is_refused() {
    let proxy = spawn_proxy().await;
    let (target_listener, target) = create_test_listener().await;

    let mut client = handshake(proxy).await;
    client.write_all(&ipv4_request(0x02, target)).await.unwrap();

    let mut raw = [0u8; 10];
    client.read_exact(&mut raw).await.unwrap();
    assert_eq!(raw, [5, 7, 0, 1, 0, 0, 0, 0, 0, 0]);

    // Proxy closes the client after the failure reply
    let mut rest = Vec::new();
    assert_eq!(timeout(WAIT, client.read_to_end(&mut rest)).await.unwrap().unwrap(), 0);

    assert!(
        timeout(Duration::from_millis(100), target_listener.accept())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn no_acceptable_method_closes_connection() {
    let proxy = spawn_proxy().await;

    let mut client = TcpStream::connect(proxy).await.unwrap();
    client.write_all(&[0x05, 0x02, 0x01, 0x02]).await.unwrap();

    let mut resp = [0u8; 2];
    client.read_exact(&mut resp).await.unwrap();
    assert_eq!(resp, [0x05, 0xFF]);

    let mut rest = Vec::new();
    assert_eq!(timeout(WAIT, client.read_to_end(&mut rest)).await.unwrap().unwrap(), 0);
}

#[tokio::test]
async fn bad_client_does_not_stop_the_server() {
    let proxy = spawn_proxy().await;

    let mut bad = TcpStream::connect(proxy).await.unwrap();
    bad.write_all(&[0x04, 0x01, 0x00]).await.unwrap();
    drop(bad);

    // A well-behaved client is still served
    let _client = timeout(WAIT, handshake(proxy)).await.unwrap();
}

#[tokio::test]
async fn binding_twice_is_an_error() {
    let mut server = minisocks::Socks5Server::new("127.0.0.1:0");
    server.bind().await.unwrap();
    assert!(server.bind().await.is_err());
}
