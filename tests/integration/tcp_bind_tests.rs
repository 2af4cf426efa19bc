//! TCP listener binding.

use ktrl::server::listener::ServerListener;
use ktrl::TransportConfig;

#[tokio::test]
async fn tcp_listener_ignores_configured_host() {
    let transport = TransportConfig::tcp("203.0.113.9", 0);
    let listener = ServerListener::bind(&transport).await.expect("bind");
    let addr = listener.tcp_addr().expect("tcp address");
    assert!(addr.ip().is_unspecified(), "bound {addr}");
    assert!(addr.is_ipv4());
    assert_ne!(addr.port(), 0);
}

#[tokio::test]
async fn socket_listener_has_no_tcp_address() {
    let temp = tempfile::tempdir().expect("tempdir");
    let transport = TransportConfig::socket(temp.path(), "ktrl.sock");
    match ServerListener::bind(&transport).await {
        Ok(listener) => assert!(listener.tcp_addr().is_none()),
        Err(err) => assert!(cfg!(not(unix)), "bind failed: {err}"),
    }
}
