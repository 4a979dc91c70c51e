use std::net::TcpStream;

use tracing::info;

use crate::error::{Result, TransportError};
use crate::line::LineTransport;

/// Connect to a TCP serial bridge (ser2net, esp-link, socat).
///
/// Bridges forward bytes only; [`Transport::assert_reset`](crate::Transport::assert_reset)
/// on the returned transport reports [`TransportError::Unsupported`].
pub fn connect_tcp(addr: &str) -> Result<LineTransport<TcpStream>> {
    let stream = TcpStream::connect(addr).map_err(|source| TransportError::Open {
        port: addr.to_string(),
        source,
    })?;
    stream.set_nodelay(true)?;
    info!(addr, "connected to serial bridge");
    Ok(LineTransport::new(stream))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::TcpListener;
    use std::time::Duration;

    use super::*;
    use crate::Transport;

    #[test]
    fn connects_and_reads_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"#!ready\r\n").unwrap();
        });

        let mut transport = connect_tcp(&addr).unwrap();
        let line = transport.read_line(Duration::from_secs(2)).unwrap();
        assert_eq!(line, "#!ready");

        server.join().unwrap();
    }

    #[test]
    fn refused_connection_names_address() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = connect_tcp(&addr).unwrap_err();
        assert!(matches!(err, TransportError::Open { ref port, .. } if *port == addr));
    }
}
