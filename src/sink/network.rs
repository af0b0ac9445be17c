use crate::config::SocketType;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
const WRITE_TIMEOUT: Duration = Duration::from_millis(500);
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Socket to a log collector, opened on first write.
///
/// Over UDP every write is one datagram. Over TCP a write that fails or
/// stalls past the write timeout drops the stream, and writes fail fast until
/// the reconnect backoff has passed. The failed bytes are not resent.
#[derive(Debug)]
pub struct Connection {
    host: String,
    port: u16,
    socket_type: SocketType,
    udp: Option<(UdpSocket, SocketAddr)>,
    tcp: Option<TcpStream>,
    write_timeout: Duration,
    backoff: Duration,
    retry_after: Option<Instant>,
}

impl Connection {
    pub fn new(host: impl Into<String>, port: u16, socket_type: SocketType) -> Self {
        Self {
            host: host.into(),
            port,
            socket_type,
            udp: None,
            tcp: None,
            write_timeout: WRITE_TIMEOUT,
            backoff: RECONNECT_BACKOFF,
            retry_after: None,
        }
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    pub fn is_connected(&self) -> bool {
        self.udp.is_some() || self.tcp.is_some()
    }

    fn resolve(&self) -> io::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address for {}:{}", self.host, self.port),
                )
            })
    }

    fn udp_socket(&mut self) -> io::Result<&(UdpSocket, SocketAddr)> {
        if self.udp.is_none() {
            let target = self.resolve()?;
            let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
            let socket = UdpSocket::bind(local)?;
            debug!(target = %target, "UDP log socket bound");
            self.udp = Some((socket, target));
        }
        self.udp
            .as_ref()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))
    }

    fn connect_tcp(&self) -> io::Result<TcpStream> {
        let target = self.resolve()?;
        let stream = TcpStream::connect_timeout(&target, CONNECT_TIMEOUT)?;
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(self.write_timeout))?;
        debug!(target = %target, "TCP log connection established");
        Ok(stream)
    }

    fn tcp_stream(&mut self) -> io::Result<&mut TcpStream> {
        if self.tcp.is_none() {
            if let Some(retry_after) = self.retry_after
                && Instant::now() < retry_after
            {
                return Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    format!("log collector {}:{} unavailable", self.host, self.port),
                ));
            }
            match self.connect_tcp() {
                Ok(stream) => {
                    self.retry_after = None;
                    self.tcp = Some(stream);
                }
                Err(e) => {
                    self.start_backoff();
                    return Err(e);
                }
            }
        }
        self.tcp
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))
    }

    fn start_backoff(&mut self) {
        self.tcp = None;
        self.retry_after = Some(Instant::now() + self.backoff);
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.socket_type {
            SocketType::Udp => {
                let (socket, target) = self.udp_socket()?;
                socket.send_to(buf, *target)
            }
            SocketType::Tcp => {
                let result = self.tcp_stream()?.write(buf);
                if let Err(e) = &result {
                    warn!(host = %self.host, port = self.port, error = %e, "Dropping stalled log connection");
                    self.start_backoff();
                }
                result
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.tcp.as_mut() {
            Some(stream) => stream.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;

    #[test]
    fn test_udp_write_is_one_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut connection = Connection::new("127.0.0.1", port, SocketType::Udp);
        assert!(!connection.is_connected());
        connection.write_all(b"hello\n").unwrap();
        assert!(connection.is_connected());

        let mut buf = [0u8; 64];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"hello\n");
    }

    #[test]
    fn test_tcp_connects_lazily() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut connection = Connection::new("127.0.0.1", port, SocketType::Tcp);
        connection.write_all(b"line one\n").unwrap();
        connection.flush().unwrap();

        let (socket, _) = listener.accept().unwrap();
        let mut line = String::new();
        BufReader::new(socket).read_line(&mut line).unwrap();
        assert_eq!(line, "line one\n");
    }

    #[test]
    fn test_tcp_refused_is_io_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut connection = Connection::new("127.0.0.1", port, SocketType::Tcp);
        assert!(connection.write_all(b"lost\n").is_err());
        assert!(!connection.is_connected());
    }

    #[test]
    fn test_refused_collector_fails_fast_until_backoff_passes() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut connection = Connection::new("127.0.0.1", port, SocketType::Tcp)
            .with_backoff(Duration::from_millis(200));
        assert!(connection.write_all(b"first\n").is_err());

        let err = connection.write_all(b"second\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);

        let listener = TcpListener::bind(("127.0.0.1", port)).unwrap();
        std::thread::sleep(Duration::from_millis(250));
        connection.write_all(b"third\n").unwrap();
        let (socket, _) = listener.accept().unwrap();
        let mut line = String::new();
        BufReader::new(socket).read_line(&mut line).unwrap();
        assert_eq!(line, "third\n");
    }

    #[test]
    fn test_stalled_collector_write_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut connection = Connection::new("127.0.0.1", port, SocketType::Tcp)
            .with_write_timeout(Duration::from_millis(100));

        // Nobody reads, so the socket buffers fill and the write stalls.
        let chunk = vec![b'x'; 1 << 20];
        let started = Instant::now();
        let mut failed = false;
        for _ in 0..64 {
            if connection.write_all(&chunk).is_err() {
                failed = true;
                break;
            }
        }
        assert!(failed);
        assert!(!connection.is_connected());
        assert!(started.elapsed() < Duration::from_secs(3));
        drop(listener);
    }
}
