//! Minimal HTTP/1.1 server for exercising the client against real sockets.

use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};

pub const CONNECTION_CLOSED: &str = "<connection closed>";

const IO_TIMEOUT: Duration = Duration::from_secs(5);

pub enum Reply {
    /// Written in full, then the connection is closed.
    Close(String),
    /// Written, then the connection is held until the client hangs up, which
    /// is reported as [`CONNECTION_CLOSED`].
    HoldUntilClosed(String),
}

pub fn json_response(body: &str) -> Reply {
    Reply::Close(format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    ))
}

pub fn status_response(status: u16) -> Reply {
    Reply::Close(format!(
        "HTTP/1.1 {status} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    ))
}

fn event_stream_head() -> &'static str {
    "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n"
}

/// Event stream that ends after `body`.
pub fn event_stream(body: &str) -> Reply {
    Reply::Close(format!("{}{body}", event_stream_head()))
}

/// Event stream that stays open after `body`.
pub fn open_event_stream(body: &str) -> Reply {
    Reply::HoldUntilClosed(format!("{}{body}", event_stream_head()))
}

pub struct TestServer {
    addr: SocketAddr,
    requests: Receiver<String>,
}

impl TestServer {
    /// Serves one reply per accepted connection, in order.
    pub fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let (tx, requests) = mpsc::channel();

        thread::spawn(move || {
            for reply in replies {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                serve(stream, reply, &tx);
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn next_request(&self) -> String {
        self.requests
            .recv_timeout(IO_TIMEOUT)
            .expect("server should observe a request")
    }
}

fn serve(mut stream: TcpStream, reply: Reply, tx: &Sender<String>) {
    stream
        .set_read_timeout(Some(IO_TIMEOUT))
        .expect("set read timeout");
    let request = read_request(&mut stream);
    let _ = tx.send(request);

    match reply {
        Reply::Close(raw) => {
            let _ = stream.write_all(raw.as_bytes());
            let _ = stream.flush();
        }
        Reply::HoldUntilClosed(raw) => {
            let _ = stream.write_all(raw.as_bytes());
            let _ = stream.flush();
            let tx = tx.clone();
            thread::spawn(move || {
                let mut buf = [0_u8; 64];
                loop {
                    match stream.read(&mut buf) {
                        Ok(0) => break,
                        Ok(_) => continue,
                        Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => continue,
                        Err(error) if error.kind() == std::io::ErrorKind::TimedOut => continue,
                        Err(_) => break,
                    }
                }
                let _ = tx.send(CONNECTION_CLOSED.to_owned());
            });
        }
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0_u8; 1024];

    let header_end = loop {
        if let Some(position) = find(&raw, b"\r\n\r\n") {
            break position + 4;
        }
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&raw).into_owned(),
            Ok(read) => raw.extend_from_slice(&buf[..read]),
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while raw.len() < header_end + content_length {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(read) => raw.extend_from_slice(&buf[..read]),
        }
    }

    String::from_utf8_lossy(&raw).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
