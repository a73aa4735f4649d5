use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::AppConfig;
use crate::data::{load_advantage_table, PokemonSource};
use crate::tournament::{Rng, TypeAdvantageTable};

pub mod api;
pub mod routes;
pub mod session;

pub use session::SessionStore;

const MAX_HEADER_BYTES: usize = 16_384;
const MAX_BODY_BYTES: usize = 1 << 20;
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything a request handler needs. Owned by the server loop and passed
/// to [`routes::route_request`] by reference.
pub struct AppState {
    pub config: AppConfig,
    pub source: Box<dyn PokemonSource>,
    pub table: TypeAdvantageTable,
    pub sessions: SessionStore,
    rng: Mutex<Rng>,
}

impl AppState {
    pub fn new(config: AppConfig, source: Box<dyn PokemonSource>, table: TypeAdvantageTable, rng: Rng) -> Self {
        Self {
            config,
            source,
            table,
            sessions: SessionStore::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Build the advantage table from `source` and seed the generator.
    pub fn load(config: AppConfig, source: Box<dyn PokemonSource>, seed: Option<u64>) -> Self {
        let table = load_advantage_table(source.as_ref());
        Self::new(config, source, table, Rng::from_seed_or_entropy(seed))
    }

    pub fn rng(&self) -> MutexGuard<'_, Rng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn run_server(state: &AppState) -> io::Result<()> {
    let bind_addr = state.config.bind_addr.as_str();
    let listener = TcpListener::bind(bind_addr)?;
    tracing::info!(source = %state.source.describe(), "pokebracket server listening on http://{bind_addr}");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, state) {
                    tracing::warn!(error = %err, "request error");
                }
            }
            Err(err) => tracing::warn!(error = %err, "connection failed"),
        }
    }

    Ok(())
}

fn handle_connection(stream: &mut TcpStream, state: &AppState) -> io::Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let response = match read_request(stream) {
        Ok(Some(request)) => {
            let response = routes::route_request(&request.method, &request.path, &request.body, state);
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                status = response.status_code,
                "handled request"
            );
            response
        }
        Ok(None) => return Ok(()),
        Err(err) if err.kind() == io::ErrorKind::InvalidData => {
            tracing::warn!(error = %err, "request rejected");
            routes::error_response(413, "Payload Too Large", &err.to_string())
        }
        Err(err) if err.kind() == io::ErrorKind::InvalidInput => {
            tracing::warn!(error = %err, "request rejected");
            routes::error_response(400, "Bad Request", &err.to_string())
        }
        Err(err) => return Err(err),
    };
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}

struct Request {
    method: String,
    path: String,
    body: String,
}

/// Read one request: headers up to the blank line, then exactly
/// `Content-Length` body bytes however many reads they take.
///
/// Oversized headers or bodies fail with `InvalidData`, an unparsable
/// length with `InvalidInput`. Without a `Content-Length` header the body is
/// whatever arrived alongside the headers. `Ok(None)` means the peer closed
/// without sending anything.
fn read_request<R: Read>(reader: &mut R) -> io::Result<Option<Request>> {
    let mut buffer = Vec::with_capacity(4096);
    let mut chunk = [0_u8; 4096];
    let (head_end, body_start) = loop {
        if let Some(found) = find_header_end(&buffer) {
            break found;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "request headers too large"));
        }
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            break (buffer.len(), buffer.len());
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET").to_string();
    let path = request_parts.next().unwrap_or("/").to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .map(|(_, value)| {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid content-length"))
        })
        .transpose()?;

    let mut body = buffer.split_off(body_start);
    if let Some(length) = content_length {
        if length > MAX_BODY_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("request body of {length} bytes exceeds {MAX_BODY_BYTES}"),
            ));
        }
        let received = body.len();
        if received < length {
            body.resize(length, 0);
            reader.read_exact(&mut body[received..])?;
        }
        body.truncate(length);
    }

    Ok(Some(Request {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    }))
}

/// Offsets of the end of the headers and the start of the body.
fn find_header_end(buffer: &[u8]) -> Option<(usize, usize)> {
    if let Some(at) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
        return Some((at, at + 4));
    }
    buffer.windows(2).position(|window| window == b"\n\n").map(|at| (at, at + 2))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{Shutdown, TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::data::{PoolSnapshot, SnapshotSource};
    use crate::tournament::{BaseStat, Contestant};

    fn state() -> AppState {
        let contestants: Vec<Contestant> = (1..=12)
            .map(|id| Contestant::new(id, format!("mon-{id}"), ["normal"], [BaseStat::new("total", 100 + i64::from(id))]))
            .collect();
        let snapshot = PoolSnapshot {
            fetched_at: String::new(),
            source: "fixture".to_string(),
            contestants,
            categories: Vec::new(),
        };
        let config = AppConfig {
            pool_size: 4,
            max_fetch_attempts: 1_000,
            ..AppConfig::default()
        };
        AppState::load(config, Box::new(SnapshotSource::new("fixture", snapshot)), Some(3))
    }

    #[test]
    fn body_sent_after_the_headers_still_reaches_the_session() {
        let state = state();
        let stored: Vec<Contestant> = (100..=103)
            .map(|id| Contestant::new(id, format!("stored-{id}"), ["normal"], [BaseStat::new("total", i64::from(id))]))
            .collect();
        let session = state.sessions.insert(stored);

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let client = thread::spawn(move || {
            let body = format!(r#"{{"session":"{session}"}}"#);
            let mut stream = TcpStream::connect(addr).expect("connect");
            let head = format!(
                "POST /api/tournament HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).expect("write headers");
            stream.flush().expect("flush");
            thread::sleep(Duration::from_millis(100));
            stream.write_all(body.as_bytes()).expect("write body");
            stream.shutdown(Shutdown::Write).expect("shutdown");
            let mut response = String::new();
            stream.read_to_string(&mut response).expect("read response");
            response
        });

        let (mut stream, _) = listener.accept().expect("accept");
        handle_connection(&mut stream, &state).expect("handled");
        drop(stream);

        let response = client.join().expect("client thread");
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        let (_, json) = response.split_once("\r\n\r\n").expect("response body");
        let payload: serde_json::Value = serde_json::from_str(json).expect("json body");
        assert_eq!(payload["session"], session.to_string());
        let champion = payload["champion"]["id"].as_u64().expect("champion id");
        assert!((100..=103).contains(&champion));
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn body_with_blank_line_is_kept_whole() {
        let body = "{\n\n  \"session\": null\n}";
        let raw = format!("POST /api/tournament HTTP/1.1\r\nContent-Length: {}\r\n\r\n{body}", body.len());
        let request = read_request(&mut raw.as_bytes()).expect("read").expect("request");
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/tournament");
        assert_eq!(request.body, body);
    }

    #[test]
    fn header_names_are_case_insensitive_and_extra_bytes_are_dropped() {
        let raw = "POST /x HTTP/1.1\r\ncontent-length: 2\r\n\r\n{}trailing";
        let request = read_request(&mut raw.as_bytes()).expect("read").expect("request");
        assert_eq!(request.body, "{}");
    }

    #[test]
    fn oversized_or_invalid_lengths_are_rejected() {
        let raw = format!("POST /x HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY_BYTES + 1);
        let err = read_request(&mut raw.as_bytes()).err().expect("too large");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let raw = "POST /x HTTP/1.1\r\nContent-Length: lots\r\n\r\n";
        let err = read_request(&mut raw.as_bytes()).err().expect("not a number");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn truncated_body_is_an_error_and_empty_stream_is_none() {
        let raw = "POST /x HTTP/1.1\r\nContent-Length: 10\r\n\r\n{}";
        let err = read_request(&mut raw.as_bytes()).err().expect("short body");
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        assert!(read_request(&mut &b""[..]).expect("read").is_none());
    }
}
