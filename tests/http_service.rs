use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use midia::settings::ServiceSettings;
use midia::{HttpTransformService, TransformError, TransformService};

/// Serves exactly one request with a canned response and hands back the raw
/// request body it received.
fn serve_once(
    status_line: &str,
    content_type: &str,
    body: &[u8],
) -> (String, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status_line,
        content_type,
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut content_length = None;
        let mut chunked = false;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            let lower = line.to_ascii_lowercase();
            if let Some(value) = lower.strip_prefix("content-length:") {
                content_length = value.trim().parse::<usize>().ok();
            }
            if lower.starts_with("transfer-encoding:") && lower.contains("chunked") {
                chunked = true;
            }
        }

        let mut request_body = Vec::new();
        if let Some(len) = content_length {
            request_body.resize(len, 0);
            reader.read_exact(&mut request_body).unwrap();
        } else if chunked {
            loop {
                let mut size_line = String::new();
                reader.read_line(&mut size_line).unwrap();
                let size = usize::from_str_radix(size_line.trim(), 16).unwrap();
                let mut chunk = vec![0; size + 2];
                reader.read_exact(&mut chunk).unwrap();
                if size == 0 {
                    break;
                }
                request_body.extend_from_slice(&chunk[..size]);
            }
        }

        let mut stream = stream;
        stream.write_all(&response).unwrap();
        stream.flush().unwrap();
        request_body
    });

    (base_url, handle)
}

fn service(base_url: String) -> HttpTransformService {
    HttpTransformService::new(&ServiceSettings {
        base_url,
        timeout_secs: Some(10),
        ..ServiceSettings::default()
    })
    .unwrap()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn uploads_file_field_and_returns_body() {
    let (base_url, server) = serve_once("200 OK", "audio/midi", b"processed bytes");
    let client = service(base_url);

    let result = client.transform("song.mid", b"MThd original").unwrap();
    let request = server.join().unwrap();

    assert_eq!(result, b"processed bytes");
    assert!(contains(&request, b"name=\"file\""));
    assert!(contains(&request, b"filename=\"song.mid\""));
    assert!(contains(&request, b"MThd original"));
}

#[test]
fn structured_error_is_reported() {
    let (base_url, server) = serve_once(
        "500 Internal Server Error",
        "application/json",
        br#"{"error": "bad format"}"#,
    );
    let client = service(base_url);

    let err = client.transform("song.mid", b"MThd").unwrap_err();
    server.join().unwrap();

    assert_eq!(err, TransformError::Service("bad format".into()));
}

#[test]
fn error_object_with_ok_status_is_reported() {
    let (base_url, server) = serve_once(
        "200 OK",
        "application/json",
        br#"{"error": "Could not decode MIDI"}"#,
    );
    let client = service(base_url);

    let err = client.transform("song.mid", b"MThd").unwrap_err();
    server.join().unwrap();

    assert_eq!(err, TransformError::Service("Could not decode MIDI".into()));
}

#[test]
fn health_probe() {
    let (base_url, server) = serve_once(
        "200 OK",
        "application/json",
        br#"{"status": "OK", "version": "1.1.0"}"#,
    );
    let client = service(base_url);

    let health = client.health().unwrap();
    server.join().unwrap();

    assert_eq!(health.status, "OK");
    assert_eq!(health.version, "1.1.0");
}

#[test]
fn unreachable_service_is_a_transport_failure() {
    // bind then drop so the port is very likely closed
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = service(format!("http://127.0.0.1:{}", port));

    let err = client.transform("song.mid", b"MThd").unwrap_err();

    assert!(matches!(err, TransformError::Transport(_)));
}

#[test]
fn silent_service_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    // accept and read, but never answer
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0; 1024];
        let _ = stream.read(&mut buf);
        std::thread::sleep(Duration::from_secs(3));
    });

    let client = HttpTransformService::new(&ServiceSettings {
        base_url,
        timeout_secs: Some(1),
        ..ServiceSettings::default()
    })
    .unwrap();

    let started = Instant::now();
    let err = client.transform("song.mid", b"MThd").unwrap_err();

    assert_eq!(err, TransformError::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(3));
    server.join().unwrap();
}
