//! In-process stand-in for an Axis camera: serves canned CGI responses over
//! plain HTTP/1.1, one request per connection, and records every request.

#![allow(dead_code)]

use axis_ptz_rs::protocol::DigestChallenge;
use image::{DynamicImage, ImageBuffer, Rgb};
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub const USER: &str = "root";
pub const PASS: &str = "Pass123";
pub const REALM: &str = "AXIS_ACCC8E000000";
pub const NONCE: &str = "0000a1b2c3d4e5f6";
pub const BOUNDARY: &str = "myboundary";

#[derive(Debug, Clone)]
pub struct Request {
    /// Path and query, e.g. `/axis-cgi/com/ptz.cgi?query=position`
    pub target: String,
    pub authorization: Option<String>,
}

pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Stream the body without Content-Length and close afterwards.
    pub streaming: bool,
}

impl Reply {
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "text/plain".into())],
            body: body.as_bytes().to_vec(),
            streaming: false,
        }
    }

    pub fn challenge() -> Self {
        Self {
            status: 401,
            headers: vec![
                ("WWW-Authenticate".into(), format!(r#"Basic realm="{}""#, REALM)),
                (
                    "WWW-Authenticate".into(),
                    format!(
                        r#"Digest realm="{}", nonce="{}", algorithm=MD5, qop="auth""#,
                        REALM, NONCE
                    ),
                ),
            ],
            body: b"Unauthorized".to_vec(),
            streaming: false,
        }
    }

    pub fn mjpeg(frames: &[Vec<u8>]) -> Self {
        let mut body = Vec::new();
        for frame in frames {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
                    BOUNDARY,
                    frame.len()
                )
                .as_bytes(),
            );
            body.extend_from_slice(frame);
            body.extend_from_slice(b"\r\n");
        }
        Self::stream(body)
    }

    pub fn stream(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: vec![(
                "Content-Type".into(),
                format!("multipart/x-mixed-replace; boundary={}", BOUNDARY),
            )],
            body,
            streaming: true,
        }
    }
}

pub type Handler = Arc<dyn Fn(&Request) -> Reply + Send + Sync>;

pub struct MockCamera {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockCamera {
    /// Serves `handler` for requests that carry a valid digest answer and
    /// challenges every other request, except the unauthenticated ping.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Reply + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |req: &Request| {
            if req.target.starts_with("/axis-cgi/pingtest.cgi") {
                return handler(req);
            }
            match &req.authorization {
                Some(auth) if digest_is_valid(auth, &req.target) => handler(req),
                _ => Reply::challenge(),
            }
        });
        Self::start_raw(handler).await
    }

    /// Serves `handler` for every request, without authentication.
    pub async fn start_raw(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let (read, mut write) = stream.into_split();
                    let mut reader = BufReader::new(read);

                    let mut request_line = String::new();
                    if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
                        return;
                    }
                    let target = request_line
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or_default()
                        .to_string();

                    let mut authorization = None;
                    loop {
                        let mut line = String::new();
                        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                            break;
                        }
                        let line = line.trim_end();
                        if line.is_empty() {
                            break;
                        }
                        if let Some((name, value)) = line.split_once(':')
                            && name.eq_ignore_ascii_case("authorization")
                        {
                            authorization = Some(value.trim().to_string());
                        }
                    }

                    let request = Request {
                        target,
                        authorization,
                    };
                    log.lock().unwrap().push(request.clone());
                    let reply = handler(&request);

                    let mut head = format!("HTTP/1.1 {} Mock\r\nConnection: close\r\n", reply.status);
                    for (name, value) in &reply.headers {
                        head.push_str(&format!("{}: {}\r\n", name, value));
                    }
                    if !reply.streaming {
                        head.push_str(&format!("Content-Length: {}\r\n", reply.body.len()));
                    }
                    head.push_str("\r\n");

                    let _ = write.write_all(head.as_bytes()).await;
                    let _ = write.write_all(&reply.body).await;
                    let _ = write.shutdown().await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests that got past the digest challenge.
    pub fn authorized_targets(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.authorization.is_some())
            .map(|r| r.target)
            .collect()
    }
}

/// Recomputes the expected digest response with the client's cnonce.
fn digest_is_valid(authorization: &str, target: &str) -> bool {
    let field = |name: &str| -> Option<String> {
        let start = authorization.find(&format!("{}=", name))? + name.len() + 1;
        let rest = &authorization[start..];
        let value = match rest.strip_prefix('"') {
            Some(quoted) => quoted.split('"').next()?,
            None => rest.split(',').next()?,
        };
        Some(value.trim().to_string())
    };

    let (Some(uri), Some(cnonce), Some(response)) = (field("uri"), field("cnonce"), field("response"))
    else {
        return false;
    };
    if uri != target || field("username").as_deref() != Some(USER) {
        return false;
    }

    let challenge = DigestChallenge::parse(&format!(
        r#"Digest realm="{}", nonce="{}", qop="auth""#,
        REALM, NONCE
    ))
    .unwrap();
    let expected = challenge.authorization("GET", target, USER, PASS, &cnonce, 1);
    expected.contains(&format!(r#"response="{}""#, response))
}

/// Address of a local port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn sample_jpeg(shade: u8) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(8, 6, Rgb([shade, 0, 255 - shade]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}
