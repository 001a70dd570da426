use crate::constants::{JPEG_EOI, JPEG_SOI};
use crate::error::{PTZError, Result};
use std::ops::Range;
use strum_macros::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
pub enum DigestAlgorithm {
    #[strum(serialize = "MD5", ascii_case_insensitive)]
    Md5,
    #[strum(serialize = "MD5-sess", ascii_case_insensitive)]
    Md5Sess,
}

/// A `WWW-Authenticate: Digest ...` challenge (RFC 2617).
#[derive(Debug, Clone, PartialEq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    /// `Some("auth")` when the server offers it; `auth-int` alone is not supported.
    pub qop: Option<String>,
    pub algorithm: DigestAlgorithm,
}

impl DigestChallenge {
    pub fn parse(header: &str) -> Result<Self> {
        let header = header.trim();
        let params = match header.split_once(char::is_whitespace) {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("digest") => rest,
            _ => {
                return Err(PTZError::AuthenticationError(format!(
                    "Not a digest challenge: {}",
                    header
                )));
            }
        };

        let mut realm = None;
        let mut nonce = None;
        let mut opaque = None;
        let mut qop_offered = None;
        let mut algorithm = DigestAlgorithm::Md5;

        for (key, value) in split_auth_params(params) {
            match key.to_ascii_lowercase().as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "opaque" => opaque = Some(value),
                "qop" => qop_offered = Some(value),
                "algorithm" => {
                    algorithm = value.parse().map_err(|_| {
                        PTZError::AuthenticationError(format!(
                            "Unsupported digest algorithm: {}",
                            value
                        ))
                    })?
                }
                _ => {}
            }
        }

        let qop = match qop_offered {
            None => None,
            Some(offered) if offered.split(',').any(|q| q.trim() == "auth") => {
                Some("auth".to_string())
            }
            Some(offered) => {
                return Err(PTZError::AuthenticationError(format!(
                    "Unsupported qop: {}",
                    offered
                )));
            }
        };

        Ok(Self {
            realm: realm.ok_or_else(|| {
                PTZError::AuthenticationError("Challenge without realm".to_string())
            })?,
            nonce: nonce.ok_or_else(|| {
                PTZError::AuthenticationError("Challenge without nonce".to_string())
            })?,
            opaque,
            qop,
            algorithm,
        })
    }

    /// Value of the `Authorization` header answering this challenge.
    pub fn authorization(
        &self,
        method: &str,
        uri: &str,
        username: &str,
        password: &str,
        cnonce: &str,
        nc: u32,
    ) -> String {
        let mut ha1 = md5_hex(&format!("{}:{}:{}", username, self.realm, password));
        if self.algorithm == DigestAlgorithm::Md5Sess {
            ha1 = md5_hex(&format!("{}:{}:{}", ha1, self.nonce, cnonce));
        }
        let ha2 = md5_hex(&format!("{}:{}", method, uri));
        let nc = format!("{:08x}", nc);

        let response = match &self.qop {
            Some(qop) => md5_hex(&format!(
                "{}:{}:{}:{}:{}:{}",
                ha1, self.nonce, nc, cnonce, qop, ha2
            )),
            None => md5_hex(&format!("{}:{}:{}", ha1, self.nonce, ha2)),
        };

        let mut header = format!(
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", algorithm={}, response="{}""#,
            username,
            self.realm,
            self.nonce,
            uri,
            self.algorithm.as_ref(),
            response
        );
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(r#", opaque="{}""#, opaque));
        }
        if let Some(qop) = &self.qop {
            header.push_str(&format!(r#", qop={}, nc={}, cnonce="{}""#, qop, nc, cnonce));
        }
        header
    }
}

pub fn new_cnonce() -> String {
    format!("{:016x}", rand::random::<u64>())
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Splits `a="x, y", b=z` into pairs, honouring quoted commas.
fn split_auth_params(input: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ',').is_some() {}

        let key: String = std::iter::from_fn(|| chars.next_if(|c| *c != '=' && *c != ','))
            .collect();
        if key.trim().is_empty() {
            break;
        }
        if chars.next_if_eq(&'=').is_none() {
            continue;
        }

        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            while let Some(c) = chars.next() {
                match c {
                    '\\' => value.extend(chars.next()),
                    '"' => break,
                    _ => value.push(c),
                }
            }
        } else {
            value.extend(std::iter::from_fn(|| chars.next_if(|c| *c != ',')));
            value = value.trim().to_string();
        }
        pairs.push((key.trim().to_string(), value));
    }

    pairs
}

/// Parses a `ptz.cgi?query=position` body into raw key/value pairs.
///
/// Each non-blank line is split on its first `=`. The whole body fails if
/// any line has no separator, so callers can apply the result all at once.
pub fn parse_position(body: &str) -> Result<Vec<(String, String)>> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| {
                    PTZError::ParseError(format!("Line without '=' separator: {:?}", line))
                })
        })
        .collect()
}

/// Incremental search for the first complete JPEG in a growing buffer.
///
/// Marker segments are skipped by their length field, so `FF D9` bytes inside
/// COM/APPn payloads (EXIF thumbnails included) do not end the image. Only
/// entropy-coded data after SOS is scanned byte by byte. Each call resumes
/// where the previous one stopped; `buf` must only ever grow.
#[derive(Debug, Default)]
pub struct JpegScanner {
    start: Option<usize>,
    pos: usize,
    entropy: bool,
}

impl JpegScanner {
    /// Byte range of the first complete JPEG, EOI marker included, or `None`
    /// if more data is needed.
    pub fn scan(&mut self, buf: &[u8]) -> Option<Range<usize>> {
        loop {
            let Some(start) = self.start else {
                let from = self.pos;
                match buf[from..].windows(2).position(|w| w == JPEG_SOI) {
                    Some(i) => {
                        self.start = Some(from + i);
                        self.pos = from + i + 2;
                        self.entropy = false;
                        continue;
                    }
                    None => {
                        // Keep a trailing 0xFF: it may start a split SOI
                        self.pos = buf.len().saturating_sub(1).max(from);
                        return None;
                    }
                }
            };

            if self.entropy {
                let mut i = self.pos;
                loop {
                    if i + 1 >= buf.len() {
                        self.pos = i;
                        return None;
                    }
                    if buf[i] != 0xFF {
                        i += 1;
                        continue;
                    }
                    match buf[i + 1] {
                        0x00 | 0xD0..=0xD7 => i += 2,
                        0xFF => i += 1,
                        _ => break,
                    }
                }
                self.pos = i;
                self.entropy = false;
            }

            let i = self.pos;
            if i + 1 >= buf.len() {
                return None;
            }
            if buf[i] != 0xFF {
                self.resync(start);
                continue;
            }
            if buf[i..i + 2] == JPEG_EOI {
                self.start = None;
                self.pos = i + 2;
                return Some(start..i + 2);
            }
            match buf[i + 1] {
                0xFF => self.pos = i + 1,
                0x01 | 0xD0..=0xD7 => self.pos = i + 2,
                0xD8 => {
                    self.start = None;
                    self.pos = i;
                }
                marker => {
                    if i + 3 >= buf.len() {
                        return None;
                    }
                    let len = u16::from_be_bytes([buf[i + 2], buf[i + 3]]) as usize;
                    if len < 2 {
                        self.resync(start);
                        continue;
                    }
                    self.pos = i + 2 + len;
                    // Start of scan: entropy-coded data follows the header
                    self.entropy = marker == 0xDA;
                }
            }
        }
    }

    /// Not a JPEG after all; look for the next SOI.
    fn resync(&mut self, start: usize) {
        self.start = None;
        self.pos = start + 2;
        self.entropy = false;
    }
}

/// Byte range of the first complete JPEG image in `buf`, EOI marker included.
pub fn find_jpeg(buf: &[u8]) -> Option<Range<usize>> {
    JpegScanner::default().scan(buf)
}
