//! RESP2 frames
//!
//! Only the subset needed for `PING`, `SET` and `GET` plus the reply shapes a
//! Redis-compatible server may send back.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{ClientError, ClientResult};

const CRLF: &[u8] = b"\r\n";

/// Deepest array nesting accepted from a server
pub const MAX_DEPTH: usize = 32;

/// A RESP2 value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `+OK`
    Simple(String),
    /// `-ERR ...`
    Error(String),
    /// `:42`
    Integer(i64),
    /// `$3\r\nfoo`
    Bulk(Bytes),
    /// `$-1` or `*-1`
    Null,
    /// `*2 ...`
    Array(Vec<Frame>),
}

impl Frame {
    /// Parse one frame from the front of `buf`
    ///
    /// Returns `Ok(None)` and leaves `buf` untouched when more bytes are needed.
    pub fn parse(buf: &mut BytesMut) -> ClientResult<Option<Frame>> {
        match parse_at(&buf[..], 0, 0)? {
            Some((frame, end)) => {
                buf.advance(end);
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }

    /// Encode frame to bytes
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            Frame::Simple(s) => {
                dst.put_u8(b'+');
                dst.put_slice(s.as_bytes());
                dst.put_slice(CRLF);
            }
            Frame::Error(s) => {
                dst.put_u8(b'-');
                dst.put_slice(s.as_bytes());
                dst.put_slice(CRLF);
            }
            Frame::Integer(n) => put_line(dst, b':', *n),
            Frame::Bulk(data) => {
                put_line(dst, b'$', data.len() as i64);
                dst.put_slice(data);
                dst.put_slice(CRLF);
            }
            Frame::Null => dst.put_slice(b"$-1\r\n"),
            Frame::Array(items) => {
                put_line(dst, b'*', items.len() as i64);
                for item in items {
                    item.encode(dst);
                }
            }
        }
    }
}

/// Encode a command as an array of bulk strings
pub fn encode_command(args: &[&[u8]], dst: &mut BytesMut) {
    put_line(dst, b'*', args.len() as i64);
    for arg in args {
        put_line(dst, b'$', arg.len() as i64);
        dst.put_slice(arg);
        dst.put_slice(CRLF);
    }
}

fn put_line(dst: &mut BytesMut, prefix: u8, n: i64) {
    dst.put_u8(prefix);
    dst.put_slice(n.to_string().as_bytes());
    dst.put_slice(CRLF);
}

fn find_crlf(src: &[u8], from: usize) -> Option<usize> {
    src[from..]
        .windows(2)
        .position(|w| w == CRLF)
        .map(|i| from + i)
}

fn parse_text(line: &[u8]) -> ClientResult<String> {
    String::from_utf8(line.to_vec())
        .map_err(|_| ClientError::Protocol("non-UTF-8 status line".to_string()))
}

fn parse_int(line: &[u8]) -> ClientResult<i64> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ClientError::Protocol(format!("invalid length {:?}", String::from_utf8_lossy(line))))
}

fn parse_at(src: &[u8], pos: usize, depth: usize) -> ClientResult<Option<(Frame, usize)>> {
    let Some(&kind) = src.get(pos) else {
        return Ok(None);
    };
    let Some(line_end) = find_crlf(src, pos + 1) else {
        return Ok(None);
    };
    let line = &src[pos + 1..line_end];
    let next = line_end + CRLF.len();

    let parsed = match kind {
        b'+' => (Frame::Simple(parse_text(line)?), next),
        b'-' => (Frame::Error(parse_text(line)?), next),
        b':' => (Frame::Integer(parse_int(line)?), next),
        b'$' => {
            let len = parse_int(line)?;
            if len == -1 {
                return Ok(Some((Frame::Null, next)));
            }
            let len = usize::try_from(len)
                .map_err(|_| ClientError::Protocol(format!("negative bulk length {len}")))?;
            let end = next + len;
            if src.len() < end + CRLF.len() {
                return Ok(None);
            }
            if &src[end..end + CRLF.len()] != CRLF {
                return Err(ClientError::Protocol("bulk string not terminated".to_string()));
            }
            (Frame::Bulk(Bytes::copy_from_slice(&src[next..end])), end + CRLF.len())
        }
        b'*' => {
            if depth >= MAX_DEPTH {
                return Err(ClientError::Protocol(format!(
                    "arrays nested deeper than {MAX_DEPTH}"
                )));
            }
            let len = parse_int(line)?;
            if len == -1 {
                return Ok(Some((Frame::Null, next)));
            }
            let len = usize::try_from(len)
                .map_err(|_| ClientError::Protocol(format!("negative array length {len}")))?;
            let mut items = Vec::with_capacity(len.min(1024));
            let mut cursor = next;
            for _ in 0..len {
                match parse_at(src, cursor, depth + 1)? {
                    Some((item, end)) => {
                        items.push(item);
                        cursor = end;
                    }
                    None => return Ok(None),
                }
            }
            (Frame::Array(items), cursor)
        }
        other => {
            return Err(ClientError::Protocol(format!(
                "unexpected frame type byte 0x{other:02x}"
            )))
        }
    };

    Ok(Some(parsed))
}
