//! Client-side parameter interpolation for the text protocol.
//!
//! In [`ProtocolMode::TextInterpolated`](crate::opts::ProtocolMode) the
//! connection renders bound values as SQL literals and sends one plain query,
//! so the server never sees a prepared statement.

use std::fmt::Write;

use memchr::{memchr, memchr2, memchr3};

use crate::error::{Error, Result};
use crate::value::Value;

/// Byte offsets of `?` placeholders outside quoted strings and identifiers.
pub fn placeholder_offsets(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut offsets = Vec::new();
    let mut pos = 0;
    let mut backtick = memchr(b'`', bytes);

    while pos < bytes.len() {
        if backtick.is_some_and(|b| b < pos) {
            backtick = memchr(b'`', &bytes[pos..]).map(|i| pos + i);
        }
        let plain = memchr3(b'?', b'\'', b'"', &bytes[pos..]).map(|i| pos + i);
        let Some(at) = earliest(plain, backtick) else {
            break;
        };
        match bytes[at] {
            b'?' => {
                offsets.push(at);
                pos = at + 1;
            }
            quote => pos = skip_quoted(bytes, at + 1, quote),
        }
    }

    offsets
}

/// Number of `?` placeholders outside quotes.
pub fn count_placeholders(sql: &str) -> usize {
    placeholder_offsets(sql).len()
}

/// Replace every placeholder in `sql` with the literal form of the matching value.
///
/// The placeholder count must equal `params.len()`.
pub fn interpolate(sql: &str, params: &[Value]) -> Result<String> {
    let offsets = placeholder_offsets(sql);
    if offsets.len() != params.len() {
        return Err(Error::InvalidUsage(format!(
            "statement has {} placeholders but {} parameters were bound",
            offsets.len(),
            params.len()
        )));
    }

    let mut out = String::with_capacity(sql.len() + params.len() * 4);
    let mut last = 0;
    for (offset, value) in offsets.into_iter().zip(params) {
        out.push_str(&sql[last..offset]);
        write_literal(&mut out, value)?;
        last = offset + 1;
    }
    out.push_str(&sql[last..]);
    Ok(out)
}

/// Append `value` as a SQL literal.
pub fn write_literal(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Int(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::UInt(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Double(v) => {
            if !v.is_finite() {
                return Err(Error::InvalidUsage(format!(
                    "cannot interpolate non-finite float {}",
                    v
                )));
            }
            let _ = write!(out, "{:?}", v);
        }
        Value::Text(s) => {
            out.push('\'');
            escape_into(out, s);
            out.push('\'');
        }
        Value::Bytes(bytes) => {
            out.push_str("X'");
            for b in bytes {
                let _ = write!(out, "{:02X}", b);
            }
            out.push('\'');
        }
    }
    Ok(())
}

/// Backslash escaping as understood by the server without NO_BACKSLASH_ESCAPES.
fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
}

fn earliest(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Returns the position just past the quote that closes the one before `start`.
/// An unterminated quote swallows the rest of the input.
fn skip_quoted(bytes: &[u8], mut start: usize, quote: u8) -> usize {
    loop {
        let rest = &bytes[start..];
        let found = if quote == b'`' {
            memchr(quote, rest)
        } else {
            memchr2(quote, b'\\', rest)
        };
        let Some(found) = found else {
            return bytes.len();
        };
        let at = start + found;
        if bytes[at] == b'\\' {
            start = (at + 2).min(bytes.len());
        } else if bytes.get(at + 1) == Some(&quote) {
            // doubled quote
            start = at + 2;
        } else {
            return at + 1;
        }
    }
}
