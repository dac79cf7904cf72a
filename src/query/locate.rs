//! Placeholder location in SQL text.
//!
//! A single forward byte scan. Quoted strings (`'…'`), quoted identifiers
//! (`"…"`, `` `…` ``) are skipped; doubled quotes inside them are honoured,
//! backslash escapes only under [`StringEscapes::Backslash`]. A literal
//! still open at end of input is an error. Comments and dollar-quoted
//! bodies are *not* recognized, so a `?` or `:word` inside them is
//! reported as a placeholder. SQL produced by a query builder does not
//! contain those.

use compact_str::CompactString;
use smallvec::SmallVec;

use super::types::{PlaceholderOccurrence, PlaceholderStyle, PlaceholderToken, StringEscapes};
use crate::error::RenderError;

/// Occurrences of one statement (typically few)
pub type Occurrences = SmallVec<[PlaceholderOccurrence; 8]>;

/// Find all placeholders of the given style in ascending offset order.
///
/// In named style `::` is a type cast and is skipped, while a lone `:` not
/// followed by an identifier character is an error.
pub fn locate_placeholders(
    sql: &str,
    style: PlaceholderStyle,
    escapes: StringEscapes
) -> Result<Occurrences, RenderError> {
    let bytes = sql.as_bytes();
    let mut found = Occurrences::new();
    let mut quote: Option<(u8, usize)> = None;
    let mut ordinal = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some((q, _)) = quote {
            if b == b'\\' && q != b'`' && escapes == StringEscapes::Backslash {
                i += 2;
                continue;
            }
            if b == q {
                if bytes.get(i + 1) == Some(&q) {
                    i += 2;
                    continue;
                }
                quote = None;
            }
            i += 1;
            continue;
        }

        match (b, style) {
            (b'\'' | b'"' | b'`', _) => quote = Some((b, i)),
            (b'?', PlaceholderStyle::Positional) => {
                found.push(PlaceholderOccurrence {
                    offset: i,
                    len:    1,
                    token:  PlaceholderToken::Positional(ordinal)
                });
                ordinal += 1;
            }
            (b':', PlaceholderStyle::Named) => {
                if bytes.get(i + 1) == Some(&b':') {
                    i += 2;
                    continue;
                }
                let end = identifier_end(bytes, i + 1);
                if end == i + 1 {
                    return Err(RenderError::MalformedPlaceholderSyntax { offset: i });
                }
                found.push(PlaceholderOccurrence {
                    offset: i,
                    len:    end - i,
                    token:  PlaceholderToken::Named(CompactString::from(&sql[i + 1..end]))
                });
                i = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if let Some((_, offset)) = quote {
        return Err(RenderError::UnterminatedLiteral { offset });
    }

    Ok(found)
}

fn identifier_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| !is_identifier_byte(*b))
        .map_or(bytes.len(), |n| start + n)
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
