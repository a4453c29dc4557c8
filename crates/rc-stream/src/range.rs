//! `Range` header parsing.
//!
//! Only a single contiguous `bytes=<start>-[<end>]` range is accepted. Suffix
//! ranges (`bytes=-N`) and comma-separated range lists are rejected as
//! malformed.

use std::fmt;

use crate::error::RangeError;

/// An inclusive byte span `[start, end]` within a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered by the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always `false`; an inclusive range covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The `Content-Range` value describing this span of a `total`-byte resource.
    pub fn content_range(&self, total: u64) -> ContentRange {
        ContentRange {
            start: self.start,
            end: self.end,
            total,
        }
    }
}

/// Value of a `Content-Range` response header for a served span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ContentRange {
    /// The `Content-Range` value sent alongside a 416 response.
    pub fn unsatisfied(total: u64) -> String {
        format!("bytes */{total}")
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Parse an optional `Range` header against a resource of `total_size` bytes.
///
/// Returns `Ok(None)` when no header was sent. An omitted end bound resolves
/// to the last byte of the resource.
pub fn parse(header: Option<&str>, total_size: u64) -> Result<Option<ByteRange>, RangeError> {
    let Some(value) = header else {
        return Ok(None);
    };
    let (start, end) = parse_bounds(value)?;
    resolve(start, end, total_size).map(Some)
}

/// Split `bytes=<start>-[<end>]` into its numeric bounds.
fn parse_bounds(value: &str) -> Result<(u64, Option<u64>), RangeError> {
    let value = value.trim();
    let set = value
        .strip_prefix("bytes=")
        .ok_or_else(|| RangeError::Malformed(format!("expected `bytes=` unit in {value:?}")))?;

    if set.contains(',') {
        return Err(RangeError::Malformed(
            "multiple ranges are not supported".into(),
        ));
    }

    let (start_str, end_str) = set
        .split_once('-')
        .ok_or_else(|| RangeError::Malformed(format!("missing `-` in {set:?}")))?;
    let start_str = start_str.trim();
    let end_str = end_str.trim();

    if start_str.is_empty() {
        return Err(RangeError::Malformed(
            "suffix ranges are not supported".into(),
        ));
    }

    let start = parse_offset(start_str)?;
    let end = if end_str.is_empty() {
        None
    } else {
        Some(parse_offset(end_str)?)
    };

    Ok((start, end))
}

fn parse_offset(s: &str) -> Result<u64, RangeError> {
    // `u64::from_str` accepts a leading '+', which is not valid in a range.
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed(format!("invalid byte offset {s:?}")));
    }
    s.parse()
        .map_err(|_| RangeError::Malformed(format!("byte offset {s:?} is out of range")))
}

/// Resolve parsed bounds against the resource size.
pub fn resolve(start: u64, end: Option<u64>, total_size: u64) -> Result<ByteRange, RangeError> {
    let unsatisfiable = RangeError::Unsatisfiable {
        start,
        end,
        total: total_size,
    };

    if start >= total_size {
        return Err(unsatisfiable);
    }

    let last = total_size - 1;
    let end = end.unwrap_or(last);
    if end > last || start > end {
        return Err(unsatisfiable);
    }

    Ok(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed(header: &str) -> bool {
        matches!(parse(Some(header), 1000), Err(RangeError::Malformed(_)))
    }

    fn unsatisfiable(header: &str, total: u64) -> bool {
        matches!(
            parse(Some(header), total),
            Err(RangeError::Unsatisfiable { .. })
        )
    }

    #[test]
    fn absent_header_is_none() {
        assert_eq!(parse(None, 1000), Ok(None));
        assert_eq!(parse(None, 0), Ok(None));
    }

    #[test]
    fn closed_range() {
        assert_eq!(
            parse(Some("bytes=100-199"), 2048),
            Ok(Some(ByteRange::new(100, 199)))
        );
    }

    #[test]
    fn open_range_runs_to_end() {
        assert_eq!(
            parse(Some("bytes=500-"), 1000),
            Ok(Some(ByteRange::new(500, 999)))
        );
    }

    #[test]
    fn whole_file_range() {
        let total = 1_430_145;
        let range = parse(Some("bytes=0-1430144"), total).unwrap().unwrap();
        assert_eq!(range, ByteRange::new(0, 1_430_144));
        assert_eq!(range.len(), total);
        assert_eq!(
            range.content_range(total).to_string(),
            "bytes 0-1430144/1430145"
        );
    }

    #[test]
    fn tolerates_whitespace() {
        assert_eq!(
            parse(Some("  bytes= 10 - 20 "), 100),
            Ok(Some(ByteRange::new(10, 20)))
        );
    }

    #[test]
    fn every_valid_closed_range_parses() {
        for total in 1..=12u64 {
            for start in 0..total {
                for end in start..total {
                    let header = format!("bytes={start}-{end}");
                    assert_eq!(
                        parse(Some(&header), total),
                        Ok(Some(ByteRange::new(start, end))),
                        "{header} of {total}"
                    );
                }
            }
        }
    }

    #[test]
    fn every_open_range_ends_at_last_byte() {
        for total in 1..=12u64 {
            for start in 0..total {
                let header = format!("bytes={start}-");
                assert_eq!(
                    parse(Some(&header), total),
                    Ok(Some(ByteRange::new(start, total - 1)))
                );
            }
        }
    }

    #[test]
    fn out_of_bounds_is_unsatisfiable() {
        for total in 1..=8u64 {
            for start in 0..total + 3 {
                for end in 0..total + 3 {
                    let header = format!("bytes={start}-{end}");
                    let expect_err = start >= total || end >= total || start > end;
                    assert_eq!(
                        unsatisfiable(&header, total),
                        expect_err,
                        "{header} of {total}"
                    );
                }
            }
        }
    }

    #[test]
    fn open_range_past_end_is_unsatisfiable() {
        assert!(unsatisfiable("bytes=1000-", 1000));
        assert_eq!(
            parse(Some("bytes=1000-"), 1000),
            Err(RangeError::Unsatisfiable {
                start: 1000,
                end: None,
                total: 1000
            })
        );
    }

    #[test]
    fn empty_resource_has_no_satisfiable_range() {
        assert!(unsatisfiable("bytes=0-", 0));
        assert!(unsatisfiable("bytes=0-0", 0));
    }

    #[test]
    fn malformed_headers() {
        assert!(malformed("invalid"));
        assert!(malformed("bytes"));
        assert!(malformed("bytes="));
        assert!(malformed("bytes=-"));
        assert!(malformed("bytes=abc-def"));
        assert!(malformed("bytes=10"));
        assert!(malformed("bytes=10-x"));
        assert!(malformed("bytes=1-2-3"));
        assert!(malformed("bytes=+1-2"));
        assert!(malformed("bytes=-1-2"));
        assert!(malformed("items=0-10"));
        assert!(malformed("Bytes=0-10"));
        assert!(malformed("bytes=99999999999999999999-"));
    }

    #[test]
    fn suffix_range_is_malformed() {
        assert_eq!(
            parse(Some("bytes=-500"), 1000),
            Err(RangeError::Malformed("suffix ranges are not supported".into()))
        );
    }

    #[test]
    fn multiple_ranges_are_malformed() {
        assert_eq!(
            parse(Some("bytes=0-10,20-30"), 1000),
            Err(RangeError::Malformed(
                "multiple ranges are not supported".into()
            ))
        );
        // Rejected before bounds are checked.
        assert!(malformed("bytes=0-10, 5000-6000"));
    }

    #[test]
    fn unsatisfied_content_range() {
        assert_eq!(ContentRange::unsatisfied(2048), "bytes */2048");
    }
}
