/// One read from a running snippet's output stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedChunk {
    /// Seconds since the snippet started executing.
    pub elapsed: f64,
    pub bytes: Vec<u8>,
}

impl TimedChunk {
    pub fn new(elapsed: f64, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            elapsed,
            bytes: bytes.into(),
        }
    }
}

/// Marker inserted into raw output for a gap of `secs` seconds.
///
/// ```
/// use snipcheck_core::output::timed::gap_marker;
///
/// assert_eq!(gap_marker(3), "<~3s>\n");
/// ```
pub fn gap_marker(secs: u64) -> String {
    format!("<~{}s>\n", secs)
}

/// Rounds half away from zero, so `0.5` becomes `1`. Negative and NaN times count as `0`.
fn round_secs(elapsed: f64) -> u64 {
    if elapsed.is_nan() || elapsed <= 0.0 {
        0
    } else {
        elapsed.round() as u64
    }
}

/// Flattens timed chunks into one string, marking every change of the rounded
/// elapsed second with a [`gap_marker`].
///
/// Chunks within the same rounded second are concatenated as they are.
/// Empty chunks still move the clock; a stream without any payload yields `""`.
pub fn build<'c, I>(chunks: I) -> String
where
    I: IntoIterator<Item = &'c TimedChunk>,
{
    let mut buf: Vec<u8> = Vec::new();
    let mut previous = 0u64;
    let mut has_payload = false;

    for chunk in chunks {
        let mut bytes = chunk.bytes.as_slice();
        has_payload |= !bytes.is_empty();

        // CR LF split over two reads
        if buf.last() == Some(&b'\r') && bytes.first() == Some(&b'\n') {
            buf.pop();
            buf.push(b'\n');
            bytes = &bytes[1..];
        }

        let rounded = round_secs(chunk.elapsed);
        if rounded > previous {
            buf.extend_from_slice(gap_marker(rounded - previous).as_bytes());
            previous = rounded;
        }
        buf.extend_from_slice(bytes);
    }

    if !has_payload {
        return String::new();
    }
    String::from_utf8_lossy(&buf).replace("\r\n", "\n")
}
