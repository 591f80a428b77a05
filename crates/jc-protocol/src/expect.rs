//! Expect-style matching over the console text stream
//!
//! Console output arrives in arbitrary chunks. The buffer accumulates it
//! and answers the one question the session cares about: has any of these
//! markers appeared yet, and what text came before it?

/// Result of a successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectMatch {
    /// Index of the marker that matched, into the slice passed to `take_match`
    pub index: usize,
    /// Text received before the marker
    pub before: String,
}

/// Accumulates console text until a marker is found
#[derive(Debug, Default, Clone)]
pub struct ExpectBuffer {
    text: String,
    /// Trailing bytes of a UTF-8 sequence still being received
    partial: Vec<u8>,
}

impl ExpectBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes received from the console.
    ///
    /// Carriage returns are dropped so that callers only ever see `\n`
    /// line endings. An incomplete UTF-8 sequence at the end of `bytes` is
    /// held back until the rest of it arrives; invalid bytes become U+FFFD.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.partial.extend_from_slice(bytes);

        let mut decoded = String::new();
        let mut rest = self.partial.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    decoded.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.partial = rest.to_vec();
        self.push_str(&decoded);
    }

    /// Append already-decoded text
    pub fn push_str(&mut self, chunk: &str) {
        self.text.extend(chunk.chars().filter(|c| *c != '\r'));
    }

    /// Find the earliest occurrence of any marker.
    ///
    /// On a match the buffer is drained through the end of the marker and
    /// the preceding text is returned. When two markers start at the same
    /// position the one listed first wins. Returns `None` and leaves the
    /// buffer untouched when nothing matches yet.
    pub fn take_match(&mut self, markers: &[&str]) -> Option<ExpectMatch> {
        let (index, start, len) = markers
            .iter()
            .enumerate()
            .filter(|(_, marker)| !marker.is_empty())
            .filter_map(|(i, marker)| self.text.find(marker).map(|pos| (i, pos, marker.len())))
            .min_by_key(|&(i, pos, _)| (pos, i))?;

        let before = self.text[..start].to_string();
        self.text.drain(..start + len);
        Some(ExpectMatch { index, before })
    }

    /// Drain everything received so far, including any incomplete
    /// trailing sequence
    pub fn take_all(&mut self) -> String {
        let mut text = std::mem::take(&mut self.text);
        if !self.partial.is_empty() {
            text.push_str(&String::from_utf8_lossy(&self.partial));
            self.partial.clear();
        }
        text
    }

    /// Text received but not yet matched
    pub fn pending(&self) -> &str {
        &self.text
    }

    /// Whether the buffer holds no text
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.partial.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{COMMAND_PROMPTS, INTERACTIVE_PROMPT, STANDARD_PROMPT};

    #[test]
    fn test_no_match_keeps_text() {
        let mut buf = ExpectBuffer::new();
        buf.push_str("Adding a new Group");

        assert!(buf.take_match(&[INTERACTIVE_PROMPT]).is_none());
        assert_eq!(buf.pending(), "Adding a new Group");
    }

    #[test]
    fn test_match_across_chunks() {
        let mut buf = ExpectBuffer::new();
        buf.push_bytes(b"Successfully added\r\njc");
        assert!(buf.take_match(&[STANDARD_PROMPT]).is_none());

        buf.push_bytes(b"li : ");
        let m = buf.take_match(&[STANDARD_PROMPT]).unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(m.before, "Successfully added\n");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_earliest_marker_wins() {
        let mut buf = ExpectBuffer::new();
        buf.push_str("Adding a new User: (ok: save, ko: exit)\n> jcli : ");

        let m = buf.take_match(&COMMAND_PROMPTS).unwrap();
        assert_eq!(m.index, 1);
        assert_eq!(m.before, "Adding a new User: (ok: save, ko: exit)\n");
        assert_eq!(buf.pending(), "jcli : ");
    }

    #[test]
    fn test_remainder_is_kept_for_next_match() {
        let mut buf = ExpectBuffer::new();
        buf.push_str("one> two> ");

        assert_eq!(buf.take_match(&[INTERACTIVE_PROMPT]).unwrap().before, "one");
        assert_eq!(buf.take_match(&[INTERACTIVE_PROMPT]).unwrap().before, "two");
        assert!(buf.take_match(&[INTERACTIVE_PROMPT]).is_none());
    }

    #[test]
    fn test_take_all_drains() {
        let mut buf = ExpectBuffer::new();
        buf.push_str("partial output");
        assert_eq!(buf.take_all(), "partial output");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_character_split_across_chunks() {
        let mut buf = ExpectBuffer::new();
        buf.push_bytes(b"#jos\xC3");
        assert_eq!(buf.pending(), "#jos");
        assert!(!buf.is_empty());

        buf.push_bytes(b"\xA9_group\njcli : ");
        let m = buf.take_match(&[STANDARD_PROMPT]).unwrap();
        assert_eq!(m.before, "#jos\u{e9}_group\n");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let mut buf = ExpectBuffer::new();
        buf.push_bytes(b"a\xFFb\xE2\x82");
        assert_eq!(buf.pending(), "a\u{fffd}b");

        assert_eq!(buf.take_all(), "a\u{fffd}b\u{fffd}");
        assert!(buf.is_empty());
    }
}
