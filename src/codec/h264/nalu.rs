/// Walks NAL units stored as 4-byte big-endian length + payload.
///
/// Iteration stops at the first length prefix that claims more bytes than
/// remain; [`LengthPrefixedNalus::truncated`] then reports the offending
/// size. Tails of four bytes or less cannot hold a unit and are ignored.
#[derive(Debug)]
pub struct LengthPrefixedNalus<'a> {
    data: &'a [u8],
    offset: usize,
    truncated: Option<Truncation>,
}

/// A length prefix pointing past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    /// End offset the prefix asked for (offset + 4 + declared length).
    pub wanted: usize,
    pub available: usize,
}

impl<'a> LengthPrefixedNalus<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            truncated: None,
        }
    }

    pub fn truncated(&self) -> Option<Truncation> {
        self.truncated
    }
}

impl<'a> Iterator for LengthPrefixedNalus<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.truncated.is_some() || self.offset + 4 >= self.data.len() {
            return None;
        }
        let i = self.offset;
        let size = u32::from_be_bytes([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]) as usize;
        let end = i + 4 + size;
        if end > self.data.len() {
            self.truncated = Some(Truncation {
                wanted: end,
                available: self.data.len(),
            });
            return None;
        }
        self.offset = end;
        Some(&self.data[i + 4..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_walks_units() {
        let data = [0, 0, 0, 2, 0x65, 0x88, 0, 0, 0, 1, 0x41];
        let mut nalus = LengthPrefixedNalus::new(&data);
        assert_eq!(nalus.next(), Some(&[0x65, 0x88][..]));
        assert_eq!(nalus.next(), Some(&[0x41][..]));
        assert_eq!(nalus.next(), None);
        assert_eq!(nalus.truncated(), None);
    }

    #[test]
    fn test_stops_at_oversized_prefix() {
        let data = [0, 0, 0, 1, 0x41, 0, 0, 0, 9, 0x41, 0x42];
        let mut nalus = LengthPrefixedNalus::new(&data);
        assert_eq!(nalus.next(), Some(&[0x41][..]));
        assert_eq!(nalus.next(), None);
        assert_eq!(
            nalus.truncated(),
            Some(Truncation {
                wanted: 18,
                available: 11
            })
        );
        assert_eq!(nalus.next(), None);
    }

    #[test]
    fn test_short_tail_is_ignored() {
        let data = [0, 0, 0, 1, 0x41, 0, 0, 0];
        let units: Vec<_> = LengthPrefixedNalus::new(&data).collect();
        assert_eq!(units.len(), 1);
    }
}
