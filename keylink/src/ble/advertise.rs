//! Advertising payload parsing.

/// AD type of the complete local name field.
const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;

/// Iterator over the length-type-value structures of an advertising payload.
///
/// Stops at the first zero-length entry or at any structure that runs past
/// the end of the payload.
struct AdStructures<'a> {
    data: &'a [u8],
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, rest) = self.data.split_first()?;
        if len == 0 {
            return None;
        }
        let (&ad_type, value) = rest.split_first()?;
        let value = value.get(..len as usize - 1)?;
        self.data = &self.data[1 + len as usize..];
        Some((ad_type, value))
    }
}

/// Extract the complete local name (AD type 0x09) from a raw advertising
/// payload.
pub(crate) fn complete_local_name(data: &[u8]) -> Option<&[u8]> {
    AdStructures { data }
        .find(|(ad_type, _)| *ad_type == AD_TYPE_COMPLETE_LOCAL_NAME)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_name_after_flags() {
        // Flags, then "KB_Left"
        let data = [0x02, 0x01, 0x06, 0x08, 0x09, b'K', b'B', b'_', b'L', b'e', b'f', b't'];
        assert_eq!(complete_local_name(&data), Some(&b"KB_Left"[..]));
    }

    #[test]
    fn test_no_name_field() {
        // Flags and a 16-bit service list only
        let data = [0x02, 0x01, 0x06, 0x03, 0x03, 0x0f, 0x18];
        assert_eq!(complete_local_name(&data), None);
    }

    #[test]
    fn test_shortened_name_not_matched() {
        // Shortened local name (0x08) must not satisfy the exact-name filter
        let data = [0x03, 0x08, b'K', b'B'];
        assert_eq!(complete_local_name(&data), None);
    }

    #[test]
    fn test_truncated_structure() {
        // Length byte claims more data than the payload holds
        let data = [0x02, 0x01, 0x06, 0x10, 0x09, b'K', b'B'];
        assert_eq!(complete_local_name(&data), None);
    }

    #[test]
    fn test_zero_length_terminator() {
        // Parsing stops at the zero byte, the name behind it is unreachable
        let data = [0x02, 0x01, 0x06, 0x00, 0x03, 0x09, b'K', b'B'];
        assert_eq!(complete_local_name(&data), None);
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(complete_local_name(&[]), None);
    }

    #[test]
    fn test_name_is_first_field() {
        let data = [0x09, 0x09, b'K', b'B', b'_', b'R', b'i', b'g', b'h', b't'];
        assert_eq!(complete_local_name(&data), Some(&b"KB_Right"[..]));
    }
}
