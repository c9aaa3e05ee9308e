// Helper functions for UTF-16 string operations
pub fn utf8_to_utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

pub fn utf16_to_utf8(v: &[u16]) -> String {
    String::from_utf16_lossy(v)
}

pub fn utf16_char_at(v: &[u16], index: usize) -> Option<Vec<u16>> {
    v.get(index).map(|c| vec![*c])
}

pub fn utf16_concat(left: &[u16], right: &[u16]) -> Vec<u16> {
    let mut res = Vec::with_capacity(left.len() + right.len());
    res.extend_from_slice(left);
    res.extend_from_slice(right);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_non_bmp() {
        let s = "a😀b";
        let v = utf8_to_utf16(s);
        assert_eq!(v.len(), 4);
        assert_eq!(utf16_to_utf8(&v), s);
    }

    #[test]
    fn char_at_out_of_range() {
        let v = utf8_to_utf16("ab");
        assert_eq!(utf16_char_at(&v, 1), Some(vec![b'b' as u16]));
        assert_eq!(utf16_char_at(&v, 2), None);
    }
}
