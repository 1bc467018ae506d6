//! Compact integer encodings shared by the trie readers and builders.
//!
//! Both serialized forms fold small magnitudes directly into a node's lead
//! unit and spend trailing units only on larger ones. Values are signed
//! 32-bit integers (negative values always take the widest, "escape" form);
//! jump deltas are non-negative forward offsets.

/// A short, fixed-capacity run of encoded units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Encoded<T, const N: usize> {
    units: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> Encoded<T, N> {
    fn new() -> Self {
        Self {
            units: [T::default(); N],
            len: 0,
        }
    }

    fn single(unit: T) -> Self {
        let mut encoded = Self::new();
        encoded.push(unit);
        encoded
    }

    fn push(&mut self, unit: T) {
        self.units[self.len] = unit;
        self.len += 1;
    }

    /// The encoded units in storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.units[..self.len]
    }

    /// Number of encoded units.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; an encoding has at least one unit.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn lead_mut(&mut self) -> &mut T {
        &mut self.units[0]
    }
}

/// Byte-oriented encoding used by [`BytesTrie`](crate::BytesTrie).
///
/// A value node's lead byte carries the final flag in bit 0; the remaining
/// seven bits select the width band:
///
/// ```text
/// lead>>1      trailing  value
/// 0x10..=0x50  0         lead-0x10            (0..=0x40)
/// 0x51..=0x6b  1         up to 0x1aff
/// 0x6c..=0x7d  2         up to 0x11ffff
/// 0x7e         3         24 bits
/// 0x7f         4         32 bits, any sign
/// ```
pub mod bytes {
    use super::Encoded;

    pub(crate) const MAX_BRANCH_LINEAR_SUB_NODE_LENGTH: usize = 5;

    // 0x00..0x0f: branch node. A zero lead is followed by an explicit length byte.
    pub(crate) const MIN_LINEAR_MATCH: u8 = 0x10;
    pub(crate) const MAX_LINEAR_MATCH_LENGTH: usize = 0x10;

    pub(crate) const MIN_VALUE_LEAD: u8 = MIN_LINEAR_MATCH + 0x10; // 0x20
    pub(crate) const VALUE_IS_FINAL: u8 = 1;

    const MIN_ONE_BYTE_VALUE_LEAD: u8 = MIN_VALUE_LEAD / 2; // 0x10
    /// Largest value folded into a single lead byte.
    pub const MAX_ONE_BYTE_VALUE: i32 = 0x40;
    const MIN_TWO_BYTE_VALUE_LEAD: u8 = 0x51;
    const MAX_TWO_BYTE_VALUE: i32 = 0x1aff;
    const MIN_THREE_BYTE_VALUE_LEAD: u8 = 0x6c;
    const FOUR_BYTE_VALUE_LEAD: u8 = 0x7e;
    const MAX_THREE_BYTE_VALUE: i32 = 0x11_ffff;
    const FIVE_BYTE_VALUE_LEAD: u8 = 0x7f;

    const MAX_ONE_BYTE_DELTA: usize = 0xbf;
    const MIN_TWO_BYTE_DELTA_LEAD: u8 = 0xc0;
    const MIN_THREE_BYTE_DELTA_LEAD: u8 = 0xf0;
    const FOUR_BYTE_DELTA_LEAD: u8 = 0xfe;
    const FIVE_BYTE_DELTA_LEAD: u8 = 0xff;
    const MAX_TWO_BYTE_DELTA: usize = 0x2fff;
    const MAX_THREE_BYTE_DELTA: usize = 0xd_ffff;

    /// Reads the value whose lead byte, already shifted right by one, was
    /// stored just before `pos`.
    pub(crate) fn read_value(bytes: &[u8], pos: usize, lead: u8) -> i32 {
        let at = |i: usize| i32::from(bytes[pos + i]);
        if lead < MIN_TWO_BYTE_VALUE_LEAD {
            i32::from(lead) - i32::from(MIN_ONE_BYTE_VALUE_LEAD)
        } else if lead < MIN_THREE_BYTE_VALUE_LEAD {
            (i32::from(lead - MIN_TWO_BYTE_VALUE_LEAD) << 8) | at(0)
        } else if lead < FOUR_BYTE_VALUE_LEAD {
            (i32::from(lead - MIN_THREE_BYTE_VALUE_LEAD) << 16) | (at(0) << 8) | at(1)
        } else if lead == FOUR_BYTE_VALUE_LEAD {
            (at(0) << 16) | (at(1) << 8) | at(2)
        } else {
            i32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
        }
    }

    /// Skips the trailing bytes of a value whose full lead byte is `node`.
    pub(crate) fn skip_value_bytes(pos: usize, node: u8) -> usize {
        if node >= MIN_TWO_BYTE_VALUE_LEAD << 1 {
            if node < MIN_THREE_BYTE_VALUE_LEAD << 1 {
                pos + 1
            } else if node < FOUR_BYTE_VALUE_LEAD << 1 {
                pos + 2
            } else {
                pos + 3 + usize::from((node >> 1) & 1)
            }
        } else {
            pos
        }
    }

    pub(crate) fn skip_value(bytes: &[u8], pos: usize) -> usize {
        skip_value_bytes(pos + 1, bytes[pos])
    }

    pub(crate) fn jump_by_delta(bytes: &[u8], pos: usize) -> usize {
        let (delta, pos) = decode_delta(bytes, pos);
        pos + delta
    }

    pub(crate) fn skip_delta(bytes: &[u8], pos: usize) -> usize {
        let delta = bytes[pos];
        let pos = pos + 1;
        if delta >= MIN_TWO_BYTE_DELTA_LEAD {
            if delta < MIN_THREE_BYTE_DELTA_LEAD {
                pos + 1
            } else if delta < FOUR_BYTE_DELTA_LEAD {
                pos + 2
            } else {
                pos + 3 + usize::from(delta & 1)
            }
        } else {
            pos
        }
    }

    /// Decodes the value node at `pos`, returning the value and the position
    /// after it. The final flag is ignored.
    pub fn decode_value(bytes: &[u8], pos: usize) -> (i32, usize) {
        let node = bytes[pos];
        (read_value(bytes, pos + 1, node >> 1), skip_value_bytes(pos + 1, node))
    }

    /// Encodes `value` as a value node.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn encode_value(value: i32, is_final: bool) -> Encoded<u8, 5> {
        let final_bit = u8::from(is_final);
        if (0..=MAX_ONE_BYTE_VALUE).contains(&value) {
            return Encoded::single(((MIN_ONE_BYTE_VALUE_LEAD + value as u8) << 1) | final_bit);
        }
        let mut encoded = Encoded::new();
        if !(0..=0xff_ffff).contains(&value) {
            encoded.push(FIVE_BYTE_VALUE_LEAD);
            for byte in value.to_be_bytes() {
                encoded.push(byte);
            }
        } else if value <= MAX_TWO_BYTE_VALUE {
            encoded.push(MIN_TWO_BYTE_VALUE_LEAD + (value >> 8) as u8);
            encoded.push(value as u8);
        } else if value <= MAX_THREE_BYTE_VALUE {
            encoded.push(MIN_THREE_BYTE_VALUE_LEAD + (value >> 16) as u8);
            encoded.push((value >> 8) as u8);
            encoded.push(value as u8);
        } else {
            encoded.push(FOUR_BYTE_VALUE_LEAD);
            encoded.push((value >> 16) as u8);
            encoded.push((value >> 8) as u8);
            encoded.push(value as u8);
        }
        let lead = encoded.lead_mut();
        *lead = (*lead << 1) | final_bit;
        encoded
    }

    /// Decodes the jump delta at `pos`, returning the delta and the position
    /// after it (the position the delta is relative to).
    pub fn decode_delta(bytes: &[u8], pos: usize) -> (usize, usize) {
        let lead = bytes[pos];
        let pos = pos + 1;
        let at = |i: usize| usize::from(bytes[pos + i]);
        if lead < MIN_TWO_BYTE_DELTA_LEAD {
            (usize::from(lead), pos)
        } else if lead < MIN_THREE_BYTE_DELTA_LEAD {
            ((usize::from(lead - MIN_TWO_BYTE_DELTA_LEAD) << 8) | at(0), pos + 1)
        } else if lead < FOUR_BYTE_DELTA_LEAD {
            (
                (usize::from(lead - MIN_THREE_BYTE_DELTA_LEAD) << 16) | (at(0) << 8) | at(1),
                pos + 2,
            )
        } else if lead == FOUR_BYTE_DELTA_LEAD {
            ((at(0) << 16) | (at(1) << 8) | at(2), pos + 3)
        } else {
            (
                (at(0) << 24) | (at(1) << 16) | (at(2) << 8) | at(3),
                pos + 4,
            )
        }
    }

    /// Encodes a forward jump delta.
    ///
    /// # Panics
    ///
    /// Panics if `delta` does not fit in 32 bits.
    #[allow(clippy::cast_possible_truncation)]
    pub fn encode_delta(delta: usize) -> Encoded<u8, 5> {
        assert!(u32::try_from(delta).is_ok(), "jump delta {delta} exceeds 32 bits");
        if delta <= MAX_ONE_BYTE_DELTA {
            return Encoded::single(delta as u8);
        }
        let mut encoded = Encoded::new();
        if delta <= MAX_TWO_BYTE_DELTA {
            encoded.push(MIN_TWO_BYTE_DELTA_LEAD + (delta >> 8) as u8);
        } else {
            if delta <= MAX_THREE_BYTE_DELTA {
                encoded.push(MIN_THREE_BYTE_DELTA_LEAD + (delta >> 16) as u8);
            } else {
                if delta <= 0xff_ffff {
                    encoded.push(FOUR_BYTE_DELTA_LEAD);
                } else {
                    encoded.push(FIVE_BYTE_DELTA_LEAD);
                    encoded.push((delta >> 24) as u8);
                }
                encoded.push((delta >> 16) as u8);
            }
            encoded.push((delta >> 8) as u8);
        }
        encoded.push(delta as u8);
        encoded
    }
}

/// 16-bit-unit encoding used by [`UnitsTrie`](crate::UnitsTrie).
///
/// Final values and branch-list values keep the final flag in bit 15 and the
/// value (or jump delta) in bits 14..0 plus up to two trailing units. An
/// intermediate value shares its lead unit with the node that follows it:
/// bits 14..6 hold the value band and bits 5..0 the following node's type.
pub mod units {
    use super::Encoded;

    pub(crate) const MAX_BRANCH_LINEAR_SUB_NODE_LENGTH: usize = 5;

    // 0x0000..0x002f: branch node. A zero type is followed by an explicit length unit.
    pub(crate) const MIN_LINEAR_MATCH: u16 = 0x30;
    pub(crate) const MAX_LINEAR_MATCH_LENGTH: usize = 0x10;

    pub(crate) const MIN_VALUE_LEAD: u16 = MIN_LINEAR_MATCH + 0x10; // 0x40
    pub(crate) const NODE_TYPE_MASK: u16 = MIN_VALUE_LEAD - 1; // 0x3f
    pub(crate) const VALUE_IS_FINAL: u16 = 0x8000;

    const MAX_ONE_UNIT_VALUE: i32 = 0x3fff;
    const MIN_TWO_UNIT_VALUE_LEAD: u16 = 0x4000;
    const THREE_UNIT_VALUE_LEAD: u16 = 0x7fff;
    const MAX_TWO_UNIT_VALUE: i32 = 0x3ffe_ffff;

    const MAX_ONE_UNIT_NODE_VALUE: i32 = 0xff;
    const MIN_TWO_UNIT_NODE_VALUE_LEAD: u16 = 0x4040;
    const THREE_UNIT_NODE_VALUE_LEAD: u16 = 0x7fc0;
    const MAX_TWO_UNIT_NODE_VALUE: i32 = 0xfd_ffff;

    const MAX_ONE_UNIT_DELTA: usize = 0xfbff;
    const MIN_TWO_UNIT_DELTA_LEAD: u16 = 0xfc00;
    const THREE_UNIT_DELTA_LEAD: u16 = 0xffff;
    const MAX_TWO_UNIT_DELTA: usize = 0x03fe_ffff;

    #[allow(clippy::cast_possible_wrap)]
    fn pair(high: u16, low: u16) -> i32 {
        ((u32::from(high) << 16) | u32::from(low)) as i32
    }

    /// Reads a final or branch-list value; `lead` has the final bit cleared.
    pub(crate) fn read_value(units: &[u16], pos: usize, lead: u16) -> i32 {
        if lead < MIN_TWO_UNIT_VALUE_LEAD {
            i32::from(lead)
        } else if lead < THREE_UNIT_VALUE_LEAD {
            (i32::from(lead - MIN_TWO_UNIT_VALUE_LEAD) << 16) | i32::from(units[pos])
        } else {
            pair(units[pos], units[pos + 1])
        }
    }

    pub(crate) fn skip_value_units(pos: usize, lead: u16) -> usize {
        if lead >= MIN_TWO_UNIT_VALUE_LEAD {
            if lead < THREE_UNIT_VALUE_LEAD {
                pos + 1
            } else {
                pos + 2
            }
        } else {
            pos
        }
    }

    pub(crate) fn skip_value(units: &[u16], pos: usize) -> usize {
        skip_value_units(pos + 1, units[pos] & 0x7fff)
    }

    /// Reads an intermediate value stored in a node lead unit.
    pub(crate) fn read_node_value(units: &[u16], pos: usize, lead: u16) -> i32 {
        debug_assert!((MIN_VALUE_LEAD..VALUE_IS_FINAL).contains(&lead));
        if lead < MIN_TWO_UNIT_NODE_VALUE_LEAD {
            i32::from(lead >> 6) - 1
        } else if lead < THREE_UNIT_NODE_VALUE_LEAD {
            (i32::from((lead & 0x7fc0) - MIN_TWO_UNIT_NODE_VALUE_LEAD) << 10) | i32::from(units[pos])
        } else {
            pair(units[pos], units[pos + 1])
        }
    }

    pub(crate) fn skip_node_value(pos: usize, lead: u16) -> usize {
        debug_assert!((MIN_VALUE_LEAD..VALUE_IS_FINAL).contains(&lead));
        if lead >= MIN_TWO_UNIT_NODE_VALUE_LEAD {
            if lead < THREE_UNIT_NODE_VALUE_LEAD {
                pos + 1
            } else {
                pos + 2
            }
        } else {
            pos
        }
    }

    pub(crate) fn jump_by_delta(units: &[u16], pos: usize) -> usize {
        let (delta, pos) = decode_delta(units, pos);
        pos + delta
    }

    pub(crate) fn skip_delta(units: &[u16], pos: usize) -> usize {
        let delta = units[pos];
        let pos = pos + 1;
        if delta >= MIN_TWO_UNIT_DELTA_LEAD {
            if delta == THREE_UNIT_DELTA_LEAD {
                pos + 2
            } else {
                pos + 1
            }
        } else {
            pos
        }
    }

    /// Decodes a final or branch-list value at `pos`.
    pub fn decode_value(units: &[u16], pos: usize) -> (i32, usize) {
        let lead = units[pos] & 0x7fff;
        (read_value(units, pos + 1, lead), skip_value_units(pos + 1, lead))
    }

    /// Decodes an intermediate value from the node lead unit at `pos`.
    pub fn decode_node_value(units: &[u16], pos: usize) -> (i32, usize) {
        let lead = units[pos];
        (read_node_value(units, pos + 1, lead), skip_node_value(pos + 1, lead))
    }

    /// Encodes a final or branch-list value.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn encode_value(value: i32, is_final: bool) -> Encoded<u16, 3> {
        let final_bit = if is_final { VALUE_IS_FINAL } else { 0 };
        if (0..=MAX_ONE_UNIT_VALUE).contains(&value) {
            return Encoded::single(value as u16 | final_bit);
        }
        let mut encoded = Encoded::new();
        if !(0..=MAX_TWO_UNIT_VALUE).contains(&value) {
            encoded.push(THREE_UNIT_VALUE_LEAD);
            encoded.push(((value as u32) >> 16) as u16);
            encoded.push(value as u16);
        } else {
            encoded.push(MIN_TWO_UNIT_VALUE_LEAD + (value >> 16) as u16);
            encoded.push(value as u16);
        }
        *encoded.lead_mut() |= final_bit;
        encoded
    }

    /// Encodes an intermediate value sharing its lead unit with `node_type`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn encode_node_value(value: i32, node_type: u16) -> Encoded<u16, 3> {
        debug_assert!(node_type <= NODE_TYPE_MASK);
        let mut encoded = Encoded::new();
        if !(0..=MAX_TWO_UNIT_NODE_VALUE).contains(&value) {
            encoded.push(THREE_UNIT_NODE_VALUE_LEAD);
            encoded.push(((value as u32) >> 16) as u16);
            encoded.push(value as u16);
        } else if value <= MAX_ONE_UNIT_NODE_VALUE {
            encoded.push(((value + 1) << 6) as u16);
        } else {
            encoded.push(MIN_TWO_UNIT_NODE_VALUE_LEAD + ((value >> 10) & 0x7fc0) as u16);
            encoded.push(value as u16);
        }
        *encoded.lead_mut() |= node_type;
        encoded
    }

    /// Decodes the jump delta at `pos`, returning the delta and the position
    /// after it.
    pub fn decode_delta(units: &[u16], pos: usize) -> (usize, usize) {
        let lead = units[pos];
        let pos = pos + 1;
        if lead < MIN_TWO_UNIT_DELTA_LEAD {
            (usize::from(lead), pos)
        } else if lead == THREE_UNIT_DELTA_LEAD {
            (
                (usize::from(units[pos]) << 16) | usize::from(units[pos + 1]),
                pos + 2,
            )
        } else {
            (
                (usize::from(lead - MIN_TWO_UNIT_DELTA_LEAD) << 16) | usize::from(units[pos]),
                pos + 1,
            )
        }
    }

    /// Encodes a forward jump delta.
    ///
    /// # Panics
    ///
    /// Panics if `delta` does not fit in 32 bits.
    #[allow(clippy::cast_possible_truncation)]
    pub fn encode_delta(delta: usize) -> Encoded<u16, 3> {
        assert!(u32::try_from(delta).is_ok(), "jump delta {delta} exceeds 32 bits");
        if delta <= MAX_ONE_UNIT_DELTA {
            return Encoded::single(delta as u16);
        }
        let mut encoded = Encoded::new();
        if delta <= MAX_TWO_UNIT_DELTA {
            encoded.push(MIN_TWO_UNIT_DELTA_LEAD + (delta >> 16) as u16);
        } else {
            encoded.push(THREE_UNIT_DELTA_LEAD);
            encoded.push((delta >> 16) as u16);
        }
        encoded.push(delta as u16);
        encoded
    }
}

#[cfg(test)]
mod tests {
    use super::{bytes, units};

    #[test]
    fn byte_value_bands() {
        let cases: &[(i32, usize)] = &[
            (0, 1),
            (0x40, 1),
            (0x41, 2),
            (0x1aff, 2),
            (0x1b00, 3),
            (0x11_ffff, 3),
            (0x12_0000, 4),
            (0xff_ffff, 4),
            (0x100_0000, 5),
            (-1, 5),
            (i32::MIN, 5),
        ];
        for &(value, len) in cases {
            for is_final in [false, true] {
                let encoded = bytes::encode_value(value, is_final);
                assert_eq!(encoded.len(), len, "value {value:#x}");
                assert_eq!(encoded.as_slice()[0] & 1, u8::from(is_final));
                assert!(encoded.as_slice()[0] >= 0x20);
                assert_eq!(
                    bytes::decode_value(encoded.as_slice(), 0),
                    (value, len),
                    "value {value:#x}"
                );
            }
        }
    }

    #[test]
    fn byte_delta_bands() {
        let cases: &[(usize, usize)] = &[
            (0, 1),
            (0xbf, 1),
            (0xc0, 2),
            (0x2fff, 2),
            (0x3000, 3),
            (0xd_ffff, 3),
            (0xe_0000, 4),
            (0xff_ffff, 4),
            (0x100_0000, 5),
            (0x7fff_ffff, 5),
        ];
        for &(delta, len) in cases {
            let encoded = bytes::encode_delta(delta);
            assert_eq!(encoded.len(), len, "delta {delta:#x}");
            assert_eq!(bytes::decode_delta(encoded.as_slice(), 0), (delta, len));
            assert_eq!(bytes::skip_delta(encoded.as_slice(), 0), len);
        }
    }

    #[test]
    fn unit_value_bands() {
        let cases: &[(i32, usize)] = &[
            (0, 1),
            (0x3fff, 1),
            (0x4000, 2),
            (0x3ffe_ffff, 2),
            (0x3fff_0000, 3),
            (-5, 3),
        ];
        for &(value, len) in cases {
            let encoded = units::encode_value(value, true);
            assert_eq!(encoded.len(), len);
            assert_ne!(encoded.as_slice()[0] & 0x8000, 0);
            assert_eq!(units::decode_value(encoded.as_slice(), 0), (value, len));
        }
    }

    #[test]
    fn unit_node_value_keeps_node_type() {
        let cases: &[(i32, usize)] = &[
            (0, 1),
            (0xff, 1),
            (0x100, 2),
            (0xfd_ffff, 2),
            (0xfe_0000, 3),
            (-1, 3),
        ];
        for &(value, len) in cases {
            let encoded = units::encode_node_value(value, 0x31);
            assert_eq!(encoded.len(), len);
            let lead = encoded.as_slice()[0];
            assert_eq!(lead & 0x3f, 0x31);
            assert!(lead >= 0x40 && lead < 0x8000);
            assert_eq!(units::decode_node_value(encoded.as_slice(), 0), (value, len));
        }
    }

    #[test]
    fn unit_delta_bands() {
        let cases: &[(usize, usize)] = &[
            (0, 1),
            (0xfbff, 1),
            (0xfc00, 2),
            (0x03fe_ffff, 2),
            (0x03ff_0000, 3),
        ];
        for &(delta, len) in cases {
            let encoded = units::encode_delta(delta);
            assert_eq!(encoded.len(), len);
            assert_eq!(units::decode_delta(encoded.as_slice(), 0), (delta, len));
            assert_eq!(units::skip_delta(encoded.as_slice(), 0), len);
        }
    }
}
