use std::{
    borrow::Cow,
    fmt::{Display, Formatter},
    ops::RangeInclusive,
};
use tracing::warn;

fn is_strictly_ascending(chars: &[char]) -> bool {
    chars.windows(2).all(|x| x[0] < x[1])
}

/// Converts characters into the shortest list of contiguous code point ranges.
///
/// Input is expected in strictly ascending order. Anything else is sorted and deduplicated first.
pub fn compact(chars: &[char]) -> Vec<RangeInclusive<u32>> {
    let chars = if is_strictly_ascending(chars) {
        Cow::Borrowed(chars)
    } else {
        warn!("Characters are not in ascending order. Sorting {} characters.", chars.len());
        let mut sorted = chars.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Cow::Owned(sorted)
    };

    let mut ranges = Vec::new();
    let mut current: Option<(u32, u32)> = None;
    for &ch in chars.iter() {
        let cp = ch as u32;
        current = match current {
            Some((start, end)) if cp == end + 1 => Some((start, cp)),
            Some((start, end)) => {
                ranges.push(start..=end);
                Some((cp, cp))
            }
            None => Some((cp, cp)),
        };
    }
    if let Some((start, end)) = current {
        ranges.push(start..=end);
    }
    ranges
}

/// Renders ranges as a `unicode-range` value.
pub struct UnicodeRange<'a>(pub &'a [RangeInclusive<u32>]);
impl<'a> Display for UnicodeRange<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for range in self.0 {
            if first {
                first = false;
            } else {
                f.write_str(", ")?;
            }

            if range.start() == range.end() {
                write!(f, "U+{:X}", range.start())?;
            } else {
                write!(f, "U+{:X}-{:X}", range.start(), range.end())?;
            }
        }
        Ok(())
    }
}
