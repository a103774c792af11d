use crate::hashing::WyHashSet;
use std::fmt::{Debug, Formatter};

/// An unordered set of code points, used for membership tests against reference tables.
#[derive(Clone, Eq, PartialEq, Default)]
pub struct CharacterSet(WyHashSet<u32>);
impl CharacterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from every non-whitespace character in a block of text.
    pub fn from_text(text: &str) -> Self {
        let mut set = CharacterSet::new();
        set.insert_text(text);
        set
    }

    /// Adds every non-whitespace character in a block of text.
    pub fn insert_text(&mut self, text: &str) {
        self.extend(text.chars().filter(|ch| !ch.is_whitespace()));
    }

    pub fn insert(&mut self, ch: char) -> bool {
        self.0.insert(ch as u32)
    }

    pub fn contains(&self, ch: char) -> bool {
        self.0.contains(&(ch as u32))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl FromIterator<char> for CharacterSet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        let mut set = CharacterSet::new();
        set.extend(iter);
        set
    }
}
impl Extend<char> for CharacterSet {
    fn extend<T: IntoIterator<Item = char>>(&mut self, iter: T) {
        for ch in iter {
            self.insert(ch);
        }
    }
}
impl Debug for CharacterSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[set of {} characters]", self.0.len())
    }
}
