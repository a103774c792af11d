use crate::groups::{Classifier, GroupValue};
use chunkfont_common::hashing::WyHashMap;

/// Identifies a bucket: the position of the classifier that matched, and the group it returned.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GroupKey {
    pub classifier: usize,
    pub value: GroupValue,
}

/// The characters sharing a [`GroupKey`], in the order they were encountered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bucket {
    pub key: GroupKey,
    pub chars: Vec<char>,
}

/// The result of sorting a font's characters into buckets.
#[derive(Clone, Debug, Default)]
pub struct Assembled {
    /// Buckets in the order their keys were first seen.
    pub buckets: Vec<Bucket>,
    /// Characters that no classifier matched. These are not placed in any bucket.
    pub unmatched: Vec<char>,
}

/// Sorts characters into buckets using the first classifier that matches each one.
pub fn assemble(chars: &[char], classifiers: &[Classifier]) -> Assembled {
    let mut assembled = Assembled::default();
    let mut index: WyHashMap<GroupKey, usize> = WyHashMap::default();

    for &ch in chars {
        let matched = classifiers
            .iter()
            .enumerate()
            .find_map(|(classifier, x)| Some(GroupKey { classifier, value: x.classify(ch)? }));
        let Some(key) = matched else {
            assembled.unmatched.push(ch);
            continue;
        };

        let idx = *index.entry(key).or_insert_with(|| {
            assembled.buckets.push(Bucket { key, chars: Vec::new() });
            assembled.buckets.len() - 1
        });
        assembled.buckets[idx].chars.push(ch);
    }

    assembled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn table(entries: &[(char, GroupValue)]) -> Classifier {
        Classifier::Table(Arc::new(entries.iter().copied().collect()))
    }

    #[test]
    fn first_match_wins() {
        let only_a = table(&[('A', 0)]);
        let letters = table(&('A'..='Z').map(|x| (x, 0)).collect::<Vec<_>>());
        let chars: Vec<char> = ('A'..='E').collect();

        let assembled = assemble(&chars, &[only_a, letters]);
        assert_eq!(assembled.buckets.len(), 2);
        assert_eq!(assembled.buckets[0].key, GroupKey { classifier: 0, value: 0 });
        assert_eq!(assembled.buckets[0].chars, ['A']);
        assert_eq!(assembled.buckets[1].key, GroupKey { classifier: 1, value: 0 });
        assert_eq!(assembled.buckets[1].chars, ['B', 'C', 'D', 'E']);
    }

    #[test]
    fn buckets_in_first_seen_order() {
        let classifier = table(&[('a', 2), ('b', 1), ('c', 2), ('d', 0)]);
        let assembled = assemble(&['a', 'b', 'c', 'd'], &[classifier]);
        let keys: Vec<_> = assembled.buckets.iter().map(|x| x.key.value).collect();
        assert_eq!(keys, [2, 1, 0]);
        assert_eq!(assembled.buckets[0].chars, ['a', 'c']);
    }

    #[test]
    fn unmatched_characters_are_dropped() {
        let classifier = table(&[('a', 0)]);
        let assembled = assemble(&['a', 'b', 'c'], &[classifier]);
        assert_eq!(assembled.buckets.len(), 1);
        assert_eq!(assembled.buckets[0].chars, ['a']);
        assert_eq!(assembled.unmatched, ['b', 'c']);
    }

    #[test]
    fn every_character_at_most_once() {
        let chars: Vec<char> = ('\u{20}'..='\u{2FF}').collect();
        let classifiers = [
            table(&[('A', 0), ('B', 0)]),
            Classifier::Blocks(vec![0x00..=0x7F, 0x80..=0xFF].into()),
            Classifier::All,
        ];
        let assembled = assemble(&chars, &classifiers);

        let mut seen: Vec<char> = assembled.buckets.iter().flat_map(|x| x.chars.clone()).collect();
        assert!(assembled.unmatched.is_empty());
        seen.sort();
        assert_eq!(seen, chars);
        assert!(assembled.buckets.iter().all(|x| x.key.classifier != 2));
    }

    #[test]
    fn no_classifiers_drops_everything() {
        let assembled = assemble(&['a', 'b'], &[]);
        assert!(assembled.buckets.is_empty());
        assert_eq!(assembled.unmatched.len(), 2);
    }
}
