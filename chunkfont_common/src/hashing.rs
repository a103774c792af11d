use std::{
    collections::{HashMap, HashSet},
    hash::BuildHasher,
};
use wyrand::WyHash;

// we don't need a secret, and generating a secret involves primality checks. oww.
// thus, new_with_default_secret

#[derive(Copy, Clone, Debug, Default)]
pub struct WyHashBuilder;
impl BuildHasher for WyHashBuilder {
    type Hasher = WyHash;
    fn build_hasher(&self) -> Self::Hasher {
        WyHash::new_with_default_secret(0x5c2f9a31e4b07d16)
    }
}

pub type WyHashMap<K, V> = HashMap<K, V, WyHashBuilder>;
pub type WyHashSet<K> = HashSet<K, WyHashBuilder>;
