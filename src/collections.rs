use std::hash::BuildHasherDefault;
use indexmap::IndexMap;
use rustc_hash::FxHasher;


/// Use indexmap for fast lookups and rustc_hash for fast hashing
/// The entry index doubles as a stable node id
pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
