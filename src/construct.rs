// other keepers use HashMap
use core::hash::BuildHasherDefault;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;
use std::sync::Arc;
use seahash::SeaHasher;

// used for internal result sets
use roaring::RoaringTreemap;

// used to print out readable forms of a construct
use std::fmt;

// ------------- Thing -------------
// Every line record is a thing, identified by its position in the line keeper.
pub type Thing = u64;

pub type KeyHasher = BuildHasherDefault<SeaHasher>;

// ------------- KeyPair -------------
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct KeyPair {
    discriminator: String,
    reference: String,
}
impl KeyPair {
    pub fn new(discriminator: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
            reference: reference.into(),
        }
    }
    // Only getters are exposed, so a key pair is immutable after creation.
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }
    pub fn reference(&self) -> &str {
        &self.reference
    }
}
impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.discriminator, self.reference)
    }
}

// ------------- Column -------------
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Column {
    Discriminator,
    Reference,
}
impl Column {
    pub fn of<'k>(&self, key: &'k KeyPair) -> &'k str {
        match self {
            Column::Discriminator => key.discriminator(),
            Column::Reference => key.reference(),
        }
    }
}
impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Column::Discriminator => write!(f, "discriminator"),
            Column::Reference => write!(f, "reference"),
        }
    }
}

// ------------- Header -------------
#[derive(PartialEq, Eq, Hash, Debug)]
pub struct HeaderRecord {
    key: KeyPair,
}
impl HeaderRecord {
    pub fn new(key: KeyPair) -> Self {
        Self { key }
    }
    pub fn key(&self) -> &KeyPair {
        &self.key
    }
}

// Headers are kept in the order they were first seen, once per key.
#[derive(Debug, Default)]
pub struct HeaderKeeper {
    kept: Vec<Arc<HeaderRecord>>,
    positions: HashMap<KeyPair, usize, KeyHasher>,
}
impl HeaderKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn keep(&mut self, header: HeaderRecord) -> (Arc<HeaderRecord>, bool) {
        match self.positions.entry(header.key.clone()) {
            Entry::Occupied(e) => (Arc::clone(&self.kept[*e.get()]), true),
            Entry::Vacant(e) => {
                e.insert(self.kept.len());
                let keepsake = Arc::new(header);
                self.kept.push(Arc::clone(&keepsake));
                (keepsake, false)
            }
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = &Arc<HeaderRecord>> {
        self.kept.iter()
    }
    pub fn key_pairs(&self) -> Vec<KeyPair> {
        self.kept.iter().map(|header| header.key.clone()).collect()
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

// ------------- Line -------------
#[derive(PartialEq, Eq, Hash, Debug)]
pub struct LineRecord {
    line: Thing,
    key: KeyPair,
    line_nbr: u32,
}
impl LineRecord {
    pub fn line(&self) -> Thing {
        self.line
    }
    pub fn key(&self) -> &KeyPair {
        &self.key
    }
    pub fn line_nbr(&self) -> u32 {
        self.line_nbr
    }
}
impl fmt::Display for LineRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}#{}", self.line, self.key, self.line_nbr)
    }
}

// ------------- Lookups -------------
#[derive(Debug)]
pub struct Lookup<K, H = KeyHasher> {
    index: HashMap<K, RoaringTreemap, H>,
}
impl<K: Eq + Hash, H: std::hash::BuildHasher + Default> Lookup<K, H> {
    pub fn new() -> Self {
        Self {
            index: HashMap::<K, RoaringTreemap, H>::default(),
        }
    }
    pub fn insert(&mut self, key: K, thing: Thing) {
        self.index.entry(key).or_default().insert(thing);
    }
    pub fn lookup<Q>(&self, key: &Q) -> Option<&RoaringTreemap>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key)
    }
}

// The line keeper plays the part of the line table, with an index on the
// full key as well as one per column.
#[derive(Debug)]
pub struct LineKeeper {
    kept: Vec<LineRecord>,
    key_lookup: Lookup<KeyPair>,
    discriminator_lookup: Lookup<String>,
    reference_lookup: Lookup<String>,
}
impl LineKeeper {
    pub fn new() -> Self {
        Self {
            kept: Vec::new(),
            key_lookup: Lookup::new(),
            discriminator_lookup: Lookup::new(),
            reference_lookup: Lookup::new(),
        }
    }
    pub fn keep(&mut self, key: KeyPair, line_nbr: u32) -> Thing {
        let line = self.kept.len() as Thing;
        self.key_lookup.insert(key.clone(), line);
        self.discriminator_lookup.insert(key.discriminator.clone(), line);
        self.reference_lookup.insert(key.reference.clone(), line);
        self.kept.push(LineRecord { line, key, line_nbr });
        line
    }
    pub fn get(&self, line: Thing) -> Option<&LineRecord> {
        usize::try_from(line).ok().and_then(|i| self.kept.get(i))
    }
    pub fn iter(&self) -> impl Iterator<Item = &LineRecord> {
        self.kept.iter()
    }
    pub fn all(&self) -> RoaringTreemap {
        let mut all = RoaringTreemap::new();
        if !self.kept.is_empty() {
            all.insert_range(0..self.kept.len() as Thing);
        }
        all
    }
    pub fn with_key(&self, key: &KeyPair) -> RoaringTreemap {
        self.key_lookup.lookup(key).cloned().unwrap_or_default()
    }
    pub fn with_value(&self, column: Column, value: &str) -> RoaringTreemap {
        let lookup = match column {
            Column::Discriminator => &self.discriminator_lookup,
            Column::Reference => &self.reference_lookup,
        };
        lookup.lookup(value).cloned().unwrap_or_default()
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}
impl Default for LineKeeper {
    fn default() -> Self {
        Self::new()
    }
}
