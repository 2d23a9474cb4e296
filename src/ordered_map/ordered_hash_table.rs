use std::{
    fmt,
    iter::FusedIterator,
    mem,
    ops::{Index, IndexMut},
};

use log::{debug, trace};

use super::{hash, Record, GROWTH_RATE, MAX_LOAD_FACTOR, MIN_TABLE_SIZE};
use crate::{
    error::{Error, Result},
    linked_list::{self, LinkedList, NodeHandle},
};

/// A hash table keyed by strings which can be iterated over in insertion
/// order.
///
/// Collisions are chained: every bucket is a [`LinkedList`] of records, and
/// lookups scan the one chain their key hashes to. A separate list keeps
/// every key in the order it was first inserted; [`keys`](Self::keys) exposes
/// it and [`pop`](Self::pop) takes from its back.
///
/// The table starts with at least [`MIN_TABLE_SIZE`] buckets and doubles them
/// the moment an insertion brings the load factor up to [`MAX_LOAD_FACTOR`],
/// so the load factor is always below it between calls.
#[derive(Clone)]
pub struct OrderedHashTable<V> {
    buckets: Vec<LinkedList<Record<V>>>,

    /// Every key, in insertion order.
    order: LinkedList<String>,

    record_count: usize,
}

impl<V> OrderedHashTable<V> {
    /// Makes an empty table with [`MIN_TABLE_SIZE`] buckets.
    pub fn new() -> Self {
        Self::with_capacity(MIN_TABLE_SIZE)
    }

    /// Makes an empty table with `capacity` buckets, or [`MIN_TABLE_SIZE`] if
    /// that is more.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: Self::empty_buckets(capacity.max(MIN_TABLE_SIZE)),
            order: LinkedList::new(),
            record_count: 0,
        }
    }

    fn empty_buckets(size: usize) -> Vec<LinkedList<Record<V>>> {
        (0..size).map(|_| LinkedList::new()).collect()
    }

    /// The number of records in the table.
    pub fn len(&self) -> usize {
        self.record_count
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// The number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Records per bucket.
    pub fn load_factor(&self) -> f64 {
        self.record_count as f64 / self.capacity() as f64
    }

    /// The bucket `key` hashes to, against this table's bucket count or
    /// against `size_override` if one is given. An override of zero means
    /// this table's bucket count.
    pub fn hash_function(
        &self,
        key: &str,
        size_override: Option<usize>,
    ) -> usize {
        let size = size_override
            .filter(|&size| size > 0)
            .unwrap_or_else(|| self.capacity());
        hash::bucket_index(key, size)
    }

    /// The bucket for `key` and the node holding its record, if any.
    fn locate(&self, key: &str) -> (usize, Option<NodeHandle>) {
        let index = self.hash_function(key, None);
        let node = self.buckets[index].find_node(|record| record.key == key);
        (index, node)
    }

    /// Inserts `value` at `key`. If the key is already present its value is
    /// replaced in place, its position in the insertion order is kept, and
    /// the previous value is returned.
    pub fn insert<K>(&mut self, key: K, value: V) -> Option<V>
    where
        K: Into<String>,
    {
        let key = key.into();
        let (index, node) = self.locate(&key);

        if let Some(node) = node {
            let record = self.buckets[index].node_value_mut(node);
            return Some(mem::replace(&mut record.value, value));
        }

        let order_node = self.order.push_back_node(key.clone());
        self.buckets[index].push_back(Record {
            key,
            value,
            order_node,
        });
        self.record_count += 1;

        if self.load_factor() >= MAX_LOAD_FACTOR {
            self.expand();
        }

        #[cfg(test)]
        self.continuity_test();

        None
    }

    /// Multiplies the bucket count by [`GROWTH_RATE`] and rehashes every
    /// record into the new buckets, visiting keys in insertion order so each
    /// new chain keeps its records in insertion order too.
    fn expand(&mut self) {
        let old_size = self.capacity();
        let new_size = old_size * GROWTH_RATE;
        debug!(
            "expanding ordered hash table from {} to {} buckets ({} records)",
            old_size, new_size, self.record_count
        );

        let mut old_buckets =
            mem::replace(&mut self.buckets, Self::empty_buckets(new_size));

        for key in self.order.iter() {
            let chain = &mut old_buckets[hash::bucket_index(key, old_size)];
            if let Some(node) = chain.find_node(|record| record.key == *key) {
                let record = chain.remove_node(node);
                let index = hash::bucket_index(key, new_size);
                self.buckets[index].push_back(record);
            }
        }

        debug_assert!(old_buckets.iter().all(LinkedList::is_empty));
    }

    /// Removes `key` from the table, returning its value if it was there.
    pub fn erase(&mut self, key: &str) -> Option<V> {
        let (index, node) = self.locate(key);
        let record = self.buckets[index].remove_node(node?);
        self.order.remove_node(record.order_node);
        self.record_count -= 1;

        #[cfg(test)]
        self.continuity_test();

        Some(record.value)
    }

    /// Removes the most recently inserted record and returns its key and
    /// value.
    pub fn pop_entry(&mut self) -> Option<(String, V)> {
        let (index, node) = self.locate(self.order.back()?);
        let record = self.buckets[index].remove_node(node?);
        self.order.remove_node(record.order_node);
        self.record_count -= 1;

        #[cfg(test)]
        self.continuity_test();

        Some((record.key, record.value))
    }

    /// Removes the most recently inserted record and returns its value.
    pub fn pop(&mut self) -> Option<V> {
        self.pop_entry().map(|(_, value)| value)
    }

    /// Like [`pop`](Self::pop), but an empty table yields `V::default()`.
    pub fn pop_or_default(&mut self) -> V
    where
        V: Default,
    {
        self.pop().unwrap_or_default()
    }

    /// The value at `key`, if there is one.
    pub fn get(&self, key: &str) -> Option<&V> {
        let (index, node) = self.locate(key);
        node.map(|node| &self.buckets[index].node_value(node).value)
    }

    /// A mutable reference to the value at `key`, if there is one.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let (index, node) = self.locate(key);
        Some(&mut self.buckets[index].node_value_mut(node?).value)
    }

    /// A copy of the value at `key`, or `V::default()` if there isn't one.
    pub fn get_or_default(&self, key: &str) -> V
    where
        V: Clone + Default,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// The value at `key`, failing with [`Error::KeyNotFound`] if it's
    /// absent.
    pub fn value(&self, key: &str) -> Result<&V> {
        self.get(key).ok_or_else(|| Error::KeyNotFound(key.to_owned()))
    }

    /// A mutable reference to the value at `key`, failing with
    /// [`Error::KeyNotFound`] if it's absent.
    pub fn value_mut(&mut self, key: &str) -> Result<&mut V> {
        self.get_mut(key).ok_or_else(|| Error::KeyNotFound(key.to_owned()))
    }

    /// Whether `key` has a record in the table.
    pub fn contains_key(&self, key: &str) -> bool {
        self.locate(key).1.is_some()
    }

    /// The keys in insertion order.
    pub fn keys(&self) -> &LinkedList<String> {
        &self.order
    }

    /// Key/value pairs in insertion order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            table: self,
            keys: self.order.iter(),
        }
    }

    /// Values in insertion order.
    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    /// Removes every record. The bucket count is kept.
    pub fn clear(&mut self) {
        trace!("clearing {} records", self.record_count);
        for chain in self.buckets.iter_mut() {
            chain.clear();
        }
        self.order.clear();
        self.record_count = 0;
    }

    #[cfg(test)]
    fn continuity_test(&self) {
        assert!(self.capacity() >= MIN_TABLE_SIZE);
        assert!(self.load_factor() < MAX_LOAD_FACTOR);
        assert_eq!(self.record_count, self.order.len());
        assert_eq!(
            self.record_count,
            self.buckets.iter().map(LinkedList::len).sum::<usize>()
        );

        self.order.continuity_test();
        for chain in &self.buckets {
            chain.continuity_test();
        }

        // every key is in the chain it hashes to, pointing back at itself
        for key in self.order.iter() {
            let (index, node) = self.locate(key);
            let record = match node {
                Some(node) => self.buckets[index].node_value(node),
                None => panic!("key {:?} is missing from its chain", key),
            };
            assert_eq!(key, self.order.node_value(record.order_node));
        }
    }
}

impl<V> Default for OrderedHashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for OrderedHashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Tables are equal when they hold the same pairs in the same insertion
/// order. Bucket counts don't matter.
impl<V: PartialEq> PartialEq for OrderedHashTable<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V: Eq> Eq for OrderedHashTable<V> {}

impl<V> Index<&str> for OrderedHashTable<V> {
    type Output = V;

    fn index(&self, key: &str) -> &V {
        match self.value(key) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<V> IndexMut<&str> for OrderedHashTable<V> {
    fn index_mut(&mut self, key: &str) -> &mut V {
        match self.value_mut(key) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedHashTable<V>
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = OrderedHashTable::new();
        table.extend(iter);
        table
    }
}

impl<K, V> Extend<(K, V)> for OrderedHashTable<V>
where
    K: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for OrderedHashTable<V>
where
    K: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<'a, V> IntoIterator for &'a OrderedHashTable<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a table's pairs in insertion order.
pub struct Iter<'a, V> {
    table: &'a OrderedHashTable<V>,
    keys: linked_list::Iter<'a, String>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        let value = self.table.get(key)?;
        Some((key.as_str(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let key = self.keys.next_back()?;
        let value = self.table.get(key)?;
        Some((key.as_str(), value))
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {}

impl<'a, V> FusedIterator for Iter<'a, V> {}

/// Iterator over a table's values in insertion order.
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V> DoubleEndedIterator for Values<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<'a, V> ExactSizeIterator for Values<'a, V> {}

#[cfg(test)]
mod tests {
    use super::OrderedHashTable;
    use crate::{
        error::Error,
        ordered_map::{hash, MIN_TABLE_SIZE},
    };

    fn keys<V>(table: &OrderedHashTable<V>) -> Vec<&str> {
        table.keys().iter().map(String::as_str).collect()
    }

    fn sample() -> OrderedHashTable<i32> {
        let mut table = OrderedHashTable::with_capacity(64);
        table.insert("Count", 3);
        table.insert("WinRate", 50);
        table.insert("Test", -507);
        table.insert("Sun", 643);
        table.insert("Moon", 12);
        table.insert("House", 96);
        table.insert("Town", -1234);
        table.insert("Window", 0);
        table
    }

    #[test]
    fn test_sample_scenario() {
        let mut table = sample();
        assert_eq!(8, table.len());

        assert_eq!(Some(96), table.erase("House"));
        table["Town"] = 45;

        assert_eq!(Some(0), table.pop());
        assert_eq!(6, table.len());
        assert_eq!(
            vec!["Count", "WinRate", "Test", "Sun", "Moon", "Town"],
            keys(&table)
        );
        assert_eq!(Some(&45), table.get("Town"));
    }

    #[test]
    fn test_update_keeps_position() {
        let mut table = sample();

        assert_eq!(Some(50), table.insert("WinRate", 51));
        assert_eq!(8, table.len());
        assert_eq!(Some(&51), table.get("WinRate"));
        assert_eq!(Some(1), table.keys().iter().position(|k| k == "WinRate"));
    }

    #[test]
    fn test_capacity_floor() {
        type Table = OrderedHashTable<u8>;
        assert_eq!(MIN_TABLE_SIZE, Table::new().capacity());
        assert_eq!(MIN_TABLE_SIZE, Table::with_capacity(3).capacity());
        assert_eq!(200, Table::with_capacity(200).capacity());
    }

    /// The 32nd record brings a 64 bucket table to a load factor of 0.5,
    /// which has to double it straight away.
    #[test]
    fn test_growth() {
        let mut table = OrderedHashTable::new();
        for i in 0..31 {
            table.insert(format!("key{}", i), i);
        }
        assert_eq!(64, table.capacity());

        table.insert("key31", 31);
        assert_eq!(128, table.capacity());
        assert_eq!(32, table.len());

        for i in 0..32 {
            assert_eq!(Some(&i), table.get(&format!("key{}", i)));
        }

        // updates never grow the table
        for i in 0..32 {
            table.insert(format!("key{}", i), -i);
        }
        assert_eq!(128, table.capacity());
    }

    #[test]
    fn test_hash_function_size_override() {
        let table: OrderedHashTable<u8> = OrderedHashTable::new();

        assert_eq!(24, table.hash_function("Count", None));
        assert_eq!(24, table.hash_function("Count", Some(0)));
        assert_eq!(48, table.hash_function("Count", Some(128)));
        assert_eq!(999, table.hash_function("Town", Some(1000)));
    }

    /// "a", "key48" and "key126" share a bucket in a 64 bucket table.
    #[test]
    fn test_chained_collisions() {
        let mut table = OrderedHashTable::new();
        let bucket = hash::bucket_index("a", 64);
        assert_eq!(bucket, table.hash_function("key48", None));

        table.insert("a", 1);
        table.insert("key48", 2);
        table.insert("key126", 3);
        assert_eq!(3, table.buckets[bucket].len());

        assert_eq!(Some(2), table.erase("key48"));
        assert_eq!(Some(&1), table.get("a"));
        assert_eq!(Some(&3), table.get("key126"));
        assert_eq!(None, table.get("key48"));
        assert_eq!(vec!["a", "key126"], keys(&table));

        assert_eq!(Some(("key126".to_owned(), 3)), table.pop_entry());
        assert_eq!(1, table.buckets[bucket].len());
    }

    #[test]
    fn test_absent_keys() {
        let mut table = sample();

        assert_eq!(None, table.get("absent_key"));
        assert_eq!(0, table.get_or_default("absent_key"));
        assert_eq!(-507, table.get_or_default("Test"));
        assert_eq!(None, table.erase("absent_key"));
        assert_eq!(8, table.len());

        assert_eq!(
            Err(Error::KeyNotFound("absent_key".to_owned())),
            table.value_mut("absent_key")
        );
        assert_eq!(Ok(&3), table.value("Count"));
    }

    #[test]
    #[should_panic(expected = "key (\"absent_key\") not found")]
    fn test_index_absent_key_panics() {
        let mut table = sample();
        table["absent_key"] = 1;
    }

    #[test]
    fn test_pop_empty() {
        let mut table: OrderedHashTable<String> = OrderedHashTable::new();
        assert_eq!(None, table.pop());
        assert_eq!(None, table.pop_entry());
        assert_eq!("", table.pop_or_default());
    }

    #[test]
    fn test_lifo() {
        let mut table = OrderedHashTable::new();
        for i in 0..100 {
            table.insert(i.to_string(), i);
        }

        for i in (0..100).rev() {
            assert_eq!(Some(i), table.pop());
        }
        assert!(table.is_empty());
        assert_eq!(None, table.pop());
    }

    #[test]
    fn test_iter() {
        let table = sample();

        let pairs: Vec<(&str, i32)> =
            table.iter().map(|(k, v)| (k, *v)).collect();
        assert_eq!(("Count", 3), pairs[0]);
        assert_eq!(("Window", 0), pairs[7]);
        assert_eq!(8, table.iter().len());

        let last_two: Vec<&i32> = table.values().rev().take(2).collect();
        assert_eq!(vec![&0, &-1234], last_two);
    }

    #[test]
    fn test_clone_and_eq() {
        let table = sample();
        let mut copy = table.clone();
        assert_eq!(table, copy);

        copy["Sun"] = 0;
        assert_ne!(table, copy);
        assert_eq!(Some(&643), table.get("Sun"));

        // same pairs in a different order are a different table
        let a = OrderedHashTable::from([("x", 1), ("y", 2)]);
        let b = OrderedHashTable::from([("y", 2), ("x", 1)]);
        assert_ne!(a, b);

        // bucket counts don't matter
        let mut c = OrderedHashTable::with_capacity(512);
        c.extend([("x", 1), ("y", 2)]);
        assert_eq!(a, c);
    }

    #[test]
    fn test_debug() {
        let table = OrderedHashTable::from([("b", 2), ("a", 1)]);
        assert_eq!("{\"b\": 2, \"a\": 1}", format!("{:?}", table));
    }

    #[test]
    fn test_clear() {
        let mut table = sample();
        table.insert("extra", 1);
        table.clear();

        assert!(table.is_empty());
        assert!(table.keys().is_empty());
        assert!(!table.contains_key("Count"));
        assert_eq!(MIN_TABLE_SIZE, table.capacity());

        table.insert("Count", 4);
        assert_eq!(vec!["Count"], keys(&table));
    }

    #[test]
    fn test_nested_tables() {
        let mut outer: OrderedHashTable<OrderedHashTable<i32>> =
            OrderedHashTable::new();
        outer.insert("Test", sample());

        outer["Test"].erase("House");
        outer["Test"]["Town"] = 45;
        assert_eq!(Some(0), outer["Test"].pop());

        let inner = &outer["Test"];
        let rendered: Vec<String> = inner
            .keys()
            .iter()
            .map(|k| format!("{} : {}", k, inner[k.as_str()]))
            .collect();
        assert_eq!("Count : 3", rendered[0]);
        assert_eq!("Town : 45", rendered[5]);
    }
}
