//! A string-keyed hash table that remembers the order its keys arrived in.
//!
//! The table is an array of [`LinkedList`](crate::LinkedList) chains plus one
//! more list holding every key in insertion order. That second list is what
//! makes the table "ordered", and it doubles as the stack
//! [`OrderedHashTable::pop`] takes from.

pub mod hash;
pub mod ordered_hash_table;

pub use ordered_hash_table::{Iter, OrderedHashTable, Values};

use crate::linked_list::NodeHandle;

/// The fewest buckets a table will ever have.
pub const MIN_TABLE_SIZE: usize = 64;

/// The factor the bucket count is multiplied by when the table grows.
pub const GROWTH_RATE: usize = 2;

/// The table grows as soon as `len / capacity` reaches this.
pub const MAX_LOAD_FACTOR: f64 = 0.5;

/// Starting value of the djb2 accumulator.
pub const HASH_SEED: u32 = 5381;

/// djb2 multiplier.
pub const HASH_MULTIPLIER: u32 = 33;

/// `(sqrt(5) - 1) / 2`, the multiplier Knuth recommends for multiplicative
/// hashing.
pub const KNUTH_CONSTANT: f64 = (2.236_067_977_499_789_69 - 1.0) / 2.0;

/// A key/value pair living in one of the table's chains.
#[derive(Debug, Clone)]
struct Record<V> {
    key: String,
    value: V,

    /// This record's key in the table's order list.
    order_node: NodeHandle,
}
