//! A string-keyed hash table that keeps its keys in insertion order, and the
//! arena-backed doubly linked list it is built from.
//!
//! ```
//! use ordered_hash_table::OrderedHashTable;
//!
//! let mut table = OrderedHashTable::with_capacity(64);
//! table.insert("Count", 3);
//! table.insert("WinRate", 50);
//! table.insert("Test", -507);
//! table.insert("Sun", 643);
//! table.insert("Moon", 12);
//! table.insert("House", 96);
//! table.insert("Town", -1234);
//! table.insert("Window", 0);
//!
//! table.erase("House");
//! table["Town"] = 45;
//!
//! // pop takes the most recently inserted record
//! assert_eq!(Some(0), table.pop());
//! assert_eq!(6, table.len());
//!
//! let keys: Vec<&String> = table.keys().iter().collect();
//! assert_eq!(keys, ["Count", "WinRate", "Test", "Sun", "Moon", "Town"]);
//! ```
//!
//! The list stands on its own too:
//!
//! ```
//! use ordered_hash_table::LinkedList;
//!
//! let mut list = LinkedList::from([5, 3, 4, 1, 2]);
//! list.sort();
//! assert_eq!(Ok(&3), list.at(2));
//! assert!(list.at(5).is_err());
//! ```

pub mod error;
pub mod linked_list;
pub mod ordered_map;

pub use error::{Error, Result};
pub use linked_list::{Cursor, LinkedList};
pub use ordered_map::OrderedHashTable;
