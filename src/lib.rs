//! Package implement an ordered-set index using a classic
//! [red-black tree][wiki-rbtree].
//!
//! A red-black tree is a binary search tree kept approximately balanced
//! by five rules:
//!
//! > 1. All nodes are red or black.
//! > 2. The root is black.
//! > 3. The leaf nodes, all aliasing one shared nil sentinel, are black.
//! > 4. Both children of a red node are black.
//! > 5. Every simple path from a given node down to a leaf carries the
//! >    same number of black nodes.
//!
//! [OSet] implements an ephemeral ordered-set on those rules:
//!
//! - Each entry in OSet instance correspond to a key.
//! - Parametrised over `key-type`, requiring only a total order.
//! - Insert, search, delete, successor, min, max operations, all in
//!   logarithmic time.
//! - Equal keys are accepted; ties descend into the right subtree.
//! - In-order text rendering, cached between structural mutations.
//! - Uses ownership model and borrow semantics to ensure safety.
//! - No Durability guarantee.
//! - Not thread safe.
//!
//! Constructing a new [OSet] instance and fetching keys back out:
//!
//! ```
//! use rbset::OSet;
//!
//! let mut index: OSet<i32> = OSet::new();
//! assert_eq!(index.len(), 0);
//! assert_eq!(index.is_empty(), true);
//!
//! index.insert(10).insert(20).insert(30);
//!
//! let n = index.len();
//! assert_eq!(n, 3);
//!
//! assert_eq!(index.search(&20), Some(&20));
//! assert_eq!(index.search(&25), None);
//! assert_eq!(index.min(), Some(&10));
//! assert_eq!(index.max(), Some(&30));
//! assert_eq!(index.successor(&10), Some(&20));
//!
//! let old_key = index.delete(&20);
//! assert_eq!(old_key, Some(20));
//! assert_eq!(index.search(&20), None);
//! ```
//!
//! [wiki-rbtree]: https://en.wikipedia.org/wiki/Red-black_tree

use std::{error, fmt, result};

// Short form to compose Error values.
//
// Here are few possible ways:
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, msg: format!("bad argument"));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, std::io::read(buf));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, std::fs::read(file_path), format!("read failed"));
// ```
//
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err(Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err(Error::$v(prefix, format!("{}", err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                let msg = format!($($arg),+);
                Err(Error::$v(prefix, format!("{} {}", err, msg)))
            }
        }
    }};
}

mod node;
mod oset;

pub use oset::OSet;

/// Error variants that are returned by this package's API.
///
/// Each variant carries a prefix, typically identifying the
/// error location.
pub enum Error {
    Fatal(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        use Error::*;

        match self {
            Fatal(p, msg) => write!(f, "{} Fatal: {}", p, msg),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl error::Error for Error {}

/// Type alias for Result return type, used by this package.
pub type Result<T> = result::Result<T, Error>;
