//! Interned symbols for function and file names
//!
//! Function and file names repeat heavily across the frames of a trace, so
//! they are interned in a process-wide pool and shared as `Arc<str>`.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

/// Process-wide intern pool, built on first use.
static POOL: OnceLock<Mutex<HashSet<Arc<str>>>> = OnceLock::new();

fn pool() -> &'static Mutex<HashSet<Arc<str>>> {
    POOL.get_or_init(|| Mutex::new(HashSet::new()))
}

/// An interned, immutable string.
///
/// Cheap to clone (refcount bump). Equality is by content, with a pointer
/// fast path for symbols that share pool storage.
#[derive(Debug, Clone)]
pub struct Sym(Arc<str>);

impl Sym {
    /// Intern a string, returning the pooled symbol for it.
    pub fn intern(name: &str) -> Sym {
        let mut pool = pool().lock().expect("symbol pool lock poisoned");
        if let Some(existing) = pool.get(name) {
            return Sym(Arc::clone(existing));
        }
        let interned: Arc<str> = Arc::from(name);
        pool.insert(Arc::clone(&interned));
        Sym(interned)
    }

    /// The empty symbol, used as the "unresolved" name sentinel.
    pub fn empty() -> Sym {
        Sym::intern("")
    }

    /// View the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty "unresolved" sentinel.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Sym {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Sym {}

impl Hash for Sym {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq<str> for Sym {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Sym {
    fn from(name: &str) -> Sym {
        Sym::intern(name)
    }
}
