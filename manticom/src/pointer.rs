//! Issue locations inside the input document, as JSON Pointers (RFC 6901).
//!
//! Every diagnostic carries the pointer of the node it was raised for, e.g.
//! `/urls/2/delete` or `/objects/0/$user/email`. Segments are `/`-separated,
//! with `~` escaped as `~0` and `/` escaped as `~1`.

use std::fmt;

/// An owned JSON Pointer. The empty pointer refers to the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pointer(String);

impl Pointer {
    /// The document root.
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns a new pointer with `segment` appended, escaped per RFC 6901.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut path: String = self.0.clone();
        path.push('/');
        for c in segment.chars() {
            match c {
                '~' => path.push_str("~0"),
                '/' => path.push_str("~1"),
                other => path.push(other),
            }
        }
        Self(path)
    }

    /// Returns a new pointer with an array index appended.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.child(&index.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}
