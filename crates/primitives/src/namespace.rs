/// A signed integer address space within an account's storage.
///
/// Namespace `0` is the default, unauthenticated message namespace; negative
/// and most non-zero namespaces require an authenticated `retrieve` call
/// (see `Namespace::requires_auth`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Namespace(i32);

impl Namespace {
    pub const DEFAULT: Namespace = Namespace(0);

    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// Only the default namespace is readable without a signature; every
    /// other namespace (including negative "hidden" namespaces) requires an
    /// authenticated retrieve.
    pub fn requires_auth(self) -> bool {
        self.0 != 0
    }
}

impl From<i32> for Namespace {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
