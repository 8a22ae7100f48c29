//! Contacts between fixture pairs

use super::fixture::FixtureHandle;

/// An unordered pair of touching fixtures
///
/// The pair is normalized on construction, so `Contact::new(a, b)` and
/// `Contact::new(b, a)` are equal and hash identically. Contacts are plain
/// values; the world system compares the current cycle's set against the
/// prior one to derive begin/continue/end transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Contact {
    a: FixtureHandle,
    b: FixtureHandle,
}

impl Contact {
    /// Create a normalized contact between two fixtures
    pub fn new(a: FixtureHandle, b: FixtureHandle) -> Self {
        let mut contact = Self::default();
        contact.set(a, b);
        contact
    }

    /// Re-point the contact at a new pair, normalizing the order
    pub fn set(&mut self, a: FixtureHandle, b: FixtureHandle) {
        if b < a {
            self.a = b;
            self.b = a;
        } else {
            self.a = a;
            self.b = b;
        }
    }

    /// Both fixtures, in normalized order
    pub fn fixtures(&self) -> (FixtureHandle, FixtureHandle) {
        (self.a, self.b)
    }

    /// Whether the contact involves the given fixture
    pub fn involves(&self, handle: FixtureHandle) -> bool {
        self.a == handle || self.b == handle
    }

    /// The fixture opposite the given one, if the contact involves it
    pub fn other(&self, handle: FixtureHandle) -> Option<FixtureHandle> {
        if self.a == handle {
            Some(self.b)
        } else if self.b == handle {
            Some(self.a)
        } else {
            None
        }
    }
}
