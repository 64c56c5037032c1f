//! Browser families and search scopes.

use std::fmt;
use std::ops::BitOr;

/// A browser family that registers native messaging manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    Firefox,
    Chrome,
    Chromium,
}

impl Browser {
    /// All families in search order. First match wins, so the order here
    /// is the tie-breaker when an app is registered for several families.
    pub const SEARCH_ORDER: [Browser; 3] = [Browser::Firefox, Browser::Chrome, Browser::Chromium];

    fn bit(self) -> u8 {
        match self {
            Browser::Firefox => 1 << 0,
            Browser::Chrome => 1 << 1,
            Browser::Chromium => 1 << 2,
        }
    }

    /// The scope containing only this family.
    pub fn scope(self) -> Scope {
        Scope(self.bit())
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Browser::Firefox => "firefox",
            Browser::Chrome => "chrome",
            Browser::Chromium => "chromium",
        };
        f.write_str(name)
    }
}

/// A bitmask of browser families to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope(u8);

impl Scope {
    /// Search no families (always `NotFound`).
    pub const NONE: Scope = Scope(0);

    /// Search every known family.
    pub const ALL: Scope = Scope(0b0000_0111);

    /// Whether this scope includes the given family.
    pub fn contains(self, browser: Browser) -> bool {
        self.0 & browser.bit() != 0
    }

    /// Whether this scope includes no families at all.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<Browser> for Scope {
    fn from(browser: Browser) -> Self {
        browser.scope()
    }
}

impl BitOr for Scope {
    type Output = Scope;

    fn bitor(self, rhs: Scope) -> Scope {
        Scope(self.0 | rhs.0)
    }
}

impl BitOr<Browser> for Scope {
    type Output = Scope;

    fn bitor(self, rhs: Browser) -> Scope {
        Scope(self.0 | rhs.bit())
    }
}

impl BitOr for Browser {
    type Output = Scope;

    fn bitor(self, rhs: Browser) -> Scope {
        Scope(self.bit() | rhs.bit())
    }
}
