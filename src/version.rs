//! Compositor versions and the provider that detects them.
//!
//! Versions are plain `major.minor.patch` triples. Anything unparseable is
//! `0.0.0`, the oldest possible version, which makes migrations err toward
//! downgrading parameters that may not exist yet.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Mutex;

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const UNKNOWN: Version = Version::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse strings like `v0.45.2-beta`, `0.41`, or `unknown`.
    ///
    /// A leading `v` is stripped and everything after the first `-` is
    /// dropped. Missing components are zero; if the major component is not a
    /// number the whole version is [`Version::UNKNOWN`].
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
        let core = s.split('-').next().unwrap_or_default();
        let mut parts = core.split('.').map(|p| p.trim().parse::<u64>());

        let Some(Ok(major)) = parts.next() else {
            return Self::UNKNOWN;
        };
        let minor = parts.next().and_then(Result::ok).unwrap_or(0);
        let patch = parts.next().and_then(Result::ok).unwrap_or(0);
        Self::new(major, minor, patch)
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Compare two version strings: `-1`, `0`, or `1`.
pub fn compare(a: &str, b: &str) -> i32 {
    match Version::parse(a).cmp(&Version::parse(b)) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Source of a raw version string, such as `hyprctl version` output.
///
/// Returning `None` means detection failed.
pub trait VersionProbe {
    fn probe(&self) -> Option<String>;
}

/// A probe that always reports the same string.
#[derive(Debug, Clone)]
pub struct StaticProbe(pub Option<String>);

impl StaticProbe {
    pub fn new(version: &str) -> Self {
        Self(Some(version.to_string()))
    }

    pub fn unknown() -> Self {
        Self(None)
    }
}

impl VersionProbe for StaticProbe {
    fn probe(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Supplies the compositor version migrations should target.
pub trait VersionProvider {
    fn version(&self) -> Version;

    /// Drop any cached result so the next [`version`](Self::version) re-detects.
    fn invalidate(&self);
}

/// Probes lazily on first use and memoizes until invalidated.
pub struct CachedVersion<P> {
    probe: P,
    cached: Mutex<Option<Version>>,
}

impl<P: VersionProbe> CachedVersion<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            cached: Mutex::new(None),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Version>> {
        self.cached
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<P: VersionProbe> VersionProvider for CachedVersion<P> {
    fn version(&self) -> Version {
        let mut cached = self.lock();
        if let Some(v) = *cached {
            return v;
        }
        let raw = self.probe.probe().unwrap_or_else(|| "unknown".to_string());
        let version = Version::parse(&raw);
        if version.is_unknown() {
            info!(raw = %raw, "Compositor version unknown, assuming oldest");
        } else {
            debug!(%version, "Detected compositor version");
        }
        *cached = Some(version);
        version
    }

    fn invalidate(&self) {
        *self.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn parse_full_triple() {
        assert_eq!(Version::parse("0.45.2"), Version::new(0, 45, 2));
    }

    #[test]
    fn parse_strips_v_and_prerelease() {
        assert_eq!(Version::parse("v0.45.2-beta"), Version::new(0, 45, 2));
        assert_eq!(Version::parse(" v0.41.0-12-gabcdef "), Version::new(0, 41, 0));
    }

    #[test]
    fn parse_missing_components_are_zero() {
        assert_eq!(Version::parse("0.41"), Version::new(0, 41, 0));
        assert_eq!(Version::parse("1"), Version::new(1, 0, 0));
    }

    #[test]
    fn parse_unknown_is_zero() {
        assert_eq!(Version::parse("unknown"), Version::UNKNOWN);
        assert_eq!(Version::parse(""), Version::UNKNOWN);
        assert!(Version::parse("garbage").is_unknown());
    }

    #[test]
    fn ordering_is_lexicographic_over_triple() {
        assert!(Version::parse("0.9.9") < Version::parse("0.10.0"));
        assert!(Version::parse("1.0.0") > Version::parse("0.99.99"));
        assert!(Version::parse("0.28.0") <= Version::parse("0.28.0"));
    }

    #[test]
    fn compare_is_antisymmetric_and_reflexive() {
        let samples = ["0.28.0", "v0.45.2-beta", "0.45", "unknown", "1.0.0", "0.9.12"];
        for a in samples {
            assert_eq!(compare(a, a), 0, "{a}");
            for b in samples {
                assert_eq!(compare(a, b), -compare(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn display_is_dotted() {
        assert_eq!(Version::new(0, 45, 2).to_string(), "0.45.2");
    }

    struct CountingProbe {
        calls: Cell<u32>,
        value: &'static str,
    }

    impl VersionProbe for CountingProbe {
        fn probe(&self) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            Some(self.value.to_string())
        }
    }

    #[test]
    fn cached_version_probes_once() {
        let provider = CachedVersion::new(CountingProbe {
            calls: Cell::new(0),
            value: "0.45.0",
        });
        assert!(!provider.is_cached());
        assert_eq!(provider.version(), Version::new(0, 45, 0));
        assert_eq!(provider.version(), Version::new(0, 45, 0));
        assert_eq!(provider.probe.calls.get(), 1);
        assert!(provider.is_cached());
    }

    #[test]
    fn invalidate_forces_reprobe() {
        let provider = CachedVersion::new(CountingProbe {
            calls: Cell::new(0),
            value: "0.45.0",
        });
        provider.version();
        provider.invalidate();
        assert!(!provider.is_cached());
        provider.version();
        assert_eq!(provider.probe.calls.get(), 2);
    }

    #[test]
    fn failed_probe_is_unknown() {
        let provider = CachedVersion::new(StaticProbe::unknown());
        assert_eq!(provider.version(), Version::UNKNOWN);
    }
}
