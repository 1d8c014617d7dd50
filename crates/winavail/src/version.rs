use std::cmp::Ordering;
use std::fmt;

/// A Windows version as the kernel reports it: (major, minor, build).
///
/// Both parsed version requests and the live system version normalize to
/// this shape, so the two sides of an "at least" check compare directly.
/// Ordering is lexicographic on (major, minor, build).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowsVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
}

impl WindowsVersion {
    /// The result of a version request that failed to parse.
    ///
    /// Greater than anything a real kernel reports, so an "at least" check
    /// against it is never satisfied.
    pub const INVALID: WindowsVersion = WindowsVersion::new(u32::MAX, 0, 0);

    pub const fn new(major: u32, minor: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            build,
        }
    }

    pub const fn is_invalid(&self) -> bool {
        self.major == Self::INVALID.major
            && self.minor == Self::INVALID.minor
            && self.build == Self::INVALID.build
    }
}

impl Ord for WindowsVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl PartialOrd for WindowsVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for WindowsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}
