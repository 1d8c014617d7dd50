//! Parsing of human-readable Windows version names.
//!
//! Most of the complexity here is Microsoft's non-sequential public
//! numbering: "Windows 7" is kernel 6.1, "Windows 8.1" is 6.3, "Windows 11"
//! is still kernel major 10 with a build floor of 22000, and the 10/11
//! feature updates go by half-year codes ("21H2") or release dates ("1909")
//! that stand in for specific build numbers.
//!
//! Only consumer version names are understood. A server version still works
//! if spelled as its full kernel triple, i.e. "Windows 6.0.6003" rather
//! than "Windows Server 2008 SP2".

use tracing::warn;

use crate::version::WindowsVersion;

/// The two accepted spellings of the platform prefix.
const PLATFORM_PREFIXES: [&str; 2] = ["Windows ", "windows "];

/// Feature-update codes for "Windows 11 <code>" requests.
const WIN11_UPDATE_BUILDS: &[(&str, u32)] = &[("22H2", 22621), ("21H2", 22000)];

/// Feature-update codes for "Windows 10 <code>" requests.
const WIN10_UPDATE_BUILDS: &[(&str, u32)] = &[
    ("22H2", 19045),
    ("21H2", 19044),
    ("21H1", 19043),
    ("20H2", 19042),
];

/// Windows 10 feature updates named by release date, e.g. "Windows 10 1909".
/// These arrive through the minor slot because they are plain numbers.
const WIN10_DATED_BUILDS: &[(u32, u32)] = &[
    (2004, 19041),
    (1909, 18363),
    (1903, 18362),
    (1809, 17763),
    (1803, 17134),
    (1709, 16299),
    (1703, 15063),
    (1607, 14393),
    (1511, 10586),
    (1507, 10240),
];

/// Returns whether the string claims a Windows version at all, as opposed
/// to naming some other platform.
///
/// This runs before any parsing so that strings aimed at other platforms
/// fold into an unconditional "not available" without being interpreted.
pub fn is_windows_request(s: &str) -> bool {
    PLATFORM_PREFIXES.iter().any(|prefix| s.starts_with(prefix))
}

/// Consume a maximal run of leading ASCII digits, advancing the cursor past
/// them, and return the accumulated value.
///
/// `None` when the cursor is at end of input or the next character is not a
/// digit; the cursor is left untouched in that case. Accumulation saturates,
/// so an absurdly long digit run clamps to `u32::MAX` instead of wrapping to
/// a small number any system would satisfy.
fn take_number(cursor: &mut &str) -> Option<u32> {
    let bytes = cursor.as_bytes();
    let mut len = 0;
    let mut value: u32 = 0;
    while let Some(&b) = bytes.get(len) {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
        len += 1;
    }
    if len == 0 {
        return None;
    }
    *cursor = &cursor[len..];
    Some(value)
}

/// Consume one field separator if present. Version fields may be separated
/// by a period, underscore, or space.
fn take_separator(cursor: &mut &str) -> bool {
    match cursor.as_bytes().first() {
        Some(b'.' | b'_' | b' ') => {
            *cursor = &cursor[1..];
            true
        }
        _ => false,
    }
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Parse a version request such as "Windows 10 21H2" into a canonical
/// kernel triple.
///
/// Returns [`WindowsVersion::INVALID`] when the string does not carry the
/// platform prefix or its major version cannot be read. Missing or
/// malformed trailing fields truncate the result to the fields already
/// resolved rather than failing it, so "Windows 10" is a valid, less
/// specific request.
pub fn parse_version_request(s: &str) -> WindowsVersion {
    let Some(rest) = PLATFORM_PREFIXES
        .iter()
        .find_map(|prefix| s.strip_prefix(prefix))
    else {
        return WindowsVersion::INVALID;
    };

    // Alias names predate the numeric scheme entirely. Anything after the
    // alias is ignored.
    if has_prefix_ignore_case(rest, "Vista") {
        return WindowsVersion::new(6, 0, 0);
    }
    if has_prefix_ignore_case(rest, "XP") {
        return WindowsVersion::new(5, 1, 0);
    }

    let mut cursor = rest;
    let Some(requested_major) = take_number(&mut cursor) else {
        warn!(request = s, "unrecognized Windows version name");
        return WindowsVersion::INVALID;
    };

    // The marketing major number rarely matches the kernel's.
    let mut version = match requested_major {
        7 => WindowsVersion::new(6, 1, 0),
        8 => WindowsVersion::new(6, 2, 0),
        // Windows 11 is still kernel major 10; its builds start at 22000.
        11 => WindowsVersion::new(10, 0, 22000),
        other => WindowsVersion::new(other, 0, 0),
    };

    if !take_separator(&mut cursor) {
        return version;
    }

    // A named feature-update code maps straight to its build number, and no
    // further field can follow one.
    let update_codes: &[(&str, u32)] = match requested_major {
        11 => WIN11_UPDATE_BUILDS,
        10 => WIN10_UPDATE_BUILDS,
        _ => &[],
    };
    for (code, build) in update_codes {
        if cursor.starts_with(code) {
            version.build = *build;
            return version;
        }
    }

    let Some(requested_minor) = take_number(&mut cursor) else {
        return version;
    };
    version.minor = requested_minor;

    // "Windows 8.1" is kernel 6.3.
    if requested_major == 8 && requested_minor == 1 {
        version.minor = 3;
    }

    // On the 10/11 kernel line a non-zero minor slot carries an update
    // code, not a real minor version: either a dated code ("Windows 10
    // 1909") or a raw build number. Resolve it into the build slot.
    if version.major == 10 && requested_minor > 0 {
        let dated = if requested_major == 10 {
            WIN10_DATED_BUILDS
                .iter()
                .find(|(code, _)| *code == requested_minor)
        } else {
            None
        };
        version.build = match dated {
            Some((_, build)) => *build,
            None => requested_minor,
        };
        version.minor = 0;
    }

    if !take_separator(&mut cursor) {
        return version;
    }
    if let Some(build) = take_number(&mut cursor) {
        version.build = build;
    }
    version
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn parsed(s: &str) -> (u32, u32, u32) {
        let v = parse_version_request(s);
        (v.major, v.minor, v.build)
    }

    #[test]
    fn platform_prefix_accepts_two_spellings() {
        assert!(is_windows_request("Windows 10"));
        assert!(is_windows_request("windows 10"));
        assert!(!is_windows_request("WINDOWS 10"));
        assert!(!is_windows_request("Windows"));
        assert!(!is_windows_request("macOS 13"));
        assert!(!is_windows_request(""));
    }

    #[test]
    fn take_number_consumes_maximal_digit_run() {
        let mut cursor = "1909 rest";
        assert_eq!(take_number(&mut cursor), Some(1909));
        assert_eq!(cursor, " rest");
    }

    #[test]
    fn take_number_rejects_non_digit() {
        let mut cursor = "H2";
        assert_eq!(take_number(&mut cursor), None);
        assert_eq!(cursor, "H2");

        let mut empty = "";
        assert_eq!(take_number(&mut empty), None);
    }

    #[test]
    fn take_number_saturates_instead_of_wrapping() {
        let mut cursor = "99999999999999999999";
        assert_eq!(take_number(&mut cursor), Some(u32::MAX));
        assert_eq!(cursor, "");
    }

    #[test]
    fn marketing_majors_remap_to_kernel_versions() {
        assert_eq!(parsed("Windows 7"), (6, 1, 0));
        assert_eq!(parsed("Windows 8"), (6, 2, 0));
        assert_eq!(parsed("Windows 8.1"), (6, 3, 0));
        assert_eq!(parsed("Windows 10"), (10, 0, 0));
        assert_eq!(parsed("Windows 11"), (10, 0, 22000));
    }

    #[test]
    fn alias_names_resolve_case_insensitively() {
        assert_eq!(parsed("Windows XP"), (5, 1, 0));
        assert_eq!(parsed("Windows xp"), (5, 1, 0));
        assert_eq!(parsed("Windows Vista"), (6, 0, 0));
        assert_eq!(parsed("windows VISTA"), (6, 0, 0));
    }

    #[test]
    fn named_update_codes_resolve_per_major() {
        assert_eq!(parsed("Windows 11 22H2"), (10, 0, 22621));
        assert_eq!(parsed("Windows 11 21H2"), (10, 0, 22000));
        assert_eq!(parsed("Windows 10 22H2"), (10, 0, 19045));
        assert_eq!(parsed("Windows 10 21H2"), (10, 0, 19044));
        assert_eq!(parsed("Windows 10 21H1"), (10, 0, 19043));
        assert_eq!(parsed("Windows 10 20H2"), (10, 0, 19042));
    }

    #[test]
    fn update_codes_are_case_sensitive() {
        // "21h2" is not a recognized code; the digits parse as a raw build.
        assert_eq!(parsed("Windows 10 21h2"), (10, 0, 21));
    }

    #[test]
    fn dated_update_codes_resolve_to_builds() {
        assert_eq!(parsed("Windows 10 2004"), (10, 0, 19041));
        assert_eq!(parsed("Windows 10 1909"), (10, 0, 18363));
        assert_eq!(parsed("Windows 10 1903"), (10, 0, 18362));
        assert_eq!(parsed("Windows 10 1809"), (10, 0, 17763));
        assert_eq!(parsed("Windows 10 1803"), (10, 0, 17134));
        assert_eq!(parsed("Windows 10 1709"), (10, 0, 16299));
        assert_eq!(parsed("Windows 10 1703"), (10, 0, 15063));
        assert_eq!(parsed("Windows 10 1607"), (10, 0, 14393));
        assert_eq!(parsed("Windows 10 1511"), (10, 0, 10586));
        assert_eq!(parsed("Windows 10 1507"), (10, 0, 10240));
    }

    #[test]
    fn unknown_minor_on_ten_becomes_raw_build() {
        assert_eq!(parsed("Windows 10 19044"), (10, 0, 19044));
        // Kernel major 10 applies to Windows 11 requests too, so a numeric
        // minor there also lands in the build slot.
        assert_eq!(parsed("Windows 11.5"), (10, 0, 5));
    }

    #[test]
    fn full_kernel_triples_pass_through() {
        assert_eq!(parsed("Windows 6.0.6003"), (6, 0, 6003));
        assert_eq!(parsed("Windows 10.0.19044"), (10, 0, 19044));
        assert_eq!(parsed("Windows 6_1_7601"), (6, 1, 7601));
    }

    #[test]
    fn missing_trailing_fields_truncate() {
        assert_eq!(parsed("Windows 10."), (10, 0, 0));
        assert_eq!(parsed("Windows 10.0."), (10, 0, 0));
        assert_eq!(parsed("Windows 10.0.x"), (10, 0, 0));
        assert_eq!(parsed("Windows 7 junk"), (6, 1, 0));
    }

    #[test]
    fn non_separator_tail_is_ignored() {
        assert_eq!(parsed("Windows 10abc"), (10, 0, 0));
        assert_eq!(parsed("Windows 11 22H2 extra"), (10, 0, 22621));
    }

    #[test]
    fn unparseable_major_yields_invalid() {
        assert!(parse_version_request("Windows ").is_invalid());
        assert!(parse_version_request("Windows Server 2008").is_invalid());
        assert!(parse_version_request("Windows ME").is_invalid());
        assert!(parse_version_request("not even close").is_invalid());
    }

    proptest! {
        /// Parsing is a pure function of its input.
        #[test]
        fn prop_parse_is_pure(s in "\\PC*") {
            prop_assert_eq!(parse_version_request(&s), parse_version_request(&s));
        }

        /// A bare "Windows 10" request is never stronger than the same
        /// request with more fields specified.
        #[test]
        fn prop_truncated_requests_are_weaker(build in 0u32..1_000_000) {
            let bare = parse_version_request("Windows 10");
            let full = parse_version_request(&format!("Windows 10.0.{build}"));
            prop_assert!(bare <= full);
        }

        /// Arbitrary field suffixes never panic the parser and never move a
        /// "Windows 11" request off kernel major 10.
        #[test]
        fn prop_windows_11_floor_holds(suffix in "([ ._][0-9A-Za-z._ ]{0,12})?") {
            let v = parse_version_request(&format!("Windows 11{suffix}"));
            prop_assert_eq!(v.major, 10);
        }
    }
}
