//! Release tag comparison.

use semver::Version;

/// Returns true if release `candidate` is newer than `current`.
///
/// Both sides may carry a leading `v`. Proper semver tags are compared
/// with semver precedence; anything else falls back to comparing the
/// numeric dot-separated components.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let a = candidate.trim().trim_start_matches('v');
    let b = current.trim().trim_start_matches('v');

    if let (Ok(va), Ok(vb)) = (Version::parse(a), Version::parse(b)) {
        return va > vb;
    }
    is_newer_numeric(a, b)
}

fn is_newer_numeric(a: &str, b: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.split(|c: char| c == '.' || c == '-')
            .map_while(|s| s.parse::<u64>().ok())
            .collect()
    };

    let va = parse(a);
    let vb = parse(b);

    for i in 0..va.len().max(vb.len()) {
        let a_part = va.get(i).copied().unwrap_or(0);
        let b_part = vb.get(i).copied().unwrap_or(0);
        if a_part > b_part {
            return true;
        }
        if a_part < b_part {
            return false;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_comparison() {
        assert!(is_newer("v0.2.0", "v0.1.0"));
        assert!(is_newer("1.0.0", "0.9.9"));
        assert!(is_newer("v1.0.1", "1.0.0"));
        assert!(!is_newer("0.1.0", "0.2.0"));
        assert!(!is_newer("v1.0.0", "v1.0.0"));
    }

    #[test]
    fn prerelease_orders_before_release() {
        assert!(is_newer("v1.0.0", "v1.0.0-rc.1"));
        assert!(!is_newer("v1.0.0-rc.1", "v1.0.0"));
        assert!(is_newer("v1.0.0-rc.2", "v1.0.0-rc.1"));
    }

    #[test]
    fn version_comparison_different_lengths() {
        assert!(is_newer("1.0.0", "0.9"));
        assert!(!is_newer("0.9", "1.0.0"));
        assert!(is_newer("1.1", "1.0.0"));
    }

    #[test]
    fn anything_beats_the_sentinel() {
        assert!(is_newer("v0.0.2", "v0.0.1"));
        assert!(is_newer("v3", "v0.0.1"));
    }

    #[test]
    fn garbage_is_never_newer() {
        assert!(!is_newer("nightly", "v0.0.1"));
    }
}
