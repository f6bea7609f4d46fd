//! Picking the downloadable asset that matches this device.

use super::GithubAsset;

/// Characters that separate the parts of an asset file name.
const SEPARATORS: [char; 3] = ['-', '_', '.'];

/// Every architecture spelling we recognise in asset names.
const KNOWN_ARCHES: &[&str] = &[
    "aarch64", "arm64", "armv7", "armv7l", "armhf", "arm", "x86_64", "amd64", "i686", "386",
    "riscv64",
];

/// Spellings of Rust's `ARCH` names used in asset file names, most specific
/// first.
fn arch_aliases(arch: &str) -> &'static [&'static str] {
    match arch {
        "aarch64" => &["aarch64", "arm64"],
        "arm" => &["armv7", "armv7l", "armhf", "arm"],
        "x86_64" => &["x86_64", "amd64"],
        "x86" => &["i686", "386"],
        _ => &[],
    }
}

/// Whether `name` contains `arch` as a whole separator-delimited segment,
/// so `arm` matches `jetclock-linux-arm` but not `jetclock-linux-arm64`.
fn names_arch(name: &str, arch: &str) -> bool {
    let is_boundary = |c: Option<char>| c.map_or(true, |c| SEPARATORS.contains(&c));
    name.match_indices(arch).any(|(start, _)| {
        let end = start + arch.len();
        is_boundary(name[..start].chars().next_back()) && is_boundary(name[end..].chars().next())
    })
}

/// Choose the asset for `binary_name` on `arch`.
///
/// Aliases are tried in priority order across all assets naming the
/// binary. Without an architecture match, only an asset that names no
/// architecture at all is acceptable.
pub fn select_asset<'a>(
    assets: &'a [GithubAsset],
    binary_name: &str,
    arch: &str,
) -> Option<&'a GithubAsset> {
    let binary_name = binary_name.to_ascii_lowercase();
    let candidates: Vec<(String, &GithubAsset)> = assets
        .iter()
        .map(|a| (a.name.to_ascii_lowercase(), a))
        .filter(|(name, _)| name.contains(&binary_name))
        .collect();

    let mut aliases: Vec<&str> = arch_aliases(arch).to_vec();
    if aliases.is_empty() {
        aliases.push(arch);
    }

    for alias in &aliases {
        if let Some((_, asset)) = candidates.iter().find(|(name, _)| names_arch(name, alias)) {
            return Some(*asset);
        }
    }

    candidates
        .iter()
        .find(|(name, _)| !KNOWN_ARCHES.iter().any(|known| names_arch(name, known)))
        .map(|(_, asset)| *asset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> GithubAsset {
        GithubAsset {
            name: name.to_string(),
            browser_download_url: format!("https://example.test/{name}"),
        }
    }

    #[test]
    fn prefers_matching_architecture() {
        let assets = vec![
            asset("jetclock-linux-amd64"),
            asset("jetclock-linux-arm64"),
            asset("checksums.txt"),
        ];
        let picked = select_asset(&assets, "jetclock", "aarch64").unwrap();
        assert_eq!(picked.name, "jetclock-linux-arm64");

        let picked = select_asset(&assets, "jetclock", "x86_64").unwrap();
        assert_eq!(picked.name, "jetclock-linux-amd64");
    }

    #[test]
    fn falls_back_to_binary_name_only() {
        let assets = vec![asset("checksums.txt"), asset("jetclock")];
        let picked = select_asset(&assets, "jetclock", "riscv64").unwrap();
        assert_eq!(picked.name, "jetclock");
    }

    #[test]
    fn arm_never_picks_a_64_bit_build() {
        let assets = vec![asset("jetclock-linux-arm64"), asset("jetclock-linux-armv7")];
        let picked = select_asset(&assets, "jetclock", "arm").unwrap();
        assert_eq!(picked.name, "jetclock-linux-armv7");

        let only_64 = vec![asset("jetclock-linux-arm64"), asset("jetclock-linux-aarch64")];
        assert!(select_asset(&only_64, "jetclock", "arm").is_none());
    }

    #[test]
    fn preferred_alias_wins_over_listing_order() {
        let assets = vec![asset("jetclock-linux-arm.tar.gz"), asset("jetclock-linux-armv7.tar.gz")];
        let picked = select_asset(&assets, "jetclock", "arm").unwrap();
        assert_eq!(picked.name, "jetclock-linux-armv7.tar.gz");
    }

    #[test]
    fn x86_64_segment_is_matched_whole() {
        let assets = vec![asset("jetclock_linux_x86_64"), asset("jetclock_linux_i686")];
        let picked = select_asset(&assets, "jetclock", "x86_64").unwrap();
        assert_eq!(picked.name, "jetclock_linux_x86_64");
    }

    #[test]
    fn foreign_architecture_is_not_a_fallback() {
        let assets = vec![asset("jetclock-linux-amd64")];
        assert!(select_asset(&assets, "jetclock", "aarch64").is_none());
    }

    #[test]
    fn no_matching_asset() {
        let assets = vec![asset("other-tool-arm64")];
        assert!(select_asset(&assets, "jetclock", "aarch64").is_none());
    }
}
