// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module id to resolved address mapping

use url::Url;

/// Maps a module id to the canonical address it is memoized under.
///
/// Must be deterministic and pure: resolution runs on every require and on
/// `require.resolve`, and neither may have side effects. Hosts with their
/// own mapping policy (alias tables, roots, extension probing) install an
/// implementation of this trait on the module system.
pub trait AddressResolver: Send + Sync {
    /// Resolve `id` against `base`, the address of the requesting module
    /// (empty for top-level requesters).
    fn resolve(&self, id: &str, base: &str) -> String;
}

/// Default resolver.
///
/// Relative ids (`./`, `../`) join against the base address, through the
/// `url` crate when the base is a URL and textually otherwise. Absolute URLs
/// pass through normalized. Anything else is taken as already canonical.
#[derive(Debug, Default)]
pub struct UrlResolver;

impl AddressResolver for UrlResolver {
    fn resolve(&self, id: &str, base: &str) -> String {
        if id.starts_with("./") || id.starts_with("../") {
            if !base.is_empty() {
                if let Ok(base_url) = Url::parse(base) {
                    if let Ok(joined) = base_url.join(id) {
                        return joined.to_string();
                    }
                }
            }
            return join_relative(base, id);
        }

        if let Ok(absolute) = Url::parse(id) {
            return absolute.to_string();
        }

        id.to_string()
    }
}

/// Textual join for non-URL bases: strip the base's last segment, then apply
/// the id's segments with `.`/`..` handling.
fn join_relative(base: &str, id: &str) -> String {
    let absolute = base.starts_with('/');
    let dir = match base.rfind('/') {
        Some(index) => &base[..index],
        None => "",
    };

    let mut segments: Vec<&str> = dir.split('/').filter(|segment| !segment.is_empty()).collect();
    for segment in id.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute { format!("/{joined}") } else { joined }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(id: &str, base: &str) -> String {
        UrlResolver.resolve(id, base)
    }

    #[test]
    fn test_relative_against_path_base() {
        assert_eq!(resolve("./b.js", "/mods/a.js"), "/mods/b.js");
        assert_eq!(resolve("../b.js", "/mods/sub/a.js"), "/mods/b.js");
        assert_eq!(resolve("./x/y.js", "/mods/a.js"), "/mods/x/y.js");
    }

    #[test]
    fn test_relative_against_url_base() {
        assert_eq!(
            resolve("./b.js", "https://cdn.example/mods/a.js"),
            "https://cdn.example/mods/b.js"
        );
        assert_eq!(
            resolve("../util.js", "https://cdn.example/mods/sub/a.js"),
            "https://cdn.example/mods/util.js"
        );
    }

    #[test]
    fn test_absolute_url_passes_through() {
        assert_eq!(
            resolve("https://cdn.example/a.js", "/mods/b.js"),
            "https://cdn.example/a.js"
        );
    }

    #[test]
    fn test_bare_id_is_taken_as_canonical() {
        assert_eq!(resolve("/mods/a.js", ""), "/mods/a.js");
        assert_eq!(resolve("tools", "/mods/a.js"), "tools");
    }

    #[test]
    fn test_relative_with_empty_base() {
        assert_eq!(resolve("./b.js", ""), "b.js");
    }
}
