//! Best-effort extraction from `build.zig.zon` manifests.
//!
//! The manifest is Zig syntax, but the catalog only needs two facts out of
//! it: the declared dependencies and the minimum Zig version. Rather than a
//! full grammar, extraction pattern-matches the two constructs and bounds
//! the dependencies block by tracking brace depth. Anything malformed
//! degrades to a partial or empty result; extraction never fails.

use once_cell::sync::Lazy;
use regex::Regex;

/// One dependency declared in a manifest.
///
/// Remote dependencies carry a `url` (and usually a content `hash`); local
/// ones carry a `path`. Entries with neither are dropped during
/// extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDependency {
    pub name: String,
    pub url: Option<String>,
    pub hash: Option<String>,
    pub path: Option<String>,
}

/// Metadata recovered from a manifest blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestMetadata {
    pub dependencies: Vec<ManifestDependency>,
    pub minimum_zig_version: Option<String>,
}

static MIN_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.minimum_zig_version\s*=\s*"([^"]*)""#).expect("minimum version regex")
});

// Entry names are either plain identifiers (`.name`) or the quoted form
// (`.@"some-name"`). The match stops at the opening brace of the value.
static DEP_ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.(?:@"([^"]+)"|([A-Za-z_][A-Za-z0-9_]*))\s*=\s*\.\{"#)
        .expect("dependency entry regex")
});

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\.url\s*=\s*"([^"]*)""#).expect("url regex"));
static HASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\.hash\s*=\s*"([^"]*)""#).expect("hash regex"));
static PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\.path\s*=\s*"([^"]*)""#).expect("path regex"));

/// Extract dependency and version metadata from a manifest blob.
///
/// Tolerates a missing manifest, a missing dependencies block, and
/// malformed entries.
#[must_use]
pub fn extract(manifest: Option<&str>) -> ManifestMetadata {
    let Some(text) = manifest else {
        return ManifestMetadata::default();
    };

    let minimum_zig_version = MIN_VERSION_RE
        .captures(text)
        .map(|c| c[1].to_string());

    let dependencies = match dependencies_block(text) {
        Some(block) => parse_dependencies(block),
        None => Vec::new(),
    };

    ManifestMetadata {
        dependencies,
        minimum_zig_version,
    }
}

/// Locate the span of the `.dependencies = .{ ... }` block body.
///
/// The returned slice starts just after the opening brace and ends just
/// before the matching closing brace, found by scanning forward while
/// tracking nesting depth. Nested `.{ ... }` values inside entries keep
/// the depth above zero until the true end of the block.
fn dependencies_block(text: &str) -> Option<&str> {
    static BLOCK_OPEN_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\.dependencies\s*=\s*\.\{").expect("dependencies open regex"));

    let open = BLOCK_OPEN_RE.find(text)?;
    let body_start = open.end();

    let mut depth: usize = 1;
    for (offset, ch) in text[body_start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[body_start..body_start + offset]);
                }
            }
            _ => {}
        }
    }

    // Unterminated block: treat the remainder as the body rather than
    // discarding everything.
    Some(&text[body_start..])
}

/// Parse `name = .{ ... }` entries within a dependencies block body.
fn parse_dependencies(block: &str) -> Vec<ManifestDependency> {
    let mut deps = Vec::new();

    for caps in DEP_ENTRY_RE.captures_iter(block) {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let value_start = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let inner = entry_body(&block[value_start..]);

        let url = URL_RE.captures(inner).map(|c| c[1].to_string());
        let path = PATH_RE.captures(inner).map(|c| c[1].to_string());

        if url.is_none() && path.is_none() {
            continue;
        }

        let hash = if url.is_some() {
            HASH_RE.captures(inner).map(|c| c[1].to_string())
        } else {
            None
        };

        deps.push(ManifestDependency {
            name,
            url,
            hash,
            path,
        });
    }

    deps
}

/// Bound one entry's value by brace depth, starting just inside its `.{`.
fn entry_body(text: &str) -> &str {
    let mut depth: usize = 1;
    for (offset, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &text[..offset];
                }
            }
            _ => {}
        }
    }
    text
}
