//! Classification rules for catalog entries.

use super::entry::RepoType;
use crate::github::types::DiscoveryOrigin;

/// Topic marking a repository as a package.
pub const PACKAGE_TOPIC: &str = "zig-package";

/// Topic marking a repository as an application.
pub const APPLICATION_TOPIC: &str = "zig-application";

/// License identifier GitHub reports when a license file exists but maps
/// to no known SPDX id.
pub const UNSPECIFIED_LICENSE: &str = "NOASSERTION";

/// Topic keywords that map directly onto a catalog category. First match
/// wins, in this order.
pub const CATEGORY_TOPICS: &[&str] = &[
    "gui",
    "game",
    "gamedev",
    "graphics",
    "audio",
    "web",
    "http",
    "networking",
    "database",
    "embedded",
    "crypto",
    "compression",
    "serialization",
    "parser",
    "allocator",
    "math",
    "terminal",
    "editor",
    "testing",
    "bindings",
];

/// Classify the repository type from its topics and manifest presence.
pub fn classify_type(topics: &[String], has_manifest: bool) -> RepoType {
    let _is_package = has_manifest || topics.iter().any(|t| t == PACKAGE_TOPIC);
    let _is_application = topics.iter().any(|t| t == APPLICATION_TOPIC);
    // TODO: wire the package/application signals into the result once the
    // front-end renders distinct type badges; until then every entry ships
    // as "project" and changing the value would break its filters.
    RepoType::Project
}

/// Pick a category from the topic list.
///
/// Scans the whitelist in order against the lowercased topics; when
/// nothing matches, repositories discovered under the application query
/// default to "cli" and everything else to "library".
#[must_use]
pub fn classify_category(topics: &[String], origin: DiscoveryOrigin) -> String {
    let lowered: Vec<String> = topics.iter().map(|t| t.to_lowercase()).collect();
    for candidate in CATEGORY_TOPICS {
        if lowered.iter().any(|t| t == candidate) {
            return (*candidate).to_string();
        }
    }

    match origin {
        DiscoveryOrigin::Application => "cli".to_string(),
        DiscoveryOrigin::Package => "library".to_string(),
    }
}

/// Normalize a license identifier, dropping the unspecified sentinel.
#[must_use]
pub fn normalize_license(spdx_id: Option<&str>) -> Option<String> {
    spdx_id
        .filter(|id| !id.is_empty() && *id != UNSPECIFIED_LICENSE)
        .map(String::from)
}
