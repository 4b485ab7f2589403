//! Normalization of fetched repository details into catalog entries.

use super::classify::{classify_category, classify_type, normalize_license};
use super::entry::{CatalogEntry, Dependency, OwnerProfile, Release, ReleaseAsset};
use crate::github::types::{DiscoveryOrigin, OwnerDetails, RepoDetails};
use crate::manifest;

/// Build a catalog entry from one fetched repository.
///
/// Every field is recomputed from the fetch; nothing is merged from any
/// previous version of the entry.
#[must_use]
pub fn to_catalog_entry(details: &RepoDetails, origin: DiscoveryOrigin) -> CatalogEntry {
    let topics = details.topic_names();

    let manifest_text = details
        .manifest
        .as_ref()
        .and_then(|blob| blob.text.as_deref());
    let extracted = manifest::extract(manifest_text);

    let dependencies = if extracted.dependencies.is_empty() {
        None
    } else {
        Some(
            extracted
                .dependencies
                .into_iter()
                .map(|dep| Dependency {
                    name: dep.name,
                    url: dep.url,
                    hash: dep.hash,
                    path: dep.path,
                })
                .collect(),
        )
    };

    let readme = details
        .readme_upper
        .as_ref()
        .and_then(|blob| blob.text.clone())
        .or_else(|| {
            details
                .readme_lower
                .as_ref()
                .and_then(|blob| blob.text.clone())
        });

    let releases = details
        .releases
        .nodes
        .iter()
        .map(|release| Release {
            tag: release.tag_name.clone(),
            name: release.name.clone(),
            body: release.description.clone(),
            prerelease: release.is_prerelease,
            published_at: release.published_at,
            url: release.url.clone(),
            assets: release
                .release_assets
                .nodes
                .iter()
                .map(|asset| ReleaseAsset {
                    name: asset.name.clone(),
                    download_url: asset.download_url.clone(),
                    size: asset.size,
                    content_type: asset.content_type.clone(),
                })
                .collect(),
        })
        .collect();

    CatalogEntry {
        name: details.name.clone(),
        owner: details.owner.login.clone(),
        repo: details.name.clone(),
        description: details.description.clone(),
        repo_type: classify_type(&topics, manifest_text.is_some()),
        category: Some(classify_category(&topics, origin)),
        license: normalize_license(
            details
                .license_info
                .as_ref()
                .and_then(|l| l.spdx_id.as_deref()),
        ),
        homepage: details
            .homepage_url
            .clone()
            .filter(|url| !url.is_empty()),
        readme,
        dependencies,
        minimum_zig_version: extracted.minimum_zig_version,
        topics,
        stars: details.stargazer_count,
        forks: details.fork_count,
        watchers: details.watchers.total_count,
        updated_at: details.updated_at,
        owner_profile: owner_profile(&details.owner),
        releases,
    }
}

/// Map owner details onto the profile shape, omitting it entirely when the
/// API returned nothing beyond the login.
fn owner_profile(owner: &OwnerDetails) -> Option<OwnerProfile> {
    let profile = OwnerProfile {
        avatar_url: owner.avatar_url.clone(),
        bio: owner.bio.clone(),
        company: owner.company.clone(),
        location: owner.location.clone(),
        blog: owner.website_url.clone().filter(|url| !url.is_empty()),
        twitter: owner.twitter_username.clone(),
        followers: owner.followers.as_ref().map(|c| c.total_count),
        following: owner.following.as_ref().map(|c| c.total_count),
        created_at: owner.created_at,
    };

    (profile != OwnerProfile::default()).then_some(profile)
}
