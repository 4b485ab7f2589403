//! GraphQL documents used by the sync pipeline.
//!
//! Two request shapes cover everything: a paginated search returning
//! lightweight identity tuples, and a bulk-by-id lookup returning the full
//! field set the normalizer consumes.

/// Search filter for repositories tagged as packages.
pub const PACKAGE_SEARCH: &str = "topic:zig-package fork:false";

/// Search filter for repositories tagged as applications.
pub const APPLICATION_SEARCH: &str = "topic:zig-application fork:false";

/// Results per search page.
pub const SEARCH_PAGE_SIZE: u32 = 50;

/// Paginated repository search. Variables: `searchQuery: String!`,
/// `first: Int!`, `after: String`.
pub const SEARCH_PAGE_QUERY: &str = r#"
query($searchQuery: String!, $first: Int!, $after: String) {
  search(query: $searchQuery, type: REPOSITORY, first: $first, after: $after) {
    pageInfo {
      hasNextPage
      endCursor
    }
    nodes {
      ... on Repository {
        id
        name
        owner { login }
        nameWithOwner
        updatedAt
        defaultBranchRef {
          target { oid }
        }
      }
    }
  }
}
"#;

/// Bulk detail lookup by node id. Variables: `ids: [ID!]!`.
///
/// Owner profile fields differ by account kind: `bio`, `company` and the
/// follower counts only exist on users, so the organization fragment
/// aliases its `description` onto `bio` and leaves the rest absent.
pub const REPO_DETAILS_QUERY: &str = r#"
query($ids: [ID!]!) {
  nodes(ids: $ids) {
    ... on Repository {
      id
      name
      nameWithOwner
      description
      homepageUrl
      stargazerCount
      forkCount
      watchers { totalCount }
      createdAt
      updatedAt
      isArchived
      isDisabled
      isFork
      primaryLanguage { name }
      licenseInfo { spdxId }
      repositoryTopics(first: 10) {
        nodes {
          topic { name }
        }
      }
      defaultBranchRef {
        target { oid }
      }
      owner {
        login
        avatarUrl
        ... on User {
          bio
          company
          location
          websiteUrl
          twitterUsername
          createdAt
          followers { totalCount }
          following { totalCount }
        }
        ... on Organization {
          bio: description
          location
          websiteUrl
          twitterUsername
          createdAt
        }
      }
      releases(first: 20, orderBy: {field: CREATED_AT, direction: DESC}) {
        nodes {
          tagName
          name
          description
          isPrerelease
          publishedAt
          url
          releaseAssets(first: 20) {
            nodes {
              name
              downloadUrl
              size
              contentType
            }
          }
        }
      }
      manifest: object(expression: "HEAD:build.zig.zon") {
        ... on Blob { text }
      }
      readmeUpper: object(expression: "HEAD:README.md") {
        ... on Blob { text }
      }
      readmeLower: object(expression: "HEAD:readme.md") {
        ... on Blob { text }
      }
    }
  }
}
"#;
