//! Unit tests for the source model.

use jules_relay::models::Source;
use serde_json::json;

fn source(owner: &str, repo: &str) -> Source {
    serde_json::from_value(json!({
        "name": format!("sources/github/{owner}/{repo}"),
        "id": format!("github/{owner}/{repo}"),
        "githubRepo": { "owner": owner, "repo": repo, "isPrivate": false }
    }))
    .expect("source decodes")
}

#[test]
fn matches_exact_owner_and_repo() {
    let src = source("acme", "widgets");
    assert!(src.matches_repo("acme", "widgets"));
}

#[test]
fn match_is_case_sensitive() {
    let src = source("acme", "widgets");
    assert!(!src.matches_repo("Acme", "widgets"));
    assert!(!src.matches_repo("acme", "Widgets"));
}

#[test]
fn owner_and_repo_must_both_match() {
    let src = source("acme", "widgets");
    assert!(!src.matches_repo("acme", "gadgets"));
    assert!(!src.matches_repo("other", "widgets"));
}

#[test]
fn source_without_github_descriptor_never_matches() {
    let src: Source =
        serde_json::from_value(json!({ "name": "sources/other/x" })).expect("decodes");
    assert!(src.github_repo.is_none());
    assert!(!src.matches_repo("", ""));
}

#[test]
fn provider_fields_are_preserved() {
    let src = source("acme", "widgets");
    let gh = src.github_repo.as_ref().expect("github descriptor");
    assert_eq!(gh.extra.get("isPrivate"), Some(&json!(false)));
}
