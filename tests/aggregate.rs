mod common;

use common::{item, matched, profile, MockApi};
use lostfound::aggregate::{
    owned_items, recent_owned_items, resolve_matches, MatchResolution, DEFAULT_LOCATION, UNKNOWN_EMAIL,
};
use lostfound::models::{ItemKind, OwnedItem};
use lostfound::ClientError;

fn ids(entries: &[OwnedItem]) -> Vec<(ItemKind, String)> {
    entries.iter().map(|e| (e.kind(), e.item().id.clone())).collect()
}

#[tokio::test]
async fn lost_items_precede_found_items_in_profile_order() {
    let mut api = MockApi { profile: Some(profile(&["l1", "l2", "l3"], &["f1", "f2"])), ..Default::default() }
        .with_item(ItemKind::Lost, item("l1", 1))
        .with_item(ItemKind::Lost, item("l2", 2))
        .with_item(ItemKind::Lost, item("l3", 3))
        .with_item(ItemKind::Found, item("f1", 4))
        .with_item(ItemKind::Found, item("f2", 5));
    // earlier references finish last
    api.delays_ms.insert("l1".into(), 30);
    api.delays_ms.insert("f1".into(), 20);

    let (_, agg) = owned_items(&api).await.unwrap();
    assert_eq!(
        ids(&agg.entries),
        vec![
            (ItemKind::Lost, "l1".to_string()),
            (ItemKind::Lost, "l2".to_string()),
            (ItemKind::Lost, "l3".to_string()),
            (ItemKind::Found, "f1".to_string()),
            (ItemKind::Found, "f2".to_string()),
        ]
    );
    assert!(agg.diagnostics.is_empty());
    assert_eq!(api.calls(), 1 + 5);
}

#[tokio::test]
async fn one_failed_item_is_omitted_and_recorded() {
    // "b" is referenced by the profile but was deleted server-side
    let api = MockApi { profile: Some(profile(&["a", "b"], &["c"])), ..Default::default() }
        .with_item(ItemKind::Lost, item("a", 1))
        .with_item(ItemKind::Found, item("c", 2));

    let (_, agg) = owned_items(&api).await.unwrap();
    assert_eq!(ids(&agg.entries), vec![(ItemKind::Lost, "a".to_string()), (ItemKind::Found, "c".to_string())]);
    assert_eq!(agg.diagnostics.len(), 1);
    assert!(agg.diagnostics[0].subject.contains("b"));
    assert!(agg.diagnostics[0].message.contains("404"));
}

#[tokio::test]
async fn kind_comes_from_the_source_list() {
    // same id in both collections
    let api = MockApi { profile: Some(profile(&["x"], &["x"])), ..Default::default() }
        .with_item(ItemKind::Lost, item("x", 1))
        .with_item(ItemKind::Found, item("x", 2));
    let (_, agg) = owned_items(&api).await.unwrap();
    assert!(matches!(agg.entries[0], OwnedItem::Lost(_)));
    assert!(matches!(agg.entries[1], OwnedItem::Found(_)));
}

#[tokio::test]
async fn profile_failure_fails_the_workflow() {
    let api = MockApi::default();
    let err = owned_items(&api).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn unauthenticated_session_short_circuits() {
    let api = MockApi { authenticated: false, profile: Some(profile(&["a"], &[])), ..Default::default() };
    assert!(matches!(owned_items(&api).await, Err(ClientError::Unauthorized)));
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn profile_variant_keeps_six_newest() {
    let lost = ["a", "b", "c", "d"];
    let found = ["e", "f", "g", "h"];
    let mut api = MockApi { profile: Some(profile(&lost, &found)), ..Default::default() };
    for (day, id) in lost.iter().chain(found.iter()).enumerate() {
        let kind = if day < 4 { ItemKind::Lost } else { ItemKind::Found };
        // interleave dates so sorting actually reorders
        let d = [3, 8, 1, 6, 2, 7, 5, 4][day];
        api = api.with_item(kind, item(id, d));
    }

    let agg = recent_owned_items(&api).await.unwrap();
    assert_eq!(agg.entries.len(), 6);
    let days: Vec<u32> = agg.entries.iter().map(|e| e.item().created_at.format("%d").to_string().parse().unwrap()).collect();
    assert_eq!(days, vec![8, 7, 6, 5, 4, 3]);
}

#[tokio::test]
async fn matches_resolve_uploader_emails_with_isolated_failures() {
    let mut api = MockApi {
        matches: Some(vec![matched("m1", "u1", Some("Gymnasium")), matched("m2", "ghost", None), matched("m3", "u3", None)]),
        ..Default::default()
    };
    api.emails.insert("u1".into(), "one@college.edu".into());
    api.emails.insert("u3".into(), "three@college.edu".into());

    let res = resolve_matches(&api, Some("item-1"), Some("lost")).await.unwrap();
    let MatchResolution::Matches(agg) = res else { panic!("expected matches") };
    let emails: Vec<&str> = agg.entries.iter().map(|m| m.uploader_email.as_str()).collect();
    assert_eq!(emails, vec!["one@college.edu", UNKNOWN_EMAIL, "three@college.edu"]);
    assert_eq!(agg.entries[0].location, "Gymnasium");
    assert_eq!(agg.entries[1].location, DEFAULT_LOCATION);
    assert_eq!(agg.entries[0].created_display, "3/10/2024");
    assert_eq!(agg.diagnostics.len(), 1);
    assert_eq!(api.email_lookups.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn empty_match_list_is_a_terminal_state() {
    let api = MockApi { matches: Some(Vec::new()), ..Default::default() };
    let res = resolve_matches(&api, Some("item-1"), Some("found")).await.unwrap();
    assert_eq!(res, MatchResolution::NoMatches);
}

#[tokio::test]
async fn missing_route_params_issue_no_requests() {
    let api = MockApi { matches: Some(vec![matched("m1", "u1", None)]), ..Default::default() };
    for (id, kind) in [(None, Some("lost")), (Some("item-1"), None), (None, None)] {
        let err = resolve_matches(&api, id, kind).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn matches_failure_aborts() {
    let api = MockApi::default();
    let err = resolve_matches(&api, Some("item-1"), Some("lost")).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}
