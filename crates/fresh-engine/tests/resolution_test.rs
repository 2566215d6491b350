mod support;

use fresh_engine::protocol::{ElementDescriptor, Strategy};
use fresh_engine::resolution::{LocatorHandle, LocatorResolver};
use support::{FakeBackend, FakeElement};

fn login_button() -> ElementDescriptor {
    ElementDescriptor::css("login button", "#loginBtn")
        .or_attr("type", "submit")
        .or_text("button", "Login")
}

#[tokio::test]
async fn nth_strategy_wins_when_only_it_matches() {
    // Only the attribute strategy (index 1) has a live match.
    let mut backend = FakeBackend::with_dom(vec![
        FakeElement::new("submit", "input").attr("type", "submit"),
    ]);
    let descriptor = login_button();

    let resolved = LocatorResolver::resolve(&descriptor, &mut backend)
        .await
        .expect("attribute strategy should match");

    assert_eq!(resolved.strategy_index, 1);
    assert_eq!(resolved.strategy, Strategy::attr("type", "submit"));
    assert_eq!(resolved.count, 1);

    // Later strategies are never consulted once one matches.
    let queried: Vec<_> = backend
        .calls
        .iter()
        .filter(|c| c.starts_with("count:"))
        .cloned()
        .collect();
    assert_eq!(queried, vec!["count:css=#loginBtn", "count:[type=\"submit\"]"]);
}

#[tokio::test]
async fn earlier_strategy_wins_over_later_matches() {
    let mut backend = FakeBackend::with_dom(vec![
        FakeElement::new("a", "button").css("#loginBtn").text("Login"),
        FakeElement::new("b", "button").attr("type", "submit").text("Login"),
    ]);
    let descriptor = login_button();

    let resolved = LocatorResolver::resolve(&descriptor, &mut backend).await.unwrap();
    assert_eq!(resolved.strategy_index, 0);
    assert_eq!(resolved.count, 1);
}

#[tokio::test]
async fn text_strategy_is_case_insensitive_and_first_in_document_order() {
    let mut backend = FakeBackend::with_dom(vec![
        FakeElement::new("first", "a").text("SIGN UP today"),
        FakeElement::new("second", "a").text("sign up"),
    ]);
    let descriptor = ElementDescriptor::css("signup link", "#signup").or_text("a", "Sign up");

    let handle = LocatorHandle::new(&descriptor);
    let resolved = handle.resolve(&mut backend).await.unwrap();
    assert_eq!(resolved.strategy_index, 1);
    assert_eq!(resolved.count, 2);

    let element = handle.element(&mut backend).await.unwrap();
    assert_eq!(element.index, 0);
}

#[tokio::test]
async fn failing_strategy_counts_as_no_match() {
    let mut backend = FakeBackend::with_dom(vec![FakeElement::new("x", "div").css(".ok")]);
    let descriptor = ElementDescriptor::css("thing", "!!broken").or_css(".ok");

    let resolved = LocatorResolver::resolve(&descriptor, &mut backend).await.unwrap();
    assert_eq!(resolved.strategy_index, 1);
}

#[tokio::test]
async fn nothing_matching_resolves_to_none() {
    let mut backend = FakeBackend::with_dom(vec![]);
    let descriptor = login_button();
    let handle = LocatorHandle::new(&descriptor);

    assert!(handle.resolve(&mut backend).await.is_none());
    assert!(handle.element(&mut backend).await.is_none());
    assert_eq!(handle.count(&mut backend).await, 0);
    assert_eq!(
        handle.attempted(),
        vec!["css=#loginBtn", "[type=\"submit\"]", "button:has-text(\"Login\")"]
    );
}

#[tokio::test]
async fn handle_is_reevaluated_on_every_use() {
    let mut backend = FakeBackend::with_dom(vec![]);
    let descriptor = ElementDescriptor::css("late element", "#late");
    let handle = LocatorHandle::new(&descriptor);

    assert!(handle.element(&mut backend).await.is_none());

    backend.dom.push(FakeElement::new("late", "div").css("#late"));
    assert!(handle.element(&mut backend).await.is_some());
}

#[tokio::test]
async fn nth_handle_beyond_count_has_no_element() {
    let mut backend = FakeBackend::with_dom(vec![
        FakeElement::new("c0", "div").css(".card"),
        FakeElement::new("c1", "div").css(".card"),
    ]);
    let descriptor = ElementDescriptor::css("card", ".card");
    let handle = LocatorHandle::new(&descriptor);

    assert_eq!(handle.nth(1).element(&mut backend).await.unwrap().index, 1);
    assert!(handle.nth(2).element(&mut backend).await.is_none());
    assert_eq!(handle.nth(1).name(), "card #1");
}
