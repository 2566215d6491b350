mod support;

use fresh_engine::probe::Probe;
use fresh_engine::protocol::ElementDescriptor;
use fresh_engine::resolution::LocatorHandle;
use std::time::Duration;
use support::{FakeBackend, FakeElement};
use tokio::time::Instant;

fn banner() -> ElementDescriptor {
    ElementDescriptor::css("banner", "#banner")
}

#[tokio::test(start_paused = true)]
async fn is_visible_is_false_when_element_never_appears() {
    let mut backend = FakeBackend::with_dom(vec![]);
    let probe = Probe::default();
    let descriptor = banner();

    let start = Instant::now();
    let visible = probe
        .is_visible(&mut backend, LocatorHandle::new(&descriptor), Duration::from_secs(5))
        .await;

    assert!(!visible);
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert!(start.elapsed() < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn is_visible_reports_within_one_poll_interval_of_appearing() {
    let start = Instant::now();
    let appears = start + Duration::from_millis(1250);
    let mut backend = FakeBackend::with_dom(vec![
        FakeElement::new("banner", "div").css("#banner").appears_at(appears),
    ]);
    let probe = Probe::new(Duration::from_secs(5), Duration::from_millis(100));
    let descriptor = banner();

    let visible = probe
        .is_visible(&mut backend, LocatorHandle::new(&descriptor), Duration::from_secs(5))
        .await;

    assert!(visible);
    let seen_after = start.elapsed();
    assert!(seen_after >= Duration::from_millis(1250));
    assert!(seen_after <= Duration::from_millis(1350));
}

#[tokio::test(start_paused = true)]
async fn hidden_element_is_not_visible() {
    let mut backend = FakeBackend::with_dom(vec![
        FakeElement::new("banner", "div").css("#banner").hidden(),
    ]);
    let probe = Probe::default();
    let descriptor = banner();

    assert!(
        !probe
            .is_visible_default(&mut backend, LocatorHandle::new(&descriptor))
            .await
    );
}

#[tokio::test(start_paused = true)]
async fn wait_until_visible_times_out_with_context() {
    let mut backend = FakeBackend::with_dom(vec![]);
    let probe = Probe::default();
    let descriptor = banner();

    let err = probe
        .wait_until_visible(&mut backend, LocatorHandle::new(&descriptor), Duration::from_secs(2))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "timed_out");
    let message = err.to_string();
    assert!(message.contains("banner"), "{}", message);
    assert!(message.contains("visibility"), "{}", message);
}

#[tokio::test(start_paused = true)]
async fn wait_until_attached_accepts_hidden_elements() {
    let mut backend = FakeBackend::with_dom(vec![
        FakeElement::new("radio", "input").css("#star3").hidden(),
    ]);
    let probe = Probe::default();
    let descriptor = ElementDescriptor::css("3 star rating", "#star3");

    let element = probe
        .wait_until_attached(&mut backend, LocatorHandle::new(&descriptor), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(element.index, 0);
}

#[tokio::test(start_paused = true)]
async fn wait_until_hidden_succeeds_for_absent_and_hidden_elements() {
    let probe = Probe::default();
    let descriptor = ElementDescriptor::css("spinner", ".spinner");

    let mut absent = FakeBackend::with_dom(vec![]);
    probe
        .wait_until_hidden(&mut absent, LocatorHandle::new(&descriptor), Duration::from_secs(1))
        .await
        .unwrap();

    let mut shown = FakeBackend::with_dom(vec![FakeElement::new("spin", "div").css(".spinner")]);
    let err = probe
        .wait_until_hidden(&mut shown, LocatorHandle::new(&descriptor), Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "timed_out");
}
