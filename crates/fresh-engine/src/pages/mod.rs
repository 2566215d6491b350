//! Screen-level page objects.
//!
//! Each page is a borrowed view over one test's `PageSession`. It declares its
//! descriptors once in `new` and exposes queries that never fail plus
//! workflows that settle explicitly after acting.

pub mod index;
pub mod login;
pub mod reviews;
pub mod search;

pub use index::IndexPage;
pub use login::LoginPage;
pub use reviews::{ReviewCard, ReviewsPage};
pub use search::SearchPage;

use fresh_common::protocol::ElementDescriptor;

/// `h1, h2`, first in document order.
pub(crate) fn heading() -> ElementDescriptor {
    ElementDescriptor::css("page title", "h1, h2")
}

pub(crate) fn main_content() -> ElementDescriptor {
    ElementDescriptor::css("main content", "main")
        .or_css("#main")
        .or_css(".main-content")
        .or_css("body")
}

pub(crate) fn navigation_bar() -> ElementDescriptor {
    ElementDescriptor::css("navigation bar", "nav")
        .or_css(".navbar")
        .or_css("header")
}

pub(crate) fn signup_link() -> ElementDescriptor {
    ElementDescriptor::css("signup link", "a[href*=\"signup.html\"]")
        .or_text("a", "Sign up")
        .or_text("a", "Register")
}
