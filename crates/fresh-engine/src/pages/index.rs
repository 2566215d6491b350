use super::{heading, main_content, navigation_bar, signup_link};
use crate::backend::Backend;
use crate::outcome::ActionError;
use crate::session::PageSession;
use fresh_common::fixtures::UrlPaths;
use fresh_common::protocol::ElementDescriptor;
use tracing::info;

/// Landing page, which doubles as the login screen.
pub struct IndexPage<'s, B: Backend> {
    session: &'s mut PageSession<B>,
    page_title: ElementDescriptor,
    main_content: ElementDescriptor,
    login_link: ElementDescriptor,
    signup_link: ElementDescriptor,
    navigation_bar: ElementDescriptor,
}

impl<'s, B: Backend> IndexPage<'s, B> {
    pub fn new(session: &'s mut PageSession<B>) -> Self {
        Self {
            session,
            page_title: heading(),
            main_content: main_content(),
            login_link: ElementDescriptor::css("login link", "a[href*=\"index.html\"]")
                .or_text("a", "Login")
                .or_text("a", "Sign In"),
            signup_link: signup_link(),
            navigation_bar: navigation_bar(),
        }
    }

    pub fn session(&mut self) -> &mut PageSession<B> {
        self.session
    }

    pub async fn navigate(&mut self) -> Result<(), ActionError> {
        self.session.goto(UrlPaths::LOGIN).await?;
        self.session.settle().await
    }

    pub async fn is_on_index_page(&mut self) -> bool {
        let url = self.session.current_url().await;
        url.contains("index.html") || url.ends_with('/')
    }

    pub async fn click_login(&mut self) -> Result<(), ActionError> {
        info!("following login link");
        self.session.click(&self.login_link).await?;
        self.session.settle().await
    }

    pub async fn click_signup(&mut self) -> Result<(), ActionError> {
        info!("following signup link");
        self.session.click(&self.signup_link).await?;
        self.session.settle().await
    }

    /// Heading text, empty when the page has no heading.
    pub async fn page_title_text(&mut self) -> String {
        if self.session.is_visible(&self.page_title).await {
            self.session.text(&self.page_title).await
        } else {
            String::new()
        }
    }

    pub async fn is_navigation_bar_visible(&mut self) -> bool {
        self.session.is_visible(&self.navigation_bar).await
    }

    pub async fn is_main_content_visible(&mut self) -> bool {
        self.session.is_visible(&self.main_content).await
    }

    pub async fn is_login_link_visible(&mut self) -> bool {
        self.session.is_visible(&self.login_link).await
    }

    pub async fn is_signup_link_visible(&mut self) -> bool {
        self.session.is_visible(&self.signup_link).await
    }
}
