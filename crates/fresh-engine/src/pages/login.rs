use super::{heading, signup_link};
use crate::backend::Backend;
use crate::outcome::ActionError;
use crate::session::PageSession;
use fresh_common::fixtures::{UrlPaths, UserCredentials};
use fresh_common::protocol::{ElementDescriptor, StoredUser};
use tracing::info;

pub struct LoginPage<'s, B: Backend> {
    session: &'s mut PageSession<B>,
    email_input: ElementDescriptor,
    password_input: ElementDescriptor,
    login_button: ElementDescriptor,
    signup_link: ElementDescriptor,
    error_message: ElementDescriptor,
    page_title: ElementDescriptor,
}

impl<'s, B: Backend> LoginPage<'s, B> {
    pub fn new(session: &'s mut PageSession<B>) -> Self {
        Self {
            session,
            email_input: ElementDescriptor::css("email input", "#email")
                .or_css("input[name=\"email\"]")
                .or_attr("type", "email"),
            password_input: ElementDescriptor::css("password input", "#password")
                .or_css("input[name=\"password\"]")
                .or_attr("type", "password"),
            login_button: ElementDescriptor::css("login button", "button[type=\"submit\"]")
                .or_text("button", "Login")
                .or_text("button", "Sign In"),
            signup_link: signup_link(),
            error_message: ElementDescriptor::css("login error", ".error-message")
                .or_css(".alert-error")
                .or_css("#error")
                .or_attr("role", "alert"),
            page_title: heading(),
        }
    }

    pub fn session(&mut self) -> &mut PageSession<B> {
        self.session
    }

    pub async fn navigate(&mut self) -> Result<(), ActionError> {
        self.session.goto(UrlPaths::LOGIN).await?;
        self.session.settle().await
    }

    /// Submit the login form and wait for the resulting navigation.
    ///
    /// The session is marked authenticated only when the browser lands on an
    /// authenticated screen; a rejected login leaves it unauthenticated.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ActionError> {
        info!(%email, "logging in through the form");
        self.session.fill(&self.email_input, email).await?;
        self.session.fill(&self.password_input, password).await?;
        self.session.click(&self.login_button).await?;
        self.session.settle().await?;
        if self.is_login_successful().await {
            self.session.mark_authenticated();
        }
        Ok(())
    }

    pub async fn login_with_test_user(&mut self, user: &UserCredentials) -> Result<(), ActionError> {
        self.login(&user.email, &user.password).await
    }

    pub async fn is_login_successful(&mut self) -> bool {
        let url = self.session.current_url().await;
        url.contains("reviews.html") || url.contains("search.html")
    }

    pub async fn error_message(&mut self) -> String {
        if self.session.is_visible(&self.error_message).await {
            self.session.text(&self.error_message).await
        } else {
            String::new()
        }
    }

    pub async fn is_on_login_page(&mut self) -> bool {
        let url = self.session.current_url().await;
        url.contains("index.html") || url.ends_with('/')
    }

    pub async fn page_title_text(&mut self) -> String {
        self.session.text(&self.page_title).await
    }

    pub async fn click_signup(&mut self) -> Result<(), ActionError> {
        self.session.click(&self.signup_link).await?;
        self.session.settle().await
    }

    /// Authenticate through the storage backdoor instead of the form.
    /// Falls back to `default_user` when no user is given.
    pub async fn setup_auth_session(
        &mut self,
        user: Option<&StoredUser>,
        default_user: &UserCredentials,
    ) -> Result<(), ActionError> {
        let fallback;
        let user = match user {
            Some(user) => user,
            None => {
                fallback = default_user.stored_user();
                &fallback
            }
        };
        self.session.bootstrap_auth_backdoor(user).await
    }

    pub async fn clear_auth_session(&mut self) -> Result<(), ActionError> {
        self.session.clear_storage().await
    }
}
