use super::{Scenario, ScenarioCtx, Suite, Tag};
use crate::error::ScenarioResult;
use fresh_engine::pages::{LoginPage, ReviewsPage};
use fresh_engine::session::AuthState;
use futures::future::BoxFuture;

const SMOKE: &[Tag] = &[Tag::Smoke];
const REGRESSION: &[Tag] = &[Tag::Regression];

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("login page loads", Suite::Login, SMOKE, login_page_loads),
        Scenario::new("backdoor session reaches reviews", Suite::Login, SMOKE, backdoor_session),
        Scenario::new("form login with valid user", Suite::Login, SMOKE, form_login),
        Scenario::new("form login with invalid user is rejected", Suite::Login, REGRESSION, invalid_login),
        Scenario::new("cleared session loses access", Suite::Login, REGRESSION, cleared_session),
    ]
}

fn login_page_loads(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let mut login = LoginPage::new(&mut ctx.session);
        login.navigate().await?;
        ensure!(login.is_on_login_page().await, "on login page");
        Ok(())
    })
}

fn backdoor_session(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let user = ctx.fixtures.users.valid.clone();
        let mut login = LoginPage::new(&mut ctx.session);
        login.navigate().await?;
        login.setup_auth_session(None, &user).await?;
        ensure_eq!(ctx.session.auth_state(), AuthState::Authenticated, "auth state");

        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.navigate().await?;
        ensure!(reviews.is_authenticated().await, "logout button visible");
        Ok(())
    })
}

fn form_login(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let user = ctx.fixtures.users.valid.clone();
        let mut login = LoginPage::new(&mut ctx.session);
        login.navigate().await?;
        login.login_with_test_user(&user).await?;
        ensure!(login.is_login_successful().await, "landed on an authenticated page");
        ensure_eq!(ctx.session.auth_state(), AuthState::Authenticated, "auth state");
        Ok(())
    })
}

fn invalid_login(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let user = ctx.fixtures.users.invalid.clone();
        let mut login = LoginPage::new(&mut ctx.session);
        login.navigate().await?;
        login.login_with_test_user(&user).await?;
        ensure!(!login.is_login_successful().await, "stayed on login page");
        ensure!(!login.error_message().await.is_empty(), "login error shown");
        ensure_eq!(ctx.session.auth_state(), AuthState::Unauthenticated, "auth state");
        Ok(())
    })
}

fn cleared_session(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let user = ctx.fixtures.users.valid.clone();
        let mut login = LoginPage::new(&mut ctx.session);
        login.navigate().await?;
        login.setup_auth_session(None, &user).await?;
        login.clear_auth_session().await?;
        ensure!(!ctx.session.has_auth_marker().await, "auth marker removed");

        ReviewsPage::new(&mut ctx.session).navigate().await?;
        ensure!(
            LoginPage::new(&mut ctx.session).is_on_login_page().await,
            "redirected to login"
        );
        Ok(())
    })
}
