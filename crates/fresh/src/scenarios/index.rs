use super::{Scenario, ScenarioCtx, Suite, Tag};
use crate::error::ScenarioResult;
use fresh_engine::pages::IndexPage;
use fresh_engine::protocol::{ElementDescriptor, Viewport};
use futures::future::BoxFuture;
use tracing::info;

const SMOKE: &[Tag] = &[Tag::Smoke];
const NAVIGATION: &[Tag] = &[Tag::Smoke, Tag::Regression];
const RESPONSIVE: &[Tag] = &[Tag::Responsive];

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("AC1: page loads successfully", Suite::Index, SMOKE, page_loads),
        Scenario::new("AC2: page title is set", Suite::Index, SMOKE, page_title),
        Scenario::new("AC3: main content is visible", Suite::Index, SMOKE, main_content),
        Scenario::new("AC4: navigation elements are present", Suite::Index, SMOKE, navigation_bar),
        Scenario::new("AC6: login link navigates to login page", Suite::Index, NAVIGATION, login_link),
        Scenario::new("AC7: signup link navigates to signup page", Suite::Index, NAVIGATION, signup_link),
        Scenario::new("AC8: navigation links carry an href", Suite::Index, NAVIGATION, links_have_href),
        Scenario::new("AC9: renders on mobile (375px)", Suite::Index, RESPONSIVE, mobile),
        Scenario::new("AC10: renders on tablet (768px)", Suite::Index, RESPONSIVE, tablet),
        Scenario::new("AC11: renders on desktop (1920px)", Suite::Index, RESPONSIVE, desktop),
    ]
}

fn page_loads(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let mut index = IndexPage::new(&mut ctx.session);
        index.navigate().await?;
        ensure!(index.is_on_index_page().await, "on index page");
        Ok(())
    })
}

fn page_title(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        IndexPage::new(&mut ctx.session).navigate().await?;
        let title = ctx.session.title().await;
        ensure!(!title.is_empty(), "document title");
        Ok(())
    })
}

fn main_content(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let mut index = IndexPage::new(&mut ctx.session);
        index.navigate().await?;
        ensure!(index.is_main_content_visible().await, "main content visible");
        Ok(())
    })
}

fn navigation_bar(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let mut index = IndexPage::new(&mut ctx.session);
        index.navigate().await?;
        ensure!(index.is_navigation_bar_visible().await, "navigation bar visible");
        Ok(())
    })
}

fn login_link(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let mut index = IndexPage::new(&mut ctx.session);
        index.navigate().await?;
        if !index.is_login_link_visible().await {
            info!("no login link on the landing page");
            return Ok(());
        }
        index.click_login().await?;
        let url = index.session().current_url().await;
        ensure!(url.contains("index.html"), "login page url");
        Ok(())
    })
}

fn signup_link(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let mut index = IndexPage::new(&mut ctx.session);
        index.navigate().await?;
        if !index.is_signup_link_visible().await {
            info!("no signup link on the landing page");
            return Ok(());
        }
        index.click_signup().await?;
        index.session().pause(1000).await;
        let url = index.session().current_url().await;
        ensure!(url.contains("signup.html"), "signup page url");
        Ok(())
    })
}

fn links_have_href(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        IndexPage::new(&mut ctx.session).navigate().await?;
        let links = ElementDescriptor::css("link", "a[href]");
        let count = ctx.session.count(&links).await;
        ensure!(count > 0, "at least one link");
        let href = ctx.session.attribute(&links, "href").await.unwrap_or_default();
        ensure!(!href.is_empty(), "first link href");
        Ok(())
    })
}

fn mobile(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(renders_at(ctx, 375, 667, "index-mobile"))
}

fn tablet(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(renders_at(ctx, 768, 1024, "index-tablet"))
}

fn desktop(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(renders_at(ctx, 1920, 1080, "index-desktop"))
}

async fn renders_at(ctx: &mut ScenarioCtx, width: u32, height: u32, shot: &str) -> ScenarioResult {
    ctx.session.set_viewport(Viewport { width, height }).await?;
    let mut index = IndexPage::new(&mut ctx.session);
    index.navigate().await?;
    ensure!(index.is_main_content_visible().await, "main content visible");
    let path = ctx.session.screenshot(shot).await?;
    info!(path = %path.display(), "captured");
    Ok(())
}
