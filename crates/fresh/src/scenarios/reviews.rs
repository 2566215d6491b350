use super::{Scenario, ScenarioCtx, Suite, Tag};
use crate::error::ScenarioResult;
use fresh_engine::fixtures::{
    ReviewLength, ReviewPayload, contains_xss_patterns, generate_food_item, generate_random_rating,
    generate_restaurant_name, generate_review_text,
};
use fresh_engine::pages::{LoginPage, ReviewsPage};
use futures::future::BoxFuture;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SMOKE: &[Tag] = &[Tag::Smoke];
const FORM: &[Tag] = &[Tag::Smoke, Tag::Regression];
const REGRESSION: &[Tag] = &[Tag::Regression];

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        // Authentication & navigation
        Scenario::new("AC1: login required for reviews page", Suite::Reviews, SMOKE, login_required),
        Scenario::new("AC2: user name shown in navigation", Suite::Reviews, SMOKE, user_name_shown),
        Scenario::new("AC3: logout redirects to login page", Suite::Reviews, SMOKE, logout_redirects),
        Scenario::new("AC4: unauthorized access redirects to login page", Suite::Reviews, SMOKE, unauthorized_redirect),
        // Review form submission
        Scenario::new("AC5: required fields are validated", Suite::Reviews, FORM, required_fields),
        Scenario::new("AC6: successful submission shows success message", Suite::Reviews, FORM, submission_success),
        Scenario::new("AC7: submitted review appears in list", Suite::Reviews, FORM, review_listed),
        Scenario::new("AC8: form resets after submission", Suite::Reviews, FORM, form_resets),
        Scenario::new("AC9: missing data shows an error", Suite::Reviews, FORM, missing_data_error),
        // Rating system
        Scenario::new("AC10: every star rating is selectable", Suite::Reviews, REGRESSION, ratings_selectable),
        Scenario::new("AC11: rating is required before submission", Suite::Reviews, REGRESSION, rating_required),
        Scenario::new("AC12: selected rating is checked", Suite::Reviews, REGRESSION, rating_checked),
        Scenario::new("AC13: only one rating selected at a time", Suite::Reviews, REGRESSION, single_rating),
        // Location features
        Scenario::new("AC14: location toggle switches state", Suite::Reviews, REGRESSION, toggle_switches),
        Scenario::new("AC15: location toggle status text updates", Suite::Reviews, REGRESSION, toggle_status_text),
        Scenario::new("AC16: geolocation status after toggling on", Suite::Reviews, REGRESSION, geolocation_status),
        Scenario::new("AC18: ZIP code search responds", Suite::Reviews, REGRESSION, zip_search),
        Scenario::new("AC19: invalid ZIP code shows an error", Suite::Reviews, REGRESSION, invalid_zip),
        // Reviews display
        Scenario::new("AC21: review cards carry all fields", Suite::Reviews, SMOKE, cards_complete),
        Scenario::new("AC25: list updates after submission", Suite::Reviews, SMOKE, list_updates),
        // Edge cases
        Scenario::new("AC26: script tags are not rendered", Suite::Reviews, REGRESSION, xss_sanitized),
        Scenario::new("AC27: SQL-like input leaves the app working", Suite::Reviews, REGRESSION, sql_injection),
        Scenario::new("AC28: very long input is handled", Suite::Reviews, REGRESSION, long_input),
        Scenario::new("AC29: special characters in names", Suite::Reviews, REGRESSION, special_characters),
        Scenario::new("AC31: back navigation is handled", Suite::Reviews, REGRESSION, back_navigation),
        Scenario::new("AC32: reload preserves the session", Suite::Reviews, REGRESSION, reload_keeps_session),
        Scenario::new("AC33: several reviews in sequence", Suite::Reviews, REGRESSION, sequential_reviews),
        Scenario::new("AC34: emoji in reviews", Suite::Reviews, REGRESSION, emoji_review),
    ]
}

/// Backdoor login, then open the reviews page.
async fn open_authenticated(ctx: &mut ScenarioCtx) -> ScenarioResult {
    let mut login = LoginPage::new(&mut ctx.session);
    login.navigate().await?;
    login.setup_auth_session(None, &ctx.fixtures.users.valid).await?;
    ReviewsPage::new(&mut ctx.session).navigate().await?;
    Ok(())
}

fn stamp() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

// ============================================================
// Authentication & navigation
// ============================================================

fn login_required(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        ReviewsPage::new(&mut ctx.session).navigate().await?;
        ensure!(
            LoginPage::new(&mut ctx.session).is_on_login_page().await,
            "redirected to login"
        );
        Ok(())
    })
}

fn user_name_shown(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let expected = ctx.fixtures.users.valid.name.clone();
        let name = ReviewsPage::new(&mut ctx.session).user_name().await;
        ensure!(name.contains(&expected), "user name in navigation");
        Ok(())
    })
}

fn logout_redirects(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        ReviewsPage::new(&mut ctx.session).logout().await?;
        ctx.session.pause(1000).await;
        ensure!(
            LoginPage::new(&mut ctx.session).is_on_login_page().await,
            "redirected to login"
        );
        Ok(())
    })
}

fn unauthorized_redirect(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let mut login = LoginPage::new(&mut ctx.session);
        login.navigate().await?;
        login.clear_auth_session().await?;

        ReviewsPage::new(&mut ctx.session).navigate().await?;
        ctx.session.pause(1000).await;
        let url = ctx.session.current_url().await;
        ensure!(url.contains("index.html"), "login page url");
        Ok(())
    })
}

// ============================================================
// Review form submission
// ============================================================

fn required_fields(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.submit_review().await?;
        let errors = reviews.form_validation_errors().await;
        ensure!(!errors.is_empty(), "validation errors reported");
        Ok(())
    })
}

fn submission_success(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let review = ReviewPayload {
            restaurant_name: generate_restaurant_name(),
            food_item: generate_food_item(),
            ..ctx.fixtures.reviews.valid.clone()
        };
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.submit_complete_review(&review).await?;
        reviews.session().pause(1500).await;
        ensure!(reviews.is_success_message_visible().await, "success message visible");
        Ok(())
    })
}

fn review_listed(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let stamp = stamp();
        let review = ReviewPayload::new(
            format!("Test Restaurant {}", stamp),
            format!("Test Dish {}", stamp),
            5.0,
            "This is a test review",
        );
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.submit_complete_review(&review).await?;
        reviews.session().pause(2000).await;
        reviews.wait_for_reviews_to_load(Duration::from_secs(5)).await;
        ensure!(
            reviews
                .review_exists(&review.restaurant_name, &review.food_item)
                .await,
            "review listed"
        );
        Ok(())
    })
}

fn form_resets(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let review = ctx.fixtures.reviews.valid.clone();
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.submit_complete_review(&review).await?;
        reviews.session().pause(2000).await;
        ensure!(reviews.is_form_empty().await, "form emptied");
        Ok(())
    })
}

fn missing_data_error(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.fill_text_fields("Test", "Test", "Test").await?;
        reviews.submit_review().await?;
        reviews.session().pause(1000).await;
        let has_error = reviews.is_error_message_visible().await;
        let errors = reviews.form_validation_errors().await;
        ensure!(has_error || !errors.is_empty(), "error or validation message");
        Ok(())
    })
}

// ============================================================
// Rating system
// ============================================================

fn ratings_selectable(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        for rating in ctx.fixtures.ratings.valid.clone() {
            reviews.select_rating(f64::from(rating)).await?;
            ensure_eq!(reviews.selected_rating().await, Some(rating), "selected rating");
        }
        Ok(())
    })
}

fn rating_required(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.fill_text_fields("Test", "Test", "Test review").await?;
        reviews.submit_review().await?;
        reviews.session().pause(500).await;
        ensure!(!reviews.is_success_message_visible().await, "submission refused");
        let has_error = reviews.is_error_message_visible().await;
        let errors = reviews.form_validation_errors().await;
        ensure!(has_error || !errors.is_empty(), "missing rating reported");
        Ok(())
    })
}

fn rating_checked(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.select_rating(5.0).await?;
        let five = reviews.rating_group().get("5").cloned();
        let checked = match five {
            Some(star) => reviews.session().is_checked(&star).await,
            None => false,
        };
        ensure!(checked, "five star option checked");
        Ok(())
    })
}

fn single_rating(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.select_rating(5.0).await?;
        ensure_eq!(reviews.selected_rating().await, Some(5), "first selection");
        reviews.select_rating(3.0).await?;
        ensure_eq!(reviews.selected_rating().await, Some(3), "second selection");

        let group = reviews.rating_group().clone();
        let mut checked = 0;
        for value in group.allowed() {
            if let Some(option) = group.get(&value)
                && reviews.session().is_checked(option).await
            {
                checked += 1;
            }
        }
        ensure_eq!(checked, 1, "checked rating options");
        Ok(())
    })
}

// ============================================================
// Location features
// ============================================================

fn toggle_switches(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        let before = reviews.is_location_enabled().await;
        reviews.toggle_location().await?;
        ensure_eq!(reviews.is_location_enabled().await, !before, "location enabled");
        Ok(())
    })
}

fn toggle_status_text(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        let before = reviews.location_toggle_status().await;
        reviews.toggle_location().await?;
        let after = reviews.location_toggle_status().await;
        ensure!(after != before, "status text changed");
        let lower = after.to_lowercase();
        ensure!(lower.contains("on") || lower.contains("off"), "status mentions on/off");
        Ok(())
    })
}

fn geolocation_status(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let sf = ctx.fixtures.locations.san_francisco.clone();
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.grant_geolocation_permission().await?;
        reviews.set_geolocation(sf.latitude, sf.longitude).await?;
        reviews.toggle_location().await?;
        reviews.session().pause(1000).await;
        ensure!(
            !reviews.location_status_message().await.is_empty(),
            "location status shown"
        );
        Ok(())
    })
}

fn zip_search(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let zip = ctx.fixtures.zip_codes.valid.clone();
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.search_by_zip_code(&zip).await?;
        ensure!(
            !reviews.location_status_message().await.is_empty(),
            "location status shown"
        );
        Ok(())
    })
}

fn invalid_zip(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let zip = ctx.fixtures.zip_codes.invalid.clone();
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.search_by_zip_code(&zip).await?;
        let status = reviews.location_status_message().await.to_lowercase();
        ensure!(
            ["invalid", "error", "not found"]
                .iter()
                .any(|word| status.contains(word)),
            "invalid zip reported"
        );
        Ok(())
    })
}

// ============================================================
// Reviews display
// ============================================================

fn cards_complete(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.wait_for_reviews_to_load(Duration::from_secs(10)).await;
        if let Some(first) = reviews.all_reviews().await.first() {
            ensure!(!first.restaurant.is_empty(), "card restaurant");
            ensure!(!first.food_item.is_empty(), "card food item");
            ensure!(!first.rating.is_empty(), "card rating");
            ensure!(!first.review_text.is_empty(), "card review text");
        }
        Ok(())
    })
}

fn list_updates(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let stamp = stamp();
        let review = ReviewPayload::new(
            format!("RT {}", stamp),
            format!("FD {}", stamp),
            5.0,
            "Test review",
        );
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        let before = reviews.reviews_count().await;
        reviews.submit_complete_review(&review).await?;
        reviews.session().pause(2000).await;
        let after = reviews.reviews_count().await;
        ensure!(after > before, "review count grew");
        Ok(())
    })
}

// ============================================================
// Edge cases
// ============================================================

fn xss_sanitized(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let review = ctx.fixtures.reviews.special_characters.clone();
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.submit_complete_review(&review).await?;
        reviews.session().pause(2000).await;
        let cards = reviews.all_reviews().await;
        let leaked = cards.iter().any(|card| {
            contains_xss_patterns(&card.restaurant) || contains_xss_patterns(&card.review_text)
        });
        ensure!(!leaked, "no script markup in rendered cards");
        Ok(())
    })
}

fn sql_injection(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let review = ReviewPayload::new(
            "' OR '1'='1",
            "'; DROP TABLE reviews; --",
            5.0,
            "1' AND '1'='1",
        );
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.submit_complete_review(&review).await?;
        reviews.navigate().await?;
        ensure!(reviews.is_authenticated().await, "page still usable");
        Ok(())
    })
}

fn long_input(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let review = ctx.fixtures.reviews.max_length.clone();
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.submit_complete_review(&review).await?;
        let has_error = reviews.is_error_message_visible().await;
        let has_success = reviews.is_success_message_visible().await;
        ensure!(has_error || has_success, "submission acknowledged");
        Ok(())
    })
}

fn special_characters(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let review = ReviewPayload::new(
            "Joe's Café & Bistro (№1) - €£¥",
            "Crème Brûlée™ @2024",
            5.0,
            "Amazing! #1 🎉",
        );
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.submit_complete_review(&review).await?;
        reviews.session().pause(2000).await;
        ensure!(reviews.is_success_message_visible().await, "success message visible");
        Ok(())
    })
}

fn back_navigation(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        LoginPage::new(&mut ctx.session).navigate().await?;
        ReviewsPage::new(&mut ctx.session).navigate().await?;
        ctx.session.go_back().await?;
        ensure!(!ctx.session.current_url().await.is_empty(), "current url");
        Ok(())
    })
}

fn reload_keeps_session(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        let before = reviews.user_name().await;
        reviews.session().reload().await?;
        ensure_eq!(reviews.user_name().await, before, "user name after reload");
        Ok(())
    })
}

fn sequential_reviews(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        for i in 0..3 {
            let review = ReviewPayload::new(
                format!("Restaurant {}", i),
                format!("Dish {}", i),
                f64::from(generate_random_rating()),
                generate_review_text(ReviewLength::Short),
            );
            reviews.submit_complete_review(&review).await?;
            reviews.session().pause(2000).await;
            ensure!(reviews.is_success_message_visible().await, "success message visible");
        }
        Ok(())
    })
}

fn emoji_review(ctx: &mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        open_authenticated(ctx).await?;
        let review = ctx.fixtures.reviews.emojis.clone();
        let mut reviews = ReviewsPage::new(&mut ctx.session);
        reviews.submit_complete_review(&review).await?;
        reviews.session().pause(2000).await;
        ensure!(reviews.is_success_message_visible().await, "success message visible");
        Ok(())
    })
}
