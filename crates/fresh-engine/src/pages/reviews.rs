use crate::backend::Backend;
use crate::executor::ChoiceGroup;
use crate::outcome::ActionError;
use crate::resolution::LocatorHandle;
use crate::session::PageSession;
use fresh_common::fixtures::{ReviewPayload, UrlPaths};
use fresh_common::protocol::{ElementDescriptor, Geolocation};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

const UNCHECK_RATINGS: &str = "document.querySelectorAll('input[name=\"rating\"]').forEach(r => { r.checked = false; })";

/// Fields read off one rendered review card. Missing parts read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewCard {
    pub restaurant: String,
    pub food_item: String,
    pub rating: String,
    pub review_text: String,
}

/// Authenticated review listing and submission screen.
pub struct ReviewsPage<'s, B: Backend> {
    session: &'s mut PageSession<B>,

    navbar: ElementDescriptor,
    user_name_display: ElementDescriptor,
    logout_button: ElementDescriptor,

    review_form: ElementDescriptor,
    restaurant_name_input: ElementDescriptor,
    food_item_input: ElementDescriptor,
    rating: ChoiceGroup,
    review_textarea: ElementDescriptor,
    submit_button: ElementDescriptor,
    review_error: ElementDescriptor,
    review_success: ElementDescriptor,

    location_toggle: ElementDescriptor,
    toggle_status_text: ElementDescriptor,
    zip_code_input: ElementDescriptor,
    search_zip_button: ElementDescriptor,
    location_status: ElementDescriptor,

    reviews_list: ElementDescriptor,
    review_cards: ElementDescriptor,
    card_restaurant: ElementDescriptor,
    card_food_item: ElementDescriptor,
    card_rating: ElementDescriptor,
    card_text: ElementDescriptor,
    nearby_header: ElementDescriptor,
}

impl<'s, B: Backend> ReviewsPage<'s, B> {
    pub fn new(session: &'s mut PageSession<B>) -> Self {
        let rating = (1..=5).fold(ChoiceGroup::new("rating"), |group, n| {
            group.option(
                n.to_string(),
                ElementDescriptor::css(format!("{} star rating", n), format!("#star{}", n))
                    .or_css(format!("input[name=\"rating\"][value=\"{}\"]", n)),
            )
        });

        Self {
            session,
            navbar: ElementDescriptor::css("navbar", ".navbar"),
            user_name_display: ElementDescriptor::css("user name display", "#userNameDisplay"),
            logout_button: ElementDescriptor::css("logout button", "#logoutBtn")
                .or_text("button", "Logout"),

            review_form: ElementDescriptor::css("review form", "#reviewForm"),
            restaurant_name_input: ElementDescriptor::css("restaurant name input", "#restaurantName")
                .or_css("input[name=\"restaurantName\"]"),
            food_item_input: ElementDescriptor::css("food item input", "#foodItem")
                .or_css("input[name=\"foodItem\"]"),
            rating,
            review_textarea: ElementDescriptor::css("review text", "#review")
                .or_css("textarea[name=\"review\"]"),
            submit_button: ElementDescriptor::css("submit review button", "#reviewForm button[type=\"submit\"]")
                .or_css("button[type=\"submit\"]"),
            review_error: ElementDescriptor::css("review error", "#reviewError"),
            review_success: ElementDescriptor::css("review success", "#reviewSuccess"),

            location_toggle: ElementDescriptor::css("location toggle", "#locationToggle"),
            toggle_status_text: ElementDescriptor::css("location toggle status", "#toggleStatusText"),
            zip_code_input: ElementDescriptor::css("zip code input", "#zipCodeInput"),
            search_zip_button: ElementDescriptor::css("zip search button", "#searchZipBtn"),
            location_status: ElementDescriptor::css("location status", "#locationStatus"),

            reviews_list: ElementDescriptor::css("reviews list", "#reviewsList"),
            review_cards: ElementDescriptor::css("review card", ".review-card")
                .or_attr("data-testid", "review-card"),
            card_restaurant: ElementDescriptor::css("card restaurant", ".restaurant-name")
                .or_css("h3"),
            card_food_item: ElementDescriptor::css("card food item", ".food-item"),
            card_rating: ElementDescriptor::css("card rating", ".rating").or_css(".stars"),
            card_text: ElementDescriptor::css("card text", ".review-text").or_css("p"),
            nearby_header: ElementDescriptor::css("nearby restaurants header", ".location-header h2"),
        }
    }

    pub fn session(&mut self) -> &mut PageSession<B> {
        self.session
    }

    pub fn rating_group(&self) -> &ChoiceGroup {
        &self.rating
    }

    pub async fn navigate(&mut self) -> Result<(), ActionError> {
        self.session.goto(UrlPaths::REVIEWS).await?;
        self.session.settle().await
    }

    // ============================================================
    // Authentication
    // ============================================================

    /// Authenticated when the logout affordance is on screen.
    pub async fn is_authenticated(&mut self) -> bool {
        self.session.is_visible(&self.logout_button).await
    }

    pub async fn user_name(&mut self) -> String {
        self.session.text(&self.user_name_display).await
    }

    pub async fn is_navbar_visible(&mut self) -> bool {
        self.session.is_visible(&self.navbar).await
    }

    pub async fn logout(&mut self) -> Result<(), ActionError> {
        info!("logging out");
        self.session.click(&self.logout_button).await?;
        self.session.settle().await?;
        self.session.mark_logged_out();
        Ok(())
    }

    // ============================================================
    // Review form
    // ============================================================

    pub async fn is_review_form_visible(&mut self) -> bool {
        self.session.is_visible(&self.review_form).await
    }

    /// Fill every field. The rating is validated before any field is touched.
    pub async fn fill_review_form(&mut self, data: &ReviewPayload) -> Result<(), ActionError> {
        let rating = rating_value(data.rating);
        self.rating.validate(&rating)?;

        self.session
            .fill(&self.restaurant_name_input, &data.restaurant_name)
            .await?;
        self.session.fill(&self.food_item_input, &data.food_item).await?;
        self.session.select_single(&self.rating, &rating).await?;
        self.session.fill(&self.review_textarea, &data.review_text).await
    }

    /// Fill the text fields only, leaving the rating as it is.
    pub async fn fill_text_fields(
        &mut self,
        restaurant_name: &str,
        food_item: &str,
        review_text: &str,
    ) -> Result<(), ActionError> {
        self.session
            .fill(&self.restaurant_name_input, restaurant_name)
            .await?;
        self.session.fill(&self.food_item_input, food_item).await?;
        self.session.fill(&self.review_textarea, review_text).await
    }

    /// Select one star rating. Anything but 1, 2, 3, 4 or 5 is rejected
    /// without touching the page.
    pub async fn select_rating(&mut self, rating: f64) -> Result<(), ActionError> {
        self.session
            .select_single(&self.rating, &rating_value(rating))
            .await
    }

    pub async fn selected_rating(&mut self) -> Option<u8> {
        self.session
            .checked_value(&self.rating)
            .await
            .and_then(|v| v.parse().ok())
    }

    pub async fn submit_review(&mut self) -> Result<(), ActionError> {
        self.session.click(&self.submit_button).await?;
        self.session.pause(1000).await;
        Ok(())
    }

    pub async fn submit_complete_review(&mut self, data: &ReviewPayload) -> Result<(), ActionError> {
        info!(restaurant = %data.restaurant_name, rating = data.rating, "submitting review");
        self.fill_review_form(data).await?;
        self.submit_review().await
    }

    pub async fn is_success_message_visible(&mut self) -> bool {
        self.session.is_visible(&self.review_success).await
    }

    pub async fn success_message(&mut self) -> String {
        self.session.text(&self.review_success).await
    }

    pub async fn is_error_message_visible(&mut self) -> bool {
        self.session.is_visible(&self.review_error).await
    }

    pub async fn error_message(&mut self) -> String {
        self.session.text(&self.review_error).await
    }

    pub async fn is_form_empty(&mut self) -> bool {
        self.session.input_value(&self.restaurant_name_input).await.is_empty()
            && self.session.input_value(&self.food_item_input).await.is_empty()
            && self.session.input_value(&self.review_textarea).await.is_empty()
            && self.selected_rating().await.is_none()
    }

    pub async fn clear_form(&mut self) -> Result<(), ActionError> {
        self.session.fill(&self.restaurant_name_input, "").await?;
        self.session.fill(&self.food_item_input, "").await?;
        self.session.fill(&self.review_textarea, "").await?;
        if self.selected_rating().await.is_some() {
            self.session.execute_script(UNCHECK_RATINGS).await?;
        }
        Ok(())
    }

    /// Native constraint-validation messages of the invalid text fields.
    pub async fn form_validation_errors(&mut self) -> Vec<String> {
        let mut errors = Vec::new();
        for field in [
            &self.restaurant_name_input,
            &self.food_item_input,
            &self.review_textarea,
        ] {
            if let Some(message) = self.session.validation_message(field).await {
                errors.push(message);
            }
        }
        errors
    }

    // ============================================================
    // Location
    // ============================================================

    pub async fn toggle_location(&mut self) -> Result<(), ActionError> {
        self.session.click(&self.location_toggle).await?;
        self.session.pause(500).await;
        Ok(())
    }

    pub async fn location_toggle_status(&mut self) -> String {
        self.session.text(&self.toggle_status_text).await
    }

    pub async fn is_location_enabled(&mut self) -> bool {
        self.session.is_checked(&self.location_toggle).await
    }

    pub async fn search_by_zip_code(&mut self, zip_code: &str) -> Result<(), ActionError> {
        self.session.fill(&self.zip_code_input, zip_code).await?;
        self.session.click(&self.search_zip_button).await?;
        self.session.pause(1000).await;
        Ok(())
    }

    pub async fn location_status_message(&mut self) -> String {
        self.session.text(&self.location_status).await
    }

    pub async fn nearby_restaurants_header(&mut self) -> String {
        self.session.text(&self.nearby_header).await
    }

    pub async fn grant_geolocation_permission(&mut self) -> Result<(), ActionError> {
        self.session.grant_permission("geolocation").await
    }

    pub async fn set_geolocation(&mut self, latitude: f64, longitude: f64) -> Result<(), ActionError> {
        self.session
            .set_geolocation(Geolocation {
                latitude,
                longitude,
            })
            .await
    }

    // ============================================================
    // Reviews display
    // ============================================================

    pub async fn is_reviews_list_visible(&mut self) -> bool {
        self.session.is_visible(&self.reviews_list).await
    }

    pub async fn reviews_count(&mut self) -> usize {
        self.session.count(&self.review_cards).await
    }

    pub async fn is_reviews_list_empty(&mut self) -> bool {
        self.reviews_count().await == 0
    }

    /// Read every rendered card. Each part is looked up inside its own card,
    /// so a card missing a part reads it as empty.
    pub async fn all_reviews(&mut self) -> Vec<ReviewCard> {
        let count = self.reviews_count().await;
        let mut cards = Vec::with_capacity(count);
        for i in 0..count {
            let card = LocatorHandle::new(&self.review_cards).nth(i);
            cards.push(ReviewCard {
                restaurant: self.session.text_within(card, &self.card_restaurant).await,
                food_item: self.session.text_within(card, &self.card_food_item).await,
                rating: self.session.text_within(card, &self.card_rating).await,
                review_text: self.session.text_within(card, &self.card_text).await,
            });
        }
        debug!(count, "read review cards");
        cards
    }

    /// Wait for the first card to show. An empty list is not an error.
    pub async fn wait_for_reviews_to_load(&mut self, budget: Duration) {
        if let Err(e) = self
            .session
            .wait_until_visible(&self.review_cards, budget)
            .await
        {
            debug!(error = %e, "no review cards appeared");
        }
    }

    pub async fn review_exists(&mut self, restaurant_name: &str, food_item: &str) -> bool {
        self.all_reviews().await.iter().any(|card| {
            card.restaurant.contains(restaurant_name) && card.food_item.contains(food_item)
        })
    }
}

/// Option value for a numeric rating: integral ratings drop the fraction.
fn rating_value(rating: f64) -> String {
    if rating.is_finite() && rating.fract() == 0.0 {
        format!("{}", rating as i64)
    } else {
        rating.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::rating_value;

    #[test]
    fn rating_values_match_option_keys() {
        assert_eq!(rating_value(5.0), "5");
        assert_eq!(rating_value(-1.0), "-1");
        assert_eq!(rating_value(0.0), "0");
        assert_eq!(rating_value(3.5), "3.5");
    }
}
