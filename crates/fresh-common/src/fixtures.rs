//! Static test data for the review-site scenarios.
//!
//! Records are plain values; nothing in the engine mutates them. Credentials
//! and zip codes can be overridden from the environment so the same suite can
//! point at a seeded staging instance.

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::protocol::StoredUser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl UserCredentials {
    /// Record the application stores for this user once logged in.
    pub fn stored_user(&self) -> StoredUser {
        StoredUser::new(&self.email, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUsers {
    pub valid: UserCredentials,
    pub second_user: UserCredentials,
    pub invalid: UserCredentials,
}

impl TestUsers {
    pub fn from_env() -> Self {
        Self {
            valid: UserCredentials {
                email: env_or("TEST_USER_EMAIL", "alice@example.com"),
                password: env_or("TEST_USER_PASSWORD", "password123"),
                name: env_or("TEST_USER_NAME", "Alice Johnson"),
            },
            second_user: UserCredentials {
                email: env_or("TEST_USER_2_EMAIL", "bob@example.com"),
                password: env_or("TEST_USER_2_PASSWORD", "password123"),
                name: env_or("TEST_USER_2_NAME", "Bob Smith"),
            },
            invalid: UserCredentials {
                email: "invalid@example.com".into(),
                password: "wrongpassword".into(),
                name: "Invalid User".into(),
            },
        }
    }
}

/// Payload for the review form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub restaurant_name: String,
    pub food_item: String,
    pub rating: f64,
    pub review_text: String,
}

impl ReviewPayload {
    pub fn new(
        restaurant_name: impl Into<String>,
        food_item: impl Into<String>,
        rating: f64,
        review_text: impl Into<String>,
    ) -> Self {
        Self {
            restaurant_name: restaurant_name.into(),
            food_item: food_item.into(),
            rating,
            review_text: review_text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReviews {
    pub valid: ReviewPayload,
    pub short_review: ReviewPayload,
    pub long_review: ReviewPayload,
    pub special_characters: ReviewPayload,
    pub emojis: ReviewPayload,
    pub max_length: ReviewPayload,
}

impl Default for TestReviews {
    fn default() -> Self {
        Self {
            valid: ReviewPayload::new(
                "Test Restaurant",
                "Test Dish",
                5.0,
                "Amazing food! Highly recommended.",
            ),
            short_review: ReviewPayload::new("Cafe", "Coffee", 4.0, "Good."),
            long_review: ReviewPayload::new(
                "Fine Dining Restaurant with Very Long Name",
                "Exquisite Gourmet Dish with Multiple Ingredients",
                5.0,
                "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(20),
            ),
            special_characters: ReviewPayload::new(
                "Joe's Pizza & Pasta <script>alert('test')</script>",
                "Margherita \"Special\" Pizza",
                4.0,
                "Great taste! ⭐️🍕🎉 <img src=x onerror=alert(1)>",
            ),
            emojis: ReviewPayload::new(
                "🍔 Burger Place 🍟",
                "🌮 Taco Supreme 🌶️",
                5.0,
                "Absolutely delicious! 😋🔥💯",
            ),
            max_length: ReviewPayload::new("A".repeat(200), "B".repeat(200), 3.0, "C".repeat(1000)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestZipCodes {
    pub valid: String,
    pub invalid: String,
    pub empty: String,
    pub special_chars: String,
    pub too_short: String,
    pub too_long: String,
    pub letters: String,
}

impl TestZipCodes {
    pub fn from_env() -> Self {
        Self {
            valid: env_or("TEST_ZIP_CODE", "94102"),
            invalid: env_or("INVALID_ZIP_CODE", "99999"),
            empty: String::new(),
            special_chars: "!@#$%".into(),
            too_short: "941".into(),
            too_long: "941024567".into(),
            letters: "ABCDE".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestLocations {
    pub san_francisco: TestLocation,
    pub new_york: TestLocation,
    pub los_angeles: TestLocation,
}

impl Default for TestLocations {
    fn default() -> Self {
        Self {
            san_francisco: TestLocation {
                latitude: 37.7749,
                longitude: -122.4194,
                zip_code: "94102".into(),
            },
            new_york: TestLocation {
                latitude: 40.7128,
                longitude: -74.0060,
                zip_code: "10001".into(),
            },
            los_angeles: TestLocation {
                latitude: 34.0522,
                longitude: -118.2437,
                zip_code: "90001".into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRatings {
    pub valid: Vec<u8>,
    pub invalid: Vec<f64>,
}

impl Default for TestRatings {
    fn default() -> Self {
        Self {
            valid: vec![1, 2, 3, 4, 5],
            invalid: vec![6.0, 0.0, -1.0, 3.5],
        }
    }
}

/// Entry paths of the application under test, relative to the base URL.
pub struct UrlPaths;

impl UrlPaths {
    pub const LOGIN: &'static str = "/index.html";
    pub const SIGNUP: &'static str = "/signup.html";
    pub const REVIEWS: &'static str = "/reviews.html";
    pub const SEARCH: &'static str = "/search.html";
}

/// The full fixture set handed to scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixtures {
    pub users: TestUsers,
    pub reviews: TestReviews,
    pub zip_codes: TestZipCodes,
    pub locations: TestLocations,
    pub ratings: TestRatings,
}

impl Fixtures {
    pub fn from_env() -> Self {
        Self {
            users: TestUsers::from_env(),
            reviews: TestReviews::default(),
            zip_codes: TestZipCodes::from_env(),
            locations: TestLocations::default(),
            ratings: TestRatings::default(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

// ============================================================================
// Generators and validators
// ============================================================================

pub fn generate_restaurant_name() -> String {
    const PREFIXES: &[&str] = &["The", "La", "El", "Le"];
    const TYPES: &[&str] = &["Restaurant", "Cafe", "Bistro", "Kitchen", "Grill", "House"];
    const ADJECTIVES: &[&str] = &["Golden", "Silver", "Royal", "Grand", "Fresh", "Urban"];

    let mut rng = rand::thread_rng();
    format!(
        "{} {} {}",
        PREFIXES.choose(&mut rng).copied().unwrap_or("The"),
        ADJECTIVES.choose(&mut rng).copied().unwrap_or("Fresh"),
        TYPES.choose(&mut rng).copied().unwrap_or("Kitchen"),
    )
}

pub fn generate_food_item() -> String {
    const ITEMS: &[&str] = &[
        "Pizza", "Burger", "Pasta", "Salad", "Steak", "Sushi", "Tacos", "Ramen", "Sandwich",
        "Soup", "Rice Bowl", "Curry",
    ];
    ITEMS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Pizza")
        .to_string()
}

pub fn generate_random_rating() -> u8 {
    rand::thread_rng().gen_range(1..=5)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewLength {
    Short,
    Medium,
    Long,
}

pub fn generate_review_text(length: ReviewLength) -> String {
    let options: &[&str] = match length {
        ReviewLength::Short => &[
            "Great food!",
            "Loved it!",
            "Highly recommended!",
            "Amazing experience!",
            "Will come back!",
        ],
        ReviewLength::Medium => &[
            "The food was absolutely delicious and the service was excellent.",
            "A wonderful dining experience with great atmosphere and friendly staff.",
            "Fresh ingredients and perfectly cooked. Highly recommend this place!",
            "Best meal I've had in a long time. The flavors were amazing.",
        ],
        ReviewLength::Long => &[
            "I had the most incredible dining experience here. The ambiance was perfect, the staff was attentive and knowledgeable, and the food exceeded all expectations. Every dish was crafted with care and the flavors were extraordinary.",
            "This restaurant truly stands out among the rest. From the moment we walked in, we were greeted warmly and seated promptly. The food arrived quickly and was presented beautifully, and we left already planning our next visit.",
        ],
    };
    options
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default()
        .to_string()
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid regex"));
static XSS_RE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<script[^>]*>.*?</script>",
        r"(?is)<iframe[^>]*>.*?</iframe>",
        r"(?i)javascript:",
        r"(?i)onerror=",
        r"(?i)onload=",
        r"(?i)onclick=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_us_zip_code(zip: &str) -> bool {
    ZIP_RE.is_match(zip)
}

pub fn contains_xss_patterns(text: &str) -> bool {
    XSS_RE.iter().any(|re| re.is_match(text))
}

/// Great-circle distance in miles.
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_MILES: f64 = 3959.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_review_matches_literal_payload() {
        let r = TestReviews::default().valid;
        assert_eq!(r.restaurant_name, "Test Restaurant");
        assert_eq!(r.food_item, "Test Dish");
        assert_eq!(r.rating, 5.0);
        assert_eq!(r.review_text, "Amazing food! Highly recommended.");
    }

    #[test]
    fn zip_code_validation() {
        let zips = TestZipCodes::from_env();
        assert!(is_valid_us_zip_code("94102"));
        assert!(is_valid_us_zip_code("94102-1234"));
        assert!(!is_valid_us_zip_code(&zips.too_short));
        assert!(!is_valid_us_zip_code(&zips.too_long));
        assert!(!is_valid_us_zip_code(&zips.letters));
        assert!(!is_valid_us_zip_code(&zips.special_chars));
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice example.com"));
    }

    #[test]
    fn detects_script_injection_in_special_characters_fixture() {
        let r = TestReviews::default();
        assert!(contains_xss_patterns(&r.special_characters.restaurant_name));
        assert!(contains_xss_patterns(&r.special_characters.review_text));
        assert!(!contains_xss_patterns(&r.valid.review_text));
    }

    #[test]
    fn distance_between_sf_and_la() {
        let l = TestLocations::default();
        let miles = calculate_distance(
            l.san_francisco.latitude,
            l.san_francisco.longitude,
            l.los_angeles.latitude,
            l.los_angeles.longitude,
        );
        assert!((340.0..360.0).contains(&miles), "got {}", miles);
    }

    #[test]
    fn generated_rating_in_range() {
        for _ in 0..50 {
            let r = generate_random_rating();
            assert!((1..=5).contains(&r));
        }
    }

    #[test]
    fn generated_names_are_three_words() {
        assert_eq!(generate_restaurant_name().split(' ').count(), 3);
        assert!(!generate_food_item().is_empty());
        assert!(!generate_review_text(ReviewLength::Short).is_empty());
    }
}
