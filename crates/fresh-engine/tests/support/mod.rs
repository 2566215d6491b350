//! In-memory stand-in for the review site.
//!
//! `FakeBackend` keeps a flat list of elements for the current page and
//! answers strategy queries against it. CSS strategies match the selector
//! strings an element declares; attribute and text strategies are evaluated
//! for real. Page behaviour (login, redirect, review submission, zip search,
//! search) is scripted on top.
#![allow(dead_code)]

use async_trait::async_trait;
use fresh_engine::backend::{Backend, BackendError, NavigationResult};
use fresh_engine::config::FreshConfig;
use fresh_engine::protocol::{ElementRef, Geolocation, Strategy, Viewport};
use fresh_engine::session::PageSession;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

pub const BASE_URL: &str = "http://fresh.test";
pub const VALID_EMAIL: &str = "alice@example.com";
pub const VALID_PASSWORD: &str = "password123";

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub key: String,
    pub tag: String,
    pub selectors: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub value: String,
    pub checked: bool,
    pub visible: bool,
    pub visible_from: Option<Instant>,
    pub required: bool,
    /// Key of the enclosing element, for scoped lookups.
    pub parent: Option<String>,
}

impl FakeElement {
    pub fn new(key: &str, tag: &str) -> Self {
        Self {
            key: key.to_string(),
            tag: tag.to_string(),
            visible: true,
            ..Default::default()
        }
    }

    pub fn css(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn inside(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Becomes visible once the (tokio) clock reaches `at`.
    pub fn appears_at(mut self, at: Instant) -> Self {
        self.visible_from = Some(at);
        self
    }

    fn matches(&self, strategy: &Strategy) -> bool {
        match strategy {
            Strategy::Css { selector } => self.selectors.iter().any(|s| s == selector),
            Strategy::Attribute { name, value } => self.attrs.get(name) == Some(value),
            Strategy::Text { tag, text } => {
                (tag == "*" || *tag == self.tag)
                    && self.text.to_lowercase().contains(&text.to_lowercase())
            }
        }
    }

    fn is_shown(&self) -> bool {
        self.visible && self.visible_from.is_none_or(|at| Instant::now() >= at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReview {
    pub restaurant: String,
    pub food_item: String,
    pub rating: String,
    pub text: String,
}

#[derive(Debug)]
pub struct FakeBackend {
    pub url: String,
    pub dom: Vec<FakeElement>,
    pub storage: BTreeMap<String, String>,
    pub reviews: Vec<StoredReview>,
    /// Every call, in order, as `operation:detail`.
    pub calls: Vec<String>,
    /// Clicks that will fail with `click_error` before clicks start working.
    pub failing_clicks: u32,
    pub click_error: BackendError,
    pub viewport: Viewport,
    pub geolocation: Option<Geolocation>,
    pub permissions: Vec<String>,
    pub launched: bool,
    pub closed: bool,
    scripted: bool,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    /// A backend that behaves like the review site.
    pub fn new() -> Self {
        Self {
            url: "about:blank".to_string(),
            dom: Vec::new(),
            storage: BTreeMap::new(),
            reviews: Vec::new(),
            calls: Vec::new(),
            failing_clicks: 0,
            click_error: BackendError::ElementNotInteractable {
                element: "fake".into(),
                reason: "covered by overlay".into(),
            },
            viewport: Viewport::default(),
            geolocation: None,
            permissions: Vec::new(),
            launched: false,
            closed: false,
            scripted: true,
        }
    }

    /// A static page made of `dom`, with no scripted behaviour.
    pub fn with_dom(dom: Vec<FakeElement>) -> Self {
        Self {
            url: format!("{}/static.html", BASE_URL),
            dom,
            scripted: false,
            ..Self::new()
        }
    }

    pub fn fail_clicks(mut self, times: u32, error: BackendError) -> Self {
        self.failing_clicks = times;
        self.click_error = error;
        self
    }

    /// Number of UI interactions (click, fill, clear, check, press) so far.
    pub fn interactions(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| {
                ["click:", "fill:", "clear:", "check:", "press:"]
                    .iter()
                    .any(|p| c.starts_with(p))
            })
            .count()
    }

    pub fn element(&self, key: &str) -> Option<&FakeElement> {
        self.dom.iter().find(|e| e.key == key)
    }

    fn element_mut(&mut self, key: &str) -> Option<&mut FakeElement> {
        self.dom.iter_mut().find(|e| e.key == key)
    }

    fn locate(&self, element: &ElementRef) -> Result<usize, BackendError> {
        self.dom
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(&element.strategy))
            .map(|(i, _)| i)
            .nth(element.index)
            .ok_or_else(|| BackendError::ElementNotFound {
                element: element.to_string(),
            })
    }

    fn is_within(&self, element: &FakeElement, scope: &str) -> bool {
        let mut parent = element.parent.as_deref();
        while let Some(key) = parent {
            if key == scope {
                return true;
            }
            parent = self.element(key).and_then(|p| p.parent.as_deref());
        }
        false
    }

    fn path(&self) -> String {
        url::Url::parse(&self.url)
            .map(|u| u.path().to_string())
            .unwrap_or_default()
    }

    fn logged_in(&self) -> bool {
        self.storage.get("isLoggedIn").map(String::as_str) == Some("true")
    }

    fn value_of(&self, key: &str) -> String {
        self.element(key).map(|e| e.value.clone()).unwrap_or_default()
    }

    fn set_text(&mut self, key: &str, text: &str) {
        if let Some(el) = self.element_mut(key) {
            el.text = text.to_string();
            el.visible = true;
        }
    }

    fn load(&mut self, path: &str) {
        let path = if path == "/reviews.html" && !self.logged_in() {
            "/index.html"
        } else {
            path
        };
        self.url = format!("{}{}", BASE_URL, path);
        self.dom = match path {
            "/" | "/index.html" => index_dom(),
            "/reviews.html" => self.reviews_dom(),
            "/search.html" => search_dom(),
            "/signup.html" => vec![FakeElement::new("title", "h1").css("h1, h2").text("Sign Up")],
            _ => vec![FakeElement::new("title", "h1").css("h1, h2").text("Not Found")],
        };
    }

    fn reviews_dom(&self) -> Vec<FakeElement> {
        let name = self
            .storage
            .get("currentUser")
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
            .and_then(|v| v.get("name").and_then(|n| n.as_str()).map(String::from))
            .unwrap_or_default();

        let mut dom = vec![
            FakeElement::new("navbar", "nav").css(".navbar").css("nav"),
            FakeElement::new("user_name", "span").css("#userNameDisplay").text(&name),
            FakeElement::new("logout", "button").css("#logoutBtn").text("Logout"),
            FakeElement::new("title", "h1").css("h1, h2").text("Restaurant Reviews"),
            FakeElement::new("form", "form").css("#reviewForm"),
            FakeElement::new("restaurant", "input").css("#restaurantName").required(),
            FakeElement::new("food", "input").css("#foodItem").required(),
        ];
        for n in 1..=5 {
            dom.push(
                FakeElement::new(&format!("star{}", n), "input")
                    .css(&format!("#star{}", n))
                    .attr("name", "rating")
                    .attr("value", &n.to_string())
                    .attr("type", "radio")
                    .hidden(),
            );
        }
        dom.extend([
            FakeElement::new("review", "textarea").css("#review").required(),
            FakeElement::new("submit", "button")
                .css("#reviewForm button[type=\"submit\"]")
                .css("button[type=\"submit\"]")
                .attr("type", "submit")
                .text("Submit Review"),
            FakeElement::new("review_error", "div").css("#reviewError").hidden(),
            FakeElement::new("review_success", "div").css("#reviewSuccess").hidden(),
            FakeElement::new("location_toggle", "input")
                .css("#locationToggle")
                .attr("type", "checkbox"),
            FakeElement::new("toggle_status", "span")
                .css("#toggleStatusText")
                .text("Location: Off"),
            FakeElement::new("zip", "input").css("#zipCodeInput"),
            FakeElement::new("zip_search", "button").css("#searchZipBtn").text("Search"),
            FakeElement::new("location_status", "div").css("#locationStatus"),
            FakeElement::new("reviews_list", "div").css("#reviewsList"),
        ]);
        for (i, r) in self.reviews.iter().enumerate() {
            let card = format!("card{}", i);
            dom.push(FakeElement::new(&card, "div").css(".review-card"));
            dom.push(
                FakeElement::new(&format!("{}_restaurant", card), "h3")
                    .css(".restaurant-name")
                    .text(&r.restaurant)
                    .inside(&card),
            );
            dom.push(
                FakeElement::new(&format!("{}_food", card), "span")
                    .css(".food-item")
                    .text(&r.food_item)
                    .inside(&card),
            );
            dom.push(
                FakeElement::new(&format!("{}_rating", card), "span")
                    .css(".rating")
                    .text(&"★".repeat(r.rating.parse().unwrap_or(0)))
                    .inside(&card),
            );
            dom.push(
                FakeElement::new(&format!("{}_text", card), "p")
                    .css(".review-text")
                    .text(&r.text)
                    .inside(&card),
            );
        }
        dom
    }

    fn on_click(&mut self, key: &str) {
        match key {
            "login" => {
                let email = self.value_of("email");
                let password = self.value_of("password");
                if email == VALID_EMAIL && password == VALID_PASSWORD {
                    let user = serde_json::json!({
                        "email": email,
                        "name": "Alice Johnson",
                        "loggedIn": "true",
                    });
                    self.storage.insert("currentUser".into(), user.to_string());
                    self.storage.insert("isLoggedIn".into(), "true".into());
                    self.load("/reviews.html");
                } else {
                    self.set_text("login_error", "Invalid email or password");
                }
            }
            "signup_link" => self.load("/signup.html"),
            "login_link" => self.load("/index.html"),
            "logout" => {
                self.storage.clear();
                self.load("/index.html");
            }
            "submit" => self.submit_review(),
            "location_toggle" => {
                let on = self.element("location_toggle").is_some_and(|e| !e.checked);
                if let Some(el) = self.element_mut("location_toggle") {
                    el.checked = on;
                }
                self.set_text("toggle_status", if on { "Location: On" } else { "Location: Off" });
            }
            "zip_search" => {
                let zip = self.value_of("zip");
                let message = if zip.len() == 5 && zip.chars().all(|c| c.is_ascii_digit()) {
                    format!("Showing restaurants near {}", zip)
                } else {
                    "Please enter a valid 5-digit ZIP code".to_string()
                };
                self.set_text("location_status", &message);
            }
            "search_button" => self.run_search(),
            _ => {}
        }
    }

    fn submit_review(&mut self) {
        let restaurant = self.value_of("restaurant");
        let food_item = self.value_of("food");
        let text = self.value_of("review");
        let rating = self
            .dom
            .iter()
            .find(|e| e.attrs.get("name").map(String::as_str) == Some("rating") && e.checked)
            .and_then(|e| e.attrs.get("value").cloned());

        let Some(rating) = rating.filter(|_| {
            !restaurant.is_empty() && !food_item.is_empty() && !text.is_empty()
        }) else {
            self.set_text("review_error", "Please fill in all fields");
            return;
        };

        self.reviews.push(StoredReview {
            restaurant,
            food_item,
            rating,
            text,
        });
        self.load("/reviews.html");
        self.set_text("review_success", "Review submitted successfully!");
    }

    fn run_search(&mut self) {
        let query = self.value_of("search_input").to_lowercase();
        let catalogue = ["Pizza Palace", "Pizza Hut", "Sushi Bar", "Taco Town"];
        let hits: Vec<_> = catalogue
            .iter()
            .filter(|name| !query.is_empty() && name.to_lowercase().contains(&query))
            .collect();
        self.dom.retain(|e| !e.key.starts_with("result") && e.key != "no_results");
        if hits.is_empty() {
            self.dom.push(
                FakeElement::new("no_results", "div")
                    .css(".no-results")
                    .text("No results found"),
            );
        } else {
            self.dom.push(FakeElement::new("results", "div").css(".search-results"));
            for (i, hit) in hits.iter().enumerate() {
                self.dom.push(
                    FakeElement::new(&format!("result{}", i), "div")
                        .css(".search-result")
                        .text(hit),
                );
            }
        }
    }
}

fn index_dom() -> Vec<FakeElement> {
    vec![
        FakeElement::new("nav", "nav").css("nav"),
        FakeElement::new("title", "h1").css("h1, h2").text("Welcome to Fresh Reviews"),
        FakeElement::new("main", "main").css("main"),
        FakeElement::new("email", "input")
            .css("#email")
            .attr("type", "email")
            .required(),
        FakeElement::new("password", "input")
            .css("#password")
            .attr("type", "password")
            .required(),
        FakeElement::new("login", "button")
            .css("button[type=\"submit\"]")
            .attr("type", "submit")
            .text("Login"),
        FakeElement::new("login_error", "div").css(".error-message").hidden(),
        FakeElement::new("login_link", "a")
            .css("a[href*=\"index.html\"]")
            .attr("href", "index.html")
            .text("Login"),
        FakeElement::new("signup_link", "a")
            .css("a[href*=\"signup.html\"]")
            .attr("href", "signup.html")
            .text("Sign up"),
    ]
}

/// Search page without a submit button: searching goes through Enter.
fn search_dom() -> Vec<FakeElement> {
    vec![
        FakeElement::new("nav", "nav").css("nav"),
        FakeElement::new("main", "main").css("main"),
        FakeElement::new("search_input", "input")
            .css("input[type=\"search\"]")
            .attr("type", "search"),
        FakeElement::new("filters", "aside").css("aside"),
    ]
}

#[async_trait]
impl Backend for FakeBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        self.launched = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.calls.push("close:".into());
        self.closed = true;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.launched && !self.closed
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.calls.push(format!("navigate:{}", url));
        let parsed = url::Url::parse(url).map_err(|e| BackendError::Navigation(e.to_string()))?;
        if self.scripted {
            self.load(parsed.path());
        } else {
            self.url = url.to_string();
        }
        Ok(NavigationResult {
            url: self.url.clone(),
            title: "Fresh Reviews".into(),
            status: 200,
        })
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        Ok(self.url.clone())
    }

    async fn title(&mut self) -> Result<String, BackendError> {
        Ok("Fresh Reviews".into())
    }

    async fn count(&mut self, strategy: &Strategy) -> Result<usize, BackendError> {
        self.calls.push(format!("count:{}", strategy));
        if let Strategy::Css { selector } = strategy
            && selector.starts_with("!!")
        {
            return Err(BackendError::SelectorInvalid {
                selector: selector.clone(),
            });
        }
        Ok(self.dom.iter().filter(|e| e.matches(strategy)).count())
    }

    async fn is_visible(&mut self, element: &ElementRef) -> Result<bool, BackendError> {
        match self.locate(element) {
            Ok(i) => Ok(self.dom[i].is_shown()),
            Err(_) => Ok(false),
        }
    }

    async fn click(&mut self, element: &ElementRef) -> Result<(), BackendError> {
        let i = self.locate(element)?;
        let key = self.dom[i].key.clone();
        self.calls.push(format!("click:{}", key));
        if self.failing_clicks > 0 {
            self.failing_clicks -= 1;
            return Err(self.click_error.clone());
        }
        if self.scripted {
            self.on_click(&key);
        }
        Ok(())
    }

    async fn fill(&mut self, element: &ElementRef, value: &str) -> Result<(), BackendError> {
        let i = self.locate(element)?;
        self.calls.push(format!("fill:{}", self.dom[i].key));
        self.dom[i].value = value.to_string();
        Ok(())
    }

    async fn clear(&mut self, element: &ElementRef) -> Result<(), BackendError> {
        let i = self.locate(element)?;
        self.calls.push(format!("clear:{}", self.dom[i].key));
        self.dom[i].value.clear();
        Ok(())
    }

    async fn check(&mut self, element: &ElementRef) -> Result<(), BackendError> {
        let i = self.locate(element)?;
        self.calls.push(format!("check:{}", self.dom[i].key));
        if let Some(group) = self.dom[i].attrs.get("name").cloned() {
            for el in self.dom.iter_mut() {
                if el.attrs.get("name") == Some(&group) {
                    el.checked = false;
                }
            }
        }
        self.dom[i].checked = true;
        Ok(())
    }

    async fn read_text(&mut self, element: &ElementRef) -> Result<Option<String>, BackendError> {
        let i = self.locate(element)?;
        Ok(Some(self.dom[i].text.clone()))
    }

    async fn read_text_within(
        &mut self,
        scope: &ElementRef,
        strategy: &Strategy,
    ) -> Result<Option<String>, BackendError> {
        let i = self.locate(scope)?;
        let scope = self.dom[i].key.clone();
        Ok(self
            .dom
            .iter()
            .find(|e| e.matches(strategy) && self.is_within(e, &scope))
            .map(|e| e.text.clone()))
    }

    async fn read_attribute(
        &mut self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, BackendError> {
        let i = self.locate(element)?;
        Ok(self.dom[i].attrs.get(name).cloned())
    }

    async fn input_value(&mut self, element: &ElementRef) -> Result<String, BackendError> {
        let i = self.locate(element)?;
        Ok(self.dom[i].value.clone())
    }

    async fn is_checked(&mut self, element: &ElementRef) -> Result<bool, BackendError> {
        let i = self.locate(element)?;
        Ok(self.dom[i].checked)
    }

    async fn get_storage(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.storage.get(key).cloned())
    }

    async fn set_storage(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.calls.push(format!("set_storage:{}", key));
        self.storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn clear_storage(&mut self) -> Result<(), BackendError> {
        self.calls.push("clear_storage:".into());
        self.storage.clear();
        Ok(())
    }

    async fn wait_for_network_idle(&mut self, _timeout: Duration) -> Result<(), BackendError> {
        self.calls.push("network_idle:".into());
        Ok(())
    }

    async fn validation_message(
        &mut self,
        element: &ElementRef,
    ) -> Result<Option<String>, BackendError> {
        let i = self.locate(element)?;
        let el = &self.dom[i];
        Ok((el.required && el.value.is_empty()).then(|| "Please fill out this field.".to_string()))
    }

    async fn press_key(&mut self, element: &ElementRef, key: &str) -> Result<(), BackendError> {
        let i = self.locate(element)?;
        let target = self.dom[i].key.clone();
        self.calls.push(format!("press:{}:{}", target, key));
        if key == "Enter" && target == "search_input" {
            self.run_search();
        }
        Ok(())
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> Result<(), BackendError> {
        self.viewport = viewport;
        Ok(())
    }

    async fn set_geolocation(&mut self, location: Geolocation) -> Result<(), BackendError> {
        self.geolocation = Some(location);
        Ok(())
    }

    async fn grant_permission(&mut self, permission: &str) -> Result<(), BackendError> {
        self.permissions.push(permission.to_string());
        Ok(())
    }

    async fn reload(&mut self) -> Result<NavigationResult, BackendError> {
        self.calls.push("reload:".into());
        let path = self.path();
        self.load(&path);
        Ok(NavigationResult {
            url: self.url.clone(),
            title: "Fresh Reviews".into(),
            status: 200,
        })
    }

    async fn go_back(&mut self) -> Result<NavigationResult, BackendError> {
        self.calls.push("go_back:".into());
        Ok(NavigationResult {
            url: self.url.clone(),
            title: "Fresh Reviews".into(),
            status: 200,
        })
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }

    async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value, BackendError> {
        self.calls.push("execute_script:".into());
        if script.contains("checked = false") {
            for el in self.dom.iter_mut() {
                if el.attrs.get("name").map(String::as_str) == Some("rating") {
                    el.checked = false;
                }
            }
        }
        Ok(serde_json::Value::Null)
    }
}

pub fn test_config() -> FreshConfig {
    FreshConfig {
        base_url: BASE_URL.to_string(),
        ..FreshConfig::default()
    }
}

pub fn session() -> PageSession<FakeBackend> {
    session_with(FakeBackend::new())
}

pub fn session_with(backend: FakeBackend) -> PageSession<FakeBackend> {
    match PageSession::new(backend, test_config()) {
        Ok(session) => session,
        Err(e) => panic!("test config has a valid base url: {}", e),
    }
}
