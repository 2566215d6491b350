use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One way of locating a logical UI element.
///
/// Strategies are evaluated independently; an `ElementDescriptor` tries them in
/// declared order and the first one that yields a live match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Plain CSS selector, e.g. `#loginBtn` or `input[name="email"]`.
    Css { selector: String },
    /// Exact attribute match on any element, e.g. `type="submit"`.
    Attribute { name: String, value: String },
    /// Case-insensitive substring match on the text content of `tag` elements.
    /// `*` matches any tag.
    Text { tag: String, text: String },
}

impl Strategy {
    pub fn css(selector: impl Into<String>) -> Self {
        Strategy::Css {
            selector: selector.into(),
        }
    }

    pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Self {
        Strategy::Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Strategy::Text {
            tag: tag.into(),
            text: text.into(),
        }
    }

    /// Short label used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::Css { .. } => "css",
            Strategy::Attribute { .. } => "attribute",
            Strategy::Text { .. } => "text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Css { selector } => write!(f, "css={}", selector),
            Strategy::Attribute { name, value } => write!(f, "[{}=\"{}\"]", name, value),
            Strategy::Text { tag, text } => write!(f, "{}:has-text(\"{}\")", tag, text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("Descriptor '{0}' declares no strategies")]
    Empty(String),
}

/// Ordered fallback list of strategies for one logical element.
///
/// Immutable once built. The list is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementDescriptor {
    name: String,
    strategies: Vec<Strategy>,
}

impl ElementDescriptor {
    pub fn new(name: impl Into<String>, strategies: Vec<Strategy>) -> Result<Self, DescriptorError> {
        let name = name.into();
        if strategies.is_empty() {
            return Err(DescriptorError::Empty(name));
        }
        Ok(Self { name, strategies })
    }

    /// Start a descriptor whose primary strategy is a CSS selector.
    pub fn css(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategies: vec![Strategy::css(selector)],
        }
    }

    pub fn or_css(mut self, selector: impl Into<String>) -> Self {
        self.strategies.push(Strategy::css(selector));
        self
    }

    pub fn or_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.strategies.push(Strategy::attr(name, value));
        self
    }

    pub fn or_text(mut self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.strategies.push(Strategy::text(tag, text));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }
}

impl fmt::Display for ElementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A concrete element: the `index`-th match (document order) of `strategy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub strategy: Strategy,
    pub index: usize,
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} >> nth={}", self.strategy, self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
    pub status: u16,
}

/// User record the application keeps under the `currentUser` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub email: String,
    pub name: String,
    pub logged_in: String,
}

impl StoredUser {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            logged_in: "true".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_descriptor_is_rejected() {
        let err = ElementDescriptor::new("nothing", vec![]).unwrap_err();
        assert_eq!(err, DescriptorError::Empty("nothing".into()));
    }

    #[test]
    fn builder_keeps_declared_order() {
        let d = ElementDescriptor::css("login button", "#loginBtn")
            .or_attr("type", "submit")
            .or_text("button", "Login");
        let kinds: Vec<_> = d.strategies().iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec!["css", "attribute", "text"]);
    }

    #[test]
    fn strategy_serializes_with_kind_tag() {
        let json = serde_json::to_value(Strategy::text("a", "Sign up")).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["tag"], "a");
    }

    #[test]
    fn stored_user_uses_camel_case_keys() {
        let user = StoredUser::new("alice@example.com", "Alice Johnson");
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"loggedIn\":\"true\""));
    }
}
