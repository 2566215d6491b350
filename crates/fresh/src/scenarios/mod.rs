//! Scenario catalogue.
//!
//! Each scenario is a plain function over a fresh `ScenarioCtx`; the runner
//! owns launching, timing and teardown.

mod index;
mod login;
mod reviews;
mod search;

use crate::error::ScenarioResult;
use clap::ValueEnum;
use fresh_engine::fixtures::Fixtures;
use fresh_engine::session::PageSession;
use fresh_h::HeadlessBackend;
use futures::future::BoxFuture;
use serde::Serialize;
use std::fmt;

/// What a scenario gets to work with: one isolated browser session and the fixture set.
pub struct ScenarioCtx {
    pub session: PageSession<HeadlessBackend>,
    pub fixtures: Fixtures,
}

pub type ScenarioFn = fn(&mut ScenarioCtx) -> BoxFuture<'_, ScenarioResult>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    Index,
    Login,
    Reviews,
    Search,
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suite::Index => "index",
            Suite::Login => "login",
            Suite::Reviews => "reviews",
            Suite::Search => "search",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Smoke,
    Regression,
    Responsive,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Smoke => "@smoke",
            Tag::Regression => "@regression",
            Tag::Responsive => "@responsive",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub suite: Suite,
    pub tags: &'static [Tag],
    pub run: ScenarioFn,
}

impl Scenario {
    pub const fn new(
        name: &'static str,
        suite: Suite,
        tags: &'static [Tag],
        run: ScenarioFn,
    ) -> Self {
        Self {
            name,
            suite,
            tags,
            run,
        }
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// File-name friendly form of the scenario name.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len() + 8);
        slug.push_str(&self.suite.to_string());
        slug.push('-');
        let mut last_dash = true;
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                last_dash = false;
            } else if !last_dash {
                slug.push('-');
                last_dash = true;
            }
        }
        slug.trim_end_matches('-').to_string()
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Every scenario, in suite order.
pub fn catalogue() -> Vec<Scenario> {
    let mut all = Vec::new();
    all.extend(index::scenarios());
    all.extend(login::scenarios());
    all.extend(reviews::scenarios());
    all.extend(search::scenarios());
    all
}

/// Narrowing applied to the catalogue before a run.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub suite: Option<Suite>,
    pub tag: Option<Tag>,
    pub name: Option<String>,
}

impl Selection {
    pub fn matches(&self, scenario: &Scenario) -> bool {
        if let Some(suite) = self.suite
            && scenario.suite != suite
        {
            return false;
        }
        if let Some(tag) = self.tag
            && !scenario.has_tag(tag)
        {
            return false;
        }
        match &self.name {
            Some(needle) => scenario
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }

    pub fn apply(&self, scenarios: Vec<Scenario>) -> Vec<Scenario> {
        scenarios.into_iter().filter(|s| self.matches(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalogue_names_are_unique_per_suite() {
        let all = catalogue();
        let mut seen = HashSet::new();
        for s in &all {
            assert!(seen.insert((s.suite, s.name)), "duplicate {:?}", s);
        }
        assert!(all.iter().any(|s| s.suite == Suite::Login));
    }

    #[test]
    fn every_scenario_is_tagged() {
        for s in catalogue() {
            assert!(!s.tags.is_empty(), "{} has no tags", s.name);
        }
    }

    #[test]
    fn selection_filters_by_suite_tag_and_name() {
        let all = catalogue();
        let total = all.len();

        let reviews = Selection {
            suite: Some(Suite::Reviews),
            ..Default::default()
        }
        .apply(all.clone());
        assert!(!reviews.is_empty() && reviews.len() < total);
        assert!(reviews.iter().all(|s| s.suite == Suite::Reviews));

        let smoke = Selection {
            tag: Some(Tag::Smoke),
            ..Default::default()
        }
        .apply(all.clone());
        assert!(smoke.iter().all(|s| s.has_tag(Tag::Smoke)));

        let named = Selection {
            name: Some("ZIP CODE".into()),
            ..Default::default()
        }
        .apply(all);
        assert!(!named.is_empty());
        assert!(named.iter().all(|s| s.name.to_lowercase().contains("zip code")));
    }

    #[test]
    fn slug_is_file_name_friendly() {
        let s = catalogue()
            .into_iter()
            .find(|s| s.suite == Suite::Index)
            .unwrap();
        let slug = s.slug();
        assert!(slug.starts_with("index-"));
        assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!slug.ends_with('-'));
    }
}
