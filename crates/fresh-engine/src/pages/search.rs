use super::{main_content, navigation_bar};
use crate::backend::Backend;
use crate::outcome::ActionError;
use crate::session::PageSession;
use fresh_common::fixtures::UrlPaths;
use fresh_common::protocol::ElementDescriptor;
use std::time::Duration;
use tracing::{debug, info};

const LOADING_TIMEOUT: Duration = Duration::from_millis(10_000);

pub struct SearchPage<'s, B: Backend> {
    session: &'s mut PageSession<B>,
    search_input: ElementDescriptor,
    search_button: ElementDescriptor,
    search_results: ElementDescriptor,
    result_items: ElementDescriptor,
    filter_section: ElementDescriptor,
    no_results_message: ElementDescriptor,
    main_content: ElementDescriptor,
    navigation_bar: ElementDescriptor,
    loading_indicator: ElementDescriptor,
}

impl<'s, B: Backend> SearchPage<'s, B> {
    pub fn new(session: &'s mut PageSession<B>) -> Self {
        Self {
            session,
            search_input: ElementDescriptor::css("search input", "input[type=\"search\"]")
                .or_css("input[name=\"search\"]")
                .or_css("input[placeholder*=\"search\" i]")
                .or_css("#search")
                .or_css(".search-input"),
            search_button: ElementDescriptor::css("search button", "button[type=\"submit\"]")
                .or_text("button", "Search")
                .or_css(".search-button"),
            search_results: ElementDescriptor::css("search results", ".search-results")
                .or_css("#search-results")
                .or_css(".results")
                .or_attr("data-testid", "search-results"),
            result_items: ElementDescriptor::css("search result", ".search-result")
                .or_css(".result-item")
                .or_attr("data-testid", "result"),
            filter_section: ElementDescriptor::css("filter section", ".filters")
                .or_css(".filter-section")
                .or_css("aside")
                .or_css(".sidebar"),
            no_results_message: ElementDescriptor::css("no results message", ".no-results")
                .or_css(".empty-state")
                .or_text("*", "No results")
                .or_text("*", "not found"),
            main_content: main_content(),
            navigation_bar: navigation_bar(),
            loading_indicator: ElementDescriptor::css("loading indicator", ".loading")
                .or_css(".spinner")
                .or_attr("aria-busy", "true"),
        }
    }

    pub fn session(&mut self) -> &mut PageSession<B> {
        self.session
    }

    pub async fn navigate(&mut self) -> Result<(), ActionError> {
        self.session.goto(UrlPaths::SEARCH).await?;
        self.session.settle().await
    }

    pub async fn is_on_search_page(&mut self) -> bool {
        self.session.current_url().await.contains("search.html")
    }

    /// Type `query` and submit it, by button when there is one, else by Enter.
    /// A page without a search input is left untouched.
    pub async fn search(&mut self, query: &str) -> Result<(), ActionError> {
        if !self.session.is_visible(&self.search_input).await {
            debug!("no search input on page, skipping search");
            return Ok(());
        }
        info!(%query, "searching");
        self.session.fill(&self.search_input, query).await?;
        if self.session.is_visible(&self.search_button).await {
            self.session.click(&self.search_button).await?;
        } else {
            self.session.press(&self.search_input, "Enter").await?;
        }
        self.session.settle().await
    }

    pub async fn are_search_results_visible(&mut self) -> bool {
        self.session.is_visible(&self.search_results).await
    }

    pub async fn is_no_results_message_visible(&mut self) -> bool {
        self.session.is_visible(&self.no_results_message).await
    }

    pub async fn is_filter_section_visible(&mut self) -> bool {
        self.session.is_visible(&self.filter_section).await
    }

    pub async fn is_navigation_bar_visible(&mut self) -> bool {
        self.session.is_visible(&self.navigation_bar).await
    }

    pub async fn is_main_content_visible(&mut self) -> bool {
        self.session.is_visible(&self.main_content).await
    }

    pub async fn is_search_input_visible(&mut self) -> bool {
        self.session.is_visible(&self.search_input).await
    }

    /// Number of result items, zero when the results container is not shown.
    pub async fn search_results_count(&mut self) -> usize {
        if self.are_search_results_visible().await {
            self.session.count(&self.result_items).await
        } else {
            0
        }
    }

    pub async fn wait_for_search_complete(&mut self) -> Result<(), ActionError> {
        if self.session.is_visible(&self.loading_indicator).await {
            self.session
                .wait_until_hidden(&self.loading_indicator, LOADING_TIMEOUT)
                .await?;
        }
        self.session.settle().await
    }
}
