// src/services/parser.rs

//! Listing page parser.
//!
//! Extracts candidate listings from the fetched document using fixed CSS
//! selectors. The source markup is treated as untrusted: a malformed or
//! partially rendered document never fails the parse, it only reduces the
//! number of extracted candidates.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::Listing;
use crate::utils::url;

/// Listing-container attributes holding the ad id, in priority order.
const ID_ATTRS: [&str; 3] = ["data-id", "id", "data-adid"];

/// Result of parsing one document.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Extracted listings, in document order
    pub listings: Vec<Listing>,
    /// Candidates dropped for missing required fields
    pub skipped: usize,
}

/// Parser for the watched listing page.
pub struct ListingParser {
    origin: String,
    article_sel: Selector,
    title_sels: Vec<Selector>,
    link_sel: Selector,
    description_sels: Vec<Selector>,
}

impl ListingParser {
    /// Create a parser resolving links against the given site origin.
    pub fn new(origin: impl Into<String>) -> Result<Self> {
        Ok(Self {
            origin: origin.into(),
            article_sel: Self::parse_selector("article")?,
            // Title fallback chain: heading, subheading, first link text
            title_sels: vec![
                Self::parse_selector("h2")?,
                Self::parse_selector("h3")?,
                Self::parse_selector("a[href]")?,
            ],
            link_sel: Self::parse_selector("a[href]")?,
            description_sels: vec![
                Self::parse_selector("p")?,
                Self::parse_selector("div.text-module-begin")?,
            ],
        })
    }

    /// Extract all candidate listings from a document.
    pub fn parse(&self, html: &str) -> ParseOutcome {
        let document = Html::parse_document(html);
        let mut outcome = ParseOutcome::default();

        for article in document.select(&self.article_sel) {
            let id = Self::extract_id(&article);
            let title = self.extract_title(&article);
            let link = self.extract_link(&article);

            match (id, title, link) {
                (Some(id), Some(title), Some(raw_link)) => {
                    outcome.listings.push(Listing {
                        id,
                        title,
                        description: self.extract_description(&article),
                        link: url::normalize(&self.origin, &raw_link),
                    });
                }
                // No id and no title/link pair: not a listing container
                (None, None, _) | (None, _, None) => {}
                _ => outcome.skipped += 1,
            }
        }

        outcome
    }

    /// First non-empty id attribute on the container, in priority order.
    fn extract_id(article: &ElementRef) -> Option<String> {
        ID_ATTRS
            .into_iter()
            .filter_map(|attr| article.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// First non-empty title text along the fallback chain.
    fn extract_title(&self, article: &ElementRef) -> Option<String> {
        self.title_sels
            .iter()
            .filter_map(|sel| article.select(sel).next())
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    }

    /// Target of the first hyperlink carrying an href attribute.
    fn extract_link(&self, article: &ElementRef) -> Option<String> {
        article
            .select(&self.link_sel)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(str::to_string)
    }

    /// Description text, defaulting to empty when the page provides none.
    fn extract_description(&self, article: &ElementRef) -> String {
        self.description_sels
            .iter()
            .filter_map(|sel| article.select(sel).next())
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

/// Collect and whitespace-normalize the text content of an element.
fn element_text(el: &ElementRef) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
