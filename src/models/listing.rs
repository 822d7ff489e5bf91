//! Listing data structure.

/// A classified-ad posting extracted from the watched page.
///
/// Listings are rebuilt from the fetched document on every cycle; only the
/// id outlives the cycle, as a member of the seen set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Stable ad identifier taken from the listing container
    pub id: String,

    /// Listing title
    pub title: String,

    /// Short description text (empty if the page provides none)
    pub description: String,

    /// Absolute URL of the listing page
    pub link: String,
}

impl Listing {
    /// Build the push-notification text for this listing.
    pub fn notification_text(&self) -> String {
        format!("🏠 New WG listing!\n{}\n{}", self.title, self.link)
    }
}
