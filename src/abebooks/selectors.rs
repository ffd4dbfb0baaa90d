//! CSS selectors for AbeBooks HTML parsing.
//!
//! This file contains all CSS selectors used for parsing AbeBooks pages.
//! Update this file when AbeBooks changes their HTML structure.
//!
//! **Update process**: When parsing fails, capture HTML sample,
//! update selectors, and add test fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors shared by search-results and buying-options pages.
pub mod listing {
    use super::*;

    /// Listing item container, present on both page classes.
    pub static ITEM: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("li[data-cy='listing-item']").unwrap());

    /// Anchor inside a listing item whose id contains "listing" - links to
    /// the book's detail page.
    pub static DETAIL_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a[id*='listing']").unwrap());

    /// Price meta attribute on a listing item.
    pub static PRICE_META: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[itemprop='price']").unwrap());

    /// ISBN meta attribute on a listing item.
    pub static ISBN_META: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[itemprop='isbn']").unwrap());

    /// Seller link; its text is the provider name and the text node that
    /// follows it carries the seller locale string.
    pub static SELLER_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a[data-cy='listing-seller-link']").unwrap());

    /// Listing title text.
    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span[data-cy='listing-title']").unwrap());
}

/// Selectors for the book detail page.
pub mod detail {
    use super::*;

    /// Divider that precedes the "more buying options" section.
    pub static DIVIDER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("hr#hr1").unwrap());

    /// "View all listings" link inside the more-buying-options container.
    pub static VIEW_ALL_LISTINGS: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a#view-all-listings").unwrap());

    /// Element id of the more-buying-options sibling container.
    pub static MORE_OPTIONS_ID: &str = "more-buying-options";
}
