//! HTML parsing for AbeBooks search, detail, and buying-options pages.
//!
//! All functions here are pure: markup in, structured data out. A page with
//! no matching elements yields an empty collection or `None`, never an error;
//! the crawler treats that as "no data here".

use crate::abebooks::models::Offer;
use crate::abebooks::selectors::{detail, listing};
use scraper::{ElementRef, Html};
use tracing::trace;

/// Extracts detail-page links from a search-results page.
///
/// Finds every listing item and, within each, every anchor whose id contains
/// "listing". Returns resolved absolute URLs. An empty vec signals
/// end-of-results to the caller.
pub fn listing_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for item in document.select(&listing::ITEM) {
        for anchor in item.select(&listing::DETAIL_LINK) {
            if let Some(href) = anchor.value().attr("href") {
                links.push(resolve(base_url, href));
            }
        }
    }

    trace!("Extracted {} listing links", links.len());
    links
}

/// Finds the "view all listings" link on a book detail page.
///
/// The link lives in a `more-buying-options` container that follows the
/// `hr#hr1` divider. Returns `None` when the section is absent, meaning the
/// detail page carries the only offer for this book. Such listings are
/// dropped by the crawler: offers are only ever extracted from expanded
/// buying-options pages. That filtering is a deliberate policy the
/// downstream statistics assume, not an oversight.
pub fn more_offers_link(html: &str, base_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let divider = document.select(&detail::DIVIDER).next()?;

    // The container is a later sibling of the divider, not a descendant.
    let mut sibling = divider.next_sibling();
    while let Some(node) = sibling {
        if let Some(element) = ElementRef::wrap(node) {
            if element.value().name() == "div"
                && element.value().id() == Some(detail::MORE_OPTIONS_ID)
            {
                return element
                    .select(&detail::VIEW_ALL_LISTINGS)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(|href| resolve(base_url, href));
            }
        }
        sibling = node.next_sibling();
    }

    None
}

/// Extracts offers from an expanded buying-options page.
///
/// Items without an ISBN (or with an empty one) are skipped silently; every
/// returned offer has a non-empty ISBN. `source_page` records which search
/// page the enclosing listing was discovered on.
pub fn offers(html: &str, source_page: u32) -> Vec<Offer> {
    let document = Html::parse_document(html);
    let mut offers = Vec::new();

    for item in document.select(&listing::ITEM) {
        let Some(isbn) = meta_content(item, &listing::ISBN_META) else {
            trace!("Skipping listing item without ISBN");
            continue;
        };

        let price = meta_content(item, &listing::PRICE_META).unwrap_or_default();

        let Some(seller) = item.select(&listing::SELLER_LINK).next() else {
            trace!("Skipping listing item without seller link");
            continue;
        };
        let provider = element_text(seller);
        let country = seller_country(seller).unwrap_or_default();

        let title =
            item.select(&listing::TITLE).next().map(element_text).unwrap_or_default();

        offers.push(Offer { isbn, title, provider, country, price, source_page });
    }

    trace!("Extracted {} offers from buying-options page", offers.len());
    offers
}

/// Reads a non-empty `content` attribute from the first element matching
/// `selector` within `item`.
fn meta_content(item: ElementRef, selector: &scraper::Selector) -> Option<String> {
    item.select(selector)
        .next()
        .and_then(|e| e.value().attr("content"))
        .filter(|c| !c.is_empty())
        .map(String::from)
}

/// Collects and trims the text content of an element.
fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Seller country: the component after the last comma of the first non-empty
/// text node following the seller link (e.g. "Versand von Praha, Tschechien").
fn seller_country(seller: ElementRef) -> Option<String> {
    let mut sibling = seller.next_sibling();
    while let Some(node) = sibling {
        if let Some(text) = node.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.rsplit(',').next().map(|c| c.trim().to_string());
            }
        }
        sibling = node.next_sibling();
    }
    None
}

/// Resolves a possibly-relative href against the site base URL.
fn resolve(base_url: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", base_url, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.abebooks.de";

    const SEARCH_PAGE: &str = r#"
        <html><body>
            <ul>
                <li data-cy="listing-item">
                    <a id="listing-title-1" href="/servlet/BookDetails?bi=111">Book One</a>
                </li>
                <li data-cy="listing-item">
                    <a id="listing-title-2" href="https://www.abebooks.de/servlet/BookDetails?bi=222">Book Two</a>
                    <a id="unrelated-anchor" href="/help">Help</a>
                </li>
                <li>
                    <a id="listing-outside-item" href="/servlet/BookDetails?bi=333">Not a listing item</a>
                </li>
            </ul>
        </body></html>
    "#;

    const BUYING_OPTIONS_PAGE: &str = r#"
        <html><body>
            <ul>
                <li data-cy="listing-item">
                    <meta itemprop="price" content="30.00">
                    <meta itemprop="isbn" content="9780000000001">
                    <span data-cy="listing-title">Die Verwandlung</span>
                    <a data-cy="listing-seller-link">Bookbot</a> Versand von Praha, Tschechien
                </li>
                <li data-cy="listing-item">
                    <meta itemprop="price" content="12.99">
                    <meta itemprop="isbn" content="9780000000002">
                    <span data-cy="listing-title">Der Prozess</span>
                    <a data-cy="listing-seller-link">Antiquariat Mueller</a> Berlin, Deutschland
                </li>
                <li data-cy="listing-item">
                    <meta itemprop="price" content="5.00">
                    <span data-cy="listing-title">No ISBN here</span>
                    <a data-cy="listing-seller-link">Somebody</a> Wien, Oesterreich
                </li>
                <li data-cy="listing-item">
                    <meta itemprop="price" content="7.00">
                    <meta itemprop="isbn" content="">
                    <span data-cy="listing-title">Empty ISBN</span>
                    <a data-cy="listing-seller-link">Somebody Else</a> Graz, Oesterreich
                </li>
            </ul>
        </body></html>
    "#;

    #[test]
    fn test_listing_links_extraction() {
        let links = listing_links(SEARCH_PAGE, BASE);

        assert_eq!(
            links,
            vec![
                "https://www.abebooks.de/servlet/BookDetails?bi=111",
                "https://www.abebooks.de/servlet/BookDetails?bi=222",
            ]
        );
    }

    #[test]
    fn test_listing_links_empty_on_no_matches() {
        let links = listing_links("<html><body><p>Keine Treffer</p></body></html>", BASE);
        assert!(links.is_empty());
    }

    #[test]
    fn test_more_offers_link_present() {
        let html = r#"
            <html><body>
                <hr id="hr1">
                <p>Some intervening sibling</p>
                <div id="more-buying-options">
                    <a id="view-all-listings" href="/servlet/ListingDisplay?bi=111">
                        Alle Angebote ansehen
                    </a>
                </div>
            </body></html>
        "#;

        let link = more_offers_link(html, BASE);
        assert_eq!(link.as_deref(), Some("https://www.abebooks.de/servlet/ListingDisplay?bi=111"));
    }

    #[test]
    fn test_more_offers_link_absent_without_container() {
        let html = r#"<html><body><hr id="hr1"><div id="something-else"></div></body></html>"#;
        assert!(more_offers_link(html, BASE).is_none());
    }

    #[test]
    fn test_more_offers_link_absent_without_divider() {
        let html = r#"
            <html><body>
                <div id="more-buying-options">
                    <a id="view-all-listings" href="/x">Alle Angebote</a>
                </div>
            </body></html>
        "#;
        // Container without the preceding divider does not count.
        assert!(more_offers_link(html, BASE).is_none());
    }

    #[test]
    fn test_offers_extraction() {
        let offers = offers(BUYING_OPTIONS_PAGE, 3);

        assert_eq!(offers.len(), 2);

        assert_eq!(offers[0].isbn, "9780000000001");
        assert_eq!(offers[0].title, "Die Verwandlung");
        assert_eq!(offers[0].provider, "Bookbot");
        assert_eq!(offers[0].country, "Tschechien");
        assert_eq!(offers[0].price, "30.00");
        assert_eq!(offers[0].source_page, 3);

        assert_eq!(offers[1].isbn, "9780000000002");
        assert_eq!(offers[1].provider, "Antiquariat Mueller");
        assert_eq!(offers[1].country, "Deutschland");
    }

    #[test]
    fn test_offers_never_emit_empty_isbn() {
        let offers = offers(BUYING_OPTIONS_PAGE, 0);
        assert!(offers.iter().all(|o| !o.isbn.is_empty()));
    }

    #[test]
    fn test_offers_country_takes_component_after_last_comma() {
        let html = r#"
            <html><body>
                <li data-cy="listing-item">
                    <meta itemprop="price" content="9.00">
                    <meta itemprop="isbn" content="9780000000009">
                    <span data-cy="listing-title">T</span>
                    <a data-cy="listing-seller-link">Seller</a> Shop, Praha 3, Tschechien
                </li>
            </body></html>
        "#;

        let offers = offers(html, 0);
        assert_eq!(offers[0].country, "Tschechien");
    }

    #[test]
    fn test_offers_empty_page() {
        assert!(offers("<html></html>", 0).is_empty());
    }
}
