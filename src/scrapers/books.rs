use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::{BookListing, Rating};
use crate::parsers::{clean_text, parse_availability, parse_price, resolve_url};
use crate::scrapers::ExtractError;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {:?}: {:?}", css, e))
}

static LISTING: Lazy<Selector> = Lazy::new(|| selector("article.product_pod"));
static NEXT_PAGE: Lazy<Selector> = Lazy::new(|| selector("ul.pager li.next a"));
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| selector("h3 a"));
static PRICE: Lazy<Selector> = Lazy::new(|| selector("p.price_color"));
static STAR_RATING: Lazy<Selector> = Lazy::new(|| selector("p.star-rating"));
static AVAILABILITY: Lazy<Selector> = Lazy::new(|| selector("p.availability"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img"));

/// Outcome of parsing one catalogue page: one entry per listing container,
/// in page order.
#[derive(Debug)]
pub struct CatalogPage {
    pub listings: Vec<Result<BookListing, ExtractError>>,
    pub has_next: bool,
}

/// Split a catalogue page into listings and extract each one. References are
/// resolved against `page_url`.
pub fn scrape_catalog_page(html: &str, page_url: &Url) -> CatalogPage {
    let document = Html::parse_document(html);

    let listings = document
        .select(&LISTING)
        .map(|fragment| extract_listing(fragment, page_url))
        .collect();
    let has_next = document.select(&NEXT_PAGE).next().is_some();

    CatalogPage { listings, has_next }
}

/// Build a [`BookListing`] from one `article.product_pod` fragment.
pub fn extract_listing(fragment: ElementRef<'_>, base: &Url) -> Result<BookListing, ExtractError> {
    let link = fragment
        .select(&TITLE_LINK)
        .next()
        .ok_or(ExtractError::MissingField("title"))?;

    // The link text is truncated with "..." on the listing page; the title
    // attribute carries the full name.
    let title = link
        .value()
        .attr("title")
        .map(clean_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| element_text(link));
    if title.is_empty() {
        return Err(ExtractError::MissingField("title"));
    }

    let href = link
        .value()
        .attr("href")
        .ok_or(ExtractError::MissingField("product_url"))?;
    let product_url = resolve_reference(base, href, "product_url")?;

    let price_text = fragment
        .select(&PRICE)
        .next()
        .map(element_text)
        .filter(|p| !p.is_empty())
        .ok_or(ExtractError::MissingField("price"))?;
    let price = parse_price(&price_text).ok_or(ExtractError::InvalidPrice(price_text))?;

    let rating = extract_rating(fragment)?;

    let availability_text = fragment.select(&AVAILABILITY).next().map(element_text);
    let availability = parse_availability(availability_text.as_deref());

    let src = fragment
        .select(&IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or(ExtractError::MissingField("image_url"))?;
    let image_url = resolve_reference(base, src, "image_url")?;

    Ok(BookListing {
        title,
        price,
        rating,
        availability,
        product_url,
        image_url,
    })
}

/// The rating is a second class on the paragraph, e.g. `star-rating Three`.
fn extract_rating(fragment: ElementRef<'_>) -> Result<Rating, ExtractError> {
    let element = fragment
        .select(&STAR_RATING)
        .next()
        .ok_or(ExtractError::MissingField("rating"))?;

    let labels: Vec<&str> = element
        .value()
        .classes()
        .filter(|class| *class != "star-rating")
        .collect();

    labels
        .iter()
        .find_map(|label| Rating::from_label(label))
        .ok_or_else(|| ExtractError::UnknownRating(labels.join(" ")))
}

fn resolve_reference(base: &Url, reference: &str, field: &'static str) -> Result<String, ExtractError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ExtractError::MissingField(field));
    }
    resolve_url(base, reference)
        .map(|url| url.to_string())
        .map_err(|source| ExtractError::InvalidUrl {
            field,
            reference: reference.to_string(),
            source,
        })
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Availability;
    use crate::scrapers::fixtures::{self, ListingMarkup, RATING_LABELS};
    use pretty_assertions::assert_eq;

    fn page_url() -> Url {
        Url::parse("https://books.toscrape.com/catalogue/page-1.html").unwrap()
    }

    fn extract_one(markup: &str) -> Result<BookListing, ExtractError> {
        let document = Html::parse_fragment(markup);
        let fragment = document.select(&LISTING).next().expect("fixture has a listing");
        extract_listing(fragment, &page_url())
    }

    fn attic() -> ListingMarkup<'static> {
        ListingMarkup {
            title: "A Light in the Attic",
            href: "a-light-in-the-attic_1000/index.html",
            price: Some("£51.77"),
            rating_class: "star-rating Three",
            availability: Some("In stock"),
            image_src: "../media/cache/2c/da/2cdad67c44b002e7ead0cc35693c0e8b.jpg",
        }
    }

    #[test]
    fn extracts_all_fields() {
        let listing = extract_one(&attic().render()).unwrap();

        assert_eq!(
            listing,
            BookListing {
                title: "A Light in the Attic".to_string(),
                price: "£51.77".parse().unwrap(),
                rating: Rating::from_label("Three").unwrap(),
                availability: Availability::InStock,
                product_url: "https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html".to_string(),
                image_url: "https://books.toscrape.com/media/cache/2c/da/2cdad67c44b002e7ead0cc35693c0e8b.jpg".to_string(),
            }
        );
    }

    #[test]
    fn every_rating_label_maps_to_its_number() {
        for (stars, label) in (1u8..=5).zip(RATING_LABELS) {
            let class = format!("star-rating {}", label);
            let markup = ListingMarkup { rating_class: &class, ..attic() }.render();
            assert_eq!(extract_one(&markup).unwrap().rating.stars(), stars);
        }
    }

    #[test]
    fn unknown_rating_label_fails_the_listing() {
        let markup = ListingMarkup { rating_class: "star-rating Six", ..attic() }.render();
        assert_eq!(extract_one(&markup), Err(ExtractError::UnknownRating("Six".to_string())));

        let markup = ListingMarkup { rating_class: "star-rating", ..attic() }.render();
        assert_eq!(extract_one(&markup), Err(ExtractError::UnknownRating(String::new())));
    }

    #[test]
    fn missing_price_fails_the_listing() {
        let markup = ListingMarkup { price: None, ..attic() }.render();
        assert_eq!(extract_one(&markup), Err(ExtractError::MissingField("price")));
    }

    #[test]
    fn malformed_price_fails_the_listing() {
        let markup = ListingMarkup { price: Some("call us"), ..attic() }.render();
        assert_eq!(extract_one(&markup), Err(ExtractError::InvalidPrice("call us".to_string())));
    }

    #[test]
    fn missing_availability_is_unknown_not_a_failure() {
        let markup = ListingMarkup { availability: None, ..attic() }.render();
        assert_eq!(extract_one(&markup).unwrap().availability, Availability::Unknown);

        let markup = ListingMarkup { availability: Some("Out of stock"), ..attic() }.render();
        assert_eq!(extract_one(&markup).unwrap().availability, Availability::OutOfStock);
    }

    #[test]
    fn absolute_references_are_kept() {
        let markup = ListingMarkup {
            href: "https://mirror.example.com/books/attic.html",
            image_src: "https://cdn.example.com/attic.jpg",
            ..attic()
        }
        .render();
        let listing = extract_one(&markup).unwrap();
        assert_eq!(listing.product_url, "https://mirror.example.com/books/attic.html");
        assert_eq!(listing.image_url, "https://cdn.example.com/attic.jpg");
    }

    #[test]
    fn entities_in_title_are_decoded() {
        let markup = ListingMarkup { title: "Tipping the Velvet &amp; Co", ..attic() }.render();
        assert_eq!(extract_one(&markup).unwrap().title, "Tipping the Velvet & Co");
    }

    #[test]
    fn entities_in_title_are_decoded_exactly_once() {
        let markup = ListingMarkup { title: "Fish &amp;lt;3 Chips", ..attic() }.render();
        assert_eq!(extract_one(&markup).unwrap().title, "Fish &lt;3 Chips");
    }

    #[test]
    fn missing_image_fails_the_listing() {
        let markup = attic().render().replace(
            r#"<img src="../media/cache/2c/da/2cdad67c44b002e7ead0cc35693c0e8b.jpg" alt="A Light in the Attic" class="thumbnail">"#,
            "",
        );
        assert_eq!(extract_one(&markup), Err(ExtractError::MissingField("image_url")));
    }

    #[test]
    fn extraction_is_idempotent() {
        let markup = attic().render();
        assert_eq!(extract_one(&markup), extract_one(&markup));
    }

    #[test]
    fn page_yields_listings_in_order_with_failures_isolated() {
        let mut listings: Vec<String> = (0..20).map(|i| fixtures::listing(1, i)).collect();
        listings[7] = fixtures::listing_with_price(1, 7, None);
        let html = fixtures::catalog_page(&listings, 1, true);

        let page = scrape_catalog_page(&html, &page_url());

        assert_eq!(page.listings.len(), 20);
        assert!(page.has_next);
        assert_eq!(page.listings[7], Err(ExtractError::MissingField("price")));
        let good: Vec<&BookListing> = page.listings.iter().filter_map(|l| l.as_ref().ok()).collect();
        assert_eq!(good.len(), 19);
        assert_eq!(good[0].title, fixtures::book_title(1, 0));
        assert_eq!(good[18].title, fixtures::book_title(1, 19));
    }

    #[test]
    fn last_page_has_no_next_link() {
        let html = fixtures::full_page(50, 20, false);
        let page = scrape_catalog_page(&html, &page_url());
        assert!(!page.has_next);
        assert!(page.listings.iter().all(Result::is_ok));
    }

    #[test]
    fn page_without_listings_is_empty() {
        let page = scrape_catalog_page("<html><body><p>Not found</p></body></html>", &page_url());
        assert!(page.listings.is_empty());
        assert!(!page.has_next);
    }
}
