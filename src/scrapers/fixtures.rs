//! Catalogue markup in the shape books.toscrape.com serves, for tests.

pub const RATING_LABELS: [&str; 5] = ["One", "Two", "Three", "Four", "Five"];

pub struct ListingMarkup<'a> {
    pub title: &'a str,
    pub href: &'a str,
    pub price: Option<&'a str>,
    pub rating_class: &'a str,
    pub availability: Option<&'a str>,
    pub image_src: &'a str,
}

impl ListingMarkup<'_> {
    pub fn render(&self) -> String {
        let price = self
            .price
            .map(|p| format!(r#"<p class="price_color">{}</p>"#, p))
            .unwrap_or_default();
        let availability = self
            .availability
            .map(|a| format!("<p class=\"instock availability\">\n    <i class=\"icon-ok\"></i>\n    {}\n</p>", a))
            .unwrap_or_default();

        format!(
            r#"<article class="product_pod">
    <div class="image_container">
        <a href="{href}"><img src="{img}" alt="{title}" class="thumbnail"></a>
    </div>
    <p class="{rating}">
        <i class="icon-star"></i><i class="icon-star"></i><i class="icon-star"></i>
    </p>
    <h3><a href="{href}" title="{title}">{title}</a></h3>
    <div class="product_price">
        {price}
        {availability}
    </div>
</article>"#,
            href = self.href,
            img = self.image_src,
            title = self.title,
            rating = self.rating_class,
            price = price,
            availability = availability,
        )
    }
}

pub fn book_title(page: u32, index: usize) -> String {
    format!("Book {} of page {}", index, page)
}

/// A well-formed listing; the rating cycles through the five labels.
pub fn listing(page: u32, index: usize) -> String {
    listing_with_price(page, index, Some("£12.50"))
}

pub fn listing_with_price(page: u32, index: usize, price: Option<&str>) -> String {
    let title = book_title(page, index);
    let href = format!("book-{}-{}_{}/index.html", page, index, page as usize * 100 + index);
    let rating_class = format!("star-rating {}", RATING_LABELS[index % RATING_LABELS.len()]);
    let image_src = format!("../media/cache/{:02}/{:02}/cover.jpg", page, index);

    ListingMarkup {
        title: &title,
        href: &href,
        price,
        rating_class: &rating_class,
        availability: Some("In stock"),
        image_src: &image_src,
    }
    .render()
}

/// Wrap listings in the catalogue page chrome, with a pager.
pub fn catalog_page(listings: &[String], page: u32, has_next: bool) -> String {
    let items: String = listings
        .iter()
        .map(|l| format!(r#"<li class="col-xs-6 col-sm-4 col-md-3 col-lg-3">{}</li>"#, l))
        .collect();
    let next = if has_next {
        format!(r#"<li class="next"><a href="page-{}.html">next</a></li>"#, page + 1)
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en-us">
<head><title>All products | Books to Scrape - Sandbox</title></head>
<body>
<section>
    <ol class="row">{items}</ol>
    <div>
        <ul class="pager">
            <li class="current">Page {page} of 50</li>
            {next}
        </ul>
    </div>
</section>
</body>
</html>"#,
        items = items,
        page = page,
        next = next,
    )
}

/// A page of `count` well-formed listings.
pub fn full_page(page: u32, count: usize, has_next: bool) -> String {
    let listings: Vec<String> = (0..count).map(|i| listing(page, i)).collect();
    catalog_page(&listings, page, has_next)
}
