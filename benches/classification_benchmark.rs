//! Classification and listing-parse throughput
//!
//! Every scraped card goes through the relevance filter, price cleaning and
//! the brand/type/packaging extractors, so these run once per product.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use coffee_market_collector::domain::classification::{
    build_product, clean_price, extract_packaging, is_coffee_product, PriceTierThresholds,
    RawListing,
};
use coffee_market_collector::domain::sites::default_sites;
use coffee_market_collector::infrastructure::parsing::ListingParser;
use coffee_market_collector::infrastructure::sample_data::{sample_profile, synthetic_page, SAMPLE_LISTINGS};

const NAMES: &[&str] = &[
    "Nescafe Classic Instant Coffee 200g",
    "Lavazza Qualita Oro Ground Coffee 1kg",
    "Ceramic Coffee Mug Set of 6",
    "Nescafe 3 in 1 Instant Coffee Mix 30 Sticks",
    "Kauphy Italian Roast Coffee Beans 250g",
    "Electric Coffee Grinder Stainless Steel",
];

const PRICES: &[&str] = &["Rs. 950", "PKR1,250", "₨ 450", "Rs. 12,499", "garbage"];

fn classification(c: &mut Criterion) {
    let thresholds = PriceTierThresholds::default();

    c.bench_function("is_coffee_product", |b| {
        b.iter(|| {
            for name in NAMES {
                black_box(is_coffee_product(black_box(name)));
            }
        });
    });

    c.bench_function("clean_price", |b| {
        b.iter(|| {
            for price in PRICES {
                black_box(clean_price(black_box(price)));
            }
        });
    });

    c.bench_function("extract_packaging", |b| {
        b.iter(|| {
            for name in NAMES {
                black_box(extract_packaging(black_box(name)));
            }
        });
    });

    c.bench_function("build_product", |b| {
        b.iter(|| {
            for (name, price, rating, reviews_count) in SAMPLE_LISTINGS {
                black_box(build_product(
                    RawListing {
                        name: name.to_string(),
                        price,
                        rating,
                        reviews_count,
                    },
                    "daraz.pk",
                    &thresholds,
                ));
            }
        });
    });
}

fn listing_parse(c: &mut Criterion) {
    let parser = ListingParser::for_site(&sample_profile(&default_sites()[0]))
        .expect("sample profile selectors compile");
    let html = synthetic_page("https://www.daraz.pk/catalog/?q=coffee");

    c.bench_function("parse_sample_page", |b| {
        b.iter(|| black_box(parser.parse_page(black_box(&html))));
    });
}

criterion_group!(benches, classification, listing_parse);
criterion_main!(benches);
