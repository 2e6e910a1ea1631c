//! Page URL construction for each pagination style

#![allow(clippy::uninlined_format_args)]

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::domain::sites::PaginationStyle;

static PAGE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/page/\d+").expect("valid page segment regex"));

/// URL of page `page` (1-based) of a site's search results
///
/// Page 1 is always the search URL itself.
pub fn page_url(base: &str, page: u32, style: PaginationStyle) -> String {
    if page <= 1 {
        return base.to_string();
    }

    let Ok(mut url) = Url::parse(base) else {
        return fallback_page_url(base, page, style);
    };

    match style {
        PaginationStyle::QueryP => set_query_param(&mut url, "p", page),
        PaginationStyle::QueryPage => set_query_param(&mut url, "page", page),
        PaginationStyle::PathSegment => {
            if PAGE_SEGMENT.is_match(url.path()) {
                let path = PAGE_SEGMENT
                    .replace(url.path(), format!("/page/{}", page).as_str())
                    .into_owned();
                url.set_path(&path);
            } else if url.query_pairs().any(|(key, _)| key == "page") {
                set_query_param(&mut url, "page", page);
            } else if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push("page").push(&page.to_string());
            }
        }
    }

    url.into()
}

/// Replace `key` in place if present, otherwise append it
fn set_query_param(url: &mut Url, key: &str, page: u32) {
    let value = page.to_string();
    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == key {
                replaced = true;
                (k.into_owned(), value.clone())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    let mut query = url.query_pairs_mut();
    query.clear();
    for (k, v) in &pairs {
        query.append_pair(k, v);
    }
    if !replaced {
        query.append_pair(key, &value);
    }
}

/// String-level rewrite for bases that are not absolute URLs
fn fallback_page_url(base: &str, page: u32, style: PaginationStyle) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    match style {
        PaginationStyle::QueryP => format!("{}{}p={}", base, separator, page),
        PaginationStyle::QueryPage => format!("{}{}page={}", base, separator, page),
        PaginationStyle::PathSegment if PAGE_SEGMENT.is_match(base) => PAGE_SEGMENT
            .replace(base, format!("/page/{}", page).as_str())
            .into_owned(),
        PaginationStyle::PathSegment => format!("{}/page/{}", base.trim_end_matches('/'), page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PaginationStyle::QueryPage)]
    #[case(PaginationStyle::QueryP)]
    #[case(PaginationStyle::PathSegment)]
    fn first_page_is_the_search_url(#[case] style: PaginationStyle) {
        let base = "https://www.daraz.pk/catalog/?q=coffee";
        assert_eq!(page_url(base, 1, style), base);
    }

    #[rstest]
    #[case("https://www.daraz.pk/catalog/?q=coffee", "https://www.daraz.pk/catalog/?q=coffee&page=2")]
    #[case("https://shop.pk/search?q=coffee&page=4", "https://shop.pk/search?q=coffee&page=2")]
    #[case("https://shop.pk/coffee", "https://shop.pk/coffee?page=2")]
    fn query_page_style(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(page_url(base, 2, PaginationStyle::QueryPage), expected);
    }

    #[test]
    fn query_p_style_joins_existing_query() {
        assert_eq!(
            page_url("https://www.naheed.pk/catalogsearch/result/?q=coffee", 3, PaginationStyle::QueryP),
            "https://www.naheed.pk/catalogsearch/result/?q=coffee&p=3"
        );
        assert_eq!(
            page_url("https://www.naheed.pk/catalogsearch/result/?q=coffee&p=2", 3, PaginationStyle::QueryP),
            "https://www.naheed.pk/catalogsearch/result/?q=coffee&p=3"
        );
    }

    #[rstest]
    #[case("https://www.alibaba.com/trade/search/page/1?SearchText=coffee", "https://www.alibaba.com/trade/search/page/2?SearchText=coffee")]
    #[case("https://www.alibaba.com/trade/search?SearchText=coffee&page=1", "https://www.alibaba.com/trade/search?SearchText=coffee&page=2")]
    #[case("https://www.alibaba.com/trade/search?SearchText=coffee", "https://www.alibaba.com/trade/search/page/2?SearchText=coffee")]
    fn path_segment_style(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(page_url(base, 2, PaginationStyle::PathSegment), expected);
    }

    #[test]
    fn relative_bases_use_string_rewrites() {
        assert_eq!(page_url("/search?q=coffee", 2, PaginationStyle::QueryPage), "/search?q=coffee&page=2");
        assert_eq!(page_url("/search/", 2, PaginationStyle::PathSegment), "/search/page/2");
    }
}
