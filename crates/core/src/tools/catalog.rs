use std::cmp::Ordering;

use crate::domain::product::Product;

/// Filters the catalog by price cap, free text and tags, then orders the hits
/// by ascending price with title as the tie-breaker.
///
/// Free text matches when any whitespace token of the lowercased query occurs
/// inside the product haystack. An empty query disables the text filter.
pub fn product_search(
    products: &[Product],
    query: &str,
    price_max: Option<f64>,
    tags: Option<&[String]>,
) -> Vec<Product> {
    let query = query.to_lowercase();
    let query_tokens = query.split_whitespace().collect::<Vec<_>>();
    let required_tags = tags.unwrap_or_default();

    let mut results = products
        .iter()
        .filter(|product| price_max.map_or(true, |cap| product.price <= cap))
        .filter(|product| {
            if query_tokens.is_empty() {
                return true;
            }
            let haystack = product.search_haystack();
            query_tokens.iter().any(|token| haystack.contains(token))
        })
        .filter(|product| product.has_tags(required_tags))
        .cloned()
        .collect::<Vec<_>>();

    results.sort_by(by_price_then_title);
    results
}

fn by_price_then_title(left: &Product, right: &Product) -> Ordering {
    left.price.total_cmp(&right.price).then_with(|| left.title.cmp(&right.title))
}

#[cfg(test)]
mod tests {
    use super::product_search;
    use crate::domain::product::{Product, ProductId};

    fn product(id: &str, title: &str, price: f64, tags: &[&str]) -> Product {
        Product {
            id: ProductId(id.to_string()),
            title: title.to_string(),
            price,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            sizes: vec!["M".to_string()],
            color: "navy".to_string(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("P1", "Pleated Midi Dress", 135.0, &["wedding", "midi"]),
            product("P2", "Wrap Midi Dress", 89.0, &["wedding", "midi"]),
            product("P3", "Slip Dress", 72.0, &["party"]),
            product("P4", "Apron Midi Dress", 89.0, &["wedding", "midi"]),
        ]
    }

    fn ids(results: &[Product]) -> Vec<&str> {
        results.iter().map(|product| product.id.0.as_str()).collect()
    }

    #[test]
    fn price_cap_and_tags_filter_then_sort_by_price_and_title() {
        let tags = vec!["wedding".to_string(), "midi".to_string()];
        let results = product_search(&catalog(), "midi dress", Some(120.0), Some(&tags));

        assert_eq!(ids(&results), vec!["P4", "P2"]);
    }

    #[test]
    fn empty_query_and_no_cap_returns_everything_sorted() {
        let results = product_search(&catalog(), "", None, None);
        assert_eq!(ids(&results), vec!["P3", "P4", "P2", "P1"]);
    }

    #[test]
    fn query_without_matching_token_yields_nothing() {
        let results = product_search(&catalog(), "sneakers", None, None);
        assert!(results.is_empty());
    }

    #[test]
    fn any_matching_token_is_enough() {
        let results = product_search(&catalog(), "SLIP boots", None, None);
        assert_eq!(ids(&results), vec!["P3"]);
    }

    #[test]
    fn cap_is_inclusive() {
        let results = product_search(&catalog(), "", Some(72.0), None);
        assert_eq!(ids(&results), vec!["P3"]);
    }
}
