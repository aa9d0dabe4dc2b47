//! Token-level field extraction for the two tool-using intents.

use concierge_core::config::DEFAULT_PRICE_CAP;

const TAG_KEYWORDS: &[&str] = &["wedding", "midi"];
const ZIP_MIN_DIGITS: usize = 5;
const ZIP_MAX_DIGITS: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct ProductRequest {
    /// The raw message; the catalog search matches its tokens as free text.
    pub query: String,
    pub price_cap: Option<f64>,
    pub tags: Vec<String>,
    /// The shopper said they are between two sizes.
    pub between_sizes: bool,
    pub zip_code: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderRequest {
    pub order_id: Option<String>,
    pub email: Option<String>,
}

impl OrderRequest {
    /// Both identifiers, or `None` when either one is missing.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.order_id.as_deref(), self.email.as_deref()) {
            (Some(order_id), Some(email)) if !order_id.is_empty() && !email.is_empty() => {
                Some((order_id, email))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FieldExtractor {
    default_price_cap: f64,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_CAP)
    }
}

impl FieldExtractor {
    pub fn new(default_price_cap: f64) -> Self {
        Self { default_price_cap }
    }

    pub fn extract_product_request(&self, text: &str) -> ProductRequest {
        ProductRequest {
            query: text.to_string(),
            price_cap: extract_price_cap(text, self.default_price_cap),
            tags: extract_tags(text),
            between_sizes: text.to_lowercase().contains("between"),
            zip_code: extract_zip_code(text),
        }
    }

    pub fn extract_order_request(&self, text: &str) -> OrderRequest {
        extract_order_request(text)
    }
}

/// The first purely numeric token is the cap. Without one, a message that
/// says "under" gets `default_cap`; otherwise there is no cap.
pub fn extract_price_cap(text: &str, default_cap: f64) -> Option<f64> {
    let lowered = text.to_lowercase();
    let explicit = lowered
        .replace(['$', '—'], " ")
        .split_whitespace()
        .map(|token| token.trim_end_matches(['.', ',', '?']))
        .find(|token| is_all_digits(token))
        .and_then(|token| token.parse::<f64>().ok());

    match explicit {
        Some(cap) => Some(cap),
        None if lowered.contains("under") => Some(default_cap),
        None => None,
    }
}

pub fn extract_tags(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TAG_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .map(|keyword| keyword.to_string())
        .collect()
}

/// Concatenates every digit in the message and keeps the first six once at
/// least five are present.
///
/// Digits from other numbers are not separated out: "under $120 ... 560001"
/// yields `120560`, not the postal code.
pub fn extract_zip_code(text: &str) -> String {
    let digits = text.chars().filter(char::is_ascii_digit).collect::<String>();
    if digits.len() >= ZIP_MIN_DIGITS {
        digits[..digits.len().min(ZIP_MAX_DIGITS)].to_string()
    } else {
        digits
    }
}

/// Scans dash-separated tokens for an email (anything containing `@`) and an
/// order id (`A` followed by digits). The last token of each kind wins.
pub fn extract_order_request(text: &str) -> OrderRequest {
    let normalized = text.replace(['—', '-'], " ");
    let mut request = OrderRequest::default();

    for token in normalized.split_whitespace() {
        if token.contains('@') {
            request.email = Some(token.trim_end_matches('.').to_string());
        }
        if let Some(order_id) = order_id_token(token) {
            request.order_id = Some(order_id.to_string());
        }
    }

    request
}

fn order_id_token(token: &str) -> Option<&str> {
    let candidate = token.strip_suffix('.').unwrap_or(token);
    let digits = candidate.strip_prefix(['A', 'a'])?;
    is_all_digits(digits).then_some(candidate)
}

fn is_all_digits(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|character| character.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{
        extract_order_request, extract_price_cap, extract_tags, extract_zip_code, FieldExtractor,
    };

    #[test]
    fn price_cap_reads_explicit_amounts() {
        assert_eq!(extract_price_cap("under $120", 120.0), Some(120.0));
        assert_eq!(extract_price_cap("$45 dress", 120.0), Some(45.0));
        assert_eq!(extract_price_cap("anything around 80, please?", 120.0), Some(80.0));
    }

    #[test]
    fn price_cap_defaults_only_when_under_is_said() {
        assert_eq!(extract_price_cap("under budget", 120.0), Some(120.0));
        assert_eq!(extract_price_cap("Under budget", 95.0), Some(95.0));
        assert_eq!(extract_price_cap("a midi dress", 120.0), None);
    }

    #[test]
    fn price_cap_takes_the_first_numeric_token() {
        assert_eq!(extract_price_cap("under $120 — ETA to 560001?", 99.0), Some(120.0));
        // "$99.50" keeps its inner period, so it is not purely numeric.
        assert_eq!(extract_price_cap("$99.50 or 60", 120.0), Some(60.0));
    }

    #[test]
    fn tags_follow_fixed_order() {
        assert_eq!(extract_tags("MIDI for a Wedding"), vec!["wedding", "midi"]);
        assert_eq!(extract_tags("midi please"), vec!["midi"]);
        assert!(extract_tags("a maxi dress").is_empty());
    }

    #[test]
    fn zip_code_keeps_first_six_of_all_digits() {
        assert_eq!(extract_zip_code("ETA to 560001?"), "560001");
        assert_eq!(extract_zip_code("zip 9411"), "9411");
        assert_eq!(extract_zip_code("no digits here"), "");
    }

    #[test]
    fn zip_code_window_absorbs_a_preceding_price() {
        let zip = extract_zip_code("Wedding guest, midi, under $120 — I’m between M/L. ETA to 560001?");
        assert_eq!(zip, "120560");
    }

    #[test]
    fn order_request_finds_id_and_email() {
        let request = extract_order_request("Cancel order A1003 — email mira@example.com.");
        assert_eq!(request.order_id.as_deref(), Some("A1003"));
        assert_eq!(request.email.as_deref(), Some("mira@example.com"));
        assert_eq!(request.credentials(), Some(("A1003", "mira@example.com")));
    }

    #[test]
    fn order_id_accepts_lowercase_prefix_and_single_trailing_period() {
        let request = extract_order_request("cancel a1002.");
        assert_eq!(request.order_id.as_deref(), Some("a1002"));
        assert_eq!(request.credentials(), None);
    }

    #[test]
    fn other_trailing_punctuation_defeats_the_order_id() {
        assert_eq!(extract_order_request("order A1002?").order_id, None);
        assert_eq!(extract_order_request("order A1002,").order_id, None);
        assert_eq!(extract_order_request("order A").order_id, None);
    }

    #[test]
    fn last_token_of_each_kind_wins() {
        let request =
            extract_order_request("order A1001 or A1002, email old@example.com new@example.com");
        assert_eq!(request.order_id.as_deref(), Some("A1001"));
        assert_eq!(request.email.as_deref(), Some("new@example.com"));

        let request = extract_order_request("order A1001 or A1003");
        assert_eq!(request.order_id.as_deref(), Some("A1003"));
    }

    #[test]
    fn dashes_split_tokens() {
        let request = extract_order_request("order-A1003-mira@example.com");
        assert_eq!(request.credentials(), Some(("A1003", "mira@example.com")));
    }

    #[test]
    fn product_request_collects_all_fields() {
        let extractor = FieldExtractor::default();
        let request = extractor
            .extract_product_request("Wedding guest, midi, under $120 — I’m between M/L. ETA to 560001?");

        assert_eq!(request.price_cap, Some(120.0));
        assert_eq!(request.tags, vec!["wedding", "midi"]);
        assert!(request.between_sizes);
        assert_eq!(request.zip_code, "120560");
        assert!(request.query.starts_with("Wedding guest"));
    }
}
