use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRequest {
    /// The two sizes the shopper says they are between, e.g. `M/L`; empty when unstated.
    pub between: String,
    pub available_sizes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeAdvice {
    pub recommended: Option<String>,
    pub rationale: String,
}

impl SizeAdvice {
    fn pick(size: &str, rationale: &str) -> Self {
        Self { recommended: Some(size.to_string()), rationale: rationale.to_string() }
    }
}

pub fn recommend_size(request: &SizeRequest) -> SizeAdvice {
    let between = request.between.to_uppercase();
    let available = request.available_sizes.iter().map(|size| size.to_uppercase()).collect::<Vec<_>>();
    let has = |size: &str| available.iter().any(|candidate| candidate == size);

    if between == "M/L" {
        match (has("M"), has("L")) {
            (true, true) => {
                return SizeAdvice::pick("M", "Between M/L; our cut runs true to size, so M fits most.")
            }
            (true, false) => return SizeAdvice::pick("M", "Between M/L; L unavailable here."),
            (false, true) => return SizeAdvice::pick("L", "Between M/L; M unavailable here."),
            (false, false) => {}
        }
    }

    if has("M") {
        return SizeAdvice::pick("M", "Default to M when unsure.");
    }
    match available.first() {
        Some(first) => SizeAdvice::pick(first, "Select first available size."),
        None => SizeAdvice { recommended: None, rationale: "No sizes available.".to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::{recommend_size, SizeRequest};

    fn request(between: &str, sizes: &[&str]) -> SizeRequest {
        SizeRequest {
            between: between.to_string(),
            available_sizes: sizes.iter().map(|size| size.to_string()).collect(),
        }
    }

    #[test]
    fn between_m_and_l_with_both_available_prefers_m() {
        let advice = recommend_size(&request("M/L", &["L", "M"]));
        assert_eq!(advice.recommended.as_deref(), Some("M"));
        assert!(advice.rationale.contains("true to size"));
    }

    #[test]
    fn between_m_and_l_with_only_l_recommends_l() {
        let advice = recommend_size(&request("m/l", &["L"]));
        assert_eq!(advice.recommended.as_deref(), Some("L"));
        assert_eq!(advice.rationale, "Between M/L; M unavailable here.");
    }

    #[test]
    fn between_m_and_l_with_only_m_recommends_m() {
        let advice = recommend_size(&request("M/L", &["m", "S"]));
        assert_eq!(advice.recommended.as_deref(), Some("M"));
        assert_eq!(advice.rationale, "Between M/L; L unavailable here.");
    }

    #[test]
    fn no_sizes_recommends_nothing() {
        let advice = recommend_size(&request("M/L", &[]));
        assert_eq!(advice.recommended, None);
        assert_eq!(advice.rationale, "No sizes available.");
    }

    #[test]
    fn without_between_falls_back_to_m_then_first_available() {
        assert_eq!(recommend_size(&request("", &["S", "M"])).recommended.as_deref(), Some("M"));

        let advice = recommend_size(&request("", &["xl", "S"]));
        assert_eq!(advice.recommended.as_deref(), Some("XL"));
        assert_eq!(advice.rationale, "Select first available size.");
    }
}
