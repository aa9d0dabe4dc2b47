use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtaWindow {
    pub days_min: u32,
    pub days_max: u32,
}

const METRO_WINDOW: EtaWindow = EtaWindow { days_min: 2, days_max: 5 };
const REGIONAL_WINDOW: EtaWindow = EtaWindow { days_min: 3, days_max: 6 };
const DEFAULT_WINDOW: EtaWindow = EtaWindow { days_min: 4, days_max: 7 };

/// Delivery window bucketed by the leading digit of the postal code.
pub fn eta(zip_code: &str) -> EtaWindow {
    match zip_code.chars().next().and_then(|lead| lead.to_digit(10)) {
        Some(5 | 6) => METRO_WINDOW,
        Some(1..=4) => REGIONAL_WINDOW,
        _ => DEFAULT_WINDOW,
    }
}
