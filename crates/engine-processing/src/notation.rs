use model::notation::{ExclusionReason, NotationDecision};

/// Interprets one raw quantity cell under GHG notation-key convention.
///
/// Recognized tokens (case-insensitive): NO (not occurring), NA (not
/// applicable), IE (included elsewhere), NE (not estimated), C
/// (confidential). These resolve to a null quantity tagged as excluded from
/// totals, never to zero. Anything else that does not parse as a number is
/// `Unresolved`, including blanks.
pub struct NotationResolver;

impl NotationResolver {
    pub fn resolve(raw: &str) -> NotationDecision {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return NotationDecision::Unresolved;
        }

        if let Some(value) = parse_numeric(trimmed) {
            return NotationDecision::Numeric(value);
        }

        match trimmed.to_ascii_uppercase().as_str() {
            "NO" | "NA" | "IE" => NotationDecision::Excluded(ExclusionReason::NotApplicable),
            "NE" => NotationDecision::Excluded(ExclusionReason::NotEstimated),
            "C" => NotationDecision::Excluded(ExclusionReason::Confidential),
            _ => NotationDecision::Unresolved,
        }
    }

    /// Whether an unresolved value at least looks like a notation token, so
    /// the validator can report it as such instead of as a garbled number.
    pub fn looks_like_token(raw: &str) -> bool {
        let trimmed = raw.trim();
        !trimmed.is_empty()
            && trimmed.len() <= 2
            && trimmed.chars().all(|c| c.is_ascii_alphabetic())
    }
}

fn parse_numeric(raw: &str) -> Option<f64> {
    // Tolerate thousands separators: "1,500" is a number, "1,500 kWh" is not.
    let compact: String = raw.chars().filter(|c| *c != ',').collect();
    compact.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
