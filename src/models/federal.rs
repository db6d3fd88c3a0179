//! Federal agency classification.
//!
//! Stands in for the platform's funder classifier: federal agencies get a
//! fiscal-calendar alignment pass during prediction, other funders do not.

/// Name fragments that identify U.S. federal funding agencies.
const FEDERAL_MARKERS: &[&str] = &[
    "national institutes of health",
    "national science foundation",
    "department of",
    "national aeronautics",
    "environmental protection agency",
    "centers for disease control",
    "national endowment",
    "nih",
    "nsf",
    "nasa",
    "doe",
    "dod",
    "darpa",
    "usda",
    "epa",
    "cdc",
    "federal",
];

/// Whether a funder name identifies a U.S. federal agency.
///
/// Short acronyms must appear as standalone tokens so that e.g. a private
/// foundation whose name merely contains "nsf" as a substring of a longer
/// word is not misclassified.
pub fn is_federal_funder(name: &str) -> bool {
    let lowered = name.to_lowercase();
    FEDERAL_MARKERS.iter().any(|marker| {
        if marker.len() <= 5 {
            lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == *marker)
        } else {
            lowered.contains(marker)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_federal_full_names() {
        assert!(is_federal_funder("National Science Foundation"));
        assert!(is_federal_funder("National Institutes of Health"));
        assert!(is_federal_funder("Department of Energy"));
    }

    #[test]
    fn test_federal_acronyms() {
        assert!(is_federal_funder("NSF Biology"));
        assert!(is_federal_funder("NIH NIGMS"));
        assert!(is_federal_funder("DARPA"));
    }

    #[test]
    fn test_non_federal() {
        assert!(!is_federal_funder("Wellcome Trust"));
        assert!(!is_federal_funder("Gates Foundation"));
        assert!(!is_federal_funder("Transfer Fund")); // contains "nsf" only inside a word
    }
}
