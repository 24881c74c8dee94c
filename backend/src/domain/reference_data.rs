//! Static reference lists the platform validates against.
//!
//! Lookups are case-insensitive and return the canonical spelling so stored
//! values stay consistent regardless of how clients capitalise them.

use crate::domain::validation::ValidationError;

/// The 36 Nigerian states plus the Federal Capital Territory.
pub const NIGERIAN_STATES: [&str; 37] = [
    "Abia",
    "Adamawa",
    "Akwa Ibom",
    "Anambra",
    "Bauchi",
    "Bayelsa",
    "Benue",
    "Borno",
    "Cross River",
    "Delta",
    "Ebonyi",
    "Edo",
    "Ekiti",
    "Enugu",
    "FCT",
    "Gombe",
    "Imo",
    "Jigawa",
    "Kaduna",
    "Kano",
    "Katsina",
    "Kebbi",
    "Kogi",
    "Kwara",
    "Lagos",
    "Nasarawa",
    "Niger",
    "Ogun",
    "Ondo",
    "Osun",
    "Oyo",
    "Plateau",
    "Rivers",
    "Sokoto",
    "Taraba",
    "Yobe",
    "Zamfara",
];

/// Competitions a fixture may belong to.
pub const COMPETITIONS: [&str; 10] = [
    "NPFL",
    "NNL",
    "NLO",
    "NWFL Premiership",
    "Federation Cup",
    "CAF Champions League",
    "CAF Confederation Cup",
    "Super Eagles",
    "Super Falcons",
    "Friendly",
];

/// Competition assigned when a fixture is created without one.
pub const DEFAULT_COMPETITION: &str = "NPFL";

fn canonical(list: &[&'static str], value: &str) -> Option<&'static str> {
    let needle = value.trim();
    list.iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(needle))
}

/// Resolve a Nigerian state, accepting `Abuja` as an alias for the FCT.
///
/// # Examples
/// ```
/// use pitchside::domain::reference_data::nigerian_state;
///
/// assert_eq!(nigerian_state("state", "lagos").unwrap(), "Lagos");
/// assert!(nigerian_state("state", "Accra").is_err());
/// ```
pub fn nigerian_state(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = if value.trim().eq_ignore_ascii_case("abuja") {
        "FCT"
    } else {
        value
    };
    canonical(&NIGERIAN_STATES, value)
        .map(str::to_owned)
        .ok_or_else(|| ValidationError::invalid(field, "must be a Nigerian state"))
}

/// Resolve a competition name, defaulting to [`DEFAULT_COMPETITION`].
pub fn competition(value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(DEFAULT_COMPETITION.to_owned()),
        Some(v) => canonical(&COMPETITIONS, v)
            .map(str::to_owned)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "competition",
                expected: COMPETITIONS.join(", "),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Lagos", "Lagos")]
    #[case(" akwa ibom ", "Akwa Ibom")]
    #[case("Abuja", "FCT")]
    #[case("fct", "FCT")]
    fn resolves_states(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(nigerian_state("state", raw).expect("known state"), expected);
    }

    #[rstest]
    #[case("Accra")]
    #[case("")]
    fn rejects_unknown_states(#[case] raw: &str) {
        let err = nigerian_state("state", raw).expect_err("unknown state");
        assert_eq!(err.field(), "state");
    }

    #[rstest]
    fn competition_defaults_to_npfl() {
        assert_eq!(competition(None).expect("default"), "NPFL");
        assert_eq!(competition(Some("  ")).expect("default"), "NPFL");
    }

    #[rstest]
    fn competition_is_canonicalised() {
        assert_eq!(
            competition(Some("federation cup")).expect("known"),
            "Federation Cup"
        );
        assert!(competition(Some("Premier League")).is_err());
    }
}
