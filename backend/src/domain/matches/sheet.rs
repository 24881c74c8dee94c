//! Team sheets and match statistics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::matches::event::PLAYER_NAME_MAX;
use crate::domain::validation::{ValidationError, bounded_text};

/// Players named in a starting eleven.
pub const STARTING_XI_MAX: usize = 11;
/// Players named on the bench.
pub const SUBSTITUTES_MAX: usize = 12;

/// One side's team sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamLineup {
    #[schema(example = "4-3-3")]
    pub formation: String,
    pub starting_xi: Vec<String>,
    #[serde(default)]
    pub substitutes: Vec<String>,
}

impl TeamLineup {
    fn validated(self, side: &'static str) -> Result<Self, ValidationError> {
        let formation = formation(side, &self.formation)?;
        let starting_xi = players(side, self.starting_xi, STARTING_XI_MAX)?;
        let substitutes = players(side, self.substitutes, SUBSTITUTES_MAX)?;
        Ok(Self {
            formation,
            starting_xi,
            substitutes,
        })
    }
}

/// Team sheets for both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Lineups {
    pub home: TeamLineup,
    pub away: TeamLineup,
}

impl Lineups {
    /// Validate both team sheets.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            home: self.home.validated("lineups.home")?,
            away: self.away.validated("lineups.away")?,
        })
    }
}

/// Formations are outfield lines such as `4-4-2` or `3-4-2-1` adding up to ten.
fn formation(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let lines: Option<Vec<u32>> = trimmed
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => ch.to_digit(10).filter(|d| *d > 0),
                _ => None,
            }
        })
        .collect();
    match lines {
        Some(lines) if (2..=5).contains(&lines.len()) && lines.iter().sum::<u32>() == 10 => {
            Ok(trimmed.to_owned())
        }
        _ => Err(ValidationError::invalid(
            field,
            "formation must list outfield lines adding up to ten, e.g. 4-3-3",
        )),
    }
}

fn players(
    field: &'static str,
    names: Vec<String>,
    max: usize,
) -> Result<Vec<String>, ValidationError> {
    if names.len() > max {
        return Err(ValidationError::TooMany { field, max });
    }
    names
        .iter()
        .map(|name| bounded_text(field, name, 1, PLAYER_NAME_MAX))
        .collect()
}

/// One side's match statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamStats {
    /// Percentage of possession, 0 to 100.
    pub possession: u8,
    pub shots: u16,
    pub shots_on_target: u16,
    pub corners: u16,
    pub fouls: u16,
    pub offsides: u16,
    pub yellow_cards: u16,
    pub red_cards: u16,
}

impl TeamStats {
    fn check(&self, field: &'static str) -> Result<(), ValidationError> {
        if self.possession > 100 {
            return Err(ValidationError::OutOfRange {
                field,
                min: 0,
                max: 100,
            });
        }
        if self.shots_on_target > self.shots {
            return Err(ValidationError::invalid(
                field,
                "shotsOnTarget cannot exceed shots",
            ));
        }
        Ok(())
    }
}

/// Statistics for both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatchStats {
    pub home: TeamStats,
    pub away: TeamStats,
}

impl MatchStats {
    /// Check per-side bounds and that possession adds up to 100.
    pub fn validated(self) -> Result<Self, ValidationError> {
        self.home.check("stats.home")?;
        self.away.check("stats.away")?;
        if u16::from(self.home.possession) + u16::from(self.away.possession) != 100 {
            return Err(ValidationError::invalid(
                "stats",
                "possession must add up to 100",
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lineup(formation: &str, starters: usize) -> TeamLineup {
        TeamLineup {
            formation: formation.to_owned(),
            starting_xi: (1..=starters).map(|n| format!("Player {n}")).collect(),
            substitutes: vec![],
        }
    }

    #[rstest]
    #[case("4-3-3")]
    #[case("3-4-2-1")]
    #[case(" 4-4-2 ")]
    fn accepts_formations(#[case] raw: &str) {
        let lineups = Lineups {
            home: lineup(raw, 11),
            away: lineup("4-4-2", 11),
        };
        assert!(lineups.validated().is_ok());
    }

    #[rstest]
    #[case("4-4-3")]
    #[case("442")]
    #[case("10")]
    #[case("4-0-6")]
    #[case("")]
    fn rejects_formations(#[case] raw: &str) {
        let lineups = Lineups {
            home: lineup(raw, 11),
            away: lineup("4-4-2", 11),
        };
        let err = lineups.validated().expect_err("bad formation");
        assert_eq!(err.field(), "lineups.home");
    }

    #[rstest]
    fn caps_starting_eleven() {
        let lineups = Lineups {
            home: lineup("4-4-2", 11),
            away: lineup("4-4-2", 12),
        };
        let err = lineups.validated().expect_err("twelve starters");
        assert_eq!(
            err,
            ValidationError::TooMany {
                field: "lineups.away",
                max: STARTING_XI_MAX
            }
        );
    }

    #[rstest]
    #[case(55, 45, true)]
    #[case(50, 49, false)]
    #[case(101, 0, false)]
    fn possession_must_total_100(#[case] home: u8, #[case] away: u8, #[case] ok: bool) {
        let stats = MatchStats {
            home: TeamStats {
                possession: home,
                ..TeamStats::default()
            },
            away: TeamStats {
                possession: away,
                ..TeamStats::default()
            },
        };
        assert_eq!(stats.validated().is_ok(), ok);
    }

    #[rstest]
    fn shots_on_target_bounded_by_shots() {
        let stats = MatchStats {
            home: TeamStats {
                possession: 50,
                shots: 3,
                shots_on_target: 4,
                ..TeamStats::default()
            },
            away: TeamStats {
                possession: 50,
                ..TeamStats::default()
            },
        };
        assert_eq!(stats.validated().expect_err("bad").field(), "stats.home");
    }
}
