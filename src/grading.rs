use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl Letter {
    pub const ALL: [Letter; 8] = [
        Letter::APlus,
        Letter::A,
        Letter::BPlus,
        Letter::B,
        Letter::CPlus,
        Letter::C,
        Letter::D,
        Letter::F,
    ];

    /// Higher is better. F ranks 0.
    pub fn rank(self) -> u8 {
        match self {
            Letter::APlus => 7,
            Letter::A => 6,
            Letter::BPlus => 5,
            Letter::B => 4,
            Letter::CPlus => 3,
            Letter::C => 2,
            Letter::D => 1,
            Letter::F => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Letter::APlus => "A+",
            Letter::A => "A",
            Letter::BPlus => "B+",
            Letter::B => "B",
            Letter::CPlus => "C+",
            Letter::C => "C",
            Letter::D => "D",
            Letter::F => "F",
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Letter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Letter::ALL
            .iter()
            .copied()
            .find(|letter| letter.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown letter grade '{trimmed}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeBand {
    pub min_score: f64,
    pub letter: Letter,
    pub gpa: f64,
}

const fn band(min_score: f64, letter: Letter, gpa: f64) -> GradeBand {
    GradeBand {
        min_score,
        letter,
        gpa,
    }
}

const STANDARD_BANDS: [GradeBand; 8] = [
    band(90.0, Letter::APlus, 4.0),
    band(85.0, Letter::A, 4.0),
    band(80.0, Letter::BPlus, 3.3),
    band(75.0, Letter::B, 3.0),
    band(70.0, Letter::CPlus, 2.7),
    band(65.0, Letter::C, 2.3),
    band(60.0, Letter::D, 2.0),
    band(0.0, Letter::F, 0.0),
];

const COARSE_BANDS: [GradeBand; 5] = [
    band(80.0, Letter::A, 4.0),
    band(70.0, Letter::B, 3.0),
    band(60.0, Letter::C, 2.0),
    band(50.0, Letter::D, 1.0),
    band(0.0, Letter::F, 0.0),
];

/// Band tables in use across the registry.
///
/// `Standard` is the canonical fine-grained table. `Coarse` is the legacy
/// transcript/dashboard table. A derived view is always built from exactly
/// one scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GradeScale {
    #[default]
    Standard,
    Coarse,
}

impl GradeScale {
    /// Bands in descending threshold order; the last band starts at 0.
    pub fn bands(self) -> &'static [GradeBand] {
        match self {
            GradeScale::Standard => &STANDARD_BANDS,
            GradeScale::Coarse => &COARSE_BANDS,
        }
    }

    pub fn classify(self, score: f64) -> Classification {
        let score = clamp_score(score);
        let bands = self.bands();
        let matched = bands
            .iter()
            .find(|band| score >= band.min_score)
            .unwrap_or(&bands[bands.len() - 1]);

        Classification {
            letter: matched.letter,
            gpa: matched.gpa,
        }
    }

    pub fn letters(self) -> Vec<Letter> {
        self.bands().iter().map(|band| band.letter).collect()
    }

    /// The A and B families of this scale.
    pub fn default_passing(self) -> Vec<Letter> {
        self.letters()
            .into_iter()
            .filter(|letter| {
                matches!(letter, Letter::APlus | Letter::A | Letter::BPlus | Letter::B)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub letter: Letter,
    pub gpa: f64,
}

pub fn classify(score: f64) -> Classification {
    GradeScale::Standard.classify(score)
}

/// NaN maps to 0; everything else is clamped into [0, 100].
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_boundaries() {
        assert_eq!(classify(100.0).letter, Letter::APlus);
        assert_eq!(classify(90.0).letter, Letter::APlus);
        assert_eq!(classify(89.9).letter, Letter::A);
        assert_eq!(classify(85.0).letter, Letter::A);
        assert_eq!(classify(80.0).letter, Letter::BPlus);
        assert_eq!(classify(75.0).letter, Letter::B);
        assert_eq!(classify(70.0).letter, Letter::CPlus);
        assert_eq!(classify(65.0).letter, Letter::C);
        assert_eq!(classify(60.0).letter, Letter::D);
        assert_eq!(classify(59.9).letter, Letter::F);
        assert_eq!(classify(0.0).letter, Letter::F);
        assert_eq!(classify(82.0).gpa, 3.3);
        assert_eq!(classify(72.0).gpa, 2.7);
    }

    #[test]
    fn coarse_boundaries() {
        let scale = GradeScale::Coarse;
        let cases = [
            (80.0, Letter::A, 4.0),
            (79.0, Letter::B, 3.0),
            (60.0, Letter::C, 2.0),
            (50.0, Letter::D, 1.0),
            (49.0, Letter::F, 0.0),
        ];
        for (score, letter, gpa) in cases {
            assert_eq!(scale.classify(score), Classification { letter, gpa });
        }
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        assert_eq!(classify(-5.0), classify(0.0));
        assert_eq!(classify(150.0), classify(100.0));
        assert_eq!(classify(f64::NAN), classify(0.0));
        assert_eq!(classify(f64::INFINITY), classify(100.0));
    }

    #[test]
    fn letters_are_monotonic_in_score() {
        for scale in [GradeScale::Standard, GradeScale::Coarse] {
            let mut previous = scale.classify(0.0);
            for tenth in 0..=1000 {
                let current = scale.classify(tenth as f64 / 10.0);
                assert!(current.letter.rank() >= previous.letter.rank());
                assert!(current.gpa >= previous.gpa);
                previous = current;
            }
        }
    }

    #[test]
    fn band_tables_are_well_formed() {
        for scale in [GradeScale::Standard, GradeScale::Coarse] {
            let bands = scale.bands();
            assert!(bands.windows(2).all(|pair| pair[0].min_score > pair[1].min_score));
            assert_eq!(bands.last().map(|band| band.min_score), Some(0.0));
        }
    }

    #[test]
    fn passing_letters_follow_scale() {
        assert_eq!(
            GradeScale::Standard.default_passing(),
            vec![Letter::APlus, Letter::A, Letter::BPlus, Letter::B]
        );
        assert_eq!(GradeScale::Coarse.default_passing(), vec![Letter::A, Letter::B]);
    }

    #[test]
    fn letters_parse_case_insensitively() {
        assert_eq!("a+".parse::<Letter>(), Ok(Letter::APlus));
        assert_eq!(" B ".parse::<Letter>(), Ok(Letter::B));
        assert!("E".parse::<Letter>().is_err());
    }
}
