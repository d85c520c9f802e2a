use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

pub const SMEQ_ITEMS: usize = 5;
pub const SELF_ESTEEM_ITEMS: usize = 10;
/// Upper bound of a single SMEQ answer (days per week).
pub const SMEQ_MAX: u8 = 7;

/// Self-esteem statements worded negatively. Agreement with them lowers the score.
pub const REVERSE_SCORED_ITEMS: [u8; 5] = [2, 5, 6, 8, 9];

/// Four-point agreement scale used by the self-esteem statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Likert {
    #[serde(rename = "Strongly Disagree")]
    StronglyDisagree,
    Disagree,
    Agree,
    #[serde(rename = "Strongly Agree")]
    StronglyAgree,
}

impl Likert {
    pub const ALL: [Likert; 4] = [
        Likert::StronglyDisagree,
        Likert::Disagree,
        Likert::Agree,
        Likert::StronglyAgree,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Likert::StronglyDisagree => "Strongly Disagree",
            Likert::Disagree => "Disagree",
            Likert::Agree => "Agree",
            Likert::StronglyAgree => "Strongly Agree",
        }
    }

    pub fn direct_score(self) -> u8 {
        match self {
            Likert::StronglyAgree => 4,
            Likert::Agree => 3,
            Likert::Disagree => 2,
            Likert::StronglyDisagree => 1,
        }
    }

    pub fn reverse_score(self) -> u8 {
        5 - self.direct_score()
    }
}

impl fmt::Display for Likert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Likert {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Likert::ALL
            .into_iter()
            .find(|answer| answer.label() == s)
            .ok_or_else(|| Error::InvalidScoreInput(format!("unknown answer label {s:?}")))
    }
}

/// Clamp a raw SMEQ entry into `0..=SMEQ_MAX`.
pub fn clamp_smeq(value: i64) -> u8 {
    value.clamp(0, i64::from(SMEQ_MAX)) as u8
}

pub fn is_reverse_scored(index: u8) -> bool {
    REVERSE_SCORED_ITEMS.contains(&index)
}

/// Contribution of a single self-esteem item, 1 to 4.
pub fn item_score(index: u8, answer: Likert) -> u8 {
    if is_reverse_scored(index) {
        answer.reverse_score()
    } else {
        answer.direct_score()
    }
}

/// Sum of the SMEQ answers.
///
/// Values are expected to be clamped already; nothing is checked here.
pub fn score_smeq(answers: &BTreeMap<u8, u8>) -> u32 {
    answers.values().map(|&value| u32::from(value)).sum()
}

/// Sum of the ten self-esteem items, with items 2, 5, 6, 8 and 9 reversed.
///
/// Every item from 1 to 10 must be answered.
pub fn score_self_esteem(answers: &BTreeMap<u8, Likert>) -> Result<u32, Error> {
    (1..=SELF_ESTEEM_ITEMS as u8)
        .map(|index| {
            answers
                .get(&index)
                .map(|&answer| u32::from(item_score(index, answer)))
                .ok_or_else(|| {
                    Error::InvalidScoreInput(format!("self-esteem item {index} is unanswered"))
                })
        })
        .sum()
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn uniform(answer: Likert) -> BTreeMap<u8, Likert> {
        (1..=10).map(|index| (index, answer)).collect()
    }

    #[test]
    fn test_item_score() {
        assert_eq!(item_score(1, Likert::StronglyAgree), 4);
        assert_eq!(item_score(1, Likert::StronglyDisagree), 1);
        assert_eq!(item_score(2, Likert::StronglyAgree), 1);
        assert_eq!(item_score(2, Likert::StronglyDisagree), 4);
        assert_eq!(item_score(3, Likert::Agree), 3);
        assert_eq!(item_score(5, Likert::Agree), 2);
        assert_eq!(item_score(6, Likert::Disagree), 3);
        assert_eq!(item_score(7, Likert::Disagree), 2);
        assert_eq!(item_score(8, Likert::Agree), 2);
        assert_eq!(item_score(9, Likert::StronglyAgree), 1);
        assert_eq!(item_score(10, Likert::StronglyAgree), 4);
    }

    #[test]
    fn test_reverse_flip() {
        for index in 1..=10u8 {
            let before = item_score(index, Likert::StronglyAgree);
            let after = item_score(index, Likert::StronglyDisagree);
            if is_reverse_scored(index) {
                assert_eq!((before, after), (1, 4), "item {index}");
            } else {
                assert_eq!((before, after), (4, 1), "item {index}");
            }
        }
    }

    #[test]
    fn test_self_esteem_all_agree() {
        assert_eq!(score_self_esteem(&uniform(Likert::Agree)).unwrap(), 25);
    }

    #[test]
    fn test_self_esteem_bounds() {
        let lowest = (1..=10u8)
            .map(|index| {
                let answer = if is_reverse_scored(index) {
                    Likert::StronglyAgree
                } else {
                    Likert::StronglyDisagree
                };
                (index, answer)
            })
            .collect();
        assert_eq!(score_self_esteem(&lowest).unwrap(), 10);

        let highest = (1..=10u8)
            .map(|index| {
                let answer = if is_reverse_scored(index) {
                    Likert::StronglyDisagree
                } else {
                    Likert::StronglyAgree
                };
                (index, answer)
            })
            .collect();
        assert_eq!(score_self_esteem(&highest).unwrap(), 40);
    }

    #[test]
    fn test_self_esteem_missing_item() {
        let mut answers = uniform(Likert::Agree);
        answers.remove(&7);
        assert!(matches!(
            score_self_esteem(&answers),
            Err(Error::InvalidScoreInput(_))
        ));
        assert!(score_self_esteem(&BTreeMap::new()).is_err());
    }

    #[test]
    fn test_likert_parse() {
        assert_eq!("Strongly Agree".parse::<Likert>().unwrap(), Likert::StronglyAgree);
        assert_eq!("Disagree".parse::<Likert>().unwrap(), Likert::Disagree);
        assert!(matches!(
            "Neutral".parse::<Likert>(),
            Err(Error::InvalidScoreInput(_))
        ));
        assert!("agree".parse::<Likert>().is_err());
    }

    #[test]
    fn test_score_smeq() {
        let answers = BTreeMap::from([(1, 0), (2, 1), (3, 2), (4, 1), (5, 0)]);
        assert_eq!(score_smeq(&answers), 4);
        assert_eq!(score_smeq(&BTreeMap::new()), 0);
    }

    #[test]
    fn test_clamp_smeq() {
        assert_eq!(clamp_smeq(-3), 0);
        assert_eq!(clamp_smeq(0), 0);
        assert_eq!(clamp_smeq(4), 4);
        assert_eq!(clamp_smeq(7), 7);
        assert_eq!(clamp_smeq(12), 7);
    }

    proptest! {
        #[test]
        fn prop_self_esteem_in_range(
            answers in prop::array::uniform10(prop::sample::select(Likert::ALL.to_vec()))
        ) {
            let map = (1..=10u8).zip(answers).collect();
            let score = score_self_esteem(&map).unwrap();
            prop_assert!((10..=40).contains(&score));
        }

        #[test]
        fn prop_smeq_in_range(answers in prop::array::uniform5(0u8..=SMEQ_MAX)) {
            let map = (1..=5u8).zip(answers).collect();
            prop_assert!(score_smeq(&map) <= 35);
        }
    }
}
