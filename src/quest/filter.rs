//! Sparse-State Filter
//!
//! Decides whether an edited reward or condition slot carries enough to be
//! worth building, and strips the editor's blank defaults out of it.
//!
//! The absence rule: a number that is missing or zero, a `false` flag and a
//! blank string all count as "not set". Negative numbers are set; they are
//! passed on so the schema can report them.

use super::authoring::{ConditionFragment, EntryFragment, RewardFragment};
use super::builder::TradeTerms;
use super::definition::{ConditionKind, Skill};

/// A reward slot that qualified, with absent values removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualifiedReward {
    pub currency_normal: Option<f64>,
    pub currency_gold: Option<f64>,
    pub fame: Option<f64>,
    pub skills: Vec<(Skill, f64)>,
    pub trade_deals: Vec<(String, TradeTerms)>,
}

/// Kind-specific payload of a qualifying condition
#[derive(Debug, Clone, PartialEq)]
pub enum QualifiedObjective {
    Fetch(Vec<(String, i64)>),
    Elimination(Vec<(String, i64)>),
    Interaction(String),
}

/// A condition slot that qualified, with absent values removed
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedCondition {
    pub objective: QualifiedObjective,
    pub sequence_index: Option<i64>,
    pub auto_complete: bool,
    pub caption: Option<String>,
}

/// An optional number, with zero (and NaN) treated as absent
pub fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

fn positive(value: Option<f64>) -> bool {
    value.is_some_and(|v| v > 0.0)
}

fn text(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(ToString::to_string)
}

pub fn reward_qualifies(fragment: &RewardFragment) -> bool {
    positive(fragment.currency_normal)
        || positive(fragment.currency_gold)
        || positive(fragment.fame)
        || fragment.skills.iter().any(|s| positive(s.experience))
        || fragment.trade_deals.iter().any(|d| !d.item.trim().is_empty())
}

/// `None` if the slot does not qualify
pub fn project_reward(fragment: &RewardFragment) -> Option<QualifiedReward> {
    if !reward_qualifies(fragment) {
        return None;
    }

    Some(QualifiedReward {
        currency_normal: present(fragment.currency_normal),
        currency_gold: present(fragment.currency_gold),
        fame: present(fragment.fame),
        skills: fragment
            .skills
            .iter()
            .filter_map(|s| Some((s.skill, present(s.experience)?)))
            .collect(),
        trade_deals: fragment
            .trade_deals
            .iter()
            .filter(|d| !d.item.trim().is_empty())
            .map(|d| {
                (
                    d.item.clone(),
                    TradeTerms {
                        price: present(d.price),
                        amount: present(d.amount),
                        fame: present(d.fame),
                        allow_excluded: d.allow_excluded.then_some(true),
                    },
                )
            })
            .collect(),
    })
}

pub fn condition_qualifies(fragment: &ConditionFragment) -> bool {
    match fragment.kind {
        ConditionKind::Fetch => !fragment.items.is_empty(),
        ConditionKind::Elimination => !fragment.target_characters.is_empty(),
        ConditionKind::Interaction => text(fragment.interaction_object.as_deref()).is_some(),
    }
}

/// Entries keep their name as typed; a missing or zero amount means one.
fn entries(list: &[EntryFragment]) -> Vec<(String, i64)> {
    list.iter()
        .map(|e| (e.name.clone(), e.amount.filter(|n| *n != 0).unwrap_or(1)))
        .collect()
}

/// `None` if the slot does not qualify
pub fn project_condition(fragment: &ConditionFragment) -> Option<QualifiedCondition> {
    if !condition_qualifies(fragment) {
        return None;
    }

    let objective = match fragment.kind {
        ConditionKind::Fetch => QualifiedObjective::Fetch(entries(&fragment.items)),
        ConditionKind::Elimination => {
            QualifiedObjective::Elimination(entries(&fragment.target_characters))
        }
        ConditionKind::Interaction => {
            QualifiedObjective::Interaction(text(fragment.interaction_object.as_deref())?)
        }
    };

    Some(QualifiedCondition {
        objective,
        sequence_index: fragment.sequence_index.filter(|n| *n != 0),
        auto_complete: fragment.can_be_auto_completed,
        caption: text(fragment.tracking_caption.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::authoring::{SkillFragment, TradeDealFragment};

    #[test]
    fn test_blank_reward_does_not_qualify() {
        let blank = RewardFragment {
            currency_normal: Some(0.0),
            currency_gold: None,
            fame: Some(0.0),
            skills: vec![SkillFragment { skill: Skill::Mining, experience: Some(0.0) }],
            trade_deals: vec![TradeDealFragment { item: "   ".to_string(), ..Default::default() }],
        };
        assert!(!reward_qualifies(&blank));
        assert_eq!(project_reward(&blank), None);
        assert_eq!(project_reward(&RewardFragment::default()), None);
    }

    #[test]
    fn test_negative_currency_alone_does_not_qualify() {
        let fragment = RewardFragment { currency_normal: Some(-5.0), ..Default::default() };
        assert!(!reward_qualifies(&fragment));
    }

    #[test]
    fn test_each_facet_qualifies_on_its_own() {
        let facets = [
            RewardFragment { currency_normal: Some(1.0), ..Default::default() },
            RewardFragment { currency_gold: Some(1.0), ..Default::default() },
            RewardFragment { fame: Some(1.0), ..Default::default() },
            RewardFragment {
                skills: vec![SkillFragment { skill: Skill::Combat, experience: Some(25.0) }],
                ..Default::default()
            },
            RewardFragment {
                trade_deals: vec![TradeDealFragment { item: "Lantern".to_string(), ..Default::default() }],
                ..Default::default()
            },
        ];
        for fragment in &facets {
            assert!(reward_qualifies(fragment), "{:?} should qualify", fragment);
        }
    }

    #[test]
    fn test_projection_drops_zeroes_and_blanks() {
        let fragment = RewardFragment {
            currency_normal: Some(0.0),
            currency_gold: Some(-2.0),
            fame: Some(10.0),
            skills: vec![
                SkillFragment { skill: Skill::Combat, experience: Some(0.0) },
                SkillFragment { skill: Skill::Fishing, experience: None },
                SkillFragment { skill: Skill::Trading, experience: Some(40.0) },
            ],
            trade_deals: vec![
                TradeDealFragment { item: "".to_string(), price: Some(5.0), ..Default::default() },
                TradeDealFragment {
                    item: "Net".to_string(),
                    price: Some(0.0),
                    amount: Some(2.0),
                    fame: None,
                    allow_excluded: false,
                },
            ],
        };

        let projected = project_reward(&fragment).unwrap();
        assert_eq!(projected.currency_normal, None);
        assert_eq!(projected.currency_gold, Some(-2.0));
        assert_eq!(projected.fame, Some(10.0));
        assert_eq!(projected.skills, vec![(Skill::Trading, 40.0)]);
        assert_eq!(
            projected.trade_deals,
            vec![(
                "Net".to_string(),
                TradeTerms { price: None, amount: Some(2.0), fame: None, allow_excluded: None }
            )]
        );
    }

    #[test]
    fn test_condition_qualification() {
        let fetch = ConditionFragment { kind: ConditionKind::Fetch, ..Default::default() };
        assert!(!condition_qualifies(&fetch));
        assert_eq!(project_condition(&fetch), None);

        let elimination = ConditionFragment {
            kind: ConditionKind::Elimination,
            // items are ignored for elimination conditions
            items: vec![EntryFragment { name: "Bread".to_string(), amount: Some(1) }],
            ..Default::default()
        };
        assert!(!condition_qualifies(&elimination));

        let interaction = ConditionFragment {
            kind: ConditionKind::Interaction,
            interaction_object: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!condition_qualifies(&interaction));
        assert_eq!(project_condition(&interaction), None);
        assert_eq!(project_condition(&elimination), None);
    }

    #[test]
    fn test_projection_follows_qualification() {
        let entry = || vec![EntryFragment { name: "Boar".to_string(), amount: Some(2) }];
        let fragments = [
            ConditionFragment { kind: ConditionKind::Fetch, items: entry(), ..Default::default() },
            ConditionFragment { kind: ConditionKind::Fetch, target_characters: entry(), ..Default::default() },
            ConditionFragment { kind: ConditionKind::Elimination, target_characters: entry(), ..Default::default() },
            ConditionFragment {
                kind: ConditionKind::Interaction,
                interaction_object: Some("Well".to_string()),
                ..Default::default()
            },
            ConditionFragment {
                kind: ConditionKind::Interaction,
                interaction_object: None,
                items: entry(),
                ..Default::default()
            },
        ];
        for fragment in &fragments {
            assert_eq!(
                condition_qualifies(fragment),
                project_condition(fragment).is_some(),
                "{:?}",
                fragment
            );
        }
    }

    #[test]
    fn test_condition_projection() {
        let fragment = ConditionFragment {
            kind: ConditionKind::Fetch,
            sequence_index: Some(0),
            can_be_auto_completed: true,
            tracking_caption: Some("".to_string()),
            items: vec![
                EntryFragment { name: "Herb".to_string(), amount: Some(3) },
                EntryFragment { name: "Root".to_string(), amount: None },
            ],
            ..Default::default()
        };

        let projected = project_condition(&fragment).unwrap();
        assert_eq!(
            projected,
            QualifiedCondition {
                objective: QualifiedObjective::Fetch(vec![
                    ("Herb".to_string(), 3),
                    ("Root".to_string(), 1)
                ]),
                sequence_index: None,
                auto_complete: true,
                caption: None,
            }
        );
    }
}
