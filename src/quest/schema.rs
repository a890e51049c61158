//! Quest Schema
//!
//! Strict validation that turns a `QuestDraft` into a `Quest`, and the JSON
//! load path built on top of it. Every violated constraint is reported with
//! its field path, in the order the fields appear in a quest.

use std::fmt;

use thiserror::Error;

use super::definition::{
    Condition, ConditionDraft, ConditionKind, ItemAmount, ItemAmountDraft, Npc, Objective, Quest,
    QuestDraft, RewardDraft, RewardPool, Skill, SkillReward, Tier, TradeDeal, TradeDealDraft,
};

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path to the offending field, e.g. `RewardPool.0.Skills.1.Experience`
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every issue found while validating a draft
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.messages().join("; "))]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    /// Issues rendered as `<path>: <message>`, in schema order
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

/// Failure of the all-or-nothing JSON load path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Malformed quest JSON: {0}")]
    Malformed(String),

    #[error("Quest JSON failed validation: {0}")]
    Invalid(ValidationErrors),
}

/// Parse JSON text and validate it into a `Quest`
pub fn parse_quest_json(text: &str) -> Result<Quest, LoadError> {
    let draft: QuestDraft =
        serde_json::from_str(text).map_err(|e| LoadError::Malformed(e.to_string()))?;
    validate(&draft).map_err(LoadError::Invalid)
}

/// Validate a draft, collecting every issue rather than stopping at the first
pub fn validate(draft: &QuestDraft) -> Result<Quest, ValidationErrors> {
    let mut issues = Issues::default();

    let associated_npc = match draft.associated_npc.as_deref() {
        None => {
            issues.push("AssociatedNpc", "Required");
            None
        }
        Some(raw) => {
            let npc = Npc::from_str(raw);
            if npc.is_none() {
                issues.push("AssociatedNpc", format!("Invalid NPC '{}'", raw));
            }
            npc
        }
    };

    let tier = match draft.tier {
        None => {
            issues.push("Tier", "Required");
            None
        }
        Some(raw) => {
            let tier = whole_number(raw).and_then(Tier::from_number);
            if tier.is_none() {
                issues.push("Tier", format!("Tier must be 1, 2 or 3 (got {})", raw));
            }
            tier
        }
    };

    let title = required_text(&mut issues, "Title", draft.title.as_deref());
    let description = required_text(&mut issues, "Description", draft.description.as_deref());

    let time_limit_hours = match draft.time_limit_hours {
        Some(hours) if !(hours.is_finite() && hours > 0.0) => {
            issues.push("TimeLimitHours", "Expected a positive number");
            None
        }
        other => other,
    };

    if draft.reward_pool.is_empty() {
        issues.push("RewardPool", "At least one reward pool is required");
    }
    let reward_pool: Vec<RewardPool> = draft
        .reward_pool
        .iter()
        .enumerate()
        .map(|(i, reward)| validate_reward(&mut issues, &format!("RewardPool.{}", i), reward))
        .collect();

    if draft.conditions.is_empty() {
        issues.push("Conditions", "At least one condition is required");
    }
    let conditions: Vec<Option<Condition>> = draft
        .conditions
        .iter()
        .enumerate()
        .map(|(i, condition)| {
            validate_condition(&mut issues, &format!("Conditions.{}", i), condition)
        })
        .collect();

    if !issues.0.is_empty() {
        return Err(ValidationErrors { issues: issues.0 });
    }

    // No issues means every required piece resolved.
    match (associated_npc, tier, title, description) {
        (Some(associated_npc), Some(tier), Some(title), Some(description)) => Ok(Quest {
            associated_npc,
            tier,
            title,
            description,
            time_limit_hours,
            reward_pool,
            conditions: conditions.into_iter().flatten().collect(),
        }),
        _ => Err(ValidationErrors {
            issues: vec![ValidationIssue {
                path: String::new(),
                message: "Quest could not be resolved".to_string(),
            }],
        }),
    }
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Integral, finite values only
fn whole_number(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn required_text(issues: &mut Issues, path: &str, value: Option<&str>) -> Option<String> {
    match value {
        None => {
            issues.push(path, "Required");
            None
        }
        Some(text) if text.trim().is_empty() => {
            issues.push(path, "Must not be empty");
            None
        }
        Some(text) => Some(text.to_string()),
    }
}

/// Optional whole number; `positive` excludes zero
fn optional_count(issues: &mut Issues, path: &str, value: Option<f64>, positive: bool) -> Option<u32> {
    let raw = value?;
    let min = if positive { 1 } else { 0 };
    match whole_number(raw) {
        Some(n) if n >= min && n <= i64::from(u32::MAX) => Some(n as u32),
        Some(_) if positive => {
            issues.push(path, "Expected a positive whole number");
            None
        }
        Some(_) => {
            issues.push(path, "Expected a non-negative whole number");
            None
        }
        None => {
            issues.push(path, "Expected a whole number");
            None
        }
    }
}

fn required_count(issues: &mut Issues, path: &str, value: Option<f64>, positive: bool) -> Option<u32> {
    if value.is_none() {
        issues.push(path, "Required");
        return None;
    }
    optional_count(issues, path, value, positive)
}

fn validate_reward(issues: &mut Issues, path: &str, reward: &RewardDraft) -> RewardPool {
    let pool = RewardPool {
        currency_normal: optional_count(
            issues,
            &format!("{}.CurrencyNormal", path),
            reward.currency_normal,
            false,
        ),
        currency_gold: optional_count(
            issues,
            &format!("{}.CurrencyGold", path),
            reward.currency_gold,
            false,
        ),
        fame: optional_count(issues, &format!("{}.Fame", path), reward.fame, false),
        skills: reward
            .skills
            .iter()
            .enumerate()
            .filter_map(|(i, skill)| {
                let skill_path = format!("{}.Skills.{}", path, i);
                let resolved = match skill.skill.as_deref() {
                    None => {
                        issues.push(format!("{}.Skill", skill_path), "Required");
                        None
                    }
                    Some(raw) => {
                        let parsed = Skill::from_str(raw);
                        if parsed.is_none() {
                            issues.push(format!("{}.Skill", skill_path), format!("Invalid skill '{}'", raw));
                        }
                        parsed
                    }
                };
                let experience = required_count(
                    issues,
                    &format!("{}.Experience", skill_path),
                    skill.experience,
                    true,
                );
                Some(SkillReward {
                    skill: resolved?,
                    experience: experience?,
                })
            })
            .collect(),
        trade_deals: reward
            .trade_deals
            .iter()
            .enumerate()
            .filter_map(|(i, deal)| validate_trade_deal(issues, &format!("{}.TradeDeals.{}", path, i), deal))
            .collect(),
    };

    if !pool.has_content() && reward_is_clean(reward) {
        issues.push(
            path,
            "Reward pool must grant currency, fame, skill experience or a trade deal",
        );
    }

    pool
}

/// Only flag an empty pool when nothing inside it was already reported
fn reward_is_clean(reward: &RewardDraft) -> bool {
    reward.skills.is_empty() && reward.trade_deals.is_empty()
}

fn validate_trade_deal(issues: &mut Issues, path: &str, deal: &TradeDealDraft) -> Option<TradeDeal> {
    let item = required_text(issues, &format!("{}.Item", path), deal.item.as_deref());
    let price = optional_count(issues, &format!("{}.Price", path), deal.price, false);
    let amount = optional_count(issues, &format!("{}.Amount", path), deal.amount, true);
    let fame = optional_count(issues, &format!("{}.Fame", path), deal.fame, false);
    Some(TradeDeal {
        item: item?,
        price,
        amount,
        fame,
        allow_excluded: deal.allow_excluded,
    })
}

fn validate_amounts(
    issues: &mut Issues,
    path: &str,
    entries: Option<&Vec<ItemAmountDraft>>,
) -> Vec<ItemAmount> {
    let entries = match entries {
        Some(entries) if !entries.is_empty() => entries,
        _ => {
            issues.push(path, "At least one entry is required");
            return Vec::new();
        }
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let name = required_text(issues, &format!("{}.{}.Name", path, i), entry.name.as_deref());
            let amount = required_count(issues, &format!("{}.{}.Amount", path, i), entry.amount, true);
            Some(ItemAmount {
                name: name?,
                amount: amount?,
            })
        })
        .collect()
}

fn validate_condition(issues: &mut Issues, path: &str, draft: &ConditionDraft) -> Option<Condition> {
    let kind = match draft.kind.as_deref() {
        None => {
            issues.push(format!("{}.Type", path), "Required");
            None
        }
        Some(raw) => {
            let kind = ConditionKind::from_str(raw);
            if kind.is_none() {
                issues.push(
                    format!("{}.Type", path),
                    format!("Expected Fetch, Elimination or Interaction (got '{}')", raw),
                );
            }
            kind
        }
    };

    let sequence_index = required_count(
        issues,
        &format!("{}.SequenceIndex", path),
        draft.sequence_index,
        false,
    );

    let objective = match kind? {
        ConditionKind::Fetch => Objective::Fetch {
            items: validate_amounts(issues, &format!("{}.Items", path), draft.items.as_ref()),
        },
        ConditionKind::Elimination => Objective::Elimination {
            target_characters: validate_amounts(
                issues,
                &format!("{}.TargetCharacters", path),
                draft.target_characters.as_ref(),
            ),
        },
        ConditionKind::Interaction => Objective::Interaction {
            interaction_object: required_text(
                issues,
                &format!("{}.InteractionObject", path),
                draft.interaction_object.as_deref(),
            )?,
        },
    };

    Some(Condition {
        objective,
        sequence_index: sequence_index?,
        can_be_auto_completed: draft.can_be_auto_completed.unwrap_or(false),
        tracking_caption: draft.tracking_caption.clone(),
    })
}
