//! Authoring State
//!
//! The in-progress, possibly incomplete quest owned by the editor. Every
//! field can be missing. The engine only ever reads it by reference; the
//! one exception is `load_json`, which the editor calls to replace the
//! whole state with a quest read from JSON.

use serde::{Deserialize, Serialize};

use super::definition::{ConditionKind, ItemAmount, Npc, Objective, Quest, RewardPool, Skill};
use super::schema::{self, LoadError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthoringState {
    pub npc: Option<Npc>,
    pub tier: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_limit_hours: Option<f64>,
    pub rewards: Vec<RewardFragment>,
    pub conditions: Vec<ConditionFragment>,
}

impl Default for AuthoringState {
    /// A fresh editor: NPC and tier preselected, everything else empty
    fn default() -> Self {
        Self {
            npc: Some(Npc::default()),
            tier: Some(1),
            title: None,
            description: None,
            time_limit_hours: None,
            rewards: Vec::new(),
            conditions: Vec::new(),
        }
    }
}

/// One reward slot as edited; may be entirely blank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RewardFragment {
    pub currency_normal: Option<f64>,
    pub currency_gold: Option<f64>,
    pub fame: Option<f64>,
    pub skills: Vec<SkillFragment>,
    pub trade_deals: Vec<TradeDealFragment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillFragment {
    pub skill: Skill,
    pub experience: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TradeDealFragment {
    pub item: String,
    pub price: Option<f64>,
    pub amount: Option<f64>,
    pub fame: Option<f64>,
    pub allow_excluded: bool,
}

/// One condition slot as edited. `kind` decides which list is meaningful;
/// the others are kept so switching kinds in the editor loses nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConditionFragment {
    pub kind: ConditionKind,
    pub sequence_index: Option<i64>,
    pub can_be_auto_completed: bool,
    pub tracking_caption: Option<String>,
    pub items: Vec<EntryFragment>,
    pub target_characters: Vec<EntryFragment>,
    pub interaction_object: Option<String>,
}

/// A named entry with a count (fetched item or elimination target)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntryFragment {
    pub name: String,
    pub amount: Option<i64>,
}

impl AuthoringState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor state that reproduces `quest` field for field.
    ///
    /// Assembling the result normalizes rather than reproduces: explicit
    /// zeroes (`Price: 0`, `CurrencyNormal: 0`) and `AllowExcluded: false`
    /// read as unset in the editor and are dropped from the rebuilt quest.
    pub fn from_quest(quest: &Quest) -> Self {
        Self {
            npc: Some(quest.associated_npc),
            tier: Some(i64::from(quest.tier.number())),
            title: Some(quest.title.clone()),
            description: Some(quest.description.clone()),
            time_limit_hours: quest.time_limit_hours,
            rewards: quest.reward_pool.iter().map(RewardFragment::from_pool).collect(),
            conditions: quest
                .conditions
                .iter()
                .map(|condition| {
                    let mut fragment = ConditionFragment {
                        kind: condition.kind(),
                        sequence_index: Some(i64::from(condition.sequence_index)),
                        can_be_auto_completed: condition.can_be_auto_completed,
                        tracking_caption: condition.tracking_caption.clone(),
                        ..Default::default()
                    };
                    match &condition.objective {
                        Objective::Fetch { items } => fragment.items = entries(items),
                        Objective::Elimination { target_characters } => {
                            fragment.target_characters = entries(target_characters)
                        }
                        Objective::Interaction { interaction_object } => {
                            fragment.interaction_object = Some(interaction_object.clone())
                        }
                    }
                    fragment
                })
                .collect(),
        }
    }

    /// Replace the whole state with the quest in `text`.
    ///
    /// All or nothing: on error the current state is untouched.
    pub fn load_json(&mut self, text: &str) -> Result<(), LoadError> {
        let quest = schema::parse_quest_json(text)?;
        *self = Self::from_quest(&quest);
        Ok(())
    }
}

impl RewardFragment {
    fn from_pool(pool: &RewardPool) -> Self {
        Self {
            currency_normal: pool.currency_normal.map(f64::from),
            currency_gold: pool.currency_gold.map(f64::from),
            fame: pool.fame.map(f64::from),
            skills: pool
                .skills
                .iter()
                .map(|s| SkillFragment {
                    skill: s.skill,
                    experience: Some(f64::from(s.experience)),
                })
                .collect(),
            trade_deals: pool
                .trade_deals
                .iter()
                .map(|d| TradeDealFragment {
                    item: d.item.clone(),
                    price: d.price.map(f64::from),
                    amount: d.amount.map(f64::from),
                    fame: d.fame.map(f64::from),
                    allow_excluded: d.allow_excluded.unwrap_or(false),
                })
                .collect(),
        }
    }
}

fn entries(list: &[ItemAmount]) -> Vec<EntryFragment> {
    list.iter()
        .map(|e| EntryFragment {
            name: e.name.clone(),
            amount: Some(i64::from(e.amount)),
        })
        .collect()
}
