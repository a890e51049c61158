//! Quest Definition Structures
//!
//! Two layers, mirroring how quests travel through the engine:
//! loosely-typed drafts (what builders accumulate and what JSON files
//! deserialize into) and the validated `Quest` produced by the schema.

use serde::{Deserialize, Serialize};

// ============================================================================
// Enumerations
// ============================================================================

/// NPCs that can hand out quests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Npc {
    #[default]
    Innkeeper,
    Blacksmith,
    Merchant,
    Hunter,
    Alchemist,
    Captain,
}

impl Npc {
    pub const ALL: [Npc; 6] = [
        Npc::Innkeeper,
        Npc::Blacksmith,
        Npc::Merchant,
        Npc::Hunter,
        Npc::Alchemist,
        Npc::Captain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Npc::Innkeeper => "Innkeeper",
            Npc::Blacksmith => "Blacksmith",
            Npc::Merchant => "Merchant",
            Npc::Hunter => "Hunter",
            Npc::Alchemist => "Alchemist",
            Npc::Captain => "Captain",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|npc| npc.as_str() == s)
    }
}

/// Skills that reward experience can be granted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Skill {
    #[default]
    Combat,
    Hitpoints,
    Mining,
    Fishing,
    Crafting,
    Trading,
}

impl Skill {
    pub const ALL: [Skill; 6] = [
        Skill::Combat,
        Skill::Hitpoints,
        Skill::Mining,
        Skill::Fishing,
        Skill::Crafting,
        Skill::Trading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::Combat => "Combat",
            Skill::Hitpoints => "Hitpoints",
            Skill::Mining => "Mining",
            Skill::Fishing => "Fishing",
            Skill::Crafting => "Crafting",
            Skill::Trading => "Trading",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|skill| skill.as_str() == s)
    }
}

/// Quest difficulty tier, serialized as the bare number 1, 2 or 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Tier {
    One = 1,
    Two = 2,
    Three = 3,
}

impl Tier {
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Tier::One),
            2 => Some(Tier::Two),
            3 => Some(Tier::Three),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.number()
    }
}

/// Discriminator shared by condition drafts, authoring fragments and builders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConditionKind {
    #[default]
    Fetch,
    Elimination,
    Interaction,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Fetch => "Fetch",
            ConditionKind::Elimination => "Elimination",
            ConditionKind::Interaction => "Interaction",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Fetch" => Some(ConditionKind::Fetch),
            "Elimination" => Some(ConditionKind::Elimination),
            "Interaction" => Some(ConditionKind::Interaction),
            _ => None,
        }
    }
}

// ============================================================================
// Draft Structures (builder output, JSON input)
// ============================================================================

/// Unvalidated quest as accumulated by `QuestBuilder` or read from JSON.
///
/// Numbers are kept as `f64` and enums as strings so that the schema, not
/// the deserializer, decides what is out of range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuestDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_npc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_hours: Option<f64>,
    #[serde(default)]
    pub reward_pool: Vec<RewardDraft>,
    #[serde(default)]
    pub conditions: Vec<ConditionDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RewardDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_normal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_gold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fame: Option<f64>,
    #[serde(default)]
    pub skills: Vec<SkillRewardDraft>,
    #[serde(default)]
    pub trade_deals: Vec<TradeDealDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SkillRewardDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TradeDealDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fame: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_excluded: Option<bool>,
}

/// Flat condition draft; `Type` selects which of the kind-specific fields apply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConditionDraft {
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_be_auto_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemAmountDraft>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_characters: Option<Vec<ItemAmountDraft>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_object: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemAmountDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

// ============================================================================
// Validated Quest Structures
// ============================================================================

/// A named thing with a count: fetched items or characters to eliminate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemAmount {
    pub name: String,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SkillReward {
    pub skill: Skill,
    pub experience: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TradeDeal {
    pub item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fame: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_excluded: Option<bool>,
}

/// One alternative bundle of rewards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RewardPool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_normal: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_gold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fame: Option<u32>,
    pub skills: Vec<SkillReward>,
    pub trade_deals: Vec<TradeDeal>,
}

impl RewardPool {
    /// True if at least one facet would actually give the player something
    pub fn has_content(&self) -> bool {
        let positive = |v: Option<u32>| v.is_some_and(|n| n > 0);
        positive(self.currency_normal)
            || positive(self.currency_gold)
            || positive(self.fame)
            || self.skills.iter().any(|s| s.experience > 0)
            || self.trade_deals.iter().any(|d| !d.item.trim().is_empty())
    }
}

/// What a condition asks the player to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "Type")]
pub enum Objective {
    #[serde(rename_all = "PascalCase")]
    Fetch { items: Vec<ItemAmount> },
    #[serde(rename_all = "PascalCase")]
    Elimination { target_characters: Vec<ItemAmount> },
    #[serde(rename_all = "PascalCase")]
    Interaction { interaction_object: String },
}

impl Objective {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Objective::Fetch { .. } => ConditionKind::Fetch,
            Objective::Elimination { .. } => ConditionKind::Elimination,
            Objective::Interaction { .. } => ConditionKind::Interaction,
        }
    }
}

/// A single completion requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Condition {
    #[serde(flatten)]
    pub objective: Objective,
    pub sequence_index: u32,
    pub can_be_auto_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_caption: Option<String>,
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        self.objective.kind()
    }
}

/// A fully validated quest definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quest {
    pub associated_npc: Npc,
    pub tier: Tier,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_hours: Option<f64>,
    pub reward_pool: Vec<RewardPool>,
    pub conditions: Vec<Condition>,
}

impl Quest {
    /// Canonical JSON form, as read back by `schema::parse_quest_json`
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
