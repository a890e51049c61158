//! Fluent Quest Builders
//!
//! Builders only accumulate a `QuestDraft`. They never reject values on
//! their own; `QuestBuilder::build` hands the draft to the schema. The one
//! thing they do refuse is being wired up wrong, e.g. asking a fetch
//! condition builder for elimination targets.

use thiserror::Error;

use super::definition::{
    ConditionDraft, ConditionKind, ItemAmountDraft, Npc, Quest, QuestDraft, RewardDraft, Skill,
    SkillRewardDraft, TradeDealDraft,
};
use super::schema::{self, ValidationErrors};

/// Misuse of a builder by the code composing it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("`{method}` requires a {expected} condition, but this builder is configured for {actual}")]
    WrongConditionKind {
        method: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("`{method}` called before a condition kind was selected")]
    KindNotSelected { method: &'static str },

    #[error("condition kind already selected as {current}, cannot switch to {requested}")]
    KindAlreadySelected {
        current: &'static str,
        requested: &'static str,
    },
}

// ============================================================================
// Quest Builder
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct QuestBuilder {
    draft: QuestDraft,
}

impl QuestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_npc(mut self, npc: Npc) -> Self {
        self.draft.associated_npc = Some(npc.as_str().to_string());
        self
    }

    pub fn with_tier(mut self, tier: i64) -> Self {
        self.draft.tier = Some(tier as f64);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.draft.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.draft.description = Some(description.into());
        self
    }

    pub fn with_time_limit(mut self, hours: f64) -> Self {
        self.draft.time_limit_hours = Some(hours);
        self
    }

    /// Append a reward pool configured on a fresh `RewardBuilder`
    pub fn add_reward(mut self, configure: impl FnOnce(RewardBuilder) -> RewardBuilder) -> Self {
        let reward = configure(RewardBuilder::new()).build();
        self.draft.reward_pool.push(reward);
        self
    }

    pub fn add_fetch_condition(
        self,
        configure: impl FnOnce(ConditionBuilder) -> Result<ConditionBuilder, BuilderError>,
    ) -> Result<Self, BuilderError> {
        self.add_condition(ConditionKind::Fetch, configure)
    }

    pub fn add_elimination_condition(
        self,
        configure: impl FnOnce(ConditionBuilder) -> Result<ConditionBuilder, BuilderError>,
    ) -> Result<Self, BuilderError> {
        self.add_condition(ConditionKind::Elimination, configure)
    }

    pub fn add_interaction_condition(
        self,
        configure: impl FnOnce(ConditionBuilder) -> Result<ConditionBuilder, BuilderError>,
    ) -> Result<Self, BuilderError> {
        self.add_condition(ConditionKind::Interaction, configure)
    }

    fn add_condition(
        mut self,
        kind: ConditionKind,
        configure: impl FnOnce(ConditionBuilder) -> Result<ConditionBuilder, BuilderError>,
    ) -> Result<Self, BuilderError> {
        let seeded = ConditionBuilder::new().select(kind)?;
        let condition = configure(seeded)?.build()?;
        self.draft.conditions.push(condition);
        Ok(self)
    }

    /// The draft accumulated so far
    pub fn draft(&self) -> &QuestDraft {
        &self.draft
    }

    /// Run the schema without consuming the builder
    pub fn validate(&self) -> Result<Quest, ValidationErrors> {
        schema::validate(&self.draft)
    }

    pub fn build(self) -> Result<Quest, ValidationErrors> {
        schema::validate(&self.draft)
    }
}

// ============================================================================
// Reward Builder
// ============================================================================

/// Optional terms of a trade deal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TradeTerms {
    pub price: Option<f64>,
    pub amount: Option<f64>,
    pub fame: Option<f64>,
    pub allow_excluded: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct RewardBuilder {
    draft: RewardDraft,
}

impl RewardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn currency(mut self, normal: Option<f64>, gold: Option<f64>, fame: Option<f64>) -> Self {
        self.draft.currency_normal = normal;
        self.draft.currency_gold = gold;
        self.draft.fame = fame;
        self
    }

    pub fn add_skill(mut self, skill: Skill, experience: f64) -> Self {
        self.draft.skills.push(SkillRewardDraft {
            skill: Some(skill.as_str().to_string()),
            experience: Some(experience),
        });
        self
    }

    pub fn add_trade_deal(mut self, item: impl Into<String>, terms: TradeTerms) -> Self {
        self.draft.trade_deals.push(TradeDealDraft {
            item: Some(item.into()),
            price: terms.price,
            amount: terms.amount,
            fame: terms.fame,
            allow_excluded: terms.allow_excluded,
        });
        self
    }

    pub fn build(self) -> RewardDraft {
        self.draft
    }
}

// ============================================================================
// Condition Builder
// ============================================================================

/// Kind-specific payload, fixed once a kind is selected
#[derive(Debug, Clone)]
enum ConditionShape {
    Fetch { items: Vec<ItemAmountDraft> },
    Elimination { targets: Vec<ItemAmountDraft> },
    Interaction { object: Option<String> },
}

impl ConditionShape {
    fn empty(kind: ConditionKind) -> Self {
        match kind {
            ConditionKind::Fetch => ConditionShape::Fetch { items: Vec::new() },
            ConditionKind::Elimination => ConditionShape::Elimination { targets: Vec::new() },
            ConditionKind::Interaction => ConditionShape::Interaction { object: None },
        }
    }

    fn kind(&self) -> ConditionKind {
        match self {
            ConditionShape::Fetch { .. } => ConditionKind::Fetch,
            ConditionShape::Elimination { .. } => ConditionKind::Elimination,
            ConditionShape::Interaction { .. } => ConditionKind::Interaction,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConditionBuilder {
    shape: Option<ConditionShape>,
    sequence_index: Option<f64>,
    auto_complete: bool,
    caption: Option<String>,
}

fn amounts<S: Into<String>>(entries: impl IntoIterator<Item = (S, i64)>) -> Vec<ItemAmountDraft> {
    entries
        .into_iter()
        .map(|(name, amount)| ItemAmountDraft {
            name: Some(name.into()),
            amount: Some(amount as f64),
        })
        .collect()
}

impl ConditionBuilder {
    /// A builder with no kind selected yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> Option<ConditionKind> {
        self.shape.as_ref().map(ConditionShape::kind)
    }

    fn select(mut self, kind: ConditionKind) -> Result<Self, BuilderError> {
        if let Some(current) = self.kind() {
            return Err(BuilderError::KindAlreadySelected {
                current: current.as_str(),
                requested: kind.as_str(),
            });
        }
        self.shape = Some(ConditionShape::empty(kind));
        Ok(self)
    }

    pub fn as_fetch(self) -> Result<Self, BuilderError> {
        self.select(ConditionKind::Fetch)
    }

    pub fn as_elimination(self) -> Result<Self, BuilderError> {
        self.select(ConditionKind::Elimination)
    }

    pub fn as_interaction(self) -> Result<Self, BuilderError> {
        self.select(ConditionKind::Interaction)
    }

    fn wrong_kind(&self, method: &'static str, expected: ConditionKind) -> BuilderError {
        match self.kind() {
            Some(actual) => BuilderError::WrongConditionKind {
                method,
                expected: expected.as_str(),
                actual: actual.as_str(),
            },
            None => BuilderError::KindNotSelected { method },
        }
    }

    /// Append items to fetch. Fetch conditions only.
    pub fn require_items<S: Into<String>>(
        mut self,
        items: impl IntoIterator<Item = (S, i64)>,
    ) -> Result<Self, BuilderError> {
        match &mut self.shape {
            Some(ConditionShape::Fetch { items: existing }) => {
                existing.extend(amounts(items));
                Ok(self)
            }
            _ => Err(self.wrong_kind("require_items", ConditionKind::Fetch)),
        }
    }

    /// Append characters to eliminate. Elimination conditions only.
    pub fn eliminate_targets<S: Into<String>>(
        mut self,
        targets: impl IntoIterator<Item = (S, i64)>,
    ) -> Result<Self, BuilderError> {
        match &mut self.shape {
            Some(ConditionShape::Elimination { targets: existing }) => {
                existing.extend(amounts(targets));
                Ok(self)
            }
            _ => Err(self.wrong_kind("eliminate_targets", ConditionKind::Elimination)),
        }
    }

    /// Set the object to interact with. Interaction conditions only.
    pub fn interact_with(mut self, object: impl Into<String>) -> Result<Self, BuilderError> {
        match &mut self.shape {
            Some(ConditionShape::Interaction { object: existing }) => {
                *existing = Some(object.into());
                Ok(self)
            }
            _ => Err(self.wrong_kind("interact_with", ConditionKind::Interaction)),
        }
    }

    pub fn with_sequence_index(mut self, index: i64) -> Self {
        self.sequence_index = Some(index as f64);
        self
    }

    pub fn auto_complete(mut self, enabled: bool) -> Self {
        self.auto_complete = enabled;
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn build(self) -> Result<ConditionDraft, BuilderError> {
        let shape = self
            .shape
            .ok_or(BuilderError::KindNotSelected { method: "build" })?;
        let kind = shape.kind();

        let mut draft = ConditionDraft {
            kind: Some(kind.as_str().to_string()),
            sequence_index: Some(self.sequence_index.unwrap_or(0.0)),
            can_be_auto_completed: Some(self.auto_complete),
            tracking_caption: self.caption,
            ..Default::default()
        };
        match shape {
            ConditionShape::Fetch { items } => draft.items = Some(items),
            ConditionShape::Elimination { targets } => draft.target_characters = Some(targets),
            ConditionShape::Interaction { object } => draft.interaction_object = object,
        }
        Ok(draft)
    }
}
