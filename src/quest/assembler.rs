//! Quest Assembler
//!
//! Turns an `AuthoringState` snapshot into a `QuestResult`. Each call starts
//! from scratch: filter the slots, check the basics, drive fresh builders,
//! and let the schema have the final word.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::authoring::AuthoringState;
use super::builder::{BuilderError, ConditionBuilder, QuestBuilder, RewardBuilder};
use super::definition::Quest;
use super::filter::{self, QualifiedCondition, QualifiedObjective, QualifiedReward};

pub const TITLE_REQUIRED: &str = "Title is required";
pub const DESCRIPTION_REQUIRED: &str = "Description is required";
pub const REWARD_REQUIRED: &str =
    "At least one reward must have content (currency, fame, skills, or trade deals)";

fn default_placeholder_item() -> String {
    "Apple".to_string()
}

/// Tunables for assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    /// Item used by the fetch condition inserted when no condition qualifies
    #[serde(default = "default_placeholder_item")]
    pub placeholder_item: String,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            placeholder_item: default_placeholder_item(),
        }
    }
}

/// How far the pipeline got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Basic fields missing; nothing was built
    Incomplete,
    /// Builders ran but the schema rejected the draft
    BuildAttempt,
    /// The schema accepted the draft
    Built,
}

/// Outcome of one assembly: a quest, or the reasons there is none
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestResult {
    pub quest: Option<Quest>,
    pub errors: Vec<String>,
    pub stage: PipelineStage,
}

impl QuestResult {
    fn incomplete(errors: Vec<String>) -> Self {
        Self {
            quest: None,
            errors,
            stage: PipelineStage::Incomplete,
        }
    }

    fn rejected(errors: Vec<String>) -> Self {
        Self {
            quest: None,
            errors,
            stage: PipelineStage::BuildAttempt,
        }
    }

    fn built(quest: Quest) -> Self {
        Self {
            quest: Some(quest),
            errors: Vec::new(),
            stage: PipelineStage::Built,
        }
    }

    pub fn is_built(&self) -> bool {
        self.stage == PipelineStage::Built
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuestAssembler {
    options: AssemblyOptions,
}

impl QuestAssembler {
    pub fn new(options: AssemblyOptions) -> Self {
        Self { options }
    }

    /// Derive a quest from the snapshot.
    ///
    /// Problems with the user's data always end up in `QuestResult::errors`.
    /// `Err` is reserved for builder misuse.
    pub fn assemble(&self, state: &AuthoringState) -> Result<QuestResult, BuilderError> {
        let rewards: Vec<QualifiedReward> =
            state.rewards.iter().filter_map(filter::project_reward).collect();
        if rewards.len() < state.rewards.len() {
            debug!(
                "Dropped {} reward slot(s) without content",
                state.rewards.len() - rewards.len()
            );
        }

        let missing = completion_errors(state, rewards.len());
        if !missing.is_empty() {
            debug!("Quest incomplete: {:?}", missing);
            return Ok(QuestResult::incomplete(missing));
        }

        let mut builder = QuestBuilder::new();
        if let Some(npc) = state.npc {
            builder = builder.with_npc(npc);
        }
        if let Some(tier) = state.tier {
            builder = builder.with_tier(tier);
        }
        if let Some(title) = &state.title {
            builder = builder.with_title(title.as_str());
        }
        if let Some(description) = &state.description {
            builder = builder.with_description(description.as_str());
        }
        if let Some(hours) = filter::present(state.time_limit_hours) {
            builder = builder.with_time_limit(hours);
        }

        for reward in rewards {
            builder = builder.add_reward(|r| configure_reward(r, reward));
        }

        let conditions: Vec<QualifiedCondition> =
            state.conditions.iter().filter_map(filter::project_condition).collect();
        if conditions.is_empty() {
            debug!(
                "No qualifying conditions, adding placeholder fetch of '{}'",
                self.options.placeholder_item
            );
            let item = self.options.placeholder_item.as_str();
            builder = builder
                .add_fetch_condition(|c| c.with_sequence_index(0).require_items([(item, 1)]))?;
        }
        for condition in conditions {
            builder = add_condition(builder, condition)?;
        }

        match builder.build() {
            Ok(quest) => Ok(QuestResult::built(quest)),
            Err(errors) => {
                debug!("Schema rejected quest draft: {}", errors);
                Ok(QuestResult::rejected(errors.messages()))
            }
        }
    }
}

/// Assemble with default options
pub fn assemble(state: &AuthoringState) -> Result<QuestResult, BuilderError> {
    QuestAssembler::default().assemble(state)
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|s| s.trim().is_empty())
}

/// One message per missing basic requirement
fn completion_errors(state: &AuthoringState, qualifying_rewards: usize) -> Vec<String> {
    let mut errors = Vec::new();
    if is_blank(state.title.as_deref()) {
        errors.push(TITLE_REQUIRED.to_string());
    }
    if is_blank(state.description.as_deref()) {
        errors.push(DESCRIPTION_REQUIRED.to_string());
    }
    if qualifying_rewards == 0 {
        errors.push(REWARD_REQUIRED.to_string());
    }
    errors
}

fn configure_reward(builder: RewardBuilder, reward: QualifiedReward) -> RewardBuilder {
    let mut builder = builder.currency(reward.currency_normal, reward.currency_gold, reward.fame);
    for (skill, experience) in reward.skills {
        builder = builder.add_skill(skill, experience);
    }
    for (item, terms) in reward.trade_deals {
        builder = builder.add_trade_deal(item, terms);
    }
    builder
}

fn configure_common(builder: ConditionBuilder, condition: &QualifiedCondition) -> ConditionBuilder {
    let mut builder = builder.auto_complete(condition.auto_complete);
    if let Some(index) = condition.sequence_index {
        builder = builder.with_sequence_index(index);
    }
    if let Some(caption) = &condition.caption {
        builder = builder.with_caption(caption.as_str());
    }
    builder
}

fn add_condition(
    builder: QuestBuilder,
    condition: QualifiedCondition,
) -> Result<QuestBuilder, BuilderError> {
    match &condition.objective {
        QualifiedObjective::Fetch(items) => builder.add_fetch_condition(|c| {
            configure_common(c, &condition).require_items(items.iter().map(|(n, a)| (n.as_str(), *a)))
        }),
        QualifiedObjective::Elimination(targets) => builder.add_elimination_condition(|c| {
            configure_common(c, &condition)
                .eliminate_targets(targets.iter().map(|(n, a)| (n.as_str(), *a)))
        }),
        QualifiedObjective::Interaction(object) => builder.add_interaction_condition(|c| {
            configure_common(c, &condition).interact_with(object.as_str())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::authoring::{
        ConditionFragment, EntryFragment, RewardFragment, SkillFragment, TradeDealFragment,
    };
    use crate::quest::definition::{ConditionKind, ItemAmount, Npc, Objective, Skill, Tier};
    use crate::quest::schema::parse_quest_json;

    fn fame(amount: f64) -> RewardFragment {
        RewardFragment {
            fame: Some(amount),
            ..Default::default()
        }
    }

    fn state(title: &str, description: &str, rewards: Vec<RewardFragment>) -> AuthoringState {
        AuthoringState {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            rewards,
            ..Default::default()
        }
    }

    fn filled() -> AuthoringState {
        AuthoringState {
            npc: Some(Npc::Alchemist),
            tier: Some(2),
            title: Some("Brewing Trouble".to_string()),
            description: Some("The cauldron needs feeding".to_string()),
            time_limit_hours: Some(1.5),
            rewards: vec![
                RewardFragment {
                    currency_normal: Some(30.0),
                    skills: vec![SkillFragment { skill: Skill::Crafting, experience: Some(75.0) }],
                    trade_deals: vec![TradeDealFragment {
                        item: "Philter".to_string(),
                        price: Some(12.0),
                        allow_excluded: true,
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                RewardFragment::default(),
                fame(4.0),
            ],
            conditions: vec![
                ConditionFragment {
                    kind: ConditionKind::Fetch,
                    items: vec![EntryFragment { name: "Nightshade".to_string(), amount: Some(3) }],
                    ..Default::default()
                },
                ConditionFragment {
                    kind: ConditionKind::Elimination,
                    ..Default::default()
                },
                ConditionFragment {
                    kind: ConditionKind::Elimination,
                    sequence_index: Some(1),
                    can_be_auto_completed: true,
                    target_characters: vec![EntryFragment { name: "Bog Witch".to_string(), amount: Some(1) }],
                    ..Default::default()
                },
                ConditionFragment {
                    kind: ConditionKind::Interaction,
                    sequence_index: Some(2),
                    tracking_caption: Some("Stir the pot".to_string()),
                    interaction_object: Some("Cauldron".to_string()),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_minimal_quest_gets_default_fetch_condition() {
        let result = assemble(&state("Get Apples", "Bring apples", vec![fame(10.0)])).unwrap();

        assert_eq!(result.stage, PipelineStage::Built);
        assert!(result.errors.is_empty());
        let quest = result.quest.unwrap();
        assert_eq!(quest.conditions.len(), 1);
        assert_eq!(quest.conditions[0].sequence_index, 0);
        assert_eq!(
            quest.conditions[0].objective,
            Objective::Fetch {
                items: vec![ItemAmount { name: "Apple".to_string(), amount: 1 }]
            }
        );
        assert_eq!(quest.reward_pool[0].fame, Some(10));
    }

    #[test]
    fn test_placeholder_item_is_configurable() {
        let assembler = QuestAssembler::new(AssemblyOptions {
            placeholder_item: "Token".to_string(),
        });
        let quest = assembler
            .assemble(&state("t", "d", vec![fame(1.0)]))
            .unwrap()
            .quest
            .unwrap();
        assert_eq!(
            quest.conditions[0].objective,
            Objective::Fetch {
                items: vec![ItemAmount { name: "Token".to_string(), amount: 1 }]
            }
        );
    }

    #[test]
    fn test_missing_title() {
        let rewards = vec![RewardFragment {
            currency_normal: Some(5.0),
            ..Default::default()
        }];
        let result = assemble(&state("", "x", rewards)).unwrap();

        assert_eq!(result.errors, vec![TITLE_REQUIRED.to_string()]);
        assert_eq!(result.quest, None);
        assert_eq!(result.stage, PipelineStage::Incomplete);
    }

    #[test]
    fn test_empty_reward_is_excluded() {
        let blank = RewardFragment {
            currency_normal: Some(0.0),
            ..Default::default()
        };
        let result = assemble(&state("Title", "Description", vec![blank.clone()])).unwrap();
        assert_eq!(result.errors, vec![REWARD_REQUIRED.to_string()]);
        assert!(result.errors[0].starts_with("At least one reward must have content"));

        let quest = assemble(&state("Title", "Description", vec![blank, fame(2.0)]))
            .unwrap()
            .quest
            .unwrap();
        assert_eq!(quest.reward_pool.len(), 1);
        assert_eq!(quest.reward_pool[0].fame, Some(2));
    }

    #[test]
    fn test_full_state_builds() {
        let quest = assemble(&filled()).unwrap().quest.unwrap();

        assert_eq!(quest.associated_npc, Npc::Alchemist);
        assert_eq!(quest.tier, Tier::Two);
        assert_eq!(quest.time_limit_hours, Some(1.5));
        assert_eq!(quest.reward_pool.len(), 2);
        assert!(quest.reward_pool.iter().all(|pool| pool.has_content()));
        assert_eq!(quest.reward_pool[0].trade_deals[0].allow_excluded, Some(true));
        assert_eq!(quest.reward_pool[0].trade_deals[0].amount, None);

        let kinds: Vec<ConditionKind> = quest.conditions.iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![ConditionKind::Fetch, ConditionKind::Elimination, ConditionKind::Interaction]
        );
        assert!(quest.conditions[1].can_be_auto_completed);
        assert_eq!(quest.conditions[2].tracking_caption.as_deref(), Some("Stir the pot"));
    }

    #[test]
    fn test_schema_errors_replace_completion_errors() {
        let mut snapshot = filled();
        snapshot.tier = Some(7);
        snapshot.rewards[0].skills[0].experience = Some(-1.0);

        let result = assemble(&snapshot).unwrap();
        assert_eq!(result.stage, PipelineStage::BuildAttempt);
        assert_eq!(result.quest, None);
        assert_eq!(
            result.errors,
            vec![
                "Tier: Tier must be 1, 2 or 3 (got 7)".to_string(),
                "RewardPool.0.Skills.0.Experience: Expected a positive whole number".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_npc_is_a_schema_error() {
        let mut snapshot = state("t", "d", vec![fame(1.0)]);
        snapshot.npc = None;

        let result = assemble(&snapshot).unwrap();
        assert_eq!(result.stage, PipelineStage::BuildAttempt);
        assert_eq!(result.errors, vec!["AssociatedNpc: Required".to_string()]);
    }

    #[test]
    fn test_assembly_is_idempotent_and_read_only() {
        let snapshot = filled();
        let before = snapshot.clone();

        let first = assemble(&snapshot).unwrap();
        let second = assemble(&snapshot).unwrap();

        assert_eq!(first, second);
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_completion_errors_shrink_as_fields_arrive() {
        let mut snapshot = AuthoringState::new();
        let mut last = assemble(&snapshot).unwrap().errors.len();
        assert_eq!(last, 3);

        snapshot.description = Some("Something to do".to_string());
        let count = assemble(&snapshot).unwrap().errors.len();
        assert!(count <= last);
        last = count;

        snapshot.rewards.push(fame(5.0));
        let count = assemble(&snapshot).unwrap().errors.len();
        assert!(count <= last);

        snapshot.title = Some("Now complete".to_string());
        let result = assemble(&snapshot).unwrap();
        assert_ne!(result.stage, PipelineStage::Incomplete);
        assert!(result.is_built());
    }

    #[test]
    fn test_blank_rewards_never_reach_the_quest() {
        let blanks = vec![
            RewardFragment::default(),
            RewardFragment {
                currency_gold: Some(0.0),
                skills: vec![SkillFragment { skill: Skill::Mining, experience: None }],
                ..Default::default()
            },
            RewardFragment {
                trade_deals: vec![TradeDealFragment { item: " ".to_string(), ..Default::default() }],
                ..Default::default()
            },
        ];
        for blank in blanks {
            let quest = assemble(&state("t", "d", vec![blank, fame(1.0), RewardFragment::default()]))
                .unwrap()
                .quest
                .unwrap();
            assert_eq!(quest.reward_pool.len(), 1);
        }
    }

    #[test]
    fn test_built_quest_round_trips_through_json() {
        let quest = assemble(&filled()).unwrap().quest.unwrap();
        let text = quest.to_json().unwrap();
        assert_eq!(parse_quest_json(&text).unwrap(), quest);

        let minimal = assemble(&state("Get Apples", "Bring apples", vec![fame(10.0)]))
            .unwrap()
            .quest
            .unwrap();
        assert_eq!(parse_quest_json(&minimal.to_json().unwrap()).unwrap(), minimal);
    }

    #[test]
    fn test_time_limit_survives_json_exactly() {
        for hours in [188.95088582774554, 0.1 + 0.2, 1.0 / 3.0, 72.000000000000014] {
            let mut snapshot = state("Timed", "Against the clock", vec![fame(1.0)]);
            snapshot.time_limit_hours = Some(hours);
            let quest = assemble(&snapshot).unwrap().quest.unwrap();

            let reloaded = parse_quest_json(&quest.to_json().unwrap()).unwrap();
            assert_eq!(reloaded.time_limit_hours, Some(hours));
            assert_eq!(reloaded, quest);
        }
    }

    #[test]
    fn test_loaded_state_reassembles_to_same_quest() {
        let quest = assemble(&filled()).unwrap().quest.unwrap();

        let mut editor = AuthoringState::new();
        editor.load_json(&quest.to_json().unwrap()).unwrap();

        assert_eq!(assemble(&editor).unwrap().quest, Some(quest));
    }
}
