//! Quest Authoring Module
//!
//! Assembles validated quests from sparse editor state. Fragments are
//! filtered, fed through fluent builders into a draft, and the draft is
//! checked by the schema. Also provides a catalog of quest files on disk.

pub mod assembler;
pub mod authoring;
pub mod builder;
pub mod catalog;
pub mod definition;
pub mod filter;
pub mod schema;

pub use assembler::{assemble, AssemblyOptions, PipelineStage, QuestAssembler, QuestResult};
pub use authoring::{AuthoringState, ConditionFragment, EntryFragment, RewardFragment};
pub use builder::{BuilderError, ConditionBuilder, QuestBuilder, RewardBuilder, TradeTerms};
pub use catalog::{HotReloadEvent, QuestCatalog, Rejection};
pub use definition::{Condition, ConditionKind, Npc, Objective, Quest, QuestDraft, RewardPool, Skill, Tier};
pub use schema::{parse_quest_json, validate, LoadError, ValidationErrors, ValidationIssue};
