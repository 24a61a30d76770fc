//! The fixed warmup stage table.
//!
//! Thresholds are non-decreasing in both age and karma, so reaching stage S
//! implies every lower stage's thresholds are met too.

use crate::types::{ActionKind, WarmupStage};

pub struct StageRequirement {
    pub stage: WarmupStage,
    pub min_age_days: i64,
    pub min_karma: i64,
    pub actions: &'static [ActionKind],
}

const STAGES: [StageRequirement; 6] = [
    StageRequirement {
        stage: WarmupStage::New,
        min_age_days: 0,
        min_karma: 0,
        actions: &[],
    },
    StageRequirement {
        stage: WarmupStage::Browsing,
        min_age_days: 1,
        min_karma: 0,
        actions: &[ActionKind::Upvote],
    },
    StageRequirement {
        stage: WarmupStage::Upvoting,
        min_age_days: 3,
        min_karma: 0,
        actions: &[ActionKind::Upvote, ActionKind::Save],
    },
    StageRequirement {
        stage: WarmupStage::Commenting,
        min_age_days: 5,
        min_karma: 10,
        actions: &[ActionKind::Upvote, ActionKind::Comment],
    },
    StageRequirement {
        stage: WarmupStage::Posting,
        min_age_days: 10,
        min_karma: 50,
        actions: &[ActionKind::Upvote, ActionKind::Comment, ActionKind::Post],
    },
    StageRequirement {
        stage: WarmupStage::Ready,
        min_age_days: 14,
        min_karma: 100,
        actions: &[
            ActionKind::Upvote,
            ActionKind::Save,
            ActionKind::Comment,
            ActionKind::Post,
        ],
    },
];

pub fn table() -> &'static [StageRequirement] {
    &STAGES
}

pub fn requirement(stage: WarmupStage) -> &'static StageRequirement {
    &STAGES[stage.index()]
}

pub fn permits(stage: WarmupStage, kind: ActionKind) -> bool {
    requirement(stage).actions.contains(&kind)
}

impl StageRequirement {
    pub fn is_met(&self, age_days: i64, karma: i64) -> bool {
        age_days >= self.min_age_days && karma >= self.min_karma
    }
}

/// Highest stage whose thresholds hold, scanning upward and stopping at the
/// first stage that is not met.
pub fn qualifying_stage(age_days: i64, karma: i64) -> WarmupStage {
    let mut best = WarmupStage::New;
    for req in table() {
        if !req.is_met(age_days, karma) {
            break;
        }
        best = req.stage;
    }
    best
}
