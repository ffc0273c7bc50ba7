use chrono::{DateTime, Utc};

use crate::model::sequence::{CrossingKind, PracticeMode, Step};
use crate::model::summary::PracticeSummary;

//
// ─── CATEGORIES ────────────────────────────────────────────────────────────────
//

/// Bucket a completed drill is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressCategory {
    CountingBy(Step),
    Crossing(CrossingKind),
}

impl ProgressCategory {
    /// Categories listed on the stats board, in display order.
    pub const TRACKED: [ProgressCategory; 6] = [
        ProgressCategory::CountingBy(Step::Two),
        ProgressCategory::CountingBy(Step::Three),
        ProgressCategory::CountingBy(Step::Five),
        ProgressCategory::CountingBy(Step::Ten),
        ProgressCategory::Crossing(CrossingKind::Decade),
        ProgressCategory::Crossing(CrossingKind::Hundred),
    ];

    #[must_use]
    pub fn of(summary: &PracticeSummary) -> Self {
        let config = summary.config();
        match config.mode() {
            PracticeMode::Pattern => Self::CountingBy(config.step()),
            PracticeMode::Crossing(kind) => Self::Crossing(kind),
        }
    }

    #[must_use]
    pub fn label(self) -> String {
        match self {
            ProgressCategory::CountingBy(step) => format!("Counting by {step}s"),
            ProgressCategory::Crossing(CrossingKind::Decade) => "Decade Crossing".to_string(),
            ProgressCategory::Crossing(CrossingKind::Hundred) => "Hundred Crossing".to_string(),
        }
    }

    /// Completed drills needed to fill the progress bar.
    #[must_use]
    pub fn target(self) -> u32 {
        match self {
            ProgressCategory::CountingBy(_) => 20,
            ProgressCategory::Crossing(CrossingKind::Decade) => 10,
            ProgressCategory::Crossing(CrossingKind::Hundred) => 5,
        }
    }
}

/// Completion count for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStat {
    pub category: ProgressCategory,
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
}

impl ProgressStat {
    fn new(category: ProgressCategory, completed: u32) -> Self {
        let total = category.target();
        let pct = (u64::from(completed) * 100 / u64::from(total.max(1))).min(100);
        Self {
            category,
            completed,
            total,
            percentage: u8::try_from(pct).unwrap_or(100),
        }
    }
}

//
// ─── ACHIEVEMENTS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementTier {
    Star,
    Badge,
    Trophy,
}

impl AchievementTier {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AchievementTier::Star => "star",
            AchievementTier::Badge => "badge",
            AchievementTier::Trophy => "trophy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementKind {
    CountingByTwos,
    CountingByFives,
    CountingByTens,
    DecadeMaster,
    HundredHero,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 5] = [
        AchievementKind::CountingByTwos,
        AchievementKind::CountingByFives,
        AchievementKind::CountingByTens,
        AchievementKind::DecadeMaster,
        AchievementKind::HundredHero,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            AchievementKind::CountingByTwos => "Counting by 2s",
            AchievementKind::CountingByFives => "Counting by 5s",
            AchievementKind::CountingByTens => "Counting by 10s",
            AchievementKind::DecadeMaster => "Decade Master",
            AchievementKind::HundredHero => "Hundred Hero",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            AchievementKind::CountingByTwos => "Completed 5 exercises counting by 2s",
            AchievementKind::CountingByFives => "Completed 5 exercises counting by 5s",
            AchievementKind::CountingByTens => "Completed 5 exercises counting by 10s",
            AchievementKind::DecadeMaster => "Successfully crossed decades 10 times",
            AchievementKind::HundredHero => "Successfully crossed hundreds 5 times",
        }
    }

    #[must_use]
    pub fn tier(self) -> AchievementTier {
        match self {
            AchievementKind::CountingByTwos | AchievementKind::CountingByFives => {
                AchievementTier::Star
            }
            AchievementKind::CountingByTens | AchievementKind::DecadeMaster => {
                AchievementTier::Badge
            }
            AchievementKind::HundredHero => AchievementTier::Trophy,
        }
    }

    fn threshold(self) -> u32 {
        match self {
            AchievementKind::CountingByTwos
            | AchievementKind::CountingByFives
            | AchievementKind::CountingByTens => 5,
            AchievementKind::DecadeMaster => 10,
            AchievementKind::HundredHero => 5,
        }
    }

    /// How much one summary contributes towards this achievement.
    fn contribution(self, summary: &PracticeSummary) -> u32 {
        let category = ProgressCategory::of(summary);
        match self {
            AchievementKind::CountingByTwos => {
                u32::from(category == ProgressCategory::CountingBy(Step::Two))
            }
            AchievementKind::CountingByFives => {
                u32::from(category == ProgressCategory::CountingBy(Step::Five))
            }
            AchievementKind::CountingByTens => {
                u32::from(category == ProgressCategory::CountingBy(Step::Ten))
            }
            AchievementKind::DecadeMaster => summary.decade_crossings(),
            AchievementKind::HundredHero => summary.hundred_crossings(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub kind: AchievementKind,
    pub progress: u32,
    pub threshold: u32,
    /// Completion time of the drill that reached the threshold.
    pub earned_at: Option<DateTime<Utc>>,
}

impl Achievement {
    #[must_use]
    pub fn is_earned(&self) -> bool {
        self.earned_at.is_some()
    }
}

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub stats: Vec<ProgressStat>,
    pub achievements: Vec<Achievement>,
}

impl ProgressReport {
    /// Aggregate summaries in any order into stats and achievements.
    #[must_use]
    pub fn from_summaries(summaries: &[PracticeSummary]) -> Self {
        let mut ordered: Vec<&PracticeSummary> = summaries.iter().collect();
        ordered.sort_by_key(|s| s.completed_at());

        let stats = ProgressCategory::TRACKED
            .iter()
            .map(|&category| {
                let completed = ordered
                    .iter()
                    .filter(|s| ProgressCategory::of(s) == category)
                    .count();
                ProgressStat::new(category, u32::try_from(completed).unwrap_or(u32::MAX))
            })
            .collect();

        let achievements = AchievementKind::ALL
            .iter()
            .map(|&kind| {
                let threshold = kind.threshold();
                let mut progress = 0_u32;
                let mut earned_at = None;
                for summary in &ordered {
                    progress = progress.saturating_add(kind.contribution(summary));
                    if earned_at.is_none() && progress >= threshold {
                        earned_at = Some(summary.completed_at());
                    }
                }
                Achievement {
                    kind,
                    progress,
                    threshold,
                    earned_at,
                }
            })
            .collect();

        Self {
            stats,
            achievements,
        }
    }
}
