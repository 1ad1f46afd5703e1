//! Aggregate health reports over a rolling window of daily records.
//!
//! A report averages the most recent records, scores the averages and
//! attaches per-metric recommendations:
//! - Sleep: below 7h, above 9h, or on target
//! - Water: below 8 cups or on target
//! - Mood: below 3 (low), below 4 (fair), otherwise good

use crate::metrics::{score_averages, WindowAverages};
use crate::records::RecordStore;
use std::fmt;

/// Qualitative band of a health score
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreRating {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreRating::Excellent
        } else if score >= 60.0 {
            ScoreRating::Good
        } else {
            ScoreRating::NeedsImprovement
        }
    }

    pub fn feedback(self) -> &'static str {
        match self {
            ScoreRating::Excellent => "Excellent! Keep up the great work!",
            ScoreRating::Good => "Good! There's room for improvement.",
            ScoreRating::NeedsImprovement => "Needs improvement. Focus on consistency!",
        }
    }
}

impl fmt::Display for ScoreRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScoreRating::Excellent => "Excellent",
            ScoreRating::Good => "Good",
            ScoreRating::NeedsImprovement => "Needs improvement",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Sleep,
    Water,
    Mood,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Sleep => write!(f, "Sleep"),
            Metric::Water => write!(f, "Water"),
            Metric::Mood => write!(f, "Mood"),
        }
    }
}

/// How an average compares to its recommended range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Standing {
    BelowRange,
    OnTarget,
    AboveRange,
    /// Mood bands
    Low,
    Fair,
    Good,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub metric: Metric,
    pub standing: Standing,
    pub summary: String,
    pub tips: &'static [&'static str],
}

impl Recommendation {
    pub fn sleep(avg: f64) -> Self {
        let (standing, summary, tips): (_, _, &'static [&'static str]) = if avg < 7.0 {
            (
                Standing::BelowRange,
                format!(
                    "Your average sleep is {:.1} hours, which is below the recommended 7-9 hours.",
                    avg
                ),
                &[
                    "Try to go to bed 30 minutes earlier",
                    "Avoid screens 1 hour before bedtime",
                    "Create a relaxing bedtime routine",
                    "Keep your bedroom dark and cool",
                ],
            )
        } else if avg > 9.0 {
            (
                Standing::AboveRange,
                format!(
                    "Your average sleep is {:.1} hours, which is above the recommended range.",
                    avg
                ),
                &[
                    "Maintain consistent wake-up times",
                    "Ensure quality over quantity of sleep",
                    "Consult a doctor if consistently sleeping >9 hours",
                ],
            )
        } else {
            (
                Standing::OnTarget,
                format!(
                    "Great! Your average sleep is {:.1} hours, within the healthy range.",
                    avg
                ),
                &[
                    "Maintain your current sleep schedule",
                    "Continue good sleep hygiene practices",
                ],
            )
        };
        Self {
            metric: Metric::Sleep,
            standing,
            summary,
            tips,
        }
    }

    pub fn water(avg: f64) -> Self {
        let (standing, summary, tips): (_, _, &'static [&'static str]) = if avg < 8.0 {
            (
                Standing::BelowRange,
                format!(
                    "Your average water intake is {:.1} cups, below the recommended 8-10 cups.",
                    avg
                ),
                &[
                    "Drink a glass of water after waking up",
                    "Keep a water bottle with you at all times",
                    "Set reminders to drink water every hour",
                    "Eat water-rich fruits and vegetables",
                ],
            )
        } else {
            (
                Standing::OnTarget,
                format!("Excellent! Your average water intake is {:.1} cups.", avg),
                &[
                    "Continue your good hydration habits",
                    "Monitor urine color (aim for pale yellow)",
                ],
            )
        };
        Self {
            metric: Metric::Water,
            standing,
            summary,
            tips,
        }
    }

    pub fn mood(avg: f64) -> Self {
        let (standing, summary, tips): (_, _, &'static [&'static str]) = if avg < 3.0 {
            (
                Standing::Low,
                format!("Your average mood is {:.1}/5, which could be improved.", avg),
                &[
                    "Practice daily gratitude journaling",
                    "Spend time outdoors in nature",
                    "Connect with friends and family",
                    "Engage in physical activity you enjoy",
                    "Consider mindfulness or meditation",
                ],
            )
        } else if avg < 4.0 {
            (
                Standing::Fair,
                format!("Your average mood is {:.1}/5.", avg),
                &[
                    "Identify what brings you joy",
                    "Set small, achievable goals",
                    "Practice self-care regularly",
                    "Seek support when needed",
                ],
            )
        } else {
            (
                Standing::Good,
                format!("Excellent! Your average mood is {:.1}/5.", avg),
                &[
                    "Continue activities that make you happy",
                    "Share positivity with others",
                    "Maintain work-life balance",
                ],
            )
        };
        Self {
            metric: Metric::Mood,
            standing,
            summary,
            tips,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HealthReport {
    /// Number of days with a record, across all history
    pub total_days: usize,
    pub averages: WindowAverages,
    pub score: f64,
    pub rating: ScoreRating,
    /// Empty when no records exist
    pub recommendations: Vec<Recommendation>,
}

impl HealthReport {
    /// Build a report over the `window` most recent records
    pub fn build(store: &RecordStore, window: usize) -> Self {
        let recent = store.recent(window);
        let averages = WindowAverages::from_records(recent.iter().map(|(_, r)| *r));
        let score = score_averages(&averages);

        let recommendations = if averages.days == 0 {
            Vec::new()
        } else {
            vec![
                Recommendation::sleep(averages.sleep),
                Recommendation::water(averages.water),
                Recommendation::mood(averages.mood),
            ]
        };

        tracing::debug!(
            "Report over {} of {} day(s): score {:.1}",
            averages.days,
            store.len(),
            score
        );

        Self {
            total_days: store.len(),
            averages,
            score,
            rating: ScoreRating::from_score(score),
            recommendations,
        }
    }
}
