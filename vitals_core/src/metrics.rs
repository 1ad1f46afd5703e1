//! Metrics engine: BMI, calorie targets and the daily health score.
//!
//! Everything here is a pure function of its inputs. Range checks return
//! `Error::Validation`; the arithmetic itself cannot fail.

use crate::config::Limits;
use crate::{ActivityLevel, DailyRecord, Error, Gender, Goal, Result};
use std::fmt;

// ============================================================================
// BMI
// ============================================================================

/// Standard BMI classification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Classify a BMI value: <18.5, [18.5, 25), [25, 30), >=30
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "You may need to gain some weight",
            BmiCategory::Normal => "Great! You're at a healthy weight",
            BmiCategory::Overweight => "Consider losing some weight",
            BmiCategory::Obese => "Weight loss is recommended",
        }
    }

    pub fn advice(self) -> &'static [&'static str] {
        match self {
            BmiCategory::Underweight => &[
                "Increase calorie intake",
                "Include protein-rich foods",
                "Consider strength training",
            ],
            BmiCategory::Normal => &[
                "Maintain balanced diet",
                "Regular exercise",
                "Stay hydrated",
            ],
            BmiCategory::Overweight => &[
                "Reduce processed foods",
                "Increase physical activity",
                "Portion control",
            ],
            BmiCategory::Obese => &[
                "Consult healthcare provider",
                "Start gradual weight loss",
                "Focus on whole foods",
            ],
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: BmiCategory,
}

/// Raw BMI value, weight(kg) / height(m)^2
pub fn bmi_value(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Compute BMI and its category after checking plausibility bounds
pub fn compute_bmi(height_cm: f64, weight_kg: f64, limits: &Limits) -> Result<BmiResult> {
    limits.height_cm.check("Height", height_cm, " cm")?;
    limits.weight_kg.check("Weight", weight_kg, " kg")?;

    let bmi = bmi_value(height_cm, weight_kg);
    Ok(BmiResult {
        bmi,
        category: BmiCategory::from_bmi(bmi),
    })
}

/// Weight range corresponding to a normal BMI for a given height
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightRange {
    pub min_kg: f64,
    pub max_kg: f64,
}

/// Where a weight sits relative to a `WeightRange`
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RangePosition {
    Under(f64),
    Within,
    Over(f64),
}

impl WeightRange {
    pub fn position(&self, weight_kg: f64) -> RangePosition {
        if weight_kg < self.min_kg {
            RangePosition::Under(self.min_kg - weight_kg)
        } else if weight_kg > self.max_kg {
            RangePosition::Over(weight_kg - self.max_kg)
        } else {
            RangePosition::Within
        }
    }
}

/// Healthy weight range (BMI 18.5 to 24.9) for `height_cm`
pub fn healthy_weight_range(height_cm: f64) -> WeightRange {
    let height_m = height_cm / 100.0;
    let area = height_m * height_m;
    WeightRange {
        min_kg: 18.5 * area,
        max_kg: 24.9 * area,
    }
}

// ============================================================================
// Calories
// ============================================================================

/// Inputs for the daily calorie calculation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalorieInput {
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: ActivityLevel,
    pub goal: Goal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalorieTarget {
    /// Basal metabolic rate, kcal/day
    pub bmr: f64,
    /// Total daily energy expenditure, kcal/day
    pub tdee: f64,
    /// Intake recommended for the goal, kcal/day
    pub target: f64,
}

/// Mifflin-St Jeor basal metabolic rate
///
/// BMR = 10 * weight + 6.25 * height - 5 * age + s, where s is +5 for men
/// and -161 for women.
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + offset
}

/// BMR, TDEE and goal-adjusted calorie target
pub fn compute_calorie_target(input: &CalorieInput, limits: &Limits) -> Result<CalorieTarget> {
    limits.age.check("Age", f64::from(input.age), " years")?;
    limits.height_cm.check("Height", input.height_cm, " cm")?;
    limits.weight_kg.check("Weight", input.weight_kg, " kg")?;

    let bmr = mifflin_st_jeor(input.weight_kg, input.height_cm, input.age, input.gender);
    let tdee = bmr * input.activity.multiplier();
    let target = tdee + input.goal.adjustment();

    tracing::debug!(
        "Calorie target: bmr={:.0} tdee={:.0} target={:.0}",
        bmr,
        tdee,
        target
    );

    Ok(CalorieTarget { bmr, tdee, target })
}

// ============================================================================
// Health score
// ============================================================================

/// Averages of sleep, water and mood over a window of records
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowAverages {
    /// Number of records averaged
    pub days: usize,
    pub sleep: f64,
    pub water: f64,
    pub mood: f64,
}

impl WindowAverages {
    /// Average the given records; an empty window yields all zeros
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a DailyRecord>,
    {
        let mut totals = WindowAverages::default();
        for record in records {
            totals.days += 1;
            totals.sleep += record.sleep;
            totals.water += record.water;
            totals.mood += f64::from(record.mood);
        }

        if totals.days == 0 {
            return totals;
        }

        let n = totals.days as f64;
        WindowAverages {
            days: totals.days,
            sleep: totals.sleep / n,
            water: totals.water / n,
            mood: totals.mood / n,
        }
    }
}

/// Sleep points (max 40), banded around the 7-9 hour ideal
pub fn sleep_points(hours: f64) -> f64 {
    if (7.0..=9.0).contains(&hours) {
        40.0
    } else if (6.0..=10.0).contains(&hours) {
        30.0
    } else if (5.0..=11.0).contains(&hours) {
        20.0
    } else {
        10.0
    }
}

/// Water points, linear up to 30 at 10 cups
pub fn water_points(cups: f64) -> f64 {
    (cups / 10.0 * 30.0).clamp(0.0, 30.0)
}

/// Mood points, linear up to 30 at mood 5
pub fn mood_points(mood: f64) -> f64 {
    (mood / 5.0 * 30.0).clamp(0.0, 30.0)
}

/// Score already-averaged metrics on a 0-100 scale
pub fn score_averages(averages: &WindowAverages) -> f64 {
    let total =
        sleep_points(averages.sleep) + water_points(averages.water) + mood_points(averages.mood);
    total.clamp(0.0, 100.0)
}

/// Health score of a window of records, 0-100
pub fn compute_health_score<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    score_averages(&WindowAverages::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const EPS: f64 = 1e-9;

    fn record(sleep: f64, water: f64, mood: u8) -> DailyRecord {
        DailyRecord {
            sleep,
            water,
            mood,
            meals: String::new(),
            reflection: String::new(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_bmi_normal_example() {
        let result = compute_bmi(170.0, 70.0, &Limits::default()).unwrap();
        assert!((result.bmi - 24.22).abs() < 0.01);
        assert_eq!(result.category, BmiCategory::Normal);
        assert_eq!(result.category.to_string(), "Normal");
    }

    #[test]
    fn test_bmi_category_thresholds() {
        assert_eq!(BmiCategory::from_bmi(18.49), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.99), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(29.99), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_bmi_category_consistent_across_valid_inputs() {
        let limits = Limits::default();
        for height in (50..=250).step_by(10) {
            for weight in (20..=300).step_by(10) {
                let result = compute_bmi(height as f64, weight as f64, &limits).unwrap();
                let expected = if result.bmi < 18.5 {
                    BmiCategory::Underweight
                } else if result.bmi < 25.0 {
                    BmiCategory::Normal
                } else if result.bmi < 30.0 {
                    BmiCategory::Overweight
                } else {
                    BmiCategory::Obese
                };
                assert_eq!(result.category, expected, "h={} w={}", height, weight);
            }
        }
    }

    #[test]
    fn test_bmi_rejects_implausible_inputs() {
        let limits = Limits::default();
        for (h, w) in [(49.9, 70.0), (250.1, 70.0), (170.0, 19.9), (170.0, 300.1), (0.0, 0.0)] {
            assert!(
                matches!(compute_bmi(h, w, &limits), Err(Error::Validation(_))),
                "h={} w={} should be rejected",
                h,
                w
            );
        }
        assert!(compute_bmi(50.0, 20.0, &limits).is_ok());
        assert!(compute_bmi(250.0, 300.0, &limits).is_ok());
    }

    #[test]
    fn test_healthy_weight_range() {
        let range = healthy_weight_range(180.0);
        assert!((range.min_kg - 59.94).abs() < 0.001);
        assert!((range.max_kg - 80.676).abs() < 0.001);

        assert_eq!(range.position(70.0), RangePosition::Within);
        match range.position(85.0) {
            RangePosition::Over(kg) => assert!((kg - 4.324).abs() < 0.001),
            other => panic!("expected Over, got {:?}", other),
        }
        assert!(matches!(range.position(50.0), RangePosition::Under(_)));
    }

    #[test]
    fn test_calorie_target_male_moderate_maintain() {
        let input = CalorieInput {
            age: 30,
            gender: Gender::Male,
            height_cm: 180.0,
            weight_kg: 80.0,
            activity: ActivityLevel::Moderate,
            goal: Goal::Maintain,
        };
        // 800 + 1125 - 150 + 5
        let result = compute_calorie_target(&input, &Limits::default()).unwrap();
        assert!((result.bmr - 1780.0).abs() < EPS);
        assert!((result.tdee - 2759.0).abs() < 1e-6);
        assert!((result.target - 2759.0).abs() < 1e-6);
    }

    #[test]
    fn test_calorie_target_female_and_goals() {
        let mut input = CalorieInput {
            age: 25,
            gender: Gender::Female,
            height_cm: 165.0,
            weight_kg: 60.0,
            activity: ActivityLevel::Sedentary,
            goal: Goal::Lose,
        };
        let limits = Limits::default();

        // 600 + 1031.25 - 125 - 161
        let lose = compute_calorie_target(&input, &limits).unwrap();
        assert!((lose.bmr - 1345.25).abs() < EPS);
        assert!((lose.tdee - 1614.3).abs() < 1e-6);
        assert!((lose.target - (lose.tdee - 500.0)).abs() < EPS);

        input.goal = Goal::Gain;
        let gain = compute_calorie_target(&input, &limits).unwrap();
        assert!((gain.target - (gain.tdee + 500.0)).abs() < EPS);
    }

    #[test]
    fn test_calorie_target_validates_inputs() {
        let input = CalorieInput {
            age: 0,
            gender: Gender::Male,
            height_cm: 180.0,
            weight_kg: 80.0,
            activity: ActivityLevel::Active,
            goal: Goal::Maintain,
        };
        assert!(compute_calorie_target(&input, &Limits::default()).is_err());

        let tall = CalorieInput { age: 40, height_cm: 260.0, ..input };
        assert!(compute_calorie_target(&tall, &Limits::default()).is_err());
    }

    #[test]
    fn test_sleep_bands() {
        assert_eq!(sleep_points(8.0), 40.0);
        assert_eq!(sleep_points(7.0), 40.0);
        assert_eq!(sleep_points(9.0), 40.0);
        assert_eq!(sleep_points(6.5), 30.0);
        assert_eq!(sleep_points(10.0), 30.0);
        assert_eq!(sleep_points(5.0), 20.0);
        assert_eq!(sleep_points(11.0), 20.0);
        assert_eq!(sleep_points(4.9), 10.0);
        assert_eq!(sleep_points(12.0), 10.0);
    }

    #[test]
    fn test_health_score_perfect_and_capped() {
        let records = vec![record(8.0, 12.0, 5), record(8.0, 10.0, 5)];
        assert!((compute_health_score(&records) - 100.0).abs() < EPS);
    }

    #[test]
    fn test_health_score_uses_window_averages() {
        // avg sleep 6.5 (30), avg water 5 (15), avg mood 3 (18)
        let records = vec![record(6.0, 4.0, 2), record(7.0, 6.0, 4)];
        assert!((compute_health_score(&records) - 63.0).abs() < EPS);
    }

    #[test]
    fn test_health_score_empty_window() {
        let records: Vec<DailyRecord> = Vec::new();
        assert_eq!(compute_health_score(&records), 10.0);
    }

    #[test]
    fn test_health_score_monotonic_per_component() {
        // Sleep: moving toward 8h never lowers the score
        let distances = [8.0, 6.0, 4.0, 3.0, 2.0, 1.5, 1.0, 0.5, 0.0];
        for side in [-1.0, 1.0] {
            let scores: Vec<f64> = distances
                .iter()
                .map(|d| compute_health_score(&[record(8.0 + side * d, 5.0, 3)]))
                .collect();
            assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{:?}", scores);
        }

        let water: Vec<f64> = (0..=50)
            .map(|cups| compute_health_score(&[record(8.0, cups as f64, 3)]))
            .collect();
        assert!(water.windows(2).all(|w| w[0] <= w[1]));

        let mood: Vec<f64> = (1..=5)
            .map(|m| compute_health_score(&[record(8.0, 5.0, m)]))
            .collect();
        assert!(mood.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_window_averages() {
        let records = vec![record(6.0, 4.0, 2), record(8.0, 8.0, 4), record(7.0, 6.0, 3)];
        let avg = WindowAverages::from_records(&records);
        assert_eq!(avg.days, 3);
        assert!((avg.sleep - 7.0).abs() < EPS);
        assert!((avg.water - 6.0).abs() < EPS);
        assert!((avg.mood - 3.0).abs() < EPS);
    }
}
