//! Training records and the exercise sets they contain.
//!
//! Sets never enter a record without passing through
//! [`ExerciseSet::parse`]; anything the parser rejects is reported as
//! [`CoreError::Validation`] instead of being patched with defaults.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Day, Timestamp, UserId};
use crate::util::format_iso;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of an exercise name.
pub const MAX_EXERCISE_NAME_LENGTH: usize = 60;

/// Upper bound for a single set's weight in kilograms.
pub const MAX_WEIGHT_KG: f64 = 1000.0;

/// Upper bound for repetitions in a single set.
pub const MAX_REPS: u32 = 1000;

/// Maximum number of sets recorded for one day.
pub const MAX_SETS_PER_RECORD: usize = 200;

/// Maximum length of a record memo in characters.
pub const MAX_MEMO_LENGTH: usize = 2_000;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// A number that may have been captured from a text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn to_f64(&self, field: &str) -> Result<f64, CoreError> {
        match self {
            NumberOrText::Number(n) => Ok(*n),
            NumberOrText::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                CoreError::Validation(format!("{field} must be a number, got '{s}'"))
            }),
        }
    }
}

/// Unvalidated set fields as they arrive from a form, a stored document or
/// legacy local data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSet {
    #[serde(default, alias = "exerciseName", alias = "name")]
    pub exercise: Option<String>,
    #[serde(default)]
    pub weight: Option<NumberOrText>,
    #[serde(default)]
    pub reps: Option<NumberOrText>,
}

impl RawSet {
    pub fn new(exercise: impl Into<String>, weight: f64, reps: u32) -> Self {
        Self {
            exercise: Some(exercise.into()),
            weight: Some(NumberOrText::Number(weight)),
            reps: Some(NumberOrText::Number(f64::from(reps))),
        }
    }
}

// ---------------------------------------------------------------------------
// ExerciseSet
// ---------------------------------------------------------------------------

/// One validated set inside a [`TrainingRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseSet {
    pub exercise: String,
    /// Load in kilograms; `0` for body-weight work.
    pub weight: f64,
    pub reps: u32,
    /// Position within the parent record, renumbered on every change.
    #[serde(skip)]
    pub index: usize,
}

impl ExerciseSet {
    /// Validate raw fields into a set at position `index`.
    pub fn parse(raw: &RawSet, index: usize) -> Result<Self, CoreError> {
        let exercise = raw
            .exercise
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::Validation("Exercise name is required".into()))?;
        if exercise.chars().count() > MAX_EXERCISE_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Exercise name exceeds maximum length of {MAX_EXERCISE_NAME_LENGTH} characters"
            )));
        }

        let weight = raw
            .weight
            .as_ref()
            .ok_or_else(|| CoreError::Validation("Weight is required".into()))?
            .to_f64("Weight")?;
        if !weight.is_finite() || !(0.0..=MAX_WEIGHT_KG).contains(&weight) {
            return Err(CoreError::Validation(format!(
                "Weight must be between 0 and {MAX_WEIGHT_KG} kg"
            )));
        }

        let reps = raw
            .reps
            .as_ref()
            .ok_or_else(|| CoreError::Validation("Reps is required".into()))?
            .to_f64("Reps")?;
        if reps.fract() != 0.0 || reps < 1.0 || reps > f64::from(MAX_REPS) {
            return Err(CoreError::Validation(format!(
                "Reps must be a whole number between 1 and {MAX_REPS}"
            )));
        }

        Ok(Self {
            exercise: exercise.to_string(),
            weight,
            reps: reps as u32,
            index,
        })
    }

    /// Weight × reps, the per-set training volume.
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

// ---------------------------------------------------------------------------
// TrainingRecord
// ---------------------------------------------------------------------------

/// One student's training log for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    pub owner_id: UserId,
    pub date: Day,
    pub sets: Vec<ExerciseSet>,
    pub memo: String,
    pub pinned: bool,
    pub pain: bool,
    pub archived: bool,
    pub updated_at: Option<Timestamp>,
    pub updated_by: Option<UserId>,
}

impl TrainingRecord {
    /// An empty record; persisted only once the first set is added.
    pub fn new(owner_id: impl Into<UserId>, date: Day) -> Self {
        Self {
            owner_id: owner_id.into(),
            date,
            sets: Vec::new(),
            memo: String::new(),
            pinned: false,
            pain: false,
            archived: false,
            updated_at: None,
            updated_by: None,
        }
    }

    /// Document id shared by the record and its pinned memo.
    pub fn doc_id(&self) -> String {
        record_doc_id(&self.owner_id, self.date)
    }

    pub fn add_set(&mut self, raw: &RawSet) -> Result<&ExerciseSet, CoreError> {
        if self.sets.len() >= MAX_SETS_PER_RECORD {
            return Err(CoreError::Validation(format!(
                "A record holds at most {MAX_SETS_PER_RECORD} sets"
            )));
        }
        let set = ExerciseSet::parse(raw, self.sets.len())?;
        self.sets.push(set);
        Ok(&self.sets[self.sets.len() - 1])
    }

    pub fn update_set(&mut self, index: usize, raw: &RawSet) -> Result<(), CoreError> {
        let slot = self
            .sets
            .get_mut(index)
            .ok_or_else(|| CoreError::Validation(format!("No set at position {index}")))?;
        *slot = ExerciseSet::parse(raw, index)?;
        Ok(())
    }

    pub fn remove_set(&mut self, index: usize) -> Result<ExerciseSet, CoreError> {
        if index >= self.sets.len() {
            return Err(CoreError::Validation(format!("No set at position {index}")));
        }
        let removed = self.sets.remove(index);
        self.renumber();
        Ok(removed)
    }

    pub fn set_memo(&mut self, memo: &str) -> Result<(), CoreError> {
        validate_memo(memo)?;
        self.memo = memo.to_string();
        Ok(())
    }

    /// Sum of [`ExerciseSet::volume`] over all sets.
    pub fn total_volume(&self) -> f64 {
        self.sets.iter().map(ExerciseSet::volume).sum()
    }

    /// Distinct exercise names in first-seen order.
    pub fn exercises(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for set in &self.sets {
            if !names.contains(&set.exercise.as_str()) {
                names.push(&set.exercise);
            }
        }
        names
    }

    fn renumber(&mut self) {
        for (i, set) in self.sets.iter_mut().enumerate() {
            set.index = i;
        }
    }
}

/// Document id for the record of `owner_id` on `date`.
pub fn record_doc_id(owner_id: &str, date: Day) -> String {
    format!("{owner_id}_{}", format_iso(date))
}

/// Validate memo text length.
pub fn validate_memo(memo: &str) -> Result<(), CoreError> {
    if memo.chars().count() > MAX_MEMO_LENGTH {
        return Err(CoreError::Validation(format!(
            "Memo exceeds maximum length of {MAX_MEMO_LENGTH} characters"
        )));
    }
    Ok(())
}
