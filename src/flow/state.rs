//! Conversation session state — intake steps, draft accumulation, and the
//! operator comment flows.

use crate::store::IntakeFields;
use crate::telegram::MessageRef;
use crate::texts;

/// The steps of the tour intake questionnaire.
///
/// Progresses linearly: Destination → Dates → Adults → Children → Budget →
/// Wishes → Contact → Confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStep {
    Destination,
    Dates,
    Adults,
    Children,
    Budget,
    Wishes,
    Contact,
    Confirm,
}

impl IntakeStep {
    /// The next step in the linear progression, if any.
    pub fn next(&self) -> Option<IntakeStep> {
        use IntakeStep::*;
        match self {
            Destination => Some(Dates),
            Dates => Some(Adults),
            Adults => Some(Children),
            Children => Some(Budget),
            Budget => Some(Wishes),
            Wishes => Some(Contact),
            Contact => Some(Confirm),
            Confirm => None,
        }
    }

    /// The question shown when this step is reached. `Confirm` has no
    /// prompt of its own — it renders the accumulated summary instead.
    pub fn prompt(&self) -> &'static str {
        use IntakeStep::*;
        match self {
            Destination => texts::PROMPT_DESTINATION,
            Dates => texts::PROMPT_DATES,
            Adults => texts::PROMPT_ADULTS,
            Children => texts::PROMPT_CHILDREN,
            Budget => texts::PROMPT_BUDGET,
            Wishes => texts::PROMPT_WISHES,
            Contact => texts::PROMPT_CONTACT,
            Confirm => "",
        }
    }
}

/// Why a text input was refused for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    Empty,
    NotAPositiveCount,
    NotACount,
}

impl InvalidInput {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => texts::INVALID_EMPTY,
            Self::NotAPositiveCount => texts::INVALID_ADULTS,
            Self::NotACount => texts::INVALID_CHILDREN,
        }
    }
}

/// Answers accumulated so far. A field is `Some` once its step has accepted
/// an input.
#[derive(Debug, Clone, Default)]
pub struct IntakeDraft {
    pub destination: Option<String>,
    pub dates: Option<String>,
    pub adults: Option<i64>,
    pub children: Option<i64>,
    pub budget: Option<String>,
    pub wishes: Option<String>,
    pub contact: Option<String>,
}

impl IntakeDraft {
    /// Validate `input` for `step` and store it. On error the draft is
    /// untouched.
    pub fn record(&mut self, step: IntakeStep, input: &str) -> Result<(), InvalidInput> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InvalidInput::Empty);
        }

        match step {
            IntakeStep::Destination => self.destination = Some(trimmed.to_string()),
            IntakeStep::Dates => self.dates = Some(trimmed.to_string()),
            IntakeStep::Adults => {
                let n: i64 = trimmed.parse().map_err(|_| InvalidInput::NotAPositiveCount)?;
                if n < 1 {
                    return Err(InvalidInput::NotAPositiveCount);
                }
                self.adults = Some(n);
            }
            IntakeStep::Children => {
                let n: i64 = trimmed.parse().map_err(|_| InvalidInput::NotACount)?;
                if n < 0 {
                    return Err(InvalidInput::NotACount);
                }
                self.children = Some(n);
            }
            IntakeStep::Budget => self.budget = Some(trimmed.to_string()),
            IntakeStep::Wishes => self.wishes = Some(trimmed.to_string()),
            IntakeStep::Contact => self.contact = Some(trimmed.to_string()),
            IntakeStep::Confirm => {}
        }
        Ok(())
    }

    /// The completed answer set, once all seven steps have been recorded.
    pub fn complete(&self) -> Option<IntakeFields> {
        Some(IntakeFields {
            destination: self.destination.clone()?,
            dates: self.dates.clone()?,
            adults: self.adults?,
            children: self.children?,
            budget: self.budget.clone()?,
            wishes: self.wishes.clone()?,
            contact: self.contact.clone()?,
        })
    }
}

/// Which flow a conversant is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Intake questionnaire, at the given step.
    Intake(IntakeStep),
    /// Operator entering an approve comment for a request. `source` is the
    /// message carrying the approve/reject buttons, retracted on completion.
    ApproveComment { request_id: i64, source: MessageRef },
    /// Operator entering a reject reason.
    RejectComment { request_id: i64, source: MessageRef },
}

/// One conversant's active session. Exactly one per chat id; absent while
/// idle.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: FlowState,
    pub draft: IntakeDraft,
}

impl Session {
    /// A fresh intake session at the first step.
    pub fn intake() -> Self {
        Self {
            state: FlowState::Intake(IntakeStep::Destination),
            draft: IntakeDraft::default(),
        }
    }
}
