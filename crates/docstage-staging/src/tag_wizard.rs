//! Multi-step tag creation wizard.
//!
//! Details → Schema → Sample document → Review. Each `next()` validates only the
//! fields of the step being left; `finish()` validates everything again and yields
//! the request to persist.

use std::fmt::{Display, Formatter, Result as FmtResult};

use docstage_core::models::NewTag;
use docstage_core::AppError;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Details,
    Schema,
    SampleDocument,
    Review,
}

impl WizardStep {
    fn next(self) -> Self {
        match self {
            WizardStep::Details => WizardStep::Schema,
            WizardStep::Schema => WizardStep::SampleDocument,
            WizardStep::SampleDocument | WizardStep::Review => WizardStep::Review,
        }
    }

    fn previous(self) -> Self {
        match self {
            WizardStep::Details | WizardStep::Schema => WizardStep::Details,
            WizardStep::SampleDocument => WizardStep::Schema,
            WizardStep::Review => WizardStep::SampleDocument,
        }
    }

    /// Fields validated when leaving this step
    fn fields(self) -> &'static [&'static str] {
        match self {
            WizardStep::Details => &["name", "description"],
            WizardStep::Schema => &["schema"],
            WizardStep::SampleDocument | WizardStep::Review => &[],
        }
    }
}

impl Display for WizardStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            WizardStep::Details => write!(f, "details"),
            WizardStep::Schema => write!(f, "schema"),
            WizardStep::SampleDocument => write!(f, "sample_document"),
            WizardStep::Review => write!(f, "review"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Invalid {step} step: {fields:?}")]
    InvalidStep {
        step: WizardStep,
        fields: Vec<String>,
    },

    #[error("Schema is not valid JSON: {0}")]
    SchemaParse(String),

    #[error("The wizard must reach the review step before finishing (current: {0})")]
    NotAtReview(WizardStep),
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct TagWizard {
    step: WizardStep,
    draft: NewTag,
}

impl Default for TagWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl TagWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Details,
            draft: NewTag {
                name: String::new(),
                description: String::new(),
                industry: None,
                schema: None,
                sample_document_id: None,
            },
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &NewTag {
        &self.draft
    }

    pub fn set_details(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        industry: Option<String>,
    ) {
        self.draft.name = name.into().trim().to_string();
        self.draft.description = description.into().trim().to_string();
        self.draft.industry = industry
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }

    pub fn set_schema(&mut self, schema: Option<serde_json::Value>) {
        self.draft.schema = schema;
    }

    /// Parse a schema typed or uploaded as text. Blank text clears the schema.
    pub fn set_schema_text(&mut self, text: &str) -> Result<(), WizardError> {
        if text.trim().is_empty() {
            self.draft.schema = None;
            return Ok(());
        }
        let value = serde_json::from_str(text).map_err(|e| WizardError::SchemaParse(e.to_string()))?;
        self.draft.schema = Some(value);
        Ok(())
    }

    pub fn set_sample_document(&mut self, document_id: Option<Uuid>) {
        self.draft.sample_document_id = document_id;
    }

    fn invalid_fields(&self, step: WizardStep) -> Vec<String> {
        let Err(errors) = self.draft.validate() else {
            return Vec::new();
        };
        let field_errors = errors.field_errors();
        let mut fields: Vec<String> = step
            .fields()
            .iter()
            .filter(|field| field_errors.contains_key(**field))
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        fields
    }

    /// Validate the current step and move forward.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let fields = self.invalid_fields(self.step);
        if !fields.is_empty() {
            return Err(WizardError::InvalidStep {
                step: self.step,
                fields,
            });
        }
        self.step = self.step.next();
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    /// Complete the wizard from the review step.
    pub fn finish(self) -> Result<NewTag, WizardError> {
        if self.step != WizardStep::Review {
            return Err(WizardError::NotAtReview(self.step));
        }
        for step in [WizardStep::Details, WizardStep::Schema] {
            let fields = self.invalid_fields(step);
            if !fields.is_empty() {
                return Err(WizardError::InvalidStep { step, fields });
            }
        }
        Ok(self.draft)
    }
}
