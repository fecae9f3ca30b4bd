//! Translation rules.

use tracing::{debug, debug_span};

use crate::action::{ActionContext, ActionOutcome, InputAction};
use crate::condition::TranslationCondition;
use crate::error::TranslationResult;
use crate::mapping::MappingResult;

/// What evaluating a rule produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEffect {
    /// The condition did not hold.
    Skipped,
    /// The action mapped a fragment.
    Mapped(MappingResult),
    /// The action asked to run another profile.
    Include(String),
    /// The action asked to stop the current profile.
    Break,
}

/// A condition paired with the action run when it holds.
#[derive(Debug)]
pub struct TranslationRule {
    condition: TranslationCondition,
    action: Box<dyn InputAction>,
}

impl TranslationRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(condition: TranslationCondition, action: Box<dyn InputAction>) -> Self {
        Self { condition, action }
    }

    /// Returns the rule condition.
    #[must_use]
    pub const fn condition(&self) -> &TranslationCondition {
        &self.condition
    }

    /// Returns the action name.
    #[must_use]
    pub fn action_name(&self) -> &'static str {
        self.action.name()
    }

    /// Evaluates the rule.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Expression` if the condition or an action
    /// expression fails to evaluate.
    pub fn evaluate(&self, ctx: &ActionContext<'_>) -> TranslationResult<RuleEffect> {
        let span = debug_span!(
            "rule",
            condition = self.condition.source(),
            action = self.action.name()
        );
        let _guard = span.enter();

        if !self.condition.evaluate(ctx.context)? {
            debug!("condition not met");
            return Ok(RuleEffect::Skipped);
        }

        let effect = match self.action.invoke(ctx)? {
            ActionOutcome::Mapped(result) => RuleEffect::Mapped(result),
            ActionOutcome::Include(name) => RuleEffect::Include(name),
            ActionOutcome::Break => RuleEffect::Break,
        };
        debug!("rule applied");
        Ok(effect)
    }
}
