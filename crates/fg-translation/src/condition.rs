//! Rule conditions.

use crate::context::TranslationContext;
use crate::error::TranslationResult;
use crate::expression::Expression;

/// A boolean rule condition.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationCondition {
    expression: Expression,
}

impl TranslationCondition {
    /// Parses a condition.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Expression` if the condition is malformed.
    pub fn parse(source: &str) -> TranslationResult<Self> {
        Ok(Self {
            expression: Expression::parse(source)?,
        })
    }

    /// A condition that always holds.
    #[must_use]
    pub fn always() -> Self {
        Self {
            expression: Expression::constant(true),
        }
    }

    /// Returns the condition source.
    #[must_use]
    pub fn source(&self) -> &str {
        self.expression.source()
    }

    /// Evaluates the condition.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::Expression` if evaluation fails.
    pub fn evaluate(&self, ctx: &TranslationContext) -> TranslationResult<bool> {
        self.expression.evaluate_bool(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fg_model::RemotelyAuthenticatedInput;

    #[test]
    fn condition_evaluates_against_context() {
        let ctx = TranslationContext::from_input(&RemotelyAuthenticatedInput::new("ldap"));
        assert!(TranslationCondition::parse("idp == 'ldap'").unwrap().evaluate(&ctx).unwrap());
        assert!(!TranslationCondition::parse("idp == 'saml'").unwrap().evaluate(&ctx).unwrap());
        assert!(TranslationCondition::always().evaluate(&ctx).unwrap());
    }
}
