//! `entityChange` action.

use chrono::{DateTime, Duration, Utc};
use fg_model::EntityScheduledOperation;

use super::{
    ActionContext, ActionOutcome, ActionParameter, ActionParameters, InputAction,
    InputActionFactory,
};
use crate::error::{TranslationError, TranslationResult};
use crate::mapping::{EntityChange, MappingResult};

const CLEAR: &str = "CLEAR";

/// Upper bound of `scheduled after days`, about a thousand years.
const MAX_DAYS: u32 = 365_000;

/// Factory of the `entityChange` action.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityChangeActionFactory;

impl InputActionFactory for EntityChangeActionFactory {
    fn name(&self) -> &'static str {
        "entityChange"
    }

    fn description(&self) -> &'static str {
        "Schedules a lifecycle operation on the local entity"
    }

    fn parameters(&self) -> Vec<ActionParameter> {
        vec![
            ActionParameter::enumeration(
                "schedule change",
                "Operation to schedule; CLEAR cancels a pending one",
                &["DISABLE", "REMOVE", CLEAR],
            ),
            ActionParameter::integer("scheduled after days", "Days from now").with_default("0"),
        ]
    }

    fn instantiate(&self, params: &[String]) -> TranslationResult<Box<dyn InputAction>> {
        let params = ActionParameters::bind(self.name(), self.parameters(), params)?;
        let operation = match params.required(0)? {
            CLEAR => None,
            other => Some(
                other
                    .parse::<EntityScheduledOperation>()
                    .map_err(TranslationError::config)?,
            ),
        };
        let days: u32 = params.parse(1)?;
        if days > MAX_DAYS {
            return Err(TranslationError::config(format!(
                "entityChange cannot be scheduled more than {MAX_DAYS} days ahead, got {days}"
            )));
        }
        Ok(Box::new(EntityChangeAction { operation, days }))
    }
}

#[derive(Debug)]
struct EntityChangeAction {
    operation: Option<EntityScheduledOperation>,
    days: u32,
}

impl InputAction for EntityChangeAction {
    fn name(&self) -> &'static str {
        "entityChange"
    }

    fn invoke(&self, _ctx: &ActionContext<'_>) -> TranslationResult<ActionOutcome> {
        let scheduled_time = match self.operation {
            Some(_) => Some(schedule_after(self.days)?),
            None => None,
        };

        let mut result = MappingResult::new();
        result.add_entity_change(EntityChange {
            scheduled_operation: self.operation,
            scheduled_time,
        });
        Ok(ActionOutcome::Mapped(result))
    }
}

fn schedule_after(days: u32) -> TranslationResult<DateTime<Utc>> {
    Duration::try_days(i64::from(days))
        .and_then(|delay| Utc::now().checked_add_signed(delay))
        .ok_or_else(|| TranslationError::config(format!("{days} days from now is out of range")))
}
