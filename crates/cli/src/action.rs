//! Replayable learner actions.

use anyhow::{anyhow, bail, Context, Result};
use onboard_core::{SectionId, StepId, TaskId};

/// One user action dispatched into the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `toggle:<section>:<task>:<step>`
    Toggle {
        section: SectionId,
        task: TaskId,
        step: StepId,
    },
    /// `advance`
    Advance,
}

impl std::str::FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("advance") {
            return Ok(Action::Advance);
        }

        let mut parts = s.split(':');
        match parts.next() {
            Some(verb) if verb.eq_ignore_ascii_case("toggle") => {}
            _ => bail!("unknown action '{}' (expected toggle:S:T:P or advance)", s),
        }

        let ids: Vec<&str> = parts.collect();
        let [section, task, step] = ids.as_slice() else {
            return Err(anyhow!("'{}' needs exactly three ids: toggle:SECTION:TASK:STEP", s));
        };

        Ok(Action::Toggle {
            section: section.parse().with_context(|| format!("bad section id in '{}'", s))?,
            task: task.parse().with_context(|| format!("bad task id in '{}'", s))?,
            step: step.parse().with_context(|| format!("bad step id in '{}'", s))?,
        })
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Toggle { section, task, step } => {
                write!(f, "toggle:{}:{}:{}", section, task, step)
            }
            Action::Advance => f.write_str("advance"),
        }
    }
}

/// Parse every action up front so a typo fails before anything runs.
pub fn parse_actions(raw: &[String]) -> Result<Vec<Action>> {
    raw.iter().map(|s| s.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toggle() {
        let action: Action = "toggle:1:2:3".parse().unwrap();
        assert_eq!(
            action,
            Action::Toggle { section: SectionId(1), task: TaskId(2), step: StepId(3) }
        );
        assert_eq!(action.to_string(), "toggle:1:2:3");
    }

    #[test]
    fn test_parse_advance() {
        assert_eq!("advance".parse::<Action>().unwrap(), Action::Advance);
        assert_eq!(" ADVANCE ".parse::<Action>().unwrap(), Action::Advance);
    }

    #[test]
    fn test_reject_malformed_actions() {
        for raw in ["", "jump", "toggle:1:2", "toggle:1:2:3:4", "toggle:a:2:3", "toggle:1:2:-1"] {
            assert!(raw.parse::<Action>().is_err(), "{} should not parse", raw);
        }
    }

    #[test]
    fn test_parse_actions_stops_at_first_error() {
        let raw = vec!["toggle:1:1:1".to_string(), "nope".to_string()];
        assert!(parse_actions(&raw).is_err());

        let raw = vec!["toggle:1:1:1".to_string(), "advance".to_string()];
        assert_eq!(parse_actions(&raw).unwrap().len(), 2);
    }
}
