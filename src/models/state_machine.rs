// Session status state machine with validation

use super::SessionStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateTransitionError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Session already in terminal state: {0}")]
    AlreadyTerminal(SessionStatus),
}

/// Position of a status along the pipeline; `None` for the error escape
fn pipeline_rank(status: SessionStatus) -> Option<u8> {
    match status {
        SessionStatus::Initializing => Some(0),
        SessionStatus::Researching => Some(1),
        SessionStatus::Generating => Some(2),
        SessionStatus::Analyzing => Some(3),
        SessionStatus::Completed => Some(4),
        SessionStatus::Error => None,
    }
}

/// Validates if a session can move from one status to another
pub fn can_transition(from: SessionStatus, to: SessionStatus) -> bool {
    if from == to {
        // Same state is always allowed (no-op)
        return true;
    }
    if is_terminal_state(from) {
        return false;
    }
    match (pipeline_rank(from), pipeline_rank(to)) {
        // Error is reachable from any non-terminal status
        (_, None) => true,
        // Forward only; phases may be skipped
        (Some(a), Some(b)) => b > a,
        (None, Some(_)) => false,
    }
}

/// Validates and performs a state transition
pub fn transition_state(
    current: SessionStatus,
    target: SessionStatus,
) -> Result<SessionStatus, StateTransitionError> {
    if current != target && is_terminal_state(current) {
        return Err(StateTransitionError::AlreadyTerminal(current));
    }
    if !can_transition(current, target) {
        return Err(StateTransitionError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    Ok(target)
}

/// Check if a status is a terminal state
pub fn is_terminal_state(status: SessionStatus) -> bool {
    matches!(status, SessionStatus::Completed | SessionStatus::Error)
}

/// Check if a status indicates the pipeline is doing work
pub fn is_active_state(status: SessionStatus) -> bool {
    matches!(
        status,
        SessionStatus::Researching | SessionStatus::Generating | SessionStatus::Analyzing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionStatus::*;

    #[test]
    fn test_forward_progression() {
        assert!(can_transition(Initializing, Researching));
        assert!(can_transition(Researching, Generating));
        assert!(can_transition(Generating, Analyzing));
        assert!(can_transition(Analyzing, Completed));
        assert_eq!(transition_state(Analyzing, Completed), Ok(Completed));
    }

    #[test]
    fn test_phases_may_be_skipped() {
        assert!(can_transition(Initializing, Generating));
        assert!(can_transition(Researching, Completed));
    }

    #[test]
    fn test_backwards_is_invalid() {
        assert!(!can_transition(Generating, Researching));
        assert!(!can_transition(Analyzing, Initializing));
        assert_eq!(
            transition_state(Generating, Researching),
            Err(StateTransitionError::InvalidTransition {
                from: Generating,
                to: Researching
            })
        );
    }

    #[test]
    fn test_error_reachable_from_non_terminal() {
        for &from in &[Initializing, Researching, Generating, Analyzing] {
            assert!(can_transition(from, Error), "from {}", from);
        }
        assert!(!can_transition(Completed, Error));
    }

    #[test]
    fn test_terminal_states_are_final() {
        assert_eq!(
            transition_state(Completed, Researching),
            Err(StateTransitionError::AlreadyTerminal(Completed))
        );
        assert_eq!(
            transition_state(Error, Initializing),
            Err(StateTransitionError::AlreadyTerminal(Error))
        );
    }

    #[test]
    fn test_same_state_allowed() {
        for &status in SessionStatus::all() {
            assert!(can_transition(status, status));
            assert_eq!(transition_state(status, status), Ok(status));
        }
    }

    #[test]
    fn test_is_terminal_state() {
        assert!(is_terminal_state(Completed));
        assert!(is_terminal_state(Error));
        assert!(!is_terminal_state(Initializing));
        assert!(!is_terminal_state(Analyzing));
    }

    #[test]
    fn test_is_active_state() {
        assert!(is_active_state(Researching));
        assert!(!is_active_state(Initializing));
        assert!(!is_active_state(Completed));
    }
}
