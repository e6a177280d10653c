// This file is part of Ferry.
//
// Ferry is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Ferry is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Ferry.
// If not, see https://www.gnu.org/licenses/.

//! Stages of a run and the transitions between them

use parse_display::Display;

/// A stage of a run
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[display(style = "SNAKE_CASE")]
pub enum Stage {
    /// Moving stablecoin from the whale to the admin account
    Funding,
    /// Checking the relay and connecting a smart account sender
    Probing,
    /// Supplying through the smart account and relay
    RelayPath,
    /// Supplying directly from the admin account
    DirectPath,
    /// A path completed
    Done,
    /// The run cannot continue
    Failed,
}

/// The outcome of executing a stage
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[display(style = "snake_case")]
pub enum Event {
    /// Admin account funded
    Funded,
    /// Funding errored
    FundingFailed,
    /// Relay reachable and sender connected
    RelayReady,
    /// Relay unreachable or sender construction failed
    RelayUnavailable,
    /// Relay path finished every call
    RelayCompleted,
    /// Relay path errored
    RelayFailed,
    /// Direct path finished
    DirectCompleted,
    /// Direct path errored
    DirectFailed,
}

/// The path that produced a successful run
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Path {
    /// Relay-mediated supply through the smart account
    #[display("relay")]
    Relay,
    /// Supply signed by the admin account
    #[display("direct")]
    Direct,
}

/// An event that is not valid in the current stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition: {event} while in {stage}")]
pub struct TransitionError {
    /// Stage the event arrived in
    pub stage: Stage,
    /// Offending event
    pub event: Event,
}

impl Stage {
    /// Apply an event to this stage.
    pub fn next(self, event: Event) -> Result<Stage, TransitionError> {
        let next = match (self, event) {
            (Stage::Funding, Event::Funded) => Stage::Probing,
            (Stage::Funding, Event::FundingFailed) => Stage::Failed,
            (Stage::Probing, Event::RelayReady) => Stage::RelayPath,
            (Stage::Probing, Event::RelayUnavailable) => Stage::DirectPath,
            (Stage::RelayPath, Event::RelayCompleted) => Stage::Done,
            (Stage::RelayPath, Event::RelayFailed) => Stage::DirectPath,
            (Stage::DirectPath, Event::DirectCompleted) => Stage::Done,
            (Stage::DirectPath, Event::DirectFailed) => Stage::Failed,
            (stage, event) => return Err(TransitionError { stage, event }),
        };
        Ok(next)
    }

    /// True for stages with no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(events: &[Event]) -> Result<Vec<Stage>, TransitionError> {
        let mut stage = Stage::Funding;
        let mut visited = vec![stage];
        for event in events {
            stage = stage.next(*event)?;
            visited.push(stage);
        }
        Ok(visited)
    }

    #[test]
    fn test_relay_happy_path() {
        let visited = walk(&[Event::Funded, Event::RelayReady, Event::RelayCompleted]).unwrap();
        assert_eq!(
            visited,
            vec![Stage::Funding, Stage::Probing, Stage::RelayPath, Stage::Done]
        );
    }

    #[test]
    fn test_relay_failure_falls_back_to_direct() {
        let visited = walk(&[
            Event::Funded,
            Event::RelayReady,
            Event::RelayFailed,
            Event::DirectCompleted,
        ])
        .unwrap();
        assert_eq!(
            visited,
            vec![
                Stage::Funding,
                Stage::Probing,
                Stage::RelayPath,
                Stage::DirectPath,
                Stage::Done
            ]
        );
    }

    #[test]
    fn test_unavailable_relay_goes_direct() {
        let visited = walk(&[Event::Funded, Event::RelayUnavailable]).unwrap();
        assert_eq!(visited.last(), Some(&Stage::DirectPath));
    }

    #[test]
    fn test_failures_are_terminal() {
        assert_eq!(Stage::Funding.next(Event::FundingFailed), Ok(Stage::Failed));
        assert_eq!(Stage::DirectPath.next(Event::DirectFailed), Ok(Stage::Failed));
        assert!(Stage::Failed.is_terminal());
        assert!(Stage::Done.is_terminal());
        assert!(!Stage::DirectPath.is_terminal());
    }

    #[test]
    fn test_direct_path_cannot_return_to_relay() {
        let err = Stage::DirectPath.next(Event::RelayReady).unwrap_err();
        assert_eq!(
            err,
            TransitionError {
                stage: Stage::DirectPath,
                event: Event::RelayReady
            }
        );
        assert!(Stage::Done.next(Event::Funded).is_err());
        assert!(Stage::Probing.next(Event::DirectCompleted).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::RelayPath.to_string(), "RELAY_PATH");
        assert_eq!(Event::RelayFailed.to_string(), "relay_failed");
        assert_eq!(Path::Direct.to_string(), "direct");
    }
}
