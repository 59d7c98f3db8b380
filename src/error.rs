/**
 * Cofi
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::fmt;
use std::io;

use thiserror::Error;

use crate::types::{Axis, EntityId};

/// Why a prediction has no numeric value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Undefined {
    /// The subject has no observed rating besides the target, its leave-one-out average
    /// is undefined.
    NoBaseline,
    /// The similarities of the selected neighborhood sum up to zero.
    ZeroSimilaritySum,
}

impl fmt::Display for Undefined {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Undefined::NoBaseline => write!(f, "no rating besides the target to average over"),
            Undefined::ZeroSimilaritySum =>
                write!(f, "similarities of the neighborhood sum to zero"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CfError {
    #[error("malformed rating record on line {line}: {reason}")]
    MalformedInput { line: u64, reason: String },

    #[error("unknown {axis} {id}")]
    UnknownEntity { axis: Axis, id: EntityId },

    #[error("invalid neighborhood size {size}, must be at least 1")]
    InvalidNeighborhoodSize { size: usize },

    #[error("similarity between {axis} {subject} and {axis} {other} is undefined when leaving out \
        dimension {excluded} (zero vector)")]
    UndefinedSimilarity { axis: Axis, subject: EntityId, other: EntityId, excluded: EntityId },

    #[error("{axis}-based prediction for {axis} {subject} and target {target} is undefined: \
        {cause}")]
    UndefinedPrediction { axis: Axis, subject: EntityId, target: EntityId, cause: Undefined },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {

    use crate::error::{CfError, Undefined};
    use crate::types::Axis;

    #[test]
    fn messages_name_the_entities_involved() {
        let unknown = CfError::UnknownEntity { axis: Axis::Item, id: 42 };
        assert_eq!(unknown.to_string(), "unknown item 42");

        let undefined = CfError::UndefinedPrediction {
            axis: Axis::User,
            subject: 1,
            target: 30,
            cause: Undefined::ZeroSimilaritySum,
        };
        let message = undefined.to_string();
        assert!(message.starts_with("user-based prediction for user 1 and target 30"));
        assert!(message.ends_with("similarities of the neighborhood sum to zero"));

        let similarity = CfError::UndefinedSimilarity {
            axis: Axis::User,
            subject: 3,
            other: 4,
            excluded: 10,
        };
        assert!(similarity.to_string().contains("user 3 and user 4"));
    }
}
