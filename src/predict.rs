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

use serde_derive::Serialize;
use tracing::debug;

use crate::error::{CfError, Undefined};
use crate::neighborhood::Neighborhood;
use crate::store::RatingMatrix;
use crate::types;
use crate::types::{Axis, Cell, EntityId};

/// A neighbor as it entered the weighted deviation sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: EntityId,
    pub similarity: f64,
    /// Full average over all dimensions of the neighbor.
    pub average: f64,
    /// The neighbor's own rating for the target, missing counts as zero.
    pub rating: Cell,
}

/// Outcome of a single prediction. The predicted value is not clamped to the rating range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub axis: Axis,
    pub subject: EntityId,
    pub target: EntityId,
    pub neighborhood: Vec<Neighbor>,
    /// Leave-one-out average of the subject, without the target dimension.
    pub subject_average: f64,
    pub predicted: f64,
    /// Entities whose similarity to the subject is undefined without the target dimension,
    /// in ascending id order. They never enter the neighborhood.
    pub undefined: Vec<EntityId>,
}

impl Prediction {

    /// One `UndefinedSimilarity` error per entity left out for a zero vector.
    pub fn undefined_pairs<'a>(&'a self) -> impl Iterator<Item=CfError> + 'a {
        self.undefined.iter().map(move |other| CfError::UndefinedSimilarity {
            axis: self.axis,
            subject: self.subject,
            other: *other,
            excluded: self.target,
        })
    }
}

/// Mean over all dimensions except `excluded`, missing ratings count as zero. `None` if
/// there is no observed rating outside of `excluded` to average over.
pub fn leave_one_out_average(vector: &[Cell], excluded: usize) -> Option<f64> {

    let mut sum = 0.0;
    let mut num_dimensions = 0;
    let mut num_observed = 0;

    for (dimension, cell) in vector.iter().enumerate() {
        if dimension != excluded {
            sum += types::value_of(cell);
            num_dimensions += 1;
            if cell.is_some() {
                num_observed += 1;
            }
        }
    }

    if num_observed == 0 {
        None
    } else {
        Some(sum / num_dimensions as f64)
    }
}

/// Mean over all dimensions, missing ratings count as zero. Vectors of the matrix are never
/// empty, as every entity implies at least one entity on the orthogonal axis.
pub fn full_average(vector: &[Cell]) -> f64 {
    let sum: f64 = vector.iter().map(types::value_of).sum();
    sum / vector.len() as f64
}

/// Combines the subject's leave-one-out average with the similarity-weighted deviations of
/// its neighbors from their full averages.
pub fn predict(
    matrix: &RatingMatrix,
    axis: Axis,
    subject: EntityId,
    target: EntityId,
    neighborhood: &Neighborhood,
) -> Result<Prediction, CfError> {

    let subject_idx = matrix.index_of(axis, subject)?;
    let target_idx = matrix.index_of(axis.orthogonal(), target)?;

    let undefined =
        |cause: Undefined| CfError::UndefinedPrediction { axis, subject, target, cause };

    let subject_average =
        leave_one_out_average(matrix.vector(axis, subject_idx), target_idx)
            .ok_or_else(|| undefined(Undefined::NoBaseline))?;

    debug!(%axis, subject, target, average = subject_average, "leave-one-out average");

    let mut weighted_deviations = 0.0;
    let mut similarity_sum = 0.0;
    let mut neighbors = Vec::with_capacity(neighborhood.len());

    for scored in neighborhood.neighbors.iter() {

        let neighbor_vector = matrix.vector(axis, matrix.index_of(axis, scored.id)?);

        let average = full_average(neighbor_vector);
        let rating = neighbor_vector[target_idx];

        weighted_deviations += scored.similarity * (types::value_of(&rating) - average);
        similarity_sum += scored.similarity;

        debug!(%axis, neighbor = scored.id, average, "full average");

        neighbors.push(Neighbor { id: scored.id, similarity: scored.similarity, average, rating });
    }

    if similarity_sum == 0.0 {
        return Err(undefined(Undefined::ZeroSimilaritySum));
    }

    let predicted = subject_average + weighted_deviations / similarity_sum;

    Ok(Prediction {
        axis,
        subject,
        target,
        neighborhood: neighbors,
        subject_average,
        predicted,
        undefined: Vec::new(),
    })
}
