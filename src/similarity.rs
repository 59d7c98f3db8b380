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

use fnv::FnvHashMap;
use tracing::debug;

use crate::error::CfError;
use crate::store::RatingMatrix;
use crate::types;
use crate::types::{Axis, Cell, EntityId};

/// Cosine similarities of one subject to every other entity on its axis, computed with one
/// dimension of the orthogonal axis left out.
#[derive(Debug)]
pub struct SimilarityRow {
    pub axis: Axis,
    pub subject: EntityId,
    pub excluded: EntityId,
    pub scores: FnvHashMap<EntityId, f64>,
    /// Entities whose similarity to the subject is undefined, in ascending id order.
    pub undefined: Vec<EntityId>,
}

impl SimilarityRow {

    pub fn score(&self, other: EntityId) -> Option<f64> {
        self.scores.get(&other).cloned()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// One `UndefinedSimilarity` error per pair without a score.
    pub fn undefined_pairs<'a>(&'a self) -> impl Iterator<Item=CfError> + 'a {
        self.undefined.iter().map(move |other| CfError::UndefinedSimilarity {
            axis: self.axis,
            subject: self.subject,
            other: *other,
            excluded: self.excluded,
        })
    }
}

/// Cosine similarity over all dimensions except `excluded`. Missing ratings are not skipped,
/// they contribute zeros to the dot product and both norms. Returns `None` if either vector
/// is zero after the exclusion.
pub fn cosine(subject: &[Cell], other: &[Cell], excluded: usize) -> Option<f64> {

    let mut dot_product = 0.0;
    let mut squared_norm_subject = 0.0;
    let mut squared_norm_other = 0.0;

    for (dimension, (cell_subject, cell_other)) in subject.iter().zip(other.iter()).enumerate() {
        if dimension != excluded {
            let value_subject = types::value_of(cell_subject);
            let value_other = types::value_of(cell_other);

            dot_product += value_subject * value_other;
            squared_norm_subject += value_subject * value_subject;
            squared_norm_other += value_other * value_other;
        }
    }

    if squared_norm_subject == 0.0 || squared_norm_other == 0.0 {
        None
    } else {
        Some(dot_product / (squared_norm_subject.sqrt() * squared_norm_other.sqrt()))
    }
}

/// Similarity of two entities on `axis`, leaving out dimension `excluded` of the orthogonal
/// axis.
pub fn similarity_between(
    subject: EntityId,
    other: EntityId,
    excluded: EntityId,
    matrix: &RatingMatrix,
    axis: Axis,
) -> Result<f64, CfError> {

    let subject_idx = matrix.index_of(axis, subject)?;
    let other_idx = matrix.index_of(axis, other)?;
    let excluded_idx = matrix.index_of(axis.orthogonal(), excluded)?;

    cosine(matrix.vector(axis, subject_idx), matrix.vector(axis, other_idx), excluded_idx)
        .ok_or(CfError::UndefinedSimilarity { axis, subject, other, excluded })
}

/// Computes the similarity of `subject` to every other entity on `axis`. Pairs with an
/// undefined similarity do not abort the computation, they are recorded in
/// `SimilarityRow::undefined` instead.
pub fn similarity(
    subject: EntityId,
    excluded: EntityId,
    matrix: &RatingMatrix,
    axis: Axis,
) -> Result<SimilarityRow, CfError> {

    let subject_idx = matrix.index_of(axis, subject)?;
    let excluded_idx = matrix.index_of(axis.orthogonal(), excluded)?;

    let subject_vector = matrix.vector(axis, subject_idx);
    let num_entities = matrix.num_entities(axis);

    let mut scores: FnvHashMap<EntityId, f64> =
        FnvHashMap::with_capacity_and_hasher(num_entities, Default::default());
    let mut undefined = Vec::new();

    for other_idx in (0..num_entities).filter(|other_idx| *other_idx != subject_idx) {

        let other = matrix.id_of(axis, other_idx);

        match cosine(subject_vector, matrix.vector(axis, other_idx), excluded_idx) {
            Some(score) => { scores.insert(other, score); },
            None => {
                debug!(%axis, subject, other, excluded, "undefined similarity, zero vector");
                undefined.push(other);
            }
        }
    }

    Ok(SimilarityRow { axis, subject, excluded, scores, undefined })
}
