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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::error::CfError;
use crate::similarity::SimilarityRow;
use crate::types::EntityId;

/// A candidate neighbor and its similarity to the subject.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ScoredEntity {
    pub id: EntityId,
    pub similarity: f64,
}

/// Ordering for our max-heap: the worst candidate sits on top. Higher similarity ranks first,
/// equal similarities rank by ascending id. There is no total order on floating point numbers,
/// but similarity rows never contain NaN.
fn cmp_reverse(scored_a: &ScoredEntity, scored_b: &ScoredEntity) -> Ordering {
    let by_score = match scored_a.similarity.partial_cmp(&scored_b.similarity) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        Some(Ordering::Equal) => Ordering::Equal,
        None => Ordering::Equal
    };

    by_score.then_with(|| scored_a.id.cmp(&scored_b.id))
}

impl Eq for ScoredEntity {}

impl Ord for ScoredEntity {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredEntity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// The most similar entities of a subject, best first.
#[derive(Debug, Clone)]
pub struct Neighborhood {
    pub subject: EntityId,
    pub neighbors: Vec<ScoredEntity>,
}

impl Neighborhood {

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.neighbors.iter().map(|scored| scored.id).collect()
    }

    pub fn similarity_sum(&self) -> f64 {
        self.neighbors.iter().map(|scored| scored.similarity).sum()
    }
}

pub fn check_size(size: usize) -> Result<(), CfError> {
    if size < 1 {
        Err(CfError::InvalidNeighborhoodSize { size })
    } else {
        Ok(())
    }
}

/// Selects the `size` entities with the highest similarity, in descending order of similarity
/// with ties broken by ascending id. Returns all candidates if there are fewer than `size`.
pub fn select(row: &SimilarityRow, size: usize) -> Result<Neighborhood, CfError> {

    check_size(size)?;

    let mut heap: BinaryHeap<ScoredEntity> = BinaryHeap::with_capacity(size.min(row.len()));

    for (other, similarity) in row.scores.iter() {

        let scored = ScoredEntity { id: *other, similarity: *similarity };

        if heap.len() < size {
            heap.push(scored);
        } else if let Some(mut top) = heap.peek_mut() {
            if scored < *top {
                *top = scored;
            }
        }
    }

    // Ascending in our reversed order means best first
    let neighbors = heap.into_sorted_vec();

    for (rank, scored) in neighbors.iter().enumerate() {
        debug!(
            axis = %row.axis,
            subject = row.subject,
            rank,
            neighbor = scored.id,
            similarity = scored.similarity,
            "selected neighbor"
        );
    }

    Ok(Neighborhood { subject: row.subject, neighbors })
}

#[cfg(test)]
mod tests {

    use fnv::FnvHashMap;
    use rand::{Rng, XorShiftRng};

    use crate::error::CfError;
    use crate::neighborhood;
    use crate::neighborhood::ScoredEntity;
    use crate::similarity::SimilarityRow;
    use crate::types::Axis;

    fn row(scores: &[(u32, f64)]) -> SimilarityRow {
        let scores: FnvHashMap<u32, f64> = scores.iter().cloned().collect();
        SimilarityRow { axis: Axis::User, subject: 0, excluded: 99, scores, undefined: Vec::new() }
    }

    #[test]
    fn scored_entity_ordering_reversed() {
        let entity_a = ScoredEntity { id: 1, similarity: 0.5 };
        let entity_b = ScoredEntity { id: 2, similarity: 0.9 };
        let entity_c = ScoredEntity { id: 3, similarity: 0.5 };

        assert!(entity_a > entity_b);
        assert!(entity_a < entity_c);
        assert!(entity_b < entity_c);
    }

    #[test]
    fn topk() {
        let row = row(&[(1, 0.5), (2, 0.15), (3, 0.3), (4, 0.95), (5, 0.25)]);

        let neighborhood = neighborhood::select(&row, 3).unwrap();

        assert_eq!(neighborhood.subject, 0);
        assert_eq!(neighborhood.ids(), vec![4, 1, 3]);
        assert!((neighborhood.similarity_sum() - 1.75).abs() < 1e-12);
    }

    #[test]
    fn ties_broken_by_ascending_id() {
        let row = row(&[(8, 0.5), (3, 0.5), (6, 0.7), (1, 0.5), (9, 0.5)]);

        assert_eq!(neighborhood::select(&row, 3).unwrap().ids(), vec![6, 1, 3]);
        assert_eq!(neighborhood::select(&row, 5).unwrap().ids(), vec![6, 1, 3, 8, 9]);
    }

    #[test]
    fn fewer_candidates_than_requested() {
        let row = row(&[(2, 0.1), (1, 0.2)]);

        assert_eq!(neighborhood::select(&row, 10).unwrap().ids(), vec![1, 2]);
    }

    #[test]
    fn empty_row_gives_empty_neighborhood() {
        let row = row(&[]);

        assert!(neighborhood::select(&row, 2).unwrap().is_empty());
    }

    #[test]
    fn size_must_be_positive() {
        let row = row(&[(1, 0.2)]);

        match neighborhood::select(&row, 0) {
            Err(CfError::InvalidNeighborhoodSize { size: 0 }) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn selection_is_sorted_and_complete() {
        let mut rng = XorShiftRng::new_unseeded();

        for _ in 0..50 {
            let num_candidates: u32 = rng.gen_range(0, 30);
            // Coarse scores so that ties actually happen
            let scores: Vec<(u32, f64)> = (0..num_candidates)
                .map(|id| (id, rng.gen_range(0u32, 5) as f64 / 4.0))
                .collect();
            let size = rng.gen_range(1, 40);

            let neighborhood = neighborhood::select(&row(&scores), size).unwrap();

            assert_eq!(neighborhood.len(), size.min(scores.len()));

            for pair in neighborhood.neighbors.windows(2) {
                assert!(pair[0].similarity > pair[1].similarity ||
                    (pair[0].similarity == pair[1].similarity && pair[0].id < pair[1].id));
            }

            // Nothing left out scores better than the last selected neighbor
            if let Some(last) = neighborhood.neighbors.last() {
                let selected = neighborhood.ids();
                for &(id, similarity) in scores.iter().filter(|(id, _)| !selected.contains(id)) {
                    assert!(ScoredEntity { id, similarity } > *last);
                }
            }
        }
    }
}
