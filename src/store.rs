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

use tracing::info;

use crate::error::CfError;
use crate::stats::DataDictionary;
use crate::types;
use crate::types::{Axis, Cell, DenseMatrix, EntityId, Rating, Triple};

/// Value reserved for "no rating" in the input data.
pub const UNRATED: Rating = 0;

/// Dense user x item rating matrix, held in both orientations. The entity universe is fixed
/// at construction time, every (user, item) pair has a cell and cells without an observed
/// rating hold `None`.
pub struct RatingMatrix {
    data_dict: DataDictionary,
    by_user: DenseMatrix,
    by_item: DenseMatrix,
}

impl RatingMatrix {

    /// Builds the matrix from observed triples. Users and items are exactly those appearing
    /// in `triples`, later duplicates of a (user, item) pair overwrite earlier ones.
    pub fn build(triples: &[Triple]) -> Self {

        // The universe is frozen before any cell gets written
        let data_dict = DataDictionary::from(triples.iter());

        let num_users = data_dict.num_users();
        let num_items = data_dict.num_items();

        let mut by_user = types::new_dense_matrix(num_users, num_items);
        let mut by_item = types::new_dense_matrix(num_items, num_users);

        for &(user, item, rating) in triples.iter() {
            if let (Some(user_idx), Some(item_idx)) =
                (data_dict.user_index(user), data_dict.item_index(item)) {

                let cell: Cell = Some(rating).filter(|rating| *rating != UNRATED);

                by_user[user_idx][item_idx] = cell;
                by_item[item_idx][user_idx] = cell;
            }
        }

        info!(
            num_ratings = data_dict.num_ratings(),
            num_users,
            num_items,
            "built rating matrix"
        );

        RatingMatrix { data_dict, by_user, by_item }
    }

    /// Builds the matrix from parsed records, aborting on the first malformed one.
    pub fn from_records<I>(records: I) -> Result<Self, CfError>
        where I: IntoIterator<Item=Result<Triple, CfError>> {

        let triples = records.into_iter().collect::<Result<Vec<Triple>, CfError>>()?;

        Ok(RatingMatrix::build(&triples))
    }

    pub fn data_dictionary(&self) -> &DataDictionary {
        &self.data_dict
    }

    pub fn num_entities(&self, axis: Axis) -> usize {
        self.data_dict.num_entities(axis)
    }

    /// The cell for `(user, item)`, or an error if either is not part of the universe.
    pub fn rating(&self, user: EntityId, item: EntityId) -> Result<Cell, CfError> {
        let user_idx = self.index_of(Axis::User, user)?;
        let item_idx = self.index_of(Axis::Item, item)?;

        Ok(self.by_user[user_idx][item_idx])
    }

    /// Dense index of entity `id` on `axis`.
    pub fn index_of(&self, axis: Axis, id: EntityId) -> Result<usize, CfError> {
        self.data_dict.index(axis, id).ok_or(CfError::UnknownEntity { axis, id })
    }

    pub fn id_of(&self, axis: Axis, index: usize) -> EntityId {
        self.data_dict.id(axis, index)
    }

    /// The vector of the entity at dense `index` on `axis`: a user's row or an item's column,
    /// indexed by the dense indices of the orthogonal axis.
    pub fn vector(&self, axis: Axis, index: usize) -> &[Cell] {
        match axis {
            Axis::User => &self.by_user[index],
            Axis::Item => &self.by_item[index],
        }
    }
}
