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

use serde_derive::Serialize;

/// Identifier of a user or an item. Users and items live in disjoint id spaces.
pub type EntityId = u32;

/// An observed rating. The value 0 is never a legitimate observation.
pub type Rating = u32;

/// A single cell of the rating matrix, `None` marks "no rating".
pub type Cell = Option<Rating>;

/// A dense row (or column) of the rating matrix, indexed by the dense indices of the
/// orthogonal axis.
pub type DenseVector = Vec<Cell>;

pub type DenseMatrix = Vec<DenseVector>;

/// An observed (user, item, rating) record.
pub type Triple = (EntityId, EntityId, Rating);

/// Which kind of entity acts as subject and neighbor of a computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    User,
    Item,
}

impl Axis {

    /// The axis whose entities form the dimensions of this axis' vectors.
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::User => Axis::Item,
            Axis::Item => Axis::User,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Axis::User => write!(f, "user"),
            Axis::Item => write!(f, "item"),
        }
    }
}

pub fn new_dense_matrix(num_rows: usize, num_columns: usize) -> DenseMatrix {
    vec![vec![None; num_columns]; num_rows]
}

/// Value a cell contributes to sums, missing ratings count as zero.
#[inline(always)]
pub fn value_of(cell: &Cell) -> f64 {
    cell.map_or(0.0, |rating| rating as f64)
}
