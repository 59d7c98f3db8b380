use fnv::{FnvHashMap, FnvHashSet};

use crate::types::{Axis, EntityId, Triple};

/// The frozen universe of users and items observed in the input. Ids are assigned dense,
/// consecutive indices in ascending id order, so that every iteration over entities is
/// deterministic.
pub struct DataDictionary {
    user_ids: Vec<EntityId>,
    item_ids: Vec<EntityId>,
    user_dict: FnvHashMap<EntityId, usize>,
    item_dict: FnvHashMap<EntityId, usize>,
    num_ratings: u64,
}

impl DataDictionary {

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_ids.len()
    }

    /// Number of rating records seen, overwritten duplicates included.
    pub fn num_ratings(&self) -> u64 {
        self.num_ratings
    }

    pub fn num_entities(&self, axis: Axis) -> usize {
        self.ids(axis).len()
    }

    pub(crate) fn user_index(&self, user: EntityId) -> Option<usize> {
        self.user_dict.get(&user).cloned()
    }

    pub(crate) fn item_index(&self, item: EntityId) -> Option<usize> {
        self.item_dict.get(&item).cloned()
    }

    pub fn index(&self, axis: Axis, id: EntityId) -> Option<usize> {
        match axis {
            Axis::User => self.user_index(id),
            Axis::Item => self.item_index(id),
        }
    }

    /// Ascending ids of all entities on `axis`, position equals dense index.
    pub fn ids(&self, axis: Axis) -> &[EntityId] {
        match axis {
            Axis::User => &self.user_ids,
            Axis::Item => &self.item_ids,
        }
    }

    pub fn id(&self, axis: Axis, index: usize) -> EntityId {
        self.ids(axis)[index]
    }
}

impl<'a, T> From<T> for DataDictionary where T: Iterator<Item=&'a Triple> {

    fn from(triples: T) -> Self {

        let mut users: FnvHashSet<EntityId> =
            FnvHashSet::with_capacity_and_hasher(100, Default::default());
        let mut items: FnvHashSet<EntityId> =
            FnvHashSet::with_capacity_and_hasher(100, Default::default());

        let mut num_ratings: u64 = 0;

        for &(user, item, _) in triples {
            users.insert(user);
            items.insert(item);
            num_ratings += 1;
        }

        let (user_ids, user_dict) = dense_indices(users);
        let (item_ids, item_dict) = dense_indices(items);

        DataDictionary { user_ids, item_ids, user_dict, item_dict, num_ratings }
    }
}

fn dense_indices(ids: FnvHashSet<EntityId>) -> (Vec<EntityId>, FnvHashMap<EntityId, usize>) {

    let mut sorted_ids: Vec<EntityId> = ids.into_iter().collect();
    sorted_ids.sort_unstable();

    let dict: FnvHashMap<EntityId, usize> = sorted_ids.iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect();

    (sorted_ids, dict)
}

#[cfg(test)]
mod tests {

    use crate::stats::DataDictionary;
    use crate::types::{Axis, Triple};

    #[test]
    fn dense_indices_follow_ascending_ids() {
        let triples: Vec<Triple> =
            vec![(7, 300, 4), (2, 100, 3), (7, 100, 5), (5, 200, 1), (2, 100, 2)];

        let data_dict = DataDictionary::from(triples.iter());

        assert_eq!(data_dict.num_users(), 3);
        assert_eq!(data_dict.num_items(), 3);
        assert_eq!(data_dict.num_ratings(), 5);

        assert_eq!(data_dict.ids(Axis::User), &[2, 5, 7]);
        assert_eq!(data_dict.ids(Axis::Item), &[100, 200, 300]);

        assert_eq!(data_dict.user_index(7), Some(2));
        assert_eq!(data_dict.item_index(100), Some(0));
        assert_eq!(data_dict.index(Axis::Item, 300), Some(2));
        assert_eq!(data_dict.id(Axis::User, 1), 5);
    }

    #[test]
    fn user_and_item_ids_are_disjoint_spaces() {
        let triples: Vec<Triple> = vec![(1, 2, 5), (2, 1, 3)];

        let data_dict = DataDictionary::from(triples.iter());

        assert_eq!(data_dict.user_index(1), Some(0));
        assert_eq!(data_dict.item_index(1), Some(0));
        assert_eq!(data_dict.user_index(3), None);
        assert_eq!(data_dict.index(Axis::Item, 3), None);
    }
}
