//! Memory-based collaborative filtering over a dense rating matrix. A prediction runs through
//! four stages, instantiated once per axis: the `RatingMatrix` feeds cosine `similarity`
//! computations, the most similar entities are `select`ed as neighborhood, and `predict`
//! combines the subject's baseline with the neighbors' weighted deviations.

use std::sync::Mutex;
use std::time::Instant;

use scoped_pool::Pool;
use tracing::{info, warn};

pub mod error;
pub mod io;
pub mod neighborhood;
pub mod predict;
pub mod similarity;
pub mod stats;
pub mod store;
pub mod types;


pub use error::{CfError, Undefined};
pub use predict::Prediction;
pub use store::RatingMatrix;
pub use types::{Axis, EntityId, Rating};

/// Predicts the rating `user` would give `item` from the users most similar to `user`.
pub fn predict_user_based(
    matrix: &RatingMatrix,
    user: EntityId,
    item: EntityId,
    neighborhood_size: usize,
) -> Result<Prediction, CfError> {
    predict_on_axis(matrix, Axis::User, user, item, neighborhood_size)
}

/// Predicts the rating `item` would receive from `user` from the items most similar to `item`.
pub fn predict_item_based(
    matrix: &RatingMatrix,
    item: EntityId,
    user: EntityId,
    neighborhood_size: usize,
) -> Result<Prediction, CfError> {
    predict_on_axis(matrix, Axis::Item, item, user, neighborhood_size)
}

fn predict_on_axis(
    matrix: &RatingMatrix,
    axis: Axis,
    subject: EntityId,
    target: EntityId,
    neighborhood_size: usize,
) -> Result<Prediction, CfError> {

    // Reject invalid requests before computing anything
    neighborhood::check_size(neighborhood_size)?;
    matrix.index_of(axis, subject)?;
    matrix.index_of(axis.orthogonal(), target)?;

    let row = similarity::similarity(subject, target, matrix, axis)?;
    let neighborhood = neighborhood::select(&row, neighborhood_size)?;
    let mut prediction = predict::predict(matrix, axis, subject, target, &neighborhood)?;
    prediction.undefined = row.undefined;

    info!(
        %axis,
        subject,
        target,
        predicted = prediction.predicted,
        num_undefined = prediction.undefined.len(),
        "predicted rating"
    );

    Ok(prediction)
}

/// Both predictions for one (user, item) query of a batch.
#[derive(Debug)]
pub struct BatchPrediction {
    pub user: EntityId,
    pub item: EntityId,
    pub user_based: Result<Prediction, CfError>,
    pub item_based: Result<Prediction, CfError>,
}

/// Runs user-based and item-based prediction for every (user, item) query on a pool of
/// `pool_size` threads. All threads only read the shared matrix. Results come back in query
/// order, failed predictions do not abort the batch.
pub fn predict_batch(
    matrix: &RatingMatrix,
    queries: &[(EntityId, EntityId)],
    neighborhood_size: usize,
    pool_size: usize,
) -> Vec<BatchPrediction> {

    let pool = Pool::new(pool_size.max(1));

    let slots: Vec<Mutex<Option<BatchPrediction>>> =
        queries.iter().map(|_| Mutex::new(None)).collect();

    let batch_start = Instant::now();

    pool.scoped(|scope| {
        for (&(user, item), slot) in queries.iter().zip(slots.iter()) {
            scope.execute(move || {
                let user_based = predict_user_based(matrix, user, item, neighborhood_size);
                let item_based = predict_item_based(matrix, item, user, neighborhood_size);

                let outcomes = [&user_based, &item_based];
                for failure in outcomes.iter().filter_map(|result| result.as_ref().err()) {
                    warn!(user, item, %failure, "prediction failed");
                }

                let mut slot = slot.lock().expect("slot mutex poisoned by another job");
                *slot = Some(BatchPrediction { user, item, user_based, item_based });
            });
        }
    });

    pool.shutdown();

    info!(
        num_queries = queries.len(),
        millis = batch_start.elapsed().as_millis() as u64,
        "batch prediction finished"
    );

    // A panicking job already propagates out of `pool.scoped`, so every slot is filled
    slots.into_iter()
        .map(|slot| {
            slot.into_inner()
                .expect("slot mutex poisoned by another job")
                .expect("every query gets a prediction")
        })
        .collect()
}
