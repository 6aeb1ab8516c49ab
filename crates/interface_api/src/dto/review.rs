//! Review queue DTOs

use serde::{Deserialize, Serialize};

use domain_claims::ReviewQueueEntry;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewQueueQuery {
    pub threshold: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ReviewQueueResponse {
    pub threshold: f64,
    pub count: usize,
    pub entries: Vec<ReviewQueueEntry>,
}
