use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub points: i64,
}

/// Body for both `POST /user/points` (set) and `POST /user/points/add`.
#[derive(Debug, Deserialize)]
pub struct PointsRequest {
    pub points: i64,
}
