use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload. Both fields are required; anything else in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userID")]
    pub user_id: Uuid, // serialized as the hyphenated string form
    pub exp: i64,      // expires at (unix timestamp)
}
