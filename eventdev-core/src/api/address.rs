use super::ApiClient;
use crate::address::Address;
use crate::error::EventDevResult;

impl ApiClient {
    /// GET /address
    pub async fn addresses(&self) -> EventDevResult<Vec<Address>> {
        self.get_json("/address", "Failed to load addresses").await
    }
}
