//! Users/clients report - every user with the clients they own

use crate::domain::result::Result;
use crate::domain::UserClients;
use crate::ports::ReportStore;

pub struct ReportService;

impl ReportService {
    /// Users ordered by id, each with their clients ordered by id
    pub fn users_with_clients(store: &impl ReportStore) -> Result<Vec<UserClients>> {
        let rows = store.users_with_clients()?;
        Ok(UserClients::group(rows))
    }
}
