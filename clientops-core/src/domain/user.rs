//! User and client read models for the users/clients report

use serde::{Deserialize, Serialize};

/// Application login account, as shown in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub fullname: Option<String>,
    pub email: Option<String>,
}

/// A client owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// One flat row of `users LEFT JOIN clients`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserClientRow {
    pub user: UserSummary,
    pub client: Option<ClientSummary>,
}

/// A user with all of their clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClients {
    pub user: UserSummary,
    pub clients: Vec<ClientSummary>,
}

impl UserClients {
    /// Group join rows by user, keeping row order
    ///
    /// Rows must arrive ordered by user id, which is how the report query
    /// returns them. Users without clients keep an empty list.
    pub fn group(rows: Vec<UserClientRow>) -> Vec<UserClients> {
        let mut grouped: Vec<UserClients> = Vec::new();
        for row in rows {
            match grouped.last_mut() {
                Some(last) if last.user.id == row.user.id => {
                    last.clients.extend(row.client);
                }
                _ => grouped.push(UserClients {
                    user: row.user,
                    clients: row.client.into_iter().collect(),
                }),
            }
        }
        grouped
    }
}
