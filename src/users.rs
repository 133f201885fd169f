//! Account user listing for the Datto RMM API.

use serde::{Deserialize, Serialize};

use crate::client::RmmClient;
use crate::error::Result;
use crate::paging::{PageDetails, PagedEnvelope};

/// A platform user on the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Platform login name.
    pub user_name: String,

    /// First name, when set on the profile.
    #[serde(default)]
    pub first_name: Option<String>,

    /// Last name, when set on the profile.
    #[serde(default)]
    pub last_name: Option<String>,

    /// Email address, when set on the profile.
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Pagination envelope for user collections (`users` array).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersPage {
    /// The user rows for this page.
    #[serde(default)]
    pub users: Vec<User>,

    /// Pagination descriptor; absent on some single-page responses.
    #[serde(default)]
    pub page_details: Option<PageDetails>,
}

impl PagedEnvelope for UsersPage {
    type Item = User;

    fn into_page(self) -> (Vec<User>, Option<String>) {
        let next = self.page_details.and_then(|details| details.next_page_url);
        (self.users, next)
    }
}

/// Retrieves every user on the account, across all pages.
pub async fn fetch_users(client: &RmmClient) -> Result<Vec<User>> {
    client.fetch_all::<UsersPage>("/v2/account/users").await
}
