//! The login plugin invoked by the host authentication pipeline.
use std::sync::Arc;

use async_trait::async_trait;
use ldap3::{Scope, SearchEntry};
use tracing::warn;

use crate::{config::Config, directory::Directory, error::Error, user::User};

/// The hooks the host login pipeline invokes on an authentication provider.
#[async_trait]
pub trait OnLogin {
	/// Looks up `user_id`, returning `None` when this provider does not know
	/// the user.
	async fn load_user(&self, user_id: &str) -> Result<Option<User>, Error>;

	/// Checks `password` for `user_id` against this provider.
	async fn validate_user(&self, user_id: &str, password: &str) -> bool;

	/// Persists changes the host application made to `user`.
	async fn save_user(&self, user: &User);
}

/// Looks up login users in the directory server: one single-level search per
/// login attempt, first matching entry mapped onto a [`User`].
#[derive(Clone, Debug)]
pub struct LdapLoginPlugin {
	/// Connections to the directory server and the lookup configuration.
	directory: Arc<Directory>,
}

impl LdapLoginPlugin {
	/// Creates a plugin looking up users through `directory`.
	#[must_use]
	pub fn new(directory: Arc<Directory>) -> Self {
		Self { directory }
	}

	/// Performs the single one-level search for `user_id` and returns the
	/// first matching entry. The directory is expected to hold at most one
	/// entry per user id.
	async fn search_user(
		&self,
		user_id: &str,
		config: &Config,
	) -> Result<Option<SearchEntry>, Error> {
		let mut conn = self.directory.acquire().await?;
		let (entries, _res) = conn
			.with_timeout(config.connection.timeout())
			.search(
				&config.searches.search_base(),
				Scope::OneLevel,
				&config.searches.search_filter(user_id),
				config.attributes.as_list(),
			)
			.await?
			.success()?;
		Ok(entries.into_iter().next().map(SearchEntry::construct))
	}
}

#[async_trait]
impl OnLogin for LdapLoginPlugin {
	async fn load_user(&self, user_id: &str) -> Result<Option<User>, Error> {
		let config = self.directory.config().await;
		if !config.enabled {
			return Ok(None);
		}

		let entry = match self.search_user(user_id, &config).await {
			Ok(Some(entry)) => entry,
			Ok(None) => return Ok(None),
			// A directory outage degrades to "user not found" so the host
			// login flow can fall through to its other providers.
			Err(err) => {
				warn!("cannot find {user_id} in the directory: {err}");
				return Ok(None);
			}
		};

		Ok(Some(User::from_search(user_id, &entry, &config.attributes)?))
	}

	/// Not implemented; always returns `false`.
	// TODO: validate the password with a user bind via
	// `Directory::acquire_bound` once that is confirmed as the intended
	// behavior.
	async fn validate_user(&self, _user_id: &str, _password: &str) -> bool {
		false
	}

	async fn save_user(&self, _user: &User) {
		// The directory is read-only from this plugin's perspective.
	}
}
