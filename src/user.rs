//! The user record handed back to the host login pipeline.
use ldap3::SearchEntry;
use serde::{Deserialize, Serialize};

use crate::{config::AttributeConfig, entry::SearchEntryExt, error::Error};

/// Marker recorded on every user this plugin produces, identifying the
/// directory lookup as the authentication provider.
pub const AUTH_PROVIDER: &str = "ldap";

/// Access level granted to a user. Directory lookups only ever grant the
/// basic level; anything higher is managed inside the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// An ordinary user.
	User,
}

/// Data about a user, in the shape the host login pipeline expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// The id the user logs in with.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Email address.
	pub email: String,
	/// Whether the account is active.
	pub enabled: bool,
	/// Whether the account is managed outside the host application.
	pub external: bool,
	/// Access level.
	pub role: Role,
	/// Which authentication provider produced this record.
	pub auth_provider: String,
}

impl User {
	/// Converts a found [`SearchEntry`] to a [`User`] using the attribute
	/// names in the given configuration. Directory users always come back
	/// enabled, external, and with the basic role.
	///
	/// # Errors
	/// [`Error::MissingAttribute`] when the entry lacks one of the mapped
	/// attributes. A found entry without them means the attribute mapping is
	/// misconfigured, not that the user is unknown, so this is never turned
	/// into an absent user.
	pub fn from_search(
		user_id: &str,
		entry: &SearchEntry,
		attributes: &AttributeConfig,
	) -> Result<Self, Error> {
		let name = entry.require_attr(&attributes.name)?.to_owned();
		let email = entry.require_attr(&attributes.email)?.to_owned();
		Ok(User {
			id: user_id.to_owned(),
			name,
			email,
			enabled: true,
			external: true,
			role: Role::User,
			auth_provider: AUTH_PROVIDER.to_owned(),
		})
	}
}
