//! Config for the directory login plugin.
use std::time::Duration;

use ldap3::ldap_escape;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::pool::Bind;

/// The well-known LDAP port, used when the host configuration does not name
/// one.
const DEFAULT_PORT: u16 = 389;

/// Directory login configuration, read from the host application's property
/// store. All fields have defaults so that a property file only needs to name
/// the keys it sets; the whole section may be reloaded at runtime and handed
/// to [`Directory::reload`](crate::Directory::reload).
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
	/// Whether directory login is enabled at all.
	pub enabled: bool,
	/// Host name or address of the directory server. An `ldap://` scheme
	/// prefix is accepted and stripped. A blank value means no server is
	/// configured and leaves directory login disabled.
	pub server: String,
	/// Port of the directory server.
	pub port: u16,
	/// The DN to bind with when opening pooled connections. Connections are
	/// opened unauthenticated unless both this and `manager_password` are
	/// set.
	pub manager_dn: Option<String>,
	/// The password belonging to `manager_dn`.
	pub manager_password: Option<String>,
	/// Connection settings.
	pub connection: ConnectionConfig,
	/// Bases and the filter template to use for user searches.
	pub searches: Searches,
	/// Names of the attributes to map onto the user record.
	pub attributes: AttributeConfig,
}

impl Config {
	/// The URL to connect to the directory server with, or `None` when no
	/// server is configured.
	#[must_use]
	pub fn server_url(&self) -> Option<Url> {
		let server = self.server.trim();
		let server = server.strip_prefix("ldap://").unwrap_or(server);
		if server.is_empty() {
			return None;
		}
		Url::parse(&format!("ldap://{}:{}", server, self.port)).ok()
	}

	/// The manager credentials to bind pooled connections with. `None` unless
	/// both the DN and the password are configured, in which case connections
	/// stay unauthenticated.
	#[must_use]
	pub fn bind(&self) -> Option<Bind> {
		match (&self.manager_dn, &self.manager_password) {
			(Some(dn), Some(password)) if !is_blank(dn) && !is_blank(password) => {
				Some(Bind::new(dn.clone(), password.clone()))
			}
			_ => None,
		}
	}

	/// Returns an example [`Config`]
	#[allow(dead_code)]
	pub(crate) fn example() -> Self {
		Config {
			enabled: true,
			server: "ldap://localhost".to_owned(),
			port: 1389,
			manager_dn: None,
			manager_password: None,
			connection: ConnectionConfig::default(),
			searches: Searches {
				base_dn: "dc=example,dc=org".to_owned(),
				user_base: "ou=users".to_owned(),
				user_filter: "objectClass=inetOrgPerson".to_owned(),
			},
			attributes: AttributeConfig::default(),
		}
	}
}

impl Default for Config {
	fn default() -> Self {
		Config {
			enabled: false,
			server: String::new(),
			port: DEFAULT_PORT,
			manager_dn: None,
			manager_password: None,
			connection: ConnectionConfig::default(),
			searches: Searches::default(),
			attributes: AttributeConfig::default(),
		}
	}
}

/// Configuration for the connections held to the directory server
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
	/// Time to wait for a directory response, in milliseconds. Also bounds
	/// how long a lookup waits for a free pooled connection.
	pub response_timeout: u64,

	/// Number of pooled connections held to the directory server.
	pub pool_size: usize,
}

impl ConnectionConfig {
	/// The response timeout as a [`Duration`].
	#[must_use]
	pub(crate) fn timeout(&self) -> Duration {
		Duration::from_millis(self.response_timeout)
	}
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		ConnectionConfig { response_timeout: 5000, pool_size: 4 }
	}
}

/// Configurable bases and the filter template used when searching for a user
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Searches {
	/// The DN all searches are rooted under
	pub base_dn: String,
	/// The subtree holding user entries, relative to `base_dn`
	pub user_base: String,
	/// Filter template ANDed with the user id clause on every lookup.
	/// Wrapped in parentheses automatically if not already.
	pub user_filter: String,
}

impl Searches {
	/// The effective search base: `user_base` and `base_dn` joined with a
	/// comma when both are present, whichever is present when only one is,
	/// empty when neither.
	#[must_use]
	pub fn search_base(&self) -> String {
		match (is_blank(&self.user_base), is_blank(&self.base_dn)) {
			(true, true) => String::new(),
			(false, true) => self.user_base.clone(),
			(true, false) => self.base_dn.clone(),
			(false, false) => format!("{},{}", self.user_base.trim(), self.base_dn.trim()),
		}
	}

	/// The effective search filter for looking up `user_id`: the filter
	/// template ANDed with a `(CN=<user_id>)` clause when both are present,
	/// whichever is non-blank when only one is, empty when neither. The user
	/// id is escaped for use in a filter.
	#[must_use]
	pub fn search_filter(&self, user_id: &str) -> String {
		let template = self.user_filter.trim();
		let template = if template.is_empty()
			|| (template.starts_with('(') && template.ends_with(')'))
		{
			template.to_owned()
		} else {
			format!("({template})")
		};
		let id_clause = if is_blank(user_id) {
			String::new()
		} else {
			format!("(CN={})", ldap_escape(user_id))
		};

		match (template.is_empty(), id_clause.is_empty()) {
			(true, true) => String::new(),
			(false, true) => template,
			(true, false) => id_clause,
			(false, false) => format!("(&{template}{id_clause})"),
		}
	}
}

/// Names of attributes to use for extracting relevant data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeConfig {
	/// The attribute holding the user's display name
	pub name: String,
	/// The attribute holding the user's email address
	pub email: String,
}

impl AttributeConfig {
	/// Returns the list of attributes the server should include in search
	/// results.
	#[must_use]
	pub fn as_list(&self) -> Vec<String> {
		vec![self.name.clone(), self.email.clone()]
	}
}

impl Default for AttributeConfig {
	fn default() -> Self {
		AttributeConfig { name: "displayName".to_owned(), email: "mail".to_owned() }
	}
}

/// Whether a configuration value is unset for all practical purposes.
fn is_blank(value: &str) -> bool {
	value.trim().is_empty()
}
