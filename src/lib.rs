//! Optional LDAP-backed user lookup for a load-testing controller's login
//! pipeline.
//!
//! The library works by holding a small fixed-size pool of connections to a
//! directory server and, for every login attempt the host application hands
//! it, performing a single one-level search for the user id. The first
//! matching entry is mapped onto the host's user record (display name and
//! email from configurable attributes, marked enabled, external, and with the
//! basic role). Everything is driven by configuration from the host's
//! property store and can be reloaded at runtime; when directory login is
//! disabled or the server is unreachable, lookups simply report the user as
//! unknown.
//!
//! For a general primer on LDAP, the [introduction] in the `ldap3` crate
//! which is used here for interfacing with LDAP is an excellent resource. The
//! site "firstyear's blog-a-log" also has [a guide][firstyear] which is more
//! visually oriented and goes into more detail about searching
//!
//! [introduction]: https://github.com/inejge/ldap3/blob/master/LDAP-primer.md
//! [firstyear]: https://fy.blackhats.net.au/blog/html/pages/ldap_guide_part_1_foundations.html
//!
//! # Getting started
//! A minimal example of wiring the plugin into a login flow might look like
//! so:
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//!
//! use ldap_login::{
//!     config::{AttributeConfig, Config, ConnectionConfig, Searches},
//!     Directory, LdapLoginPlugin, OnLogin,
//! };
//!
//! // Configuration can also be deserialized with serde. It's hand-constructed
//! // here for demonstration purposes.
//! let config = Config {
//!     enabled: true,
//!     server: "ldap://localhost".to_owned(),
//!     port: 389,
//!     manager_dn: Some("cn=admin,dc=example,dc=com".to_owned()),
//!     manager_password: Some("verysecret".to_owned()),
//!     connection: ConnectionConfig::default(),
//!     searches: Searches {
//!         base_dn: "dc=example,dc=com".to_owned(),
//!         user_base: "ou=people".to_owned(),
//!         user_filter: "objectClass=inetOrgPerson".to_owned(),
//!     },
//!     attributes: AttributeConfig {
//!         name: "displayName".to_owned(),
//!         email: "mail".to_owned(),
//!     },
//! };
//!
//! let directory = Arc::new(Directory::connect(config).await);
//! let plugin = LdapLoginPlugin::new(Arc::clone(&directory));
//!
//! match plugin.load_user("alice").await? {
//!     Some(user) => println!("found {} <{}>", user.name, user.email),
//!     None => println!("alice is not a directory user"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! To pick up configuration changes at runtime, publish snapshots on a
//! [`tokio::sync::watch`] channel and spawn [`Directory::watch`] next to the
//! host's property store.
//!
//! # Limitations
//! * [`OnLogin::validate_user`] is not implemented and always returns
//!   `false`; password checks stay with the host's other authentication
//!   providers. The bind building block ([`Directory::acquire_bound`]) exists
//!   for when that changes.
//! * Lookup results are not cached; every login attempt performs one search.
//! * [secrecy](https://docs.rs/secrecy) is not used for storing the manager
//!   password, it probably should be

pub mod config;
pub mod directory;
pub mod entry;
mod error;
pub mod plugin;
pub mod pool;
pub mod user;

pub use ldap3::{self, SearchEntry};

pub use crate::{
	config::{AttributeConfig, Config, ConnectionConfig, Searches},
	directory::Directory,
	entry::SearchEntryExt,
	error::Error,
	plugin::{LdapLoginPlugin, OnLogin},
	pool::{Bind, Connection, ConnectionManager},
	user::{Role, User, AUTH_PROVIDER},
};
