//! Error codes

/// Errors that can occur when using this library
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// A found directory entry did not carry an attribute the mapping
	/// configuration requires. Indicates a misconfigured attribute key
	/// rather than an unknown user.
	#[error("entry has no value for attribute `{0}`")]
	MissingAttribute(String),
	/// Directory login is disabled or no connection pool has been
	/// established.
	#[error("not connected to a directory server")]
	NotConnected,
	/// The connection pool could not produce a connection.
	#[error(transparent)]
	Pool(#[from] deadpool::managed::PoolError<ldap3::LdapError>),
	/// An underlying protocol error or similar occurred, or the LDAP library
	/// was used incorrectly.
	#[error(transparent)]
	Ldap(#[from] ldap3::LdapError),
}
