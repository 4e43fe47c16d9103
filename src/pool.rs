//! Pooled connections to the directory server.
use async_trait::async_trait;
use deadpool::managed;
use ldap3::{exop::WhoAmI, Ldap, LdapConnAsync, LdapConnSettings, LdapError};
use tracing::warn;
use url::Url;

/// A pooled connection to the directory server. Dereferences to
/// [`ldap3::Ldap`]; dropping it returns the session to the pool.
pub type Connection = managed::Object<ConnectionManager>;

/// Credentials used to bind a connection.
#[derive(Clone, Debug)]
pub struct Bind {
	/// The DN to bind as.
	pub(crate) dn: String,
	/// The password belonging to `dn`.
	pub(crate) password: String,
}

impl Bind {
	/// Creates a credential pair.
	#[must_use]
	pub fn new(dn: String, password: String) -> Self {
		Self { dn, password }
	}
}

/// Opens connections for the pool: connect, drive the session in a background
/// task, and bind with the manager credentials when configured.
pub struct ConnectionManager {
	/// URL of the directory server.
	url: Url,
	/// Connection settings applied to every opened connection.
	settings: LdapConnSettings,
	/// Manager credentials. Connections stay unauthenticated when `None`.
	bind: Option<Bind>,
}

impl ConnectionManager {
	/// Creates a manager opening connections to `url`.
	#[must_use]
	pub fn new(url: Url, settings: LdapConnSettings, bind: Option<Bind>) -> Self {
		Self { url, settings, bind }
	}
}

impl std::fmt::Debug for ConnectionManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConnectionManager").field("url", &self.url).finish_non_exhaustive()
	}
}

#[async_trait]
impl managed::Manager for ConnectionManager {
	type Type = Ldap;
	type Error = LdapError;

	async fn create(&self) -> Result<Ldap, LdapError> {
		let (conn, mut ldap) =
			LdapConnAsync::from_url_with_settings(self.settings.clone(), &self.url).await?;
		tokio::spawn(async move {
			if let Err(err) = conn.drive().await {
				warn!("Ldap connection error {err}");
			}
		});

		if let Some(bind) = &self.bind {
			ldap.simple_bind(&bind.dn, &bind.password).await?.success()?;
		}

		Ok(ldap)
	}

	async fn recycle(
		&self,
		conn: &mut Ldap,
		_: &managed::Metrics,
	) -> managed::RecycleResult<LdapError> {
		conn.extended(WhoAmI).await.map(|_| ()).map_err(managed::RecycleError::Backend)
	}
}
