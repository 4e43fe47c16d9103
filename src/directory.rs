//! Connection management for the directory server.
use deadpool::{managed::Pool, Runtime};
use ldap3::LdapConnSettings;
use tokio::sync::{watch, RwLock};
use tracing::{error, info};

use crate::{
	config::Config,
	error::Error,
	pool::{Connection, ConnectionManager},
};

/// The configuration currently in force and, when directory login is up, the
/// connection pool built from it. Swapped as a unit on reload.
struct State {
	/// The configuration the pool was built from.
	config: Config,
	/// Pool of connections to the directory server. Absent while directory
	/// login is disabled, unconfigured, or the server was unreachable at the
	/// last (re)initialization.
	pool: Option<Pool<ConnectionManager>>,
}

/// Owns the connections to the directory server and the configuration they
/// were opened with.
///
/// Reinitialization swaps configuration and pool together under the write
/// lock; lookups take the read lock only long enough to clone the pool handle
/// and then acquire a connection outside it, so in-flight lookups drain on
/// the previous pool while a reload is under way.
pub struct Directory {
	/// Current configuration and pool.
	state: RwLock<State>,
}

impl Directory {
	/// Creates a manager holding `config` without touching the network.
	#[must_use]
	pub fn new(config: Config) -> Self {
		Self { state: RwLock::new(State { config, pool: None }) }
	}

	/// Creates a manager and immediately opens the connection pool.
	///
	/// Connection failures are logged and leave directory login inactive
	/// until the next [`reload`](Self::reload); they never fail the host
	/// application, since directory login is an optional feature.
	pub async fn connect(config: Config) -> Self {
		let directory = Self::new(config);
		directory.initialize().await;
		directory
	}

	/// (Re)opens the connection pool from the currently held configuration,
	/// replacing any previous pool.
	pub async fn initialize(&self) {
		let config = self.state.read().await.config.clone();
		let pool = open_pool(&config).await;
		self.state.write().await.pool = pool;
	}

	/// Replaces the configuration and rebuilds the connection pool from it.
	pub async fn reload(&self, config: Config) {
		let pool = open_pool(&config).await;
		let mut state = self.state.write().await;
		state.config = config;
		state.pool = pool;
	}

	/// Reinitializes whenever the host application publishes a new
	/// configuration snapshot. Intended to be spawned next to the host's
	/// property store; returns once the sender side is dropped.
	pub async fn watch(&self, mut updates: watch::Receiver<Config>) {
		while updates.changed().await.is_ok() {
			let config = updates.borrow_and_update().clone();
			info!("directory configuration changed, reconnecting");
			self.reload(config).await;
		}
	}

	/// Whether directory login is enabled in the configuration.
	pub async fn is_enabled(&self) -> bool {
		self.state.read().await.config.enabled
	}

	/// A snapshot of the configuration currently in force.
	pub async fn config(&self) -> Config {
		self.state.read().await.config.clone()
	}

	/// Acquires a pooled connection, waiting at most the configured response
	/// timeout for one to become free. The connection returns to the pool
	/// when the handle is dropped, also on error paths.
	///
	/// # Errors
	/// [`Error::NotConnected`] when no pool is established, [`Error::Pool`]
	/// when the pool cannot produce a connection.
	pub async fn acquire(&self) -> Result<Connection, Error> {
		let pool = self.state.read().await.pool.clone().ok_or(Error::NotConnected)?;
		Ok(pool.get().await?)
	}

	/// Acquires a pooled connection and re-binds it with the supplied user
	/// credentials. The session keeps that bind state until it is recycled.
	///
	/// # Errors
	/// Everything [`acquire`](Self::acquire) returns, plus
	/// [`Error::Ldap`] when the bind is rejected.
	pub async fn acquire_bound(&self, user_dn: &str, password: &str) -> Result<Connection, Error> {
		let mut conn = self.acquire().await?;
		conn.simple_bind(user_dn, password).await?.success()?;
		Ok(conn)
	}
}

impl std::fmt::Debug for Directory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Directory").finish_non_exhaustive()
	}
}

/// Builds and verifies a connection pool, or returns `None` (with the reason
/// logged) when directory login cannot be brought up.
async fn open_pool(config: &Config) -> Option<Pool<ConnectionManager>> {
	if !config.enabled {
		info!("directory login is disabled");
		return None;
	}
	let Some(url) = config.server_url() else {
		info!("directory server is not specified, directory login is disabled");
		return None;
	};

	let settings = LdapConnSettings::new().set_conn_timeout(config.connection.timeout());
	let manager = ConnectionManager::new(url, settings, config.bind());
	let pool = match Pool::builder(manager)
		.runtime(Runtime::Tokio1)
		.max_size(config.connection.pool_size)
		.create_timeout(Some(config.connection.timeout()))
		.wait_timeout(Some(config.connection.timeout()))
		.build()
	{
		Ok(pool) => pool,
		Err(err) => {
			error!("cannot build the directory connection pool: {err}");
			return None;
		}
	};

	// Open one connection up front so that a bad address or rejected manager
	// credentials surface at (re)initialization rather than on first login.
	match pool.get().await {
		Ok(_conn) => {
			info!("directory login is enabled");
			Some(pool)
		}
		Err(err) => {
			error!("cannot connect to the directory server: {err}");
			None
		}
	}
}
