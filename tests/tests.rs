#![allow(
	clippy::dbg_macro,
	clippy::expect_used,
	clippy::missing_docs_in_private_items,
	clippy::print_stderr,
	clippy::print_stdout,
	clippy::unwrap_used
)]
use std::{error::Error, sync::Arc};

use ldap_login::{
	config::{AttributeConfig, Config, ConnectionConfig, Searches},
	Directory, LdapLoginPlugin, OnLogin,
};
use serial_test::serial;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

mod common;

use common::{
	ldap_add_login_user, ldap_add_organizational_unit, ldap_connect,
	ldap_delete_organizational_unit, ldap_delete_user, ldap_user_add_attribute,
};

#[must_use]
pub fn test_config() -> Config {
	Config {
		enabled: true,
		server: "ldap://localhost".to_owned(),
		port: 1389,
		manager_dn: Some("cn=admin,dc=example,dc=org".to_owned()),
		manager_password: Some("adminpassword".to_owned()),
		connection: ConnectionConfig::default(),
		searches: Searches {
			base_dn: "dc=example,dc=org".to_owned(),
			user_base: "ou=users".to_owned(),
			user_filter: "objectClass=inetOrgPerson".to_owned(),
		},
		attributes: AttributeConfig::default(),
	}
}

pub async fn setup_plugin(config: Config) -> (Arc<Directory>, LdapLoginPlugin) {
	let directory = Arc::new(Directory::connect(config).await);
	let plugin = LdapLoginPlugin::new(Arc::clone(&directory));
	(directory, plugin)
}

#[tokio::test]
async fn unreachable_server_degrades_to_user_not_found() -> Result<(), Box<dyn Error>> {
	// Nothing listens on port 1; establishing the pool fails, is logged, and
	// every lookup afterwards reports the user as unknown instead of erroring.
	let mut config = test_config();
	config.server = "127.0.0.1".to_owned();
	config.port = 1;
	config.connection.response_timeout = 1000;

	let (_directory, plugin) = setup_plugin(config).await;
	assert!(plugin.load_user("alice").await?.is_none());

	Ok(())
}

#[ignore = "docker"]
#[tokio::test]
#[serial]
async fn ldap_load_user_test() -> Result<(), Box<dyn Error>> {
	let tracing_filter = EnvFilter::default().add_directive(LevelFilter::DEBUG.into());
	tracing_subscriber::fmt().with_env_filter(tracing_filter).init();

	let mut ldap = ldap_connect().await?;
	let _ = ldap_delete_organizational_unit(&mut ldap, "users").await;

	ldap_add_organizational_unit(&mut ldap, "users").await?;
	ldap_add_login_user(&mut ldap, "user01", "MyName1", "user01@example.org", "secret1").await?;

	let (_directory, plugin) = setup_plugin(test_config()).await;

	let user = plugin.load_user("user01").await?.expect("user01 should be found");
	assert_eq!(user.id, "user01");
	assert_eq!(user.name, "MyName1");
	assert_eq!(user.email, "user01@example.org");
	assert!(user.enabled);
	assert!(user.external);
	assert_eq!(user.role, ldap_login::Role::User);
	assert_eq!(user.auth_provider, ldap_login::AUTH_PROVIDER);

	assert!(plugin.load_user("nosuchuser").await?.is_none());

	ldap_delete_user(&mut ldap, "user01").await?;
	ldap_delete_organizational_unit(&mut ldap, "users").await?;
	ldap.unbind().await?;

	Ok(())
}

#[ignore = "docker"]
#[tokio::test]
#[serial]
async fn ldap_missing_attribute_test() -> Result<(), Box<dyn Error>> {
	let mut ldap = ldap_connect().await?;
	let _ = ldap_delete_organizational_unit(&mut ldap, "users").await;

	// user02 has a display name but no mail attribute; finding it must fail
	// the lookup instead of reporting the user as unknown.
	ldap_add_organizational_unit(&mut ldap, "users").await?;
	common::ldap_add_user(&mut ldap, "user02", "MyName2").await?;
	ldap_user_add_attribute(&mut ldap, "user02", "displayName", "MyName2").await?;

	let (_directory, plugin) = setup_plugin(test_config()).await;

	assert!(matches!(
		plugin.load_user("user02").await,
		Err(ldap_login::Error::MissingAttribute(attr)) if attr == "mail"
	));

	ldap_delete_user(&mut ldap, "user02").await?;
	ldap_delete_organizational_unit(&mut ldap, "users").await?;
	ldap.unbind().await?;

	Ok(())
}

#[ignore = "docker"]
#[tokio::test]
#[serial]
async fn ldap_reload_test() -> Result<(), Box<dyn Error>> {
	let mut ldap = ldap_connect().await?;
	let _ = ldap_delete_organizational_unit(&mut ldap, "users").await;

	ldap_add_organizational_unit(&mut ldap, "users").await?;
	ldap_add_login_user(&mut ldap, "user01", "MyName1", "user01@example.org", "secret1").await?;

	// Starts disabled, then a configuration change turns directory login on.
	let (directory, plugin) = setup_plugin(Config::default()).await;
	assert!(plugin.load_user("user01").await?.is_none());

	directory.reload(test_config()).await;
	assert!(plugin.load_user("user01").await?.is_some());

	ldap_delete_user(&mut ldap, "user01").await?;
	ldap_delete_organizational_unit(&mut ldap, "users").await?;
	ldap.unbind().await?;

	Ok(())
}

#[ignore = "docker"]
#[tokio::test]
#[serial]
async fn ldap_bound_connection_test() -> Result<(), Box<dyn Error>> {
	let mut ldap = ldap_connect().await?;
	let _ = ldap_delete_organizational_unit(&mut ldap, "users").await;

	ldap_add_organizational_unit(&mut ldap, "users").await?;
	ldap_add_login_user(&mut ldap, "user01", "MyName1", "user01@example.org", "secret1").await?;

	let (directory, _plugin) = setup_plugin(test_config()).await;
	let user_dn = "cn=user01,ou=users,dc=example,dc=org";

	assert!(directory.acquire_bound(user_dn, "secret1").await.is_ok());
	assert!(directory.acquire_bound(user_dn, "wrongpassword").await.is_err());

	ldap_delete_user(&mut ldap, "user01").await?;
	ldap_delete_organizational_unit(&mut ldap, "users").await?;
	ldap.unbind().await?;

	Ok(())
}
