//! Helper methods for extracting data from search results.
use ldap3::SearchEntry;

use crate::error::Error;

/// An extension trait for [`SearchEntry`] that provides convenience methods for
/// extracting data.
pub trait SearchEntryExt {
	/// Get the first value of an attribute. Will return `None` if the
	/// attribute is absent or its value is not valid UTF-8.
	fn attr_first(&self, attr: &str) -> Option<&str>;

	/// Get the first value of an attribute, or [`Error::MissingAttribute`]
	/// when the entry carries no such value.
	fn require_attr(&self, attr: &str) -> Result<&str, Error> {
		self.attr_first(attr).ok_or_else(|| Error::MissingAttribute(attr.to_owned()))
	}
}

impl SearchEntryExt for SearchEntry {
	fn attr_first(&self, attr: &str) -> Option<&str> {
		let attr = self.attrs.get(attr)?;
		attr.first().map(String::as_str)
	}
}
