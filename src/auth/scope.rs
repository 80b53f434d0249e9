//! Ordered, duplicate-free scope collections.

// std
use std::{
	collections::HashSet,
	hash::{Hash, Hasher},
	sync::OnceLock,
};
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Errors emitted when validating scope entries.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeError {
	/// Empty or whitespace-only scope entries are not allowed.
	#[error("Scope entry at position {index} is empty.")]
	Empty {
		/// Position of the offending entry in the supplied sequence.
		index: usize,
	},
	/// Scopes are space-delimited downstream, so embedded whitespace is rejected.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
	/// The same scope appeared more than once.
	#[error("Scope appears more than once: {scope}.")]
	Duplicate {
		/// The repeated scope string.
		scope: String,
	},
}

/// Insertion-ordered set of OAuth scopes.
///
/// Unlike a sorted set, the order callers supply is the order the broker receives, which
/// matters for consent prompts. Entries are never deduplicated or trimmed silently;
/// [`OrderedScopeSet::new`] rejects anything that would need correcting. The
/// [`fingerprint`](Self::fingerprint) is order-sensitive and cached after first use.
pub struct OrderedScopeSet {
	scopes: Arc<[String]>,
	fingerprint_cache: OnceLock<String>,
}
impl OrderedScopeSet {
	/// Creates an ordered scope set, rejecting empty, padded, or repeated entries.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let scopes = scopes.into_iter().map(Into::into).collect::<Vec<String>>();

		check_entries(&scopes)?;

		if let Some(scope) = first_duplicate(&scopes) {
			return Err(ScopeError::Duplicate { scope: scope.to_owned() });
		}

		Ok(Self::from_checked(scopes))
	}

	/// Wraps entries that already passed [`check_entries`] and [`first_duplicate`].
	pub(crate) fn from_checked(scopes: Vec<String>) -> Self {
		Self { scopes: Arc::from(scopes), fingerprint_cache: OnceLock::new() }
	}

	/// Number of scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.iter().any(|candidate| candidate == scope)
	}

	/// Iterator over scopes in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}

	/// Space-delimited representation, in insertion order.
	pub fn joined(&self) -> String {
		self.scopes.join(" ")
	}

	/// Stable, order-sensitive fingerprint (base64 without padding of a SHA-256 digest).
	pub fn fingerprint(&self) -> String {
		self.fingerprint_cache.get_or_init(|| compute_fingerprint(&self.scopes)).clone()
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.scopes
	}
}
impl Clone for OrderedScopeSet {
	fn clone(&self) -> Self {
		Self { scopes: self.scopes.clone(), fingerprint_cache: OnceLock::new() }
	}
}
impl PartialEq for OrderedScopeSet {
	fn eq(&self, other: &Self) -> bool {
		self.scopes == other.scopes
	}
}
impl Eq for OrderedScopeSet {}
impl Hash for OrderedScopeSet {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.fingerprint_cache.get_or_init(|| compute_fingerprint(&self.scopes)).hash(state);
	}
}
impl Debug for OrderedScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("OrderedScopeSet").field(&self.scopes).finish()
	}
}
impl Display for OrderedScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.joined())
	}
}

/// Rejects empty, whitespace-only, and whitespace-containing entries.
pub(crate) fn check_entries(scopes: &[String]) -> Result<(), ScopeError> {
	for (index, scope) in scopes.iter().enumerate() {
		if scope.trim().is_empty() {
			return Err(ScopeError::Empty { index });
		}
		if scope.chars().any(char::is_whitespace) {
			return Err(ScopeError::ContainsWhitespace { scope: scope.to_owned() });
		}
	}

	Ok(())
}

/// Returns the first entry that repeats an earlier one.
pub(crate) fn first_duplicate(scopes: &[String]) -> Option<&str> {
	let mut seen = HashSet::with_capacity(scopes.len());

	scopes.iter().find(|scope| !seen.insert(scope.as_str())).map(|scope| scope.as_str())
}

fn compute_fingerprint(scopes: &[String]) -> String {
	let joined = scopes.join(" ");
	let mut hasher = Sha256::new();

	hasher.update(joined.as_bytes());

	let digest = hasher.finalize();

	STANDARD_NO_PAD.encode(digest)
}
