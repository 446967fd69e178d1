use super::{ChunkIndex, PlanetId};
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that can come out of the chunk cache, the durable store, or a remote.
/// Out-of-range chunk queries are not errors; they resolve to [`Lookup::OutOfBounds`](super::Lookup).
#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("remote {0} request timed out after {1:?}")]
	Timeout(&'static str, Duration),
	#[error("remote reported a failure: {0}")]
	Remote(String),
	#[error("durable store i/o failed: {0}")]
	Io(#[from] std::io::Error),
	#[error("corrupt {what}: {reason}")]
	Corrupt { what: String, reason: String },
	#[error("failed to encode {what}: {reason}")]
	Encode { what: String, reason: String },
	#[error("unknown planet id({0})")]
	UnknownPlanet(PlanetId),
	#[error("chunk {0} is outside of the planet's bounds")]
	OutOfBounds(ChunkIndex),
	#[error("in-flight load of chunk {0} failed on another caller")]
	Abandoned(ChunkIndex),
}

impl Error {
	pub(crate) fn corrupt(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
		Self::Corrupt {
			what: what.into(),
			reason: reason.to_string(),
		}
	}

	pub(crate) fn encode(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
		Self::Encode {
			what: what.into(),
			reason: reason.to_string(),
		}
	}

	/// True for failures which may succeed if the same request is issued again later.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Timeout(..) | Self::Remote(_) | Self::Io(_) | Self::Abandoned(_) => true,
			Self::Corrupt { .. }
			| Self::Encode { .. }
			| Self::UnknownPlanet(_)
			| Self::OutOfBounds(_) => false,
		}
	}
}

#[cfg(test)]
mod error {
	use super::*;

	#[test]
	fn transient_kinds() {
		let timeout = Error::Timeout("GetChunk", Duration::from_secs(1));
		assert!(timeout.is_transient());
		assert!(Error::from(std::io::Error::from(std::io::ErrorKind::NotFound)).is_transient());
		assert!(!Error::corrupt("chunk", "truncated").is_transient());
		assert!(!Error::UnknownPlanet(4).is_transient());
	}

	#[test]
	fn display_names_kind() {
		let err = Error::corrupt("planet spec 3", "expected value");
		assert_eq!(err.to_string(), "corrupt planet spec 3: expected value");
	}
}
