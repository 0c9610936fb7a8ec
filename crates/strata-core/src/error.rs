use crate::store::StoreError;
use std::error::Error as StdError;
use thiserror::Error;

/// Boxed error returned by migration steps and custom store backends.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Category of an engine [`Error`], independent of its underlying cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Init,
    Up,
    Down,
    Store,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("store returned an error on init")]
    Init {
        #[source]
        source: StoreError,
    },

    #[error("migration '{id}' up returned an error")]
    Up {
        id: String,
        #[source]
        source: BoxError,
    },

    #[error("migration '{id}' down returned an error")]
    Down {
        id: String,
        #[source]
        source: BoxError,
    },

    #[error("store returned an error{}", for_migration(.id))]
    Store {
        id: Option<String>,
        #[source]
        source: StoreError,
    },
}

fn for_migration(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" for migration '{id}'"),
        None => String::new(),
    }
}

impl Error {
    pub(crate) fn store(id: Option<&str>, source: StoreError) -> Self {
        Error::Store {
            id: id.map(str::to_owned),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Init { .. } => ErrorKind::Init,
            Error::Up { .. } => ErrorKind::Up,
            Error::Down { .. } => ErrorKind::Down,
            Error::Store { .. } => ErrorKind::Store,
        }
    }

    /// Id of the migration that failed, if the failure belongs to one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Error::Init { .. } => None,
            Error::Up { id, .. } | Error::Down { id, .. } => Some(id),
            Error::Store { id, .. } => id.as_deref(),
        }
    }

    /// The store error behind an `Init` or `Store` failure.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Error::Init { source } | Error::Store { source, .. } => Some(source),
            Error::Up { .. } | Error::Down { .. } => None,
        }
    }

    /// Whether an error of type `E` appears anywhere in the cause chain.
    ///
    /// Looks through the transparent [`StoreError`] variants so io, json,
    /// sqlite and custom backend errors are found the same way step errors
    /// are.
    pub fn is_caused_by<E: StdError + 'static>(&self) -> bool {
        let mut next = self.source();
        while let Some(err) = next {
            if err.is::<E>() {
                return true;
            }
            if let Some(inner) = err.downcast_ref::<StoreError>().and_then(StoreError::inner) {
                if inner.is::<E>() {
                    return true;
                }
                next = inner.source();
                continue;
            }
            next = err.source();
        }
        false
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("unittest")]
    struct UnitTest;

    #[derive(Debug, Error)]
    #[error("other")]
    struct Other;

    #[test]
    fn display_names_category_and_id() {
        let err = Error::Up {
            id: "2".into(),
            source: Box::new(UnitTest),
        };
        assert_eq!(err.to_string(), "migration '2' up returned an error");

        let err = Error::store(None, StoreError::NotLocked);
        assert_eq!(err.to_string(), "store returned an error");

        let err = Error::store(Some("a"), StoreError::IdNotFound("a".into()));
        assert_eq!(err.to_string(), "store returned an error for migration 'a'");
    }

    #[test]
    fn source_is_the_wrapped_cause() {
        let err = Error::Init {
            source: StoreError::Backend(Box::new(UnitTest)),
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("unittest"));
    }

    #[test]
    fn kind_and_id_accessors() {
        let err = Error::Down {
            id: "b".into(),
            source: "boom".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Down);
        assert_eq!(err.id(), Some("b"));
        assert!(err.store_error().is_none());

        let err = Error::store(None, StoreError::NotLocked);
        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(err.id(), None);
        assert!(matches!(err.store_error(), Some(StoreError::NotLocked)));
    }

    #[test]
    fn is_caused_by_finds_step_errors() {
        let err = Error::Up {
            id: "1".into(),
            source: Box::new(UnitTest),
        };
        assert!(err.is_caused_by::<UnitTest>());
        assert!(!err.is_caused_by::<Other>());
    }

    #[test]
    fn is_caused_by_looks_through_io_errors() {
        let err = Error::Init {
            source: StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )),
        };
        assert!(err.is_caused_by::<StoreError>());
        assert!(err.is_caused_by::<std::io::Error>());
        assert!(!err.is_caused_by::<serde_json::Error>());
    }

    #[test]
    fn is_caused_by_looks_through_json_errors() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::store(Some("a"), StoreError::Json(json));
        assert!(err.is_caused_by::<serde_json::Error>());
        assert!(!err.is_caused_by::<std::io::Error>());
    }

    #[test]
    fn is_caused_by_looks_through_backend_errors() {
        let err = Error::store(None, StoreError::Backend(Box::new(UnitTest)));
        assert!(err.is_caused_by::<StoreError>());
        assert!(err.is_caused_by::<UnitTest>());
        assert!(!err.is_caused_by::<Other>());
    }
}
