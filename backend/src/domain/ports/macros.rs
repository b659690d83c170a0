//! Error enums shared by the storage ports.
//!
//! Every port fails the same two ways: the store is unreachable, or a query
//! against it failed. The macro stamps out that enum, its constructors and
//! its mapping onto [`crate::domain::Error`] so the three ports stay in step.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident for $subject:literal
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            /// The backing store could not be reached.
            #[error("{subject} connection failed: {message}", subject = $subject)]
            Connection { message: String },
            /// A query or mutation failed during execution.
            #[error("{subject} query failed: {message}", subject = $subject)]
            Query { message: String },
        }

        impl $name {
            pub fn connection(message: impl Into<String>) -> Self {
                Self::Connection {
                    message: message.into(),
                }
            }

            pub fn query(message: impl Into<String>) -> Self {
                Self::Query {
                    message: message.into(),
                }
            }
        }

        impl From<$name> for $crate::domain::Error {
            fn from(error: $name) -> Self {
                match error {
                    $name::Connection { message } => {
                        Self::service_unavailable(format!("{} unavailable: {message}", $subject))
                    }
                    $name::Query { message } => {
                        Self::internal(format!("{} error: {message}", $subject))
                    }
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use crate::domain::{Error, ErrorCode};

    define_port_error! {
        pub enum ExamplePortError for "example store"
    }

    #[test]
    fn constructors_accept_str() {
        let err = ExamplePortError::connection("timeout");
        assert_eq!(err.to_string(), "example store connection failed: timeout");
        assert_eq!(
            ExamplePortError::query("bad row").to_string(),
            "example store query failed: bad row"
        );
    }

    #[test]
    fn unreachable_store_is_service_unavailable() {
        let err: Error = ExamplePortError::connection("refused").into();
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(err.message(), "example store unavailable: refused");
    }

    #[test]
    fn failed_query_is_internal() {
        let err: Error = ExamplePortError::query("poisoned").into();
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.message(), "example store error: poisoned");
    }
}
