//! Typed failures raised by the data client.
//!
//! Every failure maps onto one of three kinds: authentication, transport
//! or GraphQL. Auth-kind failures always end the session; the others leave
//! it intact.

use thiserror::Error;

/// Coarse error classification used by views and the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid credentials, missing/expired/rejected token.
    Auth,
    /// Network failure or non-success HTTP status.
    Transport,
    /// The API answered with errors or with data of the wrong shape.
    GraphQl,
}

/// A failed sign-in or query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },
    #[error("GraphQL errors: {0}")]
    GraphQl(String),
    #[error("unable to load module data ({0}); the module may not exist or you may not have access to it")]
    Module(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthenticated | Self::Auth(_) => ErrorKind::Auth,
            Self::Transport(_) | Self::Http { .. } => ErrorKind::Transport,
            Self::GraphQl(_) | Self::Module(_) | Self::Decode(_) => ErrorKind::GraphQl,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}
