use qs_core::ServerId;
use thiserror::Error;

use crate::ClientRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The server already holds a client.  Carries the rejected client so the
    /// caller can requeue it.
    #[error("server {0} is busy and cannot accept client {id}", id = .1.id)]
    ServerBusy(ServerId, Box<ClientRecord>),
}

impl ServiceError {
    /// Recover the client that could not be placed.
    pub fn into_client(self) -> ClientRecord {
        match self {
            ServiceError::ServerBusy(_, client) => *client,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
