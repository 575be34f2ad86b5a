use thiserror::Error;

use crate::{
    domain::events::DeliveryError,
    usecases::{list_conversations::ListConversationsSourceError, load_messages::MessagesSourceError},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server responded with HTTP {status}")]
    Status { status: u16 },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }

    fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<ApiError> for ListConversationsSourceError {
    fn from(error: ApiError) -> Self {
        match error {
            error if error.is_unauthorized() => Self::Unauthorized,
            ApiError::Status { status } => Self::RequestFailed { status },
            ApiError::Transport(_) | ApiError::InvalidUrl(_) => Self::Unavailable,
            ApiError::Decode(_) => Self::InvalidData,
        }
    }
}

impl From<ApiError> for MessagesSourceError {
    fn from(error: ApiError) -> Self {
        match error {
            error if error.is_unauthorized() => Self::Unauthorized,
            error if error.is_not_found() => Self::ConversationNotFound,
            ApiError::Status { status } => Self::RequestFailed { status },
            ApiError::Transport(_) | ApiError::InvalidUrl(_) => Self::Unavailable,
            ApiError::Decode(_) => Self::InvalidData,
        }
    }
}

impl From<ApiError> for DeliveryError {
    fn from(error: ApiError) -> Self {
        match error {
            error if error.is_unauthorized() => Self::Unauthorized,
            error if error.is_not_found() => Self::RecipientNotFound,
            ApiError::Status { status } => Self::Rejected { status },
            ApiError::Transport(_) | ApiError::InvalidUrl(_) => Self::Unavailable,
            ApiError::Decode(_) => Self::InvalidData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_map_to_unauthorized_everywhere() {
        for status in [401, 403] {
            assert_eq!(
                ListConversationsSourceError::from(ApiError::Status { status }),
                ListConversationsSourceError::Unauthorized
            );
            assert_eq!(
                MessagesSourceError::from(ApiError::Status { status }),
                MessagesSourceError::Unauthorized
            );
            assert_eq!(
                DeliveryError::from(ApiError::Status { status }),
                DeliveryError::Unauthorized
            );
        }
    }

    #[test]
    fn not_found_depends_on_operation() {
        assert_eq!(
            ListConversationsSourceError::from(ApiError::Status { status: 404 }),
            ListConversationsSourceError::RequestFailed { status: 404 }
        );
        assert_eq!(
            MessagesSourceError::from(ApiError::Status { status: 404 }),
            MessagesSourceError::ConversationNotFound
        );
        assert_eq!(
            DeliveryError::from(ApiError::Status { status: 404 }),
            DeliveryError::RecipientNotFound
        );
    }

    #[test]
    fn decode_errors_are_invalid_data() {
        assert_eq!(
            MessagesSourceError::from(ApiError::Decode("missing field".to_owned())),
            MessagesSourceError::InvalidData
        );
        assert_eq!(
            DeliveryError::from(ApiError::Status { status: 500 }),
            DeliveryError::Rejected { status: 500 }
        );
    }
}
