use crate::domain::{
    conversation::{ConversationFilters, ConversationSummary},
    pagination::Pagination,
};

pub const DEFAULT_CONVERSATION_PAGE_SIZE: u32 = 20;
const MAX_CONVERSATION_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConversationsQuery {
    pub filters: ConversationFilters,
    pub page: u32,
    pub limit: u32,
}

impl Default for ListConversationsQuery {
    fn default() -> Self {
        Self {
            filters: ConversationFilters::default(),
            page: 1,
            limit: DEFAULT_CONVERSATION_PAGE_SIZE,
        }
    }
}

impl ListConversationsQuery {
    fn normalized_limit(&self) -> u32 {
        match self.limit {
            0 => DEFAULT_CONVERSATION_PAGE_SIZE,
            value if value > MAX_CONVERSATION_PAGE_SIZE => MAX_CONVERSATION_PAGE_SIZE,
            value => value,
        }
    }

    fn normalized_page(&self) -> u32 {
        self.page.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPage {
    pub conversations: Vec<ConversationSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListConversationsSourceError {
    Unauthorized,
    Unavailable,
    RequestFailed { status: u16 },
    InvalidData,
}

pub trait ConversationsSource {
    fn list_conversations(
        &self,
        filters: &ConversationFilters,
        page: u32,
        limit: u32,
    ) -> Result<ConversationPage, ListConversationsSourceError>;
}

impl<T> ConversationsSource for &T
where
    T: ConversationsSource + ?Sized,
{
    fn list_conversations(
        &self,
        filters: &ConversationFilters,
        page: u32,
        limit: u32,
    ) -> Result<ConversationPage, ListConversationsSourceError> {
        (*self).list_conversations(filters, page, limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListConversationsError {
    Unauthorized,
    TemporarilyUnavailable,
    RequestFailed { status: u16 },
    DataContractViolation,
}

impl ListConversationsError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Session expired. Update the session token and restart.".to_owned(),
            Self::TemporarilyUnavailable => {
                "Could not reach the server. Press r to retry.".to_owned()
            }
            Self::RequestFailed { status } => {
                format!("Loading conversations failed (HTTP {status}).")
            }
            Self::DataContractViolation => "Server sent an unexpected conversation list.".to_owned(),
        }
    }
}

pub fn list_conversations(
    source: &dyn ConversationsSource,
    query: ListConversationsQuery,
) -> Result<ConversationPage, ListConversationsError> {
    let limit = query.normalized_limit();
    let page = query.normalized_page();

    source
        .list_conversations(&query.filters, page, limit)
        .map_err(map_source_error)
}

fn map_source_error(error: ListConversationsSourceError) -> ListConversationsError {
    match error {
        ListConversationsSourceError::Unauthorized => ListConversationsError::Unauthorized,
        ListConversationsSourceError::Unavailable => ListConversationsError::TemporarilyUnavailable,
        ListConversationsSourceError::RequestFailed { status } => {
            ListConversationsError::RequestFailed { status }
        }
        ListConversationsSourceError::InvalidData => ListConversationsError::DataContractViolation,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct StubSource {
        result: Result<ConversationPage, ListConversationsSourceError>,
        captured: Mutex<Option<(ConversationFilters, u32, u32)>>,
    }

    impl StubSource {
        fn with_result(result: Result<ConversationPage, ListConversationsSourceError>) -> Self {
            Self {
                result,
                captured: Mutex::new(None),
            }
        }

        fn captured(&self) -> Option<(ConversationFilters, u32, u32)> {
            self.captured.lock().expect("capture lock").clone()
        }
    }

    impl ConversationsSource for StubSource {
        fn list_conversations(
            &self,
            filters: &ConversationFilters,
            page: u32,
            limit: u32,
        ) -> Result<ConversationPage, ListConversationsSourceError> {
            *self.captured.lock().expect("capture lock") = Some((filters.clone(), page, limit));
            self.result.clone()
        }
    }

    fn sample_page() -> ConversationPage {
        ConversationPage {
            conversations: vec![ConversationSummary {
                partner_id: "u1".to_owned(),
                partner_name: "Maria".to_owned(),
                partner_avatar_url: None,
                last_message_preview: Some("hi".to_owned()),
                last_message_unix_ms: Some(1_700_000_000_000),
                last_message_label: Some("2 minutes ago".to_owned()),
                unread_count: 2,
                created_at_unix_ms: None,
            }],
            pagination: Pagination::single(1),
        }
    }

    #[test]
    fn uses_default_limit_when_query_limit_is_zero() {
        let source = StubSource::with_result(Ok(sample_page()));

        list_conversations(
            &source,
            ListConversationsQuery {
                limit: 0,
                ..ListConversationsQuery::default()
            },
        )
        .expect("list should succeed");

        assert_eq!(source.captured().map(|(_, _, limit)| limit), Some(20));
    }

    #[test]
    fn caps_limit_to_maximum_boundary() {
        let source = StubSource::with_result(Ok(sample_page()));

        list_conversations(
            &source,
            ListConversationsQuery {
                limit: 999,
                ..ListConversationsQuery::default()
            },
        )
        .expect("list should succeed");

        assert_eq!(source.captured().map(|(_, _, limit)| limit), Some(100));
    }

    #[test]
    fn page_zero_is_sent_as_first_page() {
        let source = StubSource::with_result(Ok(sample_page()));

        list_conversations(
            &source,
            ListConversationsQuery {
                page: 0,
                ..ListConversationsQuery::default()
            },
        )
        .expect("list should succeed");

        assert_eq!(source.captured().map(|(_, page, _)| page), Some(1));
    }

    #[test]
    fn forwards_filters_untouched() {
        let source = StubSource::with_result(Ok(sample_page()));
        let filters = ConversationFilters {
            search: "nanny".to_owned(),
            unread_only: true,
        };

        list_conversations(
            &source,
            ListConversationsQuery {
                filters: filters.clone(),
                ..ListConversationsQuery::default()
            },
        )
        .expect("list should succeed");

        assert_eq!(source.captured().map(|(f, _, _)| f), Some(filters));
    }

    #[test]
    fn keeps_source_payload_without_mutation() {
        let source = StubSource::with_result(Ok(sample_page()));

        let page = list_conversations(&source, ListConversationsQuery::default())
            .expect("list should succeed");

        assert_eq!(page, sample_page());
    }

    #[test]
    fn maps_source_errors() {
        let cases = [
            (
                ListConversationsSourceError::Unauthorized,
                ListConversationsError::Unauthorized,
            ),
            (
                ListConversationsSourceError::Unavailable,
                ListConversationsError::TemporarilyUnavailable,
            ),
            (
                ListConversationsSourceError::RequestFailed { status: 500 },
                ListConversationsError::RequestFailed { status: 500 },
            ),
            (
                ListConversationsSourceError::InvalidData,
                ListConversationsError::DataContractViolation,
            ),
        ];

        for (source_error, expected) in cases {
            let source = StubSource::with_result(Err(source_error));
            let err = list_conversations(&source, ListConversationsQuery::default())
                .expect_err("must fail");
            assert_eq!(err, expected);
        }
    }

    #[test]
    fn request_failure_message_names_status() {
        let message = ListConversationsError::RequestFailed { status: 502 }.user_message();

        assert!(message.contains("502"));
    }
}
