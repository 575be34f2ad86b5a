//! Wire shapes of the REST and event-stream payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    api::error::ApiError,
    domain::{
        conversation::{ConversationSummary, Partner},
        message::{Message, MessageSender},
        pagination::Pagination,
    },
    usecases::{list_conversations::ConversationPage, load_messages::ThreadPage},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    is_current_user: Option<bool>,
}

impl UserDto {
    fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.id.clone())
    }

    fn into_partner(self) -> Partner {
        Partner {
            name: self.display_name(),
            id: self.id,
            avatar_url: self.avatar,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct PaginationDto {
    total: u64,
    page: u32,
    limit: u32,
    pages: u32,
}

impl From<PaginationDto> for Pagination {
    fn from(dto: PaginationDto) -> Self {
        Self {
            total: dto.total,
            page: dto.page,
            limit: dto.limit,
            pages: dto.pages,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationDto {
    partner_id: String,
    #[serde(default)]
    partner: Option<UserDto>,
    #[serde(default)]
    partner_name: Option<String>,
    #[serde(default)]
    partner_avatar: Option<String>,
    #[serde(default)]
    last_message: Option<String>,
    #[serde(default)]
    last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_message_time: Option<String>,
    #[serde(default)]
    unread_count: u32,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<ConversationDto> for ConversationSummary {
    fn from(dto: ConversationDto) -> Self {
        let nested_name = dto.partner.as_ref().map(UserDto::display_name);
        let nested_avatar = dto.partner.and_then(|partner| partner.avatar);

        Self {
            partner_name: nested_name
                .or(dto.partner_name)
                .unwrap_or_else(|| dto.partner_id.clone()),
            partner_id: dto.partner_id,
            partner_avatar_url: nested_avatar.or(dto.partner_avatar),
            last_message_preview: dto.last_message,
            last_message_unix_ms: dto.last_message_at.map(|at| at.timestamp_millis()),
            last_message_label: dto.last_message_time,
            unread_count: dto.unread_count,
            created_at_unix_ms: dto.created_at.map(|at| at.timestamp_millis()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConversationListDto {
    conversations: Vec<ConversationDto>,
    #[serde(default)]
    pagination: Option<PaginationDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageDto {
    id: String,
    content: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    read: bool,
    sender: UserDto,
    #[serde(default)]
    receiver_id: Option<String>,
    #[serde(default)]
    is_current_user: Option<bool>,
}

impl MessageDto {
    fn into_message(self, session_user_id: Option<&str>) -> Message {
        let is_current_user = self
            .is_current_user
            .or(self.sender.is_current_user)
            .unwrap_or_else(|| session_user_id == Some(self.sender.id.as_str()));

        Message {
            id: self.id,
            content: self.content,
            created_at_ms: self.created_at.timestamp_millis(),
            read: self.read,
            sender: MessageSender {
                name: self.sender.display_name(),
                id: self.sender.id,
                avatar_url: self.sender.avatar,
                is_current_user,
            },
            receiver_id: self.receiver_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThreadDto {
    messages: Vec<MessageDto>,
    #[serde(default)]
    partner: Option<UserDto>,
    #[serde(default)]
    pagination: Option<PaginationDto>,
}

/// Stream and send responses carry the message either bare or as `{message}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageEnvelope {
    Wrapped { message: MessageDto },
    Bare(MessageDto),
}

impl MessageEnvelope {
    fn into_inner(self) -> MessageDto {
        match self {
            Self::Wrapped { message } | Self::Bare(message) => message,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest<'a> {
    pub receiver_id: &'a str,
    pub content: &'a str,
}

fn parse<'de, T: Deserialize<'de>>(body: &'de [u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|error| ApiError::Decode(error.to_string()))
}

pub fn decode_conversation_page(body: &[u8]) -> Result<ConversationPage, ApiError> {
    let dto: ConversationListDto = parse(body)?;
    let pagination = dto
        .pagination
        .map(Pagination::from)
        .unwrap_or_else(|| Pagination::single(dto.conversations.len()));

    Ok(ConversationPage {
        conversations: dto.conversations.into_iter().map(Into::into).collect(),
        pagination,
    })
}

pub fn decode_thread_page(
    body: &[u8],
    session_user_id: Option<&str>,
) -> Result<ThreadPage, ApiError> {
    let dto: ThreadDto = parse(body)?;
    let pagination = dto
        .pagination
        .map(Pagination::from)
        .unwrap_or_else(|| Pagination::single(dto.messages.len()));

    Ok(ThreadPage {
        messages: dto
            .messages
            .into_iter()
            .map(|message| message.into_message(session_user_id))
            .collect(),
        partner: dto.partner.map(UserDto::into_partner),
        pagination,
    })
}

pub fn decode_message(body: &[u8], session_user_id: Option<&str>) -> Result<Message, ApiError> {
    let envelope: MessageEnvelope = parse(body)?;
    Ok(envelope.into_inner().into_message(session_user_id))
}
