use reqwest::Url;

const CONVERSATION_QUERY_KEY: &str = "conversation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLinkError {
    InvalidBaseUrl,
    MissingConversation,
}

impl DeepLinkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl => "web.base_url in config is not a valid URL",
            Self::MissingConversation => "link does not name a conversation",
        }
    }
}

/// Shareable web link that opens the conversation with `partner_id`.
pub fn conversation_link(web_base: &str, partner_id: &str) -> Result<String, DeepLinkError> {
    let mut url = Url::parse(web_base).map_err(|_| DeepLinkError::InvalidBaseUrl)?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| DeepLinkError::InvalidBaseUrl)?;
        segments.pop_if_empty().push("messages");
    }
    url.query_pairs_mut()
        .clear()
        .append_pair(CONVERSATION_QUERY_KEY, partner_id);

    Ok(url.into())
}

/// Resolves `--open` input: either a bare partner id or a link produced by
/// [`conversation_link`].
pub fn parse_open_target(input: &str) -> Result<String, DeepLinkError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DeepLinkError::MissingConversation);
    }

    let Ok(url) = Url::parse(trimmed) else {
        return Ok(trimmed.to_owned());
    };

    url.query_pairs()
        .find(|(key, _)| key == CONVERSATION_QUERY_KEY)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(DeepLinkError::MissingConversation)
}
