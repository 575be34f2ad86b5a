use anyhow::{anyhow, Result};

use crate::{
    api,
    cli::{Cli, Command, ListArgs, RunArgs},
    domain::{self, conversation::ConversationFilters},
    infra, ui,
    usecases::{
        self, bootstrap,
        deep_link::parse_open_target,
        list_conversations::{list_conversations, ConversationPage, ListConversationsQuery},
    },
};

const APP_LIST_FAILED: &str = "APP_LIST_FAILED";

pub fn run(cli: Cli) -> Result<()> {
    match cli.command_or_default() {
        Command::Run(args) => run_shell(&cli, args),
        Command::List(args) => print_conversations(&cli, args),
    }
}

fn run_shell(cli: &Cli, args: RunArgs) -> Result<()> {
    let open_partner = args
        .open
        .as_deref()
        .map(parse_open_target)
        .transpose()
        .map_err(|error| anyhow!("--open: {}", error.user_message()))?;

    let context = bootstrap::bootstrap(cli.config.as_deref())?;
    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        api = api::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let mut shell = bootstrap::compose_shell(&context);
    ui::shell::start(
        &context,
        shell.event_source.as_mut(),
        shell.orchestrator.as_mut(),
        open_partner,
    )
}

fn print_conversations(cli: &Cli, args: ListArgs) -> Result<()> {
    let context = bootstrap::bootstrap_quiet(cli.config.as_deref())?;
    let query = ListConversationsQuery {
        filters: ConversationFilters {
            search: args.search.unwrap_or_default(),
            unread_only: args.unread,
        },
        page: args.page,
        limit: context.config.ui.page_size,
    };

    let page = list_conversations(&context.api, query).map_err(|error| {
        tracing::warn!(code = APP_LIST_FAILED, error = ?error, "conversation list failed");
        anyhow!(error.user_message())
    })?;

    for line in conversation_lines(&page) {
        println!("{line}");
    }
    Ok(())
}

fn conversation_lines(page: &ConversationPage) -> Vec<String> {
    if page.conversations.is_empty() {
        return vec!["No conversations.".to_owned()];
    }

    let mut lines: Vec<String> = page
        .conversations
        .iter()
        .map(|conversation| {
            let unread = if conversation.unread_count > 0 {
                format!(" [{} unread]", conversation.unread_count)
            } else {
                String::new()
            };
            let when = conversation
                .last_message_label
                .as_deref()
                .map(|label| format!(" ({label})"))
                .unwrap_or_default();
            let preview = conversation
                .last_message_preview
                .as_deref()
                .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| "No messages yet".to_owned());

            format!(
                "{}\t{}{unread}{when}: {preview}",
                conversation.partner_id, conversation.partner_name
            )
        })
        .collect();

    lines.push(format!(
        "page {} ({} conversations)",
        page.pagination.label(),
        page.pagination.total
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cli::RunArgs,
        domain::{conversation::ConversationSummary, pagination::Pagination},
    };

    fn summary(partner_id: &str, name: &str, unread_count: u32) -> ConversationSummary {
        ConversationSummary {
            partner_id: partner_id.to_owned(),
            partner_name: name.to_owned(),
            partner_avatar_url: None,
            last_message_preview: Some("Can you do\nFriday?".to_owned()),
            last_message_unix_ms: None,
            last_message_label: Some("5 minutes ago".to_owned()),
            unread_count,
            created_at_unix_ms: None,
        }
    }

    #[test]
    fn prints_one_line_per_conversation_and_page_footer() {
        let page = ConversationPage {
            conversations: vec![summary("u1", "Maria", 2), summary("u2", "Jonas", 0)],
            pagination: Pagination {
                total: 42,
                page: 1,
                limit: 20,
                pages: 3,
            },
        };

        let lines = conversation_lines(&page);

        assert_eq!(
            lines,
            vec![
                "u1\tMaria [2 unread] (5 minutes ago): Can you do Friday?".to_owned(),
                "u2\tJonas (5 minutes ago): Can you do Friday?".to_owned(),
                "page 1/3 (42 conversations)".to_owned(),
            ]
        );
    }

    #[test]
    fn empty_page_prints_placeholder() {
        let page = ConversationPage {
            conversations: vec![],
            pagination: Pagination::single(0),
        };

        assert_eq!(conversation_lines(&page), vec!["No conversations.".to_owned()]);
    }

    #[test]
    fn rejects_link_without_conversation_before_bootstrap() {
        let cli = Cli {
            config: None,
            command: Some(Command::Run(RunArgs {
                open: Some("https://care.example.com/messages".to_owned()),
            })),
        };

        let error = run(cli).expect_err("link without conversation must be rejected");

        assert!(error.to_string().contains("does not name a conversation"));
    }
}
