use crate::interactions::util;
use crate::{AppState, commands, interactions};
use serenity::async_trait;
use serenity::client::Context;
use serenity::model::application::{Command as GlobalCommand, Interaction};
use serenity::model::{gateway::Ready, id::GuildId};
use serenity::prelude::EventHandler;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info};

enum Command {
    Ping,
    Deck,
    Draw,
    Hand,
    End,
    EndAll,
    RefreshCards,
    Unknown,
}

impl FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ping" => Ok(Command::Ping),
            "deck" => Ok(Command::Deck),
            "draw" => Ok(Command::Draw),
            "hand" => Ok(Command::Hand),
            "end" => Ok(Command::End),
            "endall" => Ok(Command::EndAll),
            "refreshcards" => Ok(Command::RefreshCards),
            _ => Ok(Command::Unknown),
        }
    }
}

pub struct Handler {
    /// Guild to register slash commands in; `None` registers them globally.
    pub guild_id: Option<GuildId>,
}

async fn dispatch(
    ctx: Context,
    interaction: Interaction,
    app_state: Arc<AppState>,
) -> serenity::Result<()> {
    match &interaction {
        Interaction::Command(command) => {
            let name = Command::from_str(command.data.name.as_str()).unwrap_or(Command::Unknown);
            match name {
                Command::Ping => commands::ping::run_slash(&ctx, command).await,
                Command::Deck => commands::deck::run_slash(&ctx, command).await,
                Command::Draw => commands::draw::run_slash(&ctx, command).await,
                Command::Hand => commands::hand::run_slash(&ctx, command).await,
                Command::End => commands::end::run_slash(&ctx, command, false).await,
                Command::EndAll => commands::end::run_slash(&ctx, command, true).await,
                Command::RefreshCards => commands::cards::run_slash(&ctx, command).await,
                Command::Unknown => {
                    debug!(target = "handler", name = %command.data.name, "unknown command");
                    Ok(())
                }
            }
        }
        Interaction::Component(component) => {
            interactions::handle_component(&ctx, component, app_state).await
        }
        Interaction::Modal(modal) => interactions::handle_modal(&ctx, modal, app_state).await,
        _ => Ok(()),
    }
}

/// Try the initial response; if the interaction was already answered, send a followup instead.
async fn respond_or_follow_up<T>(
    respond: impl Future<Output = serenity::Result<()>>,
    follow_up: impl Future<Output = serenity::Result<T>>,
) -> serenity::Result<()> {
    match respond.await {
        Ok(()) => Ok(()),
        Err(_) => follow_up.await.map(|_| ()),
    }
}

/// Last-resort reply after a handler failed or panicked; a second failure is only logged.
async fn report_internal_error(ctx: &Context, interaction: &Interaction) {
    let http = &ctx.http;
    let response = || util::notice(util::INTERNAL_ERROR);
    let followup = || util::followup_notice(util::INTERNAL_ERROR);
    let result = match interaction {
        Interaction::Command(c) => {
            respond_or_follow_up(
                c.create_response(http, response()),
                c.create_followup(http, followup()),
            )
            .await
        }
        Interaction::Component(c) => {
            respond_or_follow_up(
                c.create_response(http, response()),
                c.create_followup(http, followup()),
            )
            .await
        }
        Interaction::Modal(m) => {
            respond_or_follow_up(
                m.create_response(http, response()),
                m.create_followup(http, followup()),
            )
            .await
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        debug!(target = "handler", error = ?e, "could not deliver internal error notice");
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Some(app_state) = AppState::from_ctx(&ctx).await else {
            error!(target = "handler", "AppState missing from TypeMap");
            return;
        };
        let task = tokio::spawn(dispatch(ctx.clone(), interaction.clone(), app_state));
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(target = "handler", id = %interaction.id(), error = ?e, "interaction handler failed");
                report_internal_error(&ctx, &interaction).await;
            }
            Err(e) => {
                error!(target = "handler", id = %interaction.id(), error = %e, "interaction handler panicked");
                report_internal_error(&ctx, &interaction).await;
            }
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(target = "handler", user = %ready.user.name, "connected and ready");
        let commands_to_register = vec![
            commands::ping::register(),
            commands::deck::register(),
            commands::draw::register(),
            commands::hand::register(),
            commands::end::register(),
            commands::end::register_all(),
            commands::cards::register(),
        ];
        let count = commands_to_register.len();
        let registered = match self.guild_id {
            Some(guild_id) => guild_id
                .set_commands(&ctx.http, commands_to_register)
                .await
                .map(|_| ()),
            None => GlobalCommand::set_global_commands(&ctx.http, commands_to_register)
                .await
                .map(|_| ()),
        };
        match registered {
            Ok(()) => info!(target = "handler", count, guild = ?self.guild_id, "registered slash commands"),
            Err(e) => error!(target = "handler", error = ?e, "failed to register slash commands"),
        }
    }
}
