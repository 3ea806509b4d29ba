use crate::interactions::util;
use crate::model::ShardManagerContainer;
use serenity::builder::CreateCommand;
use serenity::model::application::CommandInteraction;
use serenity::prelude::*;

pub fn register() -> CreateCommand {
    CreateCommand::new("ping").description("Checks the bot's heartbeat latency.")
}

pub async fn run_slash(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
    let latency = {
        let data = ctx.data.read().await;
        match data.get::<ShardManagerContainer>() {
            Some(shard_manager) => {
                let runners = shard_manager.runners.lock().await;
                runners
                    .get(&ctx.shard_id)
                    .and_then(|runner| runner.latency)
                    .map_or_else(
                        || "N/A".to_string(),
                        |latency| format!("{} ms", latency.as_millis()),
                    )
            }
            None => "N/A".to_string(),
        }
    };
    command
        .create_response(&ctx.http, util::notice(format!("Pong! Heartbeat Latency: `{latency}`")))
        .await
}
