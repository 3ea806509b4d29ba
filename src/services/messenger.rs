//! serenity-backed [`Messenger`]: turns `CardRender`s into channel messages.
use crate::deck::render::{ButtonTone, CardRender, Messenger, RenderButton};
use crate::error::DeckError;
use async_trait::async_trait;
use serenity::builder::{
    CreateActionRow, CreateAttachment, CreateButton, CreateMessage, EditAttachments, EditMessage,
};
use serenity::http::Http;
use serenity::model::application::ButtonStyle;
use serenity::model::id::{ChannelId, MessageId};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct DiscordMessenger {
    http: Arc<Http>,
}

impl DiscordMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn render_err(op: &str, e: serenity::Error) -> DeckError {
    DeckError::Render(format!("{op}: {e}"))
}

fn style(tone: ButtonTone) -> ButtonStyle {
    match tone {
        ButtonTone::Success => ButtonStyle::Success,
        ButtonTone::Danger => ButtonStyle::Danger,
    }
}

/// One action row holding every button; an empty slice clears the row.
pub fn action_rows(buttons: &[RenderButton]) -> Vec<CreateActionRow> {
    if buttons.is_empty() {
        return Vec::new();
    }
    vec![CreateActionRow::Buttons(
        buttons
            .iter()
            .map(|b| {
                CreateButton::new(b.custom_id.clone())
                    .label(b.label.clone())
                    .style(style(b.tone))
            })
            .collect(),
    )]
}

async fn attachment(path: &Path) -> Result<CreateAttachment, DeckError> {
    CreateAttachment::path(path).await.map_err(|e| {
        warn!(target = "messenger.attach", path = %path.display(), error = %e, "card image could not be read");
        render_err("attach", e)
    })
}

#[async_trait]
impl Messenger for DiscordMessenger {
    async fn send(
        &self,
        channel_id: ChannelId,
        render: &CardRender,
    ) -> Result<MessageId, DeckError> {
        let mut builder = CreateMessage::new().components(action_rows(&render.buttons));
        if let Some(content) = &render.content {
            builder = builder.content(content.clone());
        }
        if let Some(path) = &render.image {
            builder = builder.add_file(attachment(path).await?);
        }
        let message = channel_id
            .send_message(&*self.http, builder)
            .await
            .map_err(|e| render_err("send", e))?;
        debug!(target = "messenger.send", channel_id = %channel_id, message_id = %message.id, "card message sent");
        Ok(message.id)
    }

    async fn replace(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        render: &CardRender,
    ) -> Result<(), DeckError> {
        // Empty attachment list drops the previous card image.
        let mut files = EditAttachments::new();
        if let Some(path) = &render.image {
            files = files.add(attachment(path).await?);
        }
        let builder = EditMessage::new()
            .content(render.content.clone().unwrap_or_default())
            .attachments(files)
            .components(action_rows(&render.buttons));
        channel_id
            .edit_message(&*self.http, message_id, builder)
            .await
            .map_err(|e| render_err("replace", e))?;
        Ok(())
    }

    async fn set_buttons(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        buttons: &[RenderButton],
    ) -> Result<(), DeckError> {
        let builder = EditMessage::new().components(action_rows(buttons));
        channel_id
            .edit_message(&*self.http, message_id, builder)
            .await
            .map_err(|e| render_err("set_buttons", e))?;
        Ok(())
    }

    async fn delete(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), DeckError> {
        channel_id
            .delete_message(&*self.http, message_id)
            .await
            .map_err(|e| render_err("delete", e))
    }
}
