//! Dispatch loop: every inbound text is a city name and gets exactly one reply.

use chrono::Local;
use std::{future::Future, time::Duration};
use tracing::{error, info, instrument, warn};

use crate::{
    config::{Config, TelegramSettings},
    error::{PipelineError, SendError, preview},
    provider::WeatherProvider,
    report::format_report,
    telegram::{Messenger, Update},
    validate::validate_response,
};

/// Prefix of the reply sent when the pipeline fails.
pub const OOPS_PREFIX: &str = "Oops";

/// Telegram rejects longer texts.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const POLL_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Fetch, validate and render the report for `city`.
///
/// The timestamp is taken when rendering, not when the request was made.
pub async fn weather_report<P>(provider: &P, city: &str) -> Result<String, PipelineError>
where
    P: WeatherProvider + ?Sized,
{
    let response = provider.current_weather(city).await?;
    let response = validate_response(response)?;
    Ok(format_report(&response, &Local::now())?)
}

pub fn oops_message(err: &PipelineError) -> String {
    preview(&format!("{OOPS_PREFIX}: {err}"), MAX_MESSAGE_CHARS - 3)
}

#[derive(Debug)]
pub struct WeatherBot<P, M> {
    provider: P,
    messenger: M,
    chat_id: String,
    settings: TelegramSettings,
}

impl<P, M> WeatherBot<P, M>
where
    P: WeatherProvider,
    M: Messenger,
{
    pub fn new(provider: P, messenger: M, chat_id: String, settings: TelegramSettings) -> Self {
        Self {
            provider,
            messenger,
            chat_id,
            settings,
        }
    }

    pub fn from_config(provider: P, messenger: M, config: &Config) -> Self {
        Self::new(
            provider,
            messenger,
            config.credentials.chat_id.clone(),
            config.settings.telegram.clone(),
        )
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Send the startup greeting to the configured chat.
    pub async fn greet(&self) -> Result<(), SendError> {
        self.messenger
            .send_message(&self.chat_id, &self.settings.greeting)
            .await
    }

    async fn reply(&self, chat_id: &str, city: &str) -> Result<(), PipelineError> {
        let report = weather_report(&self.provider, city).await?;
        self.messenger.send_message(chat_id, &report).await?;
        Ok(())
    }

    /// Answer one inbound message. Never fails: errors become an "Oops" reply.
    #[instrument(skip(self))]
    pub async fn handle_text(&self, chat_id: &str, city: &str) {
        let Err(err) = self.reply(chat_id, city).await else {
            info!("Weather report delivered");
            return;
        };

        error!(error = %err, "Failed to answer weather request");

        if let Err(send_err) = self.messenger.send_message(chat_id, &oops_message(&err)).await {
            error!(error = %send_err, "Failed to deliver error reply");
        }
    }

    async fn dispatch(&self, updates: Vec<Update>, offset: &mut i64) {
        for update in updates {
            *offset = (*offset).max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };

            self.handle_text(&message.chat.id.to_string(), &text).await;
        }
    }

    /// Greet, then poll and answer messages one at a time until `shutdown` resolves.
    ///
    /// Only a failed greeting ends the loop with an error.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), SendError>
    where
        F: Future<Output = ()>,
    {
        self.greet().await?;
        info!(chat_id = %self.chat_id, "Bot started, polling for messages");

        tokio::pin!(shutdown);
        let mut offset = 0;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping polling");
                    return Ok(());
                }
                polled = self.messenger.get_updates(offset, self.settings.poll_timeout_secs) => {
                    match polled {
                        Ok(updates) => self.dispatch(updates, &mut offset).await,
                        Err(err) => {
                            warn!(error = %err, "Polling failed");
                            tokio::time::sleep(POLL_ERROR_PAUSE).await;
                        }
                    }
                }
            }
        }
    }

    /// Run until Ctrl-C.
    pub async fn run(&self) -> Result<(), SendError> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
