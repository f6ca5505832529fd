//! Telegram commands and the update handler tree

use crate::api::{ApiClientError, BackendClient};
use crate::format;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

/// Commands understood by the bot
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Comandos disponibles:")]
pub enum Command {
    #[command(description = "presentación del bot")]
    Start,
    #[command(description = "muestra esta ayuda")]
    Help,
    #[command(description = "tus últimos ejercicios")]
    Logs,
    #[command(description = "qué te toca entrenar hoy")]
    Toca,
    #[command(description = "tu rutina semanal")]
    Rutina,
    #[command(description = "pregunta al asistente: /ai ¿qué como hoy?")]
    Ai(String),
    #[command(description = "vincula tu cuenta: /vincular CODIGO")]
    Vincular(String),
}

/// Telegram user that sent a message
#[derive(Debug, Clone, PartialEq)]
pub struct Sender {
    pub telegram_id: i64,
    pub username: Option<String>,
}

const WELCOME: &str = "¡Hola! Soy GymTrack 💪\n\n\
Para empezar, genera un código en la web y envíalo con /vincular CODIGO. \
Después puedes escribirme cualquier pregunta sobre tu entrenamiento o tu dieta.";

const NOT_LINKED: &str = "Tu cuenta de Telegram no está vinculada. \
Genera un código en la web y envíalo con /vincular CODIGO.";

/// MarkdownV2 text explaining an API failure to the user
fn error_reply(error: &ApiClientError) -> String {
    let text = match error {
        ApiClientError::NotLinked => NOT_LINKED.to_string(),
        ApiClientError::Rejected(message) => format!("No pude hacerlo: {}", message),
        ApiClientError::Conflict(_) => {
            "Esta cuenta de Telegram ya está vinculada a otro usuario.".to_string()
        }
        ApiClientError::Unauthorized | ApiClientError::Status { .. } | ApiClientError::Transport(_) => {
            warn!("Backend request failed: {}", error);
            "El servicio no está disponible ahora mismo. Inténtalo de nuevo en unos minutos.".to_string()
        }
    };
    format::plain(&text)
}

/// Answer a command; the result is MarkdownV2
pub async fn respond(api: &BackendClient, sender: &Sender, command: Command) -> String {
    let result = match command {
        Command::Start => return format::plain(WELCOME),
        Command::Help => return format::plain(&Command::descriptions().to_string()),
        Command::Logs => api.recent_logs(sender.telegram_id).await.map(|h| format::logs(&h)),
        Command::Toca => api.today(sender.telegram_id).await.map(|t| format::today(&t)),
        Command::Rutina => api.routine(sender.telegram_id).await.map(|r| format::routine(&r)),
        Command::Ai(question) => {
            let question = question.trim();
            if question.is_empty() {
                return format::plain("Escribe tu pregunta después del comando, por ejemplo: /ai ¿qué entrené ayer?");
            }
            api.chat(sender.telegram_id, question)
                .await
                .map(|reply| format::chat_reply(&reply.reply))
        }
        Command::Vincular(code) => {
            let code = code.trim();
            if code.is_empty() {
                return format::plain("Uso: /vincular CODIGO (lo encuentras en la web).");
            }
            api.link(code, sender.telegram_id, sender.username.clone())
                .await
                .map(|linked| {
                    info!(telegram_id = sender.telegram_id, user_id = %linked.user_id, "Account linked");
                    let name = linked.display_name.unwrap_or(linked.email);
                    format::plain(&format!("✅ Cuenta vinculada: {}. ¡A entrenar!", name))
                })
        }
    };

    result.unwrap_or_else(|e| error_reply(&e))
}

fn sender_of(msg: &Message) -> Option<Sender> {
    msg.from.as_ref().map(|user| Sender {
        telegram_id: user.id.0 as i64,
        username: user.username.clone(),
    })
}

async fn reply(bot: &Bot, msg: &Message, text: String) -> HandlerResult {
    for chunk in format::split_message(&text) {
        bot.send_message(msg.chat.id, chunk)
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
    }
    Ok(())
}

async fn handle_command(bot: Bot, msg: Message, command: Command, api: Arc<BackendClient>) -> HandlerResult {
    let Some(sender) = sender_of(&msg) else {
        return Ok(());
    };
    let text = respond(&api, &sender, command).await;
    reply(&bot, &msg, text).await
}

/// Any other text goes to the assistant
async fn handle_text(bot: Bot, msg: Message, api: Arc<BackendClient>) -> HandlerResult {
    let (Some(sender), Some(text)) = (sender_of(&msg), msg.text()) else {
        return Ok(());
    };
    if text.starts_with('/') {
        return reply(&bot, &msg, format::plain("No conozco ese comando. Usa /help.")).await;
    }
    let answer = respond(&api, &sender, Command::Ai(text.to_string())).await;
    reply(&bot, &msg, answer).await
}

/// Dispatcher handler tree
pub fn schema() -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
        .branch(dptree::entry().endpoint(handle_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BotConfig;
    use rstest::rstest;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sender() -> Sender {
        Sender {
            telegram_id: 42,
            username: Some("ana".to_string()),
        }
    }

    fn client(server: &MockServer) -> BackendClient {
        BackendClient::new(&BotConfig {
            api_base_url: server.uri(),
            ..BotConfig::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case("/start", Command::Start)]
    #[case("/toca", Command::Toca)]
    #[case("/ai ¿qué como hoy?", Command::Ai("¿qué como hoy?".to_string()))]
    #[case("/vincular AB23CD", Command::Vincular("AB23CD".to_string()))]
    fn test_parse_commands(#[case] text: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(text, "gymtrack_bot").unwrap(), expected);
    }

    #[tokio::test]
    async fn test_unlinked_user_gets_instructions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/bot/users/42/routine"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let text = respond(&client(&server), &sender(), Command::Rutina).await;
        assert!(text.contains("no está vinculada"));
    }

    #[tokio::test]
    async fn test_link_sends_username() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/bot/link"))
            .and(body_partial_json(json!({"code": "AB23CD", "telegram_id": 42, "telegram_username": "ana"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
                "email": "ana@example.com",
                "display_name": "Ana"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = respond(&client(&server), &sender(), Command::Vincular(" AB23CD ".to_string())).await;
        assert!(text.contains("Cuenta vinculada: Ana"));
    }

    #[tokio::test]
    async fn test_empty_arguments_do_not_call_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let api = client(&server);
        assert!(respond(&api, &sender(), Command::Ai("  ".to_string())).await.contains("/ai"));
        assert!(respond(&api, &sender(), Command::Vincular(String::new())).await.contains("/vincular"));
    }

    #[tokio::test]
    async fn test_chat_reply_is_rendered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/bot/users/42/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reply": "*🥗 Nutrición*\n\nTe quedan 500 kcal.",
                "intent": "nutrition",
                "classified_by": "llm"
            })))
            .mount(&server)
            .await;

        let text = respond(&client(&server), &sender(), Command::Ai("¿cuánto me queda?".to_string())).await;
        assert_eq!(text, "*🥗 Nutrición*\n\nTe quedan 500 kcal\\.");
    }

    #[tokio::test]
    async fn test_backend_outage_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let text = respond(&client(&server), &sender(), Command::Logs).await;
        assert!(text.contains("no está disponible"));
    }
}
