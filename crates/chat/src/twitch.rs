//! Twitch chat gateway over IRC with TLS.
//!
//! Connects to `irc.chat.twitch.tv:6697`, authenticates with an OAuth token,
//! joins one channel and feeds every PRIVMSG through the message handler.
//! Replies are posted back as PRIVMSG when enabled in settings.
//!
//! The OAuth token is never logged.

use std::sync::Arc;

use async_trait::async_trait;
use chatcfg_core::Settings;
use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::DnsName;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, error, info};

use crate::handler::MessageHandler;
use crate::traits::{ChatError, ChatMessage, Gateway};

pub const TWITCH_IRC_HOST: &str = "irc.chat.twitch.tv";

/// IRC-over-TLS port.
pub const TWITCH_IRC_TLS_PORT: u16 = 6697;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for the Twitch gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct TwitchConfig {
    /// Always carries the `oauth:` prefix.
    pub oauth_token: String,
    /// Channel name without `#`, lower-case.
    pub channel: String,
    pub bot_username: String,
}

impl std::fmt::Debug for TwitchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchConfig")
            .field("oauth_token", &"[REDACTED]")
            .field("channel", &self.channel)
            .field("bot_username", &self.bot_username)
            .finish()
    }
}

impl TwitchConfig {
    /// Build from settings, rejecting missing credentials or channel.
    pub fn from_settings(settings: &Settings) -> Result<Self, ChatError> {
        let token = settings
            .resolved_access_token()
            .map_err(|e| ChatError::Config(e.to_string()))?;
        Self::new(&token, &settings.bot_username, &settings.channel)
    }

    pub fn new(token: &str, bot_username: &str, channel: &str) -> Result<Self, ChatError> {
        let token = token.trim();
        if token.is_empty() || token == "oauth:" {
            return Err(ChatError::Config(
                "please set an access token (access_token) in the settings file".into(),
            ));
        }
        let bot_username = bot_username.trim();
        if bot_username.is_empty() {
            return Err(ChatError::Config(
                "please set a bot username (bot_username) in the settings file".into(),
            ));
        }
        let channel = channel.trim().trim_start_matches('#');
        if channel.is_empty() {
            return Err(ChatError::Config(
                "please set a channel name to read from (channel) in the settings file".into(),
            ));
        }

        let oauth_token = if token.starts_with("oauth:") {
            token.to_string()
        } else {
            format!("oauth:{token}")
        };
        Ok(Self {
            oauth_token,
            channel: channel.to_lowercase(),
            bot_username: bot_username.to_lowercase(),
        })
    }
}

// ---------------------------------------------------------------------------
// IRC protocol
// ---------------------------------------------------------------------------

/// A parsed inbound PRIVMSG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub sender: String,
    pub channel: String,
    pub text: String,
}

pub fn build_pass_command(config: &TwitchConfig) -> String {
    format!("PASS {}", config.oauth_token)
}

pub fn build_nick_command(config: &TwitchConfig) -> String {
    format!("NICK {}", config.bot_username)
}

pub fn build_join_command(config: &TwitchConfig) -> String {
    format!("JOIN #{}", config.channel)
}

/// `PRIVMSG #channel :text`, with line breaks flattened to spaces.
pub fn build_privmsg(config: &TwitchConfig, text: &str) -> String {
    let text = text.replace(['\r', '\n'], " ");
    format!("PRIVMSG #{} :{}", config.channel, text)
}

pub fn build_pong(payload: &str) -> String {
    format!("PONG :{payload}")
}

/// Whether the server rejected our credentials.
pub fn is_auth_failure(raw: &str) -> bool {
    raw.contains(" NOTICE ")
        && (raw.contains("Login authentication failed") || raw.contains("Improperly formatted auth"))
}

/// Payload of a PING line, if it is one.
pub fn parse_ping(raw: &str) -> Option<&str> {
    raw.strip_prefix("PING :")
        .or_else(|| raw.strip_prefix("PING"))
        .map(|s| s.trim())
}

/// Parse `[@tags ]:nick!user@host PRIVMSG #channel :text`.
pub fn parse_privmsg(raw: &str) -> Option<ParsedMessage> {
    let raw = match raw.strip_prefix('@') {
        Some(tagged) => tagged.split_once(' ')?.1,
        None => raw,
    };
    let raw = raw.strip_prefix(':')?;
    let (prefix, rest) = raw.split_once(' ')?;
    let sender = prefix.split('!').next()?.to_string();

    let rest = rest.strip_prefix("PRIVMSG ")?;
    let (channel, text) = rest.split_once(' ')?;
    let channel = channel.strip_prefix('#')?.to_string();
    let text = text.strip_prefix(':').unwrap_or(text).to_string();

    if sender.is_empty() || channel.is_empty() {
        return None;
    }
    Some(ParsedMessage {
        sender,
        channel,
        text,
    })
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Live Twitch chat connection.
pub struct TwitchGateway {
    config: TwitchConfig,
    host: String,
    port: u16,
}

impl TwitchGateway {
    pub fn new(config: TwitchConfig) -> Self {
        Self {
            config,
            host: TWITCH_IRC_HOST.to_string(),
            port: TWITCH_IRC_TLS_PORT,
        }
    }

    /// Open a TCP connection and complete the TLS handshake.
    async fn connect(&self) -> Result<tokio_rustls::client::TlsStream<TcpStream>, ChatError> {
        let addr = format!("{}:{}", self.host, self.port);
        debug!(address = %addr, "connecting to Twitch chat");
        let tcp = TcpStream::connect(&addr).await?;

        let certs = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.into(),
        };
        let config = ClientConfig::builder()
            .with_root_certificates(certs)
            .with_no_client_auth();
        let connector: TlsConnector = Arc::new(config).into();
        let sni: DnsName<'static> = self
            .host
            .clone()
            .try_into()
            .map_err(|_| ChatError::Config(format!("invalid chat host name: {}", self.host)))?;
        Ok(connector.connect(sni.into(), tcp).await?)
    }

    /// Log in, join the channel and serve lines until the server hangs up.
    pub async fn session<R, W>(
        &self,
        reader: R,
        mut writer: W,
        handler: &MessageHandler,
    ) -> Result<(), ChatError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        send_line(&mut writer, &build_pass_command(&self.config)).await?;
        send_line(&mut writer, &build_nick_command(&self.config)).await?;
        send_line(&mut writer, &build_join_command(&self.config)).await?;

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if is_auth_failure(&line) {
                return Err(ChatError::Protocol(
                    "Twitch rejected the access token, check access_token and bot_username".into(),
                ));
            }
            if let Some(out) = self.handle_line(&line, handler) {
                send_line(&mut writer, &out).await?;
            }
        }

        info!("Twitch connection closed");
        Ok(())
    }

    /// React to one raw IRC line, returning the protocol line to send back.
    pub fn handle_line(&self, raw: &str, handler: &MessageHandler) -> Option<String> {
        let raw = raw.trim_end_matches(['\r', '\n']);

        if let Some(payload) = parse_ping(raw) {
            debug!("answering PING");
            return Some(build_pong(payload));
        }

        if let Some(msg) = parse_privmsg(raw) {
            let message = ChatMessage::new(msg.sender, msg.text);
            return match handler.handle(&message) {
                Ok(Some(reply)) if handler.post_responses() => Some(build_privmsg(&self.config, &reply)),
                Ok(Some(reply)) => {
                    debug!(reply = %reply, "reply not posted: post_responses_in_chat is off");
                    None
                }
                Ok(None) => None,
                Err(e) => {
                    error!(user = %message.user, error = %e, "failed to apply command");
                    None
                }
            };
        }

        let mut parts = raw.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(_), Some("001"), _) => info!("connected to Twitch chat"),
            (Some(prefix), Some("JOIN"), Some(channel))
                if prefix.trim_start_matches(':').starts_with(&self.config.bot_username) =>
            {
                info!(channel = %channel, "joined channel");
            }
            (Some(_), Some("NOTICE"), _) => info!(notice = %raw, "server notice"),
            _ => debug!(line = %raw, "ignored IRC line"),
        }
        None
    }
}

async fn send_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> Result<(), ChatError> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await?;
    Ok(())
}

#[async_trait]
impl Gateway for TwitchGateway {
    async fn run(&mut self, handler: Arc<MessageHandler>) -> Result<(), ChatError> {
        info!(host = %self.host, port = self.port, channel = %self.config.channel, "connecting to Twitch chat");
        let stream = self.connect().await?;
        let (read, write) = tokio::io::split(stream);
        self.session(BufReader::new(read), write, &handler).await
    }

    fn name(&self) -> &str {
        "twitch"
    }
}
