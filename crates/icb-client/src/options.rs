//! Per-call options for the packets a client sends.
//!
//! Each options type knows the protocol order of its fields. Absent values at
//! the end of the list are left off the wire; an absent value followed by a
//! present one is sent as an empty field so later fields keep their position.

/// Login command that joins the default group.
pub const LOGIN_COMMAND: &str = "login";

/// Login command that lists users and disconnects.
pub const WHO_COMMAND: &str = "w";

/// Protocol level sent in client protocol packets.
pub const DEFAULT_PROTOCOL_LEVEL: &str = "1";

/// Drop trailing `None`s and turn the rest into wire fields.
pub(crate) fn compact_trailing<'a>(values: &[Option<&'a str>]) -> Vec<&'a [u8]> {
    let keep = values
        .iter()
        .rposition(Option::is_some)
        .map_or(0, |last| last + 1);
    values[..keep]
        .iter()
        .map(|value| value.map_or(&b""[..], str::as_bytes))
        .collect()
}

/// Login packet fields.
///
/// Wire order: login_id, nickname, default_group, command, password,
/// group_status, protocol_level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    pub login_id: String,
    pub nickname: String,
    pub default_group: Option<String>,
    pub command: Option<String>,
    pub password: Option<String>,
    pub group_status: Option<String>,
    pub protocol_level: Option<String>,
}

impl LoginOptions {
    /// Log in as `nickname` and join the server's default group.
    pub fn new(login_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            nickname: nickname.into(),
            default_group: None,
            command: Some(LOGIN_COMMAND.to_string()),
            password: None,
            group_status: None,
            protocol_level: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.default_group = Some(group.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Send no login command at all.
    pub fn without_command(mut self) -> Self {
        self.command = None;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_group_status(mut self, status: impl Into<String>) -> Self {
        self.group_status = Some(status.into());
        self
    }

    pub fn with_protocol_level(mut self, level: impl Into<String>) -> Self {
        self.protocol_level = Some(level.into());
        self
    }

    /// Fields in wire order.
    pub fn fields(&self) -> Vec<&[u8]> {
        compact_trailing(&[
            Some(self.login_id.as_str()),
            Some(self.nickname.as_str()),
            self.default_group.as_deref(),
            self.command.as_deref(),
            self.password.as_deref(),
            self.group_status.as_deref(),
            self.protocol_level.as_deref(),
        ])
    }
}

/// Command packet fields: command, arguments, message_id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    pub command: String,
    pub arguments: Option<String>,
    pub message_id: Option<String>,
}

impl CommandOptions {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    /// Tag the command so its output can be matched to it.
    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Fields in wire order.
    pub fn fields(&self) -> Vec<&[u8]> {
        compact_trailing(&[
            Some(self.command.as_str()),
            self.arguments.as_deref(),
            self.message_id.as_deref(),
        ])
    }
}

/// Protocol packet fields: level, host_id, client_id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolOptions {
    pub level: String,
    pub host_id: Option<String>,
    pub client_id: Option<String>,
}

impl ProtocolOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_host_id(mut self, host_id: impl Into<String>) -> Self {
        self.host_id = Some(host_id.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Fields in wire order.
    pub fn fields(&self) -> Vec<&[u8]> {
        compact_trailing(&[
            Some(self.level.as_str()),
            self.host_id.as_deref(),
            self.client_id.as_deref(),
        ])
    }
}

impl Default for ProtocolOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_PROTOCOL_LEVEL.to_string(),
            host_id: None,
            client_id: None,
        }
    }
}
