//! Typed bot commands extracted from chat messages.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    BotCommand,
    Other,
}

/// Platform-neutral message entity. `offset` and `length` are byte positions in the
/// message text; transport adapters convert from their own units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
}

impl Entity {
    pub fn command(offset: usize, length: usize) -> Self {
        Self {
            kind: EntityKind::BotCommand,
            offset,
            length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// Parses the command that opens `text`.
    ///
    /// Returns `None` unless the first entity is a bot command at offset 0 and no
    /// other bot command appears later in the message. A `@bot_username` suffix
    /// naming this bot is stripped from the command name.
    pub fn parse(text: &str, entities: &[Entity], bot_username: &str) -> Option<Command> {
        let first = entities.first()?;
        if first.kind != EntityKind::BotCommand
            || entities
                .iter()
                .any(|e| e.kind == EntityKind::BotCommand && e.offset != 0)
        {
            return None;
        }

        let end = first.offset.checked_add(first.length)?;
        let token = text.get(first.offset..end)?;
        let name = match token.split_once('@') {
            Some((name, addressee)) if addressee.eq_ignore_ascii_case(bot_username) => name,
            _ => token,
        };

        Some(Command {
            name: name.to_string(),
            args: split_args(text.get(end..).unwrap_or_default()),
        })
    }
}

/// Whitespace separated tokens, as typed.
pub fn split_args(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}
