//! Framework-agnostic view-model for rendering a conversation.

use chrono::Local;

use crate::state::{ChatMessage, ChatRole, GroundingLink, MessageStatus};
use crate::strings;
use crate::verdict::{self, Authenticity, ParsedContent, VerdictSections};

/// Which edge of the chat column a bubble hugs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Colour treatment for a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
}

impl From<Authenticity> for Tone {
    fn from(authenticity: Authenticity) -> Self {
        match authenticity {
            Authenticity::Authentic => Tone::Positive,
            Authenticity::NonAuthentic => Tone::Negative,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Rendered verbatim: user messages and unstructured replies
    Plain(String),
    Verdict { sections: VerdictSections, tone: Tone },
    Loading,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub side: Side,
    pub role_label: &'static str,
    pub time_label: String,
    pub body: MessageBody,
    pub links: Vec<GroundingLink>,
}

impl MessageView {
    pub fn verdict(&self) -> Option<&VerdictSections> {
        match &self.body {
            MessageBody::Verdict { sections, .. } => Some(sections),
            _ => None,
        }
    }
}

impl From<&ChatMessage> for MessageView {
    fn from(message: &ChatMessage) -> Self {
        let (side, role_label) = match message.role {
            ChatRole::User => (Side::Right, strings::LABEL_USER),
            ChatRole::Assistant => (Side::Left, strings::LABEL_ASSISTANT),
        };

        let body = match (message.role, message.status) {
            (ChatRole::User, _) => MessageBody::Plain(message.content.clone()),
            (ChatRole::Assistant, Some(MessageStatus::Loading)) => MessageBody::Loading,
            (ChatRole::Assistant, Some(MessageStatus::Error)) => {
                MessageBody::Error(message.content.clone())
            }
            (ChatRole::Assistant, _) => match verdict::parse(&message.content) {
                ParsedContent::Structured(sections) => {
                    let tone = Tone::from(sections.authenticity());
                    MessageBody::Verdict { sections, tone }
                }
                ParsedContent::Unstructured => MessageBody::Plain(message.content.clone()),
            },
        };

        let links = match message.role {
            ChatRole::Assistant => message.links().to_vec(),
            ChatRole::User => Vec::new(),
        };

        Self {
            side,
            role_label,
            time_label: message
                .timestamp
                .with_timezone(&Local)
                .format("%H:%M")
                .to_string(),
            body,
            links,
        }
    }
}

/// Views for the whole log, in order
pub fn conversation(messages: &[ChatMessage]) -> Vec<MessageView> {
    messages.iter().map(MessageView::from).collect()
}
