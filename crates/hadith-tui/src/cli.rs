use anyhow::{bail, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm};
use hadith_core::{
    strings, view, ChatSession, MessageBody, MessageView, Resolution, Side, SqliteStorage, Tone,
    VerdictSections,
};

use crate::app::Verifier;

/// Verify one hadith text and print the verdict
pub async fn verify(verifier: &Verifier, text: &str) -> Result<()> {
    let mut session = ChatSession::load(Box::new(SqliteStorage::open_default()?));

    println!("🔍 {}", text.bold().cyan());
    println!("{}\n", format!("{}...", strings::LOADING).dimmed());

    let resolution = session.submit(verifier, text).await?;

    if let Some(reply) = session.messages().last() {
        print_message(&MessageView::from(reply));
    }

    if let Resolution::Failed(notice) = resolution {
        bail!("{}", notice.message());
    }
    Ok(())
}

/// Print the persisted conversation
pub fn history() -> Result<()> {
    let session = ChatSession::load(Box::new(SqliteStorage::open_default()?));

    println!("\n{}", format!("📜 {}", strings::APP_TITLE).bold().blue());
    println!("{}", "=".repeat(50).dimmed());

    for message in view::conversation(session.messages()) {
        print_message(&message);
    }

    println!("{}", "=".repeat(50).dimmed());
    println!("{} messages", session.messages().len().to_string().bold());
    Ok(())
}

/// Clear the persisted conversation, asking first unless `yes`
pub fn reset(yes: bool) -> Result<()> {
    let mut session = ChatSession::load(Box::new(SqliteStorage::open_default()?));

    let confirmed = yes
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(strings::CONFIRM_RESET)
            .default(false)
            .interact()?;

    if session.reset(confirmed)? {
        println!("{}", strings::NOTICE_RESET.green());
    }
    Ok(())
}

fn print_message(message: &MessageView) {
    let role = match message.side {
        Side::Right => message.role_label.bold().cyan(),
        Side::Left => message.role_label.bold().yellow(),
    };
    println!("\n{}  {}", role, message.time_label.dimmed());

    match &message.body {
        MessageBody::Plain(text) => println!("{}", text),
        MessageBody::Loading => println!("{}", strings::LOADING.italic().dimmed()),
        MessageBody::Error(text) => println!("{}", text.red()),
        MessageBody::Verdict { sections, tone } => print_verdict(sections, *tone),
    }

    if !message.links.is_empty() {
        println!("{}", format!("{}:", strings::LABEL_LINKS).bold().dimmed());
        for (i, link) in message.links.iter().enumerate() {
            println!("  {}. {} {}", i + 1, link.title.blue(), link.uri.dimmed());
        }
    }
}

fn print_verdict(sections: &VerdictSections, tone: Tone) {
    if let Some(status) = sections.status.as_deref() {
        let line = format!("{}: {}", strings::LABEL_STATUS, status);
        match tone {
            Tone::Positive => println!("{}", line.bold().green()),
            Tone::Negative => println!("{}", line.bold().red()),
        }
    }

    let rows = [
        (strings::LABEL_TEXT, &sections.text),
        (strings::LABEL_SOURCE, &sections.source),
        (strings::LABEL_GRADE, &sections.grade),
        (strings::LABEL_WEAKNESS, &sections.weakness_reason),
        (strings::LABEL_ALTERNATIVE, &sections.alternative),
        (strings::LABEL_NOTE, &sections.note),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            println!("{}", label.bold());
            println!("  {}", value);
        }
    }
}
