//! Plain-text rendering of transcript messages and recommendation cards.
//!
//! Everything here is a pure mapping from records to lines; coloring is left
//! to the caller.

use chrono::Local;
use client_core::Message;
use shared::{domain::Role, protocol::Recommendation};

const STYLE_SEPARATOR: &str = " • ";

pub fn speaker_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "assistant",
    }
}

/// Header line plus content lines, then numbered cards when the message has any.
pub fn message_lines(message: &Message) -> Vec<String> {
    let mut lines = vec![format!(
        "[{}] {}:",
        message.created_at.with_timezone(&Local).format("%H:%M"),
        speaker_label(message.role)
    )];
    lines.extend(message.content.lines().map(|line| format!("  {line}")));

    if let Some(recs) = &message.recommendations {
        for (n, rec) in recs.iter().enumerate() {
            lines.extend(card_lines(n + 1, rec));
        }
    }
    lines
}

pub fn card_lines(number: usize, rec: &Recommendation) -> Vec<String> {
    let mut title = format!("    [{number}] {}", rec.title);
    if let Some(score) = score_label(rec) {
        title.push_str(&format!("  ({score})"));
    }

    let mut lines = vec![title];
    if let Some(subtitle) = rec.subtitle.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("        {subtitle}"));
    }
    if let Some(styles) = styles_label(rec) {
        lines.push(format!("        {styles}"));
    }
    if let Some(distance) = rec.distance_km {
        lines.push(format!("        {distance:.1} km away"));
    }
    if let Some(media) = rec.media_url.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("        media: {media}"));
    }
    lines
}

pub fn score_label(rec: &Recommendation) -> Option<String> {
    rec.score
        .filter(|score| score.is_finite())
        .map(|score| format!("{score:.2}"))
}

pub fn styles_label(rec: &Recommendation) -> Option<String> {
    if rec.meta.styles.is_empty() {
        None
    } else {
        Some(rec.meta.styles.join(STYLE_SEPARATOR))
    }
}

pub fn detail_lines(rec: &Recommendation) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", rec.title, rec.kind.as_str()),
        format!("  id: {}", rec.id),
    ];
    if let Some(subtitle) = &rec.subtitle {
        lines.push(format!("  subtitle: {subtitle}"));
    }
    if let Some(score) = score_label(rec) {
        lines.push(format!("  score: {score}"));
    }
    if let Some(distance) = rec.distance_km {
        lines.push(format!("  distance: {distance:.1} km"));
    }
    if let Some(styles) = styles_label(rec) {
        lines.push(format!("  styles: {styles}"));
    }
    if let Some(media) = &rec.media_url {
        lines.push(format!("  media: {media}"));
    }
    if let Some(portfolio) = &rec.meta.portfolio_url {
        lines.push(format!("  portfolio: {portfolio}"));
    }
    lines
}
