//! HTML rendering of launch summaries.
//!
//! Everything interpolated into markup goes through [`escape`]; launch names
//! come straight from a third-party feed.

use chrono::Datelike;
use launch_sync_core::{ChangeEvent, ChangeKind, LaunchRecord, MessageBody, OutgoingMessage};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Subject and body ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub html: String,
}

/// Render a routed message.
pub fn render_message(message: &OutgoingMessage) -> RenderedMail {
    let html = match &message.body {
        MessageBody::Window(records) => page(
            "Upcoming Rocket Launches",
            "Here are the scheduled launches for the upcoming week:",
            &render_window(records),
        ),
        MessageBody::Changes(events) => page(
            "Updates Of Upcoming Rocket Launches",
            "What's new?",
            &render_changes(events),
        ),
    };
    RenderedMail {
        subject: message.subject().to_string(),
        html,
    }
}

/// Launches grouped under weekday headings, Monday first.
pub fn render_window(records: &[LaunchRecord]) -> String {
    if records.is_empty() {
        return "<p>No launches are scheduled for the upcoming week.</p>".to_string();
    }

    let mut days: BTreeMap<u32, Vec<&LaunchRecord>> = BTreeMap::new();
    for record in records {
        days.entry(record.net.weekday().num_days_from_monday())
            .or_default()
            .push(record);
    }

    let mut out = String::new();
    for launches in days.values_mut() {
        launches.sort_by(|a, b| a.schedule_cmp(b));
        let day_name = launches[0].net.format("%A");
        let _ = write!(out, "<div class='day-section'><h3>{day_name}</h3>");
        for launch in launches.iter() {
            let _ = write!(
                out,
                "<div class='launch-card'><span class='rocket-icon'>🚀</span> {} | {}</div>",
                escape(&launch.name),
                launch.net.format("%H:%M UTC")
            );
        }
        out.push_str("</div>");
    }
    out
}

/// Change events grouped under kind headings.
pub fn render_changes(events: &[ChangeEvent]) -> String {
    let mut out = String::new();
    for kind in ChangeKind::DISPLAY_ORDER {
        let mut group: Vec<&ChangeEvent> = events.iter().filter(|e| e.kind == kind).collect();
        if group.is_empty() {
            continue;
        }
        group.sort_by(|a, b| a.record.schedule_cmp(&b.record));

        let _ = write!(out, "<h2>{}</h2><div class='day-section'>", kind.label());
        for event in group {
            let _ = write!(
                out,
                "<div class='launch-card'><span class='rocket-icon'>🚀</span> {}</div>",
                change_line(event)
            );
        }
        out.push_str("</div>");
    }
    out
}

fn change_line(event: &ChangeEvent) -> String {
    let record = &event.record;
    let name = escape(&record.name);
    match event.kind {
        ChangeKind::Postponed => name,
        ChangeKind::StatusChanged => format!(
            "{name} | {} | {}",
            record.net.format("%A %H:%M UTC"),
            escape(&record.status)
        ),
        ChangeKind::New | ChangeKind::Rescheduled => {
            format!("{name} | {}", record.net.format("%A %H:%M UTC"))
        }
    }
}

fn page(title: &str, intro: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\
<html><head><meta charset='utf-8'><title>{title}</title>\
<style>\
body{{font-family:Arial,sans-serif;background:#0b1026;color:#e8ecff;padding:24px}}\
h1{{color:#ffd479}}h2{{margin-top:24px}}h3{{margin-bottom:4px}}\
.launch-card{{background:#18214a;border-radius:6px;padding:8px 12px;margin:4px 0}}\
.rocket-icon{{margin-right:6px}}\
</style></head>\
<body><h1>{title}</h1><p>{intro}</p>{content}</body></html>",
        title = escape(title),
        intro = escape(intro),
    )
}

/// Minimal HTML escaping for text nodes and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use launch_sync_core::MessageKind;

    fn launch(id: &str, name: &str, day: u32, hour: u32, status: &str) -> LaunchRecord {
        LaunchRecord::new(
            id,
            name,
            Utc.with_ymd_and_hms(2025, 3, day, hour, 30, 0).unwrap(),
            status,
        )
    }

    #[test]
    fn window_groups_by_weekday_monday_first() {
        // 16 March 2025 is a Sunday, 10 March a Monday.
        let html = render_window(&[
            launch("s", "Sunday Shot", 16, 8, "Go"),
            launch("m2", "Late Monday", 10, 20, "Go"),
            launch("m1", "Early Monday", 10, 6, "Go"),
        ]);

        let monday = html.find("<h3>Monday</h3>").unwrap();
        let sunday = html.find("<h3>Sunday</h3>").unwrap();
        assert!(monday < sunday);

        let early = html.find("Early Monday | 06:30 UTC").unwrap();
        let late = html.find("Late Monday | 20:30 UTC").unwrap();
        assert!(early < late && late < sunday);
    }

    #[test]
    fn empty_window_says_so() {
        assert!(render_window(&[]).contains("No launches"));
    }

    #[test]
    fn changes_follow_kind_order_and_line_rules() {
        let html = render_changes(&[
            ChangeEvent::new(ChangeKind::Postponed, launch("p", "Gone", 12, 9, "Go")),
            ChangeEvent::new(ChangeKind::StatusChanged, launch("s", "Held", 11, 9, "Hold")),
            ChangeEvent::new(ChangeKind::New, launch("n", "Fresh", 13, 9, "TBD")),
        ]);

        let new = html.find(ChangeKind::New.label()).unwrap();
        let status = html.find(ChangeKind::StatusChanged.label()).unwrap();
        let postponed = html.find(ChangeKind::Postponed.label()).unwrap();
        assert!(new < status && status < postponed);
        assert!(!html.contains(ChangeKind::Rescheduled.label()));

        assert!(html.contains("Fresh | Thursday 09:30 UTC</div>"));
        assert!(html.contains("Held | Tuesday 09:30 UTC | Hold</div>"));
        assert!(html.contains("</span> Gone</div>"));
    }

    #[test]
    fn feed_text_is_escaped() {
        let html = render_window(&[launch("x", "<script>alert('hi')</script>", 10, 1, "Go")]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;hi&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn message_subject_follows_kind() {
        let message = OutgoingMessage {
            kind: MessageKind::Welcome,
            recipients: vec!["a@example.com".into()],
            body: MessageBody::Window(vec![launch("a", "Alpha", 10, 1, "Go")]),
        };

        let mail = render_message(&message);
        assert_eq!(mail.subject, "Welcome! Upcoming Rocket Launches");
        assert!(mail.html.starts_with("<!DOCTYPE html>"));
        assert!(mail.html.contains("Alpha | 01:30 UTC"));
    }
}
