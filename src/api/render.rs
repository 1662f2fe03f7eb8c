//! Page Rendering
//!
//! Builds the single HTML page from the session's record. Every control is a
//! small form posting back to the server, which answers with a redirect to
//! `/` so the whole page is rendered again.

use chrono::{DateTime, Local};
use std::fmt::Write;

use crate::api::session::{Notice, NoticeLevel};
use crate::record::{Record, WaterPortion};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; }
button { width: 100%; border-radius: 10px; height: 3em; font-weight: bold; cursor: pointer; }
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.vitamin { display: grid; grid-template-columns: 3fr 1fr; gap: 1rem; align-items: center; }
.metric-label { color: #666; }
.metric-value { font-size: 3rem; }
progress { width: 100%; height: 1.2rem; margin: 1rem 0; }
.notice { padding: 0.75rem 1rem; border-radius: 8px; margin: 0.5rem 0; }
.notice.error { background: #fde2e2; }
.notice.warning { background: #fff4d6; }
.notice.info { background: #e3effd; }
.taken { background: #e0f5e6; padding: 0.5rem; border-radius: 8px; text-align: center; }
"#;

/// Everything one render needs
pub struct PageView<'a> {
    /// Session record; `None` renders the load warning only
    pub record: Option<&'a Record>,
    pub notices: &'a [Notice],
    /// Set when the store could not be opened at startup
    pub store_error: Option<&'a str>,
    pub now: DateTime<Local>,
}

/// Render the full page
pub fn page(view: &PageView<'_>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Kişisel Sağlık Asistanım 💧</h1>\n");

    if let Some(error) = view.store_error {
        notice(
            &mut body,
            NoticeLevel::Error,
            &format!("Veritabanı bağlantı bilgileri bulunamadı: {}", error),
        );
    }
    for n in view.notices {
        notice(&mut body, n.level, &n.message);
    }

    match view.record {
        Some(record) => {
            water_section(&mut body, record);
            vitamin_section(&mut body, record, &view.now);

            body.push_str("<hr>\n");
            form_button(&mut body, "/refresh", None, "🔄 Durumu Güncelle");
        }
        None => notice(
            &mut body,
            NoticeLevel::Warning,
            "Veriler yüklenemedi. Lütfen internet bağlantınızı kontrol edin.",
        ),
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"tr\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Sağlık Asistanım</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        STYLE, body
    )
}

fn water_section(out: &mut String, record: &Record) {
    out.push_str("<h2>Su Durumu</h2>\n<div class=\"columns\">\n");
    metric(out, "İçilen", &format!("{} ml", record.water_consumed_ml));
    metric(out, "Hedef", &format!("{} ml", record.water_target_ml));
    out.push_str("</div>\n");

    let _ = writeln!(
        out,
        "<progress max=\"1\" value=\"{:.3}\"></progress>",
        record.progress()
    );

    out.push_str("<div class=\"columns\">\n");
    for (portion, label) in [
        (WaterPortion::Glass, "+200 ml Ekle 💧"),
        (WaterPortion::Bottle, "+500 ml Ekle 🥤"),
    ] {
        form_button(out, "/water", Some(("amount", &portion.ml().to_string())), label);
    }
    out.push_str("</div>\n");
}

fn vitamin_section(out: &mut String, record: &Record, now: &DateTime<Local>) {
    out.push_str("<h2>Vitaminler 💊</h2>\n");

    if record.vitamins.is_empty() {
        notice(out, NoticeLevel::Info, "Henüz vitamin eklenmemiş.");
    }

    for (index, vitamin) in record.vitamins.iter().enumerate() {
        out.push_str("<div class=\"vitamin\">\n");
        let _ = writeln!(
            out,
            "<h3>{} ({})</h3>",
            escape(&vitamin.name),
            escape(&vitamin.scheduled_at)
        );

        if vitamin.is_taken_on(now) {
            out.push_str("<div class=\"taken\">Alındı ✅</div>\n");
        } else {
            form_button(out, &format!("/vitamins/{}/take", index), None, "Aldım");
        }
        out.push_str("</div>\n");
    }
}

fn metric(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        "<div><div class=\"metric-label\">{}</div><div class=\"metric-value\">{}</div></div>",
        escape(label),
        escape(value)
    );
}

fn form_button(out: &mut String, action: &str, field: Option<(&str, &str)>, label: &str) {
    let _ = write!(out, "<form method=\"post\" action=\"{}\">", escape(action));
    if let Some((name, value)) = field {
        let _ = write!(
            out,
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
            escape(name),
            escape(value)
        );
    }
    let _ = writeln!(out, "<button type=\"submit\">{}</button></form>", escape(label));
}

fn notice(out: &mut String, level: NoticeLevel, message: &str) {
    let class = match level {
        NoticeLevel::Error => "error",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Info => "info",
    };
    let _ = writeln!(out, "<div class=\"notice {}\">{}</div>", class, escape(message));
}

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
