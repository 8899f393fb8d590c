use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use pulldown_cmark::{html, CowStr, Event as MdEvent, Options, Parser, Tag};

pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    //
    // For more details see
    // https://github.com/rustwasm/console_error_panic_hook#readme
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

pub fn init_logging() {
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    wasm_logger::init(wasm_logger::Config::new(level));
}

/// Turns message text into markup that is safe to inject into the page.
pub trait MarkdownRenderer {
    fn render(&self, text: &str) -> String;
}

/// CommonMark with tables and strikethrough. Raw HTML in the source is
/// escaped and script links are neutralised.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommonMark;

impl MarkdownRenderer for CommonMark {
    fn render(&self, text: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);

        let parser = Parser::new_ext(text, options).map(|event| match event {
            MdEvent::SoftBreak => MdEvent::HardBreak,
            MdEvent::Html(raw) => MdEvent::Text(raw),
            MdEvent::Start(Tag::Link(kind, dest, title)) => {
                MdEvent::Start(Tag::Link(kind, safe_url(dest), title))
            }
            MdEvent::Start(Tag::Image(kind, dest, title)) => {
                MdEvent::Start(Tag::Image(kind, safe_url(dest), title))
            }
            _ => event,
        });

        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);
        html_output
    }
}

/// Fallback when markdown rendering is unavailable: escaped text, line
/// breaks preserved.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainText;

impl MarkdownRenderer for PlainText {
    fn render(&self, text: &str) -> String {
        let mut events = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if i > 0 {
                events.push(MdEvent::HardBreak);
            }
            events.push(MdEvent::Text(CowStr::from(line)));
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

fn safe_url(dest: CowStr<'_>) -> CowStr<'_> {
    let scheme = dest.trim_start().to_ascii_lowercase();
    if scheme.starts_with("javascript:") || scheme.starts_with("vbscript:") {
        CowStr::Borrowed("#")
    } else {
        dest
    }
}

/// Renders a byte count in the largest unit that keeps the value below
/// 1024, with at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Server timestamps are naive UTC (`2024-05-01T12:00:00.123456`); RFC 3339
/// is accepted as well.
pub fn parse_server_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn format_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-I:%M:%S %p").to_string()
}
