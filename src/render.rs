//! Text rendering of a [`FormSnapshot`] for the terminal front end.
//!
//! Rows are dot-aligned `KEY: ....... value` lines under dashed headers.
//! Colors come from the active [`Theme`] as 24-bit ANSI escapes; pass
//! `color: false` for plain text.

use crate::form::{Field, FormSnapshot};
use crate::theme::{Theme, ThemeColors};

const MIN_ROW_CHARS: usize = 40;
const RESULT_UNITS: [&str; 3] = ["anos", "meses", "dias"];

pub struct Renderer {
    theme: Theme,
    color: bool,
}

/// One line of the panel before painting.
enum Line {
    Header(String),
    Blank,
    Stat { key: String, dots: String, value: String },
    Error(String),
    Text(String),
}

// Utilities for building rows

pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.chars().count() + value.chars().count();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => format!("{} ", ".".repeat(n - 1)),
    };

    (key_part, dots, value.to_string())
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.chars().count());
    format!("{base}{}", "-".repeat(dash_count))
}

/// `#rrggbb` to an ANSI truecolor foreground escape.
fn ansi_fg(hex: &str) -> String {
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .unwrap_or(0)
    };
    format!("\x1b[38;2;{};{};{}m", channel(1), channel(3), channel(5))
}

const RESET: &str = "\x1b[0m";

impl Renderer {
    pub fn new(theme: Theme, color: bool) -> Self {
        Self { theme, color }
    }

    fn paint(&self, hex: &str, s: &str) -> String {
        if self.color && !s.is_empty() {
            format!("{}{s}{RESET}", ansi_fg(hex))
        } else {
            s.to_string()
        }
    }

    /// Render the whole form: fields with their errors, the root error, the
    /// clock, the result rows and the success sentence.
    pub fn render(&self, snapshot: &FormSnapshot) -> String {
        let clock = snapshot.clock.clock_label();
        let cells = snapshot.result_cells();

        let mut rows: Vec<(String, String)> = Field::ALL
            .iter()
            .map(|f| (f.label().to_string(), snapshot.values.get(*f).to_string()))
            .collect();
        rows.push(("Horário de Brasília".to_string(), clock.clone()));
        for (unit, cell) in RESULT_UNITS.into_iter().zip(&cells) {
            rows.push((unit.to_string(), cell.clone()));
        }

        let align_width = rows
            .iter()
            .map(|(k, v)| k.chars().count() + 2 + v.chars().count() + 1)
            .max()
            .unwrap_or(0)
            .max(MIN_ROW_CHARS);

        let stat = |key: &str, value: &str| {
            let (key, dots, value) = build_stat_row(key, value, align_width);
            Line::Stat { key, dots, value }
        };

        let mut lines = vec![Line::Header(build_header_line(
            "Calculadora de Idade",
            align_width,
        ))];
        for field in Field::ALL {
            lines.push(stat(field.label(), snapshot.values.get(field)));
            if let Some(message) = snapshot.error(field) {
                lines.push(Line::Error(format!("  {message}")));
            }
        }
        if let Some(message) = &snapshot.root_error {
            lines.push(Line::Blank);
            lines.push(Line::Error(message.clone()));
        }
        lines.push(Line::Blank);
        lines.push(stat("Horário de Brasília", clock.as_str()));
        lines.push(Line::Blank);
        lines.push(Line::Header(build_header_line("- Resultado", align_width)));
        for (unit, cell) in RESULT_UNITS.into_iter().zip(&cells) {
            lines.push(stat(unit, cell.as_str()));
        }
        if let Some(message) = &snapshot.success_message {
            lines.push(Line::Blank);
            lines.push(Line::Text(message.clone()));
        }

        let colors: ThemeColors = self.theme.colors();
        let mut out = String::new();
        for line in &lines {
            match line {
                Line::Blank => {}
                Line::Header(text) => out.push_str(&self.paint(colors.accent, text)),
                Line::Stat { key, dots, value } => {
                    out.push_str(&self.paint(colors.key, key));
                    out.push_str(&self.paint(colors.cc, dots));
                    out.push_str(&self.paint(colors.value, value));
                }
                Line::Error(text) => out.push_str(&self.paint(colors.error, text)),
                Line::Text(text) => out.push_str(&self.paint(colors.text, text)),
            }
            out.push('\n');
        }
        out
    }
}
