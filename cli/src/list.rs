use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use weightlog_core::model::record::format_weight;
use weightlog_core::{format_date, Record};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Calories")]
    calories: String,
    #[tabled(rename = "Photo")]
    photo: String,
}

impl EntryRow {
    fn from_record(record: &Record) -> Self {
        let photo = match &record.picture_path {
            None => "-".to_string(),
            Some(path) if path.exists() => path.display().to_string(),
            Some(path) => format!("{} (missing)", path.display()),
        };
        Self {
            date: format_date(record.date),
            weight: format!("{} kg", format_weight(record.weight)),
            calories: format!("{} cal", record.calories),
            photo,
        }
    }
}

/// Render records as a table, in the order given.
pub fn render_entries(records: &[Record]) -> String {
    let rows: Vec<EntryRow> = records.iter().map(EntryRow::from_record).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}

pub fn show_entries(records: &[Record]) {
    if records.is_empty() {
        println!("No entries to display.");
        return;
    }
    println!("{}", render_entries(records));
}
