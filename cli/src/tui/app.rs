use chrono::NaiveDate;
use ratatui::widgets::TableState;
use tracing::debug;
use uuid::Uuid;
use weightlog_core::model::record::format_weight;
use weightlog_core::photo;
use weightlog_core::{
    format_date, parse_human_date, ChartData, DateRange, Journal, LoadReport, LoadSource, Record,
    RecordForm, RecordRepository, Upsert,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
    Editing,
    Range,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Chart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

pub struct App<R: RecordRepository> {
    pub journal: Journal<R>,
    pub today: NaiveDate,
    pub range: DateRange,
    /// Set when the last range entered was rejected; the list is empty meanwhile.
    pub range_error: Option<String>,
    pub records: Vec<Record>,
    pub chart: ChartData,
    pub state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub view: View,
    pub status: Option<Status>,
    pub photo_info: Option<String>,
    editing: Option<Uuid>,
}

impl<R: RecordRepository> App<R> {
    pub fn new(journal: Journal<R>, report: &LoadReport, range: DateRange, today: NaiveDate) -> Self {
        let chart = journal.chart(&range);
        let mut app = App {
            journal,
            today,
            range,
            range_error: None,
            records: Vec::new(),
            chart,
            state: TableState::default(),
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            view: View::List,
            status: None,
            photo_info: None,
            editing: None,
        };
        app.status = load_status(report);
        app.reload(None);
        app
    }

    pub fn selected(&self) -> Option<&Record> {
        self.state.selected().and_then(|i| self.records.get(i))
    }

    pub fn next(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.records.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
        self.refresh_photo();
    }

    pub fn previous(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.records.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
        self.refresh_photo();
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            View::List => View::Chart,
            View::Chart => View::List,
        };
    }

    pub fn previous_period(&mut self) {
        self.shift_range(-self.range.num_days());
    }

    pub fn next_period(&mut self) {
        self.shift_range(self.range.num_days());
    }

    fn shift_range(&mut self, days: i64) {
        self.range = self.range.shifted(days);
        self.range_error = None;
        self.reload(None);
    }

    /// Re-read the visible records, keeping the selection on `keep` if it is
    /// still in range.
    fn reload(&mut self, keep: Option<Uuid>) {
        let keep = keep.or_else(|| self.selected().map(|r| r.id));
        if self.range_error.is_some() {
            self.records.clear();
            self.chart = ChartData::build(&[], &self.range);
        } else {
            self.records = self.journal.list(&self.range);
            self.chart = self.journal.chart(&self.range);
        }

        let index = keep
            .and_then(|id| self.records.iter().position(|r| r.id == id))
            .or_else(|| {
                let last = self.records.len().checked_sub(1)?;
                Some(self.state.selected().unwrap_or(0).min(last))
            });
        self.state.select(index);
        self.refresh_photo();
    }

    fn refresh_photo(&mut self) {
        self.photo_info = self.selected().map(photo_summary);
    }

    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Adding;
        self.set_input(String::new());
    }

    /// Prefill the input with the selected record's values.
    pub fn enter_edit_mode(&mut self) {
        let Some(record) = self.selected() else {
            return;
        };
        let id = record.id;
        let line = format!(
            "d:{} w:{} c:{}",
            format_date(record.date),
            format_weight(record.weight),
            record.calories
        );
        self.editing = Some(id);
        self.input_mode = InputMode::Editing;
        self.set_input(line);
    }

    pub fn enter_range_mode(&mut self) {
        let line = format!(
            "{} {}",
            format_date(self.range.start),
            format_date(self.range.end)
        );
        self.input_mode = InputMode::Range;
        self.set_input(line);
    }

    pub fn request_delete(&mut self) {
        if let Some(record) = self.selected() {
            let text = format!("Delete the entry for {}? (y/n)", format_date(record.date));
            self.input_mode = InputMode::ConfirmDelete;
            self.set_status(StatusKind::Warning, text);
        }
    }

    pub fn confirm_delete(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(id) = self.selected().map(|r| r.id) else {
            return;
        };
        match self.journal.delete(&id) {
            Ok(removed) => {
                let text = format!("Deleted the entry for {}.", format_date(removed.date));
                self.set_status(StatusKind::Info, text);
            }
            Err(e) => self.set_status(StatusKind::Error, save_failed(&e)),
        }
        self.reload(None);
    }

    pub fn cancel_delete(&mut self) {
        self.input_mode = InputMode::Normal;
        self.status = None;
    }

    /// Retry writing after a failed save.
    pub fn save(&mut self) {
        if !self.journal.is_dirty() {
            self.set_status(StatusKind::Info, "Nothing to save.");
            return;
        }
        match self.journal.persist() {
            Ok(()) => self.set_status(StatusKind::Info, "Saved."),
            Err(e) => self.set_status(StatusKind::Error, save_failed(&e)),
        }
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.editing = None;
    }

    fn set_input(&mut self, line: String) {
        self.cursor_position = line.chars().count();
        self.input = line;
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status {
            kind,
            text: text.into(),
        });
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor_position);
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.byte_index(self.cursor_position - 1);
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn byte_index(&self, chars: usize) -> usize {
        self.input.chars().take(chars).map(char::len_utf8).sum()
    }

    pub fn submit_input(&mut self) {
        let done = match self.input_mode {
            InputMode::Adding => self.submit_add(),
            InputMode::Editing => self.submit_edit(),
            InputMode::Range => self.submit_range(),
            InputMode::Normal | InputMode::ConfirmDelete => true,
        };
        // A rejected entry stays in the input so it can be corrected.
        if done {
            self.input.clear();
            self.cursor_position = 0;
            self.exit_input_mode();
        }
    }

    fn submit_add(&mut self) -> bool {
        if self.input.trim().is_empty() {
            return true;
        }
        let draft = match RecordForm::from_line(&self.input).and_then(|f| f.to_draft(self.today)) {
            Ok(draft) => draft,
            Err(e) => {
                self.set_status(StatusKind::Error, e.to_string());
                return false;
            }
        };
        let date = draft.date;
        let result = self.journal.submit(draft);
        let id = self.journal.find_by_date(date).map(|r| r.id);
        self.reload(id);
        match result {
            Ok(Upsert::Inserted) => self.set_status(StatusKind::Info, "Entry added successfully!"),
            Ok(Upsert::Replaced) => {
                self.set_status(StatusKind::Info, "Entry updated successfully!")
            }
            Err(e) => self.set_status(StatusKind::Error, save_failed(&e)),
        }
        true
    }

    fn submit_edit(&mut self) -> bool {
        let Some(id) = self.editing else {
            return true;
        };
        let Some(record) = self.journal.get(&id) else {
            return true;
        };
        let draft = match RecordForm::from_line(&self.input).and_then(|f| f.apply(record, self.today)) {
            Ok(draft) => draft,
            Err(e) => {
                self.set_status(StatusKind::Error, e.to_string());
                return false;
            }
        };
        match self.journal.edit(&id, draft) {
            Ok(()) => self.set_status(StatusKind::Info, "Entry updated successfully!"),
            Err(e @ weightlog_core::Error::DateConflict(_)) => {
                self.set_status(StatusKind::Error, e.to_string());
                return false;
            }
            Err(e) => self.set_status(StatusKind::Error, save_failed(&e)),
        }
        self.reload(Some(id));
        true
    }

    /// `start end`, either date in any accepted input format.
    fn submit_range(&mut self) -> bool {
        let tokens: Vec<&str> = self.input.split_whitespace().collect();
        let [start, end] = tokens.as_slice() else {
            self.set_status(StatusKind::Error, "Enter a start and an end date.");
            return false;
        };
        let parsed = parse_human_date(start, self.today)
            .and_then(|s| Ok((s, parse_human_date(end, self.today)?)));
        let (start, end) = match parsed {
            Ok(dates) => dates,
            Err(e) => {
                self.set_status(StatusKind::Error, e.to_string());
                return false;
            }
        };

        match DateRange::new(start, end) {
            Ok(range) => {
                self.range = range;
                self.range_error = None;
                self.status = None;
            }
            Err(e) => {
                debug!(%start, %end, "rejected range");
                self.range_error = Some(e.to_string());
                self.set_status(StatusKind::Error, e.to_string());
            }
        }
        self.reload(None);
        true
    }
}

fn load_status(report: &LoadReport) -> Option<Status> {
    let migrated = report.source == LoadSource::MigratedFromLegacy;
    let skipped = report.skipped.len();
    let text = match (migrated, skipped) {
        (false, 0) => return None,
        (true, 0) => "Migrated entries from the legacy JSON file.".to_string(),
        (true, n) => format!("Migrated the legacy JSON file; skipped {n} unreadable entries."),
        (false, n) => format!("Skipped {n} unreadable entries, see the log for details."),
    };
    let kind = if skipped > 0 {
        StatusKind::Warning
    } else {
        StatusKind::Info
    };
    Some(Status { kind, text })
}

fn save_failed(e: &weightlog_core::Error) -> String {
    format!("Save failed, press s to retry: {}", e)
}

/// One-line description of a record's photo for the detail panel.
fn photo_summary(record: &Record) -> String {
    let Some(path) = &record.picture_path else {
        return "No picture attached.".to_string();
    };
    match photo::inspect(path) {
        Ok(None) => "Image file not found.".to_string(),
        Ok(Some(info)) => {
            let format = info
                .format
                .map(|f| format!("{:?}", f))
                .unwrap_or_else(|| "Unknown".to_string());
            match info.dimensions {
                Some((w, h)) => format!("{} {}x{}, {} bytes", format, w, h, info.size),
                None => format!("{}, {} bytes", format, info.size),
            }
        }
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use weightlog_core::FileRecordRepository;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app_in(tmp: &TempDir) -> App<FileRecordRepository> {
        let repo = FileRecordRepository::with_paths(
            tmp.path().join("weight_data.csv"),
            tmp.path().join("weight_data.json"),
        );
        let (journal, report) = Journal::open(repo).unwrap();
        let today = date(2024, 3, 10);
        App::new(journal, &report, DateRange::last_days(today, 7), today)
    }

    fn type_line(app: &mut App<FileRecordRepository>, line: &str) {
        for c in line.chars() {
            app.input_char(c);
        }
        app.submit_input();
    }

    #[test]
    fn test_add_resets_form_and_reports_upsert() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);

        app.enter_add_mode();
        type_line(&mut app, "70.5 2000 photo:/tmp/me.jpg");
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.input.is_empty());
        assert_eq!(app.records.len(), 1);
        assert_eq!(app.status.as_ref().unwrap().text, "Entry added successfully!");

        app.enter_add_mode();
        type_line(&mut app, "70 1900");
        assert_eq!(app.records.len(), 1);
        assert_eq!(app.records[0].picture_path, None);
        assert_eq!(app.status.as_ref().unwrap().text, "Entry updated successfully!");
    }

    #[test]
    fn test_invalid_input_keeps_text_and_state() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);

        app.enter_add_mode();
        type_line(&mut app, "heavy 2000");
        assert_eq!(app.input_mode, InputMode::Adding);
        assert_eq!(app.input, "heavy 2000");
        assert!(app.records.is_empty());
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn test_edit_onto_taken_date_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.enter_add_mode();
        type_line(&mut app, "70 2000 d:2024-03-08");
        app.enter_add_mode();
        type_line(&mut app, "71 2100 d:2024-03-09");

        // newest first, so the 9th is selected after the second add
        assert_eq!(app.selected().unwrap().date, date(2024, 3, 9));
        app.enter_edit_mode();
        assert_eq!(app.input, "d:2024-03-09 w:71.0 c:2100");

        app.set_input("d:2024-03-08".to_string());
        app.submit_input();
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Error);
        assert!(app.journal.find_by_date(date(2024, 3, 9)).is_some());
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.enter_add_mode();
        type_line(&mut app, "70 2000");

        app.request_delete();
        assert_eq!(app.input_mode, InputMode::ConfirmDelete);
        app.cancel_delete();
        assert_eq!(app.records.len(), 1);

        app.request_delete();
        app.confirm_delete();
        assert!(app.records.is_empty());
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_reversed_range_empties_list_with_message() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.enter_add_mode();
        type_line(&mut app, "70 2000");

        app.enter_range_mode();
        app.set_input("2024-03-10 2024-03-01".to_string());
        app.submit_input();
        assert!(app.range_error.is_some());
        assert!(app.records.is_empty());
        assert!(app.chart.is_empty());

        app.enter_range_mode();
        app.set_input("2024-03-01 today".to_string());
        app.submit_input();
        assert!(app.range_error.is_none());
        assert_eq!(app.records.len(), 1);
    }

    #[test]
    fn test_period_navigation_slides_by_range_length() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(&tmp);
        app.previous_period();
        assert_eq!(app.range.start, date(2024, 2, 24));
        assert_eq!(app.range.end, date(2024, 3, 2));
        app.next_period();
        assert_eq!(app.range.end, date(2024, 3, 10));
    }

    #[test]
    fn test_photo_summary_for_missing_file() {
        let tmp = TempDir::new().unwrap();
        let record = Record::new(date(2024, 1, 1), 70.0, 2000, Some(tmp.path().join("x.png")));
        assert_eq!(photo_summary(&record), "Image file not found.");
        let bare = Record::new(date(2024, 1, 1), 70.0, 2000, None);
        assert_eq!(photo_summary(&bare), "No picture attached.");

        let text = tmp.path().join("notes.txt");
        std::fs::write(&text, "hello").unwrap();
        let unknown = Record::new(date(2024, 1, 1), 70.0, 2000, Some(text));
        assert_eq!(photo_summary(&unknown), "Unknown, 5 bytes");
    }
}
