mod chart;
mod list;
mod logging;
mod tui;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use weightlog_core::model::record::format_weight;
use weightlog_core::photo::{self, PhotoView};
use weightlog_core::{
    format_date, parse_human_date, ChartData, Config, DateRange, Error, FileRecordRepository, Journal,
    LoadReport, LoadSource, RecordForm, RecordRepository, Upsert,
};

use crate::logging::{init_logging, Verbosity};

#[derive(Parser)]
#[command(name = "weightlog")]
#[command(about = "Track daily weight, calories and progress photos", long_about = None)]
struct Cli {
    /// Directory holding the data files (default: ~/.weightlog)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add or update the entry for a day (usage: add 72.5 2100 date:yesterday photo:~/me.jpg)
    Add {
        /// Weight and calories, then optional key:value fields
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Change the entry for a day (usage: edit 2024-01-02 w:71.8 date:2024-01-03 photo:none)
    Edit {
        /// Date of the entry to change
        date: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Delete the entry for a day
    Delete {
        date: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List entries in a date range, newest first
    List {
        #[arg(long, allow_hyphen_values = true)]
        from: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        to: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Plot weight and calories over a date range
    Chart {
        #[arg(long, allow_hyphen_values = true)]
        from: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        to: Option<String>,
        /// Save the chart as an image (format from the extension: png, jpg, bmp, gif, webp)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the photo attached to a day's entry
    Photo { date: String },
    /// List entries whose photo file exists
    Gallery,
    /// Open the Terminal User Interface
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.data_dir.clone())?;

    let use_tui = matches!(cli.command, None | Some(Commands::Tui));
    let log_path = config.log_path();
    init_logging(
        Verbosity::from_flags(cli.quiet, cli.verbose),
        use_tui.then_some(log_path.as_path()),
    );

    let repo = FileRecordRepository::from_config(&config);
    let (mut journal, report) = Journal::open(repo)?;
    let today = Local::now().date_naive();

    match cli.command {
        Some(Commands::Add { args }) => {
            print_load_report(&report);
            let draft = match RecordForm::parse(&args).and_then(|form| form.to_draft(today)) {
                Ok(draft) => draft,
                Err(e) => {
                    println!("Error: {}", e);
                    return Ok(());
                }
            };
            match journal.submit(draft) {
                Ok(Upsert::Inserted) => println!("Entry added successfully!"),
                Ok(Upsert::Replaced) => println!("Entry updated successfully!"),
                Err(e) => println!("Error: {}", e),
            }
        }
        Some(Commands::Edit { date, args }) => {
            print_load_report(&report);
            if let Err(e) = edit_entry(&mut journal, &date, &args, today) {
                println!("Error: {}", e);
            }
        }
        Some(Commands::Delete { date, yes }) => {
            print_load_report(&report);
            let date = match parse_human_date(&date, today) {
                Ok(d) => d,
                Err(e) => {
                    println!("Error: {}", e);
                    return Ok(());
                }
            };
            let Some(record) = journal.find_by_date(date) else {
                println!("Error: {}", Error::NoRecordOnDate(date));
                return Ok(());
            };
            let id = record.id;
            if !yes && !confirm(&format!("Delete the entry for {}?", format_date(date)))? {
                println!("Cancelled.");
                return Ok(());
            }
            match journal.delete(&id) {
                Ok(_) => println!("Entry deleted."),
                Err(e) => println!("Error: {}", e),
            }
        }
        Some(Commands::List { from, to, json }) => {
            if !json {
                print_load_report(&report);
            }
            let range = resolve_range(from.as_deref(), to.as_deref(), today, &config);
            let (body, error) = list_output(&journal, range, json)?;
            if let Some(error) = error {
                // keep stdout parseable in JSON mode
                if json {
                    eprintln!("{}", error);
                } else {
                    println!("{}", error);
                }
            }
            if !body.is_empty() {
                println!("{}", body);
            }
        }
        Some(Commands::Chart { from, to, output }) => {
            print_load_report(&report);
            let range = match resolve_range(from.as_deref(), to.as_deref(), today, &config) {
                Ok(range) => range,
                Err(e) => {
                    println!("Error: {}", e);
                    return Ok(());
                }
            };
            match output {
                Some(path) => {
                    export_chart(&journal.chart(&range), &path);
                }
                None => chart::run(&journal, range)?,
            }
        }
        Some(Commands::Photo { date }) => {
            print_load_report(&report);
            if let Err(e) = show_photo(&journal, &date, today) {
                println!("Error: {}", e);
            }
        }
        Some(Commands::Gallery) => {
            print_load_report(&report);
            let mut records: Vec<_> = photo::with_existing_photos(journal.records())
                .into_iter()
                .cloned()
                .collect();
            weightlog_core::sort_by_date_descending(&mut records);
            if records.is_empty() {
                println!("No entries with photos.");
            } else {
                list::show_entries(&records);
            }
        }
        Some(Commands::Tui) | None => {
            let range = DateRange::last_days(today, config.default_range_days);
            tui::run(journal, report, range, today)?;
        }
    }
    Ok(())
}

fn edit_entry<R: RecordRepository>(
    journal: &mut Journal<R>,
    date: &str,
    args: &[String],
    today: NaiveDate,
) -> weightlog_core::Result<()> {
    let date = parse_human_date(date, today)?;
    let record = journal
        .find_by_date(date)
        .ok_or(Error::NoRecordOnDate(date))?;
    let id = record.id;
    let draft = RecordForm::parse(args)?.apply(record, today)?;
    journal.edit(&id, draft)?;
    println!("Entry updated successfully!");
    Ok(())
}

fn show_photo<R: RecordRepository>(
    journal: &Journal<R>,
    date: &str,
    today: NaiveDate,
) -> weightlog_core::Result<()> {
    let date = parse_human_date(date, today)?;
    let record = journal
        .find_by_date(date)
        .ok_or(Error::NoRecordOnDate(date))?;

    println!(
        "{}  {} kg  {} cal",
        format_date(record.date),
        format_weight(record.weight),
        record.calories
    );
    let Some(path) = &record.picture_path else {
        println!("No picture attached.");
        return Ok(());
    };

    match photo::resolve(path)? {
        PhotoView::Missing(path) => println!("Image file not found: {}", path.display()),
        PhotoView::Found(photo) => {
            println!("Path:   {}", photo.path.display());
            let format = photo
                .format
                .map(|f| format!("{:?}", f))
                .unwrap_or_else(|| "unknown".to_string());
            println!("Format: {}", format);
            println!("Size:   {} bytes", photo.size());
            match photo.dimensions() {
                Ok((w, h)) => println!("Pixels: {}x{}", w, h),
                Err(e) => println!("Pixels: unavailable ({})", e),
            }
        }
    }
    Ok(())
}

/// Output of `list`: the stdout body and an error line, if any.
fn list_output<R: RecordRepository>(
    journal: &Journal<R>,
    range: weightlog_core::Result<DateRange>,
    json: bool,
) -> Result<(String, Option<String>)> {
    let records = match range {
        Ok(range) => journal.list(&range),
        Err(e) => {
            let body = if json { "[]".to_string() } else { String::new() };
            return Ok((body, Some(format!("Error: {}", e))));
        }
    };
    let body = if json {
        serde_json::to_string_pretty(&records)?
    } else if records.is_empty() {
        "No entries to display.".to_string()
    } else {
        list::render_entries(&records)
    };
    Ok((body, None))
}

/// Write the chart to `path`. Returns whether a file was written.
fn export_chart(data: &ChartData, path: &Path) -> bool {
    if data.is_empty() {
        println!("No data available for the selected date range.");
        return false;
    }
    match data.save_image(path) {
        Ok(()) => {
            println!("Chart has been saved to {} successfully.", path.display());
            true
        }
        Err(e) => {
            println!("Error: Failed to save chart: {}", e);
            false
        }
    }
}

/// `--to` defaults to today, `--from` to `default_range_days` before the end.
fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
    config: &Config,
) -> weightlog_core::Result<DateRange> {
    let end = match to {
        Some(raw) => parse_human_date(raw, today)?,
        None => today,
    };
    let start = match from {
        Some(raw) => parse_human_date(raw, today)?,
        None => DateRange::last_days(end, config.default_range_days).start,
    };
    DateRange::new(start, end)
}

fn print_load_report(report: &LoadReport) {
    if report.source == LoadSource::MigratedFromLegacy {
        println!("Migrated entries from the legacy JSON file.");
    }
    for skipped in &report.skipped {
        let position = match report.source {
            LoadSource::MigratedFromLegacy => format!("legacy entry {}", skipped.position),
            _ => format!("line {}", skipped.position),
        };
        println!("Warning: skipped {}: {}", position, skipped.error);
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use weightlog_core::Record;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_range_defaults_to_last_week() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(Some(tmp.path().to_path_buf())).unwrap();
        let today = date(2024, 3, 10);

        let range = resolve_range(None, None, today, &config).unwrap();
        assert_eq!(range.start, date(2024, 3, 3));
        assert_eq!(range.end, today);

        let range = resolve_range(Some("2024-03-01"), Some("-2d"), today, &config).unwrap();
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 8));
    }

    #[test]
    fn test_resolve_range_rejects_reversed_dates() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(Some(tmp.path().to_path_buf())).unwrap();
        let err = resolve_range(Some("2024-03-09"), Some("2024-03-01"), date(2024, 3, 10), &config)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn test_export_chart_writes_file_for_non_empty_range() {
        let tmp = TempDir::new().unwrap();
        let records = vec![
            Record::new(date(2024, 3, 4), 70.0, 2000, None),
            Record::new(date(2024, 3, 6), 69.4, 1850, None),
        ];
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 7)).unwrap();
        let path = tmp.path().join("chart.png");

        assert!(export_chart(&ChartData::build(&records, &range), &path));
        assert!(path.is_file());
    }

    #[test]
    fn test_export_chart_skips_empty_range_and_bad_format() {
        let tmp = TempDir::new().unwrap();
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 7)).unwrap();
        let empty = tmp.path().join("empty.png");
        assert!(!export_chart(&ChartData::build(&[], &range), &empty));
        assert!(!empty.exists());

        let records = vec![Record::new(date(2024, 3, 4), 70.0, 2000, None)];
        let pdf = tmp.path().join("chart.pdf");
        assert!(!export_chart(&ChartData::build(&records, &range), &pdf));
    }

    fn journal_in(tmp: &TempDir) -> Journal<FileRecordRepository> {
        let repo = FileRecordRepository::with_paths(
            tmp.path().join("weight_data.csv"),
            tmp.path().join("weight_data.json"),
        );
        let (journal, _) = Journal::open(repo).unwrap();
        journal
    }

    #[test]
    fn test_list_json_stays_parseable_on_range_error() {
        let tmp = TempDir::new().unwrap();
        let mut journal = journal_in(&tmp);
        journal
            .submit(weightlog_core::RecordDraft {
                date: date(2024, 3, 4),
                weight: 70.0,
                calories: 2000,
                picture_path: None,
            })
            .unwrap();

        let reversed = DateRange::new(date(2024, 3, 9), date(2024, 3, 1));
        let (body, error) = list_output(&journal, reversed, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, serde_json::json!([]));
        assert!(error.unwrap().starts_with("Error: "));

        let week = DateRange::new(date(2024, 3, 1), date(2024, 3, 7));
        let (body, error) = list_output(&journal, week, true).unwrap();
        assert!(error.is_none());
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed[0]["date"], "2024-03-04");
        assert_eq!(parsed[0]["calories"], 2000);
        assert!(parsed[0].get("id").is_none());
    }

    #[test]
    fn test_cli_parses_chart_output() {
        let cli = Cli::try_parse_from(["weightlog", "chart", "--from", "-2w", "-o", "out.png"]).unwrap();
        match cli.command {
            Some(Commands::Chart { from, output, .. }) => {
                assert_eq!(from.as_deref(), Some("-2w"));
                assert_eq!(output, Some(PathBuf::from("out.png")));
            }
            _ => panic!("expected chart"),
        }
    }

    #[test]
    fn test_cli_parses_add_with_hyphen_values() {
        let cli = Cli::try_parse_from(["weightlog", "add", "72.5", "2100", "d:-1d"]).unwrap();
        match cli.command {
            Some(Commands::Add { args }) => assert_eq!(args, vec!["72.5", "2100", "d:-1d"]),
            _ => panic!("expected add"),
        }
    }
}
