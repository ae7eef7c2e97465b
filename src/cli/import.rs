//! Import wizard CLI commands
//!
//! Each invocation resumes the saved draft, applies one command and saves it
//! again, so the wizard can be driven one step at a time from a shell.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;

use crate::api::ImportApi;
use crate::audit::ImportEvent;
use crate::config::Settings;
use crate::display::{
    format_candidates, format_history, format_row_details, format_row_table, format_status,
};
use crate::error::{ImportError, ImportResult};
use crate::export::{export, ExportFormat};
use crate::models::{Money, RowId};
use crate::services::ImportSession;
use crate::storage::{Catalog, Storage};
use crate::wizard::{RowEdit, WizardStep};

/// Import wizard subcommands
#[derive(Subcommand)]
pub enum ImportCommands {
    /// Start a new import with the given statement files
    Start {
        /// Statement files (CSV, OFX, ...)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Add statement files to the current import
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove a statement file from the current import
    Remove {
        /// File name as shown by `status`
        file: String,
    },
    /// Map a statement file to an account
    Map {
        /// File name as shown by `status`
        file: String,
        /// Account name or ID
        account: String,
    },
    /// Go to the next step (entering Parse uploads the files)
    #[command(alias = "advance")]
    Next,
    /// Go to the previous step
    Back,
    /// Upload the files for parsing again
    Parse,
    /// Ask for category and subscription suggestions
    Suggest,
    /// Show the current step, files and summary
    Status,
    /// Show the audit rows, or one row in detail
    Show {
        /// Row position or ID
        row: Option<String>,
        /// Include deleted rows
        #[arg(short, long)]
        all: bool,
    },
    /// Edit a row
    Edit {
        /// Row position or ID
        row: String,
        /// Account name or ID
        #[arg(long)]
        account: Option<String>,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// Amount (e.g., "-12.50"; negative for expenses)
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Category name or ID; "none" clears it
        #[arg(short, long)]
        category: Option<String>,
        /// Subscription name or ID; "none" clears it
        #[arg(short, long)]
        subscription: Option<String>,
        /// Mark as a tax event
        #[arg(long, conflicts_with = "no_tax_event")]
        tax_event: bool,
        #[arg(long)]
        no_tax_event: bool,
        /// Don't post this row
        #[arg(long, conflicts_with = "keep")]
        delete: bool,
        /// Post this row again after --delete
        #[arg(long)]
        keep: bool,
    },
    /// Split a row into parts that sum to its amount
    Split {
        /// Row position or ID
        row: String,
        /// Part amounts (at least two)
        #[arg(required = true, num_args = 2.., allow_hyphen_values = true)]
        parts: Vec<String>,
    },
    /// Merge split parts back into their row
    Unsplit {
        /// Row position or ID of the split row or one of its parts
        row: String,
    },
    /// List rows that can reimburse an expense
    Candidates {
        /// Expense row position or ID
        row: String,
    },
    /// Link reimbursement rows to an expense, replacing earlier links
    Link {
        /// Expense row position or ID
        source: String,
        /// Reimbursement rows
        #[arg(required = true)]
        rows: Vec<String>,
    },
    /// Unlink reimbursement rows (all of them when none are given)
    Unlink {
        /// Expense row position or ID
        source: String,
        rows: Vec<String>,
    },
    /// Post the audited rows
    Commit {
        /// Print the payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Export the audited rows
    Export {
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Discard the current import
    Reset,
    /// Show recent import activity
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Only show commit attempts
        #[arg(long)]
        commits: bool,
    },
}

/// Handle an import command
pub fn handle_import_command<A: ImportApi + ?Sized>(
    storage: &Storage,
    api: &A,
    settings: &Settings,
    cmd: ImportCommands,
) -> ImportResult<()> {
    let mut session = ImportSession::open(storage, api, settings)?;

    match cmd {
        ImportCommands::Start { files } => {
            let count = session.start(&files)?;
            println!("Started a new import with {} file(s).", count);
            println!("Run 'ledger-import next' to map accounts.");
        }

        ImportCommands::Add { files } => {
            for path in files {
                let file = session.add_file(&path)?;
                println!("Added: {} ({} bytes)", file.name, file.size);
            }
        }

        ImportCommands::Remove { file } => {
            session.remove_file(&file)?;
            println!("Removed: {}", file);
        }

        ImportCommands::Map { file, account } => {
            session.map_account(&file, &account)?;
            let catalog = session.catalog()?;
            print!("{}", format_status(session.wizard(), &catalog));
        }

        ImportCommands::Next => {
            let step = session.advance()?;
            print_step_result(&session, step)?;
        }

        ImportCommands::Back => {
            let step = session.back()?;
            println!("Back to step {}: {}", step.number(), step);
        }

        ImportCommands::Parse => {
            let outcome = session.parse()?;
            println!(
                "Parsed {} row(s), {} file error(s).",
                outcome.rows, outcome.file_errors
            );
            if let Some(report) = outcome.suggestions {
                println!("Suggestions applied to {} field(s).", report.applied);
            }
            print_step_result(&session, outcome.step)?;
        }

        ImportCommands::Suggest => {
            let report = session.request_suggestions()?;
            println!(
                "Suggestions: {} applied, {} kept your edits, {} skipped (tax event or deleted).",
                report.applied, report.skipped_dirty, report.skipped_flagged
            );
        }

        ImportCommands::Status => {
            let catalog = session.catalog()?;
            print!("{}", format_status(session.wizard(), &catalog));
        }

        ImportCommands::Show { row, all } => {
            let catalog = session.catalog()?;
            let wizard = session.wizard();
            let form = wizard
                .form()
                .ok_or_else(|| ImportError::Step("parse the files first".into()))?;
            match row {
                Some(query) => {
                    let id = session.resolve_row(&query)?;
                    print!(
                        "{}",
                        format_row_details(form.row(id)?, wizard.reimbursements(), &catalog)
                    );
                }
                None => println!(
                    "{}",
                    format_row_table(form, wizard.reimbursements(), &catalog, all)
                ),
            }
        }

        ImportCommands::Edit {
            row,
            account,
            date,
            amount,
            description,
            category,
            subscription,
            tax_event,
            no_tax_event,
            delete,
            keep,
        } => {
            let id = session.resolve_row(&row)?;
            let catalog = session.catalog()?;

            let mut edits = Vec::new();
            if let Some(account) = account {
                edits.push(RowEdit::Account(catalog.resolve_account(&account)?));
            }
            if let Some(date) = date {
                edits.push(RowEdit::Date(parse_date(&date, settings)?));
            }
            if let Some(amount) = amount {
                edits.push(RowEdit::Amount(parse_amount(&amount)?));
            }
            if let Some(description) = description {
                edits.push(RowEdit::Description(description));
            }
            if let Some(category) = category {
                let id = if is_clear(&category) {
                    None
                } else {
                    Some(catalog.resolve_category(&category)?)
                };
                edits.push(RowEdit::Category(id));
            }
            if let Some(subscription) = subscription {
                let id = if is_clear(&subscription) {
                    None
                } else {
                    Some(catalog.resolve_subscription(&subscription)?)
                };
                edits.push(RowEdit::Subscription(id));
            }
            if tax_event || no_tax_event {
                edits.push(RowEdit::TaxEvent(tax_event));
            }
            if delete || keep {
                edits.push(RowEdit::Delete(delete));
            }

            if edits.is_empty() {
                println!("No changes specified. Use --help to see the editable fields.");
                return Ok(());
            }

            session.edit(id, edits)?;
            let wizard = session.wizard();
            if let Some(form) = wizard.form() {
                print!(
                    "{}",
                    format_row_details(form.row(id)?, wizard.reimbursements(), &catalog)
                );
            }
        }

        ImportCommands::Split { row, parts } => {
            let id = session.resolve_row(&row)?;
            let amounts = parts
                .iter()
                .map(|p| parse_amount(p))
                .collect::<ImportResult<Vec<_>>>()?;
            let ids = session.split(id, &amounts)?;
            println!("Split {} into {} part(s):", id, ids.len());
            for (part, amount) in ids.iter().zip(&amounts) {
                println!("  {}  {}", part, amount);
            }
        }

        ImportCommands::Unsplit { row } => {
            let id = session.resolve_row(&row)?;
            let removed = session.unsplit(id)?;
            println!("Removed {} split part(s).", removed);
        }

        ImportCommands::Candidates { row } => {
            let id = session.resolve_row(&row)?;
            let wizard = session.wizard();
            let candidates = wizard.candidates(id)?;
            let form = wizard
                .form()
                .ok_or_else(|| ImportError::Step("parse the files first".into()))?;
            println!(
                "{}",
                format_candidates(form.row(id)?, &candidates, wizard.reimbursements())
            );
        }

        ImportCommands::Link { source, rows } => {
            let source = session.resolve_row(&source)?;
            let selection = resolve_rows(&session, &rows)?;
            let amount = session.link(source, &selection)?;
            println!(
                "Linked {} reimbursement(s) to {}; expense is now {}",
                selection.len(),
                source,
                amount.format_with_symbol(&settings.currency_symbol)
            );
        }

        ImportCommands::Unlink { source, rows } => {
            let source = session.resolve_row(&source)?;
            let rows = resolve_rows(&session, &rows)?;
            let amount = session.unlink(source, &rows)?;
            println!(
                "Unlinked; expense {} is now {}",
                source,
                amount.format_with_symbol(&settings.currency_symbol)
            );
        }

        ImportCommands::Commit { dry_run } => {
            if dry_run {
                let payload = session.wizard().payload()?;
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }
            let response = session.commit()?;
            println!("Import committed.");
            println!("  Created: {}", response.created);
            println!("  Skipped: {}", response.skipped);
            println!("  Removed: {}", response.removed);
        }

        ImportCommands::Export { format, output } => {
            let catalog = session.catalog()?;
            let count = match output {
                Some(path) => {
                    let file = File::create(&path).map_err(|e| {
                        ImportError::Export(format!("Failed to create {}: {}", path.display(), e))
                    })?;
                    let mut writer = BufWriter::new(file);
                    let count = write_export(format, &session, &catalog, &mut writer)?;
                    writer.flush()?;
                    eprintln!("Exported {} row(s) to {}", count, path.display());
                    count
                }
                None => {
                    let stdout = io::stdout();
                    let mut writer = stdout.lock();
                    write_export(format, &session, &catalog, &mut writer)?
                }
            };
            tracing::debug!(count, format = format.extension(), "exported rows");
        }

        ImportCommands::Reset => {
            session.reset()?;
            println!("Import discarded.");
        }

        ImportCommands::History { limit, commits } => {
            let entries = if commits {
                storage
                    .audit()
                    .read_events(&[ImportEvent::Committed, ImportEvent::CommitFailed], limit)?
            } else {
                storage.audit().read_recent(limit)?
            };
            println!("{}", format_history(&entries));
        }
    }

    Ok(())
}

fn print_step_result<A: ImportApi + ?Sized>(
    session: &ImportSession<'_, A>,
    step: WizardStep,
) -> ImportResult<()> {
    let catalog = session.catalog()?;
    print!("{}", format_status(session.wizard(), &catalog));
    if step == WizardStep::Audit {
        println!("Run 'ledger-import show' to review the rows.");
    }
    Ok(())
}

fn write_export<A: ImportApi + ?Sized, W: Write>(
    format: ExportFormat,
    session: &ImportSession<'_, A>,
    catalog: &Catalog,
    writer: &mut W,
) -> ImportResult<usize> {
    export(format, session.wizard(), catalog, writer)
}

fn resolve_rows<A: ImportApi + ?Sized>(
    session: &ImportSession<'_, A>,
    queries: &[String],
) -> ImportResult<Vec<RowId>> {
    queries.iter().map(|q| session.resolve_row(q)).collect()
}

fn is_clear(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("none")
}

fn parse_amount(value: &str) -> ImportResult<Money> {
    Money::parse(value).map_err(|e| {
        ImportError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '-12.50'. Error: {}",
            value, e
        ))
    })
}

fn parse_date(value: &str, settings: &Settings) -> ImportResult<NaiveDate> {
    NaiveDate::parse_from_str(value, &settings.date_format)
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| {
            ImportError::Validation(format!(
                "Invalid date: '{}'. Use {} or YYYY-MM-DD",
                value, settings.date_format
            ))
        })
}
