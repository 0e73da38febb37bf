//! Interactive prompts for the pieces a run is missing.
//!
//! A [`PromptSession`] owns a reader/writer pair, so every menu, picker, and
//! confirmation is scriptable from tests with byte buffers; the binary hands
//! in locked stdin and stdout. Typing `exit` (or closing the input) at any
//! prompt unwinds the whole flow: [`PromptSession::read_reply`] is the only
//! place the sentinel is checked, and every prompt returns `Ok(None)` once it
//! fires.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use crate::accounts::{Account, AccountScope};
use crate::audit::AuditKind;
use crate::canonical::Scalar;
use crate::constants::cli::EXIT_SENTINEL;
use crate::dates::{parse_supported_date, DateRange, TimeSegment};
use crate::errors::ReportError;
use crate::output::{self, render_table, OutputMode};
use crate::pipeline::ReportTable;
use crate::reports::{ReportKind, ReportScope, Toggle};

const NUMBERED_OPTION_PROMPT: &str = "Choose a numbered option (1, 2, etc or 'exit' to exit): ";
const SINGLE_DATE_PROMPT: &str =
    "Enter the date (YYYY-MM-DD or YYYYMMDD) or press ENTER for today: ";
const INVALID_DATE_NOTICE: &str =
    "Invalid date format. Please use YYYY-MM-DD or YYYYMMDD (e.g., 2025-02-06 or 20250206).";

/// One interactive session over a reader/writer pair.
pub struct PromptSession<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptSession<R, W> {
    /// Wrap an input/output pair.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the session and hand back the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `prompt` and read one trimmed reply.
    ///
    /// Returns `None` when the user types the exit sentinel or the input
    /// reaches end of file; callers propagate that upward so the whole run
    /// stops cleanly.
    fn read_reply(&mut self, prompt: &str) -> Result<Option<String>, ReportError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        let bytes = self.input.read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        let reply = line.trim().to_string();
        if reply.eq_ignore_ascii_case(EXIT_SENTINEL) {
            writeln!(self.output, "Exiting the program.")?;
            return Ok(None);
        }
        Ok(Some(reply))
    }

    /// Main menu: pick a report scope.
    pub fn main_menu(&mut self) -> Result<Option<ReportScope>, ReportError> {
        loop {
            writeln!(self.output, "Main Menu - Select from the options below:\n")?;
            for (index, scope) in ReportScope::ALL.iter().enumerate() {
                writeln!(self.output, "{}. {}", index + 1, scope.title())?;
            }
            let Some(reply) = self.read_reply(NUMBERED_OPTION_PROMPT)? else {
                return Ok(None);
            };
            if let Some(index) = menu_choice(&reply, ReportScope::ALL.len()) {
                return Ok(Some(ReportScope::ALL[index]));
            }
            writeln!(
                self.output,
                "Invalid input, please select one of the indicated numbered options."
            )?;
        }
    }

    /// Performance menu: pick a report kind.
    pub fn performance_menu(&mut self) -> Result<Option<ReportKind>, ReportError> {
        loop {
            writeln!(self.output, "Reporting Options:\n")?;
            for (index, kind) in ReportKind::ALL.iter().enumerate() {
                writeln!(self.output, "{}. {}", index + 1, kind.title())?;
            }
            writeln!(
                self.output,
                "Or type 'exit' at any prompt to quit immediately.\n"
            )?;
            let Some(reply) = self.read_reply(NUMBERED_OPTION_PROMPT)? else {
                return Ok(None);
            };
            if let Some(index) = menu_choice(&reply, ReportKind::ALL.len()) {
                return Ok(Some(ReportKind::ALL[index]));
            }
            writeln!(self.output, "Invalid option. Please try again.")?;
        }
    }

    /// Audit menu: pick a listing.
    pub fn audit_menu(&mut self) -> Result<Option<AuditKind>, ReportError> {
        loop {
            writeln!(self.output, "Auditing Options:\n")?;
            for (index, kind) in AuditKind::ALL.iter().enumerate() {
                writeln!(self.output, "{}. {}", index + 1, kind.title())?;
            }
            writeln!(
                self.output,
                "Or type 'exit' at any prompt to quit immediately.\n"
            )?;
            let Some(reply) = self.read_reply("Choose 1, 2, 3, etc ('exit' to exit): ")? else {
                return Ok(None);
            };
            if let Some(index) = menu_choice(&reply, AuditKind::ALL.len()) {
                return Ok(Some(AuditKind::ALL[index]));
            }
            writeln!(self.output, "Invalid option. Please try again.")?;
        }
    }

    /// Budget menu. One entry for now; confirms the selection.
    pub fn budget_menu(&mut self) -> Result<Option<()>, ReportError> {
        loop {
            writeln!(self.output, "Budget Report Options:\n")?;
            writeln!(self.output, "1. Budget Report")?;
            writeln!(
                self.output,
                "Or type 'exit' at any prompt to quit immediately.\n"
            )?;
            let Some(reply) = self.read_reply(NUMBERED_OPTION_PROMPT)? else {
                return Ok(None);
            };
            if reply == "1" {
                return Ok(Some(()));
            }
            writeln!(self.output, "Invalid option. Please try again.")?;
        }
    }

    /// Ask whether the run covers one account or all of them.
    pub fn account_scope_menu(&mut self) -> Result<Option<AccountScope>, ReportError> {
        loop {
            writeln!(
                self.output,
                "Generate a report for a single account or all accounts?\n\
                 1. Select a single account\n\
                 2. All accounts\n"
            )?;
            let Some(reply) = self.read_reply(NUMBERED_OPTION_PROMPT)? else {
                return Ok(None);
            };
            match reply.as_str() {
                "1" => return Ok(Some(AccountScope::Single)),
                "2" => return Ok(Some(AccountScope::All)),
                _ => writeln!(self.output, "Invalid selection. Please enter 1 or 2.")?,
            }
        }
    }

    /// Ask how the finished report should be delivered.
    pub fn output_menu(&mut self) -> Result<Option<OutputMode>, ReportError> {
        loop {
            writeln!(
                self.output,
                "Output handling options:\n\
                 1. Save to CSV\n\
                 2. Display table on screen\n\
                 3. Auto-display results without additional prompts\n"
            )?;
            let Some(reply) =
                self.read_reply("Choose a numbered option (1-3 or 'exit' to exit): ")?
            else {
                return Ok(None);
            };
            match reply.as_str() {
                "1" => return Ok(Some(OutputMode::Csv)),
                "2" => return Ok(Some(OutputMode::Table)),
                "3" => return Ok(Some(OutputMode::Auto)),
                _ => writeln!(self.output, "Invalid option. Please try again.")?,
            }
        }
    }

    /// Y/N question for one optional dimension block.
    pub fn toggle_prompt(&mut self, toggle: Toggle) -> Result<Option<bool>, ReportError> {
        let (subject, echo) = toggle_wording(toggle);
        let question =
            format!("\nWould you like a detailed report that includes {subject}? (Y)es or (N)o");
        let Some(enabled) = self.confirm(&question)? else {
            return Ok(None);
        };
        let negation = if enabled { "" } else { " NOT" };
        writeln!(self.output, "{echo} will{negation} be included in the report.")?;
        Ok(Some(enabled))
    }

    /// Pick an account from the directory, with confirmation.
    ///
    /// A one-entry directory short-circuits without prompting.
    pub fn pick_account<'a>(
        &mut self,
        accounts: &'a [Account],
    ) -> Result<Option<&'a Account>, ReportError> {
        if accounts.len() == 1 {
            let only = &accounts[0];
            writeln!(
                self.output,
                "\nOne account to process: {} / {}",
                only.name, only.id
            )?;
            return Ok(Some(only));
        }
        loop {
            writeln!(self.output, "{}", render_table(&account_table(accounts)))?;
            let Some(reply) = self.read_reply(
                "\nSelect an account by number (1, 2, 3, etc.) or enter 'exit' to quit: ",
            )?
            else {
                return Ok(None);
            };
            let Some(index) = menu_choice(&reply, accounts.len()) else {
                writeln!(self.output, "Invalid selection. Please try again.")?;
                continue;
            };
            let account = &accounts[index];
            writeln!(
                self.output,
                "\nSelected Account: {} / {}",
                account.name, account.id
            )?;
            let Some(answer) = self.read_reply("Is this correct? (Y/N): ")? else {
                return Ok(None);
            };
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(account)),
                "n" | "no" => continue,
                _ => writeln!(self.output, "Invalid input. Please enter 'Y' or 'N'.")?,
            }
        }
    }

    /// Prompt for the reporting window and segmentation.
    ///
    /// `force_single` skips the range option for reports that read one day at
    /// a time. An empty reply at a date prompt defaults to `today`.
    pub fn timerange(
        &mut self,
        today: NaiveDate,
        force_single: bool,
    ) -> Result<Option<(DateRange, TimeSegment)>, ReportError> {
        if force_single {
            writeln!(
                self.output,
                "The report you selected only accepts a single date for reporting."
            )?;
            let Some(day) = self.read_date(SINGLE_DATE_PROMPT, today)? else {
                return Ok(None);
            };
            return Ok(Some((DateRange::single(day), TimeSegment::Date)));
        }
        loop {
            writeln!(
                self.output,
                "Reporting time range:\n1. Specific date\n2. Range of dates\n"
            )?;
            let Some(reply) = self.read_reply("Enter 1 or 2: ")? else {
                return Ok(None);
            };
            match reply.as_str() {
                "1" => {
                    let Some(day) = self.read_date(SINGLE_DATE_PROMPT, today)? else {
                        return Ok(None);
                    };
                    writeln!(
                        self.output,
                        "Single date option selected, defaulting time segmentation to 'date'."
                    )?;
                    return Ok(Some((DateRange::single(day), TimeSegment::Date)));
                }
                "2" => {
                    let Some(range) = self.read_range(today)? else {
                        return Ok(None);
                    };
                    let Some(segment) = self.segmentation_menu()? else {
                        return Ok(None);
                    };
                    return Ok(Some((range, segment)));
                }
                _ => writeln!(self.output, "Invalid option, please enter 1 or 2.")?,
            }
        }
    }

    /// Hand fully assembled results to the user.
    pub fn deliver(
        &mut self,
        table: &ReportTable,
        mode: OutputMode,
        now: NaiveDateTime,
        csv_dir: &Path,
    ) -> Result<Option<()>, ReportError> {
        match mode {
            OutputMode::Csv => Ok(self.save_csv(table, now, csv_dir)?.map(|_| ())),
            OutputMode::Table => self.show_table(table, false),
            OutputMode::Auto => {
                if table.is_empty() {
                    writeln!(self.output, "No data to display.")?;
                    return Ok(Some(()));
                }
                self.show_table(table, true)
            }
        }
    }

    /// Write the table to a CSV file, prompting for the name.
    ///
    /// Blank input accepts the timestamped default; entered names are
    /// sanitized and fall back to the default when nothing survives.
    pub fn save_csv(
        &mut self,
        table: &ReportTable,
        now: NaiveDateTime,
        directory: &Path,
    ) -> Result<Option<PathBuf>, ReportError> {
        let default_name = output::default_csv_filename(now);
        writeln!(self.output, "Default file name: {default_name}")?;
        let Some(reply) = self.read_reply("Enter a file name (or leave blank for default): ")?
        else {
            return Ok(None);
        };
        let file_name = if reply.is_empty() {
            default_name
        } else {
            match output::sanitize_csv_filename(&reply) {
                Some(name) => name,
                None => {
                    writeln!(self.output, "Invalid file name entered. Using default instead.")?;
                    default_name
                }
            }
        };
        let path = directory.join(file_name);
        output::write_csv(table, &path)?;
        writeln!(self.output, "\nData saved to: {}\n", path.display())?;
        Ok(Some(path))
    }

    fn show_table(
        &mut self,
        table: &ReportTable,
        auto_view: bool,
    ) -> Result<Option<()>, ReportError> {
        if !auto_view {
            let Some(_) =
                self.read_reply("Report ready for viewing. Press ENTER to display results: ")?
            else {
                return Ok(None);
            };
        }
        writeln!(self.output, "{}", render_table(table))?;
        Ok(Some(()))
    }

    fn confirm(&mut self, question: &str) -> Result<Option<bool>, ReportError> {
        loop {
            writeln!(self.output, "{question}")?;
            let Some(reply) = self.read_reply("Please select Y or N: ")? else {
                return Ok(None);
            };
            match reply.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => writeln!(
                    self.output,
                    "Invalid input, please select one of the indicated options (Y/N)."
                )?,
            }
        }
    }

    fn read_date(
        &mut self,
        prompt: &str,
        today: NaiveDate,
    ) -> Result<Option<NaiveDate>, ReportError> {
        loop {
            let Some(reply) = self.read_reply(prompt)? else {
                return Ok(None);
            };
            if reply.is_empty() {
                writeln!(
                    self.output,
                    "No date entered. Defaulting to today's date: {today}"
                )?;
                return Ok(Some(today));
            }
            if let Ok(date) = parse_supported_date(&reply) {
                return Ok(Some(date));
            }
            writeln!(self.output, "{INVALID_DATE_NOTICE}")?;
        }
    }

    fn read_range(&mut self, today: NaiveDate) -> Result<Option<DateRange>, ReportError> {
        loop {
            let Some(start) = self.read_date("Start Date (YYYY-MM-DD or YYYYMMDD): ", today)?
            else {
                return Ok(None);
            };
            let Some(end) = self.read_date("End Date (YYYY-MM-DD or YYYYMMDD): ", today)? else {
                return Ok(None);
            };
            match DateRange::new(start, end) {
                Ok(range) => return Ok(Some(range)),
                Err(_) => writeln!(
                    self.output,
                    "Start date cannot be later than end date. Please re-enter."
                )?,
            }
        }
    }

    fn segmentation_menu(&mut self) -> Result<Option<TimeSegment>, ReportError> {
        const SEGMENTS: [TimeSegment; 5] = [
            TimeSegment::Date,
            TimeSegment::Week,
            TimeSegment::Month,
            TimeSegment::Quarter,
            TimeSegment::Year,
        ];
        loop {
            writeln!(
                self.output,
                "\nDate range segmentation:\n1. Day\n2. Week\n3. Month\n4. Quarter\n5. Year\n"
            )?;
            let Some(reply) =
                self.read_reply("Select from one of the above numbered options (1-5): ")?
            else {
                return Ok(None);
            };
            if let Some(index) = menu_choice(&reply, SEGMENTS.len()) {
                return Ok(Some(SEGMENTS[index]));
            }
            writeln!(self.output, "Invalid segmentation option, please choose 1-5.")?;
        }
    }
}

/// The account directory as a numbered picker table.
pub fn account_table(accounts: &[Account]) -> ReportTable {
    let headers = vec![
        "#".to_string(),
        "Account Name".to_string(),
        "Customer ID".to_string(),
    ];
    let rows = accounts
        .iter()
        .enumerate()
        .map(|(index, account)| {
            vec![
                Scalar::Int(index as i64 + 1),
                Scalar::Text(account.name.clone()),
                Scalar::Text(account.id.clone()),
            ]
        })
        .collect();
    ReportTable { headers, rows }
}

fn menu_choice(reply: &str, len: usize) -> Option<usize> {
    reply
        .parse::<usize>()
        .ok()
        .filter(|choice| (1..=len).contains(choice))
        .map(|choice| choice - 1)
}

fn toggle_wording(toggle: Toggle) -> (&'static str, &'static str) {
    match toggle {
        Toggle::CampaignInfo => ("campaign names and IDs", "Campaign names and IDs"),
        Toggle::ChannelType => ("channel types", "Channel types"),
        Toggle::AdGroupInfo => ("ad group names and IDs", "Ad group names and IDs"),
        Toggle::DeviceInfo => ("device types", "Device types"),
    }
}
