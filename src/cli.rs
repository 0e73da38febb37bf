//! Command-line entry point: argument parsing and run resolution.
//!
//! Every reporting detail can arrive as an argument or be resolved
//! interactively; passing any reporting argument switches the run into
//! non-interactive resolution, where missing toggles default to excluded and
//! the resolved configuration is echoed before execution. Prompts still
//! appear for details the arguments leave out (a single-account run without
//! an id, a missing date, a missing output preference).

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{error::ErrorKind, Parser};
use tracing::debug;

use crate::accounts::{self, Account, AccountScope};
use crate::audit::AuditKind;
use crate::constants::cli::{TOGGLE_EXCLUDE_VALUES, TOGGLE_INCLUDE_VALUES};
use crate::dates::{self, parse_supported_date, DateRange, TimeSegment};
use crate::errors::ReportError;
use crate::output::OutputMode;
use crate::pipeline::{self, ReportRequest};
use crate::prompt::{account_table, PromptSession};
use crate::reports::{ReportKind, ReportScope, Toggle, ToggleSet};
use crate::source::InMemorySource;

/// Toggle resolution order; also the order the configuration echo lists them.
const TOGGLE_RESOLUTION_ORDER: [Toggle; 4] = [
    Toggle::ChannelType,
    Toggle::CampaignInfo,
    Toggle::AdGroupInfo,
    Toggle::DeviceInfo,
];

#[derive(Debug, Parser)]
#[command(
    name = "adreport",
    disable_help_subcommand = true,
    about = "Google Ads reporting over local record snapshots",
    long_about = "Resolve a report from arguments or interactive menus, aggregate the matching \
                  records across one or every account, and deliver the table as CSV or aligned \
                  text.",
    after_help = "Passing any reporting argument switches the run into non-interactive \
                  resolution; prompts only appear for details the arguments leave out."
)]
struct Cli {
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON record snapshot the reports read from"
    )]
    records: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with = "manager",
        help = "JSON account directory mapping reference keys to [customer id, name] pairs"
    )]
    accounts: Option<PathBuf>,
    #[arg(
        long,
        value_name = "CUSTOMER_ID",
        help = "Manager account whose client listing supplies the directory"
    )]
    manager: Option<String>,
    #[arg(
        long,
        value_name = "SCOPE[:OPTION]",
        value_parser = parse_report_arg,
        help = "Report scope, optionally with an option (e.g. performance:arc)"
    )]
    report: Option<ReportArg>,
    #[arg(
        long = "report-option",
        value_name = "OPTION",
        value_parser = parse_option_arg,
        help = "Report option on its own (e.g. arc, labels, budget)"
    )]
    report_option: Option<ReportSelection>,
    #[arg(
        long,
        value_name = "SCOPE[:ID]",
        value_parser = parse_account_arg,
        help = "Account scope: single[:CUSTOMER_ID] or all"
    )]
    account: Option<AccountArg>,
    #[arg(
        long,
        value_name = "WHEN",
        help = "Reporting date(s): last30days, last_month, this_quarter, last_quarter, \
                specific:DATE, or range:START,END[,SEGMENT]"
    )]
    date: Option<String>,
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_output_arg,
        help = "Delivery mode: csv, table, or auto"
    )]
    output: Option<OutputMode>,
    #[arg(
        long = "campaign-info",
        value_name = "CHOICE",
        value_parser = parse_toggle_arg,
        help = "Include campaign id and name columns (include/exclude)"
    )]
    campaign_info: Option<bool>,
    #[arg(
        long = "channel-types",
        value_name = "CHOICE",
        value_parser = parse_toggle_arg,
        help = "Include the channel type column (include/exclude)"
    )]
    channel_types: Option<bool>,
    #[arg(
        long = "ad-group",
        value_name = "CHOICE",
        value_parser = parse_toggle_arg,
        help = "Include ad group and ad identity columns (include/exclude)"
    )]
    ad_group: Option<bool>,
    #[arg(
        long = "device",
        value_name = "CHOICE",
        value_parser = parse_toggle_arg,
        help = "Include the device column (include/exclude)"
    )]
    device: Option<bool>,
}

impl Cli {
    /// Any reporting argument present means non-interactive resolution.
    ///
    /// The data-source arguments do not count; they are required either way.
    fn is_cli_mode(&self) -> bool {
        self.report.is_some()
            || self.report_option.is_some()
            || self.date.is_some()
            || self.account.is_some()
            || self.output.is_some()
            || self.campaign_info.is_some()
            || self.channel_types.is_some()
            || self.ad_group.is_some()
            || self.device.is_some()
    }

    fn toggle_choice(&self, toggle: Toggle) -> Option<bool> {
        match toggle {
            Toggle::CampaignInfo => self.campaign_info,
            Toggle::ChannelType => self.channel_types,
            Toggle::AdGroupInfo => self.ad_group,
            Toggle::DeviceInfo => self.device,
        }
    }
}

/// Parsed `--report` value: a scope, optionally narrowed to one option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReportArg {
    scope: ReportScope,
    option: Option<ReportSelection>,
}

/// Parsed `--account` value.
#[derive(Clone, Debug, PartialEq, Eq)]
enum AccountArg {
    /// Every account in the directory.
    All,
    /// One account, optionally preselected by id (digits only).
    Single(Option<String>),
}

/// What a run resolves to: one performance kind, one audit listing, or the
/// budget placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReportSelection {
    Performance(ReportKind),
    Audit(AuditKind),
    Budget,
}

impl ReportSelection {
    fn scope(self) -> ReportScope {
        match self {
            ReportSelection::Performance(_) => ReportScope::Performance,
            ReportSelection::Audit(_) => ReportScope::Audit,
            ReportSelection::Budget => ReportScope::Budget,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ReportSelection::Performance(kind) => kind.label(),
            ReportSelection::Audit(kind) => kind.label(),
            ReportSelection::Budget => "budget",
        }
    }

    /// Resolve an option keyword or alias across every scope.
    fn from_alias(alias: &str) -> Option<ReportSelection> {
        if let Some(kind) = ReportKind::from_alias(alias) {
            return Some(ReportSelection::Performance(kind));
        }
        if let Some(kind) = AuditKind::from_alias(alias) {
            return Some(ReportSelection::Audit(kind));
        }
        if alias.trim().eq_ignore_ascii_case("budget") {
            return Some(ReportSelection::Budget);
        }
        None
    }
}

/// Run the reporter with `args` (binary name already stripped).
pub fn run<I>(args: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<Cli, _>(std::iter::once("adreport".to_string()).chain(args))?
    else {
        return Ok(());
    };

    let mut session = PromptSession::new(io::stdin().lock(), io::stdout());
    execute(cli, &mut session, Local::now().naive_local())?;
    Ok(())
}

/// Resolve the configuration, run the selected report, and deliver it.
///
/// Returns `Ok(())` both on success and when the user exits at a prompt.
fn execute<R: BufRead, W: Write>(
    cli: Cli,
    session: &mut PromptSession<R, W>,
    now: NaiveDateTime,
) -> Result<(), ReportError> {
    let cli_mode = cli.is_cli_mode();
    let preselected = preselected_option(&cli)?;

    if !cli_mode {
        println!("NOTE: Enter 'exit' at any prompt to exit this reporting tool.");
        println!("Retrieving account information...");
    }
    let source = InMemorySource::load(&cli.records)?;
    let accounts = load_accounts(&cli, &source)?;
    if !cli_mode {
        println!(
            "\nAccount information retrieved successfully!\nNumber of accounts found: {}\n",
            accounts.len()
        );
        let _ = session.deliver(
            &account_table(&accounts),
            OutputMode::Auto,
            now,
            Path::new("."),
        )?;
    }

    let selection = match preselected {
        Some(selection) => selection,
        None => {
            let scope = match cli.report.as_ref().map(|arg| arg.scope) {
                Some(scope) => scope,
                None => {
                    let Some(scope) = session.main_menu()? else {
                        return Ok(());
                    };
                    println!("\n{} selected.\n", scope.title());
                    scope
                }
            };
            match scope {
                ReportScope::Performance => {
                    let Some(kind) = session.performance_menu()? else {
                        return Ok(());
                    };
                    ReportSelection::Performance(kind)
                }
                ReportScope::Audit => {
                    let Some(kind) = session.audit_menu()? else {
                        return Ok(());
                    };
                    ReportSelection::Audit(kind)
                }
                ReportScope::Budget => {
                    let Some(()) = session.budget_menu()? else {
                        return Ok(());
                    };
                    ReportSelection::Budget
                }
            }
        }
    };
    debug!(report = selection.label(), cli_mode, "run resolved");

    match selection {
        ReportSelection::Performance(kind) => {
            run_performance(&cli, session, kind, &source, &accounts, cli_mode, now).map(|_| ())
        }
        ReportSelection::Audit(kind) => {
            run_audit(&cli, session, kind, &source, &accounts, cli_mode, now).map(|_| ())
        }
        ReportSelection::Budget => {
            println!("Budget reporting is still in development; nothing was run.");
            Ok(())
        }
    }
}

/// Option selected by arguments, if any.
///
/// `--report scope:option` and `--report-option` cannot both name an option,
/// and a bare `--report` scope must agree with `--report-option`.
fn preselected_option(cli: &Cli) -> Result<Option<ReportSelection>, ReportError> {
    if let Some(selection) = cli.report.as_ref().and_then(|arg| arg.option) {
        if cli.report_option.is_some() {
            return Err(ReportError::InvalidArgument(
                "use either --report scope:option or --report-option, not both".to_string(),
            ));
        }
        return Ok(Some(selection));
    }
    if let Some(selection) = cli.report_option {
        if let Some(arg) = &cli.report {
            if selection.scope() != arg.scope {
                return Err(ReportError::InvalidArgument(format!(
                    "Report option '{}' is not available under the '{}' scope.",
                    selection.label(),
                    arg.scope.label()
                )));
            }
        }
        return Ok(Some(selection));
    }
    Ok(None)
}

fn load_accounts(cli: &Cli, source: &InMemorySource) -> Result<Vec<Account>, ReportError> {
    if let Some(path) = &cli.accounts {
        return accounts::load_directory(path);
    }
    if let Some(manager) = &cli.manager {
        let directory = accounts::fetch_directory(source, manager)?;
        if directory.is_empty() {
            return Err(ReportError::Configuration(format!(
                "manager {manager} has no reportable client accounts"
            )));
        }
        return Ok(directory);
    }
    Err(ReportError::Configuration(
        "no account directory: pass --accounts <PATH> or --manager <CUSTOMER_ID>".to_string(),
    ))
}

fn run_performance<R: BufRead, W: Write>(
    cli: &Cli,
    session: &mut PromptSession<R, W>,
    kind: ReportKind,
    source: &InMemorySource,
    accounts: &[Account],
    cli_mode: bool,
    now: NaiveDateTime,
) -> Result<Option<()>, ReportError> {
    println!("{} selected...", kind.title());

    let mut toggles = ToggleSet::default();
    let mut ignored: Vec<&'static str> = Vec::new();
    for toggle in TOGGLE_RESOLUTION_ORDER {
        let provided = cli.toggle_choice(toggle);
        if !toggle.applies_to(kind) {
            if provided.is_some() {
                ignored.push(toggle.cli_option());
            }
            continue;
        }
        let enabled = match provided {
            Some(value) => value,
            None if cli_mode => false,
            None => {
                let Some(value) = session.toggle_prompt(toggle)? else {
                    return Ok(None);
                };
                value
            }
        };
        toggles.set(toggle, enabled);
    }
    if cli_mode && !ignored.is_empty() {
        ignored.sort_unstable();
        println!(
            "Note: The following toggle arguments are not applicable to this report option \
             and were ignored: {}",
            ignored.join(", ")
        );
    }

    let force_single = kind.single_day_only();
    let today = now.date();
    let dates = match cli.date.as_deref() {
        Some(raw) => parse_date_argument(raw, force_single, today)?,
        None => {
            let Some((range, segment)) = session.timerange(today, force_single)? else {
                return Ok(None);
            };
            DateChoice {
                label: if range.start == range.end {
                    "Specific date"
                } else {
                    "Date range"
                },
                range,
                segment,
            }
        }
    };

    let Some((scope, account)) = resolve_account(cli.account.as_ref(), session, accounts)? else {
        return Ok(None);
    };
    let Some(output) = resolve_output(cli.output, session)? else {
        return Ok(None);
    };

    if cli_mode {
        print_configuration_summary(
            ReportSelection::Performance(kind),
            Some(&dates),
            output,
            scope,
            account,
            &toggles,
        );
    }

    let request = ReportRequest {
        kind,
        range: dates.range,
        segment: dates.segment,
        toggles,
    };
    let started = Instant::now();
    let table = match account {
        Some(account) => pipeline::run_report(source, account, &request)?,
        None => {
            let (table, stats) = pipeline::run_report_all(source, accounts, &request)?;
            let skipped = stats.iter().filter(|entry| entry.error.is_some()).count();
            if skipped > 0 {
                debug!(skipped, "accounts skipped during fan-out");
            }
            table
        }
    };
    println!(
        "\nReport compiled - Execution time: {:.2} seconds\n",
        started.elapsed().as_secs_f64()
    );

    session.deliver(&table, output, now, Path::new("."))
}

fn run_audit<R: BufRead, W: Write>(
    cli: &Cli,
    session: &mut PromptSession<R, W>,
    kind: AuditKind,
    source: &InMemorySource,
    accounts: &[Account],
    cli_mode: bool,
    now: NaiveDateTime,
) -> Result<Option<()>, ReportError> {
    println!("{}", kind.headline());

    if matches!(cli.account, Some(AccountArg::All)) {
        return Err(ReportError::InvalidArgument(
            "audit listings run one account at a time; use --account single[:CUSTOMER_ID]"
                .to_string(),
        ));
    }
    // Listings never fan out, so a missing argument means the single flow.
    let fallback = AccountArg::Single(None);
    let arg = cli.account.as_ref().unwrap_or(&fallback);
    let Some((_, Some(account))) = resolve_account(Some(arg), session, accounts)? else {
        return Ok(None);
    };
    let Some(output) = resolve_output(cli.output, session)? else {
        return Ok(None);
    };

    if cli_mode {
        print_configuration_summary(
            ReportSelection::Audit(kind),
            None,
            output,
            AccountScope::Single,
            Some(account),
            &ToggleSet::default(),
        );
    }

    let started = Instant::now();
    let table = kind.run(source, &account.id)?;
    println!(
        "\nReport compiled - Execution time: {:.2} seconds\n",
        started.elapsed().as_secs_f64()
    );

    session.deliver(&table, output, now, Path::new("."))
}

/// Resolve the account scope and, for single runs, the account itself.
///
/// An id passed on the command line that is not in the directory falls back
/// to the interactive picker instead of failing the run.
fn resolve_account<'a, R: BufRead, W: Write>(
    arg: Option<&AccountArg>,
    session: &mut PromptSession<R, W>,
    accounts: &'a [Account],
) -> Result<Option<(AccountScope, Option<&'a Account>)>, ReportError> {
    match arg {
        Some(AccountArg::All) => Ok(Some((AccountScope::All, None))),
        Some(AccountArg::Single(Some(id))) => match accounts::find_by_id(accounts, id) {
            Some(account) => Ok(Some((AccountScope::Single, Some(account)))),
            None => {
                println!(
                    "Account ID {id} not found in accessible accounts. Prompting for selection."
                );
                let Some(account) = session.pick_account(accounts)? else {
                    return Ok(None);
                };
                Ok(Some((AccountScope::Single, Some(account))))
            }
        },
        Some(AccountArg::Single(None)) => {
            let Some(account) = session.pick_account(accounts)? else {
                return Ok(None);
            };
            Ok(Some((AccountScope::Single, Some(account))))
        }
        None => {
            let Some(scope) = session.account_scope_menu()? else {
                return Ok(None);
            };
            match scope {
                AccountScope::All => Ok(Some((AccountScope::All, None))),
                AccountScope::Single => {
                    let Some(account) = session.pick_account(accounts)? else {
                        return Ok(None);
                    };
                    Ok(Some((AccountScope::Single, Some(account))))
                }
            }
        }
    }
}

fn resolve_output<R: BufRead, W: Write>(
    arg: Option<OutputMode>,
    session: &mut PromptSession<R, W>,
) -> Result<Option<OutputMode>, ReportError> {
    match arg {
        Some(mode) => Ok(Some(mode)),
        None => session.output_menu(),
    }
}

/// Echo the fully resolved configuration (non-interactive runs only).
fn print_configuration_summary(
    selection: ReportSelection,
    dates: Option<&DateChoice>,
    output: OutputMode,
    scope: AccountScope,
    account: Option<&Account>,
    toggles: &ToggleSet,
) {
    println!("\nResolved configuration:");
    println!("  Report scope: {}", selection.scope().label());
    println!("  Report option: {}", selection.label());
    if let Some(dates) = dates {
        println!("  Date option: {}", dates.label);
        println!("  Start date: {}", dates.range.start);
        println!("  End date: {}", dates.range.end);
        println!("  Time segmentation: {}", dates.segment.label());
    }
    println!("  Output preference: {}", output.label());
    println!("  Account scope: {}", scope.label());
    if let (AccountScope::Single, Some(account)) = (scope, account) {
        println!("  Account ID: {}", account.id);
    }
    if let ReportSelection::Performance(kind) = selection {
        for toggle in TOGGLE_RESOLUTION_ORDER {
            if toggle.applies_to(kind) {
                println!("  {}: {}", summary_key(toggle), toggles.is_enabled(toggle));
            }
        }
    }
    println!();
}

fn summary_key(toggle: Toggle) -> &'static str {
    match toggle {
        Toggle::ChannelType => "include_channel_types",
        Toggle::CampaignInfo => "include_campaign_info",
        Toggle::AdGroupInfo => "include_adgroup_info",
        Toggle::DeviceInfo => "include_device_info",
    }
}

/// Resolved `--date` value plus the label the configuration echo prints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DateChoice {
    label: &'static str,
    range: DateRange,
    segment: TimeSegment,
}

/// Parse a `--date` argument.
///
/// Accepts the presets `last30days`, `last_month`, `this_quarter`, and
/// `last_quarter`, plus `specific:DATE`, `range:START,END[,SEGMENT]` (also
/// with `=` in place of the first `:`), and a bare date. Anything else is
/// tried as a date so unknown prefixes fail with the date error rather than
/// a prefix error.
fn parse_date_argument(
    raw: &str,
    force_single: bool,
    today: NaiveDate,
) -> Result<DateChoice, ReportError> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "last30" | "last30days" | "last_30" | "last_30_days" => {
            let (range, segment) = dates::last_30_days(today);
            return Ok(DateChoice {
                label: "Date range",
                range,
                segment,
            });
        }
        "last_month" | "lastcalendar" | "last_calendar_month" => {
            let (range, segment) = dates::last_calendar_month(today)?;
            return Ok(DateChoice {
                label: "Last calendar month",
                range,
                segment,
            });
        }
        "this_quarter" | "quarter_to_date" => {
            let (range, segment) = dates::current_quarter_to_date(today)?;
            return Ok(DateChoice {
                label: "Current quarter to date",
                range,
                segment,
            });
        }
        "last_quarter" | "previous_quarter" => {
            let (range, segment) = dates::previous_calendar_quarter(today)?;
            return Ok(DateChoice {
                label: "Previous calendar quarter",
                range,
                segment,
            });
        }
        _ => {}
    }

    let (prefix, remainder) = if let Some((prefix, remainder)) = trimmed.split_once(':') {
        (prefix, remainder)
    } else if let Some((prefix, remainder)) = trimmed.split_once('=') {
        (prefix, remainder)
    } else {
        ("specific", trimmed)
    };
    let prefix = prefix.trim().to_ascii_lowercase();
    let remainder = remainder.trim();

    match prefix.as_str() {
        "specific" | "single" => Ok(specific_date(parse_supported_date(remainder)?)),
        "range" => {
            if force_single {
                return Err(ReportError::InvalidArgument(
                    "The selected report only accepts a single date.".to_string(),
                ));
            }
            let parts: Vec<&str> = remainder
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            if parts.len() < 2 {
                return Err(ReportError::InvalidArgument(
                    "Date range arguments must include start and end dates separated by commas."
                        .to_string(),
                ));
            }
            let start = parse_supported_date(parts[0])?;
            let end = parse_supported_date(parts[1])?;
            let range = DateRange::new(start, end).map_err(|_| {
                ReportError::InvalidArgument(
                    "Start date cannot be later than end date.".to_string(),
                )
            })?;
            let segment = match parts.get(2) {
                Some(alias) => TimeSegment::from_alias(alias).ok_or_else(|| {
                    ReportError::InvalidArgument(format!("Unknown time segmentation: {alias}"))
                })?,
                None => TimeSegment::Date,
            };
            Ok(DateChoice {
                label: "Date range",
                range,
                segment,
            })
        }
        _ => {
            let source = if remainder.is_empty() { trimmed } else { remainder };
            Ok(specific_date(parse_supported_date(source)?))
        }
    }
}

fn specific_date(day: NaiveDate) -> DateChoice {
    DateChoice {
        label: "Specific date",
        range: DateRange::single(day),
        segment: TimeSegment::Date,
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_report_arg(raw: &str) -> Result<ReportArg, String> {
    let (scope_raw, option_raw) = match raw.split_once(':') {
        Some((scope, option)) => (scope, Some(option)),
        None => (raw, None),
    };
    let scope = ReportScope::from_alias(scope_raw)
        .ok_or_else(|| format!("Unknown report scope: {}", scope_raw.trim()))?;
    let option = match option_raw {
        Some(option_raw) => {
            let selection = ReportSelection::from_alias(option_raw)
                .ok_or_else(|| format!("Unknown report option: {}", option_raw.trim()))?;
            if selection.scope() != scope {
                return Err(format!(
                    "Report option '{}' is not available under the '{}' scope.",
                    selection.label(),
                    scope.label()
                ));
            }
            Some(selection)
        }
        None => None,
    };
    Ok(ReportArg { scope, option })
}

fn parse_option_arg(raw: &str) -> Result<ReportSelection, String> {
    ReportSelection::from_alias(raw)
        .ok_or_else(|| format!("Unknown report option: {}", raw.trim()))
}

fn parse_account_arg(raw: &str) -> Result<AccountArg, String> {
    let (scope_raw, id_raw) = match raw.split_once(':') {
        Some((scope, id)) => (scope, Some(id)),
        None => (raw, None),
    };
    let scope = AccountScope::from_alias(scope_raw)
        .ok_or_else(|| format!("Unknown account scope: {raw}"))?;
    Ok(match scope {
        AccountScope::All => AccountArg::All,
        AccountScope::Single => AccountArg::Single(
            id_raw
                .map(accounts::normalize_customer_id)
                .filter(|id| !id.is_empty()),
        ),
    })
}

fn parse_output_arg(raw: &str) -> Result<OutputMode, String> {
    OutputMode::from_alias(raw)
        .ok_or_else(|| format!("Unknown output preference: {raw}. Choose csv, table, or auto."))
}

fn parse_toggle_arg(raw: &str) -> Result<bool, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    if TOGGLE_INCLUDE_VALUES.contains(&normalized.as_str()) {
        return Ok(true);
    }
    if TOGGLE_EXCLUDE_VALUES.contains(&normalized.as_str()) {
        return Ok(false);
    }
    Err("Toggle arguments accept 'include' or 'exclude' (case-insensitive).".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        let full: Vec<String> = std::iter::once("adreport")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn report_arguments_resolve_scope_and_option() {
        let arg = parse_report_arg("performance:arc").unwrap();
        assert_eq!(arg.scope, ReportScope::Performance);
        assert_eq!(
            arg.option,
            Some(ReportSelection::Performance(ReportKind::Arc))
        );

        let arg = parse_report_arg("perf").unwrap();
        assert_eq!(arg.scope, ReportScope::Performance);
        assert_eq!(arg.option, None);

        let arg = parse_report_arg("auditing:assignments").unwrap();
        assert_eq!(
            arg.option,
            Some(ReportSelection::Audit(AuditKind::LabelAssignments))
        );

        let error = parse_report_arg("performance:labels").unwrap_err();
        assert_eq!(
            error,
            "Report option 'account_labels' is not available under the 'performance' scope."
        );
        let error = parse_report_arg("quarterly:arc").unwrap_err();
        assert_eq!(error, "Unknown report scope: quarterly");
    }

    #[test]
    fn report_option_argument_resolves_across_scopes() {
        assert_eq!(
            parse_option_arg("gclid").unwrap(),
            ReportSelection::Performance(ReportKind::ClickView)
        );
        assert_eq!(
            parse_option_arg("labels").unwrap(),
            ReportSelection::Audit(AuditKind::AccountLabels)
        );
        assert_eq!(parse_option_arg("Budget").unwrap(), ReportSelection::Budget);
        assert_eq!(
            parse_option_arg("bogus").unwrap_err(),
            "Unknown report option: bogus"
        );
    }

    #[test]
    fn conflicting_report_arguments_error() {
        let cli = parse(&[
            "--records",
            "records.json",
            "--report",
            "performance:arc",
            "--report-option",
            "ads",
        ]);
        let error = preselected_option(&cli).unwrap_err();
        assert!(error
            .to_string()
            .contains("either --report scope:option or --report-option"));

        let cli = parse(&[
            "--records",
            "records.json",
            "--report",
            "audit",
            "--report-option",
            "arc",
        ]);
        let error = preselected_option(&cli).unwrap_err();
        assert!(error
            .to_string()
            .contains("Report option 'arc' is not available under the 'audit' scope."));

        let cli = parse(&[
            "--records",
            "records.json",
            "--report",
            "performance",
            "--report-option",
            "gclid",
        ]);
        assert_eq!(
            preselected_option(&cli).unwrap(),
            Some(ReportSelection::Performance(ReportKind::ClickView))
        );
    }

    #[test]
    fn account_arguments_normalize_ids() {
        assert_eq!(
            parse_account_arg("single:123-456-7890").unwrap(),
            AccountArg::Single(Some("1234567890".to_string()))
        );
        assert_eq!(parse_account_arg("all").unwrap(), AccountArg::All);
        // Ids are only meaningful for the single scope.
        assert_eq!(parse_account_arg("ALL:99").unwrap(), AccountArg::All);
        assert_eq!(parse_account_arg("single").unwrap(), AccountArg::Single(None));
        assert_eq!(parse_account_arg("single:").unwrap(), AccountArg::Single(None));
        assert_eq!(
            parse_account_arg("nearby").unwrap_err(),
            "Unknown account scope: nearby"
        );
    }

    #[test]
    fn toggle_values_parse_case_insensitively() {
        assert!(parse_toggle_arg("include").unwrap());
        assert!(!parse_toggle_arg("EXCLUDE").unwrap());
        assert!(parse_toggle_arg("1").unwrap());
        assert!(!parse_toggle_arg("n").unwrap());
        assert_eq!(
            parse_toggle_arg("maybe").unwrap_err(),
            "Toggle arguments accept 'include' or 'exclude' (case-insensitive)."
        );
    }

    #[test]
    fn date_presets_resolve_against_today() {
        let today = day(2025, 3, 20);
        let choice = parse_date_argument("last30days", false, today).unwrap();
        assert_eq!(choice.label, "Date range");
        assert_eq!(choice.range.start, day(2025, 2, 18));
        assert_eq!(choice.range.end, day(2025, 3, 19));
        assert_eq!(choice.segment, TimeSegment::Date);

        let choice = parse_date_argument("LAST_MONTH", false, today).unwrap();
        assert_eq!(choice.label, "Last calendar month");
        assert_eq!(choice.range.start, day(2025, 2, 1));
        assert_eq!(choice.range.end, day(2025, 2, 28));
        assert_eq!(choice.segment, TimeSegment::Month);

        let choice = parse_date_argument("this_quarter", false, today).unwrap();
        assert_eq!(choice.label, "Current quarter to date");
        assert_eq!(choice.range.start, day(2025, 1, 1));
        assert_eq!(choice.range.end, day(2025, 3, 19));
        assert_eq!(choice.segment, TimeSegment::Quarter);

        let choice = parse_date_argument("last_quarter", false, today).unwrap();
        assert_eq!(choice.label, "Previous calendar quarter");
        assert_eq!(choice.range.start, day(2024, 10, 1));
        assert_eq!(choice.range.end, day(2024, 12, 31));
        assert_eq!(choice.segment, TimeSegment::Quarter);
    }

    #[test]
    fn date_specific_and_bare_forms() {
        let today = day(2025, 3, 20);
        for raw in ["specific:2025-01-15", "single=20250115", "2025-01-15"] {
            let choice = parse_date_argument(raw, false, today).unwrap();
            assert_eq!(choice.label, "Specific date", "{raw}");
            assert_eq!(choice.range, DateRange::single(day(2025, 1, 15)), "{raw}");
            assert_eq!(choice.segment, TimeSegment::Date, "{raw}");
        }
        // Unknown prefixes fall back to parsing the remainder as a date.
        let choice = parse_date_argument("sometime:20250115", false, today).unwrap();
        assert_eq!(choice.range, DateRange::single(day(2025, 1, 15)));
    }

    #[test]
    fn date_ranges_parse_with_optional_segmentation() {
        let today = day(2025, 3, 20);
        let choice =
            parse_date_argument("range:2025-01-01,2025-01-31,weekly", false, today).unwrap();
        assert_eq!(choice.label, "Date range");
        assert_eq!(choice.range.start, day(2025, 1, 1));
        assert_eq!(choice.range.end, day(2025, 1, 31));
        assert_eq!(choice.segment, TimeSegment::Week);

        let choice = parse_date_argument("range=2025-01-01,2025-01-31", false, today).unwrap();
        assert_eq!(choice.segment, TimeSegment::Date);
    }

    #[test]
    fn date_range_errors_match_argument_shapes() {
        let today = day(2025, 3, 20);
        let error = parse_date_argument("range:2025-02-10,2025-02-01", false, today).unwrap_err();
        assert!(error
            .to_string()
            .contains("Start date cannot be later than end date."));

        let error = parse_date_argument("range:2025-01-01", false, today).unwrap_err();
        assert!(error
            .to_string()
            .contains("must include start and end dates separated by commas"));

        let error =
            parse_date_argument("range:2025-01-01,2025-01-31,fortnight", false, today).unwrap_err();
        assert!(error
            .to_string()
            .contains("Unknown time segmentation: fortnight"));

        let error =
            parse_date_argument("range:2025-01-01,2025-01-02", true, today).unwrap_err();
        assert!(error
            .to_string()
            .contains("The selected report only accepts a single date."));

        let error = parse_date_argument("specific:someday", false, today).unwrap_err();
        assert!(matches!(error, ReportError::InvalidDate { .. }));
    }

    #[test]
    fn cli_mode_tracks_reporting_arguments_only() {
        let cli = parse(&["--records", "records.json", "--accounts", "accounts.json"]);
        assert!(!cli.is_cli_mode());

        let cli = parse(&["--records", "records.json", "--output", "auto"]);
        assert!(cli.is_cli_mode());

        let cli = parse(&["--records", "records.json", "--device", "include"]);
        assert!(cli.is_cli_mode());
        assert_eq!(cli.toggle_choice(Toggle::DeviceInfo), Some(true));
        assert_eq!(cli.toggle_choice(Toggle::CampaignInfo), None);
    }

    fn write_fixture_files(dir: &Path) -> (PathBuf, PathBuf) {
        let records = dir.join("records.json");
        fs::write(
            &records,
            r#"{
                "111-111-1111": {
                    "customer": [
                        {
                            "segments.date": "2025-03-01",
                            "customer.descriptive_name": "Acme Search",
                            "customer.id": 1111111111,
                            "metrics.cost_micros": 12345000,
                            "metrics.clicks": 10
                        }
                    ],
                    "label": [
                        {"label.name": "Brand", "label.id": 42}
                    ]
                }
            }"#,
        )
        .unwrap();
        let accounts = dir.join("accounts.json");
        fs::write(
            &accounts,
            r#"{"ACME": ["1111111111", "Acme Search"]}"#,
        )
        .unwrap();
        (records, accounts)
    }

    fn scripted(input: &str) -> PromptSession<&[u8], Vec<u8>> {
        PromptSession::new(input.as_bytes(), Vec::new())
    }

    fn noon() -> NaiveDateTime {
        day(2025, 3, 14).and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn scripted_account_report_runs_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (records, accounts) = write_fixture_files(dir.path());
        let cli = parse(&[
            "--records",
            records.to_str().unwrap(),
            "--accounts",
            accounts.to_str().unwrap(),
            "--report",
            "performance:account",
            "--date",
            "specific:2025-03-01",
            "--account",
            "single:1111111111",
            "--output",
            "auto",
        ]);
        let mut session = scripted("");
        execute(cli, &mut session, noon()).unwrap();
        let transcript = String::from_utf8(session.into_output()).unwrap();
        assert!(transcript.contains("customer id"));
        assert!(transcript.contains("2025-03-01"));
        // 12_345_000 micros round half-up to 12.35.
        assert!(transcript.contains("12.35"));
    }

    #[test]
    fn scripted_audit_listing_runs_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (records, accounts) = write_fixture_files(dir.path());
        let cli = parse(&[
            "--records",
            records.to_str().unwrap(),
            "--accounts",
            accounts.to_str().unwrap(),
            "--report-option",
            "labels",
            "--account",
            "single:1111111111",
            "--output",
            "auto",
        ]);
        let mut session = scripted("");
        execute(cli, &mut session, noon()).unwrap();
        let transcript = String::from_utf8(session.into_output()).unwrap();
        assert!(transcript.contains("Brand"));
    }

    #[test]
    fn menu_driven_session_resolves_every_prompt_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (records, accounts) = write_fixture_files(dir.path());
        let cli = parse(&[
            "--records",
            records.to_str().unwrap(),
            "--accounts",
            accounts.to_str().unwrap(),
        ]);
        // Performance scope, Account Report, specific date, single account
        // (one-entry directory short-circuits the picker), auto output.
        let mut session = scripted("1\n2\n1\n2025-03-01\n1\n3\n");
        execute(cli, &mut session, noon()).unwrap();
        let transcript = String::from_utf8(session.into_output()).unwrap();
        assert!(transcript.contains("Main Menu - Select from the options below:"));
        assert!(transcript.contains("Reporting Options:"));
        assert!(transcript.contains("Reporting time range:"));
        assert!(transcript
            .contains("Single date option selected, defaulting time segmentation to 'date'."));
        assert!(transcript.contains("Generate a report for a single account or all accounts?"));
        assert!(transcript.contains("One account to process: Acme Search / 1111111111"));
        assert!(transcript.contains("Output handling options:"));
        assert!(transcript.contains("customer id"));
        assert!(transcript.contains("12.35"));
    }

    #[test]
    fn interactive_exit_unwinds_cleanly_from_the_main_menu() {
        let dir = tempfile::tempdir().unwrap();
        let (records, accounts) = write_fixture_files(dir.path());
        let cli = parse(&[
            "--records",
            records.to_str().unwrap(),
            "--accounts",
            accounts.to_str().unwrap(),
        ]);
        let mut session = scripted("exit\n");
        execute(cli, &mut session, noon()).unwrap();
        let transcript = String::from_utf8(session.into_output()).unwrap();
        assert!(transcript.contains("Main Menu - Select from the options below:"));
        assert!(transcript.contains("Exiting the program."));
    }

    #[test]
    fn unknown_cli_account_id_falls_back_to_the_picker() {
        let dir = tempfile::tempdir().unwrap();
        let (records, accounts) = write_fixture_files(dir.path());
        let cli = parse(&[
            "--records",
            records.to_str().unwrap(),
            "--accounts",
            accounts.to_str().unwrap(),
            "--report",
            "performance:account",
            "--date",
            "specific:2025-03-01",
            "--account",
            "single:9999999999",
            "--output",
            "auto",
        ]);
        // One-entry directory: the picker short-circuits without input.
        let mut session = scripted("");
        execute(cli, &mut session, noon()).unwrap();
        let transcript = String::from_utf8(session.into_output()).unwrap();
        assert!(transcript.contains("One account to process: Acme Search / 1111111111"));
    }
}
