use std::io::{self, Write};

use anstyle::{AnsiColor, Color, Style};
use conciliador::{Confidence, ReconciliationResult, Transaction};

pub struct Palette {
    exact: Style,
    suggested: Style,
    internal: Style,
    bank: Style,
    bold: Style,
}

impl Palette {
    pub fn colored() -> Self {
        let fg = |color| Style::new().fg_color(Some(Color::Ansi(color)));
        Palette {
            exact: fg(AnsiColor::Green),
            suggested: fg(AnsiColor::Cyan),
            internal: fg(AnsiColor::Yellow),
            bank: fg(AnsiColor::Red),
            bold: Style::new().bold(),
        }
    }

    pub fn plain() -> Self {
        Palette {
            exact: Style::new(),
            suggested: Style::new(),
            internal: Style::new(),
            bank: Style::new(),
            bold: Style::new(),
        }
    }
}

pub fn show_diff(result: &ReconciliationResult, unmatched: bool) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let palette = if io::stdout().is_terminal() {
        Palette::colored()
    } else {
        Palette::plain()
    };
    let mut out = io::stdout().lock();
    write_diff(&mut out, result, unmatched, &palette)?;
    Ok(())
}

pub fn write_diff(
    out: &mut impl Write,
    result: &ReconciliationResult,
    unmatched: bool,
    palette: &Palette,
) -> io::Result<()> {
    let Palette {
        exact,
        suggested,
        internal,
        bank,
        bold,
    } = palette;

    if !result.matches.is_empty() {
        writeln!(out, "{bold}━━━ Matches ━━━{bold:#}")?;
        for record in &result.matches {
            let style = match record.confidence {
                Confidence::Exact => exact,
                Confidence::Name | Confidence::Date => suggested,
            };
            writeln!(
                out,
                "{style}[{:>4}]{style:#} {} {} {} ⇄ {} {}",
                record.confidence,
                record.internal.id,
                record.internal.name,
                record.internal.amount,
                record.bank.date,
                record.bank.name,
            )?;
        }
        writeln!(out)?;
    }

    if unmatched {
        write_leftovers(out, "Only in internal", &result.unmatched_internal, internal)?;
        write_leftovers(out, "Only in bank", &result.unmatched_bank, bank)?;
    }

    if result.is_fully_reconciled() && result.difference().is_zero() {
        writeln!(out, "{exact}✓ All transactions match!{exact:#}")?;
        return Ok(());
    }

    let reconciled = result.count(Confidence::Exact);
    let suggested_count = result.matches.len() - reconciled;
    writeln!(out, "{bold}━━━ Summary ━━━{bold:#}")?;
    writeln!(out, "  Total internal: {}", result.total_internal)?;
    writeln!(out, "  Total bank:     {}", result.total_bank)?;
    writeln!(out, "  Difference:     {}", result.difference())?;
    writeln!(
        out,
        "  {} pair(s): {exact}{reconciled}{exact:#} reconciled, {suggested}{suggested_count}{suggested:#} suggested",
        result.matches.len()
    )?;
    writeln!(
        out,
        "  {internal}{}{internal:#} transaction(s) only in internal",
        result.unmatched_internal.len()
    )?;
    writeln!(
        out,
        "  {bank}{}{bank:#} transaction(s) only in bank",
        result.unmatched_bank.len()
    )?;
    Ok(())
}

fn write_leftovers(
    out: &mut impl Write,
    title: &str,
    transactions: &[Transaction],
    style: &Style,
) -> io::Result<()> {
    if transactions.is_empty() {
        return Ok(());
    }
    writeln!(out, "{style}━━━ {title} ━━━{style:#}")?;
    for transaction in transactions {
        writeln!(out, "{transaction}")?;
    }
    writeln!(out)
}
