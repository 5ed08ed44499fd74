//! Text rendering of the roster view.

use std::io::{self, Write};

use hogroster_core::{
    House, ResultCode, RosterCounts, SortDirection, SortKey, StudentId, StudentRecord,
};

use crate::app::{App, Toggle};
use crate::utils::{column, format_optional, truncate_string};

const ROW_WIDTH: usize = 4;
const NAME_WIDTH: usize = 14;
const HOUSE_WIDTH: usize = 11;
const BLOOD_WIDTH: usize = 12;

/// Render the table for the current query using the remembered row order.
pub fn render_table(out: &mut impl Write, app: &App) -> io::Result<()> {
    let counts = app.roster.counts();
    let sort = app.query.sort;

    // Build header with sort indicators
    let sort_indicator = |key: SortKey| {
        if sort.key == Some(key) {
            match sort.direction {
                SortDirection::Ascending => " ▲",
                SortDirection::Descending => " ▼",
            }
        } else {
            ""
        }
    };

    let filter = app.query.filter;
    write!(out, "\nFilter: {} ({})", filter, counts.for_filter(&filter))?;
    if !app.query.keyword.is_empty() {
        write!(out, "  Search: {:?}", app.query.keyword)?;
    }
    writeln!(out, "  Showing {}", app.rows().len())?;

    writeln!(
        out,
        "{}{}{}{}{}{}Roles",
        column("#", ROW_WIDTH),
        column(&format!("First{}", sort_indicator(SortKey::FirstName)), NAME_WIDTH),
        column("Middle", NAME_WIDTH),
        column(&format!("Last{}", sort_indicator(SortKey::LastName)), NAME_WIDTH),
        column(&format!("House{}", sort_indicator(SortKey::House)), HOUSE_WIDTH),
        column(&format!("Blood{}", sort_indicator(SortKey::BloodStatus)), BLOOD_WIDTH),
    )?;

    for (i, id) in app.rows().iter().enumerate() {
        let Some(student) = app.roster.get(*id) else {
            continue;
        };
        writeln!(
            out,
            "{}{}{}{}{}{}{}",
            column(&(i + 1).to_string(), ROW_WIDTH),
            column(&student.first_name, NAME_WIDTH),
            column(&format_optional(student.middle_name.as_deref(), ""), NAME_WIDTH),
            column(student.display_last_name(), NAME_WIDTH),
            column(student.house.title(), HOUSE_WIDTH),
            column(student.blood_status.as_str(), BLOOD_WIDTH),
            roles(student),
        )?;
    }

    if app.rows().is_empty() {
        writeln!(out, "(no students match)")?;
    }
    Ok(())
}

/// Short role markers: P prefect, I inquisitor, X expelled, ! privileged.
fn roles(student: &StudentRecord) -> String {
    [
        (student.is_prefect(), 'P'),
        (student.is_squad_member(), 'I'),
        (student.is_expelled(), 'X'),
        (student.is_privileged(), '!'),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, c)| *c)
    .collect()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Detail panel for one student.
pub fn render_detail(out: &mut impl Write, student: &StudentRecord) -> io::Result<()> {
    writeln!(out, "\n{}", student.full_name())?;
    writeln!(out, "  First name:   {}", student.first_name)?;
    writeln!(out, "  Middle name:  {}", format_optional(student.middle_name.as_deref(), "-"))?;
    writeln!(out, "  Nickname:     {}", format_optional(student.nickname.as_deref(), "-"))?;
    writeln!(out, "  Last name:    {}", student.display_last_name())?;
    writeln!(
        out,
        "  Gender:       {}",
        student.gender.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string())
    )?;
    writeln!(out, "  House:        {}", student.house.title())?;
    writeln!(out, "  Blood status: {}", student.blood_status)?;
    writeln!(out, "  Portrait:     images/{}", student.image_file())?;
    writeln!(out, "  Prefect:      {}", yes_no(student.is_prefect()))?;
    writeln!(out, "  Inquisitor:   {}", yes_no(student.is_squad_member()))?;
    writeln!(out, "  Expelled:     {}", yes_no(student.is_expelled()))?;
    if student.is_privileged() {
        writeln!(out, "  This student cannot be expelled.")?;
    }
    Ok(())
}

/// Badge counts per house and role.
pub fn render_counts(out: &mut impl Write, counts: &RosterCounts) -> io::Result<()> {
    writeln!(out, "\n{}{:>8}{:>10}", column("House", HOUSE_WIDTH), "Active", "Expelled")?;
    for house in House::ALL {
        let c = counts.houses.get(&house).copied().unwrap_or_default();
        writeln!(out, "{}{:>8}{:>10}", column(house.title(), HOUSE_WIDTH), c.active, c.expelled)?;
    }
    writeln!(
        out,
        "{}{:>8}{:>10}",
        column("Total", HOUSE_WIDTH),
        counts.active,
        counts.expelled
    )?;
    writeln!(out, "Prefects: {}  Inquisitors: {}", counts.prefects, counts.squad)?;
    Ok(())
}

/// Applied changes, oldest first.
pub fn render_history(out: &mut impl Write, app: &App) -> io::Result<()> {
    let history = app.roster.history();
    if history.is_empty() {
        return writeln!(out, "No changes yet.");
    }
    for event in history {
        let name = app
            .roster
            .get(event.student)
            .map(|s| s.full_name())
            .unwrap_or_else(|| event.student.to_string());
        writeln!(
            out,
            "{}  {}  {}",
            event.at.format("%H:%M:%S"),
            truncate_string(&name, 2 * NAME_WIDTH),
            event.change
        )?;
    }
    Ok(())
}

/// Outcome of a role toggle.
pub fn render_toggle(
    out: &mut impl Write,
    app: &App,
    student: StudentId,
    toggle: Toggle,
    result: &Result<hogroster_core::Change, hogroster_core::RuleViolation>,
) -> io::Result<()> {
    let name = app
        .roster
        .get(student)
        .map(|s| s.full_name())
        .unwrap_or_else(|| student.to_string());

    match (ResultCode::from(result), result) {
        (code, Ok(change)) => writeln!(out, "{}: {} {} [{}]", toggle.label(), name, change, code),
        (code, Err(violation)) => writeln!(out, "{}: {} [{}] {}", toggle.label(), name, code, violation),
    }
}
