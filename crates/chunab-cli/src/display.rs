//! Vertical card display for the roster and the live tally.
//!
//! Renders one card per district, grouped by seat, with nominees listed per
//! party in the fixed party order.

use std::fmt::{self, Write};

use chunab_core::{PartyKey, VoteTally};
use chunab_roster::{CandidateIndex, RosterSummary, Seat};
use chunab_sync::PollStats;

const MAX_LIST_ITEMS: usize = 10;

// ── Public API ──

/// Render one district: header, then every seat in display order.
pub fn write_district_card(
    out: &mut impl Write,
    district: &str,
    province: &str,
    seats: &[Seat],
) -> fmt::Result {
    writeln!(out, "=== {district} ===")?;
    if !province.is_empty() {
        writeln!(out, "{province}")?;
    }
    writeln!(out)?;

    for seat in seats {
        write_seat(out, seat)?;
    }
    Ok(())
}

/// Render every district card in the index, in district order.
pub fn write_roster_cards(out: &mut impl Write, index: &CandidateIndex) -> fmt::Result {
    for (district, seats) in index.districts() {
        let province = seats.first().map_or("", |s| s.province.as_str());
        write_district_card(out, district.as_str(), province, seats)?;
    }
    Ok(())
}

pub fn write_summary(out: &mut impl Write, summary: &RosterSummary) -> fmt::Result {
    writeln!(out, "Roster")?;
    writeln!(out, "  {:<26} {}", "provinces", summary.provinces)?;
    writeln!(out, "  {:<26} {}", "districts", summary.districts)?;
    writeln!(out, "  {:<26} {}", "seats", summary.seats)?;
    writeln!(out, "  {:<26} {}", "records", summary.records)?;
    writeln!(out, "  {:<26} {}", "candidates", summary.candidates)?;
    writeln!(out, "  {:<26} {}", "skipped_rows", summary.skipped_rows)?;
    if !summary.unknown_districts.is_empty() {
        writeln!(
            out,
            "  {:<26} {}",
            "unknown_districts",
            format_list(&summary.unknown_districts)
        )?;
    }
    Ok(())
}

/// Render a poll result: row counts, one line per key, then the fingerprint.
pub fn write_tally(out: &mut impl Write, tally: &VoteTally, stats: &PollStats) -> fmt::Result {
    writeln!(out, "Live feed")?;
    writeln!(out, "  {:<26} {}", "rows", stats.rows)?;
    writeln!(out, "  {:<26} {}", "kept", stats.kept)?;
    writeln!(out, "  {:<26} {}", "dropped", stats.dropped)?;
    writeln!(out, "  {:<26} {}", "keys", tally.len())?;
    writeln!(out, "  {:<26} {}", "total_votes", tally.total_votes())?;
    writeln!(out)?;

    if tally.is_empty() {
        return Ok(());
    }
    writeln!(out, "Votes")?;
    for (key, votes) in tally.iter() {
        writeln!(out, "  {key:<40} {votes:>9}")?;
    }
    writeln!(out)?;
    writeln!(out, "Fingerprint")?;
    writeln!(out, "  {}", tally.fingerprint())
}

// ── Seat rendering ──

fn write_seat(out: &mut impl Write, seat: &Seat) -> fmt::Result {
    match seat.key() {
        Some(key) => writeln!(out, "{key}")?,
        None => writeln!(out, "{} (unnumbered)", seat.label)?,
    }

    if seat.parties.is_empty() {
        writeln!(out, "  (no nominees)")?;
    }
    for party in PartyKey::ALL {
        let Some(names) = seat.parties.get(&party) else {
            continue;
        };
        writeln!(out, "  {:<26} {}", party.as_str(), format_list(names))?;
    }
    writeln!(out)
}

fn format_list(items: &[String]) -> String {
    if items.len() <= MAX_LIST_ITEMS {
        return items.join(", ");
    }
    format!(
        "{}, ... ({} more)",
        items[..MAX_LIST_ITEMS].join(", "),
        items.len() - MAX_LIST_ITEMS
    )
}
