//! Set of booking nights that have not been priced yet.
//!
//! Rate tiers carve days out of the calendar one after another; once removed a
//! day never comes back, so no night can be priced twice.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    days: BTreeSet<NaiveDate>,
}

impl Calendar {
    /// Calendar of the nights in `[check_in, check_out)`
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        let days = check_in
            .iter_days()
            .take_while(|day| *day < check_out)
            .collect();
        Self { days }
    }

    /// True iff every day of the closed range `[from, to]` is still unpriced
    pub fn check_period_integrity(&self, from: NaiveDate, to: NaiveDate) -> bool {
        if from > to {
            return false;
        }
        let span = (to - from).num_days() + 1;
        self.days.range(from..=to).count() as i64 == span
    }

    /// Remove the closed range `[from, to]`; days already gone are ignored
    pub fn remove_period(&mut self, from: NaiveDate, to: NaiveDate) {
        if from > to {
            return;
        }
        let removed: Vec<NaiveDate> = self.days.range(from..=to).copied().collect();
        for day in removed {
            self.days.remove(&day);
        }
    }

    pub fn remove_day(&mut self, day: NaiveDate) {
        self.days.remove(&day);
    }

    /// Start of the first run of `length` calendar-contiguous unpriced days.
    ///
    /// Scans forward from the earliest remaining day; gaps left by earlier
    /// allocations break a run.
    pub fn solid_period(&self, length: u32) -> Option<NaiveDate> {
        self.solid_period_from(NaiveDate::MIN, length)
    }

    /// Like [`Calendar::solid_period`], ignoring days before `from`
    pub fn solid_period_from(&self, from: NaiveDate, length: u32) -> Option<NaiveDate> {
        if length == 0 {
            return None;
        }

        let mut start = None;
        let mut previous: Option<NaiveDate> = None;
        let mut run = 0u32;

        for &day in self.days.range(from..) {
            match previous {
                Some(prev) if prev.succ_opt() == Some(day) => run += 1,
                _ => {
                    start = Some(day);
                    run = 1;
                }
            }
            if run == length {
                return start;
            }
            previous = Some(day);
        }

        None
    }

    /// True iff the remaining days are exactly one solid run of `days_in_month`
    pub fn is_whole_month(&self, days_in_month: u32) -> bool {
        self.days_count() == days_in_month as usize
            && self.solid_period(days_in_month) == self.first_day()
    }

    pub fn days_count(&self) -> usize {
        self.days.len()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }
}

/// Last day of a run of `length` days starting at `start`
pub(crate) fn run_end(start: NaiveDate, length: u32) -> NaiveDate {
    start
        .checked_add_days(Days::new(u64::from(length.saturating_sub(1))))
        .unwrap_or(NaiveDate::MAX)
}
