//! Reminder intake
//!
//! The multi-step "new reminder" wizard as an explicit state machine. The
//! caller presents [`IntakeWizard::choices`], feeds back one selection at a
//! time, and a completed run yields a [`ReminderRequest`] that
//! [`ReminderIntake::commit`] turns into a persisted reminder. Abandoning
//! the wizard at any step drops the accumulator; nothing partial is ever
//! persisted.

use crate::config;
use crate::error::{AppError, Result};
use crate::host::{Clock, NaturalDateParser};
use crate::store::{PersistedStore, Reminder};
use crate::time::{add_duration, duration_to_words, format_for_display, TimeUnit};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};

/// Wizard label for the absolute-time branch
const EXACT_TIME: &str = "Exact Time";

/// Delay kind picked in the first wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelayKind {
    ExactTime,
    Unit(TimeUnit),
}

/// Precomputed absolute-time suggestion
#[derive(Debug, Clone)]
struct QuickPick {
    label: String,
    at_ms: i64,
}

/// Result of feeding one selection to the wizard
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeSelect {
    /// More input needed; present [`IntakeWizard::choices`] again
    Continue,
    /// All steps answered; commit the request
    Complete(ReminderRequest),
}

/// Fully answered wizard run, ready to become a reminder
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderRequest {
    pub title: String,
    /// Computed next fire time in epoch milliseconds
    pub remind_next: i64,
    /// `" in 5 minutes"`-style suffix for the audit note; empty for
    /// absolute times
    pub delay_words: String,
}

pub struct IntakeWizard {
    title: String,
    delay_kind: Option<DelayKind>,
    picks: Vec<QuickPick>,
}

impl IntakeWizard {
    /// Begin a wizard run. An empty title is a dismissed input box: no
    /// wizard, nothing persisted.
    pub fn begin(title: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            tracing::debug!("Reminder input closed without a response");
            return None;
        }
        Some(Self {
            title: title.to_string(),
            delay_kind: None,
            picks: Vec::new(),
        })
    }

    /// Choices for the current step. For the absolute-time step these are
    /// quick picks; free-typed text is also accepted by [`Self::select`].
    pub fn choices(&self) -> Vec<String> {
        match self.delay_kind {
            None => {
                let mut choices = vec![EXACT_TIME.to_string()];
                for unit in [
                    TimeUnit::Minutes,
                    TimeUnit::Hours,
                    TimeUnit::Days,
                    TimeUnit::Weeks,
                    TimeUnit::Months,
                    TimeUnit::Quarters,
                    TimeUnit::Years,
                ] {
                    choices.push(unit.choice_label().to_string());
                }
                choices
            }
            Some(DelayKind::ExactTime) => self.picks.iter().map(|p| p.label.clone()).collect(),
            Some(DelayKind::Unit(unit)) => quantity_choices(unit)
                .into_iter()
                .map(|q| q.to_string())
                .collect(),
        }
    }

    /// Feed one selection (or free-typed answer) to the wizard.
    ///
    /// Unparseable absolute times surface as [`AppError::InvalidTime`] and
    /// abort the attempt; the caller reports them to the user.
    pub fn select(
        &mut self,
        answer: &str,
        parser: Option<&dyn NaturalDateParser>,
        now_ms: i64,
    ) -> Result<IntakeSelect> {
        let answer = answer.trim();
        match self.delay_kind {
            None => {
                if answer == EXACT_TIME {
                    self.delay_kind = Some(DelayKind::ExactTime);
                    self.picks = quick_picks(now_ms);
                    return Ok(IntakeSelect::Continue);
                }
                match TimeUnit::from_choice(answer) {
                    Some(unit) => {
                        self.delay_kind = Some(DelayKind::Unit(unit));
                        Ok(IntakeSelect::Continue)
                    }
                    None => Err(AppError::InvalidChoice(answer.to_string())),
                }
            }
            Some(DelayKind::Unit(unit)) => {
                let amount: i64 = answer
                    .parse()
                    .map_err(|_| AppError::InvalidChoice(answer.to_string()))?;
                if amount <= 0 {
                    return Err(AppError::InvalidChoice(answer.to_string()));
                }
                // Debug shortcut carried over from the original wizard:
                // "2 minutes" actually schedules five seconds out
                let remind_next = if unit == TimeUnit::Minutes && amount == 2 {
                    add_duration(now_ms, TimeUnit::Seconds, 5)
                } else {
                    add_duration(now_ms, unit, amount)
                };
                Ok(IntakeSelect::Complete(ReminderRequest {
                    title: self.title.clone(),
                    remind_next,
                    delay_words: format!(" in {}", duration_to_words(amount, unit)),
                }))
            }
            Some(DelayKind::ExactTime) => {
                let remind_next = self.resolve_exact_time(answer, parser, now_ms)?;
                Ok(IntakeSelect::Complete(ReminderRequest {
                    title: self.title.clone(),
                    remind_next,
                    delay_words: String::new(),
                }))
            }
        }
    }

    fn resolve_exact_time(
        &self,
        answer: &str,
        parser: Option<&dyn NaturalDateParser>,
        now_ms: i64,
    ) -> Result<i64> {
        if let Some(pick) = self.picks.iter().find(|p| p.label == answer) {
            return Ok(pick.at_ms);
        }
        if let Some(parsed) = parser.and_then(|p| p.parse(answer)) {
            return Ok(parsed);
        }
        parse_clock_time(answer, now_ms)
            .ok_or_else(|| AppError::InvalidTime(format!("Invalid date: {}", answer)))
    }
}

/// Enumerated quantities offered for each unit
fn quantity_choices(unit: TimeUnit) -> Vec<i64> {
    match unit {
        TimeUnit::Minutes => vec![1, 2, 15, 30, 45, 60],
        TimeUnit::Hours => (1..=23).collect(),
        TimeUnit::Days => (1..=7).collect(),
        TimeUnit::Weeks => (1..=4).collect(),
        TimeUnit::Months => (1..=12).collect(),
        TimeUnit::Quarters | TimeUnit::Years => (1..=4).collect(),
        TimeUnit::Milliseconds | TimeUnit::Seconds => Vec::new(),
    }
}

/// Absolute-time suggestions: today's next :25 and :55 marks when still
/// ahead, plus tomorrow's 8, 9 and 10 AM slots
fn quick_picks(now_ms: i64) -> Vec<QuickPick> {
    let Some(now) = Utc.timestamp_millis_opt(now_ms).single() else {
        return Vec::new();
    };
    let mut picks = Vec::new();

    for minute_mark in [25, 55] {
        if now.minute() < minute_mark {
            if let Some(at) = at_minute(now, minute_mark) {
                picks.push(QuickPick {
                    label: format!("Today at {}", at.format("%I:%M %p")),
                    at_ms: at.timestamp_millis(),
                });
            }
        }
    }

    let tomorrow = now + Duration::days(1);
    for hour in [8, 9, 10] {
        let Some(at) = at_minute(tomorrow, 0).and_then(|t| t.with_hour(hour)) else {
            continue;
        };
        picks.push(QuickPick {
            label: format!("{} at {}", at.format("%b %d (%a)"), at.format("%I:%M %p")),
            at_ms: at.timestamp_millis(),
        });
    }

    picks
}

fn at_minute(base: DateTime<Utc>, minute: u32) -> Option<DateTime<Utc>> {
    base.with_minute(minute)?.with_second(0)?.with_nanosecond(0)
}

/// Fallback "HH:MM AM/PM" parse applied to today's date
fn parse_clock_time(text: &str, now_ms: i64) -> Option<i64> {
    let time = NaiveTime::parse_from_str(text.trim(), "%I:%M %p").ok()?;
    let now = Utc.timestamp_millis_opt(now_ms).single()?;
    Some(now.date_naive().and_time(time).and_utc().timestamp_millis())
}

/// Turns completed wizard runs into persisted reminders
pub struct ReminderIntake {
    device_id: String,
}

impl ReminderIntake {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
        }
    }

    /// Construct the reminder, append it to the active list and save.
    /// The caller follows up with an out-of-cycle reconciliation pass so a
    /// reminder that is due instantly reaches the presentation sink.
    pub fn commit(
        &self,
        store: &mut PersistedStore,
        clock: &dyn Clock,
        request: ReminderRequest,
    ) -> Result<Reminder> {
        let now = clock.now_ms();
        let mut reminder = Reminder {
            id: now,
            created_at: now,
            modified_at: now,
            title: request.title.clone(),
            content: request.title,
            remind_next: request.remind_next,
            ..Default::default()
        };
        reminder.push_note(&self.device_id, now, "Created reminder");
        reminder.notes.push_str(&format!(
            "\nNext reminder{} at {}",
            request.delay_words,
            format_for_display(request.remind_next, config::AUDIT_DATE_FORMAT)
        ));

        store.settings_mut().reminders.push(reminder.clone());
        store.settings_mut().last_updated = now;
        store.save()?;
        tracing::info!(
            "Created reminder {} ({:?}) due at {}",
            reminder.id,
            reminder.title,
            format_for_display(reminder.remind_next, config::AUDIT_DATE_FORMAT)
        );
        Ok(reminder)
    }
}
