// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Amount entry for money requests and tax amounts.
//!
//! [`AmountEditor`] owns the text buffer, the selection and the validation
//! state of one form session. Hosts feed it [`EditorCommand`]s (keypad
//! presses, selection and focus changes, submission) and react to the
//! [`EditorEvent`]s it returns.

use std::fmt;

use crate::currency::{
    Currency, backend_to_micros, parse_micros, to_display_string, to_frontend_string,
};
use crate::routes::is_tax_amount_route;
use crate::{CurrentMoney, IouType, PaymentMethod, RequestTab};

/// Longest integer part accepted by the editor.
pub const AMOUNT_MAX_INTEGER_DIGITS: usize = 8;

/// Smallest general amount that can be submitted (0.01) in millionths.
pub const MIN_AMOUNT_MICROS: i64 = 10_000;

pub const BACKSPACE_KEYS: [&str; 2] = ["<", "Backspace"];

/// Half-open `[start, end)` range over the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn collapsed(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub const fn is_collapsed(self) -> bool {
        self.start == self.end
    }

    fn clamp_to(self, len: usize) -> Self {
        let end = self.end.min(len);
        let start = self.start.min(end);
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorKey {
    Backspace,
    Text(String),
}

impl EditorKey {
    pub fn parse(raw: &str) -> Self {
        if BACKSPACE_KEYS.contains(&raw) {
            Self::Backspace
        } else {
            Self::Text(raw.to_owned())
        }
    }
}

/// Which validation rules a submission runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountContext {
    General,
    /// Tax entry bounded by the absolute value of `reference_tax` (backend amount).
    TaxAmount { reference_tax: i64 },
}

impl AmountContext {
    pub fn from_route(active_route: &str, reference_tax: i64) -> Self {
        if is_tax_amount_route(active_route) {
            Self::TaxAmount { reference_tax }
        } else {
            Self::General
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    InvalidAmount,
    /// `max` is the display string of the permitted tax amount.
    InvalidTaxAmount { max: String },
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount => f.write_str("Please enter a valid amount before continuing."),
            Self::InvalidTaxAmount { max } => write!(f, "Maximum tax amount is {max}"),
        }
    }
}

impl std::error::Error for AmountError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorPhase {
    Editing { form_error: Option<AmountError> },
    Accepted(CurrentMoney),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// Reloads the buffer from a backend amount and resets the phase.
    Initialize { amount: i64 },
    SetCurrency(Currency),
    TabChanged(RequestTab),
    Key(EditorKey),
    SetSelection(Selection),
    /// The screen hosting the form gained or lost navigation focus.
    ScreenFocusChanged(bool),
    /// The underlying text field gained or lost input focus.
    FieldFocusChanged(bool),
    /// Press on the amount area or the keypad background.
    PointerDown,
    LongPress(bool),
    Submit {
        context: AmountContext,
        payment_method: Option<PaymentMethod>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    AmountChanged(String),
    SelectionChanged(Selection),
    FocusRequested,
    ErrorSet(AmountError),
    ErrorCleared,
    Submitted(CurrentMoney),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountEditor {
    buffer: String,
    selection: Selection,
    currency: Currency,
    initial_amount: i64,
    selected_tab: RequestTab,
    phase: EditorPhase,
    screen_focused: bool,
    field_focused: bool,
    long_press_active: bool,
}

impl AmountEditor {
    pub fn new(amount: i64, currency: Currency) -> Self {
        let mut editor = Self {
            buffer: String::new(),
            selection: Selection::default(),
            currency,
            initial_amount: amount,
            selected_tab: RequestTab::default(),
            phase: EditorPhase::Editing { form_error: None },
            screen_focused: true,
            field_focused: false,
            long_press_active: false,
        };
        editor.initialize(amount);
        editor
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn phase(&self) -> &EditorPhase {
        &self.phase
    }

    pub fn selected_tab(&self) -> RequestTab {
        self.selected_tab
    }

    pub fn form_error(&self) -> Option<&AmountError> {
        match &self.phase {
            EditorPhase::Editing { form_error } => form_error.as_ref(),
            EditorPhase::Accepted(_) => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.phase, EditorPhase::Accepted(_))
    }

    pub fn dispatch(&mut self, command: EditorCommand) -> Vec<EditorEvent> {
        match command {
            EditorCommand::Initialize { amount } => {
                self.initial_amount = amount;
                self.initialize(amount)
            }
            EditorCommand::SetCurrency(currency) => self.change_currency(currency),
            EditorCommand::TabChanged(tab) => {
                if tab == self.selected_tab {
                    return Vec::new();
                }
                self.selected_tab = tab;
                self.initialize(self.initial_amount)
            }
            EditorCommand::Key(key) => self.apply_key(key),
            EditorCommand::SetSelection(selection) => self.set_selection(selection),
            EditorCommand::ScreenFocusChanged(focused) => {
                let regained = focused && !self.screen_focused;
                self.screen_focused = focused;
                if regained {
                    self.set_selection(Selection::collapsed(self.selection.end))
                } else {
                    Vec::new()
                }
            }
            EditorCommand::FieldFocusChanged(focused) => {
                self.field_focused = focused;
                Vec::new()
            }
            EditorCommand::PointerDown => {
                let mut events = self.set_selection(Selection::collapsed(self.selection.end));
                if !self.field_focused {
                    events.push(EditorEvent::FocusRequested);
                }
                events
            }
            EditorCommand::LongPress(active) => {
                self.long_press_active = active;
                if !active && !self.field_focused {
                    vec![EditorEvent::FocusRequested]
                } else {
                    Vec::new()
                }
            }
            EditorCommand::Submit {
                context,
                payment_method,
            } => self.submit(context, payment_method),
        }
    }

    fn initialize(&mut self, amount: i64) -> Vec<EditorEvent> {
        let had_error = self.form_error().is_some();
        let magnitude = i64::try_from(amount.unsigned_abs()).unwrap_or(i64::MAX);
        self.buffer = if magnitude == 0 {
            String::new()
        } else {
            to_frontend_string(magnitude, &self.currency)
        };
        self.selection = Selection::collapsed(self.buffer.len());
        self.phase = EditorPhase::Editing { form_error: None };
        tracing::debug!(amount, currency = %self.currency, buffer = %self.buffer, "amount editor initialized");

        let mut events = vec![
            EditorEvent::AmountChanged(self.buffer.clone()),
            EditorEvent::SelectionChanged(self.selection),
        ];
        if had_error {
            events.push(EditorEvent::ErrorCleared);
        }
        events
    }

    fn change_currency(&mut self, currency: Currency) -> Vec<EditorEvent> {
        if currency == self.currency || self.is_accepted() {
            return Vec::new();
        }
        self.currency = currency;
        let decimals = usize::from(self.currency.decimals());
        let Some(dot) = self.buffer.find('.') else {
            return Vec::new();
        };
        let keep = if decimals == 0 { dot } else { dot + 1 + decimals };
        if keep >= self.buffer.len() {
            return Vec::new();
        }
        let trimmed = self.buffer[..keep].to_owned();
        self.commit(trimmed)
    }

    fn apply_key(&mut self, key: EditorKey) -> Vec<EditorEvent> {
        if self.is_accepted() {
            return Vec::new();
        }

        let selection = self.selection.clamp_to(self.buffer.len());
        let (candidate, max_integer_digits) = match key {
            EditorKey::Backspace => {
                if self.buffer.is_empty() {
                    return Vec::new();
                }
                let start = if selection.is_collapsed() {
                    selection.start.saturating_sub(1)
                } else {
                    selection.start
                };
                // Deletions skip the integer digit cap.
                let candidate =
                    format!("{}{}", &self.buffer[..start], &self.buffer[selection.end..]);
                (candidate, usize::MAX)
            }
            EditorKey::Text(text) => {
                let candidate = format!(
                    "{}{}{}",
                    &self.buffer[..selection.start],
                    text,
                    &self.buffer[selection.end..]
                );
                (candidate, AMOUNT_MAX_INTEGER_DIGITS)
            }
        };

        let Some(normalized) = normalize_with_limit(&candidate, &self.currency, max_integer_digits)
        else {
            tracing::debug!(candidate = %candidate, "amount edit rejected");
            return Vec::new();
        };

        let mut events = Vec::new();
        if !self.long_press_active && !self.field_focused {
            events.push(EditorEvent::FocusRequested);
        }
        events.extend(self.commit(normalized));
        events
    }

    /// Replaces the buffer with an already validated amount.
    fn commit(&mut self, normalized: String) -> Vec<EditorEvent> {
        let old_len = self.buffer.len() as isize;
        let new_len = normalized.len() as isize;
        let cursor = (self.selection.end as isize + new_len - old_len).clamp(0, new_len) as usize;

        let mut events = Vec::new();
        if normalized != self.buffer {
            self.buffer = normalized;
            events.push(EditorEvent::AmountChanged(self.buffer.clone()));
        }
        let selection = Selection::collapsed(cursor);
        if selection != self.selection {
            self.selection = selection;
            events.push(EditorEvent::SelectionChanged(selection));
        }
        if let EditorPhase::Editing { form_error } = &mut self.phase
            && form_error.take().is_some()
        {
            events.push(EditorEvent::ErrorCleared);
        }
        events
    }

    fn set_selection(&mut self, selection: Selection) -> Vec<EditorEvent> {
        let clamped = selection.clamp_to(self.buffer.len());
        if clamped == self.selection {
            return Vec::new();
        }
        self.selection = clamped;
        vec![EditorEvent::SelectionChanged(clamped)]
    }

    fn submit(
        &mut self,
        context: AmountContext,
        payment_method: Option<PaymentMethod>,
    ) -> Vec<EditorEvent> {
        if self.is_accepted() {
            return Vec::new();
        }

        match validate_submission(&self.buffer, &self.currency, context) {
            Ok(()) => {
                let money = CurrentMoney {
                    amount: self.buffer.clone(),
                    currency: self.currency.clone(),
                    payment_method,
                };
                tracing::info!(amount = %money.amount, currency = %money.currency, "amount accepted");
                self.phase = EditorPhase::Accepted(money.clone());
                vec![EditorEvent::Submitted(money)]
            }
            Err(error) => {
                tracing::debug!(buffer = %self.buffer, %error, "amount submission rejected");
                self.phase = EditorPhase::Editing {
                    form_error: Some(error.clone()),
                };
                vec![EditorEvent::ErrorSet(error)]
            }
        }
    }
}

/// Submission rules for a buffer under the given context.
pub fn validate_submission(
    buffer: &str,
    currency: &Currency,
    context: AmountContext,
) -> Result<(), AmountError> {
    let Some(value) = parse_micros(buffer) else {
        return Err(AmountError::InvalidAmount);
    };

    match context {
        AmountContext::General => {
            if value < MIN_AMOUNT_MICROS {
                return Err(AmountError::InvalidAmount);
            }
        }
        AmountContext::TaxAmount { reference_tax } => {
            let limit = reference_tax.unsigned_abs().min(i64::MAX as u64) as i64;
            if value > backend_to_micros(limit, currency) {
                return Err(AmountError::InvalidTaxAmount {
                    max: to_display_string(limit, currency),
                });
            }
        }
    }
    Ok(())
}

/// Canonical form of an edited amount, or `None` when the edit must be
/// dropped.
pub fn normalize_amount(candidate: &str, currency: &Currency) -> Option<String> {
    normalize_with_limit(candidate, currency, AMOUNT_MAX_INTEGER_DIGITS)
}

fn normalize_with_limit(
    candidate: &str,
    currency: &Currency,
    max_integer_digits: usize,
) -> Option<String> {
    let without_spaces = candidate
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>();
    let separated = if without_spaces.contains('.') {
        without_spaces.replace(',', "")
    } else {
        without_spaces.replace(',', ".")
    };
    let normalized = add_leading_zero(strip_redundant_zeros(&separated));

    is_valid_amount(
        &normalized,
        usize::from(currency.decimals()),
        max_integer_digits,
    )
    .then_some(normalized)
}

fn strip_redundant_zeros(amount: &str) -> &str {
    let mut rest = amount;
    while rest.len() > 1 && rest.starts_with('0') && rest.as_bytes()[1].is_ascii_digit() {
        rest = &rest[1..];
    }
    rest
}

fn add_leading_zero(amount: &str) -> String {
    if amount.starts_with('.') {
        format!("0{amount}")
    } else {
        amount.to_owned()
    }
}

fn is_valid_amount(amount: &str, decimals: usize, max_integer_digits: usize) -> bool {
    if amount.is_empty() {
        return true;
    }
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };
    if whole.len() > max_integer_digits || !whole.bytes().all(|byte| byte.is_ascii_digit()) {
        return false;
    }
    match fraction {
        None => true,
        Some(_) if decimals == 0 => false,
        Some(fraction) => {
            fraction.len() <= decimals && fraction.bytes().all(|byte| byte.is_ascii_digit())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    pub skip_confirmation: bool,
    pub iou_type: IouType,
    pub is_editing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitLabel {
    SplitExpense,
    CreateExpense,
    Save,
    Next,
}

impl SubmitLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SplitExpense => "Split expense",
            Self::CreateExpense => "Create expense",
            Self::Save => "Save",
            Self::Next => "Next",
        }
    }
}

impl SubmitOptions {
    pub fn label(self) -> SubmitLabel {
        if self.skip_confirmation {
            if self.iou_type == IouType::Split {
                return SubmitLabel::SplitExpense;
            }
            return SubmitLabel::CreateExpense;
        }
        if self.is_editing {
            SubmitLabel::Save
        } else {
            SubmitLabel::Next
        }
    }

    /// Pay requests that skip confirmation settle directly from the form.
    pub fn uses_settlement_button(self) -> bool {
        self.iou_type == IouType::Pay && self.skip_confirmation
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AmountContext, AmountEditor, AmountError, EditorCommand, EditorEvent, EditorKey,
        EditorPhase, Selection, SubmitLabel, SubmitOptions, normalize_amount,
        validate_submission,
    };
    use crate::{Currency, CurrentMoney, IouType, PaymentMethod, RequestTab};

    fn usd() -> Currency {
        Currency::usd()
    }

    fn press(editor: &mut AmountEditor, keys: &[&str]) {
        for key in keys {
            editor.dispatch(EditorCommand::Key(EditorKey::parse(key)));
        }
    }

    fn submit(editor: &mut AmountEditor, context: AmountContext) -> Vec<EditorEvent> {
        editor.dispatch(EditorCommand::Submit {
            context,
            payment_method: None,
        })
    }

    #[test]
    fn initialize_formats_amount_and_places_cursor_at_end() {
        let editor = AmountEditor::new(1234, usd());
        assert_eq!(editor.buffer(), "12.34");
        assert_eq!(editor.selection(), Selection::collapsed(5));
        assert_eq!(editor.phase(), &EditorPhase::Editing { form_error: None });
    }

    #[test]
    fn zero_amount_initializes_empty_buffer() {
        let editor = AmountEditor::new(0, usd());
        assert_eq!(editor.buffer(), "");
        assert_eq!(editor.selection(), Selection::collapsed(0));
    }

    #[test]
    fn typing_digits_appends_at_cursor() {
        let mut editor = AmountEditor::new(0, usd());
        press(&mut editor, &["1", "2", ".", "5"]);
        assert_eq!(editor.buffer(), "12.5");
        assert_eq!(editor.selection(), Selection::collapsed(4));
    }

    #[test]
    fn leading_separator_gets_zero_prefix() {
        let mut editor = AmountEditor::new(0, usd());
        press(&mut editor, &["."]);
        assert_eq!(editor.buffer(), "0.");
        assert_eq!(editor.selection(), Selection::collapsed(2));
    }

    #[test]
    fn redundant_leading_zeros_collapse() {
        let mut editor = AmountEditor::new(0, usd());
        press(&mut editor, &["0", "0", "7"]);
        assert_eq!(editor.buffer(), "7");
        assert_eq!(editor.selection(), Selection::collapsed(1));
    }

    #[test]
    fn second_separator_is_rejected_silently() {
        let mut editor = AmountEditor::new(0, usd());
        editor.dispatch(EditorCommand::FieldFocusChanged(true));
        press(&mut editor, &["1", "."]);
        let events = editor.dispatch(EditorCommand::Key(EditorKey::parse(".")));
        assert!(events.is_empty());
        assert_eq!(editor.buffer(), "1.");
        assert_eq!(editor.selection(), Selection::collapsed(2));
    }

    #[test]
    fn extra_fraction_digits_and_long_integers_are_rejected() {
        let mut editor = AmountEditor::new(0, usd());
        press(&mut editor, &["1", ".", "2", "3", "4"]);
        assert_eq!(editor.buffer(), "1.23");

        let mut editor = AmountEditor::new(0, usd());
        press(&mut editor, &["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
        assert_eq!(editor.buffer(), "12345678");
    }

    #[test]
    fn zero_decimal_currency_rejects_separator() {
        let mut editor = AmountEditor::new(0, Currency::parse("JPY").expect("JPY"));
        press(&mut editor, &["5", "."]);
        assert_eq!(editor.buffer(), "5");
    }

    #[test]
    fn negative_amount_initializes_to_its_magnitude() {
        let mut editor = AmountEditor::new(-1234, usd());
        assert_eq!(editor.buffer(), "12.34");

        press(&mut editor, &["<", "5"]);
        assert_eq!(editor.buffer(), "12.35");
        assert_eq!(editor.selection(), Selection::collapsed(5));
    }

    #[test]
    fn oversized_initial_amount_can_be_backspaced_under_the_cap() {
        let mut editor = AmountEditor::new(10_000_000_000, usd());
        editor.dispatch(EditorCommand::FieldFocusChanged(true));
        assert_eq!(editor.buffer(), "100000000.00");

        assert!(
            editor
                .dispatch(EditorCommand::Key(EditorKey::parse("5")))
                .is_empty()
        );
        assert_eq!(editor.buffer(), "100000000.00");

        for expected in ["100000000.0", "100000000.", "100000000", "10000000"] {
            let events = editor.dispatch(EditorCommand::Key(EditorKey::Backspace));
            assert_eq!(editor.buffer(), expected);
            assert_eq!(events.first(), Some(&EditorEvent::AmountChanged(expected.to_owned())));
        }
        assert_eq!(editor.selection(), Selection::collapsed(8));

        press(&mut editor, &["5"]);
        assert_eq!(editor.buffer(), "10000000");
        press(&mut editor, &[".", "5"]);
        assert_eq!(editor.buffer(), "10000000.5");
    }

    #[test]
    fn backspace_removes_character_before_cursor() {
        let mut editor = AmountEditor::new(1234, usd());
        press(&mut editor, &["<"]);
        assert_eq!(editor.buffer(), "12.3");
        assert_eq!(editor.selection(), Selection::collapsed(4));
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut editor = AmountEditor::new(1234, usd());
        editor.dispatch(EditorCommand::FieldFocusChanged(true));
        editor.dispatch(EditorCommand::SetSelection(Selection::collapsed(0)));
        let events = editor.dispatch(EditorCommand::Key(EditorKey::Backspace));
        assert!(events.is_empty());
        assert_eq!(editor.buffer(), "12.34");
        assert_eq!(editor.selection(), Selection::collapsed(0));
    }

    #[test]
    fn backspace_on_empty_buffer_does_nothing() {
        let mut editor = AmountEditor::new(0, usd());
        editor.dispatch(EditorCommand::FieldFocusChanged(true));
        assert!(
            editor
                .dispatch(EditorCommand::Key(EditorKey::Backspace))
                .is_empty()
        );
    }

    #[test]
    fn backspace_deletes_whole_selection() {
        let mut editor = AmountEditor::new(1234, usd());
        editor.dispatch(EditorCommand::SetSelection(Selection::new(0, 2)));
        press(&mut editor, &["Backspace"]);
        assert_eq!(editor.buffer(), "0.34");
        assert_eq!(editor.selection(), Selection::collapsed(1));
    }

    #[test]
    fn typing_replaces_selected_range() {
        let mut editor = AmountEditor::new(1234, usd());
        editor.dispatch(EditorCommand::SetSelection(Selection::new(3, 5)));
        press(&mut editor, &["9"]);
        assert_eq!(editor.buffer(), "12.9");
        assert_eq!(editor.selection(), Selection::collapsed(4));
    }

    #[test]
    fn comma_becomes_separator_and_spaces_are_stripped() {
        assert_eq!(normalize_amount("1,5", &usd()).as_deref(), Some("1.5"));
        assert_eq!(normalize_amount("1,000.5", &usd()).as_deref(), Some("1000.5"));
        assert_eq!(normalize_amount(" 4 2 ", &usd()).as_deref(), Some("42"));
        assert_eq!(normalize_amount("1a", &usd()), None);
        assert_eq!(normalize_amount("-1", &usd()), None);
    }

    #[test]
    fn selection_is_clamped_to_buffer() {
        let mut editor = AmountEditor::new(1234, usd());
        let events = editor.dispatch(EditorCommand::SetSelection(Selection::new(3, 40)));
        assert_eq!(editor.selection(), Selection::new(3, 5));
        assert_eq!(events, vec![EditorEvent::SelectionChanged(Selection::new(3, 5))]);
    }

    #[test]
    fn unfocused_field_requests_focus_on_edit() {
        let mut editor = AmountEditor::new(0, usd());
        let events = editor.dispatch(EditorCommand::Key(EditorKey::parse("3")));
        assert_eq!(events.first(), Some(&EditorEvent::FocusRequested));

        editor.dispatch(EditorCommand::FieldFocusChanged(true));
        let events = editor.dispatch(EditorCommand::Key(EditorKey::parse("3")));
        assert!(!events.contains(&EditorEvent::FocusRequested));
    }

    #[test]
    fn rejected_edit_on_unfocused_field_emits_nothing() {
        let mut editor = AmountEditor::new(0, usd());
        press(&mut editor, &["1", "."]);
        assert!(
            editor
                .dispatch(EditorCommand::Key(EditorKey::parse(".")))
                .is_empty()
        );
        assert!(
            editor
                .dispatch(EditorCommand::Key(EditorKey::parse("x")))
                .is_empty()
        );
        assert_eq!(editor.buffer(), "1.");

        let mut editor = AmountEditor::new(0, usd());
        assert!(
            editor
                .dispatch(EditorCommand::Key(EditorKey::Backspace))
                .is_empty()
        );
    }

    #[test]
    fn long_press_suppresses_focus_until_released() {
        let mut editor = AmountEditor::new(1234, usd());
        assert!(editor.dispatch(EditorCommand::LongPress(true)).is_empty());
        let events = editor.dispatch(EditorCommand::Key(EditorKey::Backspace));
        assert!(!events.contains(&EditorEvent::FocusRequested));
        assert_eq!(
            editor.dispatch(EditorCommand::LongPress(false)),
            vec![EditorEvent::FocusRequested]
        );
    }

    #[test]
    fn regaining_screen_focus_collapses_selection_to_end() {
        let mut editor = AmountEditor::new(1234, usd());
        editor.dispatch(EditorCommand::SetSelection(Selection::new(1, 3)));
        assert!(
            editor
                .dispatch(EditorCommand::ScreenFocusChanged(true))
                .is_empty()
        );
        editor.dispatch(EditorCommand::ScreenFocusChanged(false));
        let events = editor.dispatch(EditorCommand::ScreenFocusChanged(true));
        assert_eq!(events, vec![EditorEvent::SelectionChanged(Selection::collapsed(3))]);
    }

    #[test]
    fn pointer_down_collapses_selection_and_requests_focus() {
        let mut editor = AmountEditor::new(1234, usd());
        editor.dispatch(EditorCommand::SetSelection(Selection::new(0, 2)));
        let events = editor.dispatch(EditorCommand::PointerDown);
        assert_eq!(
            events,
            vec![
                EditorEvent::SelectionChanged(Selection::collapsed(2)),
                EditorEvent::FocusRequested,
            ]
        );
    }

    #[test]
    fn submit_round_trips_initialized_amount() {
        for (code, backend, buffer) in [
            ("USD", 1234, "12.34"),
            ("JPY", 1200, "12"),
            ("BHD", 1234, "12.340"),
            ("XYZ", 1234, "12.34"),
        ] {
            let currency = Currency::parse(code).expect("three-letter code");
            let mut editor = AmountEditor::new(backend, currency.clone());
            assert_eq!(editor.buffer(), buffer, "{code}");

            let events = submit(&mut editor, AmountContext::General);
            let expected = CurrentMoney {
                amount: buffer.to_owned(),
                currency,
                payment_method: None,
            };
            assert_eq!(events, vec![EditorEvent::Submitted(expected.clone())], "{code}");
            assert_eq!(editor.phase(), &EditorPhase::Accepted(expected), "{code}");
        }
    }

    #[test]
    fn sub_unit_amount_in_zero_decimal_currency_rounds_to_invalid_zero() {
        let mut editor = AmountEditor::new(1, Currency::parse("JPY").expect("JPY"));
        assert_eq!(editor.buffer(), "0");
        assert_eq!(
            submit(&mut editor, AmountContext::General),
            vec![EditorEvent::ErrorSet(AmountError::InvalidAmount)]
        );
        assert!(!editor.is_accepted());
    }

    #[test]
    fn submit_carries_payment_method() {
        let mut editor = AmountEditor::new(500, usd());
        let events = editor.dispatch(EditorCommand::Submit {
            context: AmountContext::General,
            payment_method: Some(PaymentMethod::Elsewhere),
        });
        let Some(EditorEvent::Submitted(money)) = events.first() else {
            panic!("expected submission, got {events:?}");
        };
        assert_eq!(money.payment_method, Some(PaymentMethod::Elsewhere));
    }

    #[test]
    fn empty_and_zero_amounts_are_invalid_in_general_context() {
        let mut editor = AmountEditor::new(0, usd());
        assert_eq!(
            submit(&mut editor, AmountContext::General),
            vec![EditorEvent::ErrorSet(AmountError::InvalidAmount)]
        );

        press(&mut editor, &["0"]);
        submit(&mut editor, AmountContext::General);
        assert_eq!(editor.form_error(), Some(&AmountError::InvalidAmount));
        assert_eq!(
            editor.form_error().map(ToString::to_string).as_deref(),
            Some("Please enter a valid amount before continuing.")
        );
    }

    #[test]
    fn zero_is_valid_tax_amount_when_reference_is_zero() {
        let mut editor = AmountEditor::new(0, usd());
        press(&mut editor, &["0"]);
        let events = submit(&mut editor, AmountContext::TaxAmount { reference_tax: 0 });
        assert!(matches!(events.as_slice(), [EditorEvent::Submitted(_)]));
    }

    #[test]
    fn empty_tax_amount_is_still_invalid() {
        assert_eq!(
            validate_submission("", &usd(), AmountContext::TaxAmount { reference_tax: 100 }),
            Err(AmountError::InvalidAmount)
        );
    }

    #[test]
    fn tax_amount_over_reference_embeds_formatted_limit() {
        let mut editor = AmountEditor::new(0, usd());
        press(&mut editor, &["1", "3"]);
        submit(
            &mut editor,
            AmountContext::TaxAmount {
                reference_tax: -1250,
            },
        );
        let error = editor.form_error().cloned();
        assert_eq!(
            error,
            Some(AmountError::InvalidTaxAmount {
                max: "$12.50".to_owned()
            })
        );
        assert_eq!(
            error.map(|error| error.to_string()).as_deref(),
            Some("Maximum tax amount is $12.50")
        );
    }

    #[test]
    fn tax_amount_equal_to_reference_is_accepted() {
        assert_eq!(
            validate_submission("12.5", &usd(), AmountContext::TaxAmount { reference_tax: 1250 }),
            Ok(())
        );
    }

    #[test]
    fn context_is_detected_from_route_marker() {
        assert_eq!(
            AmountContext::from_route("create/submit/taxAmount/1/2", 300),
            AmountContext::TaxAmount { reference_tax: 300 }
        );
        assert_eq!(
            AmountContext::from_route("create/submit/amount/1/2", 300),
            AmountContext::General
        );
    }

    #[test]
    fn next_edit_clears_form_error() {
        let mut editor = AmountEditor::new(0, usd());
        editor.dispatch(EditorCommand::FieldFocusChanged(true));
        submit(&mut editor, AmountContext::General);
        assert!(editor.form_error().is_some());

        let events = editor.dispatch(EditorCommand::Key(EditorKey::parse("4")));
        assert_eq!(
            events,
            vec![
                EditorEvent::AmountChanged("4".to_owned()),
                EditorEvent::SelectionChanged(Selection::collapsed(1)),
                EditorEvent::ErrorCleared,
            ]
        );
        assert!(editor.form_error().is_none());
    }

    #[test]
    fn rejected_edit_keeps_form_error() {
        let mut editor = AmountEditor::new(0, usd());
        press(&mut editor, &["0"]);
        submit(&mut editor, AmountContext::General);
        press(&mut editor, &["x"]);
        assert_eq!(editor.form_error(), Some(&AmountError::InvalidAmount));
    }

    #[test]
    fn tab_change_reinitializes_and_clears_error() {
        let mut editor = AmountEditor::new(700, usd());
        press(&mut editor, &["<", "<", "<", "<", "0"]);
        submit(&mut editor, AmountContext::General);
        assert!(editor.form_error().is_some());

        let events = editor.dispatch(EditorCommand::TabChanged(RequestTab::Scan));
        assert_eq!(editor.buffer(), "7.00");
        assert!(editor.form_error().is_none());
        assert!(events.contains(&EditorEvent::ErrorCleared));

        assert!(
            editor
                .dispatch(EditorCommand::TabChanged(RequestTab::Scan))
                .is_empty()
        );
    }

    #[test]
    fn accepted_editor_ignores_edits_until_reinitialized() {
        let mut editor = AmountEditor::new(1234, usd());
        submit(&mut editor, AmountContext::General);
        assert!(editor.is_accepted());
        assert!(
            editor
                .dispatch(EditorCommand::Key(EditorKey::parse("1")))
                .is_empty()
        );
        assert!(submit(&mut editor, AmountContext::General).is_empty());

        editor.dispatch(EditorCommand::Initialize { amount: 99 });
        assert!(!editor.is_accepted());
        assert_eq!(editor.buffer(), "0.99");
    }

    #[test]
    fn currency_change_trims_excess_decimals() {
        let mut editor = AmountEditor::new(1234, usd());
        editor.dispatch(EditorCommand::SetCurrency(
            Currency::parse("JPY").expect("JPY"),
        ));
        assert_eq!(editor.buffer(), "12");
        assert_eq!(editor.selection(), Selection::collapsed(2));

        let mut editor = AmountEditor::new(1200, usd());
        editor.dispatch(EditorCommand::SetCurrency(
            Currency::parse("BHD").expect("BHD"),
        ));
        assert_eq!(editor.buffer(), "12.00");
        assert_eq!(editor.currency().code(), "BHD");
    }

    #[test]
    fn submit_label_follows_request_options() {
        let options = |skip_confirmation, iou_type, is_editing| SubmitOptions {
            skip_confirmation,
            iou_type,
            is_editing,
        };
        assert_eq!(
            options(true, IouType::Split, false).label(),
            SubmitLabel::SplitExpense
        );
        assert_eq!(
            options(true, IouType::Submit, true).label(),
            SubmitLabel::CreateExpense
        );
        assert_eq!(options(false, IouType::Submit, true).label(), SubmitLabel::Save);
        assert_eq!(options(false, IouType::Pay, false).label().as_str(), "Next");
        assert!(options(true, IouType::Pay, false).uses_settlement_button());
        assert!(!options(false, IouType::Pay, false).uses_settlement_button());
    }
}
