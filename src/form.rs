use std::collections::BTreeMap;

/// Currencies offered by the currency select, first one is the default
pub const CURRENCIES: [&str; 6] = ["USD", "EUR", "GBP", "NGN", "KES", "GHS"];

pub const DEFAULT_CURRENCY: &str = "USD";

/// Fields the create form refuses to submit blank
pub const REQUIRED: [FieldId; 3] = [FieldId::ItemName, FieldId::Quantity, FieldId::Contact];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    ItemName,
    Quantity,
    Price,
    Currency,
    Contact,
    IsAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Select,
    Checkbox,
}

impl FieldId {
    /// Tab order of a listing form
    pub const ALL: [FieldId; 6] = [
        FieldId::ItemName,
        FieldId::Quantity,
        FieldId::Price,
        FieldId::Currency,
        FieldId::Contact,
        FieldId::IsAvailable,
    ];

    /// Name the field is submitted (and draft-cached) under
    pub fn name(self) -> &'static str {
        match self {
            FieldId::ItemName => "item_name",
            FieldId::Quantity => "quantity",
            FieldId::Price => "price",
            FieldId::Currency => "currency",
            FieldId::Contact => "contact",
            FieldId::IsAvailable => "is_available",
        }
    }

    /// Page identifier of the field on the create form
    pub fn element_id(self) -> &'static str {
        match self {
            FieldId::ItemName => "itemName",
            FieldId::Quantity => "quantity",
            FieldId::Price => "price",
            FieldId::Currency => "currency",
            FieldId::Contact => "contact",
            FieldId::IsAvailable => "isAvailable",
        }
    }

    pub fn from_element_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.element_id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::ItemName => "Item name",
            FieldId::Quantity => "Quantity",
            FieldId::Price => "Price",
            FieldId::Currency => "Currency",
            FieldId::Contact => "Contact",
            FieldId::IsAvailable => "Available",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::ItemName | FieldId::Quantity | FieldId::Contact => FieldKind::Text,
            FieldId::Price => FieldKind::Number,
            FieldId::Currency => FieldKind::Select,
            FieldId::IsAvailable => FieldKind::Checkbox,
        }
    }

    pub fn is_required(self) -> bool {
        REQUIRED.contains(&self)
    }

    /// Free-text fields, the ones the draft cache tracks
    pub fn is_text_like(self) -> bool {
        self.kind() == FieldKind::Text
    }

    /// Whether typing goes into this field
    pub fn accepts_text(self) -> bool {
        matches!(self.kind(), FieldKind::Text | FieldKind::Number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    Normal,
    Warning,
    Danger,
}

/// Advisory length display under a field. Never truncates input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCounter {
    pub max: usize,
    pub len: usize,
}

impl CharCounter {
    pub fn new(max: usize) -> Self {
        Self { max, len: 0 }
    }

    pub fn update(&mut self, value: &str) {
        self.len = value.chars().count();
    }

    pub fn state(&self) -> CounterState {
        if self.len >= self.max {
            CounterState::Danger
        } else if self.len as u128 * 10 > self.max as u128 * 9 {
            // over 90% of the maximum
            CounterState::Warning
        } else {
            CounterState::Normal
        }
    }

    pub fn text(&self) -> String {
        format!("{}/{} characters", self.len, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: FieldId,
    pub value: String,
    pub checked: bool,
    pub counter: Option<CharCounter>,
}

impl Field {
    fn new(id: FieldId) -> Self {
        let mut field = Self {
            id,
            value: String::new(),
            checked: false,
            counter: None,
        };
        field.reset();
        field
    }

    fn reset(&mut self) {
        self.value = match self.id.kind() {
            FieldKind::Select => DEFAULT_CURRENCY.to_string(),
            _ => String::new(),
        };
        self.checked = self.id.kind() == FieldKind::Checkbox;
        if let Some(counter) = &mut self.counter {
            counter.update(&self.value);
        }
    }
}

/// Submit button: idle label, or disabled with a working indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub idle_label: &'static str,
    pub pending_label: &'static str,
    pub pending: bool,
}

impl SubmitControl {
    pub fn new(idle_label: &'static str, pending_label: &'static str) -> Self {
        Self {
            idle_label,
            pending_label,
            pending: false,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.pending {
            self.pending_label
        } else {
            self.idle_label
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub fields: Vec<Field>,
    pub submit: SubmitControl,
}

impl Form {
    pub fn create() -> Self {
        Self::with_submit(SubmitControl::new("Create Listing", "Creating..."))
    }

    pub fn edit() -> Self {
        Self::with_submit(SubmitControl::new("Save Changes", "Saving..."))
    }

    fn with_submit(submit: SubmitControl) -> Self {
        Self {
            fields: FieldId::ALL.into_iter().map(Field::new).collect(),
            submit,
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn value(&self, id: FieldId) -> &str {
        self.field(id).map(|f| f.value.as_str()).unwrap_or("")
    }

    #[cfg(test)]
    pub fn is_checked(&self, id: FieldId) -> bool {
        self.field(id).map(|f| f.checked).unwrap_or(false)
    }

    /// Programmatic assignment; counters only follow input events
    pub fn set_value(&mut self, id: FieldId, value: impl Into<String>) {
        if let Some(field) = self.field_mut(id) {
            field.value = value.into();
        }
    }

    pub fn set_checked(&mut self, id: FieldId, checked: bool) {
        if let Some(field) = self.field_mut(id) {
            field.checked = checked;
        }
    }

    /// Attach a live counter to a field. Returns false when the form has
    /// no such field.
    pub fn attach_counter(&mut self, id: FieldId, max: usize) -> bool {
        match self.field_mut(id) {
            Some(field) => {
                let mut counter = CharCounter::new(max);
                counter.update(&field.value);
                field.counter = Some(counter);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn counter(&self, id: FieldId) -> Option<&CharCounter> {
        self.field(id).and_then(|f| f.counter.as_ref())
    }

    /// Insert typed text at the end of a field. Returns true if this was an
    /// input event (the value changed).
    pub fn insert(&mut self, id: FieldId, text: &str) -> bool {
        let Some(field) = self.field_mut(id) else {
            return false;
        };
        let accepted: String = match id.kind() {
            FieldKind::Text => text.chars().filter(|c| !c.is_control()).collect(),
            // number inputs only take a decimal literal
            FieldKind::Number => text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect(),
            FieldKind::Select | FieldKind::Checkbox => String::new(),
        };
        if accepted.is_empty() {
            return false;
        }
        field.value.push_str(&accepted);
        if let Some(counter) = &mut field.counter {
            counter.update(&field.value);
        }
        true
    }

    pub fn backspace(&mut self, id: FieldId) -> bool {
        let Some(field) = self.field_mut(id) else {
            return false;
        };
        if !id.accepts_text() || field.value.pop().is_none() {
            return false;
        }
        if let Some(counter) = &mut field.counter {
            counter.update(&field.value);
        }
        true
    }

    pub fn toggle(&mut self, id: FieldId) -> bool {
        match self.field_mut(id) {
            Some(field) if id.kind() == FieldKind::Checkbox => {
                field.checked = !field.checked;
                true
            }
            _ => false,
        }
    }

    /// Step a select through its options
    pub fn cycle_option(&mut self, id: FieldId, forward: bool) -> bool {
        let Some(field) = self.field_mut(id) else {
            return false;
        };
        if id.kind() != FieldKind::Select {
            return false;
        }
        let len = CURRENCIES.len();
        let next = match CURRENCIES.iter().position(|c| *c == field.value) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        field.value = CURRENCIES[next].to_string();
        true
    }

    /// Required fields that are blank once trimmed
    pub fn missing_required(&self) -> Vec<FieldId> {
        REQUIRED
            .into_iter()
            .filter(|id| self.value(*id).trim().is_empty())
            .collect()
    }

    /// Values as the browser would post them: unchecked boxes are left out,
    /// checked ones are sent as "on"
    pub fn to_submission(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for field in &self.fields {
            match field.id.kind() {
                FieldKind::Checkbox => {
                    if field.checked {
                        fields.insert(field.id.name().to_string(), "on".to_string());
                    }
                }
                _ => {
                    fields.insert(field.id.name().to_string(), field.value.clone());
                }
            }
        }
        fields
    }

    pub fn text_like(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.id.is_text_like())
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
        self.submit.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_text_and_states() {
        let mut form = Form::create();
        assert!(form.attach_counter(FieldId::ItemName, 100));

        form.insert(FieldId::ItemName, &"a".repeat(50));
        let counter = form.counter(FieldId::ItemName).unwrap();
        assert_eq!(counter.text(), "50/100 characters");
        assert_eq!(counter.state(), CounterState::Normal);

        form.insert(FieldId::ItemName, &"a".repeat(40));
        assert_eq!(form.counter(FieldId::ItemName).unwrap().state(), CounterState::Normal);

        form.insert(FieldId::ItemName, "a");
        assert_eq!(form.counter(FieldId::ItemName).unwrap().len, 91);
        assert_eq!(form.counter(FieldId::ItemName).unwrap().state(), CounterState::Warning);

        form.insert(FieldId::ItemName, &"a".repeat(9));
        assert_eq!(form.counter(FieldId::ItemName).unwrap().state(), CounterState::Danger);

        // advisory only
        form.insert(FieldId::ItemName, "overflow");
        assert_eq!(form.value(FieldId::ItemName).len(), 108);
        assert_eq!(form.counter(FieldId::ItemName).unwrap().state(), CounterState::Danger);

        form.backspace(FieldId::ItemName);
        assert_eq!(form.counter(FieldId::ItemName).unwrap().len, 107);
    }

    #[test]
    fn test_huge_maximum_stays_normal() {
        let mut form = Form::create();
        form.attach_counter(FieldId::ItemName, usize::MAX);
        form.insert(FieldId::ItemName, "a");

        let counter = form.counter(FieldId::ItemName).unwrap();
        assert_eq!(counter.state(), CounterState::Normal);
    }

    #[test]
    fn test_counter_counts_characters_not_bytes() {
        let mut counter = CharCounter::new(10);
        counter.update("ñandú");
        assert_eq!(counter.len, 5);
    }

    #[test]
    fn test_missing_required_trims_whitespace() {
        let mut form = Form::create();
        form.set_value(FieldId::ItemName, "Maize");
        form.set_value(FieldId::Quantity, "   ");
        form.set_value(FieldId::Contact, "0803 555 0100");

        assert_eq!(form.missing_required(), vec![FieldId::Quantity]);
    }

    #[test]
    fn test_number_field_filters_input() {
        let mut form = Form::create();
        form.insert(FieldId::Price, "1a2.5x0");
        assert_eq!(form.value(FieldId::Price), "12.50");
        assert!(!form.insert(FieldId::Price, "abc"));
    }

    #[test]
    fn test_submission_omits_unchecked_box() {
        let mut form = Form::create();
        form.set_value(FieldId::ItemName, "Yams");
        let posted = form.to_submission();
        assert_eq!(posted.get("is_available").map(String::as_str), Some("on"));
        assert_eq!(posted.get("currency").map(String::as_str), Some("USD"));

        form.toggle(FieldId::IsAvailable);
        assert!(!form.to_submission().contains_key("is_available"));
    }

    #[test]
    fn test_currency_select_cycles() {
        let mut form = Form::create();
        form.cycle_option(FieldId::Currency, true);
        assert_eq!(form.value(FieldId::Currency), "EUR");
        form.cycle_option(FieldId::Currency, false);
        form.cycle_option(FieldId::Currency, false);
        assert_eq!(form.value(FieldId::Currency), "GHS");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut form = Form::create();
        form.attach_counter(FieldId::Contact, 200);
        form.insert(FieldId::Contact, "farmer@example.com");
        form.cycle_option(FieldId::Currency, true);
        form.toggle(FieldId::IsAvailable);
        form.submit.pending = true;

        form.reset();

        assert_eq!(form.value(FieldId::Contact), "");
        assert_eq!(form.value(FieldId::Currency), "USD");
        assert!(form.is_checked(FieldId::IsAvailable));
        assert!(!form.submit.is_disabled());
        assert_eq!(form.counter(FieldId::Contact).unwrap().len, 0);
    }

    #[test]
    fn test_text_like_fields() {
        let form = Form::create();
        let names: Vec<&str> = form.text_like().map(|f| f.id.name()).collect();
        assert_eq!(names, vec!["item_name", "quantity", "contact"]);
    }
}
