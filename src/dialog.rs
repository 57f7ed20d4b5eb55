use crate::form::{FieldId, Form, SubmitControl, DEFAULT_CURRENCY};
use crate::page::{FormAction, Listing};

/// Listing attributes handed to the edit dialog when it opens.
/// Values are trusted, the page already rendered them from valid data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPayload {
    pub id: String,
    pub item_name: String,
    pub quantity: String,
    pub contact: String,
    pub is_available: bool,
    pub price: Option<String>,
    pub currency: Option<String>,
}

impl From<&Listing> for EditPayload {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            item_name: listing.item_name.clone(),
            quantity: listing.quantity.clone(),
            contact: listing.contact.clone(),
            is_available: listing.is_available,
            price: listing.price.map(|p| format!("{:.2}", p)),
            currency: listing.currency.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDialog {
    pub form: Form,
    pub action: FormAction,
    pub focus: usize,
}

impl EditDialog {
    pub fn populate(payload: EditPayload) -> Self {
        let mut form = Form::edit();
        form.set_value(FieldId::ItemName, payload.item_name);
        form.set_value(FieldId::Quantity, payload.quantity);
        form.set_value(FieldId::Contact, payload.contact);
        form.set_checked(FieldId::IsAvailable, payload.is_available);

        // blank rather than a sentinel when there is no price
        let price = payload.price.filter(|p| !p.is_empty()).unwrap_or_default();
        form.set_value(FieldId::Price, price);

        let currency = payload
            .currency
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        form.set_value(FieldId::Currency, currency);

        Self {
            form,
            action: FormAction::Update(payload.id),
            focus: 0,
        }
    }

    pub fn focused(&self) -> FieldId {
        FieldId::ALL[self.focus % FieldId::ALL.len()]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FieldId::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FieldId::ALL.len() - 1) % FieldId::ALL.len();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDialog {
    pub item_name: String,
    pub action: FormAction,
    pub submit: SubmitControl,
}

impl DeleteDialog {
    pub fn populate(id: impl Into<String>, item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            action: FormAction::Delete(id.into()),
            submit: SubmitControl::new("Delete", "Deleting..."),
        }
    }

    pub fn prompt(&self) -> String {
        format!("Delete '{}'?", self.item_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Edit(EditDialog),
    Delete(DeleteDialog),
    Help,
}

/// Open dialogs, newest last. Keys go to the newest one.
#[derive(Debug, Default)]
pub struct DialogStack {
    open: Vec<Dialog>,
}

impl DialogStack {
    pub fn show(&mut self, dialog: Dialog) {
        self.open.push(dialog);
    }

    pub fn top(&self) -> Option<&Dialog> {
        self.open.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Dialog> {
        self.open.last_mut()
    }

    pub fn hide_top(&mut self) -> Option<Dialog> {
        self.open.pop()
    }

    /// Hide every open dialog, returning how many were open
    pub fn hide_all(&mut self) -> usize {
        let closed = self.open.len();
        self.open.clear();
        closed
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dialog> {
        self.open.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(price: Option<&str>, currency: Option<&str>) -> EditPayload {
        EditPayload {
            id: "abc-123".to_string(),
            item_name: "Tomatoes".to_string(),
            quantity: "20 crates".to_string(),
            contact: "0803 555 0100".to_string(),
            is_available: false,
            price: price.map(str::to_string),
            currency: currency.map(str::to_string),
        }
    }

    #[test]
    fn test_populate_writes_every_field() {
        let dialog = EditDialog::populate(payload(Some("12.50"), Some("EUR")));
        let form = &dialog.form;

        assert_eq!(form.value(FieldId::ItemName), "Tomatoes");
        assert_eq!(form.value(FieldId::Quantity), "20 crates");
        assert_eq!(form.value(FieldId::Contact), "0803 555 0100");
        assert!(!form.is_checked(FieldId::IsAvailable));
        assert_eq!(form.value(FieldId::Price), "12.50");
        assert_eq!(form.value(FieldId::Currency), "EUR");
        assert_eq!(dialog.action.path(), "/update_listing/abc-123");
    }

    #[test]
    fn test_absent_price_is_blank_and_currency_defaults() {
        for (price, currency) in [(None, None), (Some(""), Some(""))] {
            let dialog = EditDialog::populate(payload(price, currency));
            assert_eq!(dialog.form.value(FieldId::Price), "");
            assert_eq!(dialog.form.value(FieldId::Currency), "USD");
        }
    }

    #[test]
    fn test_payload_from_listing_formats_price() {
        let listing = Listing {
            id: "l9".to_string(),
            item_name: "Eggs".to_string(),
            quantity: "30".to_string(),
            price: Some(12.5),
            currency: Some("NGN".to_string()),
            is_available: true,
            contact: "x".to_string(),
            created_at: None,
        };
        let payload = EditPayload::from(&listing);
        assert_eq!(payload.price.as_deref(), Some("12.50"));
        assert_eq!(payload.currency.as_deref(), Some("NGN"));
    }

    #[test]
    fn test_delete_dialog_targets_listing() {
        let dialog = DeleteDialog::populate("77", "Garden eggs");
        assert_eq!(dialog.prompt(), "Delete 'Garden eggs'?");
        assert_eq!(dialog.action.path(), "/delete_listing/77");
        assert_eq!(dialog.submit.label(), "Delete");
    }

    #[test]
    fn test_hide_all() {
        let mut dialogs = DialogStack::default();
        dialogs.show(Dialog::Help);
        dialogs.show(Dialog::Delete(DeleteDialog::populate("1", "x")));
        assert_eq!(dialogs.hide_all(), 2);
        assert!(dialogs.is_empty());
    }
}
