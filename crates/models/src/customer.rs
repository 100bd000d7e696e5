use serde::{Deserialize, Serialize};

use crate::non_empty;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    pub fn new(customer_id: &str, name: &str, email: &str, phone: &str) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    /// Overwrite the fields present in `patch`. Returns whether anything changed.
    pub fn apply(&mut self, patch: CustomerPatch) -> bool {
        let mut changed = false;
        if let Some(name) = patch.name {
            changed |= name != self.name;
            self.name = name;
        }
        if let Some(email) = patch.email {
            changed |= email != self.email;
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            changed |= phone != self.phone;
            self.phone = phone;
        }
        changed
    }
}

/// Partial update for a customer; `None` leaves the field as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerPatch {
    /// Build a patch from raw form values where an empty string means "no change".
    pub fn from_form(name: &str, email: &str, phone: &str) -> Self {
        Self { name: non_empty(name), email: non_empty(email), phone: non_empty(phone) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_flat_field_names() {
        let c = Customer::new("C1", "Alice", "alice@mail.com", "123");
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "customer_id": "C1",
                "name": "Alice",
                "email": "alice@mail.com",
                "phone": "123",
            })
        );
    }

    #[test]
    fn form_patch_skips_empty_values() {
        let mut c = Customer::new("C1", "Alice", "alice@mail.com", "123");
        let changed = c.apply(CustomerPatch::from_form("", "new@mail.com", ""));
        assert!(changed);
        assert_eq!(c.name, "Alice");
        assert_eq!(c.email, "new@mail.com");
        assert_eq!(c.phone, "123");
    }

    #[test]
    fn explicit_empty_value_is_written() {
        let mut c = Customer::new("C1", "Alice", "alice@mail.com", "123");
        assert!(c.apply(CustomerPatch { phone: Some(String::new()), ..Default::default() }));
        assert_eq!(c.phone, "");
        assert!(!c.apply(CustomerPatch::default()));
        assert!(!c.apply(CustomerPatch::from_form("Alice", "", "")));
    }
}
