use serde::{Deserialize, Deserializer};

/// Tri-state field for partial updates.
///
/// JSON conflates "key absent" and "key null" when both land in `Option`;
/// nullable columns need the distinction: an absent key leaves the stored
/// value untouched while an explicit null clears it.
///
/// Fields of this type must carry `#[serde(default)]` so a missing key
/// deserializes to `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Key absent from the payload; leave the stored value alone
    #[default]
    Unset,
    /// Key present as explicit null; clear the stored value
    Null,
    /// Key present with a value
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn is_set(&self) -> bool {
        !self.is_unset()
    }

    /// Outer `None` = untouched; inner `Option` = the new stored value
    pub fn as_update(&self) -> Option<Option<&T>> {
        match self {
            Patch::Unset => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        contact: Patch<String>,
    }

    #[test]
    fn missing_key_is_unset() {
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.contact, Patch::Unset);
        assert!(payload.contact.as_update().is_none());
    }

    #[test]
    fn explicit_null_clears() {
        let payload: Payload = serde_json::from_str(r#"{"contact": null}"#).unwrap();
        assert_eq!(payload.contact, Patch::Null);
        assert_eq!(payload.contact.as_update(), Some(None));
    }

    #[test]
    fn value_sets() {
        let payload: Payload = serde_json::from_str(r#"{"contact": "555-0100"}"#).unwrap();
        assert_eq!(payload.contact, Patch::Value("555-0100".to_string()));
        assert_eq!(
            payload.contact.as_update(),
            Some(Some(&"555-0100".to_string()))
        );
    }
}
