//! Pagination envelope shared by every listing endpoint.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::Collection;
use crate::{AppError, Result};

/// One page of a listing plus the cursor for the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Opaque cursor; `None` means there are no further pages.
    pub next_page_token: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_page_token: None,
        }
    }
}

impl<T> Page<T> {
    /// Whether more pages follow this one.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_page_token.is_some()
    }
}

impl<T: Collection + DeserializeOwned> Page<T> {
    /// Decode a listing response.
    ///
    /// A missing or `null` collection key decodes as an empty page (the
    /// service omits the key when there is nothing to list). An empty
    /// `nextPageToken` is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Decode` if the response is not an object, the
    /// collection is not an array, or an item cannot be decoded.
    pub fn from_response(response: Value) -> Result<Self> {
        let Value::Object(mut body) = response else {
            return Err(AppError::Decode(format!(
                "{} listing: response is not a JSON object",
                T::KEY
            )));
        };

        let next_page_token = match body.remove("nextPageToken") {
            Some(Value::String(token)) if !token.is_empty() => Some(token),
            Some(Value::String(_) | Value::Null) | None => None,
            Some(other) => {
                return Err(AppError::Decode(format!(
                    "{} listing: nextPageToken is not a string: {other}",
                    T::KEY
                )))
            }
        };

        let items = match body.remove(T::KEY) {
            Some(Value::Array(raw)) => raw
                .into_iter()
                .map(serde_json::from_value)
                .collect::<std::result::Result<Vec<T>, _>>()
                .map_err(|err| AppError::Decode(format!("{} listing: {err}", T::KEY)))?,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(AppError::Decode(format!(
                    "{} listing: collection is not an array",
                    T::KEY
                )))
            }
        };

        Ok(Self {
            items,
            next_page_token,
        })
    }
}

impl<T: Collection + Serialize> Page<T> {
    /// Render the page in its wire shape for display.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Decode` if an item cannot be serialised.
    pub fn to_json(&self) -> Result<Value> {
        let mut body = Map::new();
        body.insert(T::KEY.to_owned(), serde_json::to_value(&self.items)?);
        if let Some(token) = &self.next_page_token {
            body.insert("nextPageToken".into(), Value::String(token.clone()));
        }
        Ok(Value::Object(body))
    }
}
