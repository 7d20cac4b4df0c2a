//! Scoped, read-only access to one locale's messages
//!
//! A [`Translator`] is the explicit context handle page code receives: the
//! active locale plus its bundle, optionally rooted at a namespace. It is
//! `Copy` and borrows the catalog, so passing it down is free.

use thiserror::Error;

use crate::bundle::{Catalog, MessageBundle};
use crate::locale::Locale;
use crate::value::{walk, MessageValue, Record, Shape};

/// A failed typed lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no message at '{key}'")]
    Missing { key: String },

    #[error("message at '{key}' is a {found}, expected a {expected}")]
    ShapeMismatch {
        key: String,
        expected: Shape,
        found: Shape,
    },
}

/// Message accessor for one locale, optionally scoped to a namespace
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    locale: Locale,
    // None when the namespace does not resolve to a group
    scope: Option<&'a Record>,
}

impl<'a> Translator<'a> {
    pub fn new(catalog: &'a Catalog, locale: Locale) -> Self {
        Self::for_bundle(catalog.bundle(locale))
    }

    pub fn for_bundle(bundle: &'a MessageBundle) -> Self {
        Self {
            locale: bundle.locale(),
            scope: Some(bundle.root()),
        }
    }

    /// Narrow to a dotted namespace relative to the current scope.
    ///
    /// If the namespace is missing or not a group, every lookup through the
    /// returned translator behaves as missing.
    pub fn scoped(&self, namespace: &str) -> Translator<'a> {
        let scope = self
            .scope
            .and_then(|root| walk(root, namespace))
            .and_then(MessageValue::as_group);
        Translator {
            locale: self.locale,
            scope,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// The stored value at `key`, whatever its shape
    pub fn raw(&self, key: &str) -> Option<&'a MessageValue> {
        self.scope.and_then(|root| walk(root, key))
    }

    /// A renderable string for `key`.
    ///
    /// Returns `key` itself when the path is missing or does not hold a
    /// string, so gaps show up in the page instead of breaking it.
    pub fn text(&self, key: &str) -> String {
        match self.raw(key).and_then(MessageValue::as_text) {
            Some(text) => text.to_string(),
            None => {
                tracing::trace!(locale = %self.locale, key, "message missing, rendering key");
                key.to_string()
            }
        }
    }

    /// The string list at `key`
    pub fn list(&self, key: &str) -> Result<&'a [String], LookupError> {
        match self.expect_shape(key, Shape::List)? {
            MessageValue::List(items) => Ok(items),
            other => Err(mismatch(key, Shape::List, other)),
        }
    }

    /// The record list at `key`
    pub fn records(&self, key: &str) -> Result<&'a [Record], LookupError> {
        match self.expect_shape(key, Shape::Records)? {
            MessageValue::Records(records) => Ok(records),
            other => Err(mismatch(key, Shape::Records, other)),
        }
    }

    /// The nested group at `key`
    pub fn group(&self, key: &str) -> Result<&'a Record, LookupError> {
        match self.expect_shape(key, Shape::Group)? {
            MessageValue::Group(record) => Ok(record),
            other => Err(mismatch(key, Shape::Group, other)),
        }
    }

    fn expect_shape(&self, key: &str, expected: Shape) -> Result<&'a MessageValue, LookupError> {
        let value = self.raw(key).ok_or_else(|| LookupError::Missing {
            key: key.to_string(),
        })?;
        if value.shape() != expected {
            return Err(mismatch(key, expected, value));
        }
        Ok(value)
    }
}

fn mismatch(key: &str, expected: Shape, found: &MessageValue) -> LookupError {
    LookupError::ShapeMismatch {
        key: key.to_string(),
        expected,
        found: found.shape(),
    }
}

/// The string field `field` of a record item, or `field` itself when absent
pub fn record_text(record: &Record, field: &str) -> String {
    record
        .get(field)
        .and_then(MessageValue::as_text)
        .map_or_else(|| field.to_string(), str::to_string)
}
