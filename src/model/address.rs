//! Postal address record

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::{record, RecordKind};
use crate::engine::{Composite, CompositeDescriptor};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    pub fn new(street: impl Into<String>, city: impl Into<String>, postal_code: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Single-line rendering, e.g. `Hauptplatz 1, 4020 Linz, AT`
    pub fn one_line(&self) -> String {
        let mut line = format!("{}, {} {}", self.street, self.postal_code, self.city);
        if let Some(country) = &self.country {
            line.push_str(", ");
            line.push_str(country);
        }
        line
    }
}

impl Composite for Address {
    fn descriptor() -> &'static CompositeDescriptor {
        static DESCRIPTOR: OnceLock<CompositeDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            CompositeDescriptor::builder::<Address>()
                .constructor(Address::default)
                .member("street", |a| &a.street, |a| &mut a.street)
                .member("city", |a| &a.city, |a| &mut a.city)
                .member("postal_code", |a| &a.postal_code, |a| &mut a.postal_code)
                .optional("country", |a| &a.country, |a| &mut a.country)
                .build()
        })
    }
}

record!(Address, RecordKind::Address);
