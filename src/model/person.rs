//! Person record

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{record, Address, RecordKind};
use crate::engine::{Composite, CompositeDescriptor};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub name: String,
    pub age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Phone numbers by label (`home`, `work`, ...)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub phones: BTreeMap<String, String>,
}

impl Person {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Age in whole years on `today`, if the birthday is known
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birthday = self.birthday?;
        let mut years = today.year() - birthday.year();
        if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

impl Composite for Person {
    fn descriptor() -> &'static CompositeDescriptor {
        static DESCRIPTOR: OnceLock<CompositeDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            CompositeDescriptor::builder::<Person>()
                .constructor(Person::default)
                .member("name", |p| &p.name, |p| &mut p.name)
                .member("age", |p| &p.age, |p| &mut p.age)
                .optional("email", |p| &p.email, |p| &mut p.email)
                .optional("birthday", |p| &p.birthday, |p| &mut p.birthday)
                .optional("address", |p| &p.address, |p| &mut p.address)
                .member("tags", |p| &p.tags, |p| &mut p.tags)
                .member("phones", |p| &p.phones, |p| &mut p.phones)
                .build()
        })
    }
}

record!(Person, RecordKind::Person);
